use crate::parser::ParserResult;
use quick_xml::Reader;
use quick_xml::escape;
use quick_xml::events::{BytesCData, BytesRef, BytesStart, BytesText, Event};
use std::borrow::Cow;

pub(crate) type ByteReader<'a> = Reader<&'a [u8]>;

pub(crate) fn reader(data: &[u8]) -> ByteReader<'_> {
    Reader::from_reader(data)
}

pub(crate) trait XmlReader<'a> {
    /// Iterator-like method to read the next [`Event`].
    ///
    /// Returns [`None`] at the end of the document.
    fn next(&mut self) -> Option<ParserResult<Event<'a>>>;

    /// Retrieve consolidated text for a specified element up to its end tag.
    ///
    /// Text nested within child elements is included,
    /// so `<dc:title><span>Title</span></dc:title>` yields `Title`.
    /// Runs of whitespace collapse into a single space.
    fn get_text_simple(&mut self, start: &BytesStart) -> ParserResult<String> {
        let mut value = String::new();

        while let Some(result) = self.next() {
            match result? {
                Event::End(el) if el.name() == start.name() => break,
                Event::Text(text) => text_to_str(&mut value, &text),
                Event::CData(cdata) => cdata_to_str(&mut value, &cdata),
                Event::GeneralRef(reference) => ref_to_str(&mut value, &reference),
                _ => {}
            }
        }
        Ok(collapse_whitespace(&value))
    }
}

impl<'a> XmlReader<'a> for ByteReader<'a> {
    fn next(&mut self) -> Option<ParserResult<Event<'a>>> {
        match self.read_event() {
            Ok(Event::Eof) => None,
            result => Some(result.map_err(Into::into)),
        }
    }
}

pub(crate) trait XmlElement {
    fn is_local_name(&self, local_name: impl AsRef<[u8]>) -> bool;

    /// Returns the unescaped value of the attribute with the given qualified `key`.
    fn get_attribute(&self, key: impl AsRef<[u8]>) -> Option<String>;
}

impl XmlElement for BytesStart<'_> {
    fn is_local_name(&self, target_local_name: impl AsRef<[u8]>) -> bool {
        self.local_name().as_ref() == target_local_name.as_ref()
    }

    fn get_attribute(&self, key: impl AsRef<[u8]>) -> Option<String> {
        let attribute = self.try_get_attribute(key).ok()??;
        let raw = String::from_utf8(attribute.value.into_owned()).ok()?;

        Some(match escape::unescape(&raw) {
            Ok(Cow::Owned(unescaped)) => unescaped,
            // Borrowed or malformed; keep the raw value
            _ => raw,
        })
    }
}

// Helper methods
fn cdata_to_str(value: &mut String, cdata: &BytesCData) {
    let text = cdata
        .decode()
        .unwrap_or_else(|_| String::from_utf8_lossy(cdata.as_ref()));

    value.push_str(&text);
}

fn text_to_str(value: &mut String, text: &BytesText) {
    let text = text
        .decode()
        .unwrap_or_else(|_| String::from_utf8_lossy(text.as_ref()));

    value.push_str(&text);
}

fn ref_to_str(value: &mut String, reference: &BytesRef) {
    if let Ok(Some(c)) = reference.resolve_char_ref() {
        value.push(c);
        return;
    }
    let name = reference
        .decode()
        .unwrap_or_else(|_| String::from_utf8_lossy(reference.as_ref()));

    match escape::resolve_predefined_entity(&name) {
        Some(resolved) => value.push_str(resolved),
        // Unknown entity; retain it verbatim
        None => {
            value.push('&');
            value.push_str(&name);
            value.push(';');
        }
    }
}

fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}
