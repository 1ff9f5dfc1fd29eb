use crate::epub::IMAGE_DIRS;
use crate::render::{ResourceLookupTable, resolve_reference};
use crate::util::str::StrExt;
use crate::util::uri;
use once_cell::sync::Lazy;
use quick_xml::escape::{escape, unescape};
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::ops::Range;

// A `>` within a quoted attribute value does not end the tag
static IMG_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<img\b(?:[^>"']|"[^"]*"|'[^']*')*>"#).expect("valid img regex")
});
static IMAGE_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<(?:svg:)?image\b(?:[^>"']|"[^"]*"|'[^']*')*>"#).expect("valid image regex")
});
static ANCHOR_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<a\b(?:[^>"']|"[^"]*"|'[^']*')*>"#).expect("valid anchor regex")
});

// Group 1 is the name, group 2 the whole value token;
// groups 3 to 5 its double-quoted, single-quoted, or bare content
static ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\s([\w:.-]+)\s*=\s*("([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
        .expect("valid attribute regex")
});

const SRC_NAMES: &[&str] = &["src"];
const HREF_NAMES: &[&str] = &["href", "xlink:href"];

const NEUTRAL_LINK: &str = "javascript:void(0)";

/// A chapter as supplied by the reading layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    /// Identifier placed on the wrapping element.
    pub id: String,
    /// Archive-relative location, such as `OEBPS/text/ch1.xhtml`.
    pub href: String,
    /// Decoded chapter markup.
    pub raw_content: String,
}

impl Chapter {
    pub fn new(
        id: impl Into<String>,
        href: impl Into<String>,
        raw_content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            href: href.into(),
            raw_content: raw_content.into(),
        }
    }
}

/// Rewrites chapter markup so every resource reference is displayable:
/// - `<img src>` is replaced with its [`ResourceLookupTable`] reference,
///   or the whole tag with a visible placeholder when there is none.
/// - `<image href>`/`<image xlink:href>` is replaced when found and left as-is otherwise.
/// - `<a href>` keeps external (`http`/`https`) targets,
///   reduces targets with a fragment to `#fragment`,
///   and neutralizes all other internal targets.
///
/// Rewriting is pure; the same chapter and table always produce the same markup.
///
/// # Examples
/// ```
/// # use libris::render::{Chapter, ChapterRewriter, ResourceLookupTable, RewriteSettings};
/// let mut table = ResourceLookupTable::new();
/// table.insert("OEBPS/images/a.png", "data:image/png;base64,AAAA");
///
/// let chapter = Chapter::new(
///     "ch1",
///     "OEBPS/text/ch1.xhtml",
///     r#"<p><img src="../images/a.png"/><img src="gone.png"/></p>"#,
/// );
/// let rewritten = ChapterRewriter::default().rewrite(&chapter, &table);
///
/// assert_eq!(
///     concat!(
///         r#"<div class="chapter" id="ch1"><p><img src="data:image/png;base64,AAAA"/>"#,
///         r#"<span class="missing-image">Image not found: gone.png</span></p></div>"#,
///     ),
///     rewritten,
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct ChapterRewriter {
    settings: RewriteSettings,
}

impl ChapterRewriter {
    pub fn new(settings: impl Into<RewriteSettings>) -> Self {
        Self {
            settings: settings.into(),
        }
    }

    /// The settings in use.
    pub fn settings(&self) -> &RewriteSettings {
        &self.settings
    }

    /// Rewrites the markup of `chapter` and wraps it in a container tagged with the chapter id.
    pub fn rewrite(&self, chapter: &Chapter, table: &ResourceLookupTable) -> String {
        let content = IMG_TAG.replace_all(&chapter.raw_content, |captures: &Captures| {
            self.rewrite_raster(&captures[0], chapter, table)
        });
        let content = IMAGE_TAG.replace_all(&content, |captures: &Captures| {
            self.rewrite_vector(&captures[0], chapter, table)
                .unwrap_or_else(|| captures[0].to_owned())
        });
        let content = ANCHOR_TAG.replace_all(&content, |captures: &Captures| {
            rewrite_link(&captures[0]).unwrap_or_else(|| captures[0].to_owned())
        });

        format!(
            r#"<div class="{}" id="{}">{content}</div>"#,
            escape(&self.settings.wrapper_class),
            escape(&chapter.id),
        )
    }

    fn rewrite_raster(&self, tag: &str, chapter: &Chapter, table: &ResourceLookupTable) -> String {
        let Some((range, value)) = find_attribute(SRC_NAMES, tag) else {
            return tag.to_owned();
        };
        if is_displayable(&value) {
            return tag.to_owned();
        }

        match self.lookup(&value, chapter, table) {
            Some(reference) => replace_attribute(tag, range, reference),
            None => {
                let name = uri::file_name(&value);
                let name = if name.is_empty() { value.as_str() } else { name };

                format!(
                    r#"<span class="{}">Image not found: {}</span>"#,
                    escape(&self.settings.missing_image_class),
                    escape(uri::decode(name)),
                )
            }
        }
    }

    fn rewrite_vector(
        &self,
        tag: &str,
        chapter: &Chapter,
        table: &ResourceLookupTable,
    ) -> Option<String> {
        let (range, value) = find_attribute(HREF_NAMES, tag)?;
        if is_displayable(&value) {
            return None;
        }
        let reference = self.lookup(&value, chapter, table)?;

        Some(replace_attribute(tag, range, reference))
    }

    /// Looks a reference up by, in order: its resolved path (verbatim, then decoded),
    /// its file name, and its file name within each conventional image directory.
    fn lookup<'t>(
        &self,
        value: &str,
        chapter: &Chapter,
        table: &'t ResourceLookupTable,
    ) -> Option<&'t str> {
        let resolved = resolve_reference(value, &chapter.href, &self.settings.archive_base_path);
        let resolved = uri::strip_query_and_fragment(&resolved);
        let decoded = uri::decode(resolved);
        let file_name = uri::file_name(&decoded);

        let direct = [resolved, decoded.as_ref(), file_name]
            .into_iter()
            .find_map(|key| table.get(key));

        direct.or_else(|| {
            self.settings
                .image_dirs
                .iter()
                .find_map(|dir| table.get(&format!("{dir}/{file_name}")))
        })
    }
}

fn rewrite_link(tag: &str) -> Option<String> {
    let (range, value) = find_attribute(HREF_NAMES, tag)?;

    if value.starts_with_ignore_case("http://") || value.starts_with_ignore_case("https://") {
        return None;
    }
    let target = match value.find('#') {
        Some(position) => &value[position..],
        None => NEUTRAL_LINK,
    };
    if target == value {
        return None;
    }
    Some(replace_attribute(tag, range, target))
}

/// References a renderer can already display without a lookup.
fn is_displayable(value: &str) -> bool {
    ["data:", "http://", "https://", "blob:"]
        .iter()
        .any(|scheme| value.starts_with_ignore_case(scheme))
}

/// Returns the byte range of the first attribute value token within `tag`
/// whose name is one of `names`, and its unescaped content.
fn find_attribute(names: &[&str], tag: &str) -> Option<(Range<usize>, String)> {
    let captures = ATTRIBUTE.captures_iter(tag).find(|captures| {
        names
            .iter()
            .any(|name| captures[1].eq_ignore_ascii_case(name))
    })?;
    let token = captures.get(2)?;
    let raw = (3..=5).find_map(|group| captures.get(group))?.as_str();
    let value = unescape(raw).unwrap_or(Cow::Borrowed(raw));

    Some((token.range(), value.trim().to_owned()))
}

fn replace_attribute(tag: &str, range: Range<usize>, value: &str) -> String {
    format!(
        r#"{}"{}"{}"#,
        &tag[..range.start],
        escape(value),
        &tag[range.end..]
    )
}

/// Configuration for a [`ChapterRewriter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteSettings {
    /// Base path substituted for `../` references of chapters at the archive root.
    ///
    /// Default: `""`
    pub archive_base_path: String,
    /// Directories whose `<dir>/<file name>` keys are tried last when looking up images.
    ///
    /// Default: `images`, `Images`, `OEBPS/images`, `OEBPS/Images`,
    /// `OPS/images`, `OPS/Images`, `img`, `graphics`
    pub image_dirs: Vec<String>,
    /// Class of the placeholder replacing images without a lookup entry.
    ///
    /// Default: `missing-image`
    pub missing_image_class: String,
    /// Class of the element wrapping the rewritten chapter.
    ///
    /// Default: `chapter`
    pub wrapper_class: String,
}

impl RewriteSettings {
    /// Returns a builder to create a [`RewriteSettings`] instance.
    pub fn builder() -> RewriteSettingsBuilder {
        RewriteSettingsBuilder(Self::default())
    }
}

impl Default for RewriteSettings {
    fn default() -> Self {
        Self {
            archive_base_path: String::new(),
            image_dirs: IMAGE_DIRS.iter().map(|dir| (*dir).to_owned()).collect(),
            missing_image_class: "missing-image".to_owned(),
            wrapper_class: "chapter".to_owned(),
        }
    }
}

impl From<RewriteSettingsBuilder> for RewriteSettings {
    fn from(value: RewriteSettingsBuilder) -> Self {
        value.build()
    }
}

/// Builder to construct a [`RewriteSettings`] instance.
#[derive(Debug, Clone)]
pub struct RewriteSettingsBuilder(RewriteSettings);

impl RewriteSettingsBuilder {
    /// Turn this builder into a [`RewriteSettings`] instance.
    pub fn build(self) -> RewriteSettings {
        self.0
    }

    /// See [`RewriteSettings::archive_base_path`].
    pub fn archive_base_path(mut self, archive_base_path: impl Into<String>) -> Self {
        self.0.archive_base_path = archive_base_path.into();
        self
    }

    /// See [`RewriteSettings::image_dirs`].
    pub fn image_dirs<I: IntoIterator<Item = S>, S: Into<String>>(mut self, image_dirs: I) -> Self {
        self.0.image_dirs = image_dirs.into_iter().map(Into::into).collect();
        self
    }

    /// See [`RewriteSettings::missing_image_class`].
    pub fn missing_image_class(mut self, missing_image_class: impl Into<String>) -> Self {
        self.0.missing_image_class = missing_image_class.into();
        self
    }

    /// See [`RewriteSettings::wrapper_class`].
    pub fn wrapper_class(mut self, wrapper_class: impl Into<String>) -> Self {
        self.0.wrapper_class = wrapper_class.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ResourceLookupTable {
        [
            ("OEBPS/images/a.png", "data:a"),
            ("OEBPS/images/my cover.jpg", "data:cover"),
            ("b.png", "data:b"),
            ("images/c.gif", "data:c"),
            ("OEBPS/images/d.svg", "data:d"),
        ]
        .into_iter()
        .collect()
    }

    fn rewrite(href: &str, content: &str) -> String {
        let rewriter = ChapterRewriter::new(RewriteSettings::builder().wrapper_class("c"));
        let rewritten = rewriter.rewrite(&Chapter::new("x", href, content), &table());

        rewritten
            .strip_prefix(r#"<div class="c" id="x">"#)
            .and_then(|rest| rest.strip_suffix("</div>"))
            .unwrap()
            .to_owned()
    }

    #[test]
    fn test_raster_images() {
        #[rustfmt::skip]
        let expected = [
            // Resolved path
            (r#"<img src="data:a" alt="A"/>"#, r#"<img src="../images/a.png" alt="A"/>"#),
            (r#"<IMG alt="A" SRC="data:a">"#, r#"<IMG alt="A" SRC='../images/a.png'>"#),
            (r#"<img src="data:a" />"#, r#"<img src=../images/a.png />"#),
            // Percent-decoded path
            (r#"<img src="data:cover"/>"#, r#"<img src="../images/my%20cover.jpg"/>"#),
            // File name
            (r#"<img src="data:b"/>"#, r#"<img src="../../somewhere/b.png"/>"#),
            // Conventional directory
            (r#"<img src="data:c"/>"#, r#"<img src="pics/c.gif"/>"#),
            // Already displayable
            (r#"<img src="data:image/png;base64,AA"/>"#, r#"<img src="data:image/png;base64,AA"/>"#),
            (r#"<img src="https://example.com/x.png"/>"#, r#"<img src="https://example.com/x.png"/>"#),
            // No src at all
            (r#"<img alt="none"/>"#, r#"<img alt="none"/>"#),
            // Missing
            (r#"<span class="missing-image">Image not found: gone.png</span>"#, r#"<img src="../images/gone.png"/>"#),
            (r#"<span class="missing-image">Image not found: a &amp; b.png</span>"#, r#"<img src="a%20&amp;%20b.png"/>"#),
            (r#"<span class="missing-image">Image not found: it&apos;s.png</span>"#, r#"<img src="it's.png"/>"#),
            // `>` within a quoted value
            (r#"<img alt="1 > 0" src="data:a"/>"#, r#"<img alt="1 > 0" src="../images/a.png"/>"#),
            (r#"<img alt='x>y' src="data:b">"#, r#"<img alt='x>y' src="b.png">"#),
            (r#"<span class="missing-image">Image not found: gone.png</span>"#, r#"<img alt="x>y" src="../images/gone.png"/>"#),
            // Attribute names within other values are not attributes
            (r#"<img alt=" src=b.png" src="data:a"/>"#, r#"<img alt=" src=b.png" src="../images/a.png"/>"#),
            (r#"<img data-src="x.png" src="data:b"/>"#, r#"<img data-src="x.png" src="b.png"/>"#),
        ];

        for (expected, content) in expected {
            assert_eq!(expected, rewrite("OEBPS/text/ch1.xhtml", content), "{content}");
        }
    }

    #[test]
    fn test_vector_images() {
        #[rustfmt::skip]
        let expected = [
            (r#"<image width="10" xlink:href="data:d"/>"#, r#"<image width="10" xlink:href="../images/d.svg"/>"#),
            (r#"<svg:image href="data:a"/>"#, r#"<svg:image href="../images/a.png"/>"#),
            (r#"<image title="a>b" xlink:href="data:d"/>"#, r#"<image title="a>b" xlink:href="../images/d.svg"/>"#),
            // Left untouched when missing
            (r#"<image xlink:href="../images/gone.svg"/>"#, r#"<image xlink:href="../images/gone.svg"/>"#),
        ];

        for (expected, content) in expected {
            assert_eq!(expected, rewrite("OEBPS/text/ch1.xhtml", content), "{content}");
        }
    }

    #[test]
    fn test_links() {
        #[rustfmt::skip]
        let expected = [
            (r#"<a href="https://example.com">x</a>"#, r#"<a href="https://example.com">x</a>"#),
            (r#"<a class='x' HREF='http://example.com/a?b=c'>x</a>"#, r#"<a class='x' HREF='http://example.com/a?b=c'>x</a>"#),
            (r##"<a href="#note-1">1</a>"##, r##"<a href="ch2.xhtml#note-1">1</a>"##),
            (r##"<a href="#top">top</a>"##, r##"<a href="#top">top</a>"##),
            (r#"<a href="javascript:void(0)">next</a>"#, r#"<a href="ch2.xhtml">next</a>"#),
            (r#"<a id="anchor">no href</a>"#, r#"<a id="anchor">no href</a>"#),
            (r#"<a title="a>b" href="javascript:void(0)">next</a>"#, r#"<a title="a>b" href="ch2.xhtml">next</a>"#),
            (r##"<a title='1 > 0' href="#n">n</a>"##, r##"<a title='1 > 0' href="ch2.xhtml#n">n</a>"##),
            (r#"<abbr title="x">y</abbr>"#, r#"<abbr title="x">y</abbr>"#),
        ];

        for (expected, content) in expected {
            assert_eq!(expected, rewrite("OEBPS/text/ch1.xhtml", content), "{content}");
        }
    }

    #[test]
    fn test_wrapper_and_idempotence() {
        let chapter = Chapter::new(r#"c"1"#, "OEBPS/text/ch1.xhtml", r#"<img src="../images/a.png"/>"#);
        let rewriter = ChapterRewriter::default();
        let first = rewriter.rewrite(&chapter, &table());

        assert_eq!(
            r#"<div class="chapter" id="c&quot;1"><img src="data:a"/></div>"#,
            first
        );
        assert_eq!(first, rewriter.rewrite(&chapter, &table()));
    }

    #[test]
    fn test_archive_base_path_fallback() {
        let rewriter = ChapterRewriter::new(RewriteSettings::builder().archive_base_path("OEBPS"));
        let chapter = Chapter::new("x", "ch1.xhtml", r#"<img src="../images/a.png"/>"#);

        assert!(rewriter.rewrite(&chapter, &table()).contains(r#"src="data:a""#));
    }
}
