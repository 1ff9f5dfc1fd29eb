use crate::util::uri;

/// Resolves a chapter-relative `reference` into an archive path.
///
/// Only references starting with `./` or `../` are resolved;
/// anything else is returned unchanged, as it is already archive-relative.
///
/// - `./` resolves against the directory of `chapter_href`,
///   or the archive root when the chapter has none.
/// - `../` resolves against the parent of that directory.
///   A chapter at the archive root has no such parent,
///   so `archive_base_path` is used instead.
///
/// The real filesystem is never touched.
///
/// # Examples
/// ```
/// # use libris::render::resolve_reference;
/// assert_eq!("images/a.png", resolve_reference("../images/a.png", "text/ch1.xhtml", ""));
/// assert_eq!("OEBPS/images/a.png", resolve_reference("../images/a.png", "ch1.xhtml", "OEBPS"));
/// assert_eq!("text/a.png", resolve_reference("./a.png", "text/ch1.xhtml", ""));
/// assert_eq!("images/a.png", resolve_reference("images/a.png", "text/ch1.xhtml", ""));
/// ```
pub fn resolve_reference(reference: &str, chapter_href: &str, archive_base_path: &str) -> String {
    if !reference.starts_with("./") && !reference.starts_with("../") {
        return reference.to_owned();
    }
    let chapter_dir = uri::parent(chapter_href).trim_start_matches('/');

    match reference.strip_prefix("../") {
        Some(rest) if chapter_dir.is_empty() => {
            uri::resolve(archive_base_path.trim_matches('/'), rest).into_owned()
        }
        _ => uri::resolve(chapter_dir, reference).into_owned(),
    }
}
