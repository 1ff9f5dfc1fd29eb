use std::borrow::Cow;
use std::path::{Component, Path, PathBuf};

/// The directory portion of an archive path.
pub(crate) fn parent(href: &str) -> &str {
    href.rfind('/')
        .map_or("", |index| if index == 0 { "/" } else { &href[..index] })
}

/// The last segment of an archive path, without any query or fragment.
pub(crate) fn file_name(href: &str) -> &str {
    let href = strip_query_and_fragment(href);
    href.rfind('/').map_or(href, |index| &href[index + 1..])
}

/// The extension of the last path segment including its leading dot (`.jpg`),
/// or an empty string when there is none.
pub(crate) fn extension(href: &str) -> &str {
    let name = file_name(href);
    match name.rfind('.') {
        Some(index) if index > 0 => &name[index..],
        _ => "",
    }
}

pub(crate) fn strip_query_and_fragment(href: &str) -> &str {
    href.find(['?', '#']).map_or(href, |position| &href[..position])
}

pub(crate) fn decode(encoded: &str) -> Cow<'_, str> {
    percent_encoding::percent_decode_str(encoded).decode_utf8_lossy()
}

/// Resolve a child path against its parent directory, normalizing `.` and `..`.
///
/// Absolute and scheme-carrying references are returned as-is.
pub(crate) fn resolve<'a>(parent_dir: &str, relative: &'a str) -> Cow<'a, str> {
    let (main_href, frag) = relative
        .find(['?', '#'])
        .map(|position| (&relative[..position], &relative[position..]))
        .unwrap_or((relative, ""));

    if main_href.starts_with('/') || main_href.contains(':') {
        return Cow::Borrowed(relative);
    }

    let mut buf = Path::new(parent_dir).join(main_href);
    normalize_href_path(&mut buf);

    // Ensure separators are forward slashes.
    Cow::Owned(buf.to_string_lossy().replace('\\', "/") + frag)
}

fn normalize_href_path(original: &mut PathBuf) {
    let mut stack = Vec::new();

    for component in original.components() {
        match component {
            Component::ParentDir => {
                // Popping past the archive root is not possible
                if stack
                    .last()
                    .is_some_and(|component| !matches!(component, Component::RootDir))
                {
                    stack.pop();
                }
            }
            Component::CurDir => {}
            _ => stack.push(component),
        }
    }

    *original = PathBuf::from_iter(stack);
}
