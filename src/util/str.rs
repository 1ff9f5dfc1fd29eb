pub(crate) trait StrExt {
    fn starts_with_ignore_case(&self, start: &str) -> bool;

    fn contains_any(&self, needles: &[&str]) -> bool;
}

impl StrExt for str {
    fn starts_with_ignore_case(&self, start: &str) -> bool {
        self.len() >= start.len()
            && self.is_char_boundary(start.len())
            && self[..start.len()].eq_ignore_ascii_case(start)
    }

    fn contains_any(&self, needles: &[&str]) -> bool {
        needles.iter().any(|needle| self.contains(needle))
    }
}
