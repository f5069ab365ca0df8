/// True when `content` ends with `phrase`, ignoring trailing whitespace.
///
/// An empty phrase never matches.
pub fn is_termination(content: &str, phrase: &str) -> bool {
    !phrase.is_empty() && content.trim_end().ends_with(phrase)
}
