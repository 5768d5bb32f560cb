/// Collapses every maximal run of whitespace to a single space and trims both ends.
///
/// Whitespace follows the Unicode `White_Space` property, so tabs, newlines,
/// form feeds and non-breaking spaces emitted by PDF extraction all collapse.
pub fn normalize_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}
