use regex::Regex;
use std::sync::LazyLock;

/// Characters with a meaning in the GIFT grammar.
pub const RESERVED: [char; 6] = ['~', '=', '#', '{', '}', ':'];

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Escape text so it can be embedded in a GIFT question.
///
/// Reserved characters get a backslash prefix, newlines and runs of
/// whitespace collapse to a single space, and the result is trimmed.
pub fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if RESERVED.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }

    let escaped = escaped.replace('\n', " ");
    WHITESPACE_RUN
        .replace_all(&escaped, " ")
        .trim()
        .to_string()
}
