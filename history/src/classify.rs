use regex::Regex;
use std::sync::LazyLock;

use crate::types::ContentType;

#[allow(clippy::expect_used)]
static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^https?://\S+$").expect("url pattern compiles"));

#[allow(clippy::expect_used)]
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

#[allow(clippy::expect_used)]
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[1-9][0-9]{0,15}$").expect("phone pattern compiles"));

const CODE_MARKERS: [&str; 4] = ["{", "function", "class ", "import "];

const LONG_TEXT_CHARS: usize = 100;

/// Map captured text to a content tag. First match wins; URL, email, phone
/// and number are checked before the length test so a long URL stays a URL.
///
/// The `longtext` threshold counts `char`s, not UTF-16 code units, so text
/// made of astral-plane characters such as emoji needs twice as many
/// characters to qualify as it would in a browser's `String.length`.
pub fn classify(text: &str) -> ContentType {
    if text.is_empty() {
        return ContentType::Empty;
    }

    let trimmed = text.trim();
    if URL_RE.is_match(trimmed) {
        return ContentType::Url;
    }
    if EMAIL_RE.is_match(trimmed) {
        return ContentType::Email;
    }

    let dialable: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '(' | ')'))
        .collect();
    if PHONE_RE.is_match(&dialable) {
        return ContentType::Phone;
    }

    if is_numeric(trimmed) {
        return ContentType::Number;
    }
    if CODE_MARKERS.iter().any(|m| text.contains(m)) {
        return ContentType::Code;
    }
    if text.chars().count() > LONG_TEXT_CHARS {
        return ContentType::LongText;
    }
    ContentType::Text
}

fn is_numeric(s: &str) -> bool {
    if s.is_empty() {
        return false;
    }
    let unsigned = s.strip_prefix(['+', '-']).unwrap_or(s);
    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        // Radix literals are unsigned.
        if let Some(digits) = s.strip_prefix(prefix) {
            return !digits.is_empty() && digits.chars().all(|c| c.is_digit(radix));
        }
    }
    if unsigned == "Infinity" {
        return true;
    }
    // Rust accepts spellings like "inf" and "nan" that are not numbers here.
    if unsigned.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') {
        return false;
    }
    s.parse::<f64>().is_ok_and(|v| !v.is_nan())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn empty_only_for_empty_string() {
        assert_eq!(classify(""), ContentType::Empty);
        assert_eq!(classify("   "), ContentType::Text);
    }

    #[test]
    fn url_must_be_whole_string() {
        assert_eq!(classify("https://example.com"), ContentType::Url);
        assert_eq!(classify("HTTP://EXAMPLE.COM/a?b=c"), ContentType::Url);
        assert_eq!(classify("  https://example.com  "), ContentType::Url);
        assert_eq!(classify("see https://example.com"), ContentType::Text);
        assert_eq!(classify("ftp://example.com"), ContentType::Text);
    }

    #[test]
    fn long_url_is_not_longtext() {
        let url = format!("https://example.com/{}", "a".repeat(200));
        assert_eq!(classify(&url), ContentType::Url);
    }

    #[test]
    fn email() {
        assert_eq!(classify("someone@example.org"), ContentType::Email);
        assert_eq!(classify("someone@localhost"), ContentType::Text);
        assert_eq!(classify("two words@example.org"), ContentType::Text);
    }

    #[test]
    fn phone_strips_separators() {
        assert_eq!(classify("+1 (555) 123-4567"), ContentType::Phone);
        assert_eq!(classify("5551234"), ContentType::Phone);
        // Leading zero is not E.164-like, but still numeric.
        assert_eq!(classify("0123"), ContentType::Number);
    }

    #[test]
    fn numbers() {
        assert_eq!(classify("3.14"), ContentType::Number);
        assert_eq!(classify("-0.5"), ContentType::Number);
        // Hyphens are phone separators, so this reads as a dialable number.
        assert_eq!(classify("-42"), ContentType::Phone);
        assert_eq!(classify("1e10"), ContentType::Number);
        assert_eq!(classify("0x1F"), ContentType::Number);
        assert_eq!(classify(&format!("0x{}", "ab".repeat(32))), ContentType::Number);
        assert_eq!(classify("0b102"), ContentType::Text);
        assert_eq!(classify("Infinity"), ContentType::Number);
        assert_eq!(classify("NaN"), ContentType::Text);
        assert_eq!(classify("inf"), ContentType::Text);
        assert_eq!(classify("12abc"), ContentType::Text);
    }

    #[test]
    fn long_digit_string_is_number() {
        let digits = "9".repeat(120);
        assert_eq!(classify(&digits), ContentType::Number);
    }

    #[test]
    fn code_markers() {
        assert_eq!(classify("fn main() {}"), ContentType::Code);
        assert_eq!(classify("function foo()"), ContentType::Code);
        assert_eq!(classify("class Foo"), ContentType::Code);
        assert_eq!(classify("import os"), ContentType::Code);
        assert_eq!(classify("classification"), ContentType::Text);
    }

    #[test]
    fn long_and_plain_text() {
        let long = "word ".repeat(30);
        assert_eq!(classify(&long), ContentType::LongText);
        assert_eq!(classify("hello world"), ContentType::Text);
        // Length is counted in characters, not bytes.
        assert_eq!(classify(&"é".repeat(60)), ContentType::Text);
        // One char each, though two UTF-16 units.
        assert_eq!(classify(&"😀".repeat(60)), ContentType::Text);
        assert_eq!(classify(&"😀".repeat(101)), ContentType::LongText);
    }

    #[test]
    fn names_are_lowercase() {
        assert_eq!(ContentType::LongText.to_string(), "longtext");
        assert_eq!(ContentType::parse("url").unwrap(), ContentType::Url);
        assert!(ContentType::parse("URL").is_err());
    }
}
