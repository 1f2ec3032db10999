//! Utility functions shared across the runtime client.
//!
//! These helpers are pure string routines used by the wire model and the
//! invocation types, kept here so both sides agree on the exact rules.

/// Returns true for the fixed header whitespace set: space, tab, CR, LF,
/// form feed and vertical tab.
#[inline]
#[must_use]
pub const fn is_header_whitespace(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\r' | '\n' | '\x0c' | '\x0b')
}

/// Trims header whitespace from both ends of `s`.
#[must_use]
pub fn trim_header(s: &str) -> &str {
    s.trim_matches(is_header_whitespace)
}

/// Splits a raw header line at its first colon and trims both sides.
///
/// Returns `None` for lines without a colon, such as the status line or the
/// blank line terminating the header block.
#[must_use]
pub fn split_header_line(line: &str) -> Option<(&str, &str)> {
    line.split_once(':')
        .map(|(key, value)| (trim_header(key), trim_header(value)))
}

/// Escapes a string for embedding inside a JSON string literal.
///
/// Only backslash, quote and control characters below 0x20 are escaped;
/// everything else (including non-ASCII text) is copied verbatim.
#[must_use]
pub fn json_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\x08' => out.push_str("\\b"),
            '\x0c' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

/// Parses the leading decimal digits of `value` as milliseconds.
///
/// Leading whitespace and a single `+` are skipped. Anything that does not
/// start with a digit yields 0, trailing garbage is ignored, and overflow
/// saturates.
#[must_use]
pub fn parse_leading_millis(value: &str) -> u64 {
    let digits = trim_header(value);
    let digits = digits.strip_prefix('+').unwrap_or(digits);
    digits
        .chars()
        .map_while(|c| c.to_digit(10))
        .fold(0u64, |acc, d| acc.saturating_mul(10).saturating_add(u64::from(d)))
}
