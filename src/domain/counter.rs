//! Display counters.
//!
//! Views and likes are persisted as en-US grouped strings ("1,000").
//! Parsing strips grouping separators only; a `.` is never read as a
//! separator or a decimal point, so "1.000" is rejected rather than
//! silently becoming 1 or 1000.

/// Characters accepted as digit grouping
const GROUPING_SEPARATORS: &[char] = &[',', ' ', '_', '\u{a0}', '\u{202f}'];

/// Parse a display count back into an integer.
///
/// Returns `None` for empty, negative, fractional or otherwise non-numeric input.
/// Counts beyond `u64::MAX` saturate.
pub fn parse_display_count(raw: &str) -> Option<u64> {
    let digits: String = raw
        .trim()
        .chars()
        .filter(|c| !GROUPING_SEPARATORS.contains(c))
        .collect();

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    // All digits, so overflow is the only way parsing can fail
    Some(digits.parse().unwrap_or(u64::MAX))
}

/// Format a count with comma grouping every three digits
pub fn format_display_count(value: u64) -> String {
    let digits = value.to_string();
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    out
}
