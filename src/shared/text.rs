//! Text normalization helpers

/// Canonical key for header/label comparison: trimmed, lower-cased,
/// with runs of whitespace collapsed to single spaces.
pub fn norm_key(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Trimmed string, `None` when empty.
pub fn non_empty(s: &str) -> Option<&str> {
    let t = s.trim();
    if t.is_empty() {
        None
    } else {
        Some(t)
    }
}

/// Leading-integer parse: optional sign followed by digits, ignoring
/// anything after the first non-digit ("24", "24.0" and "12abc" all
/// yield a value, "abc" does not).
pub fn parse_leading_int(s: &str) -> Option<i64> {
    let t = s.trim();
    let (sign, rest) = match t.strip_prefix('-') {
        Some(r) => (-1i64, r),
        None => (1i64, t.strip_prefix('+').unwrap_or(t)),
    };
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse::<i64>().ok().map(|n| sign * n)
}

// ── Tests ──────────────────────────────────────────────────────
