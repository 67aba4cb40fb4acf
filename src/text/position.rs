//! Start position normalization
//!
//! Mirrors `parseInt(value, 10)` followed by clamping at zero, which is how
//! JS callers have always had their start offsets interpreted.

/// Normalize a numeric start position: truncate toward zero, map NaN,
/// infinities and negatives to 0.
pub fn normalize_start_position(value: f64) -> usize {
    if !value.is_finite() || value < 1.0 {
        return 0;
    }
    // `as` saturates for values beyond usize::MAX
    value.trunc() as usize
}

/// Parse a textual start position the way `parseInt(text, 10)` reads it:
/// leading whitespace, an optional sign, then the longest run of digits.
pub fn parse_start_position(text: &str) -> usize {
    let trimmed = text.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digit_count = digits.bytes().take_while(u8::is_ascii_digit).count();
    if digit_count == 0 || negative {
        return 0;
    }

    digits[..digit_count]
        .bytes()
        .fold(0usize, |acc, d| acc.saturating_mul(10).saturating_add((d - b'0') as usize))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers() {
        assert_eq!(normalize_start_position(0.0), 0);
        assert_eq!(normalize_start_position(7.0), 7);
        assert_eq!(normalize_start_position(3.9), 3);
        assert_eq!(normalize_start_position(0.5), 0);
        assert_eq!(normalize_start_position(-4.0), 0);
        assert_eq!(normalize_start_position(-0.5), 0);
        assert_eq!(normalize_start_position(f64::NAN), 0);
        assert_eq!(normalize_start_position(f64::INFINITY), 0);
        assert_eq!(normalize_start_position(f64::NEG_INFINITY), 0);
    }

    #[test]
    fn test_strings() {
        assert_eq!(parse_start_position("12"), 12);
        assert_eq!(parse_start_position("  12px"), 12);
        assert_eq!(parse_start_position("+5"), 5);
        assert_eq!(parse_start_position("-5"), 0);
        assert_eq!(parse_start_position("abc"), 0);
        assert_eq!(parse_start_position(""), 0);
        assert_eq!(parse_start_position("3.75"), 3);
        assert_eq!(parse_start_position("99999999999999999999999999"), usize::MAX);
    }
}
