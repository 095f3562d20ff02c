//! Locale-aware price text normalization.
//!
//! Upstream pages render prices with Persian digits, `٬` or `,` as thousands
//! separator, `٫` as decimal separator and sometimes a leading `$`.

/// Map Persian (U+06F0..) and Arabic-Indic (U+0660..) digits to ASCII.
pub fn fa_to_en_digits(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '\u{06F0}'..='\u{06F9}' => ascii_digit(c as u32 - 0x06F0),
            '\u{0660}'..='\u{0669}' => ascii_digit(c as u32 - 0x0660),
            other => other,
        })
        .collect()
}

fn ascii_digit(offset: u32) -> char {
    char::from_digit(offset, 10).unwrap_or('0')
}

/// Strip symbols and separators and turn the text into plain `1234.5` form.
pub fn canonicalize(s: &str) -> String {
    fa_to_en_digits(s)
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | '٬'))
        .map(|c| if c == '٫' { '.' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Parse a price, returning `None` when the text is not a usable number.
pub fn try_parse_number(s: &str) -> Option<f64> {
    canonicalize(s)
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}

/// Parse a price; anything unparsable becomes `0.0`.
pub fn parse_number(s: &str) -> f64 {
    try_parse_number(s).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persian_digits_with_separators() {
        assert_eq!(parse_number("۱٬۲۳۴٫۵"), 1234.5);
        assert_eq!(parse_number("۹۸,۷۵۰"), 98750.0);
    }

    #[test]
    fn test_dollar_and_commas() {
        assert_eq!(parse_number("$12,000"), 12000.0);
        assert_eq!(parse_number("  $0.9998 "), 0.9998);
    }

    #[test]
    fn test_arabic_indic_digits() {
        assert_eq!(parse_number("٣٤٥"), 345.0);
    }

    #[test]
    fn test_unparsable_is_zero() {
        assert_eq!(parse_number("abc"), 0.0);
        assert_eq!(parse_number(""), 0.0);
        assert_eq!(parse_number("۱۲ تومان"), 0.0);
        assert_eq!(try_parse_number("abc"), None);
    }

    #[test]
    fn test_non_finite_and_negative_degrade() {
        assert_eq!(parse_number("inf"), 0.0);
        assert_eq!(parse_number("NaN"), 0.0);
        assert_eq!(parse_number("-5"), 0.0);
    }

    #[test]
    fn test_matches_canonical_western_string() {
        for (raw, western) in [
            ("۵۶٬۷۸۹٫۰۱", "56789.01"),
            ("۱۰۰", "100"),
            ("$۳,۴۰۰٫۲۵", "3400.25"),
        ] {
            assert_eq!(canonicalize(raw), western);
            assert_eq!(parse_number(raw), western.parse::<f64>().unwrap());
        }
    }
}
