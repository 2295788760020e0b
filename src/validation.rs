// Input validation for the "Sum in USD" field
//
// Raw form text is checked here before an Entry exists. Fractional input is
// truncated toward zero to whole units; anything else that is not a
// non-negative number is rejected instead of being recorded as zero.

use crate::entities::{Amount, MAX_SUM};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Sum is required")]
    Empty,

    #[error("Sum '{0}' is not a number")]
    NotNumeric(String),

    #[error("Sum '{0}' is negative")]
    Negative(String),

    #[error("Sum '{0}' is too large")]
    TooLarge(String),
}

/// Parse a sum typed by the user into whole USD units
///
/// Accepts `"100"`, `" 100 "`, `"1,500"`, `"12.90"` (-> 12), `".5"` (-> 0).
pub fn parse_sum(raw: &str) -> Result<Amount, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty);
    }

    if let Some(rest) = trimmed.strip_prefix('-') {
        // Still reject "-abc" as non-numeric rather than negative
        return match whole_part(rest) {
            None => Err(ValidationError::NotNumeric(trimmed.to_string())),
            // "-0" and "-0.00" are zero, not negative
            Some(_) if rest.chars().all(|c| matches!(c, '0' | '.' | ',')) => Ok(0),
            Some(_) => Err(ValidationError::Negative(trimmed.to_string())),
        };
    }

    let digits = whole_part(trimmed.strip_prefix('+').unwrap_or(trimmed))
        .ok_or_else(|| ValidationError::NotNumeric(trimmed.to_string()))?;

    if digits.is_empty() {
        return Ok(0);
    }

    let value: Amount = digits
        .parse()
        .map_err(|_| ValidationError::TooLarge(trimmed.to_string()))?;

    if value > MAX_SUM {
        return Err(ValidationError::TooLarge(trimmed.to_string()));
    }

    Ok(value)
}

/// Digits before the decimal point with thousands separators removed,
/// or None if the text is not a plain decimal number
fn whole_part(text: &str) -> Option<String> {
    let (whole, fraction) = match text.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (text, None),
    };

    if whole.is_empty() && fraction.map_or(true, str::is_empty) {
        return None;
    }

    let mut groups = whole.split(',');
    let lead = groups.next().unwrap_or_default();
    let is_digits = |group: &str| group.chars().all(|c| c.is_ascii_digit());
    if !is_digits(lead) {
        return None;
    }

    // "1,500" is a thousands separator; "12,5" or "1,50" is a decimal comma
    let mut digits = lead.to_string();
    for group in groups {
        if lead.is_empty() || lead.len() > 3 || group.len() != 3 || !is_digits(group) {
            return None;
        }
        digits.push_str(group);
    }
    if let Some(fraction) = fraction {
        if !fraction.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
    }

    Some(digits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_integers() {
        assert_eq!(parse_sum("100"), Ok(100));
        assert_eq!(parse_sum("0"), Ok(0));
        assert_eq!(parse_sum("  250 "), Ok(250));
        assert_eq!(parse_sum("+7"), Ok(7));
    }

    #[test]
    fn test_fraction_is_truncated() {
        assert_eq!(parse_sum("12.9"), Ok(12));
        assert_eq!(parse_sum("12."), Ok(12));
        assert_eq!(parse_sum(".5"), Ok(0));
    }

    #[test]
    fn test_thousands_separator() {
        assert_eq!(parse_sum("1,500"), Ok(1500));
        assert_eq!(parse_sum("12,345,678.90"), Ok(12_345_678));
        assert_eq!(
            parse_sum(",500"),
            Err(ValidationError::NotNumeric(",500".to_string()))
        );
    }

    #[test]
    fn test_comma_must_group_thousands() {
        for raw in ["12,5", "1,50", "1,2,3", "1234,567", "1,5000", "1,,500", "1,500,"] {
            assert_eq!(
                parse_sum(raw),
                Err(ValidationError::NotNumeric(raw.to_string())),
                "accepted {raw:?}"
            );
        }
    }

    #[test]
    fn test_negative_zero_is_zero() {
        assert_eq!(parse_sum("-0"), Ok(0));
        assert_eq!(parse_sum("-0.00"), Ok(0));
        assert_eq!(parse_sum("-0.5"), Err(ValidationError::Negative("-0.5".to_string())));
    }

    #[test]
    fn test_rejects_invalid_input() {
        assert_eq!(parse_sum(""), Err(ValidationError::Empty));
        assert_eq!(parse_sum("   "), Err(ValidationError::Empty));
        assert_eq!(parse_sum("abc"), Err(ValidationError::NotNumeric("abc".to_string())));
        assert_eq!(parse_sum("."), Err(ValidationError::NotNumeric(".".to_string())));
        assert_eq!(parse_sum("1.2.3"), Err(ValidationError::NotNumeric("1.2.3".to_string())));
        assert_eq!(parse_sum("-5"), Err(ValidationError::Negative("-5".to_string())));
        assert_eq!(parse_sum("-x"), Err(ValidationError::NotNumeric("-x".to_string())));
    }

    #[test]
    fn test_rejects_values_beyond_storage() {
        let too_big = "99999999999999999999";
        assert_eq!(parse_sum(too_big), Err(ValidationError::TooLarge(too_big.to_string())));

        let just_over = (MAX_SUM as u128 + 1).to_string();
        assert_eq!(parse_sum(&just_over), Err(ValidationError::TooLarge(just_over.clone())));
    }
}
