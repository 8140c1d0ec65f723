//! Arbitrary-precision decimal values
//!
//! Wraps `rust_decimal::Decimal` with the scale and precision queries the
//! digit-count facets need. Both queries work on the normalized value, so
//! trailing-zero formatting does not change the answer.

use crate::error::{ValueError, ValueErrorKind};
use crate::values::ValueOrder;
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

/// A parsed xs:decimal value
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DecimalValue(Decimal);

impl DecimalValue {
    /// Parse a lexical decimal, rejecting exponent notation and anything
    /// else outside the xs:decimal lexical space.
    pub fn parse(lexical: &str) -> Result<Self, ValueError> {
        let trimmed = lexical.trim();
        if trimmed.contains(['e', 'E']) || !trimmed.chars().any(|c| c.is_ascii_digit()) {
            return Err(Self::lexical_error(lexical));
        }
        Decimal::from_str(&pad_point(trimmed))
            .map(Self)
            .map_err(|_| Self::lexical_error(lexical))
    }

    fn lexical_error(lexical: &str) -> ValueError {
        ValueError::new(
            ValueErrorKind::InvalidLexical,
            "value is not a valid xs:decimal",
        )
        .with_value(lexical)
    }

    /// Number of fractional digits, ignoring trailing zeros
    pub fn scale(&self) -> u32 {
        self.0.normalize().scale()
    }

    /// Number of significant digits: integer digits without leading
    /// zeros plus fractional digits without trailing zeros. Zero counts
    /// as one digit.
    pub fn precision(&self) -> u32 {
        let rendered = self.0.normalize().to_string();
        let unsigned = rendered.trim_start_matches('-');
        let (int_part, frac_part) = match unsigned.split_once('.') {
            Some((i, f)) => (i, f),
            None => (unsigned, ""),
        };
        let count = int_part.trim_start_matches('0').len() + frac_part.len();
        count.max(1) as u32
    }

    /// Whether the value has no fractional part
    pub fn is_integral(&self) -> bool {
        self.scale() == 0
    }

    /// Total order over decimals
    pub fn compare(&self, other: &Self) -> ValueOrder {
        ValueOrder::from_ordering(self.0.cmp(&other.0))
    }
}

/// xs:decimal allows a bare leading or trailing point (".5", "5.");
/// pad with zeros before handing the string to the numeric parser.
fn pad_point(s: &str) -> std::borrow::Cow<'_, str> {
    let unsigned = s.strip_prefix(['+', '-']).unwrap_or(s);
    let needs_leading = unsigned.starts_with('.');
    let needs_trailing = s.ends_with('.');
    if !needs_leading && !needs_trailing {
        return std::borrow::Cow::Borrowed(s);
    }
    let sign_len = s.len() - unsigned.len();
    let mut out = String::with_capacity(s.len() + 2);
    out.push_str(&s[..sign_len]);
    if needs_leading {
        out.push('0');
    }
    out.push_str(unsigned);
    if needs_trailing {
        out.push('0');
    }
    std::borrow::Cow::Owned(out)
}

impl fmt::Display for DecimalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert!(DecimalValue::parse("123").is_ok());
        assert!(DecimalValue::parse("123.456").is_ok());
        assert!(DecimalValue::parse("-123.456").is_ok());
        assert!(DecimalValue::parse("+5").is_ok());
        assert!(DecimalValue::parse(" 7 ").is_ok());
        assert!(DecimalValue::parse("abc").is_err());
        assert!(DecimalValue::parse("").is_err());
        assert!(DecimalValue::parse("1e2").is_err());
    }

    #[test]
    fn test_scale_ignores_trailing_zeros() {
        assert_eq!(DecimalValue::parse("1.200").unwrap().scale(), 1);
        assert_eq!(DecimalValue::parse("1.23").unwrap().scale(), 2);
        assert_eq!(DecimalValue::parse("42").unwrap().scale(), 0);
        assert_eq!(DecimalValue::parse("42.000").unwrap().scale(), 0);
    }

    #[test]
    fn test_precision() {
        assert_eq!(DecimalValue::parse("123.45").unwrap().precision(), 5);
        assert_eq!(DecimalValue::parse("123.450").unwrap().precision(), 5);
        assert_eq!(DecimalValue::parse("-0.5").unwrap().precision(), 1);
        assert_eq!(DecimalValue::parse("0.05").unwrap().precision(), 2);
        assert_eq!(DecimalValue::parse("0").unwrap().precision(), 1);
    }

    #[test]
    fn test_is_integral() {
        assert!(DecimalValue::parse("5").unwrap().is_integral());
        assert!(DecimalValue::parse("5.000").unwrap().is_integral());
        assert!(!DecimalValue::parse("3.5").unwrap().is_integral());
    }

    #[test]
    fn test_compare() {
        let one = DecimalValue::parse("1").unwrap();
        let one_dot = DecimalValue::parse("1.0").unwrap();
        let two = DecimalValue::parse("2").unwrap();
        assert_eq!(one.compare(&one_dot), ValueOrder::Equal);
        assert_eq!(one.compare(&two), ValueOrder::Less);
        assert_eq!(two.compare(&one), ValueOrder::Greater);
    }

    #[test]
    fn test_64bit_range_edges() {
        assert!(DecimalValue::parse("-9223372036854775808").is_ok());
        assert!(DecimalValue::parse("18446744073709551615").is_ok());
    }
}
