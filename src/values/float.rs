//! Float and double values
//!
//! Handles the three reserved lexical tokens `INF`, `-INF` and `NaN` and
//! carries the NaN rule: NaN never equals anything (itself included) and
//! never orders against a bound.

use crate::error::{ValueError, ValueErrorKind};
use crate::values::ValueOrder;
use std::fmt;

/// Lexical width of the floating type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatWidth {
    /// xs:float (32-bit)
    Single,
    /// xs:double (64-bit)
    Double,
}

/// A parsed xs:float or xs:double value
#[derive(Debug, Clone, Copy)]
pub struct FloatValue(f64);

impl FloatValue {
    /// Parse a lexical float/double, mapping the reserved tokens to the
    /// type's infinities and NaN. Single-width values are parsed as f32
    /// and widened so float and double bounds compare consistently.
    pub fn parse(lexical: &str, width: FloatWidth) -> Result<Self, ValueError> {
        let trimmed = lexical.trim();
        let value = match trimmed {
            "INF" => f64::INFINITY,
            "-INF" => f64::NEG_INFINITY,
            "NaN" => f64::NAN,
            _ => {
                let parsed = match width {
                    FloatWidth::Single => trimmed.parse::<f32>().map(f64::from),
                    FloatWidth::Double => trimmed.parse::<f64>(),
                };
                match parsed {
                    // INF is a reserved token, not an overflow result
                    Ok(v) if v.is_finite() => v,
                    _ => return Err(Self::lexical_error(lexical, width)),
                }
            }
        };
        Ok(Self(value))
    }

    fn lexical_error(lexical: &str, width: FloatWidth) -> ValueError {
        let name = match width {
            FloatWidth::Single => "xs:float",
            FloatWidth::Double => "xs:double",
        };
        ValueError::new(
            ValueErrorKind::InvalidLexical,
            format!("value is not a valid {}", name),
        )
        .with_value(lexical)
    }

    /// The underlying value
    pub fn get(&self) -> f64 {
        self.0
    }

    /// Whether this value is NaN
    pub fn is_nan(&self) -> bool {
        self.0.is_nan()
    }

    /// Partial order: any comparison involving NaN is indeterminate.
    pub fn compare(&self, other: &Self) -> ValueOrder {
        match self.0.partial_cmp(&other.0) {
            Some(ord) => ValueOrder::from_ordering(ord),
            None => ValueOrder::Indeterminate,
        }
    }
}

impl fmt::Display for FloatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_nan() {
            write!(f, "NaN")
        } else if self.0 == f64::INFINITY {
            write!(f, "INF")
        } else if self.0 == f64::NEG_INFINITY {
            write!(f, "-INF")
        } else {
            write!(f, "{}", self.0)
        }
    }
}
