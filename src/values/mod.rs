//! Primitive value parsers
//!
//! Each submodule turns a lexical string into an internal comparable
//! representation for one datatype family, or fails with a lexical-space
//! error.

pub mod binary;
pub mod datetime;
pub mod decimal;
pub mod float;

pub use binary::{decoded_length, BinaryEncoding};
pub use datetime::{CalendarGrain, DateTimeValue, Timezone};
pub use decimal::DecimalValue;
pub use float::{FloatValue, FloatWidth};

use std::cmp::Ordering;

/// Outcome of comparing two values of one datatype family.
///
/// Date/time values with insufficient timezone information, and any
/// comparison touching NaN, order as [`ValueOrder::Indeterminate`]: not
/// equal, not less, not greater. Bounds checks treat an indeterminate
/// comparison as a constraint violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueOrder {
    /// Left is less than right
    Less,
    /// Values are equal
    Equal,
    /// Left is greater than right
    Greater,
    /// The pair cannot be ordered
    Indeterminate,
}

impl ValueOrder {
    /// Lift a total ordering into a value order
    pub fn from_ordering(ord: Ordering) -> Self {
        match ord {
            Ordering::Less => ValueOrder::Less,
            Ordering::Equal => ValueOrder::Equal,
            Ordering::Greater => ValueOrder::Greater,
        }
    }

    /// Whether this outcome means definite equality
    pub fn is_equal(self) -> bool {
        self == ValueOrder::Equal
    }
}
