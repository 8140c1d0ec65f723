//! XSD constraining-facet vocabulary
//!
//! This module defines the fixed facet vocabulary, the raw facet table
//! handed over by the schema loader, the per-type bitmask of defined
//! facets, and white-space normalization modes.

use crate::error::{FacetError, FacetErrorKind};
use indexmap::IndexMap;
use std::collections::HashSet;
use std::fmt;

/// The fixed vocabulary of constraining facets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FacetKind {
    /// Exact length (characters, bytes or list items)
    Length,
    /// Minimum length
    MinLength,
    /// Maximum length
    MaxLength,
    /// Regular-expression pattern
    Pattern,
    /// Fixed set of allowed values
    Enumeration,
    /// Inclusive upper bound
    MaxInclusive,
    /// Exclusive upper bound
    MaxExclusive,
    /// Inclusive lower bound
    MinInclusive,
    /// Exclusive lower bound
    MinExclusive,
    /// Maximum number of significant digits
    TotalDigits,
    /// Maximum number of fractional digits
    FractionDigits,
    /// Binary encoding selector (hex or base64)
    Encoding,
    /// White-space normalization policy
    WhiteSpace,
    /// Recurring-duration span
    Duration,
    /// Recurring-duration period
    Period,
}

impl FacetKind {
    /// The canonical facet name
    pub fn as_str(self) -> &'static str {
        match self {
            FacetKind::Length => "length",
            FacetKind::MinLength => "minLength",
            FacetKind::MaxLength => "maxLength",
            FacetKind::Pattern => "pattern",
            FacetKind::Enumeration => "enumeration",
            FacetKind::MaxInclusive => "maxInclusive",
            FacetKind::MaxExclusive => "maxExclusive",
            FacetKind::MinInclusive => "minInclusive",
            FacetKind::MinExclusive => "minExclusive",
            FacetKind::TotalDigits => "totalDigits",
            FacetKind::FractionDigits => "fractionDigits",
            FacetKind::Encoding => "encoding",
            FacetKind::WhiteSpace => "whiteSpace",
            FacetKind::Duration => "duration",
            FacetKind::Period => "period",
        }
    }

    /// Parse a facet name, accepting the legacy aliases `precision`
    /// (totalDigits) and `scale` (fractionDigits).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "length" => Some(FacetKind::Length),
            "minLength" => Some(FacetKind::MinLength),
            "maxLength" => Some(FacetKind::MaxLength),
            "pattern" => Some(FacetKind::Pattern),
            "enumeration" => Some(FacetKind::Enumeration),
            "maxInclusive" => Some(FacetKind::MaxInclusive),
            "maxExclusive" => Some(FacetKind::MaxExclusive),
            "minInclusive" => Some(FacetKind::MinInclusive),
            "minExclusive" => Some(FacetKind::MinExclusive),
            "totalDigits" | "precision" => Some(FacetKind::TotalDigits),
            "fractionDigits" | "scale" => Some(FacetKind::FractionDigits),
            "encoding" => Some(FacetKind::Encoding),
            "whiteSpace" => Some(FacetKind::WhiteSpace),
            "duration" => Some(FacetKind::Duration),
            "period" => Some(FacetKind::Period),
            _ => None,
        }
    }

    fn bit(self) -> u16 {
        match self {
            FacetKind::Length => 1 << 0,
            FacetKind::MinLength => 1 << 1,
            FacetKind::MaxLength => 1 << 2,
            FacetKind::Pattern => 1 << 3,
            FacetKind::Enumeration => 1 << 4,
            FacetKind::MaxInclusive => 1 << 5,
            FacetKind::MaxExclusive => 1 << 6,
            FacetKind::MinInclusive => 1 << 7,
            FacetKind::MinExclusive => 1 << 8,
            FacetKind::TotalDigits => 1 << 9,
            FacetKind::FractionDigits => 1 << 10,
            FacetKind::Encoding => 1 << 11,
            FacetKind::WhiteSpace => 1 << 12,
            FacetKind::Duration => 1 << 13,
            FacetKind::Period => 1 << 14,
        }
    }
}

impl fmt::Display for FacetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Bitmask of facets that have a concrete effective value on a validator,
/// own or inherited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FacetsDefined(u16);

impl FacetsDefined {
    /// The empty mask
    pub fn empty() -> Self {
        Self(0)
    }

    /// Mark a facet as defined
    pub fn insert(&mut self, kind: FacetKind) {
        self.0 |= kind.bit();
    }

    /// Whether a facet is defined
    pub fn contains(self, kind: FacetKind) -> bool {
        self.0 & kind.bit() != 0
    }

    /// Whether no facet is defined
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Union with another mask
    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

/// Raw value of one facet in a facet table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FacetValue {
    /// A single lexical value
    Single(String),
    /// An ordered list of lexical values (enumeration)
    Items(Vec<String>),
}

/// Immutable facet-name to lexical-value mapping supplied by the schema
/// loader when deriving a type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FacetTable {
    entries: IndexMap<String, FacetValue>,
}

impl FacetTable {
    /// Create an empty facet table
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a single-valued facet (builder style)
    pub fn set(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries
            .insert(name.into(), FacetValue::Single(value.into()));
        self
    }

    /// Set the enumeration facet (builder style)
    pub fn enumeration<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entries.insert(
            "enumeration".to_string(),
            FacetValue::Items(values.into_iter().map(Into::into).collect()),
        );
        self
    }

    /// Look up a facet by name
    pub fn get(&self, name: &str) -> Option<&FacetValue> {
        self.entries.get(name)
    }

    /// Iterate entries in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FacetValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// White space handling modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhiteSpace {
    /// Preserve all white space
    Preserve,
    /// Replace tabs and newlines with spaces
    Replace,
    /// Replace and collapse multiple spaces
    Collapse,
}

impl WhiteSpace {
    /// Parse from a facet value
    pub fn from_lexical(s: &str) -> Result<Self, FacetError> {
        match s {
            "preserve" => Ok(WhiteSpace::Preserve),
            "replace" => Ok(WhiteSpace::Replace),
            "collapse" => Ok(WhiteSpace::Collapse),
            _ => Err(FacetError::new(
                FacetErrorKind::InvalidFacetValue,
                "whiteSpace must be 'preserve', 'replace', or 'collapse'",
            )
            .with_facet(FacetKind::WhiteSpace.as_str())
            .with_value(s)),
        }
    }

    /// Normalize a string according to this white space mode
    pub fn normalize(&self, s: &str) -> String {
        match self {
            WhiteSpace::Preserve => s.to_string(),
            WhiteSpace::Replace => s.replace(['\t', '\n', '\r'], " "),
            WhiteSpace::Collapse => {
                let replaced = s.replace(['\t', '\n', '\r'], " ");
                let mut result = String::new();
                let mut prev_space = true; // Start with true to trim leading spaces

                for c in replaced.chars() {
                    if c == ' ' {
                        if !prev_space {
                            result.push(' ');
                            prev_space = true;
                        }
                    } else {
                        result.push(c);
                        prev_space = false;
                    }
                }

                result.trim_end().to_string()
            }
        }
    }
}

lazy_static::lazy_static! {
    /// Facets admitted for string-like types
    pub static ref STRING_FACETS: HashSet<FacetKind> = {
        let mut s = HashSet::new();
        s.insert(FacetKind::Length);
        s.insert(FacetKind::MinLength);
        s.insert(FacetKind::MaxLength);
        s.insert(FacetKind::Pattern);
        s.insert(FacetKind::Enumeration);
        s.insert(FacetKind::WhiteSpace);
        s
    };

    /// Facets admitted for the boolean type
    pub static ref BOOLEAN_FACETS: HashSet<FacetKind> = {
        let mut s = HashSet::new();
        s.insert(FacetKind::Pattern);
        s.insert(FacetKind::WhiteSpace);
        s
    };

    /// Facets admitted for decimal-family types
    pub static ref DECIMAL_FACETS: HashSet<FacetKind> = {
        let mut s = HashSet::new();
        s.insert(FacetKind::TotalDigits);
        s.insert(FacetKind::FractionDigits);
        s.insert(FacetKind::Pattern);
        s.insert(FacetKind::Enumeration);
        s.insert(FacetKind::WhiteSpace);
        s.insert(FacetKind::MaxInclusive);
        s.insert(FacetKind::MaxExclusive);
        s.insert(FacetKind::MinInclusive);
        s.insert(FacetKind::MinExclusive);
        s
    };

    /// Facets admitted for float/double types
    pub static ref FLOAT_FACETS: HashSet<FacetKind> = {
        let mut s = HashSet::new();
        s.insert(FacetKind::Pattern);
        s.insert(FacetKind::Enumeration);
        s.insert(FacetKind::WhiteSpace);
        s.insert(FacetKind::MaxInclusive);
        s.insert(FacetKind::MaxExclusive);
        s.insert(FacetKind::MinInclusive);
        s.insert(FacetKind::MinExclusive);
        s
    };

    /// Facets admitted for date/time and duration types
    pub static ref DATETIME_FACETS: HashSet<FacetKind> = {
        let mut s = HashSet::new();
        s.insert(FacetKind::Pattern);
        s.insert(FacetKind::Enumeration);
        s.insert(FacetKind::WhiteSpace);
        s.insert(FacetKind::MaxInclusive);
        s.insert(FacetKind::MaxExclusive);
        s.insert(FacetKind::MinInclusive);
        s.insert(FacetKind::MinExclusive);
        s.insert(FacetKind::Duration);
        s.insert(FacetKind::Period);
        s
    };

    /// Facets admitted for binary types
    pub static ref BINARY_FACETS: HashSet<FacetKind> = {
        let mut s = HashSet::new();
        s.insert(FacetKind::Length);
        s.insert(FacetKind::MinLength);
        s.insert(FacetKind::MaxLength);
        s.insert(FacetKind::Pattern);
        s.insert(FacetKind::Enumeration);
        s.insert(FacetKind::Encoding);
        s.insert(FacetKind::WhiteSpace);
        s
    };

    /// Facets admitted on a list derivation (over the token sequence)
    pub static ref LIST_FACETS: HashSet<FacetKind> = {
        let mut s = HashSet::new();
        s.insert(FacetKind::Length);
        s.insert(FacetKind::MinLength);
        s.insert(FacetKind::MaxLength);
        s.insert(FacetKind::Pattern);
        s.insert(FacetKind::Enumeration);
        s.insert(FacetKind::WhiteSpace);
        s
    };

    /// Facets admitted on a union derivation
    pub static ref UNION_FACETS: HashSet<FacetKind> = {
        let mut s = HashSet::new();
        s.insert(FacetKind::Pattern);
        s.insert(FacetKind::Enumeration);
        s.insert(FacetKind::WhiteSpace);
        s
    };
}

/// Recognize a facet key or fail, then check the family admits it.
pub(crate) fn recognize(
    name: &str,
    admitted: &HashSet<FacetKind>,
) -> Result<FacetKind, FacetError> {
    let kind = FacetKind::from_name(name).ok_or_else(|| {
        FacetError::new(FacetErrorKind::UnknownFacet, "unrecognized facet").with_facet(name)
    })?;
    if !admitted.contains(&kind) {
        return Err(FacetError::new(
            FacetErrorKind::UnknownFacet,
            "facet is not admitted by this datatype family",
        )
        .with_facet(name));
    }
    Ok(kind)
}

/// Extract the single lexical value of a facet entry.
pub(crate) fn single_value<'a>(
    kind: FacetKind,
    value: &'a FacetValue,
) -> Result<&'a str, FacetError> {
    match value {
        FacetValue::Single(s) => Ok(s),
        FacetValue::Items(_) => Err(FacetError::new(
            FacetErrorKind::InvalidFacetValue,
            "facet takes a single value, not a list",
        )
        .with_facet(kind.as_str())),
    }
}

/// Parse a non-negative integer facet value (length facets, digit counts).
pub(crate) fn parse_count(kind: FacetKind, lexical: &str) -> Result<usize, FacetError> {
    lexical.trim().parse::<usize>().map_err(|_| {
        FacetError::new(
            FacetErrorKind::InvalidFacetValue,
            "facet value must be a non-negative integer",
        )
        .with_facet(kind.as_str())
        .with_value(lexical)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facet_name_round_trip() {
        for kind in [
            FacetKind::Length,
            FacetKind::MinLength,
            FacetKind::MaxLength,
            FacetKind::Pattern,
            FacetKind::Enumeration,
            FacetKind::MaxInclusive,
            FacetKind::MaxExclusive,
            FacetKind::MinInclusive,
            FacetKind::MinExclusive,
            FacetKind::TotalDigits,
            FacetKind::FractionDigits,
            FacetKind::Encoding,
            FacetKind::WhiteSpace,
            FacetKind::Duration,
            FacetKind::Period,
        ] {
            assert_eq!(FacetKind::from_name(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn test_facet_name_aliases() {
        assert_eq!(FacetKind::from_name("precision"), Some(FacetKind::TotalDigits));
        assert_eq!(FacetKind::from_name("scale"), Some(FacetKind::FractionDigits));
        assert_eq!(FacetKind::from_name("bogus"), None);
    }

    #[test]
    fn test_facets_defined_mask() {
        let mut mask = FacetsDefined::empty();
        assert!(mask.is_empty());
        mask.insert(FacetKind::MinInclusive);
        mask.insert(FacetKind::Pattern);
        assert!(mask.contains(FacetKind::MinInclusive));
        assert!(mask.contains(FacetKind::Pattern));
        assert!(!mask.contains(FacetKind::MaxInclusive));

        let mut other = FacetsDefined::empty();
        other.insert(FacetKind::MaxInclusive);
        let merged = mask.union(other);
        assert!(merged.contains(FacetKind::MinInclusive));
        assert!(merged.contains(FacetKind::MaxInclusive));
    }

    #[test]
    fn test_facet_table_builder() {
        let table = FacetTable::new()
            .set("minInclusive", "1")
            .enumeration(["a", "b"]);
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.get("minInclusive"),
            Some(&FacetValue::Single("1".to_string()))
        );
        assert!(matches!(table.get("enumeration"), Some(FacetValue::Items(v)) if v.len() == 2));
    }

    #[test]
    fn test_whitespace_modes() {
        assert_eq!(WhiteSpace::from_lexical("preserve").unwrap(), WhiteSpace::Preserve);
        assert_eq!(WhiteSpace::from_lexical("replace").unwrap(), WhiteSpace::Replace);
        assert_eq!(WhiteSpace::from_lexical("collapse").unwrap(), WhiteSpace::Collapse);
        assert!(WhiteSpace::from_lexical("invalid").is_err());
    }

    #[test]
    fn test_whitespace_normalize() {
        let text = "  hello\t\nworld  ";

        assert_eq!(WhiteSpace::Preserve.normalize(text), text);
        assert_eq!(WhiteSpace::Replace.normalize(text), "  hello  world  ");
        assert_eq!(WhiteSpace::Collapse.normalize(text), "hello world");
    }

    #[test]
    fn test_recognize_admitted() {
        assert!(recognize("minInclusive", &DECIMAL_FACETS).is_ok());
        assert!(recognize("minInclusive", &STRING_FACETS).is_err());
        assert!(recognize("bogus", &STRING_FACETS).is_err());
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count(FacetKind::Length, "12").unwrap(), 12);
        assert!(parse_count(FacetKind::Length, "-1").is_err());
        assert!(parse_count(FacetKind::Length, "abc").is_err());
    }
}
