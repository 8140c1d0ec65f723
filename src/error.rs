//! Error types for xsd-datatypes
//!
//! This module defines the two-tier error taxonomy of the library:
//! [`FacetError`] for malformed type definitions detected at construction
//! time, and [`ValueError`] for content strings that fall outside a type's
//! value space at validation time.

use std::fmt;
use thiserror::Error;

/// Result type alias using the xsd-datatypes Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for xsd-datatypes operations
#[derive(Error, Debug)]
pub enum Error {
    /// A type definition is malformed (bad or inconsistent facets)
    #[error("facet error: {0}")]
    Facet(#[from] FacetError),

    /// A content string is not a legal value of the type
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Unknown or misused type name
    #[error("type error: {0}")]
    Type(String),
}

/// Major code for construction-time (facet) diagnostics
pub const MAJOR_FACET: u16 = 1;
/// Major code for validation-time (value) diagnostics
pub const MAJOR_VALUE: u16 = 2;

/// A locale-independent diagnostic code pair.
///
/// Failures carry this code plus positional arguments; rendering a
/// human-readable string through a message catalog is left to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageCode {
    /// Major code (error family)
    pub major: u16,
    /// Minor code (specific condition)
    pub minor: u16,
}

impl fmt::Display for MessageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Classification of construction-time facet failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacetErrorKind {
    /// Facet name not recognized, or not admitted by the datatype family
    UnknownFacet,
    /// Facet value does not parse in the family's lexical space
    InvalidFacetValue,
    /// Pattern facet failed to compile
    InvalidPattern,
    /// Mutually exclusive facets declared together
    ExclusivePair,
    /// Facets declared on one type contradict each other
    InconsistentFacets,
    /// A derived facet widens the base type's value space
    NotNarrower,
    /// An enumeration literal fails the type's other facets
    InvalidEnumerationMember,
}

impl FacetErrorKind {
    /// Diagnostic code for this kind
    pub fn code(self) -> MessageCode {
        let minor = match self {
            FacetErrorKind::UnknownFacet => 1,
            FacetErrorKind::InvalidFacetValue => 2,
            FacetErrorKind::InvalidPattern => 3,
            FacetErrorKind::ExclusivePair => 4,
            FacetErrorKind::InconsistentFacets => 5,
            FacetErrorKind::NotNarrower => 6,
            FacetErrorKind::InvalidEnumerationMember => 7,
        };
        MessageCode {
            major: MAJOR_FACET,
            minor,
        }
    }
}

/// Construction-time error: the type definition itself is malformed.
///
/// Always fatal to building that one validator; propagated to the schema
/// loader and never retried.
#[derive(Debug, Clone)]
pub struct FacetError {
    /// Error classification
    pub kind: FacetErrorKind,
    /// Error message
    pub message: String,
    /// Name of the offending facet
    pub facet: Option<String>,
    /// The facet value that caused the error
    pub value: Option<String>,
    /// The conflicting value on the base type, if any
    pub base_value: Option<String>,
}

impl FacetError {
    /// Create a new facet error
    pub fn new(kind: FacetErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            facet: None,
            value: None,
            base_value: None,
        }
    }

    /// Set the facet name
    pub fn with_facet(mut self, facet: impl Into<String>) -> Self {
        self.facet = Some(facet.into());
        self
    }

    /// Set the offending facet value
    pub fn with_value(mut self, value: impl fmt::Display) -> Self {
        self.value = Some(value.to_string());
        self
    }

    /// Set the conflicting base-type value
    pub fn with_base_value(mut self, value: impl fmt::Display) -> Self {
        self.base_value = Some(value.to_string());
        self
    }

    /// Diagnostic code for this error
    pub fn code(&self) -> MessageCode {
        self.kind.code()
    }

    /// Positional arguments for message-catalog rendering
    pub fn args(&self) -> Vec<&str> {
        [
            self.facet.as_deref(),
            self.value.as_deref(),
            self.base_value.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

impl fmt::Display for FacetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref facet) = self.facet {
            write!(f, " (facet: {})", facet)?;
        }
        if let Some(ref value) = self.value {
            write!(f, " (value: {})", value)?;
        }
        if let Some(ref base) = self.base_value {
            write!(f, " (base value: {})", base)?;
        }
        Ok(())
    }
}

impl std::error::Error for FacetError {}

/// Classification of validation-time value failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueErrorKind {
    /// Content is not in the lexical space of the primitive
    InvalidLexical,
    /// Content does not match the pattern facet
    PatternMismatch,
    /// Length, minLength or maxLength violated
    LengthOutOfRange,
    /// A min/max bound facet violated, or the comparison was indeterminate
    OutOfBounds,
    /// More significant digits than totalDigits allows
    TooManyTotalDigits,
    /// More fractional digits than fractionDigits allows
    TooManyFractionDigits,
    /// Value equals no member of the enumeration
    NotInEnumeration,
    /// An ID value was already seen in this session
    DuplicateId,
    /// An IDREF was never matched by a declared ID
    DanglingIdRef,
    /// An ENTITY does not name a declared unparsed entity
    UndeclaredEntity,
    /// A union value matched none of the member types
    NoMemberMatched,
}

impl ValueErrorKind {
    /// Diagnostic code for this kind
    pub fn code(self) -> MessageCode {
        let minor = match self {
            ValueErrorKind::InvalidLexical => 1,
            ValueErrorKind::PatternMismatch => 2,
            ValueErrorKind::LengthOutOfRange => 3,
            ValueErrorKind::OutOfBounds => 4,
            ValueErrorKind::TooManyTotalDigits => 5,
            ValueErrorKind::TooManyFractionDigits => 6,
            ValueErrorKind::NotInEnumeration => 7,
            ValueErrorKind::DuplicateId => 8,
            ValueErrorKind::DanglingIdRef => 9,
            ValueErrorKind::UndeclaredEntity => 10,
            ValueErrorKind::NoMemberMatched => 11,
        };
        MessageCode {
            major: MAJOR_VALUE,
            minor,
        }
    }
}

/// Validation-time error: a specific content string is invalid.
///
/// Carries the facet name, the offending value and, where applicable, the
/// comparison bound, so that a precise diagnostic can be produced.
#[derive(Debug, Clone)]
pub struct ValueError {
    /// Error classification
    pub kind: ValueErrorKind,
    /// Error message
    pub message: String,
    /// Name of the facet that was violated
    pub facet: Option<String>,
    /// The offending content
    pub value: Option<String>,
    /// The bound or expectation the content was compared against
    pub bound: Option<String>,
}

impl ValueError {
    /// Create a new value error
    pub fn new(kind: ValueErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            facet: None,
            value: None,
            bound: None,
        }
    }

    /// Set the violated facet name
    pub fn with_facet(mut self, facet: impl Into<String>) -> Self {
        self.facet = Some(facet.into());
        self
    }

    /// Set the offending content
    pub fn with_value(mut self, value: impl fmt::Display) -> Self {
        self.value = Some(value.to_string());
        self
    }

    /// Set the comparison bound
    pub fn with_bound(mut self, bound: impl fmt::Display) -> Self {
        self.bound = Some(bound.to_string());
        self
    }

    /// Diagnostic code for this error
    pub fn code(&self) -> MessageCode {
        self.kind.code()
    }

    /// Positional arguments for message-catalog rendering
    pub fn args(&self) -> Vec<&str> {
        [
            self.facet.as_deref(),
            self.value.as_deref(),
            self.bound.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

impl fmt::Display for ValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref facet) = self.facet {
            write!(f, " (facet: {})", facet)?;
        }
        if let Some(ref value) = self.value {
            write!(f, " (value: {})", value)?;
        }
        if let Some(ref bound) = self.bound {
            write!(f, " (bound: {})", bound)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValueError {}
