//! Facet-checking validators for the XSD datatype families
//!
//! Every simple type is represented by a validator implementing
//! [`DatatypeValidator`]. Validators form restriction chains through
//! `Arc` references to their base type; facet values are resolved at
//! construction time into per-family effective-facet structs, so
//! validation never re-parses facet lexicals.

pub mod binary;
pub mod boolean;
pub mod datetime;
pub mod decimal;
pub mod float;
pub mod identity;
pub mod list;
pub mod names;
pub mod string;
pub mod union;

pub use binary::{BinaryFacets, BinaryValidator};
pub use boolean::BooleanValidator;
pub use datetime::{DateTimeFacets, DateTimeValidator};
pub use decimal::{DecimalFacets, DecimalValidator};
pub use float::{FloatFacets, FloatValidator};
pub use identity::{EntityValidator, IdRefValidator, IdValidator};
pub use list::{ListFacets, ListValidator};
pub use string::{StringFacets, StringValidator};
pub use union::{UnionFacets, UnionValidator};

use crate::error::{FacetError, FacetErrorKind, ValueError, ValueErrorKind};
use crate::facets::{FacetKind, FacetsDefined, WhiteSpace};
use crate::session::Session;
use crate::values::ValueOrder;
use std::fmt;
use std::sync::Arc;

/// Datatype family a validator belongs to.
///
/// The family decides which facets are admitted and how restriction
/// facets are resolved when a new type is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    /// string and its derived name types
    String,
    /// boolean
    Boolean,
    /// decimal and the integer ladder
    Decimal,
    /// float and double
    Float,
    /// date/time grains and duration
    DateTime,
    /// hexBinary and base64Binary
    Binary,
    /// list derivations
    List,
    /// union derivations
    Union,
}

/// Session-backed identity semantics a type carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityKind {
    /// Document-unique identifier (xs:ID)
    Id,
    /// Reference that must resolve to an ID (xs:IDREF)
    IdRef,
    /// Name of a declared unparsed entity (xs:ENTITY)
    Entity,
}

/// Tagged borrow of a validator's resolved facets.
///
/// Derivation reads the base type's effective facets through this view
/// instead of downcasting the trait object. A family mismatch between a
/// base and its derivation is a construction bug, not a runtime error.
pub enum EffectiveFacets<'a> {
    /// String-family facets
    String(&'a StringFacets),
    /// Decimal-family facets
    Decimal(&'a DecimalFacets),
    /// Float-family facets
    Float(&'a FloatFacets),
    /// Date/time-family facets
    DateTime(&'a DateTimeFacets),
    /// Binary-family facets
    Binary(&'a BinaryFacets),
    /// List facets
    List(&'a ListFacets),
    /// Union facets
    Union(&'a UnionFacets),
}

/// A compiled simple-type validator.
///
/// Implementations are immutable once built and shared through
/// `Arc<dyn DatatypeValidator>`; all mutable validation state lives in
/// the caller-owned [`Session`].
pub trait DatatypeValidator: Send + Sync + std::fmt::Debug {
    /// The type's name
    fn name(&self) -> &str;

    /// The datatype family
    fn family(&self) -> Family;

    /// The base type in the restriction chain, if any
    fn base(&self) -> Option<&Arc<dyn DatatypeValidator>>;

    /// Facets with a concrete effective value, own or inherited
    fn facets_defined(&self) -> FacetsDefined;

    /// Effective white-space normalization mode
    fn whitespace(&self) -> WhiteSpace {
        WhiteSpace::Collapse
    }

    /// Resolved facets for derivation
    fn effective_facets(&self) -> Option<EffectiveFacets<'_>> {
        None
    }

    /// Whether the type is a list derivation
    fn derived_by_list(&self) -> bool {
        false
    }

    /// Item type of a list derivation
    fn item_type(&self) -> Option<&Arc<dyn DatatypeValidator>> {
        None
    }

    /// Identity semantics the type carries, if any. Restrictions of an
    /// identity type keep them.
    fn identity_kind(&self) -> Option<IdentityKind> {
        None
    }

    /// Check one content string against the type.
    ///
    /// `session` threads identity state (ID, IDREF, ENTITY) through the
    /// call; types without identity semantics ignore it. Without a
    /// session, identity types check lexical form only and record
    /// nothing.
    fn validate(&self, content: &str, session: Option<&mut Session>) -> Result<(), ValueError>;
}

// ---------------------------------------------------------------------------
// Shared facet machinery
// ---------------------------------------------------------------------------

/// Resolved min/max bound facets over an ordered value space.
///
/// At most one lower and one upper bound is live at a time; declaring an
/// exclusive bound on a derivation step replaces an inherited inclusive
/// one in the same direction, and vice versa.
#[derive(Debug, Clone)]
pub(crate) struct Bounds<T> {
    pub min_inclusive: Option<T>,
    pub min_exclusive: Option<T>,
    pub max_inclusive: Option<T>,
    pub max_exclusive: Option<T>,
}

impl<T> Default for Bounds<T> {
    fn default() -> Self {
        Self {
            min_inclusive: None,
            min_exclusive: None,
            max_inclusive: None,
            max_exclusive: None,
        }
    }
}

impl<T: fmt::Display> Bounds<T> {
    /// Install a bound parsed from a facet lexical, displacing the
    /// opposite-inclusivity bound in the same direction.
    pub(crate) fn apply(
        &mut self,
        kind: FacetKind,
        lexical: &str,
        parse: impl Fn(&str) -> Result<T, ValueError>,
    ) -> Result<(), FacetError> {
        let value = parse(lexical).map_err(|_| {
            FacetError::new(
                FacetErrorKind::InvalidFacetValue,
                "bound facet value is not in the type's lexical space",
            )
            .with_facet(kind.as_str())
            .with_value(lexical)
        })?;
        match kind {
            FacetKind::MinInclusive => {
                self.min_exclusive = None;
                self.min_inclusive = Some(value);
            }
            FacetKind::MinExclusive => {
                self.min_inclusive = None;
                self.min_exclusive = Some(value);
            }
            FacetKind::MaxInclusive => {
                self.max_exclusive = None;
                self.max_inclusive = Some(value);
            }
            FacetKind::MaxExclusive => {
                self.max_inclusive = None;
                self.max_exclusive = Some(value);
            }
            _ => unreachable!("not a bound facet: {}", kind),
        }
        Ok(())
    }

    /// Overlay bounds declared on a derivation step onto inherited ones,
    /// with the same displacement rules as [`Bounds::apply`].
    pub(crate) fn merge_from(&mut self, own: &Bounds<T>)
    where
        T: Clone,
    {
        if let Some(v) = &own.min_inclusive {
            self.min_exclusive = None;
            self.min_inclusive = Some(v.clone());
        }
        if let Some(v) = &own.min_exclusive {
            self.min_inclusive = None;
            self.min_exclusive = Some(v.clone());
        }
        if let Some(v) = &own.max_inclusive {
            self.max_exclusive = None;
            self.max_inclusive = Some(v.clone());
        }
        if let Some(v) = &own.max_exclusive {
            self.max_inclusive = None;
            self.max_exclusive = Some(v.clone());
        }
    }

    /// Mark live bounds in a defined-facets mask
    pub(crate) fn mark_defined(&self, defined: &mut FacetsDefined) {
        if self.min_inclusive.is_some() {
            defined.insert(FacetKind::MinInclusive);
        }
        if self.min_exclusive.is_some() {
            defined.insert(FacetKind::MinExclusive);
        }
        if self.max_inclusive.is_some() {
            defined.insert(FacetKind::MaxInclusive);
        }
        if self.max_exclusive.is_some() {
            defined.insert(FacetKind::MaxExclusive);
        }
    }

    /// Check a parsed value against the live bounds.
    ///
    /// An indeterminate comparison fails the bound: a value that cannot
    /// be placed relative to a bound is not known to satisfy it.
    pub(crate) fn check(
        &self,
        value: &T,
        cmp: impl Fn(&T, &T) -> ValueOrder,
    ) -> Result<(), ValueError> {
        let violation = |kind: FacetKind, bound: &T| {
            ValueError::new(ValueErrorKind::OutOfBounds, "value is outside the facet bound")
                .with_facet(kind.as_str())
                .with_value(value)
                .with_bound(bound)
        };
        if let Some(bound) = &self.min_inclusive {
            match cmp(value, bound) {
                ValueOrder::Greater | ValueOrder::Equal => {}
                _ => return Err(violation(FacetKind::MinInclusive, bound)),
            }
        }
        if let Some(bound) = &self.min_exclusive {
            match cmp(value, bound) {
                ValueOrder::Greater => {}
                _ => return Err(violation(FacetKind::MinExclusive, bound)),
            }
        }
        if let Some(bound) = &self.max_inclusive {
            match cmp(value, bound) {
                ValueOrder::Less | ValueOrder::Equal => {}
                _ => return Err(violation(FacetKind::MaxInclusive, bound)),
            }
        }
        if let Some(bound) = &self.max_exclusive {
            match cmp(value, bound) {
                ValueOrder::Less => {}
                _ => return Err(violation(FacetKind::MaxExclusive, bound)),
            }
        }
        Ok(())
    }

    /// Construction-time sanity: the live lower bound must not exceed
    /// the live upper bound.
    pub(crate) fn check_consistency(
        &self,
        cmp: impl Fn(&T, &T) -> ValueOrder,
    ) -> Result<(), FacetError> {
        let lower = self.min_inclusive.as_ref().or(self.min_exclusive.as_ref());
        let upper = self.max_inclusive.as_ref().or(self.max_exclusive.as_ref());
        if let (Some(lo), Some(hi)) = (lower, upper) {
            if cmp(lo, hi) == ValueOrder::Greater {
                return Err(FacetError::new(
                    FacetErrorKind::InconsistentFacets,
                    "lower bound exceeds upper bound",
                )
                .with_value(lo)
                .with_base_value(hi));
            }
        }
        Ok(())
    }

    /// Every bound declared on a derivation step must lie within the
    /// closed hull of the base type's bounds.
    pub(crate) fn check_narrowing(
        &self,
        base: &Bounds<T>,
        cmp: impl Fn(&T, &T) -> ValueOrder,
    ) -> Result<(), FacetError> {
        let own = [
            (FacetKind::MinInclusive, self.min_inclusive.as_ref()),
            (FacetKind::MinExclusive, self.min_exclusive.as_ref()),
            (FacetKind::MaxInclusive, self.max_inclusive.as_ref()),
            (FacetKind::MaxExclusive, self.max_exclusive.as_ref()),
        ];
        let base_lower = base.min_inclusive.as_ref().or(base.min_exclusive.as_ref());
        let base_upper = base.max_inclusive.as_ref().or(base.max_exclusive.as_ref());
        for (kind, value) in own {
            let Some(value) = value else { continue };
            if let Some(lo) = base_lower {
                if matches!(cmp(value, lo), ValueOrder::Less | ValueOrder::Indeterminate) {
                    return Err(not_narrower(kind, value, lo));
                }
            }
            if let Some(hi) = base_upper {
                if matches!(cmp(value, hi), ValueOrder::Greater | ValueOrder::Indeterminate) {
                    return Err(not_narrower(kind, value, hi));
                }
            }
        }
        Ok(())
    }
}

fn not_narrower<T: fmt::Display>(kind: FacetKind, value: &T, base: &T) -> FacetError {
    FacetError::new(
        FacetErrorKind::NotNarrower,
        "derived bound falls outside the base type's bounds",
    )
    .with_facet(kind.as_str())
    .with_value(value)
    .with_base_value(base)
}

/// Parse a whiteSpace facet value for a family whose processing is
/// fixed at collapse. Restating "collapse" is allowed, anything looser
/// is rejected.
pub(crate) fn check_collapse_whitespace(lexical: &str) -> Result<(), FacetError> {
    if WhiteSpace::from_lexical(lexical)? != WhiteSpace::Collapse {
        return Err(FacetError::new(
            FacetErrorKind::InvalidFacetValue,
            "whiteSpace is fixed at collapse for this type",
        )
        .with_facet(FacetKind::WhiteSpace.as_str())
        .with_value(lexical));
    }
    Ok(())
}

/// Reject inclusive and exclusive bounds declared together on one
/// derivation step.
pub(crate) fn check_exclusive_pairs(declared: FacetsDefined) -> Result<(), FacetError> {
    for (a, b) in [
        (FacetKind::MinInclusive, FacetKind::MinExclusive),
        (FacetKind::MaxInclusive, FacetKind::MaxExclusive),
    ] {
        if declared.contains(a) && declared.contains(b) {
            return Err(FacetError::new(
                FacetErrorKind::ExclusivePair,
                "inclusive and exclusive bounds are mutually exclusive",
            )
            .with_facet(a.as_str())
            .with_base_value(b.as_str()));
        }
    }
    Ok(())
}

/// Resolved length facets (characters, bytes or list items).
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct LengthFacets {
    pub length: Option<usize>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
}

impl LengthFacets {
    pub(crate) fn mark_defined(&self, defined: &mut FacetsDefined) {
        if self.length.is_some() {
            defined.insert(FacetKind::Length);
        }
        if self.min_length.is_some() {
            defined.insert(FacetKind::MinLength);
        }
        if self.max_length.is_some() {
            defined.insert(FacetKind::MaxLength);
        }
    }

    pub(crate) fn check_consistency(&self) -> Result<(), FacetError> {
        if let (Some(min), Some(max)) = (self.min_length, self.max_length) {
            if min > max {
                return Err(FacetError::new(
                    FacetErrorKind::InconsistentFacets,
                    "minLength exceeds maxLength",
                )
                .with_value(min)
                .with_base_value(max));
            }
        }
        // An exact length leaves no room for a range; the facets are
        // mutually exclusive even when inherited from the base.
        if self.length.is_some() {
            for (kind, range) in [
                (FacetKind::MinLength, self.min_length),
                (FacetKind::MaxLength, self.max_length),
            ] {
                if range.is_some() {
                    return Err(FacetError::new(
                        FacetErrorKind::InconsistentFacets,
                        "length cannot be combined with a length range",
                    )
                    .with_facet(FacetKind::Length.as_str())
                    .with_base_value(kind.as_str()));
                }
            }
        }
        Ok(())
    }

    pub(crate) fn check_narrowing(&self, base: &LengthFacets) -> Result<(), FacetError> {
        let widens = |kind: FacetKind, own: usize, base_value: usize| {
            FacetError::new(
                FacetErrorKind::NotNarrower,
                "derived length facet widens the base type",
            )
            .with_facet(kind.as_str())
            .with_value(own)
            .with_base_value(base_value)
        };
        if let (Some(own), Some(inherited)) = (self.length, base.length) {
            if own != inherited {
                return Err(widens(FacetKind::Length, own, inherited));
            }
        }
        if let (Some(own), Some(inherited)) = (self.min_length, base.min_length) {
            if own < inherited {
                return Err(widens(FacetKind::MinLength, own, inherited));
            }
        }
        if let (Some(own), Some(inherited)) = (self.max_length, base.max_length) {
            if own > inherited {
                return Err(widens(FacetKind::MaxLength, own, inherited));
            }
        }
        Ok(())
    }

    /// Check a measured length against the live length facets.
    pub(crate) fn check(&self, count: usize, content: &str) -> Result<(), ValueError> {
        let violation = |kind: FacetKind, bound: usize| {
            ValueError::new(
                ValueErrorKind::LengthOutOfRange,
                "length is outside the facet bound",
            )
            .with_facet(kind.as_str())
            .with_value(content)
            .with_bound(bound)
        };
        if let Some(len) = self.length {
            if count != len {
                return Err(violation(FacetKind::Length, len));
            }
        }
        if let Some(min) = self.min_length {
            if count < min {
                return Err(violation(FacetKind::MinLength, min));
            }
        }
        if let Some(max) = self.max_length {
            if count > max {
                return Err(violation(FacetKind::MaxLength, max));
            }
        }
        Ok(())
    }
}

/// Check a normalized value against an optional pattern facet.
pub(crate) fn check_pattern(
    pattern: Option<&crate::pattern::Pattern>,
    content: &str,
) -> Result<(), ValueError> {
    if let Some(p) = pattern {
        if !p.matches(content) {
            return Err(ValueError::new(
                ValueErrorKind::PatternMismatch,
                "value does not match the pattern facet",
            )
            .with_facet(FacetKind::Pattern.as_str())
            .with_value(content)
            .with_bound(p.source()));
        }
    }
    Ok(())
}

/// Failure for values outside an enumeration.
pub(crate) fn enumeration_error(content: &str) -> ValueError {
    ValueError::new(
        ValueErrorKind::NotInEnumeration,
        "value is not a member of the enumeration",
    )
    .with_facet(FacetKind::Enumeration.as_str())
    .with_value(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::DecimalValue;

    fn dec(s: &str) -> DecimalValue {
        DecimalValue::parse(s).unwrap()
    }

    #[test]
    fn test_bounds_check() {
        let mut bounds = Bounds::default();
        bounds
            .apply(FacetKind::MinInclusive, "1", DecimalValue::parse)
            .unwrap();
        bounds
            .apply(FacetKind::MaxExclusive, "10", DecimalValue::parse)
            .unwrap();

        assert!(bounds.check(&dec("1"), DecimalValue::compare).is_ok());
        assert!(bounds.check(&dec("9.99"), DecimalValue::compare).is_ok());

        let err = bounds.check(&dec("0"), DecimalValue::compare).unwrap_err();
        assert_eq!(err.kind, ValueErrorKind::OutOfBounds);
        assert_eq!(err.facet.as_deref(), Some("minInclusive"));

        let err = bounds.check(&dec("10"), DecimalValue::compare).unwrap_err();
        assert_eq!(err.facet.as_deref(), Some("maxExclusive"));
    }

    #[test]
    fn test_bound_replaces_opposite_inclusivity() {
        let mut bounds = Bounds::default();
        bounds
            .apply(FacetKind::MinInclusive, "0", DecimalValue::parse)
            .unwrap();
        bounds
            .apply(FacetKind::MinExclusive, "0", DecimalValue::parse)
            .unwrap();
        assert!(bounds.min_inclusive.is_none());
        assert!(bounds.check(&dec("0"), DecimalValue::compare).is_err());
    }

    #[test]
    fn test_bounds_consistency() {
        let mut bounds = Bounds::default();
        bounds
            .apply(FacetKind::MinInclusive, "10", DecimalValue::parse)
            .unwrap();
        bounds
            .apply(FacetKind::MaxInclusive, "1", DecimalValue::parse)
            .unwrap();
        let err = bounds.check_consistency(DecimalValue::compare).unwrap_err();
        assert_eq!(err.kind, FacetErrorKind::InconsistentFacets);
    }

    #[test]
    fn test_bounds_narrowing() {
        let mut base = Bounds::default();
        base.apply(FacetKind::MinInclusive, "0", DecimalValue::parse)
            .unwrap();
        base.apply(FacetKind::MaxInclusive, "100", DecimalValue::parse)
            .unwrap();

        let mut ok = Bounds::default();
        ok.apply(FacetKind::MinInclusive, "10", DecimalValue::parse)
            .unwrap();
        assert!(ok.check_narrowing(&base, DecimalValue::compare).is_ok());

        let mut widening = Bounds::default();
        widening
            .apply(FacetKind::MaxInclusive, "200", DecimalValue::parse)
            .unwrap();
        let err = widening
            .check_narrowing(&base, DecimalValue::compare)
            .unwrap_err();
        assert_eq!(err.kind, FacetErrorKind::NotNarrower);
    }

    #[test]
    fn test_exclusive_pairs() {
        let mut declared = FacetsDefined::empty();
        declared.insert(FacetKind::MinInclusive);
        assert!(check_exclusive_pairs(declared).is_ok());
        declared.insert(FacetKind::MinExclusive);
        let err = check_exclusive_pairs(declared).unwrap_err();
        assert_eq!(err.kind, FacetErrorKind::ExclusivePair);
    }

    #[test]
    fn test_length_facets() {
        let facets = LengthFacets {
            length: None,
            min_length: Some(2),
            max_length: Some(4),
        };
        assert!(facets.check_consistency().is_ok());
        assert!(facets.check(3, "abc").is_ok());
        assert_eq!(
            facets.check(1, "a").unwrap_err().kind,
            ValueErrorKind::LengthOutOfRange
        );
        assert_eq!(
            facets.check(5, "abcde").unwrap_err().facet.as_deref(),
            Some("maxLength")
        );
    }

    #[test]
    fn test_length_excludes_length_range() {
        let facets = LengthFacets {
            length: Some(3),
            min_length: None,
            max_length: Some(5),
        };
        let err = facets.check_consistency().unwrap_err();
        assert_eq!(err.kind, FacetErrorKind::InconsistentFacets);

        let facets = LengthFacets {
            length: Some(3),
            min_length: Some(1),
            max_length: None,
        };
        assert!(facets.check_consistency().is_err());
    }

    #[test]
    fn test_length_narrowing() {
        let base = LengthFacets {
            length: None,
            min_length: Some(2),
            max_length: Some(8),
        };
        let narrower = LengthFacets {
            length: None,
            min_length: Some(3),
            max_length: Some(6),
        };
        assert!(narrower.check_narrowing(&base).is_ok());

        let wider = LengthFacets {
            length: None,
            min_length: Some(1),
            max_length: None,
        };
        assert_eq!(
            wider.check_narrowing(&base).unwrap_err().kind,
            FacetErrorKind::NotNarrower
        );
    }
}
