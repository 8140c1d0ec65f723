//! Decimal-family validator
//!
//! Covers xs:decimal and the whole integer ladder derived from it. The
//! digit-count facets work on the canonical value: trailing fractional
//! zeros and leading integer zeros never count.

use crate::error::{FacetError, FacetErrorKind, ValueError, ValueErrorKind};
use crate::facets::{
    self, FacetKind, FacetTable, FacetValue, FacetsDefined, WhiteSpace, DECIMAL_FACETS,
};
use crate::pattern::Pattern;
use crate::session::Session;
use crate::validators::{
    check_collapse_whitespace, check_exclusive_pairs, check_pattern, enumeration_error, Bounds,
    DatatypeValidator, EffectiveFacets, Family,
};
use crate::values::DecimalValue;
use std::sync::Arc;

/// Resolved facets of a decimal-family type, own and inherited.
#[derive(Debug, Clone, Default)]
pub struct DecimalFacets {
    pub(crate) bounds: Bounds<DecimalValue>,
    pub(crate) total_digits: Option<usize>,
    pub(crate) fraction_digits: Option<usize>,
    pub(crate) patterns: Vec<Pattern>,
    pub(crate) enumeration: Option<Vec<DecimalValue>>,
}

impl DecimalFacets {
    fn check_value(&self, value: &DecimalValue) -> Result<(), ValueError> {
        self.bounds.check(value, DecimalValue::compare)?;
        if let Some(total) = self.total_digits {
            if value.precision() as usize > total {
                return Err(ValueError::new(
                    ValueErrorKind::TooManyTotalDigits,
                    "value has more significant digits than totalDigits allows",
                )
                .with_facet(FacetKind::TotalDigits.as_str())
                .with_value(value)
                .with_bound(total));
            }
        }
        if let Some(fraction) = self.fraction_digits {
            if value.scale() as usize > fraction {
                return Err(ValueError::new(
                    ValueErrorKind::TooManyFractionDigits,
                    "value has more fractional digits than fractionDigits allows",
                )
                .with_facet(FacetKind::FractionDigits.as_str())
                .with_value(value)
                .with_bound(fraction));
            }
        }
        Ok(())
    }

    fn mark_defined(&self, defined: &mut FacetsDefined) {
        self.bounds.mark_defined(defined);
        if self.total_digits.is_some() {
            defined.insert(FacetKind::TotalDigits);
        }
        if self.fraction_digits.is_some() {
            defined.insert(FacetKind::FractionDigits);
        }
        if !self.patterns.is_empty() {
            defined.insert(FacetKind::Pattern);
        }
        if self.enumeration.is_some() {
            defined.insert(FacetKind::Enumeration);
        }
    }
}

/// Validator for xs:decimal and its restriction chain.
#[derive(Debug)]
pub struct DecimalValidator {
    name: String,
    base: Option<Arc<dyn DatatypeValidator>>,
    facets: DecimalFacets,
    defined: FacetsDefined,
}

impl DecimalValidator {
    /// The built-in xs:decimal type
    pub fn native(name: impl Into<String>) -> Self {
        let mut defined = FacetsDefined::empty();
        defined.insert(FacetKind::WhiteSpace);
        Self {
            name: name.into(),
            base: None,
            facets: DecimalFacets::default(),
            defined,
        }
    }

    /// Derive a new decimal type by restriction.
    pub fn derive(
        name: impl Into<String>,
        base: Arc<dyn DatatypeValidator>,
        table: &FacetTable,
    ) -> Result<Self, FacetError> {
        let base_facets = match base.effective_facets() {
            Some(EffectiveFacets::Decimal(f)) => f.clone(),
            _ => unreachable!("decimal type derived from a non-decimal base"),
        };

        let mut facets = base_facets.clone();
        let mut own_bounds = Bounds::default();
        let mut declared = FacetsDefined::empty();
        let mut enumeration_literals: Option<&[String]> = None;

        for (facet_name, value) in table.iter() {
            let kind = facets::recognize(facet_name, &DECIMAL_FACETS)?;
            declared.insert(kind);
            match kind {
                FacetKind::MinInclusive
                | FacetKind::MinExclusive
                | FacetKind::MaxInclusive
                | FacetKind::MaxExclusive => {
                    own_bounds.apply(
                        kind,
                        facets::single_value(kind, value)?,
                        DecimalValue::parse,
                    )?;
                }
                FacetKind::TotalDigits => {
                    let count = facets::parse_count(kind, facets::single_value(kind, value)?)?;
                    if count == 0 {
                        return Err(FacetError::new(
                            FacetErrorKind::InvalidFacetValue,
                            "totalDigits must be positive",
                        )
                        .with_facet(kind.as_str()));
                    }
                    facets.total_digits = Some(count);
                }
                FacetKind::FractionDigits => {
                    facets.fraction_digits =
                        Some(facets::parse_count(kind, facets::single_value(kind, value)?)?);
                }
                FacetKind::Pattern => {
                    facets
                        .patterns
                        .push(Pattern::new(facets::single_value(kind, value)?)?);
                }
                FacetKind::Enumeration => match value {
                    FacetValue::Items(items) => enumeration_literals = Some(items),
                    FacetValue::Single(item) => {
                        enumeration_literals = Some(std::slice::from_ref(item))
                    }
                },
                FacetKind::WhiteSpace => {
                    check_collapse_whitespace(facets::single_value(kind, value)?)?;
                }
                _ => unreachable!("facet not admitted for the decimal family: {}", kind),
            }
        }

        check_exclusive_pairs(declared)?;
        own_bounds.check_narrowing(&base_facets.bounds, DecimalValue::compare)?;
        facets.bounds.merge_from(&own_bounds);
        facets.bounds.check_consistency(DecimalValue::compare)?;

        if let (Some(total), Some(fraction)) = (facets.total_digits, facets.fraction_digits) {
            if fraction > total {
                return Err(FacetError::new(
                    FacetErrorKind::InconsistentFacets,
                    "fractionDigits exceeds totalDigits",
                )
                .with_value(fraction)
                .with_base_value(total));
            }
        }
        for (kind, own, inherited) in [
            (FacetKind::TotalDigits, facets.total_digits, base_facets.total_digits),
            (
                FacetKind::FractionDigits,
                facets.fraction_digits,
                base_facets.fraction_digits,
            ),
        ] {
            if let (Some(own), Some(inherited)) = (own, inherited) {
                if own > inherited {
                    return Err(FacetError::new(
                        FacetErrorKind::NotNarrower,
                        "derived digit facet widens the base type",
                    )
                    .with_facet(kind.as_str())
                    .with_value(own)
                    .with_base_value(inherited));
                }
            }
        }

        if let Some(literals) = enumeration_literals {
            let mut members = Vec::with_capacity(literals.len());
            for literal in literals {
                base.validate(literal, None).map_err(|e| {
                    FacetError::new(
                        FacetErrorKind::InvalidEnumerationMember,
                        format!("enumeration literal is not a value of the base type: {}", e),
                    )
                    .with_facet(FacetKind::Enumeration.as_str())
                    .with_value(literal)
                })?;
                let parsed = DecimalValue::parse(literal).map_err(|_| {
                    FacetError::new(
                        FacetErrorKind::InvalidEnumerationMember,
                        "enumeration literal is not a decimal",
                    )
                    .with_facet(FacetKind::Enumeration.as_str())
                    .with_value(literal)
                })?;
                facets.check_value(&parsed).map_err(|e| {
                    FacetError::new(
                        FacetErrorKind::InvalidEnumerationMember,
                        format!("enumeration literal fails the type's facets: {}", e),
                    )
                    .with_facet(FacetKind::Enumeration.as_str())
                    .with_value(literal)
                })?;
                members.push(parsed);
            }
            facets.enumeration = Some(members);
        }

        let mut defined = base.facets_defined();
        facets.mark_defined(&mut defined);

        Ok(Self {
            name: name.into(),
            base: Some(base),
            facets,
            defined,
        })
    }
}

impl DatatypeValidator for DecimalValidator {
    fn name(&self) -> &str {
        &self.name
    }

    fn family(&self) -> Family {
        Family::Decimal
    }

    fn base(&self) -> Option<&Arc<dyn DatatypeValidator>> {
        self.base.as_ref()
    }

    fn facets_defined(&self) -> FacetsDefined {
        self.defined
    }

    fn effective_facets(&self) -> Option<EffectiveFacets<'_>> {
        Some(EffectiveFacets::Decimal(&self.facets))
    }

    fn validate(&self, content: &str, _session: Option<&mut Session>) -> Result<(), ValueError> {
        let normalized = WhiteSpace::Collapse.normalize(content);
        for pattern in &self.facets.patterns {
            check_pattern(Some(pattern), &normalized)?;
        }
        let value = DecimalValue::parse(&normalized)?;
        self.facets.check_value(&value)?;
        if let Some(ref members) = self.facets.enumeration {
            if !members.iter().any(|m| value.compare(m).is_equal()) {
                return Err(enumeration_error(&normalized));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decimal_type() -> Arc<dyn DatatypeValidator> {
        Arc::new(DecimalValidator::native("decimal"))
    }

    fn integer_type() -> Arc<dyn DatatypeValidator> {
        let table = FacetTable::new()
            .set("fractionDigits", "0")
            .set("pattern", r"[\-+]?[0-9]+");
        Arc::new(DecimalValidator::derive("integer", decimal_type(), &table).unwrap())
    }

    #[test]
    fn test_decimal_lexicals() {
        let d = decimal_type();
        for ok in ["3.14", "-3.14", "+0.5", "42", " 42 ", ".5", "5."] {
            assert!(d.validate(ok, None).is_ok(), "{:?}", ok);
        }
        for bad in ["1e10", "abc", "", "1.2.3"] {
            assert!(d.validate(bad, None).is_err(), "{:?}", bad);
        }
    }

    #[test]
    fn test_integer_rejects_fractions() {
        let i = integer_type();
        assert!(i.validate("42", None).is_ok());
        assert!(i.validate("-7", None).is_ok());
        assert!(i.validate("3.5", None).is_err());
        // value space is integral but the lexical form still carries a point
        assert!(i.validate("3.0", None).is_err());
    }

    #[test]
    fn test_whitespace_fixed_at_collapse() {
        let table = FacetTable::new().set("whiteSpace", "collapse");
        assert!(DecimalValidator::derive("ok", decimal_type(), &table).is_ok());

        let table = FacetTable::new().set("whiteSpace", "preserve");
        let err = DecimalValidator::derive("bad", decimal_type(), &table).unwrap_err();
        assert_eq!(err.kind, FacetErrorKind::InvalidFacetValue);
    }

    #[test]
    fn test_bounds() {
        let table = FacetTable::new()
            .set("minInclusive", "0")
            .set("maxInclusive", "100");
        let pct = DecimalValidator::derive("percent", integer_type(), &table).unwrap();
        assert!(pct.validate("0", None).is_ok());
        assert!(pct.validate("100", None).is_ok());
        assert_eq!(
            pct.validate("-1", None).unwrap_err().kind,
            ValueErrorKind::OutOfBounds
        );
        assert!(pct.validate("101", None).is_err());
    }

    #[test]
    fn test_positive_integer_scenario() {
        let non_negative = Arc::new(
            DecimalValidator::derive(
                "nonNegativeInteger",
                integer_type(),
                &FacetTable::new().set("minInclusive", "0"),
            )
            .unwrap(),
        );
        let positive = DecimalValidator::derive(
            "positiveInteger",
            non_negative,
            &FacetTable::new().set("minInclusive", "1"),
        )
        .unwrap();

        assert!(positive.validate("1", None).is_ok());
        assert_eq!(
            positive.validate("0", None).unwrap_err().kind,
            ValueErrorKind::OutOfBounds
        );
        assert!(positive.validate("-5", None).is_err());
        assert!(positive.validate("3.5", None).is_err());
    }

    #[test]
    fn test_total_digits() {
        let table = FacetTable::new().set("totalDigits", "3");
        let small = DecimalValidator::derive("small", decimal_type(), &table).unwrap();
        assert!(small.validate("123", None).is_ok());
        assert!(small.validate("1.23", None).is_ok());
        // canonical form drops trailing zeros before counting
        assert!(small.validate("123.000", None).is_ok());
        assert_eq!(
            small.validate("1234", None).unwrap_err().kind,
            ValueErrorKind::TooManyTotalDigits
        );
        assert!(small.validate("1.234", None).is_err());
    }

    #[test]
    fn test_fraction_digits() {
        let table = FacetTable::new().set("fractionDigits", "2");
        let money = DecimalValidator::derive("money", decimal_type(), &table).unwrap();
        assert!(money.validate("10.99", None).is_ok());
        assert!(money.validate("10.990", None).is_ok());
        assert_eq!(
            money.validate("10.999", None).unwrap_err().kind,
            ValueErrorKind::TooManyFractionDigits
        );
    }

    #[test]
    fn test_value_space_enumeration() {
        let table = FacetTable::new().enumeration(["1", "2.5", "10"]);
        let levels = DecimalValidator::derive("levels", decimal_type(), &table).unwrap();
        // membership is by value, not lexical form
        assert!(levels.validate("2.50", None).is_ok());
        assert!(levels.validate("01", None).is_ok());
        assert_eq!(
            levels.validate("3", None).unwrap_err().kind,
            ValueErrorKind::NotInEnumeration
        );
    }

    #[test]
    fn test_exclusive_pair_rejected() {
        let table = FacetTable::new()
            .set("minInclusive", "0")
            .set("minExclusive", "0");
        let err = DecimalValidator::derive("bad", decimal_type(), &table).unwrap_err();
        assert_eq!(err.kind, FacetErrorKind::ExclusivePair);
    }

    #[test]
    fn test_bound_narrowing_rejected() {
        let base = Arc::new(
            DecimalValidator::derive(
                "base",
                decimal_type(),
                &FacetTable::new().set("maxInclusive", "100"),
            )
            .unwrap(),
        );
        let err = DecimalValidator::derive(
            "wider",
            base,
            &FacetTable::new().set("maxInclusive", "200"),
        )
        .unwrap_err();
        assert_eq!(err.kind, FacetErrorKind::NotNarrower);
    }

    #[test]
    fn test_inconsistent_bounds_rejected() {
        let table = FacetTable::new()
            .set("minInclusive", "10")
            .set("maxInclusive", "1");
        let err = DecimalValidator::derive("bad", decimal_type(), &table).unwrap_err();
        assert_eq!(err.kind, FacetErrorKind::InconsistentFacets);
    }

    #[test]
    fn test_exclusive_bound_replaces_inherited_inclusive() {
        let base = Arc::new(
            DecimalValidator::derive(
                "nonNegative",
                decimal_type(),
                &FacetTable::new().set("minInclusive", "0"),
            )
            .unwrap(),
        );
        let positive = DecimalValidator::derive(
            "positive",
            base,
            &FacetTable::new().set("minExclusive", "0"),
        )
        .unwrap();
        assert!(positive.validate("0.001", None).is_ok());
        assert!(positive.validate("0", None).is_err());
    }
}
