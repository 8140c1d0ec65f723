//! Float-family validator
//!
//! Covers xs:float and xs:double. Both reduce to an f64 value space
//! here; the width only changes the parse step. NaN never satisfies a
//! bound facet since its comparisons are indeterminate, but it does
//! equal itself for enumeration membership.

use crate::error::{FacetError, FacetErrorKind, ValueError};
use crate::facets::{
    self, FacetKind, FacetTable, FacetValue, FacetsDefined, WhiteSpace, FLOAT_FACETS,
};
use crate::pattern::Pattern;
use crate::session::Session;
use crate::validators::{
    check_collapse_whitespace, check_exclusive_pairs, check_pattern, enumeration_error, Bounds,
    DatatypeValidator, EffectiveFacets, Family,
};
use crate::values::{FloatValue, FloatWidth};
use std::sync::Arc;

/// Resolved facets of a float-family type, own and inherited.
#[derive(Debug, Clone)]
pub struct FloatFacets {
    pub(crate) width: FloatWidth,
    pub(crate) bounds: Bounds<FloatValue>,
    pub(crate) patterns: Vec<Pattern>,
    pub(crate) enumeration: Option<Vec<FloatValue>>,
}

impl FloatFacets {
    fn mark_defined(&self, defined: &mut FacetsDefined) {
        self.bounds.mark_defined(defined);
        if !self.patterns.is_empty() {
            defined.insert(FacetKind::Pattern);
        }
        if self.enumeration.is_some() {
            defined.insert(FacetKind::Enumeration);
        }
    }
}

fn members_contain(members: &[FloatValue], value: &FloatValue) -> bool {
    members
        .iter()
        .any(|m| value.compare(m).is_equal() || (value.is_nan() && m.is_nan()))
}

/// Validator for xs:float, xs:double and their restrictions.
#[derive(Debug)]
pub struct FloatValidator {
    name: String,
    base: Option<Arc<dyn DatatypeValidator>>,
    facets: FloatFacets,
    defined: FacetsDefined,
}

impl FloatValidator {
    /// The built-in xs:float or xs:double type
    pub fn native(name: impl Into<String>, width: FloatWidth) -> Self {
        let mut defined = FacetsDefined::empty();
        defined.insert(FacetKind::WhiteSpace);
        Self {
            name: name.into(),
            base: None,
            facets: FloatFacets {
                width,
                bounds: Bounds::default(),
                patterns: Vec::new(),
                enumeration: None,
            },
            defined,
        }
    }

    /// Derive a new float type by restriction.
    pub fn derive(
        name: impl Into<String>,
        base: Arc<dyn DatatypeValidator>,
        table: &FacetTable,
    ) -> Result<Self, FacetError> {
        let base_facets = match base.effective_facets() {
            Some(EffectiveFacets::Float(f)) => f.clone(),
            _ => unreachable!("float type derived from a non-float base"),
        };
        let width = base_facets.width;
        let parse = move |s: &str| FloatValue::parse(s, width);

        let mut facets = base_facets.clone();
        let mut own_bounds = Bounds::default();
        let mut declared = FacetsDefined::empty();
        let mut enumeration_literals: Option<&[String]> = None;

        for (facet_name, value) in table.iter() {
            let kind = facets::recognize(facet_name, &FLOAT_FACETS)?;
            declared.insert(kind);
            match kind {
                FacetKind::MinInclusive
                | FacetKind::MinExclusive
                | FacetKind::MaxInclusive
                | FacetKind::MaxExclusive => {
                    own_bounds.apply(kind, facets::single_value(kind, value)?, parse)?;
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
                _ => unreachable!("facet not admitted for the float family: {}", kind),
            }
        }

        check_exclusive_pairs(declared)?;
        own_bounds.check_narrowing(&base_facets.bounds, FloatValue::compare)?;
        facets.bounds.merge_from(&own_bounds);
        facets.bounds.check_consistency(FloatValue::compare)?;

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
                let parsed = parse(literal).map_err(|_| {
                    FacetError::new(
                        FacetErrorKind::InvalidEnumerationMember,
                        "enumeration literal is not in the type's lexical space",
                    )
                    .with_facet(FacetKind::Enumeration.as_str())
                    .with_value(literal)
                })?;
                facets
                    .bounds
                    .check(&parsed, FloatValue::compare)
                    .map_err(|e| {
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

impl DatatypeValidator for FloatValidator {
    fn name(&self) -> &str {
        &self.name
    }

    fn family(&self) -> Family {
        Family::Float
    }

    fn base(&self) -> Option<&Arc<dyn DatatypeValidator>> {
        self.base.as_ref()
    }

    fn facets_defined(&self) -> FacetsDefined {
        self.defined
    }

    fn effective_facets(&self) -> Option<EffectiveFacets<'_>> {
        Some(EffectiveFacets::Float(&self.facets))
    }

    fn validate(&self, content: &str, _session: Option<&mut Session>) -> Result<(), ValueError> {
        let normalized = WhiteSpace::Collapse.normalize(content);
        for pattern in &self.facets.patterns {
            check_pattern(Some(pattern), &normalized)?;
        }
        let value = FloatValue::parse(&normalized, self.facets.width)?;
        self.facets.bounds.check(&value, FloatValue::compare)?;
        if let Some(ref members) = self.facets.enumeration {
            if !members_contain(members, &value) {
                return Err(enumeration_error(&normalized));
            }
        }
        Ok(())
    }
}
