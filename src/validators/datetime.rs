//! Date/time-family validator
//!
//! One validator covers every calendar grain plus xs:duration; the grain
//! is fixed at construction and drives the primitive parser. Bound
//! facets go through the partial order of the value space, so a bound
//! with a timezone can never be satisfied by a value without one.

use crate::error::{FacetError, FacetErrorKind, ValueError};
use crate::facets::{
    self, FacetKind, FacetTable, FacetValue, FacetsDefined, WhiteSpace, DATETIME_FACETS,
};
use crate::pattern::Pattern;
use crate::session::Session;
use crate::validators::{
    check_collapse_whitespace, check_exclusive_pairs, check_pattern, enumeration_error, Bounds,
    DatatypeValidator, EffectiveFacets, Family,
};
use crate::values::{CalendarGrain, DateTimeValue};
use std::sync::Arc;

/// Resolved facets of a date/time-family type, own and inherited.
#[derive(Debug, Clone)]
pub struct DateTimeFacets {
    pub(crate) grain: CalendarGrain,
    pub(crate) bounds: Bounds<DateTimeValue>,
    pub(crate) patterns: Vec<Pattern>,
    pub(crate) enumeration: Option<Vec<DateTimeValue>>,
    pub(crate) duration: Option<DateTimeValue>,
    pub(crate) period: Option<DateTimeValue>,
}

impl DateTimeFacets {
    fn mark_defined(&self, defined: &mut FacetsDefined) {
        self.bounds.mark_defined(defined);
        if !self.patterns.is_empty() {
            defined.insert(FacetKind::Pattern);
        }
        if self.enumeration.is_some() {
            defined.insert(FacetKind::Enumeration);
        }
        if self.duration.is_some() {
            defined.insert(FacetKind::Duration);
        }
        if self.period.is_some() {
            defined.insert(FacetKind::Period);
        }
    }
}

/// Validator for the calendar grains and xs:duration.
#[derive(Debug)]
pub struct DateTimeValidator {
    name: String,
    base: Option<Arc<dyn DatatypeValidator>>,
    facets: DateTimeFacets,
    defined: FacetsDefined,
}

impl DateTimeValidator {
    /// A built-in date/time type of the given grain
    pub fn native(name: impl Into<String>, grain: CalendarGrain) -> Self {
        let mut defined = FacetsDefined::empty();
        defined.insert(FacetKind::WhiteSpace);
        Self {
            name: name.into(),
            base: None,
            facets: DateTimeFacets {
                grain,
                bounds: Bounds::default(),
                patterns: Vec::new(),
                enumeration: None,
                duration: None,
                period: None,
            },
            defined,
        }
    }

    /// Derive a new date/time type by restriction.
    pub fn derive(
        name: impl Into<String>,
        base: Arc<dyn DatatypeValidator>,
        table: &FacetTable,
    ) -> Result<Self, FacetError> {
        let base_facets = match base.effective_facets() {
            Some(EffectiveFacets::DateTime(f)) => f.clone(),
            _ => unreachable!("date/time type derived from a non-calendar base"),
        };
        let grain = base_facets.grain;
        let parse = move |s: &str| DateTimeValue::parse(s, grain);

        let mut facets = base_facets.clone();
        let mut own_bounds = Bounds::default();
        let mut declared = FacetsDefined::empty();
        let mut enumeration_literals: Option<&[String]> = None;

        for (facet_name, value) in table.iter() {
            let kind = facets::recognize(facet_name, &DATETIME_FACETS)?;
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
                FacetKind::Duration => {
                    facets.duration = Some(parse_duration_facet(kind, value)?);
                }
                FacetKind::Period => {
                    facets.period = Some(parse_duration_facet(kind, value)?);
                }
                FacetKind::WhiteSpace => {
                    check_collapse_whitespace(facets::single_value(kind, value)?)?;
                }
                _ => unreachable!("facet not admitted for the date/time family: {}", kind),
            }
        }

        check_exclusive_pairs(declared)?;
        own_bounds.check_narrowing(&base_facets.bounds, DateTimeValue::compare)?;
        facets.bounds.merge_from(&own_bounds);
        facets.bounds.check_consistency(DateTimeValue::compare)?;

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
                    .check(&parsed, DateTimeValue::compare)
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

fn parse_duration_facet(kind: FacetKind, value: &FacetValue) -> Result<DateTimeValue, FacetError> {
    let lexical = facets::single_value(kind, value)?;
    DateTimeValue::parse(lexical, CalendarGrain::Duration).map_err(|_| {
        FacetError::new(
            FacetErrorKind::InvalidFacetValue,
            "facet value is not a valid duration",
        )
        .with_facet(kind.as_str())
        .with_value(lexical)
    })
}

impl DatatypeValidator for DateTimeValidator {
    fn name(&self) -> &str {
        &self.name
    }

    fn family(&self) -> Family {
        Family::DateTime
    }

    fn base(&self) -> Option<&Arc<dyn DatatypeValidator>> {
        self.base.as_ref()
    }

    fn facets_defined(&self) -> FacetsDefined {
        self.defined
    }

    fn effective_facets(&self) -> Option<EffectiveFacets<'_>> {
        Some(EffectiveFacets::DateTime(&self.facets))
    }

    fn validate(&self, content: &str, _session: Option<&mut Session>) -> Result<(), ValueError> {
        let normalized = WhiteSpace::Collapse.normalize(content);
        for pattern in &self.facets.patterns {
            check_pattern(Some(pattern), &normalized)?;
        }
        let value = DateTimeValue::parse(&normalized, self.facets.grain)?;
        self.facets.bounds.check(&value, DateTimeValue::compare)?;
        if let Some(ref members) = self.facets.enumeration {
            if !members.iter().any(|m| value.compare(m).is_equal()) {
                return Err(enumeration_error(&normalized));
            }
        }
        Ok(())
    }
}
