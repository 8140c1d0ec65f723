//! Union-derivation validator
//!
//! A union tries its member types in declaration order and accepts the
//! first match. Trial runs are side-effect free; only the winning member
//! sees the session, so a failed trial never records identity state.

use crate::error::{FacetError, FacetErrorKind, ValueError, ValueErrorKind};
use crate::facets::{
    self, FacetKind, FacetTable, FacetValue, FacetsDefined, WhiteSpace, UNION_FACETS,
};
use crate::pattern::Pattern;
use crate::session::Session;
use crate::validators::{
    check_collapse_whitespace, check_pattern, enumeration_error, DatatypeValidator,
    EffectiveFacets, Family,
};
use std::sync::Arc;

/// Resolved facets of a union type, own and inherited.
#[derive(Debug, Clone, Default)]
pub struct UnionFacets {
    pub(crate) members: Vec<Arc<dyn DatatypeValidator>>,
    pub(crate) patterns: Vec<Pattern>,
    pub(crate) enumeration: Option<Vec<String>>,
}

impl UnionFacets {
    fn mark_defined(&self, defined: &mut FacetsDefined) {
        if !self.patterns.is_empty() {
            defined.insert(FacetKind::Pattern);
        }
        if self.enumeration.is_some() {
            defined.insert(FacetKind::Enumeration);
        }
    }
}

/// Validator for types derived by union.
#[derive(Debug)]
pub struct UnionValidator {
    name: String,
    base: Option<Arc<dyn DatatypeValidator>>,
    facets: UnionFacets,
    defined: FacetsDefined,
}

impl UnionValidator {
    /// A new union over the given member types, tried in order.
    pub fn new(name: impl Into<String>, members: Vec<Arc<dyn DatatypeValidator>>) -> Self {
        assert!(!members.is_empty(), "union type with no members");
        let mut defined = FacetsDefined::empty();
        defined.insert(FacetKind::WhiteSpace);
        Self {
            name: name.into(),
            base: None,
            facets: UnionFacets {
                members,
                patterns: Vec::new(),
                enumeration: None,
            },
            defined,
        }
    }

    /// Restrict an existing union with pattern and enumeration facets.
    pub fn restrict(
        name: impl Into<String>,
        base: Arc<dyn DatatypeValidator>,
        table: &FacetTable,
    ) -> Result<Self, FacetError> {
        let base_facets = match base.effective_facets() {
            Some(EffectiveFacets::Union(f)) => f.clone(),
            _ => unreachable!("union restriction of a non-union base"),
        };

        let mut facets = base_facets.clone();
        let mut enumeration_literals: Option<&[String]> = None;

        for (facet_name, value) in table.iter() {
            let kind = facets::recognize(facet_name, &UNION_FACETS)?;
            match kind {
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
                _ => unreachable!("facet not admitted for union types: {}", kind),
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
                members.push(WhiteSpace::Collapse.normalize(literal));
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

impl DatatypeValidator for UnionValidator {
    fn name(&self) -> &str {
        &self.name
    }

    fn family(&self) -> Family {
        Family::Union
    }

    fn base(&self) -> Option<&Arc<dyn DatatypeValidator>> {
        self.base.as_ref()
    }

    fn facets_defined(&self) -> FacetsDefined {
        self.defined
    }

    fn effective_facets(&self) -> Option<EffectiveFacets<'_>> {
        Some(EffectiveFacets::Union(&self.facets))
    }

    fn validate(&self, content: &str, session: Option<&mut Session>) -> Result<(), ValueError> {
        let normalized = WhiteSpace::Collapse.normalize(content);
        for pattern in &self.facets.patterns {
            check_pattern(Some(pattern), &normalized)?;
        }
        if let Some(ref members) = self.facets.enumeration {
            if !members.iter().any(|m| *m == normalized) {
                return Err(enumeration_error(&normalized));
            }
        }
        // dry trial first: a member that ultimately loses must not have
        // touched the session
        for member in &self.facets.members {
            if member.validate(content, None).is_ok() {
                return member.validate(content, session);
            }
        }
        Err(ValueError::new(
            ValueErrorKind::NoMemberMatched,
            "value matches no member type of the union",
        )
        .with_value(&normalized))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::decimal::DecimalValidator;
    use crate::validators::identity::IdValidator;
    use crate::validators::names;
    use crate::validators::string::StringValidator;

    fn decimal_type() -> Arc<dyn DatatypeValidator> {
        Arc::new(DecimalValidator::native("decimal"))
    }

    fn token_type() -> Arc<dyn DatatypeValidator> {
        Arc::new(StringValidator::native(
            "token",
            None,
            WhiteSpace::Collapse,
            Some(names::check_token as _),
        ))
    }

    #[test]
    fn test_first_member_wins() {
        let u = UnionValidator::new("number-or-word", vec![decimal_type(), token_type()]);
        assert!(u.validate("42", None).is_ok());
        assert!(u.validate("word", None).is_ok());
    }

    #[test]
    fn test_no_member_matched() {
        let u = UnionValidator::new("numbers", vec![decimal_type()]);
        let err = u.validate("not-a-number", None).unwrap_err();
        assert_eq!(err.kind, ValueErrorKind::NoMemberMatched);
    }

    #[test]
    fn test_losing_trial_leaves_no_session_state() {
        let ncname = Arc::new(StringValidator::native(
            "NCName",
            None,
            WhiteSpace::Collapse,
            Some(names::check_ncname as _),
        ));
        let id: Arc<dyn DatatypeValidator> = Arc::new(IdValidator::new("ID", ncname));
        let u = UnionValidator::new("number-or-id", vec![decimal_type(), Arc::clone(&id)]);

        let mut session = Session::new();
        // "42" matches decimal; the ID member never records anything
        u.validate("42", Some(&mut session)).unwrap();
        assert!(id.validate("42x", Some(&mut session)).is_ok());

        // the winning ID member does record
        u.validate("anchor", Some(&mut session)).unwrap();
        assert_eq!(
            u.validate("anchor", Some(&mut session)).unwrap_err().kind,
            ValueErrorKind::DuplicateId
        );
    }

    #[test]
    fn test_union_enumeration() {
        let base: Arc<dyn DatatypeValidator> = Arc::new(UnionValidator::new(
            "any",
            vec![decimal_type(), token_type()],
        ));
        let table = FacetTable::new().enumeration(["1", "one"]);
        let u = UnionValidator::restrict("one-ish", base, &table).unwrap();
        assert!(u.validate("1", None).is_ok());
        assert!(u.validate("one", None).is_ok());
        assert_eq!(
            u.validate("2", None).unwrap_err().kind,
            ValueErrorKind::NotInEnumeration
        );
    }
}
