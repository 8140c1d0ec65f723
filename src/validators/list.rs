//! List-derivation validator
//!
//! A list type splits its collapsed content on whitespace and validates
//! each token against the item type. Length facets count tokens, not
//! characters; the empty string is an empty list.

use crate::error::{FacetError, FacetErrorKind, ValueError};
use crate::facets::{
    self, FacetKind, FacetTable, FacetValue, FacetsDefined, WhiteSpace, LIST_FACETS,
};
use crate::pattern::Pattern;
use crate::session::Session;
use crate::validators::{
    check_collapse_whitespace, check_pattern, enumeration_error, DatatypeValidator,
    EffectiveFacets, Family, LengthFacets,
};
use std::sync::Arc;

/// Resolved facets of a list type, own and inherited.
#[derive(Debug, Clone, Default)]
pub struct ListFacets {
    pub(crate) lengths: LengthFacets,
    pub(crate) patterns: Vec<Pattern>,
    pub(crate) enumeration: Option<Vec<String>>,
}

impl ListFacets {
    fn mark_defined(&self, defined: &mut FacetsDefined) {
        self.lengths.mark_defined(defined);
        if !self.patterns.is_empty() {
            defined.insert(FacetKind::Pattern);
        }
        if self.enumeration.is_some() {
            defined.insert(FacetKind::Enumeration);
        }
    }
}

/// Validator for types derived by list.
#[derive(Debug)]
pub struct ListValidator {
    name: String,
    item: Arc<dyn DatatypeValidator>,
    base: Option<Arc<dyn DatatypeValidator>>,
    facets: ListFacets,
    defined: FacetsDefined,
}

impl ListValidator {
    /// A new list type over the given item type.
    pub fn new(name: impl Into<String>, item: Arc<dyn DatatypeValidator>) -> Self {
        let mut defined = FacetsDefined::empty();
        defined.insert(FacetKind::WhiteSpace);
        Self {
            name: name.into(),
            item,
            base: None,
            facets: ListFacets::default(),
            defined,
        }
    }

    /// Restrict an existing list type with facets over the token
    /// sequence.
    pub fn restrict(
        name: impl Into<String>,
        base: Arc<dyn DatatypeValidator>,
        table: &FacetTable,
    ) -> Result<Self, FacetError> {
        let base_facets = match base.effective_facets() {
            Some(EffectiveFacets::List(f)) => f.clone(),
            _ => unreachable!("list restriction of a non-list base"),
        };
        let item = Arc::clone(
            base.item_type()
                .unwrap_or_else(|| unreachable!("list base without an item type")),
        );

        let mut facets = base_facets.clone();
        let mut own_lengths = LengthFacets::default();
        let mut enumeration_literals: Option<&[String]> = None;

        for (facet_name, value) in table.iter() {
            let kind = facets::recognize(facet_name, &LIST_FACETS)?;
            match kind {
                FacetKind::Length => {
                    own_lengths.length =
                        Some(facets::parse_count(kind, facets::single_value(kind, value)?)?);
                }
                FacetKind::MinLength => {
                    own_lengths.min_length =
                        Some(facets::parse_count(kind, facets::single_value(kind, value)?)?);
                }
                FacetKind::MaxLength => {
                    own_lengths.max_length =
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
                _ => unreachable!("facet not admitted for list types: {}", kind),
            }
        }

        own_lengths.check_narrowing(&base_facets.lengths)?;
        if own_lengths.length.is_some() {
            facets.lengths.length = own_lengths.length;
        }
        if own_lengths.min_length.is_some() {
            facets.lengths.min_length = own_lengths.min_length;
        }
        if own_lengths.max_length.is_some() {
            facets.lengths.max_length = own_lengths.max_length;
        }
        facets.lengths.check_consistency()?;

        // Enumeration literals are whole list values; each must be valid
        // against the base list type.
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
                let normalized = WhiteSpace::Collapse.normalize(literal);
                let token_count = normalized.split_whitespace().count();
                facets.lengths.check(token_count, &normalized).map_err(|e| {
                    FacetError::new(
                        FacetErrorKind::InvalidEnumerationMember,
                        format!("enumeration literal fails the type's facets: {}", e),
                    )
                    .with_facet(FacetKind::Enumeration.as_str())
                    .with_value(literal)
                })?;
                members.push(normalized);
            }
            facets.enumeration = Some(members);
        }

        let mut defined = base.facets_defined();
        facets.mark_defined(&mut defined);

        Ok(Self {
            name: name.into(),
            item,
            base: Some(base),
            facets,
            defined,
        })
    }
}

impl DatatypeValidator for ListValidator {
    fn name(&self) -> &str {
        &self.name
    }

    fn family(&self) -> Family {
        Family::List
    }

    fn base(&self) -> Option<&Arc<dyn DatatypeValidator>> {
        self.base.as_ref()
    }

    fn facets_defined(&self) -> FacetsDefined {
        self.defined
    }

    fn effective_facets(&self) -> Option<EffectiveFacets<'_>> {
        Some(EffectiveFacets::List(&self.facets))
    }

    fn derived_by_list(&self) -> bool {
        true
    }

    fn item_type(&self) -> Option<&Arc<dyn DatatypeValidator>> {
        Some(&self.item)
    }

    fn validate(&self, content: &str, mut session: Option<&mut Session>) -> Result<(), ValueError> {
        let normalized = WhiteSpace::Collapse.normalize(content);
        for pattern in &self.facets.patterns {
            check_pattern(Some(pattern), &normalized)?;
        }
        let tokens: Vec<&str> = normalized.split_whitespace().collect();
        self.facets.lengths.check(tokens.len(), &normalized)?;
        for token in &tokens {
            self.item.validate(token, session.as_deref_mut())?;
        }
        if let Some(ref members) = self.facets.enumeration {
            if !members.iter().any(|m| *m == normalized) {
                return Err(enumeration_error(&normalized));
            }
        }
        Ok(())
    }
}
