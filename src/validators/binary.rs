//! Binary-family validator
//!
//! Covers xs:hexBinary and xs:base64Binary. Length facets count decoded
//! bytes, not lexical characters, and enumeration membership compares
//! canonical forms (case-folded hex, space-stripped base64).

use crate::error::{FacetError, FacetErrorKind, ValueError};
use crate::facets::{
    self, FacetKind, FacetTable, FacetValue, FacetsDefined, WhiteSpace, BINARY_FACETS,
};
use crate::pattern::Pattern;
use crate::session::Session;
use crate::validators::{
    check_collapse_whitespace, check_pattern, enumeration_error, DatatypeValidator,
    EffectiveFacets, Family, LengthFacets,
};
use crate::values::{decoded_length, BinaryEncoding};
use std::sync::Arc;

fn canonical(lexical: &str, encoding: BinaryEncoding) -> String {
    match encoding {
        BinaryEncoding::Hex => lexical.to_ascii_lowercase(),
        BinaryEncoding::Base64 => lexical.replace(' ', ""),
    }
}

/// Resolved facets of a binary type, own and inherited.
#[derive(Debug, Clone)]
pub struct BinaryFacets {
    pub(crate) encoding: BinaryEncoding,
    pub(crate) lengths: LengthFacets,
    pub(crate) patterns: Vec<Pattern>,
    pub(crate) enumeration: Option<Vec<String>>,
}

impl BinaryFacets {
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

/// Validator for xs:hexBinary, xs:base64Binary and their restrictions.
#[derive(Debug)]
pub struct BinaryValidator {
    name: String,
    base: Option<Arc<dyn DatatypeValidator>>,
    facets: BinaryFacets,
    defined: FacetsDefined,
}

impl BinaryValidator {
    /// A built-in binary type with a fixed encoding
    pub fn native(name: impl Into<String>, encoding: BinaryEncoding) -> Self {
        let mut defined = FacetsDefined::empty();
        defined.insert(FacetKind::WhiteSpace);
        defined.insert(FacetKind::Encoding);
        Self {
            name: name.into(),
            base: None,
            facets: BinaryFacets {
                encoding,
                lengths: LengthFacets::default(),
                patterns: Vec::new(),
                enumeration: None,
            },
            defined,
        }
    }

    /// Derive a new binary type by restriction.
    pub fn derive(
        name: impl Into<String>,
        base: Arc<dyn DatatypeValidator>,
        table: &FacetTable,
    ) -> Result<Self, FacetError> {
        let base_facets = match base.effective_facets() {
            Some(EffectiveFacets::Binary(f)) => f.clone(),
            _ => unreachable!("binary type derived from a non-binary base"),
        };

        let mut facets = base_facets.clone();
        let mut own_lengths = LengthFacets::default();
        let mut enumeration_literals: Option<&[String]> = None;

        for (facet_name, value) in table.iter() {
            let kind = facets::recognize(facet_name, &BINARY_FACETS)?;
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
                FacetKind::Encoding => {
                    let lexical = facets::single_value(kind, value)?;
                    facets.encoding = BinaryEncoding::from_lexical(lexical).ok_or_else(|| {
                        FacetError::new(
                            FacetErrorKind::InvalidFacetValue,
                            "encoding must be 'hex' or 'base64'",
                        )
                        .with_facet(kind.as_str())
                        .with_value(lexical)
                    })?;
                }
                FacetKind::WhiteSpace => {
                    check_collapse_whitespace(facets::single_value(kind, value)?)?;
                }
                _ => unreachable!("facet not admitted for the binary family: {}", kind),
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

        if let Some(literals) = enumeration_literals {
            let mut members = Vec::with_capacity(literals.len());
            for literal in literals {
                let normalized = WhiteSpace::Collapse.normalize(literal);
                let byte_count = decoded_length(&normalized, facets.encoding).map_err(|_| {
                    FacetError::new(
                        FacetErrorKind::InvalidEnumerationMember,
                        "enumeration literal is not in the type's lexical space",
                    )
                    .with_facet(FacetKind::Enumeration.as_str())
                    .with_value(literal)
                })?;
                facets.lengths.check(byte_count, &normalized).map_err(|e| {
                    FacetError::new(
                        FacetErrorKind::InvalidEnumerationMember,
                        format!("enumeration literal fails the type's facets: {}", e),
                    )
                    .with_facet(FacetKind::Enumeration.as_str())
                    .with_value(literal)
                })?;
                members.push(canonical(&normalized, facets.encoding));
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

impl DatatypeValidator for BinaryValidator {
    fn name(&self) -> &str {
        &self.name
    }

    fn family(&self) -> Family {
        Family::Binary
    }

    fn base(&self) -> Option<&Arc<dyn DatatypeValidator>> {
        self.base.as_ref()
    }

    fn facets_defined(&self) -> FacetsDefined {
        self.defined
    }

    fn effective_facets(&self) -> Option<EffectiveFacets<'_>> {
        Some(EffectiveFacets::Binary(&self.facets))
    }

    fn validate(&self, content: &str, _session: Option<&mut Session>) -> Result<(), ValueError> {
        let normalized = WhiteSpace::Collapse.normalize(content);
        for pattern in &self.facets.patterns {
            check_pattern(Some(pattern), &normalized)?;
        }
        let byte_count = decoded_length(&normalized, self.facets.encoding)?;
        self.facets.lengths.check(byte_count, &normalized)?;
        if let Some(ref members) = self.facets.enumeration {
            let value = canonical(&normalized, self.facets.encoding);
            if !members.iter().any(|m| *m == value) {
                return Err(enumeration_error(&normalized));
            }
        }
        Ok(())
    }
}
