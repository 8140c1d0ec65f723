//! String-family validator
//!
//! Covers xs:string and everything derived from it by restriction: the
//! whitespace ladder (normalizedString, token), the name types, language
//! and anyURI. Facets are merged down the restriction chain at
//! construction, so validation is a single flat pass.

use crate::error::{FacetError, FacetErrorKind, ValueError};
use crate::facets::{
    self, FacetKind, FacetTable, FacetValue, FacetsDefined, WhiteSpace, STRING_FACETS,
};
use crate::pattern::Pattern;
use crate::session::Session;
use crate::validators::{
    check_pattern, enumeration_error, DatatypeValidator, EffectiveFacets, Family, LengthFacets,
};
use std::sync::Arc;

/// Native lexical check applied after whitespace normalization
pub type LexicalCheck = fn(&str) -> Result<(), ValueError>;

/// Resolved facets of a string-family type, own and inherited.
#[derive(Debug, Clone, Default)]
pub struct StringFacets {
    pub(crate) lengths: LengthFacets,
    pub(crate) patterns: Vec<Pattern>,
    pub(crate) enumeration: Option<Vec<String>>,
    pub(crate) check: Option<LexicalCheck>,
}

impl StringFacets {
    /// Facet checks shared between content validation and enumeration
    /// closure, everything except enumeration membership.
    fn check_value(&self, normalized: &str) -> Result<(), ValueError> {
        if let Some(check) = self.check {
            check(normalized)?;
        }
        for pattern in &self.patterns {
            check_pattern(Some(pattern), normalized)?;
        }
        self.lengths
            .check(normalized.chars().count(), normalized)?;
        Ok(())
    }

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

/// Validator for xs:string and its restriction chain.
#[derive(Debug)]
pub struct StringValidator {
    name: String,
    base: Option<Arc<dyn DatatypeValidator>>,
    facets: StringFacets,
    whitespace: WhiteSpace,
    defined: FacetsDefined,
}

fn whitespace_rank(ws: WhiteSpace) -> u8 {
    match ws {
        WhiteSpace::Preserve => 0,
        WhiteSpace::Replace => 1,
        WhiteSpace::Collapse => 2,
    }
}

impl StringValidator {
    /// Build a built-in string type with a fixed whitespace mode and an
    /// optional native lexical check.
    pub fn native(
        name: impl Into<String>,
        base: Option<Arc<dyn DatatypeValidator>>,
        whitespace: WhiteSpace,
        check: Option<LexicalCheck>,
    ) -> Self {
        let mut facets = match base.as_ref().and_then(|b| b.effective_facets()) {
            Some(EffectiveFacets::String(f)) => f.clone(),
            None => StringFacets::default(),
            Some(_) => unreachable!("string type derived from a non-string base"),
        };
        if check.is_some() {
            facets.check = check;
        }
        let mut defined = base
            .as_ref()
            .map(|b| b.facets_defined())
            .unwrap_or_default();
        defined.insert(FacetKind::WhiteSpace);
        Self {
            name: name.into(),
            base,
            facets,
            whitespace,
            defined,
        }
    }

    /// Derive a new string type by restriction.
    pub fn derive(
        name: impl Into<String>,
        base: Arc<dyn DatatypeValidator>,
        table: &FacetTable,
    ) -> Result<Self, FacetError> {
        let base_facets = match base.effective_facets() {
            Some(EffectiveFacets::String(f)) => f.clone(),
            _ => unreachable!("string type derived from a non-string base"),
        };

        let mut facets = base_facets.clone();
        let mut own_lengths = LengthFacets::default();
        let mut whitespace = base.whitespace();
        let mut enumeration_literals: Option<&[String]> = None;

        for (facet_name, value) in table.iter() {
            let kind = facets::recognize(facet_name, &STRING_FACETS)?;
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
                    let own = WhiteSpace::from_lexical(facets::single_value(kind, value)?)?;
                    if whitespace_rank(own) < whitespace_rank(whitespace) {
                        return Err(FacetError::new(
                            FacetErrorKind::NotNarrower,
                            "whiteSpace may only become stricter in a restriction",
                        )
                        .with_facet(kind.as_str()));
                    }
                    whitespace = own;
                }
                _ => unreachable!("facet not admitted for the string family: {}", kind),
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

        // Enumeration closure: every literal must be a value of the base
        // type and must satisfy this type's other facets.
        if let Some(literals) = enumeration_literals {
            let mut normalized = Vec::with_capacity(literals.len());
            for literal in literals {
                base.validate(literal, None).map_err(|e| {
                    FacetError::new(
                        FacetErrorKind::InvalidEnumerationMember,
                        format!("enumeration literal is not a value of the base type: {}", e),
                    )
                    .with_facet(FacetKind::Enumeration.as_str())
                    .with_value(literal)
                })?;
                let value = whitespace.normalize(literal);
                facets.check_value(&value).map_err(|e| {
                    FacetError::new(
                        FacetErrorKind::InvalidEnumerationMember,
                        format!("enumeration literal fails the type's facets: {}", e),
                    )
                    .with_facet(FacetKind::Enumeration.as_str())
                    .with_value(literal)
                })?;
                normalized.push(value);
            }
            facets.enumeration = Some(normalized);
        }

        let mut defined = base.facets_defined();
        facets.mark_defined(&mut defined);
        defined.insert(FacetKind::WhiteSpace);

        Ok(Self {
            name: name.into(),
            base: Some(base),
            facets,
            whitespace,
            defined,
        })
    }
}

impl DatatypeValidator for StringValidator {
    fn name(&self) -> &str {
        &self.name
    }

    fn family(&self) -> Family {
        Family::String
    }

    fn base(&self) -> Option<&Arc<dyn DatatypeValidator>> {
        self.base.as_ref()
    }

    fn facets_defined(&self) -> FacetsDefined {
        self.defined
    }

    fn whitespace(&self) -> WhiteSpace {
        self.whitespace
    }

    fn effective_facets(&self) -> Option<EffectiveFacets<'_>> {
        Some(EffectiveFacets::String(&self.facets))
    }

    fn validate(&self, content: &str, _session: Option<&mut Session>) -> Result<(), ValueError> {
        let normalized = self.whitespace.normalize(content);
        self.facets.check_value(&normalized)?;
        if let Some(ref members) = self.facets.enumeration {
            if !members.iter().any(|m| *m == normalized) {
                return Err(enumeration_error(&normalized));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValueErrorKind;
    use crate::validators::names;

    fn string_type() -> Arc<dyn DatatypeValidator> {
        Arc::new(StringValidator::native(
            "string",
            None,
            WhiteSpace::Preserve,
            None,
        ))
    }

    fn token_type() -> Arc<dyn DatatypeValidator> {
        let string = string_type();
        let normalized = Arc::new(StringValidator::native(
            "normalizedString",
            Some(string),
            WhiteSpace::Replace,
            Some(names::check_normalized_string as _),
        ));
        Arc::new(StringValidator::native(
            "token",
            Some(normalized),
            WhiteSpace::Collapse,
            Some(names::check_token as _),
        ))
    }

    #[test]
    fn test_plain_string_accepts_anything() {
        let string = string_type();
        assert!(string.validate("  any\ttext\nat all  ", None).is_ok());
    }

    #[test]
    fn test_token_collapses_before_checking() {
        let token = token_type();
        // collapse removes the offending whitespace before the check runs
        assert!(token.validate("  spaced \n out  ", None).is_ok());
    }

    #[test]
    fn test_length_facets_after_normalization() {
        let table = FacetTable::new().set("minLength", "3").set("maxLength", "5");
        let derived = StringValidator::derive("short", token_type(), &table).unwrap();

        assert!(derived.validate("abc", None).is_ok());
        assert!(derived.validate("  abcde  ", None).is_ok());
        assert_eq!(
            derived.validate("ab", None).unwrap_err().kind,
            ValueErrorKind::LengthOutOfRange
        );
        assert!(derived.validate("abcdef", None).is_err());
    }

    #[test]
    fn test_length_cannot_combine_with_length_range() {
        let table = FacetTable::new().set("length", "3").set("maxLength", "5");
        let err = StringValidator::derive("bad", token_type(), &table).unwrap_err();
        assert_eq!(err.kind, FacetErrorKind::InconsistentFacets);

        // inherited range collides with a declared exact length too
        let ranged = Arc::new(
            StringValidator::derive(
                "ranged",
                token_type(),
                &FacetTable::new().set("maxLength", "5"),
            )
            .unwrap(),
        );
        let table = FacetTable::new().set("length", "3");
        assert!(StringValidator::derive("bad", ranged, &table).is_err());
    }

    #[test]
    fn test_pattern_facet() {
        let table = FacetTable::new().set("pattern", "[a-z]+");
        let derived = StringValidator::derive("lower", token_type(), &table).unwrap();
        assert!(derived.validate("abc", None).is_ok());
        assert_eq!(
            derived.validate("ABC", None).unwrap_err().kind,
            ValueErrorKind::PatternMismatch
        );
    }

    #[test]
    fn test_patterns_accumulate_across_steps() {
        let step1 = Arc::new(
            StringValidator::derive(
                "letters",
                token_type(),
                &FacetTable::new().set("pattern", "[a-zA-Z]+"),
            )
            .unwrap(),
        );
        let step2 = StringValidator::derive(
            "short-letters",
            step1,
            &FacetTable::new().set("pattern", ".{1,3}"),
        )
        .unwrap();
        assert!(step2.validate("abc", None).is_ok());
        assert!(step2.validate("abcd", None).is_err());
        assert!(step2.validate("ab1", None).is_err());
    }

    #[test]
    fn test_enumeration() {
        let table = FacetTable::new().enumeration(["red", "green", "blue"]);
        let color = StringValidator::derive("color", token_type(), &table).unwrap();
        assert!(color.validate("green", None).is_ok());
        assert!(color.validate("  green  ", None).is_ok());
        assert_eq!(
            color.validate("purple", None).unwrap_err().kind,
            ValueErrorKind::NotInEnumeration
        );
    }

    #[test]
    fn test_enumeration_closure() {
        let short = Arc::new(
            StringValidator::derive(
                "short",
                token_type(),
                &FacetTable::new().set("maxLength", "3"),
            )
            .unwrap(),
        );
        let err = StringValidator::derive(
            "bad",
            short,
            &FacetTable::new().enumeration(["ok", "toolong"]),
        )
        .unwrap_err();
        assert_eq!(err.kind, FacetErrorKind::InvalidEnumerationMember);
    }

    #[test]
    fn test_length_narrowing_enforced() {
        let base = Arc::new(
            StringValidator::derive(
                "base",
                token_type(),
                &FacetTable::new().set("maxLength", "5"),
            )
            .unwrap(),
        );
        let err = StringValidator::derive("wider", base, &FacetTable::new().set("maxLength", "9"))
            .unwrap_err();
        assert_eq!(err.kind, FacetErrorKind::NotNarrower);
    }

    #[test]
    fn test_whitespace_cannot_loosen() {
        let err = StringValidator::derive(
            "loose",
            token_type(),
            &FacetTable::new().set("whiteSpace", "preserve"),
        )
        .unwrap_err();
        assert_eq!(err.kind, FacetErrorKind::NotNarrower);
    }

    #[test]
    fn test_native_check_inherited_through_derivation() {
        let ncname = Arc::new(StringValidator::native(
            "NCName",
            Some(token_type()),
            WhiteSpace::Collapse,
            Some(names::check_ncname as _),
        ));
        let derived =
            StringValidator::derive("id-like", ncname, &FacetTable::new().set("maxLength", "10"))
                .unwrap();
        assert!(derived.validate("valid_name", None).is_ok());
        assert_eq!(
            derived.validate("has:colon", None).unwrap_err().kind,
            ValueErrorKind::InvalidLexical
        );
    }

    #[test]
    fn test_unknown_facet_rejected() {
        let err = StringValidator::derive(
            "bad",
            token_type(),
            &FacetTable::new().set("totalDigits", "3"),
        )
        .unwrap_err();
        assert_eq!(err.kind, FacetErrorKind::UnknownFacet);
    }
}
