//! Boolean validator
//!
//! xs:boolean admits exactly four lexical forms and only the pattern and
//! whiteSpace facets.

use crate::error::{FacetError, ValueError, ValueErrorKind};
use crate::facets::{self, FacetKind, FacetTable, FacetsDefined, WhiteSpace, BOOLEAN_FACETS};
use crate::pattern::Pattern;
use crate::session::Session;
use crate::validators::{check_collapse_whitespace, check_pattern, DatatypeValidator, Family};
use std::collections::HashMap;
use std::sync::Arc;

lazy_static::lazy_static! {
    static ref BOOLEAN_VALUES: HashMap<&'static str, bool> = {
        let mut m = HashMap::new();
        m.insert("true", true);
        m.insert("false", false);
        m.insert("1", true);
        m.insert("0", false);
        m
    };
}

/// Validator for xs:boolean and its restrictions.
#[derive(Debug)]
pub struct BooleanValidator {
    name: String,
    base: Option<Arc<dyn DatatypeValidator>>,
    patterns: Vec<Pattern>,
    defined: FacetsDefined,
}

impl BooleanValidator {
    /// The built-in xs:boolean type
    pub fn native(name: impl Into<String>) -> Self {
        let mut defined = FacetsDefined::empty();
        defined.insert(FacetKind::WhiteSpace);
        Self {
            name: name.into(),
            base: None,
            patterns: Vec::new(),
            defined,
        }
    }

    /// Derive a boolean restriction (pattern only).
    pub fn derive(
        name: impl Into<String>,
        base: Arc<dyn DatatypeValidator>,
        table: &FacetTable,
    ) -> Result<Self, FacetError> {
        let mut patterns = Vec::new();
        for (facet_name, value) in table.iter() {
            let kind = facets::recognize(facet_name, &BOOLEAN_FACETS)?;
            match kind {
                FacetKind::Pattern => {
                    patterns.push(Pattern::new(facets::single_value(kind, value)?)?);
                }
                FacetKind::WhiteSpace => {
                    check_collapse_whitespace(facets::single_value(kind, value)?)?;
                }
                _ => unreachable!("facet not admitted for the boolean family: {}", kind),
            }
        }
        let mut defined = base.facets_defined();
        if !patterns.is_empty() {
            defined.insert(FacetKind::Pattern);
        }
        Ok(Self {
            name: name.into(),
            base: Some(base),
            patterns,
            defined,
        })
    }
}

impl DatatypeValidator for BooleanValidator {
    fn name(&self) -> &str {
        &self.name
    }

    fn family(&self) -> Family {
        Family::Boolean
    }

    fn base(&self) -> Option<&Arc<dyn DatatypeValidator>> {
        self.base.as_ref()
    }

    fn facets_defined(&self) -> FacetsDefined {
        self.defined
    }

    fn validate(&self, content: &str, session: Option<&mut Session>) -> Result<(), ValueError> {
        let normalized = WhiteSpace::Collapse.normalize(content);
        if !BOOLEAN_VALUES.contains_key(normalized.as_str()) {
            return Err(ValueError::new(
                ValueErrorKind::InvalidLexical,
                "value is not a valid xs:boolean",
            )
            .with_value(content));
        }
        for pattern in &self.patterns {
            check_pattern(Some(pattern), &normalized)?;
        }
        if let Some(base) = &self.base {
            base.validate(&normalized, session)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boolean_lexicals() {
        let b = BooleanValidator::native("boolean");
        for ok in ["true", "false", "1", "0", "  true  "] {
            assert!(b.validate(ok, None).is_ok(), "{:?}", ok);
        }
        for bad in ["TRUE", "yes", "2", ""] {
            assert!(b.validate(bad, None).is_err(), "{:?}", bad);
        }
    }

    #[test]
    fn test_boolean_pattern_restriction() {
        let base: Arc<dyn DatatypeValidator> = Arc::new(BooleanValidator::native("boolean"));
        let table = FacetTable::new().set("pattern", "true|false");
        let words = BooleanValidator::derive("word-boolean", base, &table).unwrap();
        assert!(words.validate("true", None).is_ok());
        assert_eq!(
            words.validate("1", None).unwrap_err().kind,
            ValueErrorKind::PatternMismatch
        );
    }

    #[test]
    fn test_boolean_rejects_length_facet() {
        let base: Arc<dyn DatatypeValidator> = Arc::new(BooleanValidator::native("boolean"));
        let table = FacetTable::new().set("maxLength", "4");
        assert!(BooleanValidator::derive("bad", base, &table).is_err());
    }
}
