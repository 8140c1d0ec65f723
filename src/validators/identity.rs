//! Identity validators: ID, IDREF and ENTITY
//!
//! These wrap an NCName base for the lexical check and add the
//! session-backed identity semantics. Without a session only the lexical
//! form is checked and nothing is recorded.

use crate::error::{ValueError, ValueErrorKind};
use crate::facets::FacetsDefined;
use crate::session::Session;
use crate::validators::{DatatypeValidator, EffectiveFacets, Family, IdentityKind};
use std::sync::Arc;

/// xs:ID: an NCName that must be unique within the document.
#[derive(Debug)]
pub struct IdValidator {
    name: String,
    base: Arc<dyn DatatypeValidator>,
}

impl IdValidator {
    /// Wrap an NCName-shaped base type
    pub fn new(name: impl Into<String>, base: Arc<dyn DatatypeValidator>) -> Self {
        Self {
            name: name.into(),
            base,
        }
    }
}

impl DatatypeValidator for IdValidator {
    fn name(&self) -> &str {
        &self.name
    }

    fn family(&self) -> Family {
        Family::String
    }

    fn identity_kind(&self) -> Option<IdentityKind> {
        Some(IdentityKind::Id)
    }

    fn base(&self) -> Option<&Arc<dyn DatatypeValidator>> {
        Some(&self.base)
    }

    fn facets_defined(&self) -> FacetsDefined {
        self.base.facets_defined()
    }

    fn effective_facets(&self) -> Option<EffectiveFacets<'_>> {
        self.base.effective_facets()
    }

    fn validate(&self, content: &str, session: Option<&mut Session>) -> Result<(), ValueError> {
        let normalized = self.whitespace().normalize(content);
        self.base.validate(&normalized, None)?;
        if let Some(session) = session {
            if !session.note_id(&normalized) {
                return Err(ValueError::new(
                    ValueErrorKind::DuplicateId,
                    "ID value already appeared in this document",
                )
                .with_value(&normalized));
            }
        }
        Ok(())
    }
}

/// xs:IDREF: an NCName that must match some ID by end of document.
#[derive(Debug)]
pub struct IdRefValidator {
    name: String,
    base: Arc<dyn DatatypeValidator>,
}

impl IdRefValidator {
    /// Wrap an NCName-shaped base type
    pub fn new(name: impl Into<String>, base: Arc<dyn DatatypeValidator>) -> Self {
        Self {
            name: name.into(),
            base,
        }
    }
}

impl DatatypeValidator for IdRefValidator {
    fn name(&self) -> &str {
        &self.name
    }

    fn family(&self) -> Family {
        Family::String
    }

    fn identity_kind(&self) -> Option<IdentityKind> {
        Some(IdentityKind::IdRef)
    }

    fn base(&self) -> Option<&Arc<dyn DatatypeValidator>> {
        Some(&self.base)
    }

    fn facets_defined(&self) -> FacetsDefined {
        self.base.facets_defined()
    }

    fn effective_facets(&self) -> Option<EffectiveFacets<'_>> {
        self.base.effective_facets()
    }

    fn validate(&self, content: &str, session: Option<&mut Session>) -> Result<(), ValueError> {
        let normalized = self.whitespace().normalize(content);
        self.base.validate(&normalized, None)?;
        if let Some(session) = session {
            session.note_idref(&normalized);
        }
        Ok(())
    }
}

/// xs:ENTITY: an NCName naming a declared unparsed entity.
#[derive(Debug)]
pub struct EntityValidator {
    name: String,
    base: Arc<dyn DatatypeValidator>,
}

impl EntityValidator {
    /// Wrap an NCName-shaped base type
    pub fn new(name: impl Into<String>, base: Arc<dyn DatatypeValidator>) -> Self {
        Self {
            name: name.into(),
            base,
        }
    }
}

impl DatatypeValidator for EntityValidator {
    fn name(&self) -> &str {
        &self.name
    }

    fn family(&self) -> Family {
        Family::String
    }

    fn identity_kind(&self) -> Option<IdentityKind> {
        Some(IdentityKind::Entity)
    }

    fn base(&self) -> Option<&Arc<dyn DatatypeValidator>> {
        Some(&self.base)
    }

    fn facets_defined(&self) -> FacetsDefined {
        self.base.facets_defined()
    }

    fn effective_facets(&self) -> Option<EffectiveFacets<'_>> {
        self.base.effective_facets()
    }

    fn validate(&self, content: &str, session: Option<&mut Session>) -> Result<(), ValueError> {
        let normalized = self.whitespace().normalize(content);
        self.base.validate(&normalized, None)?;
        if let Some(session) = session {
            if !session.has_entity(&normalized) {
                return Err(ValueError::new(
                    ValueErrorKind::UndeclaredEntity,
                    "value does not name a declared unparsed entity",
                )
                .with_value(&normalized));
            }
        }
        Ok(())
    }
}
