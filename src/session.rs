//! Per-document validation state
//!
//! Validators themselves are immutable and shared; everything that
//! accumulates while one document is checked lives here. The caller owns
//! the session, threads it through [`validate`] calls, and drives the
//! end-of-document steps explicitly.
//!
//! [`validate`]: crate::validators::DatatypeValidator::validate

use crate::error::{ValueError, ValueErrorKind};
use indexmap::IndexSet;
use std::collections::HashSet;

/// Explicit end-of-scope operations on a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionControl {
    /// Drop all accumulated identity state (document boundary)
    Clear,
    /// Verify every recorded IDREF was matched by an ID
    CheckIdRefs,
}

/// Identity state accumulated over one document.
#[derive(Debug, Default)]
pub struct Session {
    ids: HashSet<String>,
    idrefs: IndexSet<String>,
    entities: HashSet<String>,
}

impl Session {
    /// Create an empty session
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an unparsed entity name from the DTD
    pub fn declare_entity(&mut self, name: impl Into<String>) {
        self.entities.insert(name.into());
    }

    /// Whether an unparsed entity with this name was declared
    pub fn has_entity(&self, name: &str) -> bool {
        self.entities.contains(name)
    }

    /// Record an ID value. Returns false if it was already present.
    pub(crate) fn note_id(&mut self, value: &str) -> bool {
        self.ids.insert(value.to_string())
    }

    /// Record an IDREF value for the end-of-document check.
    pub(crate) fn note_idref(&mut self, value: &str) {
        self.idrefs.insert(value.to_string());
    }

    /// Run an explicit session operation.
    pub fn control(&mut self, op: SessionControl) -> Result<(), ValueError> {
        match op {
            SessionControl::Clear => {
                self.clear();
                Ok(())
            }
            SessionControl::CheckIdRefs => self.check_idrefs(),
        }
    }

    /// Drop all accumulated identity state. Entity declarations are
    /// document-scoped too and go with it.
    pub fn clear(&mut self) {
        self.ids.clear();
        self.idrefs.clear();
        self.entities.clear();
    }

    /// Every IDREF recorded so far must name an ID seen in this session.
    /// Reported in first-reference order.
    pub fn check_idrefs(&self) -> Result<(), ValueError> {
        for idref in &self.idrefs {
            if !self.ids.contains(idref) {
                return Err(ValueError::new(
                    ValueErrorKind::DanglingIdRef,
                    "IDREF does not match any ID in the document",
                )
                .with_value(idref));
            }
        }
        Ok(())
    }
}
