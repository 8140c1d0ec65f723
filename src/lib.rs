//! XML Schema Part 2 simple-type validation.
//!
//! This crate implements the XSD datatype system: the built-in simple
//! types, derivation by restriction, list and union, the constraining
//! facets, and the document-scoped identity checks (ID, IDREF, ENTITY).
//!
//! The entry point is [`DatatypeRegistry`], which comes preloaded with
//! the built-in types and accepts new derivations described by a
//! [`FacetTable`]:
//!
//! ```
//! use xsd_datatypes::{DatatypeRegistry, FacetTable};
//!
//! let mut registry = DatatypeRegistry::new();
//! registry
//!     .create(
//!         "percent",
//!         "integer",
//!         &FacetTable::new()
//!             .set("minInclusive", "0")
//!             .set("maxInclusive", "100"),
//!         false,
//!     )
//!     .unwrap();
//!
//! assert!(registry.validate("percent", "42", None).is_ok());
//! assert!(registry.validate("percent", "120", None).is_err());
//! ```
//!
//! Identity types accumulate state in a caller-owned [`Session`]:
//!
//! ```
//! use xsd_datatypes::{DatatypeRegistry, Session, SessionControl};
//!
//! let registry = DatatypeRegistry::new();
//! let mut session = Session::new();
//! registry.validate("ID", "intro", Some(&mut session)).unwrap();
//! registry.validate("IDREF", "intro", Some(&mut session)).unwrap();
//! session.control(SessionControl::CheckIdRefs).unwrap();
//! ```

pub mod error;
pub mod facets;
pub mod pattern;
pub mod registry;
pub mod session;
pub mod validators;
pub mod values;

pub use error::{
    Error, FacetError, FacetErrorKind, MessageCode, Result, ValueError, ValueErrorKind,
};
pub use facets::{FacetKind, FacetTable, FacetValue, FacetsDefined, WhiteSpace};
pub use registry::{DatatypeRegistry, XSD_NAMESPACE};
pub use session::{Session, SessionControl};
pub use validators::{DatatypeValidator, EffectiveFacets, Family};
pub use values::ValueOrder;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
