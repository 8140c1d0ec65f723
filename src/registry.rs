//! Built-in datatype registry
//!
//! The registry owns one immutable validator per type name and hands out
//! shared `Arc` references; looking a type up never copies it. `new()`
//! bootstraps the whole built-in ladder through the same derivation
//! machinery user types go through, so the integer hierarchy really is
//! decimal narrowed facet by facet.

use crate::error::{Error, FacetError};
use crate::facets::{FacetTable, WhiteSpace};
use crate::session::Session;
use crate::validators::{
    names, BinaryValidator, BooleanValidator, DatatypeValidator, DateTimeValidator,
    DecimalValidator, EntityValidator, Family, FloatValidator, IdRefValidator, IdValidator,
    IdentityKind, ListValidator, StringValidator, UnionValidator,
};
use crate::values::{BinaryEncoding, CalendarGrain, FloatWidth};
use indexmap::IndexMap;
use std::sync::Arc;

/// The XML Schema datatypes namespace
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// Registry of named simple types.
pub struct DatatypeRegistry {
    types: IndexMap<String, Arc<dyn DatatypeValidator>>,
}

/// Built-in types are constructed from fixed tables; a failure here is a
/// bug in the ladder, not a caller error.
fn must<T>(result: Result<T, FacetError>) -> T {
    match result {
        Ok(v) => v,
        Err(e) => unreachable!("built-in type failed to construct: {}", e),
    }
}

impl DatatypeRegistry {
    /// A registry preloaded with the built-in XSD simple types.
    pub fn new() -> Self {
        let mut registry = Self {
            types: IndexMap::new(),
        };
        registry.bootstrap();
        registry
    }

    fn add(&mut self, validator: Arc<dyn DatatypeValidator>) -> Arc<dyn DatatypeValidator> {
        self.types
            .insert(validator.name().to_string(), Arc::clone(&validator));
        validator
    }

    fn bootstrap(&mut self) {
        // string ladder
        let string = self.add(Arc::new(StringValidator::native(
            "string",
            None,
            WhiteSpace::Preserve,
            None,
        )));
        let normalized = self.add(Arc::new(StringValidator::native(
            "normalizedString",
            Some(string),
            WhiteSpace::Replace,
            Some(names::check_normalized_string as _),
        )));
        let token = self.add(Arc::new(StringValidator::native(
            "token",
            Some(normalized),
            WhiteSpace::Collapse,
            Some(names::check_token as _),
        )));
        self.add(Arc::new(StringValidator::native(
            "language",
            Some(Arc::clone(&token)),
            WhiteSpace::Collapse,
            Some(names::check_language as _),
        )));
        let name = self.add(Arc::new(StringValidator::native(
            "Name",
            Some(Arc::clone(&token)),
            WhiteSpace::Collapse,
            Some(names::check_name as _),
        )));
        let ncname = self.add(Arc::new(StringValidator::native(
            "NCName",
            Some(name),
            WhiteSpace::Collapse,
            Some(names::check_ncname as _),
        )));
        let nmtoken = self.add(Arc::new(must(StringValidator::derive(
            "NMTOKEN",
            Arc::clone(&token),
            &FacetTable::new().set("pattern", r"\c+"),
        ))));
        self.add(Arc::new(StringValidator::native(
            "QName",
            Some(Arc::clone(&token)),
            WhiteSpace::Collapse,
            Some(names::check_qname as _),
        )));
        self.add(Arc::new(StringValidator::native(
            "anyURI",
            Some(Arc::clone(&token)),
            WhiteSpace::Collapse,
            Some(names::check_any_uri as _),
        )));

        // identity types over NCName
        self.add(Arc::new(IdValidator::new("ID", Arc::clone(&ncname))));
        let idref = self.add(Arc::new(IdRefValidator::new("IDREF", Arc::clone(&ncname))));
        let entity = self.add(Arc::new(EntityValidator::new("ENTITY", ncname)));

        // built-in list types require at least one item
        let one_or_more = FacetTable::new().set("minLength", "1");
        self.add(Arc::new(must(ListValidator::restrict(
            "NMTOKENS",
            Arc::new(ListValidator::new("NMTOKENS", nmtoken)),
            &one_or_more,
        ))));
        self.add(Arc::new(must(ListValidator::restrict(
            "IDREFS",
            Arc::new(ListValidator::new("IDREFS", idref)),
            &one_or_more,
        ))));
        self.add(Arc::new(must(ListValidator::restrict(
            "ENTITIES",
            Arc::new(ListValidator::new("ENTITIES", entity)),
            &one_or_more,
        ))));

        // boolean
        self.add(Arc::new(BooleanValidator::native("boolean")));

        // decimal and the integer ladder
        let decimal = self.add(Arc::new(DecimalValidator::native("decimal")));
        let integer = self.derived_decimal(
            "integer",
            decimal,
            FacetTable::new()
                .set("fractionDigits", "0")
                .set("pattern", r"[\-+]?[0-9]+"),
        );
        let non_positive = self.derived_decimal(
            "nonPositiveInteger",
            Arc::clone(&integer),
            FacetTable::new().set("maxInclusive", "0"),
        );
        self.derived_decimal(
            "negativeInteger",
            non_positive,
            FacetTable::new().set("maxInclusive", "-1"),
        );
        let long = self.derived_decimal(
            "long",
            Arc::clone(&integer),
            FacetTable::new()
                .set("minInclusive", "-9223372036854775808")
                .set("maxInclusive", "9223372036854775807"),
        );
        let int = self.derived_decimal(
            "int",
            long,
            FacetTable::new()
                .set("minInclusive", "-2147483648")
                .set("maxInclusive", "2147483647"),
        );
        let short = self.derived_decimal(
            "short",
            int,
            FacetTable::new()
                .set("minInclusive", "-32768")
                .set("maxInclusive", "32767"),
        );
        self.derived_decimal(
            "byte",
            short,
            FacetTable::new()
                .set("minInclusive", "-128")
                .set("maxInclusive", "127"),
        );
        let non_negative = self.derived_decimal(
            "nonNegativeInteger",
            integer,
            FacetTable::new().set("minInclusive", "0"),
        );
        let unsigned_long = self.derived_decimal(
            "unsignedLong",
            Arc::clone(&non_negative),
            FacetTable::new().set("maxInclusive", "18446744073709551615"),
        );
        let unsigned_int = self.derived_decimal(
            "unsignedInt",
            unsigned_long,
            FacetTable::new().set("maxInclusive", "4294967295"),
        );
        let unsigned_short = self.derived_decimal(
            "unsignedShort",
            unsigned_int,
            FacetTable::new().set("maxInclusive", "65535"),
        );
        self.derived_decimal(
            "unsignedByte",
            unsigned_short,
            FacetTable::new().set("maxInclusive", "255"),
        );
        self.derived_decimal(
            "positiveInteger",
            non_negative,
            FacetTable::new().set("minInclusive", "1"),
        );

        // floats
        self.add(Arc::new(FloatValidator::native("float", FloatWidth::Single)));
        self.add(Arc::new(FloatValidator::native("double", FloatWidth::Double)));

        // calendar grains and duration
        for (type_name, grain) in [
            ("dateTime", CalendarGrain::DateTime),
            ("date", CalendarGrain::Date),
            ("time", CalendarGrain::Time),
            ("gYearMonth", CalendarGrain::GYearMonth),
            ("gYear", CalendarGrain::GYear),
            ("gMonthDay", CalendarGrain::GMonthDay),
            ("gDay", CalendarGrain::GDay),
            ("gMonth", CalendarGrain::GMonth),
            ("duration", CalendarGrain::Duration),
        ] {
            self.add(Arc::new(DateTimeValidator::native(type_name, grain)));
        }

        // binary
        self.add(Arc::new(BinaryValidator::native("hexBinary", BinaryEncoding::Hex)));
        self.add(Arc::new(BinaryValidator::native(
            "base64Binary",
            BinaryEncoding::Base64,
        )));
    }

    fn derived_decimal(
        &mut self,
        name: &str,
        base: Arc<dyn DatatypeValidator>,
        table: FacetTable,
    ) -> Arc<dyn DatatypeValidator> {
        self.add(Arc::new(must(DecimalValidator::derive(name, base, &table))))
    }

    /// Look up a type by name. The returned validator is shared, not
    /// copied.
    pub fn get(&self, name: &str) -> Result<Arc<dyn DatatypeValidator>, Error> {
        self.types
            .get(name)
            .cloned()
            .ok_or_else(|| Error::Type(format!("unknown datatype: {}", name)))
    }

    /// Whether a type with this name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Registered type names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    /// Validate one content string against a named type.
    pub fn validate(
        &self,
        type_name: &str,
        content: &str,
        session: Option<&mut Session>,
    ) -> Result<(), Error> {
        self.get(type_name)?.validate(content, session)?;
        Ok(())
    }

    /// Derive and register a new type by restriction, or by list when
    /// `derived_by_list` is set (the base becomes the item type).
    pub fn create(
        &mut self,
        name: &str,
        base_name: &str,
        table: &FacetTable,
        derived_by_list: bool,
    ) -> Result<Arc<dyn DatatypeValidator>, Error> {
        if self.types.contains_key(name) {
            return Err(Error::Type(format!("datatype already defined: {}", name)));
        }
        let base = self.get(base_name)?;
        let validator: Arc<dyn DatatypeValidator> = if derived_by_list {
            let list = Arc::new(ListValidator::new(name, base));
            if table.is_empty() {
                list
            } else {
                Arc::new(ListValidator::restrict(name, list, table)?)
            }
        } else {
            match base.family() {
                Family::String => {
                    // a restriction of ID/IDREF/ENTITY keeps the
                    // session-backed semantics of its base
                    let identity = base.identity_kind();
                    let derived: Arc<dyn DatatypeValidator> =
                        Arc::new(StringValidator::derive(name, base, table)?);
                    match identity {
                        Some(IdentityKind::Id) => Arc::new(IdValidator::new(name, derived)),
                        Some(IdentityKind::IdRef) => Arc::new(IdRefValidator::new(name, derived)),
                        Some(IdentityKind::Entity) => Arc::new(EntityValidator::new(name, derived)),
                        None => derived,
                    }
                }
                Family::Boolean => Arc::new(BooleanValidator::derive(name, base, table)?),
                Family::Decimal => Arc::new(DecimalValidator::derive(name, base, table)?),
                Family::Float => Arc::new(FloatValidator::derive(name, base, table)?),
                Family::DateTime => Arc::new(DateTimeValidator::derive(name, base, table)?),
                Family::Binary => Arc::new(BinaryValidator::derive(name, base, table)?),
                Family::List => Arc::new(ListValidator::restrict(name, base, table)?),
                Family::Union => Arc::new(UnionValidator::restrict(name, base, table)?),
            }
        };
        Ok(self.add(validator))
    }

    /// Build and register a union over named member types.
    pub fn create_union(
        &mut self,
        name: &str,
        member_names: &[&str],
    ) -> Result<Arc<dyn DatatypeValidator>, Error> {
        if self.types.contains_key(name) {
            return Err(Error::Type(format!("datatype already defined: {}", name)));
        }
        if member_names.is_empty() {
            return Err(Error::Type(format!("union {} has no member types", name)));
        }
        let members = member_names
            .iter()
            .map(|m| self.get(m))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.add(Arc::new(UnionValidator::new(name, members))))
    }
}

impl Default for DatatypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValueErrorKind;

    #[test]
    fn test_builtin_ladder_present() {
        let registry = DatatypeRegistry::new();
        for type_name in [
            "string",
            "token",
            "NMTOKEN",
            "NCName",
            "ID",
            "IDREFS",
            "boolean",
            "decimal",
            "integer",
            "positiveInteger",
            "unsignedByte",
            "float",
            "double",
            "dateTime",
            "duration",
            "gMonthDay",
            "hexBinary",
            "base64Binary",
            "anyURI",
            "QName",
        ] {
            assert!(registry.contains(type_name), "{}", type_name);
        }
        assert!(registry.get("bogusType").is_err());
    }

    #[test]
    fn test_integer_ladder_narrowing() {
        let registry = DatatypeRegistry::new();
        assert!(registry.validate("byte", "127", None).is_ok());
        assert!(registry.validate("byte", "128", None).is_err());
        assert!(registry.validate("unsignedByte", "255", None).is_ok());
        assert!(registry.validate("unsignedByte", "-1", None).is_err());
        assert!(registry.validate("negativeInteger", "-1", None).is_ok());
        assert!(registry.validate("negativeInteger", "0", None).is_err());
        assert!(registry
            .validate("unsignedLong", "18446744073709551615", None)
            .is_ok());
    }

    #[test]
    fn test_nmtoken_uses_translated_pattern() {
        let registry = DatatypeRegistry::new();
        assert!(registry.validate("NMTOKEN", "abc-123", None).is_ok());
        assert!(registry.validate("NMTOKEN", "has space", None).is_err());
    }

    #[test]
    fn test_builtin_lists_require_one_item() {
        let registry = DatatypeRegistry::new();
        assert!(registry.validate("NMTOKENS", "a b", None).is_ok());
        assert!(registry.validate("NMTOKENS", "", None).is_err());
    }

    #[test]
    fn test_create_restriction() {
        let mut registry = DatatypeRegistry::new();
        let table = FacetTable::new()
            .set("minInclusive", "0")
            .set("maxInclusive", "100");
        registry.create("percent", "integer", &table, false).unwrap();

        assert!(registry.validate("percent", "50", None).is_ok());
        assert!(registry.validate("percent", "101", None).is_err());
    }

    #[test]
    fn test_create_list_type() {
        let mut registry = DatatypeRegistry::new();
        let table = FacetTable::new().set("maxLength", "3");
        registry.create("few-dates", "date", &table, true).unwrap();

        assert!(registry
            .validate("few-dates", "2024-01-01 2024-06-01", None)
            .is_ok());
        assert!(registry
            .validate("few-dates", "2024-01-01 2024-02-01 2024-03-01 2024-04-01", None)
            .is_err());
    }

    #[test]
    fn test_create_union_type() {
        let mut registry = DatatypeRegistry::new();
        registry
            .create_union("size", &["positiveInteger", "token"])
            .unwrap();
        assert!(registry.validate("size", "42", None).is_ok());
        assert!(registry.validate("size", "large", None).is_ok());
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut registry = DatatypeRegistry::new();
        let err = registry
            .create("decimal", "integer", &FacetTable::new(), false)
            .unwrap_err();
        assert!(matches!(err, Error::Type(_)));
    }

    #[test]
    fn test_bad_facet_propagates() {
        let mut registry = DatatypeRegistry::new();
        let table = FacetTable::new().set("maxLength", "4");
        let err = registry.create("bad", "integer", &table, false).unwrap_err();
        assert!(matches!(err, Error::Facet(_)));
    }

    #[test]
    fn test_restriction_of_id_keeps_uniqueness() {
        let mut registry = DatatypeRegistry::new();
        let table = FacetTable::new().set("maxLength", "8");
        registry.create("shortId", "ID", &table, false).unwrap();

        let mut session = Session::new();
        registry
            .validate("shortId", "n1", Some(&mut session))
            .unwrap();
        let err = registry
            .validate("shortId", "n1", Some(&mut session))
            .unwrap_err();
        match err {
            Error::Value(e) => assert_eq!(e.kind, ValueErrorKind::DuplicateId),
            other => panic!("unexpected error: {}", other),
        }
        // the declared facet still applies
        assert!(registry
            .validate("shortId", "way-too-long-name", None)
            .is_err());
    }

    #[test]
    fn test_session_protocol_end_to_end() {
        let registry = DatatypeRegistry::new();
        let mut session = Session::new();

        registry
            .validate("ID", "n1", Some(&mut session))
            .unwrap();
        registry
            .validate("IDREF", "n1", Some(&mut session))
            .unwrap();
        registry
            .validate("IDREF", "n2", Some(&mut session))
            .unwrap();
        assert!(session.check_idrefs().is_err());

        registry.validate("ID", "n2", Some(&mut session)).unwrap();
        assert!(session.check_idrefs().is_ok());

        let err = registry
            .validate("ID", "n1", Some(&mut session))
            .unwrap_err();
        match err {
            Error::Value(e) => assert_eq!(e.kind, ValueErrorKind::DuplicateId),
            other => panic!("unexpected error: {}", other),
        }
    }
}
