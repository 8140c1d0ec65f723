//! Native lexical checks for the string-derived built-in types
//!
//! The pattern facet cannot express every built-in lexical space (XSD
//! regex class subtraction has no translation), so the string family
//! carries an optional native check function alongside its facets.
//! These checks run on the whitespace-normalized value.

use crate::error::{ValueError, ValueErrorKind};
use once_cell::sync::Lazy;
use regex::Regex;

fn lexical_error(type_name: &'static str, content: &str) -> ValueError {
    ValueError::new(
        ValueErrorKind::InvalidLexical,
        format!("value is not a valid xs:{}", type_name),
    )
    .with_value(content)
}

fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == ':'
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | ':' | '-' | '.')
}

/// xs:normalizedString forbids tab, LF and CR
pub fn check_normalized_string(content: &str) -> Result<(), ValueError> {
    if content.contains(['\t', '\n', '\r']) {
        return Err(lexical_error("normalizedString", content));
    }
    Ok(())
}

/// xs:token additionally forbids leading/trailing spaces and runs of them
pub fn check_token(content: &str) -> Result<(), ValueError> {
    check_normalized_string(content).map_err(|_| lexical_error("token", content))?;
    if content.starts_with(' ') || content.ends_with(' ') || content.contains("  ") {
        return Err(lexical_error("token", content));
    }
    Ok(())
}

static LANGUAGE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z]{1,8}(-[a-zA-Z0-9]{1,8})*$").unwrap());

/// xs:language per RFC 3066 subtags
pub fn check_language(content: &str) -> Result<(), ValueError> {
    if !LANGUAGE_REGEX.is_match(content) {
        return Err(lexical_error("language", content));
    }
    Ok(())
}

/// xs:Name: a name-start character followed by name characters
pub fn check_name(content: &str) -> Result<(), ValueError> {
    let mut chars = content.chars();
    match chars.next() {
        Some(c) if is_name_start(c) => {}
        _ => return Err(lexical_error("Name", content)),
    }
    if chars.all(is_name_char) {
        Ok(())
    } else {
        Err(lexical_error("Name", content))
    }
}

/// xs:NCName: a Name with no colon
pub fn check_ncname(content: &str) -> Result<(), ValueError> {
    if content.contains(':') {
        return Err(lexical_error("NCName", content));
    }
    check_name(content).map_err(|_| lexical_error("NCName", content))
}

/// xs:NMTOKEN: one or more name characters, no start restriction
pub fn check_nmtoken(content: &str) -> Result<(), ValueError> {
    if !content.is_empty() && content.chars().all(is_name_char) {
        Ok(())
    } else {
        Err(lexical_error("NMTOKEN", content))
    }
}

/// xs:QName: an optional NCName prefix, a colon, and an NCName local part
pub fn check_qname(content: &str) -> Result<(), ValueError> {
    let mut parts = content.split(':');
    let first = parts.next().unwrap_or("");
    match (parts.next(), parts.next()) {
        (None, _) => check_ncname(first).map_err(|_| lexical_error("QName", content)),
        (Some(local), None) => {
            check_ncname(first)
                .and_then(|_| check_ncname(local))
                .map_err(|_| lexical_error("QName", content))
        }
        (Some(_), Some(_)) => Err(lexical_error("QName", content)),
    }
}

/// xs:anyURI: any character data without raw whitespace controls.
///
/// Full RFC 2396 checking is deliberately loose here, matching the
/// lenient handling most processors apply.
pub fn check_any_uri(content: &str) -> Result<(), ValueError> {
    if content.contains(['\t', '\n', '\r', ' ']) {
        return Err(lexical_error("anyURI", content));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_string() {
        assert!(check_normalized_string("hello world").is_ok());
        assert!(check_normalized_string("  padded  ").is_ok());
        assert!(check_normalized_string("line\nbreak").is_err());
        assert!(check_normalized_string("tab\there").is_err());
    }

    #[test]
    fn test_token() {
        assert!(check_token("hello world").is_ok());
        assert!(check_token("").is_ok());
        assert!(check_token(" leading").is_err());
        assert!(check_token("trailing ").is_err());
        assert!(check_token("double  space").is_err());
    }

    #[test]
    fn test_language() {
        assert!(check_language("en").is_ok());
        assert!(check_language("en-US").is_ok());
        assert!(check_language("x-klingon1").is_ok());
        assert!(check_language("").is_err());
        assert!(check_language("verylongtag").is_err());
        assert!(check_language("en_US").is_err());
    }

    #[test]
    fn test_name_and_ncname() {
        assert!(check_name("valid-name").is_ok());
        assert!(check_name("_underscore").is_ok());
        assert!(check_name("ns:local").is_ok());
        assert!(check_name("1starts-with-digit").is_err());
        assert!(check_name("").is_err());

        assert!(check_ncname("no-colon").is_ok());
        assert!(check_ncname("ns:local").is_err());
        assert!(check_ncname("-leading-hyphen").is_err());
    }

    #[test]
    fn test_nmtoken() {
        assert!(check_nmtoken("123-valid").is_ok());
        assert!(check_nmtoken(".dotted").is_ok());
        assert!(check_nmtoken("").is_err());
        assert!(check_nmtoken("has space").is_err());
    }

    #[test]
    fn test_qname() {
        assert!(check_qname("local").is_ok());
        assert!(check_qname("pre:local").is_ok());
        assert!(check_qname("a:b:c").is_err());
        assert!(check_qname(":local").is_err());
        assert!(check_qname("pre:").is_err());
    }

    #[test]
    fn test_any_uri() {
        assert!(check_any_uri("http://example.com/path?q=1").is_ok());
        assert!(check_any_uri("relative/path").is_ok());
        assert!(check_any_uri("has space").is_err());
        assert!(check_any_uri("line\nbreak").is_err());
    }
}
