//! XSD-flavored regular-expression matching
//!
//! The pattern facet uses XML Schema regular expressions, which differ from
//! ordinary regex in two ways this module cares about: the expression is
//! implicitly anchored at both ends, and the multi-character escapes `\i`
//! (name start) and `\c` (name character) exist. The matcher itself is an
//! external concern; this module is the boundary behind which it lives.

use crate::error::{FacetError, FacetErrorKind};
use regex::Regex;

/// Regex class standing in for the XSD `\i` escape (name-start characters)
const NAME_START_CLASS: &str = "A-Za-z_:";
/// Regex class standing in for the XSD `\c` escape (name characters)
const NAME_CHAR_CLASS: &str = "-A-Za-z0-9._:";

/// A compiled, anchored XSD pattern
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compile an XSD-flavored pattern. Compilation failure is a
    /// construction-time facet error.
    pub fn new(source: &str) -> Result<Self, FacetError> {
        let translated = translate(source);
        let anchored = format!("^(?:{})$", translated);
        let regex = Regex::new(&anchored).map_err(|e| {
            FacetError::new(
                FacetErrorKind::InvalidPattern,
                format!("pattern does not compile: {}", e),
            )
            .with_facet("pattern")
            .with_value(source)
        })?;

        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    /// The pattern as written in the schema
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether the candidate matches the whole pattern
    pub fn matches(&self, candidate: &str) -> bool {
        self.regex.is_match(candidate)
    }
}

/// One-shot form of the matcher contract.
pub fn matches(pattern: &str, candidate: &str) -> Result<bool, FacetError> {
    Ok(Pattern::new(pattern)?.matches(candidate))
}

/// Rewrite the XSD-only escapes into plain regex character classes.
fn translate(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    let mut in_class = false;

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.peek() {
                Some('i') => {
                    chars.next();
                    if in_class {
                        out.push_str(NAME_START_CLASS);
                    } else {
                        out.push('[');
                        out.push_str(NAME_START_CLASS);
                        out.push(']');
                    }
                }
                Some('c') => {
                    chars.next();
                    if in_class {
                        out.push_str(NAME_CHAR_CLASS);
                    } else {
                        out.push('[');
                        out.push_str(NAME_CHAR_CLASS);
                        out.push(']');
                    }
                }
                Some(&next) => {
                    chars.next();
                    out.push('\\');
                    out.push(next);
                }
                None => out.push('\\'),
            },
            '[' => {
                in_class = true;
                out.push(c);
            }
            ']' => {
                in_class = false;
                out.push(c);
            }
            _ => out.push(c),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_is_anchored() {
        let p = Pattern::new(r"\d{3}").unwrap();
        assert!(p.matches("123"));
        assert!(!p.matches("1234"));
        assert!(!p.matches("a123"));
    }

    #[test]
    fn test_name_char_escape() {
        let p = Pattern::new(r"\c+").unwrap();
        assert!(p.matches("abc-123"));
        assert!(p.matches("a.b:c_d"));
        assert!(!p.matches("has space"));
        assert!(!p.matches(""));
    }

    #[test]
    fn test_name_start_escape() {
        let p = Pattern::new(r"\i\c*").unwrap();
        assert!(p.matches("element"));
        assert!(p.matches("_element"));
        assert!(p.matches("a1"));
        assert!(!p.matches("1a"));
    }

    #[test]
    fn test_escapes_inside_class() {
        let p = Pattern::new(r"[\c@]+").unwrap();
        assert!(p.matches("a@b"));
        assert!(!p.matches("a b"));
    }

    #[test]
    fn test_ordinary_escapes_untouched() {
        let p = Pattern::new(r"\d{3}-\d{4}").unwrap();
        assert!(p.matches("123-4567"));
        assert!(!p.matches("abc-4567"));
    }

    #[test]
    fn test_invalid_pattern_is_facet_error() {
        let err = Pattern::new(r"(").unwrap_err();
        assert_eq!(err.kind, FacetErrorKind::InvalidPattern);
    }

    #[test]
    fn test_one_shot_contract() {
        assert!(matches(r"\c+", "abc-123").unwrap());
        assert!(!matches(r"\c+", "has space").unwrap());
    }
}
