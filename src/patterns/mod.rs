//! Name patterns: declaration matching and namespace prefix derivation
//!
//! Architectural Principle: Service Layer - pattern matching is isolated behind small typed APIs
//! - DeclarationPattern decides which lines of a layer source declare a variable
//! - PrefixToken derivation is pure and total over every possible name
//! - Compiled regexes are built once and shared

use crate::domain::findings::{GuardianError, GuardianResult};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default declaration pattern: a YAML top-level key
pub const DEFAULT_DECLARATION_PATTERN: &str = r"^([A-Za-z0-9_]+):";

lazy_static! {
    static ref DOUBLE_UNDERSCORE_PREFIX: Regex =
        Regex::new(r"^[A-Za-z0-9]+(_[A-Za-z0-9]+)?__[A-Za-z0-9]+").unwrap();
    static ref SINGLE_UNDERSCORE_PREFIX: Regex =
        Regex::new(r"^[A-Za-z0-9]+_[A-Za-z0-9]+").unwrap();
    static ref IDENTIFIER: Regex = Regex::new(r"^[A-Za-z0-9_]+$").unwrap();
}

/// Compiled pattern recognising a variable declaration at the start of a line
///
/// The variable name is capture group 1 when the pattern has one, otherwise
/// the whole match.
#[derive(Debug, Clone)]
pub struct DeclarationPattern {
    regex: Regex,
}

impl DeclarationPattern {
    pub fn new(pattern: &str) -> GuardianResult<Self> {
        let regex = Regex::new(pattern).map_err(|e| {
            GuardianError::config(format!("Invalid declaration pattern '{pattern}': {e}"))
        })?;
        Ok(Self { regex })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Extract the declared name from a single line, if any
    pub fn declared_name<'a>(&self, line: &'a str) -> Option<&'a str> {
        let captures = self.regex.captures(line)?;
        let name = captures.get(1).or_else(|| captures.get(0))?.as_str();
        if name.is_empty() {
            None
        } else {
            Some(name)
        }
    }
}

impl Default for DeclarationPattern {
    fn default() -> Self {
        Self {
            regex: Regex::new(DEFAULT_DECLARATION_PATTERN)
                .expect("default declaration pattern is a valid regex"),
        }
    }
}

/// Namespace key derived from a variable name
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "token", rename_all = "snake_case")]
pub enum PrefixToken {
    /// Everything up to and including the double underscore, e.g. `app_web__`
    DoubleUnderscore(String),
    /// Everything up to and including the first underscore, e.g. `app_`
    SingleUnderscore(String),
    /// A single word without namespace
    None,
}

impl PrefixToken {
    pub fn token(&self) -> Option<&str> {
        match self {
            Self::DoubleUnderscore(t) | Self::SingleUnderscore(t) => Some(t),
            Self::None => None,
        }
    }

    pub fn is_one_word(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl fmt::Display for PrefixToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.token() {
            Some(token) => f.write_str(token),
            None => f.write_str("-"),
        }
    }
}

/// Derive the prefix token of a name; the double-underscore form wins
pub fn prefix_token(name: &str) -> PrefixToken {
    if let Some(m) = DOUBLE_UNDERSCORE_PREFIX.find(name) {
        // the match ends one identifier char past the `__`
        if let Some(end) = m.as_str().find("__") {
            return PrefixToken::DoubleUnderscore(name[..end + 2].to_string());
        }
    }

    if SINGLE_UNDERSCORE_PREFIX.is_match(name) {
        if let Some(end) = name.find('_') {
            return PrefixToken::SingleUnderscore(name[..end + 1].to_string());
        }
    }

    PrefixToken::None
}

/// Whether a string is a plain variable identifier
pub fn is_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("app_port", PrefixToken::SingleUnderscore("app_".into()))]
    #[case("app_web_port", PrefixToken::SingleUnderscore("app_".into()))]
    #[case("app__port", PrefixToken::DoubleUnderscore("app__".into()))]
    #[case("app_web__port", PrefixToken::DoubleUnderscore("app_web__".into()))]
    #[case("a_b_c__d", PrefixToken::SingleUnderscore("a_".into()))]
    #[case("port", PrefixToken::None)]
    #[case("_private", PrefixToken::None)]
    #[case("trailing_", PrefixToken::None)]
    #[case("app__", PrefixToken::None)]
    fn test_prefix_token(#[case] name: &str, #[case] expected: PrefixToken) {
        assert_eq!(prefix_token(name), expected);
    }

    #[test]
    fn test_double_underscore_wins_when_both_match() {
        // `db_main__host` also matches the single-underscore form
        assert!(SINGLE_UNDERSCORE_PREFIX.is_match("db_main__host"));
        assert_eq!(
            prefix_token("db_main__host"),
            PrefixToken::DoubleUnderscore("db_main__".into())
        );
    }

    #[test]
    fn test_declaration_pattern_default() {
        let pattern = DeclarationPattern::default();

        assert_eq!(pattern.declared_name("web_port: 80"), Some("web_port"));
        assert_eq!(pattern.declared_name("  nested: 1"), None);
        assert_eq!(pattern.declared_name("# comment: x"), None);
        assert_eq!(pattern.declared_name("---"), None);
    }

    #[test]
    fn test_declaration_pattern_without_group() {
        let pattern = DeclarationPattern::new(r"^[a-z_]+").unwrap();
        assert_eq!(pattern.declared_name("key = value"), Some("key"));
    }

    #[test]
    fn test_invalid_declaration_pattern() {
        assert!(matches!(
            DeclarationPattern::new("(unclosed"),
            Err(GuardianError::Configuration { .. })
        ));
    }
}
