//! `Pattern`: compiled regular expression predicate.
//!
//! Uses the `regex` crate (RE2 semantics, linear-time matching), so a hostile
//! pattern cannot trigger catastrophic backtracking. Anchoring is left to the
//! caller: `foo` matches anywhere in the input, `^foo$` only the whole input.

use crate::InexError;
use regex::{Regex, RegexBuilder};
use std::fmt;

/// A compiled regular expression.
///
/// Compilation happens once, at construction. An invalid expression is
/// reported as [`InexError::InvalidPattern`] then, never at evaluation time.
///
/// # Example
///
/// ```
/// use inex::Pattern;
///
/// let pattern = Pattern::new(r"^src/.*\.rs$").unwrap();
/// assert!(pattern.is_match("src/lib.rs"));
/// assert!(!pattern.is_match("tests/lib.rs"));
///
/// assert!(Pattern::new("[unclosed").is_err());
/// ```
#[derive(Clone)]
pub struct Pattern {
    regex: Regex,
}

impl Pattern {
    /// Compile a case-sensitive pattern.
    ///
    /// # Errors
    ///
    /// Returns [`InexError::InvalidPattern`] if the expression does not compile.
    pub fn new(expr: &str) -> Result<Self, InexError> {
        Self::build(expr, false)
    }

    /// Compile a case-insensitive pattern.
    ///
    /// # Errors
    ///
    /// Returns [`InexError::InvalidPattern`] if the expression does not compile.
    pub fn new_ignore_case(expr: &str) -> Result<Self, InexError> {
        Self::build(expr, true)
    }

    fn build(expr: &str, ignore_case: bool) -> Result<Self, InexError> {
        RegexBuilder::new(expr)
            .case_insensitive(ignore_case)
            .build()
            .map(|regex| Self { regex })
            .map_err(|source| InexError::InvalidPattern {
                pattern: expr.to_owned(),
                source,
            })
    }

    /// Returns `true` if the expression matches anywhere in `candidate`.
    #[must_use]
    pub fn is_match(&self, candidate: &str) -> bool {
        self.regex.is_match(candidate)
    }

    /// Returns the source expression.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl From<Regex> for Pattern {
    fn from(regex: Regex) -> Self {
        Self { regex }
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.as_str()).finish()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/", self.as_str())
    }
}
