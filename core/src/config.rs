//! Config types for declarative chain construction.
//!
//! These types mirror the runtime types but are serde-(de)serializable,
//! so a chain can be described in JSON or YAML and built with
//! [`ChainConfig::build()`].
//!
//! # Relationship to runtime types
//!
//! | Config type | Runtime type | Loader method |
//! |-------------|-------------|---------------|
//! | [`ChainConfig`] | [`Chain`] | `ChainConfig::build()` |
//! | [`StageConfig`] | include / exclude stage | via `ChainConfig::build()` |
//! | [`PredicateConfig`] | [`Predicate`] | `PredicateConfig::compile()` |
//!
//! Custom predicates have no config form; attach them to the built chain.
//!
//! # Example
//!
//! ```
//! use inex::ChainConfig;
//!
//! let chain = ChainConfig::from_json(r#"{
//!     "root": [{ "type": "set", "values": ["foo", "bar", "baz"] }],
//!     "stages": [{ "exclude": { "type": "exact", "value": "bar" } }]
//! }"#)
//! .unwrap()
//! .build()
//! .unwrap();
//!
//! assert!(chain.evaluate("foo"));
//! assert!(!chain.evaluate("bar"));
//! ```

use crate::{
    Chain, InexError, Pattern, Predicate, MAX_DEPTH, MAX_PATTERN_LENGTH,
    MAX_PREDICATES_PER_COMPOUND, MAX_REGEX_PATTERN_LENGTH, MAX_STAGES,
};
use serde::{Deserialize, Serialize};

/// Configuration for a [`Chain`].
///
/// `root` predicates are combined as in [`Chain::from_predicates`]: none gives
/// a pass-through root, several are ANDed. `stages` are appended in order,
/// each as the child of the previous one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChainConfig {
    /// Predicates for the root stage.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub root: Vec<PredicateConfig>,

    /// Stages after the root, in evaluation order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stages: Vec<StageConfig>,
}

/// Configuration for one stage after the root.
///
/// ```json
/// { "include": { "type": "suffix", "value": ".rs" } }
/// { "exclude": { "type": "contains", "value": "/target/" } }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageConfig {
    /// The input must match to pass.
    Include(PredicateConfig),
    /// The input must NOT match to pass.
    Exclude(PredicateConfig),
}

/// Configuration for a [`Predicate`].
///
/// Uses `#[serde(tag = "type")]` for discriminated union deserialization:
///
/// ```json
/// { "type": "exact", "value": "Cargo.toml" }
/// { "type": "set", "values": ["a", "b"] }
/// { "type": "regex", "pattern": "\\.rs$", "ignore_case": false }
/// { "type": "and", "predicates": [...] }
/// { "type": "not", "predicate": { ... } }
/// { "type": "always_true" }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PredicateConfig {
    /// Exact string equality.
    Exact {
        /// The string to match.
        value: String,
    },
    /// Membership in a set of strings.
    Set {
        /// The members.
        values: Vec<String>,
    },
    /// String starts with a prefix.
    Prefix {
        /// The prefix.
        value: String,
    },
    /// String ends with a suffix.
    Suffix {
        /// The suffix.
        value: String,
    },
    /// String contains a substring.
    Contains {
        /// The substring.
        value: String,
    },
    /// Regular expression match (Rust `regex` crate syntax, linear time).
    Regex {
        /// The expression.
        pattern: String,
        /// Match case-insensitively.
        #[serde(default)]
        ignore_case: bool,
    },
    /// All predicates must match (empty matches nothing).
    And {
        /// Child predicates.
        predicates: Vec<PredicateConfig>,
    },
    /// Any predicate must match (empty matches nothing).
    Or {
        /// Child predicates.
        predicates: Vec<PredicateConfig>,
    },
    /// A strict majority of predicates must match.
    Majority {
        /// Child predicates.
        predicates: Vec<PredicateConfig>,
    },
    /// Inverts the inner predicate.
    Not {
        /// The predicate to negate.
        predicate: Box<PredicateConfig>,
    },
    /// Matches everything.
    AlwaysTrue,
    /// Matches nothing.
    AlwaysFalse,
}

impl ChainConfig {
    /// Parse a config from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`InexError::InvalidConfig`] if the text is not a valid config.
    pub fn from_json(json: &str) -> Result<Self, InexError> {
        serde_json::from_str(json).map_err(invalid_config)
    }

    /// Convert an already-parsed JSON value (e.g. a YAML document read into
    /// `serde_json::Value`) into a config.
    ///
    /// # Errors
    ///
    /// Returns [`InexError::InvalidConfig`] if the value is not a valid config.
    pub fn from_value(value: serde_json::Value) -> Result<Self, InexError> {
        serde_json::from_value(value).map_err(invalid_config)
    }

    /// Build a runtime [`Chain`] from this config.
    ///
    /// Validates limits before compiling: [`MAX_STAGES`] stages,
    /// [`MAX_DEPTH`] predicate nesting, [`MAX_PREDICATES_PER_COMPOUND`]
    /// children per compound, and the pattern length limits.
    ///
    /// # Errors
    ///
    /// Returns the first limit violation or [`InexError::InvalidPattern`].
    pub fn build(&self) -> Result<Chain, InexError> {
        if self.stages.len() > MAX_STAGES {
            return Err(InexError::TooManyStages {
                count: self.stages.len(),
                max: MAX_STAGES,
            });
        }
        check_width(self.root.len())?;

        let root = self
            .root
            .iter()
            .map(PredicateConfig::compile)
            .collect::<Result<Vec<_>, _>>()?;
        let mut chain = Chain::from_predicates(root);

        let mut tail = chain.root_id();
        for stage in &self.stages {
            tail = match stage {
                StageConfig::Include(p) => chain.include(tail, p.compile()?),
                StageConfig::Exclude(p) => chain.exclude(tail, p.compile()?),
            };
        }

        tracing::debug!(stages = chain.stage_count(), "built chain from config");
        Ok(chain)
    }
}

impl PredicateConfig {
    /// Calculate the nesting depth. Leaves have depth 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::And { predicates } | Self::Or { predicates } | Self::Majority { predicates } => {
                1 + predicates.iter().map(Self::depth).max().unwrap_or(0)
            }
            Self::Not { predicate } => 1 + predicate.depth(),
            _ => 1,
        }
    }

    /// Compile into a runtime [`Predicate`].
    ///
    /// # Errors
    ///
    /// - [`InexError::DepthExceeded`] if nesting exceeds [`MAX_DEPTH`]
    /// - [`InexError::TooManyPredicates`] if a compound or set is too wide
    /// - [`InexError::PatternTooLong`] if a literal or regex is too long
    /// - [`InexError::InvalidPattern`] if a regex does not compile
    pub fn compile(&self) -> Result<Predicate, InexError> {
        let depth = self.depth();
        if depth > MAX_DEPTH {
            return Err(InexError::DepthExceeded {
                depth,
                max: MAX_DEPTH,
            });
        }
        self.compile_unchecked()
    }

    fn compile_unchecked(&self) -> Result<Predicate, InexError> {
        Ok(match self {
            Self::Exact { value } => Predicate::Exact(literal(value)?),
            Self::Set { values } => {
                check_width(values.len())?;
                Predicate::Set(values.iter().map(|v| literal(v)).collect::<Result<_, _>>()?)
            }
            Self::Prefix { value } => Predicate::Prefix(literal(value)?),
            Self::Suffix { value } => Predicate::Suffix(literal(value)?),
            Self::Contains { value } => Predicate::Contains(literal(value)?),
            Self::Regex {
                pattern,
                ignore_case,
            } => {
                if pattern.len() > MAX_REGEX_PATTERN_LENGTH {
                    return Err(InexError::PatternTooLong {
                        len: pattern.len(),
                        max: MAX_REGEX_PATTERN_LENGTH,
                    });
                }
                let compiled = if *ignore_case {
                    Pattern::new_ignore_case(pattern)?
                } else {
                    Pattern::new(pattern)?
                };
                Predicate::Pattern(compiled)
            }
            Self::And { predicates } => Predicate::And(compile_all(predicates)?),
            Self::Or { predicates } => Predicate::Or(compile_all(predicates)?),
            Self::Majority { predicates } => Predicate::Majority(compile_all(predicates)?),
            Self::Not { predicate } => predicate.compile_unchecked()?.negate(),
            Self::AlwaysTrue => Predicate::AlwaysTrue,
            Self::AlwaysFalse => Predicate::AlwaysFalse,
        })
    }
}

fn compile_all(predicates: &[PredicateConfig]) -> Result<Vec<Predicate>, InexError> {
    check_width(predicates.len())?;
    predicates
        .iter()
        .map(PredicateConfig::compile_unchecked)
        .collect()
}

fn check_width(count: usize) -> Result<(), InexError> {
    if count > MAX_PREDICATES_PER_COMPOUND {
        return Err(InexError::TooManyPredicates {
            count,
            max: MAX_PREDICATES_PER_COMPOUND,
        });
    }
    Ok(())
}

fn literal(value: &str) -> Result<String, InexError> {
    if value.len() > MAX_PATTERN_LENGTH {
        return Err(InexError::PatternTooLong {
            len: value.len(),
            max: MAX_PATTERN_LENGTH,
        });
    }
    Ok(value.to_owned())
}

fn invalid_config(e: serde_json::Error) -> InexError {
    InexError::InvalidConfig {
        message: e.to_string(),
    }
}
