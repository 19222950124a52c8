//! inex - composable include/exclude filter chains over strings
//!
//! Build an arbitrarily deep chain of "include" and "exclude" stages and ask
//! whether a string (usually a file path) survives all of them.
//!
//! # Architecture
//!
//! - [`Predicate`]: Boolean test over a single string: exact, set, prefix,
//!   suffix, contains, [`Pattern`], [`CustomPredicate`], and the combinators
//!   And / Or / Majority / Not / `AlwaysTrue` / `AlwaysFalse`
//! - [`Chain`]: Arena of stages linked parent → child. Each stage holds an
//!   optional predicate; the root may be a pass-through anchor
//! - [`StageId`]: Handle to a stage inside one chain
//! - [`PredicateTrace`] / [`ChainTrace`]: Evaluation traces for debugging
//!
//! # Evaluation rule
//!
//! Evaluation walks forward from a stage. A stage whose predicate does not
//! match stops the walk and rejects the string; later stages cannot rescue it.
//! A stage without a predicate (the pass-through root) never blocks, but on
//! its own it matches nothing.
//!
//! # Example
//!
//! ```
//! use inex::prelude::*;
//!
//! // Think `find . -name "*.rs" ! -path "*/target/*"`
//! let mut chain = Chain::new();
//! chain
//!     .root_mut()
//!     .include(Predicate::suffix(".rs"))
//!     .exclude(Predicate::contains("/target/"));
//!
//! assert!(chain.evaluate("src/lib.rs"));
//! assert!(!chain.evaluate("crate/target/debug/build.rs"));
//! assert!(!chain.evaluate("README.md"));
//! ```
//!
//! # Configuration
//!
//! With the `config` feature, chains can be described declaratively
//! ([`ChainConfig`]) and loaded from JSON or any serde format.

// ═══════════════════════════════════════════════════════════════════════════════
// Modules
// ═══════════════════════════════════════════════════════════════════════════════

mod chain;
mod pattern;
mod predicate;
mod trace;

#[cfg(feature = "config")]
mod config;

// ═══════════════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════════════

pub use chain::{Chain, StageId, StageMut, Stages};
pub use pattern::Pattern;
pub use predicate::{CustomPredicate, Predicate};
pub use trace::{ChainTrace, PredicateTrace, StageOutcome, StageStep};

#[cfg(feature = "config")]
pub use config::{ChainConfig, PredicateConfig, StageConfig};

// ═══════════════════════════════════════════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════════════════════════════════════════

/// Prelude module for convenient imports.
///
/// ```
/// use inex::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        Chain, ChainTrace, CustomPredicate, InexError, Pattern, Predicate, PredicateTrace,
        StageId, StageMut, StageOutcome, StageStep,
    };

    #[cfg(feature = "config")]
    pub use crate::{ChainConfig, PredicateConfig, StageConfig};
}

// ═══════════════════════════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════════════════════════

/// Maximum allowed nesting depth for configured predicates.
///
/// Protects predicate evaluation (which recurses) from stack overflow.
/// Enforced when loading a [`ChainConfig`]; programmatic construction is not limited.
pub const MAX_DEPTH: usize = 32;

/// Maximum number of stages in a configured chain (root excluded).
pub const MAX_STAGES: usize = 256;

/// Maximum number of children in a configured `And`, `Or` or `Majority`,
/// and of members in a configured set.
pub const MAX_PREDICATES_PER_COMPOUND: usize = 256;

/// Maximum length for literal patterns (exact, set members, prefix, suffix, contains).
pub const MAX_PATTERN_LENGTH: usize = 8192;

/// Maximum length for regex patterns.
///
/// Shorter than [`MAX_PATTERN_LENGTH`] because compiled regex size grows
/// faster than literal size.
pub const MAX_REGEX_PATTERN_LENGTH: usize = 4096;

// ═══════════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// Errors from predicate construction and configuration loading.
///
/// All of these surface while building predicates or chains. Evaluation itself
/// is infallible; a panicking [`CustomPredicate`] unwinds through the caller
/// of `evaluate` untouched.
#[derive(Debug, Clone, thiserror::Error)]
pub enum InexError {
    /// A regular expression failed to compile.
    #[error("invalid pattern \"{pattern}\": {source}")]
    InvalidPattern {
        /// The expression that failed to compile.
        pattern: String,
        /// The compiler error.
        #[source]
        source: regex::Error,
    },

    /// Configuration text could not be parsed into a [`ChainConfig`].
    #[error("invalid config: {message}")]
    InvalidConfig {
        /// The underlying parser message.
        message: String,
    },

    /// Predicate nesting exceeds [`MAX_DEPTH`].
    #[error(
        "predicate nesting depth is {depth}, but maximum allowed is {max} \
         (flatten nested and/or/not groups)"
    )]
    DepthExceeded {
        /// Actual depth of the predicate tree.
        depth: usize,
        /// Maximum allowed depth.
        max: usize,
    },

    /// Too many stages in a configured chain.
    #[error("chain has {count} stages, but maximum allowed is {max}")]
    TooManyStages {
        /// Actual number of stages.
        count: usize,
        /// Maximum allowed.
        max: usize,
    },

    /// Too many children in a compound predicate or members in a set.
    #[error("compound predicate has {count} children, but maximum allowed is {max}")]
    TooManyPredicates {
        /// Actual number of children.
        count: usize,
        /// Maximum allowed.
        max: usize,
    },

    /// A literal or regex pattern exceeds its maximum length.
    #[error("pattern length is {len}, but maximum allowed is {max}")]
    PatternTooLong {
        /// Actual length of the pattern in bytes.
        len: usize,
        /// Maximum allowed length.
        max: usize,
    },
}
