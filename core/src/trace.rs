//! Evaluation trace types for debugging chain behavior.
//!
//! Trace types mirror the runtime types ([`Predicate`](crate::Predicate),
//! [`Chain`](crate::Chain)) but capture evaluation results instead of
//! inputs. Use `evaluate_with_trace()` to see why a string was kept or dropped.
//!
//! # Two Levels of Trace
//!
//! - [`PredicateTrace`]: Per-predicate: which sub-expressions matched?
//! - [`ChainTrace`]: Per-chain: which stages were visited, where did it stop?
//!
//! # Example
//!
//! ```
//! use inex::prelude::*;
//!
//! let mut chain = Chain::with_root(Predicate::set(["foo", "bar", "baz"]));
//! chain.root_mut().exclude(Predicate::exact("bar"));
//!
//! let trace = chain.evaluate_with_trace(chain.root_id(), "bar");
//! assert!(!trace.result);
//! assert_eq!(trace.steps.len(), 2);
//! assert_eq!(trace.rejected_by(), Some(chain.end(chain.root_id())));
//! ```

use crate::StageId;

/// Trace of a predicate evaluation.
///
/// Mirrors [`Predicate`](crate::Predicate) structure but captures results.
///
/// In And/Or, ALL children are evaluated (no short-circuit) for maximum
/// debugging value. The `matched` result is still correct.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum PredicateTrace {
    /// A primitive predicate (exact, set, pattern, custom, constant, ...).
    Leaf {
        /// Whether this predicate matched.
        matched: bool,
        /// Display form of the predicate (e.g. `Exact("foo")`).
        predicate: String,
    },
    /// AND: all children must match.
    And {
        /// Whether all children matched (false when there are none).
        matched: bool,
        /// Trace of each child (all evaluated, no short-circuit).
        children: Vec<PredicateTrace>,
    },
    /// OR: any child must match.
    Or {
        /// Whether any child matched.
        matched: bool,
        /// Trace of each child (all evaluated, no short-circuit).
        children: Vec<PredicateTrace>,
    },
    /// MAJORITY: strictly more children matched than not.
    Majority {
        /// Whether a strict majority matched.
        matched: bool,
        /// Number of children that matched.
        votes: usize,
        /// Trace of each child.
        children: Vec<PredicateTrace>,
    },
    /// NOT: inverts inner result.
    Not {
        /// Whether the NOT predicate matched (i.e., inner did NOT match).
        matched: bool,
        /// Trace of the inner predicate.
        inner: Box<PredicateTrace>,
    },
}

impl PredicateTrace {
    /// Get the overall match result of this predicate.
    #[must_use]
    pub fn matched(&self) -> bool {
        match self {
            Self::Leaf { matched, .. }
            | Self::And { matched, .. }
            | Self::Or { matched, .. }
            | Self::Majority { matched, .. }
            | Self::Not { matched, .. } => *matched,
        }
    }
}

/// Trace of a [`Chain`](crate::Chain) evaluation.
///
/// # INV: `result` == `evaluate_from()` result
///
/// The `result` field always equals what
/// [`Chain::evaluate_from()`](crate::Chain::evaluate_from) returns for the same
/// stage and input.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ChainTrace {
    /// The final result.
    pub result: bool,
    /// Every stage visited, in order. Stops where evaluation stopped.
    pub steps: Vec<StageStep>,
}

impl ChainTrace {
    /// The last stage visited.
    #[must_use]
    pub fn stopped_at(&self) -> Option<StageId> {
        self.steps.last().map(|step| step.stage)
    }

    /// The stage whose predicate rejected the input, if any.
    ///
    /// `None` when the input was accepted, or when the chain is a bare
    /// pass-through root (which matches nothing without rejecting).
    #[must_use]
    pub fn rejected_by(&self) -> Option<StageId> {
        self.steps
            .last()
            .filter(|step| step.outcome.matched() == Some(false))
            .map(|step| step.stage)
    }
}

/// One stage's evaluation in a [`ChainTrace`].
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StageStep {
    /// The stage visited.
    pub stage: StageId,
    /// What the stage did.
    pub outcome: StageOutcome,
}

/// What a visited stage did with the input.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum StageOutcome {
    /// The stage has no predicate and forwarded the input.
    PassThrough,
    /// The stage evaluated its predicate.
    Evaluated(PredicateTrace),
}

impl StageOutcome {
    /// `None` for a pass-through, otherwise whether the predicate matched.
    #[must_use]
    pub fn matched(&self) -> Option<bool> {
        match self {
            Self::PassThrough => None,
            Self::Evaluated(trace) => Some(trace.matched()),
        }
    }
}
