//! Predicate: Boolean tests over a single string
//!
//! A [`Predicate`] is a closed set of primitives (exact, set, prefix, suffix,
//! contains, pattern, custom) plus combinators (And, Or, Majority, Not and
//! the two constants). Combinators own their children, so any predicate can
//! be nested inside any other.

use crate::{Pattern, PredicateTrace};
use std::fmt;
use std::sync::Arc;

type MatchFn = dyn Fn(&str) -> bool + Send + Sync;

/// A caller-supplied predicate function.
///
/// The function owns whatever state it captures; the engine only calls it.
/// State may change between calls (e.g. through an `AtomicBool`) and every
/// evaluation observes the current state, since nothing is cached.
///
/// The function should be total. If it panics, the panic unwinds through
/// whoever called `evaluate`.
///
/// # Example
///
/// ```
/// use inex::{CustomPredicate, Predicate};
///
/// let hidden = Predicate::from(CustomPredicate::named("hidden", |path| {
///     path.rsplit('/').next().is_some_and(|name| name.starts_with('.'))
/// }));
/// assert!(hidden.evaluate("src/.gitignore"));
/// assert!(!hidden.evaluate("src/lib.rs"));
/// ```
#[derive(Clone)]
pub struct CustomPredicate {
    name: Option<String>,
    func: Arc<MatchFn>,
}

impl CustomPredicate {
    /// Wrap an anonymous function.
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self {
            name: None,
            func: Arc::new(func),
        }
    }

    /// Wrap a function under a name shown in `Debug`, `Display` and traces.
    pub fn named<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self {
            name: Some(name.into()),
            func: Arc::new(func),
        }
    }

    /// Returns the name, if one was given.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Call the wrapped function.
    pub fn call(&self, candidate: &str) -> bool {
        (self.func)(candidate)
    }
}

impl fmt::Debug for CustomPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomPredicate")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Boolean test over a single string.
///
/// # Combinator semantics
///
/// - `And`: every child matches. Short-circuits on the first `false`.
///   **An empty `And` matches nothing**, same as an empty `Or`, unlike
///   classical vacuous truth.
/// - `Or`: any child matches. Short-circuits on the first `true`.
/// - `Majority`: strictly more children match than do not. Every child is
///   evaluated; a tie does not match, so an empty `Majority` matches nothing.
/// - `Not`: inverts its child.
///
/// # Example
///
/// ```
/// use inex::Predicate;
///
/// let sources = Predicate::and([
///     Predicate::suffix(".rs"),
///     !Predicate::set(["build.rs", "src/build.rs"]),
/// ]);
/// assert!(sources.evaluate("src/main.rs"));
/// assert!(!sources.evaluate("build.rs"));
/// ```
#[derive(Debug, Clone)]
pub enum Predicate {
    /// Input equals the value.
    Exact(String),
    /// Input equals any member (linear scan). An empty set matches nothing.
    Set(Vec<String>),
    /// Input starts with the value.
    Prefix(String),
    /// Input ends with the value.
    Suffix(String),
    /// Input contains the value.
    Contains(String),
    /// Regular expression matches somewhere in the input.
    Pattern(Pattern),
    /// Caller-supplied function returns `true`.
    Custom(CustomPredicate),
    /// All children match; empty matches nothing.
    And(Vec<Predicate>),
    /// Any child matches; empty matches nothing.
    Or(Vec<Predicate>),
    /// Strict majority of children match.
    Majority(Vec<Predicate>),
    /// Child does not match.
    Not(Box<Predicate>),
    /// Matches everything.
    AlwaysTrue,
    /// Matches nothing.
    AlwaysFalse,
}

impl Predicate {
    /// Match a single string exactly.
    pub fn exact(value: impl Into<String>) -> Self {
        Self::Exact(value.into())
    }

    /// Match any of the given strings exactly.
    pub fn set<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Set(values.into_iter().map(Into::into).collect())
    }

    /// Match strings starting with `prefix`.
    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self::Prefix(prefix.into())
    }

    /// Match strings ending with `suffix`.
    pub fn suffix(suffix: impl Into<String>) -> Self {
        Self::Suffix(suffix.into())
    }

    /// Match strings containing `substring`.
    pub fn contains(substring: impl Into<String>) -> Self {
        Self::Contains(substring.into())
    }

    /// Compile a regular expression predicate.
    ///
    /// # Errors
    ///
    /// Returns [`InexError::InvalidPattern`](crate::InexError::InvalidPattern)
    /// if the expression does not compile.
    pub fn pattern(expr: &str) -> Result<Self, crate::InexError> {
        Pattern::new(expr).map(Self::Pattern)
    }

    /// Compile a case-insensitive regular expression predicate.
    ///
    /// # Errors
    ///
    /// Returns [`InexError::InvalidPattern`](crate::InexError::InvalidPattern)
    /// if the expression does not compile.
    pub fn pattern_ignore_case(expr: &str) -> Result<Self, crate::InexError> {
        Pattern::new_ignore_case(expr).map(Self::Pattern)
    }

    /// Wrap a caller-supplied function.
    pub fn custom<F>(func: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self::Custom(CustomPredicate::new(func))
    }

    /// All predicates must match. Empty matches nothing.
    pub fn and(predicates: impl IntoIterator<Item = Predicate>) -> Self {
        Self::And(predicates.into_iter().collect())
    }

    /// Any predicate must match. Empty matches nothing.
    pub fn or(predicates: impl IntoIterator<Item = Predicate>) -> Self {
        Self::Or(predicates.into_iter().collect())
    }

    /// A strict majority of predicates must match.
    pub fn majority(predicates: impl IntoIterator<Item = Predicate>) -> Self {
        Self::Majority(predicates.into_iter().collect())
    }

    /// Invert this predicate.
    #[must_use]
    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Evaluate this predicate against `candidate`.
    ///
    /// Recursive over combinators. Nesting from configuration is bounded by
    /// [`MAX_DEPTH`](crate::MAX_DEPTH); programmatic nesting is the caller's concern.
    pub fn evaluate(&self, candidate: &str) -> bool {
        match self {
            Self::Exact(value) => candidate == value,
            Self::Set(values) => values.iter().any(|v| v == candidate),
            Self::Prefix(value) => candidate.starts_with(value.as_str()),
            Self::Suffix(value) => candidate.ends_with(value.as_str()),
            Self::Contains(value) => candidate.contains(value.as_str()),
            Self::Pattern(pattern) => pattern.is_match(candidate),
            Self::Custom(custom) => custom.call(candidate),
            Self::And(predicates) => {
                !predicates.is_empty() && predicates.iter().all(|p| p.evaluate(candidate))
            }
            Self::Or(predicates) => predicates.iter().any(|p| p.evaluate(candidate)),
            Self::Majority(predicates) => {
                let matched = predicates.iter().filter(|p| p.evaluate(candidate)).count();
                matched > predicates.len() - matched
            }
            Self::Not(predicate) => !predicate.evaluate(candidate),
            Self::AlwaysTrue => true,
            Self::AlwaysFalse => false,
        }
    }

    /// Evaluate with full trace for debugging.
    ///
    /// Unlike [`evaluate()`](Self::evaluate), this does NOT short-circuit
    /// In And/Or all children are evaluated. The `matched` result is the same.
    #[must_use]
    pub fn evaluate_with_trace(&self, candidate: &str) -> PredicateTrace {
        match self {
            Self::And(predicates) => {
                let children = trace_all(predicates, candidate);
                let matched = !children.is_empty() && children.iter().all(PredicateTrace::matched);
                PredicateTrace::And { matched, children }
            }
            Self::Or(predicates) => {
                let children = trace_all(predicates, candidate);
                let matched = children.iter().any(PredicateTrace::matched);
                PredicateTrace::Or { matched, children }
            }
            Self::Majority(predicates) => {
                let children = trace_all(predicates, candidate);
                let votes = children.iter().filter(|c| c.matched()).count();
                PredicateTrace::Majority {
                    matched: votes > children.len() - votes,
                    votes,
                    children,
                }
            }
            Self::Not(predicate) => {
                let inner = predicate.evaluate_with_trace(candidate);
                PredicateTrace::Not {
                    matched: !inner.matched(),
                    inner: Box::new(inner),
                }
            }
            leaf => PredicateTrace::Leaf {
                matched: leaf.evaluate(candidate),
                predicate: leaf.to_string(),
            },
        }
    }

    /// Compose predicates with AND semantics, optimizing for common cases.
    ///
    /// - Empty → `fallback`
    /// - Single → unwrapped (no wrapping overhead)
    /// - Multiple → `And(predicates)`
    #[must_use]
    pub fn from_all(predicates: Vec<Self>, fallback: Self) -> Self {
        Self::compose(predicates, fallback, Self::And)
    }

    /// Compose predicates with OR semantics, optimizing for common cases.
    ///
    /// Symmetric with [`from_all`](Self::from_all).
    #[must_use]
    pub fn from_any(predicates: Vec<Self>, fallback: Self) -> Self {
        Self::compose(predicates, fallback, Self::Or)
    }

    fn compose(mut predicates: Vec<Self>, fallback: Self, wrap: fn(Vec<Self>) -> Self) -> Self {
        match predicates.len() {
            0 => fallback,
            1 => predicates.swap_remove(0),
            _ => wrap(predicates),
        }
    }

    /// Returns `true` for And, Or, Majority and Not.
    #[must_use]
    pub fn is_combinator(&self) -> bool {
        matches!(
            self,
            Self::And(_) | Self::Or(_) | Self::Majority(_) | Self::Not(_)
        )
    }

    /// Calculate the depth of this predicate tree. Leaves have depth 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::And(ps) | Self::Or(ps) | Self::Majority(ps) => {
                1 + ps.iter().map(Self::depth).max().unwrap_or(0)
            }
            Self::Not(p) => 1 + p.depth(),
            _ => 1,
        }
    }
}

fn trace_all(predicates: &[Predicate], candidate: &str) -> Vec<PredicateTrace> {
    predicates
        .iter()
        .map(|p| p.evaluate_with_trace(candidate))
        .collect()
}

impl std::ops::Not for Predicate {
    type Output = Self;

    fn not(self) -> Self {
        self.negate()
    }
}

impl From<Pattern> for Predicate {
    fn from(pattern: Pattern) -> Self {
        Self::Pattern(pattern)
    }
}

impl From<CustomPredicate> for Predicate {
    fn from(custom: CustomPredicate) -> Self {
        Self::Custom(custom)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(v) => write!(f, "Exact({v:?})"),
            Self::Set(vs) => write!(f, "Set{vs:?}"),
            Self::Prefix(v) => write!(f, "Prefix({v:?})"),
            Self::Suffix(v) => write!(f, "Suffix({v:?})"),
            Self::Contains(v) => write!(f, "Contains({v:?})"),
            Self::Pattern(p) => write!(f, "Pattern({p})"),
            Self::Custom(c) => match c.name() {
                Some(name) => write!(f, "Custom({name})"),
                None => f.write_str("Custom"),
            },
            Self::And(ps) => write_list(f, "And", ps),
            Self::Or(ps) => write_list(f, "Or", ps),
            Self::Majority(ps) => write_list(f, "Majority", ps),
            Self::Not(p) => write!(f, "Not({p})"),
            Self::AlwaysTrue => f.write_str("AlwaysTrue"),
            Self::AlwaysFalse => f.write_str("AlwaysFalse"),
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, name: &str, predicates: &[Predicate]) -> fmt::Result {
    write!(f, "{name}(")?;
    for (i, p) in predicates.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{p}")?;
    }
    f.write_str(")")
}
