//! Chain: ordered include/exclude stages
//!
//! A [`Chain`] is an arena of stages. Each stage owns at most one child and
//! remembers its parent for navigation only. Stages are addressed through
//! [`StageId`] handles, which are tagged with the chain that issued them.
//!
//! Attaching a child to a stage that already has one replaces it. The old
//! child and everything below it become detached: still addressable through
//! handles the caller kept, but unreachable from the root.

use crate::{ChainTrace, Predicate, StageOutcome, StageStep};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_CHAIN: AtomicU64 = AtomicU64::new(0);

/// Handle to a stage inside a [`Chain`].
///
/// Handles are cheap to copy and stay valid for the lifetime of the chain,
/// including after the stage is detached by an overwrite. Passing a handle to
/// a different chain panics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StageId {
    chain: u64,
    index: usize,
}

impl StageId {
    /// Position of the stage in its chain's arena, in creation order.
    /// The root is always `0`.
    #[must_use]
    pub fn index(self) -> usize {
        self.index
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stage#{}", self.index)
    }
}

#[derive(Debug)]
struct Stage {
    predicate: Option<Predicate>,
    parent: Option<usize>,
    child: Option<usize>,
}

/// An ordered pipeline of include/exclude stages.
///
/// # Evaluation
///
/// Starting from a stage, evaluation:
///
/// 1. evaluates the stage's predicate, if it has one;
/// 2. moves on to the child if the predicate matched, or if the stage has no
///    predicate (pass-through);
/// 3. otherwise returns the predicate's result.
///
/// A rejected string is never rescued by a later stage. A bare pass-through
/// root with nothing attached matches nothing.
///
/// Evaluating from an interior stage covers only the suffix from that stage
/// on. Use [`evaluate`](Self::evaluate) for whole-chain semantics.
///
/// # Concurrency
///
/// Builder operations take `&mut self`; evaluation takes `&self`, so a built
/// chain can be shared across threads. Custom predicates own any state they
/// capture.
///
/// # Example
///
/// ```
/// use inex::prelude::*;
///
/// let mut chain = Chain::with_root(Predicate::set(["foo", "bar", "baz"]));
/// chain.root_mut().exclude(Predicate::exact("bar"));
///
/// assert!(chain.evaluate("foo"));
/// assert!(!chain.evaluate("bar"));
/// assert!(chain.evaluate("baz"));
/// ```
#[derive(Debug)]
pub struct Chain {
    id: u64,
    stages: Vec<Stage>,
}

impl Chain {
    const ROOT: usize = 0;

    /// Create a chain with a pass-through root.
    ///
    /// The root matches nothing until a stage is attached.
    #[must_use]
    pub fn new() -> Self {
        Self::from_root(None)
    }

    /// Create a chain whose root matches `predicate`.
    #[must_use]
    pub fn with_root(predicate: Predicate) -> Self {
        Self::from_root(Some(predicate))
    }

    /// Create a chain from any number of root predicates.
    ///
    /// - Empty → pass-through root
    /// - Single → root matches that predicate
    /// - Multiple → root matches all of them (`And`)
    pub fn from_predicates(predicates: impl IntoIterator<Item = Predicate>) -> Self {
        let mut predicates: Vec<Predicate> = predicates.into_iter().collect();
        let root = match predicates.len() {
            0 => None,
            1 => predicates.pop(),
            _ => Some(Predicate::And(predicates)),
        };
        Self::from_root(root)
    }

    fn from_root(predicate: Option<Predicate>) -> Self {
        Self {
            id: NEXT_CHAIN.fetch_add(1, Ordering::Relaxed),
            stages: vec![Stage {
                predicate,
                parent: None,
                child: None,
            }],
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Builder
    // ═══════════════════════════════════════════════════════════════════════

    /// Attach a new stage matching `predicate` as the child of `node`.
    ///
    /// Replaces any existing child of `node`; the replaced stages are detached.
    /// Returns the new stage.
    ///
    /// # Panics
    ///
    /// If `node` was issued by a different chain.
    pub fn attach_child(&mut self, node: StageId, predicate: Predicate) -> StageId {
        let parent = self.index(node);
        if let Some(old) = self.stages[parent].child {
            tracing::debug!(
                stage = %node,
                detached = self.walk(old).count(),
                "replacing existing child stage"
            );
        }

        let index = self.stages.len();
        self.stages.push(Stage {
            predicate: Some(predicate),
            parent: Some(parent),
            child: None,
        });
        self.stages[parent].child = Some(index);
        self.handle(index)
    }

    /// Attach a stage the input must match to pass. Same as
    /// [`attach_child`](Self::attach_child).
    ///
    /// Think `find . -name "*.rs"`.
    ///
    /// # Panics
    ///
    /// If `node` was issued by a different chain.
    pub fn include(&mut self, node: StageId, predicate: Predicate) -> StageId {
        self.attach_child(node, predicate)
    }

    /// Attach a stage the input must NOT match to pass. Same as
    /// `attach_child(node, !predicate)`.
    ///
    /// Think `find . ! -name "*.rs"`.
    ///
    /// # Panics
    ///
    /// If `node` was issued by a different chain.
    pub fn exclude(&mut self, node: StageId, predicate: Predicate) -> StageId {
        self.attach_child(node, predicate.negate())
    }

    /// Fluent builder positioned at the root.
    pub fn root_mut(&mut self) -> StageMut<'_> {
        let id = self.root_id();
        StageMut { chain: self, id }
    }

    /// Fluent builder positioned at the last stage reachable from the root.
    pub fn tail_mut(&mut self) -> StageMut<'_> {
        let id = self.tail_id();
        StageMut { chain: self, id }
    }

    /// Fluent builder positioned at `node`.
    ///
    /// # Panics
    ///
    /// If `node` was issued by a different chain.
    pub fn stage_mut(&mut self, node: StageId) -> StageMut<'_> {
        self.index(node);
        StageMut { chain: self, id: node }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Navigation
    // ═══════════════════════════════════════════════════════════════════════

    /// The root stage. Never changes over the chain's lifetime.
    #[must_use]
    pub fn root_id(&self) -> StageId {
        self.handle(Self::ROOT)
    }

    /// The last stage reachable from the root.
    #[must_use]
    pub fn tail_id(&self) -> StageId {
        self.end(self.root_id())
    }

    /// Returns `true` if `node` has no parent.
    ///
    /// # Panics
    ///
    /// If `node` was issued by a different chain.
    #[must_use]
    pub fn is_root(&self, node: StageId) -> bool {
        self.stages[self.index(node)].parent.is_none()
    }

    /// Follow parent links from `node` to the root. O(depth).
    ///
    /// # Panics
    ///
    /// If `node` was issued by a different chain.
    #[must_use]
    pub fn root(&self, node: StageId) -> StageId {
        let mut current = self.index(node);
        while let Some(parent) = self.stages[current].parent {
            current = parent;
        }
        self.handle(current)
    }

    /// Returns `true` if `node` has no child.
    ///
    /// # Panics
    ///
    /// If `node` was issued by a different chain.
    #[must_use]
    pub fn is_end(&self, node: StageId) -> bool {
        self.stages[self.index(node)].child.is_none()
    }

    /// Follow child links from `node` to the last stage. O(depth).
    ///
    /// # Panics
    ///
    /// If `node` was issued by a different chain.
    #[must_use]
    pub fn end(&self, node: StageId) -> StageId {
        let mut current = self.index(node);
        while let Some(child) = self.stages[current].child {
            current = child;
        }
        self.handle(current)
    }

    /// The parent of `node`, if any.
    ///
    /// # Panics
    ///
    /// If `node` was issued by a different chain.
    #[must_use]
    pub fn parent(&self, node: StageId) -> Option<StageId> {
        self.stages[self.index(node)]
            .parent
            .map(|index| self.handle(index))
    }

    /// The child of `node`, if any.
    ///
    /// # Panics
    ///
    /// If `node` was issued by a different chain.
    #[must_use]
    pub fn child(&self, node: StageId) -> Option<StageId> {
        self.stages[self.index(node)]
            .child
            .map(|index| self.handle(index))
    }

    /// The predicate of `node`; `None` for a pass-through root.
    ///
    /// # Panics
    ///
    /// If `node` was issued by a different chain.
    #[must_use]
    pub fn predicate(&self, node: StageId) -> Option<&Predicate> {
        self.stages[self.index(node)].predicate.as_ref()
    }

    /// Returns `true` if `node` is reachable from the root.
    ///
    /// Detached stages keep their parent link, so [`root`](Self::root) still
    /// resolves from them; this check walks up verifying each parent still
    /// points back down.
    ///
    /// # Panics
    ///
    /// If `node` was issued by a different chain.
    #[must_use]
    pub fn is_attached(&self, node: StageId) -> bool {
        let mut current = self.index(node);
        while let Some(parent) = self.stages[current].parent {
            if self.stages[parent].child != Some(current) {
                return false;
            }
            current = parent;
        }
        true
    }

    /// Number of stages reachable from the root, the root included.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.walk(Self::ROOT).count()
    }

    /// Iterate over `node` and every stage after it, in evaluation order.
    ///
    /// # Panics
    ///
    /// If `node` was issued by a different chain.
    pub fn stages(&self, node: StageId) -> Stages<'_> {
        self.walk(self.index(node))
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Evaluation
    // ═══════════════════════════════════════════════════════════════════════

    /// Evaluate `candidate` against the whole chain, starting at the root.
    pub fn evaluate(&self, candidate: &str) -> bool {
        self.evaluate_from(self.root_id(), candidate)
    }

    /// Evaluate `candidate` against `node` and the stages after it.
    ///
    /// Iterative, so chain length is not bounded by stack depth.
    ///
    /// # Panics
    ///
    /// If `node` was issued by a different chain.
    pub fn evaluate_from(&self, node: StageId, candidate: &str) -> bool {
        let mut current = self.index(node);
        loop {
            let stage = &self.stages[current];
            let matched = stage
                .predicate
                .as_ref()
                .is_some_and(|p| p.evaluate(candidate));
            let passes = matched || stage.predicate.is_none();

            match stage.child {
                Some(child) if passes => current = child,
                _ => {
                    if !passes {
                        tracing::trace!(stage = %self.handle(current), candidate, "rejected");
                    }
                    return matched;
                }
            }
        }
    }

    /// Evaluate with a full trace of the visited stages.
    ///
    /// The trace's `result` always equals [`evaluate_from`](Self::evaluate_from)
    /// for the same arguments.
    ///
    /// # Panics
    ///
    /// If `node` was issued by a different chain.
    #[must_use]
    pub fn evaluate_with_trace(&self, node: StageId, candidate: &str) -> ChainTrace {
        let mut steps = Vec::new();
        let mut current = self.index(node);
        loop {
            let stage = &self.stages[current];
            let outcome = match &stage.predicate {
                Some(p) => StageOutcome::Evaluated(p.evaluate_with_trace(candidate)),
                None => StageOutcome::PassThrough,
            };
            let matched = outcome.matched();
            steps.push(StageStep {
                stage: self.handle(current),
                outcome,
            });

            match stage.child {
                Some(child) if matched != Some(false) => current = child,
                _ => {
                    return ChainTrace {
                        result: matched.unwrap_or(false),
                        steps,
                    }
                }
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Internals
    // ═══════════════════════════════════════════════════════════════════════

    fn index(&self, id: StageId) -> usize {
        assert_eq!(id.chain, self.id, "{id} belongs to a different chain");
        id.index
    }

    fn handle(&self, index: usize) -> StageId {
        StageId {
            chain: self.id,
            index,
        }
    }

    fn walk(&self, start: usize) -> Stages<'_> {
        Stages {
            chain: self,
            next: Some(start),
        }
    }
}

impl Default for Chain {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over a stage and its descendants, created by [`Chain::stages`].
#[derive(Debug, Clone)]
pub struct Stages<'a> {
    chain: &'a Chain,
    next: Option<usize>,
}

impl Iterator for Stages<'_> {
    type Item = StageId;

    fn next(&mut self) -> Option<StageId> {
        let index = self.next?;
        self.next = self.chain.stages[index].child;
        Some(self.chain.handle(index))
    }
}

/// Fluent builder positioned at one stage of a [`Chain`].
///
/// Every builder call returns a `StageMut` positioned at the affected stage,
/// so include and exclude calls read in pipeline order:
///
/// ```
/// use inex::prelude::*;
///
/// let mut chain = Chain::new();
/// let tail = chain
///     .root_mut()
///     .include(Predicate::pattern(r"\.go$").unwrap())
///     .include(Predicate::pattern("(_test|inex)").unwrap())
///     .exclude(Predicate::contains("/"))
///     .id();
///
/// assert_eq!(chain.tail_id(), tail);
/// assert!(chain.evaluate("inex_test.go"));
/// assert!(!chain.evaluate("example/inex.go"));
/// assert!(!chain.evaluate("matcher.go"));
/// ```
#[derive(Debug)]
pub struct StageMut<'a> {
    chain: &'a mut Chain,
    id: StageId,
}

impl<'a> StageMut<'a> {
    /// The stage this builder is positioned at.
    #[must_use]
    pub fn id(&self) -> StageId {
        self.id
    }

    /// See [`Chain::attach_child`]. Moves to the new stage.
    pub fn attach_child(self, predicate: Predicate) -> StageMut<'a> {
        let id = self.chain.attach_child(self.id, predicate);
        StageMut {
            chain: self.chain,
            id,
        }
    }

    /// See [`Chain::include`]. Moves to the new stage.
    pub fn include(self, predicate: Predicate) -> StageMut<'a> {
        let id = self.chain.include(self.id, predicate);
        StageMut {
            chain: self.chain,
            id,
        }
    }

    /// See [`Chain::exclude`]. Moves to the new stage.
    pub fn exclude(self, predicate: Predicate) -> StageMut<'a> {
        let id = self.chain.exclude(self.id, predicate);
        StageMut {
            chain: self.chain,
            id,
        }
    }

    /// Moves to the root.
    #[must_use]
    pub fn root(self) -> StageMut<'a> {
        let id = self.chain.root(self.id);
        StageMut {
            chain: self.chain,
            id,
        }
    }

    /// Moves to the last stage below the current one.
    #[must_use]
    pub fn end(self) -> StageMut<'a> {
        let id = self.chain.end(self.id);
        StageMut {
            chain: self.chain,
            id,
        }
    }

    /// See [`Chain::is_root`].
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.chain.is_root(self.id)
    }

    /// See [`Chain::is_end`].
    #[must_use]
    pub fn is_end(&self) -> bool {
        self.chain.is_end(self.id)
    }

    /// Evaluate from this stage on. See [`Chain::evaluate_from`].
    pub fn evaluate(&self, candidate: &str) -> bool {
        self.chain.evaluate_from(self.id, candidate)
    }
}
