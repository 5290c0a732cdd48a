//! The per-convention classifier contract.
//!
//! A [`Classifier`] is offered every named node of a syntax tree in
//! depth-first, pre-order, source order. For each node it may record
//! evidence through the [`VisitContext`] and it decides, via
//! [`VisitResult`], whether the walker descends into the node's children.
//!
//! Classifiers are stateless values shared by every walker of a pool. All
//! per-visit state lives in the context: the evidence [`Tally`] and a
//! classifier-chosen [`Scratch`] buffer that the pool recycles between
//! borrowers.
//!
//! # Example
//!
//! ```
//! use tree_sitter::Node;
//! use tugstyle_core::classifier::{Classifier, VisitContext, VisitResult};
//! use tugstyle_core::verdict::Observation;
//!
//! /// Every class declaration counts as evidence for the convention.
//! struct HasClasses;
//!
//! impl Classifier for HasClasses {
//!     type Detail = ();
//!     type Scratch = ();
//!
//!     fn name(&self) -> &'static str {
//!         "has-classes"
//!     }
//!
//!     fn visit(&self, node: Node<'_>, cx: &mut VisitContext<'_, (), ()>) -> VisitResult {
//!         if node.kind() == "class_declaration" {
//!             cx.record(Observation::YES);
//!             return VisitResult::SkipChildren;
//!         }
//!         VisitResult::Continue
//!     }
//! }
//! ```

use tree_sitter::Node;

use crate::verdict::{Observation, Tally};

/// Result of visiting a node - controls traversal behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VisitResult {
    /// Continue traversal into children.
    #[default]
    Continue,

    /// Skip children, continue with siblings.
    ///
    /// Used when the subtree structurally cannot hold relevant evidence.
    SkipChildren,
}

/// Reusable working memory for a classifier.
///
/// The pool hands the same buffer to successive borrowers after calling
/// [`Scratch::reset`], so nothing stored here may influence a verdict
/// across artifacts.
pub trait Scratch: Default + Send {
    /// Clear contents, keeping allocations.
    fn reset(&mut self);
}

impl Scratch for () {
    fn reset(&mut self) {}
}

/// A per-convention rule over syntax nodes.
pub trait Classifier: Send + Sync {
    /// Payload attached to positive evidence.
    type Detail: Clone + Send;

    /// Working memory recycled by the walker pool.
    type Scratch: Scratch;

    /// Stable name, used in logs.
    fn name(&self) -> &'static str;

    /// Inspect one node.
    fn visit(
        &self,
        node: Node<'_>,
        cx: &mut VisitContext<'_, Self::Detail, Self::Scratch>,
    ) -> VisitResult;
}

/// Everything a classifier may touch while visiting one artifact.
pub struct VisitContext<'a, D, S> {
    source: &'a str,
    tally: &'a mut Tally<D>,
    scratch: &'a mut S,
}

impl<'a, D, S> VisitContext<'a, D, S> {
    /// Create a context over the given source text, tally and scratch.
    pub fn new(source: &'a str, tally: &'a mut Tally<D>, scratch: &'a mut S) -> Self {
        VisitContext {
            source,
            tally,
            scratch,
        }
    }

    /// Source text of the artifact being visited.
    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Text covered by `node`, or the empty string if the range is not
    /// a valid slice of the source.
    pub fn text(&self, node: Node<'_>) -> &'a str {
        self.source.get(node.byte_range()).unwrap_or("")
    }

    /// Record evidence. The only way a classifier influences the verdict.
    pub fn record(&mut self, observation: Observation<D>) {
        self.tally.record(observation);
    }

    /// Source text and scratch buffer at once.
    pub fn split(&mut self) -> (&'a str, &mut S) {
        (self.source, &mut *self.scratch)
    }
}

/// Drive `classifier` over the subtree rooted at `root`.
///
/// Only named nodes are offered to the classifier; anonymous tokens are
/// traversed silently. The walk always covers the whole tree apart from
/// pruned subtrees.
pub fn walk<C: Classifier + ?Sized>(
    classifier: &C,
    root: Node<'_>,
    cx: &mut VisitContext<'_, C::Detail, C::Scratch>,
) {
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        let action = if node.is_named() {
            classifier.visit(node, cx)
        } else {
            VisitResult::Continue
        };

        if action == VisitResult::Continue && cursor.goto_first_child() {
            continue;
        }

        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return;
            }
        }
    }
}
