//! Pooled walkers.
//!
//! A [`WalkerPool`] couples one classifier with a free list of scratch
//! buffers. [`WalkerPool::borrow`] hands out a [`WalkerHandle`] whose tally
//! is always in the zero state; dropping the handle resets the scratch and
//! returns it to the pool, on every exit path.
//!
//! The tally lives in the handle, never in the pool, so nothing a previous
//! borrower observed can leak into the next verdict.

use std::mem;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::trace;

use crate::artifact::ParsedTree;
use crate::classifier::{self, Classifier, Scratch, VisitContext};
use crate::verdict::{Outcome, Tally, Verdict};

/// Number of idle scratch buffers a pool retains by default.
pub const DEFAULT_POOL_CAPACITY: usize = 20;

/// A classifier plus a free list of recycled scratch buffers.
///
/// Borrowing and releasing may happen concurrently from independent
/// searches.
pub struct WalkerPool<C: Classifier> {
    classifier: C,
    free: Mutex<Vec<C::Scratch>>,
    capacity: usize,
}

impl<C: Classifier> WalkerPool<C> {
    /// Create a pool with [`DEFAULT_POOL_CAPACITY`].
    pub fn new(classifier: C) -> Self {
        Self::with_capacity(classifier, DEFAULT_POOL_CAPACITY)
    }

    /// Create a pool retaining at most `capacity` idle buffers.
    pub fn with_capacity(classifier: C, capacity: usize) -> Self {
        WalkerPool {
            classifier,
            free: Mutex::new(Vec::new()),
            capacity,
        }
    }

    /// The pooled classifier.
    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    /// Maximum number of idle buffers kept.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of idle buffers currently held.
    pub fn idle(&self) -> usize {
        self.lock_free().len()
    }

    /// Borrow a walker in the zero state.
    pub fn borrow(&self) -> WalkerHandle<'_, C> {
        let scratch = self.lock_free().pop().unwrap_or_default();
        WalkerHandle {
            pool: self,
            scratch,
            tally: Tally::new(),
        }
    }

    /// Entries are reset before being pushed, so a poisoned list is still valid.
    fn lock_free(&self) -> MutexGuard<'_, Vec<C::Scratch>> {
        self.free.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn release(&self, mut scratch: C::Scratch) {
        scratch.reset();
        let mut free = self.lock_free();
        if free.len() < self.capacity {
            free.push(scratch);
        }
    }
}

impl<C: Classifier + std::fmt::Debug> std::fmt::Debug for WalkerPool<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalkerPool")
            .field("classifier", &self.classifier)
            .field("capacity", &self.capacity)
            .finish()
    }
}

/// Exclusive use of a pooled walker until dropped.
pub struct WalkerHandle<'p, C: Classifier> {
    pool: &'p WalkerPool<C>,
    scratch: C::Scratch,
    tally: Tally<C::Detail>,
}

impl<C: Classifier> WalkerHandle<'_, C> {
    /// Run one full traversal of `tree`.
    ///
    /// Evidence accumulates across calls on the same handle; the scratch
    /// buffer is cleared first since it caches per-tree data.
    pub fn visit(&mut self, tree: &ParsedTree) {
        self.scratch.reset();
        let classifier = &self.pool.classifier;
        let mut cx = VisitContext::new(tree.source(), &mut self.tally, &mut self.scratch);
        classifier::walk(classifier, tree.root(), &mut cx);
        trace!(
            classifier = classifier.name(),
            verdict = %self.tally.verdict(),
            "visited tree"
        );
    }

    /// The verdict accumulated so far.
    pub fn result(&self) -> Verdict {
        self.tally.verdict()
    }

    /// The verdict with the classifier detail attached.
    pub fn outcome(&self) -> Outcome<C::Detail> {
        self.tally.outcome()
    }
}

impl<C: Classifier> Drop for WalkerHandle<'_, C> {
    fn drop(&mut self) {
        let scratch = mem::take(&mut self.scratch);
        self.pool.release(scratch);
    }
}
