//! Prioritized multi-artifact search.
//!
//! Evidence nearest to the artifact being edited is the best predictor of
//! the convention its authors expect. The search visits:
//!
//! 1. the current artifact;
//! 2. other artifacts in exactly the same folder;
//! 3. artifacts in folders below it;
//! 4. everything else in group order, except artifacts sitting directly
//!    under a single build-output folder.
//!
//! and stops at the first artifact whose verdict is not `Unknown`.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::artifact::{ArtifactGroup, SourceArtifact};
use crate::classifier::Classifier;
use crate::error::StyleError;
use crate::exclusion::{is_generated_text, ExclusionRules};
use crate::verdict::Outcome;
use crate::walker::WalkerPool;

// ============================================================================
// Result
// ============================================================================

/// Where an inferred outcome came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Origin {
    /// Stated in configuration; no artifact was scanned.
    Configured { key: String, source: String },
    /// Decided by evidence in this artifact.
    Artifact { path: String },
    /// No artifact held any evidence.
    NotFound,
}

/// An outcome together with how it was reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Inference<D = ()> {
    #[serde(flatten)]
    pub outcome: Outcome<D>,
    pub origin: Origin,
    /// Paths of the artifacts actually visited, in order.
    pub scanned: Vec<String>,
}

impl<D> Inference<D> {
    /// An inference answered by configuration.
    pub fn configured(outcome: Outcome<D>, key: impl Into<String>, source: impl Into<String>) -> Self {
        Inference {
            outcome,
            origin: Origin::Configured {
                key: key.into(),
                source: source.into(),
            },
            scanned: Vec::new(),
        }
    }

    /// Map the detail payload.
    pub fn map<U, F: FnOnce(D) -> U>(self, f: F) -> Inference<U> {
        Inference {
            outcome: self.outcome.map(f),
            origin: self.origin,
            scanned: self.scanned,
        }
    }
}

// ============================================================================
// Candidate order
// ============================================================================

/// Build the ordered, identity-deduplicated candidate list.
pub fn candidate_order(
    group: &ArtifactGroup,
    current: &Arc<SourceArtifact>,
    rules: &ExclusionRules,
) -> Vec<Arc<SourceArtifact>> {
    let mut seen: HashSet<*const SourceArtifact> = HashSet::new();
    let mut order: Vec<Arc<SourceArtifact>> = Vec::with_capacity(group.len() + 1);
    let mut push = |artifact: &Arc<SourceArtifact>, order: &mut Vec<Arc<SourceArtifact>>| {
        if seen.insert(Arc::as_ptr(artifact)) {
            order.push(Arc::clone(artifact));
        }
    };

    push(current, &mut order);

    let folders = group.folders_of(current);
    for artifact in group.artifacts() {
        if group.folders_of(artifact) == folders {
            push(artifact, &mut order);
        }
    }
    for artifact in group.artifacts() {
        let other = group.folders_of(artifact);
        if other.len() > folders.len() && other.starts_with(folders) {
            push(artifact, &mut order);
        }
    }
    for artifact in group.artifacts() {
        if !rules.is_build_output(group.folders_of(artifact)) {
            push(artifact, &mut order);
        }
    }

    order
}

// ============================================================================
// Scan loop
// ============================================================================

/// Run `pool`'s classifier over the candidates for `current` until one
/// yields a verdict.
///
/// Cancellation is checked before each candidate and raced against each
/// tree retrieval; it ends the search with [`StyleError::Cancelled`]. An
/// artifact whose tree cannot be produced is skipped, unless the failure
/// is fatal.
pub async fn search<C: Classifier>(
    pool: &WalkerPool<C>,
    current: &Arc<SourceArtifact>,
    group: &ArtifactGroup,
    rules: &ExclusionRules,
    cancel: &CancellationToken,
) -> Result<Inference<C::Detail>, StyleError> {
    let classifier = pool.classifier().name();
    let candidates = candidate_order(group, current, rules);
    let mut scanned = Vec::new();

    debug!(
        classifier,
        current = current.path(),
        candidates = candidates.len(),
        "starting search"
    );

    for candidate in candidates {
        if cancel.is_cancelled() {
            return Err(StyleError::Cancelled);
        }
        if rules.excludes(&candidate) {
            trace!(path = candidate.path(), "skipping excluded artifact");
            continue;
        }

        let fetched = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(StyleError::Cancelled),
            fetched = group.syntax_tree(&candidate) => fetched,
        };
        let tree = match fetched {
            Ok(Some(tree)) => tree,
            Ok(None) => {
                trace!(path = candidate.path(), "skipping artifact without a tree");
                continue;
            }
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => {
                warn!(path = candidate.path(), error = %err, "skipping artifact");
                continue;
            }
        };
        if is_generated_text(tree.source()) {
            trace!(path = candidate.path(), "skipping generated artifact");
            continue;
        }

        scanned.push(candidate.path().to_string());
        let outcome = {
            let mut walker = pool.borrow();
            walker.visit(&tree);
            walker.outcome()
        };

        if outcome.is_known() {
            debug!(
                classifier,
                path = candidate.path(),
                verdict = %outcome.verdict(),
                "convention decided"
            );
            return Ok(Inference {
                outcome,
                origin: Origin::Artifact {
                    path: candidate.path().to_string(),
                },
                scanned,
            });
        }
    }

    debug!(classifier, scanned = scanned.len(), "no evidence found");
    Ok(Inference {
        outcome: Outcome::Unknown,
        origin: Origin::NotFound,
        scanned,
    })
}
