//! Core infrastructure for tugstyle.
//!
//! This crate provides the language-agnostic convention-inference engine:
//! - Verdict lattice and evidence accumulator
//! - Classifier contract and tree traversal
//! - Pooled walkers with reset-on-release
//! - Source artifacts, artifact groups and tree retrieval
//! - Generated / build-output exclusion rules
//! - Prioritized multi-artifact search with cancellation
//! - Explicit preference lookup (`.editorconfig`)
//! - Error types and error codes

pub mod artifact;
pub mod classifier;
pub mod error;
pub mod exclusion;
pub mod options;
pub mod search;
pub mod verdict;
pub mod walker;

pub use artifact::{
    ArtifactGroup, LanguageParser, ParsedTree, ParsingSource, SourceArtifact, TreeSource,
};
pub use classifier::{Classifier, Scratch, VisitContext, VisitResult};
pub use error::{OutputErrorCode, StyleError};
pub use exclusion::ExclusionRules;
pub use options::{
    EditorConfig, MemoryOptions, NoOptions, OptionSource, OptionValue, StyleOptions,
};
pub use search::{search, Inference, Origin};
pub use verdict::{Observation, Outcome, Signal, Tally, Verdict};
pub use walker::{WalkerHandle, WalkerPool};
