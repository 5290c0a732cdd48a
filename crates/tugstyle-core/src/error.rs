//! Error types and error code constants for tugstyle.
//!
//! `StyleError` is the single error type produced by the engine and its
//! collaborators (tree sources, configuration readers). Most failures never
//! reach the caller: an artifact whose tree cannot be produced simply
//! contributes no evidence. What does surface is a bad request, a
//! cancelled search, or a broken configuration file.
//!
//! ## Error Code Mapping
//!
//! - `2`: Invalid arguments (bad input from caller)
//! - `3`: Resolution errors (file missing or unreadable, parse failure)
//! - `4`: Configuration errors (malformed `.editorconfig`)
//! - `5`: Cancelled
//! - `10`: Internal errors (bugs, unexpected state)

use std::fmt;
use std::io;

use thiserror::Error;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Stable error codes for JSON output and CLI exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments from caller.
    InvalidArguments = 2,
    /// File missing, unreadable or unparseable.
    ResolutionError = 3,
    /// Configuration could not be read.
    ConfigError = 4,
    /// The operation was cancelled.
    Cancelled = 5,
    /// Internal errors (bugs, unexpected state).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Errors surfaced by the inference engine.
#[derive(Debug, Error)]
pub enum StyleError {
    /// Invalid arguments from caller. Raised before any scanning.
    #[error("invalid arguments: {message}")]
    InvalidArgument { message: String },

    /// The search was cancelled by its caller.
    #[error("operation cancelled")]
    Cancelled,

    /// Reading a file failed.
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    /// A file could not be parsed.
    #[error("cannot parse {path}: {message}")]
    Parse { path: String, message: String },

    /// A configuration file is malformed.
    #[error("{path}:{line}: {message}")]
    Config {
        path: String,
        line: usize,
        message: String,
    },

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl From<&StyleError> for OutputErrorCode {
    fn from(err: &StyleError) -> Self {
        match err {
            StyleError::InvalidArgument { .. } => OutputErrorCode::InvalidArguments,
            StyleError::Cancelled => OutputErrorCode::Cancelled,
            StyleError::Io { .. } => OutputErrorCode::ResolutionError,
            StyleError::Parse { .. } => OutputErrorCode::ResolutionError,
            StyleError::Config { .. } => OutputErrorCode::ConfigError,
            StyleError::Internal { .. } => OutputErrorCode::InternalError,
        }
    }
}

impl From<StyleError> for OutputErrorCode {
    fn from(err: StyleError) -> Self {
        OutputErrorCode::from(&err)
    }
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl StyleError {
    /// Create an invalid arguments error.
    pub fn invalid_args(message: impl Into<String>) -> Self {
        StyleError::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        StyleError::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, StyleError::Cancelled)
    }

    /// Returns true if this error ends a search instead of making one
    /// artifact unavailable.
    ///
    /// Cancellation and internal errors (a parser that cannot be set up,
    /// a broken invariant) are fatal. Unreadable or unparseable files are not.
    pub fn is_fatal(&self) -> bool {
        matches!(self, StyleError::Cancelled | StyleError::Internal { .. })
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> OutputErrorCode {
        OutputErrorCode::from(self)
    }
}

// ============================================================================
// Tests
// ============================================================================
