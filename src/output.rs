//! JSON output types for the tugstyle CLI.
//!
//! Every response carries `status` and `schema_version`. Successful and
//! failed runs both print JSON to stdout.

use std::io::{self, Write};

use serde::Serialize;
use tugstyle_core::{Inference, StyleError};
use tugstyle_csharp::Convention;

/// Schema version of the JSON output.
pub const SCHEMA_VERSION: &str = "1";

/// Response for `infer`.
#[derive(Debug, Clone, Serialize)]
pub struct InferResponse {
    /// Status: "ok".
    pub status: String,
    pub schema_version: String,
    pub convention: Convention,
    /// Configuration key that would state the convention explicitly.
    pub option_key: String,
    /// Workspace-relative path of the artifact inferred for.
    pub file: String,
    #[serde(flatten)]
    pub inference: Inference<Option<bool>>,
}

impl InferResponse {
    pub fn new(
        convention: Convention,
        file: impl Into<String>,
        inference: Inference<Option<bool>>,
    ) -> Self {
        InferResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            convention,
            option_key: convention.option_key().to_string(),
            file: file.into(),
            inference,
        }
    }
}

/// One entry of the `conventions` listing.
#[derive(Debug, Clone, Serialize)]
pub struct ConventionInfo {
    pub name: Convention,
    pub option_key: String,
    pub description: String,
}

impl From<Convention> for ConventionInfo {
    fn from(convention: Convention) -> Self {
        ConventionInfo {
            name: convention,
            option_key: convention.option_key().to_string(),
            description: convention.description().to_string(),
        }
    }
}

/// Response for `conventions`.
#[derive(Debug, Clone, Serialize)]
pub struct ConventionsResponse {
    pub status: String,
    pub schema_version: String,
    pub conventions: Vec<ConventionInfo>,
}

impl ConventionsResponse {
    pub fn all() -> Self {
        ConventionsResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            conventions: Convention::ALL.into_iter().map(ConventionInfo::from).collect(),
        }
    }
}

/// Error details.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    /// Numeric error code, also the process exit status.
    pub code: u8,
    pub message: String,
}

/// Response for any failed command.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Status: "error".
    pub status: String,
    pub schema_version: String,
    pub error: ErrorInfo,
}

impl ErrorResponse {
    pub fn from_error(err: &StyleError) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo {
                code: err.error_code().code(),
                message: err.to_string(),
            },
        }
    }
}

/// Emit a response as pretty-printed JSON.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}
