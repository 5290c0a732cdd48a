//! CLI command implementations.
//!
//! The binary only parses arguments and prints; the work happens here so
//! it can be tested without spawning a process.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;
use tugstyle_core::{EditorConfig, StyleError};
use tugstyle_csharp::{load_project, Convention};

use crate::inference::StyleInference;
use crate::output::InferResponse;

/// Infer `convention` for `file` within the project at `workspace`.
///
/// `file` may be absolute or relative to the workspace root. The whole
/// workspace forms the artifact group, and `.editorconfig` files inside
/// it are consulted before scanning.
pub async fn run_infer(
    workspace: &Path,
    file: &Path,
    convention: Convention,
    cancel: &CancellationToken,
) -> Result<InferResponse, StyleError> {
    let root = canonical(workspace)?;
    let relative = workspace_relative(&root, file)?;

    let group = load_project(&root)?;
    let current = group.find(&relative).cloned().ok_or_else(|| {
        StyleError::invalid_args(format!(
            "{} is not a C# source file in {}",
            relative,
            root.display()
        ))
    })?;
    info!(
        workspace = %root.display(),
        file = %relative,
        artifacts = group.len(),
        "loaded project"
    );

    let engine = StyleInference::new(Arc::new(EditorConfig::new(root)));
    let inference = engine.infer(convention, &current, &group, cancel).await?;
    Ok(InferResponse::new(convention, relative, inference))
}

fn canonical(path: &Path) -> Result<PathBuf, StyleError> {
    path.canonicalize().map_err(|source| StyleError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Resolve `file` against `root` and return it relative to `root` with
/// forward slashes.
fn workspace_relative(root: &Path, file: &Path) -> Result<String, StyleError> {
    let full = if file.is_absolute() {
        file.to_path_buf()
    } else {
        root.join(file)
    };
    let full = canonical(&full)?;
    let relative = full.strip_prefix(root).map_err(|_| {
        StyleError::invalid_args(format!(
            "{} is outside the workspace {}",
            full.display(),
            root.display()
        ))
    })?;
    Ok(relative
        .to_string_lossy()
        .replace(std::path::MAIN_SEPARATOR, "/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        std::fs::create_dir_all(root.join("src")).unwrap();
        std::fs::write(root.join("src/A.cs"), "class A { }").unwrap();

        assert_eq!(
            workspace_relative(&root, Path::new("src/A.cs")).unwrap(),
            "src/A.cs"
        );
        assert_eq!(
            workspace_relative(&root, &root.join("src/A.cs")).unwrap(),
            "src/A.cs"
        );
    }

    #[test]
    fn test_missing_file_is_resolution_error() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        let err = workspace_relative(&root, Path::new("Missing.cs")).unwrap_err();
        assert_eq!(
            err.error_code(),
            tugstyle_core::OutputErrorCode::ResolutionError
        );
    }

    #[test]
    fn test_file_outside_workspace_is_invalid() {
        let workspace = tempfile::tempdir().unwrap();
        let elsewhere = tempfile::tempdir().unwrap();
        std::fs::write(elsewhere.path().join("B.cs"), "class B { }").unwrap();

        let root = workspace.path().canonicalize().unwrap();
        let err = workspace_relative(&root, &elsewhere.path().join("B.cs")).unwrap_err();
        assert!(matches!(err, StyleError::InvalidArgument { .. }));
    }
}
