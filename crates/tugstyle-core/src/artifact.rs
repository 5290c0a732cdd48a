//! Source artifacts, artifact groups and tree retrieval.
//!
//! A [`SourceArtifact`] is one source file: a workspace-relative path, the
//! folder segments it lives under, and a syntax tree that is materialized
//! at most once through a [`TreeSource`]. Artifacts are shared as
//! `Arc<SourceArtifact>` and compared by pointer identity.
//!
//! An [`ArtifactGroup`] is the set of artifacts forming one project,
//! in a stable group order, together with the [`TreeSource`] that knows
//! how to produce their trees.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::warn;
use tree_sitter::{Node, Tree};
use walkdir::WalkDir;

use crate::error::StyleError;

// ============================================================================
// Parsed Tree
// ============================================================================

/// A syntax tree together with the text it was parsed from.
pub struct ParsedTree {
    tree: Tree,
    source: String,
}

impl ParsedTree {
    /// Pair a tree with its source text.
    pub fn new(tree: Tree, source: String) -> Self {
        ParsedTree { tree, source }
    }

    /// Root node of the tree.
    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// The source text.
    pub fn source(&self) -> &str {
        &self.source
    }
}

impl fmt::Debug for ParsedTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParsedTree")
            .field("root", &self.tree.root_node().kind())
            .field("source_len", &self.source.len())
            .finish()
    }
}

// ============================================================================
// Source Artifact
// ============================================================================

/// Where an artifact's text comes from.
#[derive(Debug, Clone)]
pub enum ArtifactText {
    /// Text held in memory (an open editor buffer, a test fixture).
    Inline(Arc<str>),
    /// Text read from disk on first use.
    OnDisk(PathBuf),
    /// The host has no text for this artifact.
    Unavailable,
}

/// One parsed source file.
pub struct SourceArtifact {
    /// Workspace-relative path, forward slashes.
    path: String,
    /// Folder segments, outermost first.
    folders: Vec<String>,
    text: ArtifactText,
    tree: OnceCell<Option<Arc<ParsedTree>>>,
}

impl SourceArtifact {
    /// Create an artifact from in-memory text.
    ///
    /// Folder segments are derived from `path`.
    pub fn in_memory(path: impl Into<String>, text: impl Into<Arc<str>>) -> Self {
        Self::with_text(path.into(), ArtifactText::Inline(text.into()))
    }

    /// Create an artifact whose text is read from `root/relative_path`.
    pub fn on_disk(root: &Path, relative_path: impl Into<String>) -> Self {
        let path = relative_path.into();
        let full = root.join(&path);
        Self::with_text(path, ArtifactText::OnDisk(full))
    }

    /// Create an artifact with no retrievable text.
    pub fn unavailable(path: impl Into<String>) -> Self {
        Self::with_text(path.into(), ArtifactText::Unavailable)
    }

    fn with_text(path: String, text: ArtifactText) -> Self {
        let path = normalize_relative(&path);
        let folders = folders_of_path(&path);
        SourceArtifact {
            path,
            folders,
            text,
            tree: OnceCell::new(),
        }
    }

    /// Override the folder segments derived from the path.
    pub fn with_folders<I, S>(mut self, folders: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.folders = folders.into_iter().map(Into::into).collect();
        self
    }

    /// Workspace-relative path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Final path component.
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Folder segments, outermost first.
    pub fn folders(&self) -> &[String] {
        &self.folders
    }

    /// Read the artifact's text.
    ///
    /// Returns `Ok(None)` when the host has no text for it.
    pub async fn read_text(&self) -> Result<Option<String>, StyleError> {
        match &self.text {
            ArtifactText::Inline(text) => Ok(Some(text.to_string())),
            ArtifactText::OnDisk(full) => tokio::fs::read_to_string(full)
                .await
                .map(Some)
                .map_err(|source| StyleError::Io {
                    path: self.path.clone(),
                    source,
                }),
            ArtifactText::Unavailable => Ok(None),
        }
    }

    /// Materialize the tree through `source`, at most once.
    ///
    /// Retrieval failures are logged and cached as an unavailable root,
    /// except fatal ones (see [`StyleError::is_fatal`]), which are returned
    /// and not cached.
    pub async fn syntax_tree(
        &self,
        source: &dyn TreeSource,
    ) -> Result<Option<Arc<ParsedTree>>, StyleError> {
        let tree = self
            .tree
            .get_or_try_init(|| async {
                match source.load(self).await {
                    Ok(tree) => Ok(tree.map(Arc::new)),
                    Err(err) if err.is_fatal() => Err(err),
                    Err(err) => {
                        warn!(path = %self.path, error = %err, "syntax tree unavailable");
                        Ok(None)
                    }
                }
            })
            .await?;
        Ok(tree.clone())
    }
}

impl fmt::Debug for SourceArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceArtifact")
            .field("path", &self.path)
            .field("folders", &self.folders)
            .finish()
    }
}

/// Normalize a relative path to forward slashes without a leading `./`.
fn normalize_relative(path: &str) -> String {
    let path = path.replace('\\', "/");
    let trimmed = path.trim_start_matches("./");
    trimmed.to_string()
}

/// Folder segments of a normalized relative path.
fn folders_of_path(path: &str) -> Vec<String> {
    let mut segments: Vec<String> = path
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .map(str::to_string)
        .collect();
    segments.pop();
    segments
}

// ============================================================================
// Tree Sources
// ============================================================================

/// Produces syntax trees for artifacts.
///
/// Hosts that keep trees in a project system implement this directly.
/// [`ParsingSource`] covers the common case of reading and parsing text.
///
/// Returning `Ok(None)` means the artifact has no tree. A non-fatal error
/// is treated the same way by the search; a fatal one ends it.
#[async_trait]
pub trait TreeSource: Send + Sync {
    async fn load(&self, artifact: &SourceArtifact) -> Result<Option<ParsedTree>, StyleError>;
}

/// A language front end that turns text into a tree.
pub trait LanguageParser: Send + Sync {
    /// File extensions (without dot) this parser accepts.
    fn extensions(&self) -> &'static [&'static str];

    /// Parse `text`.
    fn parse(&self, path: &str, text: String) -> Result<ParsedTree, StyleError>;

    /// Returns true if the parser accepts files with this path.
    fn accepts(&self, path: &str) -> bool {
        let Some((_, ext)) = path.rsplit_once('.') else {
            return false;
        };
        self.extensions()
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(ext))
    }
}

/// A [`TreeSource`] that reads artifact text and parses it.
pub struct ParsingSource<P> {
    parser: P,
}

impl<P: LanguageParser> ParsingSource<P> {
    pub fn new(parser: P) -> Self {
        ParsingSource { parser }
    }

    /// The wrapped parser.
    pub fn parser(&self) -> &P {
        &self.parser
    }
}

#[async_trait]
impl<P: LanguageParser> TreeSource for ParsingSource<P> {
    async fn load(&self, artifact: &SourceArtifact) -> Result<Option<ParsedTree>, StyleError> {
        let Some(text) = artifact.read_text().await? else {
            return Ok(None);
        };
        self.parser.parse(artifact.path(), text).map(Some)
    }
}

// ============================================================================
// Artifact Group
// ============================================================================

/// Directories never collected into a group.
const SKIPPED_DIRS: &[&str] = &[".git", ".hg", ".svn", ".vs", ".idea", "node_modules"];

/// The artifacts of one logical project.
pub struct ArtifactGroup {
    name: String,
    artifacts: Vec<Arc<SourceArtifact>>,
    source: Arc<dyn TreeSource>,
}

impl ArtifactGroup {
    /// Create a group from artifacts in their native order.
    pub fn new(
        name: impl Into<String>,
        artifacts: Vec<Arc<SourceArtifact>>,
        source: Arc<dyn TreeSource>,
    ) -> Self {
        ArtifactGroup {
            name: name.into(),
            artifacts,
            source,
        }
    }

    /// Collect every file under `root` accepted by `parser`.
    ///
    /// Artifacts are ordered by relative path so the group order is
    /// deterministic across runs.
    pub fn from_directory<P>(root: &Path, parser: P) -> Result<Self, StyleError>
    where
        P: LanguageParser + 'static,
    {
        let root = root.canonicalize().map_err(|source| StyleError::Io {
            path: root.display().to_string(),
            source,
        })?;

        let mut paths: Vec<String> = Vec::new();
        for entry in WalkDir::new(&root)
            .into_iter()
            .filter_entry(|e| !is_skipped_dir(e.path()))
        {
            let entry = entry.map_err(|e| StyleError::Io {
                path: root.display().to_string(),
                source: e.into(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(&root)
                .map_err(|e| StyleError::Internal {
                    message: format!("walked outside of workspace root: {}", e),
                })?
                .to_string_lossy()
                .replace(std::path::MAIN_SEPARATOR, "/");
            if parser.accepts(&relative) {
                paths.push(relative);
            }
        }
        paths.sort();

        let artifacts = paths
            .into_iter()
            .map(|path| Arc::new(SourceArtifact::on_disk(&root, path)))
            .collect();
        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(ArtifactGroup::new(
            name,
            artifacts,
            Arc::new(ParsingSource::new(parser)),
        ))
    }

    /// Group name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All member artifacts in group order.
    pub fn artifacts(&self) -> &[Arc<SourceArtifact>] {
        &self.artifacts
    }

    /// Number of artifacts.
    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    /// Whether the group is empty.
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// Folder segments of an artifact.
    pub fn folders_of<'a>(&self, artifact: &'a SourceArtifact) -> &'a [String] {
        artifact.folders()
    }

    /// Find a member artifact by relative path.
    pub fn find(&self, path: &str) -> Option<&Arc<SourceArtifact>> {
        let path = normalize_relative(path);
        self.artifacts.iter().find(|a| a.path() == path)
    }

    /// Retrieve an artifact's tree through the group's tree source.
    pub async fn syntax_tree(
        &self,
        artifact: &SourceArtifact,
    ) -> Result<Option<Arc<ParsedTree>>, StyleError> {
        artifact.syntax_tree(self.source.as_ref()).await
    }
}

impl fmt::Debug for ArtifactGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArtifactGroup")
            .field("name", &self.name)
            .field("artifacts", &self.artifacts)
            .finish()
    }
}

fn is_skipped_dir(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| SKIPPED_DIRS.contains(&name))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CSharp;

    impl LanguageParser for CSharp {
        fn extensions(&self) -> &'static [&'static str] {
            &["cs"]
        }

        fn parse(&self, path: &str, text: String) -> Result<ParsedTree, StyleError> {
            let mut parser = tree_sitter::Parser::new();
            parser
                .set_language(&tree_sitter_c_sharp::LANGUAGE.into())
                .map_err(|e| StyleError::Internal {
                    message: e.to_string(),
                })?;
            let tree = parser.parse(&text, None).ok_or_else(|| StyleError::Parse {
                path: path.to_string(),
                message: "parser returned no tree".to_string(),
            })?;
            Ok(ParsedTree::new(tree, text))
        }
    }

    struct CountingSource {
        loads: AtomicUsize,
        inner: ParsingSource<CSharp>,
    }

    #[async_trait]
    impl TreeSource for CountingSource {
        async fn load(&self, artifact: &SourceArtifact) -> Result<Option<ParsedTree>, StyleError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            self.inner.load(artifact).await
        }
    }

    #[test]
    fn test_folders_derived_from_path() {
        let artifact = SourceArtifact::in_memory("src/Models/User.cs", "");
        assert_eq!(artifact.folders(), &["src".to_string(), "Models".to_string()]);
        assert_eq!(artifact.file_name(), "User.cs");
    }

    #[test]
    fn test_folders_normalize_backslashes() {
        let artifact = SourceArtifact::in_memory(".\\src\\A.cs", "");
        assert_eq!(artifact.path(), "src/A.cs");
        assert_eq!(artifact.folders(), &["src".to_string()]);
    }

    #[test]
    fn test_root_file_has_no_folders() {
        let artifact = SourceArtifact::in_memory("Program.cs", "");
        assert!(artifact.folders().is_empty());
    }

    #[test]
    fn test_with_folders_overrides() {
        let artifact = SourceArtifact::in_memory("A.cs", "").with_folders(["obj"]);
        assert_eq!(artifact.folders(), &["obj".to_string()]);
    }

    #[test]
    fn test_parser_accepts_by_extension() {
        assert!(CSharp.accepts("src/A.cs"));
        assert!(CSharp.accepts("src/A.CS"));
        assert!(!CSharp.accepts("src/A.py"));
        assert!(!CSharp.accepts("Makefile"));
    }

    #[tokio::test]
    async fn test_tree_materialized_once() {
        let source = CountingSource {
            loads: AtomicUsize::new(0),
            inner: ParsingSource::new(CSharp),
        };
        let artifact = SourceArtifact::in_memory("A.cs", "class A {}");

        let first = artifact.syntax_tree(&source).await.unwrap().unwrap();
        let second = artifact.syntax_tree(&source).await.unwrap().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(source.loads.load(Ordering::SeqCst), 1);
        assert_eq!(first.root().kind(), "compilation_unit");
    }

    #[tokio::test]
    async fn test_unavailable_text_has_no_tree() {
        let source = ParsingSource::new(CSharp);
        let artifact = SourceArtifact::unavailable("A.cs");
        assert!(artifact.syntax_tree(&source).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_file_is_unavailable_not_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = ParsingSource::new(CSharp);
        let artifact = SourceArtifact::on_disk(dir.path(), "Missing.cs");
        assert!(artifact.syntax_tree(&source).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_internal_error_is_returned_and_not_cached() {
        struct Failing {
            loads: AtomicUsize,
        }

        #[async_trait]
        impl TreeSource for Failing {
            async fn load(
                &self,
                _artifact: &SourceArtifact,
            ) -> Result<Option<ParsedTree>, StyleError> {
                self.loads.fetch_add(1, Ordering::SeqCst);
                Err(StyleError::internal("incompatible language version"))
            }
        }

        let source = Failing {
            loads: AtomicUsize::new(0),
        };
        let artifact = SourceArtifact::in_memory("A.cs", "class A {}");
        assert!(artifact.syntax_tree(&source).await.is_err());
        assert!(artifact.syntax_tree(&source).await.is_err());
        assert_eq!(source.loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_parse_failure_is_unavailable() {
        struct Unparseable;

        #[async_trait]
        impl TreeSource for Unparseable {
            async fn load(
                &self,
                artifact: &SourceArtifact,
            ) -> Result<Option<ParsedTree>, StyleError> {
                Err(StyleError::Parse {
                    path: artifact.path().to_string(),
                    message: "no tree".to_string(),
                })
            }
        }

        let artifact = SourceArtifact::in_memory("A.cs", "class A {}");
        assert!(artifact.syntax_tree(&Unparseable).await.unwrap().is_none());
    }

    #[test]
    fn test_group_from_directory_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("src/Models")).unwrap();
        std::fs::create_dir_all(dir.path().join(".git")).unwrap();
        std::fs::write(dir.path().join("src/Models/User.cs"), "class User {}").unwrap();
        std::fs::write(dir.path().join("src/App.cs"), "class App {}").unwrap();
        std::fs::write(dir.path().join("README.md"), "# readme").unwrap();
        std::fs::write(dir.path().join(".git/Hook.cs"), "class Hook {}").unwrap();

        let group = ArtifactGroup::from_directory(dir.path(), CSharp).unwrap();
        let paths: Vec<_> = group.artifacts().iter().map(|a| a.path()).collect();

        assert_eq!(paths, vec!["src/App.cs", "src/Models/User.cs"]);
        assert!(group.find("src/App.cs").is_some());
        assert!(group.find("./src/App.cs").is_some());
    }
}
