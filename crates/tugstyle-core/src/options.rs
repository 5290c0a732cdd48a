//! Explicit style preferences.
//!
//! Before any scanning, the caller's configuration is consulted. A value
//! stated directly in configuration is authoritative and the walker never
//! runs; a value that only exists as a built-in default is not, and
//! inference proceeds.
//!
//! [`EditorConfig`] reads `.editorconfig` files: the file nearest to the
//! artifact wins over files further up, later sections win over earlier
//! ones, and a file with `root = true` stops the upward search. Values may
//! carry a `:severity` suffix, which is ignored here.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use globset::{GlobBuilder, GlobMatcher};
use tracing::debug;

use crate::error::StyleError;

/// Name of the configuration file searched for.
pub const EDITORCONFIG_FILE: &str = ".editorconfig";

// ============================================================================
// Values
// ============================================================================

/// Where an option value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionSource {
    /// Stated in an `.editorconfig` file.
    EditorConfig { path: String },
    /// Supplied directly by the hosting application.
    Host,
    /// A built-in default nobody chose.
    Default,
}

impl OptionSource {
    /// Returns true if someone stated this value on purpose.
    pub fn is_explicit(&self) -> bool {
        !matches!(self, OptionSource::Default)
    }
}

impl fmt::Display for OptionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionSource::EditorConfig { path } => write!(f, "{path}"),
            OptionSource::Host => write!(f, "host"),
            OptionSource::Default => write!(f, "default"),
        }
    }
}

/// An option value with its provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionValue {
    /// Value with any `:severity` suffix removed.
    pub raw: String,
    pub source: OptionSource,
}

/// A key/value preference store consulted per artifact.
pub trait StyleOptions: Send + Sync {
    /// Look up `key` for the artifact at workspace-relative `path`.
    fn get(&self, path: &str, key: &str) -> Result<Option<OptionValue>, StyleError>;
}

/// Remove a trailing `:severity` and surrounding whitespace.
pub fn strip_severity(value: &str) -> &str {
    match value.split_once(':') {
        Some((value, _severity)) => value.trim(),
        None => value.trim(),
    }
}

// ============================================================================
// In-memory store
// ============================================================================

/// Options held in memory, applying to every path.
#[derive(Debug, Default)]
pub struct MemoryOptions {
    values: HashMap<String, OptionValue>,
}

impl MemoryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an explicit value.
    pub fn set(&mut self, key: impl Into<String>, value: &str) -> &mut Self {
        self.insert(key.into(), value, OptionSource::Host)
    }

    /// Set a value that only acts as a default.
    pub fn set_default(&mut self, key: impl Into<String>, value: &str) -> &mut Self {
        self.insert(key.into(), value, OptionSource::Default)
    }

    fn insert(&mut self, key: String, value: &str, source: OptionSource) -> &mut Self {
        self.values.insert(
            key.to_ascii_lowercase(),
            OptionValue {
                raw: strip_severity(value).to_string(),
                source,
            },
        );
        self
    }
}

impl StyleOptions for MemoryOptions {
    fn get(&self, _path: &str, key: &str) -> Result<Option<OptionValue>, StyleError> {
        Ok(self.values.get(&key.to_ascii_lowercase()).cloned())
    }
}

/// A store with no values.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOptions;

impl StyleOptions for NoOptions {
    fn get(&self, _path: &str, _key: &str) -> Result<Option<OptionValue>, StyleError> {
        Ok(None)
    }
}

// ============================================================================
// .editorconfig
// ============================================================================

/// One `[glob]` section.
#[derive(Debug)]
struct Section {
    matcher: GlobMatcher,
    properties: Vec<(String, String)>,
}

/// A parsed `.editorconfig` file.
#[derive(Debug)]
pub struct EditorConfigFile {
    path: PathBuf,
    root: bool,
    sections: Vec<Section>,
}

impl EditorConfigFile {
    /// Parse the contents of the file at `path`.
    pub fn parse(path: &Path, text: &str) -> Result<Self, StyleError> {
        let label = path.display().to_string();
        let mut root = false;
        let mut sections: Vec<Section> = Vec::new();

        for (index, line) in text.lines().enumerate() {
            let line_no = index + 1;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if let Some(rest) = line.strip_prefix('[') {
                let Some(pattern) = rest.strip_suffix(']') else {
                    return Err(StyleError::Config {
                        path: label,
                        line: line_no,
                        message: "unterminated section header".to_string(),
                    });
                };
                let matcher = compile_section_glob(pattern).map_err(|message| {
                    StyleError::Config {
                        path: label.clone(),
                        line: line_no,
                        message,
                    }
                })?;
                sections.push(Section {
                    matcher,
                    properties: Vec::new(),
                });
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                return Err(StyleError::Config {
                    path: label,
                    line: line_no,
                    message: "expected `key = value`".to_string(),
                });
            };
            let key = key.trim().to_ascii_lowercase();
            let value = value.trim().to_string();

            match sections.last_mut() {
                Some(section) => section.properties.push((key, value)),
                None if key == "root" => root = value.eq_ignore_ascii_case("true"),
                // Preamble properties other than `root` have no meaning.
                None => {}
            }
        }

        Ok(EditorConfigFile {
            path: path.to_path_buf(),
            root,
            sections,
        })
    }

    /// Whether this file stops the upward search.
    pub fn is_root(&self) -> bool {
        self.root
    }

    /// Directory the section globs are relative to.
    fn dir(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new(""))
    }

    /// Apply every matching section to `out`, later sections overriding.
    fn apply(&self, file: &Path, out: &mut HashMap<String, OptionValue>) {
        let Ok(relative) = file.strip_prefix(self.dir()) else {
            return;
        };
        let relative = relative.to_string_lossy().replace('\\', "/");
        for section in &self.sections {
            if !section.matcher.is_match(&relative) {
                continue;
            }
            for (key, value) in &section.properties {
                if value.eq_ignore_ascii_case("unset") {
                    out.remove(key);
                    continue;
                }
                out.insert(
                    key.clone(),
                    OptionValue {
                        raw: strip_severity(value).to_string(),
                        source: OptionSource::EditorConfig {
                            path: self.path.display().to_string(),
                        },
                    },
                );
            }
        }
    }
}

/// Compile an `.editorconfig` section pattern.
///
/// A pattern without `/` matches a file name at any depth; with `/` it is
/// anchored at the file's directory.
fn compile_section_glob(pattern: &str) -> Result<GlobMatcher, String> {
    let pattern = pattern.trim();
    if pattern.is_empty() {
        return Err("empty section pattern".to_string());
    }
    let anchored = if pattern.contains('/') {
        pattern.trim_start_matches('/').to_string()
    } else {
        format!("**/{pattern}")
    };
    GlobBuilder::new(&anchored)
        .literal_separator(true)
        .build()
        .map(|glob| glob.compile_matcher())
        .map_err(|e| format!("bad section pattern {pattern}: {e}"))
}

/// `.editorconfig` lookup rooted at a workspace directory.
///
/// Parsed files are cached per directory for the life of the value.
#[derive(Debug)]
pub struct EditorConfig {
    workspace_root: PathBuf,
    cache: Mutex<HashMap<PathBuf, Option<Arc<EditorConfigFile>>>>,
}

impl EditorConfig {
    /// Look up options for files under `workspace_root`.
    pub fn new(workspace_root: impl Into<PathBuf>) -> Self {
        EditorConfig {
            workspace_root: workspace_root.into(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve every property applying to the file at `path`.
    pub fn properties(&self, path: &str) -> Result<HashMap<String, OptionValue>, StyleError> {
        let file = self.workspace_root.join(path);

        // Nearest first, stopping after a root file.
        let mut chain: Vec<Arc<EditorConfigFile>> = Vec::new();
        let mut dir = file.parent();
        while let Some(current) = dir {
            if let Some(config) = self.load(current)? {
                let is_root = config.is_root();
                chain.push(config);
                if is_root {
                    break;
                }
            }
            dir = current.parent();
        }

        let mut properties = HashMap::new();
        for config in chain.iter().rev() {
            config.apply(&file, &mut properties);
        }
        Ok(properties)
    }

    fn load(&self, dir: &Path) -> Result<Option<Arc<EditorConfigFile>>, StyleError> {
        if let Some(cached) = self
            .cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(dir)
        {
            return Ok(cached.clone());
        }

        let path = dir.join(EDITORCONFIG_FILE);
        let parsed = match std::fs::read_to_string(&path) {
            Ok(text) => {
                debug!(path = %path.display(), "loaded editorconfig");
                Some(Arc::new(EditorConfigFile::parse(&path, &text)?))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(source) => {
                return Err(StyleError::Io {
                    path: path.display().to_string(),
                    source,
                })
            }
        };

        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(dir.to_path_buf(), parsed.clone());
        Ok(parsed)
    }
}

impl StyleOptions for EditorConfig {
    fn get(&self, path: &str, key: &str) -> Result<Option<OptionValue>, StyleError> {
        let mut properties = self.properties(path)?;
        Ok(properties.remove(&key.to_ascii_lowercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(root: &Path, relative: &str, text: &str) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, text).unwrap();
    }

    #[test]
    fn test_strip_severity() {
        assert_eq!(strip_severity("true:warning"), "true");
        assert_eq!(strip_severity(" outside_namespace : silent "), "outside_namespace");
        assert_eq!(strip_severity("false"), "false");
    }

    #[test]
    fn test_memory_options_sources() {
        let mut options = MemoryOptions::new();
        options
            .set("Dotnet_Style_Qualification_For_Field", "true:suggestion")
            .set_default("csharp_using_directive_placement", "outside_namespace");

        let field = options
            .get("A.cs", "dotnet_style_qualification_for_field")
            .unwrap()
            .unwrap();
        assert_eq!(field.raw, "true");
        assert!(field.source.is_explicit());

        let placement = options
            .get("A.cs", "csharp_using_directive_placement")
            .unwrap()
            .unwrap();
        assert!(!placement.source.is_explicit());
        assert!(options.get("A.cs", "missing").unwrap().is_none());
    }

    #[test]
    fn test_parse_rejects_bad_line() {
        let err = EditorConfigFile::parse(Path::new("/w/.editorconfig"), "[*.cs]\nnonsense\n")
            .unwrap_err();
        match err {
            StyleError::Config { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_rejects_unterminated_section() {
        let err = EditorConfigFile::parse(Path::new("/w/.editorconfig"), "[*.cs\n").unwrap_err();
        assert_eq!(err.error_code().code(), 4);
    }

    #[test]
    fn test_section_matching_and_precedence() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            ".editorconfig",
            "root = true\n\n[*]\nindent_style = space\n\n[*.cs]\ndotnet_style_qualification_for_field = false\n\n[src/**/*.cs]\ndotnet_style_qualification_for_field = true:warning\n",
        );
        let config = EditorConfig::new(dir.path());

        let value = config
            .get("src/Models/User.cs", "dotnet_style_qualification_for_field")
            .unwrap()
            .unwrap();
        assert_eq!(value.raw, "true");
        assert!(matches!(value.source, OptionSource::EditorConfig { .. }));

        let value = config
            .get("tests/UserTests.cs", "dotnet_style_qualification_for_field")
            .unwrap()
            .unwrap();
        assert_eq!(value.raw, "false");

        assert!(config
            .get("README.md", "dotnet_style_qualification_for_field")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_nearest_file_wins() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            ".editorconfig",
            "root = true\n[*.cs]\ncsharp_using_directive_placement = outside_namespace\n",
        );
        write(
            dir.path(),
            "src/.editorconfig",
            "[*.cs]\ncsharp_using_directive_placement = inside_namespace\n",
        );
        let config = EditorConfig::new(dir.path());

        let inner = config
            .get("src/A.cs", "csharp_using_directive_placement")
            .unwrap()
            .unwrap();
        assert_eq!(inner.raw, "inside_namespace");

        let outer = config
            .get("B.cs", "csharp_using_directive_placement")
            .unwrap()
            .unwrap();
        assert_eq!(outer.raw, "outside_namespace");
    }

    #[test]
    fn test_root_stops_search() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            ".editorconfig",
            "root = true\n[*.cs]\ntugstyle_private_field_underscore_prefix = true\n",
        );
        write(
            dir.path(),
            "lib/.editorconfig",
            "root = true\n[*.cs]\nindent_size = 4\n",
        );
        let config = EditorConfig::new(dir.path());
        assert!(config
            .get("lib/A.cs", "tugstyle_private_field_underscore_prefix")
            .unwrap()
            .is_none());
        assert!(config
            .get("A.cs", "tugstyle_private_field_underscore_prefix")
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_unset_removes_value() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            ".editorconfig",
            "root = true\n[*.cs]\ndotnet_style_qualification_for_event = true\n[Legacy.cs]\ndotnet_style_qualification_for_event = unset\n",
        );
        let config = EditorConfig::new(dir.path());
        assert!(config
            .get("Legacy.cs", "dotnet_style_qualification_for_event")
            .unwrap()
            .is_none());
        assert!(config
            .get("Other.cs", "dotnet_style_qualification_for_event")
            .unwrap()
            .is_some());
    }
}
