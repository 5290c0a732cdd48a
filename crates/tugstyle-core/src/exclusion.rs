//! Generated and build-output artifact detection.
//!
//! Excluded artifacts never contribute evidence: their style is whatever
//! the generator emitted, not what the project's authors chose.

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use tracing::error;

use crate::artifact::SourceArtifact;
use crate::error::StyleError;

/// File-name patterns of generated sources.
pub const DEFAULT_GENERATED_PATTERNS: &[&str] = &[
    "*.g.cs",
    "*.g.i.cs",
    "*.designer.cs",
    "*.generated.cs",
    "*.AssemblyInfo.cs",
    "TemporaryGeneratedFile_*",
];

/// Folder names holding build output.
pub const DEFAULT_BUILD_OUTPUT_DIRS: &[&str] = &["obj", "bin"];

/// Marker found in the header comment of generated files.
const AUTO_GENERATED_MARKER: &str = "<auto-generated";

/// Decides which artifacts are generated or build output.
#[derive(Debug, Clone)]
pub struct ExclusionRules {
    generated: GlobSet,
    build_output_dirs: Vec<String>,
}

impl ExclusionRules {
    /// Build rules from file-name patterns and build-output folder names.
    ///
    /// Patterns match the file name only and ignore case.
    pub fn new<P, D>(generated_patterns: P, build_output_dirs: D) -> Result<Self, StyleError>
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
        D: IntoIterator,
        D::Item: Into<String>,
    {
        let mut builder = GlobSetBuilder::new();
        for pattern in generated_patterns {
            let pattern = pattern.as_ref();
            let glob = GlobBuilder::new(pattern)
                .case_insensitive(true)
                .literal_separator(true)
                .build()
                .map_err(|e| StyleError::invalid_args(format!("bad pattern {pattern}: {e}")))?;
            builder.add(glob);
        }
        let generated = builder
            .build()
            .map_err(|e| StyleError::internal(format!("cannot compile exclusion set: {e}")))?;
        Ok(ExclusionRules {
            generated,
            build_output_dirs: build_output_dirs.into_iter().map(Into::into).collect(),
        })
    }

    /// Rules with no exclusions at all.
    pub fn none() -> Self {
        ExclusionRules {
            generated: GlobSet::empty(),
            build_output_dirs: Vec::new(),
        }
    }

    /// Returns true if the file name marks a generated source.
    pub fn is_generated_name(&self, file_name: &str) -> bool {
        self.generated.is_match(file_name)
    }

    /// Returns true if `folders` is exactly one build-output folder.
    pub fn is_build_output(&self, folders: &[String]) -> bool {
        match folders {
            [only] => self
                .build_output_dirs
                .iter()
                .any(|dir| dir.eq_ignore_ascii_case(only)),
            _ => false,
        }
    }

    /// Returns true if the artifact must never contribute evidence.
    pub fn excludes(&self, artifact: &SourceArtifact) -> bool {
        self.is_generated_name(artifact.file_name()) || self.is_build_output(artifact.folders())
    }
}

impl Default for ExclusionRules {
    /// [`DEFAULT_GENERATED_PATTERNS`] and [`DEFAULT_BUILD_OUTPUT_DIRS`].
    fn default() -> Self {
        match ExclusionRules::new(
            DEFAULT_GENERATED_PATTERNS,
            DEFAULT_BUILD_OUTPUT_DIRS.iter().copied(),
        ) {
            Ok(rules) => rules,
            Err(err) => {
                error!(error = %err, "default generated-file patterns rejected");
                ExclusionRules {
                    generated: GlobSet::empty(),
                    build_output_dirs: DEFAULT_BUILD_OUTPUT_DIRS
                        .iter()
                        .map(|dir| dir.to_string())
                        .collect(),
                }
            }
        }
    }
}

/// Returns true if the leading comments of `source` carry the
/// `<auto-generated` marker.
pub fn is_generated_text(source: &str) -> bool {
    let mut in_block = false;
    for line in source.lines() {
        let line = line.trim();
        if in_block {
            if line.contains(AUTO_GENERATED_MARKER) {
                return true;
            }
            if line.contains("*/") {
                in_block = false;
            }
            continue;
        }
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(comment) = line.strip_prefix("//") {
            if comment.contains(AUTO_GENERATED_MARKER) {
                return true;
            }
            continue;
        }
        if line.starts_with("/*") {
            if line.contains(AUTO_GENERATED_MARKER) {
                return true;
            }
            in_block = !line.contains("*/");
            continue;
        }
        return false;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_generated_names() {
        let rules = ExclusionRules::default();
        assert!(rules.is_generated_name("Form1.Designer.cs"));
        assert!(rules.is_generated_name("Parser.g.cs"));
        assert!(rules.is_generated_name("View.g.i.cs"));
        assert!(rules.is_generated_name("Api.generated.cs"));
        assert!(rules.is_generated_name("MyApp.AssemblyInfo.cs"));
        assert!(rules.is_generated_name("TemporaryGeneratedFile_1234.cs"));
        assert!(!rules.is_generated_name("Program.cs"));
        assert!(!rules.is_generated_name("Designer.cs"));
    }

    #[test]
    fn test_default_patterns_compile_with_separator_rules() {
        let built = ExclusionRules::new(
            DEFAULT_GENERATED_PATTERNS,
            DEFAULT_BUILD_OUTPUT_DIRS.iter().copied(),
        )
        .unwrap();
        let rules = ExclusionRules::default();
        for name in ["Form1.Designer.cs", "Program.cs", "gen/Parser.g.cs"] {
            assert_eq!(rules.is_generated_name(name), built.is_generated_name(name), "{name}");
        }
        assert!(!rules.is_generated_name("gen/Parser.g.cs"));
    }

    #[test]
    fn test_build_output_only_directly_under_single_folder() {
        let rules = ExclusionRules::default();
        assert!(rules.is_build_output(&["obj".to_string()]));
        assert!(rules.is_build_output(&["Bin".to_string()]));
        assert!(!rules.is_build_output(&["src".to_string(), "obj".to_string()]));
        assert!(!rules.is_build_output(&["obj".to_string(), "Debug".to_string()]));
        assert!(!rules.is_build_output(&[]));
    }

    #[test]
    fn test_excludes_artifact() {
        let rules = ExclusionRules::default();
        assert!(rules.excludes(&SourceArtifact::in_memory("src/Foo.g.cs", "")));
        assert!(rules.excludes(&SourceArtifact::in_memory("obj/Foo.cs", "")));
        assert!(!rules.excludes(&SourceArtifact::in_memory("src/Foo.cs", "")));
    }

    #[test]
    fn test_custom_rules() {
        let rules = ExclusionRules::new(["*.gen.cs"], ["out"]).unwrap();
        assert!(rules.is_generated_name("A.gen.cs"));
        assert!(!rules.is_generated_name("A.g.cs"));
        assert!(rules.is_build_output(&["out".to_string()]));
        assert!(!rules.is_build_output(&["obj".to_string()]));
    }

    #[test]
    fn test_none_excludes_nothing() {
        let rules = ExclusionRules::none();
        assert!(!rules.excludes(&SourceArtifact::in_memory("obj/Foo.g.cs", "")));
    }

    #[test]
    fn test_generated_text_marker() {
        assert!(is_generated_text(
            "// <auto-generated>\n//   tool output\n// </auto-generated>\nclass A {}"
        ));
        assert!(is_generated_text(
            "#pragma warning disable\n/*\n * <auto-generated/>\n */\nclass A {}"
        ));
        assert!(!is_generated_text("class A {}\n// <auto-generated>"));
        assert!(!is_generated_text("// Copyright\nclass A {}"));
    }
}
