//! C# parsing via tree-sitter.

use tracing::trace;
use tree_sitter::Parser;
use tugstyle_core::{LanguageParser, ParsedTree, StyleError};

/// C# front end.
///
/// A fresh `tree_sitter::Parser` is created per call, so one value can be
/// shared by concurrent searches.
#[derive(Debug, Default, Clone, Copy)]
pub struct CSharpParser;

impl CSharpParser {
    pub fn new() -> Self {
        CSharpParser
    }

    /// Parse C# source text.
    pub fn parse_source(&self, path: &str, source: String) -> Result<ParsedTree, StyleError> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_c_sharp::LANGUAGE.into())
            .map_err(|e| StyleError::internal(format!("failed to set language: {}", e)))?;
        let tree = parser
            .parse(&source, None)
            .ok_or_else(|| StyleError::Parse {
                path: path.to_string(),
                message: "parser produced no tree".to_string(),
            })?;
        trace!(
            path,
            bytes = source.len(),
            has_error = tree.root_node().has_error(),
            "parsed C# source"
        );
        Ok(ParsedTree::new(tree, source))
    }
}

impl LanguageParser for CSharpParser {
    fn extensions(&self) -> &'static [&'static str] {
        &["cs"]
    }

    fn parse(&self, path: &str, text: String) -> Result<ParsedTree, StyleError> {
        self.parse_source(path, text)
    }
}

/// Parse a snippet, for tests and tools.
pub fn parse(source: &str) -> Result<ParsedTree, StyleError> {
    CSharpParser.parse_source("<memory>", source.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_compilation_unit() {
        let tree = parse("namespace N { class C { int _x; } }").unwrap();
        assert_eq!(tree.root().kind(), "compilation_unit");
        assert!(!tree.root().has_error());
    }

    #[test]
    fn test_accepts_cs_files() {
        assert!(CSharpParser.accepts("src/Program.cs"));
        assert!(!CSharpParser.accepts("src/Program.vb"));
    }
}
