//! C# support for tugstyle.
//!
//! - [`parser`]: the tree-sitter front end
//! - [`nav`]: navigation helpers (ancestors, members, shadowing)
//! - [`classifiers`]: one classifier per convention
//! - [`conventions`]: names and configuration keys

pub mod classifiers;
pub mod conventions;
pub mod nav;
pub mod parser;

pub use classifiers::{BackingFieldAdjacency, QualifyMemberAccess, UnderscoreFields, UsingPlacement};
pub use conventions::{Convention, UnknownConvention, BACKING_FIELD_BLANK_LINE_KEY};
pub use parser::CSharpParser;

use std::path::Path;

use tugstyle_core::{ArtifactGroup, StyleError};

/// Load every `.cs` file under `root` as one group.
pub fn load_project(root: &Path) -> Result<ArtifactGroup, StyleError> {
    ArtifactGroup::from_directory(root, CSharpParser)
}
