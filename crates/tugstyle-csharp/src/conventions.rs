//! The catalogue of inferable conventions.
//!
//! Each convention has a stable CLI name and an `.editorconfig` key. The
//! qualification and placement keys are the ones .NET tooling already
//! reads; the rest are tugstyle's own.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;
use tugstyle_core::{StyleError, Verdict};

/// Key holding the blank-line preference for adjacent backing fields.
pub const BACKING_FIELD_BLANK_LINE_KEY: &str = "tugstyle_backing_field_blank_line";

/// A convention the engine can infer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Convention {
    UnderscoreFields,
    QualifyFieldAccess,
    QualifyPropertyAccess,
    QualifyMethodAccess,
    QualifyEventAccess,
    BackingFieldAdjacency,
    UsingPlacement,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown convention '{name}'")]
pub struct UnknownConvention {
    pub name: String,
}

impl From<UnknownConvention> for StyleError {
    fn from(err: UnknownConvention) -> Self {
        StyleError::invalid_args(err.to_string())
    }
}

impl Convention {
    pub const ALL: [Convention; 7] = [
        Convention::UnderscoreFields,
        Convention::QualifyFieldAccess,
        Convention::QualifyPropertyAccess,
        Convention::QualifyMethodAccess,
        Convention::QualifyEventAccess,
        Convention::BackingFieldAdjacency,
        Convention::UsingPlacement,
    ];

    /// Stable name, shared with the classifier.
    pub fn name(self) -> &'static str {
        match self {
            Convention::UnderscoreFields => "underscore-fields",
            Convention::QualifyFieldAccess => "qualify-field-access",
            Convention::QualifyPropertyAccess => "qualify-property-access",
            Convention::QualifyMethodAccess => "qualify-method-access",
            Convention::QualifyEventAccess => "qualify-event-access",
            Convention::BackingFieldAdjacency => "backing-field-adjacency",
            Convention::UsingPlacement => "using-placement",
        }
    }

    /// The `.editorconfig` key that states this convention outright.
    pub fn option_key(self) -> &'static str {
        match self {
            Convention::UnderscoreFields => "tugstyle_private_field_underscore_prefix",
            Convention::QualifyFieldAccess => "dotnet_style_qualification_for_field",
            Convention::QualifyPropertyAccess => "dotnet_style_qualification_for_property",
            Convention::QualifyMethodAccess => "dotnet_style_qualification_for_method",
            Convention::QualifyEventAccess => "dotnet_style_qualification_for_event",
            Convention::BackingFieldAdjacency => "tugstyle_backing_field_adjacent",
            Convention::UsingPlacement => "csharp_using_directive_placement",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Convention::UnderscoreFields => "Private instance fields are prefixed with '_'",
            Convention::QualifyFieldAccess => "Instance field access is qualified with 'this.'",
            Convention::QualifyPropertyAccess => {
                "Instance property access is qualified with 'this.'"
            }
            Convention::QualifyMethodAccess => "Instance method calls are qualified with 'this.'",
            Convention::QualifyEventAccess => "Instance event access is qualified with 'this.'",
            Convention::BackingFieldAdjacency => {
                "A property's backing field is declared immediately before it"
            }
            Convention::UsingPlacement => "Using directives are placed inside the namespace",
        }
    }

    /// Interpret a configured value. Unrecognized values state nothing.
    pub fn parse_option(self, raw: &str) -> Option<Verdict> {
        let value = raw.trim().to_ascii_lowercase();
        match self {
            Convention::UsingPlacement => match value.as_str() {
                "inside_namespace" => Some(Verdict::Yes),
                "outside_namespace" => Some(Verdict::No),
                _ => None,
            },
            _ => parse_bool(&value).map(|yes| if yes { Verdict::Yes } else { Verdict::No }),
        }
    }
}

/// Parse an `.editorconfig` boolean.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

impl fmt::Display for Convention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Convention {
    type Err = UnknownConvention;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Convention::ALL
            .into_iter()
            .find(|convention| convention.name() == s)
            .ok_or_else(|| UnknownConvention {
                name: s.to_string(),
            })
    }
}
