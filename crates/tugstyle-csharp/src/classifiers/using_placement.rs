use tree_sitter::Node;
use tugstyle_core::{Classifier, Observation, VisitContext, VisitResult};

use crate::nav::{first_ancestor, OPAQUE_DECLARATIONS, TYPE_DECLARATIONS};

/// Are using directives placed inside the namespace?
///
/// Yes for a directive nested in a namespace block or following a
/// file-scoped namespace, No for one at file scope. `global using`
/// directives always live at file scope and say nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct UsingPlacement;

const NAMESPACES: &[&str] = &["namespace_declaration", "file_scoped_namespace_declaration"];

impl Classifier for UsingPlacement {
    type Detail = ();
    type Scratch = ();

    fn name(&self) -> &'static str {
        "using-placement"
    }

    fn visit(&self, node: Node<'_>, cx: &mut VisitContext<'_, (), ()>) -> VisitResult {
        let kind = node.kind();
        // Directives only precede type bodies.
        if TYPE_DECLARATIONS.contains(&kind)
            || OPAQUE_DECLARATIONS.contains(&kind)
            || kind == "global_statement"
        {
            return VisitResult::SkipChildren;
        }
        if kind != "using_directive" {
            return VisitResult::Continue;
        }

        if !is_global(node) {
            if inside_namespace(node) {
                cx.record(Observation::YES);
            } else {
                cx.record(Observation::No);
            }
        }
        VisitResult::SkipChildren
    }
}

fn is_global(directive: Node<'_>) -> bool {
    let mut cursor = directive.walk();
    let global = directive
        .children(&mut cursor)
        .any(|child| child.kind() == "global");
    global
}

fn inside_namespace(directive: Node<'_>) -> bool {
    if first_ancestor(directive, NAMESPACES).is_some() {
        return true;
    }
    let mut sibling = directive.prev_named_sibling();
    while let Some(node) = sibling {
        if node.kind() == "file_scoped_namespace_declaration" {
            return true;
        }
        sibling = node.prev_named_sibling();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifiers::test_support::classify;
    use tugstyle_core::Outcome;

    #[test]
    fn test_directive_before_namespace_is_no() {
        let outcome = classify(
            UsingPlacement,
            "using System;

namespace App
{
    class C { }
}",
        );
        assert_eq!(outcome, Outcome::No);
    }

    #[test]
    fn test_directive_inside_namespace_is_yes() {
        let outcome = classify(
            UsingPlacement,
            "namespace App
{
    using System;

    class C { }
}",
        );
        assert_eq!(outcome, Outcome::Yes(()));
    }

    #[test]
    fn test_both_placements_are_mixed() {
        let outcome = classify(
            UsingPlacement,
            "using System;

namespace App
{
    using System.IO;

    class C { }
}",
        );
        assert_eq!(outcome, Outcome::Mixed);
    }

    #[test]
    fn test_global_using_is_not_evidence() {
        let outcome = classify(
            UsingPlacement,
            "global using System;

namespace App
{
    class C { }
}",
        );
        assert_eq!(outcome, Outcome::Unknown);
    }

    #[test]
    fn test_no_directives_is_unknown() {
        let outcome = classify(UsingPlacement, "namespace App { class C { void M() { } } }");
        assert_eq!(outcome, Outcome::Unknown);
    }

    #[test]
    fn test_directive_without_namespace_is_no() {
        let outcome = classify(UsingPlacement, "using System;\n\nclass C { }");
        assert_eq!(outcome, Outcome::No);
    }
}
