use tree_sitter::Node;
use tugstyle_core::{Classifier, Observation, VisitContext, VisitResult};

use crate::nav::{declarator_name, declarators, text, Modifiers, OPAQUE_DECLARATIONS};

/// Do private instance fields start with `_`?
///
/// Every non-public, non-const, non-static field declarator is evidence:
/// Yes when its name starts with an underscore, No otherwise.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnderscoreFields;

/// Members whose bodies cannot declare fields.
const MEMBER_BODIES: &[&str] = &[
    "constructor_declaration",
    "destructor_declaration",
    "property_declaration",
    "indexer_declaration",
    "method_declaration",
    "operator_declaration",
    "conversion_operator_declaration",
    "event_declaration",
    "event_field_declaration",
];

impl Classifier for UnderscoreFields {
    type Detail = ();
    type Scratch = ();

    fn name(&self) -> &'static str {
        "underscore-fields"
    }

    fn visit(&self, node: Node<'_>, cx: &mut VisitContext<'_, (), ()>) -> VisitResult {
        let kind = node.kind();
        if MEMBER_BODIES.contains(&kind) || OPAQUE_DECLARATIONS.contains(&kind) {
            return VisitResult::SkipChildren;
        }
        if kind != "field_declaration" {
            return VisitResult::Continue;
        }

        let modifiers = Modifiers::of(node, cx.source());
        if modifiers.intersects(Modifiers::PUBLIC | Modifiers::CONST | Modifiers::STATIC) {
            return VisitResult::SkipChildren;
        }
        for declarator in declarators(node) {
            let Some(name) = declarator_name(declarator) else {
                continue;
            };
            if text(name, cx.source()).starts_with('_') {
                cx.record(Observation::YES);
            } else {
                cx.record(Observation::No);
            }
        }
        VisitResult::SkipChildren
    }
}
