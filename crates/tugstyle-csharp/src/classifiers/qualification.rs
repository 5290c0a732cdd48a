use tree_sitter::Node;
use tugstyle_core::{Classifier, Observation, VisitContext, VisitResult};

use crate::nav::{
    argument_count, is_field_child, is_shadowed, simple_name_identifier, text,
    this_member_name, MemberKind, MemberTable, Modifiers, Usage, OPAQUE_DECLARATIONS,
};

/// Is instance member access qualified with `this.`?
///
/// One classifier per member kind. `this.X` where `X` is an instance member
/// of that kind is evidence for qualification. A bare `X` is evidence
/// against it only where the reference is unambiguous: the target of an
/// assignment, a returned value, an argument, or the body of an
/// expression-bodied member. Methods count invocations instead.
#[derive(Debug, Clone, Copy)]
pub struct QualifyMemberAccess {
    kind: MemberKind,
}

impl QualifyMemberAccess {
    pub fn new(kind: MemberKind) -> Self {
        QualifyMemberAccess { kind }
    }

    pub fn fields() -> Self {
        Self::new(MemberKind::Field)
    }

    pub fn properties() -> Self {
        Self::new(MemberKind::Property)
    }

    pub fn methods() -> Self {
        Self::new(MemberKind::Method)
    }

    pub fn events() -> Self {
        Self::new(MemberKind::Event)
    }

    /// The member kind this classifier looks at.
    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    /// Returns true if `identifier` names an instance member of our kind
    /// that nothing local hides.
    fn is_instance_member(
        &self,
        identifier: Node<'_>,
        usage: Usage,
        cx: &mut VisitContext<'_, (), MemberTable>,
    ) -> bool {
        let (source, members) = cx.split();
        let name = text(identifier, source);
        if name.is_empty() {
            return false;
        }
        let resolved = members
            .resolve_reference(identifier, source, name, usage)
            .is_some_and(|member| member.kind == self.kind && !member.is_static);
        resolved && !is_shadowed(identifier, name, source)
    }

    /// Subtrees with no instance in scope, and declarations that cannot
    /// hold a reference of our kind.
    ///
    /// Type declarations are never pruned for being `static`: a nested type
    /// of a static class can still have instance members.
    fn prunes(&self, node: Node<'_>, source: &str) -> bool {
        let kind = node.kind();
        if OPAQUE_DECLARATIONS.contains(&kind) {
            return true;
        }
        if matches!(kind, "operator_declaration" | "conversion_operator_declaration") {
            return true;
        }
        if self.kind == MemberKind::Event && kind == "event_declaration" {
            return true;
        }
        if matches!(kind, "field_declaration" | "event_field_declaration") {
            return self.kind != MemberKind::Method
                || Modifiers::of(node, source).is_static_context();
        }
        let declares_scope = matches!(
            kind,
            "method_declaration"
                | "constructor_declaration"
                | "property_declaration"
                | "indexer_declaration"
                | "event_declaration"
                | "local_function_statement"
                | "lambda_expression"
                | "anonymous_method_expression"
        );
        declares_scope && Modifiers::of(node, source).contains(Modifiers::STATIC)
    }

    fn visit_invocation(&self, node: Node<'_>, cx: &mut VisitContext<'_, (), MemberTable>) {
        let Some(function) = node.child_by_field_name("function") else {
            return;
        };
        let usage = Usage::Invocation(argument_count(node));
        if let Some(name) = this_member_name(function) {
            if self.is_instance_member(name, usage, cx) {
                cx.record(Observation::YES);
            }
        } else if let Some(name) = simple_name_identifier(function) {
            if self.is_instance_member(name, usage, cx) {
                cx.record(Observation::No);
            }
        }
    }

    /// Positions where a bare name can only mean a value of ours.
    fn is_bare_evidence_position(&self, identifier: Node<'_>) -> bool {
        let Some(parent) = identifier.parent() else {
            return false;
        };
        match parent.kind() {
            "assignment_expression" => {
                let in_initializer = parent
                    .parent()
                    .is_some_and(|p| p.kind() == "initializer_expression");
                is_field_child(parent, "left", identifier) && !in_initializer
            }
            "return_statement" | "arrow_expression_clause" => true,
            "argument" => {
                let names_parameter = is_field_child(parent, "name", identifier)
                    || identifier.next_sibling().is_some_and(|s| s.kind() == ":");
                !names_parameter
            }
            "invocation_expression" => {
                self.kind == MemberKind::Event && is_field_child(parent, "function", identifier)
            }
            "conditional_access_expression" => {
                self.kind == MemberKind::Event && first_named_child_is(parent, identifier)
            }
            _ => false,
        }
    }
}

/// `x?.Invoke()`: the receiver is the first named child.
fn first_named_child_is(parent: Node<'_>, node: Node<'_>) -> bool {
    if is_field_child(parent, "condition", node) {
        return true;
    }
    parent
        .named_child(0)
        .is_some_and(|first| first.id() == node.id())
}

impl Classifier for QualifyMemberAccess {
    type Detail = ();
    type Scratch = MemberTable;

    fn name(&self) -> &'static str {
        match self.kind {
            MemberKind::Field => "qualify-field-access",
            MemberKind::Property => "qualify-property-access",
            MemberKind::Method => "qualify-method-access",
            MemberKind::Event => "qualify-event-access",
        }
    }

    fn visit(&self, node: Node<'_>, cx: &mut VisitContext<'_, (), MemberTable>) -> VisitResult {
        if self.prunes(node, cx.source()) {
            return VisitResult::SkipChildren;
        }

        match (self.kind, node.kind()) {
            (MemberKind::Method, "invocation_expression") => {
                self.visit_invocation(node, cx);
            }
            (MemberKind::Method, _) => {}
            (_, "member_access_expression") => {
                if let Some(name) = this_member_name(node) {
                    if self.is_instance_member(name, Usage::Value, cx) {
                        cx.record(Observation::YES);
                    }
                    return VisitResult::SkipChildren;
                }
            }
            (_, "identifier") => {
                if self.is_bare_evidence_position(node)
                    && self.is_instance_member(node, Usage::Value, cx)
                {
                    cx.record(Observation::No);
                }
            }
            _ => {}
        }
        VisitResult::Continue
    }
}
