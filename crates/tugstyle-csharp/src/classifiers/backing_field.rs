use tree_sitter::Node;
use tugstyle_core::{Classifier, Observation, VisitContext, VisitResult};

use crate::nav::{
    accessor_keyword, is_shadowed, previous_member, text, this_member_name, MemberKind,
    MemberTable, Usage, OPAQUE_DECLARATIONS,
};

/// Is a property's backing field declared immediately before it?
///
/// A property whose getter only returns a field (`return _x;`,
/// `=> this._x`) is evidence. Yes when that field's declaration is the
/// member right before the property, with the detail recording whether a
/// blank line separates them; No when the field lives elsewhere.
#[derive(Debug, Default, Clone, Copy)]
pub struct BackingFieldAdjacency;

const SKIPPED_MEMBERS: &[&str] = &[
    "field_declaration",
    "event_field_declaration",
    "event_declaration",
    "method_declaration",
    "constructor_declaration",
    "destructor_declaration",
    "indexer_declaration",
    "operator_declaration",
    "conversion_operator_declaration",
];

impl Classifier for BackingFieldAdjacency {
    /// Blank line between field and property.
    type Detail = bool;
    type Scratch = MemberTable;

    fn name(&self) -> &'static str {
        "backing-field-adjacency"
    }

    fn visit(&self, node: Node<'_>, cx: &mut VisitContext<'_, bool, MemberTable>) -> VisitResult {
        let kind = node.kind();
        if SKIPPED_MEMBERS.contains(&kind) || OPAQUE_DECLARATIONS.contains(&kind) {
            return VisitResult::SkipChildren;
        }
        if kind != "property_declaration" {
            return VisitResult::Continue;
        }

        if let Some(observation) = classify_property(node, cx) {
            cx.record(observation);
        }
        VisitResult::SkipChildren
    }
}

fn classify_property(
    property: Node<'_>,
    cx: &mut VisitContext<'_, bool, MemberTable>,
) -> Option<Observation<bool>> {
    let returned = returned_field_reference(property)?;
    let (source, members) = cx.split();
    let name = text(returned, source);
    if name.is_empty() || is_shadowed(returned, name, source) {
        return None;
    }
    let field = members.resolve_reference(returned, source, name, Usage::Value)?;
    if field.kind != MemberKind::Field {
        return None;
    }

    let adjacent = previous_member(property).is_some_and(|prev| prev.id() == field.declaration_id);
    if !adjacent {
        return Some(Observation::No);
    }
    Some(Observation::Yes(blank_line_between(
        source,
        field.declaration.end,
        property.start_byte(),
    )))
}

/// The identifier a property's getter returns, when that is all it does.
fn returned_field_reference(property: Node<'_>) -> Option<Node<'_>> {
    // `= 5;` initializers also use the `value` field, so look for the
    // arrow clause by kind.
    if let Some(arrow) = named_child_of_kind(property, &["arrow_expression_clause"]) {
        return expression_reference(arrow.named_child(0)?);
    }

    let accessors = property
        .child_by_field_name("accessors")
        .or_else(|| named_child_of_kind(property, &["accessor_list"]))?;
    let mut cursor = accessors.walk();
    let getter = accessors.named_children(&mut cursor).find(|accessor| {
        accessor.kind() == "accessor_declaration" && accessor_keyword(*accessor) == Some("get")
    })?;
    let body = getter
        .child_by_field_name("body")
        .or_else(|| named_child_of_kind(getter, &["block", "arrow_expression_clause"]))?;

    match body.kind() {
        "arrow_expression_clause" => expression_reference(body.named_child(0)?),
        "block" => {
            if body.named_child_count() != 1 {
                return None;
            }
            let statement = body.named_child(0)?;
            if statement.kind() != "return_statement" {
                return None;
            }
            expression_reference(statement.named_child(0)?)
        }
        _ => None,
    }
}

fn named_child_of_kind<'t>(node: Node<'t>, kinds: &[&str]) -> Option<Node<'t>> {
    let mut cursor = node.walk();
    let found = node
        .named_children(&mut cursor)
        .find(|child| kinds.contains(&child.kind()));
    found
}

/// `x` or `this.x`.
fn expression_reference(expression: Node<'_>) -> Option<Node<'_>> {
    match expression.kind() {
        "identifier" => Some(expression),
        "member_access_expression" => this_member_name(expression),
        _ => None,
    }
}

/// Returns true if some line strictly between `end` and `start` is blank.
pub(crate) fn blank_line_between(source: &str, end: usize, start: usize) -> bool {
    let Some(gap) = source.get(end..start) else {
        return false;
    };
    let lines: Vec<&str> = gap.split('\n').collect();
    if lines.len() < 3 {
        return false;
    }
    lines[1..lines.len() - 1]
        .iter()
        .any(|line| line.trim_end_matches('\r').trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifiers::test_support::classify;
    use tugstyle_core::Outcome;

    #[test]
    fn test_adjacent_with_blank_line() {
        let outcome = classify(
            BackingFieldAdjacency,
            "class C
{
    private int value1;

    public int Value1
    {
        get { return this.value1; }
    }
}",
        );
        assert_eq!(outcome, Outcome::Yes(true));
    }

    #[test]
    fn test_adjacent_without_blank_line() {
        let outcome = classify(
            BackingFieldAdjacency,
            "class C
{
    private int value1;
    public int Value1
    {
        get { return this.value1; }
    }
}",
        );
        assert_eq!(outcome, Outcome::Yes(false));
    }

    #[test]
    fn test_expression_bodied_getters() {
        let outcome = classify(
            BackingFieldAdjacency,
            "class C
{
    private int _a;
    public int A => _a;
    private int _b;
    public int B { get => _b; }
}",
        );
        assert_eq!(outcome, Outcome::Yes(false));
    }

    #[test]
    fn test_comment_between_is_skipped() {
        let outcome = classify(
            BackingFieldAdjacency,
            "class C
{
    private int _a;
    // The A value.
    public int A { get { return _a; } }
}",
        );
        assert_eq!(outcome, Outcome::Yes(false));
    }

    #[test]
    fn test_field_elsewhere_is_no() {
        let outcome = classify(
            BackingFieldAdjacency,
            "class C
{
    private int _a;
    private int _other;
    public int A { get { return _a; } }
}",
        );
        assert_eq!(outcome, Outcome::No);
    }

    #[test]
    fn test_non_trivial_getters_are_not_evidence() {
        let outcome = classify(
            BackingFieldAdjacency,
            "class C
{
    private int _a;
    public int A { get { Log(); return _a; } }
    public int B { get; set; }
    public int C2 { get; } = 5;
    public int D => _a + 1;
}",
        );
        assert_eq!(outcome, Outcome::Unknown);
    }

    #[test]
    fn test_returning_property_is_not_evidence() {
        let outcome = classify(
            BackingFieldAdjacency,
            "class C
{
    public int A { get; set; }
    public int B => A;
}",
        );
        assert_eq!(outcome, Outcome::Unknown);
    }

    #[test]
    fn test_last_yes_detail_wins() {
        let outcome = classify(
            BackingFieldAdjacency,
            "class C
{
    private int _a;

    public int A => _a;
    private int _b;
    public int B => _b;
}",
        );
        assert_eq!(outcome, Outcome::Yes(false));
    }

    #[test]
    fn test_blank_line_between() {
        assert!(blank_line_between("a;\n\n  b", 2, 6));
        assert!(blank_line_between("a;\r\n\r\n  b", 2, 8));
        assert!(!blank_line_between("a;\n  b", 2, 5));
        assert!(!blank_line_between("a; b", 2, 3));
        assert!(!blank_line_between("a;\n// c\n  b", 2, 10));
    }
}
