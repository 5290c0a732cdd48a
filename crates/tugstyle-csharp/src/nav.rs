//! Navigation over C# syntax trees.
//!
//! Classifiers need four things from the tree beyond plain traversal:
//! the nearest ancestor of some kind, subtree containment, the members a
//! type declares, and whether a simple name written somewhere refers to one
//! of those members. This module provides them.
//!
//! Member lookup is cached per type declaration in a [`MemberTable`], which
//! classifiers use as their pooled scratch buffer.

use std::collections::HashMap;
use std::ops::Range;

use bitflags::bitflags;
use tree_sitter::Node;
use tugstyle_core::Scratch;

/// Declarations that own members.
pub const TYPE_DECLARATIONS: &[&str] = &[
    "class_declaration",
    "struct_declaration",
    "record_declaration",
    "record_struct_declaration",
    "interface_declaration",
];

/// Declarations whose bodies never hold member references or directives.
pub const OPAQUE_DECLARATIONS: &[&str] = &["enum_declaration", "delegate_declaration"];

/// Accessor keywords that bring an implicit `value` parameter into scope.
const VALUE_ACCESSORS: &[&str] = &["set", "init", "add", "remove"];

const ACCESSOR_KEYWORDS: &[&str] = &["get", "set", "init", "add", "remove"];

/// Source text of `node`.
pub fn text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    source.get(node.byte_range()).unwrap_or("")
}

// ============================================================================
// Ancestry
// ============================================================================

/// Nearest proper ancestor whose kind is one of `kinds`.
pub fn first_ancestor<'t>(node: Node<'t>, kinds: &[&str]) -> Option<Node<'t>> {
    let mut current = node.parent();
    while let Some(candidate) = current {
        if kinds.contains(&candidate.kind()) {
            return Some(candidate);
        }
        current = candidate.parent();
    }
    None
}

/// Nearest enclosing type declaration.
pub fn enclosing_type(node: Node<'_>) -> Option<Node<'_>> {
    first_ancestor(node, TYPE_DECLARATIONS)
}

/// Returns true if `node` is the `field` child of `parent`.
pub fn is_field_child(parent: Node<'_>, field: &str, node: Node<'_>) -> bool {
    parent
        .child_by_field_name(field)
        .is_some_and(|child| child.id() == node.id())
}

/// Previous named sibling, skipping comments and preprocessor lines.
pub fn previous_member(node: Node<'_>) -> Option<Node<'_>> {
    let mut current = node.prev_named_sibling();
    while let Some(sibling) = current {
        let kind = sibling.kind();
        if kind != "comment" && !kind.starts_with("preproc") {
            return Some(sibling);
        }
        current = sibling.prev_named_sibling();
    }
    None
}

// ============================================================================
// Modifiers
// ============================================================================

bitflags! {
    /// Declaration modifiers.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u32 {
        const PUBLIC = 1 << 0;
        const PRIVATE = 1 << 1;
        const PROTECTED = 1 << 2;
        const INTERNAL = 1 << 3;
        const FILE = 1 << 4;
        const STATIC = 1 << 5;
        const CONST = 1 << 6;
        const READONLY = 1 << 7;
        const ABSTRACT = 1 << 8;
        const VIRTUAL = 1 << 9;
        const OVERRIDE = 1 << 10;
        const SEALED = 1 << 11;
        const PARTIAL = 1 << 12;
        const ASYNC = 1 << 13;
        const EXTERN = 1 << 14;
        const NEW = 1 << 15;
        const REQUIRED = 1 << 16;
        const UNSAFE = 1 << 17;
        const VOLATILE = 1 << 18;
        const REF = 1 << 19;
        const FIXED = 1 << 20;
    }
}

impl Modifiers {
    /// Modifier for a keyword, if it is one.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let flag = match keyword {
            "public" => Modifiers::PUBLIC,
            "private" => Modifiers::PRIVATE,
            "protected" => Modifiers::PROTECTED,
            "internal" => Modifiers::INTERNAL,
            "file" => Modifiers::FILE,
            "static" => Modifiers::STATIC,
            "const" => Modifiers::CONST,
            "readonly" => Modifiers::READONLY,
            "abstract" => Modifiers::ABSTRACT,
            "virtual" => Modifiers::VIRTUAL,
            "override" => Modifiers::OVERRIDE,
            "sealed" => Modifiers::SEALED,
            "partial" => Modifiers::PARTIAL,
            "async" => Modifiers::ASYNC,
            "extern" => Modifiers::EXTERN,
            "new" => Modifiers::NEW,
            "required" => Modifiers::REQUIRED,
            "unsafe" => Modifiers::UNSAFE,
            "volatile" => Modifiers::VOLATILE,
            "ref" => Modifiers::REF,
            "fixed" => Modifiers::FIXED,
            _ => return None,
        };
        Some(flag)
    }

    /// Modifiers written directly on a declaration.
    pub fn of(declaration: Node<'_>, source: &str) -> Self {
        let mut modifiers = Modifiers::empty();
        let mut cursor = declaration.walk();
        for child in declaration.children(&mut cursor) {
            if child.kind() == "modifier" {
                if let Some(flag) = Modifiers::from_keyword(text(child, source).trim()) {
                    modifiers |= flag;
                }
            } else if !child.is_named() && child.kind() == "static" {
                // Static lambdas and anonymous methods carry a bare keyword.
                modifiers |= Modifiers::STATIC;
            }
        }
        modifiers
    }

    /// `static` or `const`: no instance to qualify.
    pub fn is_static_context(self) -> bool {
        self.intersects(Modifiers::STATIC | Modifiers::CONST)
    }
}

// ============================================================================
// Members
// ============================================================================

/// Member categories the classifiers care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Field,
    Property,
    Method,
    Event,
}

/// Accepted argument counts of a method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arity {
    pub min: usize,
    /// `None` for a `params` array.
    pub max: Option<usize>,
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        let within_max = match self.max {
            Some(max) => count <= max,
            None => true,
        };
        count >= self.min && within_max
    }
}

/// One declared member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberDecl {
    pub name: String,
    pub kind: MemberKind,
    pub is_static: bool,
    /// `Node::id` of the declaration node (the whole `field_declaration`
    /// for a field declarator).
    pub declaration_id: usize,
    /// Byte range of the declaration node.
    pub declaration: Range<usize>,
    /// Methods only.
    pub arity: Option<Arity>,
}

/// How a simple name is used at a reference site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Usage {
    /// Read, written or passed along: never a method.
    Value,
    /// Invoked with this many arguments.
    Invocation(usize),
}

/// Per-tree cache of member declarations, keyed by type declaration.
#[derive(Debug, Default)]
pub struct MemberTable {
    index: HashMap<usize, Range<usize>>,
    members: Vec<MemberDecl>,
}

impl Scratch for MemberTable {
    fn reset(&mut self) {
        self.index.clear();
        self.members.clear();
    }
}

impl MemberTable {
    /// Members declared directly in `type_node`'s body.
    pub fn members_of(&mut self, type_node: Node<'_>, source: &str) -> &[MemberDecl] {
        let range = match self.index.get(&type_node.id()) {
            Some(range) => range.clone(),
            None => {
                let start = self.members.len();
                collect_members(type_node, source, &mut self.members);
                let range = start..self.members.len();
                self.index.insert(type_node.id(), range.clone());
                range
            }
        };
        &self.members[range]
    }

    /// Members of `type_node` named `name`.
    pub fn find_member<'a>(
        &'a mut self,
        type_node: Node<'_>,
        source: &str,
        name: &'a str,
    ) -> impl Iterator<Item = &'a MemberDecl> + 'a {
        self.members_of(type_node, source)
            .iter()
            .filter(move |member| member.name == name)
    }

    /// The single member of `type_node` that `name` denotes under `usage`.
    ///
    /// Returns `None` when nothing matches or the name is ambiguous.
    pub fn resolve<'a>(
        &'a mut self,
        type_node: Node<'_>,
        source: &str,
        name: &'a str,
        usage: Usage,
    ) -> Option<&'a MemberDecl> {
        let mut found = None;
        for member in self.find_member(type_node, source, name) {
            let fits = match usage {
                Usage::Value => member.kind != MemberKind::Method,
                Usage::Invocation(count) => {
                    member.kind == MemberKind::Method
                        && member.arity.is_some_and(|arity| arity.accepts(count))
                }
            };
            if !fits {
                continue;
            }
            if found.is_some() {
                return None;
            }
            found = Some(member);
        }
        found
    }

    /// Resolve a reference written at `reference` in its enclosing type.
    pub fn resolve_reference<'a>(
        &'a mut self,
        reference: Node<'_>,
        source: &str,
        name: &'a str,
        usage: Usage,
    ) -> Option<&'a MemberDecl> {
        let type_node = enclosing_type(reference)?;
        self.resolve(type_node, source, name, usage)
    }
}

fn collect_members(type_node: Node<'_>, source: &str, out: &mut Vec<MemberDecl>) {
    let Some(body) = type_node.child_by_field_name("body") else {
        return;
    };
    let mut cursor = body.walk();
    for member in body.named_children(&mut cursor) {
        let kind = match member.kind() {
            "field_declaration" => MemberKind::Field,
            "event_field_declaration" => MemberKind::Event,
            "property_declaration" => MemberKind::Property,
            "event_declaration" => MemberKind::Event,
            "method_declaration" => MemberKind::Method,
            _ => continue,
        };
        if has_child_kind(member, "explicit_interface_specifier") {
            continue;
        }
        let is_static = Modifiers::of(member, source).is_static_context();

        match member.kind() {
            "field_declaration" | "event_field_declaration" => {
                for declarator in declarators(member) {
                    if let Some(name) = declarator_name(declarator) {
                        out.push(MemberDecl {
                            name: text(name, source).to_string(),
                            kind,
                            is_static,
                            declaration_id: member.id(),
                            declaration: member.byte_range(),
                            arity: None,
                        });
                    }
                }
            }
            _ => {
                let Some(name) = member.child_by_field_name("name") else {
                    continue;
                };
                let arity = (kind == MemberKind::Method)
                    .then(|| arity_of(member.child_by_field_name("parameters"), source));
                out.push(MemberDecl {
                    name: text(name, source).to_string(),
                    kind,
                    is_static,
                    declaration_id: member.id(),
                    declaration: member.byte_range(),
                    arity,
                });
            }
        }
    }
}

fn has_child_kind(node: Node<'_>, kind: &str) -> bool {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).any(|child| child.kind() == kind);
    found
}

/// Declarators of a field, event field or local declaration.
pub fn declarators(declaration: Node<'_>) -> Vec<Node<'_>> {
    let variable_declaration = if declaration.kind() == "variable_declaration" {
        Some(declaration)
    } else {
        let mut cursor = declaration.walk();
        let found = declaration
            .named_children(&mut cursor)
            .find(|child| child.kind() == "variable_declaration");
        found
    };
    let Some(variable_declaration) = variable_declaration else {
        return Vec::new();
    };
    let mut cursor = variable_declaration.walk();
    let found = variable_declaration
        .named_children(&mut cursor)
        .filter(|child| child.kind() == "variable_declarator")
        .collect();
    found
}

/// Name identifier of a variable declarator.
pub fn declarator_name(declarator: Node<'_>) -> Option<Node<'_>> {
    if let Some(name) = declarator.child_by_field_name("name") {
        return Some(name);
    }
    let mut cursor = declarator.walk();
    let found = declarator
        .named_children(&mut cursor)
        .find(|child| child.kind() == "identifier");
    found
}

/// One entry of a parameter list.
struct DeclaredParameter<'t> {
    name: Option<Node<'t>>,
    params: bool,
    optional: bool,
}

/// The parameters of a `parameter_list`, in order.
///
/// A `params` array is not always wrapped in its own node: the `params`
/// keyword, the array type and the name can sit directly in the list.
fn declared_parameters<'t>(parameters: Node<'t>, source: &str) -> Vec<DeclaredParameter<'t>> {
    let mut declared = Vec::new();
    let mut pending_params = false;
    let mut cursor = parameters.walk();
    for child in parameters.children(&mut cursor) {
        match child.kind() {
            "parameter" => declared.push(DeclaredParameter {
                name: child.child_by_field_name("name"),
                params: is_params_parameter(child, source),
                optional: has_default_value(child),
            }),
            "parameter_array" => declared.push(DeclaredParameter {
                name: child.child_by_field_name("name").or_else(|| trailing_identifier(child)),
                params: true,
                optional: false,
            }),
            "params" => pending_params = true,
            "identifier" if pending_params => {
                pending_params = false;
                declared.push(DeclaredParameter {
                    name: Some(child),
                    params: true,
                    optional: false,
                });
            }
            _ => {}
        }
    }
    declared
}

fn trailing_identifier(node: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = node.walk();
    let found = node
        .named_children(&mut cursor)
        .filter(|child| child.kind() == "identifier")
        .last();
    found
}

fn arity_of(parameters: Option<Node<'_>>, source: &str) -> Arity {
    let declared = parameters
        .map(|parameters| declared_parameters(parameters, source))
        .unwrap_or_default();
    let unbounded = declared.iter().any(|parameter| parameter.params);
    let min = declared
        .iter()
        .filter(|parameter| !parameter.params && !parameter.optional)
        .count();
    let total = declared.iter().filter(|parameter| !parameter.params).count();
    Arity {
        min,
        max: (!unbounded).then_some(total),
    }
}

fn is_params_parameter(parameter: Node<'_>, source: &str) -> bool {
    let mut cursor = parameter.walk();
    let found = parameter
        .children(&mut cursor)
        .any(|child| child.kind() == "params" || text(child, source) == "params");
    found
}

fn has_default_value(parameter: Node<'_>) -> bool {
    let mut cursor = parameter.walk();
    let found = parameter
        .children(&mut cursor)
        .any(|child| child.kind() == "=" || child.kind() == "equals_value_clause");
    found
}

/// Number of arguments at an invocation.
pub fn argument_count(invocation: Node<'_>) -> usize {
    let Some(arguments) = invocation.child_by_field_name("arguments") else {
        return 0;
    };
    let mut cursor = arguments.walk();
    let count = arguments
        .named_children(&mut cursor)
        .filter(|child| child.kind() == "argument")
        .count();
    count
}

// ============================================================================
// Reference shapes
// ============================================================================

/// Returns true for the `this` expression.
pub fn is_this(node: Node<'_>) -> bool {
    matches!(node.kind(), "this" | "this_expression")
}

/// The identifier of a simple name (`x` or `x<T>`).
pub fn simple_name_identifier(node: Node<'_>) -> Option<Node<'_>> {
    match node.kind() {
        "identifier" => Some(node),
        "generic_name" => {
            let mut cursor = node.walk();
            let found = node
                .named_children(&mut cursor)
                .find(|child| child.kind() == "identifier");
            found
        }
        _ => None,
    }
}

/// For `this.X`, the identifier `X`.
pub fn this_member_name(node: Node<'_>) -> Option<Node<'_>> {
    if node.kind() != "member_access_expression" {
        return None;
    }
    let receiver = node.child_by_field_name("expression")?;
    if !is_this(receiver) {
        return None;
    }
    simple_name_identifier(node.child_by_field_name("name")?)
}

/// Accessor keyword (`get`, `set`, `init`, `add`, `remove`).
pub fn accessor_keyword(accessor: Node<'_>) -> Option<&'static str> {
    if let Some(name) = accessor.child_by_field_name("name") {
        if let Some(keyword) = ACCESSOR_KEYWORDS.iter().find(|k| **k == name.kind()) {
            return Some(*keyword);
        }
    }
    let mut cursor = accessor.walk();
    let found = accessor
        .children(&mut cursor)
        .find_map(|child| ACCESSOR_KEYWORDS.iter().find(|k| **k == child.kind()).copied());
    found
}

// ============================================================================
// Shadowing
// ============================================================================

/// Returns true if a local, parameter or pattern variable named `name`
/// is in scope at `node`, hiding any member of the same name.
///
/// The search stops at the enclosing type declaration.
pub fn is_shadowed(node: Node<'_>, name: &str, source: &str) -> bool {
    let mut current = node;
    while let Some(scope) = current.parent() {
        if TYPE_DECLARATIONS.contains(&scope.kind()) {
            return false;
        }
        if scope_declares(scope, name, source) {
            return true;
        }
        current = scope;
    }
    false
}

fn scope_declares(scope: Node<'_>, name: &str, source: &str) -> bool {
    match scope.kind() {
        "method_declaration"
        | "constructor_declaration"
        | "destructor_declaration"
        | "operator_declaration"
        | "conversion_operator_declaration"
        | "indexer_declaration"
        | "local_function_statement" => {
            parameters_declare(scope.child_by_field_name("parameters"), name, source)
                || patterns_declare(scope, name, source)
        }
        "lambda_expression" => {
            lambda_parameters_declare(scope, name, source) || patterns_declare(scope, name, source)
        }
        "anonymous_method_expression" => {
            let parameters = scope.child_by_field_name("parameters").or_else(|| {
                let mut cursor = scope.walk();
                let found = scope
                    .named_children(&mut cursor)
                    .find(|child| child.kind() == "parameter_list");
                found
            });
            parameters_declare(parameters, name, source) || patterns_declare(scope, name, source)
        }
        "accessor_declaration" => {
            let implicit_value = name == "value"
                && accessor_keyword(scope).is_some_and(|keyword| VALUE_ACCESSORS.contains(&keyword));
            implicit_value || patterns_declare(scope, name, source)
        }
        "block" | "switch_section" => block_declares(scope, name, source),
        "for_statement" | "using_statement" | "fixed_statement" => {
            let mut cursor = scope.walk();
            let found = scope
                .named_children(&mut cursor)
                .filter(|child| child.kind() == "variable_declaration")
                .any(|declaration| declaration_declares(declaration, name, source));
            found
        }
        "foreach_statement" => foreach_declares(scope, name, source),
        "catch_clause" => {
            let mut cursor = scope.walk();
            let found = scope
                .named_children(&mut cursor)
                .filter(|child| child.kind() == "catch_declaration")
                .filter_map(|declaration| declaration.child_by_field_name("name"))
                .any(|identifier| text(identifier, source) == name);
            found
        }
        "query_expression" => query_declares(scope, name, source),
        _ => false,
    }
}

fn parameters_declare(parameters: Option<Node<'_>>, name: &str, source: &str) -> bool {
    let Some(parameters) = parameters else {
        return false;
    };
    declared_parameters(parameters, source)
        .iter()
        .filter_map(|parameter| parameter.name)
        .any(|identifier| text(identifier, source) == name)
}

/// `x => ...` or `(int x, y) => ...`: everything before the arrow.
fn lambda_parameters_declare(lambda: Node<'_>, name: &str, source: &str) -> bool {
    let mut cursor = lambda.walk();
    for child in lambda.children(&mut cursor) {
        match child.kind() {
            "=>" => break,
            "identifier" | "implicit_parameter" if text(child, source) == name => return true,
            "parameter_list" if parameters_declare(Some(child), name, source) => return true,
            _ => {}
        }
    }
    false
}

/// The iteration variable of a `foreach`, possibly a deconstruction.
fn foreach_declares(statement: Node<'_>, name: &str, source: &str) -> bool {
    if let Some(left) = statement.child_by_field_name("left") {
        return subtree_has_identifier(left, name, source);
    }
    let mut cursor = statement.walk();
    for child in statement.children(&mut cursor) {
        match child.kind() {
            "in" => break,
            "identifier" | "tuple_pattern" | "declaration_expression"
                if subtree_has_identifier(child, name, source) =>
            {
                return true
            }
            _ => {}
        }
    }
    false
}

/// Locals and local functions declared by the statements of a block.
fn block_declares(block: Node<'_>, name: &str, source: &str) -> bool {
    let mut cursor = block.walk();
    let found = block.named_children(&mut cursor).any(|statement| match statement.kind() {
        "local_declaration_statement" => declaration_declares(statement, name, source),
        "local_function_statement" => statement
            .child_by_field_name("name")
            .is_some_and(|identifier| text(identifier, source) == name),
        _ => false,
    });
    found
}

fn declaration_declares(declaration: Node<'_>, name: &str, source: &str) -> bool {
    declarators(declaration)
        .into_iter()
        .filter_map(declarator_name)
        .any(|identifier| text(identifier, source) == name)
}

/// `out var x`, `is T x`, `var x` patterns anywhere under `scope`.
fn patterns_declare(scope: Node<'_>, name: &str, source: &str) -> bool {
    let mut cursor = scope.walk();
    loop {
        let node = cursor.node();
        if matches!(
            node.kind(),
            "declaration_expression" | "declaration_pattern" | "var_pattern" | "recursive_pattern"
        ) && node.named_child_count() >= 2
        {
            let designation = node
                .child_by_field_name("name")
                .or_else(|| node.named_child(node.named_child_count() - 1));
            if designation.is_some_and(|d| d.kind() == "identifier" && text(d, source) == name) {
                return true;
            }
        }

        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.node().id() == scope.id() {
                return false;
            }
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return false;
            }
        }
    }
}

fn query_declares(query: Node<'_>, name: &str, source: &str) -> bool {
    let mut cursor = query.walk();
    loop {
        let node = cursor.node();
        if matches!(
            node.kind(),
            "from_clause" | "let_clause" | "join_clause" | "join_into_clause" | "query_continuation"
        ) && node
            .child_by_field_name("name")
            .is_some_and(|identifier| text(identifier, source) == name)
        {
            return true;
        }

        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.node().id() == query.id() {
                return false;
            }
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return false;
            }
        }
    }
}

fn subtree_has_identifier(node: Node<'_>, name: &str, source: &str) -> bool {
    if node.kind() == "identifier" {
        return text(node, source) == name;
    }
    let mut cursor = node.walk();
    let found = node
        .named_children(&mut cursor)
        .any(|child| subtree_has_identifier(child, name, source));
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use tugstyle_core::ParsedTree;

    /// First node of `kind` whose text is `text`, in document order.
    fn find<'t>(tree: &'t ParsedTree, kind: &str, wanted: &str) -> Node<'t> {
        fn go<'t>(node: Node<'t>, kind: &str, wanted: &str, source: &str) -> Option<Node<'t>> {
            if node.kind() == kind && text(node, source) == wanted {
                return Some(node);
            }
            let mut cursor = node.walk();
            let children: Vec<_> = node.children(&mut cursor).collect();
            children
                .into_iter()
                .find_map(|child| go(child, kind, wanted, source))
        }
        go(tree.root(), kind, wanted, tree.source()).unwrap()
    }

    /// Last identifier with the given text.
    fn last_identifier<'t>(tree: &'t ParsedTree, wanted: &str) -> Node<'t> {
        fn go<'t>(node: Node<'t>, wanted: &str, source: &str, out: &mut Option<Node<'t>>) {
            if node.kind() == "identifier" && text(node, source) == wanted {
                *out = Some(node);
            }
            let mut cursor = node.walk();
            let children: Vec<_> = node.children(&mut cursor).collect();
            for child in children {
                go(child, wanted, source, out);
            }
        }
        let mut out = None;
        go(tree.root(), wanted, tree.source(), &mut out);
        out.unwrap()
    }

    #[test]
    fn test_first_ancestor() {
        let tree = parse("namespace N { class C { void M() { int x = 1; } } }").unwrap();
        let x = find(&tree, "identifier", "x");
        let method = first_ancestor(x, &["method_declaration"]).unwrap();
        let class = enclosing_type(x).unwrap();
        assert_eq!(class.kind(), "class_declaration");
        assert_eq!(first_ancestor(method, &["class_declaration"]), Some(class));
        assert!(first_ancestor(class, &["method_declaration"]).is_none());
        assert!(first_ancestor(x, &["struct_declaration"]).is_none());
    }

    #[test]
    fn test_modifiers() {
        let tree = parse("class C { private static readonly int _x; }").unwrap();
        let field = find(&tree, "field_declaration", "private static readonly int _x;");
        let modifiers = Modifiers::of(field, tree.source());
        assert!(modifiers.contains(Modifiers::PRIVATE | Modifiers::STATIC | Modifiers::READONLY));
        assert!(!modifiers.contains(Modifiers::PUBLIC));
        assert!(modifiers.is_static_context());
    }

    #[test]
    fn test_members_of_type() {
        let source = "class C {
            int _a, _b;
            const int K = 1;
            public int P { get; set; }
            public event System.EventHandler Changed;
            void M(int x, int y = 0) {}
            void M(params int[] rest) {}
            static void S() {}
        }";
        let tree = parse(source).unwrap();
        let class = find(&tree, "class_declaration", source);
        let mut table = MemberTable::default();
        let members = table.members_of(class, tree.source());
        let names: Vec<_> = members.iter().map(|m| (m.name.as_str(), m.kind)).collect();
        assert_eq!(
            names,
            vec![
                ("_a", MemberKind::Field),
                ("_b", MemberKind::Field),
                ("K", MemberKind::Field),
                ("P", MemberKind::Property),
                ("Changed", MemberKind::Event),
                ("M", MemberKind::Method),
                ("M", MemberKind::Method),
                ("S", MemberKind::Method),
            ]
        );
        assert!(members[2].is_static);
        assert!(members[7].is_static);
        assert_eq!(members[0].declaration_id, members[1].declaration_id);
    }

    #[test]
    fn test_resolve_narrows_overloads_by_arity() {
        let source = "class C {
            void M(int x, int y = 0) {}
            void M(int a, int b, int c, params int[] rest) {}
        }";
        let tree = parse(source).unwrap();
        let class = find(&tree, "class_declaration", source);
        let mut table = MemberTable::default();
        let src = tree.source();

        assert!(table.resolve(class, src, "M", Usage::Invocation(0)).is_none());
        let one = table.resolve(class, src, "M", Usage::Invocation(1)).unwrap();
        assert_eq!(one.arity, Some(Arity { min: 1, max: Some(2) }));
        let many = table.resolve(class, src, "M", Usage::Invocation(9)).unwrap();
        assert_eq!(many.arity.unwrap().max, None);
        // Value usage never resolves to a method group.
        assert!(table.resolve(class, src, "M", Usage::Value).is_none());
    }

    #[test]
    fn test_resolve_ambiguous_is_none() {
        let source = "class C { void M(int a) {} void M(string s) {} }";
        let tree = parse(source).unwrap();
        let class = find(&tree, "class_declaration", source);
        let mut table = MemberTable::default();
        assert!(table
            .resolve(class, tree.source(), "M", Usage::Invocation(1))
            .is_none());
    }

    #[test]
    fn test_member_table_reset() {
        let source = "class C { int _a; }";
        let tree = parse(source).unwrap();
        let class = find(&tree, "class_declaration", source);
        let mut table = MemberTable::default();
        assert_eq!(table.members_of(class, tree.source()).len(), 1);
        table.reset();
        assert!(table.index.is_empty());
        assert!(table.members.is_empty());
    }

    #[test]
    fn test_shadowed_by_parameter_and_local() {
        let tree = parse(
            "class C {
                int a; int b; int c;
                void M(int a) {
                    int b = 0;
                    Use(a, b, c);
                }
            }",
        )
        .unwrap();
        let src = tree.source();
        assert!(is_shadowed(last_identifier(&tree, "a"), "a", src));
        assert!(is_shadowed(last_identifier(&tree, "b"), "b", src));
        assert!(!is_shadowed(last_identifier(&tree, "c"), "c", src));
    }

    #[test]
    fn test_shadowed_by_accessor_value() {
        let tree = parse(
            "class C {
                int value;
                int P { get { return value; } }
                int Q { set { Use(value); } }
            }",
        )
        .unwrap();
        let src = tree.source();
        let in_getter = find(&tree, "return_statement", "return value;")
            .named_child(0)
            .unwrap();
        assert!(!is_shadowed(in_getter, "value", src));
        assert!(is_shadowed(last_identifier(&tree, "value"), "value", src));
    }

    #[test]
    fn test_shadowed_by_lambda_and_loops() {
        let tree = parse(
            "class C {
                int x; int item; int e; int n;
                void M() {
                    Run(x => Use(x));
                    foreach (var item in items) { Use(item); }
                    try { } catch (Exception e) { Use(e); }
                    if (o is int n) { Use(n); }
                }
            }",
        )
        .unwrap();
        let src = tree.source();
        assert!(is_shadowed(last_identifier(&tree, "x"), "x", src));
        assert!(is_shadowed(last_identifier(&tree, "item"), "item", src));
        assert!(is_shadowed(last_identifier(&tree, "e"), "e", src));
        assert!(is_shadowed(last_identifier(&tree, "n"), "n", src));
    }

    #[test]
    fn test_shadowed_by_params_array() {
        let tree = parse(
            "class C {
                int[] rest; int first;
                void M(int first, params int[] rest) { Use(rest, first); }
            }",
        )
        .unwrap();
        let src = tree.source();
        assert!(is_shadowed(last_identifier(&tree, "rest"), "rest", src));
        assert!(is_shadowed(last_identifier(&tree, "first"), "first", src));
    }

    #[test]
    fn test_this_member_name() {
        let tree = parse("class C { void M() { this.Value = 1; other.Value = 2; } }").unwrap();
        let qualified = find(&tree, "member_access_expression", "this.Value");
        let name = this_member_name(qualified).unwrap();
        assert_eq!(text(name, tree.source()), "Value");
        let other = find(&tree, "member_access_expression", "other.Value");
        assert!(this_member_name(other).is_none());
    }

    #[test]
    fn test_accessor_keyword() {
        let tree = parse("class C { int P { get; set; } }").unwrap();
        let get = find(&tree, "accessor_declaration", "get;");
        let set = find(&tree, "accessor_declaration", "set;");
        assert_eq!(accessor_keyword(get), Some("get"));
        assert_eq!(accessor_keyword(set), Some("set"));
    }

    #[test]
    fn test_argument_count() {
        let tree = parse("class C { void M() { Call(1, 2, 3); Call(); } }").unwrap();
        let three = find(&tree, "invocation_expression", "Call(1, 2, 3)");
        let none = find(&tree, "invocation_expression", "Call()");
        assert_eq!(argument_count(three), 3);
        assert_eq!(argument_count(none), 0);
    }
}
