//! C# syntax helpers on top of the tree-sitter tree.
//!
//! These functions classify declarations and walk the parts of the tree that
//! every analyzer needs: top-level types, type members, modifiers,
//! parameters and namespaces. They tolerate small differences between
//! grammar revisions by falling back from field lookups to child scans.

use tree_sitter::{Language, Node, Parser, Tree};

use crate::config::DeclarationKind;

/// Returns the C# tree-sitter language.
#[must_use]
pub fn language() -> Language {
    tree_sitter_c_sharp::LANGUAGE.into()
}

/// Parses C# source into a syntax tree.
///
/// Returns `None` only when tree-sitter refuses the language or gives up;
/// syntax errors are represented inside the returned tree.
#[must_use]
pub fn parse(source: &str) -> Option<Tree> {
    let mut parser = Parser::new();
    parser.set_language(&language()).ok()?;
    parser.parse(source, None)
}

/// Returns the source text covered by `node`.
#[must_use]
pub fn node_text<'a>(node: Node<'_>, src: &'a str) -> &'a str {
    src.get(node.start_byte()..node.end_byte()).unwrap_or("")
}

/// Returns all children of `node`.
#[must_use]
pub fn children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

/// Returns the named children of `node`.
#[must_use]
pub fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

/// Returns `node` and every descendant in pre-order.
#[must_use]
pub fn descendants(node: Node<'_>) -> Vec<Node<'_>> {
    let mut out = Vec::new();
    let mut stack = vec![node];
    while let Some(current) = stack.pop() {
        out.push(current);
        let mut kids = children(current);
        kids.reverse();
        stack.extend(kids);
    }
    out
}

/// Finds the first node that is a syntax error or a missing token.
#[must_use]
pub fn first_error(root: Node<'_>) -> Option<Node<'_>> {
    if !root.has_error() {
        return None;
    }
    descendants(root)
        .into_iter()
        .find(|n| n.is_error() || n.is_missing())
}

/// Returns the modifier keywords (`public`, `static`, ...) of a declaration.
#[must_use]
pub fn modifiers<'a>(node: Node<'_>, src: &'a str) -> Vec<&'a str> {
    children(node)
        .into_iter()
        .filter(|c| c.kind() == "modifier")
        .map(|c| node_text(c, src).trim())
        .collect()
}

/// Checks whether a declaration carries the given modifier.
#[must_use]
pub fn has_modifier(node: Node<'_>, src: &str, modifier: &str) -> bool {
    modifiers(node, src).iter().any(|m| *m == modifier)
}

/// Returns the identifier node naming a declaration.
#[must_use]
pub fn name_node(node: Node<'_>) -> Option<Node<'_>> {
    node.child_by_field_name("name").or_else(|| {
        named_children(node)
            .into_iter()
            .find(|c| c.kind() == "identifier")
    })
}

/// Returns the identifier text naming a declaration.
#[must_use]
pub fn name_of<'a>(node: Node<'_>, src: &'a str) -> Option<&'a str> {
    name_node(node).map(|n| node_text(n, src))
}

/// Returns the body node (`declaration_list`, `block`, ...) of a declaration.
#[must_use]
pub fn body(node: Node<'_>) -> Option<Node<'_>> {
    node.child_by_field_name("body").or_else(|| {
        named_children(node).into_iter().find(|c| {
            matches!(
                c.kind(),
                "declaration_list" | "block" | "arrow_expression_clause"
            )
        })
    })
}

/// Syntactic kind of a type declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// `class`
    Class,
    /// `struct`
    Struct,
    /// `interface`
    Interface,
    /// `enum`
    Enum,
    /// `record` / `record class` / `record struct`
    Record,
    /// `delegate`
    Delegate,
}

impl TypeKind {
    /// Classifies a node kind as a type declaration.
    #[must_use]
    pub fn from_node_kind(kind: &str) -> Option<Self> {
        match kind {
            "class_declaration" => Some(Self::Class),
            "struct_declaration" => Some(Self::Struct),
            "interface_declaration" => Some(Self::Interface),
            "enum_declaration" => Some(Self::Enum),
            "record_declaration" | "record_struct_declaration" => Some(Self::Record),
            "delegate_declaration" => Some(Self::Delegate),
            _ => None,
        }
    }

    /// Whether instances of this type have `this`.
    #[must_use]
    pub fn has_instance_context(self) -> bool {
        matches!(self, Self::Class | Self::Struct | Self::Record)
    }
}

/// A type declaration found in a file.
#[derive(Debug, Clone, Copy)]
pub struct TypeDecl<'t> {
    /// The declaration node.
    pub node: Node<'t>,
    /// The identifier node.
    pub name_node: Node<'t>,
    /// Syntactic kind.
    pub kind: TypeKind,
}

impl<'t> TypeDecl<'t> {
    /// Builds a type declaration from a node, if it is one.
    #[must_use]
    pub fn from_node(node: Node<'t>) -> Option<Self> {
        let kind = TypeKind::from_node_kind(node.kind())?;
        let name_node = name_node(node)?;
        Some(Self {
            node,
            name_node,
            kind,
        })
    }

    /// Identifier text.
    #[must_use]
    pub fn name<'a>(&self, src: &'a str) -> &'a str {
        node_text(self.name_node, src)
    }

    /// Declaration kind used for folder mapping.
    #[must_use]
    pub fn declaration_kind(&self, src: &str) -> DeclarationKind {
        match self.kind {
            TypeKind::Class if has_modifier(self.node, src, "abstract") => {
                DeclarationKind::AbstractClass
            }
            TypeKind::Class => DeclarationKind::Class,
            TypeKind::Struct => DeclarationKind::Struct,
            TypeKind::Interface => DeclarationKind::Interface,
            TypeKind::Enum => DeclarationKind::Enum,
            TypeKind::Record => DeclarationKind::Record,
            TypeKind::Delegate => DeclarationKind::Delegate,
        }
    }

    /// Member declarations in the type body, in source order.
    #[must_use]
    pub fn members(&self) -> Vec<Node<'t>> {
        body(self.node)
            .filter(|b| b.kind() == "declaration_list")
            .map(|b| {
                named_children(b)
                    .into_iter()
                    .filter(|m| MemberKind::of(*m).is_some())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Returns the type declarations that are not nested in another type.
///
/// Types inside block-scoped and file-scoped namespaces are included.
#[must_use]
pub fn top_level_types(root: Node<'_>) -> Vec<TypeDecl<'_>> {
    let mut out = Vec::new();
    collect_top_level(root, &mut out);
    out
}

fn collect_top_level<'t>(node: Node<'t>, out: &mut Vec<TypeDecl<'t>>) {
    for child in named_children(node) {
        if let Some(decl) = TypeDecl::from_node(child) {
            out.push(decl);
            continue;
        }
        if matches!(
            child.kind(),
            "namespace_declaration" | "file_scoped_namespace_declaration" | "declaration_list"
        ) {
            collect_top_level(child, out);
        }
    }
}

/// Returns every type declaration in the file, nested ones included.
#[must_use]
pub fn all_types(root: Node<'_>) -> Vec<TypeDecl<'_>> {
    descendants(root)
        .into_iter()
        .filter_map(TypeDecl::from_node)
        .collect()
}

/// Kind of a member declaration inside a type body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    /// Field declaration.
    Field,
    /// Field-like event (`event EventHandler Changed;`).
    EventField,
    /// Event with accessors.
    Event,
    /// Property.
    Property,
    /// Indexer (`this[int i]`).
    Indexer,
    /// Method.
    Method,
    /// Instance or static constructor.
    Constructor,
    /// Finalizer.
    Destructor,
    /// Operator overload.
    Operator,
    /// Conversion operator.
    Conversion,
    /// Nested type.
    NestedType,
}

impl MemberKind {
    /// Classifies a member node.
    #[must_use]
    pub fn of(node: Node<'_>) -> Option<Self> {
        let kind = match node.kind() {
            "field_declaration" => Self::Field,
            "event_field_declaration" => Self::EventField,
            "event_declaration" => Self::Event,
            "property_declaration" => Self::Property,
            "indexer_declaration" => Self::Indexer,
            "method_declaration" => Self::Method,
            "constructor_declaration" => Self::Constructor,
            "destructor_declaration" => Self::Destructor,
            "operator_declaration" => Self::Operator,
            "conversion_operator_declaration" => Self::Conversion,
            other if TypeKind::from_node_kind(other).is_some() => Self::NestedType,
            _ => return None,
        };
        Some(kind)
    }

    /// Lowercase label used in messages.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Field => "field",
            Self::EventField | Self::Event => "event",
            Self::Property => "property",
            Self::Indexer => "indexer",
            Self::Method => "method",
            Self::Constructor => "constructor",
            Self::Destructor => "destructor",
            Self::Operator => "operator",
            Self::Conversion => "conversion operator",
            Self::NestedType => "nested type",
        }
    }
}

/// Display name of a member (`Move`, `this[]`, `operator +`, `_radius`).
#[must_use]
pub fn member_name(node: Node<'_>, src: &str) -> String {
    match MemberKind::of(node) {
        Some(MemberKind::Indexer) => "this[]".to_string(),
        Some(MemberKind::Operator) => {
            let op = node
                .child_by_field_name("operator")
                .map_or("?", |o| node_text(o, src));
            format!("operator {op}")
        }
        Some(MemberKind::Conversion) => {
            let ty = node
                .child_by_field_name("type")
                .map_or("?", |t| node_text(t, src));
            format!("operator {ty}")
        }
        Some(MemberKind::Field | MemberKind::EventField) => declarator_names(node, src).join(", "),
        _ => name_of(node, src).unwrap_or_default().to_string(),
    }
}

/// Identifier nodes a member declares: one per declarator for fields, none
/// for indexers and operators.
#[must_use]
pub fn member_identifiers(node: Node<'_>) -> Vec<Node<'_>> {
    match MemberKind::of(node) {
        Some(MemberKind::Field | MemberKind::EventField) => {
            declarators(node).into_iter().filter_map(name_node).collect()
        }
        Some(MemberKind::Indexer | MemberKind::Operator | MemberKind::Conversion) | None => {
            Vec::new()
        }
        Some(_) => node.child_by_field_name("name").into_iter().collect(),
    }
}

/// Node to report a member at: its first identifier, or the member itself.
#[must_use]
pub fn member_anchor(node: Node<'_>) -> Node<'_> {
    member_identifiers(node).first().copied().unwrap_or(node)
}

/// The `variable_declarator` nodes of a field, event-field or local
/// declaration, excluding declarators nested in initializers.
#[must_use]
pub fn declarators(node: Node<'_>) -> Vec<Node<'_>> {
    let declaration = if node.kind() == "variable_declaration" {
        Some(node)
    } else {
        named_children(node)
            .into_iter()
            .find(|c| c.kind() == "variable_declaration")
    };
    declaration
        .map(|d| {
            named_children(d)
                .into_iter()
                .filter(|c| c.kind() == "variable_declarator")
                .collect()
        })
        .unwrap_or_default()
}

/// Names declared by a field or event-field declaration.
#[must_use]
pub fn declarator_names<'a>(node: Node<'_>, src: &'a str) -> Vec<&'a str> {
    declarators(node)
        .into_iter()
        .filter_map(|d| name_of(d, src))
        .collect()
}

/// Declared parameter names of a method, constructor, indexer or delegate.
#[must_use]
pub fn parameter_names<'a>(node: Node<'_>, src: &'a str) -> Vec<&'a str> {
    let list = node.child_by_field_name("parameters").or_else(|| {
        named_children(node)
            .into_iter()
            .find(|c| matches!(c.kind(), "parameter_list" | "bracketed_parameter_list"))
    });
    let Some(list) = list else {
        return Vec::new();
    };
    named_children(list)
        .into_iter()
        .filter(|p| p.kind() == "parameter")
        .filter_map(|p| name_of(p, src))
        .collect()
}

/// Declared return type of a method or delegate.
#[must_use]
pub fn return_type(node: Node<'_>) -> Option<Node<'_>> {
    node.child_by_field_name("returns")
        .or_else(|| node.child_by_field_name("type"))
}

/// Returns the namespace name node that applies to `node`.
///
/// Block-scoped namespaces are found among the ancestors; otherwise a
/// file-scoped namespace declared in the compilation unit applies.
#[must_use]
pub fn enclosing_namespace_name(node: Node<'_>) -> Option<Node<'_>> {
    let mut current = node.parent();
    let mut root = node;
    while let Some(n) = current {
        if n.kind() == "namespace_declaration" {
            return n.child_by_field_name("name");
        }
        root = n;
        current = n.parent();
    }
    descendants(root)
        .into_iter()
        .find(|n| n.kind() == "file_scoped_namespace_declaration")
        .and_then(|n| n.child_by_field_name("name"))
}

/// Strips namespace qualification and generic arguments from a type name.
///
/// `System.ArgumentException` and `T:System.ArgumentException` both become
/// `ArgumentException`; `Wrapper<int>` becomes `Wrapper`.
#[must_use]
pub fn simple_type_name(name: &str) -> &str {
    let name = name.trim();
    let name = name.split_once(':').map_or(name, |(_, rest)| rest);
    let name = name.split(['<', '{']).next().unwrap_or(name);
    name.rsplit('.').next().unwrap_or(name).trim()
}
