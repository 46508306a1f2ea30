//! Self-qualifier analyzer.
//!
//! Inside instance members of classes, structs and records, references to
//! the type's own instance properties, methods and fields must be written
//! `this.Member`. Names shadowed by a parameter or local in scope at the
//! reference are left alone, as are declarations, type positions,
//! `nameof`/`typeof` arguments, already-qualified accesses and the member
//! names set by object, `with` and anonymous-object initializers.

use std::collections::{HashMap, HashSet};

use csguard_core::catalog::{RuleDescriptor, THIS_QUALIFIER};
use csguard_core::syntax::{self, MemberKind, TypeDecl, TypeKind};
use csguard_core::{Configuration, FileContext, Rule, RuleError, Severity, Suggestion, Violation};
use tree_sitter::Node;

/// Analyzer name.
pub const NAME: &str = "this-qualifier";

static DESCRIPTORS: [&RuleDescriptor; 1] = [&THIS_QUALIFIER];

/// Kind of instance member a reference resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberCategory {
    /// Property.
    Property,
    /// Method.
    Method,
    /// Field or event.
    Field,
}

impl MemberCategory {
    /// Lowercase label used in messages.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Property => "property",
            Self::Method => "method",
            Self::Field => "field",
        }
    }
}

/// Parent kinds whose identifier children are type names, not values.
const TYPE_CONTEXTS: &[&str] = &[
    "qualified_name",
    "alias_qualified_name",
    "type_argument_list",
    "array_type",
    "nullable_type",
    "pointer_type",
    "ref_type",
    "base_list",
    "type_parameter_constraint",
    "type_constraint",
    "type_parameter",
    "type_pattern",
    "tuple_element",
    "typeof_expression",
    "default_expression",
    "sizeof_expression",
];

/// Node kinds whose subtree never holds instance references.
const OPAQUE_ANCESTORS: &[&str] = &["attribute_list", "typeof_expression"];

/// Requires `this.` on instance member references.
#[derive(Debug, Clone)]
pub struct ThisQualifier {
    /// Check instance properties.
    pub properties: bool,
    /// Check instance methods.
    pub methods: bool,
    /// Check instance fields and events.
    pub fields: bool,
    /// Severity of violations.
    pub severity: Severity,
}

impl Default for ThisQualifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ThisQualifier {
    /// Creates the analyzer checking every member category at Error.
    #[must_use]
    pub fn new() -> Self {
        Self {
            properties: true,
            methods: true,
            fields: true,
            severity: Severity::Error,
        }
    }

    /// Creates the analyzer from the `thisQualifier` section.
    #[must_use]
    pub fn from_config(config: &Configuration) -> Self {
        let section = &config.this_qualifier;
        Self {
            properties: section.properties,
            methods: section.methods,
            fields: section.fields,
            severity: section.severity(),
        }
    }

    /// Sets which member categories are checked.
    #[must_use]
    pub fn scope(mut self, properties: bool, methods: bool, fields: bool) -> Self {
        self.properties = properties;
        self.methods = methods;
        self.fields = fields;
        self
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    fn in_scope(&self, category: MemberCategory) -> bool {
        match category {
            MemberCategory::Property => self.properties,
            MemberCategory::Method => self.methods,
            MemberCategory::Field => self.fields,
        }
    }

    /// Instance members declared directly in the type, by name.
    ///
    /// Names that also have a static declaration are left out.
    fn instance_members(&self, decl: &TypeDecl<'_>, src: &str) -> HashMap<String, MemberCategory> {
        let mut instance = HashMap::new();
        let mut statics = HashSet::new();

        if decl.kind == TypeKind::Record {
            for param in syntax::parameter_names(decl.node, src) {
                instance.insert(param.to_string(), MemberCategory::Property);
            }
        }

        for member in decl.members() {
            let category = match MemberKind::of(member) {
                Some(MemberKind::Property) => MemberCategory::Property,
                Some(MemberKind::Method) => MemberCategory::Method,
                Some(MemberKind::Field | MemberKind::EventField | MemberKind::Event) => {
                    MemberCategory::Field
                }
                _ => continue,
            };
            let is_static = syntax::has_modifier(member, src, "static")
                || syntax::has_modifier(member, src, "const");
            for id in syntax::member_identifiers(member) {
                let name = syntax::node_text(id, src).to_string();
                if is_static {
                    statics.insert(name);
                } else {
                    instance.insert(name, category);
                }
            }
        }

        instance.retain(|name, category| !statics.contains(name) && self.in_scope(*category));
        instance
    }
}

/// Code regions of a member that run with `this` available.
fn instance_bodies<'t>(member: Node<'t>, src: &str) -> Vec<Node<'t>> {
    let Some(kind) = MemberKind::of(member) else {
        return Vec::new();
    };
    if syntax::has_modifier(member, src, "static") {
        return Vec::new();
    }
    match kind {
        MemberKind::Method | MemberKind::Constructor | MemberKind::Destructor => {
            syntax::body(member).into_iter().collect()
        }
        MemberKind::Property | MemberKind::Indexer | MemberKind::Event => syntax::named_children(member)
            .into_iter()
            .filter(|c| matches!(c.kind(), "accessor_list" | "arrow_expression_clause"))
            .collect(),
        _ => Vec::new(),
    }
}

/// Kinds that bound the visibility of a parameter.
const FUNCTION_SCOPES: &[&str] = &[
    "lambda_expression",
    "anonymous_method_expression",
    "local_function_statement",
];

/// Kinds that bound the visibility of a local.
const LOCAL_SCOPES: &[&str] = &[
    "block",
    "switch_body",
    "for_statement",
    "foreach_statement",
    "using_statement",
    "fixed_statement",
    "catch_clause",
    "lambda_expression",
    "anonymous_method_expression",
    "arrow_expression_clause",
];

/// A parameter or local visible inside `scope` from byte `from` on.
#[derive(Debug, Clone, Copy)]
struct Binding<'a, 't> {
    name: &'a str,
    scope: Node<'t>,
    from: usize,
}

impl Binding<'_, '_> {
    fn covers(&self, id: Node<'_>) -> bool {
        self.scope.start_byte() <= id.start_byte()
            && id.end_byte() <= self.scope.end_byte()
            && self.from <= id.start_byte()
    }
}

/// Nearest ancestor of `node` with one of `kinds`, stopping at `member`.
fn enclosing_scope<'t>(node: Node<'t>, member: Node<'t>, kinds: &[&str]) -> Node<'t> {
    let mut current = node.parent();
    while let Some(n) = current {
        if n == member || kinds.contains(&n.kind()) {
            return n;
        }
        current = n.parent();
    }
    member
}

/// Parameters and locals declared in the member, each with its scope.
fn bindings<'a, 't>(member: Node<'t>, src: &'a str) -> Vec<Binding<'a, 't>> {
    let mut out = Vec::new();
    for node in syntax::descendants(member) {
        match node.kind() {
            "parameter" => {
                if let Some(name) = syntax::name_of(node, src) {
                    let scope = enclosing_scope(node, member, FUNCTION_SCOPES);
                    out.push(Binding { name, scope, from: 0 });
                }
            }
            "implicit_parameter" => {
                let scope = enclosing_scope(node, member, FUNCTION_SCOPES);
                out.push(Binding {
                    name: syntax::node_text(node, src).trim(),
                    scope,
                    from: 0,
                });
            }
            "lambda_expression" => {
                if let Some(param) = node.child_by_field_name("parameters") {
                    if param.kind() == "identifier" {
                        out.push(Binding {
                            name: syntax::node_text(param, src),
                            scope: node,
                            from: 0,
                        });
                    }
                }
            }
            "local_function_statement" => {
                if let Some(name) = syntax::name_of(node, src) {
                    let scope = enclosing_scope(node, member, LOCAL_SCOPES);
                    out.push(Binding { name, scope, from: 0 });
                }
            }
            "catch_declaration" => {
                if let Some(name) = syntax::name_of(node, src) {
                    let scope = enclosing_scope(node, member, &["catch_clause"]);
                    out.push(Binding { name, scope, from: node.start_byte() });
                }
            }
            "foreach_statement" => {
                if let Some(left) = node.child_by_field_name("left") {
                    if left.kind() == "identifier" {
                        out.push(Binding {
                            name: syntax::node_text(left, src),
                            scope: node,
                            from: left.start_byte(),
                        });
                    }
                }
            }
            "variable_declarator" => {
                if let Some(name) = syntax::name_of(node, src) {
                    let scope = enclosing_scope(node, member, LOCAL_SCOPES);
                    out.push(Binding { name, scope, from: node.start_byte() });
                }
            }
            "single_variable_designation" => {
                let scope = enclosing_scope(node, member, LOCAL_SCOPES);
                out.push(Binding {
                    name: syntax::node_text(node, src).trim(),
                    scope,
                    from: node.start_byte(),
                });
            }
            _ => {}
        }
    }
    out
}

fn is_field_child(parent: Node<'_>, field: &str, node: Node<'_>) -> bool {
    parent.child_by_field_name(field) == Some(node)
}

/// Whether an identifier names the member being set by an initializer:
/// `new Ball { Radius = 1 }`, `p with { X = 1 }` or `new { Radius = 1 }`.
pub(crate) fn is_initializer_target(id: Node<'_>) -> bool {
    let Some(parent) = id.parent() else {
        return false;
    };
    match parent.kind() {
        "assignment_expression" => {
            is_field_child(parent, "left", id)
                && parent
                    .parent()
                    .is_some_and(|gp| gp.kind().contains("initializer"))
        }
        "with_initializer" => parent.named_child(0) == Some(id),
        "anonymous_object_creation_expression" => {
            id.next_sibling().is_some_and(|n| n.kind() == "=")
        }
        _ => false,
    }
}

/// Whether an identifier is a value reference that could need `this.`.
fn is_candidate_reference(id: Node<'_>, boundary: Node<'_>, src: &str) -> bool {
    let Some(parent) = id.parent() else {
        return false;
    };

    // declarations and qualified accesses (`x.Name`, `?.Name`, `Name:`)
    if is_field_child(parent, "name", id) {
        return false;
    }
    if is_field_child(parent, "type", id) || is_field_child(parent, "returns", id) {
        return false;
    }
    if parent.kind() == "generic_name" {
        let invoked = parent
            .parent()
            .is_some_and(|gp| gp.kind() == "invocation_expression" && is_field_child(gp, "function", parent));
        if !invoked {
            return false;
        }
    }
    if TYPE_CONTEXTS.contains(&parent.kind()) {
        return false;
    }
    if matches!(parent.kind(), "labeled_statement" | "goto_statement") {
        return false;
    }
    if is_initializer_target(id) {
        return false;
    }

    let mut current = Some(parent);
    while let Some(node) = current {
        if node == boundary {
            break;
        }
        if OPAQUE_ANCESTORS.contains(&node.kind()) {
            return false;
        }
        if node.kind() == "invocation_expression" {
            let is_nameof = node
                .child_by_field_name("function")
                .is_some_and(|f| syntax::node_text(f, src).trim() == "nameof");
            if is_nameof {
                return false;
            }
        }
        current = node.parent();
    }
    true
}

impl Rule for ThisQualifier {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Requires explicit 'this.' on instance member references"
    }

    fn descriptors(&self) -> &'static [&'static RuleDescriptor] {
        &DESCRIPTORS
    }

    fn check(&self, ctx: &FileContext<'_>) -> Result<Vec<Violation>, RuleError> {
        let src = ctx.content;
        let mut violations = Vec::new();

        for decl in syntax::all_types(ctx.root()) {
            if !decl.kind.has_instance_context() {
                continue;
            }
            let members = self.instance_members(&decl, src);
            if members.is_empty() {
                continue;
            }

            for member in decl.members() {
                ctx.check_deadline()?;
                let bodies = instance_bodies(member, src);
                if bodies.is_empty() {
                    continue;
                }
                let locals = bindings(member, src);

                for body in bodies {
                    for id in syntax::descendants(body)
                        .into_iter()
                        .filter(|n| n.kind() == "identifier")
                    {
                        let name = syntax::node_text(id, src);
                        let Some(category) = members.get(name) else {
                            continue;
                        };
                        let shadowed = locals.iter().any(|b| b.name == name && b.covers(id));
                        if shadowed || !is_candidate_reference(id, member, src) {
                            continue;
                        }
                        violations.push(
                            Violation::from_descriptor(
                                &THIS_QUALIFIER,
                                self.severity,
                                ctx.location(id),
                                &[category.label(), name],
                            )
                            .with_suggestion(Suggestion::new(format!("Use 'this.{name}'"))),
                        );
                    }
                }
            }
        }

        Ok(violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::run_rule;

    fn check(src: &str) -> Vec<Violation> {
        run_rule(&ThisQualifier::new(), "Models/Ball.cs", src)
    }

    fn flagged(violations: &[Violation]) -> Vec<(usize, String)> {
        violations
            .iter()
            .map(|v| {
                let name = v
                    .message
                    .split('\'')
                    .nth(1)
                    .unwrap_or_default()
                    .to_string();
                (v.location.line, name)
            })
            .collect()
    }

    #[test]
    fn unqualified_property_is_reported_once() {
        let src = r"
public class Ball
{
    public double Radius { get; set; }

    public double Diameter()
    {
        return Radius * 2;
    }
}
";
        let violations = check(src);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].severity, Severity::Error);
        assert_eq!(violations[0].location.line, 8);
        assert_eq!(violations[0].location.column, 16);
        insta::assert_snapshot!(&violations[0].message, @"Instance property 'Radius' must be accessed through 'this.'");
    }

    #[test]
    fn qualified_and_shadowed_references_are_clean() {
        let src = r"
public class Ball
{
    private double radius;
    public double Radius { get; set; }

    public Ball(double radius)
    {
        this.radius = radius;
        this.Radius = radius;
        var other = new Ball(1) { Radius = 2 };
        var n = nameof(Radius);
        other.Radius = this.Radius;
    }
}
";
        assert!(check(src).is_empty());
    }

    #[test]
    fn methods_and_fields_are_reported() {
        let src = r"
public class Counter
{
    private int count;
    private static int total;

    public void Increment()
    {
        count++;
        total++;
        Reset();
    }

    public void Reset() { this.count = 0; }

    public static void ResetAll() { total = 0; }
}
";
        assert_eq!(
            flagged(&check(src)),
            vec![(9, "count".to_string()), (11, "Reset".to_string())]
        );
    }

    #[test]
    fn scope_flags_limit_categories() {
        let src = r"
public class Counter
{
    private int count;
    public int Value => count;
    public void Bump() { Bump(); }
}
";
        let rule = ThisQualifier::new().scope(true, false, true);
        let violations = run_rule(&rule, "Counter.cs", src);
        assert_eq!(flagged(&violations), vec![(5, "count".to_string())]);
    }

    #[test]
    fn locals_lambdas_and_types_are_not_members() {
        let src = r"
public class Shape
{
    public int Size { get; set; }
    public int Area { get; set; }

    public void Run(System.Collections.Generic.List<int> items)
    {
        foreach (var Size in items) { }
        items.ForEach(Area => System.Console.WriteLine(Area));
    }
}
";
        assert!(check(src).is_empty());
    }

    #[test]
    fn positional_record_parameters_are_properties() {
        let src = r"
public record Point(int X, int Y)
{
    public int Sum() => X + this.Y;
}
";
        assert_eq!(flagged(&check(src)), vec![(4, "X".to_string())]);
    }

    #[test]
    fn with_and_anonymous_member_names_are_not_references() {
        let src = r"
public record Point(int X, int Y)
{
    public Point Shift() => this with { X = Y };
    public object Shape() => new { X = 1, this.Y };
}
";
        assert_eq!(flagged(&check(src)), vec![(4, "Y".to_string())]);
    }

    #[test]
    fn locals_only_shadow_inside_their_scope() {
        let src = r"
public class Ball
{
    public double Radius { get; set; }

    public double Grow(bool twice)
    {
        var before = Radius;
        if (twice)
        {
            var Radius = 2.0;
            return Radius;
        }
        System.Func<double, double> f = Radius => Radius * 2;
        return f(Radius) + before;
    }
}
";
        assert_eq!(
            flagged(&check(src)),
            vec![(8, "Radius".to_string()), (15, "Radius".to_string())]
        );
    }

    #[test]
    fn reference_before_a_later_local_is_reported() {
        let src = r"
public class Counter
{
    private int count;

    public void Run()
    {
        System.Console.WriteLine(count);
        foreach (var count in new[] { 1, 2 }) { System.Console.WriteLine(count); }
    }
}
";
        assert_eq!(flagged(&check(src)), vec![(8, "count".to_string())]);
    }

    #[test]
    fn interfaces_and_static_members_are_ignored() {
        let src = r"
public interface IShape { int Size { get; } int Twice() => Size * 2; }
public static class Util
{
    public static int Zero;
    public static int Get() { return Zero; }
}
";
        assert!(check(src).is_empty());
    }

    #[test]
    fn warning_severity_from_config() {
        let mut config = Configuration::default();
        config.this_qualifier.enforcement_level = Severity::Warning;
        let src = "public class A { int x; void M() { x = 1; } }";
        let violations = run_rule(&ThisQualifier::from_config(&config), "A.cs", src);
        assert_eq!(violations[0].severity, Severity::Warning);

        config.this_qualifier.mandatory = true;
        let violations = run_rule(&ThisQualifier::from_config(&config), "A.cs", src);
        assert_eq!(violations[0].severity, Severity::Error);
    }
}
