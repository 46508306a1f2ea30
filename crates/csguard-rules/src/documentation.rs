//! Documentation-completeness analyzer.
//!
//! Public types and members (and every member of an interface) need a `///`
//! block with a non-empty `<summary>`, one `<param>` per parameter,
//! `<returns>` for non-void results and one `<exception>` per exception type
//! the body throws directly. `<inheritdoc/>` satisfies all of it.
//!
//! Missing parts are reported once per member (`missing-documentation`);
//! `<param>` entries naming no parameter, repeated, or out of order are
//! reported separately (`documentation-mismatch`).

use std::sync::LazyLock;

use csguard_core::catalog::{RuleDescriptor, DOCUMENTATION_MISMATCH, MISSING_DOCUMENTATION};
use csguard_core::syntax::{self, MemberKind, TypeDecl, TypeKind};
use csguard_core::{Configuration, FileContext, Rule, RuleError, Severity, Suggestion, Violation};
use regex::Regex;
use tree_sitter::Node;

/// Analyzer name.
pub const NAME: &str = "documentation";

static DESCRIPTORS: [&RuleDescriptor; 2] = [&MISSING_DOCUMENTATION, &DOCUMENTATION_MISMATCH];

struct DocPatterns {
    inheritdoc: Regex,
    summary: Regex,
    param: Regex,
    returns: Regex,
    exception: Regex,
}

impl DocPatterns {
    fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            inheritdoc: Regex::new(r"<inheritdoc\b")?,
            summary: Regex::new(r"(?s)<summary\s*>(.*?)</summary\s*>")?,
            param: Regex::new(r#"<param\s+name\s*=\s*"([^"]*)""#)?,
            returns: Regex::new(r"<returns\b")?,
            exception: Regex::new(r#"<exception\s+cref\s*=\s*"([^"]*)""#)?,
        })
    }
}

static PATTERNS: LazyLock<Result<DocPatterns, regex::Error>> = LazyLock::new(DocPatterns::new);

/// Parsed contents of a `///` block.
#[derive(Debug, Default)]
struct DocBlock {
    present: bool,
    inherit: bool,
    summary: bool,
    params: Vec<String>,
    returns: bool,
    exceptions: Vec<String>,
}

impl DocBlock {
    fn parse(text: &str, patterns: &DocPatterns) -> Self {
        if text.trim().is_empty() {
            return Self::default();
        }
        Self {
            present: true,
            inherit: patterns.inheritdoc.is_match(text),
            summary: patterns
                .summary
                .captures(text)
                .and_then(|c| c.get(1))
                .is_some_and(|m| !m.as_str().trim().is_empty()),
            params: patterns
                .param
                .captures_iter(text)
                .filter_map(|c| c.get(1))
                .map(|m| m.as_str().trim().to_string())
                .collect(),
            returns: patterns.returns.is_match(text),
            exceptions: patterns
                .exception
                .captures_iter(text)
                .filter_map(|c| c.get(1))
                .map(|m| syntax::simple_type_name(m.as_str()).to_string())
                .collect(),
        }
    }
}

/// Checks XML documentation of public API.
#[derive(Debug, Clone)]
pub struct Documentation {
    /// Severity of missing documentation.
    pub severity: Severity,
}

impl Default for Documentation {
    fn default() -> Self {
        Self::new()
    }
}

impl Documentation {
    /// Creates the analyzer with Error severity.
    #[must_use]
    pub fn new() -> Self {
        Self {
            severity: Severity::Error,
        }
    }

    /// Creates the analyzer from the `xmlDocumentation` section.
    #[must_use]
    pub fn from_config(config: &Configuration) -> Self {
        Self {
            severity: config.xml_documentation.enforcement_level,
        }
    }

    /// Sets the severity of missing documentation.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    fn check_declaration(
        &self,
        ctx: &FileContext<'_>,
        patterns: &DocPatterns,
        node: Node<'_>,
        anchor: Node<'_>,
        kind_label: &str,
        name: &str,
    ) -> Vec<Violation> {
        let doc = DocBlock::parse(&doc_comment(ctx.content, node), patterns);
        if doc.inherit {
            return Vec::new();
        }

        let declared = syntax::parameter_names(node, ctx.content);
        let mut missing = Vec::new();
        if !doc.summary {
            missing.push("<summary>".to_string());
        }
        for param in &declared {
            if !doc.params.iter().any(|p| p == param) {
                missing.push(format!("<param name=\"{param}\">"));
            }
        }
        if needs_returns(node, ctx.content) && !doc.returns {
            missing.push("<returns>".to_string());
        }
        for thrown in thrown_exceptions(node, ctx.content) {
            if !doc.exceptions.iter().any(|e| *e == thrown) {
                missing.push(format!("<exception cref=\"{thrown}\">"));
            }
        }

        let mut violations = Vec::new();
        if !missing.is_empty() {
            let detail = if doc.present {
                missing.join(", ")
            } else {
                format!("no documentation comment (needs {})", missing.join(", "))
            };
            violations.push(
                Violation::from_descriptor(
                    &MISSING_DOCUMENTATION,
                    self.severity,
                    ctx.location(anchor),
                    &[kind_label, name, &detail],
                )
                .with_suggestion(Suggestion::new(
                    "Add a '///' block with the missing tags, or '/// <inheritdoc/>'",
                )),
            );
        }

        let mismatches = param_mismatches(&doc.params, &declared);
        if !mismatches.is_empty() {
            violations.push(Violation::from_descriptor(
                &DOCUMENTATION_MISMATCH,
                DOCUMENTATION_MISMATCH.default_severity,
                ctx.location(anchor),
                &[kind_label, name, &mismatches.join("; ")],
            ));
        }
        violations
    }
}

fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Whether a member is part of the documented surface.
fn is_documented_member(member: Node<'_>, owner: &TypeDecl<'_>, src: &str) -> bool {
    if owner.kind == TypeKind::Interface {
        let mods = syntax::modifiers(member, src);
        return !mods.iter().any(|m| *m == "private" || *m == "protected");
    }
    syntax::has_modifier(member, src, "public")
}

/// Collects the `///` lines belonging to a declaration.
///
/// Lines directly above the declaration count, as do lines between its
/// attributes and the declaration itself.
fn doc_comment(src: &str, node: Node<'_>) -> String {
    let lines: Vec<&str> = src.lines().collect();
    let start_row = node.start_position().row;

    let mut above = Vec::new();
    let mut row = start_row;
    while row > 0 {
        row -= 1;
        let Some(text) = lines.get(row).map(|l| l.trim_start()) else {
            break;
        };
        match text.strip_prefix("///") {
            Some(rest) => above.push(rest),
            None => break,
        }
    }
    above.reverse();

    let decl_row = syntax::children(node)
        .into_iter()
        .find(|c| !matches!(c.kind(), "attribute_list" | "comment"))
        .map_or(start_row, |c| c.start_position().row);
    let inner = lines
        .get(start_row..decl_row)
        .unwrap_or_default()
        .iter()
        .filter_map(|l| l.trim_start().strip_prefix("///"));

    above.into_iter().chain(inner).collect::<Vec<_>>().join("\n")
}

fn needs_returns(node: Node<'_>, src: &str) -> bool {
    let returning = matches!(
        node.kind(),
        "method_declaration"
            | "delegate_declaration"
            | "operator_declaration"
            | "conversion_operator_declaration"
    );
    returning
        && syntax::return_type(node).is_some_and(|t| syntax::node_text(t, src).trim() != "void")
}

/// Distinct exception types constructed and thrown directly by a member.
fn thrown_exceptions(node: Node<'_>, src: &str) -> Vec<String> {
    let Some(body) = syntax::body(node) else {
        return Vec::new();
    };
    let mut thrown: Vec<String> = Vec::new();
    for throw in syntax::descendants(body)
        .into_iter()
        .filter(|n| matches!(n.kind(), "throw_statement" | "throw_expression"))
    {
        let created = syntax::named_children(throw)
            .into_iter()
            .find(|c| c.kind() == "object_creation_expression");
        let Some(ty) = created.and_then(|c| c.child_by_field_name("type")) else {
            continue;
        };
        let name = syntax::simple_type_name(syntax::node_text(ty, src)).to_string();
        if !name.is_empty() && !thrown.contains(&name) {
            thrown.push(name);
        }
    }
    thrown
}

fn param_mismatches(documented: &[String], declared: &[&str]) -> Vec<String> {
    let mut problems = Vec::new();
    let mut seen: Vec<&str> = Vec::new();
    for name in documented {
        if !declared.contains(&name.as_str()) {
            problems.push(format!("<param> '{name}' does not match any parameter"));
        } else if seen.contains(&name.as_str()) {
            problems.push(format!("<param> '{name}' is documented more than once"));
        } else {
            seen.push(name);
        }
    }
    let expected: Vec<&str> = declared
        .iter()
        .copied()
        .filter(|d| seen.contains(d))
        .collect();
    if seen != expected {
        problems.push(format!(
            "<param> entries are not in declaration order (expected {})",
            expected.join(", ")
        ));
    }
    problems
}

impl Rule for Documentation {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Requires complete XML documentation on public types and members"
    }

    fn descriptors(&self) -> &'static [&'static RuleDescriptor] {
        &DESCRIPTORS
    }

    fn check(&self, ctx: &FileContext<'_>) -> Result<Vec<Violation>, RuleError> {
        let patterns = PATTERNS
            .as_ref()
            .map_err(|e| RuleError::Evaluation(format!("invalid documentation pattern: {e}")))?;
        let mut violations = Vec::new();

        for decl in syntax::all_types(ctx.root()) {
            ctx.check_deadline()?;
            let name = decl.name(ctx.content);

            if syntax::has_modifier(decl.node, ctx.content, "public") {
                violations.extend(self.check_declaration(
                    ctx,
                    patterns,
                    decl.node,
                    decl.name_node,
                    decl.declaration_kind(ctx.content).label(),
                    name,
                ));
            }

            for member in decl.members() {
                let Some(kind) = MemberKind::of(member) else {
                    continue;
                };
                if kind == MemberKind::NestedType || !is_documented_member(member, &decl, ctx.content) {
                    continue;
                }
                let member_name = syntax::member_name(member, ctx.content);
                violations.extend(self.check_declaration(
                    ctx,
                    patterns,
                    member,
                    syntax::member_anchor(member),
                    &capitalize(kind.label()),
                    &member_name,
                ));
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
        run_rule(&Documentation::new(), "Models/Ball.cs", src)
    }

    const DOCUMENTED: &str = r#"
/// <summary>A bouncing ball.</summary>
public class Ball
{
    /// <summary>Radius in metres.</summary>
    public double Radius { get; set; }

    /// <summary>Moves the ball.</summary>
    /// <param name="dx">Horizontal offset.</param>
    /// <param name="dy">Vertical offset.</param>
    /// <returns>The distance travelled.</returns>
    /// <exception cref="System.ArgumentException">When both offsets are zero.</exception>
    [Obsolete]
    public double Move(double dx, double dy)
    {
        if (dx == 0 && dy == 0) throw new System.ArgumentException("no move");
        return dx + dy;
    }

    private void Hidden() { }
}
"#;

    #[test]
    fn fully_documented_type_is_clean() {
        assert!(check(DOCUMENTED).is_empty());
    }

    #[test]
    fn undocumented_member_lists_every_missing_part() {
        let src = r"
/// <summary>Ball.</summary>
public class Ball
{
    public int Move(int dx, int dy)
    {
        throw new InvalidOperationException();
    }
}
";
        let violations = check(src);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].code, "CSG0301");
        assert_eq!(violations[0].severity, Severity::Error);
        assert_eq!(violations[0].location.line, 5);
        insta::assert_snapshot!(&violations[0].message, @r#"Method 'Move' is missing XML documentation: no documentation comment (needs <summary>, <param name="dx">, <param name="dy">, <returns>, <exception cref="InvalidOperationException">)"#);
    }

    #[test]
    fn void_methods_need_no_returns_and_empty_summary_counts_as_missing() {
        let src = r"
/// <summary>Ball.</summary>
public class Ball
{
    /// <summary>   </summary>
    public void Stop() { }
}
";
        let violations = check(src);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.ends_with("documentation: <summary>"));
    }

    #[test]
    fn inheritdoc_satisfies_everything() {
        let src = r"
/// <inheritdoc/>
public class Ball : IBall
{
    /// <inheritdoc />
    public int Move(int dx) => dx;
}
";
        assert!(check(src).is_empty());
    }

    #[test]
    fn interface_members_are_documented_without_modifiers() {
        let src = r"
/// <summary>Shape.</summary>
public interface IShape
{
    double Area();
}
";
        let violations = check(src);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.starts_with("Method 'Area'"));
    }

    #[test]
    fn non_public_declarations_are_skipped() {
        let src = "internal class Hidden\n{\n    public int X;\n    private int Y;\n}\n";
        let violations = check(src);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.starts_with("Field 'X'"));
    }

    #[test]
    fn unknown_duplicate_and_misordered_params_are_mismatches() {
        let src = r#"
/// <summary>Ball.</summary>
public class Ball
{
    /// <summary>Moves.</summary>
    /// <param name="dy">y</param>
    /// <param name="dx">x</param>
    /// <param name="dx">x again</param>
    /// <param name="dz">z</param>
    public void Move(int dx, int dy) { }
}
"#;
        let violations = check(src);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].code, "CSG0302");
        assert_eq!(violations[0].severity, Severity::Warning);
        insta::assert_snapshot!(&violations[0].message, @"Method 'Move' has mismatched XML documentation: <param> 'dx' is documented more than once; <param> 'dz' does not match any parameter; <param> entries are not in declaration order (expected dx, dy)");
    }

    #[test]
    fn configured_severity_applies() {
        let src = "public class Bare { }\n";
        let violations = run_rule(&Documentation::new().severity(Severity::Warning), "Bare.cs", src);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].severity, Severity::Warning);
        assert!(violations[0].message.starts_with("Class 'Bare'"));
    }
}
