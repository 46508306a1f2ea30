//! Region-structure analyzer.
//!
//! Two checks share one region scan per file:
//!
//! - `method-region` (CSG0201): every method with a body sits directly in a
//!   region named after it (`methodRegionNameFormat`).
//! - `class-regions` (CSG0202): every class body contains the required
//!   regions at its top level, and members inside kind-named regions
//!   (`Properties`, `Construction`, `Methods`, ...) have the matching kind.

use csguard_core::catalog::{RuleDescriptor, CLASS_REGIONS, METHOD_REGION};
use csguard_core::syntax::{self, MemberKind, TypeDecl, TypeKind};
use csguard_core::{Configuration, FileContext, Rule, RuleError, Severity, Suggestion, Violation};
use tracing::debug;

use crate::regions::{self, Region};

/// Analyzer name.
pub const NAME: &str = "region-structure";

static DESCRIPTORS: [&RuleDescriptor; 2] = [&METHOD_REGION, &CLASS_REGIONS];

/// Checks method and class region layout.
#[derive(Debug, Clone)]
pub struct RegionStructure {
    /// Run the per-method check.
    pub check_methods: bool,
    /// Severity of method findings.
    pub method_severity: Severity,
    /// Region name format for methods.
    pub method_region_name_format: String,
    /// Run the per-class check.
    pub check_classes: bool,
    /// Severity of class findings.
    pub class_severity: Severity,
    /// Regions every class body must contain.
    pub required_class_regions: Vec<String>,
}

impl Default for RegionStructure {
    fn default() -> Self {
        Self::from_config(&Configuration::default())
    }
}

impl RegionStructure {
    /// Creates the analyzer with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the analyzer from the `methodRegions` and `classRegions`
    /// sections.
    #[must_use]
    pub fn from_config(config: &Configuration) -> Self {
        Self {
            check_methods: config.method_regions.enabled,
            method_severity: config.method_regions.enforcement_level,
            method_region_name_format: config.method_regions.method_region_name_format.clone(),
            check_classes: config.class_regions.enabled,
            class_severity: config.class_regions.enforcement_level,
            required_class_regions: config.class_regions.required_class_regions.clone(),
        }
    }

    /// Sets the method region name format.
    #[must_use]
    pub fn method_region_name_format(mut self, format: impl Into<String>) -> Self {
        self.method_region_name_format = format.into();
        self
    }

    /// Sets the required class regions.
    #[must_use]
    pub fn required_class_regions<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_class_regions = names.into_iter().map(Into::into).collect();
        self
    }

    fn expected_region(&self, method: &str) -> String {
        self.method_region_name_format
            .replace("{MethodName}", method)
            .replace("{0}", method)
    }

    fn check_method(
        &self,
        ctx: &FileContext<'_>,
        regions: &[Region],
        method: tree_sitter::Node<'_>,
    ) -> Option<Violation> {
        let name_node = syntax::name_node(method)?;
        let name = ctx.text(name_node);
        let expected = self.expected_region(name);
        let problem = match regions::innermost(regions, method) {
            Some(region) if region.name == expected => {
                let crossing = regions::first_crossing(regions, method)?;
                format!("region '{}' crosses the method boundary", crossing.name)
            }
            Some(region) => format!("innermost region is '{}'", region.name),
            None => "method is not inside any region".to_string(),
        };
        Some(
            Violation::from_descriptor(
                &METHOD_REGION,
                self.method_severity,
                ctx.location(name_node),
                &[name, &expected, &problem],
            )
            .with_suggestion(Suggestion::new(format!(
                "Wrap the method in '#region {expected}' ... '#endregion'"
            ))),
        )
    }

    fn check_class(
        &self,
        ctx: &FileContext<'_>,
        regions: &[Region],
        class: &TypeDecl<'_>,
    ) -> Option<Violation> {
        let body = syntax::body(class.node)?;
        let members: Vec<_> = class
            .members()
            .into_iter()
            .filter(|m| MemberKind::of(*m) != Some(MemberKind::NestedType))
            .collect();
        if members.is_empty() {
            return None;
        }

        let top = regions::top_level_within(regions, body);
        let mut problems = Vec::new();

        for required in &self.required_class_regions {
            if !top.iter().any(|r| &r.name == required) {
                problems.push(format!("missing region '{required}'"));
            }
        }

        for member in members {
            let Some(kind) = MemberKind::of(member) else {
                continue;
            };
            let member_name = syntax::member_name(member, ctx.content);
            match top.iter().find(|r| r.contains(member)) {
                None => problems.push(format!(
                    "{} '{member_name}' is outside any region",
                    kind.label()
                )),
                Some(region) => {
                    if let Some(accepted) = accepted_kinds(&region.name) {
                        if !accepted.contains(&kind) {
                            problems.push(format!(
                                "{} '{member_name}' does not belong in region '{}'",
                                kind.label(),
                                region.name
                            ));
                        }
                    }
                }
            }
        }

        if problems.is_empty() {
            return None;
        }
        let name = class.name(ctx.content);
        Some(
            Violation::from_descriptor(
                &CLASS_REGIONS,
                self.class_severity,
                ctx.location(class.name_node),
                &[name, &problems.join("; ")],
            )
            .with_suggestion(Suggestion::new(format!(
                "Group members into the regions {}",
                self.required_class_regions
                    .iter()
                    .map(|r| format!("'{r}'"))
                    .collect::<Vec<_>>()
                    .join(", ")
            ))),
        )
    }
}

/// Member kinds a kind-named region may hold; `None` accepts anything.
fn accepted_kinds(region: &str) -> Option<&'static [MemberKind]> {
    let kinds: &'static [MemberKind] = match region.to_ascii_lowercase().as_str() {
        "properties" => &[MemberKind::Property, MemberKind::Indexer],
        "construction" | "constructors" => &[MemberKind::Constructor, MemberKind::Destructor],
        "methods" => &[MemberKind::Method, MemberKind::Operator, MemberKind::Conversion],
        "fields" => &[MemberKind::Field],
        "events" => &[MemberKind::Event, MemberKind::EventField],
        _ => return None,
    };
    Some(kinds)
}

impl Rule for RegionStructure {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Requires per-method regions and the configured class region layout"
    }

    fn descriptors(&self) -> &'static [&'static RuleDescriptor] {
        &DESCRIPTORS
    }

    fn check(&self, ctx: &FileContext<'_>) -> Result<Vec<Violation>, RuleError> {
        let regions = regions::scan(ctx.root(), ctx.content);
        debug!(
            "{}: {} regions",
            ctx.relative_path.display(),
            regions.len()
        );
        let mut violations = Vec::new();

        for decl in syntax::all_types(ctx.root()) {
            ctx.check_deadline()?;
            if !decl.kind.has_instance_context() {
                continue;
            }
            if self.check_methods {
                for member in decl.members() {
                    if member.kind() != "method_declaration" || syntax::body(member).is_none() {
                        continue;
                    }
                    violations.extend(self.check_method(ctx, &regions, member));
                }
            }
            if self.check_classes && decl.kind == TypeKind::Class {
                violations.extend(self.check_class(ctx, &regions, &decl));
            }
        }

        Ok(violations)
    }
}
