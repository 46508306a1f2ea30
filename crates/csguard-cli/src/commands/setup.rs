//! Analyzer assembly shared by `check` and `fix`.

use anyhow::{Context, Result};
use csguard_core::catalog::{Category, CATALOG};
use csguard_core::{Analyzer, Configuration, RuleConfig};
use csguard_rules::{all_fix_providers, project_rules_from_config, Preset};

use crate::config_resolver;
use crate::ProjectArgs;

/// Loads the configuration and applies the `--rules` filter.
pub fn load_config(project: &ProjectArgs) -> Configuration {
    let mut config =
        config_resolver::resolve(&project.project_path, project.config_path.as_deref()).load();
    if let Some(filter) = &project.rules {
        restrict_rules(&mut config, filter);
    }
    config
}

/// Disables every non-infrastructure rule not named in `filter`.
fn restrict_rules(config: &mut Configuration, filter: &str) {
    let keys: Vec<&str> = filter
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .collect();
    for key in &keys {
        if !CATALOG.iter().any(|d| d.matches(key)) {
            tracing::warn!("Unknown rule: {key}");
        }
    }
    for descriptor in CATALOG {
        if descriptor.category == Category::Infrastructure
            || keys.iter().any(|k| descriptor.matches(k))
        {
            continue;
        }
        config.rules.retain(|key, _| !descriptor.matches(key));
        config.rules.insert(
            descriptor.code.to_string(),
            RuleConfig {
                enabled: Some(false),
                severity: None,
            },
        );
    }
}

/// Builds an analyzer with every configured rule and fix provider.
pub fn build_analyzer(
    project: &ProjectArgs,
    config: Configuration,
    enhanced: bool,
) -> Result<Analyzer> {
    let mut builder = Analyzer::builder()
        .root(&project.project_path)
        .config(config.clone())
        .enforce_enhanced_standards(enhanced)
        .excludes(project.exclude.iter().cloned());
    for rule in Preset::for_invocation(enhanced).rules(&config) {
        builder = builder.rule_box(rule);
    }
    for rule in project_rules_from_config(&config) {
        builder = builder.project_rule_box(rule);
    }
    for provider in all_fix_providers(&config) {
        builder = builder.fix_provider_box(provider);
    }
    builder.build().context("Failed to build analyzer")
}
