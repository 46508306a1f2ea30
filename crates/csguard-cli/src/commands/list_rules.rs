//! List rules command implementation.

use csguard_core::catalog::CATALOG;
use csguard_core::Configuration;
use csguard_rules::all_fix_providers;

/// Runs the list-rules command.
pub fn run() {
    let providers = all_fix_providers(&Configuration::default());

    println!("Available rules:\n");
    println!(
        "{:<9} {:<27} {:<18} {:<8} {:<4} Title",
        "Code", "Name", "Category", "Default", "Fix"
    );
    println!("{}", "-".repeat(90));

    for rule in CATALOG {
        let fixable = providers.iter().any(|p| p.codes().contains(&rule.code));
        println!(
            "{:<9} {:<27} {:<18} {:<8} {:<4} {}",
            rule.code,
            rule.name,
            rule.category.to_string(),
            rule.default_severity.to_string(),
            if fixable { "yes" } else { "" },
            rule.title
        );
    }

    println!("\nUse --rules to run specific rules, e.g.:");
    println!("  csguard check --rules this-qualifier,multiple-classes");
    println!("  csguard fix --rules CSG0401 --dry-run");
}
