//! Pretty formatter for terminal output.

use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, ContentArrangement, Table};
use owo_colors::OwoColorize;
use stage_core::{connector_display_name, ConfigMap, ConsoleConfig, Destination, DestinationPatch};

/// Property keys whose values are masked.
const SECRET_HINTS: &[&str] = &["password", "secret", "token", "credential", "api.key"];

fn is_secret(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    SECRET_HINTS.iter().any(|hint| key.contains(hint))
}

fn property_table(config: &ConfigMap) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Key", "Value"]);

    for (key, value) in config {
        let shown = if is_secret(key) && !value.is_empty() {
            "********".to_string()
        } else {
            value.clone()
        };
        let key = if key.is_empty() {
            "(blank)".to_string()
        } else {
            key.clone()
        };
        table.add_row(vec![key, shown]);
    }
    table
}

pub fn destination(d: &Destination) {
    println!();
    println!("{}  {}", d.name.bold().cyan(), format!("#{}", d.id).dimmed());
    println!(
        "  {} {}",
        "Type:".dimmed(),
        connector_display_name(&d.kind)
    );
    if !d.description.is_empty() {
        println!("  {} {}", "Details:".dimmed(), d.description);
    }
    println!();

    if d.config.is_empty() {
        println!("{}", "No configuration properties.".yellow());
    } else {
        println!("{}", "Configuration properties".bold());
        println!("{}", property_table(&d.config));
    }
    println!();
}

pub fn patch(p: &DestinationPatch) {
    println!();
    println!("{}", "Pending changes (not saved)".bold().yellow());
    println!("  {} {}", "Name:".dimmed(), p.name);
    println!("  {} {}", "Details:".dimmed(), p.description);
    println!();
    println!("{}", property_table(&p.config));
    println!();
}

pub fn config(path: &str, c: &ConsoleConfig) {
    println!();
    println!("{}", "Stage Configuration".bold().cyan());
    println!("{}", "===================".cyan());
    println!();
    println!("Config file: {}", path.dimmed());
    println!();
    println!("  {:<22} {}", "api_url", c.api_url.green());
    println!("  {:<22} {}", "list_path", c.list_path);
    println!("  {:<22} {}", "min_latency_ms", c.min_latency_ms);
    println!("  {:<22} {}", "request_timeout_secs", c.request_timeout_secs);
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_secret() {
        assert!(is_secret("database.password"));
        assert!(is_secret("sasl.API.KEY"));
        assert!(!is_secret("database.hostname"));
    }
}
