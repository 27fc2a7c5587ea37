//! `parley agents` -- list configured agents.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use parley_core::llm::registry::AgentRegistry;
use parley_types::config::AgentsFile;

/// Print the configured agents as a table (or JSON with `--json`).
pub fn list_agents(file: &AgentsFile, registry: &AgentRegistry, json: bool) -> Result<()> {
    if json {
        let entries: Vec<serde_json::Value> = file
            .agents
            .iter()
            .map(|(name, entry)| {
                let engine = registry.get(name);
                serde_json::json!({
                    "name": name,
                    "provider": entry.provider.to_string(),
                    "model": entry.model,
                    "default": file.default_agent.as_deref() == Some(name.as_str()),
                    "max_context_tokens": engine.map(|e| e.capabilities().max_context_tokens),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if file.agents.is_empty() {
        println!();
        println!(
            "  {} No agents configured. Add one to {}",
            style("i").blue().bold(),
            style("config.yaml").yellow()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Agent").fg(Color::White),
        Cell::new("Provider").fg(Color::White),
        Cell::new("Model").fg(Color::White),
        Cell::new("Context").fg(Color::White),
    ]);

    for (name, entry) in &file.agents {
        let is_default = file.default_agent.as_deref() == Some(name.as_str());
        let name_cell = if is_default {
            Cell::new(format!("● {name}")).fg(Color::Green)
        } else {
            Cell::new(format!("  {name}"))
        };

        let context = registry
            .get(name)
            .map(|e| format!("{}K", e.capabilities().max_context_tokens / 1000))
            .unwrap_or_else(|| "-".to_string());

        table.add_row(vec![
            name_cell,
            Cell::new(entry.provider.to_string()),
            Cell::new(&entry.model),
            Cell::new(context),
        ]);
    }

    println!("{table}");
    if file.default_agent.is_some() {
        println!("  {}", style("● default agent").dim());
    }

    Ok(())
}
