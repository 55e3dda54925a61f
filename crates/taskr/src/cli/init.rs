/*
[INPUT]:  Interactive user input via CLI
[OUTPUT]: Generated YAML configuration file
[POS]:    CLI initialization layer
[UPDATE]: When AppConfig schema changes
*/

use anyhow::{Context, Result, anyhow};
use console::style;
use dialoguer::{Confirm, Input, Select, theme::ColorfulTheme};
use std::path::PathBuf;
use taskr::AppConfig;
use taskr::config::default_config_path;
use taskr_client::ApiFlavor;

pub fn run_init(output: Option<PathBuf>) -> Result<()> {
    let output = match output {
        Some(path) => path,
        None => default_config_path().ok_or_else(|| anyhow!("Could not determine config directory"))?,
    };

    println!("{}", style("Welcome to TaskR setup").bold().cyan());
    println!(
        "{}",
        style("This will guide you through creating a client configuration.").dim()
    );

    let theme = ColorfulTheme::default();
    let mut config = AppConfig::default();

    println!("\n{}", style("--- Server ---").bold());
    config.api.base_url = Input::with_theme(&theme)
        .with_prompt("Server URL")
        .default(config.api.base_url.clone())
        .interact_text()?;

    let flavors = vec![
        "script (tasks.php with an action field)",
        "rest (one script per operation)",
    ];
    let flavor_index = Select::with_theme(&theme)
        .with_prompt("Server layout")
        .items(&flavors)
        .default(0)
        .interact()?;
    config.api.flavor = match flavor_index {
        0 => ApiFlavor::Script,
        _ => ApiFlavor::Rest,
    };

    println!("\n{}", style("--- Behaviour ---").bold());
    config.undo_window_secs = Input::with_theme(&theme)
        .with_prompt("Undo window (seconds)")
        .default(config.undo_window_secs)
        .interact_text()?;
    config.offline.enabled = Confirm::with_theme(&theme)
        .with_prompt("Keep an offline copy of tasks?")
        .default(true)
        .interact()?;

    config.validate()?;
    let yaml = config.to_yaml()?;

    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(&output, yaml)
        .with_context(|| format!("failed to write config to {}", output.display()))?;

    println!("\n{}", style("SUCCESS!").bold().green());
    println!(
        "Configuration written to: {}",
        style(output.display()).cyan()
    );

    Ok(())
}
