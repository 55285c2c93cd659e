use crate::cli::{Cli, ConfigAction};
use crate::commands::{load_config, CommandError, Result};
use crate::output::{format_output, OutputData};
use owo_colors::OwoColorize;
use stage_core::{ConfigStore, ConsoleConfig};

pub async fn run(cli: &Cli, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => show_config(cli),
        ConfigAction::Path => {
            println!("{}", ConfigStore::new_default().path().display());
            Ok(())
        }
        ConfigAction::Init { force } => init_config(force),
    }
}

fn show_config(cli: &Cli) -> Result<()> {
    let store = ConfigStore::new_default();
    let config = load_config(cli)?;
    format_output(
        &OutputData::Config {
            path: store.path().display().to_string(),
            config,
        },
        &cli.output,
    )
}

fn init_config(force: bool) -> Result<()> {
    let store = ConfigStore::new_default();
    if store.path().exists() && !force {
        return Err(CommandError::InvalidConfig(format!(
            "{} already exists (use --force to overwrite)",
            store.path().display()
        )));
    }
    store.save(&ConsoleConfig::default())?;
    println!(
        "{} Wrote {}",
        "Success!".green().bold(),
        store.path().display().cyan()
    );
    Ok(())
}
