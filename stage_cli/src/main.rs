use clap::Parser;
use owo_colors::OwoColorize;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;
mod console;
mod output;

use cli::{Cli, Commands};
use commands::*;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let default_filter = match cli.verbose {
        0 => "stage_cli=info",
        1 => "stage_cli=debug,stage_core=debug",
        _ => "stage_cli=trace,stage_core=trace",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = match &cli.command {
        Commands::Show { id } => show::run(&cli, id).await,
        Commands::Edit {
            id,
            name,
            description,
            set,
            rename,
            unset,
            prune_blank,
            dry_run,
            no_delay,
        } => {
            let args = edit::EditArgs {
                name: name.clone(),
                description: description.clone(),
                set: set.clone(),
                rename: rename.clone(),
                unset: unset.clone(),
                prune_blank: *prune_blank,
                dry_run: *dry_run,
                no_delay: *no_delay,
            };
            edit::run(&cli, id, args).await
        }
        Commands::Config { action } => config::run(&cli, action.clone()).await,
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        process::exit(1);
    }
}
