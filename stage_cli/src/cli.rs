use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "stage")]
#[command(about = "Stage - inspect and edit destination connectors")]
#[command(version)]
#[command(after_help = "\x1b[1;36mQuick Start:\x1b[0m
  stage show 12                           Show a destination and its properties
  stage edit 12 --name \"Orders DB\"        Rename a destination
  stage edit 12 --set port=5433           Change or add a property
  stage edit 12 --unset snapshot.mode     Remove a property
  stage config show                       Show the effective configuration")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Platform API base URL (overrides the config file)
    #[arg(long, global = true, env = "STAGE_API_URL")]
    pub api_url: Option<String>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Pretty)]
    pub output: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show a destination with its configuration properties
    Show {
        /// Destination id
        id: String,
    },

    /// Edit a destination and save it
    ///
    /// Edits are applied in order: renames, then unsets, then sets.
    #[command(after_help = "\x1b[1;33mExamples:\x1b[0m
  stage edit 12 --name \"Orders DB Renamed\"
  stage edit 12 --set host=db.local --set port=5432
  stage edit 12 --rename hostname=host --unset legacy.flag
  stage edit 12 --set port=5433 --dry-run")]
    Edit {
        /// Destination id
        id: String,

        /// New destination name
        #[arg(long)]
        name: Option<String>,

        /// New description
        #[arg(long)]
        description: Option<String>,

        /// Set a property (KEY=VALUE); adds it when missing
        #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_pair)]
        set: Vec<(String, String)>,

        /// Rename a property key (OLD=NEW)
        #[arg(long = "rename", value_name = "OLD=NEW", value_parser = parse_pair)]
        rename: Vec<(String, String)>,

        /// Remove a property by key
        #[arg(long = "unset", value_name = "KEY")]
        unset: Vec<String>,

        /// Drop rows whose key is blank before saving
        #[arg(long)]
        prune_blank: bool,

        /// Print the request that would be sent, without saving
        #[arg(long)]
        dry_run: bool,

        /// Skip the minimum busy delay on save
        #[arg(long)]
        no_delay: bool,
    },

    /// Manage console configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Print the config file path
    Path,
    /// Write a config file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable formatted output
    Pretty,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
}

fn parse_pair(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))?;
    if key.is_empty() {
        return Err(format!("key must not be empty in '{s}'"));
    }
    Ok((key.to_string(), value.to_string()))
}
