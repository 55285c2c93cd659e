use crate::cli::OutputFormat;
use crate::commands::Result;
use serde::Serialize;
use stage_core::{ConsoleConfig, Destination, DestinationPatch};

mod pretty;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum OutputData {
    Destination(Destination),
    Patch(DestinationPatch),
    Config {
        path: String,
        config: ConsoleConfig,
    },
}

pub fn format_output(data: &OutputData, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(data)?);
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(data)?);
        }
        OutputFormat::Pretty => match data {
            OutputData::Destination(destination) => pretty::destination(destination),
            OutputData::Patch(patch) => pretty::patch(patch),
            OutputData::Config { path, config } => pretty::config(path, config),
        },
    }
    Ok(())
}
