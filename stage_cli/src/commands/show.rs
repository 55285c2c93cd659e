use crate::cli::Cli;
use crate::commands::{api_client, load_config, Result};
use crate::output::{format_output, OutputData};
use stage_core::DestinationApi;
use tracing::debug;

pub async fn run(cli: &Cli, id: &str) -> Result<()> {
    let config = load_config(cli)?;
    let api = api_client(&config)?;
    debug!(api = %api.base_url(), destination = id, "show");

    let destination = api.fetch(id).await?;
    format_output(&OutputData::Destination(destination), &cli.output)
}
