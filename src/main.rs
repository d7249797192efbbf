mod cache;
mod commands;
mod config;
mod convert;
mod dataset;
mod enrich;
mod fetch;
mod subset;
#[cfg(test)]
mod test_support;

use clap::Parser;
use tracing::Level;

use commands::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .init();

    // Load env
    let _ = dotenv::dotenv();

    commands::run(cli.cmd).await
}
