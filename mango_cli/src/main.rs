mod commands;
mod config;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mango_api::Client;

use crate::config::Config;
use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "mango")]
#[command(about = "Query call statistics and users from the Mango Office VPBX API")]
struct Cli {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    output: OutputFormat,

    /// Override the API base URL (also read from MANGO_API_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up a user by extension
    User(commands::user::UserArgs),
    /// Start a statistics export and print its key
    StatsKey(commands::stats::StatsKeyArgs),
    /// Poll an export key once
    StatsResult(commands::stats::StatsResultArgs),
    /// Export call statistics, waiting until the report is ready
    Stats(commands::stats::StatsArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("mango=info".parse()?)
                .add_directive("mango_api=info".parse()?),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let format = cli.output.clone();

    let config = Config::from_env()?.with_base_url_override(cli.base_url.as_deref());
    let client = match &config.base_url {
        Some(url) => Client::with_base_url(url, &config.api_key, &config.api_salt),
        None => Client::new(&config.api_key, &config.api_salt),
    }
    .context("failed to create API client")?;

    match &cli.command {
        Commands::User(args) => commands::user::run(args, &client, &format).await?,
        Commands::StatsKey(args) => commands::stats::run_key(args, &client).await?,
        Commands::StatsResult(args) => commands::stats::run_result(args, client, &format).await?,
        Commands::Stats(args) => commands::stats::run(args, client, &format).await?,
    }

    Ok(())
}
