use anyhow::{Context, Result};
use clap::Args;
use mango_api::Client;

use crate::output::{
    print_json, print_user_csv, print_user_markdown, print_user_table, OutputFormat,
};

#[derive(Args)]
pub struct UserArgs {
    /// Internal extension, e.g. 101
    pub extension: String,
}

pub async fn run(args: &UserArgs, client: &Client, format: &OutputFormat) -> Result<()> {
    let extension = args.extension.trim();
    let user = client
        .get_user(extension)
        .await
        .with_context(|| format!("failed to look up extension {}", extension))?;

    match format {
        OutputFormat::Table => print_user_table(&user),
        OutputFormat::Json => print_json(&user),
        OutputFormat::Csv => print_user_csv(&user)?,
        OutputFormat::Markdown => print_user_markdown(&user),
    }

    Ok(())
}
