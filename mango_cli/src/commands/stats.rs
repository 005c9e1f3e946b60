//! The `stats`, `stats-key` and `stats-result` subcommands.
//!
//! `stats` runs the whole export: request a key, then poll the result
//! endpoint until the provider stops answering "not ready".

use std::future::Future;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use mango_api::types::Call;
use mango_api::{Client, Error, NumericPolicy, STATS_RETRY_DELAY};

use crate::output::{
    print_calls_csv, print_calls_markdown, print_calls_table, print_json, OutputFormat,
};

#[derive(Args)]
pub struct StatsKeyArgs {
    /// Start of the range: YYYY-MM-DD (midnight UTC) or RFC 3339
    #[arg(long)]
    pub from: String,

    /// End of the range: YYYY-MM-DD (end of day UTC) or RFC 3339
    #[arg(long)]
    pub to: String,

    /// Correlation id passed through to the provider (generated if omitted)
    #[arg(long)]
    pub request_id: Option<String>,
}

#[derive(Args)]
pub struct StatsResultArgs {
    /// Key returned by `stats-key`
    pub key: String,

    /// Correlation id used in logs
    #[arg(long)]
    pub request_id: Option<String>,

    /// Treat unparseable numbers in the export as 0 instead of failing
    #[arg(long)]
    pub lenient_numbers: bool,
}

#[derive(Args)]
pub struct StatsArgs {
    #[command(flatten)]
    pub range: StatsKeyArgs,

    /// Seconds between result polls
    #[arg(long, default_value_t = STATS_RETRY_DELAY.as_secs())]
    pub poll_interval: u64,

    /// Give up after this many polls
    #[arg(long, default_value = "60")]
    pub max_attempts: u32,

    /// Treat unparseable numbers in the export as 0 instead of failing
    #[arg(long)]
    pub lenient_numbers: bool,
}

pub async fn run_key(args: &StatsKeyArgs, client: &Client) -> Result<()> {
    let (from, to) = parse_range(&args.from, &args.to)?;
    let request_id = request_id_or_default(args.request_id.as_deref());

    let key = client
        .request_stats_key(from, to, &request_id)
        .await
        .context("failed to request statistics key")?;

    eprintln!("Export requested (request id {})", request_id);
    println!("{}", key);
    Ok(())
}

pub async fn run_result(args: &StatsResultArgs, client: Client, format: &OutputFormat) -> Result<()> {
    let request_id = request_id_or_default(args.request_id.as_deref());
    let client = with_policy(client, args.lenient_numbers);

    match client.fetch_stats(&args.key, &request_id).await {
        Ok(calls) => print_calls(&calls, format),
        Err(Error::NotReady) => {
            eprintln!(
                "Export is not ready yet, retry in {} seconds",
                STATS_RETRY_DELAY.as_secs()
            );
            Ok(())
        }
        Err(e) => Err(e).context("failed to fetch statistics"),
    }
}

pub async fn run(args: &StatsArgs, client: Client, format: &OutputFormat) -> Result<()> {
    let (from, to) = parse_range(&args.range.from, &args.range.to)?;
    let request_id = request_id_or_default(args.range.request_id.as_deref());

    let client = with_policy(client, args.lenient_numbers);

    let key = client
        .request_stats_key(from, to, &request_id)
        .await
        .context("failed to request statistics key")?;
    tracing::info!("Export {} requested for {} .. {}", key, from, to);

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] {spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_message("waiting for export...");

    let (client, key, request_id) = (&client, key.as_str(), request_id.as_str());
    let result = poll_until_ready(
        move || client.fetch_stats(key, request_id),
        Duration::from_secs(args.poll_interval),
        args.max_attempts,
        |attempt| pb.set_message(format!("export not ready (attempt {})", attempt)),
    )
    .await;

    match &result {
        Ok(calls) => pb.finish_with_message(format!("{} calls exported", calls.len())),
        Err(_) => pb.abandon_with_message("export failed"),
    }
    let calls = result?;

    print_calls(&calls, format)
}

/// Calls `fetch` until it stops returning [`Error::NotReady`], sleeping
/// `interval` between attempts. `on_wait` sees the attempt number that just
/// came back not ready.
pub async fn poll_until_ready<F, Fut>(
    mut fetch: F,
    interval: Duration,
    max_attempts: u32,
    mut on_wait: impl FnMut(u32),
) -> Result<Vec<Call>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Vec<Call>, Error>>,
{
    for attempt in 1..=max_attempts {
        match fetch().await {
            Ok(calls) => return Ok(calls),
            Err(e) if e.is_retryable() => {
                tracing::debug!("attempt {}: {}", attempt, e);
                on_wait(attempt);
                if attempt < max_attempts {
                    tokio::time::sleep(interval).await;
                }
            }
            Err(e) => return Err(e).context("failed to fetch statistics"),
        }
    }
    bail!("export still not ready after {} attempts", max_attempts)
}

fn print_calls(calls: &[Call], format: &OutputFormat) -> Result<()> {
    eprintln!("{} calls", calls.len());
    match format {
        OutputFormat::Table => print_calls_table(calls),
        OutputFormat::Json => print_json(&calls),
        OutputFormat::Csv => print_calls_csv(calls)?,
        OutputFormat::Markdown => print_calls_markdown(calls),
    }
    Ok(())
}

fn with_policy(client: Client, lenient_numbers: bool) -> Client {
    if lenient_numbers {
        client.with_numeric_policy(NumericPolicy::ZeroFill)
    } else {
        client
    }
}

fn request_id_or_default(request_id: Option<&str>) -> String {
    match request_id {
        Some(id) => id.to_string(),
        None => format!("mango-cli-{}", Utc::now().timestamp_millis()),
    }
}

fn parse_range(from: &str, to: &str) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let from = parse_date(from, false)?;
    let to = parse_date(to, true)?;
    if from > to {
        bail!("--from ({}) is after --to ({})", from, to);
    }
    Ok((from, to))
}

/// Accepts RFC 3339 timestamps or plain dates. A plain date means midnight
/// UTC, or the last second of the day when `end_of_day` is set.
pub fn parse_date(input: &str, end_of_day: bool) -> Result<DateTime<Utc>> {
    let trimmed = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").with_context(|| {
        format!(
            "invalid date '{}'. Expected YYYY-MM-DD (e.g., 2024-06-01) or RFC 3339",
            trimmed
        )
    })?;
    let time = if end_of_day {
        date.and_hms_opt(23, 59, 59)
    } else {
        date.and_hms_opt(0, 0, 0)
    };
    match time {
        Some(t) => Ok(t.and_utc()),
        None => bail!("invalid date '{}'", trimmed),
    }
}
