use anyhow::Result;
use mango_api::types::{Call, User};
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
    #[value(alias = "md")]
    Markdown,
}

#[derive(Tabled, Serialize)]
struct CallRow {
    #[tabled(rename = "Start")]
    #[serde(rename = "Start")]
    start: String,
    #[tabled(rename = "From")]
    #[serde(rename = "From")]
    from: String,
    #[tabled(rename = "To")]
    #[serde(rename = "To")]
    to: String,
    #[tabled(rename = "Answered")]
    #[serde(rename = "Answered")]
    answered: String,
    #[tabled(rename = "Duration")]
    #[serde(rename = "Duration")]
    duration: String,
    #[tabled(rename = "Talk")]
    #[serde(rename = "Talk")]
    talk: String,
    #[tabled(rename = "Reason")]
    #[serde(rename = "Reason")]
    disconnect_reason: i32,
    #[tabled(rename = "Line")]
    #[serde(rename = "Line")]
    line_number: String,
    #[tabled(rename = "Location")]
    #[serde(rename = "Location")]
    location: String,
    #[tabled(rename = "Records")]
    #[serde(rename = "Records")]
    records: usize,
}

#[derive(Tabled, Serialize)]
struct UserNumberRow {
    #[tabled(rename = "Name")]
    #[serde(rename = "Name")]
    name: String,
    #[tabled(rename = "Extension")]
    #[serde(rename = "Extension")]
    extension: String,
    #[tabled(rename = "Department")]
    #[serde(rename = "Department")]
    department: String,
    #[tabled(rename = "Number")]
    #[serde(rename = "Number")]
    number: String,
    #[tabled(rename = "Protocol")]
    #[serde(rename = "Protocol")]
    protocol: String,
    #[tabled(rename = "Order")]
    #[serde(rename = "Order")]
    order: i32,
    #[tabled(rename = "Wait")]
    #[serde(rename = "Wait")]
    wait_sec: i32,
    #[tabled(rename = "Status")]
    #[serde(rename = "Status")]
    status: String,
}

// -- Row builders --

fn build_call_rows(calls: &[Call]) -> Vec<CallRow> {
    calls
        .iter()
        .map(|c| CallRow {
            start: c
                .start_time()
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_default(),
            from: party(&c.from_extension, &c.from_number),
            to: party(&c.to_extension, &c.to_number),
            answered: if c.was_answered() { "yes" } else { "no" }.to_string(),
            duration: format_duration(c.duration_secs()),
            talk: format_duration(c.talk_secs()),
            disconnect_reason: c.disconnect_reason,
            line_number: c.line_number.clone(),
            location: c.location.clone(),
            records: c.records.len(),
        })
        .collect()
}

/// One row per ringing number; a user with no numbers still gets a row.
fn build_user_rows(user: &User) -> Vec<UserNumberRow> {
    let row = |number: &str, protocol: &str, order: i32, wait_sec: i32, status: &str| {
        UserNumberRow {
            name: user.general.name.clone(),
            extension: user.telephony.extension.clone(),
            department: user.general.department.clone(),
            number: number.to_string(),
            protocol: protocol.to_string(),
            order,
            wait_sec,
            status: status.to_string(),
        }
    };

    let numbers = user.numbers_by_order();
    if numbers.is_empty() {
        return vec![row("", "", 0, 0, "")];
    }
    numbers
        .into_iter()
        .map(|n| row(&n.number, &n.protocol, n.order, n.wait_sec, &n.status))
        .collect()
}

// -- Table output --

pub fn print_calls_table(calls: &[Call]) {
    println!("{}", Table::new(build_call_rows(calls)));
}

pub fn print_user_table(user: &User) {
    println!("{}", Table::new(build_user_rows(user)));
}

// -- Markdown output --

pub fn print_calls_markdown(calls: &[Call]) {
    let mut table = Table::new(build_call_rows(calls));
    table.with(Style::markdown());
    println!("{}", table);
}

pub fn print_user_markdown(user: &User) {
    let mut table = Table::new(build_user_rows(user));
    table.with(Style::markdown());
    println!("{}", table);
}

// -- CSV output --

pub fn print_calls_csv(calls: &[Call]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(std::io::stdout());
    for row in build_call_rows(calls) {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn print_user_csv(user: &User) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(std::io::stdout());
    for row in build_user_rows(user) {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

// -- JSON output --

pub fn print_json<T: serde::Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize to JSON: {}", e),
    }
}

/// Extension when there is one, otherwise the external number.
fn party(extension: &str, number: &str) -> String {
    match (extension.is_empty(), number.is_empty()) {
        (false, false) => format!("{} ({})", extension, number),
        (false, true) => extension.to_string(),
        _ => number.to_string(),
    }
}

fn format_duration(secs: i64) -> String {
    let (h, m, s) = (secs / 3600, secs % 3600 / 60, secs % 60);
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{}:{:02}", m, s)
    }
}
