use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::ApiRequest;

/// Columns of a statistics export, in the order the provider writes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsField {
    Records,
    Start,
    Finish,
    Answer,
    FromExtension,
    FromNumber,
    ToExtension,
    ToNumber,
    DisconnectReason,
    LineNumber,
    Location,
    EntryId,
}

impl StatsField {
    /// Every column, in wire order. A field's position here is its column
    /// index in the returned CSV.
    pub const ALL: [StatsField; 12] = [
        Self::Records,
        Self::Start,
        Self::Finish,
        Self::Answer,
        Self::FromExtension,
        Self::FromNumber,
        Self::ToExtension,
        Self::ToNumber,
        Self::DisconnectReason,
        Self::LineNumber,
        Self::Location,
        Self::EntryId,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Records => "records",
            Self::Start => "start",
            Self::Finish => "finish",
            Self::Answer => "answer",
            Self::FromExtension => "from_extension",
            Self::FromNumber => "from_number",
            Self::ToExtension => "to_extension",
            Self::ToNumber => "to_number",
            Self::DisconnectReason => "disconnect_reason",
            Self::LineNumber => "line_number",
            Self::Location => "location",
            Self::EntryId => "entry_id",
        }
    }

    /// Column index in a result row.
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for StatsField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `fields` value sent with every export request.
pub const STATS_FIELDS: &str = "records,start,finish,answer,from_extension,from_number,to_extension,to_number,disconnect_reason,line_number,location,entry_id";

/// Starts a statistics export for a date range.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct StatsRequest {
    pub date_from: i64,
    pub date_to: i64,
    pub fields: String,
    pub request_id: String,
}

impl StatsRequest {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>, request_id: &str) -> Self {
        Self {
            date_from: from.timestamp(),
            date_to: to.timestamp(),
            fields: STATS_FIELDS.to_string(),
            request_id: request_id.to_string(),
        }
    }
}

impl ApiRequest for StatsRequest {
    fn path(&self) -> &'static str {
        "/stats/request"
    }
}

/// Polls for the result of an export started with [`StatsRequest`].
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct StatsResultRequest {
    pub key: String,
}

impl StatsResultRequest {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
        }
    }
}

impl ApiRequest for StatsResultRequest {
    fn path(&self) -> &'static str {
        "/stats/result"
    }
}
