//! Call-detail records decoded from a statistics export.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of a statistics export.
///
/// Timestamps are Unix seconds as sent by the provider. `answer` is zero for
/// calls that were never answered. `finish >= start` is expected but not
/// checked.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Call {
    /// Identifiers of the call recordings attached to this call.
    pub records: Vec<String>,
    pub start: i64,
    pub finish: i64,
    pub answer: i64,
    pub from_extension: String,
    pub from_number: String,
    pub to_extension: String,
    pub to_number: String,
    /// Provider code describing why the call ended.
    pub disconnect_reason: i32,
    pub line_number: String,
    pub location: String,
    pub entry_id: String,
}

impl Call {
    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.start, 0)
    }

    pub fn finish_time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.finish, 0)
    }

    /// `None` for unanswered calls.
    pub fn answer_time(&self) -> Option<DateTime<Utc>> {
        if self.was_answered() {
            DateTime::from_timestamp(self.answer, 0)
        } else {
            None
        }
    }

    pub fn was_answered(&self) -> bool {
        self.answer > 0
    }

    /// Total call length including ringing. Zero if the provider sent a
    /// finish before the start.
    pub fn duration_secs(&self) -> i64 {
        (self.finish - self.start).max(0)
    }

    /// Time spent talking, zero for unanswered calls.
    pub fn talk_secs(&self) -> i64 {
        if self.was_answered() {
            (self.finish - self.answer).max(0)
        } else {
            0
        }
    }
}
