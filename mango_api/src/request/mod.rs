//! Request payloads sent in the `json` form field.

use serde::Serialize;

/// Implemented by every payload the client can send. Ties the payload to
/// the endpoint path it is posted to.
pub trait ApiRequest: Serialize {
    /// Path relative to the API base URL, e.g. `/stats/request`.
    fn path(&self) -> &'static str;
}

mod stats;
pub use self::stats::{StatsField, StatsRequest, StatsResultRequest, STATS_FIELDS};

mod user;
pub use self::user::UserRequest;
