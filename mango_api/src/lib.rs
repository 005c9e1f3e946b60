//! Client for the Mango Office VPBX HTTP API.
//!
//! Covers the statistics export (request a key, poll for the result, decode
//! the CSV payload into [`types::Call`] rows) and user lookup by extension.

mod client;
mod errors;
pub mod request;
pub mod sign;
pub mod stats;
pub mod types;
pub use self::client::{Client, API_URL, STATS_RETRY_DELAY};
pub use self::errors::Error;
pub use self::request::{ApiRequest, StatsField, STATS_FIELDS};
pub use self::sign::{Credentials, SignedForm, Signer};
pub use self::stats::{DecodeOptions, NumericPolicy};
