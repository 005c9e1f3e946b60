//! HTTP client for the Mango Office VPBX API.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::Instrument;
use url::Url;

use crate::{
    request::{ApiRequest, StatsRequest, StatsResultRequest, UserRequest},
    sign::{Credentials, SignedForm, Signer},
    stats::{decode_calls_with, DecodeOptions, NumericPolicy},
    types::{Call, StatsKeyResponse, User, UsersResponse},
    Error,
};

/// Production API root.
pub const API_URL: &str = "https://app.mango-office.ru/vpbx";

/// Delay the provider recommends between result polls.
pub const STATS_RETRY_DELAY: Duration = Duration::from_secs(5);

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the VPBX API.
///
/// Holds the credentials and a pooled `reqwest::Client`; nothing mutates
/// after construction, so one instance can be shared across tasks. No call
/// retries or waits on its own.
pub struct Client {
    client: reqwest::Client,
    signer: Signer,
    /// Base URL for the API. Defaults to [`API_URL`].
    base_api_url: String,
    decode_options: DecodeOptions,
}

impl Client {
    /// Creates a client pointing at the production API.
    pub fn new(api_key: &str, api_salt: &str) -> Result<Self, Error> {
        Self::with_base_url(API_URL, api_key, api_salt)
    }

    /// Creates a client with a custom base URL. Used for testing with wiremock.
    pub fn with_base_url(base_url: &str, api_key: &str, api_salt: &str) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| {
                tracing::error!("Failed to build HTTP client: {}", e);
                Error::Transport(e)
            })?;
        Ok(Self {
            client,
            signer: Signer::new(Credentials::new(api_key, api_salt)),
            base_api_url: base_url.trim_end_matches('/').to_string(),
            decode_options: DecodeOptions::default(),
        })
    }

    /// Chooses how unparseable numbers in statistics rows are handled.
    pub fn with_numeric_policy(mut self, policy: NumericPolicy) -> Self {
        self.decode_options.numeric_policy = policy;
        self
    }

    pub fn signer(&self) -> &Signer {
        &self.signer
    }

    fn get_url(&self, path: &str) -> Result<Url, Error> {
        Url::parse(format!("{}{}", &self.base_api_url, path).as_str()).map_err(|e| {
            tracing::error!("Invalid URL constructed: {}", e);
            Error::InvalidUrl(e)
        })
    }

    /// Serializes and signs `request`, exactly as it will be sent.
    pub fn signed_form<R: ApiRequest>(&self, request: &R) -> Result<SignedForm, Error> {
        Ok(self.signer.form_for(request)?)
    }

    /// Posts a signed request and returns the status and the body bytes
    /// exactly as received.
    async fn post<R: ApiRequest>(&self, request: &R) -> Result<(StatusCode, Vec<u8>), Error> {
        let url = self.get_url(request.path())?;
        let form = self.signed_form(request)?;
        tracing::debug!("POST {} ({} byte payload)", url, form.json.len());

        let resp = self.client.post(url).form(&form).send().await.map_err(|e| {
            tracing::error!("Failed to send request to {}: {}", request.path(), e);
            Error::Transport(e)
        })?;

        let status = resp.status();
        let body = resp.bytes().await.map_err(|e| {
            tracing::error!("Failed to read response body: {}", e);
            Error::Transport(e)
        })?;
        Ok((status, body.to_vec()))
    }

    /// Posts a request whose success response is JSON.
    async fn post_json<T, R>(&self, request: &R) -> Result<T, Error>
    where
        T: DeserializeOwned,
        R: ApiRequest,
    {
        let (status, body) = self.post(request).await?;

        if !status.is_success() {
            return Err(provider_error(request.path(), status, &body));
        }

        serde_json::from_slice::<T>(&body).map_err(|e| {
            let text = String::from_utf8_lossy(&body);
            tracing::error!("Failed to parse response: {} | body: {}", e, truncate_body(&text));
            Error::MalformedResponse(e.to_string())
        })
    }

    /// Starts a statistics export for `[from, to]` and returns its key.
    ///
    /// The key is not usable immediately; poll it with
    /// [`Client::fetch_stats`].
    pub async fn request_stats_key(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        request_id: &str,
    ) -> Result<String, Error> {
        let request = StatsRequest::new(from, to, request_id);
        let span = tracing::debug_span!("stats_key", request_id);

        let resp: StatsKeyResponse = self.post_json(&request).instrument(span).await?;
        if resp.key.is_empty() {
            tracing::error!("Provider returned an empty statistics key");
            return Err(Error::EmptyKey);
        }
        Ok(resp.key)
    }

    /// Polls once for the result of an export.
    ///
    /// Returns [`Error::NotReady`] while the export is still running; the
    /// caller should wait [`STATS_RETRY_DELAY`] and call again with the same
    /// key. [`Error::NotFound`] means the key is unknown or expired.
    pub async fn fetch_stats(&self, key: &str, request_id: &str) -> Result<Vec<Call>, Error> {
        let request = StatsResultRequest::new(key);
        let span = tracing::debug_span!("stats_result", request_id);

        let (status, body) = self.post(&request).instrument(span).await?;
        match status {
            StatusCode::OK => decode_calls_with(&body, &self.decode_options),
            StatusCode::NOT_FOUND => Err(Error::NotFound),
            StatusCode::NO_CONTENT => Err(Error::NotReady),
            _ => Err(provider_error(request.path(), status, &body)),
        }
    }

    /// Looks up the user that owns `extension`.
    pub async fn get_user(&self, extension: &str) -> Result<User, Error> {
        let resp: UsersResponse = self.post_json(&UserRequest::new(extension)).await?;
        resp.users
            .into_iter()
            .next()
            .ok_or_else(|| Error::UserNotFound(extension.to_string()))
    }
}

/// The body is kept whole in the error; only the log line is truncated.
fn provider_error(path: &str, status: StatusCode, body: &[u8]) -> Error {
    let body = String::from_utf8_lossy(body).into_owned();
    tracing::error!(
        "Request to {} failed with status {}: {}",
        path,
        status,
        truncate_body(&body)
    );
    Error::Provider {
        status: status.as_u16(),
        body,
    }
}

fn truncate_body(body: &str) -> &str {
    const MAX: usize = 2000;
    if body.len() <= MAX {
        return body;
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
