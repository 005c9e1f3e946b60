//! Request signing for the VPBX API.
//!
//! Every request carries three form fields: the API key, the JSON payload
//! and a signature over `api_key + json + api_salt`. The provider recomputes
//! the digest over the bytes it receives, so the payload must be sent
//! exactly as it was signed.

use std::fmt;

use serde::Serialize;
use sha2::{Digest, Sha256};

/// API credentials issued in the VPBX settings page.
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
    api_salt: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, api_salt: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_salt: api_salt.into(),
        }
    }

    /// The public half, sent as `vpbx_api_key`.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("api_salt", &"<redacted>")
            .finish()
    }
}

/// Form body for a signed request, in wire order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignedForm {
    pub vpbx_api_key: String,
    pub sign: String,
    pub json: String,
}

/// Computes signatures for outbound payloads.
#[derive(Debug, Clone)]
pub struct Signer {
    credentials: Credentials,
}

impl Signer {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    /// Lowercase hex SHA-256 of `api_key + json + api_salt`.
    pub fn sign(&self, json: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.credentials.api_key.as_bytes());
        hasher.update(json.as_bytes());
        hasher.update(self.credentials.api_salt.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Builds the form body. `json` is moved in untouched and is the exact
    /// string that was signed.
    pub fn form(&self, json: String) -> SignedForm {
        SignedForm {
            vpbx_api_key: self.credentials.api_key.clone(),
            sign: self.sign(&json),
            json,
        }
    }

    /// Serializes `payload` once and signs the result.
    pub fn form_for<T: Serialize>(&self, payload: &T) -> Result<SignedForm, serde_json::Error> {
        let json = serde_json::to_string(payload)?;
        Ok(self.form(json))
    }
}
