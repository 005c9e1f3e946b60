//! Credentials and endpoint settings read from the environment.

use anyhow::{bail, Result};

pub const API_KEY_VAR: &str = "MANGO_VPBX_API_KEY";
pub const API_SALT_VAR: &str = "MANGO_VPBX_API_SALT";
pub const BASE_URL_VAR: &str = "MANGO_API_URL";

pub struct Config {
    pub api_key: String,
    pub api_salt: String,
    pub base_url: Option<String>,
}

impl Config {
    /// Reads the process environment. Call `dotenvy::dotenv()` first to
    /// pick up a `.env` file.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let Some(api_key) = non_empty(API_KEY_VAR) else {
            bail!("{} is not set. Find it under VPBX API settings", API_KEY_VAR);
        };
        let Some(api_salt) = non_empty(API_SALT_VAR) else {
            bail!("{} is not set. Find it under VPBX API settings", API_SALT_VAR);
        };

        Ok(Self {
            api_key,
            api_salt,
            base_url: non_empty(BASE_URL_VAR),
        })
    }

    /// Explicit `--base-url` wins over the environment.
    pub fn with_base_url_override(mut self, base_url: Option<&str>) -> Self {
        if let Some(url) = base_url {
            self.base_url = Some(url.to_string());
        }
        self
    }
}
