use std::{env, time::Duration};

use crate::error::ClientError;

pub const DEFAULT_RELAY_BASE_URL: &str = "http://localhost:3001/api/files";
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub relay_base_url: String,
    pub debounce: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            relay_base_url: DEFAULT_RELAY_BASE_URL.into(),
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ClientError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ClientError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let relay_base_url = lookup("RELAY_BASE_URL")
            .unwrap_or_else(|| DEFAULT_RELAY_BASE_URL.into())
            .trim_end_matches('/')
            .to_string();

        let debounce_ms: u64 = match lookup("SEARCH_DEBOUNCE_MS") {
            Some(raw) => raw
                .parse()
                .map_err(|err| ClientError::Config(format!("invalid SEARCH_DEBOUNCE_MS: {err}")))?,
            None => DEFAULT_DEBOUNCE_MS,
        };

        Ok(Self {
            relay_base_url,
            debounce: Duration::from_millis(debounce_ms),
        })
    }
}
