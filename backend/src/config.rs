use std::{env, path::PathBuf, time::Duration};

use crate::error::AppError;

pub const DEFAULT_DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";
pub const DEFAULT_DRIVE_UPLOAD_BASE: &str = "https://www.googleapis.com/upload/drive/v3";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub log_dir: PathBuf,
    pub drive_api_base: String,
    pub drive_upload_base: String,
    pub request_timeout: Duration,
    pub allowed_origin: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = lookup("SERVER_PORT")
            .unwrap_or_else(|| "3001".into())
            .parse()
            .map_err(|err| AppError::Config(format!("invalid SERVER_PORT: {err}")))?;

        let log_dir = PathBuf::from(lookup("RELAY_LOG_DIR").unwrap_or_else(|| "./log".into()));

        let drive_api_base = lookup("DRIVE_API_BASE")
            .unwrap_or_else(|| DEFAULT_DRIVE_API_BASE.into())
            .trim_end_matches('/')
            .to_string();
        let drive_upload_base = lookup("DRIVE_UPLOAD_BASE")
            .unwrap_or_else(|| DEFAULT_DRIVE_UPLOAD_BASE.into())
            .trim_end_matches('/')
            .to_string();

        let timeout_secs: u64 = lookup("DRIVE_REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|| "30".into())
            .parse()
            .map_err(|err| AppError::Config(format!("invalid DRIVE_REQUEST_TIMEOUT_SECS: {err}")))?;
        if timeout_secs == 0 {
            return Err(AppError::Config(
                "DRIVE_REQUEST_TIMEOUT_SECS must be greater than zero".into(),
            ));
        }

        let allowed_origin = lookup("CORS_ALLOWED_ORIGIN")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        Ok(Self {
            host,
            port,
            log_dir,
            drive_api_base,
            drive_upload_base,
            request_timeout: Duration::from_secs(timeout_secs),
            allowed_origin,
        })
    }
}
