use std::time::Duration;

use anyhow::{Context, Result};

use crate::browser::decision::PassPolicy;
use crate::session::Session;

const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api/v1";

/// Client configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub api_token: String,
    /// Job posting the swiping user is hiring for; every match is recorded against it.
    pub job_id: u64,
    pub pass_policy: PassPolicy,
    pub http_timeout: Duration,
    pub max_retries: u32,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup so parsing can be tested
    /// without touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &str| {
            lookup(key).with_context(|| format!("Required environment variable '{key}' is not set"))
        };

        Ok(Config {
            api_url: lookup("MATCHMAKR_API_URL")
                .unwrap_or_else(|| DEFAULT_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            api_token: require("MATCHMAKR_API_TOKEN")?,
            job_id: require("MATCHMAKR_JOB_ID")?
                .parse::<u64>()
                .context("MATCHMAKR_JOB_ID must be a positive integer")?,
            pass_policy: lookup("MATCHMAKR_PASS_POLICY")
                .map(|v| v.parse::<PassPolicy>())
                .transpose()
                .context("MATCHMAKR_PASS_POLICY must be 'withhold' or 'retract'")?
                .unwrap_or_default(),
            http_timeout: Duration::from_secs(
                lookup("MATCHMAKR_HTTP_TIMEOUT_SECS")
                    .unwrap_or_else(|| "30".to_string())
                    .parse::<u64>()
                    .context("MATCHMAKR_HTTP_TIMEOUT_SECS must be a number of seconds")?,
            ),
            max_retries: lookup("MATCHMAKR_MAX_RETRIES")
                .unwrap_or_else(|| "3".to_string())
                .parse::<u32>()
                .context("MATCHMAKR_MAX_RETRIES must be a non-negative integer")?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }

    pub fn session(&self) -> Session {
        Session::new(self.api_url.clone(), self.api_token.clone())
    }
}
