use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use rr_core::PollPolicy;
use crate::error::AppError;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the story service, without a trailing slash.
    pub api_url: String,
    pub poll: PollPolicy,
    pub request_timeout: Duration,
    /// Where the terminal media view stores finished videos.
    pub output_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            poll: PollPolicy::default(),
            request_timeout: Duration::from_secs(30),
            output_dir: PathBuf::from("outputs"),
        }
    }
}

impl AppConfig {
    /// Reads `.env` (if present) and the process environment.
    pub fn load() -> Result<Self, AppError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                return Err(AppError::Config(format!(".env: {e}")));
            }
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let mut config = Self::default();

        if let Some(url) = lookup("ROTREEL_API_URL") {
            config.api_url = url.trim_end_matches('/').to_string();
        }
        if let Some(ms) = parse::<u64>(&lookup, "ROTREEL_POLL_INTERVAL_MS")? {
            if ms == 0 {
                return Err(AppError::Config("ROTREEL_POLL_INTERVAL_MS must be positive".into()));
            }
            config.poll.interval = Duration::from_millis(ms);
        }
        config.poll.max_polls = parse::<u32>(&lookup, "ROTREEL_MAX_POLLS")?;
        if config.poll.max_polls == Some(0) {
            return Err(AppError::Config("ROTREEL_MAX_POLLS must be positive".into()));
        }
        if let Some(secs) = parse::<u64>(&lookup, "ROTREEL_REQUEST_TIMEOUT_SECS")? {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(dir) = lookup("ROTREEL_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(dir);
        }

        Ok(config)
    }
}

fn parse<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>, AppError> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| AppError::Config(format!("{key} must be a number, got '{raw}'"))),
    }
}
