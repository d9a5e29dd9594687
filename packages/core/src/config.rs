use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::cli::Cli;

pub const DEFAULT_CONFIG_DIR: &str = "config";
pub const DEFAULT_POLL_INTERVAL_SECONDS: u64 = 30;
pub const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 10;
pub const DEFAULT_API_PORT: u16 = 8080;

pub const DEFAULT_HYVEE_URL: &str = "https://www.hy-vee.com";
pub const DEFAULT_SPOTTER_URL: &str = "https://www.vaccinespotter.org";
pub const DEFAULT_SLACK_API_URL: &str = "https://slack.com";

/// Process-level settings. Search areas live in `config_dir` and are
/// loaded separately by [`crate::search_area::load_search_areas`].
#[derive(Clone)]
pub struct ServiceConfig {
    pub slack_bot_token: String,
    pub config_dir: PathBuf,
    pub poll_interval_seconds: u64,
    pub http_timeout_seconds: u64,
    pub hyvee_url: String,
    pub spotter_url: String,
    pub slack_api_url: String,
    pub api_port: u16,
}

// Keeps the bot token out of startup logs.
impl std::fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("slack_bot_token", &"<redacted>")
            .field("config_dir", &self.config_dir)
            .field("poll_interval_seconds", &self.poll_interval_seconds)
            .field("http_timeout_seconds", &self.http_timeout_seconds)
            .field("hyvee_url", &self.hyvee_url)
            .field("spotter_url", &self.spotter_url)
            .field("slack_api_url", &self.slack_api_url)
            .field("api_port", &self.api_port)
            .finish()
    }
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup. `from_env` is the
    /// production caller; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let slack_bot_token = lookup("SLACK_BOT_TOKEN")
            .filter(|token| !token.trim().is_empty())
            .ok_or("SLACK_BOT_TOKEN is required")?;

        let config_dir = lookup("CONFIG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_DIR));

        let poll_interval_seconds = parse_positive(
            &lookup,
            "POLL_INTERVAL_SECONDS",
            DEFAULT_POLL_INTERVAL_SECONDS,
        )?;
        let http_timeout_seconds = parse_positive(
            &lookup,
            "HTTP_TIMEOUT_SECONDS",
            DEFAULT_HTTP_TIMEOUT_SECONDS,
        )?;

        let api_port = match lookup("API_PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| "API_PORT must be a valid port number")?,
            None => DEFAULT_API_PORT,
        };

        Ok(Self {
            slack_bot_token,
            config_dir,
            poll_interval_seconds,
            http_timeout_seconds,
            hyvee_url: lookup("HYVEE_URL").unwrap_or_else(|| DEFAULT_HYVEE_URL.to_string()),
            spotter_url: lookup("SPOTTER_URL")
                .unwrap_or_else(|| DEFAULT_SPOTTER_URL.to_string()),
            slack_api_url: lookup("SLACK_API_URL")
                .unwrap_or_else(|| DEFAULT_SLACK_API_URL.to_string()),
            api_port,
        })
    }

    /// Command-line flags take precedence over the environment.
    pub fn apply_cli(mut self, cli: &Cli) -> Result<Self, String> {
        if let Some(dir) = &cli.config_dir {
            self.config_dir = dir.clone();
        }
        if let Some(interval) = cli.poll_interval {
            if interval == 0 {
                return Err("--poll-interval must be greater than zero".to_string());
            }
            self.poll_interval_seconds = interval;
        }
        if let Some(port) = cli.port {
            self.api_port = port;
        }
        Ok(self)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_seconds)
    }
}

fn parse_positive<F>(lookup: &F, key: &str, default: u64) -> Result<u64, String>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    match raw.parse::<u64>() {
        Ok(0) => Err(format!("{} must be greater than zero", key)),
        Ok(value) => Ok(value),
        Err(_) => Err(format!("{} must be a valid number", key)),
    }
}
