use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Default interval between scheduling rounds.
pub const DEFAULT_ROUND_INTERVAL: Duration = Duration::from_millis(1000);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub log_json: bool,
    pub round_interval: Duration,
    pub cluster_file: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let log_level = lookup("FLOWSCHED_LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        let log_json = lookup("FLOWSCHED_LOG_JSON")
            .map(|v| v == "1" || v.to_lowercase() == "true")
            .unwrap_or(false);

        let round_interval = match lookup("FLOWSCHED_ROUND_INTERVAL_MS") {
            None => DEFAULT_ROUND_INTERVAL,
            Some(raw) => {
                let millis: u64 = raw.parse().map_err(|_| ConfigError::Invalid {
                    var: "FLOWSCHED_ROUND_INTERVAL_MS",
                    reason: format!("'{raw}' is not a number of milliseconds"),
                })?;
                if millis == 0 {
                    return Err(ConfigError::Invalid {
                        var: "FLOWSCHED_ROUND_INTERVAL_MS",
                        reason: "must be greater than zero".to_string(),
                    });
                }
                Duration::from_millis(millis)
            }
        };

        let cluster_file = lookup("FLOWSCHED_CLUSTER_FILE")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        Ok(Self {
            log_level,
            log_json,
            round_interval,
            cluster_file,
        })
    }
}
