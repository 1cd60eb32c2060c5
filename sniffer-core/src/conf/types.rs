use crate::conf::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct MonitorConfig {
    /// Access log to follow.
    pub log_file: PathBuf,

    /// Window length, in seconds.
    pub stats_interval_secs: u64,

    /// How often the traffic monitor samples, in minutes.
    pub monitor_interval_mins: u64,

    /// Smoothed request count above which an alert is raised.
    pub alert_threshold: f64,

    pub logging: LoggingConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            log_file: PathBuf::from("/tmp/access.log"),
            stats_interval_secs: 10,
            monitor_interval_mins: 2,
            alert_threshold: 10.0,
            logging: LoggingConfig::default(),
        }
    }
}

impl MonitorConfig {
    pub fn stats_interval(&self) -> Duration {
        Duration::from_secs(self.stats_interval_secs)
    }

    pub fn monitor_interval(&self) -> Duration {
        Duration::from_secs(self.monitor_interval_mins.saturating_mul(60))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stats_interval_secs == 0 {
            return Err(ConfigError::InvalidInterval {
                field: "stats_interval_secs",
            });
        }
        if self.monitor_interval_mins == 0 {
            return Err(ConfigError::InvalidInterval {
                field: "monitor_interval_mins",
            });
        }
        if !self.alert_threshold.is_finite() || self.alert_threshold < 0.0 {
            return Err(ConfigError::InvalidThreshold {
                value: self.alert_threshold,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is not set.
    pub level: String,

    /// Write logs to a daily rolling file in this directory instead of stderr.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: None,
        }
    }
}
