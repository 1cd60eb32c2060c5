use crate::conf::{ConfigError, MonitorConfig};
use std::fs;
use std::path::{Path, PathBuf};

/// Values given explicitly on the command line. They win over the file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub log_file: Option<PathBuf>,
    pub stats_interval_secs: Option<u64>,
    pub monitor_interval_mins: Option<u64>,
    pub alert_threshold: Option<f64>,
    pub log_dir: Option<PathBuf>,
}

/// Defaults, then the optional TOML file, then `overrides`; validated.
pub fn load_config(
    path: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<MonitorConfig, ConfigError> {
    let mut config = match path {
        Some(path) => parse_file(path)?,
        None => MonitorConfig::default(),
    };

    if let Some(log_file) = &overrides.log_file {
        config.log_file = log_file.clone();
    }
    if let Some(secs) = overrides.stats_interval_secs {
        config.stats_interval_secs = secs;
    }
    if let Some(mins) = overrides.monitor_interval_mins {
        config.monitor_interval_mins = mins;
    }
    if let Some(threshold) = overrides.alert_threshold {
        config.alert_threshold = threshold;
    }
    if let Some(log_dir) = &overrides.log_dir {
        config.logging.log_dir = Some(log_dir.clone());
    }

    config.validate()?;
    Ok(config)
}

fn parse_file(path: &Path) -> Result<MonitorConfig, ConfigError> {
    let s = fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
    toml::from_str(&s).map_err(|e| ConfigError::parse(path, e))
}
