mod error;
mod loader;
mod types;


pub use error::ConfigError;
pub use loader::{ConfigOverrides, load_config};
pub use types::{LoggingConfig, MonitorConfig};
