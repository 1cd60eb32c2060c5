mod log_file;
pub mod tracing;

pub use log_file::{TestLogFile, access_line};
pub use tracing::{CapturedEvent, CapturedEvents, capture_events};
