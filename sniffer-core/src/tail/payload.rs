use crate::access_log::LogRecord;
use crate::stats::WindowStats;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Summary of one closed window, as delivered on the snapshot channel.
#[derive(Debug, Clone, Serialize)]
pub struct ReadPayload {
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    /// `None` when nothing was captured during the window.
    pub stats: Option<WindowStats>,
    pub records: Vec<LogRecord>,
}

impl ReadPayload {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
