use chrono::{DateTime, Utc};
use serde::Serialize;

/// A high traffic notification. Alerts carry no severity and there is no
/// matching "recovered" message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<AlertData>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertData {
    /// Smoothed value that crossed the threshold.
    pub average: f64,
    pub threshold: f64,
    /// Cumulative request count sampled on this tick.
    pub total_requests: u64,
    pub triggered_at: DateTime<Utc>,
}
