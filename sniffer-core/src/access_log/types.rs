use serde::Serialize;

/// One parsed access log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogRecord {
    /// The line as read from the file.
    pub raw: String,
    pub remote_host: String,
    pub requesting_user: String,
    pub timestamp: String,
    pub method: String,
    pub target: String,
    /// First path segment of `target`, always starting with `/`.
    pub section: String,
    pub http_version: String,
    /// `0` when the log carries `-`.
    pub response_code: u16,
    /// `0` when the log carries `-`.
    pub body_size: u64,
}
