mod parse;
mod types;


pub use parse::{ParseError, parse_line, section_of};
pub use types::LogRecord;

/// chrono layout of the access log timestamp, e.g. `10/Oct/2000:13:55:36 -0700`.
pub const TIMESTAMP_LAYOUT: &str = "%d/%b/%Y:%H:%M:%S %z";
