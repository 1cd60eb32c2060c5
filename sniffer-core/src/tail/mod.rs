//! Log file tailing and windowing.
//!
//! ```text
//! access log
//!   FileFollower   (poll, rotation, truncation)
//!   parse_line
//!   WindowStats    (one per interval)
//!   ReadPayload    -> snapshot channel
//!   GlobalStats    (detached merge)
//! ```

mod error;
mod follow;
mod payload;
mod tailer;

#[cfg(test)]
mod tests;

pub use error::TailError;
pub use follow::FileFollower;
pub use payload::ReadPayload;
pub use tailer::{Following, Tailer};
