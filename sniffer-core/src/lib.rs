pub mod access_log;
pub mod conf;
pub mod logging;
pub mod monitor;
pub mod pipeline;
pub mod shutdown;
pub mod stats;
pub mod tail;

pub use pipeline::Pipeline;
