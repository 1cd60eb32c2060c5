mod alert;
mod traffic;


pub use alert::{Alert, AlertData};
pub use traffic::TrafficMonitor;
