//! Traffic aggregation.
//!
//! A [`WindowStats`] accumulates the records of one window and is then
//! replayed into the process wide [`GlobalStats`]. Both share the same
//! shape; the global instance only ever grows.

mod ewma;
mod global;
mod window;

#[cfg(test)]
mod tests;

pub use ewma::Ewma;
pub use global::GlobalStats;
pub use window::{SectionHits, WindowStats};
