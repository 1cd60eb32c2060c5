use crate::access_log::TIMESTAMP_LAYOUT;
use crate::monitor::{Alert, AlertData};
use crate::stats::{Ewma, GlobalStats};
use chrono::{Local, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Samples the cumulative request count on its own timer and alerts while
/// the smoothed count is above `threshold`.
///
/// Every tick that is over the threshold produces an alert; nothing is
/// suppressed between consecutive ticks.
pub struct TrafficMonitor {
    threshold: f64,
    interval: Duration,
    average: Ewma,
    global: Arc<GlobalStats>,
}

impl TrafficMonitor {
    pub fn new(threshold: f64, interval: Duration, global: Arc<GlobalStats>) -> Self {
        Self {
            threshold,
            interval,
            average: Ewma::new(),
            global,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn average(&self) -> f64 {
        self.average.value()
    }

    /// One tick: sample, smooth, compare.
    pub fn check(&mut self) -> Option<Alert> {
        let total_requests = self.global.total_requests();
        self.average.add(total_requests as f64);

        let average = self.average.value();
        if average <= self.threshold {
            return None;
        }

        let message = format!(
            "High traffic generated an alert - hits = {average:.2}, triggered at {}",
            Local::now().format(TIMESTAMP_LAYOUT)
        );
        warn!(average, threshold = self.threshold, total_requests, "high traffic");

        Some(Alert {
            message,
            data: Some(AlertData {
                average,
                threshold: self.threshold,
                total_requests,
                triggered_at: Utc::now(),
            }),
        })
    }

    /// Check every `interval` until cancelled or the receiver goes away.
    /// `sink` is dropped on return, closing the alert channel.
    pub async fn run(mut self, sink: mpsc::Sender<Alert>, cancel: CancellationToken) {
        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => break,

                _ = ticker.tick() => {
                    let Some(alert) = self.check() else {
                        continue;
                    };

                    let delivered = tokio::select! {
                        _ = cancel.cancelled() => false,
                        sent = sink.send(alert) => sent.is_ok(),
                    };
                    if !delivered {
                        break;
                    }
                }
            }
        }

        info!("traffic monitor stopped");
    }
}
