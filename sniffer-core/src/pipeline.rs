use crate::conf::MonitorConfig;
use crate::monitor::{Alert, TrafficMonitor};
use crate::stats::GlobalStats;
use crate::tail::{ReadPayload, TailError, Tailer};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Both ports hand over one message at a time; a slow consumer holds the
/// producers back instead of losing messages.
pub const CHANNEL_CAPACITY: usize = 1;

/// The running ingestion and alerting tasks, and the two ports a consumer
/// reads from.
pub struct Pipeline {
    pub payloads: mpsc::Receiver<ReadPayload>,
    pub alerts: mpsc::Receiver<Alert>,
    pub global: Arc<GlobalStats>,
    pub tasks: PipelineTasks,
}

pub struct PipelineTasks {
    tailer: JoinHandle<Result<(), TailError>>,
    monitor: JoinHandle<()>,
}

impl Pipeline {
    /// Open the log file and spawn the tailer and the traffic monitor.
    ///
    /// A log file that cannot be opened fails here; nothing is spawned.
    pub async fn start(config: &MonitorConfig, cancel: CancellationToken) -> Result<Self, TailError> {
        let global = Arc::new(GlobalStats::new());

        let following = Tailer::new(config.stats_interval(), global.clone())
            .open(&config.log_file)
            .await?;
        let monitor = TrafficMonitor::new(
            config.alert_threshold,
            config.monitor_interval(),
            global.clone(),
        );

        let (payload_tx, payloads) = mpsc::channel(CHANNEL_CAPACITY);
        let (alert_tx, alerts) = mpsc::channel(CHANNEL_CAPACITY);

        let tailer = tokio::spawn(following.run(payload_tx, cancel.clone()));
        let monitor = tokio::spawn(monitor.run(alert_tx, cancel));

        info!(
            log_file = %config.log_file.display(),
            stats_interval_secs = config.stats_interval_secs,
            monitor_interval_mins = config.monitor_interval_mins,
            alert_threshold = config.alert_threshold,
            "pipeline started"
        );

        Ok(Self {
            payloads,
            alerts,
            global,
            tasks: PipelineTasks { tailer, monitor },
        })
    }
}

impl PipelineTasks {
    /// Wait for both tasks. Only the tailer can fail.
    pub async fn join(self) -> Result<(), TailError> {
        let tailed = self.tailer.await?;
        self.monitor.await?;
        tailed
    }
}
