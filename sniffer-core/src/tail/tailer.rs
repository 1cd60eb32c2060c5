use crate::access_log::{LogRecord, parse_line};
use crate::stats::{GlobalStats, WindowStats};
use crate::tail::{FileFollower, ReadPayload, TailError};
use backon::ExponentialBuilder;
use chrono::{DateTime, Utc};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

const LINE_BUFFER: usize = 1024;

/// An idle tailer: knows its window length and where closed windows go,
/// but is not attached to a file yet.
pub struct Tailer {
    interval: Duration,
    global: Arc<GlobalStats>,
}

impl Tailer {
    pub fn new(interval: Duration, global: Arc<GlobalStats>) -> Self {
        Self { interval, global }
    }

    /// Attach to `path`, following from its current end.
    pub async fn open(self, path: impl AsRef<Path>) -> Result<Following, TailError> {
        let follower = FileFollower::open(path.as_ref()).await?;
        info!(path = %path.as_ref().display(), interval = ?self.interval, "following log file");

        Ok(Following {
            interval: self.interval,
            global: self.global,
            follower,
        })
    }
}

/// A tailer attached to a file. [`run`](Self::run) consumes it; once it
/// returns the tailer is stopped and its snapshot channel is closed.
pub struct Following {
    interval: Duration,
    global: Arc<GlobalStats>,
    follower: FileFollower,
}

impl Following {
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.follower = self.follower.with_poll_interval(poll_interval);
        self
    }

    pub fn with_reconnect_backoff(mut self, backoff: ExponentialBuilder) -> Self {
        self.follower = self.follower.with_reconnect_backoff(backoff);
        self
    }

    /// Capture lines into windows of `interval` and send one payload per
    /// window to `sink`, empty windows included.
    ///
    /// Returns on cancellation, when `sink`'s receiver is dropped, or when
    /// the file is lost for good. `sink` is dropped on return.
    pub async fn run(
        self,
        sink: mpsc::Sender<ReadPayload>,
        cancel: CancellationToken,
    ) -> Result<(), TailError> {
        let Following {
            interval,
            global,
            follower,
        } = self;

        let path = follower.path().to_path_buf();
        let (line_tx, mut line_rx) = mpsc::channel(LINE_BUFFER);
        let follow_cancel = cancel.child_token();
        let follow_task = tokio::spawn(follower.run(line_tx, follow_cancel.clone()));

        let mut ticker = time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut window = Window::start();

        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => break,

                _ = ticker.tick() => {
                    let payload = window.close(&global);

                    let delivered = tokio::select! {
                        _ = cancel.cancelled() => false,
                        sent = sink.send(payload) => sent.is_ok(),
                    };
                    if !delivered {
                        break;
                    }

                    // a stalled consumer pushes the next window back
                    window.restart();
                    ticker.reset();
                }

                line = line_rx.recv() => match line {
                    Some(line) => window.push(line),
                    // follower gave up, its error surfaces below
                    None => break,
                },
            }
        }

        follow_cancel.cancel();
        let followed = follow_task.await?;

        info!(path = %path.display(), "tailer stopped");
        followed
    }
}

/// The window currently being filled.
struct Window {
    started: DateTime<Utc>,
    stats: WindowStats,
    records: Vec<LogRecord>,
}

impl Window {
    fn start() -> Self {
        Self {
            started: Utc::now(),
            stats: WindowStats::new(),
            records: Vec::new(),
        }
    }

    fn restart(&mut self) {
        self.started = Utc::now();
    }

    fn push(&mut self, line: String) {
        match parse_line(&line) {
            Ok(record) => {
                self.stats.capture_one(&record);
                self.records.push(record);
            }
            Err(err) => trace!(%err, line = %line, "dropping line"),
        }
    }

    /// Hand the window's totals to `global` on a detached task and build
    /// the payload, leaving the window empty. An empty window merges as a
    /// zero sample.
    fn close(&mut self, global: &Arc<GlobalStats>) -> ReadPayload {
        let started = self.started;
        let stats = std::mem::take(&mut self.stats);
        let records = std::mem::take(&mut self.records);

        debug!(
            records = records.len(),
            bytes = stats.total_bytes(),
            "window closed"
        );

        let merged = stats.clone();
        let global = global.clone();
        tokio::spawn(async move { global.merge(&merged) });

        ReadPayload {
            window_start: started,
            window_end: Utc::now(),
            stats: (!records.is_empty()).then_some(stats),
            records,
        }
    }
}
