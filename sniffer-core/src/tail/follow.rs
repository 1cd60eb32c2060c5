use crate::tail::TailError;
use backon::{ExponentialBuilder, Retryable};
use std::fs::Metadata;
use std::io::{self, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncSeekExt, BufReader};
use tokio::sync::mpsc;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Follows a file from its current end, yielding complete lines as they
/// are appended.
///
/// The file is polled rather than watched. At every EOF the path is checked
/// again: a shrinking file (truncation) or a different inode (rotation)
/// makes the follower reopen the path and read it from the start.
pub struct FileFollower {
    path: PathBuf,
    reader: BufReader<File>,
    offset: u64,
    file_id: Option<u64>,
    pending: Vec<u8>,
    poll_interval: Duration,
    backoff: ExponentialBuilder,
}

impl FileFollower {
    /// Open `path` positioned at its end. A missing or unreadable file is
    /// an [`TailError::Open`]; there is no retry at this point.
    pub async fn open(path: &Path) -> Result<Self, TailError> {
        let (file, meta) = open_file(path.to_path_buf())
            .await
            .map_err(|source| TailError::Open {
                path: path.to_path_buf(),
                source,
            })?;

        let mut follower = Self {
            path: path.to_path_buf(),
            reader: BufReader::new(file),
            offset: 0,
            file_id: file_id(&meta),
            pending: Vec::new(),
            poll_interval: POLL_INTERVAL,
            backoff: reconnect_backoff(),
        };
        follower
            .seek(meta.len())
            .await
            .map_err(|source| TailError::Open {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(follower)
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Replace the retry policy used when the file becomes unreadable.
    pub fn with_reconnect_backoff(mut self, backoff: ExponentialBuilder) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Push lines into `lines` until cancelled, the receiver goes away, or
    /// the file stays unreadable after every reconnect attempt.
    pub async fn run(
        mut self,
        lines: mpsc::Sender<String>,
        cancel: CancellationToken,
    ) -> Result<(), TailError> {
        loop {
            let polled = tokio::select! {
                _ = cancel.cancelled() => return Ok(()),
                polled = self.poll_line() => polled,
            };

            match polled {
                Ok(Some(line)) => {
                    tokio::select! {
                        _ = cancel.cancelled() => return Ok(()),
                        sent = lines.send(line) => if sent.is_err() {
                            return Ok(());
                        },
                    }
                }
                Ok(None) => {
                    tokio::select! {
                        _ = cancel.cancelled() => return Ok(()),
                        _ = sleep(self.poll_interval) => {}
                    }
                }
                Err(err) => {
                    warn!(path = %self.path.display(), error = %err, "log file read failed");
                    tokio::select! {
                        _ = cancel.cancelled() => return Ok(()),
                        reconnected = self.reconnect() => reconnected?,
                    }
                }
            }
        }
    }

    /// Read the next complete line. `None` means EOF for now.
    pub async fn poll_line(&mut self) -> io::Result<Option<String>> {
        let n = self.reader.read_until(b'\n', &mut self.pending).await?;
        self.offset += n as u64;

        if self.pending.last() == Some(&b'\n') {
            let mut raw = std::mem::take(&mut self.pending);
            raw.pop();
            if raw.last() == Some(&b'\r') {
                raw.pop();
            }
            return Ok(Some(String::from_utf8_lossy(&raw).into_owned()));
        }

        // At EOF, possibly holding a partial line.
        self.check_replaced().await?;
        Ok(None)
    }

    async fn check_replaced(&mut self) -> io::Result<()> {
        let meta = tokio::fs::metadata(&self.path).await?;

        if file_id(&meta) != self.file_id {
            info!(path = %self.path.display(), "log file rotated");
            self.reopen(0).await
        } else if meta.len() < self.offset {
            info!(path = %self.path.display(), "log file truncated");
            self.reopen(0).await
        } else {
            Ok(())
        }
    }

    async fn reopen(&mut self, offset: u64) -> io::Result<()> {
        let (file, meta) = open_file(self.path.clone()).await?;
        self.attach(file, &meta, offset).await
    }

    /// Reopen the path with exponential backoff. Resumes at the current
    /// offset when the same file is still there, otherwise starts over.
    pub(super) async fn reconnect(&mut self) -> Result<(), TailError> {
        let path = self.path.clone();
        let backoff = self.backoff;
        let attempts = AtomicUsize::new(0);

        let (file, meta) = (|| open_file(path.clone()))
            .retry(backoff)
            .notify(|err: &io::Error, delay: Duration| {
                let attempt = attempts.fetch_add(1, Ordering::Relaxed) + 1;
                warn!(attempt, retry_in = ?delay, error = %err, path = %path.display(), "log file unavailable");
            })
            .await
            .map_err(|source| TailError::Watch {
                path: self.path.clone(),
                source,
            })?;

        let offset = if file_id(&meta) == self.file_id && meta.len() >= self.offset {
            self.offset
        } else {
            0
        };

        self.attach(file, &meta, offset)
            .await
            .map_err(|source| TailError::Watch {
                path: self.path.clone(),
                source,
            })
    }

    async fn attach(&mut self, file: File, meta: &Metadata, offset: u64) -> io::Result<()> {
        if offset != self.offset {
            self.pending.clear();
        }
        self.reader = BufReader::new(file);
        self.file_id = file_id(meta);
        self.seek(offset).await
    }

    async fn seek(&mut self, offset: u64) -> io::Result<()> {
        self.offset = self.reader.seek(SeekFrom::Start(offset)).await?;
        Ok(())
    }
}

fn reconnect_backoff() -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_min_delay(Duration::from_millis(250))
        .with_max_delay(Duration::from_secs(5))
        .with_max_times(8)
}

async fn open_file(path: PathBuf) -> io::Result<(File, Metadata)> {
    let file = File::open(&path).await?;
    let meta = file.metadata().await?;
    Ok((file, meta))
}

#[cfg(unix)]
fn file_id(meta: &Metadata) -> Option<u64> {
    use std::os::unix::fs::MetadataExt;
    Some(meta.ino())
}

// Without inodes only truncation can be detected.
#[cfg(not(unix))]
fn file_id(_meta: &Metadata) -> Option<u64> {
    None
}
