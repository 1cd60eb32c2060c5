use crate::render::Console;
use clap::ValueEnum;
use serde::Serialize;
use sniffer_core::Pipeline;
use sniffer_core::monitor::Alert;
use sniffer_core::tail::ReadPayload;
use std::io::{self, Write};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Redraw a text dashboard on every message
    Console,
    /// One JSON object per message on stdout
    Json,
}

/// Where snapshots and alerts end up.
pub trait Publisher {
    fn publish_payload(&mut self, payload: &ReadPayload) -> io::Result<()>;
    fn publish_alert(&mut self, alert: &Alert) -> io::Result<()>;
}

/// Multiplex both ports into `mode`'s publisher until the producers close
/// them, then wait for the producer tasks.
pub async fn consume(
    pipeline: Pipeline,
    mode: OutputMode,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let Pipeline {
        mut payloads,
        mut alerts,
        global,
        tasks,
    } = pipeline;

    let mut publisher: Box<dyn Publisher> = match mode {
        OutputMode::Console => Box::new(Console::new(global)),
        OutputMode::Json => Box::new(JsonLines::new(io::stdout())),
    };

    multiplex(&mut payloads, &mut alerts, publisher.as_mut(), &shutdown).await?;

    tasks.join().await?;
    Ok(())
}

/// Publish from both ports until both are closed. A snapshot stream that
/// ends before shutdown cancels `shutdown` so the monitor follows.
async fn multiplex(
    payloads: &mut mpsc::Receiver<ReadPayload>,
    alerts: &mut mpsc::Receiver<Alert>,
    publisher: &mut dyn Publisher,
    shutdown: &CancellationToken,
) -> io::Result<()> {
    let mut payloads_open = true;
    let mut alerts_open = true;

    while payloads_open || alerts_open {
        tokio::select! {
            payload = payloads.recv(), if payloads_open => match payload {
                Some(payload) => publisher.publish_payload(&payload)?,
                None => {
                    payloads_open = false;
                    if !shutdown.is_cancelled() {
                        // the tailer gave up on its own; take the monitor down too
                        warn!("snapshot stream ended before shutdown");
                        shutdown.cancel();
                    }
                }
            },

            alert = alerts.recv(), if alerts_open => match alert {
                Some(alert) => publisher.publish_alert(&alert)?,
                None => alerts_open = false,
            },
        }
    }

    Ok(())
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Message<'a> {
    Payload(&'a ReadPayload),
    Alert(&'a Alert),
}

pub struct JsonLines<W> {
    out: W,
}

impl<W: Write> JsonLines<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    fn write(&mut self, message: &Message<'_>) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, message)?;
        self.out.write_all(b"\n")?;
        self.out.flush()
    }
}

impl<W: Write> Publisher for JsonLines<W> {
    fn publish_payload(&mut self, payload: &ReadPayload) -> io::Result<()> {
        self.write(&Message::Payload(payload))
    }

    fn publish_alert(&mut self, alert: &Alert) -> io::Result<()> {
        self.write(&Message::Alert(alert))
    }
}
