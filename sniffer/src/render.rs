use crate::output::Publisher;
use chrono::{DateTime, Utc};
use sniffer_core::access_log::TIMESTAMP_LAYOUT;
use sniffer_core::monitor::Alert;
use sniffer_core::stats::{GlobalStats, WindowStats};
use sniffer_core::tail::ReadPayload;
use std::io::{self, Write};
use std::sync::Arc;

const NO_ALERTS: &str = "No alerts detected :)";

/// Text dashboard: the last non-empty window, the running totals and the
/// last alert, redrawn whenever anything arrives.
pub struct Console {
    global: Arc<GlobalStats>,
    last_window: String,
    last_alert: String,
}

impl Console {
    pub fn new(global: Arc<GlobalStats>) -> Self {
        Self {
            global,
            last_window: String::new(),
            last_alert: NO_ALERTS.to_string(),
        }
    }

    fn frame(&self) -> String {
        format!(
            "{}{}\n{}\n",
            self.last_window,
            render_totals(&self.global.snapshot()),
            self.last_alert
        )
    }
}

impl Publisher for Console {
    fn publish_payload(&mut self, payload: &ReadPayload) -> io::Result<()> {
        // empty windows keep the previous summary on screen
        if let Some(stats) = &payload.stats {
            self.last_window =
                render_window(payload.window_start, payload.window_end, stats);
        }
        redraw(&self.frame())
    }

    fn publish_alert(&mut self, alert: &Alert) -> io::Result<()> {
        self.last_alert = alert.message.clone();
        redraw(&self.frame())
    }
}

pub fn render_window(start: DateTime<Utc>, end: DateTime<Utc>, stats: &WindowStats) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "Stats Last Captured @Time: {} (unix: {}) - {} (unix: {})\n\
         ==========================\n",
        start.format(TIMESTAMP_LAYOUT),
        start.timestamp(),
        end.format(TIMESTAMP_LAYOUT),
        end.timestamp(),
    ));

    match stats.top_section() {
        Some(top) => out.push_str(&format!(
            "Top Section: {} - Hits: {}\n",
            top.section, top.hits
        )),
        None => out.push_str("Top Section: <none>\n"),
    }

    out.push_str(&format!(
        "Requests: {} | Bytes: {}\n",
        stats.total_requests(),
        stats.total_bytes()
    ));

    out.push_str("\nResponse Codes:\n");
    for (code, hits) in stats.sorted_response_codes() {
        out.push_str(&format!("  {code:<8} {hits}\n"));
    }

    out.push_str("\nRequest Methods:\n");
    for (method, hits) in stats.sorted_methods() {
        out.push_str(&format!("  {method:<8} {hits}\n"));
    }

    out.push('\n');
    out
}

pub fn render_totals(global: &WindowStats) -> String {
    format!(
        "Total Requests Overall {} - Current Request Rate (running average): {:.2}\n\
         Total Bytes Overall {} - Average Request Bytes (running average): {:.2}\n",
        global.total_requests(),
        global.requests_average(),
        global.total_bytes(),
        global.body_size_average(),
    )
}

pub fn redraw(output: &str) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    write!(stdout, "\x1b[2J\x1b[H{output}")?;
    stdout.flush()
}
