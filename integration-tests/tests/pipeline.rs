use integration_tests::harness::{TestLogFile, access_line};
use pretty_assertions::assert_eq;
use sniffer_core::Pipeline;
use sniffer_core::conf::MonitorConfig;
use sniffer_core::monitor::TrafficMonitor;
use sniffer_core::stats::{GlobalStats, SectionHits};
use sniffer_core::tail::{ReadPayload, TailError, Tailer};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

const WAIT: Duration = Duration::from_secs(10);

fn config(log: &TestLogFile) -> MonitorConfig {
    MonitorConfig {
        log_file: log.path().to_path_buf(),
        stats_interval_secs: 1,
        ..MonitorConfig::default()
    }
}

async fn next_non_empty(payloads: &mut mpsc::Receiver<ReadPayload>) -> ReadPayload {
    loop {
        let payload = timeout(WAIT, payloads.recv())
            .await
            .expect("payload should arrive")
            .expect("snapshot stream should be open");
        if !payload.is_empty() {
            return payload;
        }
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn window_summary_end_to_end() {
    // Arrange
    let log = TestLogFile::new();
    let cancel = CancellationToken::new();
    let mut pipeline = Pipeline::start(&config(&log), cancel.clone())
        .await
        .expect("pipeline should start");

    // Act
    log.append(&[
        access_line("GET", "/api/x", 200, 100),
        access_line("GET", "/api/x", 200, 100),
        access_line("GET", "/api/y", 404, 50),
    ]);
    let payload = next_non_empty(&mut pipeline.payloads).await;

    // Assert
    let stats = payload.stats.expect("non-empty window has stats");
    assert_eq!(stats.total_requests(), 3);
    assert_eq!(
        stats.top_section(),
        Some(SectionHits {
            section: "/api".into(),
            hits: 3
        })
    );
    assert_eq!(stats.sorted_response_codes(), vec![("200", 2), ("404", 1)]);
    assert_eq!(stats.sorted_methods(), vec![("GET", 3)]);
    assert_eq!(stats.total_bytes(), 250);
    assert_eq!(payload.records.len(), 3);
    assert_eq!(payload.records[2].target, "/api/y");

    cancel.cancel();
}

#[tokio::test]
async fn missing_log_file_fails_to_start() {
    let dir = tempfile::tempdir().unwrap();
    let config = MonitorConfig {
        log_file: dir.path().join("does-not-exist.log"),
        ..MonitorConfig::default()
    };

    let result = Pipeline::start(&config, CancellationToken::new()).await;

    assert!(matches!(result, Err(TailError::Open { .. })));
}

#[tokio::test(flavor = "multi_thread")]
async fn quiet_windows_are_still_delivered() {
    // Arrange
    let log = TestLogFile::new();
    let cancel = CancellationToken::new();
    let mut pipeline = Pipeline::start(&config(&log), cancel.clone())
        .await
        .unwrap();

    // Act
    let first = timeout(WAIT, pipeline.payloads.recv()).await.unwrap().unwrap();
    let second = timeout(WAIT, pipeline.payloads.recv()).await.unwrap().unwrap();

    // Assert
    for payload in [&first, &second] {
        assert!(payload.stats.is_none());
        assert!(payload.records.is_empty());
    }
    assert!(first.window_end <= second.window_start);

    cancel.cancel();
}

#[tokio::test(flavor = "multi_thread")]
async fn shutdown_closes_both_ports_once() {
    // Arrange
    let log = TestLogFile::new();
    let cancel = CancellationToken::new();
    let Pipeline {
        mut payloads,
        mut alerts,
        tasks,
        ..
    } = Pipeline::start(&config(&log), cancel.clone()).await.unwrap();

    // Act
    cancel.cancel();
    let joined = timeout(WAIT, tasks.join()).await.unwrap();

    // Assert
    assert!(joined.is_ok());
    assert!(payloads.recv().await.is_none());
    assert!(alerts.recv().await.is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn cumulative_totals_span_windows() {
    // Arrange
    let log = TestLogFile::new();
    let cancel = CancellationToken::new();
    let mut pipeline = Pipeline::start(&config(&log), cancel.clone())
        .await
        .unwrap();

    // Act
    log.append(&[access_line("GET", "/a", 200, 10)]);
    next_non_empty(&mut pipeline.payloads).await;
    log.append(&[
        access_line("POST", "/b", 201, 20),
        access_line("POST", "/b", 201, 20),
    ]);
    next_non_empty(&mut pipeline.payloads).await;
    // merges run detached from the snapshot send
    timeout(WAIT, async {
        while pipeline.global.total_requests() < 3 {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    })
    .await
    .expect("all windows should be merged");

    // Assert
    let global = pipeline.global.snapshot();
    assert_eq!(global.total_requests(), 3);
    assert_eq!(global.total_bytes(), 50);
    assert_eq!(global.sorted_methods(), vec![("GET", 1), ("POST", 2)]);
    assert_eq!(global.top_section().map(|t| t.section), Some("/b".into()));

    cancel.cancel();
}

#[tokio::test(flavor = "multi_thread")]
async fn truncated_log_keeps_being_followed() {
    // Arrange
    let log = TestLogFile::new();
    let cancel = CancellationToken::new();
    let mut pipeline = Pipeline::start(&config(&log), cancel.clone())
        .await
        .unwrap();
    log.append(&[access_line("GET", "/before", 200, 1)]);
    next_non_empty(&mut pipeline.payloads).await;

    // Act
    log.truncate();
    log.append(&[access_line("GET", "/z", 200, 1)]);
    let payload = next_non_empty(&mut pipeline.payloads).await;

    // Assert
    assert_eq!(payload.records.len(), 1);
    assert_eq!(payload.records[0].section, "/z");

    cancel.cancel();
}

#[tokio::test(flavor = "multi_thread")]
async fn sustained_traffic_raises_alerts() {
    // Arrange
    let log = TestLogFile::new();
    let cancel = CancellationToken::new();
    let global = Arc::new(GlobalStats::new());

    let following = Tailer::new(Duration::from_millis(200), global.clone())
        .open(log.path())
        .await
        .unwrap();
    let monitor = TrafficMonitor::new(1.0, Duration::from_millis(300), global.clone());

    let (payload_tx, mut payloads) = mpsc::channel(1);
    let (alert_tx, mut alerts) = mpsc::channel(1);
    tokio::spawn(following.run(payload_tx, cancel.clone()));
    tokio::spawn(monitor.run(alert_tx, cancel.clone()));
    // keep the snapshot port drained so the tailer never stalls
    tokio::spawn(async move { while payloads.recv().await.is_some() {} });

    // Act
    let lines: Vec<String> = (0..10)
        .map(|i| access_line("GET", &format!("/page/{i}"), 200, 512))
        .collect();
    log.append(&lines);
    let first = timeout(WAIT, alerts.recv()).await.unwrap();
    let second = timeout(WAIT, alerts.recv()).await.unwrap();

    // Assert
    let first = first.expect("alert expected");
    assert!(first.message.starts_with("High traffic generated an alert - hits = "));
    assert_eq!(first.data.as_ref().map(|d| d.threshold), Some(1.0));
    assert!(second.is_some(), "alerts repeat while over threshold");

    cancel.cancel();
    // at most one alert can still be buffered
    let drained = timeout(WAIT, async { while alerts.recv().await.is_some() {} }).await;
    assert!(drained.is_ok(), "alert channel closes on shutdown");
}
