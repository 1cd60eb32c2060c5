use crate::stats::{GlobalStats, WindowStats};
use std::sync::Arc;
use std::thread;

fn window(requests: u64, section: &str) -> WindowStats {
    let mut stats = WindowStats::new();
    stats
        .record_request(requests)
        .record_section(section, requests)
        .record_method("GET", requests)
        .record_body_size(requests * 10);
    stats
}

#[test]
fn merge_into_fresh_global_stats() {
    // Arrange
    let global = GlobalStats::new();

    // Act
    global.merge(&window(7, "/x"));

    // Assert
    let snapshot = global.snapshot();
    assert_eq!(global.total_requests(), 7);
    assert_eq!(snapshot.section_hits("/x"), 7);
}

#[test]
fn update_goes_through_the_lock() {
    let global = GlobalStats::new();

    global.update(|s| {
        s.record_request(0).record_body_size(0);
    });

    let snapshot = global.snapshot();
    assert_eq!(snapshot.total_requests(), 0);
    assert_eq!(snapshot.total_bytes(), 0);
}

#[test]
fn concurrent_merges_sum_exactly() {
    // Arrange
    let global = Arc::new(GlobalStats::new());
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let global = global.clone();
            thread::spawn(move || {
                for _ in 0..100 {
                    global.merge(&window(3, if i % 2 == 0 { "/even" } else { "/odd" }));
                }
            })
        })
        .collect();

    // Act
    for handle in handles {
        handle.join().unwrap();
    }

    // Assert
    let snapshot = global.snapshot();
    assert_eq!(snapshot.total_requests(), 8 * 100 * 3);
    assert_eq!(snapshot.section_hits("/even"), 4 * 100 * 3);
    assert_eq!(snapshot.section_hits("/odd"), 4 * 100 * 3);
    assert_eq!(snapshot.method_hits("GET"), 8 * 100 * 3);
    assert_eq!(snapshot.total_bytes(), 8 * 100 * 30);
}
