use crate::access_log::parse_line;
use crate::stats::{SectionHits, WindowStats};
use pretty_assertions::assert_eq;

fn request(method: &str, target: &str, status: u16, bytes: u64) -> String {
    format!(
        r#"192.168.0.7 - alice [10/Oct/2000:13:55:36 -0700] "{method} {target} HTTP/1.1" {status} {bytes}"#
    )
}

#[test]
fn counts_add_up_to_the_number_of_records() {
    // Arrange
    let lines = [
        request("GET", "/api/user", 200, 10),
        request("POST", "/api/user", 201, 20),
        request("GET", "/report", 200, 30),
        request("DELETE", "/admin/x", 403, 0),
        request("GET", "/", 304, 0),
    ];
    let mut stats = WindowStats::new();

    // Act
    for line in &lines {
        stats.capture_one(&parse_line(line).expect("line should parse"));
    }

    // Assert
    let n = lines.len() as u64;
    assert_eq!(stats.total_requests(), n);
    assert_eq!(stats.sorted_sections().iter().map(|(_, h)| h).sum::<u64>(), n);
    assert_eq!(stats.sorted_methods().iter().map(|(_, h)| h).sum::<u64>(), n);
    assert_eq!(stats.sorted_response_codes().iter().map(|(_, h)| h).sum::<u64>(), n);
    assert_eq!(stats.total_bytes(), 60);
}

#[test]
fn top_section_ties_keep_the_first_to_reach_the_max() {
    // Arrange
    let mut stats = WindowStats::new();

    // Act
    stats
        .record_section("/a", 3)
        .record_section("/b", 5)
        .record_section("/c", 5);

    // Assert
    assert_eq!(
        stats.top_section(),
        Some(SectionHits {
            section: "/b".into(),
            hits: 5
        })
    );
}

#[test]
fn top_section_moves_when_strictly_overtaken() {
    let mut stats = WindowStats::new();

    stats.record_section("/a", 2).record_section("/b", 2);
    assert_eq!(stats.top_section().map(|t| t.section), Some("/a".into()));

    stats.record_section("/b", 1);
    assert_eq!(
        stats.top_section(),
        Some(SectionHits {
            section: "/b".into(),
            hits: 3
        })
    );
}

#[test]
fn top_section_hits_follow_its_counter() {
    let mut stats = WindowStats::new();

    stats.record_section("/a", 1).record_section("/a", 4);

    assert_eq!(stats.top_section().map(|t| t.hits), Some(5));
}

#[test]
fn empty_window_has_no_top_section() {
    let stats = WindowStats::new();

    assert_eq!(stats.top_section(), None);
    assert_eq!(stats.total_requests(), 0);
    assert_eq!(stats.requests_average(), 0.0);
}

#[test]
fn merge_into_zero_totals_copies_counts() {
    // Arrange
    let mut window = WindowStats::new();
    window.record_request(7).record_section("/x", 7);
    let mut total = WindowStats::new();

    // Act
    window.merge_into(&mut total);

    // Assert
    assert_eq!(total.total_requests(), 7);
    assert_eq!(total.section_hits("/x"), 7);
    assert_eq!(total.top_section().map(|t| t.section), Some("/x".into()));
}

#[test]
fn merge_accumulates_across_windows() {
    // Arrange
    let mut first = WindowStats::new();
    first
        .record_request(2)
        .record_section("/api", 2)
        .record_method("GET", 2)
        .record_response_code("200", 2)
        .record_body_size(100);

    let mut second = WindowStats::new();
    second
        .record_request(1)
        .record_section("/admin", 1)
        .record_method("POST", 1)
        .record_response_code("500", 1)
        .record_body_size(50);

    let mut total = WindowStats::new();

    // Act
    first.merge_into(&mut total);
    second.merge_into(&mut total);

    // Assert
    assert_eq!(total.total_requests(), 3);
    assert_eq!(total.total_bytes(), 150);
    assert_eq!(total.sorted_methods(), vec![("GET", 2), ("POST", 1)]);
    assert_eq!(total.sorted_response_codes(), vec![("200", 2), ("500", 1)]);
    assert_eq!(total.sorted_sections(), vec![("/admin", 1), ("/api", 2)]);
    assert_eq!(total.top_section().map(|t| t.section), Some("/api".into()));
    // one sample per merged window
    let expected_avg = 1.0 * crate::stats::Ewma::DECAY + 2.0 * (1.0 - crate::stats::Ewma::DECAY);
    assert!((total.requests_average() - expected_avg).abs() < 1e-9);
}

#[test]
fn merge_keeps_the_window_tie_winner_on_top() {
    // Arrange
    let mut window = WindowStats::new();
    for section in ["/m", "/a", "/z", "/k", "/q"] {
        window.record_section(section, 1);
    }

    for _ in 0..20 {
        let mut total = WindowStats::new();

        // Act
        window.merge_into(&mut total);

        // Assert
        assert_eq!(total.top_section().map(|t| t.section), Some("/m".into()));
    }
}

#[test]
fn counters_saturate_instead_of_wrapping() {
    let mut stats = WindowStats::new();

    stats.record_request(u64::MAX).record_request(1);
    stats.record_body_size(u64::MAX).record_body_size(10);

    assert_eq!(stats.total_requests(), u64::MAX);
    assert_eq!(stats.total_bytes(), u64::MAX);
}

#[test]
fn single_window_end_to_end_counts() {
    // Arrange
    let lines = [
        request("GET", "/api/x", 200, 100),
        request("GET", "/api/x", 200, 100),
        request("GET", "/api/y", 404, 50),
    ];
    let mut stats = WindowStats::new();

    // Act
    for line in &lines {
        stats.capture_one(&parse_line(line).expect("line should parse"));
    }

    // Assert
    assert_eq!(stats.total_requests(), 3);
    assert_eq!(
        stats.top_section(),
        Some(SectionHits {
            section: "/api".into(),
            hits: 3
        })
    );
    assert_eq!(stats.response_code_hits(200), 2);
    assert_eq!(stats.response_code_hits(404), 1);
    assert_eq!(stats.sorted_methods(), vec![("GET", 3)]);
    assert_eq!(stats.total_bytes(), 250);
}
