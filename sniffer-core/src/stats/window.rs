use crate::access_log::LogRecord;
use crate::stats::Ewma;
use ahash::RandomState;
use serde::Serialize;
use std::collections::HashMap;

type HitMap = HashMap<String, u64, RandomState>;

/// The busiest section seen so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionHits {
    pub section: String,
    pub hits: u64,
}

/// Traffic counters for one window (or, inside [`GlobalStats`], for the
/// whole process lifetime).
///
/// Counters saturate at `u64::MAX` instead of wrapping.
///
/// [`GlobalStats`]: crate::stats::GlobalStats
#[derive(Debug, Clone, Default, Serialize)]
pub struct WindowStats {
    total_requests: u64,
    requests_average: Ewma,
    sections: HitMap,
    top_section: Option<String>,
    response_codes: HitMap,
    methods: HitMap,
    total_bytes: u64,
    body_size_average: Ewma,
}

impl WindowStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&mut self, n: u64) -> &mut Self {
        self.total_requests = self.total_requests.saturating_add(n);
        self.requests_average.add(n as f64);
        self
    }

    /// Add `n` hits to `section`. The top section only changes hands when
    /// another section strictly overtakes it.
    pub fn record_section(&mut self, section: &str, n: u64) -> &mut Self {
        let hits = bump(&mut self.sections, section, n);

        let top_hits = self
            .top_section
            .as_ref()
            .and_then(|top| self.sections.get(top))
            .copied()
            .unwrap_or(0);

        if hits > top_hits {
            self.top_section = Some(section.to_string());
        }
        self
    }

    pub fn record_response_code(&mut self, code: &str, n: u64) -> &mut Self {
        bump(&mut self.response_codes, code, n);
        self
    }

    pub fn record_method(&mut self, method: &str, n: u64) -> &mut Self {
        bump(&mut self.methods, method, n);
        self
    }

    pub fn record_body_size(&mut self, size: u64) -> &mut Self {
        self.total_bytes = self.total_bytes.saturating_add(size);
        self.body_size_average.add(size as f64);
        self
    }

    pub fn capture_one(&mut self, record: &LogRecord) -> &mut Self {
        self.record_request(1)
            .record_section(&record.section, 1)
            .record_response_code(&record.response_code.to_string(), 1)
            .record_method(&record.method, 1)
            .record_body_size(record.body_size)
    }

    /// Replay these totals into `target` through its update operations.
    ///
    /// The window total and the window byte count each land in `target`'s
    /// moving averages as a single sample.
    pub fn merge_into<'a>(&self, target: &'a mut WindowStats) -> &'a mut WindowStats {
        target.record_request(self.total_requests);

        // the window's own top section goes first so it also wins ties
        // in `target`
        if let Some(top) = &self.top_section {
            target.record_section(top, self.section_hits(top));
        }
        for (section, hits) in &self.sections {
            if self.top_section.as_ref() != Some(section) {
                target.record_section(section, *hits);
            }
        }
        for (code, hits) in &self.response_codes {
            target.record_response_code(code, *hits);
        }
        for (method, hits) in &self.methods {
            target.record_method(method, *hits);
        }

        target.record_body_size(self.total_bytes)
    }

    pub fn total_requests(&self) -> u64 {
        self.total_requests
    }

    pub fn requests_average(&self) -> f64 {
        self.requests_average.value()
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    pub fn body_size_average(&self) -> f64 {
        self.body_size_average.value()
    }

    pub fn top_section(&self) -> Option<SectionHits> {
        let section = self.top_section.as_ref()?;
        Some(SectionHits {
            section: section.clone(),
            hits: self.section_hits(section),
        })
    }

    pub fn section_hits(&self, section: &str) -> u64 {
        self.sections.get(section).copied().unwrap_or(0)
    }

    pub fn response_code_hits(&self, code: u16) -> u64 {
        self.response_codes
            .get(&code.to_string())
            .copied()
            .unwrap_or(0)
    }

    pub fn method_hits(&self, method: &str) -> u64 {
        self.methods.get(method).copied().unwrap_or(0)
    }

    pub fn sorted_sections(&self) -> Vec<(&str, u64)> {
        sorted(&self.sections)
    }

    pub fn sorted_response_codes(&self) -> Vec<(&str, u64)> {
        sorted(&self.response_codes)
    }

    pub fn sorted_methods(&self) -> Vec<(&str, u64)> {
        sorted(&self.methods)
    }
}

/// Create-or-update a counter, returning its new value.
fn bump(map: &mut HitMap, key: &str, n: u64) -> u64 {
    match map.get_mut(key) {
        Some(hits) => {
            *hits = hits.saturating_add(n);
            *hits
        }
        None => {
            map.insert(key.to_string(), n);
            n
        }
    }
}

// HashMap iteration order is random; rendering wants it stable.
fn sorted(map: &HitMap) -> Vec<(&str, u64)> {
    let mut out: Vec<_> = map.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    out.sort_unstable_by(|a, b| a.0.cmp(b.0));
    out
}
