use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One numbered Q&A section of a study guide.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QaEntry {
    pub id: u32,
    pub title: String,
    /// Prose body with code fences stripped out.
    pub answer: String,
    pub snippets: Vec<Snippet>,
}

impl QaEntry {
    /// An entry counts as answered when it carries prose or at least one
    /// non-whitespace snippet.
    pub fn has_answer(&self) -> bool {
        !self.answer.trim().is_empty()
            || self.snippets.iter().any(|s| !s.source.trim().is_empty())
    }

    pub fn answer_words(&self) -> usize {
        self.answer.split_whitespace().count()
    }
}

/// An embedded script inside a Q&A entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snippet {
    /// Fence language tag, may be empty.
    pub lang: String,
    pub source: String,
}

/// The exporter's in-memory counter set at one instant.
#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    pub polls_total: u64,
    pub poll_errors_total: u64,
    /// Latest numeric fields scraped from the endpoint.
    pub gauges: HashMap<String, f64>,
    pub last_success: Option<DateTime<Utc>>,
}

/// One watchdog observation of system-wide CPU usage.
#[derive(Debug, Clone, Copy)]
pub struct CpuSample {
    pub cpu_percent: f32,
    pub taken_at: DateTime<Utc>,
}
