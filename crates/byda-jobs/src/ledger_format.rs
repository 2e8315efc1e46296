//! Text format for the processed-job ledger.
//!
//! The persisted form is a small hand-editable key-value file:
//!
//! ```text
//! [Statistics]
//! processed_jobs = 12345678,87654321
//! job_count = 2
//! ```
//!
//! Parsing is tolerant: unknown lines are ignored, non-numeric entries in
//! `processed_jobs` are skipped, and a missing or inconsistent `job_count`
//! falls back to the set size.

use std::collections::BTreeSet;

/// Section header carrying the ledger keys.
pub const STATISTICS_SECTION: &str = "[Statistics]";

/// In-memory form of the ledger file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerSnapshot {
    pub processed_jobs: BTreeSet<u32>,
    pub job_count: usize,
}

impl LedgerSnapshot {
    /// Inserts a job number and recomputes the count. Returns false when the
    /// job was already recorded.
    pub fn record(&mut self, job_number: u32) -> bool {
        let inserted = self.processed_jobs.insert(job_number);
        self.job_count = self.processed_jobs.len();
        inserted
    }
}

/// Parses ledger text. Never fails; unparseable content degrades to defaults.
pub fn parse_ledger(text: &str) -> LedgerSnapshot {
    let mut processed_jobs = BTreeSet::new();
    let mut job_count = None;
    let mut in_statistics = false;

    for line in text.lines() {
        let line = line.trim();
        if line.starts_with('[') {
            in_statistics = line.eq_ignore_ascii_case(STATISTICS_SECTION);
            continue;
        }
        if !in_statistics {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        match key.trim() {
            "processed_jobs" => {
                processed_jobs = value
                    .split(',')
                    .filter_map(|entry| entry.trim().parse::<u32>().ok())
                    .collect();
            }
            "job_count" => {
                job_count = value.trim().parse::<usize>().ok();
            }
            _ => {}
        }
    }

    let job_count = job_count.unwrap_or(processed_jobs.len());
    LedgerSnapshot {
        processed_jobs,
        job_count,
    }
}

/// Renders the ledger file body.
pub fn render_ledger(snapshot: &LedgerSnapshot) -> String {
    let processed = snapshot
        .processed_jobs
        .iter()
        .map(|job| job.to_string())
        .collect::<Vec<_>>()
        .join(",");
    format!(
        "{STATISTICS_SECTION}\nprocessed_jobs = {processed}\njob_count = {}\n",
        snapshot.job_count
    )
}
