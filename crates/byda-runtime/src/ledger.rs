//! Durable, idempotent record of completed jobs.

use std::path::PathBuf;

use anyhow::{Context, Result};

use byda_core::write_text_atomic;
use byda_jobs::ledger_format::{parse_ledger, render_ledger, LedgerSnapshot};

/// File-backed processed-job ledger.
///
/// Loading never fails: an absent file yields an empty ledger and a
/// malformed one is logged and degraded to whatever parses, so the engine
/// keeps running rather than halting on persistence damage. Writes go
/// through temp-file + rename so a crash mid-write cannot corrupt
/// previously-recorded entries.
pub struct JobLedgerStore {
    path: PathBuf,
    snapshot: LedgerSnapshot,
}

impl JobLedgerStore {
    pub fn load(path: PathBuf) -> Self {
        let snapshot = match std::fs::read_to_string(&path) {
            Ok(text) => parse_ledger(&text),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => LedgerSnapshot::default(),
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "failed to read ledger, starting empty");
                LedgerSnapshot::default()
            }
        };
        Self { path, snapshot }
    }

    pub fn is_processed(&self, job_number: u32) -> bool {
        self.snapshot.processed_jobs.contains(&job_number)
    }

    pub fn processed_count(&self) -> usize {
        self.snapshot.job_count
    }

    /// Records a completed job and persists atomically. No-op (and no write)
    /// when the job is already recorded. Returns true when newly recorded.
    pub fn mark_complete(&mut self, job_number: u32) -> Result<bool> {
        if !self.snapshot.record(job_number) {
            return Ok(false);
        }
        write_text_atomic(&self.path, &render_ledger(&self.snapshot))
            .with_context(|| format!("failed to persist ledger {}", self.path.display()))?;
        Ok(true)
    }
}
