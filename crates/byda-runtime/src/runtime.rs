//! Sweep scheduler: discovery through ledger update, on a fixed interval.

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use tokio::sync::watch;

use crate::collector::ArtifactCollector;
use crate::coversheet::{CoversheetError, PdfTextExtractor};
use crate::discovery::{discover_job_numbers, scan_window};
use crate::evaluation::evaluate_workspace;
use crate::ledger::JobLedgerStore;
use crate::message_source::MessageSource;
use crate::notify::NotificationSink;

/// How often the inter-sweep sleep re-checks the cancellation flag, so a
/// shutdown request is honoured with bounded latency.
const CANCEL_CHECK_INTERVAL: Duration = Duration::from_secs(5);

/// Runtime configuration for the organiser sweep loop.
#[derive(Debug, Clone)]
pub struct OrganiserConfig {
    pub target_dir: PathBuf,
    pub ledger_path: PathBuf,
    pub lookback_days: i64,
    pub sweep_interval: Duration,
    /// Run a single sweep and exit.
    pub sweep_once: bool,
    /// Connectivity probe hit once at startup; `None` skips the probe.
    pub probe_url: Option<String>,
    pub probe_timeout: Duration,
}

/// Counters for one full discovery-through-evaluation pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SweepReport {
    pub discovered_jobs: usize,
    pub skipped_processed: usize,
    pub completed_jobs: usize,
    pub unresolved_jobs: usize,
    pub failed_jobs: usize,
}

enum JobStatus {
    Completed,
    Unresolved,
}

/// Single-worker sweep engine. One sweep processes each discovered job
/// sequentially; jobs already in the ledger are never reconsidered.
pub struct OrganiserRuntime {
    config: OrganiserConfig,
    source: Arc<dyn MessageSource>,
    extractor: Arc<dyn PdfTextExtractor>,
    notifier: Arc<dyn NotificationSink>,
    ledger: JobLedgerStore,
    cancel: watch::Receiver<bool>,
}

impl OrganiserRuntime {
    pub fn new(
        config: OrganiserConfig,
        source: Arc<dyn MessageSource>,
        extractor: Arc<dyn PdfTextExtractor>,
        notifier: Arc<dyn NotificationSink>,
        cancel: watch::Receiver<bool>,
    ) -> Self {
        let ledger = JobLedgerStore::load(config.ledger_path.clone());
        Self {
            config,
            source,
            extractor,
            notifier,
            ledger,
            cancel,
        }
    }

    /// Runs sweeps until cancelled (or after one sweep with `sweep_once`).
    ///
    /// Only an unreachable message source at startup is fatal; per-job
    /// failures degrade to "not complete, retry next sweep".
    pub async fn run(&mut self) -> Result<()> {
        if let Some(url) = self.config.probe_url.clone() {
            if let Err(error) = check_connectivity(&url, self.config.probe_timeout).await {
                self.notifier.notify(
                    "Cannot Connect to Online Services",
                    "Please ensure an active internet connection is available and try again.",
                );
                return Err(error);
            }
            tracing::info!("connected to online services");
        }

        loop {
            if *self.cancel.borrow() {
                tracing::info!("shutdown requested, stopping before next sweep");
                return Ok(());
            }
            match self.sweep_once() {
                Ok(report) => {
                    println!(
                        "sweep complete: discovered={} skipped_processed={} completed={} unresolved={} failed={}",
                        report.discovered_jobs,
                        report.skipped_processed,
                        report.completed_jobs,
                        report.unresolved_jobs,
                        report.failed_jobs
                    );
                }
                Err(error) => {
                    eprintln!("sweep error: {error:#}");
                }
            }
            if self.config.sweep_once {
                return Ok(());
            }
            if !self.sleep_between_sweeps().await {
                tracing::info!("shutdown requested during sleep");
                return Ok(());
            }
        }
    }

    /// One full discovery → collect → evaluate → ledger pass.
    pub fn sweep_once(&mut self) -> Result<SweepReport> {
        let window = scan_window(self.config.lookback_days);
        let job_numbers = discover_job_numbers(self.source.as_ref(), &window)?;

        let mut report = SweepReport {
            discovered_jobs: job_numbers.len(),
            ..SweepReport::default()
        };

        for job_number in job_numbers {
            if self.ledger.is_processed(job_number) {
                tracing::debug!(job_number, "job already completed, skipping");
                report.skipped_processed += 1;
                continue;
            }
            match self.process_job(job_number, &window) {
                Ok(JobStatus::Completed) => report.completed_jobs += 1,
                Ok(JobStatus::Unresolved) => report.unresolved_jobs += 1,
                Err(error) => {
                    report.failed_jobs += 1;
                    tracing::warn!(job_number, %error, "job processing failed, will retry next sweep");
                }
            }
        }
        Ok(report)
    }

    fn process_job(
        &mut self,
        job_number: u32,
        window: &crate::discovery::ScanWindow,
    ) -> Result<JobStatus> {
        tracing::info!(job_number, "processing job");

        let collector = ArtifactCollector::new(
            self.source.as_ref(),
            &self.config.target_dir,
            window,
        );
        let Some(collected) = collector.collect(job_number)? else {
            tracing::info!(job_number, "no coversheet message yet, retrying next sweep");
            return Ok(JobStatus::Unresolved);
        };

        let expected = match crate::coversheet::read_expected_providers(
            &collected.workspace,
            job_number,
            self.extractor.as_ref(),
        ) {
            Ok(expected) => expected,
            Err(error @ (CoversheetError::Missing(_) | CoversheetError::Empty(_))) => {
                tracing::info!(job_number, %error, "coversheet unavailable, retrying next sweep");
                return Ok(JobStatus::Unresolved);
            }
            Err(CoversheetError::Unreadable(error)) => {
                return Err(error.context("coversheet analysis failed"));
            }
        };

        let outcome = evaluate_workspace(&collected.workspace, &expected)?;

        if collected.kdr_identified {
            self.notifier.notify(
                &format!("NOTICE: Job {job_number}"),
                "KDR Victoria services have been identified.",
            );
        }
        if outcome.dwf_identified {
            self.notifier.notify(
                &format!("NOTICE: Job {job_number}"),
                "A .dwf Telstra plan has been identified.",
            );
        }

        if !outcome.complete {
            tracing::info!(
                job_number,
                missing = outcome.missing.len(),
                "provider plans still outstanding"
            );
            return Ok(JobStatus::Unresolved);
        }

        // A failed ledger write is not fatal: the workspace already satisfies
        // completeness, so the next sweep re-evaluates cheaply and retries.
        if let Err(error) = self.ledger.mark_complete(job_number) {
            tracing::warn!(job_number, %error, "ledger write failed, job will be re-verified");
        }
        self.notifier.notify(
            &format!("NOTICE: Job {job_number}"),
            "Processing is complete. All service provider plans have been received.",
        );
        Ok(JobStatus::Completed)
    }

    /// Sleeps the sweep interval in short increments, returning false as soon
    /// as cancellation is requested.
    async fn sleep_between_sweeps(&mut self) -> bool {
        let mut remaining = self.config.sweep_interval;
        while !remaining.is_zero() {
            if *self.cancel.borrow() {
                return false;
            }
            let step = remaining.min(CANCEL_CHECK_INTERVAL);
            tokio::select! {
                changed = self.cancel.changed() => {
                    if changed.is_err() || *self.cancel.borrow() {
                        return false;
                    }
                }
                _ = tokio::time::sleep(step) => {
                    remaining = remaining.saturating_sub(step);
                }
            }
        }
        true
    }
}

/// Verifies the message-source network is reachable.
pub async fn check_connectivity(url: &str, timeout: Duration) -> Result<()> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .context("failed to build connectivity probe client")?;
    client
        .get(url)
        .send()
        .await
        .with_context(|| format!("failed to reach {url}"))?;
    Ok(())
}
