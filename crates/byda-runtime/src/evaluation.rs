//! Completion evaluation against the workspace, with its file side effects.

use std::path::Path;

use anyhow::{Context, Result};
use walkdir::WalkDir;

use byda_core::write_text_atomic;
use byda_jobs::completion::{evaluate, render_missing_report};

use crate::collector::EMAIL_FILES_DIR;

/// Report file listing missing respondents; deleted once the job completes.
pub const MISSING_REPORT_FILE: &str = "Missing Providers.txt";

/// Verdict and side signals for one evaluated job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobOutcome {
    pub complete: bool,
    pub missing: Vec<String>,
    /// A `.dwf` file anywhere under the workspace; drives the Telstra-plan
    /// notice, independent of the verdict.
    pub dwf_identified: bool,
}

/// Lists respondent folder names in the workspace, excluding the message
/// archive folder.
pub fn list_respondent_folders(workspace: &Path) -> Result<Vec<String>> {
    let mut folders = Vec::new();
    for entry in std::fs::read_dir(workspace)
        .with_context(|| format!("failed to read {}", workspace.display()))?
    {
        let entry = entry.with_context(|| format!("failed to scan {}", workspace.display()))?;
        if !entry
            .file_type()
            .with_context(|| format!("failed to stat {}", entry.path().display()))?
            .is_dir()
        {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.eq_ignore_ascii_case(EMAIL_FILES_DIR) {
            continue;
        }
        folders.push(name);
    }
    Ok(folders)
}

fn has_dwf_plan(workspace: &Path) -> bool {
    WalkDir::new(workspace)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .any(|entry| {
            entry
                .path()
                .extension()
                .map(|extension| extension.eq_ignore_ascii_case("dwf"))
                .unwrap_or(false)
        })
}

/// Diffs the expected list against present respondent folders, maintains the
/// missing-provider report file, and gathers side signals.
///
/// On an incomplete verdict the report file is (re)written title-cased; on a
/// complete verdict any pre-existing report file is removed so its absence
/// doubles as a durable completeness signal next to the ledger.
pub fn evaluate_workspace(workspace: &Path, expected: &[String]) -> Result<JobOutcome> {
    let present = list_respondent_folders(workspace)?;
    let report = evaluate(expected, &present);

    let report_path = workspace.join(MISSING_REPORT_FILE);
    if report.complete {
        match std::fs::remove_file(&report_path) {
            Ok(()) => {}
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {}
            Err(error) => {
                return Err(error).with_context(|| {
                    format!("failed to remove report {}", report_path.display())
                });
            }
        }
    } else {
        write_text_atomic(&report_path, &render_missing_report(&report.missing))?;
    }

    Ok(JobOutcome {
        complete: report.complete,
        dwf_identified: has_dwf_plan(workspace),
        missing: report.missing,
    })
}
