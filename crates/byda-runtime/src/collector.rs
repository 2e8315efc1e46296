//! Materialises a job's on-disk workspace from the mailbox.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use byda_jobs::provider::{is_kdr_provider, provider_folder_name};
use byda_jobs::subject::{
    is_coversheet_subject, normalize_sender_address, sanitize_file_name, subject_mentions_job,
    CANONICAL_SENDER_ADDRESS,
};

use crate::discovery::ScanWindow;
use crate::message_source::{MailMessage, MessageSource};

/// Subfolder holding archived copies of every matching message.
pub const EMAIL_FILES_DIR: &str = "E-Mail Files";

/// Result of collecting one job's artifacts.
#[derive(Debug, Clone)]
pub struct CollectedArtifacts {
    pub workspace: PathBuf,
    /// Set when KDR Victoria appears among the senders; drives a dedicated
    /// notice independent of completeness.
    pub kdr_identified: bool,
}

/// Wipes an existing workspace back to empty, or creates it.
///
/// Destructive by design: re-running collection for an unfinished job always
/// starts from the current message set instead of trusting stale partial
/// state. Callers must not invoke this for ledger-completed jobs.
pub fn reset_workspace(workspace: &Path) -> Result<()> {
    if !workspace.exists() {
        std::fs::create_dir_all(workspace)
            .with_context(|| format!("failed to create {}", workspace.display()))?;
        return Ok(());
    }
    for entry in std::fs::read_dir(workspace)
        .with_context(|| format!("failed to read {}", workspace.display()))?
    {
        let entry = entry.with_context(|| format!("failed to scan {}", workspace.display()))?;
        let path = entry.path();
        if entry
            .file_type()
            .with_context(|| format!("failed to stat {}", path.display()))?
            .is_dir()
        {
            std::fs::remove_dir_all(&path)
                .with_context(|| format!("failed to remove {}", path.display()))?;
        } else {
            std::fs::remove_file(&path)
                .with_context(|| format!("failed to remove {}", path.display()))?;
        }
    }
    Ok(())
}

/// Collects messages and attachments for single jobs into workspaces under a
/// target directory.
pub struct ArtifactCollector<'a> {
    source: &'a dyn MessageSource,
    target_dir: &'a Path,
    window: &'a ScanWindow,
}

impl<'a> ArtifactCollector<'a> {
    pub fn new(source: &'a dyn MessageSource, target_dir: &'a Path, window: &'a ScanWindow) -> Self {
        Self {
            source,
            target_dir,
            window,
        }
    }

    /// Builds the workspace for `job_number` from the current message set.
    ///
    /// Returns `Ok(None)` when no coversheet-bearing message names the job,
    /// in which case there is nothing to materialise yet. Individual message
    /// and attachment failures are logged and skipped; they never abort the
    /// job.
    pub fn collect(&self, job_number: u32) -> Result<Option<CollectedArtifacts>> {
        let messages = self.source.messages()?;

        let candidates = self.coversheet_workspaces(job_number, &messages);
        let Some(workspace) = candidates.last().cloned() else {
            return Ok(None);
        };
        // Each distinct coversheet subject gets a directory; artifacts land
        // in the one named by the last coversheet message seen.
        for candidate in &candidates[..candidates.len() - 1] {
            std::fs::create_dir_all(candidate)
                .with_context(|| format!("failed to create {}", candidate.display()))?;
        }
        reset_workspace(&workspace)?;

        let matching = messages
            .iter()
            .filter(|message| {
                subject_mentions_job(&message.subject(), job_number)
                    && self.window.contains(message.received_at())
            })
            .collect::<Vec<_>>();

        self.archive_messages(job_number, &workspace, &matching);
        let kdr_identified = self.extract_attachments(job_number, &workspace, &matching);
        self.relocate_coversheet(job_number, &workspace)?;

        Ok(Some(CollectedArtifacts {
            workspace,
            kdr_identified,
        }))
    }

    /// Workspace directories named by coversheet-bearing messages, deduped,
    /// ordered so the last coversheet message seen comes last.
    fn coversheet_workspaces(
        &self,
        job_number: u32,
        messages: &[std::sync::Arc<dyn MailMessage>],
    ) -> Vec<PathBuf> {
        let mut candidates: Vec<PathBuf> = Vec::new();
        for message in messages {
            if normalize_sender_address(&message.sender_address()) != CANONICAL_SENDER_ADDRESS {
                continue;
            }
            if !self.window.contains(message.received_at()) {
                continue;
            }
            let subject = message.subject();
            if !is_coversheet_subject(&subject, job_number) {
                continue;
            }
            let name = sanitize_file_name(&subject);
            if name.is_empty() {
                continue;
            }
            let path = self.target_dir.join(name);
            candidates.retain(|existing| existing != &path);
            candidates.push(path);
        }
        candidates
    }

    fn archive_messages(
        &self,
        job_number: u32,
        workspace: &Path,
        matching: &[&std::sync::Arc<dyn MailMessage>],
    ) {
        let archive_dir = workspace.join(EMAIL_FILES_DIR);
        for message in matching {
            let result = (|| -> Result<()> {
                std::fs::create_dir_all(&archive_dir)
                    .with_context(|| format!("failed to create {}", archive_dir.display()))?;
                let file_name = format!("{}.msg", sanitize_file_name(&message.subject()));
                message.save_to(&archive_dir.join(file_name))
            })();
            if let Err(error) = result {
                tracing::warn!(job_number, %error, "failed to archive message, skipping");
            }
        }
    }

    /// Saves attachments into per-provider folders. Returns the KDR flag.
    fn extract_attachments(
        &self,
        job_number: u32,
        workspace: &Path,
        matching: &[&std::sync::Arc<dyn MailMessage>],
    ) -> bool {
        let mut kdr_identified = false;
        for message in matching {
            let provider = provider_folder_name(&message.sender_name());
            if is_kdr_provider(&provider) {
                kdr_identified = true;
            }
            let provider_dir = workspace.join(sanitize_file_name(&provider));
            if let Err(error) = std::fs::create_dir_all(&provider_dir) {
                tracing::warn!(job_number, %provider, %error, "failed to create provider folder");
                continue;
            }
            for attachment in message.attachments() {
                let file_name = sanitize_file_name(&attachment.file_name());
                if file_name.is_empty() {
                    continue;
                }
                if let Err(error) = attachment.save_to(&provider_dir.join(&file_name)) {
                    tracing::warn!(
                        job_number,
                        %provider,
                        %file_name,
                        %error,
                        "failed to extract attachment, skipping"
                    );
                }
            }
        }
        kdr_identified
    }

    /// Moves the referral coversheet out of the sender folder to its fixed
    /// name at the workspace root. Absent coversheets are not an error here;
    /// the analysis stage reports them.
    fn relocate_coversheet(&self, job_number: u32, workspace: &Path) -> Result<()> {
        let sender_dir = workspace.join(CANONICAL_SENDER_ADDRESS);
        let original = sender_dir.join(format!("{job_number}.pdf"));
        if !original.is_file() {
            return Ok(());
        }
        let renamed = workspace.join(coversheet_file_name(job_number));
        std::fs::rename(&original, &renamed).with_context(|| {
            format!(
                "failed to move coversheet {} to {}",
                original.display(),
                renamed.display()
            )
        })?;
        std::fs::remove_dir_all(&sender_dir)
            .with_context(|| format!("failed to remove {}", sender_dir.display()))?;
        Ok(())
    }
}

/// Fixed coversheet file name inside a job workspace.
pub fn coversheet_file_name(job_number: u32) -> String {
    format!("Job {job_number} - Cover Sheet.pdf")
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, Utc};

    use crate::discovery::ScanWindow;
    use crate::message_source::{InMemoryMailbox, StoredAttachment, StoredMessage};

    use super::{coversheet_file_name, reset_workspace, ArtifactCollector, EMAIL_FILES_DIR};

    fn window() -> ScanWindow {
        ScanWindow {
            since: Utc::now() - Duration::days(14),
        }
    }

    fn message(
        sender_name: &str,
        sender_address: &str,
        subject: &str,
        attachments: Vec<(&str, &[u8])>,
    ) -> StoredMessage {
        StoredMessage {
            sender_name: sender_name.to_string(),
            sender_address: sender_address.to_string(),
            subject: subject.to_string(),
            received_at: Utc::now(),
            body: String::new(),
            attachments: attachments
                .into_iter()
                .map(|(file_name, content)| {
                    Arc::new(StoredAttachment {
                        file_name: file_name.to_string(),
                        content: content.to_vec(),
                    })
                })
                .collect(),
        }
    }

    fn referral_coversheet(job_number: u32) -> StoredMessage {
        message(
            "dbyd@1100.com.au",
            "dbyd@1100.com.au",
            &format!("BYDA JOB: {job_number} - 1 Example St"),
            vec![(&format!("{job_number}.pdf"), b"coversheet bytes")],
        )
    }

    #[test]
    fn functional_collect_builds_workspace_with_archive_and_provider_folders() {
        let tempdir = tempfile::tempdir().expect("tempdir");
        let mailbox = InMemoryMailbox::new();
        mailbox.push(referral_coversheet(12345678));
        mailbox.push(message(
            "BYDA - Acme Water",
            "plans@acmewater.example",
            "Acme Water plans for 12345678",
            vec![("plans.pdf", b"plan bytes")],
        ));

        let window = window();
        let collector = ArtifactCollector::new(&mailbox, tempdir.path(), &window);
        let collected = collector
            .collect(12345678)
            .expect("collect")
            .expect("workspace");

        assert!(!collected.kdr_identified);
        assert_eq!(
            collected.workspace,
            tempdir.path().join("BYDA JOB 12345678 - 1 Example St")
        );
        assert!(collected.workspace.join(EMAIL_FILES_DIR).is_dir());
        assert!(collected
            .workspace
            .join(EMAIL_FILES_DIR)
            .join("Acme Water plans for 12345678.msg")
            .is_file());
        assert!(collected
            .workspace
            .join("Acme Water")
            .join("plans.pdf")
            .is_file());
        // Coversheet relocated out of the sender folder to its fixed name.
        assert!(collected
            .workspace
            .join(coversheet_file_name(12345678))
            .is_file());
        assert!(!collected.workspace.join("dbyd@1100.com.au").exists());
    }

    #[test]
    fn functional_collect_without_coversheet_message_yields_none() {
        let tempdir = tempfile::tempdir().expect("tempdir");
        let mailbox = InMemoryMailbox::new();
        mailbox.push(message(
            "BYDA - Acme Water",
            "plans@acmewater.example",
            "Acme Water plans for 12345678",
            vec![],
        ));
        let window = window();
        let collector = ArtifactCollector::new(&mailbox, tempdir.path(), &window);
        assert!(collector.collect(12345678).expect("collect").is_none());
    }

    #[test]
    fn functional_collect_flags_kdr_victoria() {
        let tempdir = tempfile::tempdir().expect("tempdir");
        let mailbox = InMemoryMailbox::new();
        mailbox.push(referral_coversheet(12345678));
        mailbox.push(message(
            "KDR Victoria Pty Ltd",
            "plans@kdr.example",
            "Tram plans 12345678",
            vec![("tram.pdf", b"tram bytes")],
        ));
        let window = window();
        let collector = ArtifactCollector::new(&mailbox, tempdir.path(), &window);
        let collected = collector
            .collect(12345678)
            .expect("collect")
            .expect("workspace");
        assert!(collected.kdr_identified);
        assert!(collected
            .workspace
            .join("KDR Victoria Pty Ltd")
            .join("tram.pdf")
            .is_file());
    }

    #[test]
    fn regression_collect_wipes_stale_workspace_contents() {
        let tempdir = tempfile::tempdir().expect("tempdir");
        let workspace = tempdir.path().join("BYDA JOB 12345678 - 1 Example St");
        std::fs::create_dir_all(workspace.join("Stale Provider")).expect("stale dir");
        std::fs::write(workspace.join("Missing Providers.txt"), "stale").expect("stale file");

        let mailbox = InMemoryMailbox::new();
        mailbox.push(referral_coversheet(12345678));
        let window = window();
        let collector = ArtifactCollector::new(&mailbox, tempdir.path(), &window);
        collector
            .collect(12345678)
            .expect("collect")
            .expect("workspace");

        assert!(!workspace.join("Stale Provider").exists());
        assert!(!workspace.join("Missing Providers.txt").exists());
    }

    #[test]
    fn functional_each_distinct_coversheet_subject_gets_a_directory() {
        let tempdir = tempfile::tempdir().expect("tempdir");
        let mailbox = InMemoryMailbox::new();
        mailbox.push(referral_coversheet(12345678));
        mailbox.push(message(
            "dbyd@1100.com.au",
            "dbyd@1100.com.au",
            "BYDA JOB: 12345678 - 2 Sample Rd",
            vec![("12345678.pdf", b"revised coversheet")],
        ));

        let window = window();
        let collector = ArtifactCollector::new(&mailbox, tempdir.path(), &window);
        let collected = collector
            .collect(12345678)
            .expect("collect")
            .expect("workspace");

        // Artifacts follow the last coversheet message; the earlier subject
        // still has its directory.
        assert_eq!(
            collected.workspace,
            tempdir.path().join("BYDA JOB 12345678 - 2 Sample Rd")
        );
        assert!(collected
            .workspace
            .join(coversheet_file_name(12345678))
            .is_file());
        assert!(tempdir
            .path()
            .join("BYDA JOB 12345678 - 1 Example St")
            .is_dir());
    }

    #[test]
    fn unit_reset_workspace_creates_missing_directory() {
        let tempdir = tempfile::tempdir().expect("tempdir");
        let workspace = tempdir.path().join("fresh");
        reset_workspace(&workspace).expect("reset");
        assert!(workspace.is_dir());
    }
}
