//! Mailbox-export adapter.
//!
//! Reads a directory export produced by the mail client: a `mailbox.json`
//! manifest whose entries point at message and attachment files relative to
//! the export root. This gives the binary a concrete [`MessageSource`]
//! without coupling the engine to any mail transport.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::message_source::{MailMessage, MessageAttachment, MessageSource};

/// Manifest file name inside the export directory.
pub const MAILBOX_MANIFEST_FILE: &str = "mailbox.json";

const MAILBOX_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Deserialize)]
struct MailboxManifest {
    schema_version: u32,
    #[serde(default)]
    messages: Vec<ManifestMessage>,
}

#[derive(Debug, Clone, Deserialize)]
struct ManifestMessage {
    sender_name: String,
    sender_address: String,
    subject: String,
    received_at: DateTime<Utc>,
    #[serde(default)]
    message_file: Option<String>,
    #[serde(default)]
    attachments: Vec<ManifestAttachment>,
}

#[derive(Debug, Clone, Deserialize)]
struct ManifestAttachment {
    file_name: String,
    content_file: String,
}

/// [`MessageSource`] backed by a mailbox export directory.
pub struct JsonMailboxSource {
    root: PathBuf,
    manifest: MailboxManifest,
}

impl JsonMailboxSource {
    pub fn open(root: &Path) -> Result<Self> {
        let manifest_path = root.join(MAILBOX_MANIFEST_FILE);
        let raw = std::fs::read_to_string(&manifest_path)
            .with_context(|| format!("failed to read {}", manifest_path.display()))?;
        let manifest = serde_json::from_str::<MailboxManifest>(&raw)
            .with_context(|| format!("failed to parse {}", manifest_path.display()))?;
        if manifest.schema_version != MAILBOX_SCHEMA_VERSION {
            bail!(
                "unsupported mailbox manifest schema: expected {MAILBOX_SCHEMA_VERSION}, found {}",
                manifest.schema_version
            );
        }
        Ok(Self {
            root: root.to_path_buf(),
            manifest,
        })
    }
}

impl MessageSource for JsonMailboxSource {
    fn messages(&self) -> Result<Vec<Arc<dyn MailMessage>>> {
        Ok(self
            .manifest
            .messages
            .iter()
            .map(|message| {
                Arc::new(ExportedMessage {
                    root: self.root.clone(),
                    manifest: message.clone(),
                }) as Arc<dyn MailMessage>
            })
            .collect())
    }
}

struct ExportedMessage {
    root: PathBuf,
    manifest: ManifestMessage,
}

impl MailMessage for ExportedMessage {
    fn sender_name(&self) -> String {
        self.manifest.sender_name.clone()
    }

    fn sender_address(&self) -> String {
        self.manifest.sender_address.clone()
    }

    fn subject(&self) -> String {
        self.manifest.subject.clone()
    }

    fn received_at(&self) -> DateTime<Utc> {
        self.manifest.received_at
    }

    fn attachments(&self) -> Vec<Arc<dyn MessageAttachment>> {
        self.manifest
            .attachments
            .iter()
            .map(|attachment| {
                Arc::new(ExportedAttachment {
                    source: self.root.join(&attachment.content_file),
                    file_name: attachment.file_name.clone(),
                }) as Arc<dyn MessageAttachment>
            })
            .collect()
    }

    fn save_to(&self, destination: &Path) -> Result<()> {
        match &self.manifest.message_file {
            Some(relative) => {
                let source = self.root.join(relative);
                std::fs::copy(&source, destination).with_context(|| {
                    format!(
                        "failed to copy message {} to {}",
                        source.display(),
                        destination.display()
                    )
                })?;
                Ok(())
            }
            None => {
                // Export carried no native file; persist the headers we have.
                let rendered = format!(
                    "From: {} <{}>\nReceived: {}\nSubject: {}\n",
                    self.manifest.sender_name,
                    self.manifest.sender_address,
                    self.manifest.received_at.to_rfc3339(),
                    self.manifest.subject
                );
                std::fs::write(destination, rendered)
                    .with_context(|| format!("failed to write {}", destination.display()))
            }
        }
    }
}

struct ExportedAttachment {
    source: PathBuf,
    file_name: String,
}

impl MessageAttachment for ExportedAttachment {
    fn file_name(&self) -> String {
        self.file_name.clone()
    }

    fn save_to(&self, destination: &Path) -> Result<()> {
        std::fs::copy(&self.source, destination).with_context(|| {
            format!(
                "failed to copy attachment {} to {}",
                self.source.display(),
                destination.display()
            )
        })?;
        Ok(())
    }
}
