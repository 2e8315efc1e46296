//! Mailbox abstraction consumed by discovery and collection.
//!
//! The real transport lives behind [`MessageSource`]; the engine only needs
//! sender identity, subject, received time, and save operations for the
//! message and its attachments.

use std::{
    path::Path,
    sync::{Arc, Mutex},
};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

/// One attachment on an inbound message.
pub trait MessageAttachment: Send + Sync {
    fn file_name(&self) -> String;
    fn save_to(&self, destination: &Path) -> Result<()>;
}

/// One inbound message.
pub trait MailMessage: Send + Sync {
    fn sender_name(&self) -> String;
    fn sender_address(&self) -> String;
    fn subject(&self) -> String;
    fn received_at(&self) -> DateTime<Utc>;
    fn attachments(&self) -> Vec<Arc<dyn MessageAttachment>>;
    /// Saves the message in its native form to `destination`.
    fn save_to(&self, destination: &Path) -> Result<()>;
}

/// A queryable collection of messages.
pub trait MessageSource: Send + Sync {
    fn messages(&self) -> Result<Vec<Arc<dyn MailMessage>>>;
}

/// Attachment held fully in memory.
#[derive(Debug, Clone)]
pub struct StoredAttachment {
    pub file_name: String,
    pub content: Vec<u8>,
}

/// Message held fully in memory. Used by the test suites and by callers that
/// feed the engine from something other than a mailbox export.
#[derive(Debug, Clone)]
pub struct StoredMessage {
    pub sender_name: String,
    pub sender_address: String,
    pub subject: String,
    pub received_at: DateTime<Utc>,
    pub body: String,
    pub attachments: Vec<Arc<StoredAttachment>>,
}

impl MessageAttachment for StoredAttachment {
    fn file_name(&self) -> String {
        self.file_name.clone()
    }

    fn save_to(&self, destination: &Path) -> Result<()> {
        std::fs::write(destination, &self.content)
            .with_context(|| format!("failed to write attachment {}", destination.display()))
    }
}

impl MailMessage for StoredMessage {
    fn sender_name(&self) -> String {
        self.sender_name.clone()
    }

    fn sender_address(&self) -> String {
        self.sender_address.clone()
    }

    fn subject(&self) -> String {
        self.subject.clone()
    }

    fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }

    fn attachments(&self) -> Vec<Arc<dyn MessageAttachment>> {
        self.attachments
            .iter()
            .map(|attachment| attachment.clone() as Arc<dyn MessageAttachment>)
            .collect()
    }

    fn save_to(&self, destination: &Path) -> Result<()> {
        let rendered = format!(
            "From: {} <{}>\nReceived: {}\nSubject: {}\n\n{}\n",
            self.sender_name,
            self.sender_address,
            self.received_at.to_rfc3339(),
            self.subject,
            self.body
        );
        std::fs::write(destination, rendered)
            .with_context(|| format!("failed to write message {}", destination.display()))
    }
}

/// In-memory [`MessageSource`]. Messages can be appended between sweeps to
/// simulate new arrivals.
#[derive(Debug, Default)]
pub struct InMemoryMailbox {
    messages: Mutex<Vec<Arc<StoredMessage>>>,
}

impl InMemoryMailbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, message: StoredMessage) {
        self.messages
            .lock()
            .expect("mailbox lock poisoned")
            .push(Arc::new(message));
    }
}

impl MessageSource for InMemoryMailbox {
    fn messages(&self) -> Result<Vec<Arc<dyn MailMessage>>> {
        Ok(self
            .messages
            .lock()
            .expect("mailbox lock poisoned")
            .iter()
            .map(|message| message.clone() as Arc<dyn MailMessage>)
            .collect())
    }
}
