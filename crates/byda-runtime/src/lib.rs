//! Sweep engine for the BYDA dig-job organiser.
//!
//! Drives discovery over a mailbox, materialises per-job workspaces,
//! reconciles coversheet expectations against received plans, and records
//! completed jobs in a durable ledger. The mail transport, PDF text
//! decoding, and notification presentation are consumed through narrow
//! traits so the engine stays testable against in-memory fixtures.

pub mod collector;
pub mod coversheet;
pub mod discovery;
pub mod evaluation;
pub mod json_mailbox;
pub mod ledger;
pub mod message_source;
pub mod notify;
pub mod runtime;

pub use collector::{reset_workspace, ArtifactCollector, CollectedArtifacts, EMAIL_FILES_DIR};
pub use coversheet::{CoversheetError, PdfTextExtractor, PlainTextExtractor};
pub use discovery::{discover_job_numbers, scan_window, ScanWindow};
pub use evaluation::{evaluate_workspace, JobOutcome, MISSING_REPORT_FILE};
pub use json_mailbox::JsonMailboxSource;
pub use ledger::JobLedgerStore;
pub use message_source::{
    InMemoryMailbox, MailMessage, MessageAttachment, MessageSource, StoredAttachment,
    StoredMessage,
};
pub use notify::{ConsoleNotifier, NotificationSink};
pub use runtime::{check_connectivity, OrganiserConfig, OrganiserRuntime, SweepReport};
