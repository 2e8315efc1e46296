//! Pure helpers for BYDA dig-job processing.
//!
//! Everything in this crate is I/O free: subject-line scanning, provider
//! folder naming, coversheet text parsing, completion evaluation, and the
//! ledger text format. The runtime crate wires these against the mailbox
//! and the filesystem.

pub mod completion;
pub mod coversheet_text;
pub mod ledger_format;
pub mod provider;
pub mod subject;
