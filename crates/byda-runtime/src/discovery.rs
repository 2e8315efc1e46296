//! Job discovery over the mailbox.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use chrono_tz::Australia::Melbourne;

use byda_jobs::subject::{extract_job_numbers, normalize_sender_address, CANONICAL_SENDER_ADDRESS};

use crate::message_source::MessageSource;

/// Inclusive lower bound on message received times for one sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanWindow {
    pub since: DateTime<Utc>,
}

impl ScanWindow {
    pub fn contains(&self, received_at: DateTime<Utc>) -> bool {
        received_at >= self.since
    }
}

/// Builds the lookback window, evaluated in Melbourne local time.
pub fn scan_window(lookback_days: i64) -> ScanWindow {
    let now_melbourne = Utc::now().with_timezone(&Melbourne);
    let since = (now_melbourne - Duration::days(lookback_days)).with_timezone(&Utc);
    ScanWindow { since }
}

/// Returns the distinct job numbers found in referral subjects inside the
/// window, in discovery order.
///
/// Purely a query: ledger filtering happens in the scheduler so repeated
/// discovery keeps returning an id until it is marked complete.
pub fn discover_job_numbers(
    source: &dyn MessageSource,
    window: &ScanWindow,
) -> Result<Vec<u32>> {
    let mut discovered = Vec::new();
    for message in source.messages()? {
        if normalize_sender_address(&message.sender_address()) != CANONICAL_SENDER_ADDRESS {
            continue;
        }
        if !window.contains(message.received_at()) {
            continue;
        }
        for job_number in extract_job_numbers(&message.subject()) {
            if !discovered.contains(&job_number) {
                tracing::debug!(job_number, "job information identified");
                discovered.push(job_number);
            }
        }
    }
    Ok(discovered)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, Utc};

    use crate::message_source::{InMemoryMailbox, StoredMessage};

    use super::{discover_job_numbers, scan_window, ScanWindow};

    fn referral(subject: &str, age_days: i64) -> StoredMessage {
        StoredMessage {
            sender_name: "dbyd@1100.com.au".to_string(),
            sender_address: "dbyd@1100.com.au".to_string(),
            subject: subject.to_string(),
            received_at: Utc::now() - Duration::days(age_days),
            body: String::new(),
            attachments: Vec::new(),
        }
    }

    #[test]
    fn functional_discovery_extracts_ids_from_canonical_sender_in_window() {
        let mailbox = InMemoryMailbox::new();
        mailbox.push(referral("BYDA JOB: 12345678 - 1 Example St", 1));
        mailbox.push(referral("Confirmation 87654321", 2));
        let window = scan_window(14);
        let discovered = discover_job_numbers(&mailbox, &window).expect("discover");
        assert_eq!(discovered, vec![12345678, 87654321]);
    }

    #[test]
    fn functional_discovery_skips_other_senders_and_stale_messages() {
        let mailbox = InMemoryMailbox::new();
        let mut foreign = referral("BYDA JOB: 11112222 - Somewhere", 1);
        foreign.sender_address = "someone@example.com".to_string();
        mailbox.push(foreign);
        mailbox.push(referral("BYDA JOB: 33334444 - Old dig", 30));
        let window = scan_window(14);
        assert!(discover_job_numbers(&mailbox, &window)
            .expect("discover")
            .is_empty());
    }

    #[test]
    fn unit_discovery_deduplicates_ids_across_messages() {
        let mailbox = InMemoryMailbox::new();
        mailbox.push(referral("BYDA JOB: 12345678 - 1 Example St", 1));
        mailbox.push(referral("Update for 12345678", 1));
        let window = scan_window(14);
        assert_eq!(
            discover_job_numbers(&mailbox, &window).expect("discover"),
            vec![12345678]
        );
    }

    #[test]
    fn unit_scan_window_contains_respects_bound() {
        let window = ScanWindow {
            since: Utc::now() - Duration::days(14),
        };
        assert!(window.contains(Utc::now()));
        assert!(!window.contains(Utc::now() - Duration::days(15)));
    }

    #[test]
    fn regression_discovery_accepts_angle_bracketed_sender_addresses() {
        let mailbox = InMemoryMailbox::new();
        let mut message = referral("BYDA JOB: 12345678 - 1 Example St", 1);
        message.sender_address = "<DBYD@1100.com.au>".to_string();
        mailbox.push(message);
        let window = scan_window(14);
        assert_eq!(
            discover_job_numbers(&mailbox, &window).expect("discover"),
            vec![12345678]
        );
    }
}
