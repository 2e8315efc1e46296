use std::sync::OnceLock;

use regex::Regex;

/// Canonical sender address for BYDA referral traffic.
pub const CANONICAL_SENDER_ADDRESS: &str = "dbyd@1100.com.au";

fn job_number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b\d{8}\b").expect("valid job number pattern"))
}

fn coversheet_subject_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)^BYDA JOB: (\d+) - .+").expect("valid subject pattern"))
}

/// Extracts every 8-digit job number token from a subject line.
///
/// A subject may carry zero, one, or several job numbers; all are returned
/// in order of appearance.
pub fn extract_job_numbers(subject: &str) -> Vec<u32> {
    job_number_pattern()
        .find_iter(subject)
        .filter_map(|token| token.as_str().parse::<u32>().ok())
        .collect()
}

/// Returns true when the subject matches the strict coversheet format
/// `BYDA JOB: <number> - <free text>` and the number equals `job_number`.
pub fn is_coversheet_subject(subject: &str, job_number: u32) -> bool {
    coversheet_subject_pattern()
        .captures(subject.trim())
        .and_then(|captures| captures.get(1))
        .and_then(|id| id.as_str().parse::<u32>().ok())
        .map(|id| id == job_number)
        .unwrap_or(false)
}

/// Case-insensitive substring test for a job number inside a subject line.
///
/// Looser than the coversheet match on purpose: provider replies quote the
/// job number in free-form subjects.
pub fn subject_mentions_job(subject: &str, job_number: u32) -> bool {
    subject.contains(&job_number.to_string())
}

/// Lower-cases a sender address, trims it, and strips angle brackets.
pub fn normalize_sender_address(raw: &str) -> String {
    raw.trim()
        .to_ascii_lowercase()
        .replace(['<', '>'], "")
        .trim()
        .to_string()
}

/// Strips characters that are invalid in file and directory names.
pub fn sanitize_file_name(raw: &str) -> String {
    raw.chars()
        .filter(|ch| !matches!(ch, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*'))
        .collect::<String>()
        .trim()
        .to_string()
}
