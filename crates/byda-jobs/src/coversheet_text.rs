//! Extracts the expected-respondent list from decoded coversheet text.
//!
//! The utilities table sits between two textual markers. Marker search is
//! case-insensitive; when a marker is absent the corresponding bound is left
//! open, so a missing end marker includes all trailing text. That can
//! over-include trailing content as spurious respondents; the behaviour is
//! kept as-is because real coversheets carry both markers.

/// Marker preceding the utilities table.
pub const AUTHORITY_LIST_START_MARKER: &str = "authority name";

/// Marker terminating the utilities table.
pub const AUTHORITY_LIST_END_MARKER: &str = "end of utilities list";

/// Entry the referral service prints in every coversheet but which never
/// responds with plans.
const FALSE_POSITIVE_ENTRY: &str = "victoria university";

/// Parses decoded coversheet text into the ordered expected-respondent list.
///
/// Entries are lower-cased, stripped of parentheses, digits, and apostrophes,
/// and trimmed. Duplicates are retained; downstream comparison is set-like
/// and absorbs them.
pub fn parse_expected_providers(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let start = lowered
        .find(AUTHORITY_LIST_START_MARKER)
        .map(|index| index + AUTHORITY_LIST_START_MARKER.len())
        .unwrap_or(0);
    let end = lowered[start..]
        .find(AUTHORITY_LIST_END_MARKER)
        .map(|offset| start + offset)
        .unwrap_or(lowered.len());

    lowered[start..end]
        .lines()
        .map(normalize_entry)
        .filter(|entry| !entry.is_empty() && entry != FALSE_POSITIVE_ENTRY)
        .collect()
}

fn normalize_entry(line: &str) -> String {
    line.chars()
        .filter(|ch| !matches!(ch, '(' | ')' | '\'') && !ch.is_ascii_digit())
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::{parse_expected_providers, AUTHORITY_LIST_END_MARKER};

    const SAMPLE: &str = "BYDA Referral Coversheet\n\
        Job No: 12345678\n\
        Authority Name\n\
        Acme Water (East) 03 9999 1111\n\
        Beta Gas\n\
        Victoria University\n\
        END OF UTILITIES LIST\n\
        Page 1 of 2\n";

    #[test]
    fn functional_parse_extracts_normalized_entries_between_markers() {
        let expected = parse_expected_providers(SAMPLE);
        assert_eq!(expected, vec!["acme water east", "beta gas"]);
    }

    #[test]
    fn unit_parse_is_idempotent() {
        let first = parse_expected_providers(SAMPLE);
        let second = parse_expected_providers(SAMPLE);
        assert_eq!(first, second);
    }

    #[test]
    fn regression_false_positive_entry_is_dropped() {
        let text = format!(
            "authority name\nVictoria University\n{}",
            AUTHORITY_LIST_END_MARKER
        );
        assert!(parse_expected_providers(&text).is_empty());
    }

    #[test]
    fn functional_missing_end_marker_includes_trailing_text() {
        let text = "authority name\nAcme Water\nPage 1 of 2";
        let expected = parse_expected_providers(text);
        assert_eq!(expected, vec!["acme water", "page  of"]);
    }

    #[test]
    fn functional_missing_start_marker_scans_from_document_start() {
        let text = "Acme Water\nEND OF UTILITIES LIST\n";
        assert_eq!(parse_expected_providers(text), vec!["acme water"]);
    }

    #[test]
    fn unit_duplicates_are_retained_in_order() {
        let text = "authority name\nAcme Water\nAcme Water\nend of utilities list";
        assert_eq!(
            parse_expected_providers(text),
            vec!["acme water", "acme water"]
        );
    }
}
