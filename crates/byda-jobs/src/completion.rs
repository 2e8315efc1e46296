//! Reconciles expected respondents against respondent folders on disk.

/// Outcome of comparing an expected-respondent list against present folders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionReport {
    /// Expected entries with no matching folder, in expected-list order.
    /// Duplicate expected entries produce duplicate missing entries.
    pub missing: Vec<String>,
    /// True when every expected entry has a matching folder.
    pub complete: bool,
}

/// Normalizes a folder name for comparison: parentheses stripped, lower-cased.
pub fn normalize_folder_name(name: &str) -> String {
    name.chars()
        .filter(|ch| !matches!(ch, '(' | ')'))
        .collect::<String>()
        .to_lowercase()
}

/// Diffs expected respondents against present folder names.
///
/// Comparison is case-insensitive and ignores parentheses on the folder side;
/// expected entries are assumed already normalized by the coversheet parser.
/// The verdict is stable under reordering of either input.
pub fn evaluate(expected: &[String], present_folders: &[String]) -> CompletionReport {
    let normalized_present = present_folders
        .iter()
        .map(|name| normalize_folder_name(name))
        .collect::<Vec<_>>();

    let missing = expected
        .iter()
        .filter(|entry| {
            let entry = entry.to_lowercase();
            !normalized_present.iter().any(|present| *present == entry)
        })
        .cloned()
        .collect::<Vec<_>>();

    let complete = missing.is_empty();
    CompletionReport { missing, complete }
}

/// Renders the missing-provider report file body, title-cased per entry.
pub fn render_missing_report(missing: &[String]) -> String {
    let mut body = String::from("Missing Providers\n\n");
    for entry in missing {
        body.push_str(&title_case(entry));
        body.push('\n');
    }
    body
}

fn title_case(raw: &str) -> String {
    raw.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
