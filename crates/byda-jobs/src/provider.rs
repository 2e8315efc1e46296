/// Display name that triggers the dedicated KDR Victoria notice.
pub const KDR_PROVIDER_NAME: &str = "KDR Victoria Pty Ltd";

/// Reply address that Jemena referrals arrive from in place of a display name.
pub const JEMENA_REPLY_ADDRESS: &str = "dbyd.JENreplyTA@jemena.com.au";

/// Folder name substituted for the Jemena reply address.
pub const JEMENA_FOLDER_NAME: &str = "Jemena Electricity Networks (VIC)";

/// Fallback folder name when a message carries no usable display name.
pub const UNKNOWN_PROVIDER_NAME: &str = "Unknown Provider";

/// Derives the respondent folder name from a sender display name.
///
/// The referral service prefixes display names with `BYDA -`; that prefix is
/// dropped. A blank name falls back to [`UNKNOWN_PROVIDER_NAME`], and the
/// Jemena reply address is aliased to its organisation name.
pub fn provider_folder_name(sender_display_name: &str) -> String {
    let name = sender_display_name.replace("BYDA -", "");
    let name = name.trim();
    if name.is_empty() {
        return UNKNOWN_PROVIDER_NAME.to_string();
    }
    if name == JEMENA_REPLY_ADDRESS {
        return JEMENA_FOLDER_NAME.to_string();
    }
    name.to_string()
}

/// Returns true when the folder name identifies the KDR Victoria respondent.
pub fn is_kdr_provider(folder_name: &str) -> bool {
    folder_name == KDR_PROVIDER_NAME
}

#[cfg(test)]
mod tests {
    use super::{
        is_kdr_provider, provider_folder_name, JEMENA_FOLDER_NAME, JEMENA_REPLY_ADDRESS,
        KDR_PROVIDER_NAME, UNKNOWN_PROVIDER_NAME,
    };

    #[test]
    fn unit_provider_folder_name_strips_referral_prefix() {
        assert_eq!(provider_folder_name("BYDA - Acme Water"), "Acme Water");
        assert_eq!(provider_folder_name("  Beta Gas  "), "Beta Gas");
    }

    #[test]
    fn functional_provider_folder_name_applies_jemena_alias() {
        assert_eq!(provider_folder_name(JEMENA_REPLY_ADDRESS), JEMENA_FOLDER_NAME);
    }

    #[test]
    fn regression_provider_folder_name_falls_back_for_blank_names() {
        assert_eq!(provider_folder_name(""), UNKNOWN_PROVIDER_NAME);
        assert_eq!(provider_folder_name("BYDA -  "), UNKNOWN_PROVIDER_NAME);
    }

    #[test]
    fn unit_is_kdr_provider_matches_exact_name() {
        assert!(is_kdr_provider(KDR_PROVIDER_NAME));
        assert!(!is_kdr_provider("KDR Victoria"));
    }
}
