//! Foundational low-level utilities shared across the organiser crates.
//!
//! Provides atomic file-write helpers and time utilities used by ledger
//! persistence and workspace bookkeeping.

pub mod atomic_io;
pub mod time_utils;

pub use atomic_io::write_text_atomic;
pub use time_utils::current_unix_timestamp;

#[cfg(test)]
mod tests {
    use std::fs::read_to_string;

    use super::*;

    #[test]
    fn current_unix_timestamp_is_in_the_present() {
        // 2024-01-01T00:00:00Z; a timestamp before this means the clock
        // feeding temp-file names is broken.
        let now = current_unix_timestamp();
        assert!(now > 1_704_067_200);
    }

    #[test]
    fn write_text_atomic_leaves_no_temp_file_behind() {
        let tempdir = tempfile::tempdir().expect("tempdir");
        let path = tempdir.path().join("ledger.ini");
        write_text_atomic(&path, "[Statistics]\n").expect("write");
        let mut names: Vec<String> = std::fs::read_dir(tempdir.path())
            .expect("read dir")
            .map(|entry| entry.expect("entry").file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["ledger.ini"]);
    }

    #[test]
    fn write_text_atomic_writes_content() {
        let tempdir = tempfile::tempdir().expect("tempdir");
        let path = tempdir.path().join("ledger.ini");
        write_text_atomic(&path, "[Statistics]\n").expect("write");
        let contents = read_to_string(&path).expect("read");
        assert_eq!(contents, "[Statistics]\n");
    }

    #[test]
    fn write_text_atomic_replaces_existing_content() {
        let tempdir = tempfile::tempdir().expect("tempdir");
        let path = tempdir.path().join("ledger.ini");
        write_text_atomic(&path, "first").expect("first write");
        write_text_atomic(&path, "second").expect("second write");
        let contents = read_to_string(&path).expect("read");
        assert_eq!(contents, "second");
    }
}
