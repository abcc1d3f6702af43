//! Key derivation: `(group, file name)` → canonical rule key.

use std::path::Path;

/// Only files with this extension are documents.
pub const DOCUMENT_EXTENSION: &str = "md";

/// File stem (any case) that names a group's overview document.
pub const OVERVIEW_STEM: &str = "README";

/// Suffix used for a group's overview document.
pub const OVERVIEW_SUFFIX: &str = "OVERVIEW";

/// Derive the key for `filename` inside `group`, or `None` when the file is not a document.
///
/// Casing is ASCII-only so the result never depends on the process locale.
#[must_use]
pub fn derive_key(group: &str, filename: &str) -> Option<String> {
    let path = Path::new(filename);
    let is_document = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(DOCUMENT_EXTENSION));
    if !is_document {
        return None;
    }

    let stem = path.file_stem().and_then(|s| s.to_str())?;
    if stem.is_empty() || group.is_empty() {
        return None;
    }

    let prefix = key_segment(group);
    if stem.eq_ignore_ascii_case(OVERVIEW_STEM) {
        return Some(format!("{prefix}-{OVERVIEW_SUFFIX}"));
    }
    Some(format!("{prefix}-{}", key_segment(stem)))
}

/// `true` when `key` is non-empty and made of `A-Z`, `0-9`, `_` and `-` only.
#[must_use]
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| matches!(c, 'A'..='Z' | '0'..='9' | '_' | '-'))
}

fn key_segment(raw: &str) -> String {
    raw.chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' => c.to_ascii_uppercase(),
            _ => '_',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readme_in_any_case_is_the_overview() {
        for name in ["README.md", "readme.md", "ReadMe.MD"] {
            assert_eq!(
                derive_key("general", name).as_deref(),
                Some("GENERAL-OVERVIEW"),
                "{name}"
            );
        }
    }

    #[test]
    fn regular_documents_are_group_prefixed() {
        assert_eq!(
            derive_key("general", "COMMIT-MESSAGES.md").as_deref(),
            Some("GENERAL-COMMIT-MESSAGES")
        );
        assert_eq!(
            derive_key("rust", "error_handling.md").as_deref(),
            Some("RUST-ERROR_HANDLING")
        );
    }

    #[test]
    fn non_documents_are_skipped() {
        assert_eq!(derive_key("general", "notes.txt"), None);
        assert_eq!(derive_key("general", "README"), None);
        assert_eq!(derive_key("general", "archive.md.bak"), None);
        assert_eq!(derive_key("general", ".md"), None);
        assert_eq!(derive_key("", "RULES.md"), None);
    }

    #[test]
    fn derived_keys_are_deterministic_and_well_formed() {
        let inputs = [
            ("general", "README.md"),
            ("web dev", "api v2.md"),
            ("ünïcode", "naïve.md"),
            ("a.b", "c.d.md"),
        ];
        for (group, file) in inputs {
            let first = derive_key(group, file).expect("document");
            let second = derive_key(group, file).expect("document");
            assert_eq!(first, second);
            assert!(is_valid_key(&first), "{first} must match [A-Z0-9_-]+");
        }
        assert_eq!(
            derive_key("web dev", "api v2.md").as_deref(),
            Some("WEB_DEV-API_V2")
        );
        assert_eq!(derive_key("a.b", "c.d.md").as_deref(), Some("A_B-C_D"));
    }

    #[test]
    fn key_grammar() {
        assert!(is_valid_key("GENERAL-OVERVIEW"));
        assert!(is_valid_key("ALL"));
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("general-overview"));
        assert!(!is_valid_key("GENERAL OVERVIEW"));
    }
}
