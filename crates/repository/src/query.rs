use crate::cache::RuleRepository;
use crate::error::{RepositoryError, Result};
use crate::snapshot::Snapshot;
use rulebook_protocol::ALL_KEY;
use std::sync::Arc;

/// Separator placed between sections of the `ALL` document.
pub const SECTION_DELIMITER: &str = "\n\n---\n\n";

/// Read-only query surface over a [`RuleRepository`].
#[derive(Clone)]
pub struct RuleQuery {
    repository: Arc<RuleRepository>,
}

impl RuleQuery {
    pub fn new(repository: Arc<RuleRepository>) -> Self {
        Self { repository }
    }

    #[must_use]
    pub fn repository(&self) -> &Arc<RuleRepository> {
        &self.repository
    }

    /// Every document key in the current snapshot, followed by `ALL`.
    #[must_use]
    pub fn list_keys(&self) -> Vec<String> {
        let snapshot = self.repository.read();
        let mut keys: Vec<String> = snapshot.keys().map(str::to_string).collect();
        keys.push(ALL_KEY.to_string());
        keys
    }

    /// Content for `key`, or every document when `key` is `ALL`.
    pub fn get(&self, key: &str) -> Result<String> {
        let snapshot = self.repository.read();
        if key == ALL_KEY {
            return Ok(render_all(&snapshot));
        }
        snapshot
            .get(key)
            .map(|entry| entry.content().to_string())
            .ok_or_else(|| RepositoryError::unknown_key(key))
    }
}

fn render_all(snapshot: &Snapshot) -> String {
    snapshot
        .entries()
        .map(|entry| format!("# {}\n\n{}", entry.key(), entry.content()))
        .collect::<Vec<_>>()
        .join(SECTION_DELIMITER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SystemClock;
    use crate::scanner::DirectoryScanner;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn query_over(root: &std::path::Path) -> RuleQuery {
        let repository = RuleRepository::new(
            Box::new(DirectoryScanner::new(root)),
            Arc::new(SystemClock),
        );
        RuleQuery::new(Arc::new(repository))
    }

    #[test]
    fn all_sections_are_labeled_and_delimited() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("general")).unwrap();
        fs::write(tmp.path().join("general/README.md"), "# Overview\n").unwrap();
        fs::write(tmp.path().join("general/RULES.md"), "# Rules").unwrap();

        let all = query_over(tmp.path()).get(ALL_KEY).unwrap();
        assert_eq!(
            all,
            "# GENERAL-OVERVIEW\n\n# Overview\n\n\n---\n\n# GENERAL-RULES\n\n# Rules"
        );
    }

    #[test]
    fn all_sections_carry_documents_verbatim() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("general")).unwrap();
        fs::write(tmp.path().join("general/README.md"), "# Overview\n\n").unwrap();
        fs::write(tmp.path().join("general/RULES.md"), "  indented\n").unwrap();

        let query = query_over(tmp.path());
        let all = query.get(ALL_KEY).unwrap();
        let sections: Vec<&str> = all.split(SECTION_DELIMITER).collect();
        assert_eq!(sections.len(), 2);
        for (section, key) in sections.iter().zip(["GENERAL-OVERVIEW", "GENERAL-RULES"]) {
            let body = section
                .strip_prefix(&format!("# {key}\n\n"))
                .expect("labeled section");
            assert_eq!(body, query.get(key).unwrap());
        }
    }

    #[test]
    fn empty_repository_lists_only_all() {
        let tmp = TempDir::new().unwrap();
        let query = query_over(tmp.path());
        assert_eq!(query.list_keys(), vec![ALL_KEY.to_string()]);
        assert_eq!(query.get(ALL_KEY).unwrap(), "");
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("general")).unwrap();
        fs::write(tmp.path().join("general/RULES.md"), "# Rules").unwrap();

        let query = query_over(tmp.path());
        assert!(query.get("GENERAL-RULES").is_ok());
        assert!(matches!(
            query.get("general-rules"),
            Err(RepositoryError::UnknownKey { .. })
        ));
        assert!(query.get("all").is_err());
    }
}
