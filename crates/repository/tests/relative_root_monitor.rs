//! Kept in its own test binary: it changes the process working directory.

use rulebook_repository::{ChangeMonitor, MonitorConfig, RepositoryConfig, RuleRepository};
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

#[tokio::test]
async fn relative_root_under_hidden_working_directory_is_watched() {
    let tmp = TempDir::new().unwrap();
    let cwd = tmp.path().join(".config");
    fs::create_dir_all(cwd.join("rules/general")).unwrap();
    fs::write(cwd.join("rules/general/RULES.md"), "v1").unwrap();
    std::env::set_current_dir(&cwd).unwrap();

    let config = RepositoryConfig::resolve_with(None, |_| None);
    assert!(config.root.is_relative());
    let repository = Arc::new(RuleRepository::open(&config));
    assert_eq!(repository.read().len(), 1);

    let monitor = ChangeMonitor::start(&config.root, repository.clone(), MonitorConfig::default())
        .expect("start change monitor");
    assert!(monitor.root().is_absolute());
    tokio::time::sleep(Duration::from_millis(200)).await;

    fs::write(cwd.join("rules/general/NEW.md"), "fresh").unwrap();
    let mut stale = false;
    for _ in 0..100 {
        if repository.status().stale {
            stale = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert!(stale, "change monitor did not invalidate");
    assert!(repository.read().get("GENERAL-NEW").is_some());
}
