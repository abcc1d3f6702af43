use crate::error::{RepositoryError, Result};
use crate::key::derive_key;
use crate::snapshot::{Entry, Snapshot};
use log::{debug, warn};
use rulebook_protocol::ScanWarningReport;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Non-fatal condition met during a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanWarning {
    GroupUnreadable {
        group: String,
        path: PathBuf,
        reason: String,
    },
    FileUnreadable {
        key: String,
        path: PathBuf,
        reason: String,
    },
}

impl ScanWarning {
    #[must_use]
    pub fn to_report(&self) -> ScanWarningReport {
        match self {
            Self::GroupUnreadable {
                group,
                path,
                reason,
            } => ScanWarningReport::GroupUnreadable {
                group: group.clone(),
                path: path.to_string_lossy().into_owned(),
                reason: reason.clone(),
            },
            Self::FileUnreadable { key, path, reason } => ScanWarningReport::FileUnreadable {
                key: key.clone(),
                path: path.to_string_lossy().into_owned(),
                reason: reason.clone(),
            },
        }
    }
}

impl std::fmt::Display for ScanWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GroupUnreadable { group, path, reason } => write!(
                f,
                "group '{group}' skipped ({}): {reason}",
                path.display()
            ),
            Self::FileUnreadable { key, path, reason } => {
                write!(f, "rule {key} skipped ({}): {reason}", path.display())
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub snapshot: Snapshot,
    pub warnings: Vec<ScanWarning>,
}

/// Source of snapshots for the repository cache.
pub trait Scan: Send + Sync {
    /// Produce a fresh snapshot stamped with `now`.
    fn scan(&self, now: SystemTime) -> Result<ScanOutcome>;

    fn root(&self) -> &Path;
}

/// Scans `<root>/<group>/<file>.md`, exactly two levels deep.
#[derive(Debug, Clone)]
pub struct DirectoryScanner {
    root: PathBuf,
}

impl DirectoryScanner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Scan for DirectoryScanner {
    fn scan(&self, now: SystemTime) -> Result<ScanOutcome> {
        scan_root(&self.root, now)
    }

    fn root(&self) -> &Path {
        &self.root
    }
}

/// Directory entries are visited in file-name order so that key collisions resolve the same way
/// on every platform: the lexicographically last file wins.
pub fn scan_root(root: &Path, now: SystemTime) -> Result<ScanOutcome> {
    if !root.is_dir() {
        return Err(RepositoryError::root_not_found(root));
    }
    let groups = sorted_entries(root).map_err(|err| {
        warn!("Failed to enumerate rules root {}: {err}", root.display());
        RepositoryError::root_not_found(root)
    })?;

    let mut entries: BTreeMap<String, Entry> = BTreeMap::new();
    let mut warnings = Vec::new();

    for group_path in groups {
        if !group_path.is_dir() {
            continue;
        }
        let Some(group) = visible_name(&group_path) else {
            continue;
        };

        let files = match sorted_entries(&group_path) {
            Ok(files) => files,
            Err(err) => {
                warnings.push(ScanWarning::GroupUnreadable {
                    group: group.to_string(),
                    path: group_path.clone(),
                    reason: err.to_string(),
                });
                continue;
            }
        };

        for file_path in files {
            if !file_path.is_file() {
                continue;
            }
            let Some(file_name) = visible_name(&file_path) else {
                continue;
            };
            let Some(key) = derive_key(group, file_name) else {
                continue;
            };

            let content = match fs::read_to_string(&file_path) {
                Ok(content) => content,
                Err(err) => {
                    warnings.push(ScanWarning::FileUnreadable {
                        key,
                        path: file_path.clone(),
                        reason: err.to_string(),
                    });
                    continue;
                }
            };
            if content.trim().is_empty() {
                debug!("Skipping empty rule file {}", file_path.display());
                continue;
            }

            if let Some(previous) = entries.insert(key.clone(), Entry::new(key, content)) {
                debug!(
                    "Rule key {} collides; {} replaces an earlier file",
                    previous.key(),
                    file_path.display()
                );
            }
        }
    }

    Ok(ScanOutcome {
        snapshot: Snapshot::new(entries, now),
        warnings,
    })
}

fn sorted_entries(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)?.map(|entry| entry.map(|e| e.path()));
    Ok(collect_sorted(dir, entries))
}

fn collect_sorted(
    dir: &Path,
    entries: impl Iterator<Item = std::io::Result<PathBuf>>,
) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) => paths.push(path),
            Err(err) => warn!("Skipping unreadable entry in {}: {err}", dir.display()),
        }
    }
    paths.sort();
    paths
}

fn visible_name(path: &Path) -> Option<&str> {
    path.file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.starts_with('.'))
}
