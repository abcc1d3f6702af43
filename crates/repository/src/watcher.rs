use crate::cache::Invalidate;
use crate::error::{RepositoryError, Result};
use log::{debug, warn};
use notify::{Config as NotifyConfig, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Poll period for platforms where notify falls back to polling.
    pub poll_interval: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
        }
    }
}

/// Watches the rules root and invalidates the repository on relevant changes.
///
/// Only the [`Invalidate`] capability crosses into the monitor; it never sees snapshots.
/// Dropping the monitor stops both the OS watcher and the forwarding task.
pub struct ChangeMonitor {
    root: PathBuf,
    command_tx: mpsc::Sender<MonitorCommand>,
    _watcher: RecommendedWatcher,
}

enum MonitorCommand {
    Shutdown,
}

impl ChangeMonitor {
    /// Must be called from within a tokio runtime.
    pub fn start(
        root: impl AsRef<Path>,
        target: Arc<dyn Invalidate>,
        config: MonitorConfig,
    ) -> Result<Self> {
        let root = absolute_root(root.as_ref())?;
        let (event_tx, event_rx) = mpsc::channel(1024);
        let (command_tx, command_rx) = mpsc::channel(4);

        let watcher = create_fs_watcher(&root, event_tx, config.poll_interval)?;
        spawn_invalidation_loop(root.clone(), target, event_rx, command_rx);

        Ok(Self {
            root,
            command_tx,
            _watcher: watcher,
        })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Drop for ChangeMonitor {
    fn drop(&mut self) {
        let _ = self.command_tx.try_send(MonitorCommand::Shutdown);
    }
}

fn create_fs_watcher(
    root: &Path,
    sender: mpsc::Sender<notify::Result<Event>>,
    poll_interval: Duration,
) -> Result<RecommendedWatcher> {
    let mut watcher = RecommendedWatcher::new(
        move |res| {
            // A full queue already guarantees an invalidation; dropping the extra event is fine.
            let _ = sender.try_send(res);
        },
        NotifyConfig::default().with_poll_interval(poll_interval),
    )
    .map_err(|e| RepositoryError::Watch(format!("watcher init failed: {e}")))?;
    watcher
        .watch(root, RecursiveMode::Recursive)
        .map_err(|e| RepositoryError::Watch(format!("failed to watch {}: {e}", root.display())))?;
    Ok(watcher)
}

fn spawn_invalidation_loop(
    root: PathBuf,
    target: Arc<dyn Invalidate>,
    mut event_rx: mpsc::Receiver<notify::Result<Event>>,
    mut command_rx: mpsc::Receiver<MonitorCommand>,
) {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                Some(event) = event_rx.recv() => {
                    if is_relevant_event(&root, event) {
                        target.invalidate();
                    }
                }
                cmd = command_rx.recv() => match cmd {
                    Some(MonitorCommand::Shutdown) | None => break,
                },
            }
        }
        debug!("Change monitor for {} stopped", root.display());
    });
}

fn is_relevant_event(root: &Path, event: notify::Result<Event>) -> bool {
    match event {
        Ok(evt) => {
            if matches!(evt.kind, EventKind::Access(_)) {
                return false;
            }
            if evt.paths.is_empty() {
                return true;
            }
            evt.paths.iter().any(|path| is_relevant_path(root, path))
        }
        Err(err) => {
            warn!("Watcher error: {err}");
            false
        }
    }
}

/// Event paths from notify are absolute, so the watched root has to be as well.
fn absolute_root(root: &Path) -> Result<PathBuf> {
    if let Ok(canonical) = root.canonicalize() {
        return Ok(canonical);
    }
    if root.is_absolute() {
        return Ok(root.to_path_buf());
    }
    Ok(std::env::current_dir()?.join(root))
}

fn is_relevant_path(root: &Path, path: &Path) -> bool {
    // Only components below the root are filtered; the root's own ancestors may be hidden.
    if let Ok(relative) = path.strip_prefix(root) {
        let hidden = relative.components().any(|c| match c {
            Component::Normal(name) => name.to_string_lossy().starts_with('.'),
            _ => false,
        });
        if hidden {
            return false;
        }
    }

    let name = path
        .file_name()
        .map(|f| f.to_string_lossy())
        .unwrap_or_default();
    !(name.ends_with('~') || name.ends_with(".swp") || name.ends_with(".tmp"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, ModifyKind};

    fn event(kind: EventKind, paths: &[&str]) -> notify::Result<Event> {
        let mut evt = Event::new(kind);
        for p in paths {
            evt = evt.add_path(PathBuf::from(p));
        }
        Ok(evt)
    }

    #[test]
    fn document_changes_are_relevant() {
        let root = Path::new("/rules");
        assert!(is_relevant_event(
            root,
            event(EventKind::Modify(ModifyKind::Any), &["/rules/general/RULES.md"])
        ));
        assert!(is_relevant_event(
            root,
            event(EventKind::Create(CreateKind::Folder), &["/rules/python"])
        ));
        assert!(is_relevant_event(root, event(EventKind::Any, &[])));
    }

    #[test]
    fn noise_is_ignored() {
        let root = Path::new("/rules");
        assert!(!is_relevant_event(
            root,
            event(EventKind::Access(AccessKind::Any), &["/rules/general/RULES.md"])
        ));
        assert!(!is_relevant_event(
            root,
            event(EventKind::Modify(ModifyKind::Any), &["/rules/.git/index"])
        ));
        assert!(!is_relevant_event(
            root,
            event(
                EventKind::Modify(ModifyKind::Any),
                &["/rules/general/.RULES.md.swp", "/rules/general/RULES.md~"]
            )
        ));
        assert!(!is_relevant_event(
            root,
            Err(notify::Error::generic("boom"))
        ));
    }

    #[test]
    fn hidden_ancestors_of_the_root_do_not_hide_events() {
        let root = Path::new("/home/dev/.config/rulebook/rules");
        assert!(is_relevant_path(
            root,
            Path::new("/home/dev/.config/rulebook/rules/general/RULES.md")
        ));
        assert!(!is_relevant_path(
            root,
            Path::new("/home/dev/.config/rulebook/rules/.git/index")
        ));
    }

    #[test]
    fn paths_outside_the_root_skip_the_hidden_check() {
        assert!(is_relevant_path(
            Path::new("rules"),
            Path::new("/srv/.hidden/rules/general/a.md")
        ));
        assert!(!is_relevant_path(
            Path::new("rules"),
            Path::new("/srv/.hidden/rules/general/a.md~")
        ));
    }

    #[test]
    fn relative_root_is_made_absolute() {
        let root = absolute_root(Path::new("does-not-exist/rules")).unwrap();
        assert!(root.is_absolute());
        assert!(root.ends_with("does-not-exist/rules"));
    }
}
