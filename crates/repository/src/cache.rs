use crate::clock::{Clock, SystemClock};
use crate::config::RepositoryConfig;
use crate::scanner::{DirectoryScanner, Scan, ScanWarning};
use crate::snapshot::Snapshot;
use log::{info, warn};
use rulebook_protocol::{RepositoryStatus, STATUS_SCHEMA_VERSION};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Snapshots older than this are rescanned on the next read.
pub const SNAPSHOT_TTL: Duration = Duration::from_millis(5000);

/// The single capability handed to change sources.
pub trait Invalidate: Send + Sync {
    fn invalidate(&self);
}

/// Cached view over the rules directory.
///
/// The current snapshot is swapped as a whole `Arc`, so a reader keeps whatever snapshot it was
/// handed even while a rescan installs the next one. Rescans are serialized by `state`;
/// `invalidate` only flips an atomic flag and never waits for a scan in progress.
pub struct RuleRepository {
    scanner: Box<dyn Scan>,
    clock: Arc<dyn Clock>,
    stale: AtomicBool,
    state: Mutex<CacheState>,
}

#[derive(Default)]
struct CacheState {
    current: Option<Arc<Snapshot>>,
    scans: u64,
    warnings: Vec<ScanWarning>,
    last_error: Option<String>,
}

impl RuleRepository {
    pub fn new(scanner: Box<dyn Scan>, clock: Arc<dyn Clock>) -> Self {
        Self {
            scanner,
            clock,
            stale: AtomicBool::new(false),
            state: Mutex::new(CacheState::default()),
        }
    }

    /// Repository over the configured root using the system clock.
    #[must_use]
    pub fn open(config: &RepositoryConfig) -> Self {
        Self::new(
            Box::new(DirectoryScanner::new(config.root.clone())),
            Arc::new(SystemClock),
        )
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        self.scanner.root()
    }

    /// Current snapshot, rescanning first when none is held, the snapshot was invalidated, or it
    /// is older than [`SNAPSHOT_TTL`].
    ///
    /// Never fails: if the root is gone the previous snapshot (or an empty one) is returned and
    /// the next read retries.
    pub fn read(&self) -> Arc<Snapshot> {
        let mut state = self.lock_state();
        let now = self.clock.now();
        // Cleared before scanning so invalidations that arrive mid-scan survive to the next read.
        let invalidated = self.stale.swap(false, Ordering::AcqRel);

        let reason = match state.current.as_ref() {
            None => "initial",
            Some(_) if invalidated => "invalidated",
            Some(snapshot) if snapshot.age(now) > SNAPSHOT_TTL => "expired",
            Some(snapshot) => return Arc::clone(snapshot),
        };
        self.rescan(&mut state, now, reason)
    }

    pub fn status(&self) -> RepositoryStatus {
        let state = self.lock_state();
        let now = self.clock.now();
        let current = state.current.as_deref();
        let expired = current.map_or(true, |s| s.age(now) > SNAPSHOT_TTL);

        RepositoryStatus {
            schema_version: STATUS_SCHEMA_VERSION,
            root: self.root().to_string_lossy().into_owned(),
            entries: current.map_or(0, Snapshot::len),
            snapshot_age_ms: current.map(|s| duration_ms(s.age(now))),
            snapshot_created_unix_ms: current.map(|s| unix_ms(s.created_at())),
            stale: expired || self.stale.load(Ordering::Acquire),
            ttl_ms: duration_ms(SNAPSHOT_TTL),
            scans: state.scans,
            warnings: state.warnings.iter().map(ScanWarning::to_report).collect(),
            last_error: state.last_error.clone(),
        }
    }

    fn rescan(&self, state: &mut CacheState, now: SystemTime, reason: &str) -> Arc<Snapshot> {
        state.scans += 1;
        match self.scanner.scan(now) {
            Ok(outcome) => {
                for warning in &outcome.warnings {
                    warn!("Partial rules scan: {warning}");
                }
                let snapshot = Arc::new(outcome.snapshot);
                info!(
                    "Loaded {} rules from {} ({reason})",
                    snapshot.len(),
                    self.root().display()
                );
                state.current = Some(Arc::clone(&snapshot));
                state.warnings = outcome.warnings;
                state.last_error = None;
                snapshot
            }
            Err(err) => {
                warn!("Rules scan failed ({reason}): {err}");
                self.stale.store(true, Ordering::Release);
                state.last_error = Some(err.to_string());
                state
                    .current
                    .clone()
                    .unwrap_or_else(|| Arc::new(Snapshot::empty(now)))
            }
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, CacheState> {
        // A panic mid-scan leaves the previous snapshot in place, which is still consistent.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Invalidate for RuleRepository {
    fn invalidate(&self) {
        self.stale.store(true, Ordering::Release);
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn unix_ms(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(duration_ms)
        .unwrap_or_default()
}
