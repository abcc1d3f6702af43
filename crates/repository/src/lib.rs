//! # Rulebook Repository
//!
//! Cached, self-invalidating view over a directory of grouped Markdown rules.
//!
//! ## Layout
//!
//! ```text
//! rules/                       root (RULEBOOK_ROOT)
//!     general/                 group  -> key prefix GENERAL
//!         README.md            -> GENERAL-OVERVIEW
//!         COMMIT-MESSAGES.md   -> GENERAL-COMMIT-MESSAGES
//!     rust/
//!         errors.md            -> RUST-ERRORS
//! ```
//!
//! ## Flow
//!
//! ```text
//! ChangeMonitor ──invalidate()──> RuleRepository <──read()── RuleQuery
//!                                      │
//!                                      └──(stale | invalidated | empty)──> DirectoryScanner
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use rulebook_repository::{RepositoryConfig, RuleQuery, RuleRepository};
//! use std::sync::Arc;
//!
//! let config = RepositoryConfig::resolve(None);
//! let query = RuleQuery::new(Arc::new(RuleRepository::open(&config)));
//! for key in query.list_keys() {
//!     println!("{key}");
//! }
//! ```

mod cache;
mod clock;
mod config;
mod error;
mod key;
mod query;
mod scanner;
mod snapshot;
mod watcher;

pub use cache::{Invalidate, RuleRepository, SNAPSHOT_TTL};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{RepositoryConfig, DEFAULT_ROOT, DISABLE_WATCH_ENV, ROOT_ENV};
pub use error::{RepositoryError, Result};
pub use key::{derive_key, is_valid_key, DOCUMENT_EXTENSION, OVERVIEW_STEM};
pub use query::{RuleQuery, SECTION_DELIMITER};
pub use rulebook_protocol::ALL_KEY;
pub use scanner::{scan_root, DirectoryScanner, Scan, ScanOutcome, ScanWarning};
pub use snapshot::{Entry, Snapshot};
pub use watcher::{ChangeMonitor, MonitorConfig};
