//! Wire types for the Rulebook tool surface.
//!
//! Everything here is plain data: the server serializes these structs into tool results and the
//! smoke tests deserialize them back.

use anyhow::Result;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Reserved key that selects every document at once.
pub const ALL_KEY: &str = "ALL";

pub const STATUS_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct ErrorEnvelope {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct ListRulesResult {
    /// Document keys followed by the reserved `ALL` key.
    pub keys: Vec<String>,
    /// Number of documents (excludes `ALL`).
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScanWarningReport {
    GroupUnreadable {
        group: String,
        path: String,
        reason: String,
    },
    FileUnreadable {
        key: String,
        path: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct RepositoryStatus {
    pub schema_version: u32,
    pub root: String,
    pub entries: usize,
    /// Milliseconds since the current snapshot was produced; absent before the first scan.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_age_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_created_unix_ms: Option<u64>,
    pub stale: bool,
    pub ttl_ms: u64,
    pub scans: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ScanWarningReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

pub fn serialize_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_omits_empty_optionals() {
        let status = RepositoryStatus {
            schema_version: STATUS_SCHEMA_VERSION,
            root: "rules".to_string(),
            entries: 0,
            snapshot_age_ms: None,
            snapshot_created_unix_ms: None,
            stale: true,
            ttl_ms: 5000,
            scans: 0,
            warnings: Vec::new(),
            last_error: None,
        };
        let value = serde_json::to_value(&status).unwrap();
        assert!(value.get("snapshot_age_ms").is_none());
        assert!(value.get("warnings").is_none());
        assert_eq!(value["stale"], serde_json::json!(true));
    }

    #[test]
    fn warnings_are_tagged_by_kind() {
        let warning = ScanWarningReport::GroupUnreadable {
            group: "general".to_string(),
            path: "/rules/general".to_string(),
            reason: "permission denied".to_string(),
        };
        let value = serde_json::to_value(&warning).unwrap();
        assert_eq!(value["kind"], "group_unreadable");
        assert_eq!(value["group"], "general");
    }
}
