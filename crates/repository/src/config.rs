use std::env;
use std::path::PathBuf;

pub const ROOT_ENV: &str = "RULEBOOK_ROOT";
pub const DISABLE_WATCH_ENV: &str = "RULEBOOK_DISABLE_WATCH";
pub const DEFAULT_ROOT: &str = "rules";

/// Process-wide repository settings, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryConfig {
    pub root: PathBuf,
    pub watch: bool,
}

impl RepositoryConfig {
    /// Resolve from an explicit override, then the environment, then defaults.
    #[must_use]
    pub fn resolve(root_override: Option<&str>) -> Self {
        Self::resolve_with(root_override, |name| env::var(name).ok())
    }

    pub fn resolve_with(
        root_override: Option<&str>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let root = root_override
            .and_then(non_blank)
            .or_else(|| lookup(ROOT_ENV).as_deref().and_then(non_blank))
            .map_or_else(|| PathBuf::from(DEFAULT_ROOT), PathBuf::from);

        let watch = !lookup(DISABLE_WATCH_ENV)
            .map(|v| is_truthy(&v))
            .unwrap_or(false);

        Self { root, watch }
    }
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_ROOT),
            watch: true,
        }
    }
}

fn non_blank(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn is_truthy(value: &str) -> bool {
    let value = value.trim();
    value == "1" || value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("yes")
}
