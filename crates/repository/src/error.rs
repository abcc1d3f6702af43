use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RepositoryError>;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Rules root not found: {}", path.display())]
    RootNotFound { path: PathBuf },

    #[error("Unknown rule key: {key}")]
    UnknownKey { key: String },

    #[error("Change monitor error: {0}")]
    Watch(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RepositoryError {
    pub fn root_not_found(path: impl Into<PathBuf>) -> Self {
        Self::RootNotFound { path: path.into() }
    }

    pub fn unknown_key(key: impl Into<String>) -> Self {
        Self::UnknownKey { key: key.into() }
    }
}
