//! Error types for the definition store.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while resolving, downloading or reading definitions.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid definition name: {name:?}")]
    InvalidName { name: String },

    #[error("invalid definition version: {version:?} (expected v1, v2...)")]
    InvalidVersion { version: String },

    #[error("definition '{name}' ({version}) not found at {path}")]
    DefinitionNotFound {
        name: String,
        version: String,
        path: PathBuf,
    },

    /// The remote answered 404.
    #[error("remote resource not found: {url}")]
    RemoteNotFound { url: String },

    #[error("download of {url} failed: {message}")]
    Remote { url: String, message: String },

    #[error("offline mode: refusing to download {url}")]
    Offline { url: String },

    #[error("invalid JSON schema {path}: {message}")]
    InvalidSchema { path: PathBuf, message: String },

    #[error("archive extraction error: {0}")]
    Archive(String),

    #[error("no definition files found in archive {url}")]
    EmptyArchive { url: String },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn remote(url: &str, message: impl ToString) -> Self {
        Self::Remote {
            url: url.to_string(),
            message: message.to_string(),
        }
    }

    /// Returns true for errors that mean the requested document does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::DefinitionNotFound { .. } | Self::RemoteNotFound { .. }
        )
    }
}

impl From<zip::result::ZipError> for StoreError {
    fn from(err: zip::result::ZipError) -> Self {
        Self::Archive(err.to_string())
    }
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_classification() {
        let err = StoreError::RemoteNotFound {
            url: "https://example.org/x.json".to_string(),
        };
        assert!(err.is_not_found());

        let err = StoreError::remote("https://example.org/x.json", "timeout");
        assert!(!err.is_not_found());
        assert!(err.to_string().contains("timeout"));
    }
}
