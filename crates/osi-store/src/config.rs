//! Store configuration.
//!
//! Resolution order, later entries winning:
//! 1. built-in defaults
//! 2. optional TOML file
//! 3. `OSI_*` environment variables
//!
//! Command-line overrides are applied by the caller on the returned value.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, StoreError};

/// Environment variable naming a TOML config file.
pub const CONFIG_ENV_VAR: &str = "OSI_CONFIG";
pub const DEFINITIONS_DIR_ENV_VAR: &str = "OSI_DEFINITIONS_DIR";
pub const SCHEMA_FILE_ENV_VAR: &str = "OSI_SCHEMA_FILE";
pub const DEFINITIONS_ARCHIVE_URL_ENV_VAR: &str = "OSI_DEFINITIONS_ARCHIVE_URL";
pub const DEFINITIONS_BASE_URL_ENV_VAR: &str = "OSI_DEFINITIONS_BASE_URL";
pub const SCHEMA_URL_ENV_VAR: &str = "OSI_SCHEMA_URL";

const DEFAULT_DEFINITIONS_DIR: &str = "definitions";
const DEFAULT_SCHEMA_FILE: &str = "schema.json";
const DEFAULT_DEFINITIONS_ARCHIVE_URL: &str =
    "https://github.com/OpenSyndrome/definitions/archive/refs/heads/main.zip";
const DEFAULT_DEFINITIONS_BASE_URL: &str =
    "https://raw.githubusercontent.com/OpenSyndrome/definitions/main/definitions";
const DEFAULT_SCHEMA_URL: &str =
    "https://raw.githubusercontent.com/OpenSyndrome/schema/main/schema.json";

/// Where definitions and the schema live locally and remotely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Root of the `<version>/<letter>/<name>.json` tree.
    pub definitions_root: PathBuf,
    /// Local copy of the validation schema.
    pub schema_path: PathBuf,
    /// ZIP archive holding the whole definitions repository.
    pub definitions_archive_url: String,
    /// Base URL for single definitions; `/<version>/<letter>/<name>.json` is appended.
    pub definition_base_url: String,
    pub schema_url: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            definitions_root: PathBuf::from(DEFAULT_DEFINITIONS_DIR),
            schema_path: PathBuf::from(DEFAULT_SCHEMA_FILE),
            definitions_archive_url: DEFAULT_DEFINITIONS_ARCHIVE_URL.to_string(),
            definition_base_url: DEFAULT_DEFINITIONS_BASE_URL.to_string(),
            schema_url: DEFAULT_SCHEMA_URL.to_string(),
        }
    }
}

/// On-disk shape of the TOML config; every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    definitions_dir: Option<PathBuf>,
    schema_file: Option<PathBuf>,
    definitions_archive_url: Option<String>,
    definitions_base_url: Option<String>,
    schema_url: Option<String>,
}

impl StoreConfig {
    /// Defaults, then `file` (or the file named by `OSI_CONFIG`), then env vars.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();
        let env_file = std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from);
        if let Some(path) = file.map(Path::to_path_buf).or(env_file) {
            config = config.with_file(&path)?;
        }
        Ok(config.with_env(|key| std::env::var(key).ok()))
    }

    /// Overlay values from a TOML file. Relative paths resolve against the file's directory.
    pub fn with_file(self, path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| StoreError::io(path, source))?;
        let parsed: ConfigFile = toml::from_str(&raw).map_err(|source| StoreError::Toml {
            path: path.to_path_buf(),
            source,
        })?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(self.merge(parsed, base))
    }

    /// Overlay values from an environment lookup.
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        if let Some(dir) = non_empty(DEFINITIONS_DIR_ENV_VAR) {
            self.definitions_root = PathBuf::from(dir);
        }
        if let Some(file) = non_empty(SCHEMA_FILE_ENV_VAR) {
            self.schema_path = PathBuf::from(file);
        }
        if let Some(url) = non_empty(DEFINITIONS_ARCHIVE_URL_ENV_VAR) {
            self.definitions_archive_url = url;
        }
        if let Some(url) = non_empty(DEFINITIONS_BASE_URL_ENV_VAR) {
            self.definition_base_url = url;
        }
        if let Some(url) = non_empty(SCHEMA_URL_ENV_VAR) {
            self.schema_url = url;
        }
        self
    }

    #[must_use]
    pub fn with_definitions_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.definitions_root = root.into();
        self
    }

    #[must_use]
    pub fn with_schema_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.schema_path = path.into();
        self
    }

    fn merge(mut self, file: ConfigFile, base: &Path) -> Self {
        if let Some(dir) = file.definitions_dir {
            self.definitions_root = base.join(dir);
        }
        if let Some(schema) = file.schema_file {
            self.schema_path = base.join(schema);
        }
        if let Some(url) = file.definitions_archive_url {
            self.definitions_archive_url = url;
        }
        if let Some(url) = file.definitions_base_url {
            self.definition_base_url = url;
        }
        if let Some(url) = file.schema_url {
            self.schema_url = url;
        }
        self
    }
}
