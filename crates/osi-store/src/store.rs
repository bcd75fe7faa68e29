//! Versioned, alphabetically sharded definition store.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use osi_model::Definition;

use crate::archive::{extract_definitions, is_version_dir};
use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::remote::{RemoteSource, join_url};
use crate::schema::SchemaValidator;

/// Definition version used when the caller does not pick one.
pub const DEFAULT_VERSION: &str = "v1";

const DEFINITION_EXTENSION: &str = "json";

/// Read access to definitions with download-on-miss.
///
/// Nothing is cached in memory: every load reads the file again.
pub struct DefinitionStore {
    config: StoreConfig,
    source: Box<dyn RemoteSource>,
}

impl std::fmt::Debug for DefinitionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefinitionStore")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl DefinitionStore {
    pub fn new(config: StoreConfig, source: impl RemoteSource + 'static) -> Self {
        Self {
            config,
            source: Box::new(source),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn root(&self) -> &Path {
        &self.config.definitions_root
    }

    /// `<root>/<version>/<first letter, lowercased>/<name>.json`
    pub fn definition_path(&self, name: &str, version: &str) -> Result<PathBuf> {
        let letter = shard_letter(name)?;
        check_version(version)?;
        Ok(self
            .root()
            .join(version)
            .join(letter)
            .join(format!("{name}.{DEFINITION_EXTENSION}")))
    }

    /// Loads a definition, downloading it first when it is not on disk.
    pub fn load_definition(&self, name: &str, version: &str) -> Result<Definition> {
        let path = self.definition_path(name, version)?;
        if !path.is_file() {
            self.download_definition(name, version, &path)?;
        }
        if !path.is_file() {
            return Err(not_found(name, version, path));
        }

        let raw = fs::read(&path).map_err(|source| StoreError::io(&path, source))?;
        let definition = serde_json::from_slice(&raw).map_err(|source| StoreError::Json {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(name, version, path = %path.display(), "loaded definition");
        Ok(definition)
    }

    /// Names of definitions under `version` whose file name contains `term`,
    /// compared case-insensitively. Only the local tree is scanned.
    pub fn find_definitions(&self, term: &str, version: &str) -> Result<BTreeSet<String>> {
        check_version(version)?;
        let dir = self.root().join(version);
        let mut files = Vec::new();
        collect_json_files(&dir, &mut files)?;

        let needle = term.to_lowercase();
        let found: BTreeSet<String> = files
            .iter()
            .filter_map(|path| {
                let file_name = path.file_name()?.to_str()?;
                if !file_name.to_lowercase().contains(&needle) {
                    return None;
                }
                path.file_stem()?.to_str().map(str::to_string)
            })
            .collect();
        tracing::debug!(term, version, matches = found.len(), "searched definitions");
        Ok(found)
    }

    /// Returns the definitions root, bulk-downloading the repository archive
    /// first when the root holds no definition file.
    pub fn definitions_dir(&self) -> Result<&Path> {
        let root = self.root();
        if has_json_files(root)? {
            return Ok(root);
        }

        let url = &self.config.definitions_archive_url;
        tracing::info!(url = %url, root = %root.display(), "downloading definitions archive");
        let data = self.source.fetch(url)?;
        fs::create_dir_all(root).map_err(|source| StoreError::io(root, source))?;
        let written = extract_definitions(&data, root)?;
        if written == 0 {
            return Err(StoreError::EmptyArchive { url: url.clone() });
        }
        tracing::info!(written, root = %root.display(), "definitions cached");
        Ok(root)
    }

    /// Path of the local schema, downloading it first when absent.
    pub fn schema_path(&self) -> Result<&Path> {
        self.download_schema()?;
        Ok(&self.config.schema_path)
    }

    /// Compiles the local schema, downloading it first when absent.
    pub fn schema_validator(&self) -> Result<SchemaValidator> {
        SchemaValidator::from_file(self.schema_path()?)
    }

    /// Downloads the schema unless it is already present.
    ///
    /// Returns `true` when a download happened.
    pub fn download_schema(&self) -> Result<bool> {
        let path = &self.config.schema_path;
        if path.is_file() {
            return Ok(false);
        }

        let url = &self.config.schema_url;
        tracing::info!(url = %url, path = %path.display(), "downloading schema");
        let data = self.source.fetch(url)?;
        serde_json::from_slice::<serde_json::Value>(&data).map_err(|source| StoreError::Json {
            path: path.clone(),
            source,
        })?;
        write_file(path, &data)?;
        Ok(true)
    }

    fn download_definition(&self, name: &str, version: &str, path: &Path) -> Result<()> {
        let letter = shard_letter(name)?;
        let file_name = format!("{name}.{DEFINITION_EXTENSION}");
        let url = join_url(
            &self.config.definition_base_url,
            &[version, letter.as_str(), file_name.as_str()],
        );
        tracing::info!(name, version, url = %url, "definition missing locally, downloading");

        let data = match self.source.fetch(&url) {
            Ok(data) => data,
            Err(StoreError::RemoteNotFound { .. }) => {
                return Err(not_found(name, version, path.to_path_buf()));
            }
            Err(err) => return Err(err),
        };
        serde_json::from_slice::<serde_json::Value>(&data).map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        write_file(path, &data)
    }
}

fn shard_letter(name: &str) -> Result<String> {
    let invalid = || StoreError::InvalidName {
        name: name.to_string(),
    };
    if name.trim().is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(invalid());
    }
    let first = name.chars().next().ok_or_else(invalid)?;
    Ok(first.to_lowercase().collect())
}

fn check_version(version: &str) -> Result<()> {
    if is_version_dir(version) {
        Ok(())
    } else {
        Err(StoreError::InvalidVersion {
            version: version.to_string(),
        })
    }
}

fn not_found(name: &str, version: &str, path: PathBuf) -> StoreError {
    StoreError::DefinitionNotFound {
        name: name.to_string(),
        version: version.to_string(),
        path,
    }
}

fn write_file(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| StoreError::io(parent, source))?;
    }
    fs::write(path, data).map_err(|source| StoreError::io(path, source))
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(DEFINITION_EXTENSION))
}

/// Recursively collects `*.json` files below `dir`, sorted. A missing directory yields nothing.
fn collect_json_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    if !dir.is_dir() {
        return Ok(());
    }
    let entries = fs::read_dir(dir).map_err(|source| StoreError::io(dir, source))?;
    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| StoreError::io(dir, source))?;
        paths.push(entry.path());
    }
    paths.sort();
    for path in paths {
        if path.is_dir() {
            collect_json_files(&path, out)?;
        } else if is_json(&path) {
            out.push(path);
        }
    }
    Ok(())
}

fn has_json_files(dir: &Path) -> Result<bool> {
    let mut files = Vec::new();
    collect_json_files(dir, &mut files)?;
    Ok(!files.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::OfflineSource;

    fn store(root: &str) -> DefinitionStore {
        DefinitionStore::new(
            StoreConfig::default().with_definitions_root(root),
            OfflineSource,
        )
    }

    #[test]
    fn path_uses_lowercase_first_letter_shard() {
        let path = store("/defs")
            .definition_path("Arbovirosis_paraguay_sd", "v1")
            .expect("valid name");
        assert_eq!(
            path,
            PathBuf::from("/defs/v1/a/Arbovirosis_paraguay_sd.json")
        );
    }

    #[test]
    fn rejects_names_that_escape_the_root() {
        let store = store("/defs");
        for name in ["", "  ", "..", "../etc/passwd", "a\\b"] {
            let err = store.definition_path(name, "v1").unwrap_err();
            assert!(matches!(err, StoreError::InvalidName { .. }), "{name:?}");
        }
    }

    #[test]
    fn rejects_versions_that_escape_the_root() {
        let store = store("/defs");
        for version in ["", "..", "../..", "v1/../..", "latest"] {
            let err = store.definition_path("sari_sd", version).unwrap_err();
            assert!(matches!(err, StoreError::InvalidVersion { .. }), "{version:?}");
            let err = store.find_definitions("sari", version).unwrap_err();
            assert!(matches!(err, StoreError::InvalidVersion { .. }), "{version:?}");
        }
    }

    #[test]
    fn missing_definition_offline_reports_offline() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = DefinitionStore::new(
            StoreConfig::default().with_definitions_root(dir.path()),
            OfflineSource,
        );
        let err = store.load_definition("nothing_here", "v1").unwrap_err();
        assert!(matches!(err, StoreError::Offline { .. }));
    }
}
