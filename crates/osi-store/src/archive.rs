//! Extraction of the bulk definitions archive.

use std::fs;
use std::io::{Cursor, Read};
use std::path::{Component, Path, PathBuf};

use crate::error::{Result, StoreError};

/// Extracts every `…/<version>/<letter>/<name>.json` entry of a ZIP archive
/// into `root/<version>/<letter>/<name>.json`.
///
/// Returns the number of definition files written. Entries outside that
/// layout (README, schema, tooling) are skipped.
pub fn extract_definitions(data: &[u8], root: &Path) -> Result<usize> {
    tracing::debug!(root = %root.display(), "extracting definitions archive");

    let mut archive = zip::ZipArchive::new(Cursor::new(data))?;
    let mut written = 0usize;

    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        if file.is_dir() {
            continue;
        }
        let Some(entry_path) = file.enclosed_name() else {
            tracing::warn!(entry = file.name(), "skipping archive entry with unsafe path");
            continue;
        };
        let Some(relative) = definition_relative_path(&entry_path) else {
            continue;
        };

        let dest_path = root.join(&relative);
        if let Some(parent) = dest_path.parent() {
            fs::create_dir_all(parent).map_err(|source| StoreError::io(parent, source))?;
        }

        let mut contents = Vec::new();
        file.read_to_end(&mut contents)
            .map_err(|e| StoreError::Archive(format!("failed to read {}: {e}", file.name())))?;
        fs::write(&dest_path, &contents).map_err(|source| StoreError::io(&dest_path, source))?;
        written += 1;
    }

    tracing::debug!(written, "archive extraction complete");
    Ok(written)
}

/// `<version>/<letter>/<name>.json` taken from the tail of an archive path.
fn definition_relative_path(entry: &Path) -> Option<PathBuf> {
    let parts: Vec<&str> = entry
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .collect();
    let [.., version, letter, file_name] = parts.as_slice() else {
        return None;
    };
    if !is_version_dir(version) || letter.chars().count() != 1 {
        return None;
    }
    if !file_name.ends_with(".json") {
        return None;
    }
    Some(Path::new(version).join(letter).join(file_name))
}

/// `v1`, `v2`...
pub(crate) fn is_version_dir(name: &str) -> bool {
    name.strip_prefix('v')
        .is_some_and(|rest| !rest.is_empty() && rest.chars().all(|ch| ch.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_version_letter_name_tail() {
        let path = Path::new("definitions-main/definitions/v1/a/arbovirosis_paraguay_sd.json");
        assert_eq!(
            definition_relative_path(path),
            Some(PathBuf::from("v1/a/arbovirosis_paraguay_sd.json"))
        );
    }

    #[test]
    fn skips_unrelated_entries() {
        assert_eq!(definition_relative_path(Path::new("repo-main/README.md")), None);
        assert_eq!(definition_relative_path(Path::new("repo-main/schema.json")), None);
        assert_eq!(
            definition_relative_path(Path::new("repo-main/docs/ab/x.json")),
            None
        );
        assert_eq!(
            definition_relative_path(Path::new("repo-main/v1/ab/x.json")),
            None
        );
    }

    #[test]
    fn version_directory_names() {
        assert!(is_version_dir("v1"));
        assert!(is_version_dir("v12"));
        assert!(!is_version_dir("v"));
        assert!(!is_version_dir("version1"));
    }
}
