//! Coding-system mapping files.
//!
//! A mapping file is a JSON array of `{"system": ..., "code": ...}` objects,
//! where `code` names the case table column holding codes of `system`.

use std::path::Path;

use osi_model::CodingSystemMapping;

use crate::error::{IngestError, Result};

pub fn load_mapping_file(path: &Path) -> Result<Vec<CodingSystemMapping>> {
    let raw = std::fs::read(path).map_err(|e| IngestError::read(path, e))?;
    let mapping: Vec<CodingSystemMapping> =
        serde_json::from_slice(&raw).map_err(|source| IngestError::MappingJson {
            path: path.to_path_buf(),
            source,
        })?;

    for (index, entry) in mapping.iter().enumerate() {
        let field = if entry.system.trim().is_empty() {
            "system"
        } else if entry.code.trim().is_empty() {
            "code"
        } else {
            continue;
        };
        return Err(IngestError::MappingEntry {
            path: path.to_path_buf(),
            index,
            field,
        });
    }

    if mapping.is_empty() {
        tracing::warn!(path = %path.display(), "mapping file declares no columns");
    }
    tracing::debug!(path = %path.display(), entries = mapping.len(), "loaded mapping");
    Ok(mapping)
}
