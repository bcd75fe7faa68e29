use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Declares that column `code` holds codes of coding system `system`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodingSystemMapping {
    pub system: String,
    /// Column name in the case table.
    pub code: String,
}

impl CodingSystemMapping {
    pub fn new(system: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            code: column.into(),
        }
    }
}

/// Parses `SYSTEM=COLUMN`, splitting on the last `=`.
impl FromStr for CodingSystemMapping {
    type Err = ModelError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || ModelError::InvalidMapping {
            entry: raw.to_string(),
        };
        let (system, column) = raw.rsplit_once('=').ok_or_else(invalid)?;
        let (system, column) = (system.trim(), column.trim());
        if system.is_empty() || column.is_empty() {
            return Err(invalid());
        }
        Ok(Self::new(system, column))
    }
}

/// Coding system name to the columns declared for it.
///
/// Built once per filtering call; columns keep their first-seen order and
/// duplicates are dropped.
#[derive(Debug, Clone, Default)]
pub struct SystemIndex {
    columns: BTreeMap<String, Vec<String>>,
}

impl SystemIndex {
    pub fn new(mapping: &[CodingSystemMapping]) -> Self {
        let mut columns: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for entry in mapping {
            let entry_columns = columns.entry(entry.system.clone()).or_default();
            if !entry_columns.contains(&entry.code) {
                entry_columns.push(entry.code.clone());
            }
        }
        Self { columns }
    }

    pub fn columns(&self, system: &str) -> &[String] {
        self.columns.get(system).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, system: &str) -> bool {
        self.columns.contains_key(system)
    }

    pub fn systems(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_groups_columns_per_system() {
        let mapping = vec![
            CodingSystemMapping::new("CID 10", "my_icd_code"),
            CodingSystemMapping::new("CID", "my_icd_code"),
            CodingSystemMapping::new("CIAP", "ciap"),
            CodingSystemMapping::new("CID 10", "secondary_icd"),
            CodingSystemMapping::new("CID 10", "my_icd_code"),
        ];
        let index = SystemIndex::new(&mapping);
        assert_eq!(index.columns("CID 10"), ["my_icd_code", "secondary_icd"]);
        assert_eq!(index.columns("CID"), ["my_icd_code"]);
        assert_eq!(index.columns("CIAP"), ["ciap"]);
        assert!(index.columns("ICD-10").is_empty());
        assert_eq!(index.systems().count(), 3);
    }

    #[test]
    fn parses_system_column_pairs() {
        let entry: CodingSystemMapping = "ICD-10=my_icd_code".parse().expect("parse pair");
        assert_eq!(entry, CodingSystemMapping::new("ICD-10", "my_icd_code"));
        let entry: CodingSystemMapping = " CID 10 = cid ".parse().expect("parse spaced pair");
        assert_eq!(entry, CodingSystemMapping::new("CID 10", "cid"));
    }

    #[test]
    fn rejects_malformed_pairs() {
        assert!("ICD-10".parse::<CodingSystemMapping>().is_err());
        assert!("=col".parse::<CodingSystemMapping>().is_err());
        assert!("ICD-10=".parse::<CodingSystemMapping>().is_err());
    }

    #[test]
    fn deserializes_mapping_json() {
        let raw = r#"[{"system": "ICD-10", "code": "my_icd_code"}]"#;
        let mapping: Vec<CodingSystemMapping> = serde_json::from_str(raw).expect("parse mapping");
        assert_eq!(mapping[0].system, "ICD-10");
        assert_eq!(mapping[0].code, "my_icd_code");
    }
}
