//! Machine-readable syndrome definitions.
//!
//! Only the parts of the Open Syndrome document consumed by case filtering are
//! modelled here; every other field is ignored on deserialization. Documents
//! are expected to be validated against the published schema elsewhere.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::code::normalize_code;
use crate::error::Result;

/// A syndrome case definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Definition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub inclusion_criteria: Vec<Criterion>,
    /// Parsed but never evaluated by the case filter.
    #[serde(default)]
    pub exclusion_criteria: Vec<Criterion>,
}

/// One inclusion or exclusion criterion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    /// Declared combinator (`AND`, `OR`...). Filtering always combines with OR.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logical_operator: Option<String>,
    #[serde(default)]
    pub values: Vec<CriterionValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CriterionValue {
    /// Absent for non-coded criteria (symptoms, free text...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<CodedValue>,
}

/// A code qualified by its coding system, e.g. `{"system": "ICD-10", "code": "A92.9"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodedValue {
    pub system: String,
    pub code: String,
}

impl Definition {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_json_slice(raw: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(raw)?)
    }

    /// The only criterion consulted when filtering or computing overlap.
    pub fn first_criterion(&self) -> Option<&Criterion> {
        self.inclusion_criteria.first()
    }

    /// Target codes of the first inclusion criterion grouped by coding system.
    ///
    /// Code order within a system follows the document; blank codes are dropped.
    pub fn codes_by_system(&self) -> BTreeMap<String, Vec<String>> {
        let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let Some(criterion) = self.first_criterion() else {
            return grouped;
        };
        for coded in criterion.coded_values() {
            if coded.code.trim().is_empty() {
                continue;
            }
            grouped
                .entry(coded.system.clone())
                .or_default()
                .push(coded.code.clone());
        }
        grouped
    }

    /// Normalized code set of the first inclusion criterion, systems ignored.
    pub fn normalized_codes(&self) -> BTreeSet<String> {
        self.first_criterion()
            .map(|criterion| {
                criterion
                    .coded_values()
                    .map(|coded| normalize_code(&coded.code))
                    .filter(|code| !code.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Criterion {
    pub fn coded_values(&self) -> impl Iterator<Item = &CodedValue> {
        self.values.iter().filter_map(|value| value.code.as_ref())
    }
}
