//! Code overlap between definitions.
//!
//! Overlap compares normalized codes of each definition's first inclusion
//! criterion, ignoring coding systems. A definition without inclusion
//! criteria is left out of the intersection; one whose first criterion has
//! no codes takes part with an empty set.

use std::collections::BTreeSet;

use osi_model::Definition;
use osi_store::DefinitionStore;

use crate::error::Result;

/// Intersection of the normalized code sets of `definitions`.
///
/// Returns `None` for fewer than two definitions. Definitions without
/// inclusion criteria are skipped; if every definition is skipped the
/// overlap is empty.
pub fn overlap_codes<'a, I>(definitions: I) -> Option<BTreeSet<String>>
where
    I: IntoIterator<Item = &'a Definition>,
{
    let definitions: Vec<&Definition> = definitions.into_iter().collect();
    if definitions.len() < 2 {
        return None;
    }
    let mut sets = definitions
        .into_iter()
        .filter(|definition| takes_part(definition))
        .map(Definition::normalized_codes);
    let Some(first) = sets.next() else {
        return Some(BTreeSet::new());
    };
    Some(sets.fold(first, |acc, codes| acc.intersection(&codes).cloned().collect()))
}

fn takes_part(definition: &Definition) -> bool {
    definition.first_criterion().is_some()
}

/// Loads `names` from the store and intersects their codes.
///
/// Returns `Ok(None)` without touching the store when fewer than two names
/// are given.
pub fn overlap_definitions<S: AsRef<str>>(
    store: &DefinitionStore,
    names: &[S],
    version: &str,
) -> Result<Option<BTreeSet<String>>> {
    if names.len() < 2 {
        tracing::warn!(count = names.len(), "overlap needs at least two definitions");
        return Ok(None);
    }
    let definitions = load_all(store, names, version)?;
    let common = overlap_codes(definitions.iter().map(|(_, definition)| definition));
    if let Some(common) = &common {
        tracing::info!(
            definitions = names.len(),
            common = common.len(),
            "computed overlap"
        );
    }
    Ok(common)
}

/// How much of one definition's code set is shared with all the others.
#[derive(Debug, Clone, PartialEq)]
pub struct DefinitionShare {
    pub name: String,
    pub code_count: usize,
    /// `common / code_count`, 0 when the definition has no codes.
    pub shared_fraction: f64,
    /// No inclusion criteria, so left out of the intersection.
    pub skipped: bool,
}

/// Overlap result with per-definition breakdown, for reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlapSummary {
    pub common: BTreeSet<String>,
    pub definitions: Vec<DefinitionShare>,
}

impl OverlapSummary {
    /// `None` for fewer than two definitions.
    pub fn from_definitions(definitions: &[(String, Definition)]) -> Option<Self> {
        let common = overlap_codes(definitions.iter().map(|(_, definition)| definition))?;
        let definitions = definitions
            .iter()
            .map(|(name, definition)| {
                let code_count = definition.normalized_codes().len();
                let shared_fraction = if code_count == 0 {
                    0.0
                } else {
                    common.len() as f64 / code_count as f64
                };
                DefinitionShare {
                    name: name.clone(),
                    code_count,
                    shared_fraction,
                    skipped: !takes_part(definition),
                }
            })
            .collect();
        Some(Self {
            common,
            definitions,
        })
    }
}

/// Like [`overlap_definitions`], with per-definition code counts.
pub fn overlap_summary<S: AsRef<str>>(
    store: &DefinitionStore,
    names: &[S],
    version: &str,
) -> Result<Option<OverlapSummary>> {
    if names.len() < 2 {
        tracing::warn!(count = names.len(), "overlap needs at least two definitions");
        return Ok(None);
    }
    let definitions = load_all(store, names, version)?;
    Ok(OverlapSummary::from_definitions(&definitions))
}

fn load_all<S: AsRef<str>>(
    store: &DefinitionStore,
    names: &[S],
    version: &str,
) -> Result<Vec<(String, Definition)>> {
    names
        .iter()
        .map(|name| {
            let name = name.as_ref();
            let definition = store.load_definition(name, version)?;
            Ok((name.to_string(), definition))
        })
        .collect()
}
