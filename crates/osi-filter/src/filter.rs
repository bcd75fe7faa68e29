//! Case annotation against syndrome definitions.
//!
//! Applying a definition adds (or overwrites) one boolean column named after
//! the definition; rows are never dropped. Only the first inclusion criterion
//! is evaluated, and its codes are always combined with OR regardless of the
//! criterion's declared logical operator. Exclusion criteria are not applied.

use osi_model::{CodingSystemMapping, Definition, SystemIndex};
use osi_store::DefinitionStore;
use polars::prelude::*;
use tracing::{debug, info, warn};

use crate::error::{FilterError, Result};
use crate::matcher::{CodeSet, match_columns, or_into};

/// Applies stored definitions to case tables.
#[derive(Debug, Clone, Copy)]
pub struct CaseFilter<'a> {
    store: &'a DefinitionStore,
}

impl<'a> CaseFilter<'a> {
    pub fn new(store: &'a DefinitionStore) -> Self {
        Self { store }
    }

    /// Loads `name` from the store and annotates `df` with it.
    pub fn filter_cases(
        &self,
        df: &DataFrame,
        mapping: &[CodingSystemMapping],
        name: &str,
        version: &str,
    ) -> Result<DataFrame> {
        let definition = self.store.load_definition(name, version)?;
        annotate(df, mapping, name, &definition)
    }

    /// Applies each definition in turn; every name contributes its own column.
    pub fn filter_cases_per_definitions<S: AsRef<str>>(
        &self,
        df: &DataFrame,
        mapping: &[CodingSystemMapping],
        names: &[S],
        version: &str,
    ) -> Result<DataFrame> {
        let mut annotated = df.clone();
        for name in names {
            annotated = self.filter_cases(&annotated, mapping, name.as_ref(), version)?;
        }
        Ok(annotated)
    }
}

/// Annotates `df` with a boolean column `name` marking rows that carry any of
/// the definition's codes in a mapped column.
///
/// Returns the table unchanged when the definition has no coded inclusion
/// criterion, and [`FilterError::NoApplicableMapping`] when codes exist but
/// none of their systems reach an existing column.
pub fn annotate(
    df: &DataFrame,
    mapping: &[CodingSystemMapping],
    name: &str,
    definition: &Definition,
) -> Result<DataFrame> {
    let codes_by_system = definition.codes_by_system();
    if codes_by_system.is_empty() {
        warn!(
            definition = name,
            "no coded inclusion criterion, table left unchanged"
        );
        return Ok(df.clone());
    }

    if let Some(operator) = definition
        .first_criterion()
        .and_then(|criterion| criterion.logical_operator.as_deref())
        .filter(|operator| !operator.eq_ignore_ascii_case("OR"))
    {
        debug!(
            definition = name,
            operator, "declared logical operator not applied, codes combined with OR"
        );
    }

    let index = SystemIndex::new(mapping);
    let mut combined: Option<Vec<bool>> = None;
    for (system, codes) in &codes_by_system {
        let columns = index.columns(system);
        if columns.is_empty() {
            debug!(definition = name, system = %system, "no mapping for coding system, skipping");
            continue;
        }
        debug!(
            definition = name,
            system = %system,
            columns = ?columns,
            codes = ?codes,
            "matching codes"
        );
        let code_set = CodeSet::parse(codes)?;
        let Some(mask) = match_columns(df, columns, &code_set)? else {
            continue;
        };
        match combined.as_mut() {
            Some(acc) => or_into(acc, &mask),
            None => combined = Some(mask),
        }
    }

    let Some(mask) = combined else {
        return Err(FilterError::NoApplicableMapping {
            definition: name.to_string(),
            systems: codes_by_system.into_keys().collect(),
        });
    };

    let matched = mask.iter().filter(|hit| **hit).count();
    let mut annotated = df.clone();
    annotated.with_column(Column::new(name.into(), mask))?;
    info!(
        definition = name,
        rows = annotated.height(),
        matched,
        "annotated cases"
    );
    Ok(annotated)
}

/// Rows whose annotation column `column` is true.
pub fn select_cases(df: &DataFrame, column: &str) -> Result<DataFrame> {
    let mask = annotation(df, column)?;
    Ok(df.filter(mask)?)
}

/// Rows flagged by at least one of the annotation `columns`.
///
/// An empty column list selects nothing.
pub fn select_any<S: AsRef<str>>(df: &DataFrame, columns: &[S]) -> Result<DataFrame> {
    let mut mask = BooleanChunked::full("selected".into(), false, df.height());
    for column in columns {
        let flags = annotation(df, column.as_ref())?;
        mask = &mask | flags;
    }
    Ok(df.filter(&mask)?)
}

/// Number of rows whose annotation column `column` is true.
pub fn count_matches(df: &DataFrame, column: &str) -> Result<usize> {
    let mask = annotation(df, column)?;
    Ok(mask.into_iter().filter(|hit| *hit == Some(true)).count())
}

fn annotation<'df>(df: &'df DataFrame, column: &str) -> Result<&'df BooleanChunked> {
    let missing = || FilterError::MissingAnnotation {
        column: column.to_string(),
    };
    let series = df.column(column).map_err(|_| missing())?;
    series.bool().map_err(|_| missing())
}
