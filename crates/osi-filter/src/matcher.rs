//! Per-row matching of coded cells against definition codes.
//!
//! Codes and cell values are compared after [`normalize_code`], so `A92.9`
//! in a definition matches both `A929` and `a92.9` in the data.
//!
//! - Literal codes are suffix-anchored: the cell must end with the code, so
//!   `A92` matches `A92` but not `A9299`.
//! - Codes containing `%` are SQL LIKE style wildcards (`%` = any run of
//!   characters) searched anywhere in the cell.
//! - Null or blank cells never match.

use osi_model::{WILDCARD, is_wildcard, normalize_code};
use polars::prelude::*;
use regex::Regex;

use crate::error::{FilterError, Result};

/// One target code of a definition.
#[derive(Debug, Clone)]
pub enum CodePattern {
    Literal(String),
    Wildcard { code: String, regex: Regex },
}

impl CodePattern {
    pub fn parse(code: &str) -> Result<Self> {
        let normalized = normalize_code(code);
        if !is_wildcard(&normalized) {
            return Ok(Self::Literal(normalized));
        }
        let expr = normalized
            .split(WILDCARD)
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");
        let regex = Regex::new(&expr).map_err(|source| FilterError::Pattern {
            code: code.to_string(),
            source,
        })?;
        Ok(Self::Wildcard {
            code: normalized,
            regex,
        })
    }

    /// The normalized code.
    pub fn code(&self) -> &str {
        match self {
            Self::Literal(code) | Self::Wildcard { code, .. } => code,
        }
    }

    pub fn matches(&self, value: &str) -> bool {
        let value = normalize_code(value);
        !value.is_empty() && self.matches_normalized(&value)
    }

    fn matches_normalized(&self, value: &str) -> bool {
        match self {
            Self::Literal(code) => !code.is_empty() && value.ends_with(code.as_str()),
            Self::Wildcard { regex, .. } => regex.is_match(value),
        }
    }
}

/// The codes of one coding system; a cell matches when any pattern does.
#[derive(Debug, Clone, Default)]
pub struct CodeSet {
    patterns: Vec<CodePattern>,
}

impl CodeSet {
    pub fn parse<S: AsRef<str>>(codes: &[S]) -> Result<Self> {
        let patterns = codes
            .iter()
            .map(|code| CodePattern::parse(code.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    pub fn patterns(&self) -> &[CodePattern] {
        &self.patterns
    }

    pub fn matches(&self, value: &str) -> bool {
        let value = normalize_code(value);
        if value.is_empty() {
            return false;
        }
        self.patterns
            .iter()
            .any(|pattern| pattern.matches_normalized(&value))
    }
}

/// ORs `codes` over every listed column present in `df`.
///
/// Column names must match exactly; absent columns are skipped. Returns
/// `None` when none of the columns exist.
pub fn match_columns(
    df: &DataFrame,
    columns: &[String],
    codes: &CodeSet,
) -> Result<Option<Vec<bool>>> {
    let mut mask: Option<Vec<bool>> = None;

    for column in columns {
        if df.get_column_index(column).is_none() {
            tracing::warn!(column = %column, "mapped column not found in table, skipping");
            continue;
        }
        let as_text = df.column(column)?.cast(&DataType::String)?;
        let values = as_text.str()?;
        let acc = mask.get_or_insert_with(|| vec![false; df.height()]);
        for (idx, value) in values.into_iter().enumerate() {
            if acc[idx] {
                continue;
            }
            if let Some(value) = value {
                acc[idx] = codes.matches(value);
            }
        }
    }

    Ok(mask)
}

/// Element-wise OR, in place.
pub(crate) fn or_into(acc: &mut [bool], other: &[bool]) {
    for (left, right) in acc.iter_mut().zip(other) {
        *left |= *right;
    }
}
