use std::collections::BTreeSet;
use std::io::{self, IsTerminal};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use tracing::{info, info_span};

use osi_filter::{CaseFilter, OverlapSummary, count_matches, overlap_summary, select_any};
use osi_ingest::{load_mapping_file, read_csv_table, write_csv, write_csv_table};
use osi_store::{DefinitionStore, HttpSource, OfflineSource, StoreConfig};
use osi_cli::progress::ProgressSource;
use osi_cli::summary::AnnotationCount;

use crate::cli::{FetchArgs, FilterArgs, FindArgs, OverlapArgs, StoreArgs, ValidateArgs};

/// Resolves the store configuration and picks the remote source.
pub fn open_store(args: &StoreArgs) -> Result<DefinitionStore> {
    let mut config = StoreConfig::load(args.config.as_deref()).context("load configuration")?;
    if let Some(dir) = &args.definitions_dir {
        config = config.with_definitions_root(dir);
    }
    if let Some(file) = &args.schema_file {
        config = config.with_schema_path(file);
    }
    info!(
        definitions = %config.definitions_root.display(),
        schema = %config.schema_path.display(),
        offline = args.offline,
        "definition store"
    );

    if args.offline {
        return Ok(DefinitionStore::new(config, OfflineSource));
    }
    let http = HttpSource::new().context("create HTTP client")?;
    let source = ProgressSource::new(http, io::stderr().is_terminal());
    Ok(DefinitionStore::new(config, source))
}

pub fn run_find(store: &DefinitionStore, args: &FindArgs) -> Result<BTreeSet<String>> {
    let span = info_span!("find", term = %args.term, version = %args.version);
    let _guard = span.enter();
    store
        .definitions_dir()
        .context("prepare definitions directory")?;
    let names = store
        .find_definitions(&args.term, &args.version)
        .with_context(|| format!("search definitions for '{}'", args.term))?;
    Ok(names)
}

#[derive(Debug)]
pub struct FilterResult {
    pub rows: usize,
    pub written_rows: usize,
    pub output: Option<PathBuf>,
    pub counts: Vec<AnnotationCount>,
}

pub fn run_filter(store: &DefinitionStore, args: &FilterArgs) -> Result<FilterResult> {
    let span = info_span!("filter", input = %args.input.display(), version = %args.version);
    let _guard = span.enter();

    let cases = read_csv_table(&args.input)
        .with_context(|| format!("read cases from {}", args.input.display()))?;
    let mapping = match &args.mapping {
        Some(path) => load_mapping_file(path)
            .with_context(|| format!("load mapping from {}", path.display()))?,
        None => args.map.clone(),
    };
    if mapping.is_empty() {
        bail!("no coding-system mapping given");
    }

    let names = distinct(&args.definitions);
    let annotated = CaseFilter::new(store)
        .filter_cases_per_definitions(&cases, &mapping, &names, &args.version)
        .context("apply definitions")?;

    let mut counts = Vec::with_capacity(names.len());
    for name in &names {
        // Definitions without coded criteria add no column.
        let matched = if annotated.column(name).is_ok() {
            count_matches(&annotated, name)?
        } else {
            0
        };
        counts.push(AnnotationCount {
            definition: name.clone(),
            matched,
        });
    }

    let mut output = if args.select {
        let annotated_names: Vec<&String> = names
            .iter()
            .filter(|name| annotated.column(name).is_ok())
            .collect();
        select_any(&annotated, &annotated_names)?
    } else {
        annotated
    };

    match &args.output {
        Some(path) => write_csv_table(&mut output, path)
            .with_context(|| format!("write {}", path.display()))?,
        None => write_csv(&mut output, io::stdout().lock()).context("write to stdout")?,
    }

    Ok(FilterResult {
        rows: cases.height(),
        written_rows: output.height(),
        output: args.output.clone(),
        counts,
    })
}

pub fn run_overlap(store: &DefinitionStore, args: &OverlapArgs) -> Result<OverlapSummary> {
    let span = info_span!("overlap", version = %args.version);
    let _guard = span.enter();
    let Some(summary) = overlap_summary(store, &args.definitions, &args.version)
        .context("compute overlap")?
    else {
        bail!("overlap needs at least two definitions");
    };
    Ok(summary)
}

#[derive(Debug, Default)]
pub struct FetchResult {
    pub definitions_dir: Option<PathBuf>,
    pub schema: Option<(PathBuf, bool)>,
}

pub fn run_fetch(store: &DefinitionStore, args: &FetchArgs) -> Result<FetchResult> {
    let (definitions, schema) = args.targets();
    let mut result = FetchResult::default();
    if definitions {
        let dir = store
            .definitions_dir()
            .context("download definitions")?;
        result.definitions_dir = Some(dir.to_path_buf());
    }
    if schema {
        let downloaded = store.download_schema().context("download schema")?;
        result.schema = Some((store.config().schema_path.clone(), downloaded));
    }
    Ok(result)
}

#[derive(Debug)]
pub struct ValidateResult {
    pub schema: PathBuf,
    pub errors: Vec<String>,
}

pub fn run_validate(store: &DefinitionStore, args: &ValidateArgs) -> Result<ValidateResult> {
    let span = info_span!("validate", file = %args.file.display());
    let _guard = span.enter();
    let validator = store.schema_validator().context("load schema")?;
    let errors = validator
        .validate_file(&args.file)
        .with_context(|| format!("read {}", args.file.display()))?;
    Ok(ValidateResult {
        schema: validator.path().to_path_buf(),
        errors,
    })
}

/// First occurrence order, duplicates dropped.
fn distinct(names: &[String]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    names
        .iter()
        .filter(|name| seen.insert(name.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_keeps_first_occurrence() {
        let names = vec!["b".to_string(), "a".to_string(), "b".to_string()];
        assert_eq!(distinct(&names), vec!["b", "a"]);
    }
}
