//! Integration tests for the definition store.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;
use std::rc::Rc;

use osi_store::{DefinitionStore, RemoteSource, StoreConfig, StoreError};
use zip::write::SimpleFileOptions;

const BASE_URL: &str = "https://defs.example.org/definitions";
const ARCHIVE_URL: &str = "https://defs.example.org/main.zip";
const SCHEMA_URL: &str = "https://defs.example.org/schema.json";

const ARBO: &str = r#"{"inclusion_criteria": [{"values": [{"code": {"system": "ICD-10", "code": "A92.9"}}]}]}"#;

/// In-memory remote that records every requested URL.
#[derive(Clone, Default)]
struct MemorySource {
    documents: HashMap<String, Vec<u8>>,
    requests: Rc<RefCell<Vec<String>>>,
}

impl MemorySource {
    fn with(mut self, url: &str, body: impl Into<Vec<u8>>) -> Self {
        self.documents.insert(url.to_string(), body.into());
        self
    }

    fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl RemoteSource for MemorySource {
    fn fetch(&self, url: &str) -> osi_store::Result<Vec<u8>> {
        self.requests.borrow_mut().push(url.to_string());
        self.documents
            .get(url)
            .cloned()
            .ok_or_else(|| StoreError::RemoteNotFound {
                url: url.to_string(),
            })
    }
}

fn config(root: &Path) -> StoreConfig {
    StoreConfig {
        definitions_root: root.join("definitions"),
        schema_path: root.join("schema").join("schema.json"),
        definitions_archive_url: ARCHIVE_URL.to_string(),
        definition_base_url: BASE_URL.to_string(),
        schema_url: SCHEMA_URL.to_string(),
    }
}

fn write_definition(root: &Path, relative: &str, body: &str) {
    let path = root.join("definitions").join(relative);
    fs::create_dir_all(path.parent().unwrap()).expect("create shard dir");
    fs::write(path, body).expect("write definition");
}

fn archive(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    for (name, body) in entries {
        writer.start_file(*name, options).expect("start entry");
        writer.write_all(body.as_bytes()).expect("write entry");
    }
    writer.finish().expect("finish archive").into_inner()
}

#[test]
fn loads_local_definition_without_network() {
    let dir = tempfile::tempdir().expect("temp dir");
    write_definition(dir.path(), "v1/a/arbovirosis_paraguay_sd.json", ARBO);
    let source = MemorySource::default();
    let store = DefinitionStore::new(config(dir.path()), source.clone());

    let definition = store
        .load_definition("arbovirosis_paraguay_sd", "v1")
        .expect("load definition");

    assert_eq!(definition.inclusion_criteria.len(), 1);
    assert!(source.requests().is_empty());
}

#[test]
fn downloads_and_caches_missing_definition() {
    let dir = tempfile::tempdir().expect("temp dir");
    let url = format!("{BASE_URL}/v1/a/arbovirosis_paraguay_sd.json");
    let source = MemorySource::default().with(&url, ARBO);
    let store = DefinitionStore::new(config(dir.path()), source.clone());

    store
        .load_definition("arbovirosis_paraguay_sd", "v1")
        .expect("first load");
    store
        .load_definition("arbovirosis_paraguay_sd", "v1")
        .expect("second load");

    assert_eq!(source.requests(), vec![url]);
    assert!(
        dir.path()
            .join("definitions/v1/a/arbovirosis_paraguay_sd.json")
            .is_file()
    );
}

#[test]
fn remote_miss_is_definition_not_found() {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = DefinitionStore::new(config(dir.path()), MemorySource::default());

    let err = store.load_definition("Unknown_sd", "v1").unwrap_err();

    assert!(err.is_not_found());
    match err {
        StoreError::DefinitionNotFound { name, path, .. } => {
            assert_eq!(name, "Unknown_sd");
            assert!(path.ends_with("v1/u/Unknown_sd.json"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn invalid_local_json_is_reported_with_path() {
    let dir = tempfile::tempdir().expect("temp dir");
    write_definition(dir.path(), "v1/b/broken_sd.json", "{ nope");
    let store = DefinitionStore::new(config(dir.path()), MemorySource::default());

    let err = store.load_definition("broken_sd", "v1").unwrap_err();

    assert!(matches!(err, StoreError::Json { .. }));
    assert!(err.to_string().contains("broken_sd.json"));
}

#[test]
fn finds_definitions_case_insensitively() {
    let dir = tempfile::tempdir().expect("temp dir");
    write_definition(dir.path(), "v1/a/arbovirosis_paraguay_sd.json", ARBO);
    write_definition(dir.path(), "v1/a/arbovirosis_aesop_brazil_sd.json", ARBO);
    write_definition(dir.path(), "v1/d/dengue_Arbovirosis_who_sd.json", ARBO);
    write_definition(dir.path(), "v1/i/influenza_like_illness_sd.json", ARBO);
    write_definition(dir.path(), "v2/a/arbovirosis_next_sd.json", ARBO);
    write_definition(dir.path(), "v1/a/arbovirosis_notes.txt", "");
    let store = DefinitionStore::new(config(dir.path()), MemorySource::default());

    let found = store.find_definitions("ARBOVIROSIS", "v1").expect("search");

    let names: Vec<&str> = found.iter().map(String::as_str).collect();
    assert_eq!(
        names,
        vec![
            "arbovirosis_aesop_brazil_sd",
            "arbovirosis_paraguay_sd",
            "dengue_Arbovirosis_who_sd",
        ]
    );
    assert!(store.find_definitions("arbo", "v9").expect("search").is_empty());
}

#[test]
fn bulk_downloads_when_cache_is_empty() {
    let dir = tempfile::tempdir().expect("temp dir");
    let data = archive(&[
        ("definitions-main/README.md", "# definitions"),
        ("definitions-main/definitions/v1/a/arbovirosis_paraguay_sd.json", ARBO),
        ("definitions-main/definitions/v1/i/influenza_like_illness_sd.json", ARBO),
    ]);
    let source = MemorySource::default().with(ARCHIVE_URL, data);
    let store = DefinitionStore::new(config(dir.path()), source.clone());

    let root = store.definitions_dir().expect("populate cache").to_path_buf();
    store.definitions_dir().expect("already populated");

    assert_eq!(source.requests(), vec![ARCHIVE_URL.to_string()]);
    assert!(root.join("v1/a/arbovirosis_paraguay_sd.json").is_file());
    assert!(root.join("v1/i/influenza_like_illness_sd.json").is_file());
    assert!(!root.join("README.md").exists());
}

#[test]
fn archive_without_definitions_is_an_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let data = archive(&[("definitions-main/README.md", "# definitions")]);
    let source = MemorySource::default().with(ARCHIVE_URL, data);
    let store = DefinitionStore::new(config(dir.path()), source);

    let err = store.definitions_dir().unwrap_err();

    assert!(matches!(err, StoreError::EmptyArchive { .. }));
}

#[test]
fn schema_download_is_idempotent() {
    let dir = tempfile::tempdir().expect("temp dir");
    let source = MemorySource::default().with(SCHEMA_URL, r#"{"required": ["title"]}"#);
    let store = DefinitionStore::new(config(dir.path()), source.clone());

    assert!(store.download_schema().expect("first download"));
    assert!(!store.download_schema().expect("second call"));
    let path = store.schema_path().expect("schema path").to_path_buf();

    assert_eq!(source.requests(), vec![SCHEMA_URL.to_string()]);
    assert_eq!(
        fs::read_to_string(path).expect("read schema"),
        r#"{"required": ["title"]}"#
    );
}

#[test]
fn schema_that_is_not_json_is_not_persisted() {
    let dir = tempfile::tempdir().expect("temp dir");
    let source = MemorySource::default().with(SCHEMA_URL, "<html>rate limited</html>");
    let store = DefinitionStore::new(config(dir.path()), source);

    let err = store.download_schema().unwrap_err();

    assert!(matches!(err, StoreError::Json { .. }));
    assert!(!store.config().schema_path.exists());
}

#[test]
fn schema_validator_downloads_then_checks_documents() {
    let dir = tempfile::tempdir().expect("temp dir");
    let source = MemorySource::default().with(SCHEMA_URL, r#"{"required": ["title"]}"#);
    let store = DefinitionStore::new(config(dir.path()), source.clone());
    let valid = dir.path().join("valid.json");
    let invalid = dir.path().join("invalid.json");
    fs::write(&valid, r#"{"title": "Arbovirosis"}"#).expect("write valid");
    fs::write(&invalid, ARBO).expect("write invalid");

    let validator = store.schema_validator().expect("compile schema");

    assert_eq!(validator.path(), store.config().schema_path.as_path());
    assert!(validator.validate_file(&valid).expect("validate").is_empty());
    let errors = validator.validate_file(&invalid).expect("validate");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("title"));
    assert_eq!(source.requests(), vec![SCHEMA_URL.to_string()]);
}
