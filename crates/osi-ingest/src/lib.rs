//! Case table ingestion.
//!
//! Reads case records from CSV into Polars DataFrames, writes annotated
//! tables back out, and loads coding-system mapping files.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use osi_ingest::{load_mapping_file, read_csv_table, write_csv_table};
//!
//! let mut cases = read_csv_table(Path::new("cases.csv"))?;
//! let mapping = load_mapping_file(Path::new("mapping.json"))?;
//! write_csv_table(&mut cases, Path::new("out/cases.csv"))?;
//! ```

mod csv;
mod error;
mod mapping;

// === Error Types ===
pub use error::{IngestError, Result};

// === CSV ===
pub use csv::{read_csv_table, write_csv, write_csv_table};

// === Mapping ===
pub use mapping::load_mapping_file;
