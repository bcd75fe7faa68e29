//! Case filtering and definition overlap.
//!
//! A [`CaseFilter`] loads definitions from a [`osi_store::DefinitionStore`]
//! and annotates a case table with one boolean column per definition. The
//! column is true for rows holding any of the definition's codes in a column
//! mapped to the code's coding system.
//!
//! ```no_run
//! use osi_filter::{CaseFilter, select_cases};
//! use osi_model::CodingSystemMapping;
//! use osi_store::{DefinitionStore, HttpSource, StoreConfig, DEFAULT_VERSION};
//! use polars::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = DefinitionStore::new(StoreConfig::load(None)?, HttpSource::new()?);
//! let cases = df!("my_icd_code" => ["A92.9", "J10", "A929"])?;
//! let mapping = [CodingSystemMapping::new("ICD-10", "my_icd_code")];
//!
//! let annotated = CaseFilter::new(&store).filter_cases(
//!     &cases,
//!     &mapping,
//!     "arbovirosis_paraguay_sd",
//!     DEFAULT_VERSION,
//! )?;
//! let matching = select_cases(&annotated, "arbovirosis_paraguay_sd")?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod filter;
pub mod matcher;
pub mod overlap;

pub use error::{FilterError, Result};
pub use filter::{CaseFilter, annotate, count_matches, select_any, select_cases};
pub use matcher::{CodePattern, CodeSet, match_columns};
pub use overlap::{
    DefinitionShare, OverlapSummary, overlap_codes, overlap_definitions, overlap_summary,
};
