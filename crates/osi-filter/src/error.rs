use osi_store::StoreError;
use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FilterError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("dataframe error: {0}")]
    Polars(#[from] PolarsError),

    #[error("invalid wildcard code '{code}': {source}")]
    Pattern {
        code: String,
        #[source]
        source: regex::Error,
    },

    /// The definition has coded criteria but none of them reach a table column.
    #[error(
        "definition '{definition}' targets systems [{}] but no mapping entry points at an existing column",
        .systems.join(", ")
    )]
    NoApplicableMapping {
        definition: String,
        systems: Vec<String>,
    },

    #[error("no annotation column '{column}' in table")]
    MissingAnnotation { column: String },
}

pub type Result<T> = std::result::Result<T, FilterError>;
