//! Local store of Open Syndrome definitions.
//!
//! Definitions live under `<root>/<version>/<letter>/<name>.json`, where
//! `<letter>` is the lowercased first character of the name. Missing
//! definitions are downloaded on demand through a [`RemoteSource`], and the
//! whole repository can be bulk-fetched as a ZIP archive.
//!
//! # Example
//!
//! ```no_run
//! use osi_store::{DefinitionStore, HttpSource, StoreConfig, DEFAULT_VERSION};
//!
//! # fn main() -> osi_store::Result<()> {
//! let store = DefinitionStore::new(StoreConfig::load(None)?, HttpSource::new()?);
//! store.definitions_dir()?;
//! for name in store.find_definitions("arbovirosis", DEFAULT_VERSION)? {
//!     let definition = store.load_definition(&name, DEFAULT_VERSION)?;
//!     println!("{name}: {} criteria", definition.inclusion_criteria.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod config;
pub mod error;
pub mod remote;
pub mod schema;
pub mod store;

pub use archive::extract_definitions;
pub use config::StoreConfig;
pub use error::{Result, StoreError};
pub use remote::{HttpSource, OfflineSource, RemoteSource};
pub use schema::SchemaValidator;
pub use store::{DEFAULT_VERSION, DefinitionStore};
