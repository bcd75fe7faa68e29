//! Types shared by the Open Syndrome case-filtering crates.

pub mod code;
pub mod definition;
pub mod error;
pub mod mapping;

pub use code::{WILDCARD, is_wildcard, normalize_code};
pub use definition::{CodedValue, Criterion, CriterionValue, Definition};
pub use error::{ModelError, Result};
pub use mapping::{CodingSystemMapping, SystemIndex};
