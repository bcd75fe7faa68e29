//! Library components of the `osi` command-line tool.

pub mod logging;
pub mod progress;
pub mod summary;
