//! Diagnostics and error-code infrastructure for the shardsql analyzer
//!
//! This crate provides the shared error-reporting surface: structured error
//! codes, severities, and diagnostic messages that the catalog and semantic
//! analysis crates attach to their typed errors.

mod diagnostic;
mod error_code;

pub use diagnostic::*;
pub use error_code::*;
