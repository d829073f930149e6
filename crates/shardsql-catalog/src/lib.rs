//! Catalog metadata and the schema-lookup surface
//!
//! This crate is the only channel through which catalog/topology information
//! reaches the semantic analyzer: table metadata with column lists and
//! routing vindexes, the [`SchemaLookup`] trait the analyzer resolves names
//! through, and an in-memory implementation for tests and embedding. The
//! tablet persistence layer that feeds a production catalog lives elsewhere.

mod error;
mod lookup;
mod schema;
mod table;
mod types;

pub use error::*;
pub use lookup::*;
pub use schema::*;
pub use table::*;
pub use types::*;
