//! Semantic analysis for the shardsql query compiler
//!
//! Given a parsed statement and a schema lookup, analysis resolves every
//! column reference to the table(s) producing it, assigns each referenced
//! table a stable per-statement ordinal, tracks provably equal columns, and
//! produces the [`SemTable`] artifact the planner reads:
//!
//! - [`TableSet`] — bitmask identifying a subset of the statement's tables
//! - [`TableInfo`] — what a table reference is (aliased table, vindex table)
//! - [`SemTable`] — the frozen artifact with the planner-facing query surface
//! - [`analyze`] — single-pass construction over one statement
//! - [`rewrite_derived_expression`] — projection substitution for derived
//!   tables

mod analyzer;
mod dependencies;
mod error;
mod rewriter;
mod scope;
mod sem_table;
mod table_info;
mod table_set;

pub use analyzer::{Analysis, analyze};
pub use dependencies::{Dependencies, Originable};
pub use error::{AnalysisError, AnalysisResult};
pub use rewriter::rewrite_derived_expression;
pub use scope::Scope;
pub use sem_table::{ExprDependencies, PulloutOpcode, SemTable, SubqueryRef};
pub use table_info::{AliasedTable, ColumnInfo, DerivedColumn, DerivedTable, TableInfo, VindexTable};
pub use table_set::{MAX_TABLES, TableSet};
