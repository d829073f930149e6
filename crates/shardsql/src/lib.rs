//! Distributed SQL query compiler front-end
//!
//! This facade re-exports the member crates so embedders depend on one name:
//!
//! - [`ast`] — statement and expression trees with stable node identity
//! - [`catalog`] — table and vindex metadata plus the schema-lookup seam
//! - [`diagnostics`] — error codes and diagnostic messages
//! - [`semantics`] — the analyzer and the [`semantics::SemTable`] artifact
//!
//! # Example
//!
//! ```
//! use shardsql::ast::{AstBuilder, SelectItem, TableExpr};
//! use shardsql::catalog::{Column, MemorySchema, SqlType, Table};
//! use shardsql::semantics::analyze;
//!
//! let schema = MemorySchema::new().with_table(
//!     Table::new("user")
//!         .with_column(Column::new("id", SqlType::Int64))
//!         .authoritative(),
//! );
//!
//! let mut b = AstBuilder::new();
//! let id = b.column("id");
//! let from = vec![TableExpr::Aliased(b.table("user"))];
//! let select = b.select(vec![SelectItem::expr(id.clone())], from);
//! let statement = b.select_statement(select);
//!
//! let mut analysis = analyze(&statement, &schema).unwrap();
//! assert_eq!(analysis.table.recursive_deps(&id).number_of_tables(), 1);
//! ```

pub use shardsql_ast as ast;
pub use shardsql_catalog as catalog;
pub use shardsql_diagnostics as diagnostics;
pub use shardsql_semantics as semantics;
