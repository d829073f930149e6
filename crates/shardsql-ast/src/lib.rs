//! SQL Abstract Syntax Tree definitions for shardsql
//!
//! This crate defines the statement and expression nodes the semantic
//! analyzer consumes. Nodes are identity-stable: every expression, select,
//! and table expression carries a parser-assigned [`NodeId`] that stays the
//! same for the lifetime of one statement, which the analyzer's caches are
//! keyed on.

mod builder;
mod expr;
mod statement;

pub use builder::*;
pub use expr::*;
pub use statement::*;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identity of one AST node within one statement.
///
/// Assigned by the parser (or [`AstBuilder`]) in construction order. Two
/// distinct nodes never share an id; cloning a subtree preserves ids, so a
/// clone resolves to the same dependency entries as its original.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An identifier as written in the query
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identifier {
    /// The identifier text
    pub value: String,
}

impl Identifier {
    /// Create a new identifier
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// Get the identifier text
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Case-insensitive comparison, for column name matching
    pub fn matches_ignore_case(&self, other: &str) -> bool {
        self.value.eq_ignore_ascii_case(other)
    }
}

impl From<&str> for Identifier {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Identifier {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// A possibly qualified table name (e.g. `commerce.orders`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableName {
    /// Optional keyspace/schema qualifier
    pub qualifier: Option<Identifier>,
    /// The table name
    pub name: Identifier,
}

impl TableName {
    /// Create an unqualified table name
    pub fn simple(name: impl Into<Identifier>) -> Self {
        Self {
            qualifier: None,
            name: name.into(),
        }
    }

    /// Create a qualified table name
    pub fn qualified(qualifier: impl Into<Identifier>, name: impl Into<Identifier>) -> Self {
        Self {
            qualifier: Some(qualifier.into()),
            name: name.into(),
        }
    }

    /// Whether the name carries no qualifier
    pub fn is_unqualified(&self) -> bool {
        self.qualifier.is_none()
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.qualifier {
            Some(q) => write!(f, "{}.{}", q, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}
