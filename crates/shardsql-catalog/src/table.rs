//! Table and vindex metadata records
//!
//! These are the deserialized catalog records the analyzer sees. A table's
//! column list may be incomplete: `column_list_authoritative` is the flag the
//! tri-state column resolution hinges on.

use crate::SqlType;
use serde::{Deserialize, Serialize};

/// One column of a catalog table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name
    pub name: String,
    /// Column type, when the catalog knows it
    pub sql_type: Option<SqlType>,
}

impl Column {
    /// Create a column with a known type
    pub fn new(name: impl Into<String>, sql_type: SqlType) -> Self {
        Self {
            name: name.into(),
            sql_type: Some(sql_type),
        }
    }

    /// Create a column of unknown type
    pub fn untyped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: None,
        }
    }
}

/// Routing vindex kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VindexKind {
    /// Deterministic hash of the routing key
    Hash,
    /// Secondary lookup table
    Lookup,
    /// Identity mapping over a numeric key
    Numeric,
}

/// A routing vindex
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vindex {
    /// Vindex name
    pub name: String,
    /// Vindex kind
    pub kind: VindexKind,
    /// Whether a key maps to at most one shard
    pub unique: bool,
}

impl Vindex {
    /// Create a vindex
    pub fn new(name: impl Into<String>, kind: VindexKind) -> Self {
        Self {
            name: name.into(),
            kind,
            unique: true,
        }
    }

    /// Mark the vindex as non-unique
    pub fn non_unique(mut self) -> Self {
        self.unique = false;
        self
    }
}

/// A vindex together with the table columns that feed it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnVindex {
    /// The routing-key columns, in vindex order
    pub columns: Vec<String>,
    /// The vindex those columns feed
    pub vindex: Vindex,
}

impl ColumnVindex {
    /// Create a single-column vindex binding
    pub fn single(column: impl Into<String>, vindex: Vindex) -> Self {
        Self {
            columns: vec![column.into()],
            vindex,
        }
    }
}

/// A table as recorded in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Table name
    pub name: String,
    /// Owning keyspace, when sharded
    pub keyspace: Option<String>,
    /// Known columns, in catalog order
    pub columns: Vec<Column>,
    /// True iff `columns` is known to be the complete column list
    pub column_list_authoritative: bool,
    /// Routing-key bindings
    pub column_vindexes: Vec<ColumnVindex>,
}

impl Table {
    /// Create a table with no columns; build it up with the `with_` methods
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            keyspace: None,
            columns: Vec::new(),
            column_list_authoritative: false,
            column_vindexes: Vec::new(),
        }
    }

    /// Set the owning keyspace
    pub fn in_keyspace(mut self, keyspace: impl Into<String>) -> Self {
        self.keyspace = Some(keyspace.into());
        self
    }

    /// Append a column
    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Mark the column list complete
    pub fn authoritative(mut self) -> Self {
        self.column_list_authoritative = true;
        self
    }

    /// Append a routing-key binding
    pub fn with_column_vindex(mut self, cv: ColumnVindex) -> Self {
        self.column_vindexes.push(cv);
        self
    }

    /// Look up a column by name, case-insensitively
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }
}
