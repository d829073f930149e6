//! The schema-lookup surface the analyzer resolves table names through

use crate::{CatalogResult, Table, Vindex};
use serde::{Deserialize, Serialize};
use shardsql_ast::TableName;
use std::fmt;
use std::sync::Arc;

/// Tablet type a resolved table should be routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TabletType {
    /// The writable primary
    #[default]
    Primary,
    /// A replica serving reads
    Replica,
    /// A read-only batch replica
    ReadOnly,
}

impl fmt::Display for TabletType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary => write!(f, "primary"),
            Self::Replica => write!(f, "replica"),
            Self::ReadOnly => write!(f, "rdonly"),
        }
    }
}

/// Routing destination pinned by the catalog for a resolved name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Destination {
    /// Fan out to all shards
    AllShards,
    /// A single named shard
    Shard(String),
    /// Any single shard
    AnyShard,
}

/// Everything a schema lookup reports about one table name
#[derive(Debug, Clone, Default)]
pub struct TableResolution {
    /// Catalog metadata, absent when the table is unknown to the catalog
    pub table: Option<Arc<Table>>,
    /// The vindex, when the name resolves to a vindex rather than a table
    pub vindex: Option<Vindex>,
    /// Rewritten target name for routed queries, when the catalog pins one
    pub target_name: Option<TableName>,
    /// Tablet type to target
    pub tablet_type: TabletType,
    /// Routing destination, when pinned
    pub destination: Option<Destination>,
}

impl TableResolution {
    /// A resolution carrying only table metadata
    pub fn table(table: Arc<Table>) -> Self {
        Self {
            table: Some(table),
            ..Self::default()
        }
    }

    /// A resolution carrying only a vindex
    pub fn vindex(vindex: Vindex) -> Self {
        Self {
            vindex: Some(vindex),
            ..Self::default()
        }
    }
}

/// Catalog lookup interface.
///
/// This is the only channel through which schema and topology information
/// enters semantic analysis.
pub trait SchemaLookup {
    /// Resolve a possibly qualified table name.
    ///
    /// A name unknown to the catalog is not an error: the lookup returns an
    /// empty resolution and the analyzer treats the table's column list as
    /// non-authoritative.
    fn find_table_or_vindex(&self, name: &TableName) -> CatalogResult<TableResolution>;
}
