//! In-memory schema registry
//!
//! A [`SchemaLookup`] implementation over plain maps. Tests build one with a
//! handful of tables; embedders can load one from deserialized catalog
//! records.

use crate::{
    CatalogError, CatalogResult, SchemaLookup, Table, TableResolution, TabletType, Vindex,
};
use indexmap::IndexMap;
use log::debug;
use shardsql_ast::TableName;
use std::sync::Arc;

/// An in-memory schema keyed by keyspace and table name
#[derive(Debug, Default)]
pub struct MemorySchema {
    /// Keyspace assumed for unqualified names
    default_keyspace: Option<String>,
    /// Tables keyed by `keyspace.name` (or bare name)
    tables: IndexMap<String, Arc<Table>>,
    /// Vindexes addressable by name
    vindexes: IndexMap<String, Vindex>,
    /// Tablet type reported for every resolution
    tablet_type: TabletType,
    /// When set, unknown names fail instead of resolving empty
    strict: bool,
}

impl MemorySchema {
    /// Create an empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the keyspace unqualified names resolve against
    pub fn with_default_keyspace(mut self, keyspace: impl Into<String>) -> Self {
        self.default_keyspace = Some(keyspace.into());
        self
    }

    /// Register a table
    pub fn with_table(mut self, table: Table) -> Self {
        let key = match &table.keyspace {
            Some(ks) => format!("{}.{}", ks, table.name),
            None => table.name.clone(),
        };
        self.tables.insert(key, Arc::new(table));
        self
    }

    /// Register a vindex addressable as a table name
    pub fn with_vindex(mut self, vindex: Vindex) -> Self {
        self.vindexes.insert(vindex.name.clone(), vindex);
        self
    }

    /// Fail lookups for unknown names instead of resolving empty
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    fn key_for(&self, name: &TableName) -> String {
        match (&name.qualifier, &self.default_keyspace) {
            (Some(q), _) => format!("{}.{}", q.as_str(), name.name.as_str()),
            (None, Some(ks)) => format!("{}.{}", ks, name.name.as_str()),
            (None, None) => name.name.as_str().to_owned(),
        }
    }
}

impl SchemaLookup for MemorySchema {
    fn find_table_or_vindex(&self, name: &TableName) -> CatalogResult<TableResolution> {
        let key = self.key_for(name);
        // The bare-name fallback is only for unqualified references; a
        // mismatched qualifier must not resolve to a bare-registered table.
        if let Some(table) = self.tables.get(&key).or_else(|| {
            name.qualifier
                .is_none()
                .then(|| self.tables.get(name.name.as_str()))
                .flatten()
        }) {
            debug!("resolved table '{}' via key '{}'", name, key);
            let mut resolution = TableResolution::table(Arc::clone(table));
            resolution.tablet_type = self.tablet_type;
            return Ok(resolution);
        }
        if let Some(vindex) = self.vindexes.get(name.name.as_str()) {
            debug!("resolved vindex '{}'", name);
            let mut resolution = TableResolution::vindex(vindex.clone());
            resolution.tablet_type = self.tablet_type;
            return Ok(resolution);
        }
        if self.strict {
            return Err(CatalogError::table_not_found(name.to_string()));
        }
        debug!("name '{}' unknown to catalog, resolving empty", name);
        Ok(TableResolution {
            tablet_type: self.tablet_type,
            ..TableResolution::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Column, SqlType, VindexKind};
    use pretty_assertions::assert_eq;

    fn schema() -> MemorySchema {
        MemorySchema::new()
            .with_default_keyspace("commerce")
            .with_table(
                Table::new("user")
                    .in_keyspace("commerce")
                    .with_column(Column::new("id", SqlType::Int64))
                    .authoritative(),
            )
            .with_vindex(Vindex::new("name_user_map", VindexKind::Lookup))
    }

    #[test]
    fn test_resolves_unqualified_through_default_keyspace() {
        let resolution = schema()
            .find_table_or_vindex(&TableName::simple("user"))
            .unwrap();
        assert_eq!(resolution.table.unwrap().name, "user");
    }

    #[test]
    fn test_resolves_vindex_name() {
        let resolution = schema()
            .find_table_or_vindex(&TableName::simple("name_user_map"))
            .unwrap();
        assert!(resolution.table.is_none());
        assert_eq!(resolution.vindex.unwrap().name, "name_user_map");
    }

    #[test]
    fn test_mismatched_qualifier_does_not_fall_back_to_bare_names() {
        let schema = MemorySchema::new()
            .with_table(Table::new("user").with_column(Column::new("id", SqlType::Int64)));

        let resolution = schema
            .find_table_or_vindex(&TableName::qualified("other", "user"))
            .unwrap();
        assert!(resolution.table.is_none());

        let resolution = schema
            .find_table_or_vindex(&TableName::simple("user"))
            .unwrap();
        assert!(resolution.table.is_some());
    }

    #[test]
    fn test_unknown_resolves_empty_unless_strict() {
        let resolution = schema()
            .find_table_or_vindex(&TableName::simple("ghost"))
            .unwrap();
        assert!(resolution.table.is_none() && resolution.vindex.is_none());

        let err = schema()
            .strict()
            .find_table_or_vindex(&TableName::simple("ghost"))
            .unwrap_err();
        assert_eq!(err, CatalogError::table_not_found("ghost"));
    }
}
