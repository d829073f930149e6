//! Table-info variants
//!
//! Everything in a query block that produces columns is one of these. The
//! enum is closed on purpose: every operation is matched exhaustively, so an
//! unsupported combination is a visible error value rather than a panic
//! buried in a trait object.

use crate::TableSet;
use crate::dependencies::{Dependencies, Originable};
use crate::error::{AnalysisError, AnalysisResult};
use shardsql_ast::{Expr, Identifier, NodeId, TableName};
use shardsql_catalog::{SqlType, Table, Vindex};
use std::collections::HashSet;
use std::sync::Arc;

/// Name and semantic type of one visible column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    /// Column name
    pub name: String,
    /// Column type, when known
    pub column_type: Option<SqlType>,
}

/// A thing that produces columns in a query block
#[derive(Debug, Clone)]
pub enum TableInfo {
    /// A table referenced directly or through an alias, including derived
    /// tables
    Aliased(AliasedTable),
    /// A table reference resolved to a routing vindex
    Vindex(VindexTable),
}

/// A directly-named or aliased table, or a derived table
#[derive(Debug, Clone)]
pub struct AliasedTable {
    /// The name this table is visible under, when derivable
    name: Option<TableName>,
    /// The AST table-expression node this info was built from
    node: NodeId,
    /// Catalog metadata, when the catalog knows the table
    table: Option<Arc<Table>>,
    /// Exposed projection, for derived tables
    derived: Option<DerivedTable>,
    /// Whether the reference targets `information_schema`
    is_inf_schema: bool,
}

/// The exposed column list of a derived table
#[derive(Debug, Clone)]
pub struct DerivedTable {
    /// Exposed columns in projection order
    pub columns: Vec<DerivedColumn>,
    /// True iff every projection item exposes a name (no star, no unnamed
    /// expression); only then is absence of a name proof of absence
    pub authoritative: bool,
}

/// One exposed column of a derived table
#[derive(Debug, Clone)]
pub struct DerivedColumn {
    /// The name the column is exposed under
    pub name: Identifier,
    /// The defining expression inside the derived table
    pub expr: Expr,
}

/// A table reference routed through a vindex
#[derive(Debug, Clone)]
pub struct VindexTable {
    /// The wrapped table info most queries delegate to
    inner: Box<TableInfo>,
    /// The routing vindex
    vindex: Vindex,
}

impl AliasedTable {
    /// Info for a table referenced by name, with optional catalog metadata
    pub fn new(
        node: NodeId,
        name: Option<TableName>,
        table: Option<Arc<Table>>,
        is_inf_schema: bool,
    ) -> Self {
        Self {
            name,
            node,
            table,
            derived: None,
            is_inf_schema,
        }
    }

    /// Info for a derived table with the given exposed projection
    pub fn derived(node: NodeId, name: Option<TableName>, derived: DerivedTable) -> Self {
        Self {
            name,
            node,
            table: None,
            derived: Some(derived),
            is_inf_schema: false,
        }
    }

    fn columns(&self) -> Vec<ColumnInfo> {
        if let Some(derived) = &self.derived {
            return derived
                .columns
                .iter()
                .map(|dc| ColumnInfo {
                    name: dc.name.as_str().to_owned(),
                    column_type: None,
                })
                .collect();
        }
        let Some(table) = &self.table else {
            return Vec::new();
        };
        let mut seen: HashSet<String> = HashSet::new();
        let mut cols = Vec::with_capacity(table.columns.len());
        for col in &table.columns {
            if seen.insert(col.name.to_ascii_lowercase()) {
                cols.push(ColumnInfo {
                    name: col.name.clone(),
                    column_type: col.sql_type,
                });
            }
        }
        if table.column_list_authoritative {
            return cols;
        }
        // The catalog row is incomplete; routing-key columns are still known
        // to exist, so synthesize them.
        for cv in &table.column_vindexes {
            for name in &cv.columns {
                if seen.insert(name.to_ascii_lowercase()) {
                    cols.push(ColumnInfo {
                        name: name.clone(),
                        column_type: None,
                    });
                }
            }
        }
        cols
    }

    fn authoritative(&self) -> bool {
        match (&self.derived, &self.table) {
            (Some(derived), _) => derived.authoritative,
            (None, Some(table)) => table.column_list_authoritative,
            (None, None) => false,
        }
    }

    fn dependencies_for(&self, column: &str, org: &mut dyn Originable) -> Dependencies {
        let ts = org.table_set_for(self.node);
        if let Some(derived) = &self.derived {
            for dc in &derived.columns {
                if dc.name.matches_ignore_case(column) {
                    let (_, recursive) = org.deps_for_expr(&dc.expr);
                    let column_type = org.type_for(&dc.expr);
                    return Dependencies::certain(ts, recursive, column_type);
                }
            }
            return if derived.authoritative {
                Dependencies::Absent
            } else {
                Dependencies::uncertain(ts, ts)
            };
        }
        deps_from_columns(&self.columns(), column, ts, self.authoritative())
    }

    fn expr_for(&self, column: &str) -> AnalysisResult<Expr> {
        if let Some(derived) = &self.derived {
            for dc in &derived.columns {
                if dc.name.matches_ignore_case(column) {
                    return Ok(dc.expr.clone());
                }
            }
        }
        Err(AnalysisError::unresolvable_column(column))
    }
}

impl VindexTable {
    /// Wrap a table info with its routing vindex
    pub fn new(inner: TableInfo, vindex: Vindex) -> Self {
        Self {
            inner: Box::new(inner),
            vindex,
        }
    }

    /// The routing vindex
    pub fn vindex(&self) -> &Vindex {
        &self.vindex
    }
}

/// Linear, case-insensitive scan of a column list.
///
/// A match proves the column; no match proves absence only when the list is
/// authoritative.
fn deps_from_columns(
    columns: &[ColumnInfo],
    column: &str,
    ts: TableSet,
    authoritative: bool,
) -> Dependencies {
    for info in columns {
        if info.name.eq_ignore_ascii_case(column) {
            return Dependencies::certain(ts, ts, info.column_type);
        }
    }
    if authoritative {
        Dependencies::Absent
    } else {
        Dependencies::uncertain(ts, ts)
    }
}

impl TableInfo {
    /// Whether a table reference with this name resolves to this table
    pub fn matches(&self, name: &TableName) -> bool {
        match self {
            Self::Aliased(a) => match &a.name {
                None => false,
                Some(own) => {
                    own.name == name.name
                        && (name.qualifier.is_none() || name.qualifier == own.qualifier)
                }
            },
            Self::Vindex(v) => v.inner.matches(name),
        }
    }

    /// Whether absence from [`TableInfo::columns`] proves a column does not
    /// exist
    pub fn authoritative(&self) -> bool {
        match self {
            Self::Aliased(a) => a.authoritative(),
            // Routing resolution guarantees column completeness through the
            // routing-key metadata.
            Self::Vindex(_) => true,
        }
    }

    /// The resolved name of this table
    pub fn name(&self) -> AnalysisResult<TableName> {
        match self {
            Self::Aliased(a) => a.name.clone().ok_or(AnalysisError::MissingTableName),
            Self::Vindex(v) => v.inner.name(),
        }
    }

    /// The AST node this table was registered from
    pub fn node_id(&self) -> NodeId {
        match self {
            Self::Aliased(a) => a.node,
            Self::Vindex(v) => v.inner.node_id(),
        }
    }

    /// The ordered visible column list, duplicates suppressed
    /// case-insensitively
    pub fn columns(&self) -> Vec<ColumnInfo> {
        match self {
            Self::Aliased(a) => a.columns(),
            Self::Vindex(v) => v.inner.columns(),
        }
    }

    /// Resolve one column name against this table
    pub fn dependencies_for(&self, column: &str, org: &mut dyn Originable) -> Dependencies {
        match self {
            Self::Aliased(a) => a.dependencies_for(column, org),
            Self::Vindex(v) => {
                // Delegate the scan but force authoritativeness: the vindex
                // variant proves absence even when the wrapped table cannot.
                let ts = org.table_set_for(v.inner.node_id());
                deps_from_columns(&v.inner.columns(), column, ts, true)
            }
        }
    }

    /// The defining expression behind an exposed column name.
    ///
    /// Only derived tables can answer this; the vindex variant reports the
    /// operation as unsupported.
    pub fn expr_for(&self, column: &str) -> AnalysisResult<Expr> {
        match self {
            Self::Aliased(a) => a.expr_for(column),
            Self::Vindex(_) => Err(AnalysisError::unsupported(
                "column expression lookup",
                "a vindex table",
            )),
        }
    }

    /// Catalog metadata, when present
    pub fn catalog_table(&self) -> Option<&Arc<Table>> {
        match self {
            Self::Aliased(a) => a.table.as_ref(),
            Self::Vindex(v) => v.inner.catalog_table(),
        }
    }

    /// The routing vindex, for the vindex variant
    pub fn vindex(&self) -> Option<&Vindex> {
        match self {
            Self::Aliased(_) => None,
            Self::Vindex(v) => Some(&v.vindex),
        }
    }

    /// Whether the reference targets `information_schema`
    pub fn is_inf_schema(&self) -> bool {
        match self {
            Self::Aliased(a) => a.is_inf_schema,
            Self::Vindex(v) => v.inner.is_inf_schema(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TableSet;
    use pretty_assertions::assert_eq;
    use shardsql_catalog::{Column, ColumnVindex, VindexKind};

    struct FixedOrg(TableSet);

    impl Originable for FixedOrg {
        fn table_set_for(&self, _node: NodeId) -> TableSet {
            self.0
        }

        fn deps_for_expr(&mut self, _expr: &Expr) -> (TableSet, TableSet) {
            (self.0, self.0)
        }

        fn type_for(&self, _expr: &Expr) -> Option<SqlType> {
            None
        }
    }

    fn user_table(authoritative: bool) -> Arc<Table> {
        let mut table = Table::new("user")
            .with_column(Column::new("id", SqlType::Int64))
            .with_column(Column::new("name", SqlType::VarChar));
        if authoritative {
            table = table.authoritative();
        }
        Arc::new(table)
    }

    fn info(authoritative: bool) -> TableInfo {
        TableInfo::Aliased(AliasedTable::new(
            NodeId(0),
            Some(TableName::simple("user")),
            Some(user_table(authoritative)),
            false,
        ))
    }

    #[test]
    fn test_known_column_is_certain() {
        let mut org = FixedOrg(TableSet::singleton(0));
        let deps = info(true).dependencies_for("ID", &mut org);
        assert_eq!(
            deps,
            Dependencies::certain(
                TableSet::singleton(0),
                TableSet::singleton(0),
                Some(SqlType::Int64)
            )
        );
    }

    #[test]
    fn test_missing_column_tri_state() {
        let mut org = FixedOrg(TableSet::singleton(0));
        assert_eq!(
            info(true).dependencies_for("missing", &mut org),
            Dependencies::Absent
        );
        assert_eq!(
            info(false).dependencies_for("missing", &mut org),
            Dependencies::uncertain(TableSet::singleton(0), TableSet::singleton(0))
        );
    }

    #[test]
    fn test_vindex_variant_is_always_authoritative() {
        let vindex = Vindex::new("hash", VindexKind::Hash);
        let wrapped = TableInfo::Vindex(VindexTable::new(info(false), vindex));
        assert!(wrapped.authoritative());

        let mut org = FixedOrg(TableSet::singleton(0));
        assert_eq!(
            wrapped.dependencies_for("missing", &mut org),
            Dependencies::Absent
        );
    }

    #[test]
    fn test_vindex_columns_synthesized_when_not_authoritative() {
        let table = Arc::new(
            Table::new("user")
                .with_column(Column::new("id", SqlType::Int64))
                .with_column_vindex(ColumnVindex::single(
                    "region",
                    Vindex::new("region_hash", VindexKind::Hash),
                )),
        );
        let info = TableInfo::Aliased(AliasedTable::new(
            NodeId(0),
            Some(TableName::simple("user")),
            Some(table),
            false,
        ));
        let names: Vec<_> = info.columns().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["id".to_owned(), "region".to_owned()]);
    }

    #[test]
    fn test_matches_alias_and_qualifier() {
        let aliased = TableInfo::Aliased(AliasedTable::new(
            NodeId(0),
            Some(TableName::simple("u")),
            None,
            false,
        ));
        assert!(aliased.matches(&TableName::simple("u")));
        assert!(!aliased.matches(&TableName::simple("user")));
        assert!(!aliased.matches(&TableName::qualified("commerce", "u")));

        let qualified = TableInfo::Aliased(AliasedTable::new(
            NodeId(1),
            Some(TableName::qualified("commerce", "user")),
            None,
            false,
        ));
        assert!(qualified.matches(&TableName::simple("user")));
        assert!(qualified.matches(&TableName::qualified("commerce", "user")));
        assert!(!qualified.matches(&TableName::qualified("other", "user")));
    }

    #[test]
    fn test_expr_for_unsupported_on_vindex() {
        let vindex = Vindex::new("hash", VindexKind::Hash);
        let wrapped = TableInfo::Vindex(VindexTable::new(info(true), vindex));
        assert!(matches!(
            wrapped.expr_for("id"),
            Err(AnalysisError::UnsupportedOperation { .. })
        ));
    }
}
