//! The semantic artifact handed to the planner

use crate::error::{AnalysisError, AnalysisResult};
use crate::scope::Scope;
use crate::table_info::TableInfo;
use crate::table_set::TableSet;
use serde::{Deserialize, Serialize};
use shardsql_ast::{Expr, NodeId, walk_expr};
use shardsql_catalog::SqlType;
use std::collections::HashMap;
use std::fmt;

/// How a subquery's result is pulled into the outer query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PulloutOpcode {
    /// Scalar value substitution
    Value,
    /// IN comparison
    In,
    /// NOT IN comparison
    NotIn,
    /// EXISTS check
    Exists,
}

impl fmt::Display for PulloutOpcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value => write!(f, "PulloutValue"),
            Self::In => write!(f, "PulloutIn"),
            Self::NotIn => write!(f, "PulloutNotIn"),
            Self::Exists => write!(f, "PulloutExists"),
        }
    }
}

/// Registry entry for one subquery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubqueryRef {
    /// Bind-variable name the subquery result is exposed under
    pub arg_name: String,
    /// How the result is pulled into the outer query
    pub opcode: PulloutOpcode,
    /// The subquery expression node
    pub subquery: NodeId,
}

/// Key of the column-equality map
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ColumnName {
    /// Direct dependency of the column reference
    table: TableSet,
    /// Column name, lowercased
    column: String,
}

/// Memoized expression-to-table-set map.
///
/// Column leaves are inserted while the analyzer binds them; composite
/// expressions are resolved lazily by walking their subtree, summarizing
/// cache hits without descending below them, and memoizing the result.
#[derive(Debug, Clone, Default)]
pub struct ExprDependencies {
    deps: HashMap<NodeId, TableSet>,
}

impl ExprDependencies {
    /// Record the dependencies of one node
    pub fn insert(&mut self, id: NodeId, set: TableSet) {
        self.deps.insert(id, set);
    }

    /// Cached entry for one node, without walking
    pub fn cached(&self, id: NodeId) -> Option<TableSet> {
        self.deps.get(&id).copied()
    }

    /// The tables the expression depends on
    pub fn dependencies(&mut self, expr: &Expr) -> TableSet {
        self.dependencies_counted(expr).0
    }

    /// Like [`ExprDependencies::dependencies`], also reporting how many
    /// nodes the walk visited; zero means the answer came straight from the
    /// memo.
    pub(crate) fn dependencies_counted(&mut self, expr: &Expr) -> (TableSet, u32) {
        if expr.valid_as_memo_key()
            && let Some(deps) = self.deps.get(&expr.id)
        {
            return (*deps, 0);
        }
        let mut deps = TableSet::EMPTY;
        let mut visited = 0;
        {
            let cache = &self.deps;
            walk_expr(expr, &mut |node| {
                visited += 1;
                // Nodes that cannot serve as stable keys are walked through;
                // their children may still carry cached summaries.
                if !node.valid_as_memo_key() {
                    return true;
                }
                match cache.get(&node.id) {
                    Some(set) => {
                        deps |= *set;
                        false
                    }
                    None => true,
                }
            });
        }
        if expr.valid_as_memo_key() {
            self.deps.insert(expr.id, deps);
        }
        (deps, visited)
    }
}

/// Semantic analysis artifact for one statement.
///
/// Built by one single-threaded traversal and then logically frozen. The
/// dependency accessors still memoize internally, which is why they take
/// `&mut self`; keep each artifact on one thread while the planner queries
/// it.
#[derive(Debug, Default)]
pub struct SemTable {
    /// Registered tables; index is the table's ordinal and bit position
    pub(crate) tables: Vec<TableInfo>,
    /// Dependencies resolved through every derived-table boundary
    pub(crate) recursive: ExprDependencies,
    /// Nearest-boundary dependencies
    pub(crate) direct: ExprDependencies,
    /// Scope arena
    pub(crate) scopes: Vec<Scope>,
    /// Scope of each select block
    pub(crate) select_scope: HashMap<NodeId, usize>,
    /// Known expression types
    pub(crate) expr_types: HashMap<NodeId, SqlType>,
    /// Subqueries per enclosing select
    pub(crate) subquery_map: HashMap<NodeId, Vec<SubqueryRef>>,
    /// Registry entry per subquery node
    pub(crate) subquery_ref: HashMap<NodeId, SubqueryRef>,
    /// Expressions proven equal, keyed by column identity
    pub(crate) column_equalities: HashMap<ColumnName, Vec<Expr>>,
    /// Non-fatal error captured while analyzing the projection list
    pub(crate) projection_err: Option<AnalysisError>,
}

impl SemTable {
    /// The singleton set for a registered table-expression node, or the
    /// empty set when the node was never registered
    pub fn table_set_for(&self, node: NodeId) -> TableSet {
        for (ordinal, table) in self.tables.iter().enumerate() {
            if table.node_id() == node {
                return TableSet::singleton(ordinal);
            }
        }
        TableSet::EMPTY
    }

    /// The table info behind a singleton table set.
    ///
    /// More than one bit set is a caller bug surfaced as
    /// [`AnalysisError::MultipleTables`]; an empty or unregistered set
    /// reports [`AnalysisError::NoTableInfo`].
    pub fn table_info_for(&self, set: TableSet) -> AnalysisResult<&TableInfo> {
        if set.number_of_tables() > 1 {
            return Err(AnalysisError::MultipleTables);
        }
        set.table_offset()
            .and_then(|offset| self.tables.get(offset))
            .ok_or(AnalysisError::NoTableInfo)
    }

    /// All registered tables, in ordinal order
    pub fn tables(&self) -> &[TableInfo] {
        &self.tables
    }

    /// Fully resolved base-table dependencies of an expression
    pub fn recursive_deps(&mut self, expr: &Expr) -> TableSet {
        self.recursive.dependencies(expr)
    }

    /// Nearest-boundary dependencies of an expression
    pub fn direct_deps(&mut self, expr: &Expr) -> TableSet {
        self.direct.dependencies(expr)
    }

    /// Copy the dependencies recorded for one expression onto another.
    ///
    /// Used by rewrites that substitute an equivalent expression and need
    /// the replacement to resolve identically.
    pub fn copy_dependencies(&mut self, from: &Expr, to: &Expr) {
        let recursive = self.recursive.dependencies(from);
        let direct = self.direct.dependencies(from);
        self.recursive.insert(to.id, recursive);
        self.direct.insert(to.id, direct);
    }

    /// Record the exposed projection of a registered table, binding each
    /// expression to the table's set
    pub fn add_exprs<'a>(&mut self, table: NodeId, exprs: impl IntoIterator<Item = &'a Expr>) {
        let set = self.table_set_for(table);
        for expr in exprs {
            self.recursive.insert(expr.id, set);
        }
    }

    /// The table info an expression resolves to.
    ///
    /// Only defined for expressions with a single direct table dependency.
    pub fn table_info_for_expr(&mut self, expr: &Expr) -> AnalysisResult<&TableInfo> {
        let set = self.direct.dependencies(expr);
        self.table_info_for(set)
    }

    /// The tables visible in a select block, in registration order
    pub fn select_tables(&self, select: NodeId) -> Vec<&TableInfo> {
        let Some(&scope_idx) = self.select_scope.get(&select) else {
            return Vec::new();
        };
        self.scopes[scope_idx]
            .table_ordinals()
            .map(|ordinal| &self.tables[ordinal])
            .collect()
    }

    /// The scope of a select block, when it was analyzed
    pub fn scope_for(&self, select: NodeId) -> Option<&Scope> {
        self.select_scope
            .get(&select)
            .map(|&idx| &self.scopes[idx])
    }

    /// The cached type of an expression
    pub fn type_for(&self, expr: &Expr) -> Option<SqlType> {
        self.expr_types.get(&expr.id).copied()
    }

    /// Subqueries registered under a select block
    pub fn subqueries(&self, select: NodeId) -> &[SubqueryRef] {
        self.subquery_map
            .get(&select)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Registry entry for one subquery node
    pub fn subquery_for(&self, subquery: NodeId) -> Option<&SubqueryRef> {
        self.subquery_ref.get(&subquery)
    }

    /// The soft error captured while analyzing the projection list, if any.
    ///
    /// A set value blocks single-table optimizations but does not abort
    /// planning.
    pub fn projection_error(&self) -> Option<&AnalysisError> {
        self.projection_err.as_ref()
    }

    /// Record that a column is equal to another expression
    pub fn add_column_equality(&mut self, column: &Expr, equal_to: Expr) {
        let Some(col) = column.as_column() else {
            return;
        };
        let table = self.direct.dependencies(column);
        let key = ColumnName {
            table,
            column: col.name.as_str().to_ascii_lowercase(),
        };
        self.column_equalities.entry(key).or_default().push(equal_to);
    }

    /// The expression itself plus every expression recorded equal to it
    pub fn expr_and_equalities<'a>(&'a mut self, expr: &'a Expr) -> Vec<&'a Expr> {
        let mut result = vec![expr];
        if let Some(col) = expr.as_column() {
            let table = self.direct.dependencies(expr);
            let key = ColumnName {
                table,
                column: col.name.as_str().to_ascii_lowercase(),
            };
            if let Some(equalities) = self.column_equalities.get(&key) {
                result.extend(equalities.iter());
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use shardsql_ast::{AstBuilder, BinaryOp};

    #[test]
    fn test_memoized_lookup_is_idempotent_and_walk_free() {
        let mut b = AstBuilder::new();
        let id = b.column("id");
        let forty_two = b.int(42);
        let sum = b.binary(BinaryOp::Add, id.clone(), forty_two);

        let mut deps = ExprDependencies::default();
        deps.insert(id.id, TableSet::singleton(0));

        let (first, visited) = deps.dependencies_counted(&sum);
        assert_eq!(first, TableSet::singleton(0));
        assert!(visited > 0);

        let (second, visited) = deps.dependencies_counted(&sum);
        assert_eq!(second, first);
        assert_eq!(visited, 0);
    }

    #[test]
    fn test_cache_hit_stops_descent() {
        let mut b = AstBuilder::new();
        let left = b.column("a");
        let right = b.column("b");
        let sum = b.binary(BinaryOp::Add, left, right);
        let one = b.int(1);
        let outer = b.binary(BinaryOp::Mul, sum.clone(), one);

        let mut deps = ExprDependencies::default();
        // The inner sum is already summarized; its children never were.
        deps.insert(sum.id, TableSet::singleton(2));

        let (result, visited) = deps.dependencies_counted(&outer);
        assert_eq!(result, TableSet::singleton(2));
        // outer, sum, literal: the sum's children are not visited
        assert_eq!(visited, 3);
    }

    #[test]
    fn test_tuple_walked_through_but_not_cached() {
        let mut b = AstBuilder::new();
        let item = b.column("a");
        let tuple = b.tuple(vec![item.clone()]);

        let mut deps = ExprDependencies::default();
        deps.insert(item.id, TableSet::singleton(1));

        let (result, _) = deps.dependencies_counted(&tuple);
        assert_eq!(result, TableSet::singleton(1));
        assert_eq!(deps.cached(tuple.id), None);

        // second lookup walks again, same answer
        let (again, visited) = deps.dependencies_counted(&tuple);
        assert_eq!(again, result);
        assert!(visited > 0);
    }

    #[test]
    fn test_copied_dependencies_resolve_identically() {
        let mut b = AstBuilder::new();
        let original = b.column("id");
        let replacement = b.column("user_id");

        let mut table = SemTable::default();
        table.direct.insert(original.id, TableSet::singleton(1));
        table.recursive.insert(original.id, TableSet::singleton(0));

        table.copy_dependencies(&original, &replacement);
        assert_eq!(table.direct_deps(&replacement), TableSet::singleton(1));
        assert_eq!(table.recursive_deps(&replacement), TableSet::singleton(0));
    }

    #[test]
    fn test_add_exprs_binds_projection_to_table() {
        let mut b = AstBuilder::new();
        let first = b.column("a");
        let second = b.column("b");

        let mut table = SemTable::default();
        table.tables.push(crate::table_info::TableInfo::Aliased(
            crate::table_info::AliasedTable::new(
                NodeId(9),
                Some(shardsql_ast::TableName::simple("d")),
                None,
                false,
            ),
        ));

        table.add_exprs(NodeId(9), [&first, &second]);
        assert_eq!(table.recursive_deps(&first), TableSet::singleton(0));
        assert_eq!(table.recursive_deps(&second), TableSet::singleton(0));
    }

    #[test]
    fn test_equalities_default_to_self() {
        let mut b = AstBuilder::new();
        let col = b.column("id");
        let mut table = SemTable::default();
        table.direct.insert(col.id, TableSet::singleton(0));

        let found = table.expr_and_equalities(&col);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, col.id);
    }

    #[test]
    fn test_recorded_equality_is_returned() {
        let mut b = AstBuilder::new();
        let col = b.column("id");
        let lit = b.int(7);
        let mut table = SemTable::default();
        table.direct.insert(col.id, TableSet::singleton(0));

        table.add_column_equality(&col, lit.clone());
        let found = table.expr_and_equalities(&col);
        assert_eq!(found.len(), 2);
        assert_eq!(found[1].id, lit.id);
    }

    #[test]
    fn test_equality_key_ignores_reference_case() {
        let mut b = AstBuilder::new();
        let lower = b.column("id");
        let upper = b.column("ID");
        let lit = b.int(7);
        let mut table = SemTable::default();
        table.direct.insert(lower.id, TableSet::singleton(0));
        table.direct.insert(upper.id, TableSet::singleton(0));

        table.add_column_equality(&lower, lit);
        assert_eq!(table.expr_and_equalities(&upper).len(), 2);
    }

    #[test]
    fn test_table_info_for_contract() {
        let table = SemTable::default();
        let two = TableSet::singleton(0) | TableSet::singleton(1);
        assert_eq!(
            table.table_info_for(two).unwrap_err(),
            AnalysisError::MultipleTables
        );
        assert_eq!(
            table.table_info_for(TableSet::EMPTY).unwrap_err(),
            AnalysisError::NoTableInfo
        );
        assert_eq!(
            table.table_info_for(TableSet::singleton(5)).unwrap_err(),
            AnalysisError::NoTableInfo
        );
    }
}
