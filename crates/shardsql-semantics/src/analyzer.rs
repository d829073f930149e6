//! Single-pass construction of the semantic artifact
//!
//! One traversal of one statement: FROM clauses register tables into scopes,
//! column references are bound to table sets, subqueries are registered with
//! their pullout opcodes, and equality conjuncts feed the column-equality
//! tracker. The traversal is strictly single-threaded and bounded by
//! statement size.

use crate::dependencies::{Dependencies, Originable};
use crate::error::{AnalysisError, AnalysisResult};
use crate::scope::Scoper;
use crate::sem_table::{PulloutOpcode, SemTable, SubqueryRef};
use crate::table_info::{AliasedTable, DerivedColumn, DerivedTable, TableInfo, VindexTable};
use crate::table_set::{MAX_TABLES, TableSet};
use log::{debug, trace};
use shardsql_ast::{
    AliasedTableExpr, ColumnRef, ComparisonOp, Expr, ExprKind, Literal, NodeId, Select,
    SelectItem, Statement, TableExpr, TableSource, split_conjuncts,
};
use shardsql_catalog::{SchemaLookup, SqlType};
use shardsql_diagnostics::Diagnostic;

/// Result of a successful analysis.
///
/// Carries the artifact together with the optional degraded-planning note so
/// callers cannot mistake "analysis failed" for "analysis succeeded with a
/// projection the planner must treat conservatively".
#[derive(Debug)]
pub struct Analysis {
    /// The semantic artifact
    pub table: SemTable,
    /// Warning mirroring the soft projection error, when one was captured
    pub degraded: Option<Diagnostic>,
}

/// Analyze one statement against a schema lookup
pub fn analyze(statement: &Statement, schema: &dyn SchemaLookup) -> AnalysisResult<Analysis> {
    let mut analyzer = Analyzer::new(schema);
    analyzer.analyze_statement(statement)?;
    Ok(analyzer.finish())
}

struct Analyzer<'a> {
    schema: &'a dyn SchemaLookup,
    dest: SemTable,
    scoper: Scoper,
    select_stack: Vec<NodeId>,
    subquery_counter: usize,
    projection_node: Option<NodeId>,
}

impl Originable for Analyzer<'_> {
    fn table_set_for(&self, node: NodeId) -> TableSet {
        self.dest.table_set_for(node)
    }

    fn deps_for_expr(&mut self, expr: &Expr) -> (TableSet, TableSet) {
        let direct = self.dest.direct.dependencies(expr);
        let recursive = self.dest.recursive.dependencies(expr);
        (direct, recursive)
    }

    fn type_for(&self, expr: &Expr) -> Option<SqlType> {
        self.dest.type_for(expr)
    }
}

impl<'a> Analyzer<'a> {
    fn new(schema: &'a dyn SchemaLookup) -> Self {
        Self {
            schema,
            dest: SemTable::default(),
            scoper: Scoper::new(),
            select_stack: Vec::new(),
            subquery_counter: 0,
            projection_node: None,
        }
    }

    fn finish(self) -> Analysis {
        let mut table = self.dest;
        table.scopes = self.scoper.into_scopes();
        let projection_node = self.projection_node;
        let degraded = table.projection_err.as_ref().map(|err| {
            let diag = Diagnostic::warning(err.code(), err.to_string());
            match projection_node {
                Some(node) => diag.with_node(node.0),
                None => diag,
            }
        });
        Analysis { table, degraded }
    }

    fn analyze_statement(&mut self, statement: &Statement) -> AnalysisResult<()> {
        match statement {
            Statement::Select(select) => self.analyze_select(select, false),
            Statement::Union(union) => {
                for branch in &union.branches {
                    self.analyze_select(branch, true)?;
                }
                Ok(())
            }
        }
    }

    fn analyze_select(&mut self, select: &Select, is_union: bool) -> AnalysisResult<()> {
        let scope_idx = self.scoper.enter(select.id, is_union);
        self.dest.select_scope.insert(select.id, scope_idx);
        self.select_stack.push(select.id);
        debug!("entering select {} (scope {})", select.id, scope_idx);

        // FROM first: the tables must be visible to every other clause.
        for table in &select.from {
            self.analyze_table_expr(table)?;
        }

        for item in &select.projection {
            if let SelectItem::Expr { expr, .. } = item
                && let Err(err) = self.bind_expr(expr)
            {
                // Projection errors are soft: they block single-table
                // optimizations but the statement can still be planned as a
                // single route.
                debug!("captured projection error: {}", err);
                if self.dest.projection_err.is_none() {
                    self.projection_node = Some(expr.id);
                    self.dest.projection_err = Some(err);
                }
            }
        }

        if let Some(selection) = &select.selection {
            self.bind_expr(selection)?;
            self.note_equalities(selection);
        }
        for expr in &select.group_by {
            self.bind_expr(expr)?;
        }
        if let Some(having) = &select.having {
            self.bind_expr(having)?;
        }
        for order in &select.order_by {
            self.bind_expr(&order.expr)?;
        }

        self.select_stack.pop();
        self.scoper.leave();
        Ok(())
    }

    fn analyze_table_expr(&mut self, table: &TableExpr) -> AnalysisResult<()> {
        match table {
            TableExpr::Aliased(aliased) => self.analyze_aliased_table(aliased),
            TableExpr::Join(join) => {
                self.analyze_table_expr(&join.left)?;
                self.analyze_table_expr(&join.right)?;
                if let Some(on) = &join.on {
                    self.bind_expr(on)?;
                }
                Ok(())
            }
        }
    }

    fn analyze_aliased_table(&mut self, aliased: &AliasedTableExpr) -> AnalysisResult<()> {
        let visible = aliased.visible_name();
        match &aliased.source {
            TableSource::Named(name) => {
                let is_inf_schema = name
                    .qualifier
                    .as_ref()
                    .is_some_and(|q| q.matches_ignore_case("information_schema"));
                let info = if is_inf_schema {
                    TableInfo::Aliased(AliasedTable::new(aliased.id, visible, None, true))
                } else {
                    let resolution = self.schema.find_table_or_vindex(name)?;
                    match (resolution.table, resolution.vindex) {
                        (None, Some(vindex)) => TableInfo::Vindex(VindexTable::new(
                            TableInfo::Aliased(AliasedTable::new(
                                aliased.id, visible, None, false,
                            )),
                            vindex,
                        )),
                        (table, _) => TableInfo::Aliased(AliasedTable::new(
                            aliased.id, visible, table, false,
                        )),
                    }
                };
                self.add_table(info)
            }
            TableSource::Derived(select) => {
                self.analyze_select(select, false)?;
                let mut columns = Vec::new();
                let mut authoritative = true;
                for item in &select.projection {
                    match (item.exposed_name(), item) {
                        (Some(name), SelectItem::Expr { expr, .. }) => {
                            columns.push(DerivedColumn {
                                name: name.clone(),
                                expr: expr.clone(),
                            });
                        }
                        // A star or unnamed expression leaves the exposed
                        // column list incomplete.
                        _ => authoritative = false,
                    }
                }
                let info = TableInfo::Aliased(AliasedTable::derived(
                    aliased.id,
                    visible,
                    DerivedTable {
                        columns,
                        authoritative,
                    },
                ));
                self.add_table(info)
            }
        }
    }

    fn add_table(&mut self, info: TableInfo) -> AnalysisResult<()> {
        if self.dest.tables.len() >= MAX_TABLES {
            return Err(AnalysisError::capacity_exceeded());
        }
        let name = info.name()?;
        let ordinal = self.dest.tables.len();
        self.scoper
            .add_table(name.name.as_str().to_owned(), ordinal)?;
        trace!("registered table '{}' with ordinal {}", name, ordinal);
        self.dest.tables.push(info);
        Ok(())
    }

    fn bind_expr(&mut self, expr: &Expr) -> AnalysisResult<()> {
        match &expr.kind {
            ExprKind::Literal(literal) => {
                if let Some(sql_type) = literal_type(literal) {
                    self.dest.expr_types.insert(expr.id, sql_type);
                }
                Ok(())
            }
            ExprKind::Column(column) => {
                let deps = self.resolve_column(column)?;
                self.bind_column(expr.id, deps);
                Ok(())
            }
            ExprKind::Binary { left, right, .. }
            | ExprKind::And { left, right }
            | ExprKind::Or { left, right } => {
                self.bind_expr(left)?;
                self.bind_expr(right)
            }
            ExprKind::Comparison { op, left, right } => {
                self.bind_expr(left)?;
                match (op, &right.kind) {
                    (ComparisonOp::In, ExprKind::Subquery(_)) => {
                        self.bind_subquery(right, PulloutOpcode::In)
                    }
                    (ComparisonOp::NotIn, ExprKind::Subquery(_)) => {
                        self.bind_subquery(right, PulloutOpcode::NotIn)
                    }
                    _ => self.bind_expr(right),
                }
            }
            ExprKind::Not(inner) => self.bind_expr(inner),
            ExprKind::Exists(inner) => self.bind_subquery(inner, PulloutOpcode::Exists),
            ExprKind::Func { args, .. } | ExprKind::Tuple(args) => {
                for arg in args {
                    self.bind_expr(arg)?;
                }
                Ok(())
            }
            ExprKind::Subquery(_) => self.bind_subquery(expr, PulloutOpcode::Value),
        }
    }

    fn bind_subquery(&mut self, expr: &Expr, opcode: PulloutOpcode) -> AnalysisResult<()> {
        let ExprKind::Subquery(select) = &expr.kind else {
            return self.bind_expr(expr);
        };
        self.subquery_counter += 1;
        let entry = SubqueryRef {
            arg_name: format!("__sq{}", self.subquery_counter),
            opcode,
            subquery: expr.id,
        };
        debug!("registering subquery {} as {}", expr.id, entry.arg_name);
        if let Some(&enclosing) = self.select_stack.last() {
            self.dest
                .subquery_map
                .entry(enclosing)
                .or_default()
                .push(entry.clone());
        }
        self.dest.subquery_ref.insert(expr.id, entry);
        self.analyze_select(select, false)
    }

    fn bind_column(&mut self, node: NodeId, deps: Dependencies) {
        match deps {
            Dependencies::Certain {
                direct,
                recursive,
                column_type,
            } => {
                self.dest.direct.insert(node, direct);
                self.dest.recursive.insert(node, recursive);
                if let Some(sql_type) = column_type {
                    self.dest.expr_types.insert(node, sql_type);
                }
            }
            Dependencies::Uncertain { direct, recursive } => {
                self.dest.direct.insert(node, direct);
                self.dest.recursive.insert(node, recursive);
            }
            // resolve_column never hands back an absent result
            Dependencies::Absent => {}
        }
    }

    /// Resolve a column reference through the scope chain.
    ///
    /// Qualified references look for the matching table; unqualified ones
    /// merge the tri-state answers of every table in a scope and only fall
    /// back to the parent scope when absence is proven everywhere.
    fn resolve_column(&mut self, column: &ColumnRef) -> AnalysisResult<Dependencies> {
        let mut scope_idx = self.scoper.current();
        while let Some(idx) = scope_idx {
            let ordinals: Vec<usize> = self.scoper.scope(idx).table_ordinals().collect();
            match &column.qualifier {
                Some(qualifier) => {
                    for ordinal in ordinals {
                        let info = self.dest.tables[ordinal].clone();
                        if !info.matches(qualifier) {
                            continue;
                        }
                        let deps = info.dependencies_for(column.name.as_str(), self);
                        return match deps {
                            Dependencies::Absent => {
                                Err(AnalysisError::unknown_column(column.to_string()))
                            }
                            found => Ok(found),
                        };
                    }
                }
                None => {
                    let mut acc = Dependencies::Absent;
                    for ordinal in ordinals {
                        let info = self.dest.tables[ordinal].clone();
                        let deps = info.dependencies_for(column.name.as_str(), self);
                        acc = acc.merge(deps).ok_or_else(|| {
                            AnalysisError::ambiguous_column(column.name.as_str())
                        })?;
                    }
                    if !acc.is_absent() {
                        return Ok(acc);
                    }
                }
            }
            scope_idx = self.scoper.scope(idx).parent;
        }
        Err(AnalysisError::unknown_column(column.to_string()))
    }

    /// Record column equalities from the top-level conjuncts of a predicate
    fn note_equalities(&mut self, predicate: &Expr) {
        for conjunct in split_conjuncts(predicate) {
            let ExprKind::Comparison {
                op: ComparisonOp::Eq,
                left,
                right,
            } = &conjunct.kind
            else {
                continue;
            };
            if left.as_column().is_some() {
                self.dest.add_column_equality(left, (**right).clone());
            }
            if right.as_column().is_some() {
                self.dest.add_column_equality(right, (**left).clone());
            }
        }
    }
}

fn literal_type(literal: &Literal) -> Option<SqlType> {
    match literal {
        Literal::Null => None,
        Literal::Bool(_) => Some(SqlType::Int8),
        Literal::Int(_) => Some(SqlType::Int64),
        Literal::Float(_) => Some(SqlType::Float64),
        Literal::Str(_) => Some(SqlType::VarChar),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use shardsql_ast::AstBuilder;
    use shardsql_catalog::MemorySchema;

    #[test]
    fn test_literal_types() {
        assert_eq!(literal_type(&Literal::Int(1)), Some(SqlType::Int64));
        assert_eq!(literal_type(&Literal::Null), None);
    }

    #[test]
    fn test_empty_select_analyzes() {
        let mut b = AstBuilder::new();
        let one = b.int(1);
        let select = b.select(vec![SelectItem::expr(one)], vec![]);
        let statement = b.select_statement(select);
        let schema = MemorySchema::new();

        let analysis = analyze(&statement, &schema).unwrap();
        assert!(analysis.table.tables().is_empty());
        assert!(analysis.degraded.is_none());
    }

    #[test]
    fn test_unknown_column_without_tables_is_soft_in_projection() {
        let mut b = AstBuilder::new();
        let ghost = b.column("ghost");
        let select = b.select(vec![SelectItem::expr(ghost)], vec![]);
        let statement = b.select_statement(select);
        let schema = MemorySchema::new();

        let analysis = analyze(&statement, &schema).unwrap();
        assert!(matches!(
            analysis.table.projection_error(),
            Some(AnalysisError::UnknownColumn { .. })
        ));
        assert!(analysis.degraded.is_some());
    }

    #[test]
    fn test_unknown_column_in_where_is_hard() {
        let mut b = AstBuilder::new();
        let one = b.int(1);
        let ghost = b.column("ghost");
        let two = b.int(2);
        let predicate = b.eq(ghost, two);
        let mut select = b.select(vec![SelectItem::expr(one)], vec![]);
        select.selection = Some(predicate);
        let statement = b.select_statement(select);
        let schema = MemorySchema::new();

        let err = analyze(&statement, &schema).unwrap_err();
        assert!(matches!(err, AnalysisError::UnknownColumn { .. }));
    }
}
