//! Derived-table expression rewriting
//!
//! Pushing a predicate below a derived-table boundary means replacing every
//! reference to an exposed column with the expression that defines it inside
//! the derived select. The rewrite is clone-based; the analyzed statement is
//! never mutated.

use crate::error::AnalysisResult;
use crate::table_info::TableInfo;
use log::trace;
use shardsql_ast::{Expr, try_rewrite_expr};

/// Rewrite an expression in terms of the inside of a derived table.
///
/// Every column reference is replaced by the defining expression the table
/// exposes under that name. A reference the table cannot resolve fails the
/// whole rewrite, leaving the caller free to keep the predicate above the
/// boundary instead.
pub fn rewrite_derived_expression(expr: &Expr, table: &TableInfo) -> AnalysisResult<Expr> {
    try_rewrite_expr(expr, &mut |node| match node.as_column() {
        Some(col) => {
            let inner = table.expr_for(col.name.as_str())?;
            trace!("rewrote column '{}' to its defining expression", col.name);
            Ok(Some(inner))
        }
        None => Ok(None),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;
    use crate::table_info::{AliasedTable, DerivedColumn, DerivedTable};
    use pretty_assertions::assert_eq;
    use shardsql_ast::{AstBuilder, BinaryOp, ComparisonOp, ExprKind, Literal, TableName};

    /// A derived table exposing `foo` as `id + 42`
    fn derived_foo(b: &mut AstBuilder) -> TableInfo {
        let id = b.column("id");
        let forty_two = b.int(42);
        let sum = b.binary(BinaryOp::Add, id, forty_two);
        let node = b.next_id();
        TableInfo::Aliased(AliasedTable::derived(
            node,
            Some(TableName::simple("d")),
            DerivedTable {
                columns: vec![DerivedColumn {
                    name: "foo".into(),
                    expr: sum,
                }],
                authoritative: true,
            },
        ))
    }

    #[test]
    fn test_exposed_column_is_replaced_by_its_definition() {
        let mut b = AstBuilder::new();
        let table = derived_foo(&mut b);

        let foo = b.column("foo");
        let hundred = b.int(100);
        let predicate = b.comparison(ComparisonOp::Gt, foo, hundred);

        let rewritten = rewrite_derived_expression(&predicate, &table).unwrap();
        match rewritten.kind {
            ExprKind::Comparison { op, left, right } => {
                assert_eq!(op, ComparisonOp::Gt);
                assert!(matches!(left.kind, ExprKind::Binary { .. }));
                assert_eq!(right.kind, ExprKind::Literal(Literal::Int(100)));
            }
            other => panic!("expected comparison, got {:?}", other),
        }
        // the input predicate still references the exposed name
        assert!(matches!(
            predicate.kind,
            ExprKind::Comparison { ref left, .. } if left.as_column().is_some()
        ));
    }

    #[test]
    fn test_unknown_column_fails_the_rewrite() {
        let mut b = AstBuilder::new();
        let table = derived_foo(&mut b);

        let bar = b.column("bar");
        let one = b.int(1);
        let predicate = b.eq(bar, one);

        let err = rewrite_derived_expression(&predicate, &table).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::unresolvable_column("bar")
        );
    }
}
