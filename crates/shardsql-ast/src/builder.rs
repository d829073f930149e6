//! Construction helper that assigns stable node ids
//!
//! A real deployment gets its trees from the SQL parser, which numbers nodes
//! as it reduces them. [`AstBuilder`] plays that role for tests and
//! embedders: every node it hands out carries the next free [`NodeId`].

use crate::{
    AliasedTableExpr, BinaryOp, ColumnRef, ComparisonOp, Expr, ExprKind, Identifier, JoinExpr,
    JoinKind, Literal, NodeId, OrderBy, Select, SelectItem, Statement, TableExpr, TableName,
    TableSource, Union,
};

/// Assigns monotonically increasing node ids
#[derive(Debug, Default)]
pub struct AstBuilder {
    next: u32,
}

impl AstBuilder {
    /// Create a fresh builder; ids start at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the next free node id
    pub fn next_id(&mut self) -> NodeId {
        let id = NodeId(self.next);
        self.next += 1;
        id
    }

    /// Wrap an expression kind in a fresh node
    pub fn expr(&mut self, kind: ExprKind) -> Expr {
        Expr::new(self.next_id(), kind)
    }

    /// NULL literal
    pub fn null(&mut self) -> Expr {
        self.expr(ExprKind::Literal(Literal::Null))
    }

    /// Integer literal
    pub fn int(&mut self, value: i64) -> Expr {
        self.expr(ExprKind::Literal(Literal::Int(value)))
    }

    /// String literal
    pub fn string(&mut self, value: impl Into<String>) -> Expr {
        self.expr(ExprKind::Literal(Literal::Str(value.into())))
    }

    /// Unqualified column reference
    pub fn column(&mut self, name: impl Into<Identifier>) -> Expr {
        self.expr(ExprKind::Column(ColumnRef::new(name)))
    }

    /// Qualified column reference, e.g. `u.id`
    pub fn qualified_column(
        &mut self,
        table: impl Into<Identifier>,
        name: impl Into<Identifier>,
    ) -> Expr {
        let table = TableName::simple(table.into());
        self.expr(ExprKind::Column(ColumnRef::qualified(table, name)))
    }

    /// Arithmetic expression
    pub fn binary(&mut self, op: BinaryOp, left: Expr, right: Expr) -> Expr {
        self.expr(ExprKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    /// Comparison expression
    pub fn comparison(&mut self, op: ComparisonOp, left: Expr, right: Expr) -> Expr {
        self.expr(ExprKind::Comparison {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    /// Equality comparison
    pub fn eq(&mut self, left: Expr, right: Expr) -> Expr {
        self.comparison(ComparisonOp::Eq, left, right)
    }

    /// Logical AND
    pub fn and(&mut self, left: Expr, right: Expr) -> Expr {
        self.expr(ExprKind::And {
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    /// Logical OR
    pub fn or(&mut self, left: Expr, right: Expr) -> Expr {
        self.expr(ExprKind::Or {
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    /// Function call
    pub fn func(&mut self, name: impl Into<Identifier>, args: Vec<Expr>) -> Expr {
        self.expr(ExprKind::Func {
            name: name.into(),
            args,
            distinct: false,
        })
    }

    /// Value tuple
    pub fn tuple(&mut self, items: Vec<Expr>) -> Expr {
        self.expr(ExprKind::Tuple(items))
    }

    /// Subquery expression
    pub fn subquery(&mut self, select: Select) -> Expr {
        self.expr(ExprKind::Subquery(Box::new(select)))
    }

    /// EXISTS predicate over a select
    pub fn exists(&mut self, select: Select) -> Expr {
        let subquery = self.subquery(select);
        self.expr(ExprKind::Exists(Box::new(subquery)))
    }

    /// A select block; remaining clauses default to empty
    pub fn select(&mut self, projection: Vec<SelectItem>, from: Vec<TableExpr>) -> Select {
        Select {
            id: self.next_id(),
            distinct: false,
            projection,
            from,
            selection: None,
            group_by: Vec::new(),
            having: None,
            order_by: Vec::new(),
        }
    }

    /// A select statement
    pub fn select_statement(&mut self, select: Select) -> Statement {
        Statement::Select(Box::new(select))
    }

    /// A union statement over the given branches
    pub fn union(&mut self, branches: Vec<Select>, all: bool) -> Statement {
        Statement::Union(Box::new(Union {
            id: self.next_id(),
            branches,
            all,
        }))
    }

    /// An unaliased named table
    pub fn table(&mut self, name: impl Into<Identifier>) -> AliasedTableExpr {
        AliasedTableExpr {
            id: self.next_id(),
            source: TableSource::Named(TableName::simple(name.into())),
            alias: None,
        }
    }

    /// A named table under an alias
    pub fn aliased_table(
        &mut self,
        name: impl Into<Identifier>,
        alias: impl Into<Identifier>,
    ) -> AliasedTableExpr {
        AliasedTableExpr {
            id: self.next_id(),
            source: TableSource::Named(TableName::simple(name.into())),
            alias: Some(alias.into()),
        }
    }

    /// A qualified named table, e.g. `commerce.orders`
    pub fn qualified_table(
        &mut self,
        qualifier: impl Into<Identifier>,
        name: impl Into<Identifier>,
    ) -> AliasedTableExpr {
        AliasedTableExpr {
            id: self.next_id(),
            source: TableSource::Named(TableName::qualified(qualifier.into(), name.into())),
            alias: None,
        }
    }

    /// A derived table under an alias
    pub fn derived_table(&mut self, select: Select, alias: impl Into<Identifier>) -> AliasedTableExpr {
        AliasedTableExpr {
            id: self.next_id(),
            source: TableSource::Derived(Box::new(select)),
            alias: Some(alias.into()),
        }
    }

    /// An inner join with an optional ON predicate
    pub fn join(&mut self, left: TableExpr, right: TableExpr, on: Option<Expr>) -> TableExpr {
        TableExpr::Join(Box::new(JoinExpr {
            kind: JoinKind::Inner,
            left,
            right,
            on,
        }))
    }

    /// An ORDER BY entry
    pub fn order_by(&mut self, expr: Expr, descending: bool) -> OrderBy {
        OrderBy { expr, descending }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique_and_ordered() {
        let mut b = AstBuilder::new();
        let a = b.column("a");
        let c = b.column("b");
        assert!(a.id < c.id);
    }

    #[test]
    fn test_exists_wraps_subquery_node() {
        let mut b = AstBuilder::new();
        let inner = b.select(vec![SelectItem::star()], vec![]);
        let exists = b.exists(inner);
        match exists.kind {
            ExprKind::Exists(sub) => assert!(matches!(sub.kind, ExprKind::Subquery(_))),
            other => panic!("expected exists, got {:?}", other),
        }
    }
}
