//! Expression AST nodes
//!
//! Expressions are a thin `(id, kind)` pair so every node in the tree keeps
//! its own stable identity. The walk and rewrite helpers at the bottom are
//! what the analyzer's dependency resolver and the derived-table rewriter
//! are built on.

use crate::{Identifier, NodeId, Select, TableName};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An expression node with stable identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    /// Stable node id assigned by the parser
    pub id: NodeId,
    /// What the expression is
    pub kind: ExprKind,
}

impl Expr {
    /// Create an expression node
    pub fn new(id: NodeId, kind: ExprKind) -> Self {
        Self { id, kind }
    }

    /// Whether this node may be used as a dependency-memo key.
    ///
    /// Subquery and tuple nodes are never cached under their own id; the
    /// resolver walks through them and summarizes their children instead.
    pub fn valid_as_memo_key(&self) -> bool {
        !matches!(self.kind, ExprKind::Subquery(_) | ExprKind::Tuple(_))
    }

    /// The column reference, when this node is a plain column
    pub fn as_column(&self) -> Option<&ColumnRef> {
        match &self.kind {
            ExprKind::Column(col) => Some(col),
            _ => None,
        }
    }
}

/// All expression kinds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExprKind {
    /// Literal value
    Literal(Literal),
    /// Column reference
    Column(ColumnRef),
    /// Arithmetic operation
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Comparison operation
    Comparison {
        op: ComparisonOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Logical AND
    And { left: Box<Expr>, right: Box<Expr> },
    /// Logical OR
    Or { left: Box<Expr>, right: Box<Expr> },
    /// Logical negation
    Not(Box<Expr>),
    /// Function call
    Func {
        name: Identifier,
        args: Vec<Expr>,
        distinct: bool,
    },
    /// Value tuple, e.g. the right-hand side of `IN (1, 2, 3)`
    Tuple(Vec<Expr>),
    /// Scalar/row subquery
    Subquery(Box<Select>),
    /// EXISTS predicate; the inner expression is always a subquery node
    Exists(Box<Expr>),
}

/// A possibly qualified column reference
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnRef {
    /// Optional table qualifier
    pub qualifier: Option<TableName>,
    /// Column name
    pub name: Identifier,
}

impl ColumnRef {
    /// Create an unqualified column reference
    pub fn new(name: impl Into<Identifier>) -> Self {
        Self {
            qualifier: None,
            name: name.into(),
        }
    }

    /// Create a qualified column reference
    pub fn qualified(table: TableName, name: impl Into<Identifier>) -> Self {
        Self {
            qualifier: Some(table),
            name: name.into(),
        }
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.qualifier {
            Some(q) => write!(f, "{}.{}", q, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Literal values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

/// Arithmetic operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
        };
        write!(f, "{}", s)
    }
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    In,
    NotIn,
    Like,
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ComparisonOp::Eq => "=",
            ComparisonOp::Ne => "!=",
            ComparisonOp::Lt => "<",
            ComparisonOp::Le => "<=",
            ComparisonOp::Gt => ">",
            ComparisonOp::Ge => ">=",
            ComparisonOp::In => "in",
            ComparisonOp::NotIn => "not in",
            ComparisonOp::Like => "like",
        };
        write!(f, "{}", s)
    }
}

/// Walk an expression tree top-down.
///
/// The visitor returns `true` to descend into the node's children. Subquery
/// nodes are entered: the walk continues into every expression of the inner
/// select, mirroring how dependencies accumulate across derived boundaries.
pub fn walk_expr<F>(expr: &Expr, visit: &mut F)
where
    F: FnMut(&Expr) -> bool,
{
    if !visit(expr) {
        return;
    }
    match &expr.kind {
        ExprKind::Literal(_) | ExprKind::Column(_) => {}
        ExprKind::Binary { left, right, .. }
        | ExprKind::Comparison { left, right, .. }
        | ExprKind::And { left, right }
        | ExprKind::Or { left, right } => {
            walk_expr(left, visit);
            walk_expr(right, visit);
        }
        ExprKind::Not(inner) | ExprKind::Exists(inner) => walk_expr(inner, visit),
        ExprKind::Func { args, .. } | ExprKind::Tuple(args) => {
            for arg in args {
                walk_expr(arg, visit);
            }
        }
        ExprKind::Subquery(select) => walk_select(select, visit),
    }
}

/// Walk every expression inside a select statement
pub fn walk_select<F>(select: &Select, visit: &mut F)
where
    F: FnMut(&Expr) -> bool,
{
    for item in &select.projection {
        if let crate::SelectItem::Expr { expr, .. } = item {
            walk_expr(expr, visit);
        }
    }
    for table in &select.from {
        walk_table_expr(table, visit);
    }
    if let Some(selection) = &select.selection {
        walk_expr(selection, visit);
    }
    for expr in &select.group_by {
        walk_expr(expr, visit);
    }
    if let Some(having) = &select.having {
        walk_expr(having, visit);
    }
    for order in &select.order_by {
        walk_expr(&order.expr, visit);
    }
}

fn walk_table_expr<F>(table: &crate::TableExpr, visit: &mut F)
where
    F: FnMut(&Expr) -> bool,
{
    match table {
        crate::TableExpr::Aliased(aliased) => {
            if let crate::TableSource::Derived(select) = &aliased.source {
                walk_select(select, visit);
            }
        }
        crate::TableExpr::Join(join) => {
            walk_table_expr(&join.left, visit);
            walk_table_expr(&join.right, visit);
            if let Some(on) = &join.on {
                walk_expr(on, visit);
            }
        }
    }
}

/// Rebuild an expression tree, replacing nodes where the closure yields one.
///
/// The input is never mutated. When the closure returns a replacement the
/// rewrite does not descend into the replaced node; when it errors the whole
/// rewrite fails. Subquery bodies are cloned untouched.
pub fn try_rewrite_expr<E, F>(expr: &Expr, replace: &mut F) -> Result<Expr, E>
where
    F: FnMut(&Expr) -> Result<Option<Expr>, E>,
{
    if let Some(replacement) = replace(expr)? {
        return Ok(replacement);
    }
    let kind = match &expr.kind {
        ExprKind::Literal(_) | ExprKind::Column(_) | ExprKind::Subquery(_) => expr.kind.clone(),
        ExprKind::Binary { op, left, right } => ExprKind::Binary {
            op: *op,
            left: Box::new(try_rewrite_expr(left, replace)?),
            right: Box::new(try_rewrite_expr(right, replace)?),
        },
        ExprKind::Comparison { op, left, right } => ExprKind::Comparison {
            op: *op,
            left: Box::new(try_rewrite_expr(left, replace)?),
            right: Box::new(try_rewrite_expr(right, replace)?),
        },
        ExprKind::And { left, right } => ExprKind::And {
            left: Box::new(try_rewrite_expr(left, replace)?),
            right: Box::new(try_rewrite_expr(right, replace)?),
        },
        ExprKind::Or { left, right } => ExprKind::Or {
            left: Box::new(try_rewrite_expr(left, replace)?),
            right: Box::new(try_rewrite_expr(right, replace)?),
        },
        ExprKind::Not(inner) => ExprKind::Not(Box::new(try_rewrite_expr(inner, replace)?)),
        ExprKind::Exists(inner) => ExprKind::Exists(Box::new(try_rewrite_expr(inner, replace)?)),
        ExprKind::Func {
            name,
            args,
            distinct,
        } => ExprKind::Func {
            name: name.clone(),
            args: args
                .iter()
                .map(|a| try_rewrite_expr(a, replace))
                .collect::<Result<_, E>>()?,
            distinct: *distinct,
        },
        ExprKind::Tuple(items) => ExprKind::Tuple(
            items
                .iter()
                .map(|a| try_rewrite_expr(a, replace))
                .collect::<Result<_, E>>()?,
        ),
    };
    Ok(Expr::new(expr.id, kind))
}

/// Split a predicate into its top-level AND conjuncts
pub fn split_conjuncts(expr: &Expr) -> Vec<&Expr> {
    let mut out = Vec::new();
    collect_conjuncts(expr, &mut out);
    out
}

fn collect_conjuncts<'a>(expr: &'a Expr, out: &mut Vec<&'a Expr>) {
    match &expr.kind {
        ExprKind::And { left, right } => {
            collect_conjuncts(left, out);
            collect_conjuncts(right, out);
        }
        _ => out.push(expr),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AstBuilder;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_walk_visits_all_nodes() {
        let mut b = AstBuilder::new();
        let left = b.column("a");
        let right = b.int(1);
        let expr = b.binary(BinaryOp::Add, left, right);

        let mut seen = 0;
        walk_expr(&expr, &mut |_| {
            seen += 1;
            true
        });
        assert_eq!(seen, 3);
    }

    #[test]
    fn test_walk_stops_descent() {
        let mut b = AstBuilder::new();
        let left = b.column("a");
        let right = b.column("b");
        let expr = b.binary(BinaryOp::Add, left, right);
        let root_id = expr.id;

        let mut seen = 0;
        walk_expr(&expr, &mut |e| {
            seen += 1;
            e.id != root_id
        });
        assert_eq!(seen, 1);
    }

    #[test]
    fn test_split_conjuncts() {
        let mut b = AstBuilder::new();
        let a_col = b.column("a");
        let one = b.int(1);
        let a = b.comparison(ComparisonOp::Eq, a_col, one);
        let b_col = b.column("b");
        let two = b.int(2);
        let c = b.comparison(ComparisonOp::Eq, b_col, two);
        let c_col = b.column("c");
        let three = b.int(3);
        let d = b.comparison(ComparisonOp::Eq, c_col, three);
        let left = b.and(a, c);
        let pred = b.and(left, d);

        let conjuncts = split_conjuncts(&pred);
        assert_eq!(conjuncts.len(), 3);
    }

    #[test]
    fn test_rewrite_replaces_column() {
        let mut b = AstBuilder::new();
        let foo = b.column("foo");
        let one = b.int(1);
        let expr = b.binary(BinaryOp::Add, foo, one);
        let replacement = b.int(42);

        let rewritten: Expr = try_rewrite_expr::<(), _>(&expr, &mut |e| {
            if e.as_column().is_some() {
                Ok(Some(replacement.clone()))
            } else {
                Ok(None)
            }
        })
        .unwrap();

        match rewritten.kind {
            ExprKind::Binary { left, .. } => {
                assert_eq!(left.kind, ExprKind::Literal(Literal::Int(42)));
            }
            other => panic!("expected binary expression, got {:?}", other),
        }
        // original untouched
        assert!(matches!(
            expr.kind,
            ExprKind::Binary { ref left, .. } if left.as_column().is_some()
        ));
    }

    #[test]
    fn test_memo_key_validity() {
        let mut b = AstBuilder::new();
        let col = b.column("a");
        assert!(col.valid_as_memo_key());
        let one = b.int(1);
        let tuple = b.tuple(vec![one]);
        assert!(!tuple.valid_as_memo_key());
    }
}
