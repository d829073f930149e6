//! Statement and table-expression AST nodes

use crate::{Expr, Identifier, NodeId, TableName};
use serde::{Deserialize, Serialize};

/// A statement handed to the analyzer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    /// A single select block
    Select(Box<Select>),
    /// A union of select blocks
    Union(Box<Union>),
}

/// A UNION of select branches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Union {
    /// Stable node id
    pub id: NodeId,
    /// The branches, in statement order
    pub branches: Vec<Select>,
    /// UNION ALL when true, plain UNION otherwise
    pub all: bool,
}

/// One query block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Select {
    /// Stable node id
    pub id: NodeId,
    /// SELECT DISTINCT when true
    pub distinct: bool,
    /// Projection list
    pub projection: Vec<SelectItem>,
    /// FROM clause table expressions
    pub from: Vec<TableExpr>,
    /// WHERE clause
    pub selection: Option<Expr>,
    /// GROUP BY expressions
    pub group_by: Vec<Expr>,
    /// HAVING clause
    pub having: Option<Expr>,
    /// ORDER BY clauses
    pub order_by: Vec<OrderBy>,
}

/// One projection item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SelectItem {
    /// `*` or `t.*`
    Star { qualifier: Option<TableName> },
    /// An expression, optionally aliased
    Expr {
        expr: Expr,
        alias: Option<Identifier>,
    },
}

impl SelectItem {
    /// Create a bare `*` item
    pub fn star() -> Self {
        Self::Star { qualifier: None }
    }

    /// Create an unaliased expression item
    pub fn expr(expr: Expr) -> Self {
        Self::Expr { expr, alias: None }
    }

    /// Create an aliased expression item
    pub fn aliased(expr: Expr, alias: impl Into<Identifier>) -> Self {
        Self::Expr {
            expr,
            alias: Some(alias.into()),
        }
    }

    /// The name this item exposes to enclosing scopes, if any.
    ///
    /// An alias wins; a plain column falls back to the column name; anything
    /// else exposes no name.
    pub fn exposed_name(&self) -> Option<&Identifier> {
        match self {
            Self::Star { .. } => None,
            Self::Expr { alias: Some(a), .. } => Some(a),
            Self::Expr { expr, alias: None } => expr.as_column().map(|c| &c.name),
        }
    }
}

/// One ORDER BY entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBy {
    /// Sort expression
    pub expr: Expr,
    /// Descending order when true
    pub descending: bool,
}

/// A table expression in a FROM clause
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TableExpr {
    /// A named or derived table, possibly aliased
    Aliased(AliasedTableExpr),
    /// A join of two table expressions
    Join(Box<JoinExpr>),
}

/// A named or derived table with an optional alias
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AliasedTableExpr {
    /// Stable node id; the analyzer keys table ordinals on it
    pub id: NodeId,
    /// The underlying source
    pub source: TableSource,
    /// Optional alias
    pub alias: Option<Identifier>,
}

impl AliasedTableExpr {
    /// The name this table expression is visible under, when derivable.
    ///
    /// The alias wins; an unaliased named table resolves to its own name; an
    /// unaliased derived table has no name.
    pub fn visible_name(&self) -> Option<TableName> {
        if let Some(alias) = &self.alias {
            return Some(TableName::simple(alias.clone()));
        }
        match &self.source {
            TableSource::Named(name) => Some(name.clone()),
            TableSource::Derived(_) => None,
        }
    }
}

/// What an aliased table expression refers to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TableSource {
    /// A table named in the catalog
    Named(TableName),
    /// An inline derived table
    Derived(Box<Select>),
}

/// Join kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
}

/// A join between two table expressions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinExpr {
    /// Join kind
    pub kind: JoinKind,
    /// Left side
    pub left: TableExpr,
    /// Right side
    pub right: TableExpr,
    /// ON predicate
    pub on: Option<Expr>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AstBuilder;

    #[test]
    fn test_visible_name_prefers_alias() {
        let mut b = AstBuilder::new();
        let table = b.aliased_table("user", "u");
        assert_eq!(table.visible_name(), Some(TableName::simple("u")));

        let table = b.table("user");
        assert_eq!(table.visible_name(), Some(TableName::simple("user")));
    }

    #[test]
    fn test_unaliased_derived_has_no_name() {
        let mut b = AstBuilder::new();
        let inner = b.select(vec![SelectItem::star()], vec![]);
        let derived = AliasedTableExpr {
            id: b.next_id(),
            source: TableSource::Derived(Box::new(inner)),
            alias: None,
        };
        assert_eq!(derived.visible_name(), None);
    }

    #[test]
    fn test_exposed_name() {
        let mut b = AstBuilder::new();
        let col = b.column("id");
        let item = SelectItem::expr(col);
        assert_eq!(item.exposed_name().map(|i| i.as_str()), Some("id"));

        let lit = b.int(1);
        let item = SelectItem::aliased(lit, "one");
        assert_eq!(item.exposed_name().map(|i| i.as_str()), Some("one"));

        let lit = b.int(2);
        let item = SelectItem::expr(lit);
        assert_eq!(item.exposed_name(), None);
    }
}
