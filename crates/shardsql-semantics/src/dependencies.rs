//! Tri-state column resolution results
//!
//! Resolving a column against a table yields one of three outcomes, and the
//! distinction matters: an authoritative column list proves absence, an
//! incomplete one only fails to prove presence. Collapsing the two would
//! mis-route predicates during planning.

use crate::TableSet;
use shardsql_ast::{Expr, NodeId};
use shardsql_catalog::SqlType;

/// Outcome of resolving one column name against one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dependencies {
    /// The column is proven to live on these tables
    Certain {
        /// Nearest enclosing table set
        direct: TableSet,
        /// Base tables behind any derived-table boundary
        recursive: TableSet,
        /// Column type, when the catalog knows it
        column_type: Option<SqlType>,
    },
    /// The column may live on these tables; the column list is incomplete
    Uncertain {
        direct: TableSet,
        recursive: TableSet,
    },
    /// The column is proven not to exist on the table
    Absent,
}

impl Dependencies {
    /// Create a certain result
    pub fn certain(direct: TableSet, recursive: TableSet, column_type: Option<SqlType>) -> Self {
        Self::Certain {
            direct,
            recursive,
            column_type,
        }
    }

    /// Create an uncertain result
    pub fn uncertain(direct: TableSet, recursive: TableSet) -> Self {
        Self::Uncertain { direct, recursive }
    }

    /// Whether the column is proven absent
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Combine resolutions from two tables in the same scope.
    ///
    /// `None` signals an ambiguous column: two tables both claim it, either
    /// with proof (two certains) or with two incomplete column lists that
    /// leave no single table to bind to.
    pub fn merge(self, other: Self) -> Option<Self> {
        match (self, other) {
            (a, Self::Absent) => Some(a),
            (Self::Absent, b) => Some(b),
            (Self::Certain { .. }, Self::Certain { .. }) => None,
            (certain @ Self::Certain { .. }, Self::Uncertain { .. }) => Some(certain),
            (Self::Uncertain { .. }, certain @ Self::Certain { .. }) => Some(certain),
            (Self::Uncertain { .. }, Self::Uncertain { .. }) => None,
        }
    }
}

/// Seam between the table-info variants and the analyzer.
///
/// Tables do not own ordinals or dependency maps; they resolve through the
/// analyzer that is building them.
pub trait Originable {
    /// The singleton set for a registered table-expression node, or the
    /// empty set when the node is not registered
    fn table_set_for(&self, node: NodeId) -> TableSet;

    /// Direct and recursive dependencies of an expression
    fn deps_for_expr(&mut self, expr: &Expr) -> (TableSet, TableSet);

    /// Cached type of an expression, when one is known
    fn type_for(&self, expr: &Expr) -> Option<SqlType>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ts(ordinal: usize) -> TableSet {
        TableSet::singleton(ordinal)
    }

    #[test]
    fn test_absent_is_identity() {
        let certain = Dependencies::certain(ts(0), ts(0), Some(SqlType::Int64));
        assert_eq!(
            certain.clone().merge(Dependencies::Absent),
            Some(certain.clone())
        );
        assert_eq!(Dependencies::Absent.merge(certain.clone()), Some(certain));
        assert_eq!(
            Dependencies::Absent.merge(Dependencies::Absent),
            Some(Dependencies::Absent)
        );
    }

    #[test]
    fn test_certain_beats_uncertain() {
        let certain = Dependencies::certain(ts(0), ts(0), None);
        let uncertain = Dependencies::uncertain(ts(1), ts(1));
        assert_eq!(uncertain.merge(certain.clone()), Some(certain));
    }

    #[test]
    fn test_conflicts() {
        let a = Dependencies::certain(ts(0), ts(0), None);
        let b = Dependencies::certain(ts(1), ts(1), None);
        assert_eq!(a.merge(b), None);

        let a = Dependencies::uncertain(ts(0), ts(0));
        let b = Dependencies::uncertain(ts(1), ts(1));
        assert_eq!(a.merge(b), None);
    }
}
