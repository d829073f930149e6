//! Analysis errors

use shardsql_catalog::CatalogError;
use shardsql_diagnostics::{
    Diagnostic, ErrorCode, SQL0100, SQL0101, SQL0102, SQL0103, SQL0104, SQL0105, SQL0106, SQL0107,
    SQL0108,
};
use thiserror::Error;

use crate::MAX_TABLES;

/// Result type for analysis operations
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Errors produced while building or querying the semantic artifact
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AnalysisError {
    /// The statement references more distinct tables than a table set can hold
    #[error("too many tables referenced in statement: the limit is {limit}")]
    CapacityExceeded { limit: usize },

    /// Two tables resolve to the same name within one scope
    #[error("Not unique table/alias: '{name}'")]
    AmbiguousTableReference { name: String },

    /// A single-table operation received a multi-table set
    #[error("[BUG] should only be used for single tables")]
    MultipleTables,

    /// No table is registered for the given table set
    #[error("no table registered for the given table set")]
    NoTableInfo,

    /// A column could not be matched against a derived table's field list
    #[error("Unknown column '{column}' in 'field list'")]
    UnresolvableColumn { column: String },

    /// The operation is not implemented for this table-info variant
    #[error("unsupported: {operation} on {variant}")]
    UnsupportedOperation { operation: String, variant: String },

    /// A column reference matched no visible table
    #[error("symbol '{name}' not found")]
    UnknownColumn { name: String },

    /// A column reference matched more than one visible table
    #[error("Column '{name}' in field list is ambiguous")]
    AmbiguousColumn { name: String },

    /// A table expression exposes no name to resolve against
    #[error("table expression has no name")]
    MissingTableName,

    /// Schema lookup failed
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl AnalysisError {
    /// Create the capacity error with the fixed table-set limit
    pub fn capacity_exceeded() -> Self {
        Self::CapacityExceeded { limit: MAX_TABLES }
    }

    /// Create a non-unique table/alias error
    pub fn ambiguous_table(name: impl Into<String>) -> Self {
        Self::AmbiguousTableReference { name: name.into() }
    }

    /// Create an unresolvable-column error for derived-table rewriting
    pub fn unresolvable_column(column: impl Into<String>) -> Self {
        Self::UnresolvableColumn {
            column: column.into(),
        }
    }

    /// Create an unsupported-operation error
    pub fn unsupported(operation: impl Into<String>, variant: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            operation: operation.into(),
            variant: variant.into(),
        }
    }

    /// Create an unknown-column error
    pub fn unknown_column(name: impl Into<String>) -> Self {
        Self::UnknownColumn { name: name.into() }
    }

    /// Create an ambiguous-column error
    pub fn ambiguous_column(name: impl Into<String>) -> Self {
        Self::AmbiguousColumn { name: name.into() }
    }

    /// The error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::CapacityExceeded { .. } => SQL0103,
            Self::AmbiguousTableReference { .. } => SQL0102,
            Self::MultipleTables => SQL0104,
            Self::NoTableInfo => SQL0108,
            Self::UnresolvableColumn { .. } => SQL0107,
            Self::UnsupportedOperation { .. } => SQL0106,
            Self::UnknownColumn { .. } => SQL0100,
            Self::AmbiguousColumn { .. } => SQL0101,
            Self::MissingTableName => SQL0105,
            Self::Catalog(err) => err.code(),
        }
    }

    /// Convert to a diagnostic
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.code(), self.to_string());
        match self.code().info().help {
            Some(help) => diag.with_help(help),
            None => diag,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(AnalysisError::capacity_exceeded().code(), SQL0103);
        assert_eq!(AnalysisError::ambiguous_table("u").code(), SQL0102);
        assert_eq!(AnalysisError::MultipleTables.code(), SQL0104);
        assert_eq!(
            AnalysisError::Catalog(CatalogError::table_not_found("t")).code(),
            shardsql_diagnostics::SQL0300
        );
    }

    #[test]
    fn test_field_list_message() {
        let err = AnalysisError::unresolvable_column("foo");
        assert_eq!(err.to_string(), "Unknown column 'foo' in 'field list'");
    }
}
