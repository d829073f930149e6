//! Catalog lookup errors

use shardsql_diagnostics::{Diagnostic, ErrorCode, SQL0300, SQL0301, SQL0400};
use thiserror::Error;

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors reported by a schema-lookup implementation
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// The named table does not exist
    #[error("table '{name}' not found")]
    TableNotFound { name: String },

    /// The named keyspace does not exist
    #[error("keyspace '{keyspace}' not found")]
    KeyspaceNotFound { keyspace: String },

    /// Backing-store failure surfaced through the lookup
    #[error("internal catalog error: {message}")]
    Internal { message: String },
}

impl CatalogError {
    /// Create a table-not-found error
    pub fn table_not_found(name: impl Into<String>) -> Self {
        Self::TableNotFound { name: name.into() }
    }

    /// Create a keyspace-not-found error
    pub fn keyspace_not_found(keyspace: impl Into<String>) -> Self {
        Self::KeyspaceNotFound {
            keyspace: keyspace.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// The error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::TableNotFound { .. } => SQL0300,
            Self::KeyspaceNotFound { .. } => SQL0301,
            Self::Internal { .. } => SQL0400,
        }
    }

    /// Convert to a diagnostic
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.code(), self.to_string())
    }
}
