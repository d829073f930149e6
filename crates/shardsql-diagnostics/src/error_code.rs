//! Error codes following a structured numbering system
//!
//! Error code ranges:
//! - SQL0100-SQL0199: Analysis errors (resolution, scoping, capacity)
//! - SQL0300-SQL0399: Catalog errors (schema lookup, routing metadata)
//! - SQL0400-SQL0499: System errors (internal invariant violations)

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error code identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorCode(u16);

impl ErrorCode {
    /// Create a new error code
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Get the numeric code
    pub const fn code(&self) -> u16 {
        self.0
    }

    /// Get error information for this code
    pub fn info(&self) -> &'static ErrorInfo {
        ERROR_INFO.get(&self.0).unwrap_or(&UNKNOWN_ERROR)
    }

    /// Check if this is an analysis error (0100-0199)
    pub const fn is_analysis_error(&self) -> bool {
        self.0 >= 100 && self.0 < 200
    }

    /// Check if this is a catalog error (0300-0399)
    pub const fn is_catalog_error(&self) -> bool {
        self.0 >= 300 && self.0 < 400
    }

    /// Check if this is a system error (0400-0499)
    pub const fn is_system_error(&self) -> bool {
        self.0 >= 400 && self.0 < 500
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SQL{:04}", self.0)
    }
}

/// Unknown column reference
pub const SQL0100: ErrorCode = ErrorCode::new(100);
/// Ambiguous column reference
pub const SQL0101: ErrorCode = ErrorCode::new(101);
/// Non-unique table or alias in one scope
pub const SQL0102: ErrorCode = ErrorCode::new(102);
/// Statement references more tables than the analyzer supports
pub const SQL0103: ErrorCode = ErrorCode::new(103);
/// Single-table operation received a multi-table set
pub const SQL0104: ErrorCode = ErrorCode::new(104);
/// Table expression has no derivable name
pub const SQL0105: ErrorCode = ErrorCode::new(105);
/// Operation not supported for this table variant
pub const SQL0106: ErrorCode = ErrorCode::new(106);
/// Column not present in a derived table's field list
pub const SQL0107: ErrorCode = ErrorCode::new(107);
/// No table registered for the given table set
pub const SQL0108: ErrorCode = ErrorCode::new(108);
/// Table not found in the catalog
pub const SQL0300: ErrorCode = ErrorCode::new(300);
/// Keyspace not found in the catalog
pub const SQL0301: ErrorCode = ErrorCode::new(301);
/// Internal invariant violation
pub const SQL0400: ErrorCode = ErrorCode::new(400);

/// Information about an error code
#[derive(Debug, Clone)]
pub struct ErrorInfo {
    /// Short description of the error
    pub description: &'static str,
    /// Detailed help text
    pub help: Option<&'static str>,
}

impl ErrorInfo {
    const fn new(description: &'static str) -> Self {
        Self {
            description,
            help: None,
        }
    }

    const fn with_help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }
}

// Static error info storage
static UNKNOWN_ERROR: ErrorInfo = ErrorInfo::new("Unknown error");

use std::collections::HashMap;
use std::sync::LazyLock;

static ERROR_INFO: LazyLock<HashMap<u16, ErrorInfo>> = LazyLock::new(|| {
    let mut map = HashMap::new();

    // Analysis errors (0100-0199)
    map.insert(100, ErrorInfo::new("Unknown column"));
    map.insert(
        101,
        ErrorInfo::new("Ambiguous column reference")
            .with_help("Qualify the column with a table name or alias"),
    );
    map.insert(
        102,
        ErrorInfo::new("Not unique table/alias")
            .with_help("Give one of the conflicting tables a distinct alias"),
    );
    map.insert(
        103,
        ErrorInfo::new("Too many tables in statement")
            .with_help("A single statement may reference at most 64 distinct tables"),
    );
    map.insert(104, ErrorInfo::new("Operation requires a single table"));
    map.insert(105, ErrorInfo::new("Table expression has no name"));
    map.insert(106, ErrorInfo::new("Operation not supported for table variant"));
    map.insert(107, ErrorInfo::new("Unknown column in field list"));
    map.insert(108, ErrorInfo::new("No table registered for table set"));

    // Catalog errors (0300-0399)
    map.insert(300, ErrorInfo::new("Table not found"));
    map.insert(301, ErrorInfo::new("Keyspace not found"));

    // System errors (0400-0499)
    map.insert(400, ErrorInfo::new("Internal error"));

    map
});
