//! Diagnostic messages produced during analysis

use crate::ErrorCode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Error - analysis of the statement cannot proceed
    Error,
    /// Warning - analysis succeeded but planning may be degraded
    Warning,
    /// Information - informational message
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// A diagnostic message with code and context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity level
    pub severity: Severity,
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// AST node the diagnostic refers to, when one is known
    pub node: Option<u32>,
    /// Additional context or help
    pub help: Option<String>,
}

impl Diagnostic {
    /// Create a new error diagnostic
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            node: None,
            help: None,
        }
    }

    /// Create a new warning diagnostic
    pub fn warning(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
            node: None,
            help: None,
        }
    }

    /// Set the originating AST node id
    pub fn with_node(mut self, node: u32) -> Self {
        self.node = Some(node);
        self
    }

    /// Set help text
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} - {}", self.severity, self.code, self.message)?;
        if let Some(node) = self.node {
            write!(f, " at node {}", node)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SQL0102;

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::error(SQL0102, "Not unique table/alias: 'user'").with_node(4);

        assert!(diag.to_string().contains("SQL0102"));
        assert!(diag.to_string().contains("node 4"));
    }

    #[test]
    fn test_warning_builder() {
        let diag = Diagnostic::warning(SQL0102, "degraded")
            .with_help("falls back to a single-route plan");

        assert_eq!(diag.severity, Severity::Warning);
        assert!(diag.help.is_some());
    }
}
