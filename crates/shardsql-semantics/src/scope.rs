//! Name-resolution scopes
//!
//! One scope per query block, arena-allocated so the scopes survive into the
//! finished artifact. The analyzer keeps a stack of active scope indices
//! while it walks the statement.

use crate::error::{AnalysisError, AnalysisResult};
use shardsql_ast::NodeId;

/// Tables visible for name resolution within one query block
#[derive(Debug, Clone)]
pub struct Scope {
    /// Index of the enclosing scope in the arena
    pub(crate) parent: Option<usize>,
    /// The select this scope belongs to
    pub(crate) select: NodeId,
    /// Ordinals of the visible tables, with their resolved names
    pub(crate) tables: Vec<ScopeTable>,
    /// Whether the block is a union branch
    pub(crate) is_union: bool,
}

/// One visible table within a scope
#[derive(Debug, Clone)]
pub(crate) struct ScopeTable {
    /// Global ordinal of the table
    pub ordinal: usize,
    /// The name the table resolved to, used for the uniqueness check
    pub name: String,
}

impl Scope {
    /// The select this scope belongs to
    pub fn select(&self) -> NodeId {
        self.select
    }

    /// Whether the block is a union branch
    pub fn is_union(&self) -> bool {
        self.is_union
    }

    /// Ordinals of the visible tables, in registration order
    pub fn table_ordinals(&self) -> impl Iterator<Item = usize> + '_ {
        self.tables.iter().map(|t| t.ordinal)
    }
}

/// Scope arena plus the stack of scopes under construction
#[derive(Debug, Default)]
pub(crate) struct Scoper {
    scopes: Vec<Scope>,
    stack: Vec<usize>,
}

impl Scoper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter a new scope under the current one; returns its arena index
    pub fn enter(&mut self, select: NodeId, is_union: bool) -> usize {
        let parent = self.stack.last().copied();
        let idx = self.scopes.len();
        self.scopes.push(Scope {
            parent,
            select,
            tables: Vec::new(),
            is_union,
        });
        self.stack.push(idx);
        idx
    }

    /// Leave the current scope
    pub fn leave(&mut self) {
        self.stack.pop();
    }

    /// Index of the scope currently being analyzed
    pub fn current(&self) -> Option<usize> {
        self.stack.last().copied()
    }

    /// Look at a scope by arena index
    pub fn scope(&self, idx: usize) -> &Scope {
        &self.scopes[idx]
    }

    /// Record a table in the current scope.
    ///
    /// The resolved name must be unique within the scope, compared
    /// case-sensitively.
    pub fn add_table(&mut self, name: String, ordinal: usize) -> AnalysisResult<()> {
        let idx = self
            .current()
            .expect("add_table called outside any scope");
        let scope = &mut self.scopes[idx];
        if scope.tables.iter().any(|t| t.name == name) {
            return Err(AnalysisError::ambiguous_table(name));
        }
        scope.tables.push(ScopeTable { ordinal, name });
        Ok(())
    }

    /// Hand the finished arena to the artifact
    pub fn into_scopes(self) -> Vec<Scope> {
        self.scopes
    }
}
