//! Pipeline-level errors.
//!
//! Semantic problems are never errors in this sense; they are collected as
//! [`SemanticError`](crate::SemanticError) diagnostics and only surface here as
//! a [`CompileError::Rejected`] once the check pass is over.

use thiserror::Error;

use crate::{SemanticError, Span};

/// Failure of the whole compile pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    /// Analysis reported diagnostics, so layout and code generation never ran.
    #[error("compilation rejected with {count} error(s)")]
    Rejected {
        count: usize,
        diagnostics: Vec<SemanticError>,
    },

    /// Code generation met a construct it cannot lower.
    #[error(transparent)]
    Emit(#[from] EmitError),
}

impl CompileError {
    /// Diagnostics behind a rejection; empty for emit failures.
    pub fn diagnostics(&self) -> &[SemanticError] {
        match self {
            CompileError::Rejected { diagnostics, .. } => diagnostics,
            CompileError::Emit(_) => &[],
        }
    }
}

/// Failure while lowering a checked program to pseudo-instructions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmitError {
    /// Method call on a receiver whose static type is an interface. Checked
    /// programs never reach codegen with one.
    #[error("at {span}: cannot dispatch '{method}' through interface '{interface}'")]
    InterfaceDispatch {
        interface: String,
        method: String,
        span: Span,
    },

    /// A name the check pass should have resolved has no recorded declaration.
    #[error("at {span}: '{name}' has no resolved declaration")]
    Unresolved { name: String, span: Span },

    /// A `break` with no enclosing loop or switch to leave.
    #[error("at {span}: break has no enclosing loop or switch")]
    NoBreakTarget { span: Span },
}

impl EmitError {
    pub fn span(&self) -> Span {
        match self {
            EmitError::InterfaceDispatch { span, .. }
            | EmitError::Unresolved { span, .. }
            | EmitError::NoBreakTarget { span } => *span,
        }
    }
}
