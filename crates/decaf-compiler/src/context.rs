//! Compilation context.
//!
//! One [`CompilationContext`] is threaded through every pass of a single
//! compile. It owns everything the passes share (the scope tree, the
//! semantic side tables, the diagnostics) so no pass reaches for ambient
//! state, and it enforces the pass order:
//!
//! ```text
//! Fresh ──scope build──▶ ScopesBuilt ──check──▶ Checked ──layout──▶ LaidOut ──codegen──▶ Emitted
//! ```

use decaf_ast::{DeclRef, NodeId, Program};
use decaf_core::{CompilerOptions, DiagnosticSink, Diagnostics, SemanticError, Type};
use rustc_hash::FxHashMap;

use crate::scope::ScopeTree;

/// Where a compile is in its pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Fresh,
    ScopesBuilt,
    Checked,
    LaidOut,
    Emitted,
}

/// Results of the check pass, keyed by expression id.
#[derive(Debug, Default)]
pub struct Semantics<'ast> {
    types: FxHashMap<NodeId, Type>,
    decls: FxHashMap<NodeId, DeclRef<'ast>>,
}

impl<'ast> Semantics<'ast> {
    pub fn record_type(&mut self, expr: NodeId, ty: Type) {
        self.types.insert(expr, ty);
    }

    pub fn record_decl(&mut self, expr: NodeId, decl: DeclRef<'ast>) {
        self.decls.insert(expr, decl);
    }

    /// Static type computed for an expression.
    pub fn type_of(&self, expr: NodeId) -> Option<&Type> {
        self.types.get(&expr)
    }

    /// Declaration a name use (identifier, field access or call) resolved to.
    pub fn decl_of(&self, expr: NodeId) -> Option<DeclRef<'ast>> {
        self.decls.get(&expr).copied()
    }

    pub fn typed_count(&self) -> usize {
        self.types.len()
    }
}

/// State shared by all passes over one program.
pub struct CompilationContext<'ast> {
    pub program: &'ast Program,
    pub options: CompilerOptions,
    pub scopes: ScopeTree<'ast>,
    pub semantics: Semantics<'ast>,
    pub diagnostics: Diagnostics,
    phase: Phase,
}

impl<'ast> CompilationContext<'ast> {
    pub fn new(program: &'ast Program, options: CompilerOptions) -> Self {
        Self {
            program,
            options,
            scopes: ScopeTree::new(),
            semantics: Semantics::default(),
            diagnostics: Diagnostics::new(),
            phase: Phase::Fresh,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Move from `from` to `to`.
    ///
    /// # Panics
    /// Panics when the context is not in `from`; passes never run twice or
    /// out of order.
    pub fn advance(&mut self, from: Phase, to: Phase) {
        assert_eq!(
            self.phase, from,
            "pass for {to:?} requires phase {from:?}, context is in {:?}",
            self.phase
        );
        self.phase = to;
    }

    /// Whether layout and codegen may run.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn report(&mut self, error: SemanticError) {
        self.diagnostics.report(error);
    }
}
