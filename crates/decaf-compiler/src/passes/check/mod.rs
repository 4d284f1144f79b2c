//! Check Pass (Pass 2) - type and structure checking.
//!
//! Walks the whole program with the scopes built by pass 1, computing the
//! static type of every expression bottom-up and recording it (and every
//! resolved name) in the [`Semantics`] side table. Problems are reported to
//! the diagnostic sink and checking carries on; an expression that failed
//! gets the `error` type so one mistake yields one diagnostic.
//!
//! - [`class`]: inheritance, overriding and interface conformance
//! - [`stmt`]: statements and control-flow placement
//! - [`expr`]: expression typing

mod class;
mod expr;
mod stmt;

use decaf_ast::{Decl, FnDecl, TypeExpr};
use decaf_core::{DiagnosticSink, LookingFor, SemanticError, Type};
use log::{debug, trace};

use crate::context::{CompilationContext, Phase, Semantics};
use crate::scope::{ScopeId, ScopeTree};

/// Output of the check pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CheckOutput {
    /// Expressions given a static type.
    pub exprs_typed: usize,
    /// Diagnostics reported by this pass.
    pub errors: usize,
}

/// Pass 2.
pub struct CheckPass<'a, 'ast> {
    scopes: &'a ScopeTree<'ast>,
    semantics: &'a mut Semantics<'ast>,
    sink: &'a mut dyn DiagnosticSink,
}

impl<'a, 'ast> CheckPass<'a, 'ast> {
    /// Run the pass over `ctx.program`.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(ctx: &mut CompilationContext<'ast>) -> CheckOutput {
        ctx.advance(Phase::ScopesBuilt, Phase::Checked);
        let program = ctx.program;
        let before = ctx.diagnostics.len();

        let mut pass = CheckPass {
            scopes: &ctx.scopes,
            semantics: &mut ctx.semantics,
            sink: &mut ctx.diagnostics,
        };
        let global = pass.scopes.global();
        for decl in &program.decls {
            match decl {
                Decl::Var(var) => pass.check_type_expr(&var.ty),
                Decl::Fn(func) => pass.check_function(global, func),
                Decl::Class(class) => pass.check_class(class),
                Decl::Interface(interface) => pass.check_interface(interface),
            }
        }

        let output = CheckOutput {
            exprs_typed: ctx.semantics.typed_count(),
            errors: ctx.diagnostics.len() - before,
        };
        debug!(
            "check: {} expressions typed, {} errors",
            output.exprs_typed, output.errors
        );
        output
    }

    fn report(&mut self, error: SemanticError) {
        trace!("diagnostic: {error}");
        self.sink.report(error);
    }

    /// Report a written type whose named component is not a class or interface.
    fn check_type_expr(&mut self, ty: &TypeExpr) {
        if let Some(name) = ty.named_component()
            && !self.is_type_name(name)
        {
            self.report(SemanticError::NotDeclared {
                name: name.to_string(),
                looking_for: LookingFor::Type,
                span: ty.span,
            });
        }
    }

    fn is_type_name(&self, name: &str) -> bool {
        self.scopes.class_named(name).is_some() || self.scopes.interface_named(name).is_some()
    }

    /// The type a declaration's annotation denotes, or `error` if it names an
    /// unknown type (already reported at the declaration).
    fn declared_type(&self, ty: &Type) -> Type {
        match ty.innermost().as_named() {
            Some(name) if !self.is_type_name(name) => Type::ERROR,
            _ => ty.clone(),
        }
    }

    fn check_function(&mut self, parent: ScopeId, func: &'ast FnDecl) {
        self.check_type_expr(&func.return_type);
        for formal in &func.formals {
            self.check_type_expr(&formal.ty);
        }
        let Some(body) = &func.body else {
            return;
        };
        let scope = self
            .scopes
            .scope_of(func.id)
            .unwrap_or_else(|| panic!("function '{}' has no scope", func.name));
        debug_assert_eq!(self.scopes.get(scope).parent(), Some(parent));
        self.check_block(scope, body);
    }
}
