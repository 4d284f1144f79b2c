//! Statement checking.

use decaf_ast::{Block, Expr, NodeId, Stmt};
use decaf_core::{Primitive, SemanticError, Type};

use super::CheckPass;
use crate::scope::ScopeId;

impl<'ast> CheckPass<'_, 'ast> {
    pub(super) fn check_block(&mut self, parent: ScopeId, block: &'ast Block) {
        let scope = self.scope_for(block.id, parent);
        for local in &block.decls {
            self.check_type_expr(&local.ty);
        }
        for stmt in &block.stmts {
            self.check_stmt(scope, stmt);
        }
    }

    fn scope_for(&self, node: NodeId, parent: ScopeId) -> ScopeId {
        let scope = self
            .scopes
            .scope_of(node)
            .unwrap_or_else(|| panic!("node {node:?} has no scope"));
        debug_assert_eq!(self.scopes.get(scope).parent(), Some(parent));
        scope
    }

    fn check_stmt(&mut self, scope: ScopeId, stmt: &'ast Stmt) {
        match stmt {
            Stmt::Block(block) => self.check_block(scope, block),
            Stmt::Expr(expr) => {
                self.check_expr(scope, expr);
            }
            Stmt::Empty(_) => {}
            Stmt::If(s) => {
                self.check_test(scope, &s.test);
                self.check_stmt(scope, &s.then_branch);
                if let Some(else_branch) = &s.else_branch {
                    self.check_stmt(scope, else_branch);
                }
            }
            Stmt::While(s) => {
                self.check_test(scope, &s.test);
                let body = self.scope_for(s.id, scope);
                self.check_stmt(body, &s.body);
            }
            Stmt::For(s) => {
                if let Some(init) = &s.init {
                    self.check_expr(scope, init);
                }
                self.check_test(scope, &s.test);
                if let Some(step) = &s.step {
                    self.check_expr(scope, step);
                }
                let body = self.scope_for(s.id, scope);
                self.check_stmt(body, &s.body);
            }
            Stmt::Switch(s) => {
                let given = self.check_expr(scope, &s.scrutinee);
                if !given.is_equal_to(&Type::INT) {
                    self.report(SemanticError::SwitchNotInteger {
                        given,
                        span: s.scrutinee.span,
                    });
                }
                let body = self.scope_for(s.id, scope);
                for arm in &s.cases {
                    for stmt in &arm.body {
                        self.check_stmt(body, stmt);
                    }
                }
                for stmt in s.default.iter().flatten() {
                    self.check_stmt(body, stmt);
                }
            }
            Stmt::Break(span) => {
                if self.scopes.enclosing_breakable(scope).is_none() {
                    self.report(SemanticError::BreakOutsideLoop { span: *span });
                }
            }
            Stmt::Return(s) => {
                let given = match &s.value {
                    Some(value) => self.check_expr(scope, value),
                    None => Type::VOID,
                };
                let Some(func) = self.scopes.enclosing_function(scope) else {
                    self.report(SemanticError::ReturnOutsideFunction { span: s.span });
                    return;
                };
                let expected = self.declared_type(func.return_type());
                // a void function takes no return value, not even a void one
                let void_with_value = expected.is_void() && s.value.is_some() && !given.is_error();
                if void_with_value || !given.is_assignable_to(&expected, self.scopes) {
                    let span = s.value.as_ref().map_or(s.span, |v| v.span);
                    self.report(SemanticError::ReturnMismatch {
                        given,
                        expected,
                        span,
                    });
                }
            }
            Stmt::Print(s) => {
                for (i, arg) in s.args.iter().enumerate() {
                    let given = self.check_expr(scope, arg);
                    let printable = matches!(
                        given,
                        Type::Primitive(
                            Primitive::Int | Primitive::Bool | Primitive::String | Primitive::Error
                        )
                    );
                    if !printable {
                        self.report(SemanticError::PrintArgumentMismatch {
                            position: i + 1,
                            given,
                            span: arg.span,
                        });
                    }
                }
            }
        }
    }

    /// Conditions of `if`, `while` and `for` must be boolean.
    fn check_test(&mut self, scope: ScopeId, test: &'ast Expr) {
        let ty = self.check_expr(scope, test);
        if !ty.is_equivalent_to(&Type::BOOL) {
            self.report(SemanticError::TestNotBoolean { span: test.span });
        }
    }
}
