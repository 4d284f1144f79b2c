//! Scope-Build Pass (Pass 1) - create scopes and register declarations.
//!
//! Every compound construct is handled in two steps: first all declarations
//! introduced at its level are registered, then its children are visited with
//! the now-populated scope. Forward references inside one block, class or
//! interface body therefore resolve regardless of declaration order.
//!
//! ## Scopes created
//!
//! | Construct | Kind | Registers |
//! |---|---|---|
//! | program | `Global` | top-level variables, functions, classes, interfaces |
//! | class | `Class` | fields and methods |
//! | interface | `Interface` | method prototypes |
//! | function / method / prototype | `Function` | formal parameters |
//! | block | `Block` | local variables |
//! | `while` / `for` | `Loop` | nothing |
//! | `switch` | `Switch` | nothing |
//!
//! Once every class scope exists, each class scope is linked to the scope of
//! its superclass so inherited members resolve.

use decaf_ast::{Block, ClassDecl, ClassMember, Decl, DeclRef, FnDecl, Stmt};
use decaf_core::{DiagnosticSink, SemanticError};
use log::{debug, trace};

use crate::context::{CompilationContext, Phase};
use crate::scope::{ScopeId, ScopeKind, ScopeTree};

/// Output of the scope-build pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScopeBuildOutput {
    pub scopes_created: usize,
    pub decls_registered: usize,
    pub conflicts: usize,
}

/// Pass 1.
pub struct ScopeBuildPass<'a, 'ast> {
    scopes: &'a mut ScopeTree<'ast>,
    sink: &'a mut dyn DiagnosticSink,
    output: ScopeBuildOutput,
}

impl<'a, 'ast> ScopeBuildPass<'a, 'ast> {
    /// Run the pass over `ctx.program`.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(ctx: &mut CompilationContext<'ast>) -> ScopeBuildOutput {
        ctx.advance(Phase::Fresh, Phase::ScopesBuilt);
        let program = ctx.program;

        let mut pass = ScopeBuildPass {
            scopes: &mut ctx.scopes,
            sink: &mut ctx.diagnostics,
            output: ScopeBuildOutput::default(),
        };

        let global = pass.scopes.push(None, program.id, ScopeKind::Global);
        for decl in &program.decls {
            pass.register(global, decl.as_ref());
        }
        for decl in &program.decls {
            match decl {
                Decl::Var(_) => {}
                Decl::Fn(func) => pass.build_function(global, func),
                Decl::Class(class) => {
                    let scope = pass.scopes.push(Some(global), class.id, ScopeKind::Class(class));
                    for member in &class.members {
                        pass.register(scope, member.as_decl());
                    }
                    for member in &class.members {
                        if let ClassMember::Method(method) = member {
                            pass.build_function(scope, method);
                        }
                    }
                }
                Decl::Interface(interface) => {
                    let scope = pass.scopes.push(
                        Some(global),
                        interface.id,
                        ScopeKind::Interface(interface),
                    );
                    for method in &interface.members {
                        pass.register(scope, DeclRef::Fn(method));
                    }
                    for method in &interface.members {
                        pass.build_function(scope, method);
                    }
                }
            }
        }
        pass.link_superclasses(program.classes());

        pass.output.scopes_created = pass.scopes.len();
        debug!(
            "scope build: {} scopes, {} declarations, {} conflicts",
            pass.output.scopes_created, pass.output.decls_registered, pass.output.conflicts
        );
        pass.output
    }

    fn register(&mut self, scope: ScopeId, decl: DeclRef<'ast>) {
        match self.scopes.add_decl(scope, decl) {
            Ok(()) => {
                trace!("registered '{}' in scope {:?}", decl.name(), scope);
                self.output.decls_registered += 1;
            }
            Err(previous) => {
                self.output.conflicts += 1;
                self.sink.report(SemanticError::DeclConflict {
                    name: decl.name().to_string(),
                    span: decl.ident().span,
                    previous: previous.ident().span,
                });
            }
        }
    }

    fn build_function(&mut self, parent: ScopeId, func: &'ast FnDecl) {
        let scope = self.scopes.push(Some(parent), func.id, ScopeKind::Function(func));
        for formal in &func.formals {
            self.register(scope, DeclRef::Var(formal));
        }
        if let Some(body) = &func.body {
            self.build_block(scope, body);
        }
    }

    fn build_block(&mut self, parent: ScopeId, block: &'ast Block) {
        let scope = self.scopes.push(Some(parent), block.id, ScopeKind::Block);
        for local in &block.decls {
            self.register(scope, DeclRef::Var(local));
        }
        for stmt in &block.stmts {
            self.build_stmt(scope, stmt);
        }
    }

    fn build_stmt(&mut self, scope: ScopeId, stmt: &'ast Stmt) {
        match stmt {
            Stmt::Block(block) => self.build_block(scope, block),
            Stmt::If(s) => {
                self.build_stmt(scope, &s.then_branch);
                if let Some(else_branch) = &s.else_branch {
                    self.build_stmt(scope, else_branch);
                }
            }
            Stmt::While(s) => {
                let looped = self.scopes.push(Some(scope), s.id, ScopeKind::Loop);
                self.build_stmt(looped, &s.body);
            }
            Stmt::For(s) => {
                let looped = self.scopes.push(Some(scope), s.id, ScopeKind::Loop);
                self.build_stmt(looped, &s.body);
            }
            Stmt::Switch(s) => {
                let switched = self.scopes.push(Some(scope), s.id, ScopeKind::Switch);
                for arm in &s.cases {
                    for stmt in &arm.body {
                        self.build_stmt(switched, stmt);
                    }
                }
                for stmt in s.default.iter().flatten() {
                    self.build_stmt(switched, stmt);
                }
            }
            Stmt::Expr(_)
            | Stmt::Empty(_)
            | Stmt::Break(_)
            | Stmt::Return(_)
            | Stmt::Print(_) => {}
        }
    }

    fn link_superclasses(&mut self, classes: impl Iterator<Item = &'ast ClassDecl>) {
        for class in classes {
            let Some(parent) = class
                .extends
                .as_ref()
                .and_then(|ext| self.scopes.class_named(ext.as_str()))
            else {
                continue;
            };
            if let (Some(scope), Some(parent_scope)) =
                (self.scopes.scope_of(class.id), self.scopes.scope_of(parent.id))
            {
                self.scopes.set_inherits(scope, parent_scope);
            }
        }
    }
}
