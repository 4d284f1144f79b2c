//! Node factory.
//!
//! The parser collaborator (and every test) builds trees through
//! [`AstBuilder`] so node ids stay unique and locations are never left out.
//! The builder keeps a *current span* that every new node is stamped with;
//! the parser moves it with [`AstBuilder::at`] before building each node.
//! Binary-shaped expressions join their operands' spans instead.
//!
//! ```
//! use decaf_ast::{AstBuilder, BinaryOp};
//! use decaf_core::Span;
//!
//! let mut b = AstBuilder::new();
//! b.at(Span::on_line(1, 5, 1));
//! let one = b.int(1);
//! b.at(Span::on_line(1, 9, 1));
//! let two = b.int(2);
//! let sum = b.binary(BinaryOp::Add, one, two);
//! assert_eq!(sum.span, Span::new(1, 5, 1, 9));
//! ```

use decaf_core::{Span, Type};
use ordered_float::OrderedFloat;

use crate::{
    BinaryOp, Block, CaseArm, ClassDecl, ClassMember, Decl, Expr, ExprKind, FnDecl, ForStmt,
    Identifier, IfStmt, InterfaceDecl, NodeId, PrintStmt, Program, ReturnStmt, Stmt, SwitchStmt,
    TypeExpr, UnaryOp, VarDecl, WhileStmt,
};

/// Builds tree nodes with fresh ids.
#[derive(Debug, Default)]
pub struct AstBuilder {
    next_id: u32,
    span: Span,
}

impl AstBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the location stamped on subsequently built nodes.
    pub fn at(&mut self, span: Span) -> &mut Self {
        self.span = span;
        self
    }

    /// The current location.
    pub fn span(&self) -> Span {
        self.span
    }

    /// Allocate a fresh node id.
    pub fn next_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Number of ids handed out so far.
    pub fn ids_allocated(&self) -> u32 {
        self.next_id
    }

    pub fn ident(&self, name: &str) -> Identifier {
        Identifier::new(name, self.span)
    }

    pub fn type_expr(&self, ty: Type) -> TypeExpr {
        TypeExpr::new(ty, self.span)
    }

    // ==========================================================================
    // Declarations
    // ==========================================================================

    pub fn var(&mut self, name: &str, ty: Type) -> VarDecl {
        VarDecl {
            id: self.next_id(),
            name: self.ident(name),
            ty: self.type_expr(ty),
            span: self.span,
        }
    }

    pub fn function(
        &mut self,
        name: &str,
        return_type: Type,
        formals: Vec<VarDecl>,
        body: Block,
    ) -> FnDecl {
        FnDecl {
            id: self.next_id(),
            name: self.ident(name),
            return_type: self.type_expr(return_type),
            formals,
            body: Some(body),
            span: self.span,
        }
    }

    /// A bodiless method prototype, as found in interfaces.
    pub fn prototype(&mut self, name: &str, return_type: Type, formals: Vec<VarDecl>) -> FnDecl {
        FnDecl {
            id: self.next_id(),
            name: self.ident(name),
            return_type: self.type_expr(return_type),
            formals,
            body: None,
            span: self.span,
        }
    }

    pub fn class(
        &mut self,
        name: &str,
        extends: Option<&str>,
        implements: &[&str],
        members: Vec<ClassMember>,
    ) -> ClassDecl {
        ClassDecl {
            id: self.next_id(),
            name: self.ident(name),
            extends: extends.map(|base| self.ident(base)),
            implements: implements.iter().map(|i| self.ident(i)).collect(),
            members,
            span: self.span,
        }
    }

    pub fn interface(&mut self, name: &str, members: Vec<FnDecl>) -> InterfaceDecl {
        InterfaceDecl {
            id: self.next_id(),
            name: self.ident(name),
            members,
            span: self.span,
        }
    }

    pub fn program(&mut self, decls: Vec<Decl>) -> Program {
        Program {
            id: self.next_id(),
            decls,
            span: self.span,
        }
    }

    // ==========================================================================
    // Statements
    // ==========================================================================

    pub fn block(&mut self, decls: Vec<VarDecl>, stmts: Vec<Stmt>) -> Block {
        Block {
            id: self.next_id(),
            decls,
            stmts,
            span: self.span,
        }
    }

    pub fn if_stmt(&mut self, test: Expr, then_branch: Stmt, else_branch: Option<Stmt>) -> Stmt {
        Stmt::If(IfStmt {
            test,
            then_branch: Box::new(then_branch),
            else_branch: else_branch.map(Box::new),
            span: self.span,
        })
    }

    pub fn while_loop(&mut self, test: Expr, body: Stmt) -> Stmt {
        Stmt::While(WhileStmt {
            id: self.next_id(),
            test,
            body: Box::new(body),
            span: self.span,
        })
    }

    pub fn for_loop(
        &mut self,
        init: Option<Expr>,
        test: Expr,
        step: Option<Expr>,
        body: Stmt,
    ) -> Stmt {
        Stmt::For(ForStmt {
            id: self.next_id(),
            init,
            test,
            step,
            body: Box::new(body),
            span: self.span,
        })
    }

    pub fn switch(
        &mut self,
        scrutinee: Expr,
        cases: Vec<CaseArm>,
        default: Option<Vec<Stmt>>,
    ) -> Stmt {
        Stmt::Switch(SwitchStmt {
            id: self.next_id(),
            scrutinee,
            cases,
            default,
            span: self.span,
        })
    }

    pub fn case(&self, value: i32, body: Vec<Stmt>) -> CaseArm {
        CaseArm {
            value,
            body,
            span: self.span,
        }
    }

    pub fn break_stmt(&self) -> Stmt {
        Stmt::Break(self.span)
    }

    pub fn return_stmt(&self, value: Option<Expr>) -> Stmt {
        Stmt::Return(ReturnStmt {
            value,
            span: self.span,
        })
    }

    pub fn print(&self, args: Vec<Expr>) -> Stmt {
        Stmt::Print(PrintStmt {
            args,
            span: self.span,
        })
    }

    // ==========================================================================
    // Expressions
    // ==========================================================================

    fn expr(&mut self, kind: ExprKind, span: Span) -> Expr {
        Expr {
            id: self.next_id(),
            kind,
            span,
        }
    }

    pub fn int(&mut self, value: i32) -> Expr {
        self.expr(ExprKind::IntLit(value), self.span)
    }

    pub fn double(&mut self, value: f64) -> Expr {
        self.expr(ExprKind::DoubleLit(OrderedFloat(value)), self.span)
    }

    pub fn boolean(&mut self, value: bool) -> Expr {
        self.expr(ExprKind::BoolLit(value), self.span)
    }

    pub fn string(&mut self, value: &str) -> Expr {
        self.expr(ExprKind::StringLit(value.to_string()), self.span)
    }

    pub fn null(&mut self) -> Expr {
        self.expr(ExprKind::Null, self.span)
    }

    pub fn binary(&mut self, op: BinaryOp, left: Expr, right: Expr) -> Expr {
        let span = left.span.join(right.span);
        self.expr(
            ExprKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            span,
        )
    }

    pub fn unary(&mut self, op: UnaryOp, operand: Expr) -> Expr {
        let span = self.span.join(operand.span);
        self.expr(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            span,
        )
    }

    pub fn assign(&mut self, target: Expr, value: Expr) -> Expr {
        let span = target.span.join(value.span);
        self.expr(
            ExprKind::Assign {
                target: Box::new(target),
                value: Box::new(value),
            },
            span,
        )
    }

    pub fn this(&mut self) -> Expr {
        self.expr(ExprKind::This, self.span)
    }

    pub fn index(&mut self, base: Expr, index: Expr) -> Expr {
        let span = base.span.join(index.span);
        self.expr(
            ExprKind::ArrayAccess {
                base: Box::new(base),
                index: Box::new(index),
            },
            span,
        )
    }

    /// A bare identifier use (`x`).
    pub fn var_ref(&mut self, name: &str) -> Expr {
        let field = self.ident(name);
        self.expr(ExprKind::FieldAccess { base: None, field }, self.span)
    }

    /// `base.name`
    pub fn field(&mut self, base: Expr, name: &str) -> Expr {
        let field = self.ident(name);
        let span = base.span.join(self.span);
        self.expr(
            ExprKind::FieldAccess {
                base: Some(Box::new(base)),
                field,
            },
            span,
        )
    }

    /// `name(args)`
    pub fn call(&mut self, name: &str, args: Vec<Expr>) -> Expr {
        let name = self.ident(name);
        self.expr(
            ExprKind::Call {
                base: None,
                name,
                args,
            },
            self.span,
        )
    }

    /// `base.name(args)`
    pub fn method_call(&mut self, base: Expr, name: &str, args: Vec<Expr>) -> Expr {
        let name = self.ident(name);
        let span = base.span.join(self.span);
        self.expr(
            ExprKind::Call {
                base: Some(Box::new(base)),
                name,
                args,
            },
            span,
        )
    }

    pub fn new_object(&mut self, class: &str) -> Expr {
        let class = self.ident(class);
        self.expr(ExprKind::New { class }, self.span)
    }

    pub fn new_array(&mut self, size: Expr, elem: Type) -> Expr {
        let elem = self.type_expr(elem);
        self.expr(
            ExprKind::NewArray {
                size: Box::new(size),
                elem,
            },
            self.span,
        )
    }

    pub fn read_integer(&mut self) -> Expr {
        self.expr(ExprKind::ReadInteger, self.span)
    }

    pub fn read_line(&mut self) -> Expr {
        self.expr(ExprKind::ReadLine, self.span)
    }
}
