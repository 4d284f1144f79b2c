//! Statement nodes.
//!
//! Blocks, loops and switches own a scope during analysis, so they carry a
//! [`NodeId`]. The other statements are plain containers.

use decaf_core::Span;

use crate::{Expr, NodeId, VarDecl};

/// A statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `{ decls stmts }`
    Block(Block),
    /// Expression evaluated for its effect.
    Expr(Expr),
    /// Lone `;`
    Empty(Span),
    If(IfStmt),
    While(WhileStmt),
    For(ForStmt),
    Switch(SwitchStmt),
    Break(Span),
    Return(ReturnStmt),
    Print(PrintStmt),
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Block(s) => s.span,
            Stmt::Expr(e) => e.span,
            Stmt::Empty(span) | Stmt::Break(span) => *span,
            Stmt::If(s) => s.span,
            Stmt::While(s) => s.span,
            Stmt::For(s) => s.span,
            Stmt::Switch(s) => s.span,
            Stmt::Return(s) => s.span,
            Stmt::Print(s) => s.span,
        }
    }
}

/// A statement block. Local declarations come first, as the grammar requires.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub id: NodeId,
    pub decls: Vec<VarDecl>,
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub test: Expr,
    pub then_branch: Box<Stmt>,
    pub else_branch: Option<Box<Stmt>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStmt {
    pub id: NodeId,
    pub test: Expr,
    pub body: Box<Stmt>,
    pub span: Span,
}

/// `for (init; test; step) body`; `init` and `step` may be empty.
#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt {
    pub id: NodeId,
    pub init: Option<Expr>,
    pub test: Expr,
    pub step: Option<Expr>,
    pub body: Box<Stmt>,
    pub span: Span,
}

/// `switch (scrutinee) { case k: ... default: ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchStmt {
    pub id: NodeId,
    pub scrutinee: Expr,
    pub cases: Vec<CaseArm>,
    pub default: Option<Vec<Stmt>>,
    pub span: Span,
}

/// One `case <int>:` arm.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseArm {
    pub value: i32,
    pub body: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub span: Span,
}

/// `Print(args...)`
#[derive(Debug, Clone, PartialEq)]
pub struct PrintStmt {
    pub args: Vec<Expr>,
    pub span: Span,
}
