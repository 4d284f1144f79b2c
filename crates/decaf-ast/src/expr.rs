//! Expression nodes.

use decaf_core::Span;
use ordered_float::OrderedFloat;

use crate::{BinaryOp, Identifier, NodeId, TypeExpr, UnaryOp};

/// An expression. Every expression has an id so its computed type and
/// resolved declaration can be recorded beside the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub id: NodeId,
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    IntLit(i32),
    DoubleLit(OrderedFloat<f64>),
    BoolLit(bool),
    /// String contents without the surrounding quotes.
    StringLit(String),
    Null,
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Assign {
        target: Box<Expr>,
        value: Box<Expr>,
    },
    This,
    /// `base[index]`
    ArrayAccess {
        base: Box<Expr>,
        index: Box<Expr>,
    },
    /// `base.field`, or a bare identifier when `base` is absent.
    FieldAccess {
        base: Option<Box<Expr>>,
        field: Identifier,
    },
    /// `base.name(args)`, or a plain call when `base` is absent.
    Call {
        base: Option<Box<Expr>>,
        name: Identifier,
        args: Vec<Expr>,
    },
    /// `new C`
    New {
        class: Identifier,
    },
    /// `NewArray(size, T)`
    NewArray {
        size: Box<Expr>,
        elem: TypeExpr,
    },
    ReadInteger,
    ReadLine,
}

impl Expr {
    /// Whether this expression form can be assigned to.
    pub fn is_lvalue(&self) -> bool {
        matches!(
            self.kind,
            ExprKind::FieldAccess { .. } | ExprKind::ArrayAccess { .. }
        )
    }
}
