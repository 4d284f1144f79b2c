//! Abstract syntax tree for Decaf programs.
//!
//! The tree is exclusively owned top-down and never mutated after it is
//! built. Analysis results (scopes, types, offsets, labels) live in side
//! tables keyed by [`NodeId`].
//!
//! - [`node`]: node ids, identifiers, type annotations
//! - [`decl`]: declarations and the program root
//! - [`stmt`]: statements
//! - [`expr`]: expressions
//! - [`ops`]: operators
//! - [`builder`]: the node factory

pub mod builder;
pub mod decl;
pub mod expr;
pub mod node;
pub mod ops;
pub mod stmt;

pub use builder::AstBuilder;
pub use decl::{ClassDecl, ClassMember, Decl, DeclRef, FnDecl, InterfaceDecl, Program, VarDecl};
pub use expr::{Expr, ExprKind};
pub use node::{Identifier, NodeId, TypeExpr};
pub use ops::{BinaryOp, OpFamily, UnaryOp};
pub use stmt::{
    Block, CaseArm, ForStmt, IfStmt, PrintStmt, ReturnStmt, Stmt, SwitchStmt, WhileStmt,
};
