//! Frame-size estimation.
//!
//! `BeginFunc` is emitted before its body, so the frame size it carries is
//! computed up front from the syntax tree. Each node contributes the most
//! frame slots its lowering can take; the sum is never below what the
//! emitter actually allocates, and never needs a second pass.
//!
//! | Construct | Slots beyond its operands |
//! |---|---|
//! | literal, `ReadInteger`, `ReadLine` | 1 |
//! | binary operator | 3 |
//! | unary operator | 2 |
//! | array element read | 13 (12 for the address, 1 for the load) |
//! | call | 3 |
//! | `New` | 3 |
//! | `NewArray` | 7 |
//! | `switch` | 2 per case |
//! | local variable | 1 |

use decaf_ast::{Block, Expr, ExprKind, Stmt};

/// Slots an element address computation needs, bounds check included.
pub(crate) const ELEMENT_ADDRESS_SLOTS: i32 = 12;
const BINARY_SLOTS: i32 = 3;
const UNARY_SLOTS: i32 = 2;
const CALL_SLOTS: i32 = 3;
const NEW_SLOTS: i32 = 3;
const NEW_ARRAY_SLOTS: i32 = 7;
const CASE_SLOTS: i32 = 2;

/// Upper bound on the bytes of locals and temporaries `body` needs.
pub fn estimate(body: &Block, word_size: i32) -> i32 {
    block_slots(body) * word_size
}

fn block_slots(block: &Block) -> i32 {
    block.decls.len() as i32 + block.stmts.iter().map(stmt_slots).sum::<i32>()
}

fn stmts_slots(stmts: &[Stmt]) -> i32 {
    stmts.iter().map(stmt_slots).sum()
}

fn stmt_slots(stmt: &Stmt) -> i32 {
    match stmt {
        Stmt::Block(block) => block_slots(block),
        Stmt::Expr(expr) => expr_slots(expr),
        Stmt::Empty(_) | Stmt::Break(_) => 0,
        Stmt::If(s) => {
            expr_slots(&s.test)
                + stmt_slots(&s.then_branch)
                + s.else_branch.as_deref().map_or(0, stmt_slots)
        }
        Stmt::While(s) => expr_slots(&s.test) + stmt_slots(&s.body),
        Stmt::For(s) => {
            s.init.as_ref().map_or(0, expr_slots)
                + expr_slots(&s.test)
                + s.step.as_ref().map_or(0, expr_slots)
                + stmt_slots(&s.body)
        }
        Stmt::Switch(s) => {
            expr_slots(&s.scrutinee)
                + s.cases
                    .iter()
                    .map(|arm| CASE_SLOTS + stmts_slots(&arm.body))
                    .sum::<i32>()
                + s.default.as_deref().map_or(0, stmts_slots)
        }
        Stmt::Return(s) => s.value.as_ref().map_or(0, expr_slots),
        Stmt::Print(s) => s.args.iter().map(expr_slots).sum(),
    }
}

fn expr_slots(expr: &Expr) -> i32 {
    match &expr.kind {
        ExprKind::IntLit(_)
        | ExprKind::DoubleLit(_)
        | ExprKind::BoolLit(_)
        | ExprKind::StringLit(_)
        | ExprKind::Null
        | ExprKind::ReadInteger
        | ExprKind::ReadLine => 1,
        ExprKind::This => 0,
        ExprKind::Binary { left, right, .. } => expr_slots(left) + expr_slots(right) + BINARY_SLOTS,
        ExprKind::Unary { operand, .. } => expr_slots(operand) + UNARY_SLOTS,
        ExprKind::Assign { target, value } => lvalue_slots(target) + expr_slots(value),
        ExprKind::ArrayAccess { base, index } => {
            expr_slots(base) + expr_slots(index) + ELEMENT_ADDRESS_SLOTS + 1
        }
        // an implicit field read loads through `this`
        ExprKind::FieldAccess { base: None, .. } => 1,
        ExprKind::FieldAccess { base: Some(base), .. } => expr_slots(base) + 1,
        ExprKind::Call { base, args, .. } => {
            base.as_deref().map_or(0, expr_slots)
                + args.iter().map(expr_slots).sum::<i32>()
                + CALL_SLOTS
        }
        ExprKind::New { .. } => NEW_SLOTS,
        ExprKind::NewArray { size, .. } => expr_slots(size) + NEW_ARRAY_SLOTS,
    }
}

/// Slots to compute where an assignment stores, not counting the value.
fn lvalue_slots(target: &Expr) -> i32 {
    match &target.kind {
        ExprKind::FieldAccess { base: None, .. } => 0,
        ExprKind::FieldAccess { base: Some(base), .. } => expr_slots(base),
        ExprKind::ArrayAccess { base, index } => {
            expr_slots(base) + expr_slots(index) + ELEMENT_ADDRESS_SLOTS
        }
        _ => expr_slots(target),
    }
}
