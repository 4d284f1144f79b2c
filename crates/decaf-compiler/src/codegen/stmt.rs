//! Statement lowering.

use decaf_ast::{Block, Stmt, SwitchStmt};
use decaf_core::{EmitError, Primitive, Type};

use super::CodeGenerator;
use super::instr::{Builtin, TacOp};

impl<'ast> CodeGenerator<'_, 'ast> {
    pub(super) fn emit_block(&mut self, block: &'ast Block) -> Result<(), EmitError> {
        for local in &block.decls {
            let loc = self.emitter.local(local.name.as_str());
            self.locals.insert(local.id, loc);
        }
        for stmt in &block.stmts {
            self.emit_stmt(stmt)?;
        }
        Ok(())
    }

    fn emit_stmt(&mut self, stmt: &'ast Stmt) -> Result<(), EmitError> {
        match stmt {
            Stmt::Block(block) => self.emit_block(block)?,
            Stmt::Expr(expr) => self.emit_effect(expr)?,
            Stmt::Empty(_) => {}
            Stmt::If(s) => {
                let test = self.emit_value(&s.test)?;
                let otherwise = self.emitter.new_label();
                self.emitter.if_zero(test, otherwise.clone());
                self.emit_stmt(&s.then_branch)?;
                match &s.else_branch {
                    Some(else_branch) => {
                        let end = self.emitter.new_label();
                        self.emitter.goto(end.clone());
                        self.emitter.label(otherwise);
                        self.emit_stmt(else_branch)?;
                        self.emitter.label(end);
                    }
                    None => self.emitter.label(otherwise),
                }
            }
            Stmt::While(s) => {
                let top = self.emitter.new_label();
                let exit = self.emitter.new_label();
                self.emitter.label(top.clone());
                let test = self.emit_value(&s.test)?;
                self.emitter.if_zero(test, exit.clone());
                self.emitter.breaks().enter(exit.clone());
                self.emit_stmt(&s.body)?;
                self.emitter.breaks().exit();
                self.emitter.goto(top);
                self.emitter.label(exit);
            }
            Stmt::For(s) => {
                if let Some(init) = &s.init {
                    self.emit_effect(init)?;
                }
                let top = self.emitter.new_label();
                let exit = self.emitter.new_label();
                self.emitter.label(top.clone());
                let test = self.emit_value(&s.test)?;
                self.emitter.if_zero(test, exit.clone());
                self.emitter.breaks().enter(exit.clone());
                self.emit_stmt(&s.body)?;
                self.emitter.breaks().exit();
                if let Some(step) = &s.step {
                    self.emit_effect(step)?;
                }
                self.emitter.goto(top);
                self.emitter.label(exit);
            }
            Stmt::Switch(s) => self.emit_switch(s)?,
            Stmt::Break(span) => {
                let target = self
                    .emitter
                    .breaks()
                    .target()
                    .ok_or(EmitError::NoBreakTarget { span: *span })?
                    .to_string();
                self.emitter.goto(target);
            }
            Stmt::Return(s) => {
                let value = s.value.as_ref().map(|v| self.emit_value(v)).transpose()?;
                self.emitter.ret(value);
            }
            Stmt::Print(s) => {
                for arg in &s.args {
                    let builtin = match self.type_of(arg.id, arg.span)? {
                        Type::Primitive(Primitive::Bool) => Builtin::PrintBool,
                        Type::Primitive(Primitive::String) => Builtin::PrintString,
                        _ => Builtin::PrintInt,
                    };
                    let value = self.emit_value(arg)?;
                    self.emitter.builtin(builtin, vec![value]);
                }
            }
        }
        Ok(())
    }

    /// Compare the scrutinee against each case in order and jump to the first
    /// match; arms fall through into the next unless they `break`.
    fn emit_switch(&mut self, s: &'ast SwitchStmt) -> Result<(), EmitError> {
        let scrutinee = self.emit_value(&s.scrutinee)?;
        let exit = self.emitter.new_label();
        let arms: Vec<String> = s.cases.iter().map(|_| self.emitter.new_label()).collect();

        for (arm, label) in s.cases.iter().zip(&arms) {
            let value = self.emitter.load_constant(arm.value);
            let matches = self.emitter.binary(TacOp::Equal, scrutinee.clone(), value);
            let next = self.emitter.new_label();
            self.emitter.if_zero(matches, next.clone());
            self.emitter.goto(label.clone());
            self.emitter.label(next);
        }
        let default = s.default.as_ref().map(|_| self.emitter.new_label());
        self.emitter.goto(default.clone().unwrap_or_else(|| exit.clone()));

        self.emitter.breaks().enter(exit.clone());
        for (arm, label) in s.cases.iter().zip(arms) {
            self.emitter.label(label);
            for stmt in &arm.body {
                self.emit_stmt(stmt)?;
            }
        }
        if let (Some(label), Some(body)) = (default, &s.default) {
            self.emitter.label(label);
            for stmt in body {
                self.emit_stmt(stmt)?;
            }
        }
        self.emitter.breaks().exit();
        self.emitter.label(exit);
        Ok(())
    }
}
