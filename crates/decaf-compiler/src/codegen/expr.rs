//! Expression lowering.
//!
//! Comparisons other than `<` and `==` are rewritten in terms of them:
//!
//! | Source | Emitted |
//! |---|---|
//! | `a <= b` | `(a < b) \|\| (a == b)` |
//! | `a > b` | `b < a` |
//! | `a >= b` | `(b < a) \|\| (b == a)` |
//! | `a != b` | `(a == b) == 0` |
//! | `-a` | `0 - a` |
//! | `!a` | `a == 0` |
//!
//! Arrays carry their length in the word before element 0; the array value
//! points at that header.

use decaf_ast::{BinaryOp, DeclRef, Expr, ExprKind, Identifier, UnaryOp};
use decaf_core::{EmitError, Type};

use super::instr::{Builtin, Location, TacOp};
use super::{ARRAY_SIZE_ERROR, CodeGenerator, SUBSCRIPT_ERROR};

/// Where a variable reference reads from and writes to.
enum Place {
    /// A global, parameter or local slot.
    Direct(Location),
    /// A word at `offset` from `base`.
    Indirect { base: Location, offset: i32 },
}

impl<'ast> CodeGenerator<'_, 'ast> {
    /// Emit `expr` and return where its value is.
    pub(super) fn emit_value(&mut self, expr: &'ast Expr) -> Result<Location, EmitError> {
        match &expr.kind {
            ExprKind::IntLit(value) => Ok(self.emitter.load_constant(*value)),
            ExprKind::BoolLit(value) => Ok(self.emitter.load_constant(i32::from(*value))),
            ExprKind::DoubleLit(value) => Ok(self.emitter.load_double(*value)),
            ExprKind::StringLit(value) => Ok(self.emitter.load_string(value)),
            ExprKind::Null => Ok(self.emitter.load_constant(0)),
            ExprKind::ReadInteger => Ok(self.emitter.builtin_value(Builtin::ReadInteger, vec![])),
            ExprKind::ReadLine => Ok(self.emitter.builtin_value(Builtin::ReadLine, vec![])),
            ExprKind::This => Ok(self.this_location()),
            ExprKind::Binary { op, left, right } => self.emit_binary(*op, left, right),
            ExprKind::Unary { op, operand } => {
                let value = self.emit_value(operand)?;
                let zero = self.emitter.load_constant(0);
                Ok(match op {
                    UnaryOp::Neg => self.emitter.binary(TacOp::Sub, zero, value),
                    UnaryOp::Not => self.emitter.binary(TacOp::Equal, value, zero),
                })
            }
            ExprKind::Assign { target, value } => self.emit_assign(target, value),
            ExprKind::ArrayAccess { base, index } => {
                let addr = self.emit_element_address(base, index)?;
                Ok(self.emitter.load(addr, 0))
            }
            ExprKind::FieldAccess { .. } => match self.place_of(expr)? {
                Place::Direct(loc) => Ok(loc),
                Place::Indirect { base, offset } => Ok(self.emitter.load(base, offset)),
            },
            ExprKind::Call { base, name, args } => {
                match self.emit_call(expr, base.as_deref(), name, args)? {
                    Some(result) => Ok(result),
                    // a void result has no value; its checked uses only compare it
                    None => Ok(self.emitter.load_constant(0)),
                }
            }
            ExprKind::New { class } => self.emit_new(class, expr),
            ExprKind::NewArray { size, .. } => self.emit_new_array(size),
        }
    }

    /// Emit `expr` for its effects only.
    pub(super) fn emit_effect(&mut self, expr: &'ast Expr) -> Result<(), EmitError> {
        match &expr.kind {
            ExprKind::Call { base, name, args } => {
                self.emit_call(expr, base.as_deref(), name, args)?;
            }
            _ => {
                self.emit_value(expr)?;
            }
        }
        Ok(())
    }

    fn emit_binary(
        &mut self,
        op: BinaryOp,
        left: &'ast Expr,
        right: &'ast Expr,
    ) -> Result<Location, EmitError> {
        let is_string = self.type_of(left.id, left.span)? == &Type::STRING;
        let lhs = self.emit_value(left)?;
        let rhs = self.emit_value(right)?;
        let e = &mut self.emitter;
        let result = match op {
            BinaryOp::Add => e.binary(TacOp::Add, lhs, rhs),
            BinaryOp::Sub => e.binary(TacOp::Sub, lhs, rhs),
            BinaryOp::Mul => e.binary(TacOp::Mul, lhs, rhs),
            BinaryOp::Div => e.binary(TacOp::Div, lhs, rhs),
            BinaryOp::Mod => e.binary(TacOp::Mod, lhs, rhs),
            BinaryOp::And => e.binary(TacOp::And, lhs, rhs),
            BinaryOp::Or => e.binary(TacOp::Or, lhs, rhs),
            BinaryOp::Less => e.binary(TacOp::Less, lhs, rhs),
            BinaryOp::Greater => e.binary(TacOp::Less, rhs, lhs),
            BinaryOp::LessEqual => less_or_equal(e, lhs, rhs),
            BinaryOp::GreaterEqual => less_or_equal(e, rhs, lhs),
            BinaryOp::Equal if is_string => e.builtin_value(Builtin::StringEqual, vec![lhs, rhs]),
            BinaryOp::Equal => e.binary(TacOp::Equal, lhs, rhs),
            BinaryOp::NotEqual => {
                let equal = if is_string {
                    e.builtin_value(Builtin::StringEqual, vec![lhs, rhs])
                } else {
                    e.binary(TacOp::Equal, lhs, rhs)
                };
                let zero = e.load_constant(0);
                e.binary(TacOp::Equal, equal, zero)
            }
        };
        Ok(result)
    }

    fn emit_assign(
        &mut self,
        target: &'ast Expr,
        value: &'ast Expr,
    ) -> Result<Location, EmitError> {
        if let ExprKind::ArrayAccess { base, index } = &target.kind {
            let addr = self.emit_element_address(base, index)?;
            let src = self.emit_value(value)?;
            self.emitter.store(addr, 0, src.clone());
            return Ok(src);
        }
        let place = self.place_of(target)?;
        let src = self.emit_value(value)?;
        match place {
            Place::Direct(dst) => self.emitter.assign(dst, src.clone()),
            Place::Indirect { base, offset } => self.emitter.store(base, offset, src.clone()),
        }
        Ok(src)
    }

    /// Resolve a variable reference (bare or `base.field`) to a place.
    fn place_of(&mut self, expr: &'ast Expr) -> Result<Place, EmitError> {
        let ExprKind::FieldAccess { base, field } = &expr.kind else {
            return Err(unresolved("assignment target", expr));
        };
        let Some(DeclRef::Var(var)) = self.semantics.decl_of(expr.id) else {
            return Err(unresolved(field.as_str(), expr));
        };

        if let Some(base) = base {
            let base = self.emit_value(base)?;
            let offset = self
                .layout
                .field_offset(var.id)
                .ok_or_else(|| unresolved(field.as_str(), expr))?;
            return Ok(Place::Indirect { base, offset });
        }

        if let Some(loc) = self.locals.get(&var.id) {
            return Ok(Place::Direct(loc.clone()));
        }
        if let Some(loc) = self.layout.param(var.id).or_else(|| self.layout.global(var.id)) {
            return Ok(Place::Direct(loc.clone()));
        }
        match self.layout.field_offset(var.id) {
            Some(offset) if self.this_class.is_some() => Ok(Place::Indirect {
                base: self.this_location(),
                offset,
            }),
            _ => Err(unresolved(field.as_str(), expr)),
        }
    }

    /// Address of `base[index]`, after checking `0 <= index < length`.
    fn emit_element_address(
        &mut self,
        base: &'ast Expr,
        index: &'ast Expr,
    ) -> Result<Location, EmitError> {
        let array = self.emit_value(base)?;
        let index = self.emit_value(index)?;

        let zero = self.emitter.load_constant(0);
        let negative = self.emitter.binary(TacOp::Less, index.clone(), zero.clone());
        let length = self.emitter.load(array.clone(), 0);
        let in_range = self.emitter.binary(TacOp::Less, index.clone(), length);
        let past_end = self.emitter.binary(TacOp::Equal, in_range, zero);
        let bad = self.emitter.binary(TacOp::Or, negative, past_end);
        self.emit_runtime_check(bad, SUBSCRIPT_ERROR);

        let one = self.emitter.load_constant(1);
        let slot = self.emitter.binary(TacOp::Add, index, one);
        let word = self.emitter.load_constant(self.options.layout.word_size);
        let offset = self.emitter.binary(TacOp::Mul, slot, word);
        Ok(self.emitter.binary(TacOp::Add, array, offset))
    }

    fn emit_new(&mut self, class: &Identifier, expr: &Expr) -> Result<Location, EmitError> {
        let planned = self
            .layout
            .class(class.as_str())
            .ok_or_else(|| unresolved(class.as_str(), expr))?;
        let size = self.emitter.load_constant(planned.instance_size);
        let object = self.emitter.builtin_value(Builtin::Alloc, vec![size]);
        let vtable = self.emitter.load_label(class.as_str());
        self.emitter.store(object.clone(), 0, vtable);
        Ok(object)
    }

    fn emit_new_array(&mut self, size: &'ast Expr) -> Result<Location, EmitError> {
        let count = self.emit_value(size)?;
        let one = self.emitter.load_constant(1);
        let too_small = self.emitter.binary(TacOp::Less, count.clone(), one.clone());
        self.emit_runtime_check(too_small, ARRAY_SIZE_ERROR);

        let words = self.emitter.binary(TacOp::Add, count.clone(), one);
        let word = self.emitter.load_constant(self.options.layout.word_size);
        let bytes = self.emitter.binary(TacOp::Mul, words, word);
        let array = self.emitter.builtin_value(Builtin::Alloc, vec![bytes]);
        self.emitter.store(array.clone(), 0, count);
        Ok(array)
    }

    /// Emit a call; `None` when the callee returns void.
    fn emit_call(
        &mut self,
        expr: &'ast Expr,
        base: Option<&'ast Expr>,
        name: &Identifier,
        args: &'ast [Expr],
    ) -> Result<Option<Location>, EmitError> {
        if let Some(base) = base
            && matches!(self.type_of(base.id, base.span)?, Type::Array(_))
            && name.as_str() == "length"
        {
            let array = self.emit_value(base)?;
            return Ok(Some(self.emitter.load(array, 0)));
        }

        let Some(DeclRef::Fn(callee)) = self.semantics.decl_of(expr.id) else {
            return Err(unresolved(name.as_str(), expr));
        };
        let has_result = !callee.return_type().is_void();

        let receiver = match base {
            Some(base) => {
                let base_ty = self.type_of(base.id, base.span)?;
                if let Some(type_name) = base_ty.as_named()
                    && self.layout.class(type_name).is_none()
                {
                    return Err(EmitError::InterfaceDispatch {
                        interface: type_name.to_string(),
                        method: name.name.clone(),
                        span: expr.span,
                    });
                }
                Some(self.emit_value(base)?)
            }
            None if self.layout.slot(callee.id).is_some() => Some(self.this_location()),
            None => None,
        };

        let mut actuals = Vec::with_capacity(args.len());
        for arg in args {
            actuals.push(self.emit_value(arg)?);
        }

        let Some(receiver) = receiver else {
            let label = self
                .layout
                .label(callee.id)
                .ok_or_else(|| unresolved(name.as_str(), expr))?;
            for actual in actuals.iter().rev() {
                self.emitter.push_param(actual.clone());
            }
            let result = self.emitter.lcall(label, has_result);
            self.emitter.pop_params(actuals.len());
            return Ok(result);
        };

        let slot = self
            .layout
            .slot(callee.id)
            .ok_or_else(|| unresolved(name.as_str(), expr))?;
        let vtable = self.emitter.load(receiver.clone(), 0);
        let method = self
            .emitter
            .load(vtable, self.options.layout.method_offset(slot));
        for actual in actuals.iter().rev() {
            self.emitter.push_param(actual.clone());
        }
        self.emitter.push_param(receiver);
        let result = self.emitter.acall(method, has_result);
        self.emitter.pop_params(actuals.len() + 1);
        Ok(result)
    }
}

fn less_or_equal(e: &mut super::Emitter, lhs: Location, rhs: Location) -> Location {
    let less = e.binary(TacOp::Less, lhs.clone(), rhs.clone());
    let equal = e.binary(TacOp::Equal, lhs, rhs);
    e.binary(TacOp::Or, less, equal)
}

fn unresolved(name: &str, expr: &Expr) -> EmitError {
    EmitError::Unresolved {
        name: name.to_string(),
        span: expr.span,
    }
}
