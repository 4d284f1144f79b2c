//! Expression typing.
//!
//! | Family | Accepts | Result | On mismatch |
//! |---|---|---|---|
//! | arithmetic | int/int or double/double | operand type | `error` |
//! | relational | int/int or double/double | bool | bool |
//! | equality | either side compatible with the other | bool | `error` |
//! | logical | bool operands | bool | `error` |
//! | assignment | value compatible with target | target type | `error` |
//!
//! An `error` operand short-circuits every rule without a new diagnostic.

use decaf_ast::{BinaryOp, DeclRef, Expr, ExprKind, FnDecl, Identifier, OpFamily, UnaryOp};
use decaf_core::{LookingFor, SemanticError, Type};

use super::CheckPass;
use crate::scope::ScopeId;

impl<'ast> CheckPass<'_, 'ast> {
    /// Type `expr`, record the result, and return it.
    pub(super) fn check_expr(&mut self, scope: ScopeId, expr: &'ast Expr) -> Type {
        let ty = self.type_expr(scope, expr);
        self.semantics.record_type(expr.id, ty.clone());
        ty
    }

    fn type_expr(&mut self, scope: ScopeId, expr: &'ast Expr) -> Type {
        match &expr.kind {
            ExprKind::IntLit(_) => Type::INT,
            ExprKind::DoubleLit(_) => Type::DOUBLE,
            ExprKind::BoolLit(_) => Type::BOOL,
            ExprKind::StringLit(_) => Type::STRING,
            ExprKind::Null => Type::NULL,
            ExprKind::ReadInteger => Type::INT,
            ExprKind::ReadLine => Type::STRING,
            ExprKind::Binary { op, left, right } => {
                let lhs = self.check_expr(scope, left);
                let rhs = self.check_expr(scope, right);
                self.binary(*op, lhs, rhs, expr)
            }
            ExprKind::Unary { op, operand } => {
                let ty = self.check_expr(scope, operand);
                self.unary(*op, ty, expr)
            }
            ExprKind::Assign { target, value } => {
                let lhs = self.check_expr(scope, target);
                let rhs = self.check_expr(scope, value);
                if rhs.is_assignable_to(&lhs, self.scopes) {
                    lhs
                } else {
                    self.report(SemanticError::IncompatibleOperands {
                        op: "=",
                        left: lhs,
                        right: rhs,
                        span: expr.span,
                    });
                    Type::ERROR
                }
            }
            ExprKind::This => match self.scopes.enclosing_class(scope) {
                Some(class) => Type::named(class.name.as_str()),
                None => {
                    self.report(SemanticError::ThisOutsideClass { span: expr.span });
                    Type::ERROR
                }
            },
            ExprKind::ArrayAccess { base, index } => {
                let base_ty = self.check_expr(scope, base);
                let index_ty = self.check_expr(scope, index);
                if !index_ty.is_equal_to(&Type::INT) {
                    self.report(SemanticError::SubscriptNotInteger { span: index.span });
                }
                match base_ty {
                    Type::Array(elem) => *elem,
                    ty if ty.is_error() => Type::ERROR,
                    _ => {
                        self.report(SemanticError::BracketsOnNonArray { span: base.span });
                        Type::ERROR
                    }
                }
            }
            ExprKind::FieldAccess { base: None, field } => self.variable(scope, field, expr),
            ExprKind::FieldAccess {
                base: Some(base),
                field,
            } => {
                let base_ty = self.check_expr(scope, base);
                self.field_of(scope, base_ty, field, expr)
            }
            ExprKind::Call { base, name, args } => {
                let arg_types: Vec<Type> =
                    args.iter().map(|arg| self.check_expr(scope, arg)).collect();
                self.call(scope, base.as_deref(), name, args, arg_types, expr)
            }
            ExprKind::New { class } => match self.scopes.class_named(class.as_str()) {
                Some(decl) => Type::named(decl.name.as_str()),
                None => {
                    self.report(SemanticError::NotDeclared {
                        name: class.name.clone(),
                        looking_for: LookingFor::Class,
                        span: class.span,
                    });
                    Type::ERROR
                }
            },
            ExprKind::NewArray { size, elem } => {
                let size_ty = self.check_expr(scope, size);
                if !size_ty.is_equal_to(&Type::INT) {
                    self.report(SemanticError::NewArraySizeNotInteger { span: size.span });
                }
                if elem.ty.innermost().is_void() {
                    self.report(SemanticError::NotDeclared {
                        name: elem.ty.to_string(),
                        looking_for: LookingFor::Type,
                        span: elem.span,
                    });
                    return Type::ERROR;
                }
                self.check_type_expr(elem);
                Type::array(self.declared_type(&elem.ty))
            }
        }
    }

    fn binary(&mut self, op: BinaryOp, lhs: Type, rhs: Type, expr: &Expr) -> Type {
        let family = op.family();
        if lhs.is_error() || rhs.is_error() {
            return match family {
                OpFamily::Relational => Type::BOOL,
                _ => Type::ERROR,
            };
        }
        let accepted = match family {
            OpFamily::Arithmetic | OpFamily::Relational => lhs.is_numeric() && lhs == rhs,
            OpFamily::Equality => {
                rhs.is_assignable_to(&lhs, self.scopes) || lhs.is_assignable_to(&rhs, self.scopes)
            }
            OpFamily::Logical => lhs == Type::BOOL && rhs == Type::BOOL,
        };
        if !accepted {
            self.report(SemanticError::IncompatibleOperands {
                op: op.as_str(),
                left: lhs,
                right: rhs,
                span: expr.span,
            });
            return match family {
                OpFamily::Relational => Type::BOOL,
                _ => Type::ERROR,
            };
        }
        match family {
            OpFamily::Arithmetic => lhs,
            _ => Type::BOOL,
        }
    }

    fn unary(&mut self, op: UnaryOp, operand: Type, expr: &Expr) -> Type {
        if operand.is_error() {
            return Type::ERROR;
        }
        let accepted = match op {
            UnaryOp::Neg => operand.is_numeric(),
            UnaryOp::Not => operand == Type::BOOL,
        };
        if accepted {
            operand
        } else {
            self.report(SemanticError::IncompatibleOperand {
                op: op.as_str(),
                operand,
                span: expr.span,
            });
            Type::ERROR
        }
    }

    /// A bare identifier: the innermost variable of that name.
    fn variable(&mut self, scope: ScopeId, name: &Identifier, expr: &Expr) -> Type {
        match self.scopes.resolve(scope, name.as_str()) {
            Some(decl @ DeclRef::Var(var)) => {
                self.semantics.record_decl(expr.id, decl);
                self.declared_type(var.ty())
            }
            _ => {
                self.report(SemanticError::NotDeclared {
                    name: name.name.clone(),
                    looking_for: LookingFor::Variable,
                    span: name.span,
                });
                Type::ERROR
            }
        }
    }

    /// `base.field`: fields are visible only from inside a class.
    fn field_of(&mut self, scope: ScopeId, base: Type, field: &Identifier, expr: &Expr) -> Type {
        if base.is_error() {
            return Type::ERROR;
        }
        let found = self.member_of(&base, field.as_str());
        let Some(decl @ DeclRef::Var(var)) = found else {
            self.report(SemanticError::FieldNotFoundInBase {
                field: field.name.clone(),
                base,
                span: field.span,
            });
            return Type::ERROR;
        };
        if self.scopes.enclosing_class(scope).is_none() {
            self.report(SemanticError::InaccessibleField {
                field: field.name.clone(),
                base,
                span: field.span,
            });
            return Type::ERROR;
        }
        self.semantics.record_decl(expr.id, decl);
        self.declared_type(var.ty())
    }

    /// A member declared in (or inherited by) the class or interface `ty` names.
    fn member_of(&self, ty: &Type, name: &str) -> Option<DeclRef<'ast>> {
        let type_name = ty.as_named()?;
        let decl = self.scopes.global_decl(type_name)?;
        let scope = self.scopes.scope_of(decl.id())?;
        match decl {
            DeclRef::Class(_) => self.scopes.lookup_inherited(scope, name),
            DeclRef::Interface(_) => self.scopes.get(scope).lookup(name),
            _ => None,
        }
    }

    fn call(
        &mut self,
        scope: ScopeId,
        base: Option<&'ast Expr>,
        name: &Identifier,
        args: &'ast [Expr],
        arg_types: Vec<Type>,
        expr: &Expr,
    ) -> Type {
        let callee = match base {
            None => match self.scopes.resolve(scope, name.as_str()) {
                Some(DeclRef::Fn(func)) => func,
                _ => {
                    self.report(SemanticError::NotDeclared {
                        name: name.name.clone(),
                        looking_for: LookingFor::Function,
                        span: name.span,
                    });
                    return Type::ERROR;
                }
            },
            Some(base) => {
                let base_ty = self.check_expr(scope, base);
                if base_ty.is_error() {
                    return Type::ERROR;
                }
                if matches!(base_ty, Type::Array(_)) && name.as_str() == "length" {
                    if !args.is_empty() {
                        self.report(SemanticError::ArgumentCountMismatch {
                            name: name.name.clone(),
                            expected: 0,
                            given: args.len(),
                            span: name.span,
                        });
                    }
                    return Type::INT;
                }
                match self.member_of(&base_ty, name.as_str()) {
                    Some(DeclRef::Fn(method)) => {
                        if let Some(type_name) = base_ty.as_named()
                            && self.scopes.interface_named(type_name).is_some()
                        {
                            self.report(SemanticError::InterfaceDispatch {
                                interface: type_name.to_string(),
                                method: name.name.clone(),
                                span: expr.span,
                            });
                        }
                        method
                    }
                    _ => {
                        self.report(SemanticError::FieldNotFoundInBase {
                            field: name.name.clone(),
                            base: base_ty,
                            span: name.span,
                        });
                        return Type::ERROR;
                    }
                }
            }
        };
        self.semantics.record_decl(expr.id, DeclRef::Fn(callee));
        self.check_actuals(callee, name, args, &arg_types);
        self.declared_type(callee.return_type())
    }

    fn check_actuals(&mut self, callee: &FnDecl, name: &Identifier, args: &[Expr], given: &[Type]) {
        if callee.formals.len() != given.len() {
            self.report(SemanticError::ArgumentCountMismatch {
                name: name.name.clone(),
                expected: callee.formals.len(),
                given: given.len(),
                span: name.span,
            });
            return;
        }
        for (position, ((formal, actual), arg)) in
            callee.formals.iter().zip(given).zip(args).enumerate()
        {
            let expected = self.declared_type(formal.ty());
            if !actual.is_assignable_to(&expected, self.scopes) {
                self.report(SemanticError::ArgumentMismatch {
                    position: position + 1,
                    given: actual.clone(),
                    expected,
                    span: arg.span,
                });
            }
        }
    }
}
