//! Class and interface declarations.
//!
//! - `extends` must name a class and each `implements` an interface.
//! - No class may reach itself through `extends`. A cycle is reported once,
//!   on the first-declared class of the cycle.
//! - A member colliding with an inherited field is a conflict; a member
//!   colliding with an inherited method must be a method of exactly the same
//!   signature.
//! - Every method of every implemented interface must be provided by the
//!   class or one of its superclasses. The first missing method is reported
//!   once for that interface.

use decaf_ast::{ClassDecl, ClassMember, DeclRef, InterfaceDecl};
use decaf_core::{LookingFor, SemanticError};

use super::CheckPass;

impl<'ast> CheckPass<'_, 'ast> {
    pub(super) fn check_class(&mut self, class: &'ast ClassDecl) {
        let scope = self
            .scopes
            .scope_of(class.id)
            .unwrap_or_else(|| panic!("class '{}' has no scope", class.name));

        if let Some(ext) = &class.extends
            && self.scopes.class_named(ext.as_str()).is_none()
        {
            self.report(SemanticError::NotDeclared {
                name: ext.name.clone(),
                looking_for: LookingFor::Class,
                span: ext.span,
            });
        }
        if let Some(ext) = &class.extends
            && let Some(cycle) = self.scopes.inheritance_cycle(class)
            && cycle.iter().all(|member| member.id >= class.id)
        {
            self.report(SemanticError::InheritanceCycle {
                class: class.name.name.clone(),
                span: ext.span,
            });
        }
        for iface in &class.implements {
            if self.scopes.interface_named(iface.as_str()).is_none() {
                self.report(SemanticError::NotDeclared {
                    name: iface.name.clone(),
                    looking_for: LookingFor::Interface,
                    span: iface.span,
                });
            }
        }

        for member in &class.members {
            match member {
                ClassMember::Field(field) => self.check_type_expr(&field.ty),
                ClassMember::Method(method) => self.check_function(scope, method),
            }
        }

        self.check_against_ancestors(class);
        self.check_interfaces(class);
    }

    pub(super) fn check_interface(&mut self, interface: &'ast InterfaceDecl) {
        let scope = self
            .scopes
            .scope_of(interface.id)
            .unwrap_or_else(|| panic!("interface '{}' has no scope", interface.name));
        for method in &interface.members {
            self.check_function(scope, method);
        }
    }

    fn check_against_ancestors(&mut self, class: &'ast ClassDecl) {
        let chain = self.scopes.superclass_chain(class);
        for member in &class.members {
            let ident = member.as_decl().ident();
            let inherited = chain[1..].iter().find_map(|ancestor| {
                self.scopes
                    .scope_of(ancestor.id)
                    .and_then(|s| self.scopes.get(s).lookup(ident.as_str()))
            });
            match (member, inherited) {
                (_, None) => {}
                (_, Some(DeclRef::Var(field))) => {
                    self.report(SemanticError::DeclConflict {
                        name: ident.name.clone(),
                        span: ident.span,
                        previous: field.name.span,
                    });
                }
                (ClassMember::Method(method), Some(DeclRef::Fn(base)))
                    if method.has_signature_of(base) => {}
                (_, Some(_)) => {
                    self.report(SemanticError::OverrideMismatch {
                        name: ident.name.clone(),
                        span: ident.span,
                    });
                }
            }
        }
    }

    fn check_interfaces(&mut self, class: &'ast ClassDecl) {
        let chain = self.scopes.superclass_chain(class);
        for iface_name in &class.implements {
            let Some(iface) = self.scopes.interface_named(iface_name.as_str()) else {
                continue;
            };
            for required in &iface.members {
                let provided = chain.iter().find_map(|c| {
                    self.scopes
                        .scope_of(c.id)
                        .and_then(|s| self.scopes.get(s).lookup(required.name.as_str()))
                });
                match provided {
                    Some(DeclRef::Fn(method)) => {
                        if !method.has_signature_of(required) {
                            self.report(SemanticError::OverrideMismatch {
                                name: required.name.name.clone(),
                                span: method.name.span,
                            });
                        }
                    }
                    _ => {
                        self.report(SemanticError::InterfaceNotImplemented {
                            class: class.name.name.clone(),
                            interface: iface.name.name.clone(),
                            span: iface_name.span,
                        });
                        break;
                    }
                }
            }
        }
    }
}
