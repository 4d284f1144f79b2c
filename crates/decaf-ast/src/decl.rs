//! Declaration nodes.
//!
//! ```text
//! Program
//! └── Decl
//!     ├── Var        name : type
//!     ├── Fn         return type, formals, optional body
//!     ├── Class      extends?, implements*, members (Field | Method)
//!     └── Interface  method prototypes
//! ```

use decaf_core::{Span, Type};

use crate::{Block, Identifier, NodeId, TypeExpr};

/// A variable: global, local, formal parameter or field.
#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub id: NodeId,
    pub name: Identifier,
    pub ty: TypeExpr,
    pub span: Span,
}

impl VarDecl {
    #[inline]
    pub fn ty(&self) -> &Type {
        &self.ty.ty
    }
}

/// A function, a method, or (with no body) an interface prototype.
#[derive(Debug, Clone, PartialEq)]
pub struct FnDecl {
    pub id: NodeId,
    pub name: Identifier,
    pub return_type: TypeExpr,
    pub formals: Vec<VarDecl>,
    pub body: Option<Block>,
    pub span: Span,
}

impl FnDecl {
    #[inline]
    pub fn return_type(&self) -> &Type {
        &self.return_type.ty
    }

    /// Same return type and the same ordered formal types.
    ///
    /// This is the exact-signature test used for overriding and interface
    /// conformance; there is no covariance.
    pub fn has_signature_of(&self, other: &FnDecl) -> bool {
        self.return_type().is_equivalent_to(other.return_type())
            && self.formals.len() == other.formals.len()
            && self
                .formals
                .iter()
                .zip(&other.formals)
                .all(|(a, b)| a.ty().is_equivalent_to(b.ty()))
    }
}

/// A member of a class body.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassMember {
    Field(VarDecl),
    Method(FnDecl),
}

impl ClassMember {
    pub fn as_decl(&self) -> DeclRef<'_> {
        match self {
            ClassMember::Field(var) => DeclRef::Var(var),
            ClassMember::Method(func) => DeclRef::Fn(func),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub id: NodeId,
    pub name: Identifier,
    pub extends: Option<Identifier>,
    pub implements: Vec<Identifier>,
    pub members: Vec<ClassMember>,
    pub span: Span,
}

impl ClassDecl {
    /// Fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &VarDecl> {
        self.members.iter().filter_map(|m| match m {
            ClassMember::Field(var) => Some(var),
            ClassMember::Method(_) => None,
        })
    }

    /// Methods in declaration order.
    pub fn methods(&self) -> impl Iterator<Item = &FnDecl> {
        self.members.iter().filter_map(|m| match m {
            ClassMember::Method(func) => Some(func),
            ClassMember::Field(_) => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceDecl {
    pub id: NodeId,
    pub name: Identifier,
    pub members: Vec<FnDecl>,
    pub span: Span,
}

/// A top-level declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum Decl {
    Var(VarDecl),
    Fn(FnDecl),
    Class(ClassDecl),
    Interface(InterfaceDecl),
}

impl Decl {
    pub fn as_ref(&self) -> DeclRef<'_> {
        match self {
            Decl::Var(d) => DeclRef::Var(d),
            Decl::Fn(d) => DeclRef::Fn(d),
            Decl::Class(d) => DeclRef::Class(d),
            Decl::Interface(d) => DeclRef::Interface(d),
        }
    }
}

/// Non-owning view of any declaration. This is what scopes store.
#[derive(Debug, Clone, Copy)]
pub enum DeclRef<'ast> {
    Var(&'ast VarDecl),
    Fn(&'ast FnDecl),
    Class(&'ast ClassDecl),
    Interface(&'ast InterfaceDecl),
}

impl<'ast> DeclRef<'ast> {
    pub fn id(&self) -> NodeId {
        match self {
            DeclRef::Var(d) => d.id,
            DeclRef::Fn(d) => d.id,
            DeclRef::Class(d) => d.id,
            DeclRef::Interface(d) => d.id,
        }
    }

    pub fn name(&self) -> &'ast str {
        self.ident().as_str()
    }

    pub fn ident(&self) -> &'ast Identifier {
        match self {
            DeclRef::Var(d) => &d.name,
            DeclRef::Fn(d) => &d.name,
            DeclRef::Class(d) => &d.name,
            DeclRef::Interface(d) => &d.name,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            DeclRef::Var(d) => d.span,
            DeclRef::Fn(d) => d.span,
            DeclRef::Class(d) => d.span,
            DeclRef::Interface(d) => d.span,
        }
    }

    pub fn as_var(&self) -> Option<&'ast VarDecl> {
        match self {
            DeclRef::Var(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_fn(&self) -> Option<&'ast FnDecl> {
        match self {
            DeclRef::Fn(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_class(&self) -> Option<&'ast ClassDecl> {
        match self {
            DeclRef::Class(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_interface(&self) -> Option<&'ast InterfaceDecl> {
        match self {
            DeclRef::Interface(d) => Some(d),
            _ => None,
        }
    }
}

impl PartialEq for DeclRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for DeclRef<'_> {}

/// A whole program: the root of the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub id: NodeId,
    pub decls: Vec<Decl>,
    pub span: Span,
}

impl Program {
    /// Top-level class declarations in order.
    pub fn classes(&self) -> impl Iterator<Item = &ClassDecl> {
        self.decls.iter().filter_map(|d| match d {
            Decl::Class(c) => Some(c),
            _ => None,
        })
    }
}
