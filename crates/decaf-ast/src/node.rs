//! Node identity, identifiers and written type annotations.

use decaf_core::{Span, Type};
use std::fmt;

/// Identity of a tree node that owns a scope or carries analysis results.
///
/// Ids are handed out by [`AstBuilder`](crate::AstBuilder) in creation order
/// and are unique within one program. Analysis side tables key on them.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A name as written in the source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier {
    pub name: String,
    pub span: Span,
}

impl Identifier {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A type annotation as written: the type it spells plus where it was written.
///
/// Named types are not checked at construction; the check pass resolves the
/// innermost named component against the declared classes and interfaces.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeExpr {
    pub ty: Type,
    pub span: Span,
}

impl TypeExpr {
    pub fn new(ty: Type, span: Span) -> Self {
        Self { ty, span }
    }

    /// The class or interface name this annotation depends on, if any.
    pub fn named_component(&self) -> Option<&str> {
        self.ty.innermost().as_named()
    }
}
