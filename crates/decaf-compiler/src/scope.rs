//! Scope and symbol table.
//!
//! Scopes live in an arena ([`ScopeTree`]) and are addressed by [`ScopeId`].
//! Each scope owns a name → declaration table and a non-owning link to its
//! parent. Class scopes additionally link to the scope of their superclass so
//! inherited members resolve without copying them.
//!
//! ```text
//! Global ─┬─ Class(Dog)  ──inherits──▶ Class(Animal)
//!         │   └─ Function(speak)
//!         │       └─ Block
//!         │           └─ Loop
//!         │               └─ Block
//!         └─ Function(main)
//!             └─ Block
//! ```
//!
//! [`Scope::lookup`] consults one table only. Walking outward is done
//! explicitly through [`ScopeTree::ancestors`] and [`ScopeTree::resolve`].

use decaf_ast::{ClassDecl, DeclRef, FnDecl, InterfaceDecl, NodeId};
use decaf_core::ClassHierarchy;
use indexmap::IndexMap;
use indexmap::map::Entry;
use rustc_hash::{FxHashMap, FxHashSet};

// ============================================================================
// Types
// ============================================================================

/// Index of a scope within its [`ScopeTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(u32);

impl ScopeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// What construct a scope belongs to.
#[derive(Debug, Clone, Copy)]
pub enum ScopeKind<'ast> {
    Global,
    Class(&'ast ClassDecl),
    Interface(&'ast InterfaceDecl),
    Function(&'ast FnDecl),
    Block,
    Loop,
    Switch,
}

impl ScopeKind<'_> {
    /// Whether `break` may target this scope.
    pub fn is_breakable(&self) -> bool {
        matches!(self, ScopeKind::Loop | ScopeKind::Switch)
    }
}

/// One name → declaration table.
#[derive(Debug)]
pub struct Scope<'ast> {
    parent: Option<ScopeId>,
    /// Superclass scope, for class scopes with a resolvable `extends`.
    inherits: Option<ScopeId>,
    kind: ScopeKind<'ast>,
    owner: NodeId,
    table: IndexMap<&'ast str, DeclRef<'ast>>,
}

impl<'ast> Scope<'ast> {
    fn new(parent: Option<ScopeId>, owner: NodeId, kind: ScopeKind<'ast>) -> Self {
        Self {
            parent,
            inherits: None,
            kind,
            owner,
            table: IndexMap::new(),
        }
    }

    /// Register `decl` under its name.
    ///
    /// On a clash the first registration is kept and returned as the error.
    pub fn add_decl(&mut self, decl: DeclRef<'ast>) -> Result<(), DeclRef<'ast>> {
        match self.table.entry(decl.name()) {
            Entry::Occupied(existing) => Err(*existing.get()),
            Entry::Vacant(slot) => {
                slot.insert(decl);
                Ok(())
            }
        }
    }

    /// Look `name` up in this table only.
    pub fn lookup(&self, name: &str) -> Option<DeclRef<'ast>> {
        self.table.get(name).copied()
    }

    /// Declarations in registration order.
    pub fn decls(&self) -> impl Iterator<Item = DeclRef<'ast>> + '_ {
        self.table.values().copied()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    pub fn inherits(&self) -> Option<ScopeId> {
        self.inherits
    }

    pub fn kind(&self) -> ScopeKind<'ast> {
        self.kind
    }

    /// The node this scope was created for.
    pub fn owner(&self) -> NodeId {
        self.owner
    }
}

// ============================================================================
// ScopeTree
// ============================================================================

/// Arena of every scope in a program.
///
/// The first scope pushed is the global scope.
#[derive(Debug, Default)]
pub struct ScopeTree<'ast> {
    scopes: Vec<Scope<'ast>>,
    by_node: FxHashMap<NodeId, ScopeId>,
}

impl<'ast> ScopeTree<'ast> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a scope for the construct `owner`.
    pub fn push(
        &mut self,
        parent: Option<ScopeId>,
        owner: NodeId,
        kind: ScopeKind<'ast>,
    ) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope::new(parent, owner, kind));
        self.by_node.insert(owner, id);
        id
    }

    /// The global scope.
    ///
    /// # Panics
    /// Panics if no scope has been created yet.
    pub fn global(&self) -> ScopeId {
        assert!(!self.scopes.is_empty(), "scope tree has no global scope");
        ScopeId(0)
    }

    pub fn get(&self, id: ScopeId) -> &Scope<'ast> {
        &self.scopes[id.index()]
    }

    pub fn get_mut(&mut self, id: ScopeId) -> &mut Scope<'ast> {
        &mut self.scopes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Register `decl` in `scope`; see [`Scope::add_decl`].
    pub fn add_decl(&mut self, scope: ScopeId, decl: DeclRef<'ast>) -> Result<(), DeclRef<'ast>> {
        self.get_mut(scope).add_decl(decl)
    }

    /// Link a class scope to the scope of its superclass.
    pub fn set_inherits(&mut self, scope: ScopeId, superclass: ScopeId) {
        self.get_mut(scope).inherits = Some(superclass);
    }

    /// The scope created for construct `node`.
    pub fn scope_of(&self, node: NodeId) -> Option<ScopeId> {
        self.by_node.get(&node).copied()
    }

    /// `scope` and every enclosing scope, innermost first.
    pub fn ancestors(&self, scope: ScopeId) -> Ancestors<'_, 'ast> {
        Ancestors {
            tree: self,
            next: Some(scope),
        }
    }

    /// Look `name` up in a class scope and then along its superclass chain.
    ///
    /// For non-class scopes this is the same as [`Scope::lookup`].
    pub fn lookup_inherited(&self, scope: ScopeId, name: &str) -> Option<DeclRef<'ast>> {
        let mut seen = FxHashSet::default();
        let mut current = Some(scope);
        while let Some(id) = current {
            if !seen.insert(id) {
                break;
            }
            let s = self.get(id);
            if let Some(found) = s.lookup(name) {
                return Some(found);
            }
            current = s.inherits;
        }
        None
    }

    /// Resolve `name` as seen from `scope`: innermost declaration wins,
    /// class scopes include inherited members.
    pub fn resolve(&self, scope: ScopeId, name: &str) -> Option<DeclRef<'ast>> {
        self.ancestors(scope).find_map(|id| self.lookup_inherited(id, name))
    }

    /// A top-level declaration by name.
    pub fn global_decl(&self, name: &str) -> Option<DeclRef<'ast>> {
        self.scopes.first().and_then(|g| g.lookup(name))
    }

    /// A top-level class by name.
    pub fn class_named(&self, name: &str) -> Option<&'ast ClassDecl> {
        self.global_decl(name).and_then(|d| d.as_class())
    }

    /// A top-level interface by name.
    pub fn interface_named(&self, name: &str) -> Option<&'ast InterfaceDecl> {
        self.global_decl(name).and_then(|d| d.as_interface())
    }

    pub fn enclosing_class(&self, scope: ScopeId) -> Option<&'ast ClassDecl> {
        self.ancestors(scope).find_map(|id| match self.get(id).kind {
            ScopeKind::Class(class) => Some(class),
            _ => None,
        })
    }

    pub fn enclosing_function(&self, scope: ScopeId) -> Option<&'ast FnDecl> {
        self.ancestors(scope).find_map(|id| match self.get(id).kind {
            ScopeKind::Function(func) => Some(func),
            _ => None,
        })
    }

    /// Innermost loop or switch scope.
    pub fn enclosing_breakable(&self, scope: ScopeId) -> Option<ScopeId> {
        self.ancestors(scope).find(|id| self.get(*id).kind.is_breakable())
    }

    /// `class` followed by each superclass, stopping at an unresolvable or
    /// repeated name.
    pub fn superclass_chain(&self, class: &'ast ClassDecl) -> Vec<&'ast ClassDecl> {
        let mut chain = vec![class];
        let mut seen = FxHashSet::default();
        seen.insert(class.name.as_str());
        let mut current = class;
        while let Some(parent) = current
            .extends
            .as_ref()
            .and_then(|ext| self.class_named(ext.as_str()))
        {
            if !seen.insert(parent.name.as_str()) {
                break;
            }
            chain.push(parent);
            current = parent;
        }
        chain
    }

    /// The classes on the `extends` cycle through `class`, in walk order, or
    /// `None` when the chain from `class` ends without returning to it.
    pub fn inheritance_cycle(&self, class: &'ast ClassDecl) -> Option<Vec<&'ast ClassDecl>> {
        let mut members = vec![class];
        let mut current = class;
        while let Some(parent) = current
            .extends
            .as_ref()
            .and_then(|ext| self.class_named(ext.as_str()))
        {
            if parent.id == class.id {
                return Some(members);
            }
            if members.iter().any(|m| m.id == parent.id) {
                return None;
            }
            members.push(parent);
            current = parent;
        }
        None
    }
}

impl ClassHierarchy for ScopeTree<'_> {
    fn conforms_to(&self, class: &str, target: &str) -> bool {
        let Some(class) = self.class_named(class) else {
            return false;
        };
        self.superclass_chain(class).into_iter().any(|c| {
            c.name.as_str() == target || c.implements.iter().any(|i| i.as_str() == target)
        })
    }
}

/// Iterator over a scope and its enclosing scopes.
pub struct Ancestors<'t, 'ast> {
    tree: &'t ScopeTree<'ast>,
    next: Option<ScopeId>,
}

impl Iterator for Ancestors<'_, '_> {
    type Item = ScopeId;

    fn next(&mut self) -> Option<ScopeId> {
        let current = self.next?;
        self.next = self.tree.get(current).parent;
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use decaf_ast::{AstBuilder, ClassMember};
    use decaf_core::Type;

    #[test]
    fn add_decl_keeps_first() {
        let mut b = AstBuilder::new();
        let first = b.var("x", Type::INT);
        let second = b.var("x", Type::BOOL);
        let mut tree = ScopeTree::new();
        let global = tree.push(None, NodeId(100), ScopeKind::Global);

        assert!(tree.add_decl(global, DeclRef::Var(&first)).is_ok());
        let clash = tree.add_decl(global, DeclRef::Var(&second));
        assert_eq!(clash, Err(DeclRef::Var(&first)));
        assert_eq!(tree.get(global).lookup("x"), Some(DeclRef::Var(&first)));
        assert_eq!(tree.get(global).len(), 1);
    }

    #[test]
    fn lookup_does_not_walk_but_resolve_does() {
        let mut b = AstBuilder::new();
        let g = b.var("g", Type::INT);
        let local = b.var("l", Type::INT);
        let mut tree = ScopeTree::new();
        let global = tree.push(None, NodeId(100), ScopeKind::Global);
        let block = tree.push(Some(global), NodeId(101), ScopeKind::Block);
        tree.add_decl(global, DeclRef::Var(&g)).unwrap();
        tree.add_decl(block, DeclRef::Var(&local)).unwrap();

        assert!(tree.get(block).lookup("g").is_none());
        assert_eq!(tree.resolve(block, "g"), Some(DeclRef::Var(&g)));
        assert_eq!(tree.resolve(block, "l"), Some(DeclRef::Var(&local)));
        assert!(tree.resolve(global, "l").is_none());
        assert_eq!(tree.scope_of(NodeId(101)), Some(block));
    }

    #[test]
    fn inner_declaration_shadows_outer() {
        let mut b = AstBuilder::new();
        let outer = b.var("x", Type::INT);
        let inner = b.var("x", Type::STRING);
        let mut tree = ScopeTree::new();
        let global = tree.push(None, NodeId(100), ScopeKind::Global);
        let block = tree.push(Some(global), NodeId(101), ScopeKind::Block);
        tree.add_decl(global, DeclRef::Var(&outer)).unwrap();
        tree.add_decl(block, DeclRef::Var(&inner)).unwrap();
        assert_eq!(tree.resolve(block, "x"), Some(DeclRef::Var(&inner)));
    }

    #[test]
    fn enclosing_breakable_crosses_blocks() {
        let mut tree = ScopeTree::new();
        let global = tree.push(None, NodeId(0), ScopeKind::Global);
        let body = tree.push(Some(global), NodeId(1), ScopeKind::Block);
        let looping = tree.push(Some(body), NodeId(2), ScopeKind::Loop);
        let inner = tree.push(Some(looping), NodeId(3), ScopeKind::Block);

        assert_eq!(tree.enclosing_breakable(inner), Some(looping));
        assert_eq!(tree.enclosing_breakable(body), None);
        let chain: Vec<_> = tree.ancestors(inner).collect();
        assert_eq!(chain, vec![inner, looping, body, global]);
    }

    #[test]
    fn inherited_members_and_hierarchy() {
        let mut b = AstBuilder::new();
        let x = b.var("x", Type::INT);
        let animal = b.class("Animal", None, &["Named"], vec![ClassMember::Field(x)]);
        let dog = b.class("Dog", Some("Animal"), &[], vec![]);

        let mut tree = ScopeTree::new();
        let global = tree.push(None, NodeId(100), ScopeKind::Global);
        tree.add_decl(global, DeclRef::Class(&animal)).unwrap();
        tree.add_decl(global, DeclRef::Class(&dog)).unwrap();
        let animal_scope = tree.push(Some(global), animal.id, ScopeKind::Class(&animal));
        let dog_scope = tree.push(Some(global), dog.id, ScopeKind::Class(&dog));
        if let ClassMember::Field(field) = &animal.members[0] {
            tree.add_decl(animal_scope, DeclRef::Var(field)).unwrap();
        }
        tree.set_inherits(dog_scope, animal_scope);

        assert_eq!(tree.lookup_inherited(dog_scope, "x").map(|d| d.name()), Some("x"));
        assert!(tree.get(dog_scope).lookup("x").is_none());
        assert!(tree.conforms_to("Dog", "Animal"));
        assert!(tree.conforms_to("Dog", "Named"));
        assert!(!tree.conforms_to("Animal", "Dog"));
        assert_eq!(tree.enclosing_class(dog_scope).map(|c| c.name.as_str()), Some("Dog"));
        assert_eq!(tree.superclass_chain(&dog).len(), 2);
    }

    #[test]
    fn inheritance_cycle_lists_its_members() {
        let mut b = AstBuilder::new();
        let a = b.class("A", Some("B"), &[], vec![]);
        let bb = b.class("B", Some("A"), &[], vec![]);
        let c = b.class("C", Some("A"), &[], vec![]);
        let mut tree = ScopeTree::new();
        let global = tree.push(None, NodeId(100), ScopeKind::Global);
        tree.add_decl(global, DeclRef::Class(&a)).unwrap();
        tree.add_decl(global, DeclRef::Class(&bb)).unwrap();
        tree.add_decl(global, DeclRef::Class(&c)).unwrap();

        let names = |cycle: Vec<&ClassDecl>| -> Vec<String> {
            cycle.iter().map(|c| c.name.name.clone()).collect()
        };
        assert_eq!(
            tree.inheritance_cycle(&a).map(names),
            Some(vec!["A".to_string(), "B".to_string()])
        );
        assert_eq!(
            tree.inheritance_cycle(&bb).map(names),
            Some(vec!["B".to_string(), "A".to_string()])
        );
        // leads into the cycle without being on it
        assert!(tree.inheritance_cycle(&c).is_none());
        assert_eq!(tree.superclass_chain(&c).len(), 3);
    }
}
