//! Memory layout planning.
//!
//! Runs once over a program that checked clean and writes a [`Layout`] side
//! table that code generation only reads.
//!
//! ```text
//! object of class B extends A        vtable of B
//! ┌──────────────────────┐ 0        ┌──────────────────┐ slot 0
//! │ vtable pointer       │────────▶ │ A.f or B.f       │
//! ├──────────────────────┤ 4        ├──────────────────┤ slot 1
//! │ A's fields           │          │ A.g or B.g       │
//! ├──────────────────────┤          ├──────────────────┤
//! │ B's own fields       │          │ B's new methods  │
//! └──────────────────────┘          └──────────────────┘
//! ```
//!
//! Inherited fields keep their offsets and inherited methods keep their
//! slots; an override replaces the label in the inherited slot.

use decaf_ast::{ClassDecl, Decl, FnDecl, NodeId};
use decaf_core::{CompilerOptions, TargetLayout};
use indexmap::IndexMap;
use log::{debug, trace};
use rustc_hash::FxHashMap;

use crate::codegen::Location;
use crate::context::{CompilationContext, Phase};
use crate::scope::ScopeTree;

/// A field and its byte offset in every instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSlot {
    pub name: String,
    pub offset: i32,
    pub decl: NodeId,
}

/// A method table entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VTableEntry {
    pub method: String,
    pub label: String,
    /// The declaration the label belongs to (the most derived override).
    pub decl: NodeId,
}

/// Layout of one class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassLayout {
    pub name: String,
    /// Bytes per instance, vtable pointer included.
    pub instance_size: i32,
    /// Inherited fields first, then own fields.
    pub fields: Vec<FieldSlot>,
    pub vtable: Vec<VTableEntry>,
}

impl ClassLayout {
    pub fn field(&self, name: &str) -> Option<&FieldSlot> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_offset(&self, name: &str) -> Option<i32> {
        self.field(name).map(|f| f.offset)
    }

    /// Labels in slot order.
    pub fn vtable_labels(&self) -> Vec<String> {
        self.vtable.iter().map(|e| e.label.clone()).collect()
    }

    pub fn slot_of(&self, method: &str) -> Option<usize> {
        self.vtable.iter().position(|e| e.method == method)
    }
}

/// Offsets, labels and slots for a whole program.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layout {
    globals: FxHashMap<NodeId, Location>,
    params: FxHashMap<NodeId, Location>,
    field_offsets: FxHashMap<NodeId, i32>,
    classes: IndexMap<String, ClassLayout>,
    labels: FxHashMap<NodeId, String>,
    slots: FxHashMap<NodeId, usize>,
    globals_size: i32,
}

impl Layout {
    /// Location of a global variable.
    pub fn global(&self, var: NodeId) -> Option<&Location> {
        self.globals.get(&var)
    }

    /// Location of a formal parameter.
    pub fn param(&self, var: NodeId) -> Option<&Location> {
        self.params.get(&var)
    }

    /// Offset of a field declaration within its instances.
    pub fn field_offset(&self, var: NodeId) -> Option<i32> {
        self.field_offsets.get(&var).copied()
    }

    pub fn class(&self, name: &str) -> Option<&ClassLayout> {
        self.classes.get(name)
    }

    /// Class layouts in declaration order.
    pub fn classes(&self) -> impl Iterator<Item = &ClassLayout> {
        self.classes.values()
    }

    /// Label of a function or method.
    pub fn label(&self, func: NodeId) -> Option<&str> {
        self.labels.get(&func).map(String::as_str)
    }

    /// Vtable slot of a method declaration.
    pub fn slot(&self, method: NodeId) -> Option<usize> {
        self.slots.get(&method).copied()
    }

    /// Bytes of global data.
    pub fn globals_size(&self) -> i32 {
        self.globals_size
    }
}

/// Builds a [`Layout`].
pub struct LayoutPlanner<'a, 'ast> {
    scopes: &'a ScopeTree<'ast>,
    options: &'a CompilerOptions,
    layout: Layout,
}

impl<'a, 'ast> LayoutPlanner<'a, 'ast> {
    /// Plan the layout of `ctx.program`.
    ///
    /// # Panics
    /// Panics if the program has unreported diagnostics or the check pass has
    /// not run.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn plan(ctx: &mut CompilationContext<'ast>) -> Layout {
        assert!(ctx.is_clean(), "layout requires a program without diagnostics");
        ctx.advance(Phase::Checked, Phase::LaidOut);
        let program = ctx.program;

        let mut planner = LayoutPlanner {
            scopes: &ctx.scopes,
            options: &ctx.options,
            layout: Layout::default(),
        };
        let target = planner.options.layout;

        let mut next_global = target.global_base;
        for decl in &program.decls {
            match decl {
                Decl::Var(var) => {
                    trace!("global '{}' at {}", var.name, next_global);
                    planner
                        .layout
                        .globals
                        .insert(var.id, Location::global(next_global, var.name.as_str()));
                    next_global += target.word_size;
                }
                Decl::Fn(func) => {
                    let label = planner.options.function_label(func.name.as_str());
                    planner.layout.labels.insert(func.id, label);
                    planner.place_params(func, false);
                }
                Decl::Class(class) => {
                    planner.plan_class(class);
                }
                Decl::Interface(_) => {}
            }
        }
        planner.layout.globals_size = next_global - target.global_base;

        debug!(
            "layout: {} globals, {} classes, {} labels",
            planner.layout.globals.len(),
            planner.layout.classes.len(),
            planner.layout.labels.len()
        );
        planner.layout
    }

    fn place_params(&mut self, func: &FnDecl, is_method: bool) {
        let target: TargetLayout = self.options.layout;
        let receiver = if is_method { target.word_size } else { 0 };
        for (i, formal) in func.formals.iter().enumerate() {
            let offset = target.param_base + receiver + i as i32 * target.word_size;
            self.layout
                .params
                .insert(formal.id, Location::frame(offset, formal.name.as_str()));
        }
    }

    /// Lay out `class`, laying out its superclass first.
    ///
    /// The check pass rejects `extends` cycles. The placeholder reserved here
    /// still keeps planning finite when the planner is driven directly.
    fn plan_class(&mut self, class: &'ast ClassDecl) -> ClassLayout {
        if let Some(done) = self.layout.classes.get(class.name.as_str()) {
            return done.clone();
        }
        let target = self.options.layout;
        // reserve the name so a cycle through `extends` stops here
        self.layout.classes.insert(
            class.name.name.clone(),
            ClassLayout {
                name: class.name.name.clone(),
                instance_size: target.field_base,
                fields: Vec::new(),
                vtable: Vec::new(),
            },
        );

        let parent = class
            .extends
            .as_ref()
            .and_then(|ext| self.scopes.class_named(ext.as_str()))
            .map(|parent| self.plan_class(parent));

        let (mut fields, mut vtable, mut next_offset) = match parent {
            Some(parent) => (parent.fields, parent.vtable, parent.instance_size),
            None => (Vec::new(), Vec::new(), target.field_base),
        };

        for field in class.fields() {
            trace!("field {}.{} at {}", class.name, field.name, next_offset);
            fields.push(FieldSlot {
                name: field.name.name.clone(),
                offset: next_offset,
                decl: field.id,
            });
            self.layout.field_offsets.insert(field.id, next_offset);
            next_offset += target.word_size;
        }

        for method in class.methods() {
            let label = self
                .options
                .method_label(class.name.as_str(), method.name.as_str());
            self.layout.labels.insert(method.id, label.clone());
            self.place_params(method, true);

            let entry = VTableEntry {
                method: method.name.name.clone(),
                label,
                decl: method.id,
            };
            let slot = match vtable.iter().position(|e| e.method == entry.method) {
                Some(slot) => {
                    vtable[slot] = entry;
                    slot
                }
                None => {
                    vtable.push(entry);
                    vtable.len() - 1
                }
            };
            self.layout.slots.insert(method.id, slot);
        }

        let planned = ClassLayout {
            name: class.name.name.clone(),
            instance_size: next_offset,
            fields,
            vtable,
        };
        self.layout
            .classes
            .insert(class.name.name.clone(), planned.clone());
        planned
    }
}
