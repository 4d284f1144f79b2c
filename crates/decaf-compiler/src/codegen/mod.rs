//! Code generation.
//!
//! Lowers a checked, laid-out program to the pseudo-instruction stream in
//! [`instr`]. Code generation only reads the side tables the earlier passes
//! wrote; it never re-derives a type or a resolution.
//!
//! ```text
//! for each function      Label, BeginFunc, body, EndFunc
//! for each class         its methods as above, then VTable
//! ```
//!
//! Every array access is bounds checked and every array allocation size
//! checked at run time; a failed check prints a message and halts.
//!
//! - [`emitter`]: instruction buffer, temporaries and labels
//! - [`jumps`]: break targets
//! - [`frame`]: frame-size estimate
//! - `expr` / `stmt`: lowering

mod emitter;
mod expr;
mod frame;
mod instr;
mod jumps;
mod stmt;

pub use emitter::Emitter;
pub use frame::estimate as estimate_frame;
pub use instr::{Builtin, Instr, Location, Segment, TacOp, VTableDef};
pub use jumps::BreakLabels;

use decaf_ast::{ClassDecl, Decl, FnDecl, NodeId};
use decaf_core::{CompilerOptions, EmitError, Span, Type};
use log::{debug, trace};
use rustc_hash::FxHashMap;

use crate::context::{CompilationContext, Phase, Semantics};
use crate::layout::Layout;

/// Message printed before halting on a bad subscript.
pub const SUBSCRIPT_ERROR: &str = "Decaf runtime error: Array subscript out of bounds\n";
/// Message printed before halting on a non-positive array size.
pub const ARRAY_SIZE_ERROR: &str = "Decaf runtime error: Array size is <= 0\n";

/// Frame sizing of one emitted function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameInfo {
    pub label: String,
    /// Size carried by `BeginFunc`.
    pub estimate: i32,
    /// Bytes of locals and temporaries the body actually allocated.
    pub used: i32,
}

/// Output of code generation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodegenOutput {
    pub instrs: Vec<Instr>,
    /// Method tables in class declaration order.
    pub vtables: Vec<VTableDef>,
    /// One entry per function or method, in emission order.
    pub frames: Vec<FrameInfo>,
}

/// Lowers one program.
pub struct CodeGenerator<'a, 'ast> {
    semantics: &'a Semantics<'ast>,
    layout: &'a Layout,
    options: &'a CompilerOptions,
    emitter: Emitter,
    /// Frame slots of the block locals in scope.
    locals: FxHashMap<NodeId, Location>,
    /// Class whose method is being emitted.
    this_class: Option<&'ast ClassDecl>,
    frames: Vec<FrameInfo>,
    vtables: Vec<VTableDef>,
}

impl<'a, 'ast> CodeGenerator<'a, 'ast> {
    /// Generate code for `ctx.program` using `layout`.
    ///
    /// # Panics
    /// Panics if the layout planner has not run on `ctx`.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn generate(
        ctx: &mut CompilationContext<'ast>,
        layout: &'a Layout,
    ) -> Result<CodegenOutput, EmitError> {
        ctx.advance(Phase::LaidOut, Phase::Emitted);
        let program = ctx.program;

        let mut generator = CodeGenerator {
            semantics: &ctx.semantics,
            layout,
            options: &ctx.options,
            emitter: Emitter::new(ctx.options.layout),
            locals: FxHashMap::default(),
            this_class: None,
            frames: Vec::new(),
            vtables: Vec::new(),
        };

        for decl in &program.decls {
            match decl {
                Decl::Fn(func) => generator.emit_function(func)?,
                Decl::Class(class) => generator.emit_class(class)?,
                Decl::Var(_) | Decl::Interface(_) => {}
            }
        }

        let instrs = generator.emitter.finish();
        debug!(
            "codegen: {} instructions, {} functions, {} vtables",
            instrs.len(),
            generator.frames.len(),
            generator.vtables.len()
        );
        Ok(CodegenOutput {
            instrs,
            vtables: generator.vtables,
            frames: generator.frames,
        })
    }

    fn emit_class(&mut self, class: &'ast ClassDecl) -> Result<(), EmitError> {
        self.this_class = Some(class);
        for method in class.methods() {
            self.emit_function(method)?;
        }
        self.this_class = None;

        let methods = self
            .layout
            .class(class.name.as_str())
            .map(|planned| planned.vtable_labels())
            .unwrap_or_default();
        self.emitter.vtable(class.name.as_str(), methods.clone());
        self.vtables.push(VTableDef {
            class: class.name.name.clone(),
            methods,
        });
        Ok(())
    }

    fn emit_function(&mut self, func: &'ast FnDecl) -> Result<(), EmitError> {
        let Some(body) = &func.body else {
            return Ok(());
        };
        let label = self
            .layout
            .label(func.id)
            .ok_or_else(|| EmitError::Unresolved {
                name: func.name.name.clone(),
                span: func.span,
            })?
            .to_string();
        trace!("emitting {label}");

        let estimate = frame::estimate(body, self.options.layout.word_size);
        self.locals.clear();
        self.emitter.label(label.clone());
        self.emitter.begin_frame();
        self.emitter.begin_func(estimate);
        self.emit_block(body)?;
        self.emitter.end_func();

        let used = self.emitter.frame_used();
        debug_assert!(used <= estimate, "{label}: used {used} > estimate {estimate}");
        self.frames.push(FrameInfo {
            label,
            estimate,
            used,
        });
        Ok(())
    }

    /// Location of the receiver inside a method.
    fn this_location(&self) -> Location {
        Location::frame(self.options.layout.param_base, "this")
    }

    fn type_of(&self, id: NodeId, span: Span) -> Result<&'a Type, EmitError> {
        self.semantics
            .type_of(id)
            .ok_or_else(|| EmitError::Unresolved {
                name: format!("type of {id:?}"),
                span,
            })
    }

    /// Emit the runtime-error path: print `message`, halt. Control continues
    /// at `ok` when `bad` is zero.
    fn emit_runtime_check(&mut self, bad: Location, message: &str) {
        let ok = self.emitter.new_label();
        self.emitter.if_zero(bad, ok.clone());
        let msg = self.emitter.load_string(message);
        self.emitter.builtin(Builtin::PrintString, vec![msg]);
        self.emitter.builtin(Builtin::Halt, vec![]);
        self.emitter.label(ok);
    }
}
