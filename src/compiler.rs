//! The compile pipeline.
//!
//! ```text
//! Program ─▶ ScopeBuildPass ─▶ CheckPass ─┬─ diagnostics ─▶ CompileError::Rejected
//!                                         └─ clean ─▶ LayoutPlanner ─▶ CodeGenerator ─▶ CompiledProgram
//! ```

use decaf_ast::Program;
use decaf_compiler::{
    CheckPass, CodeGenerator, CompilationContext, FrameInfo, Instr, Layout, LayoutPlanner,
    ScopeBuildPass, VTableDef,
};
use decaf_core::{CompileError, CompilerOptions, Diagnostics};
use log::{debug, info};

/// Runs the passes over one program at a time.
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    options: CompilerOptions,
}

impl Compiler {
    pub fn new(options: CompilerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Run both analysis passes and return every diagnostic, in report order.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn analyze(&self, program: &Program) -> Diagnostics {
        let mut ctx = CompilationContext::new(program, self.options.clone());
        Self::check(&mut ctx);
        ctx.diagnostics
    }

    /// Analyze `program` and, if it is clean, lay it out and generate code.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn compile(&self, program: &Program) -> Result<CompiledProgram, CompileError> {
        let mut ctx = CompilationContext::new(program, self.options.clone());
        Self::check(&mut ctx);
        if !ctx.is_clean() {
            let diagnostics = ctx.diagnostics.into_vec();
            info!("rejected with {} error(s)", diagnostics.len());
            return Err(CompileError::Rejected {
                count: diagnostics.len(),
                diagnostics,
            });
        }

        let layout = LayoutPlanner::plan(&mut ctx);
        let output = CodeGenerator::generate(&mut ctx, &layout)?;
        info!(
            "compiled {} instruction(s), {} vtable(s)",
            output.instrs.len(),
            output.vtables.len()
        );
        Ok(CompiledProgram {
            instrs: output.instrs,
            vtables: output.vtables,
            frames: output.frames,
            layout,
        })
    }

    fn check(ctx: &mut CompilationContext<'_>) {
        let built = ScopeBuildPass::run(ctx);
        let checked = CheckPass::run(ctx);
        debug!(
            "analysis: {} scopes, {} decls, {} error(s)",
            built.scopes_created,
            built.decls_registered,
            built.conflicts + checked.errors
        );
    }
}

/// Result of a successful compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledProgram {
    pub instrs: Vec<Instr>,
    pub vtables: Vec<VTableDef>,
    pub frames: Vec<FrameInfo>,
    pub layout: Layout,
}

impl CompiledProgram {
    /// Frame sizing of the function or method emitted under `label`.
    pub fn frame(&self, label: &str) -> Option<&FrameInfo> {
        self.frames.iter().find(|f| f.label == label)
    }

    /// The instruction stream as text, one instruction per line.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for instr in &self.instrs {
            out.push_str(&instr.to_string());
            out.push('\n');
        }
        out
    }
}
