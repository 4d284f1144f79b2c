//! Decaf
//!
//! Semantic analyzer and code generator for the Decaf teaching language.
//! A front end hands over a parsed [`Program`](decaf_ast::Program); the
//! [`Compiler`] checks it and, when it is clean, lowers it to a stream of
//! target-independent pseudo-instructions.
//!
//! ```
//! use decaf::prelude::*;
//!
//! let mut b = AstBuilder::new();
//! let hello = b.string("hello");
//! let print = b.print(vec![hello]);
//! let body = b.block(vec![], vec![print]);
//! let main = b.function("main", Type::VOID, vec![], body);
//! let program = b.program(vec![Decl::Fn(main)]);
//!
//! let compiled = Compiler::default().compile(&program).unwrap();
//! assert!(compiled.render().starts_with("main:"));
//! ```

mod compiler;

pub use compiler::{CompiledProgram, Compiler};

pub use decaf_ast as ast;
pub use decaf_compiler as backend;
pub use decaf_core as core;

/// Everything needed to build a program and compile it.
pub mod prelude {
    pub use crate::compiler::{CompiledProgram, Compiler};
    pub use decaf_ast::*;
    pub use decaf_compiler::{
        Builtin, FrameInfo, Instr, Layout, Location, Segment, TacOp, VTableDef,
    };
    pub use decaf_core::{
        CompileError, CompilerOptions, Diagnostics, EmitError, Reason, SemanticError, Span,
        TargetLayout, Type,
    };
}
