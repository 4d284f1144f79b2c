//! Decaf Compiler
//!
//! Semantic analysis and code generation for a parsed Decaf program.
//!
//! ## Architecture
//!
//! - **Pass 1 (Scope Build)**: create every scope and register every declaration
//! - **Pass 2 (Check)**: type every expression and check every structural rule
//! - **Layout**: assign offsets, labels and vtable slots (clean programs only)
//! - **Codegen**: lower to pseudo-instructions with runtime checks
//!
//! Passes communicate through side tables keyed by node id; the syntax tree is
//! never mutated.
//!
//! ## Modules
//!
//! - [`scope`]: scope arena and name resolution
//! - [`context`]: compilation context, phases and semantic side tables
//! - [`passes`]: the two analysis passes
//! - [`layout`]: memory layout planning
//! - [`codegen`]: pseudo-instruction generation

pub mod codegen;
pub mod context;
pub mod layout;
pub mod passes;
pub mod scope;

pub use codegen::{
    ARRAY_SIZE_ERROR, Builtin, CodeGenerator, CodegenOutput, FrameInfo, Instr, Location,
    SUBSCRIPT_ERROR, Segment, TacOp, VTableDef,
};
pub use context::{CompilationContext, Phase, Semantics};
pub use layout::{ClassLayout, FieldSlot, Layout, LayoutPlanner, VTableEntry};
pub use passes::{CheckOutput, CheckPass, ScopeBuildOutput, ScopeBuildPass};
pub use scope::{Scope, ScopeId, ScopeKind, ScopeTree};
