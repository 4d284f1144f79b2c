//! Core types shared by the Decaf compiler crates.
//!
//! - [`span`]: source locations
//! - [`types`]: the type system and its equivalence/compatibility rules
//! - [`diagnostics`]: semantic diagnostics and the sink they are reported to
//! - [`error`]: pipeline-level errors
//! - [`config`]: target layout and label naming

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod span;
pub mod types;

pub use config::{CompilerOptions, TargetLayout};
pub use diagnostics::{
    DiagnosticSink, Diagnostics, ErrorCategory, LookingFor, Reason, SemanticError,
};
pub use error::{CompileError, EmitError};
pub use span::Span;
pub use types::{ClassHierarchy, Primitive, Type};
