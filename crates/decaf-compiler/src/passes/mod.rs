//! Analysis passes.
//!
//! - [`scope_build`]: Pass 1 - create every scope and register every declaration
//! - [`check`]: Pass 2 - type and structure checking

pub mod check;
pub mod scope_build;

pub use check::{CheckOutput, CheckPass};
pub use scope_build::{ScopeBuildOutput, ScopeBuildPass};
