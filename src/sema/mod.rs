// src/sema/mod.rs
//! Semantic analysis: three passes over a shared [`ProgramContext`].
//!
//! 1. Entity collection registers every record and interface under its
//!    canonical `package.Name` and rejects duplicates.
//! 2. Source-context resolution computes each file's name environment, then
//!    member collection elaborates type-parameter scopes, fields, and
//!    function signatures with constraint checking off.
//! 3. Body checking re-elaborates every type with constraint checking on
//!    and compiles contracts and bodies into IR operations.

pub mod context;
pub mod resolve;
pub mod scope;

mod collect;
mod constraints;
mod declarations;
mod expr;
mod members;
mod optree;
mod stmt;

#[cfg(test)]
pub(crate) mod testutil;

pub use context::{ProgramContext, SourceContext, TypeScope};
pub use resolve::TypeMode;
pub use scope::VariableStack;

use crate::errors::SemanticError;
use crate::frontend::Source;
use crate::ir;

/// Elaborate a set of parsed sources into an IR program.
///
/// All-or-nothing: the first semantic error unwinds the compilation and no
/// partial IR is returned. The context lives only for this invocation.
pub fn compile_sources(sources: &[Source]) -> Result<ir::Program, SemanticError> {
    let mut ctx = ProgramContext::new();
    collect::collect_entities(&mut ctx, sources)?;
    collect::build_source_contexts(&mut ctx, sources)?;
    members::collect_members(&mut ctx, sources)?;
    // the entity set is complete; constraint checking unlocks
    ctx.has_collected_members = true;
    tracing::debug!("member collection complete, checking bodies");
    declarations::check_program(&ctx, sources)
}
