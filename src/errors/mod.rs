// src/errors/mod.rs
//! Structured error reporting for the Tenet front-end.
//!
//! Semantic errors carry E2xxx codes; the E9999 `Internal` variant marks
//! internal consistency faults that should be unreachable when the
//! elaborator's invariants hold.

pub mod sema;

pub use sema::SemanticError;
