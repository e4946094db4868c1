// src/frontend/mod.rs
pub mod ast;
pub mod token;

pub use ast::*;
pub use token::{FileId, Ident, Span};
