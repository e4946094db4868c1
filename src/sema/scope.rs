// src/sema/scope.rs

use crate::errors::SemanticError;
use crate::frontend::{Ident, Span};
use crate::ir;

#[derive(Debug, Clone)]
pub struct StackVar {
    pub name: String,
    pub ty: ir::Type,
    pub loc: Span,
}

/// Scoped mapping from variable names to positional ids.
///
/// Entries are append-only: a variable's id is its insertion index, and ids
/// stay dense across the whole function. Closing a block removes the names
/// it introduced from visibility without giving their ids back. Temporaries
/// get synthesized `$i` names, which can never collide with user
/// identifiers.
#[derive(Debug, Default)]
pub struct VariableStack {
    entries: Vec<StackVar>,
    /// Indices into `entries` whose names are currently in scope
    visible: Vec<usize>,
    /// Stack of `visible` lengths at each open block
    blocks: Vec<usize>,
}

impl VariableStack {
    pub fn new() -> Self {
        VariableStack::default()
    }

    pub fn open_block(&mut self) {
        self.blocks.push(self.visible.len());
    }

    pub fn close_block(&mut self) {
        if let Some(start) = self.blocks.pop() {
            self.visible.truncate(start);
        }
    }

    /// Declare a named variable in the current block.
    pub fn declare(&mut self, name: &Ident, ty: ir::Type) -> Result<ir::VarId, SemanticError> {
        if let Some((_, existing)) = self.lookup(&name.name) {
            return Err(SemanticError::VariableRedefined {
                name: name.name.clone(),
                span: name.span,
                original: existing.loc,
            });
        }
        let index = self.entries.len();
        self.entries.push(StackVar {
            name: name.name.clone(),
            ty,
            loc: name.span,
        });
        self.visible.push(index);
        Ok(ir::VarId::new(index as u32))
    }

    /// Declare an invisible temporary; it never resolves by name.
    pub fn declare_temp(&mut self, ty: ir::Type, loc: Span) -> ir::VarId {
        let index = self.entries.len();
        self.entries.push(StackVar {
            name: format!("${index}"),
            ty,
            loc,
        });
        ir::VarId::new(index as u32)
    }

    pub fn lookup(&self, name: &str) -> Option<(ir::VarId, &StackVar)> {
        self.visible
            .iter()
            .rev()
            .map(|&i| (ir::VarId::new(i as u32), &self.entries[i]))
            .find(|(_, var)| var.name == name)
    }

    /// Total number of declared variables, temporaries included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
