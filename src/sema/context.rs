// src/sema/context.rs
//
// Pass-shared state: the program context built up by entity collection,
// the per-file source contexts, and the type scopes entities carry.

use rustc_hash::FxHashMap;

use crate::errors::SemanticError;
use crate::frontend::{FileId, Ident, Span};
use crate::ir;

/// A constraint declared in a type scope or on a record header:
/// `subjects[0] is interface[subjects[1..]]`.
#[derive(Debug, Clone)]
pub struct ConstraintBinding {
    pub interface: ir::InterfaceId,
    pub subjects: Vec<ir::Type>,
    pub loc: Span,
}

impl ConstraintBinding {
    pub(crate) fn to_parameter(&self) -> ir::ConstraintParameter {
        ir::ConstraintParameter {
            interface: self.interface.clone(),
            subjects: self.subjects.clone(),
        }
    }
}

/// The set of type variables and constraints visible inside one entity or
/// function signature.
///
/// Variable ids are assigned in declaration order; inside an interface the
/// distinguished `This` type occupies id 0 and user variables start at 1.
#[derive(Debug, Clone, Default)]
pub struct TypeScope {
    this_type: Option<ir::Type>,
    variables: FxHashMap<String, (ir::TypeVarId, Span)>,
    debug_names: Vec<String>,
    constraints: Vec<ConstraintBinding>,
}

impl TypeScope {
    /// Scope of a record: no `This`, no variables.
    pub fn for_record() -> Self {
        TypeScope::default()
    }

    /// Scope of an interface: `This` pre-installed as type variable 0.
    pub fn for_interface() -> Self {
        TypeScope {
            this_type: Some(ir::Type::Variable(ir::TypeVarId::new(0))),
            variables: FxHashMap::default(),
            debug_names: vec!["This".to_string()],
            constraints: Vec::new(),
        }
    }

    pub fn this_type(&self) -> Option<&ir::Type> {
        self.this_type.as_ref()
    }

    /// Declare a type variable; its id continues the debug-name order.
    pub fn declare(&mut self, name: &Ident) -> Result<ir::TypeVarId, SemanticError> {
        if let Some((_, original)) = self.variables.get(&name.name) {
            return Err(SemanticError::TypeVariableRedefined {
                name: name.name.clone(),
                span: name.span,
                original: *original,
            });
        }
        let id = ir::TypeVarId::new(self.debug_names.len() as u32);
        self.variables
            .insert(name.name.clone(), (id, name.span));
        self.debug_names.push(name.name.clone());
        Ok(id)
    }

    pub fn lookup(&self, name: &str) -> Option<ir::TypeVarId> {
        self.variables.get(name).map(|(id, _)| *id)
    }

    pub fn debug_names(&self) -> &[String] {
        &self.debug_names
    }

    pub fn constraints(&self) -> &[ConstraintBinding] {
        &self.constraints
    }

    pub fn push_constraint(&mut self, binding: ConstraintBinding) {
        self.constraints.push(binding);
    }

    /// Render a type for diagnostics, substituting debug names for type
    /// variables known to this scope.
    pub fn type_name(&self, ty: &ir::Type) -> String {
        match ty {
            ir::Type::Int => "Int".to_string(),
            ir::Type::Boolean => "Boolean".to_string(),
            ir::Type::Bytes => "Bytes".to_string(),
            ir::Type::Variable(v) => match self.debug_names.get(v.index() as usize) {
                Some(name) if name == "This" => name.clone(),
                Some(name) => format!("#{name}"),
                None => v.to_string(),
            },
            ir::Type::Compound { record, arguments } => {
                if arguments.is_empty() {
                    record.as_str().to_string()
                } else {
                    let args: Vec<String> =
                        arguments.iter().map(|a| self.type_name(a)).collect();
                    format!("{}[{}]", record.as_str(), args.join(", "))
                }
            }
        }
    }
}

/// Whether an entity is a record or an interface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Record,
    Interface,
}

/// A field collected from a record definition
#[derive(Debug, Clone)]
pub struct FieldMember {
    pub name: String,
    pub ty: ir::Type,
    pub loc: Span,
}

/// A function signature collected from a record or interface definition.
/// Types here were elaborated before member collection finished, so their
/// constraints are re-verified during body checking.
#[derive(Debug, Clone)]
pub struct FunctionMember {
    pub name: String,
    pub loc: Span,
    /// Location of the parameter list, cited by call-site arity errors
    pub params_loc: Span,
    pub parameters: Vec<ir::Parameter>,
    pub return_types: Vec<ir::Type>,
}

/// A record or interface definition registered under its canonical name
#[derive(Debug)]
pub struct EntityDef {
    pub kind: EntityKind,
    pub canonical: String,
    pub file: FileId,
    /// Binding location: the defining name token
    pub loc: Span,
    pub scope: TypeScope,
    /// Records only; always empty for interfaces
    pub fields: Vec<FieldMember>,
    pub functions: Vec<FunctionMember>,
    /// Header `is Interface[args]` declarations (records only).
    /// `subjects[0]` is the record's own type over its type variables.
    pub impls: Vec<ConstraintBinding>,
}

impl EntityDef {
    pub fn function(&self, name: &str) -> Option<&FunctionMember> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn field(&self, name: &str) -> Option<&FieldMember> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The entity's own type applied to its own type variables
    pub fn self_type(&self) -> ir::Type {
        let offset = if self.kind == EntityKind::Interface { 1 } else { 0 };
        let arguments = (offset..self.scope.debug_names().len() as u32)
            .map(|i| ir::Type::Variable(ir::TypeVarId::new(i)))
            .collect();
        ir::Type::Compound {
            record: ir::RecordId::new(self.canonical.clone()),
            arguments,
        }
    }
}

/// An unqualified entity name in scope for one source file
#[derive(Debug, Clone)]
pub struct EntityAlias {
    pub canonical: String,
    pub loc: Span,
}

/// A package qualifier in scope for one source file
#[derive(Debug, Clone)]
pub struct NamespaceBinding {
    pub package: String,
    pub loc: Span,
}

/// Name environment of one source file: the unqualified names and package
/// qualifiers its imports (and its own package) put in scope. Built during
/// source-context resolution, read-only afterwards.
#[derive(Debug, Default)]
pub struct SourceContext {
    pub entity_aliases: FxHashMap<String, EntityAlias>,
    pub namespaces: FxHashMap<String, NamespaceBinding>,
}

/// Mutable state shared by the three passes. Created at the start of entity
/// collection and discarded once the IR program is handed to the caller.
#[derive(Debug, Default)]
pub struct ProgramContext {
    /// package → short name → canonical name
    pub packages: FxHashMap<String, FxHashMap<String, String>>,
    /// canonical name → definition
    pub entities: FxHashMap<String, EntityDef>,
    pub source_contexts: FxHashMap<FileId, SourceContext>,
    /// Monotonic phase bit: flips to true between member collection and
    /// body checking, and gates constraint checking in type elaboration.
    pub has_collected_members: bool,
}

impl ProgramContext {
    pub fn new() -> Self {
        ProgramContext::default()
    }

    pub fn entity(&self, canonical: &str) -> Option<&EntityDef> {
        self.entities.get(canonical)
    }

    /// Entity lookup for ids that earlier passes produced; a miss is an
    /// internal fault, not a user error.
    pub(crate) fn expect_entity(&self, canonical: &str) -> Result<&EntityDef, SemanticError> {
        self.entities
            .get(canonical)
            .ok_or_else(|| SemanticError::ice(format!("unregistered entity '{canonical}'")))
    }

    pub(crate) fn expect_source_context(
        &self,
        file: FileId,
    ) -> Result<&SourceContext, SemanticError> {
        self.source_contexts
            .get(&file)
            .ok_or_else(|| SemanticError::ice(format!("missing source context for {file:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::Span;

    fn ident(name: &str) -> Ident {
        Ident::new(name, Span::default())
    }

    #[test]
    fn record_scope_starts_empty() {
        let scope = TypeScope::for_record();
        assert!(scope.this_type().is_none());
        assert!(scope.debug_names().is_empty());
    }

    #[test]
    fn interface_scope_seeds_this_as_variable_zero() {
        let scope = TypeScope::for_interface();
        assert_eq!(
            scope.this_type(),
            Some(&ir::Type::Variable(ir::TypeVarId::new(0)))
        );
        assert_eq!(scope.debug_names(), ["This"]);
    }

    #[test]
    fn interface_user_variables_start_after_this() {
        let mut scope = TypeScope::for_interface();
        let t = scope.declare(&ident("T")).unwrap();
        assert_eq!(t, ir::TypeVarId::new(1));
        assert_eq!(scope.lookup("T"), Some(t));
    }

    #[test]
    fn duplicate_type_variable_is_rejected() {
        let mut scope = TypeScope::for_record();
        scope.declare(&ident("T")).unwrap();
        let err = scope.declare(&ident("T")).unwrap_err();
        assert!(matches!(err, SemanticError::TypeVariableRedefined { .. }));
    }

    #[test]
    fn type_name_uses_debug_names() {
        let mut scope = TypeScope::for_record();
        scope.declare(&ident("T")).unwrap();
        let ty = ir::Type::Compound {
            record: ir::RecordId::new("example.Box"),
            arguments: vec![ir::Type::Variable(ir::TypeVarId::new(0))],
        };
        assert_eq!(scope.type_name(&ty), "example.Box[#T]");
    }
}
