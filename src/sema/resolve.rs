// src/sema/resolve.rs
//
// Type elaboration: converts TypeExpr (AST representation) to ir::Type
// under a type scope and a source context.

use crate::errors::SemanticError;
use crate::frontend::{TypeApply, TypeExpr};
use crate::ir;
use crate::sema::constraints;
use crate::sema::context::{EntityKind, ProgramContext, SourceContext, TypeScope};

/// Whether type-argument constraints on base types are verified.
///
/// Member collection elaborates in `Skip` mode because the entity set needed
/// to check constraints is not complete yet; body checking re-elaborates in
/// `Check` mode. Crossing the modes against the context's
/// `has_collected_members` bit is an internal fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeMode {
    Check,
    Skip,
}

pub(crate) fn compile_type(
    ctx: &ProgramContext,
    scope: &TypeScope,
    src: &SourceContext,
    ast: &TypeExpr,
    mode: TypeMode,
) -> Result<ir::Type, SemanticError> {
    match (mode, ctx.has_collected_members) {
        (TypeMode::Check, false) => {
            return Err(SemanticError::ice_at(
                "constraint-checked type elaboration before member collection",
                ast.span(),
            ));
        }
        (TypeMode::Skip, true) => {
            return Err(SemanticError::ice_at(
                "skip-mode type elaboration after member collection",
                ast.span(),
            ));
        }
        _ => {}
    }

    match ast {
        TypeExpr::This(span) => scope
            .this_type()
            .cloned()
            .ok_or(SemanticError::InvalidThisType { span: *span }),
        TypeExpr::Int(_) => Ok(ir::Type::Int),
        TypeExpr::Boolean(_) => Ok(ir::Type::Boolean),
        // the surface `String` type is the `Bytes` primitive
        TypeExpr::Str(_) => Ok(ir::Type::Bytes),
        TypeExpr::Variable(name) => match scope.lookup(&name.name) {
            Some(id) => Ok(ir::Type::Variable(id)),
            None => Err(SemanticError::NoSuchTypeVariable {
                name: name.name.clone(),
                span: name.span,
            }),
        },
        TypeExpr::Named(apply) => compile_named(ctx, scope, src, apply, mode),
    }
}

fn compile_named(
    ctx: &ProgramContext,
    scope: &TypeScope,
    src: &SourceContext,
    apply: &TypeApply,
    mode: TypeMode,
) -> Result<ir::Type, SemanticError> {
    let canonical = resolve_entity_name(ctx, src, apply)?;
    let entity = ctx.expect_entity(&canonical)?;
    if entity.kind == EntityKind::Interface {
        return Err(SemanticError::NonTypeEntityUsedAsType {
            name: canonical,
            span: apply.span,
        });
    }

    let arguments = apply
        .arguments
        .iter()
        .map(|arg| compile_type(ctx, scope, src, arg, mode))
        .collect::<Result<Vec<_>, _>>()?;

    if mode == TypeMode::Check {
        let expected = entity.scope.debug_names().len();
        if arguments.len() != expected {
            return Err(SemanticError::TypeParameterCountMismatch {
                ty: canonical,
                expected,
                actual: arguments.len(),
                span: apply.span,
            });
        }
        constraints::check_base_constraints(ctx, scope, entity, &arguments, apply.span)?;
    }

    Ok(ir::Type::Compound {
        record: ir::RecordId::new(canonical),
        arguments,
    })
}

/// Resolve a possibly-qualified entity application to its canonical name.
pub(crate) fn resolve_entity_name(
    ctx: &ProgramContext,
    src: &SourceContext,
    apply: &TypeApply,
) -> Result<String, SemanticError> {
    let canonical = match &apply.qualifier {
        Some(qualifier) => {
            let Some(namespace) = src.namespaces.get(&qualifier.name) else {
                return Err(SemanticError::NoSuchPackage {
                    name: qualifier.name.clone(),
                    span: qualifier.span,
                });
            };
            let names = ctx.packages.get(&namespace.package).ok_or_else(|| {
                SemanticError::ice(format!("namespace bound to unknown package '{}'", namespace.package))
            })?;
            names
                .get(&apply.name.name)
                .cloned()
                .ok_or_else(|| SemanticError::NoSuchEntity {
                    name: apply.name.name.clone(),
                    place: format!("package '{}'", namespace.package),
                    span: apply.name.span,
                })?
        }
        None => match src.entity_aliases.get(&apply.name.name) {
            Some(alias) => alias.canonical.clone(),
            None => {
                return Err(SemanticError::NoSuchEntity {
                    name: apply.name.name.clone(),
                    place: "scope".to_string(),
                    span: apply.name.span,
                });
            }
        },
    };
    tracing::trace!(name = %apply.name.name, %canonical, "resolved entity name");
    Ok(canonical)
}
