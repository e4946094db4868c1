// src/sema/constraints.rs
//
// Constraint elaboration and the satisfaction search used when type
// arguments are checked against a base type's declared constraints.

use crate::errors::SemanticError;
use crate::frontend::{ConstraintExpr, Span, TypeApply};
use crate::ir;
use crate::sema::context::{
    ConstraintBinding, EntityDef, EntityKind, ProgramContext, SourceContext, TypeScope,
};
use crate::sema::resolve::{TypeMode, compile_type, resolve_entity_name};

/// Elaborate `subject is Interface[args]` into a binding for `scope`.
pub(crate) fn elaborate_constraint(
    ctx: &ProgramContext,
    scope: &TypeScope,
    src: &SourceContext,
    cons: &ConstraintExpr,
    mode: TypeMode,
) -> Result<ConstraintBinding, SemanticError> {
    let interface = resolve_constraint_interface(ctx, src, &cons.interface)?;
    let mut subjects = vec![compile_type(ctx, scope, src, &cons.subject, mode)?];
    for arg in &cons.interface.arguments {
        subjects.push(compile_type(ctx, scope, src, arg, mode)?);
    }
    Ok(ConstraintBinding {
        interface,
        subjects,
        loc: cons.span,
    })
}

/// Elaborate a record-header `is Interface[args]` declaration. The record's
/// own type (over its type variables) becomes the leading subject.
pub(crate) fn elaborate_impl(
    ctx: &ProgramContext,
    scope: &TypeScope,
    src: &SourceContext,
    self_type: ir::Type,
    apply: &TypeApply,
    mode: TypeMode,
) -> Result<ConstraintBinding, SemanticError> {
    let interface = resolve_constraint_interface(ctx, src, apply)?;
    let mut subjects = vec![self_type];
    for arg in &apply.arguments {
        subjects.push(compile_type(ctx, scope, src, arg, mode)?);
    }
    Ok(ConstraintBinding {
        interface,
        subjects,
        loc: apply.span,
    })
}

fn resolve_constraint_interface(
    ctx: &ProgramContext,
    src: &SourceContext,
    apply: &TypeApply,
) -> Result<ir::InterfaceId, SemanticError> {
    let canonical = resolve_entity_name(ctx, src, apply)?;
    let entity = ctx.expect_entity(&canonical)?;
    if entity.kind != EntityKind::Interface {
        return Err(SemanticError::TypeUsedAsConstraint {
            name: canonical,
            span: apply.span,
        });
    }
    Ok(ir::InterfaceId::new(canonical))
}

/// Verify that `arguments` applied to `base` satisfy every constraint the
/// base declares. Called from check-mode type elaboration only.
pub(crate) fn check_base_constraints(
    ctx: &ProgramContext,
    ambient: &TypeScope,
    base: &EntityDef,
    arguments: &[ir::Type],
    use_span: Span,
) -> Result<(), SemanticError> {
    for binding in base.scope.constraints() {
        let needed: Vec<ir::Type> = binding
            .subjects
            .iter()
            .map(|s| s.substitute(arguments))
            .collect();
        if !binding_satisfied(ctx, ambient, &binding.interface, &needed)? {
            return Err(SemanticError::TypesDontSatisfyConstraint {
                constraint: render_constraint(ambient, &binding.interface, &needed),
                span: use_span,
                declared: binding.loc,
            });
        }
    }
    Ok(())
}

/// A constraint is satisfied iff some available declaration has structurally
/// equal subjects: either a binding in the ambient scope, or an `is`
/// declaration on the subject's base record, substituted through that
/// record's actual type arguments.
fn binding_satisfied(
    ctx: &ProgramContext,
    ambient: &TypeScope,
    interface: &ir::InterfaceId,
    needed: &[ir::Type],
) -> Result<bool, SemanticError> {
    for available in ambient.constraints() {
        if &available.interface == interface && available.subjects == needed {
            tracing::trace!(%interface, "constraint satisfied by ambient scope");
            return Ok(true);
        }
    }

    if let Some(ir::Type::Compound { record, arguments }) = needed.first() {
        let entity = ctx.expect_entity(record.as_str())?;
        for declared in &entity.impls {
            if &declared.interface != interface {
                continue;
            }
            let substituted: Vec<ir::Type> = declared
                .subjects
                .iter()
                .map(|s| s.substitute(arguments))
                .collect();
            if substituted == needed {
                tracing::trace!(%interface, record = record.as_str(), "constraint satisfied by record header");
                return Ok(true);
            }
        }
    }

    Ok(false)
}

fn render_constraint(
    scope: &TypeScope,
    interface: &ir::InterfaceId,
    subjects: &[ir::Type],
) -> String {
    let subject = subjects
        .first()
        .map(|s| scope.type_name(s))
        .unwrap_or_default();
    if subjects.len() <= 1 {
        format!("{subject} is {interface}")
    } else {
        let args: Vec<String> = subjects[1..].iter().map(|s| scope.type_name(s)).collect();
        format!("{subject} is {interface}[{}]", args.join(", "))
    }
}
