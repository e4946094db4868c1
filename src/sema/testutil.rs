// src/sema/testutil.rs
//
// Shared builders for sema unit tests.

use crate::frontend::{FileId, Ident, Span, TypeApply, TypeExpr};
use crate::sema::context::{EntityDef, EntityKind, ProgramContext, TypeScope};

pub(crate) fn id(name: &str) -> Ident {
    Ident::new(name, Span::default())
}

pub(crate) fn id_at(name: &str, offset: u32) -> Ident {
    Ident::new(name, Span::new(FileId(0), offset, name.len() as u32))
}

pub(crate) fn int_ty() -> TypeExpr {
    TypeExpr::Int(Span::default())
}

pub(crate) fn boolean_ty() -> TypeExpr {
    TypeExpr::Boolean(Span::default())
}

pub(crate) fn string_ty() -> TypeExpr {
    TypeExpr::Str(Span::default())
}

pub(crate) fn tyvar(name: &str) -> TypeExpr {
    TypeExpr::Variable(id(name))
}

pub(crate) fn named_ty(name: &str) -> TypeExpr {
    named_ty_args(name, vec![])
}

pub(crate) fn named_ty_args(name: &str, arguments: Vec<TypeExpr>) -> TypeExpr {
    TypeExpr::Named(TypeApply {
        qualifier: None,
        name: id(name),
        arguments,
        span: Span::default(),
    })
}

fn register(ctx: &mut ProgramContext, package: &str, name: &str, kind: EntityKind) -> String {
    let canonical = format!("{package}.{name}");
    let scope = match kind {
        EntityKind::Record => TypeScope::for_record(),
        EntityKind::Interface => TypeScope::for_interface(),
    };
    ctx.packages
        .entry(package.to_string())
        .or_default()
        .insert(name.to_string(), canonical.clone());
    ctx.entities.insert(
        canonical.clone(),
        EntityDef {
            kind,
            canonical: canonical.clone(),
            file: FileId(0),
            loc: Span::default(),
            scope,
            fields: Vec::new(),
            functions: Vec::new(),
            impls: Vec::new(),
        },
    );
    canonical
}

pub(crate) fn register_record(ctx: &mut ProgramContext, package: &str, name: &str) -> String {
    register(ctx, package, name, EntityKind::Record)
}

pub(crate) fn register_interface(ctx: &mut ProgramContext, package: &str, name: &str) -> String {
    register(ctx, package, name, EntityKind::Interface)
}
