// src/sema/members.rs
//
// Pass 2 (second half): per entity, install type parameters and declared
// constraints into its scope, then collect fields and function signatures.
// All types are elaborated in skip mode; constraints on base types cannot
// be checked until every entity's members are known.

use rustc_hash::FxHashMap;

use crate::errors::SemanticError;
use crate::frontend::{Definition, FnDef, Ident, Source, Span};
use crate::ir;
use crate::sema::constraints;
use crate::sema::context::{
    ConstraintBinding, EntityDef, EntityKind, FieldMember, FunctionMember, ProgramContext,
    SourceContext, TypeScope,
};
use crate::sema::resolve::{TypeMode, compile_type};

struct CollectedMembers {
    scope: TypeScope,
    fields: Vec<FieldMember>,
    functions: Vec<FunctionMember>,
    impls: Vec<ConstraintBinding>,
}

pub(crate) fn collect_members(
    ctx: &mut ProgramContext,
    sources: &[Source],
) -> Result<(), SemanticError> {
    for source in sources {
        for def in &source.definitions {
            let canonical = format!("{}.{}", source.package.name, def.name().name);
            let collected = {
                let src = ctx.expect_source_context(source.file)?;
                let entity = ctx.expect_entity(&canonical)?;
                collect_entity(ctx, src, entity, def)?
            };
            let entity = ctx
                .entities
                .get_mut(&canonical)
                .ok_or_else(|| SemanticError::ice(format!("entity '{canonical}' vanished")))?;
            entity.scope = collected.scope;
            entity.fields = collected.fields;
            entity.functions = collected.functions;
            entity.impls = collected.impls;
        }
    }
    Ok(())
}

fn collect_entity(
    ctx: &ProgramContext,
    src: &SourceContext,
    entity: &EntityDef,
    def: &Definition,
) -> Result<CollectedMembers, SemanticError> {
    let empty_fields = [];
    let empty_impls = [];
    let (type_params, impls_ast, fields_ast, fns_ast) = match def {
        Definition::Record(r) => (
            &r.type_params,
            r.implements.as_slice(),
            r.fields.as_slice(),
            r.functions.as_slice(),
        ),
        Definition::Interface(i) => (
            &i.type_params,
            &empty_impls[..],
            &empty_fields[..],
            i.functions.as_slice(),
        ),
    };

    let mut scope = match entity.kind {
        EntityKind::Record => TypeScope::for_record(),
        EntityKind::Interface => TypeScope::for_interface(),
    };
    for param in &type_params.params {
        scope.declare(param)?;
    }
    for cons in &type_params.constraints {
        let binding = constraints::elaborate_constraint(ctx, &scope, src, cons, TypeMode::Skip)?;
        scope.push_constraint(binding);
    }

    let mut impls = Vec::new();
    if entity.kind == EntityKind::Record {
        let arguments = (0..scope.debug_names().len() as u32)
            .map(|i| ir::Type::Variable(ir::TypeVarId::new(i)))
            .collect();
        let self_type = ir::Type::Compound {
            record: ir::RecordId::new(entity.canonical.clone()),
            arguments,
        };
        for apply in impls_ast {
            impls.push(constraints::elaborate_impl(
                ctx,
                &scope,
                src,
                self_type.clone(),
                apply,
                TypeMode::Skip,
            )?);
        }
    }

    // fields and functions share one namespace within an entity
    let mut seen: FxHashMap<String, Span> = FxHashMap::default();
    let mut fields = Vec::new();
    for field in fields_ast {
        member_unique(&mut seen, &entity.canonical, &field.name)?;
        let ty = compile_type(ctx, &scope, src, &field.ty, TypeMode::Skip)?;
        fields.push(FieldMember {
            name: field.name.name.clone(),
            ty,
            loc: field.name.span,
        });
    }

    let mut functions = Vec::new();
    for func in fns_ast {
        member_unique(&mut seen, &entity.canonical, &func.name)?;
        functions.push(collect_function(ctx, src, &scope, func)?);
    }

    Ok(CollectedMembers {
        scope,
        fields,
        functions,
        impls,
    })
}

fn collect_function(
    ctx: &ProgramContext,
    src: &SourceContext,
    entity_scope: &TypeScope,
    func: &FnDef,
) -> Result<FunctionMember, SemanticError> {
    let mut fn_scope = entity_scope.clone();
    for param in &func.type_params.params {
        fn_scope.declare(param)?;
    }
    for cons in &func.type_params.constraints {
        let binding = constraints::elaborate_constraint(ctx, &fn_scope, src, cons, TypeMode::Skip)?;
        fn_scope.push_constraint(binding);
    }

    let mut parameters = Vec::new();
    for param in &func.params {
        let ty = compile_type(ctx, &fn_scope, src, &param.ty, TypeMode::Skip)?;
        parameters.push(ir::Parameter {
            name: param.name.name.clone(),
            ty,
            loc: param.span,
        });
    }
    let mut return_types = Vec::new();
    for ret in &func.returns {
        return_types.push(compile_type(ctx, &fn_scope, src, ret, TypeMode::Skip)?);
    }
    let params_loc = func
        .params
        .iter()
        .map(|p| p.span)
        .reduce(Span::merge)
        .unwrap_or(func.name.span);

    Ok(FunctionMember {
        name: func.name.name.clone(),
        loc: func.name.span,
        params_loc,
        parameters,
        return_types,
    })
}

fn member_unique(
    seen: &mut FxHashMap<String, Span>,
    entity: &str,
    name: &Ident,
) -> Result<(), SemanticError> {
    if let Some(original) = seen.get(&name.name) {
        return Err(SemanticError::MemberRedefined {
            entity: entity.to_string(),
            name: name.name.clone(),
            span: name.span,
            original: *original,
        });
    }
    seen.insert(name.name.clone(), name.span);
    Ok(())
}
