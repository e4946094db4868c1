// src/sema/declarations.rs
//
// Pass 3: with every signature known, re-elaborate all types with
// constraint checking enabled, compile contract clauses to boolean blocks,
// and compile record function bodies into IR operations.

use crate::errors::SemanticError;
use crate::frontend::{Definition, Expr, FnDef, InterfaceDef, RecordDef, Source, Span};
use crate::ir;
use crate::sema::constraints;
use crate::sema::context::{EntityDef, EntityKind, ProgramContext, SourceContext};
use crate::sema::expr::{FnChecker, ValueRef};
use crate::sema::resolve::{TypeMode, compile_type};
use crate::sema::scope::VariableStack;

pub(crate) fn check_program(
    ctx: &ProgramContext,
    sources: &[Source],
) -> Result<ir::Program, SemanticError> {
    let mut program = ir::Program::new();
    for source in sources {
        let src = ctx.expect_source_context(source.file)?;
        for def in &source.definitions {
            let canonical = format!("{}.{}", source.package.name, def.name().name);
            let entity = ctx.expect_entity(&canonical)?;
            match def {
                Definition::Record(record) => {
                    check_record(ctx, src, entity, record, &mut program)?;
                }
                Definition::Interface(iface) => {
                    check_interface(ctx, src, entity, iface, &mut program)?;
                }
            }
        }
    }
    Ok(program)
}

fn check_record(
    ctx: &ProgramContext,
    src: &SourceContext,
    entity: &EntityDef,
    def: &RecordDef,
    program: &mut ir::Program,
) -> Result<(), SemanticError> {
    let mut fields = Vec::with_capacity(def.fields.len());
    for field in &def.fields {
        let ty = compile_type(ctx, &entity.scope, src, &field.ty, TypeMode::Check)?;
        fields.push(ir::Field {
            name: field.name.name.clone(),
            ty,
            loc: field.name.span,
        });
    }

    // header declarations get their arguments re-checked too
    for apply in &def.implements {
        constraints::elaborate_impl(
            ctx,
            &entity.scope,
            src,
            entity.self_type(),
            apply,
            TypeMode::Check,
        )?;
    }

    let record_id = ir::RecordId::new(entity.canonical.clone());
    for func in &def.functions {
        let (signature, body) = check_function(ctx, src, entity, func)?;
        program.functions.insert(
            ir::FunctionId::member(&record_id, &func.name.name),
            ir::Function {
                signature,
                body: body.unwrap_or_default(),
            },
        );
    }

    program.records.insert(
        record_id,
        ir::Record {
            type_parameters: entity.scope.debug_names().to_vec(),
            fields,
        },
    );
    Ok(())
}

fn check_interface(
    ctx: &ProgramContext,
    src: &SourceContext,
    entity: &EntityDef,
    def: &InterfaceDef,
    program: &mut ir::Program,
) -> Result<(), SemanticError> {
    let mut interface = ir::Interface {
        type_parameters: entity.scope.debug_names().to_vec(),
        signatures: Default::default(),
    };
    for func in &def.functions {
        let (signature, _) = check_function(ctx, src, entity, func)?;
        interface.signatures.insert(func.name.name.clone(), signature);
    }
    program
        .interfaces
        .insert(ir::InterfaceId::new(entity.canonical.clone()), interface);
    Ok(())
}

/// Assemble one function: type parameters and constraints extend the
/// entity's scope, parameters become the first stack variables, contracts
/// compile to boolean blocks, and record functions compile their body with
/// terminator completion. The `proof` marker has no IR effect.
fn check_function(
    ctx: &ProgramContext,
    src: &SourceContext,
    entity: &EntityDef,
    func: &FnDef,
) -> Result<(ir::FunctionSignature, Option<Vec<ir::Op>>), SemanticError> {
    let mut scope = entity.scope.clone();
    for param in &func.type_params.params {
        scope.declare(param)?;
    }
    for cons in &func.type_params.constraints {
        let binding = constraints::elaborate_constraint(ctx, &scope, src, cons, TypeMode::Check)?;
        scope.push_constraint(binding);
    }

    let mut vars = VariableStack::new();
    let mut parameters = Vec::with_capacity(func.params.len());
    for param in &func.params {
        let ty = compile_type(ctx, &scope, src, &param.ty, TypeMode::Check)?;
        vars.declare(&param.name, ty.clone())?;
        parameters.push(ir::Parameter {
            name: param.name.name.clone(),
            ty,
            loc: param.span,
        });
    }

    let mut return_types = Vec::with_capacity(func.returns.len());
    for ret in &func.returns {
        return_types.push(compile_type(ctx, &scope, src, ret, TypeMode::Check)?);
    }
    let returns_loc = func
        .returns
        .iter()
        .map(|r| r.span())
        .reduce(Span::merge)
        .unwrap_or(func.name.span);

    let mut checker = FnChecker::new(ctx, src, &scope, vars, return_types.clone(), returns_loc);

    let mut preconditions = Vec::with_capacity(func.requires.len());
    for clause in &func.requires {
        preconditions.push(check_contract(&mut checker, clause)?);
    }
    let mut postconditions = Vec::with_capacity(func.ensures.len());
    for clause in &func.ensures {
        postconditions.push(check_ensures(&mut checker, clause)?);
    }

    let body = match entity.kind {
        EntityKind::Record => {
            let mut ops = Vec::new();
            if let Some(stmts) = &func.body {
                checker.check_block(stmts, &mut ops)?;
            }
            // the verifier proves total return coverage; an unterminated
            // body ends in an unreachable it must discharge
            if !ir::block_terminates(&ops) {
                ops.push(ir::Op::Unreachable {
                    kind: "return".to_string(),
                });
            }
            Some(ops)
        }
        EntityKind::Interface => None,
    };

    let signature = ir::FunctionSignature {
        type_parameters: scope.debug_names().to_vec(),
        constraint_parameters: scope.constraints().iter().map(|b| b.to_parameter()).collect(),
        parameters,
        return_types,
        preconditions,
        postconditions,
    };
    Ok((signature, body))
}

/// A `requires` clause: one boolean value in a fresh variable block.
fn check_contract(
    checker: &mut FnChecker<'_>,
    clause: &Expr,
) -> Result<ir::ContractBlock, SemanticError> {
    checker.vars.open_block();
    let mut ops = Vec::new();
    let value = checker.check_single_boolean(clause, &mut ops, "contract")?;
    checker.vars.close_block();
    Ok(ir::ContractBlock {
        ops,
        result: value.var,
    })
}

/// An `ensures` clause: like `requires`, but the synthetic return tuple is
/// pre-declared so the clause can mention `return`.
fn check_ensures(
    checker: &mut FnChecker<'_>,
    clause: &Expr,
) -> Result<ir::ContractBlock, SemanticError> {
    checker.vars.open_block();
    let mut ops = Vec::new();
    let span = clause.span();
    let tuple: Vec<ValueRef> = checker
        .return_types
        .clone()
        .into_iter()
        .map(|ty| {
            let var = checker.emit_temp(ty.clone(), span, &mut ops);
            ValueRef { var, ty, span }
        })
        .collect();

    checker.ensures_tuple = Some(tuple);
    let result = checker.check_single_boolean(clause, &mut ops, "contract");
    checker.ensures_tuple = None;
    let value = result?;
    checker.vars.close_block();
    Ok(ir::ContractBlock {
        ops,
        result: value.var,
    })
}
