// src/sema/expr.rs
//
// Expression checking. Expressions compile into appends to the current op
// list under the function's variable stack; every expression produces a
// (possibly empty) flattened list of typed values.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::errors::SemanticError;
use crate::frontend::{
    Access, Atom, BinOpKind, Expr, Operand, RecordLiteralExpr, Span, StaticCallExpr,
};
use crate::ir;
use crate::sema::context::{ProgramContext, SourceContext, TypeScope};
use crate::sema::optree::{self, Join, OpTree};
use crate::sema::resolve::{TypeMode, compile_type};
use crate::sema::scope::VariableStack;

/// One value produced by an expression
#[derive(Debug, Clone)]
pub(crate) struct ValueRef {
    pub var: ir::VarId,
    pub ty: ir::Type,
    pub span: Span,
}

pub(crate) type Values = SmallVec<[ValueRef; 1]>;

/// Checks the statements and expressions of one function. Contract clauses
/// and the body share the function's variable stack, so ids stay dense
/// across the whole function.
pub(crate) struct FnChecker<'a> {
    pub(crate) ctx: &'a ProgramContext,
    pub(crate) src: &'a SourceContext,
    pub(crate) scope: &'a TypeScope,
    pub(crate) vars: VariableStack,
    pub(crate) return_types: Vec<ir::Type>,
    /// Location of the enclosing function's return type list
    pub(crate) returns_loc: Span,
    /// The synthetic return tuple, present while checking an ensures clause
    pub(crate) ensures_tuple: Option<Vec<ValueRef>>,
}

impl<'a> FnChecker<'a> {
    pub(crate) fn new(
        ctx: &'a ProgramContext,
        src: &'a SourceContext,
        scope: &'a TypeScope,
        vars: VariableStack,
        return_types: Vec<ir::Type>,
        returns_loc: Span,
    ) -> Self {
        Self {
            ctx,
            src,
            scope,
            vars,
            return_types,
            returns_loc,
            ensures_tuple: None,
        }
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    pub(crate) fn check_expr(
        &mut self,
        expr: &Expr,
        ops: &mut Vec<ir::Op>,
    ) -> Result<Values, SemanticError> {
        let tree = optree::build_tree(expr)?;
        self.check_tree(&tree, ops)
    }

    /// Compile an expression that must produce exactly one boolean value;
    /// `context` is the grouping/reason string in diagnostics (`"if"`,
    /// `"contract"`).
    pub(crate) fn check_single_boolean(
        &mut self,
        expr: &Expr,
        ops: &mut Vec<ir::Op>,
        context: &str,
    ) -> Result<ValueRef, SemanticError> {
        let values = self.check_expr(expr, ops)?;
        let value = single_value(values, expr.span(), context)?;
        if value.ty != ir::Type::Boolean {
            return Err(SemanticError::BooleanTypeExpected {
                reason: context.to_string(),
                found: self.scope.type_name(&value.ty),
                span: value.span,
            });
        }
        Ok(value)
    }

    fn check_tree(
        &mut self,
        tree: &OpTree<'_>,
        ops: &mut Vec<ir::Op>,
    ) -> Result<Values, SemanticError> {
        match tree {
            OpTree::Leaf(operand) => self.check_operand(operand, ops),
            OpTree::Join(join) => {
                let value = match join.op.kind {
                    BinOpKind::And | BinOpKind::Or | BinOpKind::Implies => {
                        self.lower_logical(join, ops)?
                    }
                    _ => self.lower_binary(join, ops)?,
                };
                Ok(SmallVec::from_elem(value, 1))
            }
        }
    }

    /// An operator operand must be single-valued.
    fn tree_operand(
        &mut self,
        tree: &OpTree<'_>,
        ops: &mut Vec<ir::Op>,
        span: Span,
    ) -> Result<ValueRef, SemanticError> {
        let values = self.check_tree(tree, ops)?;
        single_value(values, span, "operator")
    }

    /// Arithmetic and comparison operators dispatch on the left-hand type;
    /// the only provided implementations are the integer foreigns.
    fn lower_binary(
        &mut self,
        join: &Join<'_>,
        ops: &mut Vec<ir::Op>,
    ) -> Result<ValueRef, SemanticError> {
        let op = join.op;
        let symbol = op.kind.symbol();
        let left = self.tree_operand(&join.left, ops, op.span)?;

        let (foreign, result_ty) = match (&left.ty, op.kind) {
            (ir::Type::Int, BinOpKind::Eq) => (ir::FOREIGN_INT_EQ, ir::Type::Boolean),
            (ir::Type::Int, BinOpKind::Add) => (ir::FOREIGN_INT_ADD, ir::Type::Int),
            (ir::Type::Int, BinOpKind::Sub) => (ir::FOREIGN_INT_SUB, ir::Type::Int),
            _ => {
                return Err(SemanticError::TypeDoesNotProvideOperator {
                    ty: self.scope.type_name(&left.ty),
                    operator: symbol.to_string(),
                    span: op.span,
                });
            }
        };

        let right = self.tree_operand(&join.right, ops, op.span)?;
        if right.ty != left.ty {
            return Err(SemanticError::OperatorTypeMismatch {
                operator: symbol.to_string(),
                expected: self.scope.type_name(&left.ty),
                found: self.scope.type_name(&right.ty),
                span: right.span,
            });
        }

        let dest = self.emit_temp(result_ty.clone(), op.span, ops);
        ops.push(ir::Op::ForeignCall {
            function: foreign.to_string(),
            arguments: vec![left.var, right.var],
            destinations: vec![dest],
        });
        Ok(ValueRef {
            var: dest,
            ty: result_ty,
            span: op.span,
        })
    }

    /// `and` / `or` / `implies` lower to a short-circuit branch that
    /// assigns a pre-declared boolean temporary.
    fn lower_logical(
        &mut self,
        join: &Join<'_>,
        ops: &mut Vec<ir::Op>,
    ) -> Result<ValueRef, SemanticError> {
        let op = join.op;
        let symbol = op.kind.symbol();
        let left = self.tree_operand(&join.left, ops, op.span)?;
        if left.ty != ir::Type::Boolean {
            return Err(SemanticError::TypeDoesNotProvideOperator {
                ty: self.scope.type_name(&left.ty),
                operator: symbol.to_string(),
                span: op.span,
            });
        }

        let result = self.emit_temp(ir::Type::Boolean, op.span, ops);
        let rhs_ops = self.lower_logical_rhs(join, result)?;
        let assign_left = vec![ir::Op::Assign {
            dest: result,
            source: left.var,
        }];

        let (true_ops, false_ops) = match op.kind {
            // L or R: L true decides; otherwise R decides
            BinOpKind::Or => (assign_left, rhs_ops),
            // L and R: L false decides; otherwise R decides
            BinOpKind::And => (rhs_ops, assign_left),
            // L implies R: vacuously true when L is false
            BinOpKind::Implies => (
                rhs_ops,
                vec![ir::Op::Const {
                    dest: result,
                    value: ir::ConstValue::Boolean(true),
                }],
            ),
            _ => {
                return Err(SemanticError::ice_at(
                    "logical lowering on a non-logical operator",
                    op.span,
                ));
            }
        };

        ops.push(ir::Op::Branch {
            condition: left.var,
            true_ops,
            false_ops,
        });
        Ok(ValueRef {
            var: result,
            ty: ir::Type::Boolean,
            span: op.span,
        })
    }

    /// Evaluate the right operand of a logical operator in its own variable
    /// block and assign it to the result temporary.
    fn lower_logical_rhs(
        &mut self,
        join: &Join<'_>,
        result: ir::VarId,
    ) -> Result<Vec<ir::Op>, SemanticError> {
        let symbol = join.op.kind.symbol();
        let mut side = Vec::new();
        self.vars.open_block();
        let right = self.tree_operand(&join.right, &mut side, join.op.span)?;
        if right.ty != ir::Type::Boolean {
            return Err(SemanticError::OperatorTypeMismatch {
                operator: symbol.to_string(),
                expected: "Boolean".to_string(),
                found: self.scope.type_name(&right.ty),
                span: right.span,
            });
        }
        side.push(ir::Op::Assign {
            dest: result,
            source: right.var,
        });
        self.vars.close_block();
        Ok(side)
    }

    // ------------------------------------------------------------------
    // Operands and atoms
    // ------------------------------------------------------------------

    fn check_operand(
        &mut self,
        operand: &Operand,
        ops: &mut Vec<ir::Op>,
    ) -> Result<Values, SemanticError> {
        let mut values = self.check_atom(&operand.atom, ops)?;
        for access in &operand.accesses {
            values = self.check_access(values, access)?;
        }
        Ok(values)
    }

    fn check_access(
        &mut self,
        values: Values,
        access: &Access,
    ) -> Result<Values, SemanticError> {
        match access {
            Access::Field { name } => {
                let value = single_value(values, name.span, "field")?;
                if !value.ty.is_compound() {
                    return Err(SemanticError::FieldAccessOnNonCompound {
                        found: self.scope.type_name(&value.ty),
                        span: name.span,
                    });
                }
                // there is no field-projection operation in the IR yet
                Err(SemanticError::ice_at(
                    "record field access lowering is not implemented",
                    name.span,
                ))
            }
            Access::Method { name, span, .. } => {
                let value = single_value(values, *span, "method")?;
                if !value.ty.is_compound() {
                    return Err(SemanticError::MethodAccessOnNonCompound {
                        found: self.scope.type_name(&value.ty),
                        span: name.span,
                    });
                }
                // value-dispatched calls need vtable support the IR lacks
                Err(SemanticError::ice_at(
                    "method dispatch lowering is not implemented",
                    name.span,
                ))
            }
        }
    }

    fn check_atom(&mut self, atom: &Atom, ops: &mut Vec<ir::Op>) -> Result<Values, SemanticError> {
        match atom {
            Atom::Identifier(name) => match self.vars.lookup(&name.name) {
                Some((var, entry)) => Ok(SmallVec::from_elem(
                    ValueRef {
                        var,
                        ty: entry.ty.clone(),
                        span: name.span,
                    },
                    1,
                )),
                None => Err(SemanticError::VariableNotDefined {
                    name: name.name.clone(),
                    span: name.span,
                }),
            },
            Atom::Group { expr, span } => {
                let values = self.check_expr(expr, ops)?;
                if values.len() != 1 {
                    return Err(SemanticError::MultiExpressionGrouped {
                        grouping: "parentheses".to_string(),
                        count: values.len(),
                        span: *span,
                    });
                }
                Ok(values)
            }
            Atom::IntLiteral { value, span } => {
                Ok(self.emit_const(ir::Type::Int, ir::ConstValue::Int(*value), *span, ops))
            }
            Atom::StrLiteral { value, span } => Ok(self.emit_const(
                ir::Type::Bytes,
                ir::ConstValue::Bytes(value.clone().into_bytes()),
                *span,
                ops,
            )),
            Atom::BoolLiteral { value, span } => Ok(self.emit_const(
                ir::Type::Boolean,
                ir::ConstValue::Boolean(*value),
                *span,
                ops,
            )),
            Atom::Return(span) => match &self.ensures_tuple {
                Some(tuple) => Ok(tuple.iter().cloned().collect()),
                None => Err(SemanticError::ReturnExpressionUsedOutsideEnsures { span: *span }),
            },
            Atom::StaticCall(call) => self.check_static_call(call, ops),
            Atom::RecordLiteral(lit) => self.check_record_literal(lit, ops),
        }
    }

    /// `Type.method(args)` — resolve the base record, substitute its type
    /// arguments into the callee's signature, and emit a static call.
    fn check_static_call(
        &mut self,
        call: &StaticCallExpr,
        ops: &mut Vec<ir::Op>,
    ) -> Result<Values, SemanticError> {
        let base = compile_type(self.ctx, self.scope, self.src, &call.base, TypeMode::Check)?;
        let (record, arguments) = match base {
            ir::Type::Compound { record, arguments } => (record, arguments),
            other => {
                return Err(SemanticError::CallOnNonCompound {
                    found: self.scope.type_name(&other),
                    span: call.base.span(),
                });
            }
        };
        let entity = self.ctx.expect_entity(record.as_str())?;
        let Some(member) = entity.function(&call.method.name) else {
            return Err(SemanticError::NoSuchFn {
                record: record.as_str().to_string(),
                name: call.method.name.clone(),
                span: call.method.span,
            });
        };

        let mut values: Values = SmallVec::new();
        for arg in &call.arguments {
            values.extend(self.check_expr(arg, ops)?);
        }

        if values.len() != member.parameters.len() {
            let args_span = call
                .arguments
                .iter()
                .map(|a| a.span())
                .reduce(Span::merge)
                .unwrap_or(call.span);
            return Err(SemanticError::ValueCountMismatch {
                actual: values.len(),
                expected: member.parameters.len(),
                span: args_span,
                declared: member.params_loc,
            });
        }

        let in_tuple = values.len() != 1;
        for (index, (value, param)) in values.iter().zip(&member.parameters).enumerate() {
            let expected = param.ty.substitute(&arguments);
            if value.ty != expected {
                return Err(SemanticError::TypeMismatch {
                    expected: self.scope.type_name(&expected),
                    found: self.scope.type_name(&value.ty),
                    value_index: in_tuple.then_some(index),
                    span: value.span,
                    declared: Some(param.loc),
                });
            }
        }

        let mut destinations = Vec::with_capacity(member.return_types.len());
        let mut out: Values = SmallVec::new();
        for ret in &member.return_types {
            let ty = ret.substitute(&arguments);
            let dest = self.emit_temp(ty.clone(), call.span, ops);
            destinations.push(dest);
            out.push(ValueRef {
                var: dest,
                ty,
                span: call.span,
            });
        }
        ops.push(ir::Op::StaticCall {
            function: ir::FunctionId::member(&record, &member.name),
            arguments: values.iter().map(|v| v.var).collect(),
            destinations,
        });
        Ok(out)
    }

    /// `Type { field = expr, ... }` — validated fully, but the IR has no
    /// construction operation to lower it to yet.
    fn check_record_literal(
        &mut self,
        lit: &RecordLiteralExpr,
        ops: &mut Vec<ir::Op>,
    ) -> Result<Values, SemanticError> {
        let base = compile_type(self.ctx, self.scope, self.src, &lit.base, TypeMode::Check)?;
        let ir::Type::Compound { record, arguments } = &base else {
            return Err(SemanticError::NonCompoundInRecordLiteral {
                found: self.scope.type_name(&base),
                span: lit.base.span(),
            });
        };
        let entity = self.ctx.expect_entity(record.as_str())?;

        let mut seen: FxHashMap<&str, Span> = FxHashMap::default();
        for init in &lit.fields {
            if let Some(original) = seen.get(init.name.name.as_str()) {
                return Err(SemanticError::FieldRepeatedInRecordLiteral {
                    name: init.name.name.clone(),
                    span: init.name.span,
                    original: *original,
                });
            }
            seen.insert(init.name.name.as_str(), init.name.span);
            if entity.field(&init.name.name).is_none() {
                return Err(SemanticError::NoSuchField {
                    record: record.as_str().to_string(),
                    name: init.name.name.clone(),
                    span: init.name.span,
                });
            }
        }
        for field in &entity.fields {
            if !seen.contains_key(field.name.as_str()) {
                return Err(SemanticError::UninitializedField {
                    record: record.as_str().to_string(),
                    name: field.name.clone(),
                    span: lit.span,
                });
            }
        }

        for init in &lit.fields {
            let values = self.check_expr(&init.value, ops)?;
            let value = single_value(values, init.value.span(), "field")?;
            let field = entity.field(&init.name.name).ok_or_else(|| {
                SemanticError::ice_at("validated field vanished", init.name.span)
            })?;
            let expected = field.ty.substitute(arguments);
            if value.ty != expected {
                return Err(SemanticError::TypeMismatch {
                    expected: self.scope.type_name(&expected),
                    found: self.scope.type_name(&value.ty),
                    value_index: None,
                    span: value.span,
                    declared: Some(field.loc),
                });
            }
        }

        Err(SemanticError::ice_at(
            "record literal lowering is not implemented",
            lit.span,
        ))
    }

    // ------------------------------------------------------------------
    // Emission helpers
    // ------------------------------------------------------------------

    /// Declare an invisible temporary and emit its variable declaration.
    pub(crate) fn emit_temp(
        &mut self,
        ty: ir::Type,
        span: Span,
        ops: &mut Vec<ir::Op>,
    ) -> ir::VarId {
        let var = self.vars.declare_temp(ty.clone(), span);
        ops.push(ir::Op::Var { dest: var, ty });
        var
    }

    fn emit_const(
        &mut self,
        ty: ir::Type,
        value: ir::ConstValue,
        span: Span,
        ops: &mut Vec<ir::Op>,
    ) -> Values {
        let var = self.emit_temp(ty.clone(), span, ops);
        ops.push(ir::Op::Const { dest: var, value });
        SmallVec::from_elem(ValueRef { var, ty, span }, 1)
    }
}

/// Reduce a flattened value list to its single element, or report how the
/// grouping context rejects multi-value expressions.
pub(crate) fn single_value(
    values: Values,
    span: Span,
    grouping: &str,
) -> Result<ValueRef, SemanticError> {
    let count = values.len();
    let mut iter = values.into_iter();
    match (iter.next(), iter.next()) {
        (Some(value), None) => Ok(value),
        _ => Err(SemanticError::MultiExpressionGrouped {
            grouping: grouping.to_string(),
            count,
            span,
        }),
    }
}
