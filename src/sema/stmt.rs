// src/sema/stmt.rs

use smallvec::SmallVec;

use crate::errors::SemanticError;
use crate::frontend::{IfArm, IfStmt, ReturnStmt, Span, Statement, VarStmt};
use crate::ir;
use crate::sema::expr::{FnChecker, Values};
use crate::sema::resolve::{TypeMode, compile_type};

impl FnChecker<'_> {
    pub(crate) fn check_block(
        &mut self,
        block: &[Statement],
        ops: &mut Vec<ir::Op>,
    ) -> Result<(), SemanticError> {
        for stmt in block {
            self.check_stmt(stmt, ops)?;
        }
        Ok(())
    }

    pub(crate) fn check_stmt(
        &mut self,
        stmt: &Statement,
        ops: &mut Vec<ir::Op>,
    ) -> Result<(), SemanticError> {
        match stmt {
            Statement::Var(var) => self.check_var_stmt(var, ops),
            Statement::Return(ret) => self.check_return_stmt(ret, ops),
            Statement::If(cond) => self.check_if_stmt(cond, ops),
            Statement::Unreachable(_) => {
                ops.push(ir::Op::Unreachable {
                    kind: "explicit".to_string(),
                });
                Ok(())
            }
        }
    }

    /// `var v1: T1, v2: T2 = e1, e2;` — right-hand sides evaluate left to
    /// right and flatten; the fan-out must match the declared variables.
    fn check_var_stmt(
        &mut self,
        stmt: &VarStmt,
        ops: &mut Vec<ir::Op>,
    ) -> Result<(), SemanticError> {
        let mut values: Values = SmallVec::new();
        for expr in &stmt.values {
            values.extend(self.check_expr(expr, ops)?);
        }

        if values.len() != stmt.declarations.len() {
            let values_span = stmt
                .values
                .iter()
                .map(|e| e.span())
                .reduce(Span::merge)
                .unwrap_or(stmt.span);
            let declared_span = stmt
                .declarations
                .iter()
                .map(|(name, _)| name.span)
                .reduce(Span::merge)
                .unwrap_or(stmt.span);
            return Err(SemanticError::ValueCountMismatch {
                actual: values.len(),
                expected: stmt.declarations.len(),
                span: values_span,
                declared: declared_span,
            });
        }

        let mut declared = Vec::with_capacity(stmt.declarations.len());
        for (name, ty_ast) in &stmt.declarations {
            let ty = compile_type(self.ctx, self.scope, self.src, ty_ast, TypeMode::Check)?;
            let var = self.vars.declare(name, ty.clone())?;
            ops.push(ir::Op::Var {
                dest: var,
                ty: ty.clone(),
            });
            declared.push((var, ty, name.span));
        }

        for (value, (var, ty, name_span)) in values.iter().zip(&declared) {
            if &value.ty != ty {
                return Err(SemanticError::TypeMismatch {
                    expected: self.scope.type_name(ty),
                    found: self.scope.type_name(&value.ty),
                    value_index: None,
                    span: value.span,
                    declared: Some(*name_span),
                });
            }
            ops.push(ir::Op::Assign {
                dest: *var,
                source: value.var,
            });
        }
        Ok(())
    }

    /// `return e1, e2;` — fan-out checked against the enclosing function's
    /// return types.
    fn check_return_stmt(
        &mut self,
        stmt: &ReturnStmt,
        ops: &mut Vec<ir::Op>,
    ) -> Result<(), SemanticError> {
        let mut values: Values = SmallVec::new();
        for expr in &stmt.values {
            values.extend(self.check_expr(expr, ops)?);
        }

        if values.len() != self.return_types.len() {
            let values_span = stmt
                .values
                .iter()
                .map(|e| e.span())
                .reduce(Span::merge)
                .unwrap_or(stmt.span);
            return Err(SemanticError::ValueCountMismatch {
                actual: values.len(),
                expected: self.return_types.len(),
                span: values_span,
                declared: self.returns_loc,
            });
        }

        let in_tuple = values.len() != 1;
        for (index, (value, expected)) in values.iter().zip(&self.return_types).enumerate() {
            if &value.ty != expected {
                return Err(SemanticError::TypeMismatch {
                    expected: self.scope.type_name(expected),
                    found: self.scope.type_name(&value.ty),
                    value_index: in_tuple.then_some(index),
                    span: value.span,
                    declared: Some(self.returns_loc),
                });
            }
        }

        ops.push(ir::Op::Return {
            values: values.iter().map(|v| v.var).collect(),
        });
        Ok(())
    }

    /// `if` / `else if` / `else` — the chain compiles to nested branches on
    /// the false side; every arm body is a fresh variable block.
    fn check_if_stmt(
        &mut self,
        stmt: &IfStmt,
        ops: &mut Vec<ir::Op>,
    ) -> Result<(), SemanticError> {
        self.check_if_arms(&stmt.arms, stmt.else_block.as_deref(), ops)
    }

    fn check_if_arms(
        &mut self,
        arms: &[IfArm],
        else_block: Option<&[Statement]>,
        ops: &mut Vec<ir::Op>,
    ) -> Result<(), SemanticError> {
        let Some((arm, rest)) = arms.split_first() else {
            if let Some(block) = else_block {
                self.vars.open_block();
                self.check_block(block, ops)?;
                self.vars.close_block();
            }
            return Ok(());
        };

        let condition = self.check_single_boolean(&arm.condition, ops, "if")?;

        let mut true_ops = Vec::new();
        self.vars.open_block();
        self.check_block(&arm.block, &mut true_ops)?;
        self.vars.close_block();

        let mut false_ops = Vec::new();
        self.check_if_arms(rest, else_block, &mut false_ops)?;

        ops.push(ir::Op::Branch {
            condition: condition.var,
            true_ops,
            false_ops,
        });
        Ok(())
    }
}
