// src/sema/optree.rs
//
// Operator-precedence tree builder. The parser hands expressions over as a
// head operand plus a flat left-to-right operator list; this module rebuilds
// the binary tree from a fixed precedence table before type checking.

use crate::errors::SemanticError;
use crate::frontend::{BinOp, BinOpKind, Expr, Operand};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Assoc {
    Left,
    Right,
    None,
}

/// Operators in the same group may chain without parentheses at equal
/// precedence; `<=` associates with `<`, `>=` with `>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OpGroup {
    Implies,
    And,
    Or,
    Less,
    Greater,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct OpInfo {
    pub precedence: u8,
    pub assoc: Assoc,
    pub group: Option<OpGroup>,
}

pub(crate) fn op_info(kind: BinOpKind) -> OpInfo {
    match kind {
        BinOpKind::Implies => OpInfo {
            precedence: 0,
            assoc: Assoc::Right,
            group: Some(OpGroup::Implies),
        },
        BinOpKind::And => OpInfo {
            precedence: 0,
            assoc: Assoc::Left,
            group: Some(OpGroup::And),
        },
        BinOpKind::Or => OpInfo {
            precedence: 0,
            assoc: Assoc::Left,
            group: Some(OpGroup::Or),
        },
        BinOpKind::Lt | BinOpKind::Le => OpInfo {
            precedence: 1,
            assoc: Assoc::Left,
            group: Some(OpGroup::Less),
        },
        BinOpKind::Gt | BinOpKind::Ge => OpInfo {
            precedence: 1,
            assoc: Assoc::Left,
            group: Some(OpGroup::Greater),
        },
        BinOpKind::Eq | BinOpKind::Ne => OpInfo {
            precedence: 1,
            assoc: Assoc::None,
            group: None,
        },
        // default bucket: everything else binds tightest, no chaining
        BinOpKind::Add | BinOpKind::Sub => OpInfo {
            precedence: 2,
            assoc: Assoc::None,
            group: None,
        },
    }
}

#[derive(Debug)]
pub(crate) enum OpTree<'a> {
    Leaf(&'a Operand),
    Join(Box<Join<'a>>),
}

#[derive(Debug)]
pub(crate) struct Join<'a> {
    pub op: BinOp,
    pub info: OpInfo,
    pub left: OpTree<'a>,
    pub right: OpTree<'a>,
}

impl OpTree<'_> {
    fn info(&self) -> Option<OpInfo> {
        match self {
            OpTree::Leaf(_) => None,
            OpTree::Join(join) => Some(join.info),
        }
    }
}

/// Rebuild the flat operator list into a tree.
///
/// Operators are folded highest-precedence-first, right to left within a
/// precedence level, so every fold creates the tightest-binding join still
/// available. After each fold the new join's subtrees are verified: an
/// equal-precedence child must share the join's association group, and a
/// non-associative join admits no equal-precedence child at all.
pub(crate) fn build_tree<'a>(expr: &'a Expr) -> Result<OpTree<'a>, SemanticError> {
    if expr.tail.is_empty() {
        return Ok(OpTree::Leaf(&expr.head));
    }

    // (start operand index, subtree); contiguous and ordered
    let mut nodes: Vec<(usize, OpTree<'a>)> = Vec::with_capacity(expr.tail.len() + 1);
    nodes.push((0, OpTree::Leaf(&expr.head)));
    for (i, (_, operand)) in expr.tail.iter().enumerate() {
        nodes.push((i + 1, OpTree::Leaf(operand)));
    }

    let mut order: Vec<usize> = (0..expr.tail.len()).collect();
    order.sort_by(|&a, &b| {
        let pa = op_info(expr.tail[a].0.kind).precedence;
        let pb = op_info(expr.tail[b].0.kind).precedence;
        pb.cmp(&pa).then(b.cmp(&a))
    });

    for &i in &order {
        let op = expr.tail[i].0;
        let info = op_info(op.kind);
        // operator i joins the subtree containing operand i with the one
        // starting at operand i + 1
        let p = nodes
            .iter()
            .rposition(|(start, _)| *start <= i)
            .ok_or_else(|| SemanticError::ice_at("operator tree lost its left operand", op.span))?;
        if p + 1 >= nodes.len() {
            return Err(SemanticError::ice_at(
                "operator tree lost its right operand",
                op.span,
            ));
        }
        let (start, left) = nodes.remove(p);
        let (_, right) = nodes.remove(p);
        verify_fold(info, op, &left)?;
        verify_fold(info, op, &right)?;
        nodes.insert(
            p,
            (
                start,
                OpTree::Join(Box::new(Join {
                    op,
                    info,
                    left,
                    right,
                })),
            ),
        );
    }

    match nodes.pop() {
        Some((_, tree)) if nodes.is_empty() => Ok(tree),
        _ => Err(SemanticError::ice("operator tree did not fold to a single root")),
    }
}

fn verify_fold(info: OpInfo, op: BinOp, child: &OpTree<'_>) -> Result<(), SemanticError> {
    let Some(child_info) = child.info() else {
        return Ok(());
    };
    if child_info.precedence > info.precedence {
        return Ok(());
    }
    if child_info.precedence < info.precedence {
        // folds run highest-precedence-first, so this cannot happen
        return Err(SemanticError::ice_at(
            "operator tree folded out of order",
            op.span,
        ));
    }
    if info.assoc == Assoc::None {
        return Err(SemanticError::OperationRequiresParenthesization {
            reason: "non-associative".to_string(),
            span: op.span,
        });
    }
    if child_info.group != info.group {
        return Err(SemanticError::OperationRequiresParenthesization {
            reason: "unordered".to_string(),
            span: op.span,
        });
    }
    Ok(())
}
