// src/ir/mod.rs
//! Typed, operation-list IR produced by the front-end and consumed by the
//! verifier.
//!
//! Entities are referenced by id: records and interfaces by their canonical
//! `package.Name` string, functions by `package.Entity.member`, variables by
//! dense positional indices into a per-function stack. There are no cyclic
//! references; cross-entity links go through the [`Program`] tables.

mod display;

use rustc_hash::FxHashMap;

use crate::frontend::Span;

/// Identity for a type variable within one type scope.
/// Inside an interface scope, variable 0 is the distinguished `This` type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeVarId(u32);

impl TypeVarId {
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> u32 {
        self.0
    }
}

/// Identity for an IR variable: its positional index into the function's
/// flat, append-only variable stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(u32);

impl VarId {
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> u32 {
        self.0
    }
}

/// Identity for a record: its canonical `package.Name`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(canonical: impl Into<String>) -> Self {
        Self(canonical.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identity for an interface: its canonical `package.Name`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InterfaceId(String);

impl InterfaceId {
    pub fn new(canonical: impl Into<String>) -> Self {
        Self(canonical.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identity for a function: `package.Entity.member`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FunctionId(String);

impl FunctionId {
    pub fn member(record: &RecordId, name: &str) -> Self {
        Self(format!("{}.{}", record.as_str(), name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// An IR type. Equality is structural.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Int,
    Boolean,
    Bytes,
    Compound {
        record: RecordId,
        arguments: Vec<Type>,
    },
    Variable(TypeVarId),
}

impl Type {
    pub fn is_compound(&self) -> bool {
        matches!(self, Type::Compound { .. })
    }

    /// Substitute type variables positionally: variable `i` becomes
    /// `table[i]`. Variables past the end of the table stay abstract.
    pub fn substitute(&self, table: &[Type]) -> Type {
        match self {
            Type::Int | Type::Boolean | Type::Bytes => self.clone(),
            Type::Variable(v) => match table.get(v.index() as usize) {
                Some(actual) => actual.clone(),
                None => self.clone(),
            },
            Type::Compound { record, arguments } => Type::Compound {
                record: record.clone(),
                arguments: arguments.iter().map(|a| a.substitute(table)).collect(),
            },
        }
    }
}

/// A literal constant
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstValue {
    Int(i64),
    Boolean(bool),
    Bytes(Vec<u8>),
}

/// One IR operation. Bodies and contract clauses are `Vec<Op>` blocks;
/// `Branch` nests its arms as sub-blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    /// Declare a variable slot with its type
    Var { dest: VarId, ty: Type },
    /// Load a constant into a variable
    Const { dest: VarId, value: ConstValue },
    /// Copy one variable into another
    Assign { dest: VarId, source: VarId },
    /// Call a user function
    StaticCall {
        function: FunctionId,
        arguments: Vec<VarId>,
        destinations: Vec<VarId>,
    },
    /// Call a built-in primitive
    ForeignCall {
        function: String,
        arguments: Vec<VarId>,
        destinations: Vec<VarId>,
    },
    /// Two-way branch on a boolean variable
    Branch {
        condition: VarId,
        true_ops: Vec<Op>,
        false_ops: Vec<Op>,
    },
    /// Return from the enclosing function
    Return { values: Vec<VarId> },
    /// Control never reaches this point; the verifier must prove it.
    /// `kind` selects the diagnostic when the proof fails.
    Unreachable { kind: String },
}

impl Op {
    /// Whether this operation terminates control flow, making anything
    /// appended after it unreachable.
    pub fn terminates(&self) -> bool {
        match self {
            Op::Return { .. } | Op::Unreachable { .. } => true,
            Op::Branch {
                true_ops,
                false_ops,
                ..
            } => block_terminates(true_ops) && block_terminates(false_ops),
            _ => false,
        }
    }
}

/// Whether the last operation of a block terminates control flow
pub fn block_terminates(ops: &[Op]) -> bool {
    ops.last().is_some_and(Op::terminates)
}

/// A constraint carried on a function or entity scope:
/// `subjects[0] is interface[subjects[1..]]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintParameter {
    pub interface: InterfaceId,
    pub subjects: Vec<Type>,
}

/// A function parameter. The binding location feeds both front-end
/// diagnostics at call sites and the verifier's own reporting.
#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: String,
    pub ty: Type,
    pub loc: Span,
}

/// A contract clause lowered to IR: a block whose `result` variable holds
/// the boolean value of the clause.
#[derive(Debug, Clone)]
pub struct ContractBlock {
    pub ops: Vec<Op>,
    pub result: VarId,
}

#[derive(Debug, Clone, Default)]
pub struct FunctionSignature {
    /// Debug names of the type variables in scope, in declaration order.
    /// For interface members this starts with `This`.
    pub type_parameters: Vec<String>,
    pub constraint_parameters: Vec<ConstraintParameter>,
    pub parameters: Vec<Parameter>,
    pub return_types: Vec<Type>,
    pub preconditions: Vec<ContractBlock>,
    pub postconditions: Vec<ContractBlock>,
}

#[derive(Debug, Clone)]
pub struct Function {
    pub signature: FunctionSignature,
    pub body: Vec<Op>,
}

#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub ty: Type,
    pub loc: Span,
}

#[derive(Debug, Clone)]
pub struct Record {
    pub type_parameters: Vec<String>,
    pub fields: Vec<Field>,
}

impl Record {
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[derive(Debug, Clone)]
pub struct Interface {
    pub type_parameters: Vec<String>,
    pub signatures: FxHashMap<String, FunctionSignature>,
}

/// Semantics annotations on a foreign signature, forwarded to the verifier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ForeignSemantics {
    /// Marks the primitive integer equality predicate
    pub eq: bool,
}

/// Signature of a built-in primitive whose semantics live outside the
/// source language
#[derive(Debug, Clone)]
pub struct ForeignSignature {
    pub name: String,
    pub parameters: Vec<Type>,
    pub return_types: Vec<Type>,
    pub semantics: ForeignSemantics,
}

pub const FOREIGN_INT_EQ: &str = "Int==";
pub const FOREIGN_INT_ADD: &str = "Int+";
pub const FOREIGN_INT_SUB: &str = "Int-";

impl ForeignSignature {
    /// The three built-in integer primitives
    pub fn builtins() -> Vec<ForeignSignature> {
        vec![
            ForeignSignature {
                name: FOREIGN_INT_EQ.to_string(),
                parameters: vec![Type::Int, Type::Int],
                return_types: vec![Type::Boolean],
                semantics: ForeignSemantics { eq: true },
            },
            ForeignSignature {
                name: FOREIGN_INT_ADD.to_string(),
                parameters: vec![Type::Int, Type::Int],
                return_types: vec![Type::Int],
                semantics: ForeignSemantics::default(),
            },
            ForeignSignature {
                name: FOREIGN_INT_SUB.to_string(),
                parameters: vec![Type::Int, Type::Int],
                return_types: vec![Type::Int],
                semantics: ForeignSemantics::default(),
            },
        ]
    }
}

/// Placeholder for verifier-produced vtable factories. The front-end only
/// reserves the table; it never fills it.
#[derive(Debug, Clone)]
pub struct VtableFactory {}

/// The complete IR program handed to the verifier
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub functions: FxHashMap<FunctionId, Function>,
    pub records: FxHashMap<RecordId, Record>,
    pub interfaces: FxHashMap<InterfaceId, Interface>,
    pub foreign: FxHashMap<String, ForeignSignature>,
    pub vtable_factories: FxHashMap<String, VtableFactory>,
}

impl Program {
    /// An empty program with the foreign builtins seeded
    pub fn new() -> Self {
        let mut program = Program::default();
        for sig in ForeignSignature::builtins() {
            program.foreign.insert(sig.name.clone(), sig);
        }
        program
    }
}
