// src/frontend/ast.rs
//! Source AST as produced by the parser.
//!
//! These shapes are the input contract of the front-end: the parser owns
//! tokenization and grammar, and hands the elaborator one [`Source`] per
//! file. Expressions arrive as a head operand plus a flat left-to-right
//! operator list; the precedence tree is rebuilt during checking.

use crate::frontend::token::FileId;
use crate::frontend::{Ident, Span};

/// One parsed source file
#[derive(Debug, Clone)]
pub struct Source {
    pub file: FileId,
    pub package: Ident,
    pub imports: Vec<Import>,
    pub definitions: Vec<Definition>,
}

/// An import clause
#[derive(Debug, Clone)]
pub enum Import {
    /// `import pkg;` — binds the package name as a qualifier
    Package { package: Ident },
    /// `import pkg.Name;` — binds the entity's short name
    Entity { package: Ident, name: Ident },
}

/// Top-level definitions
#[derive(Debug, Clone)]
pub enum Definition {
    Record(RecordDef),
    Interface(InterfaceDef),
}

impl Definition {
    pub fn name(&self) -> &Ident {
        match self {
            Definition::Record(r) => &r.name,
            Definition::Interface(i) => &i.name,
        }
    }
}

/// Type-parameter list with constraints: `[#T, #U | #T is Ordered[#U]]`
#[derive(Debug, Clone, Default)]
pub struct TypeParams {
    pub params: Vec<Ident>,
    pub constraints: Vec<ConstraintExpr>,
}

/// A constraint clause: `#T is Interface[args]`
#[derive(Debug, Clone)]
pub struct ConstraintExpr {
    pub subject: TypeExpr,
    pub interface: TypeApply,
    pub span: Span,
}

/// A possibly-qualified type application: `pkg.Name[args]` / `Name[args]`
#[derive(Debug, Clone)]
pub struct TypeApply {
    pub qualifier: Option<Ident>,
    pub name: Ident,
    pub arguments: Vec<TypeExpr>,
    pub span: Span,
}

/// Record declaration
#[derive(Debug, Clone)]
pub struct RecordDef {
    pub name: Ident,
    pub type_params: TypeParams,
    /// Header `is Interface[args]` clauses
    pub implements: Vec<TypeApply>,
    pub fields: Vec<FieldDef>,
    pub functions: Vec<FnDef>,
    pub span: Span,
}

/// Interface declaration
#[derive(Debug, Clone)]
pub struct InterfaceDef {
    pub name: Ident,
    pub type_params: TypeParams,
    pub functions: Vec<FnDef>,
    pub span: Span,
}

/// Field definition in a record
#[derive(Debug, Clone)]
pub struct FieldDef {
    pub name: Ident,
    pub ty: TypeExpr,
    pub span: Span,
}

/// Function definition or signature.
///
/// Interface members carry no body; record functions do. Contract clauses
/// are plain expressions lowered to boolean IR blocks during checking.
#[derive(Debug, Clone)]
pub struct FnDef {
    pub proof: bool,
    pub name: Ident,
    pub type_params: TypeParams,
    pub params: Vec<Param>,
    pub returns: Vec<TypeExpr>,
    pub requires: Vec<Expr>,
    pub ensures: Vec<Expr>,
    pub body: Option<Block>,
    pub span: Span,
}

/// Function parameter
#[derive(Debug, Clone)]
pub struct Param {
    pub name: Ident,
    pub ty: TypeExpr,
    pub span: Span,
}

pub type Block = Vec<Statement>;

/// Type expression
#[derive(Debug, Clone)]
pub enum TypeExpr {
    /// The `This` keyword (implementing type inside an interface)
    This(Span),
    /// The `Int` keyword
    Int(Span),
    /// The `Boolean` keyword
    Boolean(Span),
    /// The `String` keyword (lowered to the `Bytes` primitive)
    Str(Span),
    /// A type variable: `#T`
    Variable(Ident),
    /// A named entity application: `pkg.Name[args]` / `Name[args]`
    Named(TypeApply),
}

impl TypeExpr {
    pub fn span(&self) -> Span {
        match self {
            TypeExpr::This(s)
            | TypeExpr::Int(s)
            | TypeExpr::Boolean(s)
            | TypeExpr::Str(s) => *s,
            TypeExpr::Variable(id) => id.span,
            TypeExpr::Named(apply) => apply.span,
        }
    }
}

/// Statements
#[derive(Debug, Clone)]
pub enum Statement {
    Var(VarStmt),
    Return(ReturnStmt),
    If(IfStmt),
    /// The `unreachable;` pseudo-statement
    Unreachable(Span),
}

/// `var v1: T1, v2: T2 = e1, e2;`
#[derive(Debug, Clone)]
pub struct VarStmt {
    pub declarations: Vec<(Ident, TypeExpr)>,
    pub values: Vec<Expr>,
    pub span: Span,
}

/// `return e1, e2;`
#[derive(Debug, Clone)]
pub struct ReturnStmt {
    pub values: Vec<Expr>,
    pub span: Span,
}

/// `if c1 { } else if c2 { } else { }` — one arm per condition
#[derive(Debug, Clone)]
pub struct IfStmt {
    pub arms: Vec<IfArm>,
    pub else_block: Option<Block>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct IfArm {
    pub condition: Expr,
    pub block: Block,
}

/// Expression as parsed: a head operand followed by a flat left-to-right
/// list of operator/operand pairs. Associativity is resolved later.
#[derive(Debug, Clone)]
pub struct Expr {
    pub head: Operand,
    pub tail: Vec<(BinOp, Operand)>,
}

impl Expr {
    /// An expression that is just one operand
    pub fn single(head: Operand) -> Self {
        Self {
            head,
            tail: Vec::new(),
        }
    }

    pub fn span(&self) -> Span {
        match self.tail.last() {
            Some((_, last)) => self.head.span().merge(last.span()),
            None => self.head.span(),
        }
    }
}

/// A binary operator token
#[derive(Debug, Clone, Copy)]
pub struct BinOp {
    pub kind: BinOpKind,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOpKind {
    And,
    Or,
    Implies,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
}

impl BinOpKind {
    /// The operator's surface syntax, used in diagnostics
    pub fn symbol(self) -> &'static str {
        match self {
            BinOpKind::And => "and",
            BinOpKind::Or => "or",
            BinOpKind::Implies => "implies",
            BinOpKind::Eq => "==",
            BinOpKind::Ne => "!=",
            BinOpKind::Lt => "<",
            BinOpKind::Le => "<=",
            BinOpKind::Gt => ">",
            BinOpKind::Ge => ">=",
            BinOpKind::Add => "+",
            BinOpKind::Sub => "-",
        }
    }
}

/// An operand: an atom plus zero or more `.field` / `.method(args)` accesses
#[derive(Debug, Clone)]
pub struct Operand {
    pub atom: Atom,
    pub accesses: Vec<Access>,
}

impl Operand {
    pub fn plain(atom: Atom) -> Self {
        Self {
            atom,
            accesses: Vec::new(),
        }
    }

    pub fn span(&self) -> Span {
        match self.accesses.last() {
            Some(last) => self.atom.span().merge(last.span()),
            None => self.atom.span(),
        }
    }
}

/// A member access suffix on an operand
#[derive(Debug, Clone)]
pub enum Access {
    Field { name: Ident },
    Method { name: Ident, arguments: Vec<Expr>, span: Span },
}

impl Access {
    pub fn span(&self) -> Span {
        match self {
            Access::Field { name } => name.span,
            Access::Method { span, .. } => *span,
        }
    }
}

/// Expression atoms
#[derive(Debug, Clone)]
pub enum Atom {
    Identifier(Ident),
    /// Parenthesized sub-expression
    Group { expr: Box<Expr>, span: Span },
    IntLiteral { value: i64, span: Span },
    StrLiteral { value: String, span: Span },
    BoolLiteral { value: bool, span: Span },
    /// The `return` keyword, legal only inside `ensures` clauses
    Return(Span),
    /// Explicit static call: `Type.method(args)`
    StaticCall(StaticCallExpr),
    /// Record literal: `Type { field = expr, ... }`
    RecordLiteral(RecordLiteralExpr),
}

impl Atom {
    pub fn span(&self) -> Span {
        match self {
            Atom::Identifier(id) => id.span,
            Atom::Group { span, .. }
            | Atom::IntLiteral { span, .. }
            | Atom::StrLiteral { span, .. }
            | Atom::BoolLiteral { span, .. }
            | Atom::Return(span) => *span,
            Atom::StaticCall(call) => call.span,
            Atom::RecordLiteral(lit) => lit.span,
        }
    }
}

/// `Type.method(args)`
#[derive(Debug, Clone)]
pub struct StaticCallExpr {
    pub base: TypeExpr,
    pub method: Ident,
    pub arguments: Vec<Expr>,
    pub span: Span,
}

/// `Type { field = expr, ... }`
#[derive(Debug, Clone)]
pub struct RecordLiteralExpr {
    pub base: TypeExpr,
    pub fields: Vec<FieldInit>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct FieldInit {
    pub name: Ident,
    pub value: Expr,
    pub span: Span,
}
