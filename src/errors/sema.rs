// src/errors/sema.rs
//! Semantic analysis errors (E2xxx).

use miette::Diagnostic;
use thiserror::Error;

use crate::frontend::Span;

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum SemanticError {
    #[error("entity '{name}' is defined twice")]
    #[diagnostic(code(E2001))]
    EntityRedefined {
        name: String,
        #[label("redefined here")]
        span: Span,
        #[label("first defined here")]
        original: Span,
    },

    #[error("no package named '{name}'")]
    #[diagnostic(code(E2002))]
    NoSuchPackage {
        name: String,
        #[label("unknown package")]
        span: Span,
    },

    #[error("no entity named '{name}' in {place}")]
    #[diagnostic(code(E2003))]
    NoSuchEntity {
        name: String,
        /// `package 'pkg'` for qualified lookups, `scope` for unqualified
        place: String,
        #[label("unknown entity")]
        span: Span,
    },

    #[error("namespace '{name}' is already bound")]
    #[diagnostic(code(E2004))]
    NamespaceAlreadyDefined {
        name: String,
        #[label("imported again here")]
        span: Span,
        #[label("already bound here")]
        original: Span,
    },

    #[error("'This' is only available inside an interface")]
    #[diagnostic(code(E2005))]
    InvalidThisType {
        #[label("no enclosing interface")]
        span: Span,
    },

    #[error("member '{name}' is defined twice on '{entity}'")]
    #[diagnostic(code(E2006), help("fields and functions share one namespace"))]
    MemberRedefined {
        entity: String,
        name: String,
        #[label("redefined here")]
        span: Span,
        #[label("first defined here")]
        original: Span,
    },

    #[error("type variable '#{name}' is declared twice")]
    #[diagnostic(code(E2007))]
    TypeVariableRedefined {
        name: String,
        #[label("redeclared here")]
        span: Span,
        #[label("first declared here")]
        original: Span,
    },

    #[error("no type variable named '#{name}' in scope")]
    #[diagnostic(code(E2008))]
    NoSuchTypeVariable {
        name: String,
        #[label("unknown type variable")]
        span: Span,
    },

    #[error("'{name}' is an interface and cannot be used as a type")]
    #[diagnostic(code(E2009))]
    NonTypeEntityUsedAsType {
        name: String,
        #[label("interface used as type")]
        span: Span,
    },

    #[error("'{name}' is not an interface and cannot be used as a constraint")]
    #[diagnostic(code(E2010))]
    TypeUsedAsConstraint {
        name: String,
        #[label("expected an interface")]
        span: Span,
    },

    #[error("variable '{name}' is already declared")]
    #[diagnostic(code(E2011))]
    VariableRedefined {
        name: String,
        #[label("redeclared here")]
        span: Span,
        #[label("first declared here")]
        original: Span,
    },

    #[error("variable '{name}' is not defined")]
    #[diagnostic(code(E2012))]
    VariableNotDefined {
        name: String,
        #[label("not found in scope")]
        span: Span,
    },

    #[error("expected a single value in {grouping} position, found {count}")]
    #[diagnostic(code(E2013))]
    MultiExpressionGrouped {
        grouping: String,
        count: usize,
        #[label("produces {count} values")]
        span: Span,
    },

    #[error("expected {expected} values, found {actual}")]
    #[diagnostic(code(E2014))]
    ValueCountMismatch {
        actual: usize,
        expected: usize,
        #[label("{actual} values produced here")]
        span: Span,
        #[label("{expected} expected by this declaration")]
        declared: Span,
    },

    #[error("expected {expected}, found {found}")]
    #[diagnostic(code(E2015))]
    TypeMismatch {
        expected: String,
        found: String,
        /// Position within a flattened value tuple, when it had more than
        /// one element
        value_index: Option<usize>,
        #[label("type mismatch")]
        span: Span,
        /// Location the expectation came from (declaration or parameter)
        declared: Option<Span>,
    },

    #[error("field access on non-compound value of type {found}")]
    #[diagnostic(code(E2016))]
    FieldAccessOnNonCompound {
        found: String,
        #[label("not a record value")]
        span: Span,
    },

    #[error("method access on non-compound value of type {found}")]
    #[diagnostic(code(E2017))]
    MethodAccessOnNonCompound {
        found: String,
        #[label("not a record value")]
        span: Span,
    },

    #[error("{reason} condition must be Boolean, found {found}")]
    #[diagnostic(code(E2018))]
    BooleanTypeExpected {
        reason: String,
        found: String,
        #[label("expected Boolean")]
        span: Span,
    },

    #[error("type {ty} does not provide operator '{operator}'")]
    #[diagnostic(code(E2019))]
    TypeDoesNotProvideOperator {
        ty: String,
        operator: String,
        #[label("no such operator")]
        span: Span,
    },

    #[error("operator '{operator}' expects {expected} on the right, found {found}")]
    #[diagnostic(code(E2020))]
    OperatorTypeMismatch {
        operator: String,
        expected: String,
        found: String,
        #[label("wrong operand type")]
        span: Span,
    },

    #[error("cannot call a function on non-compound type {found}")]
    #[diagnostic(code(E2021))]
    CallOnNonCompound {
        found: String,
        #[label("not a record type")]
        span: Span,
    },

    #[error("record '{record}' has no function named '{name}'")]
    #[diagnostic(code(E2022))]
    NoSuchFn {
        record: String,
        name: String,
        #[label("unknown function")]
        span: Span,
    },

    #[error("operation requires parenthesization: {reason}")]
    #[diagnostic(
        code(E2023),
        help("add parentheses to make the grouping explicit")
    )]
    OperationRequiresParenthesization {
        /// `"unordered"` or `"non-associative"`
        reason: String,
        #[label("ambiguous grouping")]
        span: Span,
    },

    #[error("precondition of '{function}' is recursive")]
    #[diagnostic(code(E2024))]
    RecursivePrecondition {
        function: String,
        #[label("recursive precondition")]
        span: Span,
    },

    #[error("'return' expressions are only available inside ensures clauses")]
    #[diagnostic(code(E2025))]
    ReturnExpressionUsedOutsideEnsures {
        #[label("not inside an ensures clause")]
        span: Span,
    },

    #[error("type arguments do not satisfy constraint {constraint}")]
    #[diagnostic(code(E2026))]
    TypesDontSatisfyConstraint {
        /// Rendered as `Subject is pkg.Interface[args]`
        constraint: String,
        #[label("constraint needed here")]
        span: Span,
        #[label("constraint declared here")]
        declared: Span,
    },

    #[error("record literal of non-compound type {found}")]
    #[diagnostic(code(E2027))]
    NonCompoundInRecordLiteral {
        found: String,
        #[label("not a record type")]
        span: Span,
    },

    #[error("field '{name}' is repeated in record literal")]
    #[diagnostic(code(E2028))]
    FieldRepeatedInRecordLiteral {
        name: String,
        #[label("repeated here")]
        span: Span,
        #[label("first initialized here")]
        original: Span,
    },

    #[error("record '{record}' has no field named '{name}'")]
    #[diagnostic(code(E2029))]
    NoSuchField {
        record: String,
        name: String,
        #[label("unknown field")]
        span: Span,
    },

    #[error("field '{name}' of record '{record}' is not initialized")]
    #[diagnostic(code(E2030))]
    UninitializedField {
        record: String,
        name: String,
        #[label("literal is missing a field")]
        span: Span,
    },

    #[error("type {ty} expects {expected} type arguments, found {actual}")]
    #[diagnostic(code(E2031))]
    TypeParameterCountMismatch {
        ty: String,
        expected: usize,
        actual: usize,
        #[label("wrong number of type arguments")]
        span: Span,
    },

    /// Internal consistency fault. Unreachable when the elaborator's
    /// invariants hold.
    #[error("ICE: {message}")]
    #[diagnostic(code(E9999))]
    Internal {
        message: String,
        /// Location being elaborated when the fault was detected, if any
        span: Option<Span>,
    },
}

impl SemanticError {
    /// Internal consistency fault with no useful source location.
    pub(crate) fn ice(message: impl Into<String>) -> Self {
        SemanticError::Internal {
            message: message.into(),
            span: None,
        }
    }

    /// Internal consistency fault anchored at a source location.
    pub(crate) fn ice_at(message: impl Into<String>, span: Span) -> Self {
        SemanticError::Internal {
            message: message.into(),
            span: Some(span),
        }
    }
}
