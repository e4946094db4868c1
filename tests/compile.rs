// tests/compile.rs
//! End-to-end tests for `compile_sources` over hand-built ASTs (the parser
//! is an external collaborator, so sources are constructed directly).

use tenet::frontend::*;
use tenet::{SemanticError, compile_sources, ir};

// ---------------------------------------------------------------------
// AST builders
// ---------------------------------------------------------------------

fn id(name: &str) -> Ident {
    Ident::new(name, Span::default())
}

fn id_at(name: &str, offset: u32) -> Ident {
    Ident::new(name, Span::new(FileId(0), offset, name.len() as u32))
}

fn source(file: u32, package: &str, definitions: Vec<Definition>) -> Source {
    Source {
        file: FileId(file),
        package: id(package),
        imports: vec![],
        definitions,
    }
}

fn record(name: Ident) -> RecordDef {
    RecordDef {
        name,
        type_params: TypeParams::default(),
        implements: vec![],
        fields: vec![],
        functions: vec![],
        span: Span::default(),
    }
}

fn interface(name: Ident) -> InterfaceDef {
    InterfaceDef {
        name,
        type_params: TypeParams::default(),
        functions: vec![],
        span: Span::default(),
    }
}

fn fn_def(name: &str, params: Vec<Param>, returns: Vec<TypeExpr>, body: Vec<Statement>) -> FnDef {
    FnDef {
        proof: false,
        name: id(name),
        type_params: TypeParams::default(),
        params,
        returns,
        requires: vec![],
        ensures: vec![],
        body: Some(body),
        span: Span::default(),
    }
}

fn param(name: &str, ty: TypeExpr) -> Param {
    Param {
        name: id(name),
        ty,
        span: Span::default(),
    }
}

fn int_ty() -> TypeExpr {
    TypeExpr::Int(Span::default())
}

fn boolean_ty() -> TypeExpr {
    TypeExpr::Boolean(Span::default())
}

fn named(name: &str) -> TypeExpr {
    named_args(name, vec![])
}

fn named_args(name: &str, arguments: Vec<TypeExpr>) -> TypeExpr {
    TypeExpr::Named(TypeApply {
        qualifier: None,
        name: id(name),
        arguments,
        span: Span::default(),
    })
}

fn apply(name: &str) -> TypeApply {
    TypeApply {
        qualifier: None,
        name: id(name),
        arguments: vec![],
        span: Span::default(),
    }
}

fn tyvar(name: &str) -> TypeExpr {
    TypeExpr::Variable(id(name))
}

fn atom_expr(atom: Atom) -> Expr {
    Expr::single(Operand::plain(atom))
}

fn bin_expr(head: Atom, tail: Vec<(BinOpKind, Atom)>) -> Expr {
    Expr {
        head: Operand::plain(head),
        tail: tail
            .into_iter()
            .map(|(kind, atom)| {
                (
                    BinOp {
                        kind,
                        span: Span::default(),
                    },
                    Operand::plain(atom),
                )
            })
            .collect(),
    }
}

fn int_atom(value: i64) -> Atom {
    Atom::IntLiteral {
        value,
        span: Span::default(),
    }
}

fn var_atom(name: &str) -> Atom {
    Atom::Identifier(id(name))
}

fn int_lit(value: i64) -> Expr {
    atom_expr(int_atom(value))
}

fn bool_lit(value: bool) -> Expr {
    atom_expr(Atom::BoolLiteral {
        value,
        span: Span::default(),
    })
}

fn var_ref(name: &str) -> Expr {
    atom_expr(var_atom(name))
}

fn static_call(base: TypeExpr, method: &str, arguments: Vec<Expr>) -> Expr {
    atom_expr(Atom::StaticCall(StaticCallExpr {
        base,
        method: id(method),
        arguments,
        span: Span::default(),
    }))
}

fn var_stmt(declarations: Vec<(&str, TypeExpr)>, values: Vec<Expr>) -> Statement {
    Statement::Var(VarStmt {
        declarations: declarations
            .into_iter()
            .map(|(name, ty)| (id(name), ty))
            .collect(),
        values,
        span: Span::default(),
    })
}

fn return_stmt(values: Vec<Expr>) -> Statement {
    Statement::Return(ReturnStmt {
        values,
        span: Span::default(),
    })
}

fn if_stmt(condition: Expr, block: Block, else_block: Option<Block>) -> Statement {
    Statement::If(IfStmt {
        arms: vec![IfArm { condition, block }],
        else_block,
        span: Span::default(),
    })
}

fn constraint(subject: TypeExpr, interface_name: &str) -> ConstraintExpr {
    ConstraintExpr {
        subject,
        interface: apply(interface_name),
        span: Span::default(),
    }
}

/// `record A[#T | #T is Good]`
fn constrained_record(name: &str, var: &str, interface_name: &str) -> RecordDef {
    RecordDef {
        type_params: TypeParams {
            params: vec![id(var)],
            constraints: vec![constraint(tyvar(var), interface_name)],
        },
        ..record(id(name))
    }
}

// ---------------------------------------------------------------------
// Entity collection
// ---------------------------------------------------------------------

#[test]
fn entity_redefined_in_one_file() {
    let sources = [source(
        0,
        "example",
        vec![
            Definition::Record(record(id_at("A", 24))),
            Definition::Record(record(id_at("A", 37))),
        ],
    )];
    match compile_sources(&sources).unwrap_err() {
        SemanticError::EntityRedefined {
            name,
            span,
            original,
        } => {
            assert_eq!(name, "example.A");
            assert_eq!(span.offset, 37);
            assert_eq!(original.offset, 24);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn entity_redefined_across_files() {
    let sources = [
        source(0, "example", vec![Definition::Record(record(id("A")))]),
        source(1, "example", vec![Definition::Record(record(id("A")))]),
    ];
    assert!(matches!(
        compile_sources(&sources).unwrap_err(),
        SemanticError::EntityRedefined { .. }
    ));
}

#[test]
fn same_short_name_in_different_packages_is_fine() {
    let sources = [
        source(0, "one", vec![Definition::Record(record(id("A")))]),
        source(1, "two", vec![Definition::Record(record(id("A")))]),
    ];
    let program = compile_sources(&sources).unwrap();
    assert!(program.records.contains_key(&ir::RecordId::new("one.A")));
    assert!(program.records.contains_key(&ir::RecordId::new("two.A")));
}

// ---------------------------------------------------------------------
// Imports
// ---------------------------------------------------------------------

#[test]
fn imported_entity_resolves_as_field_type() {
    let lib = source(0, "lib", vec![Definition::Record(record(id("Thing")))]);
    let mut app = source(
        1,
        "app",
        vec![Definition::Record(RecordDef {
            fields: vec![FieldDef {
                name: id("t"),
                ty: named("Thing"),
                span: Span::default(),
            }],
            ..record(id("Holder"))
        })],
    );
    app.imports.push(Import::Entity {
        package: id("lib"),
        name: id("Thing"),
    });
    let program = compile_sources(&[lib, app]).unwrap();
    let holder = &program.records[&ir::RecordId::new("app.Holder")];
    assert_eq!(
        holder.fields[0].ty,
        ir::Type::Compound {
            record: ir::RecordId::new("lib.Thing"),
            arguments: vec![],
        }
    );
}

#[test]
fn package_import_resolves_qualified_names_only() {
    let lib = source(0, "lib", vec![Definition::Record(record(id("Thing")))]);
    let mut app = source(
        1,
        "app",
        vec![Definition::Record(RecordDef {
            fields: vec![FieldDef {
                name: id("t"),
                ty: TypeExpr::Named(TypeApply {
                    qualifier: Some(id("lib")),
                    name: id("Thing"),
                    arguments: vec![],
                    span: Span::default(),
                }),
                span: Span::default(),
            }],
            ..record(id("Holder"))
        })],
    );
    app.imports.push(Import::Package { package: id("lib") });
    let program = compile_sources(&[lib, app]).unwrap();
    assert!(program.records.contains_key(&ir::RecordId::new("app.Holder")));
}

#[test]
fn unqualified_use_of_namespace_import_fails() {
    let lib = source(0, "lib", vec![Definition::Record(record(id("Thing")))]);
    let mut app = source(
        1,
        "app",
        vec![Definition::Record(RecordDef {
            fields: vec![FieldDef {
                name: id("t"),
                ty: named("Thing"),
                span: Span::default(),
            }],
            ..record(id("Holder"))
        })],
    );
    app.imports.push(Import::Package { package: id("lib") });
    assert!(matches!(
        compile_sources(&[lib, app]).unwrap_err(),
        SemanticError::NoSuchEntity { .. }
    ));
}

// ---------------------------------------------------------------------
// Statements and types
// ---------------------------------------------------------------------

#[test]
fn var_type_mismatch_is_reported() {
    // var a: Int = 1; var b: A = a;
    let body = vec![
        var_stmt(vec![("a", int_ty())], vec![int_lit(1)]),
        var_stmt(vec![("b", named("A"))], vec![var_ref("a")]),
    ];
    let sources = [source(
        0,
        "example",
        vec![Definition::Record(RecordDef {
            functions: vec![fn_def("f", vec![], vec![], body)],
            ..record(id("A"))
        })],
    )];
    match compile_sources(&sources).unwrap_err() {
        SemanticError::TypeMismatch {
            expected, found, ..
        } => {
            assert_eq!(expected, "example.A");
            assert_eq!(found, "Int");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn return_fan_out_mismatch_is_reported() {
    // fn f(): Int { return 1, 1; }
    let body = vec![return_stmt(vec![int_lit(1), int_lit(1)])];
    let sources = [source(
        0,
        "example",
        vec![Definition::Record(RecordDef {
            functions: vec![fn_def("f", vec![], vec![int_ty()], body)],
            ..record(id("A"))
        })],
    )];
    match compile_sources(&sources).unwrap_err() {
        SemanticError::ValueCountMismatch {
            actual, expected, ..
        } => {
            assert_eq!(actual, 2);
            assert_eq!(expected, 1);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn var_fan_out_flattens_call_tuples() {
    // fn two(): Int, Int { return 1, 2; }
    // fn g(): Int { var a: Int, b: Int = Util.two(); return a; }
    let two = fn_def(
        "two",
        vec![],
        vec![int_ty(), int_ty()],
        vec![return_stmt(vec![int_lit(1), int_lit(2)])],
    );
    let g = fn_def(
        "g",
        vec![],
        vec![int_ty()],
        vec![
            var_stmt(
                vec![("a", int_ty()), ("b", int_ty())],
                vec![static_call(named("Util"), "two", vec![])],
            ),
            return_stmt(vec![var_ref("a")]),
        ],
    );
    let sources = [source(
        0,
        "example",
        vec![Definition::Record(RecordDef {
            functions: vec![two, g],
            ..record(id("Util"))
        })],
    )];
    let program = compile_sources(&sources).unwrap();
    assert!(
        program
            .functions
            .contains_key(&ir::FunctionId::member(&ir::RecordId::new("example.Util"), "g"))
    );
}

#[test]
fn variable_redefinition_is_reported() {
    let body = vec![
        var_stmt(vec![("a", int_ty())], vec![int_lit(1)]),
        var_stmt(vec![("a", int_ty())], vec![int_lit(2)]),
    ];
    let sources = [source(
        0,
        "example",
        vec![Definition::Record(RecordDef {
            functions: vec![fn_def("f", vec![], vec![], body)],
            ..record(id("A"))
        })],
    )];
    assert!(matches!(
        compile_sources(&sources).unwrap_err(),
        SemanticError::VariableRedefined { .. }
    ));
}

#[test]
fn undefined_variable_is_reported() {
    let body = vec![return_stmt(vec![var_ref("ghost")])];
    let sources = [source(
        0,
        "example",
        vec![Definition::Record(RecordDef {
            functions: vec![fn_def("f", vec![], vec![int_ty()], body)],
            ..record(id("A"))
        })],
    )];
    assert!(matches!(
        compile_sources(&sources).unwrap_err(),
        SemanticError::VariableNotDefined { .. }
    ));
}

#[test]
fn if_condition_must_be_boolean() {
    let body = vec![
        if_stmt(int_lit(1), vec![return_stmt(vec![int_lit(0)])], None),
        return_stmt(vec![int_lit(1)]),
    ];
    let sources = [source(
        0,
        "example",
        vec![Definition::Record(RecordDef {
            functions: vec![fn_def("f", vec![], vec![int_ty()], body)],
            ..record(id("A"))
        })],
    )];
    match compile_sources(&sources).unwrap_err() {
        SemanticError::BooleanTypeExpected { reason, found, .. } => {
            assert_eq!(reason, "if");
            assert_eq!(found, "Int");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

// ---------------------------------------------------------------------
// Contracts
// ---------------------------------------------------------------------

#[test]
fn return_expression_outside_ensures_is_rejected() {
    // fn f(): Boolean requires return { return true; }
    let mut f = fn_def(
        "f",
        vec![],
        vec![boolean_ty()],
        vec![return_stmt(vec![bool_lit(true)])],
    );
    f.requires.push(atom_expr(Atom::Return(Span::default())));
    let sources = [source(
        0,
        "example",
        vec![Definition::Record(RecordDef {
            functions: vec![f],
            ..record(id("A"))
        })],
    )];
    assert!(matches!(
        compile_sources(&sources).unwrap_err(),
        SemanticError::ReturnExpressionUsedOutsideEnsures { .. }
    ));
}

#[test]
fn non_boolean_contract_is_rejected() {
    let mut f = fn_def("f", vec![], vec![], vec![]);
    f.requires.push(int_lit(7));
    let sources = [source(
        0,
        "example",
        vec![Definition::Record(RecordDef {
            functions: vec![f],
            ..record(id("A"))
        })],
    )];
    match compile_sources(&sources).unwrap_err() {
        SemanticError::BooleanTypeExpected { reason, .. } => assert_eq!(reason, "contract"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn ensures_can_mention_the_return_tuple() {
    // fn f(): Int ensures return == 0 { return 0; }
    let mut f = fn_def(
        "f",
        vec![],
        vec![int_ty()],
        vec![return_stmt(vec![int_lit(0)])],
    );
    f.ensures.push(bin_expr(
        Atom::Return(Span::default()),
        vec![(BinOpKind::Eq, int_atom(0))],
    ));
    let sources = [source(
        0,
        "example",
        vec![Definition::Record(RecordDef {
            functions: vec![f],
            ..record(id("A"))
        })],
    )];
    let program = compile_sources(&sources).unwrap();
    let f = &program.functions
        [&ir::FunctionId::member(&ir::RecordId::new("example.A"), "f")];
    assert_eq!(f.signature.postconditions.len(), 1);
    let post = &f.signature.postconditions[0];
    // the synthetic return tuple is pre-declared, then == lowers to the
    // integer equality foreign
    assert!(matches!(post.ops.first(), Some(ir::Op::Var { ty: ir::Type::Int, .. })));
    assert!(post.ops.iter().any(|op| matches!(
        op,
        ir::Op::ForeignCall { function, .. } if function == ir::FOREIGN_INT_EQ
    )));
}

#[test]
fn precondition_compiles_to_a_boolean_block() {
    // fn f(x: Int): Int requires x == 0 { return x; }
    let mut f = fn_def(
        "f",
        vec![param("x", int_ty())],
        vec![int_ty()],
        vec![return_stmt(vec![var_ref("x")])],
    );
    f.requires
        .push(bin_expr(var_atom("x"), vec![(BinOpKind::Eq, int_atom(0))]));
    let sources = [source(
        0,
        "example",
        vec![Definition::Record(RecordDef {
            functions: vec![f],
            ..record(id("A"))
        })],
    )];
    let program = compile_sources(&sources).unwrap();
    let f = &program.functions
        [&ir::FunctionId::member(&ir::RecordId::new("example.A"), "f")];
    assert_eq!(f.signature.preconditions.len(), 1);
    let pre = &f.signature.preconditions[0];
    match pre.ops.last() {
        Some(ir::Op::ForeignCall { destinations, .. }) => {
            assert_eq!(destinations, &[pre.result]);
        }
        other => panic!("unexpected final op: {other:?}"),
    }
}

// ---------------------------------------------------------------------
// Operators
// ---------------------------------------------------------------------

#[test]
fn integer_equality_lowers_to_the_eq_foreign() {
    let body = vec![return_stmt(vec![bin_expr(
        int_atom(1),
        vec![(BinOpKind::Eq, int_atom(1))],
    )])];
    let sources = [source(
        0,
        "example",
        vec![Definition::Record(RecordDef {
            functions: vec![fn_def("f", vec![], vec![boolean_ty()], body)],
            ..record(id("A"))
        })],
    )];
    let program = compile_sources(&sources).unwrap();
    let f = &program.functions
        [&ir::FunctionId::member(&ir::RecordId::new("example.A"), "f")];
    assert!(f.body.iter().any(|op| matches!(
        op,
        ir::Op::ForeignCall { function, .. } if function == ir::FOREIGN_INT_EQ
    )));
}

#[test]
fn booleans_do_not_provide_equality() {
    let body = vec![return_stmt(vec![bin_expr(
        Atom::BoolLiteral {
            value: true,
            span: Span::default(),
        },
        vec![(
            BinOpKind::Eq,
            Atom::BoolLiteral {
                value: false,
                span: Span::default(),
            },
        )],
    )])];
    let sources = [source(
        0,
        "example",
        vec![Definition::Record(RecordDef {
            functions: vec![fn_def("f", vec![], vec![boolean_ty()], body)],
            ..record(id("A"))
        })],
    )];
    match compile_sources(&sources).unwrap_err() {
        SemanticError::TypeDoesNotProvideOperator { ty, operator, .. } => {
            assert_eq!(ty, "Boolean");
            assert_eq!(operator, "==");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn mismatched_operand_type_is_reported() {
    let body = vec![return_stmt(vec![bin_expr(
        int_atom(1),
        vec![(
            BinOpKind::Add,
            Atom::BoolLiteral {
                value: true,
                span: Span::default(),
            },
        )],
    )])];
    let sources = [source(
        0,
        "example",
        vec![Definition::Record(RecordDef {
            functions: vec![fn_def("f", vec![], vec![int_ty()], body)],
            ..record(id("A"))
        })],
    )];
    assert!(matches!(
        compile_sources(&sources).unwrap_err(),
        SemanticError::OperatorTypeMismatch { .. }
    ));
}

#[test]
fn chained_equality_requires_parentheses() {
    let body = vec![return_stmt(vec![bin_expr(
        int_atom(1),
        vec![(BinOpKind::Eq, int_atom(2)), (BinOpKind::Eq, int_atom(3))],
    )])];
    let sources = [source(
        0,
        "example",
        vec![Definition::Record(RecordDef {
            functions: vec![fn_def("f", vec![], vec![boolean_ty()], body)],
            ..record(id("A"))
        })],
    )];
    match compile_sources(&sources).unwrap_err() {
        SemanticError::OperationRequiresParenthesization { reason, .. } => {
            assert_eq!(reason, "non-associative");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn or_lowers_to_a_short_circuit_branch() {
    // fn f(x: Boolean, y: Boolean): Boolean { return x or y; }
    let body = vec![return_stmt(vec![bin_expr(
        var_atom("x"),
        vec![(BinOpKind::Or, var_atom("y"))],
    )])];
    let sources = [source(
        0,
        "example",
        vec![Definition::Record(RecordDef {
            functions: vec![fn_def(
                "f",
                vec![param("x", boolean_ty()), param("y", boolean_ty())],
                vec![boolean_ty()],
                body,
            )],
            ..record(id("A"))
        })],
    )];
    let program = compile_sources(&sources).unwrap();
    let f = &program.functions
        [&ir::FunctionId::member(&ir::RecordId::new("example.A"), "f")];
    // params are vars 0 and 1, the result temporary is 2
    let result = ir::VarId::new(2);
    assert_eq!(
        f.body,
        vec![
            ir::Op::Var {
                dest: result,
                ty: ir::Type::Boolean,
            },
            ir::Op::Branch {
                condition: ir::VarId::new(0),
                true_ops: vec![ir::Op::Assign {
                    dest: result,
                    source: ir::VarId::new(0),
                }],
                false_ops: vec![ir::Op::Assign {
                    dest: result,
                    source: ir::VarId::new(1),
                }],
            },
            ir::Op::Return {
                values: vec![result],
            },
        ]
    );
}

#[test]
fn implies_is_vacuously_true_on_a_false_premise() {
    let body = vec![return_stmt(vec![bin_expr(
        var_atom("x"),
        vec![(BinOpKind::Implies, var_atom("y"))],
    )])];
    let sources = [source(
        0,
        "example",
        vec![Definition::Record(RecordDef {
            functions: vec![fn_def(
                "f",
                vec![param("x", boolean_ty()), param("y", boolean_ty())],
                vec![boolean_ty()],
                body,
            )],
            ..record(id("A"))
        })],
    )];
    let program = compile_sources(&sources).unwrap();
    let f = &program.functions
        [&ir::FunctionId::member(&ir::RecordId::new("example.A"), "f")];
    let Some(ir::Op::Branch {
        true_ops,
        false_ops,
        ..
    }) = f.body.get(1)
    else {
        panic!("expected a branch, got {:?}", f.body.get(1));
    };
    assert!(matches!(
        false_ops.as_slice(),
        [ir::Op::Const {
            value: ir::ConstValue::Boolean(true),
            ..
        }]
    ));
    assert!(matches!(true_ops.last(), Some(ir::Op::Assign { .. })));
}

// ---------------------------------------------------------------------
// Static calls
// ---------------------------------------------------------------------

#[test]
fn generic_call_substitutes_base_type_arguments() {
    // record Box[#T] { fn get(x: #T): #T { return x; } }
    // record Main { fn f(): Int { var r: Int = Box[Int].get(5); return r; } }
    let boxdef = RecordDef {
        type_params: TypeParams {
            params: vec![id("T")],
            constraints: vec![],
        },
        functions: vec![fn_def(
            "get",
            vec![param("x", tyvar("T"))],
            vec![tyvar("T")],
            vec![return_stmt(vec![var_ref("x")])],
        )],
        ..record(id("Box"))
    };
    let main = RecordDef {
        functions: vec![fn_def(
            "f",
            vec![],
            vec![int_ty()],
            vec![
                var_stmt(
                    vec![("r", int_ty())],
                    vec![static_call(
                        named_args("Box", vec![int_ty()]),
                        "get",
                        vec![int_lit(5)],
                    )],
                ),
                return_stmt(vec![var_ref("r")]),
            ],
        )],
        ..record(id("Main"))
    };
    let sources = [source(
        0,
        "example",
        vec![Definition::Record(boxdef), Definition::Record(main)],
    )];
    let program = compile_sources(&sources).unwrap();
    let get = &program.functions
        [&ir::FunctionId::member(&ir::RecordId::new("example.Box"), "get")];
    assert_eq!(get.signature.type_parameters, ["T"]);
}

#[test]
fn call_argument_mismatch_cites_the_tuple_index() {
    // Box[Int].get(true)
    let boxdef = RecordDef {
        type_params: TypeParams {
            params: vec![id("T")],
            constraints: vec![],
        },
        functions: vec![fn_def(
            "get",
            vec![param("x", tyvar("T"))],
            vec![tyvar("T")],
            vec![return_stmt(vec![var_ref("x")])],
        )],
        ..record(id("Box"))
    };
    let main = RecordDef {
        functions: vec![fn_def(
            "f",
            vec![],
            vec![],
            vec![var_stmt(
                vec![("r", int_ty())],
                vec![static_call(
                    named_args("Box", vec![int_ty()]),
                    "get",
                    vec![bool_lit(true)],
                )],
            )],
        )],
        ..record(id("Main"))
    };
    let sources = [source(
        0,
        "example",
        vec![Definition::Record(boxdef), Definition::Record(main)],
    )];
    match compile_sources(&sources).unwrap_err() {
        SemanticError::TypeMismatch {
            expected,
            found,
            value_index,
            ..
        } => {
            assert_eq!(expected, "Int");
            assert_eq!(found, "Boolean");
            assert_eq!(value_index, None);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn call_arity_mismatch_is_reported() {
    let util = RecordDef {
        functions: vec![
            fn_def(
                "one",
                vec![param("x", int_ty())],
                vec![],
                vec![return_stmt(vec![])],
            ),
            fn_def(
                "f",
                vec![],
                vec![],
                vec![var_stmt(
                    vec![],
                    vec![static_call(named("Util"), "one", vec![])],
                )],
            ),
        ],
        ..record(id("Util"))
    };
    let sources = [source(0, "example", vec![Definition::Record(util)])];
    match compile_sources(&sources).unwrap_err() {
        SemanticError::ValueCountMismatch {
            actual, expected, ..
        } => {
            assert_eq!(actual, 0);
            assert_eq!(expected, 1);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn call_on_primitive_type_is_rejected() {
    let body = vec![var_stmt(
        vec![("r", int_ty())],
        vec![static_call(int_ty(), "f", vec![])],
    )];
    let sources = [source(
        0,
        "example",
        vec![Definition::Record(RecordDef {
            functions: vec![fn_def("f", vec![], vec![], body)],
            ..record(id("A"))
        })],
    )];
    assert!(matches!(
        compile_sources(&sources).unwrap_err(),
        SemanticError::CallOnNonCompound { .. }
    ));
}

#[test]
fn unknown_function_is_reported() {
    let body = vec![var_stmt(
        vec![("r", int_ty())],
        vec![static_call(named("A"), "missing", vec![])],
    )];
    let sources = [source(
        0,
        "example",
        vec![Definition::Record(RecordDef {
            functions: vec![fn_def("f", vec![], vec![], body)],
            ..record(id("A"))
        })],
    )];
    match compile_sources(&sources).unwrap_err() {
        SemanticError::NoSuchFn { record, name, .. } => {
            assert_eq!(record, "example.A");
            assert_eq!(name, "missing");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

// ---------------------------------------------------------------------
// Constraints (scenarios 6 and 7)
// ---------------------------------------------------------------------

#[test]
fn unsatisfied_constraint_is_reported() {
    // interface Good {} record A[#T | #T is Good] {}
    // record Main { fn f(a: A[Int]): Int { return 0; } }
    let main = RecordDef {
        functions: vec![fn_def(
            "f",
            vec![param("a", named_args("A", vec![int_ty()]))],
            vec![int_ty()],
            vec![return_stmt(vec![int_lit(0)])],
        )],
        ..record(id("Main"))
    };
    let sources = [source(
        0,
        "example",
        vec![
            Definition::Interface(interface(id("Good"))),
            Definition::Record(constrained_record("A", "T", "Good")),
            Definition::Record(main),
        ],
    )];
    match compile_sources(&sources).unwrap_err() {
        SemanticError::TypesDontSatisfyConstraint { constraint, .. } => {
            assert_eq!(constraint, "Int is example.Good");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn record_header_declaration_satisfies_constraint() {
    // record B is Good {}  ...  fn f(a: A[B]): Int { return 0; }
    let b = RecordDef {
        implements: vec![apply("Good")],
        ..record(id("B"))
    };
    let main = RecordDef {
        functions: vec![fn_def(
            "f",
            vec![param("a", named_args("A", vec![named("B")]))],
            vec![int_ty()],
            vec![return_stmt(vec![int_lit(0)])],
        )],
        ..record(id("Main"))
    };
    let sources = [source(
        0,
        "example",
        vec![
            Definition::Interface(interface(id("Good"))),
            Definition::Record(constrained_record("A", "T", "Good")),
            Definition::Record(b),
            Definition::Record(main),
        ],
    )];
    let program = compile_sources(&sources).unwrap();
    assert!(program.records.contains_key(&ir::RecordId::new("example.Main")));
}

#[test]
fn ambient_constraint_satisfies_transitively() {
    // record Use[#U | #U is Good] { fn f(a: A[#U]): Int { return 0; } }
    let use_record = RecordDef {
        type_params: TypeParams {
            params: vec![id("U")],
            constraints: vec![constraint(tyvar("U"), "Good")],
        },
        functions: vec![fn_def(
            "f",
            vec![param("a", named_args("A", vec![tyvar("U")]))],
            vec![int_ty()],
            vec![return_stmt(vec![int_lit(0)])],
        )],
        ..record(id("Use"))
    };
    let sources = [source(
        0,
        "example",
        vec![
            Definition::Interface(interface(id("Good"))),
            Definition::Record(constrained_record("A", "T", "Good")),
            Definition::Record(use_record),
        ],
    )];
    assert!(compile_sources(&sources).is_ok());
}

#[test]
fn record_used_as_constraint_is_rejected() {
    let sources = [source(
        0,
        "example",
        vec![
            Definition::Record(record(id("NotAnInterface"))),
            Definition::Record(constrained_record("A", "T", "NotAnInterface")),
        ],
    )];
    assert!(matches!(
        compile_sources(&sources).unwrap_err(),
        SemanticError::TypeUsedAsConstraint { .. }
    ));
}

#[test]
fn type_argument_arity_is_checked() {
    let main = RecordDef {
        functions: vec![fn_def(
            "f",
            vec![param("a", named("Box"))],
            vec![],
            vec![return_stmt(vec![])],
        )],
        ..record(id("Main"))
    };
    let boxdef = RecordDef {
        type_params: TypeParams {
            params: vec![id("T")],
            constraints: vec![],
        },
        ..record(id("Box"))
    };
    let sources = [source(
        0,
        "example",
        vec![Definition::Record(boxdef), Definition::Record(main)],
    )];
    match compile_sources(&sources).unwrap_err() {
        SemanticError::TypeParameterCountMismatch {
            expected, actual, ..
        } => {
            assert_eq!(expected, 1);
            assert_eq!(actual, 0);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

// ---------------------------------------------------------------------
// Interfaces
// ---------------------------------------------------------------------

#[test]
fn interface_members_use_this_as_variable_zero() {
    // interface Comparable { fn compare(other: This): Boolean }
    let mut iface = interface(id("Comparable"));
    iface.functions.push(FnDef {
        proof: false,
        name: id("compare"),
        type_params: TypeParams::default(),
        params: vec![Param {
            name: id("other"),
            ty: TypeExpr::This(Span::default()),
            span: Span::default(),
        }],
        returns: vec![boolean_ty()],
        requires: vec![],
        ensures: vec![],
        body: None,
        span: Span::default(),
    });
    let sources = [source(0, "example", vec![Definition::Interface(iface)])];
    let program = compile_sources(&sources).unwrap();
    let iface = &program.interfaces[&ir::InterfaceId::new("example.Comparable")];
    assert_eq!(iface.type_parameters, ["This"]);
    let compare = &iface.signatures["compare"];
    assert_eq!(compare.type_parameters, ["This"]);
    assert_eq!(
        compare.parameters[0].ty,
        ir::Type::Variable(ir::TypeVarId::new(0))
    );
}

#[test]
fn this_outside_an_interface_is_rejected() {
    let sources = [source(
        0,
        "example",
        vec![Definition::Record(RecordDef {
            fields: vec![FieldDef {
                name: id("me"),
                ty: TypeExpr::This(Span::default()),
                span: Span::default(),
            }],
            ..record(id("A"))
        })],
    )];
    assert!(matches!(
        compile_sources(&sources).unwrap_err(),
        SemanticError::InvalidThisType { .. }
    ));
}

// ---------------------------------------------------------------------
// Body termination and variable ids
// ---------------------------------------------------------------------

#[test]
fn unterminated_body_gets_a_trailing_unreachable() {
    let sources = [source(
        0,
        "example",
        vec![Definition::Record(RecordDef {
            functions: vec![fn_def(
                "f",
                vec![],
                vec![int_ty()],
                vec![var_stmt(vec![("a", int_ty())], vec![int_lit(1)])],
            )],
            ..record(id("A"))
        })],
    )];
    let program = compile_sources(&sources).unwrap();
    let f = &program.functions
        [&ir::FunctionId::member(&ir::RecordId::new("example.A"), "f")];
    assert!(matches!(
        f.body.last(),
        Some(ir::Op::Unreachable { kind }) if kind == "return"
    ));
}

#[test]
fn fully_returning_branches_need_no_trailing_unreachable() {
    let body = vec![if_stmt(
        bin_expr(int_atom(1), vec![(BinOpKind::Eq, int_atom(1))]),
        vec![return_stmt(vec![int_lit(0)])],
        Some(vec![return_stmt(vec![int_lit(1)])]),
    )];
    let sources = [source(
        0,
        "example",
        vec![Definition::Record(RecordDef {
            functions: vec![fn_def("f", vec![], vec![int_ty()], body)],
            ..record(id("A"))
        })],
    )];
    let program = compile_sources(&sources).unwrap();
    let f = &program.functions
        [&ir::FunctionId::member(&ir::RecordId::new("example.A"), "f")];
    assert!(matches!(f.body.last(), Some(ir::Op::Branch { .. })));
}

#[test]
fn explicit_unreachable_statement_terminates_the_body() {
    let sources = [source(
        0,
        "example",
        vec![Definition::Record(RecordDef {
            functions: vec![fn_def(
                "f",
                vec![],
                vec![int_ty()],
                vec![Statement::Unreachable(Span::default())],
            )],
            ..record(id("A"))
        })],
    )];
    let program = compile_sources(&sources).unwrap();
    let f = &program.functions
        [&ir::FunctionId::member(&ir::RecordId::new("example.A"), "f")];
    assert_eq!(
        f.body,
        vec![ir::Op::Unreachable {
            kind: "explicit".to_string(),
        }]
    );
}

#[test]
fn variable_ids_are_dense_in_declaration_order() {
    // fn f(a: Int): Int { var b: Int = a; var c: Int = 2; return c; }
    let body = vec![
        var_stmt(vec![("b", int_ty())], vec![var_ref("a")]),
        var_stmt(vec![("c", int_ty())], vec![int_lit(2)]),
        return_stmt(vec![var_ref("c")]),
    ];
    let sources = [source(
        0,
        "example",
        vec![Definition::Record(RecordDef {
            functions: vec![fn_def("f", vec![param("a", int_ty())], vec![int_ty()], body)],
            ..record(id("A"))
        })],
    )];
    let program = compile_sources(&sources).unwrap();
    let f = &program.functions
        [&ir::FunctionId::member(&ir::RecordId::new("example.A"), "f")];

    // parameter a is id 0; every declared id after it is dense and ordered
    let mut declared = vec![ir::VarId::new(0)];
    fn collect(ops: &[ir::Op], declared: &mut Vec<ir::VarId>) {
        for op in ops {
            match op {
                ir::Op::Var { dest, .. } => declared.push(*dest),
                ir::Op::Branch {
                    true_ops,
                    false_ops,
                    ..
                } => {
                    collect(true_ops, declared);
                    collect(false_ops, declared);
                }
                _ => {}
            }
        }
    }
    collect(&f.body, &mut declared);
    let indices: Vec<u32> = declared.iter().map(|v| v.index()).collect();
    let expected: Vec<u32> = (0..declared.len() as u32).collect();
    assert_eq!(indices, expected);
}

// ---------------------------------------------------------------------
// Program shape
// ---------------------------------------------------------------------

#[test]
fn foreign_builtins_are_seeded() {
    let sources = [source(0, "example", vec![Definition::Record(record(id("A")))])];
    let program = compile_sources(&sources).unwrap();
    assert!(program.foreign[ir::FOREIGN_INT_EQ].semantics.eq);
    assert_eq!(
        program.foreign[ir::FOREIGN_INT_ADD].return_types,
        vec![ir::Type::Int]
    );
    assert!(program.foreign.contains_key(ir::FOREIGN_INT_SUB));
    assert!(program.vtable_factories.is_empty());
}

#[test]
fn proof_marker_has_no_ir_effect() {
    let mut f = fn_def("lemma", vec![], vec![], vec![return_stmt(vec![])]);
    f.proof = true;
    let sources = [source(
        0,
        "example",
        vec![Definition::Record(RecordDef {
            functions: vec![f],
            ..record(id("A"))
        })],
    )];
    let program = compile_sources(&sources).unwrap();
    assert!(
        program
            .functions
            .contains_key(&ir::FunctionId::member(&ir::RecordId::new("example.A"), "lemma"))
    );
}
