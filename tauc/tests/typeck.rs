use tauc::util::visit::{preorder, Node};
use tauc::{run_to, Compiled, Error, Stage};

fn assert(code: &str) -> Compiled {
    match run_to(code, Stage::Typecheck) {
        Ok(compiled) => compiled,
        Err(err) => panic!("{}", err),
    }
}

fn assert_err(code: &str) -> Error {
    let err = run_to(code, Stage::Typecheck).unwrap_err();
    println!("{}", err);
    assert!(matches!(err, Error::Type { .. }), "{err}");
    err
}

macro_rules! case {
    ($name:ident, $code:expr) => {
        #[test]
        fn $name() {
            assert($code);
        }
    };
}

macro_rules! case_err {
    ($name:ident, $code:expr) => {
        #[test]
        fn $name() {
            assert_err($code);
        }
    };
    ($name:ident, $code:expr, $span:expr) => {
        #[test]
        fn $name() {
            let err = assert_err($code);
            assert_eq!(err.span().unwrap().to_string(), $span);
        }
    };
}

// Well typed
case!(arithmetic, "func f(): int { return 1 + 2 * 3 - 4 / 5 % 6; }");
case!(logic, "func f(): bool { return not (1 < 2) and true or 3 >= 3; }");
case!(bool_ordering, "func f(): bool { return false < true; }");
case!(array_equality, "func f(a: [2]int, b: [2]int): bool { return a == b; }");
case!(array_cells, "func f() { var m: [2][3]int; m[1][2] = m[0][0] + 1; m[0] = m[1]; }");
case!(array_argument, "func f(a: [3]bool) { } func g() { var x: [3]bool; f(x); }");
case!(forward_reference, "func f(): int { return g(true); } func g(b: bool): int { return 1; }");
case!(void_return, "func f() { return; }");
case!(void_call_return, "func f() { return g(); } func g() { }");
case!(print_bool, "func f() { print 1 == 1; print 1; }");
case!(while_cond, "func f() { var i: int; while i < 3 and true { i = i + 1; } }");
case!(negation, "func f(): int { return -(-1); }");

// Ill typed
case_err!(assign_bool_to_int, "func main() { var x: int; x = true; }", "1:27-1:35");
case_err!(arith_on_bool, "func f() { print 1 + true; }", "1:18-1:26");
case_err!(logic_on_int, "func f() { print 1 and 2; }");
case_err!(compare_mixed, "func f() { print 1 == true; }");
case_err!(order_arrays, "func f(a: [1]int) { print a < a; }");
case_err!(compare_functions, "func f() { print f == f; }");
case_err!(not_int, "func f() { print not 1; }");
case_err!(negate_bool, "func f() { print -true; }");
case_err!(if_int, "func f() { if 1 { } }", "1:15-1:16");
case_err!(while_int, "func f() { while 0 { } }");
case_err!(return_wrong_type, "func f(): int { return true; }");
case_err!(return_missing_value, "func f(): int { return; }");
case_err!(return_value_from_void, "func f() { return 1; }");
case_err!(print_array, "func f(a: [2]int) { print a; }");
case_err!(print_void, "func f() { print f(); }");
case_err!(print_function, "func f() { print f; }");
case_err!(arg_type, "func f(a: int) { } func g() { f(true); }", "1:31-1:38");
case_err!(arg_count, "func f(a: int) { } func g() { f(); }", "1:31-1:34");
case_err!(arg_array_length, "func f(a: [2]int) { } func g() { var x: [3]int; f(x); }");
case_err!(call_non_function, "func f() { var x: int; x(); }");
case_err!(index_non_array, "func f() { var x: int; print x[0]; }");
case_err!(index_with_bool, "func f() { var a: [2]int; print a[true]; }");
case_err!(assign_array_length, "func f() { var a: [2]int; var b: [3]int; a = b; }");
case_err!(assign_to_function, "func f() { f = 1; }");
case_err!(assign_to_literal, "func f() { 1 = 1; }");
case_err!(assign_to_sum, "func f() { var x: int; x + 1 = 2; }");
case_err!(void_var, "func f() { var v: void; }");
case_err!(void_param, "func f(v: void) { }");
case_err!(void_elements, "func f() { var a: [2]void; }");
case_err!(array_return, "func f(): [2]int { }");
case_err!(
    oversized_array,
    "func f() { var a: [4294967296][4294967296]int; }",
    "1:19-1:46"
);

#[test]
fn expression_types() {
    let compiled = assert(
        "func f(a: [2]bool): int { return 1; }
         func main() { var x: [2]bool; print f(x) + 1 < 3 and x[0]; }",
    );
    let types: Vec<String> = preorder(&compiled.program)
        .into_iter()
        .filter_map(|node| match node {
            Node::Expr(expr) => Some(expr.ty.get().unwrap().to_string()),
            _ => None,
        })
        .collect();
    assert_eq!(
        types,
        vec![
            "int",
            "bool",
            "bool",
            "int",
            "int",
            "func([2]bool): int",
            "[2]bool",
            "int",
            "int",
            "bool",
            "[2]bool",
            "int",
        ]
    );
}

#[test]
fn every_node_is_typed() {
    let compiled = assert(
        "func f(a: int, b: [3]int): bool { var c: bool; c = a < b[0]; return c; }
         func main() { var v: [3]int; print f(1, v); }",
    );
    for node in preorder(&compiled.program) {
        let typed = match node {
            Node::FuncDecl(func) => func.ty.is_set(),
            Node::ParamDecl(param) => param.ty.is_set(),
            Node::VarDecl(var) => var.ty.is_set(),
            Node::TypeAst(ty) => ty.ty.is_set(),
            Node::Expr(expr) => expr.ty.is_set(),
            Node::Argument(arg) => arg.ty.is_set(),
            Node::Id(id) => id.ty.is_set(),
            _ => true,
        };
        assert!(typed, "{} at {} is untyped", node.name(), node.span());
    }

    let table = compiled.table().unwrap();
    for (_, sym) in table.symbols() {
        assert!(sym.ty.is_set(), "symbol {} is untyped", sym.name);
    }
}

#[test]
fn signatures() {
    let compiled = assert("func f(a: int, b: [2][3]bool): bool { return true; }");
    let func = &compiled.program.funcs[0];
    assert_eq!(
        func.ty.get().unwrap().to_string(),
        "func(int, [2][3]bool): bool"
    );
}
