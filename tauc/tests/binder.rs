use tauc::eval::symbols::{ScopeKind, SymbolKind};
use tauc::util::visit::{preorder, Node};
use tauc::{run_to, Compiled, Error, Stage};

fn assert(code: &str) -> Compiled {
    match run_to(code, Stage::Binding) {
        Ok(compiled) => compiled,
        Err(err) => panic!("{}", err),
    }
}

fn assert_err(code: &str) -> Error {
    let err = run_to(code, Stage::Binding).unwrap_err();
    println!("{}", err);
    assert!(matches!(err, Error::Name { .. }), "{err}");
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
    ($name:ident, $code:expr, $span:expr) => {
        #[test]
        fn $name() {
            let err = assert_err($code);
            assert_eq!(err.span().unwrap().to_string(), $span);
        }
    };
}

case!(param_use, "func f(a: int) { print a; }");
case!(forward_call, "func main() { g(); } func g() { }");
case!(recursion, "func f(n: int) { f(n); }");
case!(shadow_param_in_body, "func f(a: int) { var a: bool; print a; }");
case!(shadow_in_nested_block, "func f() { var x: int; { var x: bool; print x; } print x; }");
case!(sibling_blocks, "func f() { { var x: int; } { var x: int; } }");
case!(shadow_function_name, "func f() { var f: int; f = 1; }");

case_err!(undeclared, "func main() { y = 1; }", "1:15-1:16");
case_err!(duplicate_function, "func f(){} func f(){}", "1:17-1:18");
case_err!(duplicate_param, "func f(a: int, a: bool) { }", "1:16-1:17");
case_err!(duplicate_var, "func f() { var x: int; var x: int; }", "1:28-1:29");
case_err!(out_of_scope, "func f() { { var x: int; } x = 1; }", "1:28-1:29");
case_err!(undeclared_callee, "func f() { g(); }", "1:12-1:13");
case_err!(other_functions_locals, "func f() { var x: int; } func g() { print x; }", "1:43-1:44");

#[test]
fn scopes() {
    let compiled = assert("func f(a: int) { var b: int; { var c: int; } }");
    let table = compiled.table().unwrap();
    let kinds: Vec<ScopeKind> = table.scopes().map(|(_, scope)| scope.kind).collect();
    assert_eq!(
        kinds,
        vec![ScopeKind::Global, ScopeKind::Func, ScopeKind::Local, ScopeKind::Local]
    );

    let func = &compiled.program.funcs[0];
    let func_scope = *func.scope.get().unwrap();
    let body_scope = *func.body.scope.get().unwrap();
    assert_eq!(table.scope(body_scope).parent, Some(func_scope));
    assert_eq!(table.depth(body_scope), 2);
    assert!(table.scope(func_scope).symtab.contains_key("a"));
    assert!(table.scope(body_scope).symtab.contains_key("b"));
    assert!(table.scope(table.global()).symtab.contains_key("f"));
}

#[test]
fn symbol_kinds() {
    let compiled = assert("func f(a: int) { var b: int; }");
    let table = compiled.table().unwrap();
    let kinds: Vec<(String, SymbolKind)> = table
        .symbols()
        .map(|(_, sym)| (sym.name.clone(), sym.kind))
        .collect();
    assert_eq!(
        kinds,
        vec![
            ("f".to_string(), SymbolKind::Func),
            ("a".to_string(), SymbolKind::Param),
            ("b".to_string(), SymbolKind::Var),
        ]
    );
}

#[test]
fn every_id_is_resolved_by_name() {
    let compiled = assert(
        "func main() { var x: int; x = 1; { var x: bool; x = true; } print x; g(x); }
         func g(n: int) { print n; }",
    );
    let table = compiled.table().unwrap();
    for node in preorder(&compiled.program) {
        if let Node::Id(id) = node {
            let sym = table.symbol(*id.sym.get().unwrap());
            assert_eq!(sym.name, id.name);
        }
    }
}

#[test]
fn inner_declaration_wins() {
    let compiled = assert("func f() { var x: int; { var x: bool; x = true; } x = 1; }");
    let table = compiled.table().unwrap();
    let uses: Vec<_> = preorder(&compiled.program)
        .into_iter()
        .filter_map(|node| match node {
            Node::Expr(expr) => match &expr.kind {
                tauc::ast::ExprKind::Id(id) => Some(*id.sym.get().unwrap()),
                _ => None,
            },
            _ => None,
        })
        .collect();
    assert_eq!(uses.len(), 2);
    assert_ne!(uses[0], uses[1]);

    let inner = table.symbol(uses[0]);
    let outer = table.symbol(uses[1]);
    assert!(table.depth(inner.scope) > table.depth(outer.scope));
}
