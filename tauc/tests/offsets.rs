use std::collections::HashSet;

use tauc::eval::symbols::{SymbolKind, SymbolTable};
use tauc::{run_to, Compiled, Error, Stage};

fn assert(code: &str) -> Compiled {
    match run_to(code, Stage::Offsets) {
        Ok(compiled) => compiled,
        Err(err) => panic!("{}", err),
    }
}

fn offset(table: &SymbolTable, name: &str) -> i64 {
    let (_, sym) = table
        .symbols()
        .find(|(_, sym)| sym.name == name)
        .unwrap_or_else(|| panic!("no symbol {}", name));
    *sym.offset.get().unwrap()
}

/// Offsets are distinct within each function and the frame holds exactly its symbols.
fn check_frames(compiled: &Compiled) {
    let table = compiled.table().unwrap();
    for func in &compiled.program.funcs {
        let func_scope = *func.scope.get().unwrap();
        let members: Vec<_> = table
            .symbols()
            .filter(|(_, sym)| sym.kind != SymbolKind::Func)
            .filter(|(_, sym)| table.ancestors(sym.scope).any(|id| id == func_scope))
            .map(|(_, sym)| sym)
            .collect();

        let offsets: HashSet<i64> = members
            .iter()
            .filter(|sym| sym.ty.get().unwrap().size() > 0)
            .map(|sym| *sym.offset.get().unwrap())
            .collect();
        let sized = members
            .iter()
            .filter(|sym| sym.ty.get().unwrap().size() > 0)
            .count();
        assert_eq!(offsets.len(), sized, "shared offset in {}", func.id.name);

        let total: usize = members.iter().map(|sym| sym.ty.get().unwrap().size()).sum();
        let sig = table.func_type(*func.id.sym.get().unwrap()).unwrap();
        assert_eq!(sig.frame_size, total, "frame of {}", func.id.name);
        assert!(sig.frame_size >= sig.param_size);
    }
}

macro_rules! case {
    ($name:ident, $code:expr) => {
        #[test]
        fn $name() {
            check_frames(&assert($code));
        }
    };
}

case!(no_symbols, "func f() { }");
case!(params_only, "func f(a: int, b: bool) { }");
case!(nested_blocks, "func f(a: int) { var b: int; { var c: [4]int; { var d: bool; } } }");
case!(sibling_blocks, "func f() { { var x: int; } { var y: [2]int; } { var z: int; } }");
case!(
    blocks_in_statements,
    "func f(n: int) { var i: int; while i < n { var t: int; if t > 0 { var u: int; } else { var w: int; } } }"
);
case!(two_functions, "func f(a: int) { var b: int; } func g(a: [3]int) { var b: int; }");

#[test]
fn layout() {
    let compiled = assert(
        "func f(a: int, b: [3]int) { var x: bool; { var y: [2]int; } { var z: int; } }",
    );
    let table = compiled.table().unwrap();
    assert_eq!(offset(table, "a"), 0);
    assert_eq!(offset(table, "b"), 1);
    assert_eq!(offset(table, "x"), 4);
    assert_eq!(offset(table, "y"), 5);
    assert_eq!(offset(table, "z"), 7);
    assert_eq!(offset(table, "f"), 0);

    let sig = table
        .func_type(*compiled.program.funcs[0].id.sym.get().unwrap())
        .unwrap();
    assert_eq!(sig.param_size, 4);
    assert_eq!(sig.frame_size, 8);
}

#[test]
fn sizes_reach_the_tree() {
    let compiled = assert("func f(a: [2]int) { var b: int; }");
    let func = &compiled.program.funcs[0];
    let sig = func.ty.get().unwrap().as_func().unwrap();
    assert_eq!((sig.param_size, sig.frame_size), (2, 3));
    let sig = func.id.ty.get().unwrap().as_func().unwrap();
    assert_eq!((sig.param_size, sig.frame_size), (2, 3));
}

#[test]
fn every_function_starts_at_zero() {
    let compiled = assert("func f(a: int) { var b: int; } func g(c: int) { }");
    let table = compiled.table().unwrap();
    assert_eq!(offset(table, "a"), 0);
    assert_eq!(offset(table, "b"), 1);
    assert_eq!(offset(table, "c"), 0);
}

#[test]
fn frame_overflow() {
    let err = run_to(
        "func f() { var a: [5000000000000000000]int; var b: [5000000000000000000]int; }",
        Stage::Offsets,
    )
    .unwrap_err();
    assert!(matches!(err, Error::Type { .. }), "{err}");
    assert_eq!(err.span().unwrap().to_string(), "1:49-1:50");
}

#[test]
fn largest_array_fits() {
    let compiled = assert("func f() { var a: [5000000000000000000]int; var b: int; }");
    let table = compiled.table().unwrap();
    assert_eq!(offset(table, "b"), 5_000_000_000_000_000_000);
}
