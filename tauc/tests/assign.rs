use std::collections::HashSet;

use arch::Reg;
use tauc::ast::Stmt;
use tauc::util::visit::{preorder, Node};
use tauc::{run_to, Compiled, Stage};

fn assert(code: &str) -> Compiled {
    match run_to(code, Stage::Assign) {
        Ok(compiled) => compiled,
        Err(err) => panic!("{}", err),
    }
}

/// Operands of the expressions directly under each statement, in walk order.
fn operands(compiled: &Compiled) -> Vec<(String, Vec<Reg>)> {
    let mut stmts: Vec<(String, Vec<Reg>)> = Vec::new();
    for node in preorder(&compiled.program) {
        match node {
            Node::Stmt(stmt) => stmts.push((label(stmt), Vec::new())),
            Node::Expr(expr) => {
                let (_, regs) = stmts.last_mut().expect("expression outside a statement");
                regs.push(*expr.reg.get().unwrap());
            }
            Node::Compound(_) | Node::VarDecl(_) => stmts.push(("block".to_string(), Vec::new())),
            _ => {}
        }
    }
    stmts.retain(|(_, regs)| !regs.is_empty());
    stmts
}

fn label(stmt: &Stmt) -> String {
    format!("{} at {}", stmt.name(), stmt.span)
}

macro_rules! case {
    ($name:ident, $code:expr) => {
        #[test]
        fn $name() {
            let compiled = assert($code);
            for (stmt, regs) in operands(&compiled) {
                let distinct: HashSet<&Reg> = regs.iter().collect();
                assert_eq!(distinct.len(), regs.len(), "operand reused in {}", stmt);
                assert_eq!(regs[0], Reg::R(0), "{} does not start at r0", stmt);
            }
        }
    };
}

case!(print_sum, "func f() { print 1 + 2 * 3; }");
case!(assignment, "func f() { var a: [3]int; a[1] = a[0] + 1; }");
case!(calls, "func f(a: int, b: int): int { return f(a + 1, f(b, 2)); }");
case!(control_flow, "func f() { var i: int; while i < 3 { if not (i == 1) { print i; } i = i + 1; } }");

#[test]
fn preorder_numbering() {
    let compiled = assert("func f() { var x: int; x = 1 + 2 * 3; print x; }");
    let regs = operands(&compiled);
    assert_eq!(
        regs.iter().map(|(_, regs)| regs.clone()).collect::<Vec<_>>(),
        vec![
            // x, +, 1, *, 2, 3
            vec![Reg::R(0), Reg::R(1), Reg::R(2), Reg::R(3), Reg::R(4), Reg::R(5)],
            vec![Reg::R(0)],
        ]
    );
}

#[test]
fn every_expression_has_an_operand() {
    let compiled = assert("func f(a: int): bool { if a > 0 and f(a - 1) { return true; } return false; }");
    for node in preorder(&compiled.program) {
        if let Node::Expr(expr) = node {
            assert!(expr.reg.is_set(), "{} at {}", expr.name(), expr.span);
        }
    }
}
