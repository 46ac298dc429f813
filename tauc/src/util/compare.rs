//! Lockstep comparison of two decorated trees.
//!
//! Each stage adds the decorations its pass writes to the set of compared
//! fields, so comparing at `Offsets` also checks everything `Parse`,
//! `Binding` and `Typecheck` produce.

use crate::ast::{Decor, ExprKind, TypeAstKind};
use crate::eval::symbols::{ScopeId, SymbolId, SymbolTable};
use crate::eval::types::SemanticType;
use crate::grammer::token::Span;
use crate::util::visit::{preorder, Node};
use crate::{Compiled, Stage};
use itertools::{EitherOrBoth, Itertools};
use std::fmt::Display;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field} of {node} at {span}: expected {expected}, found {actual}")]
pub struct Mismatch {
    pub field: String,
    pub node: String,
    pub span: Span,
    pub expected: String,
    pub actual: String,
}

/// First difference between `expected` and `actual` in the fields of `stage`.
pub fn compare(expected: &Compiled, actual: &Compiled, stage: Stage) -> Result<(), Mismatch> {
    let left = preorder(&expected.program);
    let right = preorder(&actual.program);

    for pair in left.iter().zip_longest(right.iter()) {
        let (want, got) = match pair {
            EitherOrBoth::Both(want, got) => (want, got),
            EitherOrBoth::Left(node) => return Err(missing(node, "<missing>")),
            EitherOrBoth::Right(node) => return Err(missing(node, "<extra>")),
        };
        let want_fields = fields(want, expected.table.as_ref(), stage);
        let got_fields = fields(got, actual.table.as_ref(), stage);
        for ((field, want_val), (_, got_val)) in want_fields.into_iter().zip(got_fields) {
            if want_val != got_val {
                return Err(Mismatch {
                    field: field.to_string(),
                    node: want.name().to_string(),
                    span: want.span(),
                    expected: want_val,
                    actual: got_val,
                });
            }
        }
    }

    if stage >= Stage::Codegen {
        compare_code(expected, actual)?;
    }
    Ok(())
}

fn missing(node: &Node, actual: &str) -> Mismatch {
    Mismatch {
        field: "shape".to_string(),
        node: node.name().to_string(),
        span: node.span(),
        expected: node.name().to_string(),
        actual: actual.to_string(),
    }
}

fn compare_code(expected: &Compiled, actual: &Compiled) -> Result<(), Mismatch> {
    for (pc, pair) in expected.code.iter().zip_longest(actual.code.iter()).enumerate() {
        let (want, got) = match pair {
            EitherOrBoth::Both(want, got) => (want.to_string(), got.to_string()),
            EitherOrBoth::Left(want) => (want.to_string(), "<missing>".to_string()),
            EitherOrBoth::Right(got) => ("<missing>".to_string(), got.to_string()),
        };
        if want != got {
            return Err(Mismatch {
                field: format!("instruction {}", pc),
                node: "Program".to_string(),
                span: expected.program.span,
                expected: want.trim().to_string(),
                actual: got.trim().to_string(),
            });
        }
    }
    Ok(())
}

fn show<T: Display>(slot: &Decor<T>) -> String {
    slot.get()
        .map_or_else(|| "<unset>".to_string(), |val| val.to_string())
}

fn scope_chain(table: Option<&SymbolTable>, scope: Option<&ScopeId>) -> String {
    match (table, scope) {
        (Some(table), Some(scope)) => table
            .ancestors(*scope)
            .map(|id| table.scope(id).to_string())
            .join(" <- "),
        _ => "<unset>".to_string(),
    }
}

fn symbol_fields(
    out: &mut Vec<(&'static str, String)>,
    table: Option<&SymbolTable>,
    sym: Option<&SymbolId>,
    stage: Stage,
) {
    let Some((table, sym)) = table.zip(sym) else {
        out.push(("symbol", "<unset>".to_string()));
        return;
    };
    let symbol = table.symbol(*sym);
    out.push(("symbol", format!("{} {:?}", symbol.name, symbol.kind)));
    out.push(("declaring scope", scope_chain(Some(table), Some(&symbol.scope))));
    if stage >= Stage::Typecheck {
        out.push(("symbol type", show(&symbol.ty)));
    }
    if stage >= Stage::Offsets {
        out.push(("offset", show(&symbol.offset)));
    }
}

fn frame_fields(out: &mut Vec<(&'static str, String)>, ty: &Decor<SemanticType>) {
    let (params, frame) = match ty.get() {
        Some(SemanticType::Func(sig)) => (sig.param_size.to_string(), sig.frame_size.to_string()),
        _ => ("<unset>".to_string(), "<unset>".to_string()),
    };
    out.push(("param size", params));
    out.push(("frame size", frame));
}

/// The fields of `node` compared at `stage`, in a fixed order.
fn fields(node: &Node, table: Option<&SymbolTable>, stage: Stage) -> Vec<(&'static str, String)> {
    let mut out = vec![
        ("kind", node.name().to_string()),
        ("span", node.span().to_string()),
    ];

    match node {
        Node::Id(id) => {
            out.push(("name", id.name.clone()));
            if stage >= Stage::Binding {
                symbol_fields(&mut out, table, id.sym.get(), stage);
            }
            if stage >= Stage::Typecheck {
                out.push(("type", show(&id.ty)));
            }
        }
        Node::FuncDecl(func) => {
            if stage >= Stage::Binding {
                out.push(("scope", scope_chain(table, func.scope.get())));
            }
            if stage >= Stage::Typecheck {
                out.push(("type", show(&func.ty)));
            }
            if stage >= Stage::Offsets {
                frame_fields(&mut out, &func.ty);
            }
        }
        Node::Compound(block) => {
            if stage >= Stage::Binding {
                out.push(("scope", scope_chain(table, block.scope.get())));
            }
        }
        Node::ParamDecl(param) if stage >= Stage::Typecheck => {
            out.push(("type", show(&param.ty)));
        }
        Node::VarDecl(var) if stage >= Stage::Typecheck => {
            out.push(("type", show(&var.ty)));
        }
        Node::TypeAst(ty) => {
            if let TypeAstKind::Array(count, _) = &ty.kind {
                out.push(("count", count.to_string()));
            }
            if stage >= Stage::Typecheck {
                out.push(("type", show(&ty.ty)));
            }
        }
        Node::Argument(arg) if stage >= Stage::Typecheck => {
            out.push(("type", show(&arg.ty)));
        }
        Node::Expr(expr) => {
            match &expr.kind {
                ExprKind::Binary(op, ..) => out.push(("operator", op.to_string())),
                ExprKind::Unary(op, ..) => out.push(("operator", op.to_string())),
                ExprKind::Int(val) => out.push(("value", val.to_string())),
                ExprKind::Bool(val) => out.push(("value", val.to_string())),
                _ => {}
            }
            if stage >= Stage::Typecheck {
                out.push(("type", show(&expr.ty)));
            }
            if stage >= Stage::Assign {
                out.push(("operand", show(&expr.reg)));
            }
        }
        _ => {}
    }
    out
}
