//! Boolean flow.
//!
//! Conditions of `if` and `while` never materialize `not`, `and` or `or` as
//! values: negation flips the branch sense, the logical operators become
//! short-circuit jumps and literals fold into an unconditional jump or
//! nothing at all.

use super::func::{reg, FuncCompiler};
use crate::ast::{BinaryOp, Expr, ExprKind, UnaryOp};
use crate::error::Error;
use arch::{Insn, Label};
use itertools::chain;

/// Strip a chain of `not`s, returning the operand and whether the count was odd.
fn peel(mut expr: &Expr) -> (&Expr, bool) {
    let mut odd = false;
    while let ExprKind::Unary(UnaryOp::Not, operand) = &expr.kind {
        expr = operand;
        odd = !odd;
    }
    (expr, odd)
}

impl<'a> FuncCompiler<'a> {
    /// Jump to `target` when `expr` evaluates to `jump_if`, fall through otherwise.
    pub(super) fn gen_cond(
        &mut self,
        expr: &Expr,
        target: &Label,
        jump_if: bool,
    ) -> Result<Vec<Insn>, Error> {
        match &expr.kind {
            ExprKind::Bool(val) if *val == jump_if => Ok(vec![Insn::JUMP(target.clone())]),
            ExprKind::Bool(_) => Ok(vec![]),

            ExprKind::Unary(UnaryOp::Not, operand) => self.gen_cond(operand, target, !jump_if),

            ExprKind::Binary(BinaryOp::And, lhs, rhs) if jump_if => {
                let skip = self.fresh();
                Ok(chain!(
                    self.gen_cond(lhs, &skip, false)?,
                    self.gen_cond(rhs, target, true)?,
                    [Insn::LABEL(skip)],
                )
                .collect())
            }
            ExprKind::Binary(BinaryOp::And, lhs, rhs) => Ok(chain!(
                self.gen_cond(lhs, target, false)?,
                self.gen_cond(rhs, target, false)?,
            )
            .collect()),

            ExprKind::Binary(BinaryOp::Or, lhs, rhs) if jump_if => Ok(chain!(
                self.gen_cond(lhs, target, true)?,
                self.gen_cond(rhs, target, true)?,
            )
            .collect()),
            ExprKind::Binary(BinaryOp::Or, lhs, rhs) => {
                let skip = self.fresh();
                Ok(chain!(
                    self.gen_cond(lhs, &skip, true)?,
                    self.gen_cond(rhs, target, false)?,
                    [Insn::LABEL(skip)],
                )
                .collect())
            }

            _ => {
                let r = reg(expr)?;
                let branch = if jump_if {
                    Insn::IF(r, target.clone())
                } else {
                    Insn::IFNOT(r, target.clone())
                };
                Ok(chain!(self.gen_expr(expr)?, [branch]).collect())
            }
        }
    }

    /// Value of a `not` chain: one NOT for an odd count, one MOV for an even one.
    pub(super) fn gen_not(&mut self, expr: &Expr) -> Result<Vec<Insn>, Error> {
        let r = reg(expr)?;
        let (operand, odd) = peel(expr);
        match &operand.kind {
            ExprKind::Bool(val) => Ok(vec![Insn::CONST(r, (*val != odd) as i64)]),
            ExprKind::Binary(BinaryOp::And | BinaryOp::Or, ..) => self.gen_flag(expr),
            _ => {
                let inner = reg(operand)?;
                Ok(chain!(
                    self.gen_expr(operand)?,
                    [if odd {
                        Insn::NOT(r, inner)
                    } else {
                        Insn::MOV(r, inner)
                    }],
                )
                .collect())
            }
        }
    }

    /// Value of a logical expression, computed by branching on it.
    pub(super) fn gen_flag(&mut self, expr: &Expr) -> Result<Vec<Insn>, Error> {
        let r = reg(expr)?;
        let unset = self.fresh();
        let end = self.fresh();
        Ok(chain!(
            self.gen_cond(expr, &unset, false)?,
            [
                Insn::CONST(r, 1),
                Insn::JUMP(end.clone()),
                Insn::LABEL(unset),
                Insn::CONST(r, 0),
                Insn::LABEL(end),
            ],
        )
        .collect())
    }
}
