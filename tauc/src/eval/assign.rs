use crate::ast::{Expr, Program, Stmt};
use crate::error::Error;
use crate::util::visit::{walk_expr, walk_stmt, VisitMut};
use arch::Reg;

/// Give every expression its own operand register.
///
/// Numbering restarts at `r0` for each statement and follows the canonical
/// pre-order walk, so no two expressions of one statement share a register.
pub fn assign_operands(program: &mut Program) -> Result<(), Error> {
    let mut operands = Operands { next: 0, max: 0 };
    operands.visit_program(program)?;
    tracing::debug!("at most {} operand registers per statement", operands.max);
    Ok(())
}

struct Operands {
    next: usize,
    max: usize,
}

impl VisitMut for Operands {
    fn visit_stmt(&mut self, stmt: &mut Stmt) -> Result<(), Error> {
        self.next = 0;
        walk_stmt(self, stmt)
    }

    fn visit_expr(&mut self, expr: &mut Expr) -> Result<(), Error> {
        expr.reg.set(Reg::R(self.next), expr.name())?;
        self.next += 1;
        self.max = self.max.max(self.next);
        walk_expr(self, expr)
    }
}
