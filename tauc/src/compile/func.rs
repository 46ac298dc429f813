use crate::ast::{
    Argument, BinaryOp, CompoundStmt, Expr, ExprKind, FuncDecl, Id, Stmt, StmtKind, UnaryOp,
};
use crate::error::Error;
use crate::eval::symbols::SymbolTable;
use crate::eval::types::SemanticType;
use arch::{Insn, Label, Reg, ALU};
use itertools::chain;

pub struct FuncCompiler<'a> {
    pub(super) table: &'a SymbolTable,
    pub(super) name: String,
    pub(super) frame: usize,
    labels: usize,
}

pub(super) fn reg(expr: &Expr) -> Result<Reg, Error> {
    expr.reg.need(expr.name()).copied()
}

pub(super) fn type_of(expr: &Expr) -> Result<&SemanticType, Error> {
    expr.ty.need(expr.name())
}

impl<'a> FuncCompiler<'a> {
    pub fn new(table: &'a SymbolTable, func: &FuncDecl) -> Result<Self, Error> {
        let sig = table.func_type(*func.id.sym.need(&func.id.name)?)?;
        Ok(Self {
            table,
            name: func.id.name.clone(),
            frame: sig.frame_size,
            labels: 0,
        })
    }

    pub fn compile(mut self, func: &FuncDecl) -> Result<Vec<Insn>, Error> {
        let body = self.gen_compound(&func.body)?;
        Ok(chain!(
            [Insn::LABEL(Label::new(&self.name)), Insn::ENTER(self.frame)],
            body,
            [Insn::RET(self.frame)],
        )
        .collect())
    }

    /// A label local to this function.
    pub(super) fn fresh(&mut self) -> Label {
        let label = Label::new(format!("{}.{}", self.name, self.labels));
        self.labels += 1;
        label
    }

    /// Frame offset and type of the symbol `id` resolves to.
    fn slot(&self, id: &Id) -> Result<(i64, &'a SemanticType), Error> {
        let sym = self.table.symbol(*id.sym.need(&id.name)?);
        Ok((*sym.offset.need(&id.name)?, sym.ty.need(&id.name)?))
    }

    fn gen_compound(&mut self, block: &CompoundStmt) -> Result<Vec<Insn>, Error> {
        let mut insns = Vec::new();
        for stmt in block.stmts.iter() {
            insns.extend(self.gen_stmt(stmt)?);
        }
        Ok(insns)
    }

    fn gen_stmt(&mut self, stmt: &Stmt) -> Result<Vec<Insn>, Error> {
        match &stmt.kind {
            StmtKind::Print(expr) => {
                let r = reg(expr)?;
                let print = match type_of(expr)? {
                    SemanticType::Bool => Insn::PRINTB(r),
                    _ => Insn::PRINT(r),
                };
                Ok(chain!(self.gen_expr(expr)?, [print]).collect())
            }

            StmtKind::Compound(block) => self.gen_compound(block),

            StmtKind::Assign(lhs, rhs) => {
                let value = self.gen_expr(rhs)?;
                let store = self.gen_store(lhs, rhs)?;
                Ok(chain!(value, store).collect())
            }

            StmtKind::If(cond, then, None) => {
                let end = self.fresh();
                Ok(chain!(
                    self.gen_cond(cond, &end, false)?,
                    self.gen_compound(then)?,
                    [Insn::LABEL(end)],
                )
                .collect())
            }

            StmtKind::If(cond, then, Some(other)) => {
                let other_label = self.fresh();
                let end = self.fresh();
                Ok(chain!(
                    self.gen_cond(cond, &other_label, false)?,
                    self.gen_compound(then)?,
                    [Insn::JUMP(end.clone()), Insn::LABEL(other_label)],
                    self.gen_compound(other)?,
                    [Insn::LABEL(end)],
                )
                .collect())
            }

            StmtKind::While(cond, body) => {
                let head = self.fresh();
                let exit = self.fresh();
                Ok(chain!(
                    [Insn::LABEL(head.clone())],
                    self.gen_cond(cond, &exit, false)?,
                    self.gen_compound(body)?,
                    [Insn::JUMP(head), Insn::LABEL(exit)],
                )
                .collect())
            }

            StmtKind::Call(expr) => match &expr.kind {
                ExprKind::Call(callee, args) => self.gen_call(callee, args),
                _ => Err(Error::internal(format!(
                    "call statement holds {}",
                    expr.name()
                ))),
            },

            StmtKind::Return(None) => Ok(vec![Insn::RET(self.frame)]),
            StmtKind::Return(Some(expr)) => Ok(chain!(
                self.gen_expr(expr)?,
                [Insn::MOV(Reg::RV, reg(expr)?), Insn::RET(self.frame)],
            )
            .collect()),
        }
    }

    /// Store the already computed value of `rhs` into `lhs`.
    fn gen_store(&mut self, lhs: &Expr, rhs: &Expr) -> Result<Vec<Insn>, Error> {
        let value = reg(rhs)?;
        let ty = type_of(rhs)?;
        match &lhs.kind {
            ExprKind::Id(id) => {
                let (offset, _) = self.slot(id)?;
                Ok(vec![if ty.is_array() {
                    Insn::COPY(Reg::FP, offset, value, ty.size())
                } else {
                    Insn::STORE(value, Reg::FP, offset)
                }])
            }
            ExprKind::ArrayCell(array, index) => {
                let cell = reg(lhs)?;
                Ok(chain!(
                    self.gen_cell_addr(cell, array, index)?,
                    [if ty.is_array() {
                        Insn::COPY(cell, 0, value, ty.size())
                    } else {
                        Insn::STORE(value, cell, 0)
                    }],
                )
                .collect())
            }
            _ => Err(Error::internal(format!("cannot store into {}", lhs.name()))),
        }
    }

    /// Evaluate every argument, then move them to the callee's frame and call.
    pub(super) fn gen_call(&mut self, callee: &Expr, args: &[Argument]) -> Result<Vec<Insn>, Error> {
        let ExprKind::Id(id) = &callee.kind else {
            return Err(Error::internal(format!("callee is {}", callee.name())));
        };
        let sig = self.table.func_type(*id.sym.need(&id.name)?)?;

        let mut evals = Vec::new();
        let mut stores = Vec::new();
        for (arg, offset) in args.iter().zip(sig.param_offsets()) {
            evals.extend(self.gen_expr(&arg.expr)?);
            let r = reg(&arg.expr)?;
            let ty = arg.ty.need("argument")?;
            stores.push(if ty.is_array() {
                Insn::COPY(Reg::SP, offset, r, ty.size())
            } else {
                Insn::STORE(r, Reg::SP, offset)
            });
        }
        Ok(chain!(evals, stores, [Insn::CALL(Label::new(&id.name))]).collect())
    }

    /// Leave the address of `array[index]` in `dst`.
    fn gen_cell_addr(
        &mut self,
        dst: Reg,
        array: &Expr,
        index: &Expr,
    ) -> Result<Vec<Insn>, Error> {
        let (elem, count) = match type_of(array)? {
            SemanticType::Array(elem, count) => (elem.size(), *count),
            other => return Err(Error::internal(format!("indexing a {}", other))),
        };
        let (base, idx) = (reg(array)?, reg(index)?);
        Ok(chain!(
            self.gen_expr(array)?,
            self.gen_expr(index)?,
            [Insn::BOUNDS(idx, count)],
            (elem != 1).then_some(Insn::CALCI(ALU::MUL, idx, idx, elem as i64)),
            [Insn::CALC(ALU::ADD, dst, base, idx)],
        )
        .collect())
    }

    /// Compute the value of `expr` into its own operand.
    pub(super) fn gen_expr(&mut self, expr: &Expr) -> Result<Vec<Insn>, Error> {
        let r = reg(expr)?;
        match &expr.kind {
            ExprKind::Int(val) => Ok(vec![Insn::CONST(r, *val)]),
            ExprKind::Bool(val) => Ok(vec![Insn::CONST(r, *val as i64)]),

            ExprKind::Id(id) => {
                let (offset, ty) = self.slot(id)?;
                match ty {
                    SemanticType::Array(..) => Ok(vec![Insn::LEA(r, Reg::FP, offset)]),
                    SemanticType::Int | SemanticType::Bool => {
                        Ok(vec![Insn::LOAD(r, Reg::FP, offset)])
                    }
                    other => Err(Error::internal(format!(
                        "'{}' of type {} used as a value",
                        id.name, other
                    ))),
                }
            }

            ExprKind::ArrayCell(array, index) => {
                let load = type_of(expr)?.is_scalar().then_some(Insn::LOAD(r, r, 0));
                Ok(chain!(self.gen_cell_addr(r, array, index)?, load).collect())
            }

            ExprKind::Unary(UnaryOp::Neg, operand) => Ok(chain!(
                self.gen_expr(operand)?,
                [Insn::NEG(r, reg(operand)?)],
            )
            .collect()),

            ExprKind::Unary(UnaryOp::Not, _) => self.gen_not(expr),

            ExprKind::Binary(BinaryOp::And | BinaryOp::Or, ..) => self.gen_flag(expr),

            ExprKind::Binary(op, lhs, rhs) => {
                let ty = type_of(lhs)?;
                if ty.is_array() {
                    // element-wise equality of two blocks
                    return Ok(chain!(
                        self.gen_expr(lhs)?,
                        self.gen_expr(rhs)?,
                        [Insn::BLKEQ(r, reg(lhs)?, reg(rhs)?, ty.size())],
                        (*op == BinaryOp::Ne).then_some(Insn::NOT(r, r)),
                    )
                    .collect());
                }
                let alu = op
                    .alu()
                    .ok_or_else(|| Error::internal(format!("no machine op for {}", op)))?;
                match &rhs.kind {
                    ExprKind::Int(imm) => Ok(chain!(
                        self.gen_expr(lhs)?,
                        [Insn::CALCI(alu, r, reg(lhs)?, *imm)],
                    )
                    .collect()),
                    _ => Ok(chain!(
                        self.gen_expr(lhs)?,
                        self.gen_expr(rhs)?,
                        [Insn::CALC(alu, r, reg(lhs)?, reg(rhs)?)],
                    )
                    .collect()),
                }
            }

            ExprKind::Call(callee, args) => Ok(chain!(
                self.gen_call(callee, args)?,
                [Insn::MOV(r, Reg::RV)],
            )
            .collect()),
        }
    }
}
