use crate::ast::{
    Argument, BinaryOp, Decor, Expr, ExprKind, FuncDecl, Id, Program, Stmt,
    StmtKind, TypeAst, TypeAstKind, UnaryOp, VarDecl,
};
use crate::error::Error;
use crate::eval::symbols::{SymbolKind, SymbolTable};
use crate::eval::types::{FuncType, SemanticType};
use crate::util::visit::{walk_argument, walk_expr, walk_stmt, walk_type_ast, VisitMut};

/// Assign a semantic type to every declaration, type, argument and expression.
///
/// Stops at the first ill-typed construct. Every signature is registered
/// before any body is checked.
pub fn typecheck(program: &mut Program, table: &mut SymbolTable) -> Result<(), Error> {
    let mut checker = Checker { table, ret: None };
    for func in program.funcs.iter_mut() {
        checker.signature(func)?;
    }
    checker.visit_program(program)?;
    tracing::debug!("typechecked {} functions", program.funcs.len());
    Ok(())
}

struct Checker<'t> {
    table: &'t mut SymbolTable,
    ret: Option<SemanticType>,
}

fn type_of(expr: &Expr) -> Result<&SemanticType, Error> {
    expr.ty.need(expr.name())
}

impl<'t> Checker<'t> {
    fn signature(&mut self, func: &mut FuncDecl) -> Result<(), Error> {
        let mut params = Vec::new();
        for param in func.params.iter_mut() {
            let ty = self.value_decl(&mut param.id, &mut param.type_ast, &mut param.ty)?;
            params.push(ty);
        }

        self.visit_type_ast(&mut func.ret)?;
        let ret = func.ret.ty.need("return type")?.clone();
        if ret.is_array() {
            return Err(Error::ty(
                format!("function '{}' cannot return array type {}", func.id.name, ret),
                func.ret.span,
            ));
        }

        let ty = SemanticType::Func(FuncType::new(params, ret));
        tracing::trace!("signature {}: {}", func.id.name, ty);
        let sym = *func.id.sym.need(&func.id.name)?;
        self.table.symbol_mut(sym).ty.set(ty.clone(), &func.id.name)?;
        func.id.ty.set(ty.clone(), &func.id.name)?;
        func.ty.set(ty, &func.id.name)
    }

    /// Type a parameter or variable declaration from its written type.
    fn value_decl(
        &mut self,
        id: &mut Id,
        type_ast: &mut TypeAst,
        slot: &mut Decor<SemanticType>,
    ) -> Result<SemanticType, Error> {
        self.visit_type_ast(type_ast)?;
        let ty = type_ast.ty.need("declared type")?.clone();
        if !ty.is_value() {
            return Err(Error::ty(
                format!("'{}' cannot have type {}", id.name, ty),
                type_ast.span,
            ));
        }
        let sym = *id.sym.need(&id.name)?;
        self.table.symbol_mut(sym).ty.set(ty.clone(), &id.name)?;
        id.ty.set(ty.clone(), &id.name)?;
        slot.set(ty.clone(), &id.name)?;
        Ok(ty)
    }

    fn expr_type(&self, expr: &Expr) -> Result<SemanticType, Error> {
        match &expr.kind {
            ExprKind::Int(_) => Ok(SemanticType::Int),
            ExprKind::Bool(_) => Ok(SemanticType::Bool),
            ExprKind::Id(id) => Ok(id.ty.need(&id.name)?.clone()),

            ExprKind::ArrayCell(array, index) => {
                let elem = match type_of(array)? {
                    SemanticType::Array(elem, _) => elem.as_ref().clone(),
                    other => {
                        return Err(Error::ty(
                            format!("not an array: indexed value has type {}", other),
                            array.span,
                        ))
                    }
                };
                match type_of(index)? {
                    SemanticType::Int => Ok(elem),
                    other => Err(Error::ty(
                        format!("index must be int, found {}", other),
                        index.span,
                    )),
                }
            }

            ExprKind::Unary(op, operand) => {
                let ty = type_of(operand)?;
                let want = match op {
                    UnaryOp::Not => SemanticType::Bool,
                    UnaryOp::Neg => SemanticType::Int,
                };
                if *ty != want {
                    return Err(Error::ty(
                        format!("operator {} expects {}, found {}", op, want, ty),
                        expr.span,
                    ));
                }
                Ok(want)
            }

            ExprKind::Binary(op, lhs, rhs) => {
                let (lt, rt) = (type_of(lhs)?, type_of(rhs)?);
                binary_type(*op, lt, rt).ok_or_else(|| {
                    Error::ty(
                        format!("operator {} cannot be applied to {} and {}", op, lt, rt),
                        expr.span,
                    )
                })
            }

            ExprKind::Call(callee, args) => {
                let ty = type_of(callee)?;
                let func = ty.as_func().ok_or_else(|| {
                    Error::ty(format!("called value has type {}, not a function", ty), callee.span)
                })?;
                if args.len() != func.params.len() {
                    return Err(Error::ty(
                        format!(
                            "call expects {} arguments, found {}",
                            func.params.len(),
                            args.len()
                        ),
                        expr.span,
                    ));
                }
                for (n, (arg, param)) in args.iter().zip(func.params.iter()).enumerate() {
                    let found = arg.ty.need("argument")?;
                    if found != param {
                        return Err(Error::ty(
                            format!(
                                "argument {} of call expects {}, found {}",
                                n + 1,
                                param,
                                found
                            ),
                            expr.span,
                        ));
                    }
                }
                Ok(func.ret.as_ref().clone())
            }
        }
    }

    fn check_stmt(&self, stmt: &Stmt) -> Result<(), Error> {
        match &stmt.kind {
            StmtKind::Print(expr) => {
                let ty = type_of(expr)?;
                if !ty.is_scalar() {
                    return Err(Error::ty(
                        format!("print expects int or bool, found {}", ty),
                        stmt.span,
                    ));
                }
            }

            StmtKind::Assign(lhs, rhs) => {
                self.check_target(lhs)?;
                let (lt, rt) = (type_of(lhs)?, type_of(rhs)?);
                if lt != rt {
                    return Err(Error::ty(
                        format!("cannot assign {} to {}", rt, lt),
                        stmt.span,
                    ));
                }
            }

            StmtKind::If(cond, ..) | StmtKind::While(cond, _) => {
                let ty = type_of(cond)?;
                if *ty != SemanticType::Bool {
                    return Err(Error::ty(
                        format!("condition must be bool, found {}", ty),
                        cond.span,
                    ));
                }
            }

            StmtKind::Return(expr) => {
                let ret = self
                    .ret
                    .as_ref()
                    .ok_or_else(|| Error::internal("return outside of a function"))?;
                match expr {
                    Some(expr) => {
                        let ty = type_of(expr)?;
                        if ty != ret {
                            return Err(Error::ty(
                                format!("function returns {}, found {}", ret, ty),
                                stmt.span,
                            ));
                        }
                    }
                    None if *ret != SemanticType::Void => {
                        return Err(Error::ty(
                            format!("missing return value of type {}", ret),
                            stmt.span,
                        ));
                    }
                    None => {}
                }
            }

            StmtKind::Call(_) | StmtKind::Compound(_) => {}
        }
        Ok(())
    }

    /// Only variables, parameters and array cells can be assigned.
    fn check_target(&self, lhs: &Expr) -> Result<(), Error> {
        match &lhs.kind {
            ExprKind::Id(id) => {
                let sym = self.table.symbol(*id.sym.need(&id.name)?);
                match sym.kind {
                    SymbolKind::Param | SymbolKind::Var => Ok(()),
                    SymbolKind::Func => Err(Error::ty(
                        format!("cannot assign to function '{}'", id.name),
                        lhs.span,
                    )),
                }
            }
            ExprKind::ArrayCell(..) => Ok(()),
            _ => Err(Error::ty(
                format!("{} cannot be assigned to", lhs.name()),
                lhs.span,
            )),
        }
    }
}

fn binary_type(op: BinaryOp, lt: &SemanticType, rt: &SemanticType) -> Option<SemanticType> {
    let both = |ty: SemanticType| *lt == ty && *rt == ty;
    if op.is_arith() {
        both(SemanticType::Int).then_some(SemanticType::Int)
    } else if op.is_logical() {
        both(SemanticType::Bool).then_some(SemanticType::Bool)
    } else if op.is_equality() {
        (lt == rt && lt.is_value()).then_some(SemanticType::Bool)
    } else {
        (lt == rt && lt.is_scalar()).then_some(SemanticType::Bool)
    }
}

impl<'t> VisitMut for Checker<'t> {
    fn visit_func_decl(&mut self, func: &mut FuncDecl) -> Result<(), Error> {
        let ty = func.ty.need(&func.id.name)?;
        let ret = ty
            .as_func()
            .map(|func| func.ret.as_ref().clone())
            .ok_or_else(|| Error::internal(format!("'{}' has no signature", func.id.name)))?;
        self.ret = Some(ret);
        self.visit_compound(&mut func.body)?;
        self.ret = None;
        Ok(())
    }

    fn visit_var_decl(&mut self, var: &mut VarDecl) -> Result<(), Error> {
        self.value_decl(&mut var.id, &mut var.type_ast, &mut var.ty)?;
        Ok(())
    }

    fn visit_type_ast(&mut self, ty: &mut TypeAst) -> Result<(), Error> {
        walk_type_ast(self, ty)?;
        let sem = match &ty.kind {
            TypeAstKind::Int => SemanticType::Int,
            TypeAstKind::Bool => SemanticType::Bool,
            TypeAstKind::Void => SemanticType::Void,
            TypeAstKind::Array(count, elem) => {
                let elem_ty = elem.ty.need("element type")?.clone();
                if !elem_ty.is_value() {
                    return Err(Error::ty(
                        format!("array element type cannot be {}", elem_ty),
                        elem.span,
                    ));
                }
                let array = SemanticType::Array(Box::new(elem_ty), *count);
                if array.checked_size().is_none() {
                    return Err(Error::ty(format!("array type {} is too large", array), ty.span));
                }
                array
            }
        };
        ty.ty.set(sem, "type")
    }

    fn visit_stmt(&mut self, stmt: &mut Stmt) -> Result<(), Error> {
        walk_stmt(self, stmt)?;
        self.check_stmt(stmt)
    }

    fn visit_expr(&mut self, expr: &mut Expr) -> Result<(), Error> {
        walk_expr(self, expr)?;
        let ty = self.expr_type(expr)?;
        expr.ty.set(ty, expr.name())
    }

    fn visit_argument(&mut self, arg: &mut Argument) -> Result<(), Error> {
        walk_argument(self, arg)?;
        let ty = arg.expr.ty.need("argument")?.clone();
        arg.ty.set(ty, "argument")
    }

    fn visit_id(&mut self, id: &mut Id) -> Result<(), Error> {
        let sym = self.table.symbol(*id.sym.need(&id.name)?);
        let ty = sym.ty.need(&sym.name)?.clone();
        id.ty.set(ty, &id.name)
    }
}
