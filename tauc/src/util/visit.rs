//! Canonical traversal of the syntax tree.
//!
//! Every pass that decorates the tree implements [`VisitMut`] and overrides
//! only the node families it cares about; the `walk_*` functions encode the
//! child order shared by all of them. [`preorder`] flattens a tree in the
//! same order for read-only consumers.

use crate::ast::{
    Argument, CompoundStmt, Expr, ExprKind, FuncDecl, Id, ParamDecl, Program, Stmt, StmtKind,
    TypeAst, TypeAstKind, VarDecl,
};
use crate::error::Error;
use crate::grammer::token::Span;

pub trait VisitMut {
    fn visit_program(&mut self, program: &mut Program) -> Result<(), Error> {
        walk_program(self, program)
    }
    fn visit_func_decl(&mut self, func: &mut FuncDecl) -> Result<(), Error> {
        walk_func_decl(self, func)
    }
    fn visit_param_decl(&mut self, param: &mut ParamDecl) -> Result<(), Error> {
        walk_param_decl(self, param)
    }
    fn visit_var_decl(&mut self, var: &mut VarDecl) -> Result<(), Error> {
        walk_var_decl(self, var)
    }
    fn visit_type_ast(&mut self, ty: &mut TypeAst) -> Result<(), Error> {
        walk_type_ast(self, ty)
    }
    fn visit_compound(&mut self, block: &mut CompoundStmt) -> Result<(), Error> {
        walk_compound(self, block)
    }
    fn visit_stmt(&mut self, stmt: &mut Stmt) -> Result<(), Error> {
        walk_stmt(self, stmt)
    }
    fn visit_expr(&mut self, expr: &mut Expr) -> Result<(), Error> {
        walk_expr(self, expr)
    }
    fn visit_argument(&mut self, arg: &mut Argument) -> Result<(), Error> {
        walk_argument(self, arg)
    }
    fn visit_id(&mut self, _id: &mut Id) -> Result<(), Error> {
        Ok(())
    }
}

pub fn walk_program<V: VisitMut + ?Sized>(v: &mut V, program: &mut Program) -> Result<(), Error> {
    for func in program.funcs.iter_mut() {
        v.visit_func_decl(func)?;
    }
    Ok(())
}

pub fn walk_func_decl<V: VisitMut + ?Sized>(v: &mut V, func: &mut FuncDecl) -> Result<(), Error> {
    v.visit_id(&mut func.id)?;
    for param in func.params.iter_mut() {
        v.visit_param_decl(param)?;
    }
    v.visit_type_ast(&mut func.ret)?;
    v.visit_compound(&mut func.body)
}

pub fn walk_param_decl<V: VisitMut + ?Sized>(v: &mut V, param: &mut ParamDecl) -> Result<(), Error> {
    v.visit_id(&mut param.id)?;
    v.visit_type_ast(&mut param.type_ast)
}

pub fn walk_var_decl<V: VisitMut + ?Sized>(v: &mut V, var: &mut VarDecl) -> Result<(), Error> {
    v.visit_id(&mut var.id)?;
    v.visit_type_ast(&mut var.type_ast)
}

pub fn walk_type_ast<V: VisitMut + ?Sized>(v: &mut V, ty: &mut TypeAst) -> Result<(), Error> {
    match &mut ty.kind {
        TypeAstKind::Array(_, elem) => v.visit_type_ast(elem),
        TypeAstKind::Int | TypeAstKind::Bool | TypeAstKind::Void => Ok(()),
    }
}

pub fn walk_compound<V: VisitMut + ?Sized>(
    v: &mut V,
    block: &mut CompoundStmt,
) -> Result<(), Error> {
    for var in block.decls.iter_mut() {
        v.visit_var_decl(var)?;
    }
    for stmt in block.stmts.iter_mut() {
        v.visit_stmt(stmt)?;
    }
    Ok(())
}

pub fn walk_stmt<V: VisitMut + ?Sized>(v: &mut V, stmt: &mut Stmt) -> Result<(), Error> {
    match &mut stmt.kind {
        StmtKind::Print(expr) | StmtKind::Call(expr) => v.visit_expr(expr),
        StmtKind::Compound(block) => v.visit_compound(block),
        StmtKind::Assign(lhs, rhs) => {
            v.visit_expr(lhs)?;
            v.visit_expr(rhs)
        }
        StmtKind::If(cond, then, other) => {
            v.visit_expr(cond)?;
            v.visit_compound(then)?;
            match other {
                Some(other) => v.visit_compound(other),
                None => Ok(()),
            }
        }
        StmtKind::While(cond, body) => {
            v.visit_expr(cond)?;
            v.visit_compound(body)
        }
        StmtKind::Return(expr) => match expr {
            Some(expr) => v.visit_expr(expr),
            None => Ok(()),
        },
    }
}

pub fn walk_expr<V: VisitMut + ?Sized>(v: &mut V, expr: &mut Expr) -> Result<(), Error> {
    match &mut expr.kind {
        ExprKind::Binary(_, lhs, rhs) => {
            v.visit_expr(lhs)?;
            v.visit_expr(rhs)
        }
        ExprKind::Unary(_, operand) => v.visit_expr(operand),
        ExprKind::ArrayCell(array, index) => {
            v.visit_expr(array)?;
            v.visit_expr(index)
        }
        ExprKind::Call(callee, args) => {
            v.visit_expr(callee)?;
            for arg in args.iter_mut() {
                v.visit_argument(arg)?;
            }
            Ok(())
        }
        ExprKind::Id(id) => v.visit_id(id),
        ExprKind::Int(_) | ExprKind::Bool(_) => Ok(()),
    }
}

pub fn walk_argument<V: VisitMut + ?Sized>(v: &mut V, arg: &mut Argument) -> Result<(), Error> {
    v.visit_expr(&mut arg.expr)
}

// ----------------------------------------------------------------------------
// Read-only traversal
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Program(&'a Program),
    FuncDecl(&'a FuncDecl),
    ParamDecl(&'a ParamDecl),
    VarDecl(&'a VarDecl),
    TypeAst(&'a TypeAst),
    Compound(&'a CompoundStmt),
    Stmt(&'a Stmt),
    Expr(&'a Expr),
    Argument(&'a Argument),
    Id(&'a Id),
}

impl<'a> Node<'a> {
    pub fn name(&self) -> &'static str {
        match self {
            Node::Program(_) => "Program",
            Node::FuncDecl(_) => "FuncDecl",
            Node::ParamDecl(_) => "ParamDecl",
            Node::VarDecl(_) => "VarDecl",
            Node::TypeAst(ty) => match ty.kind {
                TypeAstKind::Int => "IntTypeAST",
                TypeAstKind::Bool => "BoolTypeAST",
                TypeAstKind::Void => "VoidTypeAST",
                TypeAstKind::Array(..) => "ArrayTypeAST",
            },
            Node::Compound(_) => "CompoundStmt",
            Node::Stmt(stmt) => stmt.name(),
            Node::Expr(expr) => expr.name(),
            Node::Argument(_) => "Argument",
            Node::Id(_) => "Id",
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Node::Program(n) => n.span,
            Node::FuncDecl(n) => n.span,
            Node::ParamDecl(n) => n.span,
            Node::VarDecl(n) => n.span,
            Node::TypeAst(n) => n.span,
            Node::Compound(n) => n.span,
            Node::Stmt(n) => n.span,
            Node::Expr(n) => n.span,
            Node::Argument(n) => n.span,
            Node::Id(n) => n.span,
        }
    }
}

/// Every node of `program` in the order the `walk_*` functions visit them.
pub fn preorder(program: &Program) -> Vec<Node<'_>> {
    let mut nodes = Vec::new();
    push_program(&mut nodes, program);
    nodes
}

fn push_program<'a>(out: &mut Vec<Node<'a>>, program: &'a Program) {
    out.push(Node::Program(program));
    for func in &program.funcs {
        out.push(Node::FuncDecl(func));
        out.push(Node::Id(&func.id));
        for param in &func.params {
            out.push(Node::ParamDecl(param));
            out.push(Node::Id(&param.id));
            push_type(out, &param.type_ast);
        }
        push_type(out, &func.ret);
        push_compound(out, &func.body);
    }
}

fn push_type<'a>(out: &mut Vec<Node<'a>>, ty: &'a TypeAst) {
    out.push(Node::TypeAst(ty));
    if let TypeAstKind::Array(_, elem) = &ty.kind {
        push_type(out, elem);
    }
}

fn push_compound<'a>(out: &mut Vec<Node<'a>>, block: &'a CompoundStmt) {
    out.push(Node::Compound(block));
    for var in &block.decls {
        out.push(Node::VarDecl(var));
        out.push(Node::Id(&var.id));
        push_type(out, &var.type_ast);
    }
    for stmt in &block.stmts {
        push_stmt(out, stmt);
    }
}

fn push_stmt<'a>(out: &mut Vec<Node<'a>>, stmt: &'a Stmt) {
    out.push(Node::Stmt(stmt));
    match &stmt.kind {
        StmtKind::Print(expr) | StmtKind::Call(expr) => push_expr(out, expr),
        StmtKind::Compound(block) => push_compound(out, block),
        StmtKind::Assign(lhs, rhs) => {
            push_expr(out, lhs);
            push_expr(out, rhs);
        }
        StmtKind::If(cond, then, other) => {
            push_expr(out, cond);
            push_compound(out, then);
            if let Some(other) = other {
                push_compound(out, other);
            }
        }
        StmtKind::While(cond, body) => {
            push_expr(out, cond);
            push_compound(out, body);
        }
        StmtKind::Return(expr) => {
            if let Some(expr) = expr {
                push_expr(out, expr);
            }
        }
    }
}

fn push_expr<'a>(out: &mut Vec<Node<'a>>, expr: &'a Expr) {
    out.push(Node::Expr(expr));
    match &expr.kind {
        ExprKind::Binary(_, lhs, rhs) => {
            push_expr(out, lhs);
            push_expr(out, rhs);
        }
        ExprKind::Unary(_, operand) => push_expr(out, operand),
        ExprKind::ArrayCell(array, index) => {
            push_expr(out, array);
            push_expr(out, index);
        }
        ExprKind::Call(callee, args) => {
            push_expr(out, callee);
            for arg in args {
                out.push(Node::Argument(arg));
                push_expr(out, &arg.expr);
            }
        }
        ExprKind::Id(id) => out.push(Node::Id(id)),
        ExprKind::Int(_) | ExprKind::Bool(_) => {}
    }
}
