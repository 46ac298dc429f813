use crate::ast::{CompoundStmt, Expr, ExprKind, FuncDecl, Id, ParamDecl, Program, VarDecl};
use crate::error::Error;
use crate::eval::symbols::{ScopeId, ScopeKind, SymbolKind, SymbolTable};
use crate::util::visit::{walk_compound, walk_expr, VisitMut};

/// Create every scope of `program` and resolve every identifier.
///
/// All function names are declared before any body is visited, so a call may
/// precede the callee's declaration.
pub fn bind(program: &mut Program) -> Result<SymbolTable, Error> {
    let mut table = SymbolTable::new(program.span);
    let global = table.global();
    for func in program.funcs.iter_mut() {
        let sym = table.declare(global, &func.id.name, SymbolKind::Func, func.id.span)?;
        func.id.sym.set(sym, "function name")?;
    }

    let mut binder = Binder {
        table: &mut table,
        scopes: vec![global],
    };
    binder.visit_program(program)?;

    tracing::debug!(
        "bound {} scopes, {} symbols",
        table.scopes().count(),
        table.symbols().count()
    );
    Ok(table)
}

struct Binder<'t> {
    table: &'t mut SymbolTable,
    scopes: Vec<ScopeId>,
}

impl<'t> Binder<'t> {
    fn current(&self) -> Result<ScopeId, Error> {
        self.scopes
            .last()
            .copied()
            .ok_or_else(|| Error::internal("binder left the global scope"))
    }

    fn declare(&mut self, id: &mut Id, kind: SymbolKind) -> Result<(), Error> {
        let scope = self.current()?;
        let sym = self.table.declare(scope, &id.name, kind, id.span)?;
        id.sym.set(sym, &id.name)
    }
}

impl<'t> VisitMut for Binder<'t> {
    fn visit_func_decl(&mut self, func: &mut FuncDecl) -> Result<(), Error> {
        let parent = self.current()?;
        let scope = self.table.new_scope(ScopeKind::Func, parent, func.span);
        func.scope.set(scope, "function scope")?;
        self.scopes.push(scope);
        for param in func.params.iter_mut() {
            self.visit_param_decl(param)?;
        }
        self.visit_compound(&mut func.body)?;
        self.scopes.pop();
        Ok(())
    }

    fn visit_param_decl(&mut self, param: &mut ParamDecl) -> Result<(), Error> {
        self.declare(&mut param.id, SymbolKind::Param)
    }

    fn visit_var_decl(&mut self, var: &mut VarDecl) -> Result<(), Error> {
        self.declare(&mut var.id, SymbolKind::Var)
    }

    fn visit_compound(&mut self, block: &mut CompoundStmt) -> Result<(), Error> {
        let parent = self.current()?;
        let scope = self.table.new_scope(ScopeKind::Local, parent, block.span);
        block.scope.set(scope, "block scope")?;
        self.scopes.push(scope);
        walk_compound(self, block)?;
        self.scopes.pop();
        Ok(())
    }

    fn visit_expr(&mut self, expr: &mut Expr) -> Result<(), Error> {
        match &mut expr.kind {
            ExprKind::Id(id) => {
                let scope = self.current()?;
                match self.table.lookup(scope, &id.name) {
                    Some(sym) => id.sym.set(sym, &id.name),
                    None => Err(Error::name(
                        format!("'{}' is not declared", id.name),
                        id.span,
                    )),
                }
            }
            _ => walk_expr(self, expr),
        }
    }
}
