use crate::ast::{FuncDecl, Id, ParamDecl, Program, VarDecl};
use crate::error::Error;
use crate::eval::symbols::SymbolTable;
use crate::eval::types::SemanticType;
use crate::util::visit::{walk_compound, walk_program, VisitMut};

/// Lay out the frame of every function.
///
/// Parameters take the low offsets in declaration order, then every variable
/// of every nested block gets its own slot in depth-first order. No slot is
/// reused, so the frame size is the sum of all parameter and variable sizes.
pub fn assign_offsets(program: &mut Program, table: &mut SymbolTable) -> Result<(), Error> {
    let mut layout = Layout { table, next: 0 };
    layout.visit_program(program)?;
    tracing::debug!("laid out {} frames", program.funcs.len());
    Ok(())
}

struct Layout<'t> {
    table: &'t mut SymbolTable,
    next: i64,
}

impl<'t> Layout<'t> {
    fn place(&mut self, id: &Id) -> Result<(), Error> {
        let sym = self.table.symbol_mut(*id.sym.need(&id.name)?);
        let size = sym.ty.need(&id.name)?.size();
        let next = i64::try_from(size)
            .ok()
            .and_then(|size| self.next.checked_add(size))
            .ok_or_else(|| Error::ty(format!("'{}' does not fit in the frame", id.name), id.span))?;
        sym.offset.set(self.next, &id.name)?;
        tracing::trace!("{} at fp{:+} ({} units)", id.name, self.next, size);
        self.next = next;
        Ok(())
    }
}

impl<'t> VisitMut for Layout<'t> {
    fn visit_program(&mut self, program: &mut Program) -> Result<(), Error> {
        for func in program.funcs.iter() {
            let sym = *func.id.sym.need(&func.id.name)?;
            self.table.symbol_mut(sym).offset.set(0, &func.id.name)?;
        }
        walk_program(self, program)
    }

    fn visit_func_decl(&mut self, func: &mut FuncDecl) -> Result<(), Error> {
        self.next = 0;
        for param in func.params.iter_mut() {
            self.visit_param_decl(param)?;
        }
        let param_size = self.next as usize;
        walk_compound(self, &mut func.body)?;
        let frame_size = self.next as usize;

        let sym = *func.id.sym.need(&func.id.name)?;
        for ty in [
            func.ty.need_mut(&func.id.name)?,
            func.id.ty.need_mut(&func.id.name)?,
        ] {
            if let SemanticType::Func(sig) = ty {
                sig.param_size = param_size;
                sig.frame_size = frame_size;
            }
        }
        let sig = self.table.func_type_mut(sym)?;
        sig.param_size = param_size;
        sig.frame_size = frame_size;

        tracing::debug!(
            "frame of {}: {} param units, {} total",
            func.id.name,
            param_size,
            frame_size
        );
        Ok(())
    }

    fn visit_param_decl(&mut self, param: &mut ParamDecl) -> Result<(), Error> {
        self.place(&param.id)
    }

    fn visit_var_decl(&mut self, var: &mut VarDecl) -> Result<(), Error> {
        self.place(&var.id)
    }
}
