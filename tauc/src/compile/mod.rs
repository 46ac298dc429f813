pub mod cond;
pub mod func;

use crate::ast::Program;
use crate::error::Error;
use crate::eval::symbols::SymbolTable;
use crate::eval::types::SemanticType;
use arch::{Insn, Label, Reg};
use func::FuncCompiler;

/// Name of the function the entry stub calls.
pub const MAIN: &str = "main";

/// Translate a fully decorated program into one linear instruction stream.
///
/// The stream starts with the entry stub (when `main` exists) followed by
/// every function in declaration order.
pub fn codegen(program: &Program, table: &SymbolTable) -> Result<Vec<Insn>, Error> {
    let mut code = entry(program, table)?;
    for func in program.funcs.iter() {
        let insns = FuncCompiler::new(table, func)?.compile(func)?;
        tracing::trace!("{}: {} instructions", func.id.name, insns.len());
        code.extend(insns);
    }
    tracing::debug!("generated {} instructions", code.len());
    Ok(code)
}

/// Load the program arguments into `main`'s scalar parameters and call it.
fn entry(program: &Program, table: &SymbolTable) -> Result<Vec<Insn>, Error> {
    let Some(main) = program.funcs.iter().find(|func| func.id.name == MAIN) else {
        tracing::debug!("no '{}', emitting no entry stub", MAIN);
        return Ok(vec![]);
    };
    let sig = table.func_type(*main.id.sym.need(MAIN)?)?;

    let mut code = vec![Insn::LABEL(Label::new(emu::ENTRY))];
    for (n, (ty, offset)) in sig.params.iter().zip(sig.param_offsets()).enumerate() {
        if ty.is_scalar() {
            code.push(Insn::ARG(Reg::R(n), n));
            code.push(Insn::STORE(Reg::R(n), Reg::SP, offset));
        }
    }
    code.push(Insn::CALL(Label::new(MAIN)));
    if *sig.ret == SemanticType::Void {
        // a void main exits with 0
        code.push(Insn::CONST(Reg::RV, 0));
    }
    code.push(Insn::HALT());
    Ok(code)
}
