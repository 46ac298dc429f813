use crate::ast::Program;
use crate::eval::symbols::SymbolTable;
use arch::Insn;
use color_print::cprintln;

/// Plain listing, one instruction per line.
pub fn listing(code: &[Insn]) -> String {
    code.iter().map(|insn| format!("{}\n", insn)).collect()
}

pub fn print_listing(code: &[Insn]) {
    for (pc, insn) in code.iter().enumerate() {
        match insn {
            Insn::LABEL(_) => cprintln!("|        {}", insn.cformat()),
            _ => cprintln!("| <dim>{:>6}</> {}", pc, insn.cformat()),
        }
    }
}

/// Signature and frame layout of every function.
pub fn print_frames(program: &Program, table: &SymbolTable) {
    println!("+-[Frames]-+---------------------------------------------------------------------");
    for func in program.funcs.iter() {
        let Some(sym) = func.id.sym.get() else {
            continue;
        };
        let symbol = table.symbol(*sym);
        match symbol.ty.get() {
            Some(ty) => cprintln!("+----------+ <green>{}</green> : {}", func.id.name, ty),
            None => cprintln!("+----------+ <green>{}</green>", func.id.name),
        }
        if let Ok(sig) = table.func_type(*sym) {
            cprintln!(
                "|            params <b>{}</>, frame <b>{}</>",
                sig.param_size,
                sig.frame_size
            );
        }
        let mut slots: Vec<_> = table
            .symbols()
            .filter(|(_, s)| {
                s.offset.is_set() && func.scope.get().is_some_and(|scope| {
                    table.ancestors(s.scope).any(|id| id == *scope)
                })
            })
            .collect();
        slots.sort_by_key(|(_, s)| s.offset.get().copied());
        for (_, s) in slots {
            let offset = s.offset.get().copied().unwrap_or_default();
            let ty = s.ty.get().map(|ty| ty.to_string()).unwrap_or_default();
            cprintln!("| fp{:<+4} : <m>{}</m> {}", offset, s.name, ty);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arch::{Label, Reg};

    #[test]
    fn plain_listing() {
        let code = vec![
            Insn::LABEL(Label::new("main")),
            Insn::ENTER(0),
            Insn::RET(0),
        ];
        assert_eq!(listing(&code), "main:\n    enter  0\n    ret    0\n");
        assert!(!listing(&[Insn::CONST(Reg::R(0), 1)]).contains(':'));
    }
}
