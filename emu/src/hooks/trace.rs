use arch::Insn;
use color_print::cprintln;

use super::Hook;
use crate::model::State;

pub struct Trace;

impl Hook for Trace {
    fn init(&mut self, _state: &State) {
        println!(" * Trace");
    }

    fn exec(&mut self, time: u64, pc: usize, insn: &Insn, state: &State) {
        if insn.is_marker() {
            return;
        }
        cprintln!(
            "<dim>[{:0>5}]</> {:0>4} {:<2}{}",
            time,
            pc,
            state.depth(),
            insn.cformat()
        );
    }
}
