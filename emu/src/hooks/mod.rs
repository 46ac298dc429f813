pub mod dump;
pub mod serial;
pub mod trace;

use arch::Insn;

use crate::model::State;

/// Side effects observed after every executed instruction.
pub trait Hook {
    fn init(&mut self, _state: &State) {}
    fn exec(&mut self, time: u64, pc: usize, insn: &Insn, state: &State);
}
