pub mod alu;
pub mod inst;
pub mod reg;

pub use alu::ALU;
pub use inst::{Insn, Label};
pub use reg::Reg;
