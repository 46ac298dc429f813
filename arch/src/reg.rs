use serde::{Deserialize, Serialize};
use std::fmt;

/// Operand locations of the virtual machine.
///
/// `FP`, `SP` and `RV` are shared by every activation. `R(n)` is an operand
/// slot; each activation owns a fresh file of them, so values held in slots
/// survive calls made while they are live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Reg {
    FP,
    SP,
    RV,
    R(usize),
}

impl Reg {
    pub fn is_slot(&self) -> bool {
        matches!(self, Reg::R(_))
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reg::FP => write!(f, "fp"),
            Reg::SP => write!(f, "sp"),
            Reg::RV => write!(f, "rv"),
            Reg::R(n) => write!(f, "r{}", n),
        }
    }
}

#[test]
fn test() {
    assert_eq!(Reg::FP.to_string(), "fp");
    assert_eq!(Reg::R(12).to_string(), "r12");
    assert!(Reg::R(0).is_slot());
    assert!(!Reg::RV.is_slot());
}
