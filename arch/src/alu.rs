use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ALU {
    ADD,
    SUB,
    MUL,
    DIV,
    MOD,
    EQ,
    NEQ,
    LT,
    LE,
    GT,
    GE,
}

macro_rules! boo {
    ($cond:expr) => {
        if $cond {
            1
        } else {
            0
        }
    };
}

/// Evaluate an ALU operation. `None` when the divisor of `div`/`mod` is zero.
pub fn valu(op: ALU, a: i64, b: i64) -> Option<i64> {
    use ALU::*;
    let val = match op {
        ADD => a.wrapping_add(b),
        SUB => a.wrapping_sub(b),
        MUL => a.wrapping_mul(b),
        DIV => (b != 0).then(|| a.wrapping_div(b))?,
        MOD => (b != 0).then(|| a.wrapping_rem(b))?,
        EQ => boo!(a == b),
        NEQ => boo!(a != b),
        LT => boo!(a < b),
        LE => boo!(a <= b),
        GT => boo!(a > b),
        GE => boo!(a >= b),
    };
    Some(val)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic() {
        assert_eq!(valu(ALU::ADD, 1, 2), Some(3));
        assert_eq!(valu(ALU::SUB, 1, 2), Some(-1));
        assert_eq!(valu(ALU::MUL, -3, 4), Some(-12));
        assert_eq!(valu(ALU::DIV, 7, 2), Some(3));
        assert_eq!(valu(ALU::MOD, -7, 2), Some(-1));
    }

    #[test]
    fn division_by_zero() {
        assert_eq!(valu(ALU::DIV, 1, 0), None);
        assert_eq!(valu(ALU::MOD, 1, 0), None);
    }

    #[test]
    fn comparisons() {
        assert_eq!(valu(ALU::EQ, 2, 2), Some(1));
        assert_eq!(valu(ALU::NEQ, 2, 2), Some(0));
        assert_eq!(valu(ALU::LE, 2, 2), Some(1));
        assert_eq!(valu(ALU::GT, 1, 2), Some(0));
    }

    #[test]
    fn names() {
        assert_eq!(ALU::NEQ.to_string(), "neq");
        assert_eq!("ge".parse::<ALU>(), Ok(ALU::GE));
    }
}
