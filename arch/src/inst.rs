use crate::{alu::ALU, reg::Reg};

use color_print::cformat;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Branch target. Resolved to an instruction index when the program is linked.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Label(pub String);

impl Label {
    pub fn new(name: impl Into<String>) -> Self {
        Label(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Insn {
    LABEL(Label),
    NOP(),

    CONST(Reg, i64),
    MOV(Reg, Reg),
    LEA(Reg, Reg, i64),
    LOAD(Reg, Reg, i64),
    STORE(Reg, Reg, i64),
    COPY(Reg, i64, Reg, usize),

    CALC(ALU, Reg, Reg, Reg),
    CALCI(ALU, Reg, Reg, i64),
    NEG(Reg, Reg),
    NOT(Reg, Reg),
    BLKEQ(Reg, Reg, Reg, usize),
    BOUNDS(Reg, usize),

    JUMP(Label),
    IF(Reg, Label),
    IFNOT(Reg, Label),
    CALL(Label),
    ENTER(usize),
    RET(usize),

    ARG(Reg, usize),
    PRINT(Reg),
    PRINTB(Reg),
    HALT(),
}

impl Insn {
    /// Labels and no-ops occupy a slot in the stream but do no work.
    pub fn is_marker(&self) -> bool {
        matches!(self, Insn::LABEL(_) | Insn::NOP())
    }

    pub fn mnemonic(&self) -> String {
        match self {
            Insn::LABEL(_) => "label".to_string(),
            Insn::NOP() => "nop".to_string(),
            Insn::CONST(..) => "const".to_string(),
            Insn::MOV(..) => "mov".to_string(),
            Insn::LEA(..) => "lea".to_string(),
            Insn::LOAD(..) => "load".to_string(),
            Insn::STORE(..) => "store".to_string(),
            Insn::COPY(..) => "copy".to_string(),
            Insn::CALC(alu, ..) => alu.to_string(),
            Insn::CALCI(alu, ..) => format!("{}i", alu),
            Insn::NEG(..) => "neg".to_string(),
            Insn::NOT(..) => "not".to_string(),
            Insn::BLKEQ(..) => "blkeq".to_string(),
            Insn::BOUNDS(..) => "bounds".to_string(),
            Insn::JUMP(_) => "jump".to_string(),
            Insn::IF(..) => "if".to_string(),
            Insn::IFNOT(..) => "ifnot".to_string(),
            Insn::CALL(_) => "call".to_string(),
            Insn::ENTER(_) => "enter".to_string(),
            Insn::RET(_) => "ret".to_string(),
            Insn::ARG(..) => "arg".to_string(),
            Insn::PRINT(_) => "print".to_string(),
            Insn::PRINTB(_) => "printb".to_string(),
            Insn::HALT() => "halt".to_string(),
        }
    }

    fn operands(&self) -> Vec<String> {
        match self {
            Insn::LABEL(_) | Insn::NOP() | Insn::HALT() => vec![],
            Insn::CONST(rd, val) => vec![rd.to_string(), val.to_string()],
            Insn::MOV(rd, rs) | Insn::NEG(rd, rs) | Insn::NOT(rd, rs) => {
                vec![rd.to_string(), rs.to_string()]
            }
            Insn::LEA(rd, rs, off) | Insn::LOAD(rd, rs, off) | Insn::STORE(rd, rs, off) => {
                vec![rd.to_string(), format!("{}{:+}", rs, off)]
            }
            Insn::COPY(rd, off, rs, n) => {
                vec![format!("{}{:+}", rd, off), rs.to_string(), n.to_string()]
            }
            Insn::CALC(_, rd, rs1, rs2) => vec![rd.to_string(), rs1.to_string(), rs2.to_string()],
            Insn::CALCI(_, rd, rs, imm) => vec![rd.to_string(), rs.to_string(), imm.to_string()],
            Insn::BLKEQ(rd, rs1, rs2, n) => vec![
                rd.to_string(),
                rs1.to_string(),
                rs2.to_string(),
                n.to_string(),
            ],
            Insn::BOUNDS(rs, n) => vec![rs.to_string(), n.to_string()],
            Insn::JUMP(label) | Insn::CALL(label) => vec![label.to_string()],
            Insn::IF(rs, label) | Insn::IFNOT(rs, label) => vec![rs.to_string(), label.to_string()],
            Insn::ENTER(n) | Insn::RET(n) => vec![n.to_string()],
            Insn::ARG(rd, idx) => vec![rd.to_string(), idx.to_string()],
            Insn::PRINT(rs) | Insn::PRINTB(rs) => vec![rs.to_string()],
        }
    }
}

impl fmt::Display for Insn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Insn::LABEL(label) => write!(f, "{}:", label),
            _ => {
                let operands = self.operands();
                if operands.is_empty() {
                    write!(f, "    {}", self.mnemonic())
                } else {
                    write!(f, "    {:<7}{}", self.mnemonic(), operands.join(", "))
                }
            }
        }
    }
}

impl Insn {
    pub fn cformat(&self) -> String {
        macro_rules! ops {
            ($name:expr, $args:expr) => {
                cformat!("    <r>{:<7}</><b>{}</>", $name, $args)
            };
        }

        match self {
            Insn::LABEL(label) => cformat!("<m>{}</>:", label),
            Insn::CONST(rd, val) => cformat!("    <r>{:<7}</><b>{}, <y>{}</></>", "const", rd, val),
            Insn::JUMP(label) | Insn::CALL(label) => {
                cformat!("    <r>{:<7}</><m>{}</>", self.mnemonic(), label)
            }
            Insn::IF(rs, label) | Insn::IFNOT(rs, label) => {
                cformat!("    <r>{:<7}</><b>{}</>, <m>{}</>", self.mnemonic(), rs, label)
            }
            _ => ops!(self.mnemonic(), self.operands().join(", ")),
        }
    }
}
