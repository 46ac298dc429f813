use arch::alu::{valu, ALU};
use arch::{Insn, Label, Reg};
use bimap::BiMap;

use crate::error::{Error, Fault};
use crate::hooks::Hook;

/// Label the virtual machine starts executing from.
pub const ENTRY: &str = "__start";

const MEM_LIMIT: i64 = 1 << 20;
const MAX_DEPTH: usize = 1 << 16;

pub struct State {
    pub pc: usize,
    pub fp: i64,
    pub sp: i64,
    pub rv: i64,
    pub output: Vec<String>,
    pub halted: bool,
    regs: Vec<Option<i64>>,
    mem: Vec<i64>,
    calls: Vec<Activation>,
    args: Vec<i64>,
}

/// Saved caller context of one live call.
struct Activation {
    ret: usize,
    fp: i64,
    regs: Vec<Option<i64>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub output: Vec<String>,
    pub exit: i64,
    pub steps: u64,
}

// Register and memory access
impl State {
    fn new(pc: usize, args: Vec<i64>) -> Self {
        State {
            pc,
            fp: 0,
            sp: 0,
            rv: 0,
            output: Vec::new(),
            halted: false,
            regs: Vec::new(),
            mem: Vec::new(),
            calls: Vec::new(),
            args,
        }
    }

    pub fn get(&self, reg: Reg) -> Result<i64, Fault> {
        match reg {
            Reg::FP => Ok(self.fp),
            Reg::SP => Ok(self.sp),
            Reg::RV => Ok(self.rv),
            Reg::R(n) => self
                .regs
                .get(n)
                .copied()
                .flatten()
                .ok_or(Fault::UnsetRegister(reg)),
        }
    }

    pub fn set(&mut self, reg: Reg, val: i64) {
        match reg {
            Reg::FP => self.fp = val,
            Reg::SP => self.sp = val,
            Reg::RV => self.rv = val,
            Reg::R(n) => {
                if self.regs.len() <= n {
                    self.regs.resize(n + 1, None);
                }
                self.regs[n] = Some(val);
            }
        }
    }

    fn addr(base: i64, off: i64) -> Result<usize, Fault> {
        let addr = base.checked_add(off).ok_or(Fault::BadAddress(base))?;
        if (0..MEM_LIMIT).contains(&addr) {
            Ok(addr as usize)
        } else {
            Err(Fault::BadAddress(addr))
        }
    }

    pub fn read(&self, base: i64, off: i64) -> Result<i64, Fault> {
        let addr = Self::addr(base, off)?;
        Ok(self.mem.get(addr).copied().unwrap_or(0))
    }

    pub fn write(&mut self, base: i64, off: i64, val: i64) -> Result<(), Fault> {
        let addr = Self::addr(base, off)?;
        if self.mem.len() <= addr {
            self.mem.resize(addr + 1, 0);
        }
        self.mem[addr] = val;
        Ok(())
    }

    /// Operand slots of the current activation that hold a value.
    pub fn slots(&self) -> impl Iterator<Item = (Reg, i64)> + '_ {
        self.regs
            .iter()
            .enumerate()
            .filter_map(|(n, val)| val.map(|val| (Reg::R(n), val)))
    }

    pub fn depth(&self) -> usize {
        self.calls.len()
    }
}

pub struct Vm {
    program: Vec<Insn>,
    labels: BiMap<Label, usize>,
    hooks: Vec<Box<dyn Hook>>,
    tmax: Option<u64>,
}

impl Vm {
    /// Link the labels of `program`.
    pub fn new(program: Vec<Insn>) -> Result<Self, Error> {
        let mut labels = BiMap::new();
        for (pc, insn) in program.iter().enumerate() {
            if let Insn::LABEL(label) = insn {
                if labels.contains_left(label) {
                    return Err(Error::DuplicateLabel(label.to_string()));
                }
                labels.insert(label.clone(), pc);
            }
        }
        Ok(Vm {
            program,
            labels,
            hooks: Vec::new(),
            tmax: None,
        })
    }

    pub fn hook(mut self, hook: Box<dyn Hook>) -> Self {
        self.hooks.push(hook);
        self
    }

    pub fn tmax(mut self, tmax: Option<u64>) -> Self {
        self.tmax = tmax;
        self
    }

    /// Nearest label at or before `pc`.
    pub fn locate(&self, pc: usize) -> Option<&Label> {
        (0..=pc).rev().find_map(|p| self.labels.get_by_right(&p))
    }

    fn resolve(&self, label: &Label) -> Result<usize, Fault> {
        self.labels
            .get_by_left(label)
            .copied()
            .ok_or_else(|| Fault::UndefinedLabel(label.to_string()))
    }

    fn fault(&self, pc: usize, fault: Fault) -> Error {
        let func = self
            .locate(pc)
            .map_or_else(|| "<unknown>".to_string(), |label| label.to_string());
        Error::Fault { func, pc, fault }
    }

    pub fn run(&mut self, args: &[i64]) -> Result<Outcome, Error> {
        let entry = self
            .labels
            .get_by_left(&Label::new(ENTRY))
            .copied()
            .ok_or_else(|| Error::UndefinedLabel(ENTRY.to_string()))?;

        let mut state = State::new(entry, args.to_vec());
        for hook in self.hooks.iter_mut() {
            hook.init(&state);
        }

        let mut time = 0u64;
        while !state.halted {
            if let Some(tmax) = self.tmax {
                if time >= tmax {
                    return Err(Error::StepLimit(tmax));
                }
            }

            let pc = state.pc;
            let Some(insn) = self.program.get(pc) else {
                return Err(self.fault(pc, Fault::PcOutOfRange));
            };
            if let Err(fault) = self.exec(&mut state, insn) {
                return Err(self.fault(pc, fault));
            }
            for hook in self.hooks.iter_mut() {
                hook.exec(time, pc, insn, &state);
            }
            time += 1;
        }

        Ok(Outcome {
            output: state.output,
            exit: state.rv,
            steps: time,
        })
    }

    fn exec(&self, state: &mut State, insn: &Insn) -> Result<(), Fault> {
        let mut next = state.pc + 1;
        match insn {
            Insn::LABEL(_) | Insn::NOP() => {}

            Insn::CONST(rd, val) => state.set(*rd, *val),
            Insn::MOV(rd, rs) => {
                let val = state.get(*rs)?;
                state.set(*rd, val);
            }
            Insn::LEA(rd, rs, off) => {
                let val = state.get(*rs)?.wrapping_add(*off);
                state.set(*rd, val);
            }
            Insn::LOAD(rd, rs, off) => {
                let base = state.get(*rs)?;
                let val = state.read(base, *off)?;
                state.set(*rd, val);
            }
            Insn::STORE(rv, rs, off) => {
                let val = state.get(*rv)?;
                let base = state.get(*rs)?;
                state.write(base, *off, val)?;
            }
            Insn::COPY(rd, off, rs, n) => {
                let dst = state.get(*rd)?;
                let src = state.get(*rs)?;
                let block = (0..*n as i64)
                    .map(|k| state.read(src, k))
                    .collect::<Result<Vec<_>, _>>()?;
                for (k, val) in block.into_iter().enumerate() {
                    state.write(dst, off + k as i64, val)?;
                }
            }

            Insn::CALC(alu, rd, rs1, rs2) => {
                let val = calc(*alu, state.get(*rs1)?, state.get(*rs2)?)?;
                state.set(*rd, val);
            }
            Insn::CALCI(alu, rd, rs, imm) => {
                let val = calc(*alu, state.get(*rs)?, *imm)?;
                state.set(*rd, val);
            }
            Insn::NEG(rd, rs) => {
                let val = state.get(*rs)?.wrapping_neg();
                state.set(*rd, val);
            }
            Insn::NOT(rd, rs) => {
                let val = if state.get(*rs)? == 0 { 1 } else { 0 };
                state.set(*rd, val);
            }
            Insn::BLKEQ(rd, rs1, rs2, n) => {
                let lhs = state.get(*rs1)?;
                let rhs = state.get(*rs2)?;
                let mut equal = true;
                for k in 0..*n as i64 {
                    if state.read(lhs, k)? != state.read(rhs, k)? {
                        equal = false;
                        break;
                    }
                }
                state.set(*rd, equal as i64);
            }
            Insn::BOUNDS(rs, n) => {
                let idx = state.get(*rs)?;
                if idx < 0 || idx >= *n as i64 {
                    return Err(Fault::OutOfBounds(idx, *n));
                }
            }

            Insn::JUMP(label) => next = self.resolve(label)?,
            Insn::IF(rs, label) => {
                if state.get(*rs)? != 0 {
                    next = self.resolve(label)?;
                }
            }
            Insn::IFNOT(rs, label) => {
                if state.get(*rs)? == 0 {
                    next = self.resolve(label)?;
                }
            }
            Insn::CALL(label) => {
                let target = self.resolve(label)?;
                if state.calls.len() >= MAX_DEPTH {
                    return Err(Fault::StackOverflow(MAX_DEPTH));
                }
                let regs = std::mem::take(&mut state.regs);
                state.calls.push(Activation {
                    ret: next,
                    fp: state.fp,
                    regs,
                });
                next = target;
            }
            Insn::ENTER(n) => {
                let sp = i64::try_from(*n)
                    .ok()
                    .and_then(|n| state.sp.checked_add(n))
                    .ok_or(Fault::BadAddress(state.sp))?;
                State::addr(sp, 0)?;
                state.fp = state.sp;
                state.sp = sp;
            }
            Insn::RET(n) => {
                let fp = state.fp;
                for k in 0..*n as i64 {
                    state.write(fp, k, 0)?;
                }
                let caller = state.calls.pop().ok_or(Fault::EmptyCallStack)?;
                state.sp = fp;
                state.fp = caller.fp;
                state.regs = caller.regs;
                next = caller.ret;
            }

            Insn::ARG(rd, idx) => {
                let val = state.args.get(*idx).copied().unwrap_or(0);
                state.set(*rd, val);
            }
            Insn::PRINT(rs) => {
                let val = state.get(*rs)?;
                state.output.push(val.to_string());
            }
            Insn::PRINTB(rs) => {
                let val = state.get(*rs)?;
                state.output.push(if val != 0 { "true" } else { "false" }.to_string());
            }
            Insn::HALT() => {
                state.halted = true;
                next = state.pc;
            }
        }
        state.pc = next;
        Ok(())
    }
}

fn calc(alu: ALU, lhs: i64, rhs: i64) -> Result<i64, Fault> {
    valu(alu, lhs, rhs).ok_or(Fault::DivisionByZero)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(name: &str) -> Label {
        Label::new(name)
    }

    fn run(program: Vec<Insn>, args: &[i64]) -> Result<Outcome, Error> {
        Vm::new(program)?.tmax(Some(10_000)).run(args)
    }

    #[test]
    fn print_and_halt() {
        let program = vec![
            Insn::LABEL(label(ENTRY)),
            Insn::CONST(Reg::R(0), 1),
            Insn::CONST(Reg::R(1), 2),
            Insn::CALC(ALU::ADD, Reg::R(2), Reg::R(0), Reg::R(1)),
            Insn::PRINT(Reg::R(2)),
            Insn::PRINTB(Reg::R(0)),
            Insn::HALT(),
        ];
        let outcome = run(program, &[]).unwrap();
        assert_eq!(outcome.output, vec!["3", "true"]);
        assert_eq!(outcome.exit, 0);
    }

    #[test]
    fn call_preserves_caller_slots() {
        // callee(x) returns x * 2 and clobbers its own r0
        let program = vec![
            Insn::LABEL(label(ENTRY)),
            Insn::CONST(Reg::R(0), 7),
            Insn::CONST(Reg::R(1), 21),
            Insn::STORE(Reg::R(1), Reg::SP, 0),
            Insn::CALL(label("double")),
            Insn::MOV(Reg::R(2), Reg::RV),
            Insn::PRINT(Reg::R(0)),
            Insn::PRINT(Reg::R(2)),
            Insn::HALT(),
            Insn::LABEL(label("double")),
            Insn::ENTER(1),
            Insn::LOAD(Reg::R(0), Reg::FP, 0),
            Insn::CALCI(ALU::MUL, Reg::R(0), Reg::R(0), 2),
            Insn::MOV(Reg::RV, Reg::R(0)),
            Insn::RET(1),
        ];
        let outcome = run(program, &[]).unwrap();
        assert_eq!(outcome.output, vec!["7", "42"]);
        assert_eq!(outcome.exit, 42);
    }

    #[test]
    fn program_arguments() {
        let program = vec![
            Insn::LABEL(label(ENTRY)),
            Insn::ARG(Reg::R(0), 1),
            Insn::ARG(Reg::R(1), 5),
            Insn::PRINT(Reg::R(0)),
            Insn::PRINT(Reg::R(1)),
            Insn::HALT(),
        ];
        let outcome = run(program, &[10, 20]).unwrap();
        assert_eq!(outcome.output, vec!["20", "0"]);
    }

    #[test]
    fn block_copy_and_compare() {
        let program = vec![
            Insn::LABEL(label(ENTRY)),
            Insn::CONST(Reg::R(0), 5),
            Insn::STORE(Reg::R(0), Reg::SP, 0),
            Insn::STORE(Reg::R(0), Reg::SP, 1),
            Insn::LEA(Reg::R(1), Reg::SP, 0),
            Insn::LEA(Reg::R(2), Reg::SP, 2),
            Insn::BLKEQ(Reg::R(3), Reg::R(1), Reg::R(2), 2),
            Insn::PRINTB(Reg::R(3)),
            Insn::COPY(Reg::R(2), 0, Reg::R(1), 2),
            Insn::BLKEQ(Reg::R(3), Reg::R(1), Reg::R(2), 2),
            Insn::PRINTB(Reg::R(3)),
            Insn::HALT(),
        ];
        let outcome = run(program, &[]).unwrap();
        assert_eq!(outcome.output, vec!["false", "true"]);
    }

    #[test]
    fn unset_register_is_a_fault() {
        let program = vec![Insn::LABEL(label(ENTRY)), Insn::PRINT(Reg::R(3)), Insn::HALT()];
        match run(program, &[]) {
            Err(Error::Fault { fault, func, .. }) => {
                assert_eq!(fault, Fault::UnsetRegister(Reg::R(3)));
                assert_eq!(func, ENTRY);
            }
            other => panic!("unexpected result: {:?}", other.map(|o| o.output)),
        }
    }

    #[test]
    fn bounds_fault() {
        let program = vec![
            Insn::LABEL(label(ENTRY)),
            Insn::CONST(Reg::R(0), 3),
            Insn::BOUNDS(Reg::R(0), 3),
            Insn::HALT(),
        ];
        assert!(matches!(
            run(program, &[]),
            Err(Error::Fault {
                fault: Fault::OutOfBounds(3, 3),
                ..
            })
        ));
    }

    #[test]
    fn division_by_zero_fault() {
        let program = vec![
            Insn::LABEL(label(ENTRY)),
            Insn::CONST(Reg::R(0), 3),
            Insn::CONST(Reg::R(1), 0),
            Insn::CALC(ALU::DIV, Reg::R(2), Reg::R(0), Reg::R(1)),
            Insn::HALT(),
        ];
        assert!(matches!(
            run(program, &[]),
            Err(Error::Fault {
                fault: Fault::DivisionByZero,
                ..
            })
        ));
    }

    #[test]
    fn oversized_frame_fault() {
        for (size, addr) in [(usize::MAX, 0), (1 << 40, 1 << 40)] {
            let program = vec![Insn::LABEL(label(ENTRY)), Insn::ENTER(size), Insn::HALT()];
            match run(program, &[]) {
                Err(Error::Fault { fault, pc, .. }) => {
                    assert_eq!(fault, Fault::BadAddress(addr));
                    assert_eq!(pc, 1);
                }
                other => panic!("unexpected result: {:?}", other.map(|o| o.output)),
            }
        }
    }

    #[test]
    fn duplicate_label() {
        let program = vec![Insn::LABEL(label("a")), Insn::LABEL(label("a"))];
        assert!(matches!(Vm::new(program), Err(Error::DuplicateLabel(_))));
    }

    #[test]
    fn missing_entry() {
        let program = vec![Insn::LABEL(label("main")), Insn::HALT()];
        assert!(matches!(run(program, &[]), Err(Error::UndefinedLabel(_))));
    }

    #[test]
    fn step_limit() {
        let program = vec![Insn::LABEL(label(ENTRY)), Insn::JUMP(label(ENTRY))];
        assert!(matches!(run(program, &[]), Err(Error::StepLimit(_))));
    }
}
