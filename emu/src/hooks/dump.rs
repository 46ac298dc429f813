use arch::{Insn, Reg};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;

use crate::error::Error;
use crate::model::State;

use super::Hook;

/// Prints machine state when execution passes a configured label.
///
/// The configuration file maps label names to what should be shown:
///
/// ```yaml
/// main:
///   stack: true
/// fib:
///   regs: true
/// ```
#[derive(Debug)]
pub struct Dump {
    file: Option<String>,
    all: bool,
    list: List,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct List(HashMap<String, Config>);

#[derive(Debug, Serialize, Deserialize)]
struct Config {
    #[serde(default)]
    stack: bool,
    #[serde(default = "yes")]
    regs: bool,
}

fn yes() -> bool {
    true
}

impl Dump {
    pub fn arg(file: Option<String>, all: bool) -> Result<Self, Error> {
        let list = match &file {
            Some(fname) => serde_yaml::from_reader(BufReader::new(File::open(fname)?))?,
            None => List::default(),
        };
        Ok(Self { file, all, list })
    }

    fn get(&self, label: &str) -> Option<&Config> {
        self.list.0.get(label)
    }
}

impl Hook for Dump {
    fn init(&mut self, _state: &State) {
        if self.all {
            println!(" * Dump all");
        }
        if let Some(fname) = &self.file {
            println!(" * Dump[{}] {:?}", self.list.0.len(), fname);
        }
    }

    fn exec(&mut self, _time: u64, _pc: usize, insn: &Insn, state: &State) {
        match insn {
            Insn::LABEL(label) => {
                if let Some(cfg) = self.get(label.name()) {
                    println!(" | {:<45} |", label);
                    if cfg.regs {
                        self.print_reg(state);
                    }
                    if cfg.stack {
                        self.print_stack(state);
                    }
                }
            }
            _ if self.all && !insn.is_marker() => self.print_reg(state),
            _ => {}
        }
    }
}

impl Dump {
    fn print_reg(&self, state: &State) {
        println!(" +-----------------------------------------------+");
        println!(
            " | pc: {:>6} | fp: {:>6} | sp: {:>6} | rv: {:>4} |",
            state.pc,
            state.fp,
            state.sp,
            state.rv
        );
        let slots: Vec<String> = state
            .slots()
            .map(|(reg, val)| format!("{}={}", reg, val))
            .collect();
        if !slots.is_empty() {
            println!(" | {:<45} |", slots.join(" "));
        }
        println!(" +-----------------------------------------------+");
    }

    fn print_stack(&self, state: &State) {
        for addr in state.fp..state.sp {
            let val = state.read(addr, 0).unwrap_or_default();
            let reg = if addr == state.fp { Reg::FP.to_string() } else { String::new() };
            println!(" | {:>2} {:0>6} : {:<34} |", reg, addr, val);
        }
        println!(" +-----------------------------------------------+");
    }
}
