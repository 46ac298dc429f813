use std::fs::File;
use std::io::{BufWriter, Write};

use arch::Insn;
use color_print::cprintln;

use super::Hook;
use crate::error::Error;
use crate::model::State;

/// Echoes every line produced by `print` as it happens.
pub struct Serial {
    style: bool,
    write_buf: Option<Box<dyn Write>>,
}

impl Serial {
    pub fn arg(style: bool, write_file: Option<String>) -> Result<Serial, Error> {
        let write_buf = match write_file {
            Some(file) => {
                let file = File::create(file)?;
                Some(Box::new(BufWriter::new(file)) as Box<dyn Write>)
            }
            None => None,
        };
        Ok(Serial { style, write_buf })
    }
}

impl Hook for Serial {
    fn exec(&mut self, _time: u64, _pc: usize, insn: &Insn, state: &State) {
        if !matches!(insn, Insn::PRINT(_) | Insn::PRINTB(_)) {
            return;
        }
        let Some(line) = state.output.last() else {
            return;
        };
        match self.style {
            true => cprintln!(" > <g,s>{}</>", line),
            false => println!("{}", line),
        }
        if let Some(buf) = self.write_buf.as_mut() {
            if let Err(err) = writeln!(buf, "{}", line) {
                eprintln!("serial: {}", err);
                self.write_buf = None;
            }
        }
    }
}

impl Drop for Serial {
    fn drop(&mut self) {
        if let Some(buf) = self.write_buf.as_mut() {
            let _ = buf.flush();
        }
    }
}
