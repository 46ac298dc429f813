pub mod compile;
pub mod error;
pub mod eval;
pub mod grammer;
pub mod util;

pub use compile::codegen;
pub use error::Error;
pub use eval::{assign_offsets, assign_operands, bind, typecheck};
pub use grammer::ast;
pub use grammer::{Lexer, Parser};

use arch::Insn;
use ast::Program;
use eval::symbols::SymbolTable;

/// Passes of the pipeline, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Parse,
    Binding,
    Typecheck,
    Offsets,
    Assign,
    Codegen,
}

/// A program taken through the pipeline up to `stage`.
#[derive(Debug, Clone)]
pub struct Compiled {
    pub stage: Stage,
    pub program: Program,
    pub table: Option<SymbolTable>, // from Binding on
    pub code: Vec<Insn>,            // after Codegen
}

impl Compiled {
    pub fn table(&self) -> Result<&SymbolTable, Error> {
        self.table
            .as_ref()
            .ok_or_else(|| Error::internal(format!("no symbol table after {:?}", self.stage)))
    }
}

pub fn parse(source: &str) -> Result<Program, Error> {
    let tokens = Lexer::new(source).tokenize()?;
    Parser::new(tokens).parse()
}

/// Run the pipeline on `source` through `stage` inclusive.
pub fn run_to(source: &str, stage: Stage) -> Result<Compiled, Error> {
    let mut program = parse(source)?;
    if stage == Stage::Parse {
        return Ok(Compiled {
            stage,
            program,
            table: None,
            code: vec![],
        });
    }

    let mut table = bind(&mut program)?;
    if stage >= Stage::Typecheck {
        typecheck(&mut program, &mut table)?;
    }
    if stage >= Stage::Offsets {
        assign_offsets(&mut program, &mut table)?;
    }
    if stage >= Stage::Assign {
        assign_operands(&mut program)?;
    }
    let code = if stage >= Stage::Codegen {
        codegen(&program, &table)?
    } else {
        vec![]
    };

    Ok(Compiled {
        stage,
        program,
        table: Some(table),
        code,
    })
}

/// Run every pass on `source`.
pub fn compile(source: &str) -> Result<Compiled, Error> {
    run_to(source, Stage::Codegen)
}

/// Compile `source` and execute it on the virtual machine.
pub fn run(source: &str, args: &[i64], tmax: Option<u64>) -> Result<emu::Outcome, Error> {
    let compiled = compile(source)?;
    let outcome = emu::Vm::new(compiled.code)?.tmax(tmax).run(args)?;
    Ok(outcome)
}
