use arch::Reg;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    // Link errors
    #[error("Duplicate label: {0}")]
    DuplicateLabel(String),

    #[error("Undefined label: {0}")]
    UndefinedLabel(String),

    // Execution errors
    #[error("Runtime fault in {func} at pc {pc}: {fault}")]
    Fault { func: String, pc: usize, fault: Fault },

    #[error("Step limit of {0} exceeded")]
    StepLimit(u64),
}

/// Faults raised while executing a single instruction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Fault {
    #[error("read of unset register {0}")]
    UnsetRegister(Reg),

    #[error("call stack exceeded {0} frames")]
    StackOverflow(usize),

    #[error("index {0} out of bounds for length {1}")]
    OutOfBounds(i64, usize),

    #[error("memory access at address {0} is out of range")]
    BadAddress(i64),

    #[error("division by zero")]
    DivisionByZero,

    #[error("return with an empty call stack")]
    EmptyCallStack,

    #[error("undefined label {0}")]
    UndefinedLabel(String),

    #[error("program counter ran past the end of the program")]
    PcOutOfRange,
}
