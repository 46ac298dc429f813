use crate::grammer::token::Span;
use thiserror::Error;

// Unified error type for the Tau compiler
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Vm(#[from] emu::Error),

    // User diagnostics
    #[error("ScanError at {span}: {msg}")]
    Scan { msg: String, span: Span },

    #[error("ParseError at {span}: {msg}")]
    Parse { msg: String, span: Span },

    #[error("NameError at {span}: {msg}")]
    Name { msg: String, span: Span },

    #[error("TypeError at {span}: {msg}")]
    Type { msg: String, span: Span },

    // Compiler bugs
    #[error("Internal compiler error: {0}")]
    Internal(String),
}

impl Error {
    pub fn scan(msg: impl Into<String>, span: Span) -> Self {
        Error::Scan {
            msg: msg.into(),
            span,
        }
    }

    pub fn parse(msg: impl Into<String>, span: Span) -> Self {
        Error::Parse {
            msg: msg.into(),
            span,
        }
    }

    pub fn name(msg: impl Into<String>, span: Span) -> Self {
        Error::Name {
            msg: msg.into(),
            span,
        }
    }

    pub fn ty(msg: impl Into<String>, span: Span) -> Self {
        Error::Type {
            msg: msg.into(),
            span,
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Error::Internal(msg.into())
    }

    /// Source location of a user diagnostic.
    pub fn span(&self) -> Option<Span> {
        match self {
            Error::Scan { span, .. }
            | Error::Parse { span, .. }
            | Error::Name { span, .. }
            | Error::Type { span, .. } => Some(*span),
            _ => None,
        }
    }
}
