//! Diagnostic accumulation for the parser.
//!
//! Parsing never aborts: every problem becomes a [`Diagnostic`] record and
//! the parse continues.  The console rendering (`-- line L col C: MSG`)
//! lives with the caller; the core only accumulates.

use std::fmt;

use crate::scanner::TokenKind;

/// A syntax-error shape, turned into a message on display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynErr {
    /// A specific token was required and something else was found.
    Expected(TokenKind),
    InvalidRelOp,
    InvalidAddOp,
    InvalidMulOp,
    InvalidPowerOp,
    InvalidUnaryOp,
    InvalidFactor,
}

impl fmt::Display for SynErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SynErr::Expected(kind) => write!(f, "{} expected", kind.description()),
            SynErr::InvalidRelOp => write!(f, "invalid RelOp"),
            SynErr::InvalidAddOp => write!(f, "invalid AddOp"),
            SynErr::InvalidMulOp => write!(f, "invalid MulOp"),
            SynErr::InvalidPowerOp => write!(f, "invalid PowerOp"),
            SynErr::InvalidUnaryOp => write!(f, "invalid UnaryOp"),
            SynErr::InvalidFactor => write!(f, "invalid Factor"),
        }
    }
}

/// One recorded problem, with its 1-based source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: usize,
    pub col: usize,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "-- line {} col {}: {}", self.line, self.col, self.message)
    }
}

/// Ordered collection of diagnostics from one compilation.
#[derive(Debug, Default)]
pub struct Diagnostics {
    list: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a syntax error.
    pub fn syn_err(&mut self, line: usize, col: usize, err: SynErr) {
        self.list.push(Diagnostic {
            line,
            col,
            message: err.to_string(),
        });
    }

    /// Records a semantic error with a ready-made message.
    pub fn sem_err(&mut self, line: usize, col: usize, message: String) {
        self.list.push(Diagnostic { line, col, message });
    }

    pub fn count(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.list.iter()
    }
}
