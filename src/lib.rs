//! A small expression-language compiler that evaluates each statement and
//! renders it as presentation MathML.
//!
//! The pipeline:
//!
//! ```text
//! source text
//!     |  scanner   (buffer -> UTF-8 decode -> DFA tokenizer)
//!     v
//! token stream
//!     |  parser    (recursive descent, diagnostic recovery, symbol table)
//!     v
//! Program (expression arena + statement tree)
//!     |  ast::value    per-statement numeric values
//!     |  ast::mathml   presentation markup
//!     |  ast::dump     indented debug dump
//! ```
//!
//! Compilation never fails: lexical and syntactic problems become recorded
//! diagnostics and the pipeline always produces a [`ast::Program`].

pub mod ast;
pub mod parser;
pub mod scanner;

use ast::Program;
use parser::{Diagnostics, Parser};
use scanner::Scanner;

/// Compiles an in-memory source string.
pub fn compile(src: &str) -> (Program, Diagnostics) {
    Parser::new(Scanner::from_source(src)).parse()
}
