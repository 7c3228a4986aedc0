//! Syntax analysis: recursive descent over the token stream.
//!
//! - [`parser`]: the grammar itself, with synchronization-set recovery.
//! - [`symtab`]: symbol arena and the built-in function registry.
//! - [`diagnostics`]: accumulated, position-stamped error records.

pub mod diagnostics;
pub mod parser;
pub mod symtab;

pub use diagnostics::{Diagnostic, Diagnostics, SynErr};
pub use parser::Parser;
pub use symtab::{Symbol, SymbolId, SymbolTable};
