//! Lexical analysis: character buffering and tokenization.
//!
//! The stage is split in three layers:
//!
//! - [`buffer`]: a growable byte window over the input plus a UTF-8
//!   decoding wrapper, so the scanner works on whole characters.
//! - [`token`]: the closed token-kind set with its numeric codes.
//! - [`scanner`]: the DFA tokenizer with maximal-munch backtracking and
//!   the peekable token queue.

pub mod buffer;
pub mod scanner;
pub mod token;

pub use scanner::Scanner;
pub use token::{Token, TokenKind, MAX_T};
