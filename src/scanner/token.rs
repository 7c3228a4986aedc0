//! Token definitions for the expression language.
//!
//! Kinds carry explicit numeric codes because the parser's synchronization
//! sets are indexed by code.  Everything at or below [`MAX_T`] belongs to
//! the grammar; [`TokenKind::Unknown`] sits above that range and is skipped
//! by the parser like a pragma, so a stray character never reaches the
//! grammar rules.

use std::fmt;

/// Highest token code the grammar knows about.
pub const MAX_T: u8 = 37;

/// Closed set of token kinds with their wire codes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TokenKind {
    #[default]
    Eof = 0,
    /// `²` postfix
    Squared = 1,
    /// `³` postfix
    Cubed = 2,
    /// `×`
    Times = 3,
    /// `÷`
    Divide = 4,
    /// `−` (U+2212)
    Minus = 5,
    Ident = 6,
    Number = 7,
    /// `0o` prefixed literal
    OctalInt = 8,
    /// `0x` prefixed literal
    HexInt = 9,
    /// `0b` prefixed literal
    BinInt = 10,
    /// `0d` prefixed literal
    DecInt = 11,
    /// `#base#digits` literal
    BaseInt = 12,
    Semicolon = 13,
    Let = 14,
    Assign = 15,
    LParen = 16,
    RParen = 17,
    /// ASCII `-`
    Hyphen = 18,
    Tilde = 19,
    True = 20,
    False = 21,
    Plus = 22,
    Bar = 23,
    Star = 24,
    Slash = 25,
    Percent = 26,
    Amp = 27,
    Bang = 28,
    Caret = 29,
    StarStar = 30,
    Eq = 31,
    Neq = 32,
    Leq = 33,
    Lss = 34,
    Gtr = 35,
    Geq = 36,
    /// Placeholder for "no such token" in error messages.
    Invalid = 37,
    /// Unrecognized character; above the grammar range, skipped like a pragma.
    Unknown = 38,
}

impl TokenKind {
    /// Numeric code, used to index the parser's synchronization sets.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Human-readable form used in "... expected" diagnostics.
    pub fn description(self) -> &'static str {
        match self {
            TokenKind::Eof => "EOF",
            TokenKind::Squared => "squared",
            TokenKind::Cubed => "cubed",
            TokenKind::Times => "times",
            TokenKind::Divide => "divide",
            TokenKind::Minus => "minus",
            TokenKind::Ident => "ident",
            TokenKind::Number => "number",
            TokenKind::OctalInt => "octalInt",
            TokenKind::HexInt => "hexInt",
            TokenKind::BinInt => "binInt",
            TokenKind::DecInt => "decInt",
            TokenKind::BaseInt => "baseInt",
            TokenKind::Semicolon => "\";\"",
            TokenKind::Let => "\"let\"",
            TokenKind::Assign => "\"=\"",
            TokenKind::LParen => "\"(\"",
            TokenKind::RParen => "\")\"",
            TokenKind::Hyphen => "\"-\"",
            TokenKind::Tilde => "\"~\"",
            TokenKind::True => "\"true\"",
            TokenKind::False => "\"false\"",
            TokenKind::Plus => "\"+\"",
            TokenKind::Bar => "\"|\"",
            TokenKind::Star => "\"*\"",
            TokenKind::Slash => "\"/\"",
            TokenKind::Percent => "\"%\"",
            TokenKind::Amp => "\"&\"",
            TokenKind::Bang => "\"!\"",
            TokenKind::Caret => "\"^\"",
            TokenKind::StarStar => "\"**\"",
            TokenKind::Eq => "\"==\"",
            TokenKind::Neq => "\"!=\"",
            TokenKind::Leq => "\"<=\"",
            TokenKind::Lss => "\"<\"",
            TokenKind::Gtr => "\">\"",
            TokenKind::Geq => "\">=\"",
            TokenKind::Invalid | TokenKind::Unknown => "???",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// A scanned token with its lexeme and source position.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Lexeme text.
    pub val: String,
    /// Byte offset of the first character in the input.
    pub pos: usize,
    /// Character offset of the first character in the input (0-based).
    pub char_pos: usize,
    /// Line of the first character (1-based).
    pub line: usize,
    /// Column of the first character (1-based).
    pub col: usize,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} \"{}\" at {}:{}",
            self.kind.description(),
            self.val,
            self.line,
            self.col
        )
    }
}
