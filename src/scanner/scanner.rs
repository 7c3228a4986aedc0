//! DFA scanner with maximal-munch backtracking and a peekable token queue.
//!
//! The scanner runs an explicit numbered-state machine over the character
//! stream.  While a literal is in flight it records the most recent
//! accepting state (`rec_kind`/`rec_end`); if the machine later dead-ends
//! (for example `0o` with no octal digit after it), the input is rewound to
//! the recorded end and the shorter token is emitted.  Unrecognized
//! characters become [`TokenKind::Unknown`] tokens, which sit above the
//! grammar range and are filtered out downstream instead of aborting the
//! scan.
//!
//! `scan` consumes tokens; `peek` reads ahead without consuming, buffering
//! peeked tokens in a queue that `scan` replays later; `reset_peek` rewinds
//! the peek cursor to the next unconsumed token.

use std::collections::VecDeque;
use std::io::Read;

use super::buffer::{Buffer, Utf8Buffer};
use super::token::{Token, TokenKind, MAX_T};

const EOL: u32 = '\n' as u32;

fn is_digit(ch: u32) -> bool {
    matches!(ch, 0x30..=0x39)
}

fn is_digit_or_sep(ch: u32) -> bool {
    is_digit(ch) || ch == '_' as u32
}

fn is_oct_digit_or_sep(ch: u32) -> bool {
    matches!(ch, 0x30..=0x37) || ch == '_' as u32
}

fn is_hex_digit_or_sep(ch: u32) -> bool {
    is_digit(ch) || matches!(ch, 0x41..=0x46 | 0x61..=0x66) || ch == '_' as u32
}

fn is_bin_digit_or_sep(ch: u32) -> bool {
    matches!(ch, 0x30 | 0x31) || ch == '_' as u32
}

fn is_letter(ch: u32) -> bool {
    matches!(ch, 0x41..=0x5A | 0x61..=0x7A)
}

fn is_ident_char(ch: u32) -> bool {
    is_letter(ch) || is_digit(ch) || ch == '_' as u32
}

fn is_alnum_or_sep(ch: u32) -> bool {
    is_ident_char(ch)
}

/// Initial DFA state for a token starting with `ch` (0 = no transition).
fn start_state(ch: u32) -> i32 {
    match ch {
        Buffer::EOF => -1,
        0x00B2 => 1,                       // ²
        0x00B3 => 2,                       // ³
        0x00D7 => 3,                       // ×
        0x00F7 => 4,                       // ÷
        0x2212 => 5,                       // − (minus sign)
        0x41..=0x5A | 0x61..=0x7A => 6,    // A..Z a..z
        0x31..=0x39 | 0x5F => 7,           // 1..9 _
        0x30 => 25,                        // 0
        0x23 => 21,                        // #
        0x3B => 26,                        // ;
        0x28 => 27,                        // (
        0x29 => 28,                        // )
        0x2D => 29,                        // -
        0x7E => 30,                        // ~
        0x2B => 31,                        // +
        0x7C => 32,                        // |
        0x2F => 33,                        // /
        0x25 => 34,                        // %
        0x26 => 35,                        // &
        0x5E => 36,                        // ^
        0x3D => 37,                        // =
        0x2A => 39,                        // *
        0x21 => 41,                        // !
        0x3C => 43,                        // <
        0x3E => 45,                        // >
        _ => 0,
    }
}

/// Streaming tokenizer over a [`Utf8Buffer`].
pub struct Scanner {
    buffer: Utf8Buffer,
    /// Current (not yet consumed by the DFA) character.
    ch: u32,
    /// Byte offset of `ch`.
    pos: usize,
    /// Character offset of `ch` (0-based).
    char_pos: usize,
    /// Column of `ch` (1-based; 0 right after a newline).
    col: usize,
    /// Line of `ch` (1-based).
    line: usize,
    /// Lexeme under construction.
    tval: String,
    /// Peeked-ahead tokens not yet consumed by `scan`.
    queue: VecDeque<Token>,
    peek_pos: usize,
}

impl Scanner {
    /// Scanner over a non-seekable stream (file, pipe, console).
    pub fn from_reader(stream: Box<dyn Read>) -> Self {
        Self::init(Utf8Buffer::new(Buffer::from_reader(stream)))
    }

    /// Scanner over an in-memory source string.
    pub fn from_source(src: &str) -> Self {
        Self::init(Utf8Buffer::new(Buffer::from_bytes(src.as_bytes().to_vec())))
    }

    fn init(buffer: Utf8Buffer) -> Self {
        let mut s = Self {
            buffer,
            ch: 0,
            pos: 0,
            char_pos: usize::MAX,
            col: 0,
            line: 1,
            tval: String::new(),
            queue: VecDeque::new(),
            peek_pos: 0,
        };
        s.next_ch();
        if s.ch == 0xFEFF {
            // Leading byte order mark: skip it and restart the bookkeeping.
            s.col = 0;
            s.char_pos = usize::MAX;
            s.next_ch();
        }
        s
    }

    /// Consumes and returns the next token, replaying previously peeked
    /// tokens first.  Resets the peek cursor.
    pub fn scan(&mut self) -> Token {
        let t = match self.queue.pop_front() {
            Some(t) => t,
            None => self.next_token(),
        };
        self.peek_pos = 0;
        t
    }

    /// Returns the next token after the current peek position without
    /// consuming anything.  Kinds above the grammar range are skipped.
    pub fn peek(&mut self) -> Token {
        loop {
            if self.peek_pos == self.queue.len() {
                let t = self.next_token();
                self.queue.push_back(t);
            }
            let t = self.queue[self.peek_pos].clone();
            self.peek_pos += 1;
            if t.kind.code() <= MAX_T {
                return t;
            }
        }
    }

    /// Rewinds the peek cursor to the first unconsumed token.
    pub fn reset_peek(&mut self) {
        self.peek_pos = 0;
    }

    /// Advances to the next character, normalizing line endings (a lone
    /// `\r` reads as `\n`; `\r\n` counts as one line break).
    fn next_ch(&mut self) {
        self.pos = self.buffer.pos();
        self.ch = self.buffer.read();
        self.col += 1;
        self.char_pos = self.char_pos.wrapping_add(1);
        if self.ch == '\r' as u32 && self.buffer.peek() != EOL {
            self.ch = EOL;
        }
        if self.ch == EOL {
            self.line += 1;
            self.col = 0;
        }
    }

    /// Appends the current character to the lexeme and advances.
    fn add_ch(&mut self) {
        if self.ch != Buffer::EOF {
            if let Some(c) = char::from_u32(self.ch) {
                self.tval.push(c);
            }
            self.next_ch();
        }
    }

    /// Called with the cursor on a `/`.  Skips a `//` line comment or a
    /// nested `/* */` block comment and returns true; otherwise rewinds to
    /// the slash and returns false.  An unterminated block comment degrades
    /// to end-of-stream.
    fn comment(&mut self) -> bool {
        let pos0 = self.pos;
        let line0 = self.line;
        let col0 = self.col;
        let char_pos0 = self.char_pos;
        self.next_ch();
        if self.ch == '*' as u32 {
            let mut level = 1;
            self.next_ch();
            loop {
                if self.ch == '*' as u32 {
                    self.next_ch();
                    if self.ch == '/' as u32 {
                        level -= 1;
                        self.next_ch();
                        if level == 0 {
                            return true;
                        }
                    }
                } else if self.ch == '/' as u32 {
                    self.next_ch();
                    if self.ch == '*' as u32 {
                        level += 1;
                        self.next_ch();
                    }
                } else if self.ch == Buffer::EOF {
                    return false;
                } else {
                    self.next_ch();
                }
            }
        } else if self.ch == '/' as u32 {
            loop {
                self.next_ch();
                if self.ch == EOL || self.ch == Buffer::EOF {
                    return true;
                }
            }
        }
        // Not a comment after all: back to the slash.
        self.buffer.set_pos(pos0);
        self.next_ch();
        self.line = line0;
        self.col = col0;
        self.char_pos = char_pos0;
        false
    }

    /// Rewinds the input to just after the accepted prefix of length `tlen`
    /// characters starting at `t`'s position, rebuilding the lexeme so the
    /// token text matches what was accepted.
    fn set_scanner_behind_t(&mut self, t: &Token, tlen: usize) {
        self.buffer.set_pos(t.pos);
        self.next_ch();
        self.line = t.line;
        self.col = t.col;
        self.char_pos = t.char_pos;
        self.tval.clear();
        for _ in 0..tlen {
            self.add_ch();
        }
    }

    /// Reclassifies identifiers that spell a keyword.
    fn check_literal(&self, t: &mut Token) {
        match t.val.as_str() {
            "let" => t.kind = TokenKind::Let,
            "true" => t.kind = TokenKind::True,
            "false" => t.kind = TokenKind::False,
            _ => {}
        }
    }

    fn next_token(&mut self) -> Token {
        loop {
            while self.ch == 0x20 || matches!(self.ch, 0x09 | 0x0A | 0x0D) {
                self.next_ch();
            }
            if self.ch == '/' as u32 && self.comment() {
                continue;
            }
            break;
        }

        let mut t = Token {
            kind: TokenKind::Unknown,
            val: String::new(),
            pos: self.pos,
            char_pos: self.char_pos,
            line: self.line,
            col: self.col,
        };
        // Most recent accepting state, for maximal-munch backtracking.
        let mut rec_kind = TokenKind::Unknown;
        let mut rec_end = self.pos;

        let mut state = start_state(self.ch);
        self.tval.clear();
        self.add_ch();

        loop {
            match state {
                -1 => {
                    t.kind = TokenKind::Eof;
                    break;
                }
                0 => {
                    // Dead end: fall back to the last accepting prefix, or
                    // emit the offending character as Unknown.
                    if rec_kind != TokenKind::Unknown {
                        let tlen = rec_end - t.pos;
                        self.set_scanner_behind_t(&t, tlen);
                    }
                    t.kind = rec_kind;
                    break;
                }
                1 => {
                    t.kind = TokenKind::Squared;
                    break;
                }
                2 => {
                    t.kind = TokenKind::Cubed;
                    break;
                }
                3 => {
                    t.kind = TokenKind::Times;
                    break;
                }
                4 => {
                    t.kind = TokenKind::Divide;
                    break;
                }
                5 => {
                    t.kind = TokenKind::Minus;
                    break;
                }
                6 => {
                    rec_end = self.pos;
                    rec_kind = TokenKind::Ident;
                    if is_ident_char(self.ch) {
                        self.add_ch();
                    } else {
                        t.kind = TokenKind::Ident;
                        t.val = self.tval.clone();
                        self.check_literal(&mut t);
                        return t;
                    }
                }
                7 => {
                    // Integer part.
                    rec_end = self.pos;
                    rec_kind = TokenKind::Number;
                    if is_digit_or_sep(self.ch) {
                        self.add_ch();
                    } else if self.ch == '.' as u32 {
                        self.add_ch();
                        state = 8;
                    } else if self.ch == 'i' as u32 {
                        self.add_ch();
                        state = 12;
                    } else {
                        t.kind = TokenKind::Number;
                        break;
                    }
                }
                8 => {
                    // Fraction part.
                    rec_end = self.pos;
                    rec_kind = TokenKind::Number;
                    if is_digit_or_sep(self.ch) {
                        self.add_ch();
                    } else if self.ch == 'E' as u32 {
                        self.add_ch();
                        state = 9;
                    } else if self.ch == 'i' as u32 {
                        self.add_ch();
                        state = 12;
                    } else {
                        t.kind = TokenKind::Number;
                        break;
                    }
                }
                9 => {
                    // Right after 'E': sign or digit, not accepting.
                    if is_digit_or_sep(self.ch) {
                        self.add_ch();
                        state = 11;
                    } else if self.ch == '+' as u32 || self.ch == '-' as u32 {
                        self.add_ch();
                        state = 10;
                    } else {
                        state = 0;
                    }
                }
                10 => {
                    // After the exponent sign.
                    if is_digit_or_sep(self.ch) {
                        self.add_ch();
                        state = 11;
                    } else {
                        state = 0;
                    }
                }
                11 => {
                    // Exponent digits.
                    rec_end = self.pos;
                    rec_kind = TokenKind::Number;
                    if is_digit_or_sep(self.ch) {
                        self.add_ch();
                    } else if self.ch == 'i' as u32 {
                        self.add_ch();
                        state = 12;
                    } else {
                        t.kind = TokenKind::Number;
                        break;
                    }
                }
                12 => {
                    // Imaginary suffix consumed.
                    t.kind = TokenKind::Number;
                    break;
                }
                13 => {
                    // After "0o".
                    if is_oct_digit_or_sep(self.ch) {
                        self.add_ch();
                        state = 14;
                    } else {
                        state = 0;
                    }
                }
                14 => {
                    rec_end = self.pos;
                    rec_kind = TokenKind::OctalInt;
                    if is_oct_digit_or_sep(self.ch) {
                        self.add_ch();
                    } else {
                        t.kind = TokenKind::OctalInt;
                        break;
                    }
                }
                15 => {
                    // After "0x".
                    if is_hex_digit_or_sep(self.ch) {
                        self.add_ch();
                        state = 16;
                    } else {
                        state = 0;
                    }
                }
                16 => {
                    rec_end = self.pos;
                    rec_kind = TokenKind::HexInt;
                    if is_hex_digit_or_sep(self.ch) {
                        self.add_ch();
                    } else {
                        t.kind = TokenKind::HexInt;
                        break;
                    }
                }
                17 => {
                    // After "0b".
                    if is_bin_digit_or_sep(self.ch) {
                        self.add_ch();
                        state = 18;
                    } else {
                        state = 0;
                    }
                }
                18 => {
                    rec_end = self.pos;
                    rec_kind = TokenKind::BinInt;
                    if is_bin_digit_or_sep(self.ch) {
                        self.add_ch();
                    } else {
                        t.kind = TokenKind::BinInt;
                        break;
                    }
                }
                19 => {
                    // After "0d".
                    if is_digit_or_sep(self.ch) {
                        self.add_ch();
                        state = 20;
                    } else {
                        state = 0;
                    }
                }
                20 => {
                    rec_end = self.pos;
                    rec_kind = TokenKind::DecInt;
                    if is_digit_or_sep(self.ch) {
                        self.add_ch();
                    } else {
                        t.kind = TokenKind::DecInt;
                        break;
                    }
                }
                21 => {
                    // After the opening '#' of a based literal.
                    if is_digit_or_sep(self.ch) {
                        self.add_ch();
                        state = 22;
                    } else {
                        state = 0;
                    }
                }
                22 => {
                    // Base digits.
                    if is_digit_or_sep(self.ch) {
                        self.add_ch();
                    } else if self.ch == '#' as u32 {
                        self.add_ch();
                        state = 23;
                    } else {
                        state = 0;
                    }
                }
                23 => {
                    // After the second '#'.
                    if is_alnum_or_sep(self.ch) {
                        self.add_ch();
                        state = 24;
                    } else {
                        state = 0;
                    }
                }
                24 => {
                    rec_end = self.pos;
                    rec_kind = TokenKind::BaseInt;
                    if is_alnum_or_sep(self.ch) {
                        self.add_ch();
                    } else {
                        t.kind = TokenKind::BaseInt;
                        break;
                    }
                }
                25 => {
                    // Leading zero: plain number or a prefixed literal.
                    rec_end = self.pos;
                    rec_kind = TokenKind::Number;
                    if is_digit_or_sep(self.ch) {
                        self.add_ch();
                        state = 7;
                    } else if self.ch == '.' as u32 {
                        self.add_ch();
                        state = 8;
                    } else if self.ch == 'i' as u32 {
                        self.add_ch();
                        state = 12;
                    } else if self.ch == 'o' as u32 {
                        self.add_ch();
                        state = 13;
                    } else if self.ch == 'x' as u32 {
                        self.add_ch();
                        state = 15;
                    } else if self.ch == 'b' as u32 {
                        self.add_ch();
                        state = 17;
                    } else if self.ch == 'd' as u32 {
                        self.add_ch();
                        state = 19;
                    } else {
                        t.kind = TokenKind::Number;
                        break;
                    }
                }
                26 => {
                    t.kind = TokenKind::Semicolon;
                    break;
                }
                27 => {
                    t.kind = TokenKind::LParen;
                    break;
                }
                28 => {
                    t.kind = TokenKind::RParen;
                    break;
                }
                29 => {
                    t.kind = TokenKind::Hyphen;
                    break;
                }
                30 => {
                    t.kind = TokenKind::Tilde;
                    break;
                }
                31 => {
                    t.kind = TokenKind::Plus;
                    break;
                }
                32 => {
                    t.kind = TokenKind::Bar;
                    break;
                }
                33 => {
                    t.kind = TokenKind::Slash;
                    break;
                }
                34 => {
                    t.kind = TokenKind::Percent;
                    break;
                }
                35 => {
                    t.kind = TokenKind::Amp;
                    break;
                }
                36 => {
                    t.kind = TokenKind::Caret;
                    break;
                }
                37 => {
                    rec_end = self.pos;
                    rec_kind = TokenKind::Assign;
                    if self.ch == '=' as u32 {
                        self.add_ch();
                        state = 38;
                    } else {
                        t.kind = TokenKind::Assign;
                        break;
                    }
                }
                38 => {
                    t.kind = TokenKind::Eq;
                    break;
                }
                39 => {
                    rec_end = self.pos;
                    rec_kind = TokenKind::Star;
                    if self.ch == '*' as u32 {
                        self.add_ch();
                        state = 40;
                    } else {
                        t.kind = TokenKind::Star;
                        break;
                    }
                }
                40 => {
                    t.kind = TokenKind::StarStar;
                    break;
                }
                41 => {
                    rec_end = self.pos;
                    rec_kind = TokenKind::Bang;
                    if self.ch == '=' as u32 {
                        self.add_ch();
                        state = 42;
                    } else {
                        t.kind = TokenKind::Bang;
                        break;
                    }
                }
                42 => {
                    t.kind = TokenKind::Neq;
                    break;
                }
                43 => {
                    rec_end = self.pos;
                    rec_kind = TokenKind::Lss;
                    if self.ch == '=' as u32 {
                        self.add_ch();
                        state = 44;
                    } else {
                        t.kind = TokenKind::Lss;
                        break;
                    }
                }
                44 => {
                    t.kind = TokenKind::Leq;
                    break;
                }
                45 => {
                    rec_end = self.pos;
                    rec_kind = TokenKind::Gtr;
                    if self.ch == '=' as u32 {
                        self.add_ch();
                        state = 46;
                    } else {
                        t.kind = TokenKind::Gtr;
                        break;
                    }
                }
                46 => {
                    t.kind = TokenKind::Geq;
                    break;
                }
                _ => {
                    t.kind = TokenKind::Eof;
                    break;
                }
            }
        }
        t.val = self.tval.clone();
        t
    }
}
