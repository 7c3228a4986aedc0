//! Recursive-descent parser with panic-free error recovery.
//!
//! The parser never aborts and never unwinds: every problem is recorded as
//! a diagnostic and parsing continues on a synchronization set.  Missing
//! statement separators skip ahead to the next statement start; missing
//! closing parentheses skip to a token that can follow a factor.  Error
//! reporting is throttled: after a syntax error, further syntax errors are
//! suppressed until at least [`MIN_ERR_DIST`] tokens have been consumed
//! cleanly.  Semantic errors bypass the throttle.
//!
//! Grammar (EBNF):
//!
//! ```text
//! Program    = StatementList .
//! StatementList = Statement { ";" Statement } .
//! Statement  = [ "let" ident "=" ] Expression .
//! Expression = SimpleExpr [ RelOp SimpleExpr ] .
//! SimpleExpr = Term { AddOp Term } .
//! Term       = Power { MulOp Power } .
//! Power      = Factor { PowerOp Factor } .
//! Factor     = ident [ UnaryOp | "(" Expression ")" ]
//!            | number [ UnaryOp ]
//!            | "-" Factor | "~" Factor
//!            | "true" | "false"
//!            | "(" Expression ")" .
//! ```

use crate::ast::{BinOp, Expr, ExprArena, ExprId, Program, Stat, UnOp};
use crate::parser::diagnostics::{Diagnostics, SynErr};
use crate::parser::symtab::{SymbolId, SymbolTable};
use crate::scanner::{Scanner, Token, TokenKind, MAX_T};

/// Clean tokens required between two reported syntax errors.
const MIN_ERR_DIST: usize = 2;

const T: bool = true;
const X: bool = false;

/// Synchronization sets, indexed by token code.  Rows:
/// 0 = {EOF}, 1 = RelOp starts, 2 = AddOp starts, 3 = MulOp starts,
/// 4 = postfix/call starts, 5 = statement starts, 6 = factor follow.
static SET: [[bool; 39]; 7] = [
    [
        T, X, X, X, X, X, X, X, X, X, X, X, X, X, X, X, X, X, X, X, //
        X, X, X, X, X, X, X, X, X, X, X, X, X, X, X, X, X, X, X,
    ],
    [
        X, X, X, X, X, X, X, X, X, X, X, X, X, X, X, X, X, X, X, X, //
        X, X, X, X, X, X, X, X, X, X, X, T, T, T, T, T, T, X, X,
    ],
    [
        X, X, X, X, X, T, X, X, X, X, X, X, X, X, X, X, X, X, T, X, //
        X, X, T, T, X, X, X, X, X, X, X, X, X, X, X, X, X, X, X,
    ],
    [
        X, X, X, T, T, X, X, X, X, X, X, X, X, X, X, X, X, X, X, X, //
        X, X, X, X, T, T, T, T, X, X, X, X, X, X, X, X, X, X, X,
    ],
    [
        X, T, T, X, X, X, X, X, X, X, X, X, X, X, X, X, T, X, X, X, //
        X, X, X, X, X, X, X, X, T, X, X, X, X, X, X, X, X, X, X,
    ],
    [
        X, X, X, X, X, X, T, T, X, X, X, X, X, X, T, X, T, X, T, T, //
        T, T, X, X, X, X, X, X, X, X, X, X, X, X, X, X, X, X, X,
    ],
    [
        T, X, X, T, T, T, X, X, X, X, X, X, X, T, X, X, X, T, T, X, //
        X, X, T, T, T, T, T, T, X, T, T, T, T, T, T, T, T, X, X,
    ],
];

/// Recursive-descent parser producing a [`Program`] and its diagnostics.
pub struct Parser {
    scanner: Scanner,
    errors: Diagnostics,
    /// Most recently consumed token.
    t: Token,
    /// Lookahead token.
    la: Token,
    /// Tokens consumed since the last reported syntax error.
    err_dist: usize,
    exprs: ExprArena,
    symbols: SymbolTable,
}

impl Parser {
    pub fn new(scanner: Scanner) -> Self {
        Self {
            scanner,
            errors: Diagnostics::new(),
            t: Token::default(),
            la: Token::default(),
            err_dist: MIN_ERR_DIST,
            exprs: ExprArena::new(),
            symbols: SymbolTable::new(),
        }
    }

    /// Parses the whole input.  Always returns a program; problems are in
    /// the returned diagnostics.
    pub fn parse(mut self) -> (Program, Diagnostics) {
        self.get();
        let block = self.block_list();
        self.expect(TokenKind::Eof);
        let program = Program {
            exprs: self.exprs,
            symbols: self.symbols,
            block,
        };
        (program, self.errors)
    }

    /// Shifts the lookahead, skipping kinds above the grammar range.
    fn get(&mut self) {
        loop {
            self.t = self.la.clone();
            self.la = self.scanner.scan();
            if self.la.kind.code() <= MAX_T {
                self.err_dist += 1;
                return;
            }
            self.la = self.t.clone();
        }
    }

    fn start_of(&self, set: usize) -> bool {
        SET[set][self.la.kind.code() as usize]
    }

    /// Reports a syntax error at the lookahead, unless one was reported
    /// too recently.
    fn syn_err(&mut self, err: SynErr) {
        if self.err_dist >= MIN_ERR_DIST {
            self.errors.syn_err(self.la.line, self.la.col, err);
        }
        self.err_dist = 0;
    }

    /// Reports a semantic error at the last consumed token, unthrottled.
    fn sem_err(&mut self, message: String) {
        self.errors.sem_err(self.t.line, self.t.col, message);
    }

    /// Declares a variable.  An insertion that shadows an existing
    /// variable of the same name records a semantic error; the new entry
    /// still wins in the index.
    fn declare(&mut self, name: &str) -> SymbolId {
        let (sym, duplicate) = self.symbols.insert(name);
        if duplicate {
            self.sem_err(format!("{} declared twice", name));
        }
        sym
    }

    /// Finds a variable, declaring it on a miss so names can be referenced
    /// in any order.
    fn lookup(&mut self, name: &str) -> SymbolId {
        match self.symbols.find(name) {
            Some(sym) => sym,
            None => self.declare(name),
        }
    }

    fn expect(&mut self, kind: TokenKind) {
        if self.la.kind == kind {
            self.get();
        } else {
            self.syn_err(SynErr::Expected(kind));
        }
    }

    /// Like `expect`, but on a mismatch discards tokens until one in the
    /// follow set turns up, so one bad token cannot derail the rest.
    fn expect_weak(&mut self, kind: TokenKind, follow: usize) {
        if self.la.kind == kind {
            self.get();
        } else {
            self.syn_err(SynErr::Expected(kind));
            while !self.start_of(follow) {
                self.get();
            }
        }
    }

    /// Separator handling for iterations: consumes an expected separator,
    /// ends the iteration when the lookahead already follows it, and
    /// otherwise reports once and resynchronizes.  Returns whether the
    /// iteration should continue.
    fn weak_separator(&mut self, kind: TokenKind, sy_fol: usize, rep_fol: usize) -> bool {
        if self.la.kind == kind {
            self.get();
            return true;
        }
        if self.start_of(rep_fol) {
            return false;
        }
        self.syn_err(SynErr::Expected(kind));
        while !(self.start_of(sy_fol) || self.start_of(rep_fol) || self.start_of(0)) {
            self.get();
        }
        self.start_of(sy_fol)
    }

    fn block_list(&mut self) -> Stat {
        let mut stats = vec![self.statement()];
        while self.weak_separator(TokenKind::Semicolon, 5, 0) {
            stats.push(self.statement());
        }
        Stat::Block(stats)
    }

    fn statement(&mut self) -> Stat {
        let mut target = None;
        if self.la.kind == TokenKind::Let {
            self.get();
            self.expect(TokenKind::Ident);
            let name = self.t.val.clone();
            if self.symbols.is_reserved(&name) {
                self.sem_err(format!("Can't assign to a reserved symbol \"{}\"", name));
            }
            target = Some(self.lookup(&name));
            self.expect(TokenKind::Assign);
        }
        let value = self.expression();
        if let (Some(sym), Some(expr)) = (target, value) {
            self.symbols.bind(sym, expr);
        }
        Stat::Assignment { target, value }
    }

    fn expression(&mut self) -> Option<ExprId> {
        let mut e = self.simple_expression();
        if self.start_of(1) {
            let op = self.rel_op();
            let right = self.simple_expression();
            e = Some(self.exprs.alloc(Expr::Binary { op, left: e, right }));
        }
        e
    }

    fn simple_expression(&mut self) -> Option<ExprId> {
        let mut e = self.term();
        while self.start_of(2) {
            let op = self.add_op();
            let right = self.term();
            e = Some(self.exprs.alloc(Expr::Binary { op, left: e, right }));
        }
        e
    }

    fn term(&mut self) -> Option<ExprId> {
        let mut e = self.power();
        while self.start_of(3) {
            let op = self.mul_op();
            let right = self.power();
            e = Some(self.exprs.alloc(Expr::Binary { op, left: e, right }));
        }
        e
    }

    fn power(&mut self) -> Option<ExprId> {
        let mut e = self.factor();
        while matches!(self.la.kind, TokenKind::Caret | TokenKind::StarStar) {
            let op = self.power_op();
            let right = self.factor();
            e = Some(self.exprs.alloc(Expr::Binary { op, left: e, right }));
        }
        e
    }

    fn factor(&mut self) -> Option<ExprId> {
        match self.la.kind {
            TokenKind::Ident => {
                self.get();
                let name = self.t.val.clone();
                let sym = self.lookup(&name);
                let mut e = Some(self.exprs.alloc(Expr::Ident { sym }));
                if self.start_of(4) {
                    if matches!(
                        self.la.kind,
                        TokenKind::Squared | TokenKind::Cubed | TokenKind::Bang
                    ) {
                        let op = self.unary_op();
                        e = Some(self.exprs.alloc(Expr::Unary { op, operand: e }));
                    } else {
                        // '(' : a function call
                        self.get();
                        if !self.symbols.is_reserved(&name) {
                            self.sem_err(format!("\"{}\" is not a built-in function", name));
                        }
                        let arg = self.expression();
                        e = Some(self.exprs.alloc(Expr::Call { name, arg }));
                        self.expect_weak(TokenKind::RParen, 6);
                    }
                }
                e
            }
            TokenKind::Number => {
                self.get();
                // permissive conversion: an unconvertible lexeme counts as 0
                let val = self.t.val.parse::<f64>().unwrap_or(0.0);
                let mut e = Some(self.exprs.alloc(Expr::Number { val }));
                if matches!(
                    self.la.kind,
                    TokenKind::Squared | TokenKind::Cubed | TokenKind::Bang
                ) {
                    let op = self.unary_op();
                    e = Some(self.exprs.alloc(Expr::Unary { op, operand: e }));
                }
                e
            }
            TokenKind::Hyphen => {
                self.get();
                let operand = self.factor();
                Some(self.exprs.alloc(Expr::Unary {
                    op: UnOp::Neg,
                    operand,
                }))
            }
            TokenKind::Tilde => {
                self.get();
                let operand = self.factor();
                Some(self.exprs.alloc(Expr::Unary {
                    op: UnOp::Not,
                    operand,
                }))
            }
            TokenKind::True => {
                self.get();
                Some(self.exprs.alloc(Expr::Bool { val: true }))
            }
            TokenKind::False => {
                self.get();
                Some(self.exprs.alloc(Expr::Bool { val: false }))
            }
            TokenKind::LParen => {
                self.get();
                let inner = self.expression();
                self.expect_weak(TokenKind::RParen, 6);
                Some(self.exprs.alloc(Expr::Paren { inner }))
            }
            _ => {
                self.syn_err(SynErr::InvalidFactor);
                None
            }
        }
    }

    fn rel_op(&mut self) -> BinOp {
        match self.la.kind {
            TokenKind::Eq => {
                self.get();
                BinOp::Equ
            }
            TokenKind::Neq => {
                self.get();
                BinOp::Neq
            }
            TokenKind::Lss => {
                self.get();
                BinOp::Lss
            }
            TokenKind::Leq => {
                self.get();
                BinOp::Leq
            }
            TokenKind::Gtr => {
                self.get();
                BinOp::Gtr
            }
            TokenKind::Geq => {
                self.get();
                BinOp::Geq
            }
            _ => {
                self.syn_err(SynErr::InvalidRelOp);
                BinOp::Equ
            }
        }
    }

    fn add_op(&mut self) -> BinOp {
        match self.la.kind {
            TokenKind::Plus => {
                self.get();
                BinOp::Add
            }
            TokenKind::Hyphen | TokenKind::Minus => {
                self.get();
                BinOp::Sub
            }
            TokenKind::Bar => {
                self.get();
                BinOp::Or
            }
            _ => {
                self.syn_err(SynErr::InvalidAddOp);
                BinOp::Add
            }
        }
    }

    fn mul_op(&mut self) -> BinOp {
        match self.la.kind {
            TokenKind::Star | TokenKind::Times => {
                self.get();
                BinOp::Mul
            }
            TokenKind::Slash | TokenKind::Divide => {
                self.get();
                BinOp::Div
            }
            TokenKind::Percent => {
                self.get();
                BinOp::Rem
            }
            TokenKind::Amp => {
                self.get();
                BinOp::And
            }
            _ => {
                self.syn_err(SynErr::InvalidMulOp);
                BinOp::Mul
            }
        }
    }

    fn power_op(&mut self) -> BinOp {
        match self.la.kind {
            TokenKind::Caret | TokenKind::StarStar => {
                self.get();
                BinOp::Pow
            }
            _ => {
                self.syn_err(SynErr::InvalidPowerOp);
                BinOp::Pow
            }
        }
    }

    fn unary_op(&mut self) -> UnOp {
        match self.la.kind {
            TokenKind::Bang => {
                self.get();
                UnOp::Fact
            }
            TokenKind::Squared => {
                self.get();
                UnOp::Sqr
            }
            TokenKind::Cubed => {
                self.get();
                UnOp::Cub
            }
            _ => {
                self.syn_err(SynErr::InvalidUnaryOp);
                UnOp::Fact
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::symtab::Symbol;

    fn parse(src: &str) -> (Program, Diagnostics) {
        Parser::new(Scanner::from_source(src)).parse()
    }

    #[test]
    fn test_clean_parse() {
        let (program, errors) = parse("let x = 2 + 3; x * x");
        assert_eq!(errors.count(), 0);
        let stats = program.statements();
        assert_eq!(stats.len(), 2);
        assert!(matches!(
            stats[0],
            Stat::Assignment { target: Some(_), value: Some(_) }
        ));
        let Stat::Assignment { value: Some(e), target: None } = stats[1] else {
            panic!("expected a plain expression statement");
        };
        assert!(matches!(
            program.exprs[e],
            Expr::Binary { op: BinOp::Mul, left: Some(_), right: Some(_) }
        ));
    }

    #[test]
    fn test_shadowing_declaration_is_recorded() {
        let mut parser = Parser::new(Scanner::from_source(""));
        let first = parser.declare("a");
        let second = parser.declare("a");
        assert_ne!(first, second);
        // the second entry wins, with one recorded diagnostic
        assert_eq!(parser.symbols.find("a"), Some(second));
        let msgs: Vec<_> = parser.errors.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(msgs, ["a declared twice"]);
    }

    #[test]
    fn test_undeclared_name_becomes_variable() {
        let (program, errors) = parse("y + 1");
        assert_eq!(errors.count(), 0);
        let vars: Vec<_> = program.symbols.variables().collect();
        assert_eq!(vars.len(), 1);
        assert!(matches!(vars[0], Symbol::Var { name, val: None, .. } if name == "y"));
    }

    #[test]
    fn test_let_binds_last_assigned_expression() {
        let (program, errors) = parse("let x = 7");
        assert_eq!(errors.count(), 0);
        let Stat::Assignment { target: Some(sym), value: Some(e) } = program.statements()[0]
        else {
            panic!("expected a let statement");
        };
        assert_eq!(program.symbols.value_of(sym), Some(e));
    }

    #[test]
    fn test_reserved_let_target() {
        let (_, errors) = parse("let sin = 1");
        assert_eq!(errors.count(), 1);
        let d = errors.iter().next().unwrap();
        assert_eq!(d.message, "Can't assign to a reserved symbol \"sin\"");
    }

    #[test]
    fn test_reserved_target_still_callable() {
        // shadowing attempt must not break later calls
        let (program, errors) = parse("let sin = 1; sin(0)");
        assert_eq!(errors.count(), 1);
        let Stat::Assignment { value: Some(e), .. } = program.statements()[1] else {
            panic!("expected an expression statement");
        };
        assert!(matches!(&program.exprs[e], Expr::Call { name, arg: Some(_) } if name == "sin"));
    }

    #[test]
    fn test_unknown_function_call() {
        let (program, errors) = parse("foo(2)");
        assert_eq!(errors.count(), 1);
        assert_eq!(
            errors.iter().next().unwrap().message,
            "\"foo\" is not a built-in function"
        );
        // the call node is still built
        let Stat::Assignment { value: Some(e), .. } = program.statements()[0] else {
            panic!("expected an expression statement");
        };
        assert!(matches!(&program.exprs[e], Expr::Call { name, .. } if name == "foo"));
    }

    #[test]
    fn test_missing_separator_is_contained() {
        let (program, errors) = parse("1 2");
        assert_eq!(errors.count(), 1);
        assert_eq!(errors.iter().next().unwrap().message, "\";\" expected");
        assert_eq!(program.statements().len(), 2);
    }

    #[test]
    fn test_invalid_factor() {
        let (_, errors) = parse("let x = ;");
        assert!(errors.iter().any(|d| d.message == "invalid Factor"));
    }

    #[test]
    fn test_error_throttling() {
        // the failed Ident and Assign expects are close together: only the
        // first is reported
        let (_, errors) = parse("let * = 1");
        assert_eq!(errors.count(), 1);
        assert_eq!(errors.iter().next().unwrap().message, "ident expected");
    }

    #[test]
    fn test_unknown_token_skipped() {
        let (program, errors) = parse("1 @ + 2");
        assert_eq!(errors.count(), 0);
        let Stat::Assignment { value: Some(e), .. } = program.statements()[0] else {
            panic!("expected an expression statement");
        };
        assert!(matches!(
            program.exprs[e],
            Expr::Binary { op: BinOp::Add, .. }
        ));
    }

    #[test]
    fn test_power_is_left_associative() {
        let (program, errors) = parse("2 ^ 3 ^ 2");
        assert_eq!(errors.count(), 0);
        let Stat::Assignment { value: Some(e), .. } = program.statements()[0] else {
            panic!("expected an expression statement");
        };
        let Expr::Binary { op: BinOp::Pow, left: Some(l), .. } = program.exprs[e] else {
            panic!("expected a power node");
        };
        assert!(matches!(
            program.exprs[l],
            Expr::Binary { op: BinOp::Pow, .. }
        ));
    }

    #[test]
    fn test_unicode_and_ascii_operators_agree() {
        let (p1, e1) = parse("6 × 7 − 2 ÷ 2");
        let (p2, e2) = parse("6 * 7 - 2 / 2");
        assert_eq!(e1.count(), 0);
        assert_eq!(e2.count(), 0);
        assert_eq!(p1.exprs.len(), p2.exprs.len());
    }

    #[test]
    fn test_prefixed_literal_is_not_a_factor() {
        // 0x1F lexes fine but the grammar only accepts plain numbers
        let (_, errors) = parse("0x1F");
        assert!(errors.iter().any(|d| d.message == "invalid Factor"));
    }

    #[test]
    fn test_postfix_on_number() {
        let (program, errors) = parse("5!");
        assert_eq!(errors.count(), 0);
        let Stat::Assignment { value: Some(e), .. } = program.statements()[0] else {
            panic!("expected an expression statement");
        };
        assert!(matches!(
            program.exprs[e],
            Expr::Unary { op: UnOp::Fact, operand: Some(_) }
        ));
    }
}
