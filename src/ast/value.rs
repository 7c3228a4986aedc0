//! Numeric evaluation of the AST.
//!
//! All arithmetic is IEEE `f64` and total: division by zero follows IEEE
//! (infinities, NaN), the integer-flavored operators truncate through
//! `i64`, and missing operands (error-recovery holes) count as 0.  An
//! unbound variable evaluates to 0; a call to an unregistered function
//! evaluates its argument and yields 0.

use libm::tgamma;

use crate::ast::{BinOp, Expr, ExprId, Program, Stat, UnOp};
use crate::parser::symtab::{self, Symbol};

/// Value of a statement: the value of its expression (0 for blocks and
/// for statements that lost their expression to error recovery).
pub fn stat_value(program: &Program, stat: &Stat) -> f64 {
    match stat {
        Stat::Assignment { value, .. } => opt_value(program, *value),
        Stat::Block(_) => 0.0,
    }
}

/// Values of a program's statements, in source order.
pub fn program_values(program: &Program) -> Vec<f64> {
    program
        .statements()
        .iter()
        .map(|s| stat_value(program, s))
        .collect()
}

fn opt_value(program: &Program, expr: Option<ExprId>) -> f64 {
    expr.map(|id| expr_value(program, id)).unwrap_or(0.0)
}

/// Evaluates a single expression.
pub fn expr_value(program: &Program, id: ExprId) -> f64 {
    match &program.exprs[id] {
        Expr::Number { val } => *val,
        Expr::Bool { val } => {
            if *val {
                1.0
            } else {
                0.0
            }
        }
        Expr::Ident { sym } => match program.symbols.get(*sym) {
            Symbol::Var { val, .. } => opt_value(program, *val),
            Symbol::Builtin { .. } => 0.0,
        },
        Expr::Paren { inner } => opt_value(program, *inner),
        Expr::Call { name, arg } => {
            let x = opt_value(program, *arg);
            match symtab::builtin(name) {
                Some(func) => func(x),
                None => 0.0,
            }
        }
        Expr::Unary { op, operand } => {
            let x = opt_value(program, *operand);
            match op {
                UnOp::Neg => -x,
                UnOp::Not => !(x as i64) as f64,
                UnOp::Fact => tgamma(x + 1.0),
                UnOp::Sqr => x * x,
                UnOp::Cub => x * x * x,
            }
        }
        Expr::Binary { op, left, right } => {
            let l = opt_value(program, *left);
            let r = opt_value(program, *right);
            match op {
                BinOp::Add => l + r,
                BinOp::Sub => l - r,
                BinOp::Mul => l * r,
                BinOp::Div => l / r,
                // checked_rem: None for a zero divisor and for the one
                // overflowing pair (i64::MIN % -1), both become NaN
                BinOp::Rem => (l as i64)
                    .checked_rem(r as i64)
                    .map(|v| v as f64)
                    .unwrap_or(f64::NAN),
                BinOp::And => ((l as i64) & (r as i64)) as f64,
                BinOp::Or => ((l as i64) | (r as i64)) as f64,
                BinOp::Pow => l.powf(r),
                BinOp::Equ => bool_val(l == r),
                BinOp::Neq => bool_val(l != r),
                BinOp::Lss => bool_val(l < r),
                BinOp::Leq => bool_val(l <= r),
                BinOp::Gtr => bool_val(l > r),
                BinOp::Geq => bool_val(l >= r),
            }
        }
    }
}

fn bool_val(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use crate::scanner::Scanner;

    fn values(src: &str) -> Vec<f64> {
        let (program, errors) = Parser::new(Scanner::from_source(src)).parse();
        assert_eq!(errors.count(), 0, "unexpected diagnostics for {:?}", src);
        program_values(&program)
    }

    fn value(src: &str) -> f64 {
        *values(src).last().unwrap()
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(value("2 + 3 * 4"), 14.0);
        assert_eq!(value("(2 + 3) * 4"), 20.0);
        assert_eq!(value("7 - 2 - 1"), 4.0);
        assert_eq!(value("10 / 4"), 2.5);
    }

    #[test]
    fn test_variable_binding() {
        assert_eq!(values("let x = 2 + 3; x * x"), vec![5.0, 25.0]);
    }

    #[test]
    fn test_rebinding_uses_last_assignment() {
        assert_eq!(values("let x = 1; let x = 10; x + 1"), vec![1.0, 10.0, 11.0]);
    }

    #[test]
    fn test_unbound_variable_is_zero() {
        assert_eq!(value("y + 1"), 1.0);
    }

    #[test]
    fn test_booleans_and_comparisons() {
        assert_eq!(value("true"), 1.0);
        assert_eq!(value("false"), 0.0);
        assert_eq!(value("2 < 3"), 1.0);
        assert_eq!(value("2 >= 3"), 0.0);
        assert_eq!(value("2 == 2"), 1.0);
        assert_eq!(value("2 != 2"), 0.0);
    }

    #[test]
    fn test_power_left_associative() {
        assert_eq!(value("2 ^ 3 ^ 2"), 64.0);
        assert_eq!(value("2 ** 10"), 1024.0);
    }

    #[test]
    fn test_postfix_operators() {
        assert!((value("5!") - 120.0).abs() < 1e-9);
        assert_eq!(value("4²"), 16.0);
        assert_eq!(value("2³"), 8.0);
        assert!((value("0!") - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_integer_flavored_operators() {
        assert_eq!(value("7 % 3"), 1.0);
        assert_eq!(value("6 & 3"), 2.0);
        assert_eq!(value("6 | 3"), 7.0);
        assert_eq!(value("~0"), -1.0);
        // truncation happens before the integer op
        assert_eq!(value("7.9 % 2.9"), 1.0);
    }

    #[test]
    fn test_zero_operands() {
        assert_eq!(value("1 / 0"), f64::INFINITY);
        assert_eq!(value("-1 / 0"), f64::NEG_INFINITY);
        assert!(value("0 / 0").is_nan());
        assert!(value("1 % 0").is_nan());
        assert_eq!(value("0 ^ 0"), 1.0);
    }

    #[test]
    fn test_remainder_overflow_is_nan() {
        // the most negative i64 by -1 has no representable remainder
        assert!(value("-9223372036854775808 % -1").is_nan());
        assert!(value("(0 - 2 ^ 63) % (0 - 1)").is_nan());
    }

    #[test]
    fn test_builtin_calls() {
        assert_eq!(value("sqrt(9) + 3"), 6.0);
        assert_eq!(value("abs(0 - 5)"), 5.0);
        assert_eq!(value("log(1000)"), 3.0);
        assert!((value("sin(0)") - 0.0).abs() < 1e-12);
        assert_eq!(value("cbrt(27)"), 3.0);
    }

    #[test]
    fn test_underscored_literal_is_lenient_zero() {
        // "1_000" lexes as one number but does not convert; it counts as 0
        assert_eq!(value("1_000"), 0.0);
    }

    #[test]
    fn test_unknown_call_is_zero() {
        let (program, errors) = Parser::new(Scanner::from_source("foo(5) + 1")).parse();
        assert_eq!(errors.count(), 1);
        assert_eq!(program_values(&program), vec![1.0]);
    }

    #[test]
    fn test_unary_minus_and_unicode() {
        assert_eq!(value("-3 + 5"), 2.0);
        assert_eq!(value("6 × 7"), 42.0);
        assert_eq!(value("9 ÷ 2"), 4.5);
        assert_eq!(value("5 − 8"), -3.0);
    }
}
