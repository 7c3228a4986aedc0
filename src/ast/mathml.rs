//! Presentation-MathML rendering of the AST.
//!
//! Rendering is a pure function of the tree: no state, no side effects,
//! so rendering twice gives byte-identical output.  Layout decisions
//! follow hand-written MathML conventions: division becomes a fraction,
//! powers a superscript, `sqrt`/`cbrt` radicals, `abs` a `|`-fenced row.
//! Simple fenced content keeps literal `<mo>` delimiters; content that
//! already contains nested layout is wrapped in `<mfenced>` so the
//! delimiters stretch.

use crate::ast::{BinOp, Expr, ExprId, Program, Stat, UnOp};

/// Renders a whole program as one `<math>` element, one `<mrow>` per
/// statement.
pub fn render(program: &Program) -> String {
    let mut out = String::from("<math>\n");
    out.push_str(&stat_mathml(program, &program.block));
    out.push_str("</math>\n");
    out
}

/// Renders one statement (or a block of them).
pub fn stat_mathml(program: &Program, stat: &Stat) -> String {
    match stat {
        Stat::Block(stats) => stats.iter().map(|s| stat_mathml(program, s)).collect(),
        Stat::Assignment { target, value } => {
            let mut out = String::from("<mrow>\n");
            if let Some(sym) = target {
                out.push_str(&variable(program.symbols.name_of(*sym)));
                out.push_str(&symbol("="));
            }
            out.push_str(&opt_mathml(program, *value));
            out.push_str("</mrow>\n");
            out
        }
    }
}

fn opt_mathml(program: &Program, expr: Option<ExprId>) -> String {
    expr.map(|id| expr_mathml(program, id)).unwrap_or_default()
}

/// Renders a single expression.
pub fn expr_mathml(program: &Program, id: ExprId) -> String {
    match &program.exprs[id] {
        Expr::Number { val } => number(*val),
        Expr::Bool { val } => format!("<mn>{}</mn>\n", val),
        Expr::Ident { sym } => variable(program.symbols.name_of(*sym)),
        Expr::Unary { op, operand } => {
            let x = opt_mathml(program, *operand);
            match op {
                UnOp::Neg => symbol("-") + &x,
                UnOp::Not => symbol("~") + &x,
                UnOp::Sqr => power(&x, &number(2.0)),
                UnOp::Cub => power(&x, &number(3.0)),
                UnOp::Fact => x + &symbol("!"),
            }
        }
        Expr::Binary { op, left, right } => {
            let l = opt_mathml(program, *left);
            let r = opt_mathml(program, *right);
            match op {
                BinOp::Div => fraction(&l, &r),
                BinOp::Pow => power(&l, &r),
                // invisible times
                BinOp::Mul => l + &symbol("") + &r,
                BinOp::Add => l + &symbol("+") + &r,
                BinOp::Sub => l + &symbol("-") + &r,
                BinOp::Rem => l + &symbol("%") + &r,
                BinOp::And => l + &symbol("&") + &r,
                BinOp::Or => l + &symbol("|") + &r,
                BinOp::Equ => l + &symbol("=") + &r,
                BinOp::Neq => l + &symbol("!=") + &r,
                BinOp::Lss => l + &symbol("<") + &r,
                BinOp::Leq => l + &symbol("<=") + &r,
                BinOp::Gtr => l + &symbol(">") + &r,
                BinOp::Geq => l + &symbol(">=") + &r,
            }
        }
        Expr::Paren { inner } => fenced(&opt_mathml(program, *inner), "(", ")"),
        Expr::Call { name, arg } => {
            let x = opt_mathml(program, *arg);
            match name.as_str() {
                "sqrt" => root(&x, 2),
                "cbrt" => root(&x, 3),
                "abs" => fenced(&x, "|", "|"),
                _ => variable(name) + &fenced(&x, "(", ")"),
            }
        }
    }
}

fn symbol(x: &str) -> String {
    format!("<mo>{}</mo>\n", x)
}

fn variable(v: &str) -> String {
    format!("<mi>{}</mi>\n", v)
}

fn number(n: f64) -> String {
    format!("<mn>{}</mn>\n", n)
}

fn power(base: &str, exponent: &str) -> String {
    format!("<msup>\n{}{}</msup>\n", base, exponent)
}

fn fraction(num: &str, den: &str) -> String {
    format!("<mfrac>\n{}{}</mfrac>\n", num, den)
}

fn root(radicand: &str, degree: i32) -> String {
    if degree == 2 {
        format!("<msqrt>\n{}</msqrt>\n", radicand)
    } else {
        format!(
            "<mroot>\n<mrow>\n{}</mrow>\n{}</mroot>\n",
            radicand,
            number(f64::from(degree))
        )
    }
}

/// Whether rendered content already contains nested layout, in which case
/// fencing must use `<mfenced>` for stretchy delimiters.
fn is_complex(x: &str) -> bool {
    ["<mfrac>", "<msup>", "<msqrt>", "<mroot>", "<mrow>"]
        .iter()
        .any(|tag| x.contains(tag))
}

fn fenced(x: &str, open: &str, close: &str) -> String {
    if is_complex(x) {
        let attrs = if open == "(" && close == ")" {
            String::new()
        } else {
            format!(" open=\"{}\" close=\"{}\"", open, close)
        };
        format!("<mfenced{}>\n<mrow>\n{}</mrow>\n</mfenced>\n", attrs, x)
    } else {
        symbol(open) + x + &symbol(close)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::parser::Parser;
    use crate::scanner::Scanner;

    fn rendered(src: &str) -> String {
        let (program, _) = Parser::new(Scanner::from_source(src)).parse();
        render(&program)
    }

    #[test]
    fn test_division_becomes_fraction() {
        assert_eq!(
            rendered("6 / 2"),
            "<math>\n<mrow>\n<mfrac>\n<mn>6</mn>\n<mn>2</mn>\n</mfrac>\n</mrow>\n</math>\n"
        );
    }

    #[test]
    fn test_let_emits_name_and_equals() {
        assert_eq!(
            rendered("let x = 2"),
            "<math>\n<mrow>\n<mi>x</mi>\n<mo>=</mo>\n<mn>2</mn>\n</mrow>\n</math>\n"
        );
    }

    #[test]
    fn test_sqrt_is_radical() {
        assert_eq!(
            rendered("sqrt(9)"),
            "<math>\n<mrow>\n<msqrt>\n<mn>9</mn>\n</msqrt>\n</mrow>\n</math>\n"
        );
    }

    #[test]
    fn test_cbrt_has_explicit_degree() {
        assert_eq!(
            rendered("cbrt(27)"),
            "<math>\n<mrow>\n<mroot>\n<mrow>\n<mn>27</mn>\n</mrow>\n<mn>3</mn>\n</mroot>\n</mrow>\n</math>\n"
        );
    }

    #[test]
    fn test_squared_postfix_is_superscript() {
        assert_eq!(
            rendered("x²"),
            "<math>\n<mrow>\n<msup>\n<mi>x</mi>\n<mn>2</mn>\n</msup>\n</mrow>\n</math>\n"
        );
    }

    #[test]
    fn test_multiplication_is_invisible() {
        assert_eq!(
            rendered("2 * 3"),
            "<math>\n<mrow>\n<mn>2</mn>\n<mo></mo>\n<mn>3</mn>\n</mrow>\n</math>\n"
        );
    }

    #[test]
    fn test_abs_simple_content_keeps_literal_bars() {
        assert_eq!(
            rendered("abs(5)"),
            "<math>\n<mrow>\n<mo>|</mo>\n<mn>5</mn>\n<mo>|</mo>\n</mrow>\n</math>\n"
        );
    }

    #[test]
    fn test_abs_complex_content_is_mfenced() {
        assert_eq!(
            rendered("abs(1 / 2)"),
            "<math>\n<mrow>\n<mfenced open=\"|\" close=\"|\">\n<mrow>\n\
             <mfrac>\n<mn>1</mn>\n<mn>2</mn>\n</mfrac>\n</mrow>\n</mfenced>\n</mrow>\n</math>\n"
        );
    }

    #[test]
    fn test_call_with_complex_argument() {
        assert_eq!(
            rendered("sin(1 / 2)"),
            "<math>\n<mrow>\n<mi>sin</mi>\n<mfenced>\n<mrow>\n\
             <mfrac>\n<mn>1</mn>\n<mn>2</mn>\n</mfrac>\n</mrow>\n</mfenced>\n</mrow>\n</math>\n"
        );
    }

    #[test]
    fn test_call_with_simple_argument() {
        assert_eq!(
            rendered("sin(0)"),
            "<math>\n<mrow>\n<mi>sin</mi>\n<mo>(</mo>\n<mn>0</mn>\n<mo>)</mo>\n</mrow>\n</math>\n"
        );
    }

    #[test]
    fn test_parens_fence_simple_content() {
        assert_eq!(
            rendered("(1 + 2)"),
            "<math>\n<mrow>\n<mo>(</mo>\n<mn>1</mn>\n<mo>+</mo>\n<mn>2</mn>\n<mo>)</mo>\n</mrow>\n</math>\n"
        );
    }

    #[test]
    fn test_parens_fence_complex_content() {
        assert_eq!(
            rendered("(1 / 2)"),
            "<math>\n<mrow>\n<mfenced>\n<mrow>\n\
             <mfrac>\n<mn>1</mn>\n<mn>2</mn>\n</mfrac>\n</mrow>\n</mfenced>\n</mrow>\n</math>\n"
        );
    }

    #[test]
    fn test_factorial_renders_postfix() {
        assert_eq!(
            rendered("5!"),
            "<math>\n<mrow>\n<mn>5</mn>\n<mo>!</mo>\n</mrow>\n</math>\n"
        );
    }

    #[test]
    fn test_fractional_number_text() {
        assert_eq!(
            rendered("2.5"),
            "<math>\n<mrow>\n<mn>2.5</mn>\n</mrow>\n</math>\n"
        );
    }

    #[test]
    fn test_one_mrow_per_statement() {
        assert_eq!(
            rendered("1; 2"),
            "<math>\n<mrow>\n<mn>1</mn>\n</mrow>\n<mrow>\n<mn>2</mn>\n</mrow>\n</math>\n"
        );
    }

    #[test]
    fn test_rendering_is_idempotent() {
        let (program, _) =
            Parser::new(Scanner::from_source("let y = sqrt(3² + 4²); y / 5")).parse();
        assert_eq!(render(&program), render(&program));
    }
}
