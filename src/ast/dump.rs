//! Indented textual dump of the AST, with per-statement values.
//!
//! A debugging aid: prints the statement tree with one line per
//! statement, its expression in prefix-annotated infix form, and the
//! evaluated value on a `=>` line underneath.

use crate::ast::{Expr, ExprId, Program, Stat};
use crate::ast::value;

/// Dumps the whole program.
pub fn dump(program: &Program) -> String {
    let mut out = String::new();
    dump_stat(program, &program.block, 0, &mut out);
    out
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn dump_stat(program: &Program, stat: &Stat, depth: usize, out: &mut String) {
    match stat {
        Stat::Block(stats) => {
            indent(out, depth);
            out.push_str("Block(\n");
            for s in stats {
                dump_stat(program, s, depth + 1, out);
                indent(out, depth + 1);
                out.push_str(&format!("=> {}\n", value::stat_value(program, s)));
            }
            indent(out, depth);
            out.push_str(")\n");
        }
        Stat::Assignment { target, value } => {
            indent(out, depth);
            if let Some(sym) = target {
                out.push_str(program.symbols.name_of(*sym));
                out.push_str(" = ");
            }
            dump_opt(program, *value, out);
            out.push('\n');
        }
    }
}

fn dump_opt(program: &Program, expr: Option<ExprId>, out: &mut String) {
    match expr {
        Some(id) => dump_expr(program, id, out),
        None => out.push('?'),
    }
}

fn dump_expr(program: &Program, id: ExprId, out: &mut String) {
    match &program.exprs[id] {
        Expr::Number { val } => out.push_str(&val.to_string()),
        Expr::Bool { val } => out.push_str(&val.to_string()),
        Expr::Ident { sym } => out.push_str(program.symbols.name_of(*sym)),
        Expr::Paren { inner } => {
            out.push('(');
            dump_opt(program, *inner, out);
            out.push(')');
        }
        Expr::Call { name, arg } => {
            out.push_str(name);
            out.push('(');
            dump_opt(program, *arg, out);
            out.push(')');
        }
        Expr::Unary { op, operand } => {
            out.push('(');
            out.push_str(&format!("{:?} ", op));
            dump_opt(program, *operand, out);
            out.push(')');
        }
        Expr::Binary { op, left, right } => {
            out.push('(');
            dump_opt(program, *left, out);
            out.push_str(&format!(" {:?} ", op));
            dump_opt(program, *right, out);
            out.push(')');
        }
    }
}
