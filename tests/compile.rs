//! End-to-end tests over the public pipeline: source text in, diagnostics,
//! values, and MathML out.

use mathmlc::ast::{dump, mathml, value};
use mathmlc::compile;
use mathmlc::parser::Symbol;

#[test]
fn test_values_flow_between_statements() {
    let (program, errors) = compile("let x = 2 + 3; x * x");
    assert_eq!(errors.count(), 0);
    assert_eq!(value::program_values(&program), vec![5.0, 25.0]);
}

#[test]
fn test_builtin_call_value_and_markup() {
    let (program, errors) = compile("sqrt(9) + 3");
    assert_eq!(errors.count(), 0);
    assert_eq!(value::program_values(&program), vec![6.0]);
    let html = mathml::render(&program);
    assert!(html.starts_with("<math>\n"));
    assert!(html.contains("<msqrt>"));
    assert!(html.ends_with("</math>\n"));
}

#[test]
fn test_undeclared_variable_defaults_to_zero() {
    let (program, errors) = compile("y + 2");
    assert_eq!(errors.count(), 0);
    assert_eq!(value::program_values(&program), vec![2.0]);
    assert!(program
        .symbols
        .variables()
        .any(|s| matches!(s, Symbol::Var { name, .. } if name == "y")));
}

#[test]
fn test_reserved_name_reassignment() {
    let (program, errors) = compile("let sin = 1; sin(0)");
    assert_eq!(errors.count(), 1);
    assert_eq!(
        errors.iter().next().unwrap().to_string(),
        "-- line 1 col 5: Can't assign to a reserved symbol \"sin\""
    );
    // the call still resolves through the registry
    assert_eq!(value::program_values(&program), vec![1.0, 0.0]);
}

#[test]
fn test_stray_token_is_contained() {
    let (program, errors) = compile("1 2; 3");
    assert_eq!(errors.count(), 1);
    assert_eq!(value::program_values(&program), vec![1.0, 2.0, 3.0]);
}

#[test]
fn test_junk_input_still_produces_a_program() {
    let (program, errors) = compile("@ ) let ; ~");
    assert!(errors.count() >= 1);
    // every statement slot still exists and evaluates
    let values = value::program_values(&program);
    assert!(!values.is_empty());
    assert!(values.iter().all(|v| v.is_finite()));
}

#[test]
fn test_missing_paren_recovers() {
    let (program, errors) = compile("(1 + 2; 4");
    assert!(errors.count() >= 1);
    assert_eq!(value::program_values(&program), vec![3.0, 4.0]);
}

#[test]
fn test_factorial_and_postfix_powers() {
    let (program, errors) = compile("let a = 5!; 3² + 4²");
    assert_eq!(errors.count(), 0);
    let values = value::program_values(&program);
    assert!((values[0] - 120.0).abs() < 1e-9);
    assert_eq!(values[1], 25.0);
}

#[test]
fn test_unicode_operator_program() {
    let (program, errors) = compile("6 × 7 − 2 ÷ 4");
    assert_eq!(errors.count(), 0);
    assert_eq!(value::program_values(&program), vec![41.5]);
}

#[test]
fn test_comments_and_whitespace_are_invisible() {
    let (program, errors) = compile("/* header /* nested */ */ 1 + // trailing\n1");
    assert_eq!(errors.count(), 0);
    assert_eq!(value::program_values(&program), vec![2.0]);
}

#[test]
fn test_render_is_stable_across_calls() {
    let (program, _) = compile("let y = sqrt(3² + 4²); abs(y / 5)");
    let first = mathml::render(&program);
    assert_eq!(first, mathml::render(&program));
}

#[test]
fn test_dump_reports_values() {
    let (program, errors) = compile("let x = 2; x + 1");
    assert_eq!(errors.count(), 0);
    let text = dump::dump(&program);
    assert!(text.contains("x = 2"));
    assert!(text.contains("=> 3"));
}

#[test]
fn test_diagnostics_are_position_stamped() {
    let (_, errors) = compile("1;\n  0x10");
    assert_eq!(errors.count(), 1);
    let d = errors.iter().next().unwrap();
    assert_eq!((d.line, d.col), (2, 3));
    assert_eq!(d.message, "invalid Factor");
}

#[test]
fn test_relational_chain_is_single_comparison() {
    // the grammar allows at most one relational operator per expression
    let (program, errors) = compile("1 < 2");
    assert_eq!(errors.count(), 0);
    assert_eq!(value::program_values(&program), vec![1.0]);
}
