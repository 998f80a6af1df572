// Operand order, arithmetic and conversions

use finn::config::EngineConfig;
use finn::interpreter::{Interpreter, RuntimeError};
use finn::lexer::tokenize;
use pretty_assertions::assert_eq;

fn run(source: &str) -> Interpreter {
    let lexed = tokenize(source, "main.finn").expect("lexing failed");
    let mut interpreter = Interpreter::new(lexed.tokens, EngineConfig::default());
    let _ = interpreter.run();
    interpreter
}

fn output(source: &str) -> Vec<String> {
    let interpreter = run(source);
    assert!(
        interpreter.halted().is_none(),
        "unexpected halt: {:?}",
        interpreter.halted()
    );
    interpreter.console().output()
}

fn halt(source: &str) -> RuntimeError {
    run(source)
        .halted()
        .cloned()
        .expect("program should have halted")
}

#[test]
fn test_right_operand_is_on_top() {
    assert_eq!(output("10 4 - print"), vec!["6"]);
    assert_eq!(output("10 4 / print"), vec!["2"]);
    assert_eq!(output("10 4 % print"), vec!["2"]);
    assert_eq!(output("2 10 ** print"), vec!["1024"]);
}

#[test]
fn test_negative_literals() {
    assert_eq!(output("10 -4 - print"), vec!["14"]);
    assert_eq!(output("-7 2 / print"), vec!["-3"]);
}

#[test]
fn test_float_promotion() {
    assert_eq!(output("1.5 2 * print"), vec!["3.0"]);
    assert_eq!(output("1 0.25 + print"), vec!["1.25"]);
    assert_eq!(output("2 -1 ** print"), vec!["0.5"]);
}

#[test]
fn test_string_concatenation() {
    assert_eq!(output("\"fin\" \"n\" + print"), vec!["finn"]);
}

#[test]
fn test_comparisons_and_logic() {
    assert_eq!(
        output("3 2 > print 3 2 < print 2 2 <= print 1 1.0 == print"),
        vec!["true", "false", "true", "true"]
    );
    assert_eq!(
        output("true false and print true false or print false not print"),
        vec!["false", "true", "true"]
    );
    assert_eq!(output("\"a\" \"b\" != print"), vec!["true"]);
}

#[test]
fn test_stack_shuffles() {
    assert_eq!(output("1 2 swap - print"), vec!["1"]);
    assert_eq!(output("3 dup * print"), vec!["9"]);
    assert_eq!(output("1 2 drop print"), vec!["1"]);
}

#[test]
fn test_variables_and_compound_assignment() {
    assert_eq!(output("x 5 = x ! print"), vec!["5"]);
    assert_eq!(output("x 5 = x 3 += x ! print"), vec!["8"]);
    assert_eq!(output("x 5 = x 2 *= x 20 -= x ! print"), vec!["-10"]);
    assert_eq!(output("n 1 = n ++ n ++ n -- n ! print"), vec!["2"]);
    assert_eq!(output("x :: 7 x ! print"), vec!["7"]);
}

#[test]
fn test_drop_of_a_name_removes_the_variable() {
    let interpreter = run("x 1 = x drop");
    assert!(interpreter.namespaces().variable("x").is_none());
    assert!(interpreter.stack().is_empty());
}

#[test]
fn test_conversions() {
    assert_eq!(output("\"42\" int 1 + print"), vec!["43"]);
    assert_eq!(output("3 float print"), vec!["3.0"]);
    assert_eq!(output("5 str \"!\" + print"), vec!["5!"]);
    assert_eq!(output("2.9 int print"), vec!["2"]);
    assert_eq!(output("0 bool print"), vec!["false"]);
    assert!(matches!(
        halt("\"abc\" int"),
        RuntimeError::InvalidConversion { .. }
    ));
}

#[test]
fn test_arithmetic_errors() {
    assert!(matches!(
        halt("1 0 /"),
        RuntimeError::DivisionByZero { op: "/", .. }
    ));
    assert!(matches!(
        halt("9223372036854775807 1 +"),
        RuntimeError::IntegerOverflow { .. }
    ));
    assert!(matches!(
        halt("1 \"a\" -"),
        RuntimeError::TypeError { op: "-", .. }
    ));
    assert!(matches!(
        halt("1 +"),
        RuntimeError::StackUnderflow { op: "+", needed: 2, .. }
    ));
}

#[test]
fn test_compound_assignment_needs_a_variable() {
    assert!(matches!(
        halt("y 1 +="),
        RuntimeError::UndefinedVariable { .. }
    ));
}
