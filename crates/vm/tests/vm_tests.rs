//! Integration tests for the IPPcode19 interpreter.

use ippcode_common::{Program, RawArg, RawInstruction};
use ippcode_vm::{run, Outcome, RuntimeError};
use proptest::prelude::*;

/// Build a program from one-line instructions like `ADD GF@x int@1 GF@y`.
///
/// `GF@`/`LF@`/`TF@` tokens are variables, other `kind@text` tokens are
/// literals and bare tokens are labels (or the type operand of READ).
fn program(lines: &[&str]) -> Program {
    let raw: Vec<RawInstruction> = lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let mut tokens = line.split_whitespace();
            let opcode = tokens.next().unwrap();
            let args = tokens
                .enumerate()
                .map(|(pos, tok)| match tok.split_once('@') {
                    Some(("GF" | "LF" | "TF", _)) => RawArg::new("var", tok),
                    Some((kind, text)) => RawArg::new(kind, text),
                    None if opcode.eq_ignore_ascii_case("READ") && pos == 1 => {
                        RawArg::new("type", tok)
                    }
                    None => RawArg::new("label", tok),
                })
                .collect();
            RawInstruction::new(i as i64 + 1, opcode, args)
        })
        .collect();
    ippcode_verifier::verify(&raw).unwrap()
}

struct Run {
    result: Result<Outcome, RuntimeError>,
    stdout: String,
    stderr: String,
}

fn exec_with_input(lines: &[&str], input: &str) -> Run {
    let program = program(lines);
    let mut out = Vec::new();
    let mut err = Vec::new();
    let result = run(&program, input.as_bytes(), &mut out, &mut err);
    Run {
        result,
        stdout: String::from_utf8(out).unwrap(),
        stderr: String::from_utf8(err).unwrap(),
    }
}

fn exec(lines: &[&str]) -> Run {
    exec_with_input(lines, "")
}

/// Stdout of a run that must succeed.
fn output(lines: &[&str]) -> String {
    let run = exec(lines);
    assert!(run.result.is_ok(), "unexpected error: {:?}", run.result);
    run.stdout
}

/// Exit code of a run that must fail.
fn error_code(lines: &[&str]) -> i32 {
    exec(lines).result.unwrap_err().exit_code()
}

// ========================================================
// Basics
// ========================================================

#[test]
fn empty_program_exits_zero() {
    let run = exec(&[]);
    assert_eq!(run.result.unwrap().exit_code, 0);
    assert_eq!(run.stdout, "");
}

#[test]
fn write_each_type() {
    assert_eq!(
        output(&[
            "WRITE int@-12",
            "WRITE bool@true",
            "WRITE nil@nil",
            "WRITE string@a\\032b\\010",
        ]),
        "-12truea b\n"
    );
}

#[test]
fn move_copies_value() {
    assert_eq!(
        output(&[
            "DEFVAR GF@a",
            "DEFVAR GF@b",
            "MOVE GF@a string@x",
            "MOVE GF@b GF@a",
            "MOVE GF@a string@y",
            "WRITE GF@b",
            "WRITE GF@a",
        ]),
        "xy"
    );
}

#[test]
fn explicit_exit_code() {
    let run = exec(&["WRITE int@1", "EXIT int@7", "WRITE int@2"]);
    assert_eq!(run.result.unwrap().exit_code, 7);
    assert_eq!(run.stdout, "1");
}

#[test]
fn exit_range_and_type() {
    assert_eq!(exec(&["EXIT int@0"]).result.unwrap().exit_code, 0);
    assert_eq!(exec(&["EXIT int@49"]).result.unwrap().exit_code, 49);
    assert_eq!(error_code(&["EXIT int@50"]), 57);
    assert_eq!(error_code(&["EXIT int@-1"]), 57);
    assert_eq!(error_code(&["EXIT string@0"]), 53);
}

// ========================================================
// Variables and frames
// ========================================================

#[test]
fn undefined_variable_is_54() {
    assert_eq!(error_code(&["WRITE GF@nope"]), 54);
    assert_eq!(error_code(&["MOVE GF@nope int@1"]), 54);
}

#[test]
fn redeclared_variable_is_52() {
    assert_eq!(error_code(&["DEFVAR GF@x", "DEFVAR GF@x"]), 52);
}

#[test]
fn uninitialized_read_is_56() {
    for op in [
        "WRITE GF@x",
        "PUSHS GF@x",
        "ADD GF@y GF@x int@1",
        "CONCAT GF@y GF@x string@a",
        "EQ GF@y GF@x nil@nil",
        "MOVE GF@y GF@x",
        "DPRINT GF@x",
    ] {
        assert_eq!(
            error_code(&["DEFVAR GF@x", "DEFVAR GF@y", op]),
            56,
            "{op}"
        );
    }
}

#[test]
fn type_of_uninitialized_is_empty_string() {
    assert_eq!(
        output(&[
            "DEFVAR GF@x",
            "DEFVAR GF@t",
            "TYPE GF@t GF@x",
            "WRITE GF@t",
            "WRITE string@|",
            "MOVE GF@x int@1",
            "TYPE GF@t GF@x",
            "WRITE GF@t",
        ]),
        "|int"
    );
}

#[test]
fn type_of_literals() {
    assert_eq!(
        output(&[
            "DEFVAR GF@t",
            "TYPE GF@t bool@false",
            "WRITE GF@t",
            "TYPE GF@t nil@nil",
            "WRITE GF@t",
            "TYPE GF@t string@",
            "WRITE GF@t",
        ]),
        "boolnilstring"
    );
}

#[test]
fn missing_frames_are_55() {
    assert_eq!(error_code(&["DEFVAR TF@x"]), 55);
    assert_eq!(error_code(&["DEFVAR LF@x"]), 55);
    assert_eq!(error_code(&["PUSHFRAME"]), 55);
    assert_eq!(error_code(&["POPFRAME"]), 55);
    assert_eq!(error_code(&["CREATEFRAME", "PUSHFRAME", "DEFVAR TF@x"]), 55);
}

#[test]
fn frame_round_trip_moves_not_copies() {
    assert_eq!(
        output(&[
            "CREATEFRAME",
            "DEFVAR TF@v",
            "MOVE TF@v int@1",
            "PUSHFRAME",
            "MOVE LF@v int@2",
            "POPFRAME",
            "WRITE TF@v",
        ]),
        "2"
    );
}

#[test]
fn createframe_discards_previous_temporary() {
    assert_eq!(
        error_code(&["CREATEFRAME", "DEFVAR TF@v", "CREATEFRAME", "WRITE TF@v"]),
        54
    );
}

#[test]
fn nested_local_frames() {
    assert_eq!(
        output(&[
            "CREATEFRAME",
            "DEFVAR TF@depth",
            "MOVE TF@depth int@1",
            "PUSHFRAME",
            "CREATEFRAME",
            "DEFVAR TF@depth",
            "MOVE TF@depth int@2",
            "PUSHFRAME",
            "WRITE LF@depth",
            "POPFRAME",
            "WRITE LF@depth",
            "WRITE TF@depth",
        ]),
        "212"
    );
}

#[test]
fn destination_checked_before_sources() {
    // The destination frame is missing and the source is undefined too:
    // the destination wins.
    assert_eq!(error_code(&["MOVE TF@x GF@undefined"]), 55);
    assert_eq!(error_code(&["ADD GF@x string@a int@1"]), 54);
}

// ========================================================
// Arithmetic
// ========================================================

#[test]
fn integer_arithmetic() {
    assert_eq!(
        output(&[
            "DEFVAR GF@r",
            "ADD GF@r int@40 int@2",
            "WRITE GF@r",
            "WRITE string@,",
            "SUB GF@r int@1 int@3",
            "WRITE GF@r",
            "WRITE string@,",
            "MUL GF@r int@-6 int@7",
            "WRITE GF@r",
        ]),
        "42,-2,-42"
    );
}

#[test]
fn idiv_rounds_toward_negative_infinity() {
    let quotient = |a: &str, b: &str| {
        let idiv = format!("IDIV GF@r int@{a} int@{b}");
        output(&["DEFVAR GF@r", idiv.as_str(), "WRITE GF@r"])
    };
    assert_eq!(quotient("7", "2"), "3");
    assert_eq!(quotient("-7", "2"), "-4");
    assert_eq!(quotient("7", "-2"), "-4");
    assert_eq!(quotient("-8", "2"), "-4");
}

#[test]
fn idiv_by_zero_end_to_end() {
    let run = exec(&[
        "DEFVAR GF@x",
        "MOVE GF@x int@5",
        "DEFVAR GF@y",
        "MOVE GF@y int@0",
        "IDIV GF@x GF@x GF@y",
    ]);
    assert_eq!(
        run.result.unwrap_err(),
        RuntimeError::DivisionByZero { at: 5 }
    );
    assert_eq!(run.stdout, "");
}

#[test]
fn arithmetic_type_mismatch() {
    assert_eq!(error_code(&["DEFVAR GF@r", "ADD GF@r int@1 bool@true"]), 53);
    assert_eq!(error_code(&["DEFVAR GF@r", "MUL GF@r string@2 int@2"]), 53);
    assert_eq!(error_code(&["DEFVAR GF@r", "SUB GF@r nil@nil int@2"]), 53);
}

#[test]
fn addition_wraps() {
    assert_eq!(
        output(&[
            "DEFVAR GF@r",
            "ADD GF@r int@9223372036854775807 int@1",
            "WRITE GF@r",
        ]),
        i64::MIN.to_string()
    );
}

#[test]
fn float_conversions_and_div() {
    assert_eq!(
        output(&[
            "DEFVAR GF@a",
            "DEFVAR GF@b",
            "INT2FLOAT GF@a int@7",
            "INT2FLOAT GF@b int@2",
            "DIV GF@a GF@a GF@b",
            "WRITE GF@a",
            "WRITE string@|",
            "FLOAT2INT GF@a GF@a",
            "WRITE GF@a",
            "TYPE GF@b GF@b",
            "WRITE string@|",
            "WRITE GF@b",
        ]),
        "3.5|3|float"
    );
}

#[test]
fn float_div_by_zero_and_int_operands() {
    assert_eq!(
        error_code(&[
            "DEFVAR GF@a",
            "DEFVAR GF@z",
            "INT2FLOAT GF@a int@1",
            "INT2FLOAT GF@z int@0",
            "DIV GF@a GF@a GF@z",
        ]),
        57
    );
    assert_eq!(error_code(&["DEFVAR GF@a", "DIV GF@a int@1 int@1"]), 53);
}

// ========================================================
// Relational and boolean
// ========================================================

#[test]
fn comparisons() {
    assert_eq!(
        output(&[
            "DEFVAR GF@r",
            "LT GF@r int@1 int@2",
            "WRITE GF@r",
            "GT GF@r string@abc string@abd",
            "WRITE GF@r",
            "LT GF@r bool@false bool@true",
            "WRITE GF@r",
            "EQ GF@r string@a string@a",
            "WRITE GF@r",
        ]),
        "truefalsetruetrue"
    );
}

#[test]
fn eq_with_nil() {
    assert_eq!(
        output(&[
            "DEFVAR GF@r",
            "EQ GF@r nil@nil nil@nil",
            "WRITE GF@r",
            "EQ GF@r int@0 nil@nil",
            "WRITE GF@r",
        ]),
        "truefalse"
    );
}

#[test]
fn eq_across_types_is_53() {
    assert_eq!(error_code(&["DEFVAR GF@r", "EQ GF@r int@1 bool@true"]), 53);
}

#[test]
fn ordering_rejects_nil_and_mixed() {
    assert_eq!(error_code(&["DEFVAR GF@r", "LT GF@r nil@nil nil@nil"]), 53);
    assert_eq!(error_code(&["DEFVAR GF@r", "GT GF@r int@1 string@1"]), 53);
}

#[test]
fn boolean_algebra() {
    assert_eq!(
        output(&[
            "DEFVAR GF@r",
            "AND GF@r bool@true bool@false",
            "WRITE GF@r",
            "OR GF@r bool@true bool@false",
            "WRITE GF@r",
            "NOT GF@r bool@true",
            "WRITE GF@r",
        ]),
        "falsetruefalse"
    );
    assert_eq!(error_code(&["DEFVAR GF@r", "NOT GF@r int@0"]), 53);
}

// ========================================================
// Strings
// ========================================================

#[test]
fn concat_decodes_escapes() {
    assert_eq!(
        output(&[
            "DEFVAR GF@s",
            "CONCAT GF@s string@left\\032 string@\\032right",
            "WRITE GF@s",
        ]),
        "left  right"
    );
}

#[test]
fn strlen_counts_escape_as_one() {
    assert_eq!(
        output(&["DEFVAR GF@n", "STRLEN GF@n string@ab\\010c", "WRITE GF@n"]),
        "4"
    );
}

#[test]
fn strlen_counts_characters_not_bytes() {
    assert_eq!(
        output(&["DEFVAR GF@n", "STRLEN GF@n string@žluťoučký", "WRITE GF@n"]),
        "9"
    );
}

#[test]
fn getchar_boundaries() {
    assert_eq!(
        output(&["DEFVAR GF@c", "GETCHAR GF@c string@x int@0", "WRITE GF@c"]),
        "x"
    );
    assert_eq!(
        error_code(&["DEFVAR GF@c", "GETCHAR GF@c string@abc int@3"]),
        58
    );
    assert_eq!(
        error_code(&["DEFVAR GF@c", "GETCHAR GF@c string@abc int@-1"]),
        58
    );
}

#[test]
fn stri2int_and_int2char() {
    assert_eq!(
        output(&[
            "DEFVAR GF@n",
            "STRI2INT GF@n string@AB int@1",
            "WRITE GF@n",
            "INT2CHAR GF@n int@97",
            "WRITE GF@n",
        ]),
        "66a"
    );
    assert_eq!(error_code(&["DEFVAR GF@n", "STRI2INT GF@n string@ int@0"]), 58);
    assert_eq!(error_code(&["DEFVAR GF@n", "INT2CHAR GF@n int@-5"]), 58);
    assert_eq!(error_code(&["DEFVAR GF@n", "INT2CHAR GF@n int@55296"]), 58);
    assert_eq!(error_code(&["DEFVAR GF@n", "INT2CHAR GF@n string@a"]), 53);
}

#[test]
fn setchar_replaces_one_character() {
    assert_eq!(
        output(&[
            "DEFVAR GF@s",
            "MOVE GF@s string@cat",
            "SETCHAR GF@s int@0 string@bxx",
            "WRITE GF@s",
        ]),
        "bat"
    );
}

#[test]
fn setchar_errors() {
    let with = |op: &str| error_code(&["DEFVAR GF@s", "MOVE GF@s string@cat", op]);
    assert_eq!(with("SETCHAR GF@s int@3 string@x"), 58);
    assert_eq!(with("SETCHAR GF@s int@0 string@"), 58);
    assert_eq!(with("SETCHAR GF@s string@0 string@x"), 53);
    assert_eq!(with("SETCHAR GF@s int@0 int@1"), 53);
    // Type errors are reported before range errors.
    assert_eq!(with("SETCHAR GF@s int@9 int@1"), 53);
    assert_eq!(error_code(&["DEFVAR GF@s", "SETCHAR GF@s int@0 string@x"]), 56);
    assert_eq!(
        error_code(&["DEFVAR GF@s", "MOVE GF@s int@1", "SETCHAR GF@s int@0 string@x"]),
        53
    );
}

// ========================================================
// Control flow
// ========================================================

#[test]
fn jump_skips_instructions() {
    assert_eq!(
        output(&["JUMP end", "WRITE string@skipped", "LABEL end", "WRITE string@done"]),
        "done"
    );
}

#[test]
fn backward_jump_loop() {
    assert_eq!(
        output(&[
            "DEFVAR GF@i",
            "MOVE GF@i int@0",
            "LABEL loop",
            "WRITE GF@i",
            "ADD GF@i GF@i int@1",
            "JUMPIFNEQ loop GF@i int@3",
        ]),
        "012"
    );
}

#[test]
fn conditional_jumps() {
    assert_eq!(
        output(&[
            "JUMPIFEQ a int@1 int@1",
            "WRITE string@no",
            "LABEL a",
            "JUMPIFNEQ b string@x string@x",
            "WRITE string@yes",
            "LABEL b",
            "JUMPIFEQ c nil@nil int@1",
            "WRITE string@!",
            "LABEL c",
        ]),
        "yes!"
    );
    assert_eq!(error_code(&["JUMPIFEQ x int@1 bool@true", "LABEL x"]), 53);
}

#[test]
fn undefined_label_is_52() {
    assert_eq!(error_code(&["JUMP nowhere"]), 52);
    assert_eq!(error_code(&["CALL nowhere"]), 52);
    // The label is checked before the operands.
    assert_eq!(error_code(&["JUMPIFEQ nowhere int@1 bool@true"]), 52);
}

#[test]
fn undefined_label_not_reached_is_fine() {
    assert_eq!(
        output(&["JUMP end", "JUMP nowhere", "LABEL end", "WRITE int@1"]),
        "1"
    );
}

#[test]
fn call_returns_after_call_site() {
    assert_eq!(
        output(&[
            "JUMP main",
            "LABEL f",
            "WRITE string@f",
            "RETURN",
            "LABEL main",
            "CALL f",
            "WRITE string@-back",
        ]),
        "f-back"
    );
}

#[test]
fn nested_calls_resume_lifo() {
    assert_eq!(
        output(&[
            "JUMP main",
            "LABEL outer",
            "WRITE string@<outer",
            "CALL inner",
            "WRITE string@outer>",
            "RETURN",
            "LABEL inner",
            "WRITE string@<inner>",
            "RETURN",
            "LABEL main",
            "CALL outer",
            "WRITE string@end",
        ]),
        "<outer<inner>outer>end"
    );
}

#[test]
fn return_without_call_is_56() {
    assert_eq!(error_code(&["RETURN"]), 56);
}

#[test]
fn return_does_not_touch_frames() {
    assert_eq!(
        output(&[
            "JUMP main",
            "LABEL f",
            "PUSHFRAME",
            "RETURN",
            "LABEL main",
            "CREATEFRAME",
            "DEFVAR TF@x",
            "MOVE TF@x int@9",
            "CALL f",
            "WRITE LF@x",
        ]),
        "9"
    );
}

// ========================================================
// Data stack
// ========================================================

#[test]
fn pushs_pops_reverse_order() {
    assert_eq!(
        output(&[
            "PUSHS int@1",
            "PUSHS int@2",
            "PUSHS int@3",
            "DEFVAR GF@a",
            "DEFVAR GF@b",
            "DEFVAR GF@c",
            "POPS GF@a",
            "POPS GF@b",
            "POPS GF@c",
            "WRITE GF@a",
            "WRITE GF@b",
            "WRITE GF@c",
        ]),
        "321"
    );
}

#[test]
fn pops_empty_is_56() {
    assert_eq!(error_code(&["DEFVAR GF@a", "POPS GF@a"]), 56);
}

// ========================================================
// Input
// ========================================================

#[test]
fn read_coerces_each_type() {
    let run = exec_with_input(
        &[
            "DEFVAR GF@i",
            "DEFVAR GF@b",
            "DEFVAR GF@s",
            "READ GF@i int",
            "READ GF@b bool",
            "READ GF@s string",
            "WRITE GF@i",
            "WRITE string@|",
            "WRITE GF@b",
            "WRITE string@|",
            "WRITE GF@s",
        ],
        " 12 \nTrUe\nhello world\r\n",
    );
    assert!(run.result.is_ok());
    assert_eq!(run.stdout, "12|true|hello world");
}

#[test]
fn read_defaults_on_bad_or_missing_input() {
    let run = exec_with_input(
        &[
            "DEFVAR GF@i",
            "DEFVAR GF@b",
            "DEFVAR GF@s",
            "READ GF@i int",
            "READ GF@b bool",
            "READ GF@s string",
            "TYPE GF@b GF@s",
            "WRITE GF@i",
            "WRITE GF@b",
            "WRITE GF@s",
        ],
        "twelve\n",
    );
    assert!(run.result.is_ok());
    // "twelve" → 0, EOF → false (then overwritten by TYPE), EOF → "".
    assert_eq!(run.stdout, "0string");
}

#[test]
fn read_defaults_on_invalid_utf8_line() {
    let program = program(&[
        "DEFVAR GF@x",
        "READ GF@x int",
        "WRITE GF@x",
        "READ GF@x int",
        "WRITE GF@x",
    ]);
    let mut out = Vec::new();
    let outcome = run(&program, &b"\xff\xfe\n7\n"[..], &mut out, std::io::sink()).unwrap();
    assert_eq!(outcome.exit_code, 0);
    assert_eq!(String::from_utf8(out).unwrap(), "07");
}

#[test]
fn read_into_undefined_is_54() {
    assert_eq!(
        exec_with_input(&["READ GF@x int"], "1\n")
            .result
            .unwrap_err()
            .exit_code(),
        54
    );
}

// ========================================================
// Diagnostics and statistics
// ========================================================

#[test]
fn dprint_goes_to_diagnostics() {
    let run = exec(&["DPRINT string@debug", "WRITE string@out"]);
    assert_eq!(run.stdout, "out");
    assert_eq!(run.stderr, "debug");
}

#[test]
fn break_reports_state() {
    let run = exec(&[
        "DEFVAR GF@x",
        "MOVE GF@x int@5",
        "PUSHS bool@true",
        "BREAK",
    ]);
    assert!(run.result.is_ok());
    assert_eq!(run.stdout, "");
    assert!(run.stderr.contains("BREAK at instruction 4 (4 executed)"));
    assert!(run.stderr.contains("x = int@5"));
    assert!(run.stderr.contains("temporary frame: <absent>"));
    assert!(run.stderr.contains("bool@true"));
}

#[test]
fn stats_count_instructions_and_vars() {
    let run = exec(&[
        "DEFVAR GF@a",
        "MOVE GF@a int@1",
        "CREATEFRAME",
        "DEFVAR TF@b",
        "MOVE TF@b int@2",
        "PUSHFRAME",
        "POPFRAME",
        "CREATEFRAME",
    ]);
    let stats = run.result.unwrap().stats;
    assert_eq!(stats.insts, 8);
    assert_eq!(stats.vars, 2);
}

#[test]
fn stats_count_loop_iterations() {
    let run = exec(&[
        "DEFVAR GF@i",
        "MOVE GF@i int@0",
        "LABEL loop",
        "ADD GF@i GF@i int@1",
        "JUMPIFNEQ loop GF@i int@10",
    ]);
    // 2 setup + 10 × (LABEL, ADD, JUMPIFNEQ), the first LABEL included.
    assert_eq!(run.result.unwrap().stats.insts, 32);
}

#[test]
fn output_before_error_stands() {
    let run = exec(&["WRITE string@partial", "WRITE GF@missing"]);
    assert_eq!(run.stdout, "partial");
    assert_eq!(run.result.unwrap_err().at(), 2);
}

// ========================================================
// Properties
// ========================================================

fn literal() -> impl Strategy<Value = String> {
    prop_oneof![
        any::<i64>().prop_map(|n| format!("int@{n}")),
        any::<bool>().prop_map(|b| format!("bool@{b}")),
        Just("nil@nil".to_string()),
        "[a-zA-Z0-9]{0,12}".prop_map(|s| format!("string@{s}")),
    ]
}

proptest! {
    /// PUSHS then POPS stores exactly the pushed value and type.
    #[test]
    fn push_pop_identity(lit in literal()) {
        let push = format!("PUSHS {lit}");
        let direct = format!("MOVE GF@b {lit}");
        let out = output(&[
            "DEFVAR GF@a",
            "DEFVAR GF@b",
            "DEFVAR GF@r",
            push.as_str(),
            "POPS GF@a",
            direct.as_str(),
            "TYPE GF@r GF@a",
            "WRITE GF@r",
            "EQ GF@r GF@a GF@b",
            "WRITE GF@r",
        ]);
        prop_assert!(out.ends_with("true"), "{}", out);
    }

    /// IDIV agrees with floor division whenever the divisor is non-zero.
    #[test]
    fn idiv_matches_floor(a in -1_000_000i64..1_000_000, b in -1000i64..1000) {
        prop_assume!(b != 0);
        let idiv = format!("IDIV GF@r int@{a} int@{b}");
        let out = output(&["DEFVAR GF@r", idiv.as_str(), "WRITE GF@r"]);
        let expected = (a as f64 / b as f64).floor() as i64;
        prop_assert_eq!(out, expected.to_string());
    }

    /// ADD and SUB are inverse under wrapping arithmetic.
    #[test]
    fn add_sub_inverse(a in any::<i64>(), b in any::<i64>()) {
        let add = format!("ADD GF@r int@{a} int@{b}");
        let sub = format!("SUB GF@r GF@r int@{b}");
        let out = output(&["DEFVAR GF@r", add.as_str(), sub.as_str(), "WRITE GF@r"]);
        prop_assert_eq!(out, a.to_string());
    }
}
