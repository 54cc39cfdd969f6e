//! CLI command implementations.
//!
//! Every command returns `Err(code)` with the process exit code on
//! failure. For `interpret` and `run`, a non-zero `EXIT` operand is
//! reported the same way.

use crate::cli::{CheckArgs, DisasmArgs, InterpretArgs, ParseArgs, RunArgs};
use ippcode_common::{Program, RawInstruction};
use std::fmt::Display;
use std::fs;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read};
use std::path::Path;
use tracing::debug;

const USAGE_ERROR: i32 = 10;
const INPUT_ERROR: i32 = 11;
const OUTPUT_ERROR: i32 = 12;

/// Print `error: <err>` and hand back `code`.
fn fail(err: impl Display, code: i32) -> i32 {
    eprintln!("error: {err}");
    code
}

/// Read a whole file, or standard input when `path` is `None`.
fn read_text(path: Option<&Path>) -> Result<String, i32> {
    match path {
        Some(path) => fs::read_to_string(path)
            .map_err(|e| fail(format!("cannot read '{}': {e}", path.display()), INPUT_ERROR)),
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .map_err(|e| fail(format!("cannot read standard input: {e}"), INPUT_ERROR))?;
            Ok(text)
        }
    }
}

/// Line source for `READ`: a file, or standard input.
fn open_input(path: Option<&Path>) -> Result<Box<dyn BufRead>, i32> {
    match path {
        Some(path) => {
            let file = File::open(path)
                .map_err(|e| fail(format!("cannot open '{}': {e}", path.display()), INPUT_ERROR))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(io::stdin().lock())),
    }
}

/// Write one counter per line.
fn write_stats(path: &Path, values: &[u64]) -> Result<(), i32> {
    let text: String = values.iter().map(|v| format!("{v}\n")).collect();
    fs::write(path, text)
        .map_err(|e| fail(format!("cannot write '{}': {e}", path.display()), OUTPUT_ERROR))
}

/// `--stats` needs at least one counter flag.
fn check_stats_flags(stats: Option<&Path>, any_flag: bool) -> Result<(), i32> {
    if stats.is_some() && !any_flag {
        return Err(fail("--stats needs at least one statistic to record", USAGE_ERROR));
    }
    Ok(())
}

fn verify(raw: &[RawInstruction]) -> Result<Program, i32> {
    ippcode_verifier::verify(raw).map_err(|e| fail(&e, e.exit_code()))
}

/// Read an XML program document.
fn load_xml(path: Option<&Path>) -> Result<Vec<RawInstruction>, i32> {
    let text = read_text(path)?;
    ippcode_assembler::read_xml(&text).map_err(|e| fail(&e, e.exit_code()))
}

/// Read a source-text program.
fn load_source(path: &Path) -> Result<Vec<RawInstruction>, i32> {
    let text = read_text(Some(path))?;
    ippcode_assembler::assemble(&text)
        .map(|assembled| assembled.instructions)
        .map_err(|e| fail(&e, e.exit_code()))
}

/// Execute a verified program against `input`, writing to stdout/stderr.
fn execute(program: &Program, input: Box<dyn BufRead>) -> Result<ippcode_vm::Outcome, i32> {
    let output = BufWriter::new(io::stdout().lock());
    let diag = io::stderr().lock();
    let outcome = ippcode_vm::run(program, input, output, diag)
        .map_err(|e| fail(&e, e.exit_code()))?;
    debug!(
        exit_code = outcome.exit_code,
        insts = outcome.stats.insts,
        vars = outcome.stats.vars,
        "program finished"
    );
    Ok(outcome)
}

fn exit_with(code: i32) -> Result<(), i32> {
    if code == 0 {
        Ok(())
    } else {
        Err(code)
    }
}

/// Translate source text to XML on stdout.
///
/// `stat_order` lists the requested counters in command-line order.
pub fn parse(args: &ParseArgs, stat_order: &[&str]) -> Result<(), i32> {
    let stats_path = args.stats.as_deref();
    check_stats_flags(stats_path, !stat_order.is_empty())?;

    let text = read_text(args.file.as_deref())?;
    let assembled = ippcode_assembler::assemble(&text).map_err(|e| fail(&e, e.exit_code()))?;
    print!("{}", ippcode_assembler::to_xml(&assembled.instructions));

    if let Some(path) = stats_path {
        let stats = assembled.stats;
        let values: Vec<u64> = stat_order
            .iter()
            .filter_map(|&id| match id {
                "loc" => Some(stats.loc),
                "comments" => Some(stats.comments),
                "labels" => Some(stats.labels),
                "jumps" => Some(stats.jumps),
                _ => None,
            })
            .map(|value| value as u64)
            .collect();
        write_stats(path, &values)?;
    }
    Ok(())
}

/// Execute an XML program.
///
/// `stat_order` lists the requested counters in command-line order.
pub fn interpret(args: &InterpretArgs, stat_order: &[&str]) -> Result<(), i32> {
    if args.source.is_none() && args.input.is_none() {
        return Err(fail(
            "at least one of --source and --input is required",
            USAGE_ERROR,
        ));
    }
    let stats_path = args.stats.as_deref();
    check_stats_flags(stats_path, !stat_order.is_empty())?;

    let raw = load_xml(args.source.as_deref())?;
    let program = verify(&raw)?;
    let input = open_input(args.input.as_deref())?;
    let outcome = execute(&program, input)?;

    if let Some(path) = stats_path {
        let stats = outcome.stats;
        let values: Vec<u64> = stat_order
            .iter()
            .filter_map(|&id| match id {
                "insts" => Some(stats.insts),
                "vars" => Some(stats.vars as u64),
                _ => None,
            })
            .collect();
        write_stats(path, &values)?;
    }
    exit_with(outcome.exit_code)
}

/// Assemble, verify and execute a source-text program.
pub fn run(args: &RunArgs) -> Result<(), i32> {
    let raw = load_source(&args.file)?;
    let program = verify(&raw)?;
    let input = open_input(args.input.as_deref())?;
    let outcome = execute(&program, input)?;
    exit_with(outcome.exit_code)
}

/// Validate a program, source text or XML.
pub fn check(args: &CheckArgs) -> Result<(), i32> {
    let text = read_text(Some(&args.file))?;
    let raw = if text.trim_start().starts_with('<') {
        ippcode_assembler::read_xml(&text).map_err(|e| fail(&e, e.exit_code()))?
    } else {
        ippcode_assembler::assemble(&text)
            .map(|assembled| assembled.instructions)
            .map_err(|e| fail(&e, e.exit_code()))?
    };
    let program = verify(&raw)?;
    println!("OK: {} ({} instructions)", args.file.display(), program.len());
    Ok(())
}

/// Print an XML program as source text, in instruction order.
pub fn disasm(args: &DisasmArgs) -> Result<(), i32> {
    let mut raw = load_xml(Some(&args.file))?;
    verify(&raw)?;
    raw.sort_by_key(|instr| instr.order);
    print!("{}", ippcode_assembler::disassemble(&raw));
    Ok(())
}
