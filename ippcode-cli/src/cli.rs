//! Command-line arguments.

use clap::parser::ValueSource;
use clap::{ArgMatches, Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ippc", version)]
#[command(about = "Parse, validate and interpret IPPcode19 programs")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Translate source text to the XML representation
    Parse(ParseArgs),
    /// Execute an XML program
    Interpret(InterpretArgs),
    /// Execute a source-text program directly
    Run(RunArgs),
    /// Validate a program without running it
    Check(CheckArgs),
    /// Print an XML program as canonical source text
    Disasm(DisasmArgs),
}

#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Source file (standard input if omitted)
    pub file: Option<PathBuf>,

    /// Write source statistics to this file
    #[arg(long)]
    pub stats: Option<PathBuf>,

    /// Count instruction lines
    #[arg(long, requires = "stats")]
    pub loc: bool,

    /// Count lines with comments
    #[arg(long, requires = "stats")]
    pub comments: bool,

    /// Count label definitions
    #[arg(long, requires = "stats")]
    pub labels: bool,

    /// Count jump instructions
    #[arg(long, requires = "stats")]
    pub jumps: bool,
}

#[derive(Args, Debug)]
pub struct InterpretArgs {
    /// XML program (standard input if omitted)
    #[arg(long)]
    pub source: Option<PathBuf>,

    /// Lines for READ (standard input if omitted)
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Write execution statistics to this file
    #[arg(long)]
    pub stats: Option<PathBuf>,

    /// Count executed instructions
    #[arg(long, requires = "stats")]
    pub insts: bool,

    /// Record the peak number of initialised variables
    #[arg(long, requires = "stats")]
    pub vars: bool,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Source file
    pub file: PathBuf,

    /// Lines for READ (standard input if omitted)
    #[arg(long)]
    pub input: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Source text or XML file
    pub file: PathBuf,
}

#[derive(Args, Debug)]
pub struct DisasmArgs {
    /// XML program
    pub file: PathBuf,
}

/// Counter flags of `parse`, by argument id.
pub const PARSE_STATS: &[&str] = &["loc", "comments", "labels", "jumps"];

/// Counter flags of `interpret`, by argument id.
pub const INTERPRET_STATS: &[&str] = &["insts", "vars"];

/// The counter flags given on the command line, in the order they appear.
pub fn stats_in_order(matches: &ArgMatches, ids: &[&'static str]) -> Vec<&'static str> {
    let mut given: Vec<(usize, &'static str)> = ids
        .iter()
        .filter(|&&id| matches.value_source(id) == Some(ValueSource::CommandLine))
        .filter_map(|&id| matches.index_of(id).map(|index| (index, id)))
        .collect();
    given.sort_unstable();
    given.into_iter().map(|(_, id)| id).collect()
}
