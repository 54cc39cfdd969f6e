//! The `ippc` binary.

use clap::error::ErrorKind;
use clap::{CommandFactory, FromArgMatches};
use ippcode_cli::cli::{stats_in_order, Cli, Command, INTERPRET_STATS, PARSE_STATS};
use ippcode_cli::commands;
use std::process;

/// Print a clap error and exit: 0 for help/version, 10 otherwise.
fn usage_exit(e: clap::Error) -> ! {
    let code = match e.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => 10,
    };
    let _ = e.print();
    process::exit(code);
}

fn main() {
    ippcode_cli::init_logging();

    let matches = Cli::command()
        .try_get_matches()
        .unwrap_or_else(|e| usage_exit(e));
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| usage_exit(e));
    // Counter flags are written in the order they were given.
    let stats_order = |ids: &[&'static str]| {
        matches
            .subcommand()
            .map(|(_, sub)| stats_in_order(sub, ids))
            .unwrap_or_default()
    };

    let result = match &cli.command {
        Command::Parse(args) => commands::parse(args, &stats_order(PARSE_STATS)),
        Command::Interpret(args) => commands::interpret(args, &stats_order(INTERPRET_STATS)),
        Command::Run(args) => commands::run(args),
        Command::Check(args) => commands::check(args),
        Command::Disasm(args) => commands::disasm(args),
    };

    if let Err(code) = result {
        process::exit(code);
    }
}
