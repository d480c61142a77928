use std::path::PathBuf;
use std::process;

use clap::Parser;

use idzey_cli::common::{read_source, render_error, render_file_error, run_source};
use idzey_interpreter::{Interpreter, ScopeMode};

/// Run an Idzey script, writing program output to stdout.
#[derive(Parser, Debug)]
#[command(name = "idzey-cli", version, about)]
struct Cli {
    /// Path to the script (must end in .idzey)
    script: PathBuf,

    /// Resolve free variables in function bodies against the caller's
    /// scope instead of the declaration scope
    #[arg(long)]
    dynamic_scope: bool,

    /// Treat division or modulo by zero as a runtime error instead of 0
    #[arg(long)]
    strict_division: bool,
}

fn main() {
    let cli = Cli::parse();

    let source = match read_source(&cli.script) {
        Ok(source) => source,
        Err(err) => {
            render_file_error(&err);
            process::exit(1);
        }
    };

    let mut interpreter = Interpreter::new();
    if cli.dynamic_scope {
        interpreter.set_scope_mode(ScopeMode::Dynamic);
    }
    interpreter.set_strict_division(cli.strict_division);

    if let Err(failure) = run_source(&source, &mut interpreter) {
        render_error(failure.stage, &source, &failure.error);
        process::exit(1);
    }
}
