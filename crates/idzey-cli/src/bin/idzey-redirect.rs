use std::fs::File;
use std::path::PathBuf;
use std::process;

use clap::Parser;

use idzey_cli::common::{read_source, render_error, render_file_error, run_source};
use idzey_interpreter::Interpreter;
use idzey_syntax::error::Error;

/// Run an Idzey script, writing program output to a file instead of
/// stdout. Diagnostics still go to stderr.
#[derive(Parser, Debug)]
#[command(name = "idzey-redirect", version, about)]
struct Cli {
    /// Path to the script (must end in .idzey)
    script: PathBuf,

    /// File that receives everything the program prints (truncated)
    output: PathBuf,
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

    let sink = match File::create(&cli.output) {
        Ok(file) => file,
        Err(e) => {
            render_file_error(&Error::new(format!(
                "Failed to open {} for writing: {}",
                cli.output.display(),
                e
            )));
            process::exit(1);
        }
    };

    let mut interpreter = Interpreter::with_output(Box::new(sink));
    if let Err(failure) = run_source(&source, &mut interpreter) {
        render_error(failure.stage, &source, &failure.error);
        process::exit(1);
    }
}
