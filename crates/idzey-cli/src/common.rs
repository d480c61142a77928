use std::fs;
use std::path::Path;

use owo_colors::OwoColorize;

use idzey_interpreter::Interpreter;
use idzey_lexer::Lexer;
use idzey_parser::Parser;
use idzey_syntax::error::Error;

/// Required extension for script files.
pub const SOURCE_EXTENSION: &str = "idzey";

/// A pipeline failure tagged with the stage that produced it.
pub struct Failure {
    pub stage: &'static str,
    pub error: Error,
}

/// Read a script, enforcing the `.idzey` extension and rejecting empty
/// files before any parsing happens.
pub fn read_source(path: &Path) -> Result<String, Error> {
    if path.extension().and_then(|ext| ext.to_str()) != Some(SOURCE_EXTENSION) {
        return Err(Error::new(format!(
            "Expected a '.{}' source file: {}",
            SOURCE_EXTENSION,
            path.display()
        )));
    }
    let bytes = fs::read(path)
        .map_err(|e| Error::new(format!("Failed to read {}: {}", path.display(), e)))?;
    if bytes.is_empty() {
        return Err(Error::new(format!("Source file is empty: {}", path.display())));
    }
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Lex, parse, and interpret `source` with the given interpreter.
pub fn run_source(source: &str, interpreter: &mut Interpreter) -> Result<(), Failure> {
    let mut parser = Parser::new(Lexer::new(source));
    let program = parser.parse().map_err(|error| Failure {
        stage: "Parse error",
        error,
    })?;
    interpreter.interpret(&program).map_err(|error| Failure {
        stage: "Runtime Error",
        error,
    })
}

/// Render a staged error, with the offending source line and a caret under
/// the column when the error carries a position.
pub fn render_error(stage: &str, source: &str, err: &Error) {
    eprintln!("{}: {}", stage.red().bold(), err.to_string().red());
    if let (Some(line), Some(col)) = (err.line, err.col) {
        if let Some(src_line) = source.lines().nth(line - 1) {
            eprintln!("  {}", src_line.bright_black());
            let mut marker = String::new();
            if col > 1 {
                marker.push_str(&" ".repeat(col - 1));
            }
            marker.push('^');
            eprintln!("  {}", marker.red());
        } else {
            eprintln!("  at {}:{}", line, col);
        }
    }
}

/// Render a failure that happened before the pipeline started.
pub fn render_file_error(err: &Error) {
    eprintln!("{}: {}", "error".red().bold(), err.to_string().red());
}
