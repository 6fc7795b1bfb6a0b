use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use fsh::interpreter::types::exit_code;
use fsh::interpreter::{execute_chain, signals, ShellState};
use fsh::parser;

#[derive(Parser)]
#[command(name = "fsh")]
#[command(about = "An interactive POSIX-style command shell")]
#[command(version)]
struct Cli {
    /// Execute a single command line and exit
    #[arg(short = 'c', value_name = "LINE")]
    command: Option<String>,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let mut state = match ShellState::new() {
        Ok(state) => state,
        Err(err) => {
            eprintln!("fsh: {}", err);
            std::process::exit(1);
        }
    };
    signals::install();

    if let Some(line) = cli.command {
        run_line(&line, &mut state);
        std::process::exit(exit_code(state.prev_status));
    }

    repl(&mut state);
}

/// Parse and execute one line, leaving its status as the previous result.
fn run_line(line: &str, state: &mut ShellState) {
    match parser::parse(line) {
        Ok(tree) => {
            state.prev_status = execute_chain(&tree, state);
        }
        Err(err) => {
            eprintln!("fsh: {}", err);
            state.prev_status = err.status();
        }
    }
    // The interrupt is consumed once the line is over; the next line starts
    // clean.
    signals::clear();
}

fn repl(state: &mut ShellState) -> ! {
    let mut editor = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(err) => {
            eprintln!("fsh: readline: {}", err);
            std::process::exit(1);
        }
    };

    loop {
        let prompt = format!("[{}]{}$ ", state.prev_status, state.cwd.display());
        match editor.readline(&prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = editor.add_history_entry(line.as_str());
                }
                run_line(&line, state);
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl-C at the prompt just discards the line.
                signals::clear();
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("fsh: readline: {}", err);
                break;
            }
        }
    }

    std::process::exit(exit_code(state.prev_status));
}
