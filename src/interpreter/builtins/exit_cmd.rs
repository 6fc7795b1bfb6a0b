//! exit - leave the shell.

use std::borrow::Cow;

use crate::interpreter::process::flush_stdio;
use crate::interpreter::types::{exit_code, ShellState};

/// Exits with the given code, or with the previous return value when none
/// is given. Inside a forked pipeline stage or loop worker this terminates
/// only that child.
pub fn handle_exit(state: &mut ShellState, args: &[Cow<'_, str>]) -> i32 {
    if args.len() > 2 {
        eprintln!("fsh: exit: too many arguments");
        return 1;
    }

    let status = match args.get(1) {
        None => state.prev_status,
        Some(arg) => match arg.parse::<i32>() {
            Ok(value) => value,
            Err(_) => {
                eprintln!("fsh: exit: {}: numeric argument required", arg);
                return 1;
            }
        },
    };

    flush_stdio();
    std::process::exit(exit_code(status));
}
