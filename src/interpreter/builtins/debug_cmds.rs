//! Debug commands: autotune and oopsie.
//!
//! `autotune` exists to exercise redirections and pipe plumbing by hand:
//! it slowly doubles every byte it reads. `oopsie` fails on demand with a
//! chosen return code.

use std::borrow::Cow;
use std::io::{self, Read, Write};
use std::thread;
use std::time::Duration;

use crate::interpreter::types::ShellState;

const AUTOTUNE_PAUSE: Duration = Duration::from_millis(200);

/// Read stdin a byte at a time; repeat each non-newline byte twice on
/// stdout with a pause after each copy, then a newline.
pub fn handle_autotune(_state: &mut ShellState, _args: &[Cow<'_, str>]) -> i32 {
    let mut stdin = io::stdin().lock();
    let mut stdout = io::stdout().lock();
    let mut byte = [0u8; 1];
    loop {
        match stdin.read(&mut byte) {
            Ok(0) => return 0,
            Ok(_) => {
                if byte[0] == b'\n' {
                    continue;
                }
                for _ in 0..2 {
                    if stdout.write_all(&byte).and_then(|_| stdout.flush()).is_err() {
                        return 1;
                    }
                    thread::sleep(AUTOTUNE_PAUSE);
                }
                if stdout.write_all(b"\n").and_then(|_| stdout.flush()).is_err() {
                    return 1;
                }
            }
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => {
                eprintln!("fsh: autotune: read: {}", err);
                return 1;
            }
        }
    }
}

/// Return the code given as argument, or 1 by default.
pub fn handle_oopsie(_state: &mut ShellState, args: &[Cow<'_, str>]) -> i32 {
    match args.get(1) {
        None => 1,
        Some(arg) => match arg.parse::<i32>() {
            Ok(value) => value,
            Err(_) => {
                eprintln!("fsh: oopsie: {}: numeric argument required", arg);
                1
            }
        },
    }
}
