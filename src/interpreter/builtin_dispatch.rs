//! Builtin Dispatch
//!
//! Maps a command name to an in-process handler, or falls through to an
//! external child process. In-process handlers run with the standard
//! streams temporarily re-routed onto the command's redirections; the
//! saved streams are restored even when the handler fails.

use std::borrow::Cow;
use std::collections::HashMap;
use std::os::fd::{AsRawFd, RawFd};

use lazy_static::lazy_static;
use log::debug;
use nix::unistd;

use crate::ast::types::SimpleCommand;
use crate::interpreter::builtins;
use crate::interpreter::expansion::expand_argv;
use crate::interpreter::process;
use crate::interpreter::redirections::{self, RedirSet};
use crate::interpreter::types::ShellState;

/// An in-process command handler. Receives the expanded argv, name first.
pub type BuiltinFn = fn(&mut ShellState, &[Cow<'_, str>]) -> i32;

lazy_static! {
    static ref BUILTINS: HashMap<&'static str, BuiltinFn> = {
        let mut table: HashMap<&'static str, BuiltinFn> = HashMap::new();
        table.insert("cd", builtins::cd_cmd::handle_cd);
        table.insert("pwd", builtins::pwd_cmd::handle_pwd);
        table.insert("ftype", builtins::ftype_cmd::handle_ftype);
        table.insert("exit", builtins::exit_cmd::handle_exit);
        table.insert("autotune", builtins::debug_cmds::handle_autotune);
        table.insert("oopsie", builtins::debug_cmds::handle_oopsie);
        table
    };
}

/// Is `name` handled in-process?
pub fn is_builtin(name: &str) -> bool {
    BUILTINS.contains_key(name)
}

/// Execute one simple command: substitute, open redirections, then run the
/// builtin in-process or exec an external child.
pub fn run_simple(simple: &SimpleCommand, state: &mut ShellState) -> i32 {
    let argv = expand_argv(&simple.argv, &state.vars);
    debug_assert!(!argv.is_empty());

    let redirs = match redirections::setup(simple, &state.vars) {
        Ok(redirs) => redirs,
        Err(()) => return 1,
    };

    match BUILTINS.get(&*argv[0]) {
        Some(handler) => {
            debug!("builtin: {}", argv[0]);
            let _guard = match StdioGuard::install(&redirs) {
                Ok(guard) => guard,
                Err(err) => {
                    eprintln!("fsh: {}: {}", argv[0], err);
                    return 1;
                }
            };
            handler(state, &argv)
        }
        None => process::spawn_external(&argv, &redirs),
    }
}

/// Re-routes the standard streams onto a command's redirections for the
/// duration of an in-process handler. Dropping the guard flushes and puts
/// the original streams back.
struct StdioGuard {
    saved: Vec<(RawFd, RawFd)>, // (stream, saved duplicate)
}

impl StdioGuard {
    fn install(redirs: &RedirSet) -> nix::Result<StdioGuard> {
        process::flush_stdio();
        let mut guard = StdioGuard { saved: Vec::new() };
        let streams = [
            (libc::STDIN_FILENO, redirs.stdin.as_ref()),
            (libc::STDOUT_FILENO, redirs.stdout.as_ref()),
            (libc::STDERR_FILENO, redirs.stderr.as_ref()),
        ];
        for (stream, file) in streams {
            let Some(file) = file else { continue };
            // A failure part-way drops the guard, restoring the streams
            // installed so far.
            let saved = unistd::dup(stream)?;
            if let Err(err) = unistd::dup2(file.as_raw_fd(), stream) {
                let _ = unistd::close(saved);
                return Err(err);
            }
            guard.saved.push((stream, saved));
        }
        Ok(guard)
    }
}

impl Drop for StdioGuard {
    fn drop(&mut self) {
        process::flush_stdio();
        for (stream, saved) in self.saved.drain(..).rev() {
            let _ = unistd::dup2(saved, stream);
            let _ = unistd::close(saved);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_is_closed() {
        for name in ["cd", "pwd", "ftype", "exit", "autotune", "oopsie"] {
            assert!(is_builtin(name), "{name}");
        }
        assert!(!is_builtin("echo"));
        assert!(!is_builtin("ls"));
    }
}
