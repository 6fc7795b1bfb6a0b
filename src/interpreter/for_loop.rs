//! For-Loop Engine
//!
//! Drives `for V in DIR [options] { body }`: directory iteration with
//! hidden-entry and type/extension filters, recursive descent, and a
//! bounded pool of forked workers for `-p N`. Recursion carries the current
//! directory as an explicit argument; the parsed loop stays immutable.

use std::fs;

use log::debug;
use nix::unistd::{self, ForkResult, Pid};

use crate::ast::types::{Command, FileKind, ForCommand};
use crate::interpreter::execution_engine::execute_chain;
use crate::interpreter::expansion::expand;
use crate::interpreter::process;
use crate::interpreter::signals;
use crate::interpreter::types::{
    combine_status, ShellState, STATUS_SIGNAL, STATUS_WAIT_FAILED,
};

/// Run one `for` loop. The loop variable's prior binding is restored on the
/// way out, whatever happened inside.
pub fn execute_for(for_cmd: &ForCommand, state: &mut ShellState) -> i32 {
    let dir = expand(&for_cmd.dir, &state.vars).into_owned();
    let saved = state.vars.set(for_cmd.var, None);
    let mut pool = WorkerPool::new(for_cmd.parallel);

    let mut result = iterate(for_cmd, &dir, state, &mut pool);

    state.vars.set(for_cmd.var, saved);
    result = combine_status(result, pool.drain());
    result
}

/// One directory level. Folds iteration statuses with the signed-max rule;
/// an interrupt observed between iterations aborts with the sentinel.
fn iterate(
    for_cmd: &ForCommand,
    dir: &str,
    state: &mut ShellState,
    pool: &mut WorkerPool,
) -> i32 {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            eprintln!("fsh: {}: {}", dir, err);
            return 1;
        }
    };
    debug!("for {}: entering {}", for_cmd.var as char, dir);

    let mut result = 0;
    for entry in entries {
        if signals::interrupted() {
            return STATUS_SIGNAL;
        }
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                eprintln!("fsh: {}: {}", dir, err);
                result = combine_status(result, 1);
                continue;
            }
        };

        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            // Variable values are strings; a non-UTF-8 name cannot be bound.
            eprintln!("fsh: {}: skipping non-unicode entry", dir);
            result = combine_status(result, 1);
            continue;
        };
        if !for_cmd.list_all && name.starts_with('.') {
            continue;
        }

        let path = format!("{}/{}", dir, name);
        let file_type = match entry.file_type() {
            Ok(file_type) => file_type,
            Err(err) => {
                eprintln!("fsh: {}: {}", path, err);
                result = combine_status(result, 1);
                continue;
            }
        };

        // Recursion is independent of the filters below; they only gate the
        // body for this entry.
        if for_cmd.recursive && file_type.is_dir() {
            result = combine_status(result, iterate(for_cmd, &path, state, pool));
        }

        let mut value = path;
        if let Some(ext) = &for_cmd.filter_ext {
            match value.strip_suffix(&format!(".{}", ext)) {
                Some(trimmed) => value = trimmed.to_string(),
                None => continue,
            }
        }
        if let Some(kind) = for_cmd.filter_type {
            if !matches_kind(&file_type, kind) {
                continue;
            }
        }

        state.vars.set(for_cmd.var, Some(value));
        let status = if for_cmd.parallel > 0 {
            pool.submit(&for_cmd.body, state)
        } else {
            execute_chain(&for_cmd.body, state)
        };
        result = combine_status(result, status);
    }
    result
}

fn matches_kind(file_type: &fs::FileType, kind: FileKind) -> bool {
    use std::os::unix::fs::FileTypeExt;
    match kind {
        FileKind::Regular => file_type.is_file(),
        FileKind::Directory => file_type.is_dir(),
        FileKind::Symlink => file_type.is_symlink(),
        FileKind::Fifo => file_type.is_fifo(),
    }
}

// =============================================================================
// WORKER POOL
// =============================================================================

/// Bounded pool of forked loop workers. The parent is the only process that
/// touches the pool; workers never see it.
pub struct WorkerPool {
    limit: u32,
    active: Vec<Pid>,
}

impl WorkerPool {
    pub fn new(limit: u32) -> Self {
        WorkerPool { limit, active: Vec::new() }
    }

    /// Fork a worker running `body`. When the pool is full, first wait for
    /// any one worker and return its status for the caller to fold;
    /// otherwise returns 0.
    pub fn submit(&mut self, body: &Command, state: &mut ShellState) -> i32 {
        debug_assert!(self.limit > 0);
        let mut result = 0;
        if self.active.len() >= self.limit as usize {
            result = self.wait_one();
        }

        process::flush_stdio();
        match unsafe { unistd::fork() } {
            Ok(ForkResult::Child) => {
                let status = execute_chain(body, state);
                if signals::interrupted() {
                    // Die of the signal so the parent's wait sees it.
                    signals::raise_self();
                }
                process::exit_child(status)
            }
            Ok(ForkResult::Parent { child }) => {
                self.active.push(child);
                result
            }
            Err(err) => {
                eprintln!("fsh: fork: {}", err);
                combine_status(result, 1)
            }
        }
    }

    /// Wait for any one worker. Every outstanding child here belongs to the
    /// pool: pipeline children are always reaped inside the pipeline runner.
    fn wait_one(&mut self) -> i32 {
        match process::wait_any_child() {
            Ok((pid, status)) => {
                self.active.retain(|&active| active != pid);
                status
            }
            Err(()) => STATUS_WAIT_FAILED,
        }
    }

    /// Wait for every remaining worker, folding their statuses.
    pub fn drain(&mut self) -> i32 {
        let mut result = 0;
        while let Some(pid) = self.active.pop() {
            result = combine_status(result, process::wait_for_child(pid));
        }
        result
    }
}

// =============================================================================
// TESTS
// =============================================================================
