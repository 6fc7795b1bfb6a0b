//! Pipeline Execution
//!
//! Materializes a maximal run of `|`-joined commands. Every stage except
//! the last runs in a forked child wired to the previous stage through a
//! pipe; the last stage runs in the calling process so that a builtin at
//! the end of a pipeline can mutate the shell's state.

use std::os::fd::{IntoRawFd, RawFd};

use log::debug;
use nix::unistd::{self, ForkResult, Pid};

use crate::ast::types::Command;
use crate::interpreter::execution_engine::execute_command;
use crate::interpreter::process;
use crate::interpreter::signals;
use crate::interpreter::types::{ShellState, STATUS_SIGNAL};

/// Run the stages of one pipeline. `prev` is the walk's previous result,
/// handed to an `Empty` stage. The pipeline's result is the last stage's
/// result; every forked stage is waited on before returning.
pub fn run_pipeline(stages: &[&Command], state: &mut ShellState, prev: i32) -> i32 {
    debug_assert!(!stages.is_empty());
    if stages.len() == 1 {
        // No pipe to wire; skip the descriptor dance.
        return execute_command(stages[0], state, prev);
    }
    debug!("pipeline of {} stages", stages.len());

    let mut pids: Vec<Pid> = Vec::with_capacity(stages.len() - 1);

    // Input carried from stage to stage, starting as a duplicate of stdin.
    let mut stage_in = match unistd::dup(libc::STDIN_FILENO) {
        Ok(fd) => fd,
        Err(err) => {
            eprintln!("fsh: dup: {}", err);
            return 1;
        }
    };

    let last = stages.len() - 1;
    let mut aborted: Option<i32> = None;
    for &stage in &stages[..last] {
        if signals::interrupted() {
            aborted = Some(STATUS_SIGNAL);
            break;
        }
        let (read_end, write_end) = match unistd::pipe() {
            Ok((read_end, write_end)) => (read_end.into_raw_fd(), write_end.into_raw_fd()),
            Err(err) => {
                eprintln!("fsh: pipe: {}", err);
                aborted = Some(1);
                break;
            }
        };
        process::flush_stdio();
        match unsafe { unistd::fork() } {
            Ok(ForkResult::Child) => {
                let _ = unistd::close(read_end);
                if unistd::dup2(stage_in, libc::STDIN_FILENO).is_err()
                    || unistd::dup2(write_end, libc::STDOUT_FILENO).is_err()
                {
                    eprintln!("fsh: dup2: cannot wire pipeline stage");
                    process::exit_child(1);
                }
                // Both originals are duplicated onto the standard streams;
                // keeping them open would leak a write end and hold the
                // pipe's EOF back.
                let _ = unistd::close(stage_in);
                let _ = unistd::close(write_end);
                let status = execute_command(stage, state, prev);
                if signals::interrupted() {
                    signals::raise_self();
                }
                process::exit_child(status);
            }
            Ok(ForkResult::Parent { child }) => {
                pids.push(child);
                let _ = unistd::close(write_end);
                let _ = unistd::close(stage_in);
                stage_in = read_end;
            }
            Err(err) => {
                eprintln!("fsh: fork: {}", err);
                let _ = unistd::close(read_end);
                let _ = unistd::close(write_end);
                aborted = Some(1);
                break;
            }
        }
    }

    let result = match aborted {
        Some(status) => {
            let _ = unistd::close(stage_in);
            status
        }
        None => run_last_stage(stages[last], stage_in, state, prev),
    };

    // Reap every forked stage; their statuses do not affect the pipeline's
    // result, but a signal-death still lands in the coordinator.
    for pid in pids {
        let _ = process::wait_for_child(pid);
    }
    result
}

/// Run the final stage in the calling process with `stage_in` temporarily
/// installed as stdin. Consumes `stage_in`.
fn run_last_stage(stage: &Command, stage_in: RawFd, state: &mut ShellState, prev: i32) -> i32 {
    let saved_stdin = match unistd::dup(libc::STDIN_FILENO) {
        Ok(fd) => fd,
        Err(err) => {
            eprintln!("fsh: dup: {}", err);
            let _ = unistd::close(stage_in);
            return 1;
        }
    };
    if let Err(err) = unistd::dup2(stage_in, libc::STDIN_FILENO) {
        eprintln!("fsh: dup2: {}", err);
        let _ = unistd::close(stage_in);
        let _ = unistd::close(saved_stdin);
        return 1;
    }
    let _ = unistd::close(stage_in);

    let result = execute_command(stage, state, prev);

    let _ = unistd::dup2(saved_stdin, libc::STDIN_FILENO);
    let _ = unistd::close(saved_stdin);
    result
}
