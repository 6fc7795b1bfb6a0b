//! Process Plumbing
//!
//! Fork/exec/wait helpers shared by the builtin dispatcher, the pipeline
//! runner and the loop worker pool. Wait results are decoded into the
//! shell's return-code convention: an 8-bit exit code, the signal sentinel,
//! or the out-of-range wait-failure value.

use std::borrow::Cow;
use std::ffi::CString;
use std::io::{self, Write};
use std::os::fd::AsRawFd;

use nix::errno::Errno;
use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::{self, ForkResult, Pid};

use crate::interpreter::redirections::RedirSet;
use crate::interpreter::signals;
use crate::interpreter::types::{STATUS_SIGNAL, STATUS_WAIT_FAILED};

/// Leave a forked child without running the parent's exit handlers or
/// destructors.
pub fn exit_child(status: i32) -> ! {
    unsafe { libc::_exit(status) }
}

/// Flush the Rust-side stream buffers so a forked child does not inherit
/// (and replay) pending output.
pub fn flush_stdio() {
    let _ = io::stdout().flush();
    let _ = io::stderr().flush();
}

/// Decode a wait status, recording the signal number on signal-death.
/// `None` means the status was not a termination (keep waiting).
pub fn decode_status(status: WaitStatus) -> Option<(Pid, i32)> {
    match status {
        WaitStatus::Exited(pid, code) => Some((pid, code & 0xff)),
        WaitStatus::Signaled(pid, signal, _) => {
            signals::record_child_signal(signal as i32);
            Some((pid, STATUS_SIGNAL))
        }
        _ => None,
    }
}

/// Wait for one specific child, restarting on benign interruption.
pub fn wait_for_child(pid: Pid) -> i32 {
    loop {
        match waitpid(pid, None) {
            Ok(status) => {
                if let Some((_, result)) = decode_status(status) {
                    return result;
                }
            }
            Err(Errno::EINTR) => continue,
            Err(_) => return STATUS_WAIT_FAILED,
        }
    }
}

/// Wait for any child, restarting on benign interruption.
pub fn wait_any_child() -> Result<(Pid, i32), ()> {
    loop {
        match waitpid(None::<Pid>, None) {
            Ok(status) => {
                if let Some(done) = decode_status(status) {
                    return Ok(done);
                }
            }
            Err(Errno::EINTR) => continue,
            Err(_) => return Err(()),
        }
    }
}

/// `dup2` each opened redirection onto its standard stream. Only called in
/// a forked child, right before handing control to the command.
pub fn install_redirections(redirs: &RedirSet) -> nix::Result<()> {
    if let Some(file) = &redirs.stdin {
        unistd::dup2(file.as_raw_fd(), libc::STDIN_FILENO)?;
    }
    if let Some(file) = &redirs.stdout {
        unistd::dup2(file.as_raw_fd(), libc::STDOUT_FILENO)?;
    }
    if let Some(file) = &redirs.stderr {
        unistd::dup2(file.as_raw_fd(), libc::STDERR_FILENO)?;
    }
    Ok(())
}

/// Fork and exec an external command, then wait for it. The child gets the
/// default SIGINT disposition back so the user can interrupt it normally.
pub fn spawn_external(argv: &[Cow<'_, str>], redirs: &RedirSet) -> i32 {
    // C strings are built before forking; a NUL inside a word can only come
    // from a variable value and makes the word unexecutable.
    let args: Vec<CString> = match argv
        .iter()
        .map(|arg| CString::new(arg.as_bytes()))
        .collect()
    {
        Ok(args) => args,
        Err(_) => {
            eprintln!("fsh: {}: invalid argument", argv[0]);
            return 1;
        }
    };

    flush_stdio();
    match unsafe { unistd::fork() } {
        Ok(ForkResult::Child) => {
            signals::reset_default();
            if let Err(err) = install_redirections(redirs) {
                eprintln!("fsh: dup2: {}", err);
                exit_child(1);
            }
            let err = unistd::execvp(&args[0], &args).unwrap_err();
            eprintln!("fsh: {}: {}", argv[0], err);
            exit_child(1)
        }
        Ok(ForkResult::Parent { child }) => wait_for_child(child),
        Err(err) => {
            eprintln!("fsh: fork: {}", err);
            1
        }
    }
}
