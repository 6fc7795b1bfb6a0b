//! Signal Coordinator
//!
//! The only process-wide state in the shell: a flag set by the SIGINT
//! handler, and the number of the last signal a child died from. The
//! executor polls the flag between chain nodes, pipeline stages and loop
//! iterations; children re-raise the signal against themselves so their
//! parent observes a uniform signal-death.

use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};

static SIG_RECEIVED: AtomicBool = AtomicBool::new(false);
static LAST_CHILD_SIGNAL: AtomicI32 = AtomicI32::new(0);

extern "C" fn handle_interrupt(_signal: libc::c_int) {
    SIG_RECEIVED.store(true, Ordering::SeqCst);
}

/// Install the interrupt handler. No SA_RESTART: a pending interrupt must
/// be able to break a blocking wait.
pub fn install() {
    let action = SigAction::new(
        SigHandler::Handler(handle_interrupt),
        SaFlags::empty(),
        SigSet::empty(),
    );
    unsafe {
        let _ = signal::sigaction(Signal::SIGINT, &action);
    }
}

/// Has an interrupt arrived since the last [`clear`]?
pub fn interrupted() -> bool {
    SIG_RECEIVED.load(Ordering::SeqCst)
}

/// Acknowledge the interrupt before reading the next line.
pub fn clear() {
    SIG_RECEIVED.store(false, Ordering::SeqCst);
}

/// Remember which signal a child died from.
pub fn record_child_signal(signal: i32) {
    LAST_CHILD_SIGNAL.store(signal, Ordering::SeqCst);
}

/// The last signal recorded by [`record_child_signal`]; 0 if none yet.
pub fn last_child_signal() -> i32 {
    LAST_CHILD_SIGNAL.load(Ordering::SeqCst)
}

/// Restore the default SIGINT disposition, as expected by exec'd programs
/// and required before a self-raise.
pub fn reset_default() {
    unsafe {
        let _ = signal::signal(Signal::SIGINT, SigHandler::SigDfl);
    }
}

/// Kill the current (forked) process with SIGINT so the parent's wait
/// reports signal-death.
pub fn raise_self() -> ! {
    reset_default();
    let _ = signal::raise(Signal::SIGINT);
    // Only reachable if the raise was swallowed; keep the 8-bit convention.
    crate::interpreter::process::exit_child(255)
}
