//! Interpreter Types
//!
//! The shell state record threaded through the executor, the
//! single-character variable table, and the return-status algebra.

use std::env;
use std::io;
use std::path::PathBuf;

// =============================================================================
// STATUS ALGEBRA
// =============================================================================

/// In-shell return value meaning "child died of a signal". Truncation to
/// 8 bits turns it into 255 at the exit boundary.
pub const STATUS_SIGNAL: i32 = -1;

/// Returned when waiting on a child failed for a reason other than
/// interruption; outside the legal 0..=255 range so it reads as a generic
/// failure.
pub const STATUS_WAIT_FAILED: i32 = 256;

/// Fold two statuses so that any signal-death outcome dominates numeric
/// comparison.
pub fn combine_status(a: i32, b: i32) -> i32 {
    if a < 0 {
        a
    } else if b < 0 {
        b
    } else {
        a.max(b)
    }
}

/// Truncate a status to the 8 bits the OS keeps at process exit.
pub fn exit_code(status: i32) -> i32 {
    status & 0xff
}

// =============================================================================
// VARIABLE TABLE
// =============================================================================

/// Number of variable slots; names are single bytes indexing the table.
pub const VAR_SLOTS: usize = 128;

/// The shell's variable table. Slots are nullable; a `for` loop saves the
/// bound slot on entry and restores it on exit, which is all the scoping
/// there is.
pub struct VarTable {
    slots: [Option<String>; VAR_SLOTS],
}

impl VarTable {
    pub fn new() -> Self {
        VarTable { slots: std::array::from_fn(|_| None) }
    }

    /// Value bound to `name`, if any. Bytes outside the table read as unset.
    pub fn get(&self, name: u8) -> Option<&str> {
        self.slots.get(name as usize)?.as_deref()
    }

    /// Bind `name` to `value`, returning the previous binding so callers can
    /// restore it.
    pub fn set(&mut self, name: u8, value: Option<String>) -> Option<String> {
        match self.slots.get_mut(name as usize) {
            Some(slot) => std::mem::replace(slot, value),
            None => None,
        }
    }
}

impl Default for VarTable {
    fn default() -> Self {
        VarTable::new()
    }
}

// =============================================================================
// SHELL STATE
// =============================================================================

/// Everything the shell tracks across commands: the cached working
/// directory pair, `HOME` as read at startup, the previous return value,
/// and the variable table.
pub struct ShellState {
    pub cwd: PathBuf,
    pub prev_dir: PathBuf,
    pub home: Option<PathBuf>,
    pub prev_status: i32,
    pub vars: VarTable,
}

impl ShellState {
    /// Capture the startup environment: working directory and `HOME`.
    pub fn new() -> io::Result<Self> {
        let cwd = env::current_dir()?;
        Ok(ShellState {
            prev_dir: cwd.clone(),
            cwd,
            home: env::var_os("HOME").map(PathBuf::from),
            prev_status: 0,
            vars: VarTable::new(),
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combine_is_max_on_plain_codes() {
        assert_eq!(combine_status(0, 0), 0);
        assert_eq!(combine_status(0, 3), 3);
        assert_eq!(combine_status(7, 2), 7);
    }

    #[test]
    fn combine_lets_signal_death_dominate() {
        assert_eq!(combine_status(STATUS_SIGNAL, 0), STATUS_SIGNAL);
        assert_eq!(combine_status(STATUS_SIGNAL, 255), STATUS_SIGNAL);
        assert_eq!(combine_status(200, STATUS_SIGNAL), STATUS_SIGNAL);
        assert_eq!(combine_status(STATUS_SIGNAL, STATUS_WAIT_FAILED), STATUS_SIGNAL);
    }

    #[test]
    fn combine_is_associative_and_commutative() {
        let samples = [-1, 0, 1, 2, 255, 256];
        for &a in &samples {
            for &b in &samples {
                assert_eq!(combine_status(a, b), combine_status(b, a));
                for &c in &samples {
                    assert_eq!(
                        combine_status(combine_status(a, b), c),
                        combine_status(a, combine_status(b, c))
                    );
                }
            }
        }
    }

    #[test]
    fn signal_status_truncates_to_255() {
        assert_eq!(exit_code(STATUS_SIGNAL), 255);
        assert_eq!(exit_code(0), 0);
        assert_eq!(exit_code(42), 42);
    }

    #[test]
    fn var_table_set_returns_previous() {
        let mut vars = VarTable::new();
        assert_eq!(vars.set(b'f', Some("one".into())), None);
        assert_eq!(vars.get(b'f'), Some("one"));
        let prev = vars.set(b'f', Some("two".into()));
        assert_eq!(prev.as_deref(), Some("one"));
        vars.set(b'f', prev);
        assert_eq!(vars.get(b'f'), Some("one"));
    }

    #[test]
    fn out_of_table_bytes_read_as_unset() {
        let mut vars = VarTable::new();
        assert_eq!(vars.set(200, Some("x".into())), None);
        assert_eq!(vars.get(200), None);
    }
}
