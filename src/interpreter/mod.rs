//! Interpreter — walks the command tree and materializes it with the OS's
//! process, pipe and file primitives.

pub mod builtin_dispatch;
pub mod builtins;
pub mod execution_engine;
pub mod expansion;
pub mod for_loop;
pub mod pipeline_execution;
pub mod process;
pub mod redirections;
pub mod signals;
pub mod types;

pub use execution_engine::execute_chain;
pub use types::{combine_status, exit_code, ShellState, VarTable};
