//! Built-in commands. Each file holds one command's handler; the dispatch
//! table lives in [`crate::interpreter::builtin_dispatch`].

pub mod cd_cmd;
pub mod debug_cmds;
pub mod exit_cmd;
pub mod ftype_cmd;
pub mod pwd_cmd;
