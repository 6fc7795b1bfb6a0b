//! AST module — command tree types and the debug pretty-printer.

pub mod types;

pub use types::{
    ChainOp, Command, CommandKind, FileKind, ForCommand, IfElseCommand, RedirMode,
    SimpleCommand,
};
