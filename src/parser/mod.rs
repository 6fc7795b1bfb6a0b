//! Parser module — tokenization and recursive-descent parsing of command
//! lines into the AST.

pub mod lexer;
pub mod parser;
pub mod types;

pub use lexer::Lexer;
pub use parser::parse;
pub use types::{ParseError, ERROR_FOR_ARG, ERROR_SYNTAX};
