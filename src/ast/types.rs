//! Abstract Syntax Tree Types
//!
//! This module defines the command tree produced by the parser. The design
//! follows the fsh grammar while being Rust-idiomatic: every construct is a
//! variant with its own payload, and chain links can only exist together
//! with the command they point to.

use std::fmt;

// =============================================================================
// COMMANDS & CHAINS
// =============================================================================

/// One node of a command chain.
///
/// A chain is a linear sequence of commands joined by `|` or `;`. The link
/// operator and the next node travel together, so a linked node always has a
/// successor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub kind: CommandKind,
    pub next: Option<(ChainOp, Box<Command>)>,
}

/// Operator joining two chained commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainOp {
    Pipe,      // |
    Semicolon, // ;
}

/// Union of all command types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandKind {
    /// Placeholder produced by an empty command slot; executing it yields
    /// the previous return value.
    Empty,
    Simple(SimpleCommand),
    IfElse(IfElseCommand),
    For(ForCommand),
}

impl Command {
    /// A chain consisting of a single empty command.
    pub fn empty() -> Self {
        Command { kind: CommandKind::Empty, next: None }
    }

    pub fn new(kind: CommandKind) -> Self {
        Command { kind, next: None }
    }

    /// True when this node may appear on the left side of a `|`.
    pub fn is_simple(&self) -> bool {
        matches!(self.kind, CommandKind::Simple(_))
    }
}

// =============================================================================
// SIMPLE COMMANDS
// =============================================================================

/// How an output file is opened by `>`, `>>` or `>|`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirMode {
    /// `>` — create the file, failing if it already exists.
    Exclusive,
    /// `>>` — create if needed, append.
    Append,
    /// `>|` — create if needed, truncate.
    Truncate,
}

/// An argv plus optional redirections. A redirection mode only exists
/// together with its filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleCommand {
    pub argv: Vec<String>,
    pub stdin: Option<String>,
    pub stdout: Option<(String, RedirMode)>,
    pub stderr: Option<(String, RedirMode)>,
}

impl SimpleCommand {
    pub fn new(argv: Vec<String>) -> Self {
        SimpleCommand { argv, stdin: None, stdout: None, stderr: None }
    }

    pub fn has_redirections(&self) -> bool {
        self.stdin.is_some() || self.stdout.is_some() || self.stderr.is_some()
    }
}

// =============================================================================
// CONTROL FLOW
// =============================================================================

/// `if test { then } else { else }` — every branch is a full chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfElseCommand {
    pub test: Box<Command>,
    pub then_branch: Box<Command>,
    pub else_branch: Option<Box<Command>>,
}

/// File types accepted by the `-t` loop filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Regular,   // f
    Directory, // d
    Symlink,   // l
    Fifo,      // p
}

impl FileKind {
    /// Decode a `-t` argument.
    pub fn from_option_char(c: char) -> Option<Self> {
        match c {
            'f' => Some(FileKind::Regular),
            'd' => Some(FileKind::Directory),
            'l' => Some(FileKind::Symlink),
            'p' => Some(FileKind::Fifo),
            _ => None,
        }
    }

    pub fn option_char(self) -> char {
        match self {
            FileKind::Regular => 'f',
            FileKind::Directory => 'd',
            FileKind::Symlink => 'l',
            FileKind::Fifo => 'p',
        }
    }
}

/// `for V in DIR [options] { body }`.
///
/// The loop variable is a single-byte name indexing the variable table.
/// All options default to off; `parallel == 0` means inline execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForCommand {
    pub var: u8,
    pub dir: String,
    pub list_all: bool,
    pub recursive: bool,
    pub filter_ext: Option<String>,
    pub filter_type: Option<FileKind>,
    pub parallel: u32,
    pub body: Box<Command>,
}

impl ForCommand {
    pub fn new(var: u8, dir: String, body: Command) -> Self {
        ForCommand {
            var,
            dir,
            list_all: false,
            recursive: false,
            filter_ext: None,
            filter_type: None,
            parallel: 0,
            body: Box::new(body),
        }
    }
}

// =============================================================================
// PRETTY PRINTER
// =============================================================================

// The printed form of a tree re-parses to an equivalent tree, which the
// parser tests rely on.

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some((op, next)) = &self.next {
            match op {
                ChainOp::Pipe => write!(f, " | ")?,
                ChainOp::Semicolon => write!(f, " ; ")?,
            }
            write!(f, "{}", next)?;
        }
        Ok(())
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandKind::Empty => Ok(()),
            CommandKind::Simple(simple) => write!(f, "{}", simple),
            CommandKind::IfElse(if_else) => write!(f, "{}", if_else),
            CommandKind::For(for_cmd) => write!(f, "{}", for_cmd),
        }
    }
}

impl fmt::Display for SimpleCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.argv.join(" "))?;
        if let Some(name) = &self.stdin {
            write!(f, " < {}", name)?;
        }
        if let Some((name, mode)) = &self.stdout {
            write!(f, " {} {}", mode.operator(false), name)?;
        }
        if let Some((name, mode)) = &self.stderr {
            write!(f, " {} {}", mode.operator(true), name)?;
        }
        Ok(())
    }
}

impl RedirMode {
    /// The source operator for this mode, optionally in its stderr form.
    pub fn operator(self, on_stderr: bool) -> &'static str {
        match (self, on_stderr) {
            (RedirMode::Exclusive, false) => ">",
            (RedirMode::Append, false) => ">>",
            (RedirMode::Truncate, false) => ">|",
            (RedirMode::Exclusive, true) => "2>",
            (RedirMode::Append, true) => "2>>",
            (RedirMode::Truncate, true) => "2>|",
        }
    }
}

impl fmt::Display for IfElseCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "if {} {{ {} }}", self.test, self.then_branch)?;
        if let Some(else_branch) = &self.else_branch {
            write!(f, " else {{ {} }}", else_branch)?;
        }
        Ok(())
    }
}

impl fmt::Display for ForCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "for {} in {}", self.var as char, self.dir)?;
        if self.list_all {
            write!(f, " -A")?;
        }
        if self.recursive {
            write!(f, " -r")?;
        }
        if let Some(ext) = &self.filter_ext {
            write!(f, " -e {}", ext)?;
        }
        if let Some(kind) = self.filter_type {
            write!(f, " -t {}", kind.option_char())?;
        }
        if self.parallel > 0 {
            write!(f, " -p {}", self.parallel)?;
        }
        write!(f, " {{ {} }}", self.body)
    }
}

// =============================================================================
// TESTS
// =============================================================================
