//! Redirection Setup
//!
//! Opens redirection targets with mode-specific flags and hands the open
//! files to the dispatcher. "No redirection" is simply an absent file, and
//! a failed open drops whatever was already opened.

use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::fs::OpenOptionsExt;

use crate::ast::types::{RedirMode, SimpleCommand};
use crate::interpreter::expansion::expand;
use crate::interpreter::types::VarTable;

/// Permission bits for files created by output redirections; the process
/// umask applies on top.
const CREATE_MODE: u32 = 0o666;

/// The three optional redirection files of one simple command.
pub struct RedirSet {
    pub stdin: Option<File>,
    pub stdout: Option<File>,
    pub stderr: Option<File>,
}

impl RedirSet {
    pub fn none() -> Self {
        RedirSet { stdin: None, stdout: None, stderr: None }
    }
}

/// Open a file for `<`.
pub fn open_input(path: &str) -> io::Result<File> {
    File::open(path)
}

/// Open a file for `>`, `>>` or `>|`.
pub fn open_output(path: &str, mode: RedirMode) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).mode(CREATE_MODE);
    match mode {
        RedirMode::Exclusive => options.create_new(true),
        RedirMode::Append => options.create(true).append(true),
        RedirMode::Truncate => options.create(true).truncate(true),
    };
    options.open(path)
}

/// Expand the redirection filenames of `simple` and open all of them.
/// On failure the diagnostic is printed and the command must abort;
/// already-opened files are closed by drop.
pub fn setup(simple: &SimpleCommand, vars: &VarTable) -> Result<RedirSet, ()> {
    let mut redirs = RedirSet::none();
    if let Some(name) = &simple.stdin {
        let path = expand(name, vars);
        redirs.stdin = Some(report_err(&path, open_input(&path))?);
    }
    if let Some((name, mode)) = &simple.stdout {
        let path = expand(name, vars);
        redirs.stdout = Some(report_err(&path, open_output(&path, *mode))?);
    }
    if let Some((name, mode)) = &simple.stderr {
        let path = expand(name, vars);
        redirs.stderr = Some(report_err(&path, open_output(&path, *mode))?);
    }
    Ok(redirs)
}

fn report_err(path: &str, result: io::Result<File>) -> Result<File, ()> {
    result.map_err(|err| {
        eprintln!("fsh: {}: {}", path, err);
    })
}
