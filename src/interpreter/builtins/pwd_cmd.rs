//! pwd - print the working directory.

use std::borrow::Cow;

use crate::interpreter::types::ShellState;

/// The shell keeps its working directory cached, re-read after every
/// successful `cd`, so no `getcwd` is needed here.
pub fn handle_pwd(state: &mut ShellState, args: &[Cow<'_, str>]) -> i32 {
    if args.len() > 1 {
        eprintln!("fsh: pwd: too many arguments");
        return 1;
    }
    println!("{}", state.cwd.display());
    0
}
