//! cd - change the working directory.
//!
//! Supports:
//! - `cd`      - change to $HOME (as read at startup)
//! - `cd -`    - change to the previous working directory
//! - `cd DIR`  - change to DIR

use std::borrow::Cow;
use std::env;
use std::path::PathBuf;

use crate::interpreter::types::ShellState;

pub fn handle_cd(state: &mut ShellState, args: &[Cow<'_, str>]) -> i32 {
    if args.len() > 2 {
        eprintln!("fsh: cd: too many arguments");
        return 1;
    }

    let target: PathBuf = match args.get(1).map(|arg| &**arg) {
        None => match &state.home {
            Some(home) => home.clone(),
            None => {
                eprintln!("fsh: cd: HOME not set");
                return 1;
            }
        },
        Some("-") => state.prev_dir.clone(),
        Some(path) => PathBuf::from(path),
    };

    if let Err(err) = env::set_current_dir(&target) {
        eprintln!("fsh: cd: {}: {}", target.display(), err);
        return 1;
    }

    // The previous directory becomes whatever was cached, and the cache is
    // re-read from the OS. Losing the working directory right after a
    // successful chdir leaves the shell with no consistent state to offer.
    state.prev_dir = std::mem::take(&mut state.cwd);
    match env::current_dir() {
        Ok(cwd) => state.cwd = cwd,
        Err(err) => {
            eprintln!("fsh: cd: getcwd: {}", err);
            std::process::exit(1);
        }
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    // These tests chdir the test process; keep every assertion inside one
    // test so they cannot interleave.
    #[test]
    fn cd_updates_cache_and_dash_returns() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = ShellState::new().unwrap();
        let origin = state.cwd.clone();

        let target = dir.path().to_str().unwrap().to_string();
        assert_eq!(handle_cd(&mut state, &["cd".into(), target.into()]), 0);
        assert_eq!(state.cwd, dir.path().canonicalize().unwrap());
        assert_eq!(state.prev_dir, origin);

        assert_eq!(handle_cd(&mut state, &["cd".into(), "-".into()]), 0);
        assert_eq!(state.cwd, origin);

        assert_eq!(
            handle_cd(&mut state, &["cd".into(), "/no/such/dir".into()]),
            1
        );
        assert_eq!(state.cwd, origin, "failed cd must not move the cache");

        assert_eq!(
            handle_cd(&mut state, &["cd".into(), "a".into(), "b".into()]),
            1
        );
    }
}
