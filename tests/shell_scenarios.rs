//! End-to-end scenarios: each test drives the built shell with a single
//! line (`fsh -c LINE`) inside a scratch directory and checks the observed
//! stdout and the final status.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use pretty_assertions::assert_eq;

fn run_in(dir: &Path, line: &str) -> Output {
    Command::new(env!("CARGO_BIN_EXE_fsh"))
        .arg("-c")
        .arg(line)
        .current_dir(dir)
        .output()
        .expect("failed to launch fsh")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn status(output: &Output) -> i32 {
    output.status.code().expect("shell killed by signal")
}

// =============================================================================
// PIPELINES & CHAINS
// =============================================================================

#[test]
fn pipeline_feeds_the_next_stage() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_in(dir.path(), "echo hello | wc -c");
    assert_eq!(stdout(&output).trim(), "6");
    assert_eq!(status(&output), 0);
}

#[test]
fn pipeline_last_stage_runs_in_the_shell() {
    let dir = tempfile::tempdir().unwrap();
    let sub = dir.path().join("sub");
    fs::create_dir(&sub).unwrap();

    // A builtin at the end of a pipeline must mutate the shell's state.
    let output = run_in(dir.path(), "echo hi | cd sub ; pwd");
    assert_eq!(
        stdout(&output).trim(),
        sub.canonicalize().unwrap().to_str().unwrap()
    );
    assert_eq!(status(&output), 0);
}

#[test]
fn exit_in_a_forked_stage_only_ends_that_stage() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_in(dir.path(), "exit 5 | wc -l ; echo alive");
    assert_eq!(stdout(&output), "0\nalive\n");
    assert_eq!(status(&output), 0);
}

#[test]
fn semicolon_keeps_the_last_status() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_in(dir.path(), "oopsie 3 ; echo after");
    assert_eq!(stdout(&output), "after\n");
    assert_eq!(status(&output), 0);

    let output = run_in(dir.path(), "echo first ; oopsie 3");
    assert_eq!(status(&output), 3);
}

// =============================================================================
// CONDITIONALS
// =============================================================================

#[test]
fn if_takes_the_then_branch_on_success() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_in(dir.path(), "if true { echo yes } else { echo no }");
    assert_eq!(stdout(&output), "yes\n");
    assert_eq!(status(&output), 0);
}

#[test]
fn if_takes_the_else_branch_on_failure() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_in(dir.path(), "if false { echo yes } else { echo no }");
    assert_eq!(stdout(&output), "no\n");
    assert_eq!(status(&output), 0);
}

#[test]
fn failed_test_without_else_is_a_success() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_in(dir.path(), "if oopsie 2 { echo yes }");
    assert_eq!(stdout(&output), "");
    assert_eq!(status(&output), 0);
}

// =============================================================================
// FOR LOOPS
// =============================================================================

#[test]
fn for_with_type_filter_binds_the_full_path() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"x").unwrap();

    let output = run_in(dir.path(), "for f in . -t f { echo $f }");
    assert_eq!(stdout(&output), "./a.txt\n");
    assert_eq!(status(&output), 0);
}

#[test]
fn for_with_extension_filter_trims_the_suffix() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"x").unwrap();

    let output = run_in(dir.path(), "for f in . -t f -e txt { echo $f }");
    assert_eq!(stdout(&output), "./a\n");
    assert_eq!(status(&output), 0);
}

#[test]
fn for_skips_hidden_entries_without_list_all() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(".hidden"), b"x").unwrap();

    let output = run_in(dir.path(), "for f in . { echo $f }");
    assert_eq!(stdout(&output), "");
    let output = run_in(dir.path(), "for f in . -A { echo $f }");
    assert_eq!(stdout(&output), "./.hidden\n");
}

#[test]
fn for_recurses_into_subdirectories() {
    let dir = tempfile::tempdir().unwrap();
    let sub = dir.path().join("sub");
    fs::create_dir(&sub).unwrap();
    fs::write(sub.join("deep.txt"), b"x").unwrap();

    let output = run_in(dir.path(), "for f in . -r -e txt { echo $f }");
    assert_eq!(stdout(&output), "./sub/deep\n");
    assert_eq!(status(&output), 0);
}

#[test]
fn parallel_loop_runs_every_iteration() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["a", "b", "c"] {
        fs::write(dir.path().join(name), b"x").unwrap();
    }

    let output = run_in(dir.path(), "for f in . -p 2 { echo $f }");
    let stdout_str = stdout(&output);
    let mut lines: Vec<&str> = stdout_str.lines().collect();
    lines.sort_unstable();
    assert_eq!(lines, vec!["./a", "./b", "./c"]);
    assert_eq!(status(&output), 0);
}

#[test]
fn loop_status_is_the_maximum_iteration_status() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a"), b"x").unwrap();
    fs::write(dir.path().join("b"), b"x").unwrap();

    let output = run_in(dir.path(), "for f in . { oopsie 4 }");
    assert_eq!(status(&output), 4);
}

// =============================================================================
// REDIRECTIONS
// =============================================================================

#[test]
fn stdout_redirection_writes_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_in(dir.path(), "pwd > out.txt");
    assert_eq!(stdout(&output), "");
    assert_eq!(status(&output), 0);
    let expected = format!(
        "{}\n",
        dir.path().canonicalize().unwrap().to_str().unwrap()
    );
    assert_eq!(fs::read_to_string(dir.path().join("out.txt")).unwrap(), expected);
}

#[test]
fn exclusive_redirection_refuses_to_clobber() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_in(dir.path(), "echo one > f ; echo two > f");
    assert_eq!(status(&output), 1);
    assert!(!stderr(&output).is_empty());
    assert_eq!(fs::read_to_string(dir.path().join("f")).unwrap(), "one\n");
}

#[test]
fn truncate_and_append_redirections() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_in(dir.path(), "echo one > f ; echo two >| f ; echo three >> f");
    assert_eq!(status(&output), 0);
    assert_eq!(
        fs::read_to_string(dir.path().join("f")).unwrap(),
        "two\nthree\n"
    );
}

#[test]
fn input_redirection_feeds_the_command() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("data"), b"abcd").unwrap();
    let output = run_in(dir.path(), "wc -c < data");
    assert_eq!(stdout(&output).trim(), "4");
    assert_eq!(status(&output), 0);
}

#[test]
fn builtin_stderr_can_be_redirected() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_in(dir.path(), "ftype missing 2> err.txt");
    assert_eq!(status(&output), 1);
    assert_eq!(stderr(&output), "");
    assert!(!fs::read_to_string(dir.path().join("err.txt")).unwrap().is_empty());
}

// =============================================================================
// BUILTINS
// =============================================================================

#[test]
fn ftype_reports_file_types() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"x").unwrap();
    let output = run_in(dir.path(), "ftype a.txt");
    assert_eq!(stdout(&output), "regular file\n");
    let output = run_in(dir.path(), "ftype .");
    assert_eq!(stdout(&output), "directory\n");
}

#[test]
fn cd_dash_returns_to_the_previous_directory() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    let output = run_in(dir.path(), "cd sub ; cd - ; pwd");
    assert_eq!(
        stdout(&output).trim(),
        dir.path().canonicalize().unwrap().to_str().unwrap()
    );
    assert_eq!(status(&output), 0);
}

#[test]
fn cd_without_argument_goes_home() {
    let dir = tempfile::tempdir().unwrap();
    let home = dir.path().canonicalize().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_fsh"))
        .arg("-c")
        .arg("cd ; pwd")
        .current_dir("/")
        .env("HOME", &home)
        .output()
        .unwrap();
    assert_eq!(stdout(&output).trim(), home.to_str().unwrap());
}

#[test]
fn exit_sets_the_shell_status() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(status(&run_in(dir.path(), "exit 3")), 3);
    // Codes are truncated to 8 bits at the exit boundary.
    assert_eq!(status(&run_in(dir.path(), "exit 300")), 300 & 0xff);
    // With no argument, exit reuses the previous return value; a fresh
    // shell starts from zero.
    assert_eq!(status(&run_in(dir.path(), "exit")), 0);
}

#[test]
fn autotune_doubles_every_byte() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_in(dir.path(), "echo ab | autotune");
    assert_eq!(stdout(&output), "aa\nbb\n");
    assert_eq!(status(&output), 0);
}

// =============================================================================
// ERRORS & RETURN CODES
// =============================================================================

#[test]
fn unknown_command_reports_and_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_in(dir.path(), "nosuchcmd-fsh");
    assert_eq!(stdout(&output), "");
    assert!(stderr(&output).contains("nosuchcmd-fsh"));
    assert_eq!(status(&output), 1);
}

#[test]
fn syntax_errors_exit_with_two() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_in(dir.path(), "for f in .");
    assert!(!stderr(&output).is_empty());
    assert_eq!(status(&output), 2);

    assert_eq!(status(&run_in(dir.path(), "echo }")), 2);
    assert_eq!(status(&run_in(dir.path(), "| cat")), 2);
}

#[test]
fn for_option_errors_exit_with_one() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_in(dir.path(), "for f in . -x { echo $f }");
    assert!(!stderr(&output).is_empty());
    assert_eq!(status(&output), 1);
    assert_eq!(status(&run_in(dir.path(), "for f in . -t q { echo $f }")), 1);
}

#[test]
fn empty_line_is_a_success() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_in(dir.path(), "");
    assert_eq!(stdout(&output), "");
    assert_eq!(status(&output), 0);
}

#[test]
fn signal_death_becomes_255_at_exit() {
    // There is no quoting in the shell, so the self-killing command ships
    // as a script.
    use std::os::unix::fs::PermissionsExt;
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("die.sh");
    fs::write(&script, "#!/bin/sh\nkill -9 $$\n").unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

    let output = run_in(dir.path(), "./die.sh");
    assert_eq!(status(&output), 255);
}
