//! ftype - print the type of a file.

use std::borrow::Cow;
use std::fs;
use std::os::unix::fs::FileTypeExt;

use crate::interpreter::types::ShellState;

/// Inspects the path itself (symlinks are not followed) and prints one of
/// `regular file`, `directory`, `symbolic link`, `named pipe` or `other`.
pub fn handle_ftype(_state: &mut ShellState, args: &[Cow<'_, str>]) -> i32 {
    let Some(path) = args.get(1) else {
        eprintln!("fsh: ftype: missing operand");
        return 1;
    };
    let path: &str = path.as_ref();

    match fs::symlink_metadata(path) {
        Ok(metadata) => {
            println!("{}", describe(&metadata.file_type()));
            0
        }
        Err(err) => {
            eprintln!("fsh: ftype: {}: {}", path, err);
            1
        }
    }
}

fn describe(file_type: &fs::FileType) -> &'static str {
    if file_type.is_symlink() {
        "symbolic link"
    } else if file_type.is_dir() {
        "directory"
    } else if file_type.is_fifo() {
        "named pipe"
    } else if file_type.is_file() {
        "regular file"
    } else {
        "other"
    }
}
