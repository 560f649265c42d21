use std::fs;
use std::io;
use std::path::Path;
use walkdir::WalkDir;

/// Read a file to string, replacing invalid UTF-8 sequences with the replacement character.
///
/// # Errors
/// Returns an error if the file cannot be read.
pub fn read_to_string_lossy(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Recursively copy the contents of `src` into `dst`.
///
/// `dst` is created if it does not exist. Symbolic links inside the tree are
/// recreated as links (Unix) rather than followed, so a link cycle inside a
/// package cannot make the copy run forever.
///
/// # Errors
/// Returns an error if any directory cannot be read or any entry cannot be written.
pub fn copy_dir_all(src: &Path, dst: &Path) -> io::Result<u64> {
    if !src.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("source is not a directory: {}", src.display()),
        ));
    }
    fs::create_dir_all(dst)?;
    let mut copied = 0u64;

    for entry in WalkDir::new(src).min_depth(1).follow_links(false) {
        let entry = entry.map_err(io::Error::other)?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(io::Error::other)?;
        let target = dst.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&target)?;
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &target)?;
            copied += 1;
        } else {
            fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }

    Ok(copied)
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dst: &Path) -> io::Result<()> {
    let target = fs::read_link(src)?;
    std::os::unix::fs::symlink(target, dst)
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, dst: &Path) -> io::Result<()> {
    // Windows symlinks need privileges; copy whatever the link points at.
    if src.is_dir() {
        copy_dir_all(src, dst).map(|_| ())
    } else {
        fs::copy(src, dst).map(|_| ())
    }
}
