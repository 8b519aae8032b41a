//! Crash-safe whole-file writes.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

fn unique_tmp_path(dest: &Path) -> io::Result<PathBuf> {
    let parent = dest
        .parent()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no parent"))?;
    let file_name = dest
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no filename"))?;

    let tmp_name = format!(
        ".{}.tmp.{}.{}",
        file_name.to_string_lossy(),
        std::process::id(),
        crate::util::unix_timestamp_millis()
    );
    Ok(parent.join(tmp_name))
}

#[cfg(unix)]
fn fsync_dir(path: &Path) -> io::Result<()> {
    File::open(path)?.sync_all()
}

#[cfg(not(unix))]
#[allow(clippy::unnecessary_wraps)]
const fn fsync_dir(_path: &Path) -> io::Result<()> {
    Ok(())
}

/// Write `bytes` to `dest` through a temp file and rename.
///
/// Readers observe either the previous content or the new content, never a
/// partial file. Parent directories are created as needed.
pub fn write_atomic(dest: &Path, bytes: &[u8]) -> io::Result<()> {
    let parent = dest
        .parent()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no parent"))?;
    std::fs::create_dir_all(parent)?;

    let tmp = unique_tmp_path(dest)?;
    let written = (|| {
        let mut file = File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        std::fs::rename(&tmp, dest)
    })();

    if let Err(error) = written {
        let _ = std::fs::remove_file(&tmp);
        return Err(error);
    }

    fsync_dir(parent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_atomic_creates_parent_and_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("nested").join("blob.json");

        write_atomic(&dest, b"first").unwrap();
        write_atomic(&dest, b"second").unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), b"second");
        let leftovers = std::fs::read_dir(dest.parent().unwrap())
            .unwrap()
            .filter_map(std::result::Result::ok)
            .filter(|entry| entry.file_name().to_string_lossy().contains(".tmp."))
            .count();
        assert_eq!(leftovers, 0);
    }
}
