//! Container files on disk.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::TrsError;

/// Read a whole container file.
pub fn read_container(path: impl AsRef<Path>) -> Result<Vec<u8>, TrsError> {
    Ok(fs::read(path)?)
}

/// Write `bytes` to `path` so that readers see either the old file or the
/// complete new one.
///
/// Data goes to a hidden temporary file in the same directory, which is
/// renamed over `path` once flushed. The temporary is removed if any step
/// fails.
pub fn write_container_atomic(path: impl AsRef<Path>, bytes: &[u8]) -> Result<(), TrsError> {
    let path = path.as_ref();
    let tmp = temp_path(path);

    let result = (|| {
        let mut file = File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        drop(file);
        fs::rename(&tmp, path)
    })();

    if let Err(e) = result {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    log::debug!("wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(path.file_name().unwrap_or_else(|| "container".as_ref()));
    name.push(".tmp");
    path.with_file_name(name)
}
