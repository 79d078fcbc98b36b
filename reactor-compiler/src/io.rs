//! Prebuilt executable and output file handling

use crate::error::{CompileError, Result};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Read the prebuilt executable that the sections are appended to
pub fn read_prebuilt(path: &Path) -> Result<Vec<u8>> {
    if !path.is_file() {
        return Err(CompileError::MissingPrebuiltArtifact(path.to_path_buf()));
    }
    let bytes = fs::read(path)?;
    debug!(path = %path.display(), bytes = bytes.len(), "read prebuilt executable");
    Ok(bytes)
}

/// Write the compiled artifact and add execute permission
pub fn write_executable(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes)?;
    set_executable(path)?;
    debug!(path = %path.display(), bytes = bytes.len(), "wrote executable");
    Ok(())
}

#[cfg(unix)]
fn set_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut permissions = fs::metadata(path)?.permissions();
    permissions.set_mode(permissions.mode() | 0o111);
    fs::set_permissions(path, permissions)?;
    Ok(())
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> Result<()> {
    Ok(())
}
