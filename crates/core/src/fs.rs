//! File helpers used by the serializers

use crate::error::{CogwheelError, Result};
use std::fs;
use std::path::Path;

/// Write `contents` to `path`, creating parent directories as needed
pub fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    create_parent_dirs(path)?;
    fs::write(path, contents).map_err(|e| CogwheelError::io(path, e))
}

pub fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| CogwheelError::io(path, e))
}

fn create_parent_dirs(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            fs::create_dir_all(parent).map_err(|e| CogwheelError::io(parent, e))
        }
        _ => Ok(()),
    }
}
