use crate::models::error::SError;
use camino::{Utf8Path, Utf8PathBuf};
use std::io::Write;
use walkdir::WalkDir;

pub struct FileUtils;

impl FileUtils {
    /// Copies one file over `dst`, creating the parent directory if needed.
    /// Errors name the path that failed.
    pub fn copy_over(src: &Utf8Path, dst: &Utf8Path) -> Result<(), SError> {
        if let Some(parent) = dst.parent() {
            if !parent.as_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| SError::io(parent, e))?;
            }
        }
        std::fs::copy(src, dst).map_err(|e| SError::io(src, e))?;
        Ok(())
    }

    /// Writes `bytes` next to `path` first, then renames over it.
    pub fn write_atomic(path: &Utf8Path, bytes: &[u8]) -> Result<(), SError> {
        if let Some(parent) = path.parent() {
            if !parent.as_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| SError::io(parent, e))?;
            }
        }
        let tmp = Utf8PathBuf::from(format!("{path}.tmp"));
        {
            let mut f = std::fs::File::create(&tmp).map_err(|e| SError::io(&tmp, e))?;
            f.write_all(bytes).map_err(|e| SError::io(&tmp, e))?;
            f.sync_all().map_err(|e| SError::io(&tmp, e))?;
        }
        std::fs::rename(&tmp, path).map_err(|e| SError::io(path, e))?;
        Ok(())
    }

    /// Removes a directory tree; a missing directory is not an error.
    pub fn remove_dir_if_exists(dir: &Utf8Path) -> Result<(), SError> {
        match std::fs::remove_dir_all(dir) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SError::io(dir, e)),
        }
    }

    /// Removes a file; a missing file is not an error.
    pub fn remove_file_if_exists(file: &Utf8Path) -> Result<(), SError> {
        match std::fs::remove_file(file) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SError::io(file, e)),
        }
    }

    /// Every regular file under `root`, as absolute UTF-8 paths.
    pub fn list_files(root: &Utf8Path) -> Result<Vec<Utf8PathBuf>, SError> {
        let mut out = Vec::new();
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = Utf8Path::from_path(entry.path()).ok_or_else(|| {
                SError::ParseError(format!("Invalid UTF-8 path: {:?}", entry.path()))
            })?;
            out.push(path.to_path_buf());
        }
        Ok(out)
    }
}
