use std::fs::OpenOptions;
use std::io::Write;
use std::path::{
    Path,
    PathBuf,
};

use crate::errors::NixCfgError;

pub fn file_exists<P>(path: P) -> bool
where
    P: AsRef<Path>,
{
    path.as_ref().exists()
}

pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<(), NixCfgError> {
    let path = path.as_ref();
    std::fs::create_dir_all(path).map_err(|err| {
        NixCfgError::FileError(err, format!("failed to create directory {}", path.display()))
    })
}

/// Hidden sibling of `path` used as write target before renaming
fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();

    path.with_file_name(format!(".{name}.tmp"))
}

fn write_temp(path: &Path, data: &[u8]) -> Result<PathBuf, NixCfgError> {
    let temp = temp_path(path);

    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp)
        .map_err(|err| {
            NixCfgError::FileError(err, format!("failed to create temp file {}", temp.display()))
        })?;

    file.write_all(data)
        .and_then(|_| file.sync_all())
        .map_err(|err| {
            _ = std::fs::remove_file(&temp);
            NixCfgError::FileError(err, format!("failed to write temp file {}", temp.display()))
        })?;

    Ok(temp)
}

fn rename(from: &Path, to: &Path) -> Result<(), NixCfgError> {
    std::fs::rename(from, to).map_err(|err| {
        NixCfgError::FileError(
            err,
            format!("failed to rename {} to {}", from.display(), to.display()),
        )
    })
}

/// Writes `data` to a temporary file next to `path`, then renames it into place.
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<(), NixCfgError> {
    let temp = write_temp(path, data)?;
    rename(&temp, path).map_err(|err| {
        _ = std::fs::remove_file(&temp);
        err
    })
}

/// Sibling of `path` holding its previous content while a set is renamed
fn backup_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();

    path.with_file_name(format!(".{name}.orig"))
}

/// Copies existing regular files aside, so they can be put back
/// if a later rename in the set fails.
fn backup(path: &Path) -> Result<Option<PathBuf>, NixCfgError> {
    if !path.is_file() {
        return Ok(None);
    }

    let backup = backup_path(path);
    std::fs::copy(path, &backup).map_err(|err| {
        NixCfgError::FileError(err, format!("failed to back up {}", path.display()))
    })?;

    Ok(Some(backup))
}

/// Undoes the first `renamed` renames of a set. Best-effort.
fn rollback(files: &[(PathBuf, &[u8])], backups: &[Option<PathBuf>], renamed: usize) {
    for ((path, _), backup) in files.iter().zip(backups).take(renamed) {
        match backup {
            Some(backup) => {
                _ = std::fs::rename(backup, path);
            }
            None => {
                _ = std::fs::remove_file(path);
            }
        }
    }
}

fn remove_all<'a, I: IntoIterator<Item = &'a PathBuf>>(paths: I) {
    for path in paths {
        _ = std::fs::remove_file(path);
    }
}

/// Like [write_atomic], but for a set of files that belong together:
/// every file is fully written to its temporary path before any of them
/// is renamed, so a failed write leaves none of the targets touched.
/// If a rename fails, targets already renamed get their previous
/// content back.
pub fn write_atomic_all(files: &[(PathBuf, &[u8])]) -> Result<(), NixCfgError> {
    let mut staged: Vec<PathBuf> = Vec::with_capacity(files.len());

    for (path, data) in files {
        match write_temp(path, data) {
            Ok(temp) => staged.push(temp),
            Err(err) => {
                remove_all(&staged);
                return Err(err);
            }
        }
    }

    let mut backups: Vec<Option<PathBuf>> = Vec::with_capacity(files.len());
    for (path, _) in files {
        match backup(path) {
            Ok(backup) => backups.push(backup),
            Err(err) => {
                remove_all(&staged);
                remove_all(backups.iter().flatten());
                return Err(err);
            }
        }
    }

    for (i, (temp, (path, _))) in staged.iter().zip(files).enumerate() {
        if let Err(err) = rename(temp, path) {
            log::warn!("rolling back {i} renamed file(s) after failing on {}", path.display());

            rollback(files, &backups, i);
            remove_all(&staged[i..]);
            remove_all(backups.iter().flatten());

            return Err(err);
        }
    }

    remove_all(backups.iter().flatten());

    Ok(())
}
