use anyhow::{anyhow, Context, Result};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;

/// Read a file as lossy UTF-8, mapping a missing file to `None`.
///
/// Any other I/O failure (permissions, a directory in place of a file) is
/// returned to the caller.
pub fn read_text_if_exists(path: &Path) -> Result<Option<String>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err).with_context(|| format!("read {}", path.display())),
    }
}

/// Replace the content of `dest` with `text`.
///
/// Symlinks are followed so the file they point at is updated. The new content
/// goes through a temp file and a rename next to the real file, except for
/// hard-linked files, which are rewritten in place to keep the links shared.
pub fn write_atomic(dest: &Path, text: &str) -> Result<()> {
    let dest = &match fs::canonicalize(dest) {
        Ok(resolved) => resolved,
        Err(err) if err.kind() == ErrorKind::NotFound => dest.to_path_buf(),
        Err(err) => return Err(err).with_context(|| format!("resolve {}", dest.display())),
    };
    if has_other_links(dest) {
        tracing::debug!(path = %dest.display(), "hard-linked target; writing in place");
        fs::write(dest, text.as_bytes()).with_context(|| format!("write {}", dest.display()))?;
        return Ok(());
    }
    let parent = dest
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(parent)
        .with_context(|| format!("create temp file in {}", parent.display()))?;
    tmp.write_all(text.as_bytes())
        .with_context(|| format!("write {}", dest.display()))?;
    if let Ok(meta) = fs::metadata(dest) {
        fs::set_permissions(tmp.path(), meta.permissions())
            .with_context(|| format!("copy permissions of {}", dest.display()))?;
    }
    tmp.persist(dest)
        .map_err(|err| anyhow!("write {}: {}", dest.display(), err.error))?;
    Ok(())
}

#[cfg(unix)]
fn has_other_links(path: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;
    fs::metadata(path).map(|meta| meta.nlink() > 1).unwrap_or(false)
}

#[cfg(not(unix))]
fn has_other_links(_path: &Path) -> bool {
    false
}

/// Write `text` to `dest`, creating parent directories as needed.
pub fn write_text(dest: &Path, text: &str) -> Result<()> {
    if let Some(parent) = dest.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
        }
    }
    fs::write(dest, text.as_bytes()).with_context(|| format!("write {}", dest.display()))?;
    Ok(())
}
