use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{bail, Context, Result};

use crate::time_utils::current_unix_timestamp_ms;

static TEMP_FILE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Replaces `path` with `content` via a sibling temp file + rename so readers
/// only ever see the previous file or the complete new one.
pub fn write_text_atomic(path: &Path, content: &str) -> Result<()> {
    if path.as_os_str().is_empty() {
        bail!("destination path cannot be empty");
    }
    if path.is_dir() {
        bail!("destination path '{}' is a directory", path.display());
    }

    let parent_dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent_dir)
        .with_context(|| format!("failed to create {}", parent_dir.display()))?;

    let temp_path = temp_path_for(parent_dir, path);
    let written = write_and_sync(&temp_path, content);
    if let Err(error) = written {
        let _ = std::fs::remove_file(&temp_path);
        return Err(error);
    }
    if let Err(error) = std::fs::rename(&temp_path, path) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(error).with_context(|| {
            format!(
                "failed to move {} into place at {}",
                temp_path.display(),
                path.display()
            )
        });
    }
    Ok(())
}

fn temp_path_for(parent_dir: &Path, path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("state");
    let sequence = TEMP_FILE_COUNTER.fetch_add(1, Ordering::Relaxed);
    parent_dir.join(format!(
        ".{file_name}.tmp-{}-{}-{sequence}",
        std::process::id(),
        current_unix_timestamp_ms()
    ))
}

fn write_and_sync(temp_path: &Path, content: &str) -> Result<()> {
    let mut file = std::fs::File::create(temp_path)
        .with_context(|| format!("failed to create temporary file {}", temp_path.display()))?;
    file.write_all(content.as_bytes())
        .with_context(|| format!("failed to write temporary file {}", temp_path.display()))?;
    file.sync_all()
        .with_context(|| format!("failed to flush temporary file {}", temp_path.display()))?;
    Ok(())
}
