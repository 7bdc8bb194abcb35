//! Media file discovery.

use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::MediaResult;

/// Recursively collect all `.mkv` files under a directory.
///
/// Results are sorted for deterministic processing order. An empty
/// result is not an error; the caller decides what no work means.
pub async fn find_mkv_files(root: impl AsRef<Path>) -> MediaResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![root.as_ref().to_path_buf()];

    while let Some(dir) = pending.pop() {
        let mut entries = fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let file_type = entry.file_type().await?;

            if file_type.is_dir() {
                pending.push(path);
            } else if path.extension().is_some_and(|ext| ext == "mkv") {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}
