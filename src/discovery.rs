//! Input file discovery

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::FabError;

/// List regular files in `dir` whose extension is exactly `extension`.
///
/// The match is case sensitive and the result is sorted so batch runs are
/// reproducible.
pub fn find_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, FabError> {
    let mut files = fs::read_dir(dir)
        .map_err(|e| FabError::io(dir, e))?
        .filter_map(|entry| {
            entry.ok().and_then(|e| {
                let path = e.path();
                let matches = path.extension().and_then(|ext| ext.to_str()) == Some(extension);
                if matches && path.is_file() {
                    Some(path)
                } else {
                    None
                }
            })
        })
        .collect::<Vec<_>>();

    files.sort();

    debug!(
        "Found {} .{} files in {}: {:?}",
        files.len(),
        extension,
        dir.display(),
        files
    );
    Ok(files)
}
