//! Inspection of many files.
//!
//! Each file gets its own [`InspectResult`]: a file that cannot be read or parsed is reported and
//! logged, and the rest of the batch carries on.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::InspectResult;
use crate::inspect::{Inspector, Report};

/// Extensions matched when the caller gives none.
pub const DEFAULT_EXTENSIONS: [&str; 2] = ["tif", "tiff"];

/// The outcome of inspecting one file.
#[derive(Debug)]
pub struct FileReport {
    /// The file inspected.
    pub path: PathBuf,
    /// The report, or why there is none.
    pub result: InspectResult<Report>,
}

impl FileReport {
    fn new(path: PathBuf, result: InspectResult<Report>) -> Self {
        if let Err(err) = &result {
            warn!(path = %path.display(), %err, "failed to inspect file");
        }
        Self { path, result }
    }
}

/// Enumerate the files under `root` whose extension is one of `extensions`.
///
/// Extensions are compared case-insensitively and may be given with or without a leading dot. If
/// `root` is a file it is returned as-is, whatever its extension. Directories are walked in file
/// name order, and only one level deep unless `recursive` is set.
pub fn collect_paths(
    root: impl AsRef<Path>,
    extensions: &[impl AsRef<str>],
    recursive: bool,
) -> InspectResult<Vec<PathBuf>> {
    let root = root.as_ref();
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut paths = Vec::new();
    for entry in WalkDir::new(root).max_depth(max_depth).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() && has_extension(entry.path(), extensions) {
            paths.push(entry.into_path());
        }
    }
    debug!(root = %root.display(), files = paths.len(), "collected paths");
    Ok(paths)
}

fn has_extension(path: &Path, extensions: &[impl AsRef<str>]) -> bool {
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return false;
    };
    extensions
        .iter()
        .any(|want| want.as_ref().trim_start_matches('.').eq_ignore_ascii_case(ext))
}

/// Read and inspect a single file.
pub fn inspect_file(path: impl AsRef<Path>, inspector: &Inspector) -> InspectResult<Report> {
    let data = std::fs::read(path)?;
    Ok(inspector.inspect(Bytes::from(data))?)
}

/// Inspect `paths` one after the other.
pub fn inspect_paths(paths: &[PathBuf], inspector: &Inspector) -> Vec<FileReport> {
    paths
        .iter()
        .map(|path| FileReport::new(path.clone(), inspect_file(path, inspector)))
        .collect()
}

/// Inspect `paths` with at most `limit` files in flight, returning reports in input order.
#[cfg(feature = "tokio")]
pub async fn inspect_paths_concurrent(
    paths: Vec<PathBuf>,
    inspector: &Inspector,
    limit: usize,
) -> Vec<FileReport> {
    use futures::stream::{self, StreamExt};

    stream::iter(paths)
        .map(|path| async move {
            let result: InspectResult<Report> = match tokio::fs::read(&path).await {
                Ok(data) => inspector.inspect(Bytes::from(data)).map_err(Into::into),
                Err(err) => Err(err.into()),
            };
            FileReport::new(path, result)
        })
        .buffered(limit.max(1))
        .collect()
        .await
}
