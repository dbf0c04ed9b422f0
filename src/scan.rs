//! Counting the videos the configured directories expose

use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Summary of a scan over the configured directories
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScanSummary {
    pub videos: usize,
    pub unreadable: usize,
}

/// Whether `path` has one of `extensions` (compared lowercase, without the dot)
pub fn is_video(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .is_some_and(|ext| extensions.iter().any(|x| *x == ext))
}

/// Count video files beneath each directory. Only the directory's own files
/// are considered unless `include_subfolders` is set.
pub fn count_videos<P: AsRef<Path>>(
    dirs: &[P],
    include_subfolders: bool,
    extensions: &[String],
) -> ScanSummary {
    let mut summary = ScanSummary::default();
    for dir in dirs {
        let dir = dir.as_ref();
        // Linked files and folders count like real ones; walkdir reports loops as errors
        let mut walker = WalkDir::new(dir).min_depth(1).follow_links(true);
        if !include_subfolders {
            walker = walker.max_depth(1);
        }
        for entry in walker {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_file() && is_video(entry.path(), extensions) {
                        summary.videos += 1;
                    }
                }
                Err(e) => {
                    warn!(dir = %dir.display(), error = %e, "skipping unreadable entry");
                    summary.unreadable += 1;
                }
            }
        }
        debug!(dir = %dir.display(), total = summary.videos, "scanned directory");
    }
    summary
}
