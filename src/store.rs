//! Persisted list of video directories
//!
//! The list lives in a small JSON document:
//!
//! ```json
//! {
//!     "paths": ["/media/clips", "D:/videos"],
//!     "include_subfolders": true
//! }
//! ```
//!
//! Paths are held in memory in normalized native form and written sorted,
//! with forward slashes, so the file reads the same on every platform.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors raised while reading or writing the path list
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("cannot write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} does not hold a JSON object", .path.display())]
    NotAnObject { path: PathBuf },
    #[error("cannot encode path list: {0}")]
    Serialize(#[from] serde_json::Error),
}

fn default_include_subfolders() -> bool {
    true
}

/// On-disk shape of the path list
#[derive(Debug, Serialize, Deserialize)]
struct PathsFile {
    #[serde(default)]
    paths: Vec<String>,
    #[serde(default = "default_include_subfolders")]
    include_subfolders: bool,
}

/// The in-memory path list and include-subfolders flag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoPaths {
    paths: BTreeSet<PathBuf>,
    include_subfolders: bool,
}

impl Default for VideoPaths {
    fn default() -> Self {
        Self {
            paths: BTreeSet::new(),
            include_subfolders: default_include_subfolders(),
        }
    }
}

impl VideoPaths {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn include_subfolders(&self) -> bool {
        self.include_subfolders
    }

    pub fn set_include_subfolders(&mut self, include: bool) {
        self.include_subfolders = include;
    }

    /// Whether the normalized form of `path` is already tracked
    pub fn contains(&self, path: &Path) -> bool {
        self.paths.contains(&normalize(path))
    }

    /// Normalize and insert a path. Returns `false` when it was already present.
    pub fn insert(&mut self, path: &Path) -> bool {
        self.paths.insert(normalize(path))
    }

    /// Remove every listed path, returning how many were actually tracked.
    pub fn remove_all<'a, I>(&mut self, paths: I) -> usize
    where
        I: IntoIterator<Item = &'a Path>,
    {
        paths
            .into_iter()
            .filter(|p| self.paths.remove(&normalize(p)))
            .count()
    }

    /// Tracked paths in the order they are written to disk
    pub fn sorted_paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.paths.iter().cloned().collect();
        paths.sort_by_cached_key(|p| to_disk_form(p));
        paths
    }

    fn to_file(&self) -> PathsFile {
        let mut paths: Vec<String> = self.paths.iter().map(|p| to_disk_form(p)).collect();
        paths.sort();
        PathsFile {
            paths,
            include_subfolders: self.include_subfolders,
        }
    }
}

/// Outcome of loading the path list
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Paths that exist on this machine, plus the stored flag
    pub record: VideoPaths,
    /// Paths found in the file that no longer exist, in file order
    pub pruned: Vec<PathBuf>,
    /// Whether the file was present at all
    pub existed: bool,
}

/// Read the path list, dropping entries that do not exist on disk.
///
/// A missing file is not an error and yields the default record.
pub fn load(file: &Path) -> Result<LoadReport, StoreError> {
    if !file.exists() {
        info!(path = %file.display(), "path list not found, starting empty");
        return Ok(LoadReport::default());
    }

    let text = fs::read_to_string(file).map_err(|source| StoreError::Read {
        path: file.to_path_buf(),
        source,
    })?;
    let parse_error = |source: serde_json::Error| StoreError::Parse {
        path: file.to_path_buf(),
        source,
    };
    // Derived structs also accept a positional array, which the file never is
    let value: serde_json::Value = serde_json::from_str(&text).map_err(parse_error)?;
    if !value.is_object() {
        return Err(StoreError::NotAnObject {
            path: file.to_path_buf(),
        });
    }
    let parsed: PathsFile = serde_json::from_value(value).map_err(parse_error)?;

    let mut report = LoadReport {
        existed: true,
        ..LoadReport::default()
    };
    report
        .record
        .set_include_subfolders(parsed.include_subfolders);

    for raw in &parsed.paths {
        let path = normalize(Path::new(raw));
        if path.exists() {
            report.record.paths.insert(path);
        } else {
            warn!(path = %path.display(), "configured path not found, dropping");
            report.pruned.push(path);
        }
    }

    info!(
        path = %file.display(),
        kept = report.record.len(),
        pruned = report.pruned.len(),
        "loaded path list"
    );
    Ok(report)
}

/// Rewrite the whole path list, creating parent directories as needed.
pub fn save(file: &Path, record: &VideoPaths) -> Result<(), StoreError> {
    if let Some(parent) = file.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| StoreError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let text = encode(record)?;
    fs::write(file, text).map_err(|source| StoreError::Write {
        path: file.to_path_buf(),
        source,
    })?;
    debug!(path = %file.display(), count = record.len(), "saved path list");
    Ok(())
}

/// JSON text for a record, four-space indented
fn encode(record: &VideoPaths) -> Result<Vec<u8>, StoreError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    record.to_file().serialize(&mut ser)?;
    Ok(buf)
}

/// Lexically normalize a path: drop `.` components and redundant
/// separators, fold `dir/..` pairs. The filesystem is not consulted.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // `..` above the root stays at the root
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            Component::Normal(name) => out.push(name),
        }
    }
    if out.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        out
    }
}

/// String form written to disk: always forward slashes.
pub fn to_disk_form(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn read_json(file: &Path) -> serde_json::Value {
        serde_json::from_str(&fs::read_to_string(file).unwrap()).unwrap()
    }

    #[test]
    fn test_normalize_lexical() {
        assert_eq!(normalize(Path::new("a/./b//c/")), PathBuf::from("a/b/c"));
        assert_eq!(normalize(Path::new("a/b/../c")), PathBuf::from("a/c"));
        assert_eq!(normalize(Path::new("../x")), PathBuf::from("../x"));
        assert_eq!(normalize(Path::new("a/../..")), PathBuf::from(".."));
        assert_eq!(normalize(Path::new("./")), PathBuf::from("."));
        assert_eq!(normalize(Path::new("")), PathBuf::from("."));
    }

    #[cfg(unix)]
    #[test]
    fn test_normalize_keeps_root() {
        assert_eq!(normalize(Path::new("/../media")), PathBuf::from("/media"));
        assert_eq!(normalize(Path::new("/media/./clips/")), PathBuf::from("/media/clips"));
    }

    #[test]
    fn test_disk_form_uses_forward_slashes() {
        assert_eq!(to_disk_form(Path::new(r"C:\videos\clips")), "C:/videos/clips");
        assert_eq!(to_disk_form(Path::new("/srv/media")), "/srv/media");
    }

    #[test]
    fn test_insert_deduplicates() {
        let mut record = VideoPaths::new();
        assert!(record.insert(Path::new("media/clips")));
        assert!(!record.insert(Path::new("media/./clips/")));
        assert_eq!(record.len(), 1);
        assert!(record.contains(Path::new("media/clips")));
    }

    #[test]
    fn test_remove_all_counts_only_tracked() {
        let mut record = VideoPaths::new();
        record.insert(Path::new("a"));
        record.insert(Path::new("b"));
        let removed = record.remove_all([Path::new("a"), Path::new("zzz")]);
        assert_eq!(removed, 1);
        assert_eq!(record.sorted_paths(), vec![PathBuf::from("b")]);
    }

    #[test]
    fn test_missing_file_yields_default() {
        let temp_dir = TempDir::new().unwrap();
        let report = load(&temp_dir.path().join("nope.json")).unwrap();
        assert!(!report.existed);
        assert!(report.record.is_empty());
        assert!(report.record.include_subfolders());
        assert!(report.pruned.is_empty());
    }

    #[test]
    fn test_load_prunes_missing_paths() {
        let temp_dir = TempDir::new().unwrap();
        let keep = temp_dir.path().join("keep");
        fs::create_dir(&keep).unwrap();
        let gone = temp_dir.path().join("gone");
        let file = temp_dir.path().join("video_paths.json");
        let doc = serde_json::json!({
            "paths": [to_disk_form(&keep), to_disk_form(&gone)],
            "include_subfolders": false,
        });
        fs::write(&file, doc.to_string()).unwrap();

        let report = load(&file).unwrap();
        assert!(report.existed);
        assert_eq!(report.record.sorted_paths(), vec![normalize(&keep)]);
        assert_eq!(report.pruned, vec![normalize(&gone)]);
        assert!(!report.record.include_subfolders());
    }

    #[test]
    fn test_load_defaults_missing_keys() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("video_paths.json");
        fs::write(&file, "{}").unwrap();

        let report = load(&file).unwrap();
        assert!(report.record.is_empty());
        assert!(report.record.include_subfolders());
    }

    #[test]
    fn test_load_rejects_malformed_json() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("video_paths.json");
        fs::write(&file, "{ \"paths\": [").unwrap();

        match load(&file) {
            Err(StoreError::Parse { path, .. }) => assert_eq!(path, file),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_load_rejects_non_object_json() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("video_paths.json");
        for text in ["[]", "[[\"/media\"], false]", "null", "3"] {
            fs::write(&file, text).unwrap();
            assert!(
                matches!(load(&file), Err(StoreError::NotAnObject { .. })),
                "accepted {text}"
            );
        }
    }

    #[test]
    fn test_save_writes_sorted_forward_slash_paths() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("nested/config/video_paths.json");
        let mut record = VideoPaths::new();
        record.insert(Path::new("zeta"));
        record.insert(Path::new("alpha/clips"));
        record.set_include_subfolders(false);

        save(&file, &record).unwrap();

        let json = read_json(&file);
        assert_eq!(json["paths"], serde_json::json!(["alpha/clips", "zeta"]));
        assert_eq!(json["include_subfolders"], serde_json::json!(false));
    }

    #[test]
    fn test_save_uses_four_space_indent() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("video_paths.json");
        save(&file, &VideoPaths::new()).unwrap();

        let text = fs::read_to_string(&file).unwrap();
        assert_eq!(text, "{\n    \"paths\": [],\n    \"include_subfolders\": true\n}");
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("video_paths.json");
        let mut record = VideoPaths::new();
        for name in ["movies", "shows", "clips"] {
            let dir = temp_dir.path().join(name);
            fs::create_dir(&dir).unwrap();
            record.insert(&dir);
        }

        save(&file, &record).unwrap();
        let report = load(&file).unwrap();
        assert_eq!(report.record, record);
        assert!(report.pruned.is_empty());
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(parts in prop::collection::vec("[a-z]{1,4}|\\.|\\.\\.", 0..8)) {
            let raw = parts.join("/");
            let once = normalize(Path::new(&raw));
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn prop_disk_form_has_no_backslash(raw in "[a-zA-Z:\\\\/ ]{0,24}") {
            prop_assert!(!to_disk_form(Path::new(&raw)).contains('\\'));
        }
    }
}
