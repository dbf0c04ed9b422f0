//! Runtime settings for the video paths manager

use std::path::{Path, PathBuf};

/// File name of the persisted path list
pub const CONFIG_FILE_NAME: &str = "video_paths.json";

/// File name of the log written next to the path list
pub const LOG_FILE_NAME: &str = "vidpaths.log";

/// Extensions the video backend picks up from the configured directories
pub const DEFAULT_VIDEO_EXTENSIONS: &[&str] = &["mp4", "m4a"];

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Location of the JSON path list
    pub config_path: PathBuf,
    /// Location of the log file
    pub log_path: PathBuf,
    /// Lowercase extensions counted as video files
    pub video_extensions: Vec<String>,
    /// Whether the directory picker lists hidden directories
    pub show_hidden_dirs: bool,
}

impl Default for Config {
    fn default() -> Self {
        let dir = install_dir().join("config");
        Self {
            config_path: dir.join(CONFIG_FILE_NAME),
            log_path: dir.join(LOG_FILE_NAME),
            video_extensions: DEFAULT_VIDEO_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            show_hidden_dirs: false,
        }
    }
}

impl Config {
    /// Create a new configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the path list location; the log file follows it into the same directory
    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config_path = path.into();
        self.log_path = self
            .config_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(LOG_FILE_NAME);
        self
    }

    /// Set the log file location
    pub fn with_log_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.log_path = path.into();
        self
    }

    /// Replace the set of extensions counted as videos
    pub fn with_video_extensions<I, S>(mut self, exts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.video_extensions = exts
            .into_iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_lowercase())
            .collect();
        self
    }

    /// Show or hide dot-directories in the picker
    pub fn with_hidden_dirs(mut self, show: bool) -> Self {
        self.show_hidden_dirs = show;
        self
    }
}

/// Directory holding the running executable, or the working directory when
/// that cannot be determined.
fn install_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths_share_directory() {
        let config = Config::default();
        assert!(config.config_path.ends_with("config/video_paths.json"));
        assert_eq!(config.config_path.parent(), config.log_path.parent());
        assert_eq!(config.video_extensions, vec!["mp4", "m4a"]);
        assert!(!config.show_hidden_dirs);
    }

    #[test]
    fn test_with_config_path_moves_log() {
        let config = Config::new().with_config_path("/tmp/x/paths.json");
        assert_eq!(config.log_path, PathBuf::from("/tmp/x").join(LOG_FILE_NAME));
    }

    #[test]
    fn test_extensions_are_normalized() {
        let config = Config::new().with_video_extensions([".MP4", "mkv"]);
        assert_eq!(config.video_extensions, vec!["mp4", "mkv"]);
    }
}
