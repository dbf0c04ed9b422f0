use crate::config::Config;
use crate::picker::DirPicker;
use crate::scan::{self, ScanSummary};
use crate::store::{self, VideoPaths};
use anyhow::Result;
use std::collections::{BTreeSet, VecDeque};
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tui_textarea::TextArea;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKind {
    Warning,
    Error,
}

/// A modal message; input is blocked until it is dismissed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialog {
    pub kind: DialogKind,
    pub title: String,
    pub message: String,
}

#[derive(Debug)]
pub struct App {
    pub config: Config,
    pub record: VideoPaths,
    /// Paths in display order
    pub rows: Vec<PathBuf>,
    pub cursor: usize,
    pub marked: BTreeSet<PathBuf>,
    pub dialogs: VecDeque<Dialog>,
    // Directory chooser overlay
    pub picker: Option<DirPicker>,
    pub goto_input: Option<TextArea<'static>>,
    pub status: String,
    pub show_help: bool,
    pub last_scan: Option<ScanSummary>,
}

impl App {
    /// Build the app and load the path list named by `config`.
    pub fn new(config: Config) -> Self {
        let mut app = Self {
            config,
            record: VideoPaths::default(),
            rows: vec![],
            cursor: 0,
            marked: BTreeSet::new(),
            dialogs: VecDeque::new(),
            picker: None,
            goto_input: None,
            status: "Ready".into(),
            show_help: false,
            last_scan: None,
        };
        app.load();
        app
    }

    pub fn config_path(&self) -> &Path {
        &self.config.config_path
    }

    // --- Load / save --------------------------------------------------------

    /// Read the path list, warn about every path that vanished, and write the
    /// cleaned list back. Any failure resets to an empty list.
    pub fn load(&mut self) {
        match store::load(&self.config.config_path) {
            Ok(report) => {
                for path in &report.pruned {
                    self.raise(
                        DialogKind::Warning,
                        "Invalid Path",
                        format!("Path not found and will be removed: {}", path.display()),
                    );
                }
                self.record = report.record;
                self.status = format!("Loaded {} paths", self.record.len());
            }
            Err(e) => {
                error!(error = %e, "failed to load path list");
                self.raise(
                    DialogKind::Error,
                    "Error",
                    format!("Failed to load paths: {e}"),
                );
                self.record = VideoPaths::default();
                self.status = "Started with an empty list".into();
            }
        }
        self.marked.clear();
        self.refresh_rows();
        self.save();
    }

    /// Persist the whole list. Returns `false` (and shows a dialog) on failure.
    pub fn save(&mut self) -> bool {
        match store::save(&self.config.config_path, &self.record) {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "failed to save path list");
                self.raise(
                    DialogKind::Error,
                    "Error",
                    format!("Failed to save paths: {e}"),
                );
                false
            }
        }
    }

    fn refresh_rows(&mut self) {
        self.rows = self.record.sorted_paths();
        if self.cursor >= self.rows.len() {
            self.cursor = self.rows.len().saturating_sub(1);
        }
    }

    // --- Dialogs ------------------------------------------------------------

    pub fn raise(&mut self, kind: DialogKind, title: &str, message: String) {
        self.dialogs.push_back(Dialog {
            kind,
            title: title.to_string(),
            message,
        });
    }

    pub fn active_dialog(&self) -> Option<&Dialog> {
        self.dialogs.front()
    }

    pub fn dismiss_dialog(&mut self) {
        self.dialogs.pop_front();
    }

    // --- List navigation and selection --------------------------------------

    pub fn cursor_up(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
        }
    }

    pub fn cursor_down(&mut self) {
        if self.cursor + 1 < self.rows.len() {
            self.cursor += 1;
        }
    }

    pub fn current_path(&self) -> Option<&PathBuf> {
        self.rows.get(self.cursor)
    }

    /// Mark or unmark the row under the cursor
    pub fn toggle_mark(&mut self) {
        if let Some(path) = self.current_path().cloned() {
            if !self.marked.remove(&path) {
                self.marked.insert(path);
            }
        }
    }

    /// Mark every row, or clear the marks when all rows are already marked
    pub fn toggle_mark_all(&mut self) {
        if !self.rows.is_empty() && self.marked.len() == self.rows.len() {
            self.marked.clear();
        } else {
            self.marked = self.rows.iter().cloned().collect();
        }
    }

    pub fn is_marked(&self, path: &Path) -> bool {
        self.marked.contains(path)
    }

    /// Marked rows, or the row under the cursor when nothing is marked
    pub fn selected_paths(&self) -> Vec<PathBuf> {
        if self.marked.is_empty() {
            self.current_path().cloned().into_iter().collect()
        } else {
            self.marked.iter().cloned().collect()
        }
    }

    // --- Mutations ----------------------------------------------------------

    /// Insert a directory and persist. Returns `false` when it was already listed.
    pub fn add_path(&mut self, path: &Path) -> bool {
        // The file stores UTF-8 strings; anything else would come back as a different path
        if path.to_str().is_none() {
            self.raise(
                DialogKind::Error,
                "Invalid Path",
                format!(
                    "Path name is not valid UTF-8 and cannot be saved: {}",
                    path.display()
                ),
            );
            return false;
        }
        if !self.record.insert(path) {
            self.status = format!("Already listed: {}", store::normalize(path).display());
            return false;
        }
        let added = store::normalize(path);
        info!(path = %added.display(), "added path");
        self.refresh_rows();
        if let Some(pos) = self.rows.iter().position(|p| *p == added) {
            self.cursor = pos;
        }
        self.status = format!("Added {}", added.display());
        self.save();
        true
    }

    /// Remove the selected rows and persist. Returns how many were removed.
    pub fn delete_selected(&mut self) -> usize {
        let targets = self.selected_paths();
        let removed = self.record.remove_all(targets.iter().map(PathBuf::as_path));
        info!(removed, "deleted paths");
        self.marked.clear();
        self.refresh_rows();
        self.status = format!("Removed {removed} paths");
        self.save();
        removed
    }

    pub fn toggle_include_subfolders(&mut self) {
        let include = !self.record.include_subfolders();
        self.record.set_include_subfolders(include);
        info!(include, "include subfolders toggled");
        self.status = if include {
            "Subfolders included".into()
        } else {
            "Subfolders excluded".into()
        };
        self.save();
    }

    pub fn open_selected(&mut self) -> Result<()> {
        if let Some(path) = self.current_path().cloned() {
            opener::open(&path)?;
            self.status = format!("Opened {}", path.display());
        }
        Ok(())
    }

    /// Count the videos the current list exposes
    pub fn rescan(&mut self) {
        let summary = scan::count_videos(
            &self.rows,
            self.record.include_subfolders(),
            &self.config.video_extensions,
        );
        self.status = if summary.unreadable > 0 {
            format!(
                "Found {} videos ({} entries unreadable)",
                summary.videos, summary.unreadable
            )
        } else {
            format!("Found {} videos", summary.videos)
        };
        self.last_scan = Some(summary);
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    // --- Directory chooser --------------------------------------------------

    /// Open the chooser next to the first listed path, or in the working directory.
    pub fn begin_add(&mut self) {
        let start = self
            .rows
            .first()
            .and_then(|p| p.parent())
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."));
        match DirPicker::open(&start, self.config.show_hidden_dirs) {
            Ok(picker) => {
                self.picker = Some(picker);
                self.status = "Choose a directory".into();
            }
            Err(e) => {
                self.raise(
                    DialogKind::Error,
                    "Error",
                    format!("Cannot open directory chooser: {e}"),
                );
            }
        }
    }

    pub fn picker_cancel(&mut self) {
        self.picker = None;
        self.goto_input = None;
        self.status = "Add canceled".into();
    }

    /// Add the directory the chooser is showing
    pub fn picker_choose(&mut self) -> bool {
        match self.picker.take() {
            Some(picker) => {
                self.goto_input = None;
                self.add_path(&picker.choose())
            }
            None => false,
        }
    }

    pub fn begin_goto(&mut self) {
        if self.picker.is_some() {
            let mut input = TextArea::default();
            input.set_placeholder_text("/path/to/videos");
            self.goto_input = Some(input);
        }
    }

    pub fn cancel_goto(&mut self) {
        self.goto_input = None;
    }

    pub fn confirm_goto(&mut self) {
        if let Some(input) = self.goto_input.take() {
            let text = input.lines().join("");
            if let Some(picker) = self.picker.as_mut() {
                picker.goto(&text);
            }
        }
    }
}
