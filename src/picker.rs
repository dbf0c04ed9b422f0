//! Directory chooser shown when adding a path

use anyhow::{bail, Context, Result};
use crate::store::normalize;
use std::path::{Path, PathBuf};

/// One row in the chooser
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerEntry {
    pub path: PathBuf,
    pub label: String,
    pub is_parent: bool,
}

#[derive(Debug)]
pub struct DirPicker {
    pub dir: PathBuf,
    pub entries: Vec<PickerEntry>,
    pub index: usize,
    pub show_hidden: bool,
    /// Last navigation problem, shown in the picker footer
    pub error: Option<String>,
}

impl DirPicker {
    /// Open the chooser at `start`. Falls back to the nearest existing ancestor
    /// when `start` cannot be listed.
    pub fn open(start: &Path, show_hidden: bool) -> Result<Self> {
        // Relative starts would leave `..` rows pointing at ""
        let start = if start.is_absolute() {
            normalize(start)
        } else {
            let cwd = std::env::current_dir().context("Resolving working directory")?;
            normalize(&cwd.join(start))
        };
        let start = start.as_path();
        let mut picker = Self {
            dir: start.to_path_buf(),
            entries: vec![],
            index: 0,
            show_hidden,
            error: None,
        };
        let mut candidate = Some(start);
        while let Some(dir) = candidate {
            match picker.load_dir(dir.to_path_buf()) {
                Ok(()) => return Ok(picker),
                Err(e) => {
                    picker.error = Some(e.to_string());
                    candidate = dir.parent();
                }
            }
        }
        bail!("no readable directory at or above {}", start.display())
    }

    fn load_dir(&mut self, dir: PathBuf) -> Result<()> {
        let mut entries: Vec<PickerEntry> = std::fs::read_dir(&dir)
            .with_context(|| format!("Listing {}", dir.display()))?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_dir())
            .filter(|p| {
                self.show_hidden
                    || !p
                        .file_name()
                        .unwrap_or_default()
                        .to_string_lossy()
                        .starts_with('.')
            })
            .map(|p| PickerEntry {
                label: p.file_name().unwrap_or_default().to_string_lossy().to_string(),
                path: p,
                is_parent: false,
            })
            .collect();

        entries.sort_by_key(|e| e.label.to_lowercase());

        // Add parent entry if not at root
        if let Some(parent) = non_empty_parent(&dir) {
            if parent != dir {
                entries.insert(
                    0,
                    PickerEntry {
                        path: parent.to_path_buf(),
                        label: "..".into(),
                        is_parent: true,
                    },
                );
            }
        }

        self.dir = dir;
        self.entries = entries;
        self.index = 0;
        self.error = None;
        Ok(())
    }

    pub fn up(&mut self) {
        if self.index > 0 {
            self.index -= 1;
        }
    }

    pub fn down(&mut self) {
        if self.index + 1 < self.entries.len() {
            self.index += 1;
        }
    }

    pub fn selected(&self) -> Option<&PickerEntry> {
        self.entries.get(self.index)
    }

    /// Descend into the highlighted entry
    pub fn enter(&mut self) {
        if let Some(path) = self.selected().map(|e| e.path.clone()) {
            self.navigate(path);
        }
    }

    pub fn parent(&mut self) {
        if let Some(parent) = non_empty_parent(&self.dir).map(Path::to_path_buf) {
            self.navigate(parent);
        }
    }

    /// Jump to a typed path. Relative paths resolve against the current directory.
    pub fn goto(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        let target = self.dir.join(text);
        if target.is_dir() {
            self.navigate(target);
        } else {
            self.error = Some(format!("Not a directory: {}", target.display()));
        }
    }

    /// The directory currently being browsed, which is what gets added
    pub fn choose(&self) -> PathBuf {
        self.dir.clone()
    }

    fn navigate(&mut self, dir: PathBuf) {
        let previous = self.dir.clone();
        if let Err(e) = self.load_dir(dir) {
            self.error = Some(e.to_string());
            self.dir = previous;
        }
    }
}

fn non_empty_parent(dir: &Path) -> Option<&Path> {
    dir.parent().filter(|p| !p.as_os_str().is_empty())
}
