use serde::{Deserialize, Serialize};

use crate::app::domain::FileKey;
use crate::app::infrastructure::error::{AppError, Result};

/// Per-file view state derived from the open tab list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabState {
    Closed,
    Open,
    Active,
}

/// What happened when a tab was closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseOutcome {
    pub was_active: bool,
    /// The tab that became active, if the closed one was active and any remain.
    pub next_active: Option<FileKey>,
}

/// Ordered open tab list with at most one tab per file.
#[derive(Debug, Clone, Default)]
pub struct TabCoordinator {
    tabs: Vec<FileKey>,
    active: Option<FileKey>,
}

impl TabCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tabs(&self) -> &[FileKey] {
        &self.tabs
    }

    pub fn active(&self) -> Option<&FileKey> {
        self.active.as_ref()
    }

    pub fn count(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_open(&self, key: &FileKey) -> bool {
        self.tabs.contains(key)
    }

    pub fn state(&self, key: &FileKey) -> TabState {
        if self.active.as_ref() == Some(key) {
            TabState::Active
        } else if self.is_open(key) {
            TabState::Open
        } else {
            TabState::Closed
        }
    }

    /// Open a tab for `key` (or reuse the existing one) and make it active.
    /// Returns true if a new tab was created.
    pub fn open(&mut self, key: FileKey) -> bool {
        let created = !self.is_open(&key);
        if created {
            self.tabs.push(key.clone());
        }
        self.active = Some(key);
        created
    }

    /// Make an already-open tab active. Returns false if it is not open.
    pub fn activate(&mut self, key: &FileKey) -> bool {
        if self.is_open(key) {
            self.active = Some(key.clone());
            true
        } else {
            false
        }
    }

    /// Remove the tab for `key`. If it was active, the tab now at the end of
    /// the list becomes active. Returns `None` when no such tab is open.
    pub fn close(&mut self, key: &FileKey) -> Option<CloseOutcome> {
        let idx = self.tabs.iter().position(|k| k == key)?;
        self.tabs.remove(idx);

        let was_active = self.active.as_ref() == Some(key);
        if was_active {
            self.active = self.tabs.last().cloned();
        }
        Some(CloseOutcome {
            was_active,
            next_active: if was_active { self.active.clone() } else { None },
        })
    }

    /// Update the identity of an open tab after a rename.
    pub fn rekey(&mut self, old: &FileKey, new: &FileKey) {
        if let Some(tab) = self.tabs.iter_mut().find(|k| *k == old) {
            *tab = new.clone();
        }
        if self.active.as_ref() == Some(old) {
            self.active = Some(new.clone());
        }
    }

    pub fn clear(&mut self) {
        self.tabs.clear();
        self.active = None;
    }

    /// Replace the tab list, dropping duplicates. An `active` that is not in
    /// the list falls back to the last tab.
    pub fn restore(&mut self, tabs: Vec<FileKey>, active: Option<FileKey>) {
        self.tabs.clear();
        for key in tabs {
            if !self.tabs.contains(&key) {
                self.tabs.push(key);
            }
        }
        self.active = match active {
            Some(key) if self.tabs.contains(&key) => Some(key),
            _ => self.tabs.last().cloned(),
        };
    }
}

/// A folder in the file tree. Folders only group files for display; file
/// identity stays `(kind, name)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub name: String,
    #[serde(default)]
    pub open: bool,
    #[serde(default)]
    pub files: Vec<FileKey>,
}

/// One row of the rendered tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// `name` for root files and folders, `folder/name` for files in a folder.
    pub path: String,
    /// `None` for folder rows.
    pub file: Option<FileKey>,
    pub open: bool,
}

#[derive(Debug, Clone, Default)]
pub struct FileTree {
    root: Vec<FileKey>,
    folders: Vec<Folder>,
    selected: Option<FileKey>,
}

impl FileTree {
    pub fn new(files: impl IntoIterator<Item = FileKey>) -> Self {
        Self {
            root: files.into_iter().collect(),
            folders: Vec::new(),
            selected: None,
        }
    }

    /// Rebuild from a list of existing files and a saved folder layout.
    /// Folder entries for missing files are dropped; files not in any folder
    /// go to the root.
    pub fn from_layout(files: Vec<FileKey>, folders: Vec<Folder>) -> Self {
        let mut placed: Vec<FileKey> = Vec::new();
        let folders = folders
            .into_iter()
            .map(|mut folder| {
                folder.files.retain(|key| {
                    let keep = files.contains(key) && !placed.contains(key);
                    if keep {
                        placed.push(key.clone());
                    }
                    keep
                });
                folder
            })
            .collect();
        let root = files.into_iter().filter(|k| !placed.contains(k)).collect();
        Self {
            root,
            folders,
            selected: None,
        }
    }

    pub fn root_files(&self) -> &[FileKey] {
        &self.root
    }

    pub fn folders(&self) -> &[Folder] {
        &self.folders
    }

    pub fn selected(&self) -> Option<&FileKey> {
        self.selected.as_ref()
    }

    pub fn select(&mut self, key: Option<FileKey>) {
        self.selected = key;
    }

    pub fn contains(&self, key: &FileKey) -> bool {
        self.root.contains(key) || self.folders.iter().any(|f| f.files.contains(key))
    }

    pub fn folder_of(&self, key: &FileKey) -> Option<&str> {
        self.folders
            .iter()
            .find(|f| f.files.contains(key))
            .map(|f| f.name.as_str())
    }

    fn folder_mut(&mut self, name: &str) -> Option<&mut Folder> {
        self.folders.iter_mut().find(|f| f.name == name)
    }

    pub fn add_file(&mut self, key: FileKey, folder: Option<&str>) -> Result<()> {
        match folder {
            Some(name) => {
                let folder = self
                    .folder_mut(name)
                    .ok_or_else(|| AppError::NotFound(name.to_string()))?;
                folder.files.push(key);
                folder.open = true;
            }
            None => self.root.push(key),
        }
        Ok(())
    }

    pub fn add_root(&mut self, key: FileKey) {
        if !self.contains(&key) {
            self.root.push(key);
        }
    }

    pub fn remove_file(&mut self, key: &FileKey) -> bool {
        let before = self.root.len();
        self.root.retain(|k| k != key);
        let mut removed = self.root.len() != before;
        for folder in &mut self.folders {
            let len = folder.files.len();
            folder.files.retain(|k| k != key);
            removed |= folder.files.len() != len;
        }
        if self.selected.as_ref() == Some(key) {
            self.selected = None;
        }
        removed
    }

    /// Re-key a file in place, keeping its position.
    pub fn rename_file(&mut self, old: &FileKey, new: &FileKey) {
        let slots = self
            .root
            .iter_mut()
            .chain(self.folders.iter_mut().flat_map(|f| f.files.iter_mut()));
        for slot in slots {
            if slot == old {
                *slot = new.clone();
            }
        }
        if self.selected.as_ref() == Some(old) {
            self.selected = Some(new.clone());
        }
    }

    pub fn create_folder(&mut self, name: &str) -> Result<()> {
        if self.folders.iter().any(|f| f.name == name) {
            return Err(AppError::AlreadyExists(name.to_string()));
        }
        self.folders.push(Folder {
            name: name.to_string(),
            open: false,
            files: Vec::new(),
        });
        Ok(())
    }

    pub fn rename_folder(&mut self, old: &str, new: &str) -> Result<()> {
        if old == new {
            return Ok(());
        }
        if self.folders.iter().any(|f| f.name == new) {
            return Err(AppError::AlreadyExists(new.to_string()));
        }
        let folder = self
            .folder_mut(old)
            .ok_or_else(|| AppError::NotFound(old.to_string()))?;
        folder.name = new.to_string();
        Ok(())
    }

    /// Remove a folder and return the files it contained.
    pub fn remove_folder(&mut self, name: &str) -> Result<Vec<FileKey>> {
        let idx = self
            .folders
            .iter()
            .position(|f| f.name == name)
            .ok_or_else(|| AppError::NotFound(name.to_string()))?;
        let folder = self.folders.remove(idx);
        if self.selected.as_ref().is_some_and(|s| folder.files.contains(s)) {
            self.selected = None;
        }
        Ok(folder.files)
    }

    pub fn set_folder_open(&mut self, name: &str, open: bool) {
        if let Some(folder) = self.folder_mut(name) {
            folder.open = open;
        }
    }

    /// Tree rows in display order: root files first, then folders with their files.
    pub fn entries(&self) -> Vec<TreeEntry> {
        let mut entries: Vec<TreeEntry> = self
            .root
            .iter()
            .map(|key| TreeEntry {
                path: key.name.clone(),
                file: Some(key.clone()),
                open: false,
            })
            .collect();
        for folder in &self.folders {
            entries.push(TreeEntry {
                path: folder.name.clone(),
                file: None,
                open: folder.open,
            });
            entries.extend(folder.files.iter().map(|key| TreeEntry {
                path: format!("{}/{}", folder.name, key.name),
                file: Some(key.clone()),
                open: false,
            }));
        }
        entries
    }

    pub fn file_at_path(&self, path: &str) -> Option<FileKey> {
        self.entries()
            .into_iter()
            .find(|e| e.path == path)
            .and_then(|e| e.file)
    }
}
