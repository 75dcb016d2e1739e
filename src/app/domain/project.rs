use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::file_kind::{FileKey, FileKind};
use crate::app::infrastructure::error::{AppError, Result};

/// Authoritative file contents of a project, grouped by kind.
///
/// The default trio (`index.html`, `style.css`, `script.js`) always exists:
/// any mutation that removes one re-seeds it with its kind template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectStore {
    files: BTreeMap<FileKind, BTreeMap<String, String>>,
}

impl Default for ProjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectStore {
    /// A project holding only the default trio with template content.
    pub fn new() -> Self {
        let mut store = Self {
            files: BTreeMap::new(),
        };
        store.ensure_defaults();
        store
    }

    pub fn get_content(&self, kind: FileKind, name: &str) -> Result<&str> {
        self.files
            .get(&kind)
            .and_then(|files| files.get(name))
            .map(String::as_str)
            .ok_or_else(|| AppError::NotFound(name.to_string()))
    }

    pub fn contains(&self, kind: FileKind, name: &str) -> bool {
        self.files
            .get(&kind)
            .is_some_and(|files| files.contains_key(name))
    }

    /// Upsert: creates the entry when absent.
    pub fn set_content(&mut self, kind: FileKind, name: &str, text: &str) {
        let slot = self
            .files
            .entry(kind)
            .or_default()
            .entry(name.to_string())
            .or_default();
        if slot != text {
            slot.clear();
            slot.push_str(text);
        }
    }

    pub fn create_file(&mut self, kind: FileKind, name: &str, initial_text: &str) -> Result<()> {
        if self.contains(kind, name) {
            return Err(AppError::AlreadyExists(name.to_string()));
        }
        self.files
            .entry(kind)
            .or_default()
            .insert(name.to_string(), initial_text.to_string());
        Ok(())
    }

    /// Move a file to `new_name`, reclassifying it by the new extension.
    ///
    /// Validation happens before any mutation, so a failed rename leaves the
    /// store untouched.
    pub fn rename_file(&mut self, kind: FileKind, name: &str, new_name: &str) -> Result<FileKey> {
        let new_kind = FileKind::from_file_name(new_name)
            .ok_or_else(|| AppError::InvalidExtension(new_name.to_string()))?;
        if !self.contains(kind, name) {
            return Err(AppError::NotFound(name.to_string()));
        }
        if new_kind == kind && new_name == name {
            return Ok(FileKey::new(kind, name));
        }
        if self.contains(new_kind, new_name) {
            return Err(AppError::AlreadyExists(new_name.to_string()));
        }

        let content = self
            .files
            .get_mut(&kind)
            .and_then(|files| files.remove(name))
            .unwrap_or_default();
        self.files
            .entry(new_kind)
            .or_default()
            .insert(new_name.to_string(), content);
        self.ensure_defaults();
        Ok(FileKey::new(new_kind, new_name))
    }

    /// Remove a file. Returns true if something was removed.
    pub fn delete_file(&mut self, kind: FileKind, name: &str) -> bool {
        let removed = self
            .files
            .get_mut(&kind)
            .is_some_and(|files| files.remove(name).is_some());
        if removed {
            self.ensure_defaults();
        }
        removed
    }

    /// Re-seed any missing default file. Returns the keys that were re-created.
    pub fn ensure_defaults(&mut self) -> Vec<FileKey> {
        let mut seeded = Vec::new();
        for kind in FileKind::ALL {
            let files = self.files.entry(kind).or_default();
            if !files.contains_key(kind.default_name()) {
                files.insert(kind.default_name().to_string(), kind.template().to_string());
                seeded.push(FileKey::default_for(kind));
            }
        }
        seeded
    }

    /// Content of the default file for `kind`.
    pub fn default_content(&self, kind: FileKind) -> &str {
        self.get_content(kind, kind.default_name()).unwrap_or_default()
    }

    /// All file keys, markup first, then style, then script; names sorted.
    pub fn keys(&self) -> Vec<FileKey> {
        self.files
            .iter()
            .flat_map(|(kind, files)| files.keys().map(|name| FileKey::new(*kind, name.clone())))
            .collect()
    }

    pub fn first_key(&self) -> Option<FileKey> {
        self.keys().into_iter().next()
    }

    pub fn file_count(&self) -> usize {
        self.files.values().map(BTreeMap::len).sum()
    }

    /// Flat `file name -> content` view used by exports.
    pub fn entries(&self) -> impl Iterator<Item = (FileKey, &str)> {
        self.files.iter().flat_map(|(kind, files)| {
            files
                .iter()
                .map(|(name, content)| (FileKey::new(*kind, name.clone()), content.as_str()))
        })
    }
}
