//! The playground coordinator.
//!
//! Owns the project store, the active file (through the editing controller),
//! the open tabs, the file tree, both debouncers and every external
//! collaborator. The UI shell translates widget events into calls on this
//! type and arms timers for the tickets it hands back.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use crate::app::controllers::debounce::Debouncer;
use crate::app::controllers::editing::{EditingSurface, EditingSurfaceController, KindSurfaces};
use crate::app::controllers::preview::{PreviewRenderer, PreviewSink};
use crate::app::controllers::tabs::{FileTree, TabCoordinator};
use crate::app::domain::{AppSettings, FileKey, FileKind, ProjectStore};
use crate::app::infrastructure::error::{AppError, Result};
use crate::app::services::export::{plan_export, ArchiveBuilder, DownloadSink, ExportQueue};
use crate::app::services::notify::{Notifier, Severity};
use crate::app::services::persistence::{
    LoadOutcome, PersistenceGateway, ProjectSnapshot, StorageInfo,
};
use crate::app::services::text_ops::{format_code, validate_name};

/// External collaborators handed to the playground at construction.
pub struct Services {
    pub persistence: PersistenceGateway,
    pub preview: Box<dyn PreviewSink>,
    pub downloads: Box<dyn DownloadSink>,
    pub archive: Option<Box<dyn ArchiveBuilder>>,
    pub notifier: Box<dyn Notifier>,
}

/// Debounce tickets produced by an edit. The shell reports each one back
/// after the matching delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditTickets {
    /// `None` while auto-reload is off.
    pub reload: Option<u64>,
    pub save: u64,
}

pub struct Playground<S: EditingSurface> {
    store: ProjectStore,
    editor: EditingSurfaceController<S>,
    tabs: TabCoordinator,
    tree: FileTree,
    preview: PreviewRenderer,
    persistence: PersistenceGateway,
    reload_debounce: Debouncer,
    save_debounce: Debouncer,
    notifier: Box<dyn Notifier>,
    downloads: Box<dyn DownloadSink>,
    archive: Option<Box<dyn ArchiveBuilder>>,
    export: Option<ExportQueue>,
    dark_mode: bool,
}

impl<S: EditingSurface> Playground<S> {
    pub fn new(surfaces: KindSurfaces<S>, services: Services, settings: &AppSettings) -> Self {
        let store = ProjectStore::new();
        let tree = FileTree::new(store.keys());
        Self {
            store,
            editor: EditingSurfaceController::new(surfaces),
            tabs: TabCoordinator::new(),
            tree,
            preview: PreviewRenderer::new(services.preview, settings.auto_reload),
            persistence: services.persistence,
            reload_debounce: Debouncer::new(Duration::from_millis(settings.reload_delay_ms)),
            save_debounce: Debouncer::new(Duration::from_millis(settings.save_delay_ms)),
            notifier: services.notifier,
            downloads: services.downloads,
            archive: services.archive,
            export: None,
            dark_mode: settings.dark_mode,
        }
    }

    // --- Accessors ---

    pub fn store(&self) -> &ProjectStore {
        &self.store
    }

    pub fn active(&self) -> Option<&FileKey> {
        self.editor.active()
    }

    pub fn tabs(&self) -> &TabCoordinator {
        &self.tabs
    }

    pub fn tree(&self) -> &FileTree {
        &self.tree
    }

    pub fn preview(&self) -> &PreviewRenderer {
        &self.preview
    }

    pub fn persistence(&self) -> &PersistenceGateway {
        &self.persistence
    }

    pub fn editor(&self) -> &EditingSurfaceController<S> {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut EditingSurfaceController<S> {
        &mut self.editor
    }

    pub fn surface_mut(&mut self, kind: FileKind) -> &mut S {
        self.editor.surface_mut(kind)
    }

    pub fn reload_delay(&self) -> Duration {
        self.reload_debounce.delay()
    }

    pub fn save_delay(&self) -> Duration {
        self.save_debounce.delay()
    }

    pub fn export_in_progress(&self) -> bool {
        self.export.is_some()
    }

    // --- Startup ---

    /// Restore the saved project or start from the default trio, then
    /// render the preview once.
    pub fn start(&mut self) -> LoadOutcome {
        let outcome = self.persistence.restore();
        match &outcome {
            LoadOutcome::Restored(snapshot) => {
                self.apply_snapshot(snapshot.clone());
                let days = self.persistence.info().map(|i| i.days_left).unwrap_or_default();
                self.notify(
                    &format!("Restored saved project ({days} days left)"),
                    Severity::Info,
                );
            }
            LoadOutcome::Expired => {
                self.fresh_project();
                self.notify("Saved project expired, starting fresh", Severity::Warning);
            }
            LoadOutcome::Corrupted => {
                self.fresh_project();
                self.notify(
                    "Saved project could not be read, starting fresh",
                    Severity::Warning,
                );
            }
            LoadOutcome::Unreadable => {
                self.fresh_project();
                self.notify(
                    "Saved project could not be loaded, starting fresh",
                    Severity::Warning,
                );
            }
            LoadOutcome::Missing => {
                self.fresh_project();
                self.notify("FerrisPlay initialized successfully", Severity::Success);
            }
        }
        self.render_quietly();
        outcome
    }

    fn fresh_project(&mut self) {
        self.store = ProjectStore::new();
        self.tree = FileTree::new(self.store.keys());
        self.tabs.clear();
        self.editor.deactivate();
        self.show(FileKey::default_for(FileKind::Markup));
    }

    pub fn snapshot(&self) -> ProjectSnapshot {
        ProjectSnapshot {
            project: self.store.clone(),
            active_file: self.editor.active().cloned(),
            open_tabs: self.tabs.tabs().to_vec(),
            folders: self.tree.folders().to_vec(),
        }
    }

    /// Replace the whole project with `snapshot`. A dangling active file
    /// falls back to the first file in the store.
    pub fn apply_snapshot(&mut self, snapshot: ProjectSnapshot) {
        let mut store = snapshot.project;
        store.ensure_defaults();
        self.tree = FileTree::from_layout(store.keys(), snapshot.folders);
        let open_tabs = snapshot
            .open_tabs
            .into_iter()
            .filter(|k| store.contains(k.kind, &k.name))
            .collect();
        let active = snapshot
            .active_file
            .filter(|k| store.contains(k.kind, &k.name))
            .or_else(|| store.first_key());
        self.store = store;
        self.sync_tree();

        self.tabs.restore(open_tabs, active.clone());
        self.editor.deactivate();
        let Some(active) = self.tabs.active().cloned().or(active) else {
            return;
        };
        tracing::info!("Restoring project, active file {}", active);
        self.tabs.open(active.clone());
        self.tree.select(Some(active.clone()));
        self.editor.load(&self.store, active);
    }

    // --- Editing ---

    /// Content-changing input on the active surface.
    pub fn on_edit(&mut self) -> EditTickets {
        self.editor.on_edit(&mut self.store);
        self.schedule()
    }

    fn schedule(&mut self) -> EditTickets {
        let reload = self
            .preview
            .auto_reload
            .then(|| self.reload_debounce.trigger());
        let save = self.save_debounce.trigger();
        EditTickets { reload, save }
    }

    /// Timer callback for the preview debounce. Returns true if it rendered.
    pub fn reload_due(&mut self, ticket: u64) -> bool {
        if !self.reload_debounce.fire(ticket) || !self.preview.auto_reload {
            return false;
        }
        self.render_quietly()
    }

    /// Timer callback for the save debounce. Returns true if it saved.
    pub fn save_due(&mut self, ticket: u64) -> bool {
        if !self.save_debounce.fire(ticket) {
            return false;
        }
        self.persist()
    }

    /// The active surface lost focus.
    pub fn on_blur(&mut self) -> bool {
        self.editor.flush(&mut self.store);
        self.persist()
    }

    pub fn periodic_save(&mut self) -> bool {
        self.editor.flush(&mut self.store);
        self.persist()
    }

    /// Last chance to persist before the window goes away.
    pub fn before_unload(&mut self) -> bool {
        self.reload_debounce.cancel();
        self.save_debounce.cancel();
        self.editor.flush(&mut self.store);
        self.persist()
    }

    /// Expand the abbreviation before the caret of the `kind` surface.
    /// On success the edit is flushed and debounces are scheduled.
    pub fn expand_abbreviation(&mut self, kind: FileKind) -> Option<EditTickets> {
        if self.editor.active().map(|k| k.kind) != Some(kind) {
            return None;
        }
        if !self.editor.expand_abbreviation(kind) {
            return None;
        }
        Some(self.on_edit())
    }

    /// Re-flow the active file's whitespace.
    pub fn format_active(&mut self) -> Option<EditTickets> {
        let kind = self.editor.active()?.kind;
        let formatted = format_code(kind, &self.editor.surface(kind).text());
        self.editor.replace_active_text(&mut self.store, &formatted);
        self.notify("Code formatted", Severity::Success);
        Some(self.schedule())
    }

    // --- Tree and tabs ---

    // open or reuse a tab, flush the old file and load the new one
    fn show(&mut self, key: FileKey) {
        if self.tabs.open(key.clone()) {
            tracing::debug!("Opened tab {}", key);
        }
        self.tree.select(Some(key.clone()));
        self.editor.activate(&mut self.store, key);
    }

    pub fn select_tree_file(&mut self, key: &FileKey) -> Result<()> {
        let result = self.try_select_tree_file(key);
        self.report(result)
    }

    fn try_select_tree_file(&mut self, key: &FileKey) -> Result<()> {
        if !self.store.contains(key.kind, &key.name) {
            return Err(AppError::NotFound(key.name.clone()));
        }
        if self.editor.active() == Some(key) {
            self.tree.select(Some(key.clone()));
            return Ok(());
        }
        self.show(key.clone());
        self.persist();
        Ok(())
    }

    pub fn click_tab(&mut self, key: &FileKey) -> Result<()> {
        let result = self.try_click_tab(key);
        self.report(result)
    }

    fn try_click_tab(&mut self, key: &FileKey) -> Result<()> {
        if !self.tabs.is_open(key) {
            return Err(AppError::NotFound(key.name.clone()));
        }
        if self.editor.active() == Some(key) {
            return Ok(());
        }
        self.editor.activate(&mut self.store, key.clone());
        self.tabs.activate(key);
        self.tree.select(Some(key.clone()));
        self.persist();
        Ok(())
    }

    /// Close a tab. The file itself stays in the project.
    pub fn close_tab(&mut self, key: &FileKey) -> Result<()> {
        let result = self.try_close_tab(key);
        self.report(result)
    }

    fn try_close_tab(&mut self, key: &FileKey) -> Result<()> {
        let outcome = self
            .tabs
            .close(key)
            .ok_or_else(|| AppError::NotFound(key.name.clone()))?;
        if outcome.was_active {
            match outcome.next_active {
                Some(next) => {
                    self.tree.select(Some(next.clone()));
                    self.editor.activate(&mut self.store, next);
                }
                None => {
                    self.editor.flush(&mut self.store);
                    self.editor.deactivate();
                    self.tree.select(None);
                }
            }
        }
        tracing::debug!("Closed tab {}", key);
        self.notify(&format!("Closed {}", key.name), Severity::Info);
        Ok(())
    }

    pub fn close_active_tab(&mut self) -> Result<()> {
        match self.tabs.active().cloned() {
            Some(key) => self.close_tab(&key),
            None => Ok(()),
        }
    }

    pub fn set_folder_open(&mut self, folder: &str, open: bool) {
        self.tree.set_folder_open(folder, open);
    }

    // --- File commands ---

    /// Create a file from its kind template and open it.
    ///
    /// With a `kind_hint`, a name without extension gets the kind's
    /// extension; a name whose extension names another kind is rejected.
    pub fn create_file(
        &mut self,
        name: &str,
        kind_hint: Option<FileKind>,
        folder: Option<&str>,
    ) -> Result<FileKey> {
        let result = self.try_create_file(name, kind_hint, folder);
        self.report(result)
    }

    fn try_create_file(
        &mut self,
        name: &str,
        kind_hint: Option<FileKind>,
        folder: Option<&str>,
    ) -> Result<FileKey> {
        let key = resolve_new_file(&validate_name(name)?, kind_hint)?;
        if let Some(folder) = folder
            && !self.tree.folders().iter().any(|f| f.name == folder)
        {
            return Err(AppError::NotFound(folder.to_string()));
        }
        self.store
            .create_file(key.kind, &key.name, key.kind.template())?;
        self.tree.add_file(key.clone(), folder)?;
        tracing::info!("Created {} ({})", key, key.kind);
        self.show(key.clone());
        self.persist();
        self.notify(&format!("Created new file: {}", key.name), Severity::Success);
        Ok(key)
    }

    /// Rename a file, reclassifying it by the new extension. Open tabs and
    /// the tree follow the new identity; content is not reloaded unless the
    /// file moved to another kind's surface.
    pub fn rename_file(&mut self, key: &FileKey, new_name: &str) -> Result<FileKey> {
        let result = self.try_rename_file(key, new_name);
        self.report(result)
    }

    fn try_rename_file(&mut self, key: &FileKey, new_name: &str) -> Result<FileKey> {
        let new_name = validate_name(new_name)?;
        self.editor.flush(&mut self.store);
        let new_key = self.store.rename_file(key.kind, &key.name, &new_name)?;
        if new_key == *key {
            return Ok(new_key);
        }

        self.tree.rename_file(key, &new_key);
        self.tabs.rekey(key, &new_key);
        if self.editor.active() == Some(key) {
            if new_key.kind == key.kind {
                self.editor.rekey(new_key.clone());
            } else {
                self.editor.load(&self.store, new_key.clone());
            }
        }
        self.sync_tree();
        tracing::info!("Renamed {} to {}", key, new_key);
        self.persist();
        self.notify(&format!("Renamed file to {}", new_key.name), Severity::Success);
        Ok(new_key)
    }

    /// Delete a file and close its tab. Deleting a default file re-seeds it.
    pub fn delete_file(&mut self, key: &FileKey) -> Result<()> {
        let result = self.try_delete_file(key);
        self.report(result)
    }

    fn try_delete_file(&mut self, key: &FileKey) -> Result<()> {
        if !self.store.contains(key.kind, &key.name) {
            return Err(AppError::NotFound(key.name.clone()));
        }
        self.editor.flush(&mut self.store);
        self.remove_file(key);
        self.sync_tree();
        self.persist();
        self.notify(&format!("Deleted file {}", key.name), Severity::Info);
        Ok(())
    }

    // Drop a file from store, tree and tabs. The caller has flushed.
    fn remove_file(&mut self, key: &FileKey) {
        let was_active = self.editor.active() == Some(key);
        if was_active {
            // no flush from here on, it would write the file back
            self.editor.deactivate();
        }
        self.store.delete_file(key.kind, &key.name);
        self.tree.remove_file(key);
        self.tabs.close(key);
        if was_active && let Some(next) = self.tabs.active().cloned() {
            self.tree.select(Some(next.clone()));
            self.editor.load(&self.store, next);
        }
        tracing::info!("Deleted {}", key);
    }

    // Keep the tree in step with the store: re-seeded defaults go to the root.
    fn sync_tree(&mut self) {
        let keys = self.store.keys();
        for key in &keys {
            if !self.tree.contains(key) {
                self.tree.add_root(key.clone());
            }
        }
        let stale: Vec<FileKey> = self
            .tree
            .entries()
            .into_iter()
            .filter_map(|e| e.file)
            .filter(|k| !keys.contains(k))
            .collect();
        for key in stale {
            self.tree.remove_file(&key);
        }
    }

    // --- Folder commands ---

    pub fn create_folder(&mut self, name: &str) -> Result<()> {
        let result = self.try_create_folder(name);
        self.report(result)
    }

    fn try_create_folder(&mut self, name: &str) -> Result<()> {
        let name = validate_name(name)?;
        self.tree.create_folder(&name)?;
        self.persist();
        self.notify(&format!("Created folder: {name}"), Severity::Success);
        Ok(())
    }

    pub fn rename_folder(&mut self, old: &str, new: &str) -> Result<()> {
        let result = self.try_rename_folder(old, new);
        self.report(result)
    }

    fn try_rename_folder(&mut self, old: &str, new: &str) -> Result<()> {
        let new = validate_name(new)?;
        self.tree.rename_folder(old, &new)?;
        self.persist();
        self.notify(&format!("Renamed folder to {new}"), Severity::Success);
        Ok(())
    }

    /// Delete a folder together with its files.
    pub fn delete_folder(&mut self, name: &str) -> Result<()> {
        let result = self.try_delete_folder(name);
        self.report(result)
    }

    fn try_delete_folder(&mut self, name: &str) -> Result<()> {
        self.editor.flush(&mut self.store);
        let files = self.tree.remove_folder(name)?;
        for key in &files {
            self.remove_file(key);
        }
        self.sync_tree();
        self.persist();
        self.notify(&format!("Deleted folder {name}"), Severity::Info);
        Ok(())
    }

    // --- Preview ---

    /// Manual run: render now, skipping the debounce, and reveal the preview.
    pub fn refresh_preview(&mut self) -> Result<()> {
        let result = self.try_refresh_preview();
        self.report(result)
    }

    fn try_refresh_preview(&mut self) -> Result<()> {
        self.reload_debounce.cancel();
        self.editor.flush(&mut self.store);
        self.preview.render(&self.store)?;
        if let Err(e) = self.preview.reveal() {
            self.notify(&format!("Could not open preview: {e}"), Severity::Warning);
        }
        self.notify("Preview updated", Severity::Success);
        Ok(())
    }

    fn render_quietly(&mut self) -> bool {
        self.editor.flush(&mut self.store);
        match self.preview.render(&self.store) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Preview render failed: {}", e);
                self.notify(&format!("Preview failed: {e}"), Severity::Error);
                false
            }
        }
    }

    pub fn toggle_auto_reload(&mut self) -> bool {
        let enabled = self.preview.toggle_auto_reload();
        if !enabled {
            self.reload_debounce.cancel();
        }
        let state = if enabled { "enabled" } else { "disabled" };
        self.notify(&format!("Auto reload {state}"), Severity::Info);
        enabled
    }

    // --- Theme ---

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    /// Apply a theme without notifying, e.g. the one saved in settings at startup.
    pub fn set_dark_mode(&mut self, is_dark: bool) {
        self.dark_mode = is_dark;
        self.editor.set_dark_mode(is_dark);
    }

    pub fn toggle_theme(&mut self) -> bool {
        let is_dark = !self.dark_mode;
        self.set_dark_mode(is_dark);
        tracing::info!(dark = is_dark, "Theme switched");
        self.notify("Theme switched", Severity::Info);
        is_dark
    }

    // --- Persistence ---

    // Save without user feedback on success.
    fn persist(&mut self) -> bool {
        let snapshot = self.snapshot();
        match self.persistence.save(&snapshot) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Auto-save failed: {}", e);
                self.notify(&format!("Could not save project: {e}"), Severity::Warning);
                false
            }
        }
    }

    /// Explicit save command.
    pub fn save_now(&mut self) -> Result<()> {
        let result = self.try_save_now();
        self.report(result)
    }

    fn try_save_now(&mut self) -> Result<()> {
        self.save_debounce.cancel();
        self.editor.flush(&mut self.store);
        let snapshot = self.snapshot();
        self.persistence.save(&snapshot)?;
        let name = self
            .editor
            .active()
            .map(|k| k.name.clone())
            .unwrap_or_else(|| "Project".to_string());
        self.notify(&format!("{name} saved successfully"), Severity::Success);
        Ok(())
    }

    /// Forget everything: clear the saved slot and start from the templates.
    pub fn reset_project(&mut self) {
        self.reload_debounce.cancel();
        self.save_debounce.cancel();
        self.export = None;
        if let Err(e) = self.persistence.clear() {
            tracing::warn!("Failed to clear saved project: {}", e);
            self.notify(&format!("Could not clear saved project: {e}"), Severity::Warning);
        }
        self.fresh_project();
        self.render_quietly();
        tracing::info!("Project reset");
        self.notify("Project reset", Severity::Info);
    }

    /// Delete the saved snapshot; the open project is kept in memory.
    pub fn discard_saved(&mut self) -> Result<()> {
        let result = self.persistence.clear();
        if result.is_ok() {
            self.save_debounce.cancel();
            self.notify("Saved project discarded", Severity::Info);
        }
        self.report(result)
    }

    pub fn storage_info(&mut self) -> Option<StorageInfo> {
        let info = self.persistence.info();
        match &info {
            Some(info) if !info.is_expired => self.notify(
                &format!(
                    "Saved project expires in {} days (last access {})",
                    info.days_left,
                    info.last_accessed_at.format("%Y-%m-%d %H:%M")
                ),
                Severity::Info,
            ),
            Some(_) => self.notify("Saved project has expired", Severity::Warning),
            None => self.notify("No saved project", Severity::Info),
        }
        info
    }

    // --- Export ---

    /// Plan a project download. Returns how many downloads were queued;
    /// the shell then calls `next_download` until it returns `Some(false)`.
    pub fn start_export(&mut self) -> usize {
        self.editor.flush(&mut self.store);
        let files = self.export_files();
        let archive: Option<&mut dyn ArchiveBuilder> = match self.archive.as_mut() {
            Some(builder) => Some(builder.as_mut()),
            None => None,
        };
        let plan = plan_export(&files, archive);
        if let Some(e) = &plan.archive_error {
            self.notify(
                &format!("{e}. Downloading files one by one"),
                Severity::Warning,
            );
        } else if !plan.queue.used_archive() {
            self.notify("Downloading files one by one", Severity::Info);
        }
        let total = plan.queue.total();
        tracing::info!("Export started, {} download(s)", total);
        self.export = Some(plan.queue);
        total
    }

    // `folder/name -> content`, following the tree layout
    fn export_files(&self) -> BTreeMap<String, String> {
        self.tree
            .entries()
            .into_iter()
            .filter_map(|entry| {
                let key = entry.file?;
                let content = self.store.get_content(key.kind, &key.name).ok()?;
                Some((entry.path, content.to_string()))
            })
            .collect()
    }

    /// Hand the next queued file to the download sink.
    ///
    /// `Some(true)` means more downloads follow, `Some(false)` that the export
    /// finished (or failed), `None` that no export was running.
    pub fn next_download(&mut self) -> Option<bool> {
        let queue = self.export.as_mut()?;
        let step = queue.send_next(self.downloads.as_mut());
        let more = !queue.is_empty();
        match step {
            Some(Ok(name)) => {
                tracing::debug!("Downloaded {}", name);
                if more {
                    return Some(true);
                }
                self.export = None;
                self.notify("Project downloaded successfully", Severity::Success);
                Some(false)
            }
            Some(Err(e)) => {
                self.export = None;
                tracing::error!("Export failed: {}", e);
                self.notify(&e.to_string(), Severity::Error);
                Some(false)
            }
            None => {
                self.export = None;
                None
            }
        }
    }

    // --- Notifications ---

    fn notify(&mut self, message: &str, severity: Severity) {
        self.notifier.notify(message, severity);
    }

    fn report<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            let severity = match e {
                AppError::InvalidName(_) => Severity::Warning,
                _ => Severity::Error,
            };
            tracing::warn!("{}", e);
            self.notify(&e.to_string(), severity);
        }
        result
    }
}

/// Work out the key of a new file from the typed name and an optional kind.
fn resolve_new_file(name: &str, kind_hint: Option<FileKind>) -> Result<FileKey> {
    match (FileKind::from_file_name(name), kind_hint) {
        (Some(kind), Some(hint)) if kind != hint => {
            Err(AppError::InvalidExtension(name.to_string()))
        }
        (Some(kind), _) => Ok(FileKey::new(kind, name)),
        (None, Some(hint)) if Path::new(name).extension().is_none() => {
            Ok(FileKey::new(hint, format!("{name}.{}", hint.extension())))
        }
        (None, _) => Err(AppError::InvalidExtension(name.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::controllers::editing::{Highlighter, MemorySurface};
    use crate::app::infrastructure::storage::MemoryStore;
    use crate::app::services::notify::RecordingNotifier;
    use crate::app::services::persistence::{KeyValueStore, ManualClock, STORAGE_KEY};
    use chrono::{TimeZone, Utc};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct Published(Rc<RefCell<Vec<String>>>);

    impl PreviewSink for Published {
        fn publish(&mut self, document: &str) -> Result<()> {
            self.0.borrow_mut().push(document.to_string());
            Ok(())
        }
    }

    impl Published {
        fn count(&self) -> usize {
            self.0.borrow().len()
        }
    }

    #[derive(Clone, Default)]
    struct Downloads(Rc<RefCell<Vec<String>>>);

    impl DownloadSink for Downloads {
        fn download(&mut self, filename: &str, _content: &[u8], _mime: &str) -> Result<()> {
            self.0.borrow_mut().push(filename.to_string());
            Ok(())
        }
    }

    struct Harness {
        app: Playground<MemorySurface>,
        storage: MemoryStore,
        clock: ManualClock,
        notes: RecordingNotifier,
        preview: Published,
        downloads: Downloads,
    }

    fn harness_with(storage: MemoryStore, clock: ManualClock) -> Harness {
        let notes = RecordingNotifier::default();
        let preview = Published::default();
        let downloads = Downloads::default();
        let services = Services {
            persistence: PersistenceGateway::new(
                Box::new(storage.clone()),
                Box::new(clock.clone()),
            ),
            preview: Box::new(preview.clone()),
            downloads: Box::new(downloads.clone()),
            archive: None,
            notifier: Box::new(notes.clone()),
        };
        let surfaces = KindSurfaces::new(
            MemorySurface::default(),
            MemorySurface::default(),
            MemorySurface::default(),
        );
        let app = Playground::new(surfaces, services, &AppSettings::default());
        Harness {
            app,
            storage,
            clock,
            notes,
            preview,
            downloads,
        }
    }

    fn harness() -> Harness {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap());
        let mut h = harness_with(MemoryStore::default(), clock);
        h.app.start();
        h
    }

    fn key(kind: FileKind, name: &str) -> FileKey {
        FileKey::new(kind, name)
    }

    fn type_into(app: &mut Playground<MemorySurface>, text: &str) -> EditTickets {
        let kind = app.active().unwrap().kind;
        app.surface_mut(kind).type_text(text);
        app.on_edit()
    }

    #[test]
    fn test_fresh_start_opens_index() {
        let h = harness();
        let index = FileKey::default_for(FileKind::Markup);
        assert_eq!(h.app.active(), Some(&index));
        assert_eq!(h.app.tabs().tabs(), &[index.clone()]);
        assert_eq!(h.app.tree().selected(), Some(&index));
        assert_eq!(h.preview.count(), 1);
        assert_eq!(
            h.notes.last().unwrap(),
            ("FerrisPlay initialized successfully".to_string(), Severity::Success)
        );
    }

    #[test]
    fn test_switching_files_flushes_edits() {
        let mut h = harness();
        let css = FileKey::default_for(FileKind::Style);
        h.app.surface_mut(FileKind::Markup).type_text("<p>unsaved</p>");
        h.app.select_tree_file(&css).unwrap();
        assert_eq!(
            h.app.store().get_content(FileKind::Markup, "index.html").unwrap(),
            "<p>unsaved</p>"
        );
        assert_eq!(h.app.active(), Some(&css));
        assert_eq!(h.app.tabs().count(), 2);

        h.app.surface_mut(FileKind::Style).type_text("p{}");
        h.app.click_tab(&FileKey::default_for(FileKind::Markup)).unwrap();
        assert_eq!(h.app.store().get_content(FileKind::Style, "style.css").unwrap(), "p{}");
    }

    #[test]
    fn test_tree_click_reuses_tab() {
        let mut h = harness();
        let index = FileKey::default_for(FileKind::Markup);
        let js = FileKey::default_for(FileKind::Script);
        h.app.select_tree_file(&js).unwrap();
        h.app.select_tree_file(&index).unwrap();
        h.app.select_tree_file(&js).unwrap();
        assert_eq!(h.app.tabs().tabs(), &[index, js]);
    }

    #[test]
    fn test_debounces_fire_latest_ticket_only() {
        let mut h = harness();
        let first = type_into(&mut h.app, "<p>1</p>");
        let second = type_into(&mut h.app, "<p>2</p>");
        assert!(!h.app.reload_due(first.reload.unwrap()));
        assert!(!h.app.save_due(first.save));

        let renders = h.preview.count();
        assert!(h.app.reload_due(second.reload.unwrap()));
        assert_eq!(h.preview.count(), renders + 1);
        assert!(h.preview.0.borrow().last().unwrap().contains("<p>2</p>"));

        assert!(h.app.save_due(second.save));
        assert!(!h.app.save_due(second.save));
        let saved = h.storage.get(STORAGE_KEY).unwrap().unwrap();
        assert!(saved.contains("<p>2</p>"));
    }

    #[test]
    fn test_auto_reload_off_skips_reload_ticket() {
        let mut h = harness();
        assert!(!h.app.toggle_auto_reload());
        let tickets = type_into(&mut h.app, "x");
        assert!(tickets.reload.is_none());
        h.app.toggle_auto_reload();
        assert!(type_into(&mut h.app, "y").reload.is_some());
    }

    #[test]
    fn test_preview_always_uses_default_files() {
        let mut h = harness();
        type_into(&mut h.app, "<h1>Home</h1>");
        h.app.create_file("about.html", None, None).unwrap();
        type_into(&mut h.app, "<h1>About</h1>");
        h.app.refresh_preview().unwrap();
        let doc = h.app.preview().last_document().unwrap().to_string();
        assert!(doc.contains("<h1>Home</h1>"));
        assert!(!doc.contains("<h1>About</h1>"));
        assert_eq!(h.notes.last().unwrap().0, "Preview updated");
    }

    #[test]
    fn test_create_duplicate_is_rejected() {
        let mut h = harness();
        h.app.create_file("about.html", None, None).unwrap();
        h.app.surface_mut(FileKind::Markup).type_text("<p>kept</p>");
        h.app.on_edit();
        let before = h.app.store().clone();

        let err = h.app.create_file("about.html", None, None).unwrap_err();
        assert!(matches!(err, AppError::AlreadyExists(_)));
        assert_eq!(h.app.store(), &before);
        assert_eq!(
            h.notes.last().unwrap(),
            ("File about.html already exists".to_string(), Severity::Error)
        );
    }

    #[test]
    fn test_create_with_kind_hint() {
        let mut h = harness();
        let created = h.app.create_file("theme", Some(FileKind::Style), None).unwrap();
        assert_eq!(created, key(FileKind::Style, "theme.css"));
        assert_eq!(
            h.app.store().get_content(FileKind::Style, "theme.css").unwrap(),
            FileKind::Style.template()
        );
        assert!(matches!(
            h.app.create_file("app.css", Some(FileKind::Script), None),
            Err(AppError::InvalidExtension(_))
        ));
        assert!(matches!(
            h.app.create_file("notes.txt", None, None),
            Err(AppError::InvalidExtension(_))
        ));
        assert!(matches!(
            h.app.create_file("   ", None, None),
            Err(AppError::InvalidName(_))
        ));
        assert_eq!(h.notes.last().unwrap().1, Severity::Warning);
    }

    #[test]
    fn test_close_tabs() {
        let mut h = harness();
        let index = FileKey::default_for(FileKind::Markup);
        let css = FileKey::default_for(FileKind::Style);
        let js = FileKey::default_for(FileKind::Script);
        h.app.select_tree_file(&css).unwrap();
        h.app.select_tree_file(&js).unwrap();

        // non-active tab
        h.app.close_tab(&index).unwrap();
        assert_eq!(h.app.active(), Some(&js));

        h.app.surface_mut(FileKind::Script).type_text("let a = 1;");
        h.app.close_tab(&js).unwrap();
        assert_eq!(h.app.active(), Some(&css));
        assert_eq!(
            h.app.store().get_content(FileKind::Script, "script.js").unwrap(),
            "let a = 1;"
        );

        h.app.close_tab(&css).unwrap();
        assert!(h.app.active().is_none());
        assert_eq!(h.app.tabs().count(), 0);
        assert_eq!(h.app.store().file_count(), 3);
        assert_eq!(h.notes.last().unwrap().0, "Closed style.css");
    }

    #[test]
    fn test_rename_active_across_kinds() {
        let mut h = harness();
        h.app.create_file("a.js", None, None).unwrap();
        type_into(&mut h.app, "body { color: red; }");

        let renamed = h.app.rename_file(&key(FileKind::Script, "a.js"), "a.css").unwrap();
        assert_eq!(renamed, key(FileKind::Style, "a.css"));
        assert_eq!(
            h.app.store().get_content(FileKind::Style, "a.css").unwrap(),
            "body { color: red; }"
        );
        assert!(h.app.store().get_content(FileKind::Script, "a.js").is_err());
        assert_eq!(h.app.active(), Some(&renamed));
        assert_eq!(h.app.editor().surface(FileKind::Style).text(), "body { color: red; }");
        assert!(h.app.tabs().is_open(&renamed));
        assert!(h.app.tree().contains(&renamed));
        assert_eq!(h.notes.last().unwrap().0, "Renamed file to a.css");
    }

    #[test]
    fn test_rename_keeps_surface_when_kind_unchanged() {
        let mut h = harness();
        h.app.create_file("one.html", None, None).unwrap();
        h.app.surface_mut(FileKind::Markup).text = "<p>live</p>".to_string();
        let renamed = h.app.rename_file(&key(FileKind::Markup, "one.html"), "two.html").unwrap();
        assert_eq!(h.app.active(), Some(&renamed));
        assert_eq!(h.app.editor().surface(FileKind::Markup).text(), "<p>live</p>");
        assert_eq!(h.app.store().get_content(FileKind::Markup, "two.html").unwrap(), "<p>live</p>");
    }

    #[test]
    fn test_rename_rejects_bad_extension_without_change() {
        let mut h = harness();
        let before = h.app.store().clone();
        let err = h
            .app
            .rename_file(&FileKey::default_for(FileKind::Style), "style")
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidExtension(_)));
        assert_eq!(h.app.store(), &before);
    }

    #[test]
    fn test_rename_default_reseeds_it() {
        let mut h = harness();
        let index = FileKey::default_for(FileKind::Markup);
        type_into(&mut h.app, "<p>home</p>");
        let renamed = h.app.rename_file(&index, "home.html").unwrap();
        assert_eq!(h.app.store().get_content(FileKind::Markup, "home.html").unwrap(), "<p>home</p>");
        assert_eq!(
            h.app.store().default_content(FileKind::Markup),
            FileKind::Markup.template()
        );
        assert!(h.app.tree().contains(&index));
        assert!(h.app.tree().contains(&renamed));
        assert!(!h.app.tabs().is_open(&index));
    }

    #[test]
    fn test_delete_active_file_activates_last_tab() {
        let mut h = harness();
        h.app.select_tree_file(&FileKey::default_for(FileKind::Style)).unwrap();
        let page = h.app.create_file("page.html", None, None).unwrap();
        type_into(&mut h.app, "<p>gone</p>");

        h.app.delete_file(&page).unwrap();
        assert!(!h.app.store().contains(FileKind::Markup, "page.html"));
        assert!(!h.app.tabs().is_open(&page));
        assert!(!h.app.tree().contains(&page));
        assert_eq!(h.app.active(), Some(&FileKey::default_for(FileKind::Style)));
        assert_eq!(h.notes.last().unwrap().0, "Deleted file page.html");
    }

    #[test]
    fn test_delete_default_reseeds_template() {
        let mut h = harness();
        let css = FileKey::default_for(FileKind::Style);
        h.app.select_tree_file(&css).unwrap();
        type_into(&mut h.app, "h1{}");
        h.app.delete_file(&css).unwrap();
        assert_eq!(h.app.store().default_content(FileKind::Style), FileKind::Style.template());
        assert!(h.app.tree().contains(&css));
        assert!(!h.app.tabs().is_open(&css));
        assert_eq!(h.app.active(), Some(&FileKey::default_for(FileKind::Markup)));
    }

    #[test]
    fn test_delete_missing_file_reports() {
        let mut h = harness();
        let err = h.app.delete_file(&key(FileKind::Markup, "nope.html")).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(h.notes.last().unwrap().1, Severity::Error);
    }

    #[test]
    fn test_folders() {
        let mut h = harness();
        h.app.create_folder("pages").unwrap();
        assert!(matches!(h.app.create_folder("pages"), Err(AppError::AlreadyExists(_))));
        let about = h.app.create_file("about.html", None, Some("pages")).unwrap();
        assert_eq!(h.app.tree().folder_of(&about), Some("pages"));
        assert!(matches!(
            h.app.create_file("x.html", None, Some("missing")),
            Err(AppError::NotFound(_))
        ));
        assert!(!h.app.store().contains(FileKind::Markup, "x.html"));

        h.app.rename_folder("pages", "docs").unwrap();
        assert_eq!(h.app.tree().folder_of(&about), Some("docs"));
        assert_eq!(h.app.tree().file_at_path("docs/about.html"), Some(about.clone()));

        h.app.delete_folder("docs").unwrap();
        assert!(!h.app.store().contains(FileKind::Markup, "about.html"));
        assert!(!h.app.tabs().is_open(&about));
        assert_eq!(h.app.active(), Some(&FileKey::default_for(FileKind::Markup)));
        assert_eq!(h.notes.last().unwrap().0, "Deleted folder docs");
    }

    #[test]
    fn test_dot_folder_names_are_rejected() {
        let mut h = harness();
        assert!(matches!(h.app.create_folder(".."), Err(AppError::InvalidName(_))));
        assert!(matches!(h.app.create_folder("."), Err(AppError::InvalidName(_))));
        assert_eq!(h.notes.last().unwrap().1, Severity::Warning);
        assert!(h.app.tree().folders().is_empty());

        h.app.create_folder("lib").unwrap();
        assert!(matches!(h.app.rename_folder("lib", ".."), Err(AppError::InvalidName(_))));
        assert!(h.app.create_file("..", Some(FileKind::Script), None).is_err());
    }

    #[test]
    fn test_save_command_and_failure() {
        let mut h = harness();
        type_into(&mut h.app, "<p>v1</p>");
        h.app.save_now().unwrap();
        assert_eq!(h.notes.last().unwrap().0, "index.html saved successfully");

        h.storage.set_quota(Some(10));
        type_into(&mut h.app, "<p>v2</p>");
        assert!(matches!(h.app.save_now(), Err(AppError::StorageFailure(_))));
        assert_eq!(h.notes.last().unwrap().1, Severity::Error);
        let saved = h.storage.get(STORAGE_KEY).unwrap().unwrap();
        assert!(saved.contains("<p>v1</p>"));
        assert!(!saved.contains("<p>v2</p>"));
    }

    #[test]
    fn test_auto_save_failure_is_a_warning() {
        let mut h = harness();
        h.storage.set_quota(Some(10));
        let tickets = type_into(&mut h.app, "<p>x</p>");
        assert!(!h.app.save_due(tickets.save));
        assert_eq!(h.notes.last().unwrap().1, Severity::Warning);
    }

    #[test]
    fn test_restore_round_trip() {
        let mut h = harness();
        h.app.create_folder("lib").unwrap();
        h.app.create_file("util.js", None, Some("lib")).unwrap();
        type_into(&mut h.app, "export const x = 1;");
        h.app.select_tree_file(&FileKey::default_for(FileKind::Style)).unwrap();
        h.app.before_unload();
        let saved = h.app.snapshot();

        h.clock.advance(chrono::Duration::days(3));
        let mut again = harness_with(h.storage.clone(), h.clock.clone());
        let outcome = again.app.start();
        assert!(matches!(outcome, LoadOutcome::Restored(_)));
        assert_eq!(again.app.snapshot(), saved);
        assert_eq!(again.app.active(), Some(&FileKey::default_for(FileKind::Style)));
        assert_eq!(
            again.app.tree().folder_of(&key(FileKind::Script, "util.js")),
            Some("lib")
        );
        assert!(again.notes.last().unwrap().0.starts_with("Restored saved project"));
    }

    #[test]
    fn test_expired_snapshot_starts_fresh() {
        let mut h = harness();
        type_into(&mut h.app, "<p>old</p>");
        h.app.before_unload();
        h.clock.advance(chrono::Duration::days(31));

        let mut again = harness_with(h.storage.clone(), h.clock.clone());
        assert_eq!(again.app.start(), LoadOutcome::Expired);
        assert_eq!(
            again.app.store().default_content(FileKind::Markup),
            FileKind::Markup.template()
        );
        assert!(!again.app.persistence().exists());
        assert_eq!(again.notes.last().unwrap().1, Severity::Warning);
    }

    #[test]
    fn test_apply_snapshot_with_dangling_active() {
        let mut h = harness();
        let mut snapshot = h.app.snapshot();
        snapshot.active_file = Some(key(FileKind::Script, "ghost.js"));
        snapshot.open_tabs = vec![key(FileKind::Script, "ghost.js")];
        h.app.apply_snapshot(snapshot);
        assert_eq!(h.app.active(), h.app.store().first_key().as_ref());
        assert_eq!(h.app.tabs().count(), 1);
    }

    #[test]
    fn test_reset_and_discard() {
        let mut h = harness();
        h.app.create_file("extra.css", None, None).unwrap();
        h.app.reset_project();
        assert_eq!(h.app.store().file_count(), 3);
        assert!(!h.app.persistence().exists());
        assert_eq!(h.app.tabs().tabs(), &[FileKey::default_for(FileKind::Markup)]);

        h.app.save_now().unwrap();
        assert!(h.app.persistence().exists());
        h.app.discard_saved().unwrap();
        assert!(!h.app.persistence().exists());
        assert!(h.app.storage_info().is_none());
        assert_eq!(h.notes.last().unwrap().0, "No saved project");
    }

    #[test]
    fn test_export_falls_back_to_sequential_downloads() {
        let mut h = harness();
        h.app.create_folder("pages").unwrap();
        h.app.create_file("about.html", None, Some("pages")).unwrap();
        let total = h.app.start_export();
        assert_eq!(total, 4);
        assert!(h.app.export_in_progress());

        let mut steps = 0;
        while h.app.next_download() == Some(true) {
            steps += 1;
        }
        assert_eq!(steps, 3);
        assert!(!h.app.export_in_progress());
        assert_eq!(h.app.next_download(), None);
        assert_eq!(
            *h.downloads.0.borrow(),
            vec!["index.html", "pages/about.html", "script.js", "style.css"]
        );
        assert_eq!(h.notes.last().unwrap().0, "Project downloaded successfully");
    }

    #[test]
    fn test_abbreviation_expansion_flushes() {
        let mut h = harness();
        let surface = h.app.surface_mut(FileKind::Markup);
        surface.text = "div".to_string();
        surface.caret = 3;
        let tickets = h.app.expand_abbreviation(FileKind::Markup);
        assert!(tickets.is_some());
        assert_eq!(h.app.editor().surface(FileKind::Markup).text, "<div></div>");
        assert_eq!(h.app.editor().surface(FileKind::Markup).caret, 5);
        assert_eq!(
            h.app.store().get_content(FileKind::Markup, "index.html").unwrap(),
            "<div></div>"
        );
        // inactive surface
        assert!(h.app.expand_abbreviation(FileKind::Style).is_none());
    }

    #[test]
    fn test_format_active() {
        let mut h = harness();
        h.app.select_tree_file(&FileKey::default_for(FileKind::Style)).unwrap();
        type_into(&mut h.app, "a{color:red;}");
        assert!(h.app.format_active().is_some());
        let formatted = h.app.store().get_content(FileKind::Style, "style.css").unwrap();
        assert!(formatted.starts_with("a {\n  color:red;"));
        assert_eq!(h.notes.last().unwrap().0, "Code formatted");
    }

    #[test]
    fn test_resolve_new_file() {
        assert_eq!(
            resolve_new_file("main", Some(FileKind::Script)).unwrap(),
            key(FileKind::Script, "main.js")
        );
        assert_eq!(
            resolve_new_file("page.htm", Some(FileKind::Markup)).unwrap(),
            key(FileKind::Markup, "page.htm")
        );
        assert!(resolve_new_file("main", None).is_err());
        assert!(resolve_new_file("a.txt", Some(FileKind::Script)).is_err());
    }

    struct ThemeSpy(Rc<RefCell<Vec<bool>>>);

    impl Highlighter<MemorySurface> for ThemeSpy {
        fn highlight(&mut self, _kind: FileKind, _surface: &mut MemorySurface) {}

        fn set_dark_mode(&mut self, is_dark: bool) {
            self.0.borrow_mut().push(is_dark);
        }
    }

    #[test]
    fn test_toggle_theme_reaches_highlighter() {
        let mut h = harness();
        let seen = Rc::new(RefCell::new(Vec::new()));
        h.app
            .editor_mut()
            .set_highlighter(Some(Box::new(ThemeSpy(seen.clone()))));
        assert!(!h.app.dark_mode());

        assert!(h.app.toggle_theme());
        assert!(h.app.dark_mode());
        assert_eq!(
            h.notes.last().unwrap(),
            ("Theme switched".to_string(), Severity::Info)
        );
        assert!(!h.app.toggle_theme());
        assert_eq!(*seen.borrow(), vec![true, false]);
    }

    /// Store that cannot be read, counting removals.
    #[derive(Clone, Default)]
    struct ReadsFail(Rc<RefCell<u32>>);

    impl KeyValueStore for ReadsFail {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(AppError::StorageFailure("disk unavailable".to_string()))
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<()> {
            Ok(())
        }

        fn remove(&mut self, _key: &str) -> Result<()> {
            *self.0.borrow_mut() += 1;
            Ok(())
        }
    }

    #[test]
    fn test_unreadable_storage_starts_fresh_without_clearing() {
        let storage = ReadsFail::default();
        let notes = RecordingNotifier::default();
        let services = Services {
            persistence: PersistenceGateway::new(
                Box::new(storage.clone()),
                Box::new(ManualClock::new(Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap())),
            ),
            preview: Box::new(Published::default()),
            downloads: Box::new(Downloads::default()),
            archive: None,
            notifier: Box::new(notes.clone()),
        };
        let surfaces = KindSurfaces::new(
            MemorySurface::default(),
            MemorySurface::default(),
            MemorySurface::default(),
        );
        let mut app = Playground::new(surfaces, services, &AppSettings::default());

        assert_eq!(app.start(), LoadOutcome::Unreadable);
        assert_eq!(app.active(), Some(&key(FileKind::Markup, "index.html")));
        assert_eq!(*storage.0.borrow(), 0);
        assert!(notes.messages().contains(&(
            "Saved project could not be loaded, starting fresh".to_string(),
            Severity::Warning
        )));
    }
}
