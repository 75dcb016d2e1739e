use fltk::{
    app::{self, Sender},
    dialog,
    group::Flex,
    menu::MenuBar,
    prelude::*,
    window::Window,
};

use super::domain::{AppSettings, FileKind, Message};
use super::infrastructure::fltk_surface::{FltkSurface, SurfaceHighlighter};
use super::infrastructure::sinks::{BrowserPreviewSink, DirectoryDownloadSink};
use super::infrastructure::status_notifier::StatusNotifier;
use super::infrastructure::storage::FileStore;
use super::playground::{EditTickets, Playground, Services};
use super::services::export::DOWNLOAD_SPACING_MS;
use super::services::persistence::{PersistenceGateway, SystemClock};
use crate::ui::dialogs::about::show_about_dialog;
use crate::ui::dialogs::new_file::show_new_file_dialog;
use crate::ui::file_tree::{FileTreeView, TreeSelection};
use crate::ui::main_window::MainWidgets;
use crate::ui::menu::{AUTO_RELOAD_ITEM, DARK_MODE_ITEM};
use crate::ui::tab_bar::TabBar;
use crate::ui::theme::{apply_editor_theme, apply_theme};

/// Desktop shell: the widgets plus the playground they drive.
pub struct AppState {
    pub playground: Playground<FltkSurface>,
    pub window: Window,
    pub menu: MenuBar,
    pub body: Flex,
    pub tab_bar: TabBar,
    pub tree: FileTreeView,
    pub sender: Sender<Message>,
    pub settings: AppSettings,
}

impl AppState {
    pub fn new(widgets: MainWidgets, sender: Sender<Message>, settings: AppSettings) -> Self {
        let MainWidgets {
            wind,
            menu,
            tab_bar,
            body,
            tree,
            surfaces,
            status_frame,
        } = widgets;

        let services = Services {
            persistence: PersistenceGateway::new(
                Box::new(FileStore::new(FileStore::default_dir())),
                Box::new(SystemClock),
            ),
            preview: Box::new(BrowserPreviewSink::new(BrowserPreviewSink::default_path())),
            downloads: Box::new(DirectoryDownloadSink::new(settings.resolved_download_dir())),
            archive: None,
            notifier: Box::new(StatusNotifier::new(status_frame)),
        };
        let mut playground = Playground::new(surfaces, services, &settings);
        playground
            .editor_mut()
            .set_highlighter(Some(Box::new(SurfaceHighlighter::new(
                settings.font_size as i32,
                settings.highlighting_enabled,
            ))));
        playground.set_dark_mode(settings.dark_mode);

        let mut state = Self {
            playground,
            window: wind,
            menu,
            body,
            tab_bar,
            tree,
            sender,
            settings,
        };
        state.apply_widget_theme();
        state
    }

    /// Restore or seed the project and start the periodic save timer.
    pub fn start(&mut self) {
        self.playground.start();
        self.refresh_view();

        let secs = self.settings.periodic_save_secs.max(1) as f64;
        let s = self.sender;
        app::add_timeout3(secs, move |handle| {
            s.send(Message::PeriodicSave);
            app::repeat_timeout3(secs, handle);
        });
    }

    /// Dispatch one message. Returns `true` when the app should exit.
    pub fn handle(&mut self, msg: Message) -> bool {
        match msg {
            // Editing, timers and background work leave the widgets as they are
            Message::SurfaceEdited(kind) => {
                if self.active_kind() == Some(kind) {
                    let tickets = self.playground.on_edit();
                    self.arm(tickets);
                }
                return false;
            }
            Message::SurfaceBlurred(kind) => {
                if self.active_kind() == Some(kind) {
                    self.playground.on_blur();
                }
                return false;
            }
            Message::ReloadDue(ticket) => {
                self.playground.reload_due(ticket);
                return false;
            }
            Message::SaveDue(ticket) => {
                self.playground.save_due(ticket);
                return false;
            }
            Message::PeriodicSave => {
                self.playground.periodic_save();
                return false;
            }
            Message::ExpandAbbreviation(kind) => {
                if let Some(tickets) = self.playground.expand_abbreviation(kind) {
                    self.arm(tickets);
                }
                return false;
            }
            Message::ContinueDownload => {
                self.continue_download();
                return false;
            }
            Message::TreeFolderToggled(name, open) => {
                self.playground.set_folder_open(&name, open);
                return false;
            }
            Message::WindowClose | Message::FileQuit => {
                self.playground.before_unload();
                return true;
            }

            Message::NewFile => self.new_file(None),
            Message::AddFileToFolder => self.add_file_to_folder(),
            Message::NewFolder => self.new_folder(),
            Message::RenameSelected => self.rename_selected(),
            Message::DeleteSelected => self.delete_selected(),
            Message::SaveProject => {
                let _ = self.playground.save_now();
            }
            Message::DownloadProject => self.download_project(),
            Message::ResetProject => self.reset_project(),
            Message::DiscardSaved => {
                let _ = self.playground.discard_saved();
            }
            Message::ShowStorageInfo => {
                self.playground.storage_info();
            }
            Message::FormatCode => {
                if let Some(tickets) = self.playground.format_active() {
                    self.arm(tickets);
                }
            }
            Message::TreeFileSelected(key) => {
                let _ = self.playground.select_tree_file(&key);
            }
            Message::TabClicked(key) => {
                let _ = self.playground.click_tab(&key);
            }
            Message::TabClosed(key) => {
                let _ = self.playground.close_tab(&key);
            }
            Message::CloseActiveTab => {
                let _ = self.playground.close_active_tab();
            }
            Message::RefreshPreview => {
                let _ = self.playground.refresh_preview();
            }
            Message::ToggleAutoReload => self.toggle_auto_reload(),
            Message::ToggleTheme => self.toggle_theme(),
            Message::ShowAbout => show_about_dialog(),
        }
        self.refresh_view();
        false
    }

    fn active_kind(&self) -> Option<FileKind> {
        self.playground.active().map(|k| k.kind)
    }

    // Report each ticket back once its debounce delay has passed.
    fn arm(&self, tickets: EditTickets) {
        if let Some(ticket) = tickets.reload {
            let s = self.sender;
            app::add_timeout3(self.playground.reload_delay().as_secs_f64(), move |_| {
                s.send(Message::ReloadDue(ticket));
            });
        }
        let s = self.sender;
        let ticket = tickets.save;
        app::add_timeout3(self.playground.save_delay().as_secs_f64(), move |_| {
            s.send(Message::SaveDue(ticket));
        });
    }

    /// Sync tabs, tree, visible editor and title with the playground.
    pub fn refresh_view(&mut self) {
        let active = self.playground.active().cloned();
        self.tab_bar.rebuild(self.playground.tabs().tabs(), active.as_ref());
        self.tree.rebuild(self.playground.tree());

        let active_kind = active.as_ref().map(|k| k.kind);
        for kind in FileKind::ALL {
            if active_kind != Some(kind) {
                self.playground.surface_mut(kind).set_visible(false);
            }
        }
        if let Some(kind) = active_kind {
            self.playground.surface_mut(kind).set_visible(true);
        }
        self.body.recalc();

        let title = match &active {
            Some(key) => format!("{} - \u{1f980} FerrisPlay", key.name),
            None => "\u{1f980} FerrisPlay".to_string(),
        };
        self.window.set_label(&title);
        self.window.redraw();
    }

    // --- Files and folders ---

    fn new_file(&mut self, folder: Option<&str>) {
        if let Some((name, kind)) = show_new_file_dialog(folder) {
            let _ = self.playground.create_file(&name, kind, folder);
        }
    }

    // Target folder: the selected folder, or the folder of the selected file.
    fn add_file_to_folder(&mut self) {
        let folder = match self.tree.selection() {
            Some(TreeSelection::Folder(name)) => Some(name),
            Some(TreeSelection::File(key)) => {
                self.playground.tree().folder_of(&key).map(str::to_string)
            }
            None => None,
        };
        match folder {
            Some(folder) => self.new_file(Some(&folder)),
            None => dialog::alert_default("Select a folder in the file tree first."),
        }
    }

    fn new_folder(&mut self) {
        if let Some(name) = dialog::input_default("Folder name:", "") {
            let _ = self.playground.create_folder(&name);
        }
    }

    fn selection_or_active(&self) -> Option<TreeSelection> {
        self.tree.selection().or_else(|| {
            self.playground
                .active()
                .cloned()
                .map(TreeSelection::File)
        })
    }

    fn rename_selected(&mut self) {
        match self.selection_or_active() {
            Some(TreeSelection::File(key)) => {
                if let Some(new_name) = dialog::input_default("Rename file:", &key.name) {
                    let _ = self.playground.rename_file(&key, &new_name);
                }
            }
            Some(TreeSelection::Folder(name)) => {
                if let Some(new_name) = dialog::input_default("Rename folder:", &name) {
                    let _ = self.playground.rename_folder(&name, &new_name);
                }
            }
            None => {}
        }
    }

    fn delete_selected(&mut self) {
        match self.selection_or_active() {
            Some(TreeSelection::File(key)) => {
                let choice = dialog::choice2_default(
                    &format!("Delete \"{}\"?", key.name),
                    "Delete",
                    "Cancel",
                    "",
                );
                if choice == Some(0) {
                    let _ = self.playground.delete_file(&key);
                }
            }
            Some(TreeSelection::Folder(name)) => {
                let choice = dialog::choice2_default(
                    &format!("Delete folder \"{name}\" and all its files?"),
                    "Delete",
                    "Cancel",
                    "",
                );
                if choice == Some(0) {
                    let _ = self.playground.delete_folder(&name);
                }
            }
            None => {}
        }
    }

    // --- Project ---

    fn reset_project(&mut self) {
        let choice = dialog::choice2_default(
            "Reset the project? All files are replaced by the starter templates \
             and the saved copy is deleted.",
            "Reset",
            "Cancel",
            "",
        );
        if choice == Some(0) {
            self.playground.reset_project();
        }
    }

    fn download_project(&mut self) {
        if self.playground.export_in_progress() {
            return;
        }
        if self.playground.start_export() > 0 {
            self.sender.send(Message::ContinueDownload);
        }
    }

    // One download per step, spaced out so the sink is not flooded.
    fn continue_download(&mut self) {
        if self.playground.next_download() == Some(true) {
            let s = self.sender;
            app::add_timeout3(DOWNLOAD_SPACING_MS as f64 / 1000.0, move |_| {
                s.send(Message::ContinueDownload);
            });
        }
    }

    fn toggle_auto_reload(&mut self) {
        let enabled = self.playground.toggle_auto_reload();
        self.update_menu_checkbox(AUTO_RELOAD_ITEM, enabled);
        self.settings.auto_reload = enabled;
        if let Err(e) = self.settings.save() {
            tracing::warn!("Failed to save settings: {}", e);
        }
    }

    fn toggle_theme(&mut self) {
        let is_dark = self.playground.toggle_theme();
        self.apply_widget_theme();
        self.update_menu_checkbox(DARK_MODE_ITEM, is_dark);
        self.settings.dark_mode = is_dark;
        if let Err(e) = self.settings.save() {
            tracing::warn!("Failed to save settings: {}", e);
        }
    }

    fn apply_widget_theme(&mut self) {
        let is_dark = self.playground.dark_mode();
        apply_theme(&mut self.window, &mut self.menu, &mut self.tree.widget, is_dark);
        for kind in FileKind::ALL {
            apply_editor_theme(self.playground.surface_mut(kind).editor_mut(), is_dark);
        }
        self.tab_bar.set_dark_mode(is_dark);
    }

    fn update_menu_checkbox(&self, path: &str, checked: bool) {
        let idx = self.menu.find_index(path);
        if idx >= 0
            && let Some(mut item) = self.menu.at(idx)
        {
            if checked {
                item.set();
            } else {
                item.clear();
            }
        }
    }
}
