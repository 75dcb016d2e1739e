use fltk::{
    app::Sender,
    enums::{Key, Shortcut},
    menu::{MenuBar, MenuFlag},
    prelude::*,
};

use crate::app::domain::{AppSettings, Message};

pub const AUTO_RELOAD_ITEM: &str = "Preview/Auto Reload";
pub const DARK_MODE_ITEM: &str = "View/Dark Mode";

pub fn build_menu(menu: &mut MenuBar, sender: &Sender<Message>, settings: &AppSettings) {
    let s = sender;

    // File
    menu.add("File/New File...", Shortcut::Ctrl | 'n', MenuFlag::Normal, { let s = *s; move |_| s.send(Message::NewFile) });
    menu.add("File/New Folder...", Shortcut::Ctrl | Shortcut::Shift | 'n', MenuFlag::Normal, { let s = *s; move |_| s.send(Message::NewFolder) });
    menu.add("File/Add File to Folder...", Shortcut::None, MenuFlag::MenuDivider, { let s = *s; move |_| s.send(Message::AddFileToFolder) });
    menu.add("File/Rename...", Shortcut::from_key(Key::F2), MenuFlag::Normal, { let s = *s; move |_| s.send(Message::RenameSelected) });
    menu.add("File/Delete...", Shortcut::None, MenuFlag::MenuDivider, { let s = *s; move |_| s.send(Message::DeleteSelected) });
    menu.add("File/Save", Shortcut::Ctrl | 's', MenuFlag::Normal, { let s = *s; move |_| s.send(Message::SaveProject) });
    menu.add("File/Download Project", Shortcut::Ctrl | Shortcut::Shift | 's', MenuFlag::MenuDivider, { let s = *s; move |_| s.send(Message::DownloadProject) });
    menu.add("File/Close Tab", Shortcut::Ctrl | 'w', MenuFlag::Normal, { let s = *s; move |_| s.send(Message::CloseActiveTab) });
    menu.add("File/Quit", Shortcut::Ctrl | 'q', MenuFlag::Normal, { let s = *s; move |_| s.send(Message::FileQuit) });

    // Edit
    menu.add("Edit/Format Code", Shortcut::Ctrl | Shortcut::Shift | 'f', MenuFlag::Normal, { let s = *s; move |_| s.send(Message::FormatCode) });

    // Preview
    menu.add("Preview/Run", Shortcut::Ctrl | Key::Enter, MenuFlag::Normal, { let s = *s; move |_| s.send(Message::RefreshPreview) });
    let ar_flag = if settings.auto_reload { MenuFlag::Toggle | MenuFlag::Value } else { MenuFlag::Toggle };
    menu.add(AUTO_RELOAD_ITEM, Shortcut::None, ar_flag, { let s = *s; move |_| s.send(Message::ToggleAutoReload) });

    // View
    let dm_flag = if settings.dark_mode { MenuFlag::Toggle | MenuFlag::Value } else { MenuFlag::Toggle };
    menu.add(DARK_MODE_ITEM, Shortcut::None, dm_flag, { let s = *s; move |_| s.send(Message::ToggleTheme) });

    // Project
    menu.add("Project/Storage Info", Shortcut::None, MenuFlag::Normal, { let s = *s; move |_| s.send(Message::ShowStorageInfo) });
    menu.add("Project/Discard Saved Project", Shortcut::None, MenuFlag::Normal, { let s = *s; move |_| s.send(Message::DiscardSaved) });
    menu.add("Project/Reset Project...", Shortcut::None, MenuFlag::Normal, { let s = *s; move |_| s.send(Message::ResetProject) });

    // Help
    menu.add("Help/About FerrisPlay", Shortcut::None, MenuFlag::Normal, { let s = *s; move |_| s.send(Message::ShowAbout) });
}
