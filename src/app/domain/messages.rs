use super::file_kind::{FileKey, FileKind};

/// All messages that can be sent through the FLTK channel.
/// Each widget callback sends one of these; the dispatch loop in main handles them.
#[derive(Debug, Clone)]
pub enum Message {
    // Project
    NewFile,
    NewFolder,
    AddFileToFolder,
    RenameSelected,
    DeleteSelected,
    SaveProject,
    DownloadProject,
    ContinueDownload,
    ResetProject,
    DiscardSaved,
    ShowStorageInfo,
    WindowClose,
    FileQuit,

    // Editing
    SurfaceEdited(FileKind),
    SurfaceBlurred(FileKind),
    ExpandAbbreviation(FileKind),
    FormatCode,

    // Tree and tabs
    TreeFileSelected(FileKey),
    TreeFolderToggled(String, bool),
    TabClicked(FileKey),
    TabClosed(FileKey),
    CloseActiveTab,

    // Preview
    RefreshPreview,
    ToggleAutoReload,

    // View
    ToggleTheme,

    // Help
    ShowAbout,

    // Timers
    ReloadDue(u64),
    SaveDue(u64),
    PeriodicSave,
}
