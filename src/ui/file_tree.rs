use std::cell::RefCell;
use std::rc::Rc;

use fltk::{
    app::Sender,
    prelude::*,
    tree::{Tree, TreeReason, TreeSelect},
};

use crate::app::controllers::tabs::{FileTree, TreeEntry};
use crate::app::domain::{FileKey, Message};

/// What the user has highlighted in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeSelection {
    File(FileKey),
    Folder(String),
}

/// Sidebar listing root files, folders and folder contents.
pub struct FileTreeView {
    pub widget: Tree,
    entries: Rc<RefCell<Vec<TreeEntry>>>,
}

impl FileTreeView {
    pub fn new(sender: Sender<Message>) -> Self {
        let entries: Rc<RefCell<Vec<TreeEntry>>> = Rc::new(RefCell::new(Vec::new()));

        let mut widget = Tree::default();
        widget.set_show_root(false);
        widget.set_select_mode(TreeSelect::Single);

        let cb_entries = entries.clone();
        widget.set_callback(move |t| {
            let Some(item) = t.callback_item() else {
                return;
            };
            let Ok(path) = t.item_pathname(&item) else {
                return;
            };
            let entries = cb_entries.borrow();
            match (t.callback_reason(), lookup(&entries, &path)) {
                (TreeReason::Selected, Some(TreeSelection::File(key))) => {
                    sender.send(Message::TreeFileSelected(key));
                }
                (TreeReason::Opened, Some(TreeSelection::Folder(name))) => {
                    sender.send(Message::TreeFolderToggled(name, true));
                }
                (TreeReason::Closed, Some(TreeSelection::Folder(name))) => {
                    sender.send(Message::TreeFolderToggled(name, false));
                }
                _ => {}
            }
        });

        Self { widget, entries }
    }

    /// Replace the tree contents and mark the selected file.
    pub fn rebuild(&mut self, tree: &FileTree) {
        let entries = tree.entries();
        self.widget.clear();
        for entry in &entries {
            if let Some(mut item) = self.widget.add(&entry.path)
                && entry.file.is_none()
            {
                if entry.open {
                    item.open();
                } else {
                    item.close();
                }
            }
        }
        if let Some(selected) = tree.selected()
            && let Some(entry) = entries.iter().find(|e| e.file.as_ref() == Some(selected))
            && let Some(mut item) = self.widget.find_item(&entry.path)
        {
            item.select(1);
        }
        *self.entries.borrow_mut() = entries;
        self.widget.redraw();
    }

    pub fn selection(&self) -> Option<TreeSelection> {
        let item = self.widget.first_selected_item()?;
        let path = self.widget.item_pathname(&item).ok()?;
        lookup(&self.entries.borrow(), &path)
    }
}

// Tree paths may carry the hidden root's label as first component.
fn lookup(entries: &[TreeEntry], path: &str) -> Option<TreeSelection> {
    let find = |p: &str| {
        entries.iter().find(|e| e.path == p).map(|e| match &e.file {
            Some(key) => TreeSelection::File(key.clone()),
            None => TreeSelection::Folder(e.path.clone()),
        })
    };
    find(path).or_else(|| path.split_once('/').and_then(|(_, rest)| find(rest)))
}
