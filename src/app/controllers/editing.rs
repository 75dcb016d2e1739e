use crate::app::domain::{FileKey, FileKind, ProjectStore};
use crate::app::services::abbreviations;

/// A text-bearing widget the core reads from and writes to.
///
/// Caret positions are byte offsets into the text.
pub trait EditingSurface {
    fn text(&self) -> String;
    fn set_text(&mut self, text: &str);
    fn caret(&self) -> usize;
    fn set_caret(&mut self, pos: usize);
}

/// Optional syntax highlighter invoked after content is loaded or edited.
pub trait Highlighter<S> {
    fn highlight(&mut self, kind: FileKind, surface: &mut S);

    fn set_dark_mode(&mut self, _is_dark: bool) {}
}

/// One surface per file kind.
pub struct KindSurfaces<S> {
    pub markup: S,
    pub style: S,
    pub script: S,
}

impl<S> KindSurfaces<S> {
    pub fn new(markup: S, style: S, script: S) -> Self {
        Self {
            markup,
            style,
            script,
        }
    }

    pub fn get(&self, kind: FileKind) -> &S {
        match kind {
            FileKind::Markup => &self.markup,
            FileKind::Style => &self.style,
            FileKind::Script => &self.script,
        }
    }

    pub fn get_mut(&mut self, kind: FileKind) -> &mut S {
        match kind {
            FileKind::Markup => &mut self.markup,
            FileKind::Style => &mut self.style,
            FileKind::Script => &mut self.script,
        }
    }
}

/// Mediates between the three editing surfaces and the project store.
///
/// Every transition that changes the active file flushes the live text of
/// the current surface into the store first.
pub struct EditingSurfaceController<S: EditingSurface> {
    surfaces: KindSurfaces<S>,
    active: Option<FileKey>,
    highlighter: Option<Box<dyn Highlighter<S>>>,
}

impl<S: EditingSurface> EditingSurfaceController<S> {
    pub fn new(surfaces: KindSurfaces<S>) -> Self {
        Self {
            surfaces,
            active: None,
            highlighter: None,
        }
    }

    pub fn set_highlighter(&mut self, highlighter: Option<Box<dyn Highlighter<S>>>) {
        self.highlighter = highlighter;
    }

    pub fn active(&self) -> Option<&FileKey> {
        self.active.as_ref()
    }

    /// Switch the highlighter palette and restyle the active surface.
    pub fn set_dark_mode(&mut self, is_dark: bool) {
        if let Some(highlighter) = self.highlighter.as_mut() {
            highlighter.set_dark_mode(is_dark);
        }
        if let Some(kind) = self.active.as_ref().map(|k| k.kind) {
            self.rehighlight(kind);
        }
    }

    pub fn surface(&self, kind: FileKind) -> &S {
        self.surfaces.get(kind)
    }

    pub fn surface_mut(&mut self, kind: FileKind) -> &mut S {
        self.surfaces.get_mut(kind)
    }

    /// Write the live text of the active surface into the store.
    /// Returns false when there is no active file.
    pub fn flush(&self, store: &mut ProjectStore) -> bool {
        match &self.active {
            Some(key) => {
                let text = self.surfaces.get(key.kind).text();
                store.set_content(key.kind, &key.name, &text);
                true
            }
            None => false,
        }
    }

    /// Flush the current file, then display `key`.
    pub fn activate(&mut self, store: &mut ProjectStore, key: FileKey) {
        self.flush(store);
        self.load(store, key);
    }

    /// Display `key` without flushing. Used after the previous file has been
    /// removed from the store, where a flush would resurrect it.
    pub fn load(&mut self, store: &ProjectStore, key: FileKey) {
        let content = store
            .get_content(key.kind, &key.name)
            .unwrap_or(key.kind.template())
            .to_string();
        tracing::debug!("Activating {} ({})", key.name, key.kind);
        let surface = self.surfaces.get_mut(key.kind);
        surface.set_text(&content);
        surface.set_caret(0);
        let kind = key.kind;
        self.active = Some(key);
        self.rehighlight(kind);
    }

    /// Forget the active file. The surfaces keep their text.
    pub fn deactivate(&mut self) {
        self.active = None;
    }

    /// Re-key the active file after a rename that kept its kind.
    pub fn rekey(&mut self, new_key: FileKey) {
        self.active = Some(new_key);
    }

    /// Content-changing input on the active surface.
    pub fn on_edit(&mut self, store: &mut ProjectStore) -> bool {
        let flushed = self.flush(store);
        if let Some(kind) = self.active.as_ref().map(|k| k.kind) {
            self.rehighlight(kind);
        }
        flushed
    }

    /// Expand the abbreviation right before the caret of the `kind` surface.
    ///
    /// Returns true when the trigger keystroke was consumed.
    pub fn expand_abbreviation(&mut self, kind: FileKind) -> bool {
        expand_in_surface(self.surfaces.get_mut(kind), kind)
    }

    /// Replace the active surface text, e.g. after formatting, then flush.
    pub fn replace_active_text(&mut self, store: &mut ProjectStore, text: &str) -> bool {
        let Some(kind) = self.active.as_ref().map(|k| k.kind) else {
            return false;
        };
        let surface = self.surfaces.get_mut(kind);
        let caret = surface.caret().min(text.len());
        surface.set_text(text);
        if text.is_char_boundary(caret) {
            surface.set_caret(caret);
        }
        self.on_edit(store)
    }

    fn rehighlight(&mut self, kind: FileKind) {
        if let Some(highlighter) = self.highlighter.as_mut() {
            highlighter.highlight(kind, self.surfaces.get_mut(kind));
        }
    }
}

/// Abbreviation expansion against any surface.
fn expand_in_surface<S: EditingSurface + ?Sized>(surface: &mut S, kind: FileKind) -> bool {
    let text = surface.text();
    match abbreviations::expand(&text, surface.caret(), kind) {
        Some(expansion) => {
            surface.set_text(&expansion.text);
            surface.set_caret(expansion.caret);
            true
        }
        None => false,
    }
}

/// Plain in-memory surface, used headless and in tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemorySurface {
    pub text: String,
    pub caret: usize,
}

impl EditingSurface for MemorySurface {
    fn text(&self) -> String {
        self.text.clone()
    }

    fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
        self.caret = self.caret.min(self.text.len());
    }

    fn caret(&self) -> usize {
        self.caret
    }

    fn set_caret(&mut self, pos: usize) {
        self.caret = pos.min(self.text.len());
    }
}

impl MemorySurface {
    /// Simulate typing: replace the whole text and put the caret at the end.
    pub fn type_text(&mut self, text: &str) {
        self.text = text.to_string();
        self.caret = self.text.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn controller() -> EditingSurfaceController<MemorySurface> {
        EditingSurfaceController::new(KindSurfaces::new(
            MemorySurface::default(),
            MemorySurface::default(),
            MemorySurface::default(),
        ))
    }

    struct CountingHighlighter(Rc<RefCell<Vec<FileKind>>>);

    impl Highlighter<MemorySurface> for CountingHighlighter {
        fn highlight(&mut self, kind: FileKind, _surface: &mut MemorySurface) {
            self.0.borrow_mut().push(kind);
        }
    }

    #[test]
    fn test_activate_loads_content_into_kind_surface() {
        let mut store = ProjectStore::new();
        store.set_content(FileKind::Style, "style.css", "h1{}");
        let mut ctl = controller();
        ctl.activate(&mut store, FileKey::default_for(FileKind::Style));
        assert_eq!(ctl.surface(FileKind::Style).text, "h1{}");
        assert_eq!(ctl.active(), Some(&FileKey::default_for(FileKind::Style)));
    }

    #[test]
    fn test_switch_flushes_previous_file() {
        let mut store = ProjectStore::new();
        let mut ctl = controller();
        ctl.activate(&mut store, FileKey::default_for(FileKind::Markup));
        ctl.surface_mut(FileKind::Markup).type_text("<p>draft</p>");
        ctl.activate(&mut store, FileKey::default_for(FileKind::Script));
        assert_eq!(store.default_content(FileKind::Markup), "<p>draft</p>");
    }

    #[test]
    fn test_switch_within_same_kind_flushes_before_load() {
        let mut store = ProjectStore::new();
        store.create_file(FileKind::Markup, "about.html", "<p>about</p>").unwrap();
        let mut ctl = controller();
        ctl.activate(&mut store, FileKey::default_for(FileKind::Markup));
        ctl.surface_mut(FileKind::Markup).type_text("<p>home</p>");
        ctl.activate(&mut store, FileKey::new(FileKind::Markup, "about.html"));
        assert_eq!(store.default_content(FileKind::Markup), "<p>home</p>");
        assert_eq!(ctl.surface(FileKind::Markup).text, "<p>about</p>");
    }

    #[test]
    fn test_missing_file_loads_template() {
        let mut store = ProjectStore::new();
        let mut ctl = controller();
        ctl.activate(&mut store, FileKey::new(FileKind::Script, "ghost.js"));
        assert_eq!(ctl.surface(FileKind::Script).text, FileKind::Script.template());
    }

    #[test]
    fn test_on_edit_writes_to_active_slot() {
        let mut store = ProjectStore::new();
        let mut ctl = controller();
        assert!(!ctl.on_edit(&mut store));
        ctl.activate(&mut store, FileKey::default_for(FileKind::Script));
        ctl.surface_mut(FileKind::Script).type_text("console.log(1)");
        assert!(ctl.on_edit(&mut store));
        assert_eq!(store.default_content(FileKind::Script), "console.log(1)");
    }

    #[test]
    fn test_highlighter_runs_on_load_and_edit() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut store = ProjectStore::new();
        let mut ctl = controller();
        ctl.set_highlighter(Some(Box::new(CountingHighlighter(calls.clone()))));
        ctl.activate(&mut store, FileKey::default_for(FileKind::Style));
        ctl.on_edit(&mut store);
        assert_eq!(*calls.borrow(), vec![FileKind::Style, FileKind::Style]);
    }

    #[test]
    fn test_expand_abbreviation_on_surface() {
        let mut store = ProjectStore::new();
        let mut ctl = controller();
        ctl.activate(&mut store, FileKey::default_for(FileKind::Markup));
        ctl.surface_mut(FileKind::Markup).type_text("div");
        assert!(ctl.expand_abbreviation(FileKind::Markup));
        let surface = ctl.surface(FileKind::Markup);
        assert_eq!(surface.text, "<div></div>");
        assert_eq!(surface.caret, 5);
    }

    #[test]
    fn test_expand_abbreviation_miss_leaves_text() {
        let mut ctl = controller();
        ctl.surface_mut(FileKind::Markup).type_text("nope");
        assert!(!ctl.expand_abbreviation(FileKind::Markup));
        assert_eq!(ctl.surface(FileKind::Markup).text, "nope");
    }
}
