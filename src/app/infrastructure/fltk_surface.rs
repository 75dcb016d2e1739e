use std::cell::Cell;
use std::rc::Rc;

use fltk::{
    app::{self, Sender},
    enums::{Color, Event, Font, Key},
    prelude::*,
    text::{StyleTableEntry, TextBuffer, TextEditor},
};

use crate::app::controllers::editing::{EditingSurface, Highlighter};
use crate::app::domain::{FileKind, Message};
use crate::app::services::abbreviations;
use crate::app::services::syntax::{plain_style, SyntaxHighlighter};

/// FLTK text editor bound to one file kind.
///
/// Clones share the same widget and buffers.
#[derive(Clone)]
pub struct FltkSurface {
    kind: FileKind,
    editor: TextEditor,
    buffer: TextBuffer,
    style_buffer: TextBuffer,
    /// Set while the core replaces the text, so no edit is reported back.
    loading: Rc<Cell<bool>>,
}

impl FltkSurface {
    /// Create the editor inside the current FLTK group.
    pub fn new(kind: FileKind, font_size: i32, sender: Sender<Message>) -> Self {
        let mut buffer = TextBuffer::default();
        let style_buffer = TextBuffer::default();
        let loading = Rc::new(Cell::new(false));

        let mut editor = TextEditor::new(0, 0, 0, 0, "");
        editor.set_buffer(buffer.clone());
        editor.set_text_font(Font::Courier);
        editor.set_text_size(font_size);
        editor.set_linenumber_width(40);
        editor.set_linenumber_bgcolor(Color::from_rgb(240, 240, 240));
        editor.set_linenumber_fgcolor(Color::from_rgb(100, 100, 100));

        let quiet = loading.clone();
        let mut style_buf = style_buffer.clone();
        buffer.add_modify_callback(move |pos, inserted, deleted, _restyled, _deleted_text| {
            if inserted > 0 || deleted > 0 {
                if inserted > 0 {
                    let filler: String = std::iter::repeat_n('A', inserted as usize).collect();
                    style_buf.insert(pos, &filler);
                }
                if deleted > 0 {
                    style_buf.remove(pos, pos + deleted);
                }
                if !quiet.get() {
                    sender.send(Message::SurfaceEdited(kind));
                }
            }
        });

        let surface = Self {
            kind,
            editor,
            buffer,
            style_buffer,
            loading,
        };

        // Tab only gets swallowed when there is something to expand
        let target = surface.clone();
        surface.editor.clone().handle(move |_, event| match event {
            Event::KeyDown if app::event_key() == Key::Tab && !app::is_event_shift() => {
                if abbreviations::expand(&target.text(), target.caret(), kind).is_some() {
                    sender.send(Message::ExpandAbbreviation(kind));
                    true
                } else {
                    false
                }
            }
            Event::Unfocus => {
                sender.send(Message::SurfaceBlurred(kind));
                false
            }
            _ => false,
        });

        surface
    }

    pub fn editor_mut(&mut self) -> &mut TextEditor {
        &mut self.editor
    }

    pub fn set_visible(&mut self, visible: bool) {
        if visible {
            self.editor.show();
            let _ = self.editor.take_focus();
        } else {
            self.editor.hide();
        }
    }

    /// Install a style string (one char per byte) and its table.
    pub fn apply_styles(&mut self, styles: &str, table: Vec<StyleTableEntry>) {
        self.style_buffer.set_text(styles);
        self.editor
            .set_highlight_data(self.style_buffer.clone(), table);
        self.editor.redraw();
    }
}

impl EditingSurface for FltkSurface {
    fn text(&self) -> String {
        self.buffer.text()
    }

    fn set_text(&mut self, text: &str) {
        self.loading.set(true);
        self.buffer.set_text(text);
        self.loading.set(false);
    }

    fn caret(&self) -> usize {
        self.editor.insert_position().max(0) as usize
    }

    fn set_caret(&mut self, pos: usize) {
        self.editor.set_insert_position(pos as i32);
        self.editor.show_insert_position();
    }
}

/// Bridges the syntect highlighter to the FLTK surfaces.
pub struct SurfaceHighlighter {
    syntax: SyntaxHighlighter,
    enabled: bool,
}

impl SurfaceHighlighter {
    pub fn new(font_size: i32, enabled: bool) -> Self {
        Self {
            syntax: SyntaxHighlighter::new(Font::Courier, font_size),
            enabled,
        }
    }
}

impl Highlighter<FltkSurface> for SurfaceHighlighter {
    fn set_dark_mode(&mut self, is_dark: bool) {
        self.syntax.set_dark_mode(is_dark);
    }

    fn highlight(&mut self, kind: FileKind, surface: &mut FltkSurface) {
        let text = surface.text();
        let styles = if self.enabled {
            self.syntax.highlight(kind, &text)
        } else {
            plain_style(&text)
        };
        surface.apply_styles(&styles, self.syntax.style_table());
    }
}
