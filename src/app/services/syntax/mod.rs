//! syntect-based highlighting for the three project languages.
//!
//! Produces one FLTK style character per byte of input, plus the style
//! table those characters index into.

mod style_map;

use fltk::enums::{Color, Font};
use fltk::text::StyleTableEntry;
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;

use style_map::StyleMap;

use crate::app::domain::FileKind;

pub const DEFAULT_THEME: &str = "InspiredGitHub";
pub const DARK_THEME: &str = "base16-ocean.dark";

pub struct SyntaxHighlighter {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
    style_map: StyleMap,
}

impl SyntaxHighlighter {
    pub fn new(font: Font, font_size: i32) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: DEFAULT_THEME.to_string(),
            style_map: StyleMap::new(font, font_size),
        }
    }

    /// Switch theme. Unknown names are ignored.
    pub fn set_theme(&mut self, name: &str) -> bool {
        if !self.theme_set.themes.contains_key(name) {
            tracing::warn!("Unknown syntax theme: {}", name);
            return false;
        }
        self.theme_name = name.to_string();
        self.style_map.clear();
        true
    }

    /// Pick the light or dark syntax theme and a readable plain text color.
    pub fn set_dark_mode(&mut self, is_dark: bool) {
        let (theme, plain) = if is_dark {
            (DARK_THEME, Color::from_rgb(220, 220, 220))
        } else {
            (DEFAULT_THEME, Color::Foreground)
        };
        self.set_theme(theme);
        self.style_map.set_plain_color(plain);
    }

    pub fn style_table(&self) -> Vec<StyleTableEntry> {
        self.style_map.entries().to_vec()
    }

    /// Style string for `text`, exactly `text.len()` characters long.
    pub fn highlight(&mut self, kind: FileKind, text: &str) -> String {
        let Some(syntax) = self.syntax_set.find_syntax_by_name(kind.syntax_name()) else {
            return plain_style(text);
        };
        let Some(theme) = self.theme_set.themes.get(&self.theme_name) else {
            return plain_style(text);
        };

        let mut lines = HighlightLines::new(syntax, theme);
        let mut style_string = String::with_capacity(text.len());
        for line in LinesWithEndings::new(text) {
            match lines.highlight_line(line, &self.syntax_set) {
                Ok(ranges) => {
                    for (style, piece) in ranges {
                        let ch = self.style_map.get_or_insert(style.foreground);
                        // one char per byte, FLTK indexes styles by byte
                        style_string.extend(std::iter::repeat_n(ch, piece.len()));
                    }
                }
                Err(e) => {
                    tracing::debug!("Highlight failed for {}: {}", kind, e);
                    style_string.extend(std::iter::repeat_n('A', line.len()));
                }
            }
        }
        style_string
    }
}

pub fn plain_style(text: &str) -> String {
    std::iter::repeat_n('A', text.len()).collect()
}

struct LinesWithEndings<'a> {
    text: &'a str,
}

impl<'a> LinesWithEndings<'a> {
    fn new(text: &'a str) -> Self {
        Self { text }
    }
}

impl<'a> Iterator for LinesWithEndings<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.text.is_empty() {
            return None;
        }
        let end = self.text.find('\n').map(|i| i + 1).unwrap_or(self.text.len());
        let line = &self.text[..end];
        self.text = &self.text[end..];
        Some(line)
    }
}
