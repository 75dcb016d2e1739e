use std::collections::HashMap;

use fltk::enums::{Color, Font};
use fltk::text::StyleTableEntry;
use syntect::highlighting::Color as SyntectColor;

/// Maps syntect RGB colors to FLTK style characters ('A', 'B', 'C', ...).
/// The table grows as new colors are encountered.
pub struct StyleMap {
    color_to_char: HashMap<(u8, u8, u8), char>,
    entries: Vec<StyleTableEntry>,
    font: Font,
    font_size: i32,
    plain: Color,
}

impl StyleMap {
    pub fn new(font: Font, font_size: i32) -> Self {
        let mut map = Self {
            color_to_char: HashMap::new(),
            entries: Vec::new(),
            font,
            font_size,
            plain: Color::Foreground,
        };
        map.insert_plain();
        map
    }

    // 'A' is the plain text style
    fn insert_plain(&mut self) {
        self.entries.push(StyleTableEntry {
            color: self.plain,
            font: self.font,
            size: self.font_size,
        });
        self.color_to_char.insert((0, 0, 0), 'A');
    }

    pub fn get_or_insert(&mut self, color: SyntectColor) -> char {
        let key = (color.r, color.g, color.b);
        if let Some(&ch) = self.color_to_char.get(&key) {
            return ch;
        }

        let idx = self.entries.len();
        if idx >= 26 {
            return 'Z';
        }
        let ch = (b'A' + idx as u8) as char;
        self.entries.push(StyleTableEntry {
            color: Color::from_rgb(color.r, color.g, color.b),
            font: self.font,
            size: self.font_size,
        });
        self.color_to_char.insert(key, ch);
        ch
    }

    pub fn entries(&self) -> &[StyleTableEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.color_to_char.clear();
        self.entries.clear();
        self.insert_plain();
    }

    /// Color of style 'A', used for text the theme leaves uncolored.
    pub fn set_plain_color(&mut self, color: Color) {
        self.plain = color;
        if let Some(entry) = self.entries.first_mut() {
            entry.color = color;
        }
    }
}
