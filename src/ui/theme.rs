use fltk::{
    enums::Color,
    menu::MenuBar,
    prelude::*,
    text::TextEditor,
    tree::Tree,
    window::Window,
};

/// Colors shared by the editors, the file tree and the window chrome.
#[derive(Debug, Clone, Copy)]
struct Palette {
    background: Color,
    text: Color,
    cursor: Color,
    selection: Color,
    gutter_bg: Color,
    gutter_fg: Color,
    chrome: Color,
    menu: Color,
    menu_hover: Color,
    sidebar: Color,
}

fn palette(is_dark: bool) -> Palette {
    if is_dark {
        Palette {
            background: Color::from_rgb(30, 30, 30),
            text: Color::from_rgb(220, 220, 220),
            cursor: Color::from_rgb(255, 255, 255),
            selection: Color::from_rgb(70, 70, 100),
            gutter_bg: Color::from_rgb(40, 40, 40),
            gutter_fg: Color::from_rgb(150, 150, 150),
            chrome: Color::from_rgb(25, 25, 25),
            menu: Color::from_rgb(35, 35, 35),
            menu_hover: Color::from_rgb(60, 60, 60),
            sidebar: Color::from_rgb(35, 35, 35),
        }
    } else {
        Palette {
            background: Color::White,
            text: Color::Black,
            cursor: Color::Black,
            selection: Color::from_rgb(173, 216, 230),
            gutter_bg: Color::from_rgb(240, 240, 240),
            gutter_fg: Color::from_rgb(100, 100, 100),
            chrome: Color::from_rgb(240, 240, 240),
            menu: Color::from_rgb(240, 240, 240),
            menu_hover: Color::from_rgb(200, 200, 200),
            sidebar: Color::from_rgb(248, 248, 248),
        }
    }
}

pub fn apply_theme(window: &mut Window, menu: &mut MenuBar, tree: &mut Tree, is_dark: bool) {
    let p = palette(is_dark);

    window.set_color(p.chrome);
    window.set_label_color(p.text);
    menu.set_color(p.menu);
    menu.set_text_color(p.text);
    menu.set_selection_color(p.menu_hover); // Hover color
    tree.set_color(p.sidebar);
    tree.set_item_label_fgcolor(p.text);
    tree.set_selection_color(p.selection);

    window.redraw();
    menu.redraw();
    tree.redraw();
}

pub fn apply_editor_theme(editor: &mut TextEditor, is_dark: bool) {
    let p = palette(is_dark);

    editor.set_color(p.background);
    editor.set_text_color(p.text);
    editor.set_cursor_color(p.cursor);
    editor.set_selection_color(p.selection);
    editor.set_linenumber_bgcolor(p.gutter_bg);
    editor.set_linenumber_fgcolor(p.gutter_fg);
    editor.redraw();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dark_palette_is_dark() {
        let p = palette(true);
        assert_eq!(p.background.to_rgb(), (30, 30, 30));
        assert_eq!(p.text.to_rgb(), (220, 220, 220));
        assert_eq!(p.chrome.to_rgb(), (25, 25, 25));
    }

    #[test]
    fn test_light_palette_keeps_text_readable() {
        let p = palette(false);
        let (r, g, b) = p.background.to_rgb();
        let (tr, tg, tb) = p.text.to_rgb();
        assert!(r as u32 + g as u32 + b as u32 > tr as u32 + tg as u32 + tb as u32);
    }
}
