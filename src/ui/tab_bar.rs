use std::cell::RefCell;
use std::rc::Rc;

use fltk::{
    app::Sender,
    draw,
    enums::{Align, Color, Event, Font},
    prelude::*,
    widget::Widget,
};

use crate::app::domain::{FileKey, Message};

pub const TAB_BAR_HEIGHT: i32 = 30;

const MIN_TAB_WIDTH: i32 = 60;
const MAX_TAB_WIDTH: i32 = 200;
const CLOSE_BTN_SIZE: i32 = 14;
const CLOSE_BTN_MARGIN: i32 = 6;
const TAB_H_PADDING: i32 = 10;
const CORNER_RADIUS: i32 = 6;
const TAB_GAP: i32 = 1;
const PLUS_BTN_WIDTH: i32 = 28;
const PLUS_BTN_MARGIN: i32 = 4;

struct TabInfo {
    key: FileKey,
    is_active: bool,
}

#[derive(Debug, Clone, PartialEq)]
enum LayoutItem {
    Tab { index: usize, x: i32, width: i32 },
    PlusButton { x: i32 },
}

#[derive(Debug, PartialEq)]
enum HitResult {
    Tab { index: usize, is_close: bool },
    PlusButton,
    None,
}

struct TabBarState {
    tabs: Vec<TabInfo>,
    layout: Vec<LayoutItem>,
    hover_tab_index: Option<usize>,
    hover_close: bool,
    hover_plus: bool,
    sender: Sender<Message>,
    widget_w: i32,
    is_dark: bool,
}

/// Custom-drawn strip of open file tabs with close buttons and a "+" button.
pub struct TabBar {
    pub widget: Widget,
    state: Rc<RefCell<TabBarState>>,
}

impl TabBar {
    pub fn new(x: i32, y: i32, w: i32, sender: Sender<Message>) -> Self {
        let state = Rc::new(RefCell::new(TabBarState {
            tabs: Vec::new(),
            layout: compute_layout(0, w),
            hover_tab_index: None,
            hover_close: false,
            hover_plus: false,
            sender,
            widget_w: w,
            is_dark: false,
        }));

        let mut widget = Widget::new(x, y, w, TAB_BAR_HEIGHT, None);

        let draw_state = state.clone();
        widget.draw(move |wid| {
            let mut st = draw_state.borrow_mut();
            if st.widget_w != wid.w() {
                st.widget_w = wid.w();
                st.layout = compute_layout(st.tabs.len(), st.widget_w);
            }
            draw_tab_bar(wid, &st);
        });

        let handle_state = state.clone();
        widget.handle(move |wid, event| handle_tab_bar(wid, event, &handle_state));

        Self { widget, state }
    }

    /// Replace the displayed tabs.
    pub fn rebuild(&mut self, tabs: &[FileKey], active: Option<&FileKey>) {
        let mut st = self.state.borrow_mut();
        st.widget_w = self.widget.w();
        st.tabs = tabs
            .iter()
            .map(|key| TabInfo {
                key: key.clone(),
                is_active: active == Some(key),
            })
            .collect();
        st.hover_tab_index = None;
        st.hover_close = false;
        st.layout = compute_layout(st.tabs.len(), st.widget_w);
        drop(st);
        self.widget.redraw();
    }

    pub fn set_dark_mode(&mut self, is_dark: bool) {
        self.state.borrow_mut().is_dark = is_dark;
        self.widget.redraw();
    }
}

// --- Layout computation ---

fn compute_layout(tab_count: usize, widget_w: i32) -> Vec<LayoutItem> {
    if tab_count == 0 {
        return vec![LayoutItem::PlusButton { x: PLUS_BTN_MARGIN }];
    }

    let count = tab_count as i32;
    let fixed_width = PLUS_BTN_WIDTH + PLUS_BTN_MARGIN + TAB_GAP * (count - 1);
    let tab_width = ((widget_w - fixed_width) / count).clamp(MIN_TAB_WIDTH, MAX_TAB_WIDTH);

    let mut items = Vec::with_capacity(tab_count + 1);
    let mut cursor_x = 0;
    for index in 0..tab_count {
        items.push(LayoutItem::Tab {
            index,
            x: cursor_x,
            width: tab_width,
        });
        cursor_x += tab_width + TAB_GAP;
    }
    items.push(LayoutItem::PlusButton {
        x: cursor_x + PLUS_BTN_MARGIN,
    });
    items
}

// --- Hit-testing ---

fn hit_test_layout(items: &[LayoutItem], wy: i32, mx: i32, my: i32) -> HitResult {
    if my < wy || my >= wy + TAB_BAR_HEIGHT {
        return HitResult::None;
    }

    for item in items {
        match item {
            LayoutItem::Tab { index, x, width } => {
                if mx >= *x && mx < *x + *width {
                    let close_x = *x + *width - CLOSE_BTN_MARGIN - CLOSE_BTN_SIZE;
                    let close_y = wy + (TAB_BAR_HEIGHT - CLOSE_BTN_SIZE) / 2;
                    let is_close = mx >= close_x
                        && mx <= close_x + CLOSE_BTN_SIZE
                        && my >= close_y
                        && my <= close_y + CLOSE_BTN_SIZE;
                    return HitResult::Tab {
                        index: *index,
                        is_close,
                    };
                }
            }
            LayoutItem::PlusButton { x } => {
                if mx >= *x && mx < *x + PLUS_BTN_WIDTH {
                    return HitResult::PlusButton;
                }
            }
        }
    }
    HitResult::None
}

// --- Drawing ---

struct TabColors {
    bar_bg: Color,
    active_bg: Color,
    inactive_bg: Color,
    active_text: Color,
    inactive_text: Color,
    close_hover_bg: Color,
}

fn theme_colors(is_dark: bool) -> TabColors {
    if is_dark {
        TabColors {
            bar_bg: Color::from_rgb(25, 25, 25),
            active_bg: Color::from_rgb(50, 50, 50),
            inactive_bg: Color::from_rgb(35, 35, 35),
            active_text: Color::from_rgb(230, 230, 230),
            inactive_text: Color::from_rgb(140, 140, 140),
            close_hover_bg: Color::from_rgb(70, 70, 70),
        }
    } else {
        TabColors {
            bar_bg: Color::from_rgb(200, 200, 200),
            active_bg: Color::from_rgb(255, 255, 255),
            inactive_bg: Color::from_rgb(220, 220, 220),
            active_text: Color::from_rgb(0, 0, 0),
            inactive_text: Color::from_rgb(80, 80, 80),
            close_hover_bg: Color::from_rgb(190, 190, 190),
        }
    }
}

fn truncate_to_fit(text: &str, max_width: i32) -> String {
    if max_width <= 0 {
        return String::new();
    }
    draw::set_font(Font::Helvetica, 12);
    let (tw, _) = draw::measure(text, true);
    if tw <= max_width {
        return text.to_string();
    }

    let ellipsis = "...";
    let chars: Vec<char> = text.chars().collect();
    for len in (1..chars.len()).rev() {
        let candidate: String = chars[..len].iter().collect();
        let full = format!("{candidate}{ellipsis}");
        let (fw, _) = draw::measure(&full, true);
        if fw <= max_width {
            return full;
        }
    }
    ellipsis.to_string()
}

fn draw_rounded_top_rect(x: i32, y: i32, w: i32, h: i32, r: i32, color: Color) {
    draw::set_draw_color(color);
    draw::draw_rectf(x, y + r, w, h - r);
    draw::draw_rectf(x + r, y, w - 2 * r, r);
    draw::draw_pie(x, y, 2 * r, 2 * r, 90.0, 180.0);
    draw::draw_pie(x + w - 2 * r, y, 2 * r, 2 * r, 0.0, 90.0);
}

fn draw_tab_bar(wid: &Widget, st: &TabBarState) {
    let wx = wid.x();
    let wy = wid.y();
    let wh = wid.h();
    let colors = theme_colors(st.is_dark);

    draw::set_draw_color(colors.bar_bg);
    draw::draw_rectf(wx, wy, wid.w(), wh);

    for item in &st.layout {
        match item {
            LayoutItem::Tab { index, x, width } => {
                let Some(tab) = st.tabs.get(*index) else {
                    continue;
                };
                let tx = wx + *x;

                if tab.is_active {
                    draw_rounded_top_rect(tx, wy, *width, wh, CORNER_RADIUS, colors.active_bg);
                } else {
                    draw_rounded_top_rect(tx, wy + 2, *width, wh - 2, CORNER_RADIUS, colors.inactive_bg);
                }

                let text_color = if tab.is_active {
                    colors.active_text
                } else {
                    colors.inactive_text
                };
                let text_area_width =
                    *width - TAB_H_PADDING - CLOSE_BTN_MARGIN - CLOSE_BTN_SIZE - TAB_H_PADDING;
                let display_text = truncate_to_fit(&tab.key.name, text_area_width);

                draw::set_draw_color(text_color);
                draw::set_font(Font::Helvetica, 12);
                draw::draw_text(&display_text, tx + TAB_H_PADDING, wy + (wh + 12) / 2);

                let close_x = tx + *width - CLOSE_BTN_MARGIN - CLOSE_BTN_SIZE;
                let close_y = wy + (wh - CLOSE_BTN_SIZE) / 2;
                let is_hovered_tab = st.hover_tab_index == Some(*index);
                if is_hovered_tab && st.hover_close {
                    draw::set_draw_color(colors.close_hover_bg);
                    draw::draw_rectf(close_x - 2, close_y - 2, CLOSE_BTN_SIZE + 4, CLOSE_BTN_SIZE + 4);
                }
                draw::set_draw_color(text_color);
                draw::set_font(Font::HelveticaBold, 20);
                draw::draw_text2(
                    "\u{00d7}",
                    close_x,
                    close_y,
                    CLOSE_BTN_SIZE,
                    CLOSE_BTN_SIZE,
                    Align::Center,
                );
            }
            LayoutItem::PlusButton { x } => {
                let px = wx + *x;
                if st.hover_plus {
                    draw::set_draw_color(colors.close_hover_bg);
                    draw::draw_rectf(px, wy + 3, PLUS_BTN_WIDTH, wh - 6);
                }
                draw::set_draw_color(colors.active_text);
                draw::set_font(Font::HelveticaBold, 18);
                draw::draw_text2("+", px, wy, PLUS_BTN_WIDTH, wh, Align::Center);
            }
        }
    }
}

// --- Events ---

fn handle_tab_bar(wid: &mut Widget, event: Event, state: &Rc<RefCell<TabBarState>>) -> bool {
    match event {
        Event::Push => {
            let st = state.borrow();
            let mx = fltk::app::event_x() - wid.x();
            let my = fltk::app::event_y();
            let button = fltk::app::event_button();
            let sender = st.sender;

            match hit_test_layout(&st.layout, wid.y(), mx, my) {
                HitResult::PlusButton if button == 1 => {
                    drop(st);
                    sender.send(Message::NewFile);
                    true
                }
                HitResult::Tab { index, is_close } => {
                    let Some(key) = st.tabs.get(index).map(|t| t.key.clone()) else {
                        return false;
                    };
                    drop(st);
                    if button == 2 || (button == 1 && is_close) {
                        sender.send(Message::TabClosed(key));
                    } else if button == 1 {
                        sender.send(Message::TabClicked(key));
                    }
                    true
                }
                _ => false,
            }
        }
        Event::Move => {
            let mut st = state.borrow_mut();
            let mx = fltk::app::event_x() - wid.x();
            let my = fltk::app::event_y();
            let (tab, close, plus) = match hit_test_layout(&st.layout, wid.y(), mx, my) {
                HitResult::Tab { index, is_close } => (Some(index), is_close, false),
                HitResult::PlusButton => (None, false, true),
                HitResult::None => (None, false, false),
            };
            if st.hover_tab_index != tab || st.hover_close != close || st.hover_plus != plus {
                st.hover_tab_index = tab;
                st.hover_close = close;
                st.hover_plus = plus;
                drop(st);
                wid.redraw();
            }
            true
        }
        Event::Enter => true,
        Event::Leave => {
            let mut st = state.borrow_mut();
            st.hover_tab_index = None;
            st.hover_close = false;
            st.hover_plus = false;
            drop(st);
            wid.redraw();
            true
        }
        _ => false,
    }
}
