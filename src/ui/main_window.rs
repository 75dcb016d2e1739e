use fltk::{
    app::Sender,
    enums::{Align, FrameType},
    frame::Frame,
    group::{Flex, FlexType},
    menu::MenuBar,
    prelude::*,
    window::Window,
};

use super::file_tree::FileTreeView;
use super::tab_bar::{TabBar, TAB_BAR_HEIGHT};
use crate::app::controllers::editing::KindSurfaces;
use crate::app::domain::{AppSettings, FileKind, Message};
use crate::app::infrastructure::fltk_surface::FltkSurface;

const MENU_HEIGHT: i32 = 30;
const TREE_WIDTH: i32 = 200;
const STATUS_HEIGHT: i32 = 24;

pub struct MainWidgets {
    pub wind: Window,
    pub menu: MenuBar,
    pub tab_bar: TabBar,
    pub body: Flex,
    pub tree: FileTreeView,
    pub surfaces: KindSurfaces<FltkSurface>,
    pub status_frame: Frame,
}

pub fn build_main_window(settings: &AppSettings, sender: &Sender<Message>) -> MainWidgets {
    let mut wind = Window::new(100, 100, 1000, 680, "\u{1f980} FerrisPlay");
    wind.set_xclass("FerrisPlay");

    let mut flex = Flex::new(0, 0, 1000, 680, None);
    flex.set_type(FlexType::Column);

    let menu = MenuBar::new(0, 0, 0, MENU_HEIGHT, "");
    flex.fixed(&menu, MENU_HEIGHT);

    let tab_bar = TabBar::new(0, MENU_HEIGHT, 1000, *sender);
    flex.fixed(&tab_bar.widget, TAB_BAR_HEIGHT);

    // Sidebar plus one editor per kind; only the active kind's editor is shown
    let mut body = Flex::default();
    body.set_type(FlexType::Row);

    let tree = FileTreeView::new(*sender);
    body.fixed(&tree.widget, TREE_WIDTH);

    let font_size = settings.font_size as i32;
    let mut surfaces = KindSurfaces::new(
        FltkSurface::new(FileKind::Markup, font_size, *sender),
        FltkSurface::new(FileKind::Style, font_size, *sender),
        FltkSurface::new(FileKind::Script, font_size, *sender),
    );
    surfaces.style.set_visible(false);
    surfaces.script.set_visible(false);

    body.end();

    let mut status_frame = Frame::default();
    status_frame.set_frame(FrameType::FlatBox);
    status_frame.set_align(Align::Left | Align::Inside);
    status_frame.set_label_size(13);
    flex.fixed(&status_frame, STATUS_HEIGHT);

    flex.end();
    wind.resizable(&flex);
    wind.end();

    MainWidgets {
        wind,
        menu,
        tab_bar,
        body,
        tree,
        surfaces,
        status_frame,
    }
}
