use std::cell::RefCell;
use std::rc::Rc;

use fltk::{
    button::Button,
    enums::CallbackTrigger,
    frame::Frame,
    input::Input,
    menu::Choice,
    prelude::*,
    window::Window,
};

use super::run_dialog;
use crate::app::domain::FileKind;

const KIND_CHOICES: &str = "From extension|HTML|CSS|JavaScript";

fn kind_for_choice(index: i32) -> Option<FileKind> {
    match index {
        1 => Some(FileKind::Markup),
        2 => Some(FileKind::Style),
        3 => Some(FileKind::Script),
        _ => None,
    }
}

/// Ask for a new file name and, optionally, its kind.
///
/// `folder` only changes the title. Returns `None` when cancelled.
pub fn show_new_file_dialog(folder: Option<&str>) -> Option<(String, Option<FileKind>)> {
    let title = match folder {
        Some(folder) => format!("New File in {folder}"),
        None => "New File".to_string(),
    };
    let mut dialog_win = Window::default()
        .with_size(320, 150)
        .with_label(&title)
        .center_screen();
    dialog_win.make_modal(true);

    Frame::default().with_pos(20, 20).with_size(80, 30).with_label("Name:");
    let mut name_input = Input::default().with_pos(100, 20).with_size(200, 30);
    Frame::default().with_pos(20, 60).with_size(80, 30).with_label("Type:");
    let mut kind_choice = Choice::default().with_pos(100, 60).with_size(200, 30);
    kind_choice.add_choice(KIND_CHOICES);
    kind_choice.set_value(0);

    let mut create_btn = Button::default()
        .with_pos(120, 105).with_size(85, 30).with_label("Create");
    let mut cancel_btn = Button::default()
        .with_pos(215, 105).with_size(85, 30).with_label("Cancel");

    dialog_win.end();
    dialog_win.make_resizable(false);
    dialog_win.show();
    let _ = name_input.take_focus();

    let result: Rc<RefCell<Option<(String, Option<FileKind>)>>> = Rc::new(RefCell::new(None));

    let result_create = result.clone();
    let dialog_create = dialog_win.clone();
    let name_create = name_input.clone();
    let kind_create = kind_choice.clone();
    create_btn.set_callback(move |_| {
        let name = name_create.value();
        *result_create.borrow_mut() = Some((name, kind_for_choice(kind_create.value())));
        dialog_create.clone().hide();
    });

    // Enter key on input triggers Create
    let mut create_btn2 = create_btn.clone();
    name_input.set_trigger(CallbackTrigger::EnterKey);
    name_input.set_callback(move |_| {
        create_btn2.do_callback();
    });

    let dialog_close = dialog_win.clone();
    cancel_btn.set_callback(move |_| {
        dialog_close.clone().hide();
    });

    run_dialog(&dialog_win);
    result.borrow_mut().take()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_choices_line_up() {
        assert_eq!(KIND_CHOICES.split('|').count(), 4);
        assert_eq!(kind_for_choice(0), None);
        assert_eq!(kind_for_choice(1), Some(FileKind::Markup));
        assert_eq!(kind_for_choice(2), Some(FileKind::Style));
        assert_eq!(kind_for_choice(3), Some(FileKind::Script));
    }
}
