use std::cell::Cell;
use std::rc::Rc;

use fltk::{enums::Color, frame::Frame, prelude::*};

use crate::app::services::notify::{LogNotifier, Notifier, Severity};

/// Seconds a notification stays visible.
pub const NOTIFICATION_SECS: f64 = 5.0;

/// Shows notifications in a status frame and hides them again after
/// `NOTIFICATION_SECS`. A newer message restarts the countdown.
pub struct StatusNotifier {
    frame: Frame,
    generation: Rc<Cell<u64>>,
    log: LogNotifier,
}

impl StatusNotifier {
    pub fn new(frame: Frame) -> Self {
        Self {
            frame,
            generation: Rc::new(Cell::new(0)),
            log: LogNotifier,
        }
    }
}

fn severity_colors(severity: Severity) -> (Color, Color) {
    match severity {
        Severity::Info => (Color::from_rgb(227, 238, 250), Color::from_rgb(20, 60, 110)),
        Severity::Success => (Color::from_rgb(220, 245, 225), Color::from_rgb(20, 90, 40)),
        Severity::Warning => (Color::from_rgb(255, 250, 205), Color::from_rgb(110, 80, 0)),
        Severity::Error => (Color::from_rgb(253, 226, 226), Color::from_rgb(150, 20, 20)),
    }
}

impl Notifier for StatusNotifier {
    fn notify(&mut self, message: &str, severity: Severity) {
        self.log.notify(message, severity);

        let (bg, fg) = severity_colors(severity);
        self.frame.set_color(bg);
        self.frame.set_label_color(fg);
        self.frame.set_label(&format!("  {message}"));
        self.frame.show();
        self.frame.redraw();

        let current = self.generation.get() + 1;
        self.generation.set(current);
        let generation = self.generation.clone();
        let mut frame = self.frame.clone();
        fltk::app::add_timeout3(NOTIFICATION_SECS, move |_| {
            if generation.get() == current {
                frame.set_label("");
                frame.set_color(Color::Background);
                frame.redraw();
            }
        });
    }
}
