use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// Transient, auto-dismissing user messages.
pub trait Notifier {
    fn notify(&mut self, message: &str, severity: Severity);
}

/// Writes notifications to the log only.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&mut self, message: &str, severity: Severity) {
        match severity {
            Severity::Error => tracing::error!("{}", message),
            Severity::Warning => tracing::warn!("{}", message),
            Severity::Info | Severity::Success => tracing::info!("{}", message),
        }
    }
}

/// Keeps every notification; clones share the list.
#[derive(Clone, Default)]
pub struct RecordingNotifier(Rc<RefCell<Vec<(String, Severity)>>>);

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<(String, Severity)> {
        self.0.borrow().clone()
    }

    pub fn last(&self) -> Option<(String, Severity)> {
        self.0.borrow().last().cloned()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&mut self, message: &str, severity: Severity) {
        self.0.borrow_mut().push((message.to_string(), severity));
    }
}
