//! Infrastructure layer - external integrations and utilities.
//!
//! - Error types
//! - Key-value snapshot stores (memory and file backed)
//! - Preview and download sinks
//! - FLTK editing surfaces and the status-bar notifier

pub mod error;
pub mod fltk_surface;
pub mod sinks;
pub mod status_notifier;
pub mod storage;
