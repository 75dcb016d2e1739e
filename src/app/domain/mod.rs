//! Domain layer - core data structures and types.
//!
//! This module contains the fundamental domain models:
//! - File kinds and keys
//! - The project store
//! - Application settings
//! - Message types for the event system

pub mod file_kind;
pub mod messages;
pub mod project;
pub mod settings;

pub use file_kind::{FileKey, FileKind};
pub use messages::Message;
pub use project::ProjectStore;
pub use settings::AppSettings;
