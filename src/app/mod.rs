//! Application layer - organized by Clean Architecture principles.
//!
//! # Structure
//!
//! - `domain/` - Core data structures (FileKind, ProjectStore, Settings, Messages)
//! - `controllers/` - Orchestration (editing surfaces, tabs and tree, preview, debounce)
//! - `services/` - Business operations (persistence, abbreviations, export, syntax)
//! - `infrastructure/` - External integrations (storage, sinks, FLTK surface, error)
//! - `playground.rs` - Headless coordinator owning the project and its views
//! - `state.rs` - FLTK application state wrapping the playground

pub mod controllers;
pub mod domain;
pub mod infrastructure;
pub mod playground;
pub mod services;
pub mod state;

// Re-exports for convenient external access
pub use controllers::editing::{EditingSurface, KindSurfaces, MemorySurface};
pub use domain::{AppSettings, FileKey, FileKind, Message, ProjectStore};
pub use infrastructure::error::{AppError, Result};
pub use playground::{EditTickets, Playground, Services};
