//! Controllers layer - orchestration and coordination.
//!
//! This module contains controllers that coordinate between
//! domain models, services, and the UI:
//! - Editing surfaces and flush points
//! - Open tabs and the file tree
//! - Preview composition
//! - Debounce timers

pub mod debounce;
pub mod editing;
pub mod preview;
pub mod tabs;
