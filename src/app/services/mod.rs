//! Services layer - business operations and utilities.
//!
//! - Snapshot persistence with sliding expiry
//! - Abbreviation expansion and code formatting
//! - Project export
//! - User notifications
//! - Syntax highlighting

pub mod abbreviations;
pub mod export;
pub mod notify;
pub mod persistence;
pub mod syntax;
pub mod text_ops;
