//! FerrisPlay: a multi-file HTML/CSS/JavaScript playground.
//!
//! `app` holds the headless core and its FLTK adapters, `ui` the widget
//! builders of the desktop shell.

pub mod app;
pub mod ui;
