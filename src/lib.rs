//! ember: a cozy terminal e-book reader.
//!
//! Books are parsed into chapters, chapters are rendered into styled lines
//! with heading landmarks, and reading positions persist across sessions.

pub mod app_state;
pub mod book;
pub mod config;
pub mod epub;
pub mod error;
pub mod markup;
pub mod progress;
pub mod reader;
pub mod render;
pub mod theme;
pub mod ui;
