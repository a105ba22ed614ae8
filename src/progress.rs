//! Persistent reading positions, one record per book.
//!
//! Records live in a single `progress.json` keyed by canonical book path.
//! A missing file or missing record just means "no progress yet"; the only
//! errors surfaced here are real I/O failures on load or save.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Reading progress for one book.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct BookProgress {
    /// Stable book identifier (canonical path).
    pub book_path: String,
    /// Chapter the reader was last in.
    pub current_chapter: usize,
    /// Line offset within that chapter's rendered text.
    pub scroll_offset: usize,
    /// Marked finished by the reader; independent of position.
    #[serde(default)]
    pub finished: bool,
}

impl BookProgress {
    #[must_use]
    /// Completion percentage for library display, from the chapter fraction.
    pub fn completion(&self, chapter_count: usize) -> f64 {
        if self.finished {
            return 100.0;
        }
        if chapter_count == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let fraction = self.current_chapter as f64 / chapter_count as f64;
        fraction * 100.0
    }
}

/// All reading progress, keyed by book identifier.
#[derive(Serialize, Deserialize, Default, Clone, Debug)]
pub struct ProgressData {
    /// Per-book records; no ordering requirement.
    #[serde(default)]
    pub books: HashMap<String, BookProgress>,
}

impl ProgressData {
    /// Loads progress from `path`. A missing file is an empty store, not an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns an error when the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let data = fs::read_to_string(path)?;
        serde_json::from_str(&data).map_err(|e| Error::Store(e.to_string()))
    }

    /// Saves progress to `path`, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error when serialization or the write fails.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let data = serde_json::to_string_pretty(self).map_err(|e| Error::Store(e.to_string()))?;
        fs::write(path, data)?;
        Ok(())
    }

    #[must_use]
    /// The record for `book_key`, if any.
    pub fn get(&self, book_key: &str) -> Option<&BookProgress> {
        self.books.get(book_key)
    }

    /// Records a position, preserving the finished flag of an existing
    /// record.
    pub fn set_position(&mut self, book_key: &str, chapter: usize, offset: usize) {
        let record = self.entry(book_key);
        record.current_chapter = chapter;
        record.scroll_offset = offset;
    }

    /// Sets the finished flag without touching the position.
    pub fn set_finished(&mut self, book_key: &str, finished: bool) {
        self.entry(book_key).finished = finished;
    }

    fn entry(&mut self, book_key: &str) -> &mut BookProgress {
        self.books
            .entry(book_key.to_string())
            .or_insert_with(|| BookProgress {
                book_path: book_key.to_string(),
                current_chapter: 0,
                scroll_offset: 0,
                finished: false,
            })
    }
}

#[cfg(test)]
#[path = "tests/progress.rs"]
mod tests;
