//! The core state machine bridging the book library and the reading view.
//!
//! A TUI needs a single source of truth that can be interrogated and mutated
//! as the user navigates. We keep the scanned library, the currently open
//! book with its reading session, and the progress store here, and persist
//! progress on the transitions where position can be lost (closing a book,
//! quitting).

use crate::book::{Book, BookInfo};
use crate::config::Config;
use crate::error::Result;
use crate::progress::ProgressData;
use crate::reader::ReaderSession;
use crate::theme::Theme;
use std::path::{Path, PathBuf};

#[derive(PartialEq)]
/// Determines which UI screen renders and how input is interpreted.
pub enum View {
    /// Displays the scanned library for book selection.
    Library,
    /// Shows the open book's current chapter.
    Reader,
}

/// Bridges the library and the reading session, maintaining session state.
pub struct AppState {
    /// Books found in the library directory.
    pub library: Vec<BookInfo>,
    /// Selected book in the library list.
    pub selected: usize,
    /// Active UI screen determining input handling.
    pub current_view: View,
    /// The open book, when reading.
    pub book: Option<Book>,
    /// Position and rendered chapter for the open book.
    pub session: Option<ReaderSession>,
    /// All saved reading positions.
    pub progress: ProgressData,
    /// Where progress is written.
    pub progress_path: PathBuf,
    /// Active colour palette.
    pub theme: Theme,
    /// Reading margins.
    pub config: Config,
    /// Status feedback displayed in the help bar.
    pub message: Option<String>,
    /// Last known terminal size.
    pub terminal_size: (u16, u16),
}

impl AppState {
    #[must_use]
    /// Initialises application state from a scanned library.
    pub fn new(library: Vec<BookInfo>, config: Config, theme: Theme, progress: ProgressData) -> Self {
        let progress_path = config.progress_path();
        Self {
            library,
            selected: 0,
            current_view: View::Library,
            book: None,
            session: None,
            progress,
            progress_path,
            theme,
            config,
            message: None,
            terminal_size: (80, 24),
        }
    }

    /// Opens the book at `path` and restores its saved position.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be parsed as a book.
    pub fn open_book(&mut self, path: &Path) -> Result<()> {
        let book = Book::open(path)?;
        let session = ReaderSession::open(
            &book,
            &self.theme,
            &self.progress,
            self.content_width(),
            self.content_height(),
        );
        self.book = Some(book);
        self.session = Some(session);
        self.current_view = View::Reader;
        self.message = None;
        Ok(())
    }

    /// Opens the book currently selected in the library list.
    pub fn open_selected(&mut self) {
        let Some(info) = self.library.get(self.selected) else {
            return;
        };
        let path = info.path.clone();
        if let Err(e) = self.open_book(&path) {
            self.message = Some(format!("could not open book: {e}"));
        }
    }

    /// Saves position and returns to the library.
    pub fn close_book(&mut self) {
        self.record_position();
        self.save_progress();
        self.book = None;
        self.session = None;
        self.current_view = View::Library;
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.library.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Flips the finished flag of the selected library entry and persists
    /// immediately.
    pub fn toggle_selected_finished(&mut self) {
        let Some(info) = self.library.get(self.selected) else {
            return;
        };
        let key = crate::book::book_key(&info.path);
        let finished = self.progress.get(&key).is_some_and(|p| p.finished);
        self.progress.set_finished(&key, !finished);
        self.save_progress();
    }

    /// Copies the open session's position into the progress store.
    pub fn record_position(&mut self) {
        let (Some(book), Some(session)) = (&self.book, &self.session) else {
            return;
        };
        self.progress
            .set_position(&book.key(), session.chapter(), session.offset());
    }

    /// Writes the progress store to disk, reporting failure in the help bar.
    pub fn save_progress(&mut self) {
        if let Err(e) = self.progress.save_to(&self.progress_path) {
            self.message = Some(format!("could not save progress: {e}"));
        }
    }

    /// Adopts a new terminal size, re-rendering the open chapter as needed.
    pub fn set_size(&mut self, width: u16, height: u16) {
        self.terminal_size = (width, height);
        let content_width = self.content_width();
        let content_height = self.content_height();
        if let (Some(book), Some(session)) = (&self.book, &mut self.session) {
            session.set_size(book, &self.theme, content_width, content_height);
        }
    }

    #[must_use]
    /// Columns available for chapter text after margins.
    pub fn content_width(&self) -> u16 {
        self.terminal_size
            .0
            .saturating_sub(self.config.margin_left.saturating_add(self.config.margin_right))
    }

    #[must_use]
    /// Rows available for chapter text after the header and footer chrome.
    pub fn content_height(&self) -> u16 {
        self.terminal_size.1.saturating_sub(6)
    }
}

#[cfg(test)]
#[path = "tests/app_state.rs"]
mod tests;
