//! Reading session: which chapter is open, where the viewport sits, and how
//! heading landmarks and chapter boundaries interact.
//!
//! The session owns the rendered form of exactly one chapter at a time and
//! re-renders on chapter change or width change. Scroll offsets are line
//! indices into that rendered chapter.

use crate::book::{Book, BookFormat};
use crate::progress::ProgressData;
use crate::render::{self, RenderedChapter};
use crate::theme::Theme;

/// An open book with a cursor position and a rendered current chapter.
pub struct ReaderSession {
    chapter: usize,
    offset: usize,
    width: u16,
    height: u16,
    rendered: RenderedChapter,
}

impl ReaderSession {
    /// Opens a session at the saved position for this book, or at the start
    /// when none exists. A saved chapter index past the end of the book
    /// (the file changed since last read) resets to chapter zero; a saved
    /// offset past the end of the chapter clamps to the last viewport
    /// position.
    #[must_use]
    pub fn open(
        book: &Book,
        theme: &Theme,
        progress: &ProgressData,
        width: u16,
        height: u16,
    ) -> Self {
        let (mut chapter, offset) = match progress.get(&book.key()) {
            Some(record) => (record.current_chapter, record.scroll_offset),
            None => (0, 0),
        };
        if chapter >= book.chapter_count() {
            chapter = 0;
        }

        let rendered = render_chapter(book, theme, chapter, width);
        let mut session = Self {
            chapter,
            offset,
            width,
            height,
            rendered,
        };
        session.offset = session.offset.min(session.max_offset());
        session
    }

    #[must_use]
    pub fn chapter(&self) -> usize {
        self.chapter
    }

    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[must_use]
    pub fn rendered(&self) -> &RenderedChapter {
        &self.rendered
    }

    /// Advances to the next chapter, or stays put at the last one.
    pub fn next_chapter(&mut self, book: &Book, theme: &Theme) {
        if self.chapter + 1 < book.chapter_count() {
            self.goto_chapter(book, theme, self.chapter + 1, 0);
        }
    }

    /// Steps back to the previous chapter, or stays put at the first one.
    pub fn prev_chapter(&mut self, book: &Book, theme: &Theme) {
        if self.chapter > 0 {
            self.goto_chapter(book, theme, self.chapter - 1, 0);
        }
    }

    pub fn first_chapter(&mut self, book: &Book, theme: &Theme) {
        self.goto_chapter(book, theme, 0, 0);
    }

    pub fn last_chapter(&mut self, book: &Book, theme: &Theme) {
        let last = book.chapter_count().saturating_sub(1);
        self.goto_chapter(book, theme, last, 0);
    }

    /// Jumps to the first heading landmark strictly below the current
    /// offset. With no landmark left in this chapter, falls through to the
    /// top of the next chapter; at the end of the book it does nothing.
    pub fn next_heading(&mut self, book: &Book, theme: &Theme) {
        let next = self
            .rendered
            .heading_anchors
            .iter()
            .find(|&&anchor| anchor > self.offset)
            .copied();
        match next {
            Some(anchor) => self.offset = anchor,
            None => self.next_chapter(book, theme),
        }
    }

    /// Jumps to the last heading landmark strictly above the current
    /// offset. With no landmark left in this chapter, falls through to the
    /// previous chapter and lands on its last landmark (or its top when it
    /// has none); at the start of the book it does nothing.
    pub fn prev_heading(&mut self, book: &Book, theme: &Theme) {
        let prev = self
            .rendered
            .heading_anchors
            .iter()
            .rev()
            .find(|&&anchor| anchor < self.offset)
            .copied();
        match prev {
            Some(anchor) => self.offset = anchor,
            None => {
                if self.chapter > 0 {
                    self.goto_chapter(book, theme, self.chapter - 1, 0);
                    if let Some(&last) = self.rendered.heading_anchors.last() {
                        self.offset = last;
                    }
                }
            }
        }
    }

    /// Moves the viewport by `delta` lines, clamped to the chapter.
    pub fn scroll_by(&mut self, delta: isize) {
        let offset = self.offset as isize + delta;
        self.offset = usize::try_from(offset.max(0)).unwrap_or(0).min(self.max_offset());
    }

    pub fn scroll_to_top(&mut self) {
        self.offset = 0;
    }

    pub fn half_page_down(&mut self) {
        self.scroll_by(self.half_page() as isize);
    }

    pub fn half_page_up(&mut self) {
        self.scroll_by(-(self.half_page() as isize));
    }

    /// Scroll position within the chapter as a whole percentage. A chapter
    /// that fits in the viewport is always at 100.
    #[must_use]
    pub fn scroll_percent(&self) -> usize {
        let max = self.max_offset();
        if max == 0 {
            return 100;
        }
        self.offset * 100 / max
    }

    /// Adopts a new terminal size, re-rendering only on width change, and
    /// keeps the offset within the (possibly shorter) chapter.
    pub fn set_size(&mut self, book: &Book, theme: &Theme, width: u16, height: u16) {
        self.height = height;
        if width != self.width {
            self.width = width;
            self.rendered = render_chapter(book, theme, self.chapter, width);
        }
        self.offset = self.offset.min(self.max_offset());
    }

    fn goto_chapter(&mut self, book: &Book, theme: &Theme, chapter: usize, offset: usize) {
        self.chapter = chapter;
        self.offset = offset;
        self.rendered = render_chapter(book, theme, chapter, self.width);
    }

    fn max_offset(&self) -> usize {
        let viewport = usize::from(self.height.max(1));
        self.rendered.line_count().saturating_sub(viewport)
    }

    fn half_page(&self) -> usize {
        usize::from(self.height / 2).max(1)
    }
}

/// Renders one chapter of `book` for a given content width.
#[must_use]
pub fn render_chapter(book: &Book, theme: &Theme, index: usize, width: u16) -> RenderedChapter {
    let Some(chapter) = book.chapter(index) else {
        return RenderedChapter::default();
    };
    match book.format {
        BookFormat::Epub => render::render(&chapter.content, theme, width),
        BookFormat::Text => render::render_plain(&chapter.content, theme, width),
    }
}

#[cfg(test)]
#[path = "tests/navigation.rs"]
mod tests;
