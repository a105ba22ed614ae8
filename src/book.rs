//! Books and chapters, plus the library scan that finds them.
//!
//! A book is an ordered sequence of chapters with some metadata. Format
//! dispatch happens on file extension: `.epub` goes through the container
//! reader, `.txt` becomes a single-chapter book whose content is never parsed
//! as markup.

use crate::epub;
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Supported book formats.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BookFormat {
    /// EPUB container with XHTML chapters.
    Epub,
    /// Plain text, one chapter per file.
    Text,
}

/// One ordered unit of book content. Immutable once the book is opened.
#[derive(Clone, Debug)]
pub struct Chapter {
    /// Display title for the chapter.
    pub title: String,
    /// Raw chapter markup (EPUB) or raw text (plain-text books).
    pub content: String,
    /// Position in the book, a display aid only.
    pub order: usize,
}

/// An opened book. Chapters keep the order fixed by the source.
#[derive(Clone, Debug)]
pub struct Book {
    /// Source file path.
    pub path: PathBuf,
    /// Book title from metadata, or the file name.
    pub title: String,
    /// Author from metadata, empty when unknown.
    pub author: String,
    /// Which reader produced this book.
    pub format: BookFormat,
    /// Chapters in source order.
    pub chapters: Vec<Chapter>,
    /// Remaining metadata (language and friends).
    pub metadata: HashMap<String, String>,
}

impl Book {
    /// Opens a book file, dispatching on its extension.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedFormat`] for unknown extensions and the
    /// underlying error when the file cannot be read.
    pub fn open(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();

        let mut book = match ext.as_str() {
            "epub" => {
                let mut book = epub::read_epub(path)?;
                book.format = BookFormat::Epub;
                book
            }
            "txt" => read_text_book(path)?,
            _ => return Err(Error::UnsupportedFormat(ext)),
        };

        book.path = path.to_path_buf();
        Ok(book)
    }

    #[must_use]
    /// The chapter at `index`, or `None` when out of range.
    pub fn chapter(&self, index: usize) -> Option<&Chapter> {
        self.chapters.get(index)
    }

    #[must_use]
    /// Number of chapters.
    pub fn chapter_count(&self) -> usize {
        self.chapters.len()
    }

    #[must_use]
    /// Stable identifier used to key reading progress.
    pub fn key(&self) -> String {
        book_key(&self.path)
    }
}

#[must_use]
/// Stable progress key for a book file: the canonical path when resolvable,
/// the literal path otherwise.
pub fn book_key(path: &Path) -> String {
    fs::canonicalize(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .to_string_lossy()
        .into_owned()
}

/// Basic book information for library display.
#[derive(Clone, Debug)]
pub struct BookInfo {
    /// Source file path.
    pub path: PathBuf,
    /// Title from metadata, or the file stem.
    pub title: String,
    /// Author, empty when unknown.
    pub author: String,
    /// Folder names relative to the library root, shown as tags.
    pub tags: Vec<String>,
    /// Chapter count, used to compute completion percentages.
    pub chapter_count: usize,
}

/// Reads a plain text file as a single-chapter book.
fn read_text_book(path: &Path) -> Result<Book> {
    let content = fs::read_to_string(path)?;
    let title = file_stem(path);

    Ok(Book {
        path: path.to_path_buf(),
        title: title.clone(),
        author: String::new(),
        format: BookFormat::Text,
        chapters: vec![Chapter {
            title,
            content,
            order: 0,
        }],
        metadata: HashMap::new(),
    })
}

/// Walks the library directory for supported books, collecting display
/// metadata. Files that fail to open still appear, titled by file stem.
///
/// # Errors
///
/// Returns an error when the library root itself cannot be walked.
pub fn scan_library(dir: &Path) -> Result<Vec<BookInfo>> {
    let mut books = Vec::new();

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::Io(e.into()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        if ext != "epub" && ext != "txt" {
            continue;
        }

        let mut info = BookInfo {
            path: path.to_path_buf(),
            title: file_stem(path),
            author: String::new(),
            tags: extract_tags(path, dir),
            chapter_count: 0,
        };

        if let Ok(book) = Book::open(path) {
            info.chapter_count = book.chapter_count();
            if !book.title.is_empty() {
                info.title = book.title;
            }
            info.author = book.author;
        }

        books.push(info);
    }

    Ok(books)
}

/// Folder names between the library root and the book become tags.
fn extract_tags(book_path: &Path, library_root: &Path) -> Vec<String> {
    let Ok(relative) = book_path.strip_prefix(library_root) else {
        return Vec::new();
    };

    let Some(dir) = relative.parent() else {
        return Vec::new();
    };

    dir.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .filter(|part| !part.is_empty() && part != ".")
        .collect()
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "tests/book.rs"]
mod tests;
