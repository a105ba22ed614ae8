//! EPUB container reading: ZIP archive, container.xml, OPF, spine.
//!
//! The happy path follows the standard container layout: container.xml points
//! at the OPF, the OPF lists metadata plus a manifest, and the spine orders
//! chapter documents. Books with a broken container fall back to collecting
//! every HTML-ish entry in name order, so a damaged EPUB still opens.

use crate::book::{Book, BookFormat, Chapter};
use crate::error::{Error, Result};
use crate::markup;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use zip::ZipArchive;

/// Parsed OPF content.
struct OpfData {
    title: Option<String>,
    author: Option<String>,
    language: Option<String>,
    /// Maps manifest id -> href.
    manifest: HashMap<String, String>,
    spine_ids: Vec<String>,
}

/// Reads an EPUB file into a [`Book`].
///
/// # Errors
///
/// Returns an error when the file cannot be opened as a ZIP archive or when
/// no chapter content can be found at all.
pub fn read_epub(path: &Path) -> Result<Book> {
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(file)?;

    let mut book = Book {
        path: path.to_path_buf(),
        title: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        author: String::new(),
        format: BookFormat::Epub,
        chapters: Vec::new(),
        metadata: HashMap::new(),
    };

    let Ok(opf_path) = find_opf_path(&mut archive) else {
        return read_fallback(&mut archive, book);
    };

    let Ok(opf) = read_opf(&mut archive, &opf_path) else {
        return read_fallback(&mut archive, book);
    };

    if let Some(title) = opf.title {
        book.title = title;
    }
    if let Some(author) = opf.author {
        book.author = author;
    }
    if let Some(language) = opf.language {
        book.metadata.insert("language".to_string(), language);
    }

    let opf_dir = Path::new(&opf_path)
        .parent()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default();

    for (i, idref) in opf.spine_ids.iter().enumerate() {
        let Some(href) = opf.manifest.get(idref) else {
            continue;
        };
        let content_path = resolve_path(&opf_dir, href);

        let Ok(content) = read_archive_file(&mut archive, &content_path) else {
            continue;
        };
        if content.trim().is_empty() {
            continue;
        }

        let title = match extract_title(&content) {
            Some(title) => title,
            None => format!("Chapter {}", i + 1),
        };

        book.chapters.push(Chapter {
            title,
            content,
            order: i,
        });
    }

    if book.chapters.is_empty() {
        return Err(Error::InvalidEpub("no chapters found".to_string()));
    }

    Ok(book)
}

/// Broken-container fallback: every `.html`/`.xhtml`/`.htm` entry with real
/// content, in archive-name order.
fn read_fallback<R: Read + Seek>(archive: &mut ZipArchive<R>, mut book: Book) -> Result<Book> {
    let mut names: Vec<String> = archive
        .file_names()
        .filter(|name| {
            let lower = name.to_ascii_lowercase();
            lower.ends_with(".html") || lower.ends_with(".xhtml") || lower.ends_with(".htm")
        })
        .map(ToString::to_string)
        .collect();
    names.sort();

    for name in names {
        let Ok(content) = read_archive_file(archive, &name) else {
            continue;
        };
        if content.trim().is_empty() || content.len() <= 100 {
            continue;
        }

        let title = Path::new(&name)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| name.clone());
        let order = book.chapters.len();
        book.chapters.push(Chapter {
            title,
            content,
            order,
        });
    }

    if book.chapters.is_empty() {
        return Err(Error::InvalidEpub("no chapters found".to_string()));
    }

    Ok(book)
}

/// Finds the OPF path from META-INF/container.xml.
fn find_opf_path<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<String> {
    let content = read_archive_file(archive, "META-INF/container.xml")?;

    let mut reader = Reader::from_str(&content);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(e) | Event::Start(e)) if local_name(e.name().as_ref()) == "rootfile" => {
                for attr in e.attributes().flatten() {
                    if attr.key.as_ref() == b"full-path" {
                        return Ok(String::from_utf8_lossy(&attr.value).into_owned());
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            Ok(_) => {}
        }
    }

    Err(Error::InvalidEpub(
        "no rootfile in container.xml".to_string(),
    ))
}

fn read_opf<R: Read + Seek>(archive: &mut ZipArchive<R>, opf_path: &str) -> Result<OpfData> {
    let content = read_archive_file(archive, opf_path)?;
    parse_opf(&content)
}

/// Parses the OPF package document: dc metadata, manifest items, spine order.
fn parse_opf(content: &str) -> Result<OpfData> {
    let mut reader = Reader::from_str(content);

    let mut opf = OpfData {
        title: None,
        author: None,
        language: None,
        manifest: HashMap::new(),
        spine_ids: Vec::new(),
    };

    let mut current_element: Option<String> = None;
    let mut text_buf = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match local_name(e.name().as_ref()).as_str() {
                name @ ("title" | "creator" | "language") => {
                    current_element = Some(name.to_string());
                    text_buf.clear();
                }
                "item" => collect_manifest_item(&e, &mut opf.manifest),
                "itemref" => collect_spine_ref(&e, &mut opf.spine_ids),
                _ => {}
            },
            Ok(Event::Empty(e)) => match local_name(e.name().as_ref()).as_str() {
                "item" => collect_manifest_item(&e, &mut opf.manifest),
                "itemref" => collect_spine_ref(&e, &mut opf.spine_ids),
                _ => {}
            },
            Ok(Event::Text(t)) => {
                if current_element.is_some() {
                    text_buf.push_str(&String::from_utf8_lossy(t.as_ref()));
                }
            }
            Ok(Event::GeneralRef(e)) => {
                if current_element.is_some() {
                    let resolved = match e.resolve_char_ref() {
                        Ok(Some(c)) => c.to_string(),
                        _ => markup::resolve_entity(&String::from_utf8_lossy(e.as_ref())),
                    };
                    text_buf.push_str(&resolved);
                }
            }
            Ok(Event::End(e)) => {
                let name = local_name(e.name().as_ref());
                if current_element.as_deref() == Some(name.as_str()) {
                    let value = text_buf.trim().to_string();
                    if !value.is_empty() {
                        // First occurrence wins: multiple dc:creator entries
                        // are common, the primary one comes first.
                        let slot = match name.as_str() {
                            "title" => &mut opf.title,
                            "creator" => &mut opf.author,
                            _ => &mut opf.language,
                        };
                        if slot.is_none() {
                            *slot = Some(value);
                        }
                    }
                    current_element = None;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            Ok(_) => {}
        }
    }

    Ok(opf)
}

fn collect_manifest_item(e: &quick_xml::events::BytesStart<'_>, manifest: &mut HashMap<String, String>) {
    let mut id = None;
    let mut href = None;
    for attr in e.attributes().flatten() {
        match attr.key.as_ref() {
            b"id" => id = Some(String::from_utf8_lossy(&attr.value).into_owned()),
            b"href" => href = Some(String::from_utf8_lossy(&attr.value).into_owned()),
            _ => {}
        }
    }
    if let (Some(id), Some(href)) = (id, href) {
        manifest.insert(id, href);
    }
}

fn collect_spine_ref(e: &quick_xml::events::BytesStart<'_>, spine_ids: &mut Vec<String>) {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == b"idref" {
            spine_ids.push(String::from_utf8_lossy(&attr.value).into_owned());
        }
    }
}

/// Reads one archive entry as (lossy) UTF-8, matching paths after
/// normalization so OPF-relative `..` segments resolve.
fn read_archive_file<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> Result<String> {
    let wanted = normalize_path(path);
    let name = archive
        .file_names()
        .find(|n| normalize_path(n) == wanted)
        .map(ToString::to_string)
        .ok_or_else(|| Error::InvalidEpub(format!("file not found in archive: {path}")))?;

    let mut file = archive.by_name(&name)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Joins an href onto the OPF directory and normalizes the result.
fn resolve_path(opf_dir: &str, href: &str) -> String {
    if opf_dir.is_empty() {
        normalize_path(href)
    } else {
        normalize_path(&format!("{opf_dir}/{href}"))
    }
}

fn normalize_path(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            _ => parts.push(part),
        }
    }
    parts.join("/")
}

fn local_name(raw: &[u8]) -> String {
    let name = String::from_utf8_lossy(raw).to_ascii_lowercase();
    match name.rsplit_once(':') {
        Some((_, local)) => local.to_string(),
        None => name,
    }
}

/// Extracts a chapter title from its markup: `<title>` first, then the first
/// `<h1>`.
fn extract_title(content: &str) -> Option<String> {
    if let Some(start) = content.find("<title>") {
        let rest = &content[start + "<title>".len()..];
        if let Some(end) = rest.find("</title>") {
            let title = rest[..end].trim();
            if !title.is_empty() {
                return Some(title.to_string());
            }
        }
    }

    if let Some(start) = content.find("<h1") {
        let rest = &content[start..];
        if let Some(open_end) = rest.find('>') {
            if let Some(close) = rest.find("</h1>") {
                if close > open_end {
                    let title = markup::strip_tags(&rest[open_end + 1..close]).trim().to_string();
                    if !title.is_empty() {
                        return Some(title);
                    }
                }
            }
        }
    }

    None
}

#[cfg(test)]
#[path = "tests/epub.rs"]
mod tests;
