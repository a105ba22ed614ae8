use super::{AppState, View};
use crate::book::scan_library;
use crate::config::Config;
use crate::progress::ProgressData;
use crate::theme::Theme;
use std::fs;
use tempfile::TempDir;

fn test_config(dir: &TempDir) -> Config {
    Config {
        library_path: dir.path().join("books").to_string_lossy().into_owned(),
        theme_name: "ember-dark".to_string(),
        data_dir: dir.path().join("data").to_string_lossy().into_owned(),
        margin_left: 4,
        margin_right: 4,
    }
}

fn test_state(dir: &TempDir) -> AppState {
    let books = dir.path().join("books");
    fs::create_dir_all(&books).unwrap();
    fs::write(books.join("one.txt"), "chapter text for book one").unwrap();
    fs::write(books.join("two.txt"), "chapter text for book two").unwrap();

    let config = test_config(dir);
    let library = scan_library(&books).unwrap();
    AppState::new(library, config, Theme::default(), ProgressData::default())
}

#[test]
fn test_selection_clamps_to_library() {
    let dir = TempDir::new().unwrap();
    let mut app = test_state(&dir);
    assert_eq!(app.library.len(), 2);

    app.select_prev();
    assert_eq!(app.selected, 0);
    app.select_next();
    app.select_next();
    assert_eq!(app.selected, 1);
}

#[test]
fn test_open_and_close_round_trip_saves_position() {
    let dir = TempDir::new().unwrap();
    let mut app = test_state(&dir);
    app.set_size(80, 24);

    app.open_selected();
    assert!(app.current_view == View::Reader);
    assert!(app.book.is_some());

    let key = app.book.as_ref().unwrap().key();
    app.close_book();
    assert!(app.current_view == View::Library);
    assert!(app.book.is_none());

    // Position written through to disk.
    let saved = ProgressData::load_from(&app.progress_path).unwrap();
    assert!(saved.get(&key).is_some());
}

#[test]
fn test_open_failure_reports_instead_of_crashing() {
    let dir = TempDir::new().unwrap();
    let mut app = test_state(&dir);
    fs::write(dir.path().join("books").join("bad.epub"), "not a zip").unwrap();
    app.library = scan_library(&dir.path().join("books")).unwrap();
    app.selected = app
        .library
        .iter()
        .position(|b| b.title == "bad")
        .unwrap();

    app.open_selected();
    assert!(app.current_view == View::Library);
    assert!(app.message.is_some());
}

#[test]
fn test_toggle_finished_persists_immediately() {
    let dir = TempDir::new().unwrap();
    let mut app = test_state(&dir);
    app.toggle_selected_finished();

    let key = crate::book::book_key(&app.library[0].path);
    assert!(app.progress.get(&key).unwrap().finished);

    let saved = ProgressData::load_from(&app.progress_path).unwrap();
    assert!(saved.get(&key).unwrap().finished);

    app.toggle_selected_finished();
    assert!(!app.progress.get(&key).unwrap().finished);
}

#[test]
fn test_content_area_accounts_for_margins_and_chrome() {
    let dir = TempDir::new().unwrap();
    let mut app = test_state(&dir);
    app.set_size(100, 30);
    assert_eq!(app.content_width(), 92);
    assert_eq!(app.content_height(), 24);

    // Degenerate sizes never underflow.
    app.set_size(5, 3);
    assert_eq!(app.content_width(), 0);
    assert_eq!(app.content_height(), 0);
}

#[test]
fn test_content_width_survives_absurd_margins() {
    let dir = TempDir::new().unwrap();
    let mut app = test_state(&dir);
    app.config.margin_left = u16::MAX;
    app.config.margin_right = u16::MAX;
    app.set_size(100, 30);
    assert_eq!(app.content_width(), 0);
}
