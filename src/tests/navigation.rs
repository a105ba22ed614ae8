use super::ReaderSession;
use crate::book::{Book, BookFormat, Chapter};
use crate::progress::ProgressData;
use crate::theme::Theme;
use std::collections::HashMap;

const WIDTH: u16 = 40;
const HEIGHT: u16 = 5;

fn chapter(order: usize, markup: &str) -> Chapter {
    Chapter {
        title: format!("Chapter {}", order + 1),
        content: markup.to_string(),
        order,
    }
}

fn filler() -> String {
    format!("<p>{}</p>", "lorem ipsum dolor sit amet ".repeat(8))
}

/// Two chapters, each with two h2 landmarks and enough text to scroll.
fn test_book() -> Book {
    let body = filler();
    Book {
        path: "/no/such/dir/test.epub".into(),
        title: "Test Book".to_string(),
        author: "Nobody".to_string(),
        format: BookFormat::Epub,
        chapters: vec![
            chapter(
                0,
                &format!("<h2>Alpha</h2>{body}<h2>Beta</h2>{body}"),
            ),
            chapter(
                1,
                &format!("<h2>Gamma</h2>{body}<h2>Delta</h2>{body}"),
            ),
        ],
        metadata: HashMap::new(),
    }
}

fn open_fresh(book: &Book, theme: &Theme) -> ReaderSession {
    ReaderSession::open(book, theme, &ProgressData::default(), WIDTH, HEIGHT)
}

#[test]
fn test_open_without_progress_starts_at_the_top() {
    let book = test_book();
    let theme = Theme::default();
    let session = open_fresh(&book, &theme);
    assert_eq!(session.chapter(), 0);
    assert_eq!(session.offset(), 0);
}

#[test]
fn test_chapter_navigation_clamps_at_both_ends() {
    let book = test_book();
    let theme = Theme::default();
    let mut session = open_fresh(&book, &theme);

    session.prev_chapter(&book, &theme);
    assert_eq!(session.chapter(), 0, "no wrap past the first chapter");

    session.next_chapter(&book, &theme);
    assert_eq!(session.chapter(), 1);
    session.next_chapter(&book, &theme);
    assert_eq!(session.chapter(), 1, "no wrap past the last chapter");

    session.prev_chapter(&book, &theme);
    assert_eq!(session.chapter(), 0);
}

#[test]
fn test_chapter_change_resets_offset() {
    let book = test_book();
    let theme = Theme::default();
    let mut session = open_fresh(&book, &theme);
    session.scroll_by(3);
    assert_eq!(session.offset(), 3);
    session.next_chapter(&book, &theme);
    assert_eq!(session.offset(), 0);
}

#[test]
fn test_next_heading_walks_landmarks_then_falls_through() {
    let book = test_book();
    let theme = Theme::default();
    let mut session = open_fresh(&book, &theme);
    let anchors = session.rendered().heading_anchors.clone();
    assert_eq!(anchors.len(), 2);

    session.next_heading(&book, &theme);
    assert_eq!(session.offset(), anchors[0]);
    session.next_heading(&book, &theme);
    assert_eq!(session.offset(), anchors[1]);

    // Past the last landmark: fall through to the next chapter's top.
    session.next_heading(&book, &theme);
    assert_eq!(session.chapter(), 1);
    assert_eq!(session.offset(), 0);
}

#[test]
fn test_next_heading_is_a_noop_at_the_end_of_the_book() {
    let book = test_book();
    let theme = Theme::default();
    let mut session = open_fresh(&book, &theme);
    session.last_chapter(&book, &theme);
    let last_anchor = *session.rendered().heading_anchors.last().unwrap();
    session.scroll_to_top();
    session.next_heading(&book, &theme);
    session.next_heading(&book, &theme);
    assert_eq!(session.offset(), last_anchor);

    session.next_heading(&book, &theme);
    assert_eq!(session.chapter(), 1, "stays in the last chapter");
    assert_eq!(session.offset(), last_anchor, "offset unchanged");
}

#[test]
fn test_prev_heading_lands_on_previous_chapters_last_landmark() {
    let book = test_book();
    let theme = Theme::default();
    let mut session = open_fresh(&book, &theme);
    session.next_chapter(&book, &theme);
    assert_eq!(session.offset(), 0);

    session.prev_heading(&book, &theme);
    assert_eq!(session.chapter(), 0);
    let last_anchor = *session.rendered().heading_anchors.last().unwrap();
    assert_eq!(session.offset(), last_anchor);
}

#[test]
fn test_prev_heading_is_a_noop_at_the_start_of_the_book() {
    let book = test_book();
    let theme = Theme::default();
    let mut session = open_fresh(&book, &theme);
    session.prev_heading(&book, &theme);
    assert_eq!(session.chapter(), 0);
    assert_eq!(session.offset(), 0);
}

#[test]
fn test_heading_jump_can_exceed_scroll_clamp() {
    // A landmark near the end of the chapter sits past the largest
    // scrollable offset; the jump still uses the anchor as-is.
    let markup = format!("{}<h2>Tail</h2><p>end</p>", filler());
    let book = Book {
        chapters: vec![chapter(0, &markup)],
        ..test_book()
    };
    let theme = Theme::default();
    let mut session = open_fresh(&book, &theme);
    let anchor = session.rendered().heading_anchors[0];
    let max_scroll = session.rendered().line_count() - usize::from(HEIGHT);
    assert!(anchor > max_scroll, "fixture must put the landmark past the clamp");

    session.next_heading(&book, &theme);
    assert_eq!(session.offset(), anchor);
}

#[test]
fn test_repeated_next_heading_walks_the_whole_book() {
    // Chapter one has a single landmark at the top; chapter two has none.
    let book = Book {
        chapters: vec![
            chapter(0, &format!("<h2>Intro</h2>{}", filler())),
            chapter(1, &filler()),
        ],
        ..test_book()
    };
    let theme = Theme::default();
    let mut session = open_fresh(&book, &theme);
    let intro = session.rendered().heading_anchors[0];

    session.next_heading(&book, &theme);
    assert_eq!((session.chapter(), session.offset()), (0, intro));

    session.next_heading(&book, &theme);
    assert_eq!((session.chapter(), session.offset()), (1, 0));

    session.next_heading(&book, &theme);
    assert_eq!((session.chapter(), session.offset()), (1, 0), "no-op at the end");
}

#[test]
fn test_scroll_clamps_at_both_ends() {
    let book = test_book();
    let theme = Theme::default();
    let mut session = open_fresh(&book, &theme);
    let max = session.rendered().line_count() - usize::from(HEIGHT);

    session.scroll_by(-5);
    assert_eq!(session.offset(), 0);
    session.scroll_by(10_000);
    assert_eq!(session.offset(), max);
    assert_eq!(session.scroll_percent(), 100);
}

#[test]
fn test_half_page_motion() {
    let book = test_book();
    let theme = Theme::default();
    let mut session = open_fresh(&book, &theme);
    session.half_page_down();
    assert_eq!(session.offset(), usize::from(HEIGHT / 2));
    session.half_page_up();
    assert_eq!(session.offset(), 0);
}

#[test]
fn test_short_chapter_is_always_fully_scrolled() {
    let book = Book {
        chapters: vec![chapter(0, "<p>one line</p>")],
        ..test_book()
    };
    let theme = Theme::default();
    let mut session = open_fresh(&book, &theme);
    session.scroll_by(5);
    assert_eq!(session.offset(), 0);
    assert_eq!(session.scroll_percent(), 100);
}

#[test]
fn test_saved_position_restores() {
    let book = test_book();
    let theme = Theme::default();
    let mut progress = ProgressData::default();
    progress.set_position(&book.key(), 1, 4);

    let session = ReaderSession::open(&book, &theme, &progress, WIDTH, HEIGHT);
    assert_eq!(session.chapter(), 1);
    assert_eq!(session.offset(), 4);
}

#[test]
fn test_stale_saved_chapter_resets_to_the_start() {
    let book = test_book();
    let theme = Theme::default();
    let mut progress = ProgressData::default();
    progress.set_position(&book.key(), 17, 4);

    let session = ReaderSession::open(&book, &theme, &progress, WIDTH, HEIGHT);
    assert_eq!(session.chapter(), 0);
}

#[test]
fn test_saved_offset_clamps_to_chapter_length() {
    let book = test_book();
    let theme = Theme::default();
    let mut progress = ProgressData::default();
    progress.set_position(&book.key(), 0, 100_000);

    let session = ReaderSession::open(&book, &theme, &progress, WIDTH, HEIGHT);
    let max = session.rendered().line_count() - usize::from(HEIGHT);
    assert_eq!(session.offset(), max);
}

#[test]
fn test_resize_rerenders_and_keeps_offset_valid() {
    let book = test_book();
    let theme = Theme::default();
    let mut session = open_fresh(&book, &theme);
    session.scroll_by(10_000);
    let narrow_lines = session.rendered().line_count();

    // Wider text means fewer lines; the offset must follow the clamp.
    session.set_size(&book, &theme, 120, HEIGHT);
    let wide_lines = session.rendered().line_count();
    assert!(wide_lines < narrow_lines);
    assert!(session.offset() <= wide_lines - usize::from(HEIGHT));
}
