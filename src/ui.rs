//! The UI renders the application state into something visible and readable.
//!
//! The draw function dispatches based on the current view (library or
//! reader). The library view shows scanned books with completion markers;
//! the reader view shows the current chapter's pre-rendered lines inside
//! the configured margins.

use crate::app_state::{AppState, View};
use crate::book::book_key;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

/// Renders the active view based on current application state.
pub fn draw(f: &mut Frame, app: &AppState) {
    match app.current_view {
        View::Library => draw_library(f, app),
        View::Reader => draw_reader(f, app),
    }
}

fn draw_library(f: &mut Frame, app: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(f.area());

    let items: Vec<ListItem> = app
        .library
        .iter()
        .enumerate()
        .map(|(i, info)| {
            let record = app.progress.get(&book_key(&info.path));
            let finished = record.is_some_and(|p| p.finished);
            let completion = record.map_or(0.0, |p| p.completion(info.chapter_count));

            let mut spans = vec![Span::styled(
                info.title.clone(),
                Style::default().fg(app.theme.text()),
            )];
            if !info.author.is_empty() {
                spans.push(Span::styled(
                    format!("  {}", info.author),
                    Style::default().fg(app.theme.muted()),
                ));
            }
            for tag in &info.tags {
                spans.push(Span::styled(
                    format!("  [{tag}]"),
                    Style::default().fg(app.theme.secondary()),
                ));
            }
            if finished {
                spans.push(Span::styled(
                    "  ✓".to_string(),
                    Style::default().fg(app.theme.primary()),
                ));
            } else if completion > 0.0 {
                spans.push(Span::styled(
                    format!("  {completion:.0}%"),
                    Style::default().fg(app.theme.muted()),
                ));
            }

            let style = if i == app.selected {
                Style::default().add_modifier(Modifier::REVERSED)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(spans)).style(style)
        })
        .collect();

    let title = format!("Library ({} books)", app.library.len());
    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(app.theme.muted())),
    );
    f.render_widget(list, chunks[0]);

    let help = app.message.clone().unwrap_or_else(|| {
        "↑/↓/j/k: Navigate | Enter: Read | f: Toggle Finished | q: Quit".to_string()
    });
    let help_widget = Paragraph::new(help)
        .style(Style::default().fg(app.theme.muted()))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help_widget, chunks[1]);
}

fn draw_reader(f: &mut Frame, app: &AppState) {
    let (Some(book), Some(session)) = (&app.book, &app.session) else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title, chapter, rule
            Constraint::Min(0),    // Chapter text
            Constraint::Length(3), // Rule, position, help
        ])
        .split(f.area());

    let mut header = vec![Span::styled(
        book.title.clone(),
        Style::default()
            .fg(app.theme.primary())
            .add_modifier(Modifier::BOLD),
    )];
    if !book.author.is_empty() {
        header.push(Span::styled(
            format!(" — {}", book.author),
            Style::default().fg(app.theme.muted()),
        ));
    }
    let chapter_title = book
        .chapter(session.chapter())
        .map(|c| c.title.clone())
        .unwrap_or_default();
    let header_area = margined(chunks[0], app);
    let rule = Line::from(Span::styled(
        "─".repeat(usize::from(header_area.width)),
        Style::default().fg(app.theme.muted()),
    ));
    let header_widget = Paragraph::new(vec![
        Line::from(header),
        Line::from(Span::styled(
            chapter_title,
            Style::default()
                .fg(app.theme.secondary())
                .add_modifier(Modifier::ITALIC),
        )),
        rule.clone(),
    ]);
    f.render_widget(header_widget, header_area);

    let offset = u16::try_from(session.offset()).unwrap_or(u16::MAX);
    let content = Paragraph::new(session.rendered().lines.clone()).scroll((offset, 0));
    f.render_widget(content, margined(chunks[1], app));

    let position = format!(
        "Chapter {}/{} • Scroll: {}%",
        session.chapter() + 1,
        book.chapter_count(),
        session.scroll_percent()
    );
    let help = app.message.clone().unwrap_or_else(|| {
        "h/l: Chapters | s/S: Headings | j/k: Scroll | J/K: Half Page | Esc: Library | q: Quit"
            .to_string()
    });
    let footer = Paragraph::new(vec![
        rule,
        Line::from(Span::styled(
            position,
            Style::default().fg(app.theme.secondary()),
        )),
        Line::from(Span::styled(help, Style::default().fg(app.theme.muted()))),
    ]);
    f.render_widget(footer, margined(chunks[2], app));
}

/// Shrinks an area by the configured horizontal margins.
fn margined(area: Rect, app: &AppState) -> Rect {
    let left = app.config.margin_left.min(area.width / 2);
    let right = app.config.margin_right.min(area.width / 2);
    Rect {
        x: area.x + left,
        y: area.y,
        width: area.width.saturating_sub(left + right),
        height: area.height,
    }
}
