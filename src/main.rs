//! ember: a cozy terminal e-book reader.
#![allow(clippy::multiple_crate_versions)]

use clap::Parser;
use ember::{app_state, book, config, progress, theme, ui};
use ratatui::crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ember")]
#[command(about = "A cozy terminal e-book reader", long_about = None)]
struct Args {
    /// Book to open directly, skipping the library
    #[arg(value_name = "BOOK")]
    book: Option<PathBuf>,

    /// Library directory to scan
    #[arg(long, value_name = "DIR")]
    library: Option<PathBuf>,

    /// Colour theme name
    #[arg(long, short = 't', value_name = "NAME")]
    theme: Option<String>,
}

fn main() -> io::Result<()> {
    let args = Args::parse();
    let mut cfg = config::Config::load();

    // Override config with command line args
    if let Some(library) = args.library {
        cfg.library_path = library.to_string_lossy().into_owned();
    }
    if let Some(name) = args.theme {
        cfg.theme_name = name;
    }

    let palette = theme::Theme::load(&cfg.theme_name);
    let saved = progress::ProgressData::load_from(&cfg.progress_path())
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    let library = if args.book.is_some() {
        Vec::new()
    } else {
        let dir = cfg.library_dir();
        book::scan_library(&dir).map_err(io::Error::other)?
    };

    if args.book.is_none() && library.is_empty() {
        eprintln!("No books found in {}", cfg.library_dir().display());
        return Ok(());
    }

    let mut state = app_state::AppState::new(library, cfg, palette, saved);

    if let Some(path) = args.book {
        state
            .open_book(&path)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    }

    run_tui(state)
}

fn run_tui(mut app: app_state::AppState) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {e}");
    }

    Ok(())
}

#[allow(clippy::too_many_lines)]
fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut app_state::AppState,
) -> io::Result<()> {
    let size = terminal.size()?;
    app.set_size(size.width, size.height);

    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        match event::read()? {
            Event::Resize(width, height) => app.set_size(width, height),
            Event::Key(key)
                if key.code == KeyCode::Char('c')
                    && key.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                app.record_position();
                app.save_progress();
                return Ok(());
            }
            Event::Key(key) => match app.current_view {
                app_state::View::Library => match key.code {
                    KeyCode::Char('q') => {
                        app.save_progress();
                        return Ok(());
                    }
                    KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
                    KeyCode::Down | KeyCode::Char('j') => app.select_next(),
                    KeyCode::Char('f') => app.toggle_selected_finished(),
                    KeyCode::Enter => app.open_selected(),
                    _ => {}
                },
                app_state::View::Reader => {
                    let theme = &app.theme;
                    let (Some(book), Some(session)) = (&app.book, &mut app.session) else {
                        app.current_view = app_state::View::Library;
                        continue;
                    };
                    match key.code {
                        KeyCode::Char('q') => {
                            app.record_position();
                            app.save_progress();
                            return Ok(());
                        }
                        KeyCode::Esc => app.close_book(),
                        KeyCode::Right | KeyCode::Char('l' | 'n') | KeyCode::PageDown => {
                            session.next_chapter(book, theme);
                        }
                        KeyCode::Left | KeyCode::Char('h' | 'p') | KeyCode::PageUp => {
                            session.prev_chapter(book, theme);
                        }
                        KeyCode::Home => session.first_chapter(book, theme),
                        KeyCode::End => session.last_chapter(book, theme),
                        KeyCode::Char('s') => session.next_heading(book, theme),
                        KeyCode::Char('S') => session.prev_heading(book, theme),
                        KeyCode::Down | KeyCode::Char('j' | ' ') => session.scroll_by(1),
                        KeyCode::Up | KeyCode::Char('k') => session.scroll_by(-1),
                        KeyCode::Char('J') => session.half_page_down(),
                        KeyCode::Char('K') => session.half_page_up(),
                        KeyCode::Char('g') => session.scroll_to_top(),
                        _ => {}
                    }
                }
            },
            _ => {}
        }
    }
}
