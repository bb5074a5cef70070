//! sectree: drag-and-drop reordering for nested page sections.
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

use anyhow::{Context, Result};
use clap::Parser;
use ratatui::crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use sectree::{app_state, config, page, style, ui};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "sectree")]
#[command(about = "Drag-and-drop reordering for nested page sections", long_about = None)]
struct Args {
    /// Page JSON file to edit
    #[arg(value_name = "PAGE")]
    page: PathBuf,

    /// Style catalog JSON file
    #[arg(long, value_name = "FILE")]
    styles: PathBuf,

    /// Write logs here (filtered by `RUST_LOG`, default info)
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Fraction of a row that inserts above or below instead of inside
    #[arg(long, value_name = "FRACTION")]
    edge_threshold: Option<f64>,

    /// Seed empty sibling groups at -1 instead of 5
    #[arg(long)]
    provisional_seed: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;

    let mut cfg = config::Config::load();

    // Override config with command line args
    if let Some(edge_threshold) = args.edge_threshold {
        cfg.edge_threshold = edge_threshold;
    }
    if args.provisional_seed {
        cfg.provisional_seed = true;
    }

    let catalog = style::StyleCatalog::load(&args.styles)
        .with_context(|| format!("loading styles from {}", args.styles.display()))?;
    let page = page::LocalPage::load(&args.page)
        .with_context(|| format!("loading page from {}", args.page.display()))?;

    let state = app_state::AppState::new(page, Some(args.page), catalog, &cfg);
    let state = run_tui(state)?;

    let json = serde_json::to_string_pretty(&state.committed)?;
    println!("{json}");
    Ok(())
}

fn init_logging(path: Option<&Path>) -> Result<()> {
    // The terminal belongs to the UI; without a log file nothing is logged.
    let Some(path) = path else {
        return Ok(());
    };
    let file =
        File::create(path).with_context(|| format!("creating log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn run_tui(mut app: app_state::AppState) -> Result<app_state::AppState> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result?;
    Ok(app)
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut app_state::AppState,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        match event::read()? {
            Event::Mouse(mouse) => app.handle_mouse(mouse),
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if key.code != KeyCode::Char('x') {
                    app.pending_removal = None;
                }
                app.message = None;
                match key.code {
                    KeyCode::Char('q') => return Ok(()),
                    KeyCode::Up | KeyCode::Char('k') => {
                        let prev = app.find_prev_section();
                        app.select(prev);
                    }
                    KeyCode::Down | KeyCode::Char('j') => {
                        let next = app.find_next_section();
                        app.select(next);
                    }
                    KeyCode::Right | KeyCode::Char('l') => app.expand_or_descend(),
                    KeyCode::Left | KeyCode::Char('h') => app.collapse_or_ascend(),
                    KeyCode::Esc => app.cancel(),
                    KeyCode::Char('x') => app.remove_current(),
                    KeyCode::Char('s') => app.save(),
                    _ => {}
                }
            }
            _ => {}
        }
    }
}
