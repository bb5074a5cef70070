//! The UI renders the application state into something visible and draggable.
//!
//! The tree is drawn with box-drawing characters, one fixed-height row per section. Each title
//! line starts with a grip glyph: press it and drag to move the section with its subtree.

use crate::app_state::{AppState, TreeRow};
use crate::drop_resolver::{DropBand, DropResolution};
use crate::section::Section;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

/// Glyph marking a row's drag handle.
pub const GRIP: &str = "⠿";

/// Renders the tree and the help bar.
pub fn draw(f: &mut Frame, app: &mut AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(f.area());

    let title = match app.session.dragged_id() {
        Some(id) => format!("Page {} (DRAGGING {id})", app.tree().page_id()),
        None => format!("Page {}", app.tree().page_id()),
    };
    let block = Block::default().borders(Borders::ALL).title(title);
    app.set_list_area(block.inner(chunks[0]));

    let items: Vec<ListItem> = app
        .rows
        .iter()
        .enumerate()
        .skip(app.scroll)
        .take(app.rows_per_page())
        .filter_map(|(i, row)| {
            let section = app.tree().find_by_id(row.section_id)?;
            Some(row_item(app, row, section, i == app.current_row))
        })
        .collect();

    f.render_widget(List::new(items).block(block), chunks[0]);

    let help = if let Some(ref msg) = app.message {
        msg.clone()
    } else if app.session.is_dragging() {
        "Release on a green row to move | Esc: Cancel".to_string()
    } else {
        "Drag ⠿ to move | ↑/↓: Navigate | ←/→: Collapse/Expand | x: Remove | s: Save | q: Quit"
            .to_string()
    };
    let help_widget = Paragraph::new(help).block(Block::default().borders(Borders::ALL));
    f.render_widget(help_widget, chunks[1]);
}

/// Generate box-drawing prefix for tree structure
fn get_tree_prefix(row: &TreeRow) -> String {
    if row.depth == 0 {
        return String::new();
    }

    let mut prefix: String = row
        .rails
        .iter()
        .skip(1)
        .map(|&rail| if rail { "│   " } else { "    " })
        .collect();

    if row.is_last {
        prefix.push_str("└── ");
    } else {
        prefix.push_str("├── ");
    }
    prefix
}

/// Prefix for the lines under a row's title, continuing the rails past it.
fn get_continuation_prefix(row: &TreeRow) -> String {
    let mut prefix: String = row
        .rails
        .iter()
        .skip(1)
        .map(|&rail| if rail { "│   " } else { "    " })
        .collect();
    if row.depth > 0 {
        prefix.push_str(if row.is_last { "    " } else { "│   " });
    }
    prefix
}

fn band_marker(band: DropBand) -> &'static str {
    match band {
        DropBand::Above => " ▲ above",
        DropBand::Inside => " ● inside",
        DropBand::Below => " ▼ below",
    }
}

fn style_label(app: &AppState, section: &Section) -> String {
    if !section.style_name.is_empty() {
        return section.style_name.clone();
    }
    app.catalog
        .get(section.style_id)
        .map_or_else(|| format!("style {}", section.style_id), |s| s.name.clone())
}

fn row_item(app: &AppState, row: &TreeRow, section: &Section, selected: bool) -> ListItem<'static> {
    let hover: Option<&DropResolution> = app
        .session
        .hover()
        .filter(|h| h.target_id == row.section_id);

    let marker = match (row.has_children, row.expanded) {
        (true, true) => "▾ ",
        (true, false) => "▸ ",
        (false, _) => "  ",
    };

    let mut title = vec![
        Span::raw(get_tree_prefix(row)),
        Span::styled(format!("{GRIP} "), Style::default().fg(Color::Cyan)),
        Span::raw(marker),
        Span::styled(
            section.name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ];
    if let Some(hover) = hover {
        title.push(Span::raw(band_marker(hover.band)));
    }

    let continuation = get_continuation_prefix(row);
    let mut lines = vec![
        Line::from(title),
        Line::from(vec![
            Span::raw(continuation.clone()),
            Span::styled(
                format!(
                    "    {} · #{} · pos {}",
                    style_label(app, section),
                    section.id,
                    section.position
                ),
                Style::default().fg(Color::Gray),
            ),
        ]),
    ];
    while lines.len() < usize::from(app.row_height) {
        lines.push(Line::from(continuation.clone()));
    }
    lines.truncate(usize::from(app.row_height));

    let style = match hover {
        Some(h) if h.is_valid() => Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD),
        Some(_) => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        None if app.session.is_blocked(row.section_id) => Style::default().fg(Color::DarkGray),
        None if selected => Style::default().add_modifier(Modifier::REVERSED),
        None => Style::default(),
    };

    ListItem::new(lines).style(style)
}
