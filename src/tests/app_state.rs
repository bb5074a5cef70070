use super::AppState;
use crate::config::Config;
use crate::page::{LocalPage, PageController};
use crate::section::Parent;
use crate::test_support;
use ratatui::crossterm::event::{KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use std::rc::Rc;

// Rows, three lines each: 10, 20, 21, 22, 23, 30, 31, 32, 33, 40, 41.

fn app() -> AppState {
    let mut app = AppState::new(
        LocalPage::new(test_support::tree()),
        None,
        test_support::catalog(),
        &Config::default(),
    );
    app.set_list_area(Rect::new(0, 0, 80, 33));
    app
}

fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
    MouseEvent {
        kind,
        column,
        row,
        modifiers: KeyModifiers::NONE,
    }
}

fn drag(app: &mut AppState, from: (u16, u16), to: (u16, u16)) {
    app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), from.0, from.1));
    app.handle_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), to.0, to.1));
}

fn release(app: &mut AppState, at: (u16, u16)) {
    app.handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), at.0, at.1));
}

fn row_ids(app: &AppState) -> Vec<i64> {
    app.rows.iter().map(|row| row.section_id).collect()
}

#[test]
fn test_all_sections_expanded_initially() {
    let app = app();
    assert_eq!(
        row_ids(&app),
        vec![10, 20, 21, 22, 23, 30, 31, 32, 33, 40, 41]
    );
    assert_eq!(app.rows[4].depth, 2);
    assert_eq!(app.rows[4].rails, vec![true, false]);
    assert!(app.rows[4].is_last);
    assert!(!app.rows[0].is_last);
}

#[test]
fn test_hit_maps_cells_to_rows() {
    let app = app();

    let title = app.hit(0, 3).unwrap();
    assert_eq!(title.index, 1);
    assert_eq!(title.target.section_id, 20);
    assert!((title.target.top - 3.0).abs() < 1e-9);
    assert!((title.target.height - 3.0).abs() < 1e-9);
    assert!(title.on_grip);

    assert!(!app.hit(0, 4).unwrap().on_grip, "only the title line has the handle");
    assert!(!app.hit(20, 3).unwrap().on_grip);
    // 21 is nested one level, so its handle is indented.
    assert!(app.hit(4, 6).unwrap().on_grip);
    assert!(app.hit(80, 0).is_none());
    assert!(app.hit(0, 40).is_none());
}

#[test]
fn test_mouse_drag_inside_container_commits() {
    let mut app = app();

    drag(&mut app, (0, 0), (10, 4));
    assert!(app.session.is_dragging());
    assert_eq!(app.session.hover().map(|h| h.is_valid()), Some(true));
    release(&mut app, (10, 4));

    assert_eq!(app.committed.len(), 1);
    assert_eq!(app.committed[0].new_parent(), Parent::Section(20));
    assert_eq!(app.committed[0].new_position(), 25);
    assert_eq!(
        row_ids(&app),
        vec![20, 21, 22, 23, 10, 30, 31, 32, 33, 40, 41]
    );
    assert_eq!(app.current_row, 4, "selection follows the moved section");
    assert!(!app.session.is_dragging());
}

#[test]
fn test_mouse_drag_below_reparents_to_page() {
    let mut app = app();

    // 41's handle sits one indent in; drop on the bottom line of 30.
    drag(&mut app, (4, 30), (10, 17));
    release(&mut app, (10, 17));

    let tree = app.page.snapshot();
    assert_eq!(tree.find_parent(41), Some(Parent::Page));
    assert_eq!(tree.find_by_id(41).map(|s| s.position), Some(30));
    assert_eq!(app.row_of(41), Some(9));
    assert_eq!(app.rows[9].depth, 0);
}

#[test]
fn test_press_off_handle_does_not_drag() {
    let mut app = app();

    drag(&mut app, (10, 0), (10, 4));
    release(&mut app, (10, 4));

    assert!(app.committed.is_empty());
    assert_eq!(app.current_row, 0);
}

#[test]
fn test_invalid_drop_leaves_tree_alone() {
    let mut app = app();
    let before = Rc::clone(app.tree());

    // Group 22 onto the middle of the Accordion, which only takes Text.
    drag(&mut app, (4, 9), (10, 28));
    assert_eq!(app.session.hover().map(|h| h.is_valid()), Some(false));
    release(&mut app, (10, 28));

    assert!(app.committed.is_empty());
    assert!(Rc::ptr_eq(&before, app.tree()));
}

#[test]
fn test_cancel_mid_drag() {
    let mut app = app();

    drag(&mut app, (0, 0), (10, 4));
    app.cancel();
    release(&mut app, (10, 4));

    assert!(app.committed.is_empty());
    assert_eq!(app.message.as_deref(), Some("Drag cancelled"));
}

#[test]
fn test_collapse_and_expand() {
    let mut app = app();
    app.select(Some(1));

    app.collapse_or_ascend();
    assert_eq!(row_ids(&app), vec![10, 20, 30, 31, 32, 33, 40, 41]);
    assert!(!app.rows[1].expanded);

    app.expand_or_descend();
    assert_eq!(app.rows.len(), 11);

    app.expand_or_descend();
    assert_eq!(app.current_section().map(|s| s.id), Some(21));

    app.collapse_or_ascend();
    assert_eq!(app.current_section().map(|s| s.id), Some(20));
}

#[test]
fn test_remove_asks_before_removing() {
    let mut app = app();
    app.select(Some(1));

    app.remove_current();
    assert_eq!(app.pending_removal.map(|p| p.descendant_count), Some(3));
    assert_eq!(app.rows.len(), 11);

    app.remove_current();
    assert!(app.pending_removal.is_none());
    assert_eq!(row_ids(&app), vec![10, 30, 31, 32, 33, 40, 41]);
    assert_eq!(app.message.as_deref(), Some("Removed 4 section(s)"));
}

#[test]
fn test_moving_selection_drops_pending_removal() {
    let mut app = app();
    app.select(Some(1));
    app.remove_current();

    app.select(Some(0));

    assert!(app.pending_removal.is_none());
    app.remove_current();
    assert_eq!(app.rows.len(), 11, "first press only asks");
}

#[test]
fn test_scroll_follows_selection() {
    let mut app = app();
    app.set_list_area(Rect::new(0, 0, 80, 9));

    app.select(Some(10));

    assert_eq!(app.scroll, 8);
    assert_eq!(app.hit(0, 0).map(|h| h.index), Some(8));
}

#[test]
fn test_save_writes_page_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("page.json");
    let mut app = app();

    app.save();
    assert_eq!(app.message.as_deref(), Some("Nothing to save"));

    app.page_path = Some(path.clone());
    drag(&mut app, (0, 0), (10, 4));
    release(&mut app, (10, 4));
    app.save();

    assert_eq!(app.message.as_deref(), Some("Saved"));
    let reloaded = LocalPage::load(&path).unwrap();
    assert_eq!(reloaded.snapshot().find_parent(10), Some(Parent::Section(20)));
}
