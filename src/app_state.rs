//! The core state machine bridging the page tree, the drag session and the terminal.
//!
//! The view owns nothing authoritative. It lays the current snapshot out as rows of fixed
//! height, maps mouse cells onto those rows for the drag session, and forwards finished drags to
//! the page. Every commit or removal publishes a new snapshot, after which the rows and the
//! session are refreshed from it.

use crate::config::Config;
use crate::drag_session::{DragSession, DropTarget, Pointer};
use crate::move_command::MoveCommand;
use crate::page::{LocalPage, PageController};
use crate::section::{Parent, Section, SectionId};
use crate::style::StyleCatalog;
use crate::tree::{RemovalImpact, SectionTree};
use ratatui::crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use std::collections::HashSet;
use std::path::PathBuf;
use std::rc::Rc;

/// Width of one nesting level in the tree prefix.
pub const INDENT_WIDTH: u16 = 4;

#[derive(Clone, Debug, PartialEq, Eq)]
/// One visible section in the laid-out tree.
pub struct TreeRow {
    /// Section shown on this row.
    pub section_id: SectionId,
    /// Nesting depth, zero at page level.
    pub depth: usize,
    /// Whether this is the last of its siblings.
    pub is_last: bool,
    /// For each ancestor level, whether a vertical rail continues past this row.
    pub rails: Vec<bool>,
    /// Whether the section has children, shown or not.
    pub has_children: bool,
    /// Whether the children are currently shown.
    pub expanded: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// What a terminal cell maps to in the tree view.
pub struct Hit {
    /// Row index into [`AppState::rows`].
    pub index: usize,
    /// Drop target geometry for the row's section.
    pub target: DropTarget,
    /// Whether the cell is the row's drag handle.
    pub on_grip: bool,
}

/// Bridges the page tree and the terminal, maintaining session state.
pub struct AppState {
    /// Owner of the authoritative tree.
    pub page: LocalPage,
    /// Where `s` writes the page back, if it came from a file.
    pub page_path: Option<PathBuf>,
    /// Style definitions shared with the drag session.
    pub catalog: Rc<StyleCatalog>,
    /// The drag gesture in flight, if any.
    pub session: DragSession,
    /// Sections whose children are shown.
    pub expanded: HashSet<SectionId>,
    /// Visible rows in render order.
    pub rows: Vec<TreeRow>,
    /// Selected row.
    pub current_row: usize,
    /// First row drawn at the top of the list area.
    pub scroll: usize,
    /// Terminal lines per row.
    pub row_height: u16,
    /// Inner area the rows are drawn into, updated by the renderer every frame.
    pub list_area: Rect,
    /// Removal awaiting a second keypress.
    pub pending_removal: Option<RemovalImpact>,
    /// Moves committed during this run, in order.
    pub committed: Vec<MoveCommand>,
    /// Status feedback displayed in the help bar.
    pub message: Option<String>,
}

impl AppState {
    #[must_use]
    /// Initialises application state over a page, with every section expanded.
    pub fn new(
        page: LocalPage,
        page_path: Option<PathBuf>,
        catalog: StyleCatalog,
        cfg: &Config,
    ) -> Self {
        let tree = page.snapshot();
        let catalog = Rc::new(catalog);
        let session = DragSession::new(Rc::clone(&tree), Rc::clone(&catalog), cfg.drag_config());
        let expanded: HashSet<SectionId> = tree.flatten().map(|s| s.id).collect();
        let rows = build_rows(&tree, &expanded);

        Self {
            page,
            page_path,
            catalog,
            session,
            expanded,
            rows,
            current_row: 0,
            scroll: 0,
            row_height: cfg.row_height.max(1),
            list_area: Rect::default(),
            pending_removal: None,
            committed: Vec::new(),
            message: None,
        }
    }

    #[must_use]
    /// The snapshot currently on screen.
    pub fn tree(&self) -> &Rc<SectionTree> {
        self.session.tree()
    }

    #[must_use]
    /// Section on the selected row.
    pub fn current_section(&self) -> Option<&Section> {
        let row = self.rows.get(self.current_row)?;
        self.tree().find_by_id(row.section_id)
    }

    fn current_id(&self) -> Option<SectionId> {
        self.rows.get(self.current_row).map(|row| row.section_id)
    }

    /// Re-reads the page's latest snapshot and lays it out again, keeping the selection.
    pub fn refresh(&mut self) {
        let selected = self.current_id();
        let tree = self.page.snapshot();
        self.session.refresh_tree(Rc::clone(&tree));
        self.expanded.retain(|id| tree.contains(*id));
        self.rebuild_rows();
        if let Some(index) = selected.and_then(|id| self.row_of(id)) {
            self.current_row = index;
        }
    }

    fn rebuild_rows(&mut self) {
        self.rows = build_rows(self.tree(), &self.expanded);
        self.current_row = self.current_row.min(self.rows.len().saturating_sub(1));
        self.ensure_visible();
    }

    #[must_use]
    /// Row index showing `id`, if it is visible.
    pub fn row_of(&self, id: SectionId) -> Option<usize> {
        self.rows.iter().position(|row| row.section_id == id)
    }

    #[must_use]
    /// Number of whole rows that fit in the list area.
    pub fn rows_per_page(&self) -> usize {
        usize::from(self.list_area.height / self.row_height).max(1)
    }

    /// Scrolls so the selected row is on screen.
    pub fn ensure_visible(&mut self) {
        let page = self.rows_per_page();
        if self.current_row < self.scroll {
            self.scroll = self.current_row;
        } else if self.current_row >= self.scroll + page {
            self.scroll = self.current_row + 1 - page;
        }
        self.scroll = self.scroll.min(self.rows.len().saturating_sub(1));
    }

    /// Records the area rows are drawn into.
    pub fn set_list_area(&mut self, area: Rect) {
        self.list_area = area;
        self.ensure_visible();
    }

    #[must_use]
    /// Returns the following row index for sequential navigation.
    pub fn find_next_section(&self) -> Option<usize> {
        if self.current_row + 1 < self.rows.len() {
            Some(self.current_row + 1)
        } else {
            None
        }
    }

    #[must_use]
    /// Returns the preceding row index for reverse navigation.
    pub fn find_prev_section(&self) -> Option<usize> {
        self.current_row.checked_sub(1)
    }

    #[must_use]
    /// Row of the selected section's parent.
    pub fn navigate_to_parent(&self) -> Option<usize> {
        match self.tree().find_parent(self.current_id()?)? {
            Parent::Page => None,
            Parent::Section(id) => self.row_of(id),
        }
    }

    /// Moves the selection to `index` if it exists.
    pub fn select(&mut self, index: Option<usize>) {
        if let Some(index) = index.filter(|i| *i < self.rows.len()) {
            self.current_row = index;
            self.pending_removal = None;
            self.ensure_visible();
        }
    }

    /// Shows the selected section's children, or steps into the first of them if already shown.
    pub fn expand_or_descend(&mut self) {
        let Some(row) = self.rows.get(self.current_row) else {
            return;
        };
        if !row.has_children {
            return;
        }
        if row.expanded {
            self.select(Some(self.current_row + 1));
        } else {
            self.expanded.insert(row.section_id);
            self.rebuild_rows();
        }
    }

    /// Hides the selected section's children, or steps out to its parent if already hidden.
    pub fn collapse_or_ascend(&mut self) {
        let Some(row) = self.rows.get(self.current_row) else {
            return;
        };
        if row.has_children && row.expanded {
            self.expanded.remove(&row.section_id);
            self.rebuild_rows();
        } else {
            let parent = self.navigate_to_parent();
            self.select(parent);
        }
    }

    #[must_use]
    /// Maps a terminal cell to the row drawn there.
    pub fn hit(&self, column: u16, line: u16) -> Option<Hit> {
        let area = self.list_area;
        if column < area.x
            || column >= area.x.saturating_add(area.width)
            || line < area.y
            || line >= area.y.saturating_add(area.height)
        {
            return None;
        }
        let line_in_list = line - area.y;
        let offset = line_in_list / self.row_height;
        let index = self.scroll + usize::from(offset);
        let row = self.rows.get(index)?;

        let top = f64::from(area.y) + f64::from(offset) * f64::from(self.row_height);
        let grip = u16::try_from(row.depth)
            .ok()
            .and_then(|depth| depth.checked_mul(INDENT_WIDTH))
            .and_then(|indent| area.x.checked_add(indent));
        let on_title_line = line_in_list % self.row_height == 0;
        Some(Hit {
            index,
            target: DropTarget {
                section_id: row.section_id,
                top,
                height: f64::from(self.row_height),
            },
            on_grip: on_title_line
                && grip.is_some_and(|g| column == g || column == g.saturating_add(1)),
        })
    }

    /// Feeds a mouse event to the drag session.
    ///
    /// Pointer heights are taken at the middle of the cell so that every line of a row maps to
    /// a distinct fraction of it.
    pub fn handle_mouse(&mut self, event: MouseEvent) {
        let at = Pointer::new(f64::from(event.column), f64::from(event.row) + 0.5);
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let Some(hit) = self.hit(event.column, event.row) else {
                    return;
                };
                self.select(Some(hit.index));
                if hit.on_grip {
                    self.session.pointer_down(hit.target.section_id, at);
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                let over = self.hit(event.column, event.row).map(|hit| hit.target);
                if let Err(e) = self.session.pointer_move(at, over) {
                    log::warn!("dropping pointer frame: {e}");
                }
            }
            MouseEventKind::Up(MouseButton::Left) => self.release(),
            _ => {}
        }
    }

    /// Ends the drag, committing it if it was released over a valid target.
    pub fn release(&mut self) {
        let Some(command) = self.session.pointer_up() else {
            return;
        };
        match self.page.commit_move(&command) {
            Ok(()) => {
                if let Some(parent) = command.new_parent_id() {
                    self.expanded.insert(parent);
                }
                self.message = Some(format!(
                    "Moved {} section(s) to {}",
                    command.total_moving_items(),
                    command.new_parent()
                ));
                self.committed.push(command);
            }
            Err(e) => {
                log::warn!("move rejected by page: {e}");
                self.message = Some(format!("Move failed: {e}"));
            }
        }
        self.refresh();
    }

    /// Abandons the drag or pending removal in progress.
    pub fn cancel(&mut self) {
        if self.session.is_dragging() {
            self.message = Some("Drag cancelled".to_string());
        }
        self.session.cancel();
        self.pending_removal = None;
    }

    /// Removes the selected section, asking once for confirmation first.
    pub fn remove_current(&mut self) {
        let Some(id) = self.current_id() else {
            return;
        };
        match self.pending_removal {
            Some(pending) if pending.section_id == id => {
                self.pending_removal = None;
                match self.page.remove_section(id) {
                    Ok(impact) => {
                        self.message = Some(format!("Removed {} section(s)", impact.total()));
                    }
                    Err(e) => self.message = Some(format!("Remove failed: {e}")),
                }
                self.refresh();
            }
            _ => {
                let Some(impact) = self.tree().removal_impact(id) else {
                    return;
                };
                self.message = Some(format!(
                    "Remove section {id} and {} descendant(s)? x: confirm | Esc: keep",
                    impact.descendant_count
                ));
                self.pending_removal = Some(impact);
            }
        }
    }

    /// Writes the page back to the file it was loaded from.
    pub fn save(&mut self) {
        let Some(path) = &self.page_path else {
            self.message = Some("Nothing to save".to_string());
            return;
        };
        self.message = Some(match self.page.save(path) {
            Ok(()) => "Saved".to_string(),
            Err(e) => format!("Error saving: {e}"),
        });
    }
}

/// Lays out the visible rows in pre-order, descending only into expanded sections.
fn build_rows(tree: &SectionTree, expanded: &HashSet<SectionId>) -> Vec<TreeRow> {
    let mut rows = Vec::with_capacity(tree.len());
    let roots = tree.roots();
    let mut stack: Vec<(&Section, Vec<bool>, bool)> = roots
        .iter()
        .enumerate()
        .rev()
        .map(|(i, s)| (s, Vec::new(), i + 1 == roots.len()))
        .collect();

    while let Some((section, rails, is_last)) = stack.pop() {
        let is_expanded = expanded.contains(&section.id);
        if is_expanded {
            let mut child_rails = rails.clone();
            child_rails.push(!is_last);
            let count = section.children.len();
            for (i, child) in section.children.iter().enumerate().rev() {
                stack.push((child, child_rails.clone(), i + 1 == count));
            }
        }
        rows.push(TreeRow {
            section_id: section.id,
            depth: rails.len(),
            is_last,
            rails,
            has_children: section.has_children(),
            expanded: is_expanded,
        });
    }
    rows
}

#[cfg(test)]
#[path = "tests/app_state.rs"]
mod tests;
