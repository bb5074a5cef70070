//! The single drag gesture in flight and its lifecycle.
//!
//! Tree-node views do not share ambient global state. They all talk to one [`DragSession`],
//! which reads the current tree snapshot and style catalog, turns pointer events into drop
//! resolutions and, on release over a valid target, produces the [`MoveCommand`].
//!
//! ```text
//! Idle --pointer_down--> Armed --moved past threshold--> Dragging
//!  ^                       |                                 |
//!  |______pointer_up_______|_____pointer_up / cancel_________|
//! ```
//!
//! The session never mutates the tree. A committed command goes to the page controller, which
//! publishes a new snapshot that the view passes back in through [`DragSession::refresh_tree`].

use crate::drop_resolver::{DropResolution, DropResolver, GeometryError, VerticalFraction};
use crate::move_command::MoveCommand;
use crate::section::SectionId;
use crate::style::StyleCatalog;
use crate::tree::SectionTree;
use std::rc::Rc;

/// Default manhattan distance a press must travel before it becomes a drag.
pub const DEFAULT_DRAG_THRESHOLD: f64 = 1.0;

#[derive(Clone, Copy, Debug, PartialEq)]
/// Pointer location in the view's coordinate space.
pub struct Pointer {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate, growing downwards.
    pub y: f64,
}

impl Pointer {
    #[must_use]
    /// Creates a pointer location.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn manhattan(self, other: Self) -> f64 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// A registered drop target under the pointer and its vertical extent.
pub struct DropTarget {
    /// Section the target belongs to.
    pub section_id: SectionId,
    /// Top edge of the node's box.
    pub top: f64,
    /// Height of the node's box.
    pub height: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// Tunables for a drag session.
pub struct DragConfig {
    /// Band geometry and position arithmetic.
    pub resolver: DropResolver,
    /// Distance a press must move before dragging starts.
    pub drag_threshold: f64,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            resolver: DropResolver::default(),
            drag_threshold: DEFAULT_DRAG_THRESHOLD,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
/// Where the session is in its lifecycle.
pub enum DragState {
    /// No drag in progress.
    Idle,
    /// A drag handle was pressed but the pointer has not moved far enough yet.
    Armed {
        /// Section whose handle was pressed.
        section_id: SectionId,
        /// Pointer location at the press.
        origin: Pointer,
    },
    /// A section is being dragged.
    Dragging {
        /// Section being dragged.
        section_id: SectionId,
        /// Latest resolution, `None` when not over any drop target.
        hover: Option<DropResolution>,
    },
}

/// Owner of the one drag gesture that can be active at a time.
pub struct DragSession {
    config: DragConfig,
    tree: Rc<SectionTree>,
    catalog: Rc<StyleCatalog>,
    state: DragState,
}

impl DragSession {
    #[must_use]
    /// Creates an idle session over a tree snapshot and style catalog.
    pub fn new(tree: Rc<SectionTree>, catalog: Rc<StyleCatalog>, config: DragConfig) -> Self {
        Self {
            config,
            tree,
            catalog,
            state: DragState::Idle,
        }
    }

    #[must_use]
    /// Current lifecycle state.
    pub fn state(&self) -> &DragState {
        &self.state
    }

    #[must_use]
    /// Snapshot the session is reading.
    pub fn tree(&self) -> &Rc<SectionTree> {
        &self.tree
    }

    #[must_use]
    /// Whether a section is actively being dragged.
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    #[must_use]
    /// Section being dragged, if any.
    pub fn dragged_id(&self) -> Option<SectionId> {
        match self.state {
            DragState::Dragging { section_id, .. } => Some(section_id),
            _ => None,
        }
    }

    #[must_use]
    /// The most recent hover resolution while dragging.
    pub fn hover(&self) -> Option<&DropResolution> {
        match &self.state {
            DragState::Dragging { hover, .. } => hover.as_ref(),
            _ => None,
        }
    }

    #[must_use]
    /// Whether `id` can never receive the current drag: the dragged node or one of its descendants.
    pub fn is_blocked(&self, id: SectionId) -> bool {
        self.dragged_id()
            .is_some_and(|dragged| dragged == id || self.tree.is_descendant_of(dragged, id))
    }

    /// Swaps in a newly published snapshot.
    ///
    /// The last hover was computed against the old tree, so it is dropped. If the dragged section
    /// no longer exists every further hover resolves as invalid until the gesture ends.
    pub fn refresh_tree(&mut self, tree: Rc<SectionTree>) {
        self.tree = tree;
        match self.state {
            DragState::Idle => {}
            DragState::Armed { section_id, .. } => {
                if !self.tree.contains(section_id) {
                    log::warn!("pressed section {section_id} vanished before the drag started");
                    self.state = DragState::Idle;
                }
            }
            DragState::Dragging {
                section_id,
                ref mut hover,
            } => {
                if !self.tree.contains(section_id) {
                    log::warn!("dragged section {section_id} vanished mid-drag");
                }
                *hover = None;
            }
        }
    }

    /// Replaces the style catalog, e.g. after it was refetched.
    ///
    /// A hover resolved under the old rules is dropped; the next pointer move resolves afresh.
    pub fn set_catalog(&mut self, catalog: Rc<StyleCatalog>) {
        self.catalog = catalog;
        self.clear_hover();
    }

    fn clear_hover(&mut self) {
        if let DragState::Dragging { hover, .. } = &mut self.state {
            *hover = None;
        }
    }

    /// Registers a press on a section's drag handle.
    ///
    /// Returns `false` if the press was ignored: another gesture is in progress or the section is
    /// not in the current tree.
    pub fn pointer_down(&mut self, section_id: SectionId, at: Pointer) -> bool {
        if self.state != DragState::Idle {
            log::debug!("ignoring press on {section_id}: a drag is already in progress");
            return false;
        }
        if !self.tree.contains(section_id) {
            log::debug!("ignoring press on unknown section {section_id}");
            return false;
        }
        log::debug!("armed drag for section {section_id}");
        self.state = DragState::Armed {
            section_id,
            origin: at,
        };
        true
    }

    /// Feeds a pointer movement, with the drop target under the pointer if there is one.
    ///
    /// Returns the fresh hover resolution while dragging over a target.
    ///
    /// # Errors
    ///
    /// Returns a [`GeometryError`] if the pointer or target geometry is malformed.
    pub fn pointer_move(
        &mut self,
        at: Pointer,
        over: Option<DropTarget>,
    ) -> Result<Option<DropResolution>, GeometryError> {
        if let DragState::Armed { section_id, origin } = self.state {
            if at.manhattan(origin) < self.config.drag_threshold {
                return Ok(None);
            }
            log::debug!("started dragging section {section_id}");
            self.state = DragState::Dragging {
                section_id,
                hover: None,
            };
        }

        let DragState::Dragging { section_id, .. } = self.state else {
            return Ok(None);
        };

        let resolution = match over {
            Some(target) => {
                // A rejected frame still replaces the previous hover.
                let fraction = match VerticalFraction::from_rect(at.y, target.top, target.height) {
                    Ok(fraction) => fraction,
                    Err(e) => {
                        self.clear_hover();
                        return Err(e);
                    }
                };
                Some(self.config.resolver.resolve(
                    &self.tree,
                    &self.catalog,
                    section_id,
                    target.section_id,
                    fraction,
                ))
            }
            None => None,
        };

        if let DragState::Dragging { hover, .. } = &mut self.state {
            *hover = resolution;
        }
        Ok(resolution)
    }

    /// Ends the gesture, returning the move to commit if released over a valid target.
    pub fn pointer_up(&mut self) -> Option<MoveCommand> {
        let state = std::mem::replace(&mut self.state, DragState::Idle);
        let DragState::Dragging { section_id, hover } = state else {
            return None;
        };

        let Some(resolution) = hover else {
            log::debug!("drag of {section_id} released outside any target");
            return None;
        };
        let placement = match resolution.verdict {
            Ok(placement) => placement,
            Err(rejection) => {
                log::debug!(
                    "drag of {section_id} released on {} rejected: {rejection:?}",
                    resolution.target_id
                );
                return None;
            }
        };

        // Both lookups describe the tree before the move.
        let old_parent = self.tree.find_parent(section_id)?;
        let descendants = self.tree.collect_descendant_ids(section_id)?;
        let command = MoveCommand::new(
            self.tree.page_id(),
            section_id,
            old_parent,
            placement,
            descendants,
        );
        log::info!(
            "move section {section_id} ({} items) from {old_parent} to {} at {}",
            command.total_moving_items(),
            placement.parent,
            placement.position
        );
        Some(command)
    }

    /// Abandons the current gesture without emitting anything.
    pub fn cancel(&mut self) {
        if self.state != DragState::Idle {
            log::debug!("drag cancelled");
        }
        self.state = DragState::Idle;
    }
}

#[cfg(test)]
#[path = "tests/drag_session.rs"]
mod tests;
