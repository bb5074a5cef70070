//! The value a completed drag hands to the page controller.
//!
//! A move command is never stored. It describes one reparent/reposition of a whole subtree and
//! exists only to cross from the drag engine to whoever owns and persists the tree.

use crate::drop_resolver::DropPlacement;
use crate::section::{PageId, Parent, Position, SectionId};
use serde::Serialize;

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
/// Atomic description of a reparent/reposition produced by one drag.
///
/// Exactly one of the old-parent fields is set: the page id when the section sat at page level,
/// otherwise the id of its old parent section.
pub struct MoveCommand {
    dragged_section_id: SectionId,
    old_parent_page_id: Option<PageId>,
    old_parent_section_id: Option<SectionId>,
    new_parent_id: Option<SectionId>,
    new_position: Position,
    descendant_ids: Vec<SectionId>,
    total_moving_items: usize,
    needs_normalization: bool,
}

impl MoveCommand {
    #[must_use]
    /// Assembles a command from the pre-move parent and the accepted placement.
    pub fn new(
        page_id: PageId,
        dragged_section_id: SectionId,
        old_parent: Parent,
        placement: DropPlacement,
        descendant_ids: Vec<SectionId>,
    ) -> Self {
        let (old_parent_page_id, old_parent_section_id) = match old_parent {
            Parent::Page => (Some(page_id), None),
            Parent::Section(id) => (None, Some(id)),
        };
        Self {
            dragged_section_id,
            old_parent_page_id,
            old_parent_section_id,
            new_parent_id: placement.parent.section_id(),
            new_position: placement.position,
            total_moving_items: descendant_ids.len() + 1,
            descendant_ids,
            needs_normalization: placement.needs_normalization,
        }
    }

    #[must_use]
    /// Section being moved.
    pub fn dragged_section_id(&self) -> SectionId {
        self.dragged_section_id
    }

    #[must_use]
    /// Page id if the section was at page level before the move.
    pub fn old_parent_page_id(&self) -> Option<PageId> {
        self.old_parent_page_id
    }

    #[must_use]
    /// Parent section id if the section was nested before the move.
    pub fn old_parent_section_id(&self) -> Option<SectionId> {
        self.old_parent_section_id
    }

    #[must_use]
    /// Where the section was before the move.
    pub fn old_parent(&self) -> Parent {
        Parent::from(self.old_parent_section_id)
    }

    #[must_use]
    /// New parent section, or `None` for page level.
    pub fn new_parent_id(&self) -> Option<SectionId> {
        self.new_parent_id
    }

    #[must_use]
    /// Where the section goes.
    pub fn new_parent(&self) -> Parent {
        Parent::from(self.new_parent_id)
    }

    #[must_use]
    /// Ordering key within the new parent.
    pub fn new_position(&self) -> Position {
        self.new_position
    }

    #[must_use]
    /// Every section travelling with the dragged one.
    pub fn descendant_ids(&self) -> &[SectionId] {
        &self.descendant_ids
    }

    #[must_use]
    /// Dragged section plus descendants.
    pub fn total_moving_items(&self) -> usize {
        self.total_moving_items
    }

    #[must_use]
    /// The destination sibling group should be renumbered.
    pub fn needs_normalization(&self) -> bool {
        self.needs_normalization
    }

    #[must_use]
    /// The persistence call this command maps to.
    pub fn to_request(&self, page_id: PageId) -> MoveRequest {
        let detach_from = self.old_parent();
        match self.new_parent_id {
            None => MoveRequest::AttachToPage {
                page_id,
                section_id: self.dragged_section_id,
                position: self.new_position,
                detach_from,
            },
            Some(parent_section_id) => MoveRequest::AttachToSection {
                parent_section_id,
                section_id: self.dragged_section_id,
                position: self.new_position,
                detach_from,
            },
        }
    }
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "snake_case")]
/// The two shapes of the backend's attach call.
pub enum MoveRequest {
    /// Attach a section directly under the page.
    AttachToPage {
        /// Page receiving the section.
        page_id: PageId,
        /// Section being attached.
        section_id: SectionId,
        /// Ordering key among page-level sections.
        position: Position,
        /// Previous location, detached in the same call.
        detach_from: Parent,
    },
    /// Attach a section under another section.
    AttachToSection {
        /// Section receiving the child.
        parent_section_id: SectionId,
        /// Section being attached.
        section_id: SectionId,
        /// Ordering key among the parent's children.
        position: Position,
        /// Previous location, detached in the same call.
        detach_from: Parent,
    },
}

#[cfg(test)]
#[path = "tests/move_command.rs"]
mod tests;
