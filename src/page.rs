//! The page controller: the owner of the authoritative tree on the far side of a move command.
//!
//! The drag engine only ever reads snapshots and emits commands. Whatever implements
//! [`PageController`] persists the change and publishes the next snapshot. [`LocalPage`] does this
//! against a JSON page file held in memory, which is what the terminal front-end edits.

use crate::move_command::{MoveCommand, MoveRequest};
use crate::position::normalized;
use crate::section::{PageId, Parent, Position, Section, SectionId};
use crate::tree::{RemovalImpact, SectionTree, TreeError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::rc::Rc;
use std::{fs, io};
use thiserror::Error;

#[derive(Error, Debug)]
/// Failures while loading, saving or mutating a page.
pub enum PageError {
    /// The page file could not be read or written.
    #[error("page file I/O failed: {0}")]
    Io(#[from] io::Error),
    /// The page file is not valid page JSON.
    #[error("malformed page file: {0}")]
    Json(#[from] serde_json::Error),
    /// The sections do not form a valid tree.
    #[error(transparent)]
    Tree(#[from] TreeError),
    /// A command referenced a section that does not exist.
    #[error("section {0} does not exist")]
    UnknownSection(SectionId),
    /// A command would nest a section inside its own subtree.
    #[error("section {section_id} cannot move under its own descendant {parent_id}")]
    Cycle {
        /// Section being moved.
        section_id: SectionId,
        /// Requested parent.
        parent_id: SectionId,
    },
    /// A command targets a parent whose style cannot hold children.
    #[error("section {0} cannot have children")]
    LeafParent(SectionId),
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
/// On-disk shape of a page: its id and the page-level sections.
pub struct PageDocument {
    /// Page owning the sections.
    pub page_id: PageId,
    /// Page-level sections, each carrying its children.
    #[serde(default)]
    pub sections: Vec<Section>,
}

/// Owner of the authoritative tree, receiving the engine's outbound requests.
pub trait PageController {
    /// The latest published snapshot.
    fn snapshot(&self) -> Rc<SectionTree>;

    /// Persists a move and publishes the resulting tree.
    ///
    /// # Errors
    ///
    /// Returns an error if the move is inconsistent with the current tree or cannot be persisted.
    fn commit_move(&mut self, command: &MoveCommand) -> Result<(), PageError>;

    /// Removes a section and its subtree, reporting how many sections went with it.
    ///
    /// # Errors
    ///
    /// Returns an error if the section does not exist or the removal cannot be persisted.
    fn remove_section(&mut self, id: SectionId) -> Result<RemovalImpact, PageError>;
}

/// In-memory page backed by an optional JSON document.
pub struct LocalPage {
    tree: Rc<SectionTree>,
    requests: Vec<MoveRequest>,
}

impl LocalPage {
    #[must_use]
    /// Wraps an existing snapshot.
    pub fn new(tree: SectionTree) -> Self {
        Self {
            tree: Rc::new(tree),
            requests: Vec::new(),
        }
    }

    /// Builds a page from a parsed document.
    ///
    /// # Errors
    ///
    /// Returns an error if the sections repeat an id.
    pub fn from_document(document: PageDocument) -> Result<Self, PageError> {
        Ok(Self::new(SectionTree::new(
            document.page_id,
            document.sections,
        )?))
    }

    /// Reads a page document from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or indexed.
    pub fn load(path: &Path) -> Result<Self, PageError> {
        let contents = fs::read_to_string(path)?;
        let document: PageDocument = serde_json::from_str(&contents)?;
        let page = Self::from_document(document)?;
        log::info!(
            "loaded page {} with {} sections from {}",
            page.tree.page_id(),
            page.tree.len(),
            path.display()
        );
        Ok(page)
    }

    #[must_use]
    /// The current tree as a document.
    pub fn document(&self) -> PageDocument {
        PageDocument {
            page_id: self.tree.page_id(),
            sections: self.tree.roots().to_vec(),
        }
    }

    /// Writes the current tree to `path` as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation or the write fails.
    pub fn save(&self, path: &Path) -> Result<(), PageError> {
        let json = serde_json::to_string_pretty(&self.document())?;
        fs::write(path, json)?;
        log::info!("saved page {} to {}", self.tree.page_id(), path.display());
        Ok(())
    }

    #[must_use]
    /// Persistence calls issued so far, in order.
    pub fn requests(&self) -> &[MoveRequest] {
        &self.requests
    }

    fn publish(&mut self, roots: Vec<Section>) -> Result<(), PageError> {
        self.tree = Rc::new(SectionTree::new(self.tree.page_id(), roots)?);
        Ok(())
    }
}

impl PageController for LocalPage {
    fn snapshot(&self) -> Rc<SectionTree> {
        Rc::clone(&self.tree)
    }

    fn commit_move(&mut self, command: &MoveCommand) -> Result<(), PageError> {
        let section_id = command.dragged_section_id();
        let old_parent = self
            .tree
            .find_parent(section_id)
            .ok_or(PageError::UnknownSection(section_id))?;

        let new_parent = command.new_parent();
        if let Parent::Section(parent_id) = new_parent {
            let parent = self
                .tree
                .find_by_id(parent_id)
                .ok_or(PageError::UnknownSection(parent_id))?;
            if parent_id == section_id || self.tree.is_descendant_of(section_id, parent_id) {
                return Err(PageError::Cycle {
                    section_id,
                    parent_id,
                });
            }
            if !parent.can_have_children {
                return Err(PageError::LeafParent(parent_id));
            }
        }

        let mut roots = self.tree.roots().to_vec();
        let mut moving =
            detach(&mut roots, old_parent, section_id).ok_or(PageError::UnknownSection(section_id))?;
        moving.position = command.new_position();

        let group = group_mut(&mut roots, new_parent).ok_or(PageError::UnknownSection(
            new_parent.section_id().unwrap_or(section_id),
        ))?;
        attach(group, moving, command.needs_normalization());

        self.requests.push(command.to_request(self.tree.page_id()));
        self.publish(roots)?;
        log::info!(
            "committed move of section {section_id} from {old_parent} to {new_parent} at {}",
            command.new_position()
        );
        Ok(())
    }

    fn remove_section(&mut self, id: SectionId) -> Result<RemovalImpact, PageError> {
        let impact = self
            .tree
            .removal_impact(id)
            .ok_or(PageError::UnknownSection(id))?;
        let parent = self
            .tree
            .find_parent(id)
            .ok_or(PageError::UnknownSection(id))?;

        let mut roots = self.tree.roots().to_vec();
        detach(&mut roots, parent, id).ok_or(PageError::UnknownSection(id))?;
        self.publish(roots)?;
        log::info!("removed section {id} and {} descendants", impact.descendant_count);
        Ok(impact)
    }
}

fn find_mut(roots: &mut [Section], id: SectionId) -> Option<&mut Section> {
    let mut pending: Vec<&mut Section> = roots.iter_mut().collect();
    while let Some(node) = pending.pop() {
        if node.id == id {
            return Some(node);
        }
        pending.extend(node.children.iter_mut());
    }
    None
}

fn group_mut(roots: &mut Vec<Section>, parent: Parent) -> Option<&mut Vec<Section>> {
    match parent {
        Parent::Page => Some(roots),
        Parent::Section(id) => find_mut(roots, id).map(|s| &mut s.children),
    }
}

/// Removes `id` together with its subtree from the group owned by `parent`.
fn detach(roots: &mut Vec<Section>, parent: Parent, id: SectionId) -> Option<Section> {
    let group = group_mut(roots, parent)?;
    let index = group.iter().position(|s| s.id == id)?;
    Some(group.remove(index))
}

/// Inserts `section` in position order, renumbering the group if asked to or if keys collide.
fn attach(group: &mut Vec<Section>, section: Section, normalize: bool) {
    let position: Position = section.position;
    let index = group.iter().take_while(|s| s.position < position).count();
    group.insert(index, section);

    let collides = group.windows(2).any(|w| w[0].position >= w[1].position);
    if normalize || collides {
        let count = group.len();
        for (sibling, position) in group.iter_mut().zip(normalized(count)) {
            sibling.position = position;
        }
    }
}

#[cfg(test)]
#[path = "tests/page.rs"]
mod tests;
