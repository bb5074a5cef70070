//! Immutable snapshots of the section tree and the index built over them.
//!
//! The page controller publishes a [`SectionTree`] and replaces it wholesale after every
//! mutation. Each snapshot indexes itself exactly once, so repeated lookups during a
//! drag never re-walk the tree, and a new snapshot is a new index.
//!
//! Nodes are numbered in depth-first pre-order. A node's subtree is then the contiguous range
//! `preorder..subtree_end`, which turns descendant checks into a range comparison.

use crate::section::{PageId, Parent, Section, SectionId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
/// Structural defects in a tree handed to [`SectionTree::new`].
pub enum TreeError {
    /// The same id appears more than once in the forest.
    #[error("section {0} appears more than once in the tree")]
    DuplicateId(SectionId),
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
/// How much of the tree disappears if a section is removed.
pub struct RemovalImpact {
    /// Section being removed.
    pub section_id: SectionId,
    /// Sections nested anywhere below it.
    pub descendant_count: usize,
}

impl RemovalImpact {
    #[must_use]
    /// The section itself plus its descendants.
    pub fn total(&self) -> usize {
        self.descendant_count + 1
    }
}

#[derive(Debug, Clone)]
struct IndexEntry {
    parent: Parent,
    path: Vec<usize>,
    depth: usize,
    preorder: usize,
    subtree_end: usize,
}

#[derive(Debug, Clone)]
/// Id lookup and subtree ranges for one snapshot.
struct TreeIndex {
    entries: HashMap<SectionId, IndexEntry>,
    preorder: Vec<SectionId>,
}

impl TreeIndex {
    fn build(roots: &[Section]) -> Result<Self, TreeError> {
        let mut entries = HashMap::new();
        let mut preorder = Vec::new();

        // (node, parent, path to node)
        let mut stack: Vec<(&Section, Parent, Vec<usize>)> = roots
            .iter()
            .enumerate()
            .rev()
            .map(|(i, s)| (s, Parent::Page, vec![i]))
            .collect();

        while let Some((section, parent, path)) = stack.pop() {
            for (i, child) in section.children.iter().enumerate().rev() {
                let mut child_path = path.clone();
                child_path.push(i);
                stack.push((child, Parent::Section(section.id), child_path));
            }

            let entry = IndexEntry {
                parent,
                depth: path.len() - 1,
                path,
                preorder: preorder.len(),
                subtree_end: 0,
            };
            if entries.insert(section.id, entry).is_some() {
                return Err(TreeError::DuplicateId(section.id));
            }
            preorder.push(section.id);
        }

        // A subtree ends at the next node that is no deeper than its root.
        let mut open: Vec<(SectionId, usize)> = Vec::new();
        let mut ends: Vec<(SectionId, usize)> = Vec::with_capacity(preorder.len());
        for (i, id) in preorder.iter().enumerate() {
            let depth = entries[id].depth;
            while let Some(&(top, top_depth)) = open.last() {
                if top_depth < depth {
                    break;
                }
                ends.push((top, i));
                open.pop();
            }
            open.push((*id, depth));
        }
        ends.extend(open.into_iter().map(|(id, _)| (id, preorder.len())));
        for (id, end) in ends {
            if let Some(entry) = entries.get_mut(&id) {
                entry.subtree_end = end;
            }
        }

        Ok(Self { entries, preorder })
    }

    fn descendants(&self, entry: &IndexEntry) -> &[SectionId] {
        &self.preorder[entry.preorder + 1..entry.subtree_end]
    }
}

#[derive(Debug, Clone)]
/// Read-only view of a page's forest with its index.
pub struct SectionTree {
    page_id: PageId,
    roots: Vec<Section>,
    index: TreeIndex,
}

impl SectionTree {
    /// Takes ownership of a forest, sorts every sibling group by position and indexes it.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::DuplicateId`] if an id occurs twice.
    pub fn new(page_id: PageId, mut roots: Vec<Section>) -> Result<Self, TreeError> {
        sort_by_position(&mut roots);
        let index = TreeIndex::build(&roots)?;
        Ok(Self {
            page_id,
            roots,
            index,
        })
    }

    #[must_use]
    /// Page that owns this tree.
    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    #[must_use]
    /// Page-level sections in render order.
    pub fn roots(&self) -> &[Section] {
        &self.roots
    }

    #[must_use]
    /// Number of sections in the tree.
    pub fn len(&self) -> usize {
        self.index.preorder.len()
    }

    #[must_use]
    /// Whether the page has no sections.
    pub fn is_empty(&self) -> bool {
        self.index.preorder.is_empty()
    }

    #[must_use]
    /// Whether `id` is present in this snapshot.
    pub fn contains(&self, id: SectionId) -> bool {
        self.index.entries.contains_key(&id)
    }

    #[must_use]
    /// Finds a section anywhere in the tree.
    pub fn find_by_id(&self, id: SectionId) -> Option<&Section> {
        let entry = self.index.entries.get(&id)?;
        let (first, rest) = entry.path.split_first()?;
        let mut node = self.roots.get(*first)?;
        for &i in rest {
            node = node.children.get(i)?;
        }
        Some(node)
    }

    #[must_use]
    /// The owner of `id`, or `None` if `id` is not in the tree.
    pub fn find_parent(&self, id: SectionId) -> Option<Parent> {
        self.index.entries.get(&id).map(|entry| entry.parent)
    }

    #[must_use]
    /// Nesting depth of `id`, zero at page level.
    pub fn depth(&self, id: SectionId) -> Option<usize> {
        self.index.entries.get(&id).map(|entry| entry.depth)
    }

    #[must_use]
    /// Every id below `id` in pre-order, excluding `id` itself.
    pub fn collect_descendant_ids(&self, id: SectionId) -> Option<Vec<SectionId>> {
        let entry = self.index.entries.get(&id)?;
        Some(self.index.descendants(entry).to_vec())
    }

    #[must_use]
    /// Whether `node` lies anywhere under `ancestor`. A node is not its own descendant.
    pub fn is_descendant_of(&self, ancestor: SectionId, node: SectionId) -> bool {
        match (
            self.index.entries.get(&ancestor),
            self.index.entries.get(&node),
        ) {
            (Some(a), Some(n)) => a.preorder < n.preorder && n.preorder < a.subtree_end,
            _ => false,
        }
    }

    /// All sections in depth-first pre-order.
    pub fn flatten(&self) -> impl Iterator<Item = &Section> + '_ {
        self.index
            .preorder
            .iter()
            .filter_map(move |id| self.find_by_id(*id))
    }

    #[must_use]
    /// The sibling group owned by `parent`, in render order.
    pub fn children_of(&self, parent: Parent) -> Option<&[Section]> {
        match parent {
            Parent::Page => Some(&self.roots),
            Parent::Section(id) => self.find_by_id(id).map(|s| s.children.as_slice()),
        }
    }

    #[must_use]
    /// What removing `id` would take with it.
    pub fn removal_impact(&self, id: SectionId) -> Option<RemovalImpact> {
        let entry = self.index.entries.get(&id)?;
        Some(RemovalImpact {
            section_id: id,
            descendant_count: entry.subtree_end - entry.preorder - 1,
        })
    }
}

fn sort_by_position(roots: &mut [Section]) {
    let mut pending: Vec<&mut [Section]> = vec![roots];
    while let Some(group) = pending.pop() {
        group.sort_by_key(|s| s.position);
        pending.extend(group.iter_mut().map(|s| s.children.as_mut_slice()));
    }
}

#[cfg(test)]
#[path = "tests/tree.rs"]
mod tests;
