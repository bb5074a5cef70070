//! Translates a pointer hovering over a node into a structural drop decision.
//!
//! The resolver knows nothing about windows or widgets. Callers hand it a [`VerticalFraction`]
//! (how far down the hovered node's box the pointer sits) and it answers with a band, a target
//! parent and a position, or with the reason the drop is not allowed.
//!
//! Bands are measured from each edge: the top `edge_threshold` of the box inserts above the
//! hovered node, the bottom `edge_threshold` inserts below it, and whatever remains in the middle
//! nests the dragged section inside the hovered one. A hovered node that cannot have children has
//! no middle band; those pointer positions insert below instead.

use crate::position::{Placement, PositionAlgebra};
use crate::relationship::is_style_relationship_valid;
use crate::section::{Parent, Position, Section, SectionId, StyleId};
use crate::style::StyleCatalog;
use crate::tree::SectionTree;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default size of the top and bottom bands as a fraction of the node height.
pub const DEFAULT_EDGE_THRESHOLD: f64 = 0.5;

#[derive(Error, Debug, Clone, Copy, PartialEq)]
/// Geometry that no real pointer or node box can produce.
pub enum GeometryError {
    /// A coordinate was NaN or infinite.
    #[error("pointer coordinate {0} is not finite")]
    NonFinite(f64),
    /// The hovered node's box has no usable height.
    #[error("target height {0} must be positive and finite")]
    InvalidHeight(f64),
}

#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
/// Pointer height within the hovered node, 0 at the top edge and 1 at the bottom.
pub struct VerticalFraction(f64);

impl VerticalFraction {
    /// Wraps a fraction, clamping it into `0..=1`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::NonFinite`] for NaN or infinite input.
    pub fn new(value: f64) -> Result<Self, GeometryError> {
        if value.is_finite() {
            Ok(Self(value.clamp(0.0, 1.0)))
        } else {
            Err(GeometryError::NonFinite(value))
        }
    }

    /// Computes `(pointer_y - top) / height` for a node box.
    ///
    /// # Errors
    ///
    /// Returns an error if any coordinate is not finite or `height` is not positive.
    pub fn from_rect(pointer_y: f64, top: f64, height: f64) -> Result<Self, GeometryError> {
        if !height.is_finite() || height <= 0.0 {
            return Err(GeometryError::InvalidHeight(height));
        }
        if !top.is_finite() {
            return Err(GeometryError::NonFinite(top));
        }
        if !pointer_y.is_finite() {
            return Err(GeometryError::NonFinite(pointer_y));
        }
        Self::new((pointer_y - top) / height)
    }

    #[must_use]
    /// The clamped fraction.
    pub fn value(self) -> f64 {
        self.0
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
/// Region of the hovered node the pointer is in.
pub enum DropBand {
    /// Insert as the previous sibling of the hovered node.
    Above,
    /// Insert as the last child of the hovered node.
    Inside,
    /// Insert as the next sibling of the hovered node.
    Below,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
/// Why a hovered node cannot take the dragged section.
pub enum Rejection {
    /// The id is not in the current snapshot (deleted or never existed).
    MissingSection(SectionId),
    /// Dropping a section onto itself.
    SelfDrop,
    /// The hovered node lies inside the dragged subtree.
    Cycle,
    /// A style referenced by the drop is not in the catalog.
    UnknownStyle(StyleId),
    /// The resolved parent's style does not allow children.
    ParentIsLeaf(SectionId),
    /// The parent and child styles are incompatible.
    RelationshipDenied,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
/// Where an accepted drop puts the dragged section.
pub struct DropPlacement {
    /// New owner of the dragged section.
    pub parent: Parent,
    /// New ordering key within that owner's children.
    pub position: Position,
    /// The target sibling group should be renumbered after the move.
    pub needs_normalization: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Outcome of resolving one hover.
pub struct DropResolution {
    /// Hovered node.
    pub target_id: SectionId,
    /// Band the pointer fell in.
    pub band: DropBand,
    /// Placement if the drop is legal.
    pub verdict: Result<DropPlacement, Rejection>,
}

impl DropResolution {
    #[must_use]
    /// Whether releasing here would commit a move.
    pub fn is_valid(&self) -> bool {
        self.verdict.is_ok()
    }

    #[must_use]
    /// The accepted placement, if any.
    pub fn placement(&self) -> Option<DropPlacement> {
        self.verdict.ok()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// Band geometry plus the position arithmetic used for accepted drops.
pub struct DropResolver {
    /// Height of the top and bottom bands, between 0 and 0.5.
    pub edge_threshold: f64,
    /// Position arithmetic for the resolved slot.
    pub algebra: PositionAlgebra,
}

impl Default for DropResolver {
    fn default() -> Self {
        Self::new(DEFAULT_EDGE_THRESHOLD, PositionAlgebra::default())
    }
}

impl DropResolver {
    #[must_use]
    /// Creates a resolver; the threshold is clamped into `0..=0.5`.
    pub fn new(edge_threshold: f64, algebra: PositionAlgebra) -> Self {
        let edge_threshold = if edge_threshold.is_finite() {
            edge_threshold.clamp(0.0, 0.5)
        } else {
            DEFAULT_EDGE_THRESHOLD
        };
        Self {
            edge_threshold,
            algebra,
        }
    }

    #[must_use]
    /// Classifies a pointer height for a node that can or cannot accept children.
    pub fn band(&self, fraction: VerticalFraction, can_have_children: bool) -> DropBand {
        let y = fraction.value();
        if y <= self.edge_threshold {
            DropBand::Above
        } else if y >= 1.0 - self.edge_threshold || !can_have_children {
            DropBand::Below
        } else {
            DropBand::Inside
        }
    }

    #[must_use]
    /// Resolves dropping `dragged_id` at `fraction` over `target_id`.
    pub fn resolve(
        &self,
        tree: &SectionTree,
        catalog: &StyleCatalog,
        dragged_id: SectionId,
        target_id: SectionId,
        fraction: VerticalFraction,
    ) -> DropResolution {
        let target = tree.find_by_id(target_id);
        let band = self.band(fraction, target.is_some_and(|t| t.can_have_children));
        let verdict = target
            .ok_or(Rejection::MissingSection(target_id))
            .and_then(|target| self.place(tree, catalog, dragged_id, target, band));

        match &verdict {
            Ok(placement) => log::trace!(
                "drop {dragged_id} {band:?} {target_id}: {} at {}",
                placement.parent,
                placement.position
            ),
            Err(rejection) => log::trace!("drop {dragged_id} {band:?} {target_id}: {rejection:?}"),
        }

        DropResolution {
            target_id,
            band,
            verdict,
        }
    }

    fn place(
        &self,
        tree: &SectionTree,
        catalog: &StyleCatalog,
        dragged_id: SectionId,
        target: &Section,
        band: DropBand,
    ) -> Result<DropPlacement, Rejection> {
        let dragged = tree
            .find_by_id(dragged_id)
            .ok_or(Rejection::MissingSection(dragged_id))?;
        if dragged.id == target.id {
            return Err(Rejection::SelfDrop);
        }
        if tree.is_descendant_of(dragged.id, target.id) {
            return Err(Rejection::Cycle);
        }

        let (parent, placement) = match band {
            DropBand::Inside => {
                let last = target
                    .children
                    .iter()
                    .rev()
                    .find(|s| s.id != dragged.id)
                    .map(|s| s.position);
                (
                    Parent::Section(target.id),
                    self.algebra.for_slot(last, None),
                )
            }
            DropBand::Above | DropBand::Below => {
                let parent = tree
                    .find_parent(target.id)
                    .ok_or(Rejection::MissingSection(target.id))?;
                let siblings = tree
                    .children_of(parent)
                    .ok_or(Rejection::MissingSection(target.id))?;
                (parent, self.beside(siblings, dragged.id, target, band))
            }
        };

        self.check_relationship(tree, catalog, dragged, parent)?;

        Ok(DropPlacement {
            parent,
            position: placement.position,
            needs_normalization: placement.needs_normalization,
        })
    }

    /// Position next to `target` among its siblings, ignoring the dragged section's old slot.
    fn beside(
        &self,
        siblings: &[Section],
        dragged_id: SectionId,
        target: &Section,
        band: DropBand,
    ) -> Placement {
        let remaining: Vec<Position> = siblings
            .iter()
            .filter(|s| s.id != dragged_id)
            .map(|s| s.position)
            .collect();
        let index = siblings
            .iter()
            .filter(|s| s.id != dragged_id)
            .position(|s| s.id == target.id)
            .unwrap_or(0);

        match band {
            DropBand::Above => {
                let before = index.checked_sub(1).map(|i| remaining[i]);
                self.algebra.for_slot(before, Some(target.position))
            }
            DropBand::Below | DropBand::Inside => {
                let after = remaining.get(index + 1).copied();
                self.algebra.for_slot(Some(target.position), after)
            }
        }
    }

    fn check_relationship(
        &self,
        tree: &SectionTree,
        catalog: &StyleCatalog,
        dragged: &Section,
        parent: Parent,
    ) -> Result<(), Rejection> {
        let child_style = catalog
            .get(dragged.style_id)
            .ok_or(Rejection::UnknownStyle(dragged.style_id))?;

        let parent_style = match parent {
            Parent::Page => None,
            Parent::Section(parent_id) => {
                let parent_section = tree
                    .find_by_id(parent_id)
                    .ok_or(Rejection::MissingSection(parent_id))?;
                if !parent_section.can_have_children {
                    return Err(Rejection::ParentIsLeaf(parent_id));
                }
                let style = catalog
                    .get(parent_section.style_id)
                    .ok_or(Rejection::UnknownStyle(parent_section.style_id))?;
                if !style.can_have_children {
                    return Err(Rejection::ParentIsLeaf(parent_id));
                }
                Some(style)
            }
        };

        if is_style_relationship_valid(child_style, parent_style) {
            Ok(())
        } else {
            Err(Rejection::RelationshipDenied)
        }
    }
}

#[cfg(test)]
#[path = "tests/drop_resolver.rs"]
mod tests;
