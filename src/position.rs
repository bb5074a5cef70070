//! Ordering keys for newly placed or moved siblings.
//!
//! Positions are spaced ten apart and seeded at five (5, 15, 25, ...), which keeps them legible
//! and leaves room to insert between neighbours without renumbering anyone else. When a gap gets
//! too small the placement is flagged so the owner can renumber the whole group to 0, 10, 20, ...
//!
//! Nothing here assumes contiguous positions or even distinct ones: neighbours are only ever
//! compared by relative order.

use crate::section::Position;
use serde::{Deserialize, Serialize};

/// Spacing between consecutive siblings.
pub const STEP: Position = 10;

/// First position under the standard scheme, and the offset used when packing tighter.
pub const FIRST_POSITION: Position = 5;

/// First position under the provisional scheme.
pub const PROVISIONAL_POSITION: Position = -1;

/// Default gap at or below which a placement asks for normalization.
pub const DEFAULT_NORMALIZATION_GAP: Position = 2;

/// Gap threshold for the strict scheme.
pub const STRICT_NORMALIZATION_GAP: Position = 10;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
/// How the first position of a group is seeded.
pub enum PositionScheme {
    /// Seed at `5` and never go below it when inserting at the front if avoidable.
    #[default]
    Standard,
    /// Seed at `-1`, marking the item as not yet normalized; front inserts may go negative.
    Provisional,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
/// A computed position and whether the sibling group should be renumbered.
pub struct Placement {
    /// Position for the placed section.
    pub position: Position,
    /// Set when the gap to a neighbour is exhausted.
    pub needs_normalization: bool,
}

impl Placement {
    fn exact(position: Position) -> Self {
        Self {
            position,
            needs_normalization: false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Position arithmetic under a chosen scheme and normalization threshold.
pub struct PositionAlgebra {
    /// Seeding convention, applied uniformly.
    pub scheme: PositionScheme,
    /// Gap at or below which placements are flagged.
    pub normalization_gap: Position,
}

impl Default for PositionAlgebra {
    fn default() -> Self {
        Self::new(PositionScheme::Standard, DEFAULT_NORMALIZATION_GAP)
    }
}

impl PositionAlgebra {
    #[must_use]
    /// Creates an algebra for `scheme`, flagging gaps of `normalization_gap` or less.
    pub fn new(scheme: PositionScheme, normalization_gap: Position) -> Self {
        Self {
            scheme,
            normalization_gap,
        }
    }

    #[must_use]
    /// Position for the only item of an empty group.
    pub fn first(&self) -> Placement {
        match self.scheme {
            PositionScheme::Standard => Placement::exact(FIRST_POSITION),
            PositionScheme::Provisional => Placement::exact(PROVISIONAL_POSITION),
        }
    }

    #[must_use]
    /// Position after the current last sibling.
    pub fn append_after(&self, last: Position) -> Placement {
        Placement::exact(last.saturating_add(STEP))
    }

    #[must_use]
    /// Position in front of the current first sibling.
    pub fn before_first(&self, first: Position) -> Placement {
        match self.scheme {
            PositionScheme::Standard => {
                let candidate = FIRST_POSITION.max(first.saturating_sub(STEP));
                if candidate < first {
                    self.flagged(candidate, first - candidate)
                } else {
                    // No room above the floor; leave the 5/15/25 convention and renumber later.
                    Placement {
                        position: first.saturating_sub(FIRST_POSITION),
                        needs_normalization: true,
                    }
                }
            }
            PositionScheme::Provisional => {
                let position = first.saturating_sub(STEP);
                self.flagged(position, first - position)
            }
        }
    }

    #[must_use]
    /// Position between two neighbours, in whichever order they are given.
    pub fn between(&self, a: Position, b: Position) -> Placement {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let gap = hi.saturating_sub(lo);
        let position = if gap > STEP {
            lo + gap / 2
        } else if lo.saturating_add(FIRST_POSITION) < hi {
            lo + FIRST_POSITION
        } else if gap >= 2 {
            lo + gap / 2
        } else {
            // Nothing fits; the collision is resolved by renumbering the group.
            lo.saturating_add(1)
        };
        self.flagged(position, gap)
    }

    #[must_use]
    /// Dispatches on which neighbours exist around the insertion slot.
    pub fn for_slot(&self, before: Option<Position>, after: Option<Position>) -> Placement {
        match (before, after) {
            (None, None) => self.first(),
            (Some(before), None) => self.append_after(before),
            (None, Some(after)) => self.before_first(after),
            (Some(before), Some(after)) => self.between(before, after),
        }
    }

    fn flagged(&self, position: Position, gap: Position) -> Placement {
        Placement {
            position,
            needs_normalization: gap <= self.normalization_gap,
        }
    }
}

#[must_use]
/// Evenly spaced positions `0, 10, 20, ...` for a group of `count` siblings.
pub fn normalized(count: usize) -> Vec<Position> {
    (0..count)
        .scan(0, |next, _| {
            let position = *next;
            *next += STEP;
            Some(position)
        })
        .collect()
}

#[cfg(test)]
#[path = "tests/position.rs"]
mod tests;
