//! Section representation for the page content tree.
//!
//! A section is a node in a page's content tree. Its parent is implied by where it sits in the
//! tree rather than stored on the node, so moving a section means moving the value itself (and
//! with it every descendant). Sibling order is given by the numeric `position` key.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a section, unique across the whole page.
pub type SectionId = i64;

/// Identifier of a style definition.
pub type StyleId = i64;

/// Identifier of the page owning the tree.
pub type PageId = i64;

/// Signed ordering key, unique among siblings and not necessarily contiguous.
pub type Position = i64;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
/// Node in the content tree, carrying its own children.
pub struct Section {
    /// Stable identifier, unique across the page.
    pub id: SectionId,
    /// Display name (may encode provenance such as a timestamp prefix).
    pub name: String,
    /// Style assigned to this section.
    pub style_id: StyleId,
    /// Human-readable name of the style.
    #[serde(default)]
    pub style_name: String,
    /// Whether the style permits nested sections.
    #[serde(default)]
    pub can_have_children: bool,
    /// Ordering key among siblings; render order is ascending.
    pub position: Position,
    /// Directly nested sections, empty for leaves.
    #[serde(default)]
    pub children: Vec<Section>,
}

impl Section {
    #[must_use]
    /// Creates a childless section.
    pub fn new(
        id: SectionId,
        name: impl Into<String>,
        style_id: StyleId,
        can_have_children: bool,
        position: Position,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            style_id,
            style_name: String::new(),
            can_have_children,
            position,
            children: Vec::new(),
        }
    }

    #[must_use]
    /// Attaches `children` to this section.
    pub fn with_children(mut self, children: Vec<Section>) -> Self {
        self.children = children;
        self
    }

    #[must_use]
    /// Whether this section currently has any children.
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
/// Owner of a sibling group: the page itself or a containing section.
pub enum Parent {
    /// Direct child of the page ("page level").
    Page,
    /// Nested under the given section.
    Section(SectionId),
}

impl Parent {
    #[must_use]
    /// The parent section id, or `None` at page level.
    pub fn section_id(self) -> Option<SectionId> {
        match self {
            Self::Page => None,
            Self::Section(id) => Some(id),
        }
    }
}

impl From<Option<SectionId>> for Parent {
    fn from(id: Option<SectionId>) -> Self {
        id.map_or(Self::Page, Self::Section)
    }
}

impl fmt::Display for Parent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Page => write!(f, "page"),
            Self::Section(id) => write!(f, "section {id}"),
        }
    }
}
