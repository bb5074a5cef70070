//! Parent/child compatibility between styles.
//!
//! Each style carries two allow-lists. An empty list leaves that direction unrestricted, so styles
//! created before relationships existed keep working. These checks run on every hover frame
//! during a drag and are plain slice lookups.

use crate::style::Style;

#[must_use]
/// Whether `parent` lets `child` sit directly inside it.
pub fn parent_allows_child(child: &Style, parent: &Style) -> bool {
    parent.allowed_children.is_empty() || parent.allowed_children.contains(&child.id)
}

#[must_use]
/// Whether `child` accepts `parent` as its container.
pub fn child_allows_parent(child: &Style, parent: &Style) -> bool {
    child.allowed_parents.is_empty() || child.allowed_parents.contains(&parent.id)
}

#[must_use]
/// Decides whether `child` may be placed under `parent`, or at page level when `parent` is `None`.
///
/// A style that lists allowed parents is never legal at page level: the page is not a style and
/// so can never appear in that list.
pub fn is_style_relationship_valid(child: &Style, parent: Option<&Style>) -> bool {
    match parent {
        None => child.allowed_parents.is_empty(),
        Some(parent) => parent_allows_child(child, parent) && child_allows_parent(child, parent),
    }
}

#[cfg(test)]
#[path = "tests/relationship.rs"]
mod tests;
