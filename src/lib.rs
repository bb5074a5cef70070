//! sectree: drag-and-drop reordering engine for nested page sections.
//!
//! A page holds a forest of sections, each with a style that decides what it may contain and
//! where it may live. Dragging a section resolves, on every pointer move, to a band over the
//! hovered node, a new parent and a sibling position, or to the reason the drop is refused.
//! Releasing over a valid target emits a [`move_command::MoveCommand`] for the page controller
//! to persist; the engine itself never mutates the tree it reads.
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

/// Terminal application state and mouse-to-drag plumbing.
pub mod app_state;
/// Preferences loaded from sectree.toml.
pub mod config;
/// The drag gesture lifecycle.
pub mod drag_session;
/// Pointer-to-placement resolution.
pub mod drop_resolver;
/// The command a completed drag emits.
pub mod move_command;
/// Page controllers that own and persist the tree.
pub mod page;
/// Sibling position arithmetic.
pub mod position;
/// Style compatibility rules.
pub mod relationship;
/// Section data model.
pub mod section;
/// Style definitions and catalog.
pub mod style;
/// Tree snapshots and their index.
pub mod tree;
/// Rendering.
pub mod ui;

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
