//! Style definitions and the catalog they are looked up in.
//!
//! Styles decide whether a section may have children and which parent/child styles are
//! compatible. The catalog is supplied once per drag session and only ever read.

use crate::section::StyleId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::{fs, io};
use thiserror::Error;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
/// Reusable type definition assigned to sections.
pub struct Style {
    /// Catalog identifier.
    pub id: StyleId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Whether sections of this style may contain other sections.
    #[serde(default)]
    pub can_have_children: bool,
    /// Styles this style may directly contain; empty means unrestricted.
    #[serde(default)]
    pub allowed_children: Vec<StyleId>,
    /// Styles this style may be placed under; empty means unrestricted.
    #[serde(default)]
    pub allowed_parents: Vec<StyleId>,
}

impl Style {
    #[must_use]
    /// Creates an unrestricted style.
    pub fn new(id: StyleId, name: impl Into<String>, can_have_children: bool) -> Self {
        Self {
            id,
            name: name.into(),
            can_have_children,
            allowed_children: Vec::new(),
            allowed_parents: Vec::new(),
        }
    }

    #[must_use]
    /// Restricts which styles may be nested directly inside this one.
    pub fn allow_children(mut self, children: impl IntoIterator<Item = StyleId>) -> Self {
        self.allowed_children = children.into_iter().collect();
        self
    }

    #[must_use]
    /// Restricts which styles this one may be nested under.
    pub fn allow_parents(mut self, parents: impl IntoIterator<Item = StyleId>) -> Self {
        self.allowed_parents = parents.into_iter().collect();
        self
    }
}

#[derive(Error, Debug)]
/// Failures while loading a style catalog.
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error("failed to read style catalog: {0}")]
    Io(#[from] io::Error),
    /// The catalog file is not valid JSON for a list of styles.
    #[error("malformed style catalog: {0}")]
    Json(#[from] serde_json::Error),
    /// Two definitions share an id.
    #[error("style {0} is defined more than once")]
    DuplicateStyle(StyleId),
}

#[derive(Clone, Debug, Default)]
/// Lookup table of styles keyed by id.
pub struct StyleCatalog {
    styles: HashMap<StyleId, Style>,
}

impl StyleCatalog {
    /// Builds a catalog from style definitions.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateStyle`] if two styles share an id.
    pub fn new(styles: impl IntoIterator<Item = Style>) -> Result<Self, CatalogError> {
        let mut map = HashMap::new();
        for style in styles {
            let id = style.id;
            if map.insert(id, style).is_some() {
                return Err(CatalogError::DuplicateStyle(id));
            }
        }
        Ok(Self { styles: map })
    }

    /// Reads a JSON array of style definitions.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON, or repeats an id.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let contents = fs::read_to_string(path)?;
        let styles: Vec<Style> = serde_json::from_str(&contents)?;
        let catalog = Self::new(styles)?;
        log::debug!("loaded {} styles from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    #[must_use]
    /// Looks up a style by id.
    pub fn get(&self, id: StyleId) -> Option<&Style> {
        self.styles.get(&id)
    }

    #[must_use]
    /// Number of styles in the catalog.
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    #[must_use]
    /// Whether the catalog holds no styles.
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}
