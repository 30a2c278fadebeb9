use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::catalog::{CatalogEntry, MIN_CATALOG_IMAGES};
use crate::collage::IMAGE_COUNT;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("The folder must contain at least 4 images.")]
    TooFewImages,
    #[error("You must select exactly 4 images.")]
    WrongCount,
}

/// The folder listing and which of its entries are selected.
#[derive(Debug, Default)]
pub struct ImageSelection {
    entries: Vec<CatalogEntry>,
    selected: BTreeSet<usize>,
}

impl ImageSelection {
    /// Replaces the listing and clears the selection.
    pub fn set_entries(&mut self, entries: Vec<CatalogEntry>) -> Result<(), SelectionError> {
        self.selected.clear();
        self.entries = entries;
        if self.entries.len() < MIN_CATALOG_IMAGES {
            return Err(SelectionError::TooFewImages);
        }
        Ok(())
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.contains(&index)
    }

    pub fn toggle(&mut self, index: usize) {
        if index >= self.entries.len() {
            return;
        }
        if !self.selected.remove(&index) {
            self.selected.insert(index);
        }
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    /// Selected paths in listing order, provided exactly four are selected.
    pub fn collage_inputs(&self) -> Result<Vec<PathBuf>, SelectionError> {
        if self.selected.len() != IMAGE_COUNT {
            return Err(SelectionError::WrongCount);
        }
        Ok(self
            .selected
            .iter()
            .map(|&i| self.entries[i].path.clone())
            .collect())
    }
}
