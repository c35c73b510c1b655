//! Undo diff - the minimal per-stroke change record handed to history

use serde::{Deserialize, Serialize};

use super::DirtyRect;
use crate::surface::{CanvasGeometry, Surface};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PixelChange {
    pub index: usize,
    pub before: u32,
    pub after: u32,
}

/// Pixels changed by one stroke, sorted by index, never containing a
/// `before == after` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrokeDiff {
    pub description: String,
    pub changes: Vec<PixelChange>,
}

impl StrokeDiff {
    /// Build a diff from raw changes. Returns `None` if nothing changed.
    pub fn from_changes<I>(description: &str, changes: I) -> Option<Self>
    where
        I: IntoIterator<Item = PixelChange>,
    {
        let mut changes: Vec<PixelChange> =
            changes.into_iter().filter(|c| c.before != c.after).collect();
        if changes.is_empty() {
            return None;
        }
        changes.sort_unstable_by_key(|c| c.index);
        Some(Self {
            description: description.to_string(),
            changes,
        })
    }

    /// Full-surface comparison of two same-sized surfaces
    pub fn between(description: &str, before: &Surface, after: &Surface) -> Option<Self> {
        if before.geometry() != after.geometry() {
            tracing::warn!(
                "Cannot diff {}x{} against {}x{}",
                before.width(),
                before.height(),
                after.width(),
                after.height()
            );
            return None;
        }
        let changes = before
            .pixels()
            .zip(after.pixels())
            .enumerate()
            .filter(|(_, (b, a))| b != a)
            .map(|(index, (before, after))| PixelChange {
                index,
                before,
                after,
            });
        Self::from_changes(description, changes)
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn change_at(&self, index: usize) -> Option<&PixelChange> {
        self.changes
            .binary_search_by_key(&index, |c| c.index)
            .ok()
            .map(|i| &self.changes[i])
    }

    /// Write every `before` value back (undo)
    pub fn revert(&self, surface: &mut Surface) {
        for change in &self.changes {
            surface.set_pixel(change.index, change.before);
        }
    }

    /// Write every `after` value (redo)
    pub fn apply(&self, surface: &mut Surface) {
        for change in &self.changes {
            surface.set_pixel(change.index, change.after);
        }
    }

    /// Bounding rectangle of the changed pixels
    pub fn bounds(&self, geometry: CanvasGeometry) -> DirtyRect {
        let mut rect = DirtyRect::empty();
        for change in &self.changes {
            let (x, y) = geometry.coords_of(change.index);
            rect.include(x, y);
        }
        rect
    }
}
