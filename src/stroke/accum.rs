//! Accumulation contract shared by the coverage-based painters
//!
//! Every pixel touched by a stroke gets one [`AccumRecord`] holding the color
//! it had when the stroke first reached it and the highest effective alpha
//! applied to it so far. Results are always recomputed from `before` at
//! `max_alpha`, so a slow stroke that lays dozens of overlapping dabs on the
//! same pixel ends up exactly where a single dab at the highest alpha would.

use indexmap::IndexMap;

use super::diff::{PixelChange, StrokeDiff};
use super::DirtyRect;
use crate::surface::Surface;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccumRecord {
    /// Color before the stroke touched the pixel
    pub before: u32,
    /// Highest effective coverage applied this stroke; never decreases
    pub max_alpha: u8,
    /// Current result, mirrored in the live surface
    pub after: u32,
}

impl AccumRecord {
    pub fn new(live: u32) -> Self {
        Self {
            before: live,
            max_alpha: 0,
            after: live,
        }
    }
}

/// Per-stroke bookkeeping: records keyed by pixel index plus the dirty rect
#[derive(Debug, Default)]
pub struct StrokeAccumulator {
    records: IndexMap<usize, AccumRecord>,
    dirty: DirtyRect,
    active: bool,
}

impl StrokeAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset per-stroke state
    pub fn begin(&mut self) {
        self.records.clear();
        self.dirty = DirtyRect::empty();
        self.active = true;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Existing record for `index`, or a fresh one seeded from `live`.
    /// A fresh record is not stored until it is committed.
    pub fn get_or_create(&self, index: usize, live: u32) -> AccumRecord {
        self.records
            .get(&index)
            .copied()
            .unwrap_or_else(|| AccumRecord::new(live))
    }

    pub fn record(&self, index: usize) -> Option<&AccumRecord> {
        self.records.get(&index)
    }

    /// Write `record.after` into the live surface and keep the record for
    /// diffing. Later stamps of the same stroke see the new value.
    pub fn commit(&mut self, surface: &mut Surface, index: usize, record: AccumRecord) {
        if !surface.set_pixel(index, record.after) {
            return;
        }
        let (x, y) = surface.geometry().coords_of(index);
        self.dirty.include(x, y);
        self.records.insert(index, record);
    }

    /// Apply the monotonic coverage rule to one pixel.
    ///
    /// `alpha` is the stamp's effective alpha. When it does not exceed the
    /// recorded maximum, nothing happens. Otherwise the record's `max_alpha`
    /// is raised and `compose` computes the new color from the record;
    /// returning `None` leaves the pixel alone. Returns whether the pixel was
    /// committed.
    pub fn accumulate<F>(
        &mut self,
        surface: &mut Surface,
        index: usize,
        alpha: u8,
        compose: F,
    ) -> bool
    where
        F: FnOnce(&AccumRecord) -> Option<u32>,
    {
        if alpha == 0 {
            return false;
        }
        let Some(live) = surface.pixel(index) else {
            return false;
        };
        let mut record = self.get_or_create(index, live);
        if alpha <= record.max_alpha {
            return false;
        }
        record.max_alpha = alpha;
        let Some(after) = compose(&record) else {
            return false;
        };
        record.after = after;
        self.commit(surface, index, record);
        true
    }

    /// Number of pixels touched this stroke
    pub fn touched(&self) -> usize {
        self.records.len()
    }

    pub fn dirty_rect(&self) -> DirtyRect {
        self.dirty
    }

    /// Build the undo diff and release all per-stroke state
    pub fn end(&mut self, description: &str) -> Option<StrokeDiff> {
        let touched = self.records.len();
        let diff = StrokeDiff::from_changes(
            description,
            self.records.drain(..).map(|(index, record)| PixelChange {
                index,
                before: record.before,
                after: record.after,
            }),
        );
        self.dirty = DirtyRect::empty();
        self.active = false;

        tracing::debug!(
            "{} stroke ended: {} touched, {} changed",
            description,
            touched,
            diff.as_ref().map_or(0, StrokeDiff::len)
        );
        diff
    }
}
