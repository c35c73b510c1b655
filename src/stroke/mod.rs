//! Stroke module - the stamp-based painter capability and its bookkeeping

pub mod accum;
pub mod context;
pub mod diff;
mod line;

pub use accum::{AccumRecord, StrokeAccumulator};
pub use context::{radial_falloff, BrushFootprint, BrushOffset, Selection, StrokeContext};
pub use diff::{PixelChange, StrokeDiff};
pub use line::line_stamps;

use crate::surface::Surface;

/// Pixel rectangle touched by a stroke, `right`/`bottom` exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirtyRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Default for DirtyRect {
    fn default() -> Self {
        Self::empty()
    }
}

impl DirtyRect {
    pub const fn empty() -> Self {
        Self {
            left: i32::MAX,
            top: i32::MAX,
            right: i32::MIN,
            bottom: i32::MIN,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.left >= self.right || self.top >= self.bottom
    }

    pub fn include(&mut self, x: i32, y: i32) {
        self.left = self.left.min(x);
        self.top = self.top.min(y);
        self.right = self.right.max(x.saturating_add(1));
        self.bottom = self.bottom.max(y.saturating_add(1));
    }

    pub fn union(&mut self, other: &DirtyRect) {
        if other.is_empty() {
            return;
        }
        self.left = self.left.min(other.left);
        self.top = self.top.min(other.top);
        self.right = self.right.max(other.right);
        self.bottom = self.bottom.max(other.bottom);
    }

    pub fn width(&self) -> u32 {
        if self.is_empty() {
            0
        } else {
            (self.right - self.left) as u32
        }
    }

    pub fn height(&self) -> u32 {
        if self.is_empty() {
            0
        } else {
            (self.bottom - self.top) as u32
        }
    }
}

/// Center pixel of a stamp at canvas position `(x, y)`, `None` for
/// non-finite input
#[inline]
pub fn stamp_origin(x: f32, y: f32) -> Option<(i32, i32)> {
    if x.is_finite() && y.is_finite() {
        Some((x.floor() as i32, y.floor() as i32))
    } else {
        None
    }
}

/// A painting strategy driven by one press → move* → release stroke.
///
/// `begin` once, `stamp_at`/`stamp_line` per pointer sample in event order,
/// `end` once. Pixels change in place during every stamp, so skipping `end`
/// only loses the undo record. At most one stroke per painter is active.
pub trait StampPainter {
    /// Reset per-stroke state. `snapshot` is a stroke-start copy of
    /// `surface`; painters that need one take it themselves when absent.
    fn begin(&mut self, surface: &Surface, snapshot: Option<Surface>);

    fn stamp_at(&mut self, surface: &mut Surface, x: f32, y: f32, ctx: &StrokeContext);

    /// Stamp every `ctx.line_stride` pixels from `(x0, y0)` to `(x1, y1)`
    fn stamp_line(
        &mut self,
        surface: &mut Surface,
        x0: f32,
        y0: f32,
        x1: f32,
        y1: f32,
        ctx: &StrokeContext,
    ) {
        for (x, y) in line_stamps(x0, y0, x1, y1, ctx.line_stride) {
            self.stamp_at(surface, x, y, ctx);
        }
    }

    /// Finish the stroke. Returns `None` when no pixel changed.
    fn end(&mut self, surface: &Surface, description: &str) -> Option<StrokeDiff>;

    /// Pixels touched so far this stroke
    fn dirty_rect(&self) -> DirtyRect;

    fn is_active(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirty_rect_include_and_union() {
        let mut rect = DirtyRect::empty();
        assert!(rect.is_empty());
        assert_eq!(rect.width(), 0);

        rect.include(3, 4);
        assert_eq!((rect.width(), rect.height()), (1, 1));
        rect.include(1, 6);
        assert_eq!((rect.left, rect.top, rect.right, rect.bottom), (1, 4, 4, 7));

        let mut other = DirtyRect::empty();
        other.union(&rect);
        assert_eq!(other, rect);
        other.union(&DirtyRect::empty());
        assert_eq!(other, rect);
    }

    #[test]
    fn test_stamp_origin_floors() {
        assert_eq!(stamp_origin(1.7, 2.2), Some((1, 2)));
        assert_eq!(stamp_origin(-0.5, 0.0), Some((-1, 0)));
        assert_eq!(stamp_origin(f32::INFINITY, 0.0), None);
    }
}
