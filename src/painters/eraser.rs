//! Eraser painter - removes alpha, keeps RGB

use crate::pixel::{pack, unpack, TRANSPARENT};
use crate::stroke::{
    stamp_origin, DirtyRect, StampPainter, StrokeAccumulator, StrokeContext, StrokeDiff,
};
use crate::surface::Surface;

#[derive(Debug, Default)]
pub struct EraserPainter {
    accum: StrokeAccumulator,
}

impl EraserPainter {
    pub fn new() -> Self {
        Self::default()
    }
}

/// `before` with `coverage` subtracted from its alpha. Zero alpha yields the
/// all-zero pixel so no stale RGB survives.
fn erase(before: u32, coverage: u8) -> u32 {
    let [r, g, b, a] = unpack(before);
    match a.saturating_sub(coverage) {
        0 => TRANSPARENT,
        a => pack([r, g, b, a]),
    }
}

impl StampPainter for EraserPainter {
    fn begin(&mut self, _surface: &Surface, _snapshot: Option<Surface>) {
        self.accum.begin();
    }

    fn stamp_at(&mut self, surface: &mut Surface, x: f32, y: f32, ctx: &StrokeContext) {
        if !self.accum.is_active() {
            tracing::debug!("Eraser stamp outside of a stroke ignored");
            return;
        }
        let Some((cx, cy)) = stamp_origin(x, y) else {
            return;
        };

        for offset in ctx.footprint.offsets() {
            if offset.alpha == 0 {
                continue;
            }
            let Some(index) = ctx.target(cx, cy, offset) else {
                continue;
            };
            let alpha = ctx.effective_alpha(offset);
            self.accum.accumulate(surface, index, alpha, |record| {
                Some(erase(record.before, record.max_alpha))
            });
        }
    }

    fn end(&mut self, _surface: &Surface, description: &str) -> Option<StrokeDiff> {
        self.accum.end(description)
    }

    fn dirty_rect(&self) -> DirtyRect {
        self.accum.dirty_rect()
    }

    fn is_active(&self) -> bool {
        self.accum.is_active()
    }
}
