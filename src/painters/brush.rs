//! Brush painter - source-over blend of the foreground color

use crate::pixel::source_over;
use crate::stroke::{
    stamp_origin, DirtyRect, StampPainter, StrokeAccumulator, StrokeContext, StrokeDiff,
};
use crate::surface::Surface;

#[derive(Debug, Default)]
pub struct BrushPainter {
    accum: StrokeAccumulator,
}

impl BrushPainter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StampPainter for BrushPainter {
    fn begin(&mut self, _surface: &Surface, _snapshot: Option<Surface>) {
        self.accum.begin();
    }

    fn stamp_at(&mut self, surface: &mut Surface, x: f32, y: f32, ctx: &StrokeContext) {
        if !self.accum.is_active() {
            tracing::debug!("Brush stamp outside of a stroke ignored");
            return;
        }
        let Some((cx, cy)) = stamp_origin(x, y) else {
            return;
        };
        let hard = ctx.is_hard();

        for offset in ctx.footprint.offsets() {
            if offset.alpha == 0 {
                continue;
            }
            let Some(index) = ctx.target(cx, cy, offset) else {
                continue;
            };
            // A fully covered pixel of a hard brush cannot change again
            if hard
                && self
                    .accum
                    .record(index)
                    .is_some_and(|r| r.max_alpha == u8::MAX)
            {
                continue;
            }
            let alpha = ctx.effective_alpha(offset);
            self.accum.accumulate(surface, index, alpha, |record| {
                Some(source_over(ctx.foreground, record.max_alpha, record.before))
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
