//! Replacer painter - recolors pixels matching the background color

use crate::core::contracts::ReplacerSettings;
use crate::pixel::{alpha, lerp_rgb, rgb_eq};
use crate::stroke::{
    stamp_origin, DirtyRect, StampPainter, StrokeAccumulator, StrokeContext, StrokeDiff,
};
use crate::surface::Surface;

#[derive(Debug, Default)]
pub struct ReplacerPainter {
    settings: ReplacerSettings,
    accum: StrokeAccumulator,
}

impl ReplacerPainter {
    pub fn new(settings: ReplacerSettings) -> Self {
        Self {
            settings,
            accum: StrokeAccumulator::new(),
        }
    }

    /// Whether a pixel with original color `before` may be replaced
    fn is_eligible(&self, before: u32, target: u32) -> bool {
        rgb_eq(before, target) && (self.settings.ignore_alpha || alpha(before) == u8::MAX)
    }
}

impl StampPainter for ReplacerPainter {
    fn begin(&mut self, _surface: &Surface, _snapshot: Option<Surface>) {
        self.accum.begin();
    }

    fn stamp_at(&mut self, surface: &mut Surface, x: f32, y: f32, ctx: &StrokeContext) {
        if !self.accum.is_active() {
            tracing::debug!("Replacer stamp outside of a stroke ignored");
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
            let Some(live) = surface.pixel(index) else {
                continue;
            };
            // Eligibility is judged on the stroke-start color, not the live one
            let before = self.accum.get_or_create(index, live).before;
            if !self.is_eligible(before, ctx.background) {
                continue;
            }
            let alpha = ctx.effective_alpha(offset);
            self.accum.accumulate(surface, index, alpha, |record| {
                Some(lerp_rgb(record.before, ctx.foreground, record.max_alpha))
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
