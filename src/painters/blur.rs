//! Blur painter - 3×3 weighted blur sampled from the stroke-start snapshot
//!
//! Sampling never reads the live surface, so dabbing the same spot over and
//! over cannot blur already blurred pixels again.

use crate::pixel::{from_unit, lerp_premultiplied, to_unit};
use crate::stroke::{
    stamp_origin, DirtyRect, StampPainter, StrokeAccumulator, StrokeContext, StrokeDiff,
};
use crate::surface::Surface;

const KERNEL: [[f32; 3]; 3] = [[1.0, 2.0, 1.0], [2.0, 4.0, 2.0], [1.0, 2.0, 1.0]];

#[derive(Debug, Default)]
pub struct BlurPainter {
    accum: StrokeAccumulator,
    snapshot: Option<Surface>,
}

impl BlurPainter {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Alpha-weighted 3×3 blur of `(x, y)` in `source`.
///
/// Samples are premultiplied before weighting so transparent neighbors add no
/// color; neighbors outside the surface are dropped and the weights
/// renormalized.
pub fn blur_at(source: &Surface, x: i32, y: i32) -> u32 {
    let mut weight_sum = 0.0f32;
    let mut acc = [0.0f32; 4];

    for (ky, row) in KERNEL.iter().enumerate() {
        for (kx, &weight) in row.iter().enumerate() {
            let Some(color) = source.pixel_at(x + kx as i32 - 1, y + ky as i32 - 1) else {
                continue;
            };
            let [r, g, b, a] = to_unit(color);
            weight_sum += weight;
            acc[0] += weight * r * a;
            acc[1] += weight * g * a;
            acc[2] += weight * b * a;
            acc[3] += weight * a;
        }
    }

    if weight_sum <= 0.0 || acc[3] <= 0.0 {
        return 0;
    }
    from_unit([
        acc[0] / acc[3],
        acc[1] / acc[3],
        acc[2] / acc[3],
        acc[3] / weight_sum,
    ])
}

impl StampPainter for BlurPainter {
    fn begin(&mut self, surface: &Surface, snapshot: Option<Surface>) {
        self.accum.begin();
        self.snapshot = Some(snapshot.unwrap_or_else(|| surface.snapshot()));
    }

    fn stamp_at(&mut self, surface: &mut Surface, x: f32, y: f32, ctx: &StrokeContext) {
        let Some(snapshot) = self.snapshot.as_ref() else {
            tracing::debug!("Blur stamp outside of a stroke ignored");
            return;
        };
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
            let (px, py) = (cx + offset.dx, cy + offset.dy);
            self.accum.accumulate(surface, index, alpha, |record| {
                let blurred = blur_at(snapshot, px, py);
                Some(lerp_premultiplied(record.before, blurred, record.max_alpha))
            });
        }
    }

    fn end(&mut self, _surface: &Surface, description: &str) -> Option<StrokeDiff> {
        self.snapshot = None;
        self.accum.end(description)
    }

    fn dirty_rect(&self) -> DirtyRect {
        self.accum.dirty_rect()
    }

    fn is_active(&self) -> bool {
        self.accum.is_active()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::pixel::unpack;
    use crate::stroke::BrushFootprint;

    fn stripes() -> Surface {
        let mut surface = Surface::new(5, 5).unwrap();
        for y in 0..5 {
            for x in 0..5 {
                let color = if x % 2 == 0 { 0xFFFFFFFF } else { 0x000000FF };
                surface.set_pixel(y * 5 + x, color);
            }
        }
        surface
    }

    #[test]
    fn test_blur_at_uniform_is_identity() {
        let surface = Surface::filled(3, 3, 0x336699FF).unwrap();
        assert_eq!(blur_at(&surface, 1, 1), 0x336699FF);
        // Corner keeps its color after renormalization
        assert_eq!(blur_at(&surface, 0, 0), 0x336699FF);
    }

    #[test]
    fn test_blur_at_ignores_transparent_color() {
        let mut surface = Surface::new(3, 1).unwrap();
        surface.set_pixel(1, 0xFF0000FF);
        let [r, g, b, a] = unpack(blur_at(&surface, 1, 0));
        assert_eq!((r, g, b), (255, 0, 0));
        // weights 2 + 4 + 2 over one opaque center of weight 4
        assert_eq!(a, 128);
    }

    #[test]
    fn test_blur_mixes_stripes() {
        let mut surface = stripes();
        let ctx = StrokeContext::new(surface.geometry(), BrushFootprint::pixel());
        let mut painter = BlurPainter::new();
        painter.begin(&surface, None);
        painter.stamp_at(&mut surface, 2.0, 2.0, &ctx);

        let [r, _, _, a] = unpack(surface.pixel(12).unwrap());
        assert_eq!(a, 255);
        assert_eq!(r, 128);
    }

    #[test]
    fn test_repeated_dabs_do_not_compound() {
        let start = stripes();
        let footprint = BrushFootprint::square(3);

        let mut twice = start.clone();
        let mut painter = BlurPainter::new();
        painter.begin(&twice, None);
        let soft = StrokeContext::new(twice.geometry(), footprint.clone()).with_opacity(90);
        let strong = StrokeContext::new(twice.geometry(), footprint.clone()).with_opacity(200);
        painter.stamp_at(&mut twice, 2.0, 2.0, &soft);
        painter.stamp_at(&mut twice, 2.0, 2.0, &strong);
        painter.stamp_at(&mut twice, 2.0, 2.0, &strong);
        painter.end(&twice, "Blur");

        let mut once = start.clone();
        painter.begin(&once, None);
        painter.stamp_at(&mut once, 2.0, 2.0, &strong);
        painter.end(&once, "Blur");

        assert_eq!(twice, once);
        assert_ne!(once, start);
    }

    #[test]
    fn test_uses_provided_snapshot() {
        let mut surface = Surface::filled(3, 3, 0x000000FF).unwrap();
        let snapshot = Surface::filled(3, 3, 0xFFFFFFFF).unwrap();
        let ctx = StrokeContext::new(surface.geometry(), BrushFootprint::pixel());
        let mut painter = BlurPainter::new();
        painter.begin(&surface, Some(snapshot));
        painter.stamp_at(&mut surface, 1.0, 1.0, &ctx);
        assert_eq!(surface.pixel(4), Some(0xFFFFFFFF));
    }
}
