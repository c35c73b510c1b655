//! Smudge painter - directional smear driven by a full-precision logical buffer
//!
//! The visible surface is 8-bit; many weak dabs would round away to nothing
//! if blending read from it. Instead the painter keeps four `f32` channel
//! planes (the logical state) seeded at stroke start, blends those, and only
//! writes a quantized (soft) or snapped (hard) result to the surface.
//!
//! States per stroke:
//! 1. No anchor yet: the first stamp only records its position.
//! 2. Tracking: each stamp smears along the unit vector from the previous
//!    stamp position; moves shorter than `min_move_distance` are dropped.
//!
//! Because logical drift can change pixels the footprint never recorded,
//! `end` diffs the whole stroke-start snapshot against the final surface.

use crate::core::contracts::{SmudgeMode, SmudgeSettings};
use crate::pixel::{alpha, from_unit, pack, to_unit, unpack, TRANSPARENT};
use crate::stroke::{
    radial_falloff, stamp_origin, DirtyRect, StampPainter, StrokeContext, StrokeDiff,
};
use crate::surface::Surface;

/// Logical alpha at or below this counts as empty
const EMPTY_ALPHA: f32 = 1.0 / 512.0;

/// Full-surface normalized channel planes
#[derive(Debug, Clone, PartialEq)]
struct LogicalBuffers {
    r: Vec<f32>,
    g: Vec<f32>,
    b: Vec<f32>,
    a: Vec<f32>,
}

impl LogicalBuffers {
    fn from_surface(surface: &Surface) -> Self {
        let len = surface.pixel_count();
        let mut buffers = Self {
            r: Vec::with_capacity(len),
            g: Vec::with_capacity(len),
            b: Vec::with_capacity(len),
            a: Vec::with_capacity(len),
        };
        for color in surface.pixels() {
            let [r, g, b, a] = to_unit(color);
            buffers.r.push(r);
            buffers.g.push(g);
            buffers.b.push(b);
            buffers.a.push(a);
        }
        buffers
    }

    #[inline]
    fn get(&self, index: usize) -> Option<[f32; 4]> {
        Some([
            *self.r.get(index)?,
            *self.g.get(index)?,
            *self.b.get(index)?,
            *self.a.get(index)?,
        ])
    }

    #[inline]
    fn set(&mut self, index: usize, value: [f32; 4]) {
        if index >= self.a.len() {
            return;
        }
        self.r[index] = value[0].clamp(0.0, 1.0);
        self.g[index] = value[1].clamp(0.0, 1.0);
        self.b[index] = value[2].clamp(0.0, 1.0);
        self.a[index] = value[3].clamp(0.0, 1.0);
    }
}

/// One destination update, computed against pre-dab state
#[derive(Debug, Clone, Copy)]
struct SmudgeWrite {
    dst: usize,
    blended: [f32; 4],
    /// Visible colors of source and destination before this dab
    src_visible: u32,
    dst_visible: u32,
}

#[derive(Debug, Default)]
pub struct SmudgePainter {
    settings: SmudgeSettings,
    snapshot: Option<Surface>,
    logical: Option<LogicalBuffers>,
    anchor: Option<(f32, f32)>,
    direction: Option<(f32, f32)>,
    dirty: DirtyRect,
    writes: Vec<SmudgeWrite>,
}

impl SmudgePainter {
    pub fn new(settings: SmudgeSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// Unit vector of the last accepted move
    pub fn direction(&self) -> Option<(f32, f32)> {
        self.direction
    }

    /// Advance the direction state machine. Returns the unit step to smear
    /// along, or `None` when this stamp must not touch pixels.
    fn track(&mut self, x: f32, y: f32) -> Option<(f32, f32)> {
        let Some((ax, ay)) = self.anchor else {
            self.anchor = Some((x, y));
            return None;
        };
        let (dx, dy) = (x - ax, y - ay);
        let dist = (dx * dx + dy * dy).sqrt();
        if dist < self.settings.min_move_distance.max(f32::EPSILON) {
            tracing::trace!("Smudge jitter dropped ({:.3}px)", dist);
            return None;
        }
        self.anchor = Some((x, y));
        let unit = (dx / dist, dy / dist);
        self.direction = Some(unit);
        Some(unit)
    }

    /// Blend destination toward source at factor `t`, resolving empty pixels
    /// when transparency blending is on. `None` means skip.
    fn blend(&self, src: [f32; 4], dst: [f32; 4], t: f32) -> Option<[f32; 4]> {
        let lerp = |d: f32, s: f32| d + (s - d) * t;
        if self.settings.blend_transparency {
            let src_empty = src[3] <= EMPTY_ALPHA;
            let dst_empty = dst[3] <= EMPTY_ALPHA;
            match (src_empty, dst_empty) {
                (true, true) => return None,
                // Dragging emptiness over paint leaves the paint in place
                (true, false) => return Some(dst),
                (false, true) => return Some([src[0], src[1], src[2], lerp(dst[3], src[3])]),
                (false, false) => {}
            }
        }
        Some([
            lerp(dst[0], src[0]),
            lerp(dst[1], src[1]),
            lerp(dst[2], src[2]),
            lerp(dst[3], src[3]),
        ])
    }

    /// Visible output for a blended logical value
    fn output(&self, write: &SmudgeWrite) -> u32 {
        match self.settings.mode {
            SmudgeMode::Soft => from_unit(write.blended),
            SmudgeMode::Hard => hard_snap(
                write.src_visible,
                write.dst_visible,
                write.blended,
                self.settings.hard_tolerance,
                self.settings.hard_alpha_threshold,
            ),
        }
    }
}

/// Snap RGB to whichever of source/destination is nearer to `blended` and
/// binarize alpha. The destination wins unless the source is closer by more
/// than `tolerance` (normalized RGB distance).
fn hard_snap(src: u32, dst: u32, blended: [f32; 4], tolerance: f32, threshold: f32) -> u32 {
    let src_a = alpha(src);
    let dst_a = alpha(dst);

    let out_a = if src_a == u8::MAX && dst_a == u8::MAX {
        u8::MAX
    } else if blended[3] >= threshold {
        u8::MAX
    } else {
        0
    };
    if out_a == 0 {
        return TRANSPARENT;
    }

    let distance = |color: u32| {
        let [r, g, b, _] = to_unit(color);
        let (dr, dg, db) = (r - blended[0], g - blended[1], b - blended[2]);
        (dr * dr + dg * dg + db * db).sqrt()
    };

    let use_src = if dst_a == 0 {
        src_a > 0
    } else if src_a == 0 {
        false
    } else {
        distance(src) + tolerance < distance(dst)
    };

    let [r, g, b, _] = unpack(if use_src { src } else { dst });
    pack([r, g, b, out_a])
}

impl StampPainter for SmudgePainter {
    fn begin(&mut self, surface: &Surface, snapshot: Option<Surface>) {
        let snapshot = snapshot.unwrap_or_else(|| surface.snapshot());
        self.logical = Some(LogicalBuffers::from_surface(&snapshot));
        self.snapshot = Some(snapshot);
        self.anchor = None;
        self.direction = None;
        self.dirty = DirtyRect::empty();
        self.writes.clear();
    }

    fn stamp_at(&mut self, surface: &mut Surface, x: f32, y: f32, ctx: &StrokeContext) {
        if self.logical.is_none() {
            tracing::debug!("Smudge stamp outside of a stroke ignored");
            return;
        }
        if !x.is_finite() || !y.is_finite() {
            return;
        }
        let Some((ux, uy)) = self.track(x, y) else {
            return;
        };
        let Some((cx, cy)) = stamp_origin(x, y) else {
            return;
        };

        let strength = self.settings.strength.clamp(0.0, 1.0);
        let gamma = self.settings.gamma;
        let radius = ctx.footprint.radius();

        let mut writes = std::mem::take(&mut self.writes);
        writes.clear();
        if let Some(logical) = self.logical.as_ref() {
            for offset in ctx.footprint.offsets() {
                if offset.alpha == 0 {
                    continue;
                }
                let Some(dst) = ctx.target(cx, cy, offset) else {
                    continue;
                };
                let (px, py) = (cx + offset.dx, cy + offset.dy);
                // One unit step back along the stroke, nearest pixel
                let sx = (px as f32 - ux).round() as i32;
                let sy = (py as f32 - uy).round() as i32;
                let Some(src) = ctx.geometry.index_of(sx, sy) else {
                    continue;
                };

                let t = strength
                    * (ctx.effective_alpha(offset) as f32 / 255.0)
                    * radial_falloff(offset.distance(), radius, gamma);
                if t <= 0.0 {
                    continue;
                }

                let (Some(src_logical), Some(dst_logical)) = (logical.get(src), logical.get(dst))
                else {
                    continue;
                };
                let Some(blended) = self.blend(src_logical, dst_logical, t.min(1.0)) else {
                    continue;
                };
                let (Some(src_visible), Some(dst_visible)) = (surface.pixel(src), surface.pixel(dst))
                else {
                    continue;
                };
                writes.push(SmudgeWrite {
                    dst,
                    blended,
                    src_visible,
                    dst_visible,
                });
            }
        }

        for write in &writes {
            let out = self.output(write);
            if let Some(logical) = self.logical.as_mut() {
                logical.set(write.dst, write.blended);
            }
            if surface.set_pixel(write.dst, out) {
                let (px, py) = ctx.geometry.coords_of(write.dst);
                self.dirty.include(px, py);
            }
        }
        tracing::trace!("Smudge dab at ({}, {}): {} pixels", cx, cy, writes.len());
        self.writes = writes;
    }

    fn end(&mut self, surface: &Surface, description: &str) -> Option<StrokeDiff> {
        let snapshot = self.snapshot.take();
        self.logical = None;
        self.anchor = None;
        self.direction = None;
        self.dirty = DirtyRect::empty();
        self.writes = Vec::new();

        let diff = snapshot.and_then(|before| StrokeDiff::between(description, &before, surface));
        tracing::debug!(
            "{} stroke ended: {} changed",
            description,
            diff.as_ref().map_or(0, StrokeDiff::len)
        );
        diff
    }

    fn dirty_rect(&self) -> DirtyRect {
        self.dirty
    }

    fn is_active(&self) -> bool {
        self.logical.is_some()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::stroke::BrushFootprint;

    const RED: u32 = 0xFF0000FF;
    const BLUE: u32 = 0x0000FFFF;

    /// Left half red, right half blue
    fn split(width: u32, height: u32) -> Surface {
        let mut surface = Surface::new(width, height).unwrap();
        for y in 0..height {
            for x in 0..width {
                let color = if x < width / 2 { RED } else { BLUE };
                surface.set_pixel((y * width + x) as usize, color);
            }
        }
        surface
    }

    fn settings(mode: SmudgeMode, strength: f32) -> SmudgeSettings {
        SmudgeSettings {
            strength,
            mode,
            ..SmudgeSettings::default()
        }
    }

    #[test]
    fn test_first_stamp_only_anchors() {
        let mut surface = split(8, 1);
        let before = surface.clone();
        let ctx = StrokeContext::new(surface.geometry(), BrushFootprint::square(3));
        let mut painter = SmudgePainter::new(settings(SmudgeMode::Soft, 1.0));
        painter.begin(&surface, None);
        painter.stamp_at(&mut surface, 4.0, 0.0, &ctx);
        assert_eq!(surface, before);
        assert!(painter.direction().is_none());
        assert!(painter.end(&surface, "Smudge").is_none());
    }

    #[test]
    fn test_jitter_is_dropped() {
        let mut surface = split(8, 1);
        let before = surface.clone();
        let ctx = StrokeContext::new(surface.geometry(), BrushFootprint::square(3));
        let mut painter = SmudgePainter::new(settings(SmudgeMode::Soft, 1.0));
        painter.begin(&surface, None);
        painter.stamp_at(&mut surface, 4.0, 0.0, &ctx);
        painter.stamp_at(&mut surface, 4.2, 0.1, &ctx);
        assert_eq!(surface, before);
        assert!(painter.direction().is_none());

        // The anchor did not move, so the accumulated move now counts
        painter.stamp_at(&mut surface, 4.6, 0.0, &ctx);
        assert!(painter.direction().is_some());
    }

    #[test]
    fn test_soft_smear_drags_color_forward() {
        let mut surface = split(8, 1);
        let ctx = StrokeContext::new(surface.geometry(), BrushFootprint::pixel());
        let mut painter = SmudgePainter::new(settings(SmudgeMode::Soft, 0.5));
        painter.begin(&surface, None);
        painter.stamp_at(&mut surface, 3.0, 0.0, &ctx);
        painter.stamp_at(&mut surface, 4.0, 0.0, &ctx);

        let [r, _, b, a] = unpack(surface.pixel(4).unwrap());
        assert_eq!(a, 255);
        assert!(r > 100 && r < 155, "r = {}", r);
        assert!(b > 100 && b < 155, "b = {}", b);
        assert_eq!(painter.direction(), Some((1.0, 0.0)));

        let diff = painter.end(&surface, "Smudge").unwrap();
        assert_eq!(diff.len(), 1);
        assert_eq!(diff.changes[0].index, 4);
    }

    #[test]
    fn test_weak_dabs_accumulate_below_quantization() {
        let mut surface = split(2, 1);
        let ctx = StrokeContext::new(surface.geometry(), BrushFootprint::pixel());
        let mut painter = SmudgePainter::new(settings(SmudgeMode::Soft, 0.001));
        painter.begin(&surface, None);
        painter.stamp_at(&mut surface, 0.0, 0.0, &ctx);
        let mut x = 1.0;
        for _ in 0..400 {
            painter.stamp_at(&mut surface, x, 0.0, &ctx);
            // Alternate back and forth over the boundary, always moving right at x = 1
            x = if x == 1.0 { 0.0 } else { 1.0 };
        }
        let [r, _, _, _] = unpack(surface.pixel(1).unwrap());
        // A single dab moves r by ~0.25 levels; the logical buffer keeps the sum
        assert!(r > 0, "logical accumulation lost to rounding");
    }

    #[test]
    fn test_hard_mode_snaps_to_existing_colors() {
        let mut surface = split(8, 3);
        let ctx = StrokeContext::new(surface.geometry(), BrushFootprint::square(3));
        let mut painter = SmudgePainter::new(settings(SmudgeMode::Hard, 1.0));
        painter.begin(&surface, None);
        painter.stamp_line(&mut surface, 1.0, 1.0, 7.0, 1.0, &ctx);

        assert!(surface.pixels().all(|p| p == RED || p == BLUE));
        // Red was pushed into the blue half
        assert_eq!(surface.pixel_at(4, 1), Some(RED));
    }

    #[test]
    fn test_transparency_blending_cases() {
        let painter = SmudgePainter::new(SmudgeSettings::default());
        let empty = [0.0; 4];
        let red = [1.0, 0.0, 0.0, 1.0];
        let blue = [0.0, 0.0, 1.0, 1.0];

        assert_eq!(painter.blend(empty, empty, 0.5), None);
        assert_eq!(painter.blend(empty, red, 0.5), Some(red));
        assert_eq!(painter.blend(blue, empty, 0.5), Some([0.0, 0.0, 1.0, 0.5]));
        assert_eq!(painter.blend(blue, red, 0.5), Some([0.5, 0.0, 0.5, 1.0]));

        let plain = SmudgePainter::new(SmudgeSettings {
            blend_transparency: false,
            ..SmudgeSettings::default()
        });
        assert_eq!(plain.blend(empty, red, 0.5), Some([0.5, 0.0, 0.0, 0.5]));
    }

    #[test]
    fn test_smear_into_transparent_area() {
        // Red paint on the left, empty pixels on the right
        let mut surface = Surface::new(4, 1).unwrap();
        surface.set_pixel(0, RED);
        surface.set_pixel(1, RED);
        let start = surface.clone();
        let ctx = StrokeContext::new(surface.geometry(), BrushFootprint::pixel());

        let mut painter = SmudgePainter::new(settings(SmudgeMode::Soft, 0.5));
        painter.begin(&surface, None);
        painter.stamp_at(&mut surface, 1.0, 0.0, &ctx);
        painter.stamp_at(&mut surface, 2.0, 0.0, &ctx);

        // Destination takes the source color with only part of its alpha
        let [r, g, b, a] = unpack(surface.pixel(2).unwrap());
        assert_eq!((r, g, b), (255, 0, 0));
        assert!((127..=128).contains(&a), "a = {}", a);
        assert_eq!(surface.pixel(3), Some(TRANSPARENT));

        painter.stamp_at(&mut surface, 3.0, 0.0, &ctx);
        let [r, _, _, thinner] = unpack(surface.pixel(3).unwrap());
        assert_eq!(r, 255);
        assert!(thinner > 0 && thinner < a, "a = {}", thinner);
        assert_eq!(surface.pixel(1), Some(RED));

        let diff = painter.end(&surface, "Smudge").unwrap();
        assert_eq!(diff.len(), 2);

        // Dragging emptiness back over paint changes nothing
        let mut surface = start.clone();
        painter.begin(&surface, None);
        painter.stamp_at(&mut surface, 3.0, 0.0, &ctx);
        painter.stamp_at(&mut surface, 2.0, 0.0, &ctx);
        painter.stamp_at(&mut surface, 1.0, 0.0, &ctx);
        assert_eq!(surface, start);
        assert!(painter.end(&surface, "Smudge").is_none());
    }

    #[test]
    fn test_hard_snap_alpha_rules() {
        // Both solid: stays opaque even when the blend dipped
        assert_eq!(hard_snap(RED, BLUE, [0.5, 0.0, 0.5, 0.2], 0.02, 0.5) & 0xFF, 0xFF);
        // Empty source smeared into paint below the threshold erases
        assert_eq!(hard_snap(0, BLUE, [0.0, 0.0, 1.0, 0.3], 0.02, 0.5), TRANSPARENT);
        // Paint smeared into emptiness takes the source color
        assert_eq!(hard_snap(RED, 0, [1.0, 0.0, 0.0, 0.7], 0.02, 0.5), RED);
        // Tolerance keeps the destination on a near tie
        assert_eq!(hard_snap(RED, BLUE, [0.5, 0.0, 0.49, 1.0], 0.02, 0.5), BLUE);
        assert_eq!(hard_snap(RED, BLUE, [0.9, 0.0, 0.1, 1.0], 0.02, 0.5), RED);
    }

    #[test]
    fn test_smudge_is_deterministic() {
        let start = split(16, 9);
        let ctx = StrokeContext::new(start.geometry(), BrushFootprint::circle(5, 0.4));
        let path = [(3.0, 4.0), (5.5, 4.2), (7.1, 5.0), (9.0, 3.3), (12.4, 4.0)];

        let run = |mode: SmudgeMode| {
            let mut surface = start.clone();
            let mut painter = SmudgePainter::new(settings(mode, 0.7));
            painter.begin(&surface, None);
            for window in path.windows(2) {
                let ((x0, y0), (x1, y1)) = (window[0], window[1]);
                painter.stamp_line(&mut surface, x0, y0, x1, y1, &ctx);
            }
            let diff = painter.end(&surface, "Smudge");
            (surface, diff)
        };

        for mode in [SmudgeMode::Soft, SmudgeMode::Hard] {
            let (a, diff_a) = run(mode);
            let (b, diff_b) = run(mode);
            assert_eq!(a.as_bytes(), b.as_bytes());
            assert_eq!(diff_a, diff_b);
            assert!(diff_a.is_some());
        }
    }

    #[test]
    fn test_end_diff_reverts_to_snapshot() {
        let start = split(10, 4);
        let mut surface = start.clone();
        let ctx = StrokeContext::new(surface.geometry(), BrushFootprint::square(3));
        let mut painter = SmudgePainter::new(settings(SmudgeMode::Soft, 0.8));
        painter.begin(&surface, None);
        painter.stamp_line(&mut surface, 2.0, 2.0, 8.0, 2.0, &ctx);
        assert!(!painter.dirty_rect().is_empty());

        let diff = painter.end(&surface, "Smudge").unwrap();
        assert!(!painter.is_active());
        diff.revert(&mut surface);
        assert_eq!(surface, start);
    }
}
