//! Stroke context - brush footprint, colors and selection fixed for one stroke

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::contracts::{EngineConfig, DEFAULT_LINE_STRIDE};
use crate::surface::CanvasGeometry;

/// One pixel of a brush footprint, relative to the stamp center
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrushOffset {
    pub dx: i32,
    pub dy: i32,
    /// Mask coverage (0 = untouched, 255 = full)
    pub alpha: u8,
}

impl BrushOffset {
    pub const fn new(dx: i32, dy: i32, alpha: u8) -> Self {
        Self { dx, dy, alpha }
    }

    /// Distance from the stamp center pixel
    #[inline]
    pub fn distance(&self) -> f32 {
        ((self.dx * self.dx + self.dy * self.dy) as f32).sqrt()
    }
}

/// Precomputed brush mask: offsets with per-offset alpha.
///
/// Generated by the brush subsystem. The builders here cover the plain
/// square and round tips.
#[derive(Debug, Clone, PartialEq)]
pub struct BrushFootprint {
    offsets: Vec<BrushOffset>,
    density: u8,
    radius: f32,
}

impl BrushFootprint {
    pub fn from_offsets(offsets: Vec<BrushOffset>, density: u8) -> Self {
        let radius = offsets
            .iter()
            .map(BrushOffset::distance)
            .fold(0.0f32, f32::max);
        Self {
            offsets,
            density,
            radius,
        }
    }

    /// Single fully opaque pixel
    pub fn pixel() -> Self {
        Self::square(1)
    }

    /// Solid `size`×`size` square. Even sizes extend toward -x/-y.
    pub fn square(size: u32) -> Self {
        let size = size.max(1) as i32;
        let start = -(size / 2);
        let mut offsets = Vec::with_capacity((size * size) as usize);
        for dy in start..start + size {
            for dx in start..start + size {
                offsets.push(BrushOffset::new(dx, dy, u8::MAX));
            }
        }
        Self::from_offsets(offsets, u8::MAX)
    }

    /// Round tip of diameter `size`. `hardness` (0.0 - 1.0) is the fraction
    /// of the radius kept at full alpha; the rest fades linearly to the edge.
    pub fn circle(size: u32, hardness: f32) -> Self {
        let size = size.max(1) as i32;
        let hardness = if hardness.is_finite() {
            hardness.clamp(0.0, 1.0)
        } else {
            1.0
        };
        let radius = size as f32 / 2.0;
        // Even diameters are centered between pixels
        let center = if size % 2 == 0 { -0.5 } else { 0.0 };
        let solid = radius * hardness;
        let start = -(size / 2);

        let mut offsets = Vec::new();
        for dy in start..start + size {
            for dx in start..start + size {
                let fx = dx as f32 - center;
                let fy = dy as f32 - center;
                let dist = (fx * fx + fy * fy).sqrt();
                if dist > radius {
                    continue;
                }
                let alpha = if dist <= solid || radius <= solid {
                    u8::MAX
                } else {
                    let t = 1.0 - (dist - solid) / (radius - solid);
                    (t * 255.0).round().clamp(0.0, 255.0) as u8
                };
                if alpha > 0 {
                    offsets.push(BrushOffset::new(dx, dy, alpha));
                }
            }
        }

        let density = (hardness * 255.0).round() as u8;
        Self::from_offsets(offsets, density)
    }

    pub fn offsets(&self) -> &[BrushOffset] {
        &self.offsets
    }

    pub fn density(&self) -> u8 {
        self.density
    }

    /// Distance from center to the farthest offset
    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}

/// Radial weight in `[0, 1]` for a pixel `distance` away from the center of a
/// footprint of the given `radius`, shaped by `gamma`.
///
/// The edge ring of the footprint keeps a small non-zero weight.
pub fn radial_falloff(distance: f32, radius: f32, gamma: f32) -> f32 {
    if radius <= 0.0 {
        return 1.0;
    }
    let linear = (1.0 - distance / (radius + 1.0)).clamp(0.0, 1.0);
    if (gamma - 1.0).abs() < f32::EPSILON {
        linear
    } else {
        linear.powf(gamma.max(0.0))
    }
}

/// Selection predicate supplied by the selection subsystem
#[derive(Clone)]
pub struct Selection(Arc<dyn Fn(i32, i32) -> bool + Send + Sync>);

impl Selection {
    pub fn from_fn<F>(predicate: F) -> Self
    where
        F: Fn(i32, i32) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(predicate))
    }

    /// Rectangular selection, `right`/`bottom` exclusive
    pub fn rect(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self::from_fn(move |x, y| x >= left && x < right && y >= top && y < bottom)
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        (self.0)(x, y)
    }
}

impl fmt::Debug for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Selection(..)")
    }
}

/// Everything a painter needs to know about the brush for one stroke.
///
/// Captured once at stroke start by the tool layer and passed unchanged to
/// every stamp, so settings edited mid-stroke never pop into the stroke.
#[derive(Debug, Clone)]
pub struct StrokeContext {
    pub geometry: CanvasGeometry,
    pub footprint: BrushFootprint,
    /// Packed `0xRRGGBBAA`
    pub foreground: u32,
    /// Packed `0xRRGGBBAA`; the replacer's target color
    pub background: u32,
    /// Stroke opacity, multiplied into every offset's alpha
    pub opacity: u8,
    pub selection: Option<Selection>,
    /// Spacing of stamps interpolated by `stamp_line`
    pub line_stride: f32,
}

impl StrokeContext {
    pub fn new(geometry: CanvasGeometry, footprint: BrushFootprint) -> Self {
        Self {
            geometry,
            footprint,
            foreground: 0x000000FF,
            background: 0xFFFFFFFF,
            opacity: u8::MAX,
            selection: None,
            line_stride: DEFAULT_LINE_STRIDE,
        }
    }

    pub fn with_colors(mut self, foreground: u32, background: u32) -> Self {
        self.foreground = foreground;
        self.background = background;
        self
    }

    pub fn with_opacity(mut self, opacity: u8) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = Some(selection);
        self
    }

    pub fn with_line_stride(mut self, stride: f32) -> Self {
        if stride.is_finite() && stride > 0.0 {
            self.line_stride = stride;
        } else {
            tracing::warn!("Ignoring invalid line stride {}", stride);
        }
        self
    }

    /// Apply the engine-wide stroke settings
    pub fn with_config(self, config: &EngineConfig) -> Self {
        self.with_line_stride(config.line_stride)
    }

    /// Full density at full opacity: a stamp that can never be exceeded
    pub fn is_hard(&self) -> bool {
        self.opacity == u8::MAX && self.footprint.density() == u8::MAX
    }

    #[inline]
    pub fn in_selection(&self, x: i32, y: i32) -> bool {
        self.selection.as_ref().map_or(true, |s| s.contains(x, y))
    }

    /// Pixel index hit by `offset` when stamped at `(cx, cy)`, or `None` when
    /// it falls outside the canvas or the selection
    #[inline]
    pub fn target(&self, cx: i32, cy: i32, offset: &BrushOffset) -> Option<usize> {
        let x = cx.checked_add(offset.dx)?;
        let y = cy.checked_add(offset.dy)?;
        let index = self.geometry.index_of(x, y)?;
        self.in_selection(x, y).then_some(index)
    }

    /// Offset alpha scaled by stroke opacity
    #[inline]
    pub fn effective_alpha(&self, offset: &BrushOffset) -> u8 {
        crate::pixel::mul_u8(offset.alpha, self.opacity)
    }
}
