//! Painters module - the six stamp-based painting strategies
//!
//! Brush, Eraser, Replacer and Blur share the monotonic coverage records of
//! [`crate::stroke::StrokeAccumulator`]. Smudge drives a logical float buffer
//! and Jumble swaps pixel pairs; both keep their own bookkeeping.

mod blur;
mod brush;
mod eraser;
mod jumble;
mod replacer;
mod smudge;


pub use blur::{blur_at, BlurPainter};
pub use brush::BrushPainter;
pub use eraser::EraserPainter;
pub use jumble::JumblePainter;
pub use replacer::ReplacerPainter;
pub use smudge::SmudgePainter;

use crate::core::contracts::{EngineConfig, ToolKind};
use crate::stroke::{DirtyRect, StampPainter, StrokeContext, StrokeDiff};
use crate::surface::Surface;

/// Closed set of painting strategies behind one [`StampPainter`] interface
#[derive(Debug)]
pub enum Painter {
    Brush(BrushPainter),
    Eraser(EraserPainter),
    Replacer(ReplacerPainter),
    Blur(BlurPainter),
    Smudge(SmudgePainter),
    Jumble(JumblePainter),
}

macro_rules! dispatch {
    ($self:expr, $painter:ident => $body:expr) => {
        match $self {
            Painter::Brush($painter) => $body,
            Painter::Eraser($painter) => $body,
            Painter::Replacer($painter) => $body,
            Painter::Blur($painter) => $body,
            Painter::Smudge($painter) => $body,
            Painter::Jumble($painter) => $body,
        }
    };
}

impl Painter {
    /// Painter with default settings
    pub fn new(kind: ToolKind) -> Self {
        Self::from_config(kind, &EngineConfig::default())
    }

    pub fn from_config(kind: ToolKind, config: &EngineConfig) -> Self {
        match kind {
            ToolKind::Brush => Painter::Brush(BrushPainter::new()),
            ToolKind::Eraser => Painter::Eraser(EraserPainter::new()),
            ToolKind::Replacer => Painter::Replacer(ReplacerPainter::new(config.replacer)),
            ToolKind::Blur => Painter::Blur(BlurPainter::new()),
            ToolKind::Smudge => Painter::Smudge(SmudgePainter::new(config.smudge)),
            ToolKind::Jumble => Painter::Jumble(JumblePainter::new(config.jumble)),
        }
    }

    pub fn kind(&self) -> ToolKind {
        match self {
            Painter::Brush(_) => ToolKind::Brush,
            Painter::Eraser(_) => ToolKind::Eraser,
            Painter::Replacer(_) => ToolKind::Replacer,
            Painter::Blur(_) => ToolKind::Blur,
            Painter::Smudge(_) => ToolKind::Smudge,
            Painter::Jumble(_) => ToolKind::Jumble,
        }
    }
}

impl StampPainter for Painter {
    fn begin(&mut self, surface: &Surface, snapshot: Option<Surface>) {
        tracing::debug!(
            "{} stroke begin on {}x{} (snapshot: {})",
            self.kind().label(),
            surface.width(),
            surface.height(),
            snapshot.is_some()
        );
        dispatch!(self, p => p.begin(surface, snapshot))
    }

    fn stamp_at(&mut self, surface: &mut Surface, x: f32, y: f32, ctx: &StrokeContext) {
        dispatch!(self, p => p.stamp_at(surface, x, y, ctx))
    }

    fn stamp_line(
        &mut self,
        surface: &mut Surface,
        x0: f32,
        y0: f32,
        x1: f32,
        y1: f32,
        ctx: &StrokeContext,
    ) {
        dispatch!(self, p => p.stamp_line(surface, x0, y0, x1, y1, ctx))
    }

    fn end(&mut self, surface: &Surface, description: &str) -> Option<StrokeDiff> {
        dispatch!(self, p => p.end(surface, description))
    }

    fn dirty_rect(&self) -> DirtyRect {
        dispatch!(self, p => p.dirty_rect())
    }

    fn is_active(&self) -> bool {
        dispatch!(self, p => p.is_active())
    }
}
