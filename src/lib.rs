//! Pixelstroke - stroke-based pixel compositing for a pixel-art editor
//!
//! Six painters (brush, eraser, color replacer, blur, smudge, jumble) write
//! stamps into an RGBA [`Surface`] and hand back a minimal [`StrokeDiff`]
//! for undo when the stroke ends.

pub mod core;
pub mod painters;
pub mod pixel;
pub mod stroke;
pub mod surface;

pub use crate::core::contracts::{
    EngineConfig, JumbleSettings, ReplacerSettings, SmudgeMode, SmudgeSettings, ToolKind,
};
pub use crate::core::errors::CoreError;
pub use painters::Painter;
pub use stroke::{
    BrushFootprint, BrushOffset, DirtyRect, PixelChange, Selection, StampPainter, StrokeContext,
    StrokeDiff,
};
pub use surface::{CanvasGeometry, Surface};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global tracing subscriber.
///
/// Honors `RUST_LOG`; a subscriber installed earlier by the host wins.
pub fn init_logging() {
    let result = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pixelstroke=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();

    if result.is_ok() {
        tracing::info!("Pixelstroke logging initialized");
    }
}
