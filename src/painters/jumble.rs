//! Jumble painter - randomized local pixel swaps
//!
//! Every dab shuffles pixels inside the footprint by swapping pairs. A swap
//! changes two pixels at once, which the single-pixel coverage records cannot
//! express, so this painter tracks explicit before/after maps instead.
//!
//! Sampling is retry-bounded: in sparse or tightly selected regions a dab can
//! perform fewer swaps than its event count asks for.

use indexmap::IndexMap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::core::contracts::JumbleSettings;
use crate::pixel::alpha;
use crate::stroke::{
    radial_falloff, stamp_origin, DirtyRect, PixelChange, StampPainter, StrokeContext, StrokeDiff,
};
use crate::surface::Surface;

/// Draws allowed when looking for an unused source pixel
const MAX_SOURCE_ATTEMPTS: usize = 8;
/// Partner candidates tried per event
const MAX_PARTNER_ATTEMPTS: usize = 8;
/// Partners this close are always accepted
const NEIGHBOR_DISTANCE: f32 = 1.5;
/// Steepness of the locality falloff
const LOCALITY_FALLOFF: f32 = 4.0;

#[derive(Debug, Clone, Copy)]
struct Candidate {
    index: usize,
    x: i32,
    y: i32,
}

#[derive(Debug)]
pub struct JumblePainter {
    settings: JumbleSettings,
    rng: StdRng,
    snapshot: Option<Surface>,
    before: IndexMap<usize, u32>,
    after: IndexMap<usize, u32>,
    dirty: DirtyRect,
    active: bool,
    candidates: Vec<Candidate>,
    cumulative: Vec<f32>,
    used: Vec<bool>,
}

impl JumblePainter {
    pub fn new(settings: JumbleSettings) -> Self {
        Self {
            rng: seeded_rng(settings.seed),
            settings,
            snapshot: None,
            before: IndexMap::new(),
            after: IndexMap::new(),
            dirty: DirtyRect::empty(),
            active: false,
            candidates: Vec::new(),
            cumulative: Vec::new(),
            used: Vec::new(),
        }
    }

    /// Swap events for a dab over `eligible` pixels, never more than the
    /// number of disjoint pairs
    fn event_count(&self, eligible: usize) -> usize {
        let pairs = eligible / 2;
        if let Some(events) = self.settings.events_per_dab {
            return (events as usize).min(pairs);
        }
        let strength = self.settings.strength.min(1.0);
        if strength.is_nan() || strength <= 0.0 || pairs == 0 {
            return 0;
        }
        ((strength * eligible as f32 / 2.0).ceil() as usize).clamp(1, pairs)
    }

    /// Weighted draw of a candidate that is not used yet this dab
    fn draw_unused(&mut self, total: f32, attempts: usize) -> Option<usize> {
        for _ in 0..attempts {
            let pick = sample_weighted(&mut self.rng, &self.cumulative, total)?;
            if !self.used[pick] {
                return Some(pick);
            }
        }
        None
    }

    /// Swap two pixels in the live surface, recording both sides
    fn swap(&mut self, surface: &mut Surface, a: Candidate, b: Candidate) -> bool {
        let (Some(color_a), Some(color_b)) = (surface.pixel(a.index), surface.pixel(b.index))
        else {
            return false;
        };
        if color_a == color_b {
            return false;
        }

        for (candidate, live) in [(a, color_a), (b, color_b)] {
            let original = self
                .snapshot
                .as_ref()
                .and_then(|s| s.pixel(candidate.index))
                .unwrap_or(live);
            self.before.entry(candidate.index).or_insert(original);
        }
        surface.set_pixel(a.index, color_b);
        surface.set_pixel(b.index, color_a);
        self.after.insert(a.index, color_b);
        self.after.insert(b.index, color_a);
        self.dirty.include(a.x, a.y);
        self.dirty.include(b.x, b.y);
        true
    }
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Index into `cumulative` drawn proportionally to each entry's weight
fn sample_weighted<R: Rng>(rng: &mut R, cumulative: &[f32], total: f32) -> Option<usize> {
    if cumulative.is_empty() || total.is_nan() || total <= 0.0 {
        return None;
    }
    let target = rng.gen::<f32>() * total;
    let pick = cumulative.partition_point(|&c| c <= target);
    Some(pick.min(cumulative.len() - 1))
}

/// Probability of accepting a partner `distance` pixels away from the source
/// in a footprint spanning `span` pixels
fn acceptance(distance: f32, span: f32, locality: f32) -> f32 {
    if locality >= 1.0 || distance <= NEIGHBOR_DISTANCE {
        return 1.0;
    }
    if locality <= 0.0 {
        return 0.0;
    }
    let normalized = ((distance - 1.0) / span.max(1.0)).clamp(0.0, 1.0);
    (-LOCALITY_FALLOFF * normalized * (1.0 - locality) / locality).exp()
}

impl StampPainter for JumblePainter {
    fn begin(&mut self, _surface: &Surface, snapshot: Option<Surface>) {
        self.rng = seeded_rng(self.settings.seed);
        self.snapshot = snapshot;
        self.before.clear();
        self.after.clear();
        self.dirty = DirtyRect::empty();
        self.active = true;
    }

    fn stamp_at(&mut self, surface: &mut Surface, x: f32, y: f32, ctx: &StrokeContext) {
        if !self.active {
            tracing::debug!("Jumble stamp outside of a stroke ignored");
            return;
        }
        let Some((cx, cy)) = stamp_origin(x, y) else {
            return;
        };

        let radius = ctx.footprint.radius();
        self.candidates.clear();
        self.cumulative.clear();
        let mut total = 0.0f32;
        for offset in ctx.footprint.offsets() {
            if offset.alpha == 0 {
                continue;
            }
            let Some(index) = ctx.target(cx, cy, offset) else {
                continue;
            };
            let Some(color) = surface.pixel(index) else {
                continue;
            };
            if self.settings.skip_transparent && alpha(color) == 0 {
                continue;
            }
            let weight = radial_falloff(offset.distance(), radius, 1.0);
            if weight <= 0.0 {
                continue;
            }
            total += weight;
            self.candidates.push(Candidate {
                index,
                x: cx + offset.dx,
                y: cy + offset.dy,
            });
            self.cumulative.push(total);
        }

        let eligible = self.candidates.len();
        if eligible < 2 {
            return;
        }
        let events = self.event_count(eligible);
        let span = 2.0 * radius + 1.0;
        self.used.clear();
        self.used.resize(eligible, false);

        let mut swaps = 0usize;
        for _ in 0..events {
            let Some(source) = self.draw_unused(total, MAX_SOURCE_ATTEMPTS) else {
                continue;
            };
            let src = self.candidates[source];

            let mut partner = None;
            for _ in 0..MAX_PARTNER_ATTEMPTS {
                let Some(pick) = self.draw_unused(total, 1) else {
                    continue;
                };
                if pick == source {
                    continue;
                }
                let other = self.candidates[pick];
                let (dx, dy) = ((other.x - src.x) as f32, (other.y - src.y) as f32);
                let distance = (dx * dx + dy * dy).sqrt();
                if self.rng.gen::<f32>() < acceptance(distance, span, self.settings.locality) {
                    partner = Some(pick);
                    break;
                }
            }
            let Some(partner) = partner else {
                continue;
            };

            self.used[source] = true;
            self.used[partner] = true;
            let other = self.candidates[partner];
            if self.swap(surface, src, other) {
                swaps += 1;
            }
        }
        tracing::trace!(
            "Jumble dab at ({}, {}): {} eligible, {} events, {} swaps",
            cx,
            cy,
            eligible,
            events,
            swaps
        );
    }

    fn end(&mut self, _surface: &Surface, description: &str) -> Option<StrokeDiff> {
        let changes: Vec<PixelChange> = self
            .before
            .iter()
            .map(|(&index, &before)| PixelChange {
                index,
                before,
                after: self.after.get(&index).copied().unwrap_or(before),
            })
            .collect();
        let touched = changes.len();
        let diff = StrokeDiff::from_changes(description, changes);

        self.snapshot = None;
        self.before.clear();
        self.after.clear();
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

    fn dirty_rect(&self) -> DirtyRect {
        self.dirty
    }

    fn is_active(&self) -> bool {
        self.active
    }
}
