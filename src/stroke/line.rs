//! Fixed-stride stamp interpolation for fast pointer moves

/// Upper bound on stamps produced for one segment
const MAX_LINE_STAMPS: usize = 1 << 16;

/// Stamp positions from `(x0, y0)` to `(x1, y1)` inclusive, `stride` pixels apart
pub fn line_stamps(x0: f32, y0: f32, x1: f32, y1: f32, stride: f32) -> Vec<(f32, f32)> {
    if ![x0, y0, x1, y1].iter().all(|v| v.is_finite()) {
        return Vec::new();
    }
    let stride = if stride.is_finite() && stride > 0.0 {
        stride
    } else {
        1.0
    };

    let dx = x1 - x0;
    let dy = y1 - y0;
    let dist = (dx * dx + dy * dy).sqrt();
    if dist < f32::EPSILON {
        return vec![(x0, y0)];
    }

    let steps = ((dist / stride).ceil() as usize).clamp(1, MAX_LINE_STAMPS);
    let mut result = Vec::with_capacity(steps + 1);
    for step in 0..steps {
        let t = step as f32 / steps as f32;
        result.push((x0 + dx * t, y0 + dy * t));
    }
    // Exact endpoint, no accumulated rounding
    result.push((x1, y1));
    result
}
