//! Pixel codec and blend math
//!
//! Surfaces store pixels as 4 bytes in R, G, B, A order (straight alpha).
//! Painters move pixels around as packed `u32` values laid out `0xRRGGBBAA`;
//! all conversions go through [`pack`] and [`unpack`] so the channel order is
//! defined in exactly one place.

/// Fully transparent pixel. Erased pixels are forced to this value.
pub const TRANSPARENT: u32 = 0;

/// Pack RGBA bytes into `0xRRGGBBAA`
#[inline]
pub const fn pack(rgba: [u8; 4]) -> u32 {
    u32::from_be_bytes(rgba)
}

/// Unpack `0xRRGGBBAA` into RGBA bytes
#[inline]
pub const fn unpack(color: u32) -> [u8; 4] {
    color.to_be_bytes()
}

#[inline]
pub const fn alpha(color: u32) -> u8 {
    (color & 0xFF) as u8
}

/// Compare RGB only
#[inline]
pub const fn rgb_eq(a: u32, b: u32) -> bool {
    (a >> 8) == (b >> 8)
}

/// `a * b / 255`, rounded
#[inline]
pub fn mul_u8(a: u8, b: u8) -> u8 {
    let v = a as u32 * b as u32 + 128;
    ((v + (v >> 8)) >> 8) as u8
}

/// Round and clamp a float channel into `0..=255`
#[inline]
pub fn clamp_channel(value: f32) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 255.0) as u8
}

/// Normalized RGBA floats, straight alpha
#[inline]
pub fn to_unit(color: u32) -> [f32; 4] {
    let [r, g, b, a] = unpack(color);
    [
        r as f32 / 255.0,
        g as f32 / 255.0,
        b as f32 / 255.0,
        a as f32 / 255.0,
    ]
}

/// Quantize normalized RGBA back to a packed pixel.
///
/// A pixel whose alpha rounds to zero becomes [`TRANSPARENT`].
#[inline]
pub fn from_unit(rgba: [f32; 4]) -> u32 {
    let a = clamp_channel(rgba[3] * 255.0);
    if a == 0 {
        return TRANSPARENT;
    }
    pack([
        clamp_channel(rgba[0] * 255.0),
        clamp_channel(rgba[1] * 255.0),
        clamp_channel(rgba[2] * 255.0),
        a,
    ])
}

/// Source-over compositing of `src` onto `dst`, with `src`'s own alpha
/// additionally scaled by `coverage`.
pub fn source_over(src: u32, coverage: u8, dst: u32) -> u32 {
    let [sr, sg, sb, sa] = unpack(src);
    let [dr, dg, db, da] = unpack(dst);

    let sa = mul_u8(sa, coverage) as f32 / 255.0;
    if sa <= 0.0 {
        return dst;
    }
    let da = da as f32 / 255.0;
    let dst_weight = da * (1.0 - sa);
    let out_a = sa + dst_weight;
    if out_a <= 0.0 {
        return TRANSPARENT;
    }

    let channel = |s: u8, d: u8| clamp_channel((s as f32 * sa + d as f32 * dst_weight) / out_a);
    let a = clamp_channel(out_a * 255.0);
    if a == 0 {
        return TRANSPARENT;
    }
    pack([channel(sr, dr), channel(sg, dg), channel(sb, db), a])
}

/// Move the RGB of `from` toward `to` by `t / 255`; alpha of `from` is kept.
pub fn lerp_rgb(from: u32, to: u32, t: u8) -> u32 {
    let [fr, fg, fb, fa] = unpack(from);
    let [tr, tg, tb, _] = unpack(to);
    let t = t as f32 / 255.0;
    let channel = |f: u8, to: u8| clamp_channel(f as f32 + (to as f32 - f as f32) * t);
    pack([channel(fr, tr), channel(fg, tg), channel(fb, tb), fa])
}

/// Interpolate all four channels in premultiplied space by `t / 255`.
///
/// Transparent endpoints contribute no color, so blending toward or away
/// from an empty pixel never drags RGB toward black.
pub fn lerp_premultiplied(from: u32, to: u32, t: u8) -> u32 {
    let t = t as f32 / 255.0;
    let f = premultiply(to_unit(from));
    let g = premultiply(to_unit(to));
    let mixed = [
        f[0] + (g[0] - f[0]) * t,
        f[1] + (g[1] - f[1]) * t,
        f[2] + (g[2] - f[2]) * t,
        f[3] + (g[3] - f[3]) * t,
    ];
    from_unit(unpremultiply(mixed))
}

#[inline]
pub fn premultiply(rgba: [f32; 4]) -> [f32; 4] {
    [rgba[0] * rgba[3], rgba[1] * rgba[3], rgba[2] * rgba[3], rgba[3]]
}

#[inline]
pub fn unpremultiply(rgba: [f32; 4]) -> [f32; 4] {
    let a = rgba[3];
    if a <= 0.0 {
        return [0.0; 4];
    }
    [
        (rgba[0] / a).clamp(0.0, 1.0),
        (rgba[1] / a).clamp(0.0, 1.0),
        (rgba[2] / a).clamp(0.0, 1.0),
        a.clamp(0.0, 1.0),
    ]
}
