//! Pixel surface - the RGBA8 buffer a stroke paints into

use image::RgbaImage;

use crate::core::errors::CoreError;
use crate::pixel::{pack, unpack};

/// Bytes per pixel (R, G, B, A)
pub const BYTES_PER_PIXEL: usize = 4;

/// Largest accepted edge length
pub const MAX_SURFACE_DIMENSION: u32 = 16384;

/// Canvas dimensions, used for bounds checks and pixel-index mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CanvasGeometry {
    pub width: u32,
    pub height: u32,
}

impl CanvasGeometry {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    /// Row-major pixel index, `None` when out of bounds
    #[inline]
    pub fn index_of(&self, x: i32, y: i32) -> Option<usize> {
        if self.contains(x, y) {
            Some(y as usize * self.width as usize + x as usize)
        } else {
            None
        }
    }

    #[inline]
    pub fn coords_of(&self, index: usize) -> (i32, i32) {
        let width = self.width.max(1) as usize;
        ((index % width) as i32, (index / width) as i32)
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Rectangular RGBA8 pixel buffer, straight alpha.
///
/// A surface is owned by its layer; painters only ever borrow it for the
/// duration of a single stamp call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    geometry: CanvasGeometry,
    data: Vec<u8>,
}

impl Surface {
    /// Create a fully transparent surface
    pub fn new(width: u32, height: u32) -> Result<Self, CoreError> {
        let len = checked_len(width, height)?;
        Ok(Self {
            geometry: CanvasGeometry::new(width, height),
            data: vec![0; len],
        })
    }

    /// Create a surface filled with one packed color
    pub fn filled(width: u32, height: u32, color: u32) -> Result<Self, CoreError> {
        let len = checked_len(width, height)?;
        let rgba = unpack(color);
        let mut data = Vec::with_capacity(len);
        for _ in 0..len / BYTES_PER_PIXEL {
            data.extend_from_slice(&rgba);
        }
        Ok(Self {
            geometry: CanvasGeometry::new(width, height),
            data,
        })
    }

    /// Wrap raw RGBA bytes
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self, CoreError> {
        let len = checked_len(width, height)?;
        if data.len() != len {
            return Err(CoreError::SurfaceSize(format!(
                "{}x{} needs {} bytes, got {}",
                width,
                height,
                len,
                data.len()
            )));
        }
        Ok(Self {
            geometry: CanvasGeometry::new(width, height),
            data,
        })
    }

    pub fn from_rgba_image(image: &RgbaImage) -> Result<Self, CoreError> {
        Self::from_rgba(image.width(), image.height(), image.as_raw().clone())
    }

    pub fn to_rgba_image(&self) -> Result<RgbaImage, CoreError> {
        RgbaImage::from_raw(self.width(), self.height(), self.data.clone()).ok_or_else(|| {
            CoreError::SurfaceSize(format!(
                "buffer does not fit {}x{}",
                self.width(),
                self.height()
            ))
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.geometry.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.geometry.height
    }

    #[inline]
    pub fn geometry(&self) -> CanvasGeometry {
        self.geometry
    }

    pub fn pixel_count(&self) -> usize {
        self.geometry.pixel_count()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Packed pixel at `index`
    #[inline]
    pub fn pixel(&self, index: usize) -> Option<u32> {
        let start = index.checked_mul(BYTES_PER_PIXEL)?;
        let bytes = self.data.get(start..start.checked_add(BYTES_PER_PIXEL)?)?;
        Some(pack([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    #[inline]
    pub fn pixel_at(&self, x: i32, y: i32) -> Option<u32> {
        self.geometry.index_of(x, y).and_then(|i| self.pixel(i))
    }

    /// Write a packed pixel; returns `false` when `index` is out of range
    #[inline]
    pub fn set_pixel(&mut self, index: usize, color: u32) -> bool {
        let Some(end) = index
            .checked_mul(BYTES_PER_PIXEL)
            .and_then(|start| start.checked_add(BYTES_PER_PIXEL))
        else {
            return false;
        };
        match self.data.get_mut(end - BYTES_PER_PIXEL..end) {
            Some(bytes) => {
                bytes.copy_from_slice(&unpack(color));
                true
            }
            None => false,
        }
    }

    pub fn pixels(&self) -> impl Iterator<Item = u32> + '_ {
        self.data
            .chunks_exact(BYTES_PER_PIXEL)
            .map(|p| pack([p[0], p[1], p[2], p[3]]))
    }

    /// Byte-for-byte copy, used as a stroke-start snapshot
    pub fn snapshot(&self) -> Surface {
        self.clone()
    }
}

fn checked_len(width: u32, height: u32) -> Result<usize, CoreError> {
    if width == 0 || height == 0 {
        return Err(CoreError::SurfaceSize(
            "Surface dimensions must be greater than 0".to_string(),
        ));
    }
    if width > MAX_SURFACE_DIMENSION || height > MAX_SURFACE_DIMENSION {
        return Err(CoreError::SurfaceSize(format!(
            "Surface dimensions cannot exceed {} pixels",
            MAX_SURFACE_DIMENSION
        )));
    }
    Ok(width as usize * height as usize * BYTES_PER_PIXEL)
}
