//! Frame-level value types: color images, pixel rectangles and the per-pixel
//! color-to-camera-space mapping table produced by depth sensing.

use nalgebra::Point3;
use ndarray::Array3;
use thiserror::Error;

/// Number of channels in a sensor color frame (BGRA).
const CHANNELS: usize = 4;

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("pixel buffer of {actual} bytes does not match {width}x{height} bgra ({expected} bytes)")]
    BufferSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("mapping table of {actual} points does not match {width}x{height} ({expected} points)")]
    MappingSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

/// A BGRA color image as delivered by the sensor.
#[derive(Debug, Clone)]
pub struct ColorImage {
    /// Pixel data, shape (height, width, 4).
    data: Array3<u8>,
}

impl ColorImage {
    /// Create an image from a raw BGRA byte buffer in row-major order.
    pub fn from_bgra(width: u32, height: u32, bytes: Vec<u8>) -> Result<Self, FrameError> {
        let expected = width as usize * height as usize * CHANNELS;
        if bytes.len() != expected {
            return Err(FrameError::BufferSize {
                width,
                height,
                expected,
                actual: bytes.len(),
            });
        }
        let data = Array3::from_shape_vec((height as usize, width as usize, CHANNELS), bytes)
            .map_err(|_| FrameError::BufferSize {
                width,
                height,
                expected,
                actual: expected,
            })?;
        Ok(Self { data })
    }

    /// Create a uniformly colored image. Handy for building synthetic frames.
    pub fn filled(width: u32, height: u32, bgr: [u8; 3]) -> Self {
        let mut data = Array3::zeros((height as usize, width as usize, CHANNELS));
        for y in 0..height as usize {
            for x in 0..width as usize {
                data[[y, x, 0]] = bgr[0];
                data[[y, x, 1]] = bgr[1];
                data[[y, x, 2]] = bgr[2];
                data[[y, x, 3]] = 255;
            }
        }
        Self { data }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.data.dim().1 as u32
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.data.dim().0 as u32
    }

    /// BGR triple at a pixel. Alpha is ignored throughout the tracker.
    #[inline]
    pub fn bgr_at(&self, x: u32, y: u32) -> [u8; 3] {
        let (y, x) = (y as usize, x as usize);
        [
            self.data[[y, x, 0]],
            self.data[[y, x, 1]],
            self.data[[y, x, 2]],
        ]
    }

    /// Overwrite the BGR channels of one pixel.
    pub fn put_bgr(&mut self, x: u32, y: u32, bgr: [u8; 3]) {
        let (y, x) = (y as usize, x as usize);
        self.data[[y, x, 0]] = bgr[0];
        self.data[[y, x, 1]] = bgr[1];
        self.data[[y, x, 2]] = bgr[2];
    }

    /// Nearest-neighbor downscale by `ratio` (0 < ratio <= 1).
    ///
    /// Tracking runs on the downscaled frame; positions are mapped back to
    /// full resolution only for the depth lookup.
    pub fn downscale(&self, ratio: f32) -> ColorImage {
        debug_assert!(ratio > 0.0 && ratio <= 1.0);
        let out_w = (self.width() as f32 * ratio) as u32;
        let out_h = (self.height() as f32 * ratio) as u32;
        let mut data = Array3::zeros((out_h as usize, out_w as usize, CHANNELS));
        for oy in 0..out_h {
            let sy = ((oy as f32 / ratio) as u32).min(self.height() - 1) as usize;
            for ox in 0..out_w {
                let sx = ((ox as f32 / ratio) as u32).min(self.width() - 1) as usize;
                for c in 0..CHANNELS {
                    data[[oy as usize, ox as usize, c]] = self.data[[sy, sx, c]];
                }
            }
        }
        ColorImage { data }
    }
}

/// Convert one BGR pixel to HSV using 8-bit image conventions:
/// H in `0..=179` (degrees halved), S and V in `0..=255`.
///
/// The halved hue keeps experimentally calibrated color ranges directly
/// comparable to values read off common image tooling.
pub fn bgr_to_hsv(bgr: [u8; 3]) -> [u8; 3] {
    let b = bgr[0] as f32;
    let g = bgr[1] as f32;
    let r = bgr[2] as f32;

    let v = b.max(g).max(r);
    let min = b.min(g).min(r);
    let diff = v - min;

    let s = if v == 0.0 { 0.0 } else { 255.0 * diff / v };

    let mut h = if diff == 0.0 {
        0.0
    } else if v == r {
        60.0 * (g - b) / diff
    } else if v == g {
        120.0 + 60.0 * (b - r) / diff
    } else {
        240.0 + 60.0 * (r - g) / diff
    };
    if h < 0.0 {
        h += 360.0;
    }

    [(h / 2.0).round() as u8, s.round() as u8, v.round() as u8]
}

/// An axis-aligned integer rectangle over pixel coordinates.
///
/// Containment is left/top inclusive and right/bottom exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    #[inline]
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    #[inline]
    pub fn contains(&self, px: u32, py: u32) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }
}

/// Per-pixel lookup from full-resolution color coordinates to 3D camera space.
///
/// Pixels without a valid depth sample carry non-finite coordinates and look
/// up as `None`.
#[derive(Debug, Clone)]
pub struct CameraSpaceMap {
    width: u32,
    height: u32,
    points: Vec<Point3<f32>>,
}

impl CameraSpaceMap {
    pub fn new(width: u32, height: u32, points: Vec<Point3<f32>>) -> Result<Self, FrameError> {
        let expected = width as usize * height as usize;
        if points.len() != expected {
            return Err(FrameError::MappingSize {
                width,
                height,
                expected,
                actual: points.len(),
            });
        }
        Ok(Self {
            width,
            height,
            points,
        })
    }

    /// A map where every pixel is out of depth range.
    pub fn invalid(width: u32, height: u32) -> Self {
        let points = vec![
            Point3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY);
            width as usize * height as usize
        ];
        Self {
            width,
            height,
            points,
        }
    }

    /// Assign the camera-space point for one pixel.
    pub fn set(&mut self, x: u32, y: u32, point: Point3<f32>) {
        self.points[y as usize * self.width as usize + x as usize] = point;
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Camera-space position at a pixel, or `None` when the pixel has no
    /// valid depth mapping.
    pub fn lookup(&self, x: u32, y: u32) -> Option<Point3<f32>> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let p = self.points[y as usize * self.width as usize + x as usize];
        if p.x.is_finite() && p.y.is_finite() && p.z.is_finite() {
            Some(p)
        } else {
            None
        }
    }
}
