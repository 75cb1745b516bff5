//! HSV color segmentation: threshold a frame region against a configured
//! color range and denoise the resulting binary mask with fixed morphology.

use ndarray::Array2;

use crate::tracker::frame::{ColorImage, PixelRect, bgr_to_hsv};

/// Foreground value in binary masks.
pub const FOREGROUND: u8 = 255;

/// Erosion structuring element side (square).
const ERODE_SIZE: usize = 3;
/// Dilation structuring element side (square). Larger than the erosion
/// element so the surviving object regrows to a stable area estimate.
const DILATE_SIZE: usize = 8;

/// Inclusive HSV bounds describing the marker's expected color.
///
/// Hue is in `0..=179`, saturation and value in `0..=255`. Set once at
/// startup; never mutated during a session.
#[derive(Debug, Clone, Copy)]
pub struct ColorRange {
    pub hue_min: u8,
    pub hue_max: u8,
    pub sat_min: u8,
    pub sat_max: u8,
    pub val_min: u8,
    pub val_max: u8,
}

impl ColorRange {
    /// Whether an HSV pixel falls inside the range, all bounds inclusive.
    #[inline]
    pub fn contains(&self, hsv: [u8; 3]) -> bool {
        hsv[0] >= self.hue_min
            && hsv[0] <= self.hue_max
            && hsv[1] >= self.sat_min
            && hsv[1] <= self.sat_max
            && hsv[2] >= self.val_min
            && hsv[2] <= self.val_max
    }
}

impl Default for ColorRange {
    /// Calibrated for a blue sponge marker under full room lighting.
    fn default() -> Self {
        Self {
            hue_min: 76,
            hue_max: 102,
            sat_min: 112,
            sat_max: 255,
            val_min: 171,
            val_max: 255,
        }
    }
}

/// Produces cleaned binary masks of pixels matching a [`ColorRange`].
#[derive(Debug, Clone, Default)]
pub struct ColorRangeFilter {
    range: ColorRange,
}

impl ColorRangeFilter {
    pub fn new(range: ColorRange) -> Self {
        Self { range }
    }

    pub fn range(&self) -> &ColorRange {
        &self.range
    }

    /// Threshold a rectangular region of `image` into a binary mask the same
    /// size as the region, then denoise it. The region must lie inside the
    /// image; callers guarantee this by construction.
    pub fn filtered_mask(&self, image: &ColorImage, region: PixelRect) -> Array2<u8> {
        debug_assert!(region.right() <= image.width() && region.bottom() <= image.height());
        let mut mask = self.threshold(image, region);
        clean(&mut mask);
        mask
    }

    /// Raw in-range threshold without morphology.
    pub fn threshold(&self, image: &ColorImage, region: PixelRect) -> Array2<u8> {
        let mut mask = Array2::zeros((region.height as usize, region.width as usize));
        for my in 0..region.height {
            for mx in 0..region.width {
                let hsv = bgr_to_hsv(image.bgr_at(region.x + mx, region.y + my));
                if self.range.contains(hsv) {
                    mask[[my as usize, mx as usize]] = FOREGROUND;
                }
            }
        }
        mask
    }
}

/// Denoise a binary mask: erode twice with a 3x3 element, then dilate twice
/// with an 8x8 element, in that fixed order. Erosion removes isolated noise
/// pixels; the larger dilation regrows the surviving object.
pub fn clean(mask: &mut Array2<u8>) {
    *mask = erode(mask, ERODE_SIZE);
    *mask = erode(mask, ERODE_SIZE);
    *mask = dilate(mask, DILATE_SIZE);
    *mask = dilate(mask, DILATE_SIZE);
}

/// Kernel offsets for a square element of side `size`, anchored at the
/// element center ((size - 1) / 2).
fn kernel_range(size: usize) -> std::ops::Range<isize> {
    let anchor = (size as isize - 1) / 2;
    -anchor..(size as isize - anchor)
}

/// Morphological erosion with a square element. Out-of-bounds neighbors are
/// treated as foreground so the frame border does not eat into the mask.
pub fn erode(mask: &Array2<u8>, size: usize) -> Array2<u8> {
    let (h, w) = mask.dim();
    let mut out = Array2::zeros((h, w));
    for y in 0..h as isize {
        for x in 0..w as isize {
            let mut keep = true;
            'probe: for dy in kernel_range(size) {
                for dx in kernel_range(size) {
                    let (ny, nx) = (y + dy, x + dx);
                    if ny < 0 || ny >= h as isize || nx < 0 || nx >= w as isize {
                        continue;
                    }
                    if mask[[ny as usize, nx as usize]] == 0 {
                        keep = false;
                        break 'probe;
                    }
                }
            }
            if keep && mask[[y as usize, x as usize]] != 0 {
                out[[y as usize, x as usize]] = FOREGROUND;
            }
        }
    }
    out
}

/// Morphological dilation with a square element. Out-of-bounds neighbors are
/// treated as background.
pub fn dilate(mask: &Array2<u8>, size: usize) -> Array2<u8> {
    let (h, w) = mask.dim();
    let mut out = Array2::zeros((h, w));
    for y in 0..h as isize {
        for x in 0..w as isize {
            'probe: for dy in kernel_range(size) {
                for dx in kernel_range(size) {
                    let (ny, nx) = (y + dy, x + dx);
                    if ny < 0 || ny >= h as isize || nx < 0 || nx >= w as isize {
                        continue;
                    }
                    if mask[[ny as usize, nx as usize]] != 0 {
                        out[[y as usize, x as usize]] = FOREGROUND;
                        break 'probe;
                    }
                }
            }
        }
    }
    out
}
