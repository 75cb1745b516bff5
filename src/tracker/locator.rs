//! Marker localization over binary masks: connected-region enumeration,
//! image moments and the local/full search strategy.

use ndarray::Array2;

use crate::tracker::color_filter::ColorRangeFilter;
use crate::tracker::frame::{ColorImage, PixelRect};
use crate::tracker::search_mode::SearchMode;

/// Configuration for the marker locator.
#[derive(Debug, Clone)]
pub struct LocatorConfig {
    /// Reject the whole detection when the mask contains more regions than
    /// this: the color filter is too noisy to trust any of them.
    pub max_regions: usize,
    /// Minimum region area, in square pixels, for a region to qualify as the
    /// marker rather than residual noise.
    pub min_area: f64,
    /// Half-side of the local search window; also the margin of the interior
    /// rectangle. Must be less than half of either frame dimension.
    pub local_radius: u32,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            max_regions: 50,
            // 20px by 20px
            min_area: 400.0,
            local_radius: 108,
        }
    }
}

/// Area and centroid of one connected foreground region, from its zeroth and
/// first image moments.
#[derive(Debug, Clone, Copy)]
pub struct RegionStats {
    pub area: f64,
    pub centroid: (f64, f64),
}

/// Enumerate 8-connected foreground regions in row-major discovery order.
pub fn label_regions(mask: &Array2<u8>) -> Vec<RegionStats> {
    let (h, w) = mask.dim();
    let mut visited = Array2::<u8>::zeros((h, w));
    let mut regions = Vec::new();
    let mut stack = Vec::new();

    for sy in 0..h {
        for sx in 0..w {
            if mask[[sy, sx]] == 0 || visited[[sy, sx]] != 0 {
                continue;
            }
            let mut count = 0u64;
            let mut sum_x = 0u64;
            let mut sum_y = 0u64;
            visited[[sy, sx]] = 1;
            stack.push((sy, sx));
            while let Some((y, x)) = stack.pop() {
                count += 1;
                sum_x += x as u64;
                sum_y += y as u64;
                for dy in -1i64..=1 {
                    for dx in -1i64..=1 {
                        let (ny, nx) = (y as i64 + dy, x as i64 + dx);
                        if ny < 0 || ny >= h as i64 || nx < 0 || nx >= w as i64 {
                            continue;
                        }
                        let (ny, nx) = (ny as usize, nx as usize);
                        if mask[[ny, nx]] != 0 && visited[[ny, nx]] == 0 {
                            visited[[ny, nx]] = 1;
                            stack.push((ny, nx));
                        }
                    }
                }
            }
            let area = count as f64;
            regions.push(RegionStats {
                area,
                centroid: (sum_x as f64 / area, sum_y as f64 / area),
            });
        }
    }
    regions
}

/// Find the centroid of the largest qualifying region in a binary mask.
///
/// Returns `None` when the mask holds more than `max_regions` regions (noisy
/// filter) or when no region exceeds `min_area`. Ties at the maximum area
/// resolve to the first region encountered (strict `>` against the running
/// maximum). The centroid is truncated to pixel coordinates.
pub fn find_largest_region(
    mask: &Array2<u8>,
    max_regions: usize,
    min_area: f64,
) -> Option<(u32, u32)> {
    let regions = label_regions(mask);
    if regions.is_empty() {
        return None;
    }
    if regions.len() > max_regions {
        tracing::debug!(regions = regions.len(), "mask too noisy, discarding detections");
        return None;
    }
    let mut best: Option<(u32, u32)> = None;
    let mut best_area = 0.0;
    for region in &regions {
        if region.area > min_area && region.area > best_area {
            best = Some((region.centroid.0 as u32, region.centroid.1 as u32));
            best_area = region.area;
        }
    }
    best
}

/// Locates the marker in successive frames, exploiting frame-to-frame
/// coherence with a local search window around the last known position.
#[derive(Debug, Clone)]
pub struct MarkerLocator {
    config: LocatorConfig,
    mode: SearchMode,
}

impl MarkerLocator {
    pub fn new(config: LocatorConfig) -> Self {
        Self {
            config,
            mode: SearchMode::Full,
        }
    }

    pub fn config(&self) -> &LocatorConfig {
        &self.config
    }

    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    /// The subregion of a frame within which a found marker is accepted.
    ///
    /// Frame bounds shrunk by the local radius on all sides, so a local
    /// window centered on any accepted position stays in-frame.
    pub fn interior(&self, width: u32, height: u32) -> PixelRect {
        let r = self.config.local_radius;
        debug_assert!(2 * r < width && 2 * r < height);
        PixelRect::new(r, r, width - 2 * r, height - 2 * r)
    }

    /// Locate the marker in a (downscaled) color frame.
    ///
    /// Runs a local search when the previous tick found the marker and a
    /// full-frame search otherwise. A local hit is translated back to global
    /// coordinates by the window's top-left offset. Positions outside the
    /// interior rectangle are rejected; any rejection resets the next tick
    /// to a full search.
    pub fn locate(&mut self, frame: &ColorImage, filter: &ColorRangeFilter) -> Option<(u32, u32)> {
        let (w, h) = (frame.width(), frame.height());
        let r = self.config.local_radius;

        let found = match self.mode {
            SearchMode::Local { center: (cx, cy) } => {
                let window = PixelRect::new(cx - r, cy - r, 2 * r, 2 * r);
                let mask = filter.filtered_mask(frame, window);
                find_largest_region(&mask, self.config.max_regions, self.config.min_area)
                    .map(|(x, y)| (x + window.x, y + window.y))
            }
            SearchMode::Full => {
                let mask = filter.filtered_mask(frame, PixelRect::new(0, 0, w, h));
                find_largest_region(&mask, self.config.max_regions, self.config.min_area)
            }
        };

        let found = found.filter(|&(x, y)| self.interior(w, h).contains(x, y));
        self.mode = match found {
            Some(center) => SearchMode::Local { center },
            None => SearchMode::Full,
        };
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::color_filter::FOREGROUND;

    fn blob(mask: &mut Array2<u8>, x0: usize, y0: usize, side: usize) {
        for y in y0..y0 + side {
            for x in x0..x0 + side {
                mask[[y, x]] = FOREGROUND;
            }
        }
    }

    #[test]
    fn test_largest_region_centroid() {
        let mut mask = Array2::zeros((100, 100));
        blob(&mut mask, 10, 10, 25); // area 625
        blob(&mut mask, 60, 60, 22); // area 484
        let found = find_largest_region(&mask, 50, 400.0);
        // Centroid of [10, 35) is 22.0, truncated to 22.
        assert_eq!(found, Some((22, 22)));
    }

    #[test]
    fn test_min_area_rejects_small_regions() {
        let mut mask = Array2::zeros((100, 100));
        blob(&mut mask, 10, 10, 20); // area 400, not > 400
        assert_eq!(find_largest_region(&mask, 50, 400.0), None);
        blob(&mut mask, 50, 50, 21); // area 441
        assert_eq!(find_largest_region(&mask, 50, 400.0), Some((60, 60)));
    }

    #[test]
    fn test_too_many_regions_is_not_found() {
        let mut mask = Array2::zeros((300, 300));
        // 51 isolated blobs, one of them large enough to qualify on its own.
        blob(&mut mask, 0, 0, 25);
        for i in 0..50 {
            let x = 40 + (i % 10) * 25;
            let y = 40 + (i / 10) * 25;
            blob(&mut mask, x, y, 2);
        }
        assert_eq!(label_regions(&mask).len(), 51);
        assert_eq!(find_largest_region(&mask, 50, 400.0), None);
        // Exactly at the limit the detection is still trusted.
        let mut mask50 = Array2::zeros((300, 300));
        blob(&mut mask50, 0, 0, 25);
        for i in 0..49 {
            let x = 40 + (i % 10) * 25;
            let y = 40 + (i / 10) * 25;
            blob(&mut mask50, x, y, 2);
        }
        assert_eq!(find_largest_region(&mask50, 50, 400.0), Some((12, 12)));
    }

    #[test]
    fn test_tie_breaks_to_first_region() {
        let mut mask = Array2::zeros((100, 100));
        blob(&mut mask, 10, 10, 21);
        blob(&mut mask, 60, 60, 21);
        // Equal areas: the region discovered first (row-major) wins.
        assert_eq!(find_largest_region(&mask, 50, 400.0), Some((20, 20)));
    }

    #[test]
    fn test_diagonal_pixels_form_one_region() {
        let mut mask = Array2::zeros((10, 10));
        mask[[0, 0]] = FOREGROUND;
        mask[[1, 1]] = FOREGROUND;
        mask[[2, 2]] = FOREGROUND;
        assert_eq!(label_regions(&mask).len(), 1);
    }

    fn marker_frame(w: u32, h: u32, cx: u32, cy: u32, side: u32) -> ColorImage {
        let mut img = ColorImage::filled(w, h, [0, 0, 0]);
        for y in (cy - side / 2)..(cy + side / 2) {
            for x in (cx - side / 2)..(cx + side / 2) {
                img.put_bgr(x, y, [255, 0, 0]); // pure blue
            }
        }
        img
    }

    fn test_locator(radius: u32) -> (MarkerLocator, ColorRangeFilter) {
        let config = LocatorConfig {
            local_radius: radius,
            ..LocatorConfig::default()
        };
        let range = crate::tracker::ColorRange {
            hue_min: 110,
            hue_max: 130,
            sat_min: 200,
            sat_max: 255,
            val_min: 200,
            val_max: 255,
        };
        (MarkerLocator::new(config), ColorRangeFilter::new(range))
    }

    #[test]
    fn test_full_then_local_search() {
        let (mut locator, filter) = test_locator(60);
        let frame = marker_frame(400, 300, 200, 150, 40);
        let found = locator.locate(&frame, &filter).expect("full search hit");
        assert!((found.0 as i64 - 200).unsigned_abs() <= 2);
        assert!((found.1 as i64 - 150).unsigned_abs() <= 2);
        assert!(matches!(locator.mode(), SearchMode::Local { .. }));

        // Marker moved slightly; local window must translate coordinates
        // back into the global frame.
        let frame2 = marker_frame(400, 300, 210, 160, 40);
        let found2 = locator.locate(&frame2, &filter).expect("local search hit");
        assert!((found2.0 as i64 - 210).unsigned_abs() <= 2);
        assert!((found2.1 as i64 - 160).unsigned_abs() <= 2);
    }

    #[test]
    fn test_local_miss_reverts_to_full_search() {
        let (mut locator, filter) = test_locator(60);
        let frame = marker_frame(400, 300, 200, 150, 40);
        locator.locate(&frame, &filter).expect("acquired");

        // Marker jumps outside the local window: this tick reports lost.
        let jumped = marker_frame(400, 300, 330, 200, 40);
        assert_eq!(locator.locate(&jumped, &filter), None);
        assert_eq!(locator.mode(), SearchMode::Full);

        // Next tick reacquires with a full search.
        let found = locator.locate(&jumped, &filter).expect("reacquired");
        assert!((found.0 as i64 - 330).unsigned_abs() <= 2);
    }

    #[test]
    fn test_interior_rectangle_downgrades_edge_hits() {
        let (mut locator, filter) = test_locator(100);
        // Qualifying marker, but centered inside the margin band.
        let frame = marker_frame(400, 300, 50, 150, 40);
        assert_eq!(locator.locate(&frame, &filter), None);
        assert_eq!(locator.mode(), SearchMode::Full);
    }
}
