//! Adaptive corner-biased watermark region detection.
//!
//! Watermarks in this system's source material sit in the bottom-right corner,
//! so the detector scans a corner-anchored window whose size it adapts across
//! calls: a miss widens the window, a hit shrinks it toward the detected
//! footprint. Repeated calls on images from the same source converge on the
//! true watermark size instead of re-scanning a fixed window every time.
//! Arbitrary watermark placement is a known limitation, not handled here.

use std::sync::Mutex;

use crate::buffer::{PixelBuffer, Region};
use crate::config::Config;
use crate::metrics;

/// Multiplier on `adjust_step` when a scan finds nothing.
const MISS_WIDEN_FACTOR: f64 = 1.5;
/// The adopted ratio exceeds the detected footprint by this factor.
const FOOTPRINT_MARGIN: f64 = 1.2;
/// Dead band around the current ratio before a new footprint is adopted.
const RATIO_DEAD_BAND: f64 = 0.02;
/// Extra pixels the search window extends past the ratio-derived corner box.
const WINDOW_SLACK: i64 = 10;

/// Per-detector adaptive state, mutated after every [`RegionDetector::locate`].
#[derive(Debug)]
struct SearchState {
    ratio: f64,
}

/// Heuristic watermark locator with an adaptive search window.
///
/// The search ratio is the only mutable state in this crate; it is scoped to
/// one detector instance and survives across `locate` calls by design. Callers
/// that process unrelated images on the same instance must call
/// [`RegionDetector::reset`] in between; callers needing isolation use
/// independent instances.
#[derive(Debug)]
pub struct RegionDetector {
    config: Config,
    state: Mutex<SearchState>,
}

impl RegionDetector {
    /// Create a detector starting from `config.initial_search_ratio`.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: Mutex::new(SearchState {
                ratio: config.initial_search_ratio,
            }),
        }
    }

    /// Restore the search ratio to its initial default.
    ///
    /// # Panics
    ///
    /// Panics if a previous caller panicked while holding the state lock.
    pub fn reset(&self) {
        self.state.lock().expect("detector state poisoned").ratio =
            self.config.initial_search_ratio;
    }

    /// The current adaptive search-window ratio.
    ///
    /// # Panics
    ///
    /// Panics if a previous caller panicked while holding the state lock.
    #[must_use]
    pub fn search_ratio(&self) -> f64 {
        self.state.lock().expect("detector state poisoned").ratio
    }

    /// Scan the bottom-right search window for a watermark-like bright patch.
    ///
    /// Returns the padded bounding box of all flagged pixels, or
    /// [`Region::EMPTY`] when nothing qualified. Either way the search ratio
    /// is adjusted for the next call.
    ///
    /// # Panics
    ///
    /// Panics if a previous caller panicked while holding the state lock.
    #[must_use]
    pub fn locate(&self, buffer: &PixelBuffer) -> Region {
        let ratio = self.search_ratio();
        let window = search_window(buffer.width(), buffer.height(), ratio);

        // Pass 1: mean luminance over the window.
        let mut total = 0.0_f64;
        let mut count = 0u64;
        for y in window.y..window.bottom() {
            for x in window.x..window.right() {
                let [r, g, b] = buffer.rgb(x, y);
                total += metrics::luminance(r, g, b);
                count += 1;
            }
        }
        #[allow(clippy::cast_precision_loss)]
        let threshold = total / count as f64 + self.config.luminance_delta_threshold;

        // Pass 2: flag watermark-like pixels and grow their bounding box.
        let mut bbox: Option<(u32, u32, u32, u32)> = None;
        for y in window.y..window.bottom() {
            for x in window.x..window.right() {
                let [r, g, b] = buffer.rgb(x, y);
                if metrics::luminance(r, g, b) <= threshold {
                    continue;
                }
                let near_white = r > self.config.near_white_threshold
                    && g > self.config.near_white_threshold
                    && b > self.config.near_white_threshold;
                let variance = channel_variance(r, g, b);
                let grayish = variance < self.config.grayscale_variance_threshold;
                if near_white || grayish {
                    bbox = Some(match bbox {
                        None => (x, y, x, y),
                        Some((min_x, min_y, max_x, max_y)) => {
                            (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y))
                        }
                    });
                }
            }
        }

        let Some((min_x, min_y, max_x, max_y)) = bbox else {
            self.widen();
            return Region::EMPTY;
        };

        self.adopt(size_ratio_for(min_x, min_y, max_x, max_y, buffer));

        pad_region(min_x, min_y, max_x, max_y, self.config.bounding_box_padding, buffer)
    }

    /// Widen the window after a miss, faster than the hit-side adjustment.
    fn widen(&self) {
        let mut state = self.state.lock().expect("detector state poisoned");
        state.ratio = (state.ratio + self.config.adjust_step * MISS_WIDEN_FACTOR)
            .min(self.config.max_search_ratio);
    }

    /// Move the ratio toward the detected footprint, with a dead band so
    /// near-identical detections do not cause jitter.
    fn adopt(&self, size_ratio: f64) {
        let mut state = self.state.lock().expect("detector state poisoned");
        let target = size_ratio * FOOTPRINT_MARGIN;
        if (state.ratio - target).abs() > RATIO_DEAD_BAND {
            state.ratio = target;
        }
        state.ratio = state
            .ratio
            .clamp(self.config.min_search_ratio, self.config.max_search_ratio);
    }
}

/// Largest dimension of the detected bounding box relative to the image.
fn size_ratio_for(min_x: u32, min_y: u32, max_x: u32, max_y: u32, buffer: &PixelBuffer) -> f64 {
    let horizontal = f64::from(max_x - min_x) / f64::from(buffer.width());
    let vertical = f64::from(max_y - min_y) / f64::from(buffer.height());
    horizontal.max(vertical)
}

/// The bottom-right search window for the given ratio, clamped to bounds.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn search_window(width: u32, height: u32, ratio: f64) -> Region {
    let wx = (f64::from(width) * (1.0 - ratio)).floor() as i64 - WINDOW_SLACK;
    let wy = (f64::from(height) * (1.0 - ratio)).floor() as i64 - WINDOW_SLACK;
    let ww = (f64::from(width) * ratio).floor() as i64 + 2 * WINDOW_SLACK;
    let wh = (f64::from(height) * ratio).floor() as i64 + 2 * WINDOW_SLACK;

    let x0 = wx.clamp(0, i64::from(width)) as u32;
    let y0 = wy.clamp(0, i64::from(height)) as u32;
    let x1 = (wx + ww).clamp(i64::from(x0), i64::from(width)) as u32;
    let y1 = (wy + wh).clamp(i64::from(y0), i64::from(height)) as u32;

    Region::new(x0, y0, x1 - x0, y1 - y0)
}

/// Maximum absolute difference between any two channels.
fn channel_variance(r: u8, g: u8, b: u8) -> u8 {
    let rg = r.abs_diff(g);
    let gb = g.abs_diff(b);
    let br = b.abs_diff(r);
    rg.max(gb).max(br)
}

/// Pad the bounding box on every side, clamped to the buffer bounds.
fn pad_region(
    min_x: u32,
    min_y: u32,
    max_x: u32,
    max_y: u32,
    padding: u32,
    buffer: &PixelBuffer,
) -> Region {
    let x = min_x.saturating_sub(padding);
    let y = min_y.saturating_sub(padding);
    let right = (max_x + padding + 1).min(buffer.width());
    let bottom = (max_y + padding + 1).min(buffer.height());
    Region::new(x, y, right - x, bottom - y)
}
