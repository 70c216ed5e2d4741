//! Tunable parameters for detection, synthesis, and edge blending.

/// Caller-tunable algorithm parameters.
///
/// The defaults are calibrated for small corner watermarks on photographic
/// content; most callers should start from [`Config::default()`] and adjust
/// individual fields.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    /// Lower clamp for the adaptive search-window ratio.
    pub min_search_ratio: f64,
    /// Upper clamp for the adaptive search-window ratio.
    pub max_search_ratio: f64,
    /// Search-window ratio a fresh (or reset) detector starts from.
    pub initial_search_ratio: f64,
    /// Base step by which the search ratio widens after a miss.
    pub adjust_step: f64,
    /// Radius of the source-pixel neighborhood sampled during synthesis.
    pub sampling_radius: u32,
    /// Hard cap on candidate samples collected per target pixel.
    pub max_samples: usize,
    /// Half-width of the texture-comparison patch (full patch is
    /// `(2 * patch_size + 1)` pixels square).
    pub patch_size: u32,
    /// Width of the blend band outside the region border.
    pub blend_radius: u32,
    /// How far above the window mean a pixel's luminance must be to count
    /// as watermark-like.
    pub luminance_delta_threshold: f64,
    /// Channel floor for the near-white test.
    pub near_white_threshold: u8,
    /// Maximum pairwise channel difference for the near-grayscale test.
    pub grayscale_variance_threshold: u8,
    /// Pixels of padding added around the detected bounding box.
    pub bounding_box_padding: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_search_ratio: 0.15,
            max_search_ratio: 0.4,
            initial_search_ratio: 0.2,
            adjust_step: 0.05,
            sampling_radius: 30,
            max_samples: 100,
            patch_size: 3,
            blend_radius: 5,
            luminance_delta_threshold: 0.12,
            near_white_threshold: 140,
            grayscale_variance_threshold: 60,
            bounding_box_padding: 8,
        }
    }
}
