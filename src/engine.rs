//! Watermark processing façade and file-level plumbing.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat, RgbaImage};

use crate::blending::EdgeBlender;
use crate::buffer::{PixelBuffer, Region};
use crate::config::Config;
use crate::detection::RegionDetector;
use crate::error::{Error, Result};
use crate::synthesis::ContentSynthesizer;

/// How a detected watermark region is covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillMode {
    /// Flat-fill the detected region with opaque black.
    FlatFill,
    /// Rebuild the region from surrounding texture and blend the seam.
    Inpaint,
}

/// Options controlling file processing behavior.
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    /// Keep the adaptive search state across files instead of resetting
    /// before each one. On for batches from a single source, off for
    /// unrelated images.
    pub carry_state: bool,
    /// Enable verbose logging.
    pub verbose: bool,
    /// Suppress non-error output.
    pub quiet: bool,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            carry_state: true,
            verbose: false,
            quiet: false,
        }
    }
}

/// Result of processing a single image file.
#[derive(Debug)]
pub struct ProcessResult {
    /// Path of the processed file.
    pub path: PathBuf,
    /// Whether processing succeeded.
    pub success: bool,
    /// Whether the file was skipped (no watermark detected).
    pub skipped: bool,
    /// The region that was covered; empty when skipped.
    pub region: Region,
    /// Human-readable status message.
    pub message: String,
}

/// Composes detection, synthesis, and edge blending into a single entry point.
///
/// Create once and reuse: the detector's adaptive search window then converges
/// across images from the same source. Call
/// [`WatermarkProcessor::reset_search_range`] before switching to an unrelated
/// image, or use separate processor instances for isolation.
pub struct WatermarkProcessor {
    detector: RegionDetector,
    synthesizer: ContentSynthesizer,
    blender: EdgeBlender,
    mode: FillMode,
}

impl WatermarkProcessor {
    /// Create a processor with the given tuning and fill mode.
    #[must_use]
    pub fn new(config: Config, mode: FillMode) -> Self {
        Self {
            detector: RegionDetector::new(config),
            synthesizer: ContentSynthesizer::new(config),
            blender: EdgeBlender::new(config),
            mode,
        }
    }

    /// The fill mode this processor applies to detected regions.
    #[must_use]
    pub fn mode(&self) -> FillMode {
        self.mode
    }

    /// Locate the watermark region without covering it.
    ///
    /// Adjusts the adaptive search state exactly like a full
    /// [`WatermarkProcessor::cover_watermark`] call.
    #[must_use]
    pub fn locate(&self, buffer: &PixelBuffer) -> Region {
        self.detector.locate(buffer)
    }

    /// Detect and cover the watermark.
    ///
    /// When no watermark is found the input is returned as
    /// [`Cow::Borrowed`] — the result may alias the input, so callers must
    /// not assume a fresh allocation. Otherwise a new buffer is returned
    /// with the detected region covered according to the fill mode.
    #[must_use]
    pub fn cover_watermark<'a>(&self, buffer: &'a PixelBuffer) -> Cow<'a, PixelBuffer> {
        let region = self.detector.locate(buffer);
        if region.is_empty() {
            Cow::Borrowed(buffer)
        } else {
            Cow::Owned(self.cover_region(buffer, region))
        }
    }

    /// Cover an already-located region, returning a new buffer.
    #[must_use]
    pub fn cover_region(&self, buffer: &PixelBuffer, region: Region) -> PixelBuffer {
        match self.mode {
            FillMode::FlatFill => flat_fill(buffer, region),
            FillMode::Inpaint => {
                let mut filled = self.synthesizer.fill(buffer, region);
                self.blender.smooth(&mut filled, region);
                filled
            }
        }
    }

    /// Restore the detector's adaptive search window to its initial ratio.
    pub fn reset_search_range(&self) {
        self.detector.reset();
    }

    /// The detector's current adaptive search-window ratio.
    #[must_use]
    pub fn search_ratio(&self) -> f64 {
        self.detector.search_ratio()
    }

    /// Process a single image file: load, detect, cover, save.
    ///
    /// Returns a [`ProcessResult`] indicating success, skip, or failure.
    #[must_use]
    pub fn process_file(
        &self,
        input: &Path,
        output: &Path,
        opts: &ProcessOptions,
    ) -> ProcessResult {
        let mut result = ProcessResult {
            path: input.to_path_buf(),
            success: false,
            skipped: false,
            region: Region::EMPTY,
            message: String::new(),
        };

        let dyn_img = match image::open(input) {
            Ok(img) => img,
            Err(e) => {
                result.message = format!("Failed to load: {e}");
                return result;
            }
        };

        let buffer = match PixelBuffer::try_from(dyn_img.to_rgba8()) {
            Ok(buf) => buf,
            Err(e) => {
                result.message = format!("Invalid image data: {e}");
                return result;
            }
        };

        if !opts.carry_state {
            self.reset_search_range();
        }

        let region = self.detector.locate(&buffer);
        if region.is_empty() {
            result.skipped = true;
            result.success = true;
            result.message = format!(
                "No watermark detected (search ratio now {:.2})",
                self.search_ratio()
            );
            return result;
        }
        result.region = region;

        let covered = self.cover_region(&buffer, region);

        if let Some(parent) = output.parent() {
            if !parent.exists() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    result.message = format!("Failed to create output directory: {e}");
                    return result;
                }
            }
        }

        match save_image(covered.into_image(), output) {
            Ok(()) => {
                result.success = true;
                result.message = format!(
                    "Covered {}x{} region at ({}, {})",
                    region.width, region.height, region.x, region.y
                );
            }
            Err(e) => {
                result.message = format!("Failed to save: {e}");
            }
        }

        result
    }

    /// Process all supported images in a directory.
    ///
    /// Uses parallel iteration when the `cli` feature is enabled (via rayon).
    /// Returns a [`ProcessResult`] for each image found. With
    /// `opts.carry_state` the adaptive search state is shared across the
    /// whole batch.
    ///
    /// # Panics
    ///
    /// Panics if any directory entry has no filename (should not happen for
    /// regular files).
    #[must_use]
    pub fn process_directory(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        opts: &ProcessOptions,
    ) -> Vec<ProcessResult> {
        let entries: Vec<_> = match std::fs::read_dir(input_dir) {
            Ok(rd) => rd
                .filter_map(std::result::Result::ok)
                .filter(|e| e.file_type().map(|ft| ft.is_file()).unwrap_or(false))
                .filter(|e| is_supported_image(e.path().as_path()))
                .collect(),
            Err(e) => {
                return vec![ProcessResult {
                    path: input_dir.to_path_buf(),
                    success: false,
                    skipped: false,
                    region: Region::EMPTY,
                    message: format!("Failed to read directory: {e}"),
                }];
            }
        };

        if !output_dir.exists() {
            if let Err(e) = std::fs::create_dir_all(output_dir) {
                return vec![ProcessResult {
                    path: output_dir.to_path_buf(),
                    success: false,
                    skipped: false,
                    region: Region::EMPTY,
                    message: format!("Failed to create output directory: {e}"),
                }];
            }
        }

        #[cfg(feature = "cli")]
        {
            use rayon::prelude::*;
            entries
                .par_iter()
                .map(|entry| {
                    let input_path = entry.path();
                    let filename = input_path.file_name().unwrap();
                    let output_path = output_dir.join(filename);
                    self.process_file(&input_path, &output_path, opts)
                })
                .collect()
        }

        #[cfg(not(feature = "cli"))]
        {
            entries
                .iter()
                .map(|entry| {
                    let input_path = entry.path();
                    let filename = input_path.file_name().unwrap();
                    let output_path = output_dir.join(filename);
                    self.process_file(&input_path, &output_path, opts)
                })
                .collect()
        }
    }
}

/// Copy the buffer with the region flat-filled to opaque black.
fn flat_fill(buffer: &PixelBuffer, region: Region) -> PixelBuffer {
    let mut out = buffer.clone();
    for y in region.y..region.bottom() {
        for x in region.x..region.right() {
            out.set_rgba(x, y, [0, 0, 0, 255]);
        }
    }
    out
}

/// Check if a file has a supported image extension.
#[must_use]
pub fn is_supported_image(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => matches!(
            ext.to_lowercase().as_str(),
            "jpg" | "jpeg" | "png" | "webp" | "bmp"
        ),
        None => false,
    }
}

/// Save an RGBA image with format-specific handling.
///
/// JPEG has no alpha channel, so the buffer is flattened to RGB and written
/// at quality 100; the other formats keep the alpha plane.
///
/// # Errors
///
/// Returns an error if the format is unsupported or writing fails.
pub fn save_image(img: RgbaImage, path: &Path) -> Result<()> {
    let format =
        ImageFormat::from_path(path).map_err(|e| Error::UnsupportedFormat(e.to_string()))?;

    match format {
        ImageFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgba8(img).to_rgb8();
            let file = std::fs::File::create(path)?;
            let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(file, 100);
            encoder.encode_image(&DynamicImage::ImageRgb8(rgb))?;
        }
        ImageFormat::Png | ImageFormat::WebP | ImageFormat::Bmp => {
            DynamicImage::ImageRgba8(img).save(path)?;
        }
        _ => {
            return Err(Error::UnsupportedFormat(format!("{format:?}")));
        }
    }

    Ok(())
}

/// Generate a default output path from an input path.
///
/// Example: `"photo.jpg"` becomes `"photo_cleaned.jpg"`.
#[must_use]
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let ext = input.extension().unwrap_or_default().to_string_lossy();
    let parent = input.parent().unwrap_or(Path::new("."));
    parent.join(format!("{stem}_cleaned.{ext}"))
}
