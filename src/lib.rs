//! Locate corner watermarks and cover them with flat fill or texture-aware
//! inpainting.
//!
//! Detection scans an adaptive window anchored at the bottom-right corner
//! (the placement convention of the source material) for bright,
//! near-white or near-grayscale pixels. The detected region is then either
//! flat-filled with black or rebuilt from surrounding texture samples, with
//! the seam blended into the neighborhood.
//!
//! # Quick Start
//!
//! ```no_run
//! use watermark_inpaint::{Config, FillMode, PixelBuffer, WatermarkProcessor};
//!
//! let processor = WatermarkProcessor::new(Config::default(), FillMode::Inpaint);
//! let img = image::open("photo.jpg").unwrap().to_rgba8();
//! let buffer = PixelBuffer::try_from(img).unwrap();
//! let cleaned = processor.cover_watermark(&buffer);
//! cleaned.into_owned().into_image().save("cleaned.png").unwrap();
//! ```
//!
//! # Adaptive search state
//!
//! The detector widens or shrinks its search window across calls so that a
//! batch of images from the same source converges on the true watermark
//! footprint. Call [`WatermarkProcessor::reset_search_range`] between
//! unrelated images, or use independent processor instances.

#![deny(missing_docs)]

pub mod blending;
mod buffer;
mod config;
pub mod detection;
mod engine;
pub mod error;
pub mod metrics;
pub mod synthesis;

pub use buffer::{PixelBuffer, Region};
pub use config::Config;
pub use engine::{
    default_output_path, is_supported_image, save_image, FillMode, ProcessOptions, ProcessResult,
    WatermarkProcessor,
};
pub use error::{Error, Result};
