//! RGBA pixel buffer and rectangular region types.
//!
//! [`PixelBuffer`] is the crate's exchange format: a flat row-major RGBA byte
//! array with validated dimensions. Validation happens once at construction,
//! so every operation downstream can index without re-checking — an index out
//! of range at that point is an invariant violation and panics.

use image::RgbaImage;

use crate::error::{Error, Result};

/// A width x height grid of RGBA samples, row-major, 4 bytes per pixel.
///
/// Detection takes buffers by shared reference and never mutates them;
/// synthesis returns newly allocated buffers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Create a zero-filled (transparent black) buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] if either dimension is zero.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { width, height });
        }
        let len = width as usize * height as usize * 4;
        Ok(Self {
            width,
            height,
            data: vec![0; len],
        })
    }

    /// Wrap raw RGBA bytes, validating length against the stated dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] for a zero-area buffer, or
    /// [`Error::BufferSizeMismatch`] when `data.len() != width * height * 4`.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { width, height });
        }
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(Error::BufferSizeMismatch {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Buffer width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Buffer height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The raw RGBA bytes.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consume the buffer, returning the raw RGBA bytes.
    #[must_use]
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.width && y < self.height);
        (y as usize * self.width as usize + x as usize) * 4
    }

    /// Read the RGBA sample at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the buffer.
    #[inline]
    #[must_use]
    pub fn rgba(&self, x: u32, y: u32) -> [u8; 4] {
        let i = self.offset(x, y);
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }

    /// Read the RGB channels at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the buffer.
    #[inline]
    #[must_use]
    pub fn rgb(&self, x: u32, y: u32) -> [u8; 3] {
        let i = self.offset(x, y);
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    /// Overwrite the RGB channels at `(x, y)`, leaving alpha untouched.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the buffer.
    #[inline]
    pub fn set_rgb(&mut self, x: u32, y: u32, rgb: [u8; 3]) {
        let i = self.offset(x, y);
        self.data[i] = rgb[0];
        self.data[i + 1] = rgb[1];
        self.data[i + 2] = rgb[2];
    }

    /// Overwrite the full RGBA sample at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the buffer.
    #[inline]
    pub fn set_rgba(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let i = self.offset(x, y);
        self.data[i..i + 4].copy_from_slice(&rgba);
    }

    /// Convert into an [`image::RgbaImage`] for encoding.
    ///
    /// # Panics
    ///
    /// Never panics: the length invariant is enforced at construction.
    #[must_use]
    pub fn into_image(self) -> RgbaImage {
        RgbaImage::from_raw(self.width, self.height, self.data)
            .expect("buffer length invariant violated")
    }
}

impl TryFrom<RgbaImage> for PixelBuffer {
    type Error = Error;

    fn try_from(img: RgbaImage) -> Result<Self> {
        let (width, height) = (img.width(), img.height());
        Self::from_raw(width, height, img.into_raw())
    }
}

/// An axis-aligned rectangle in pixel coordinates.
///
/// Producers guarantee `x + width <= image width` and
/// `y + height <= image height`. A zero-area region is the
/// "no watermark found" sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Region {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Region {
    /// The "no watermark found" sentinel.
    pub const EMPTY: Self = Self {
        x: 0,
        y: 0,
        width: 0,
        height: 0,
    };

    /// Construct a region from its corners.
    #[must_use]
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whether this region denotes "no watermark found".
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// One past the right edge.
    #[must_use]
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// One past the bottom edge.
    #[must_use]
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    /// Whether `(x, y)` falls inside the region.
    #[must_use]
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_raw_rejects_zero_area() {
        assert!(matches!(
            PixelBuffer::from_raw(0, 10, vec![]),
            Err(Error::InvalidDimensions { .. })
        ));
        assert!(matches!(
            PixelBuffer::from_raw(10, 0, vec![]),
            Err(Error::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn from_raw_rejects_length_mismatch() {
        let err = PixelBuffer::from_raw(2, 2, vec![0; 15]).unwrap_err();
        match err {
            Error::BufferSizeMismatch {
                expected, actual, ..
            } => {
                assert_eq!(expected, 16);
                assert_eq!(actual, 15);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn pixel_accessors_roundtrip() {
        let mut buf = PixelBuffer::new(4, 3).unwrap();
        buf.set_rgba(2, 1, [10, 20, 30, 40]);
        assert_eq!(buf.rgba(2, 1), [10, 20, 30, 40]);

        buf.set_rgb(2, 1, [1, 2, 3]);
        assert_eq!(buf.rgba(2, 1), [1, 2, 3, 40], "set_rgb must keep alpha");
        assert_eq!(buf.rgb(2, 1), [1, 2, 3]);
    }

    #[test]
    fn image_conversion_roundtrip() {
        let mut img = RgbaImage::new(3, 2);
        img.put_pixel(1, 1, image::Rgba([9, 8, 7, 6]));

        let buf = PixelBuffer::try_from(img.clone()).unwrap();
        assert_eq!(buf.rgba(1, 1), [9, 8, 7, 6]);
        assert_eq!(buf.into_image(), img);
    }

    #[test]
    fn region_empty_and_contains() {
        assert!(Region::EMPTY.is_empty());
        assert!(Region::new(5, 5, 0, 3).is_empty());

        let r = Region::new(2, 3, 4, 5);
        assert!(!r.is_empty());
        assert!(r.contains(2, 3));
        assert!(r.contains(5, 7));
        assert!(!r.contains(6, 3));
        assert!(!r.contains(2, 8));
        assert!(!r.contains(1, 3));
    }
}
