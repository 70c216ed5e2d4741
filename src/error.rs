//! Error types for the watermark-inpaint crate.

/// Errors that can occur during watermark detection and inpainting.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A pixel buffer was constructed with a zero-area size.
    #[error("invalid buffer dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Stated width in pixels.
        width: u32,
        /// Stated height in pixels.
        height: u32,
    },

    /// The raw data length does not match the stated dimensions.
    #[error("buffer size mismatch: {width}x{height} needs {expected} bytes, got {actual}")]
    BufferSizeMismatch {
        /// Stated width in pixels.
        width: u32,
        /// Stated height in pixels.
        height: u32,
        /// Expected data length (`width * height * 4`).
        expected: usize,
        /// Actual data length supplied.
        actual: usize,
    },

    /// Synthesis was aborted through its cancellation flag.
    #[error("synthesis cancelled")]
    Cancelled,

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The image format is not supported.
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// An error occurred during image decoding or encoding.
    #[error("image processing error: {0}")]
    Image(#[from] image::ImageError),
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let io_err = Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(io_err.to_string().contains("gone"));

        let unsupported = Error::UnsupportedFormat("tiff".to_string());
        assert!(unsupported.to_string().contains("tiff"));

        let dims = Error::InvalidDimensions {
            width: 0,
            height: 20,
        };
        assert!(dims.to_string().contains("0x20"));

        let mismatch = Error::BufferSizeMismatch {
            width: 2,
            height: 2,
            expected: 16,
            actual: 12,
        };
        let msg = mismatch.to_string();
        assert!(msg.contains("16"));
        assert!(msg.contains("12"));
    }
}
