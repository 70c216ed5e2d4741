//! Brightness and neighborhood statistics over pixel buffers.

use crate::buffer::PixelBuffer;

/// Perceptual luminance of an RGB sample, in `[0, 1]`.
///
/// Uses the Rec. 601 weighting: `(0.299*R + 0.587*G + 0.114*B) / 255`.
#[must_use]
pub fn luminance(r: u8, g: u8, b: u8) -> f64 {
    (0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b)) / 255.0
}

/// Mean R, G, B over the square window of the given radius around `(x, y)`,
/// clamped to the buffer bounds.
///
/// The center pixel is always inside the window, so the mean is taken over at
/// least one sample.
///
/// # Panics
///
/// Panics if `(x, y)` is outside the buffer.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn neighborhood_average(buffer: &PixelBuffer, x: u32, y: u32, radius: u32) -> (u8, u8, u8) {
    assert!(x < buffer.width() && y < buffer.height());

    let x0 = x.saturating_sub(radius);
    let y0 = y.saturating_sub(radius);
    let x1 = (x + radius + 1).min(buffer.width());
    let y1 = (y + radius + 1).min(buffer.height());

    let mut sums = [0u64; 3];
    let mut count = 0u64;
    for ny in y0..y1 {
        for nx in x0..x1 {
            let [r, g, b] = buffer.rgb(nx, ny);
            sums[0] += u64::from(r);
            sums[1] += u64::from(g);
            sums[2] += u64::from(b);
            count += 1;
        }
    }

    #[allow(clippy::cast_precision_loss)]
    let mean = |sum: u64| (sum as f64 / count as f64).round() as u8;
    (mean(sums[0]), mean(sums[1]), mean(sums[2]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn luminance_of_black_is_zero() {
        assert!(luminance(0, 0, 0).abs() < 1e-9);
    }

    #[test]
    fn luminance_of_white_is_one() {
        assert!((luminance(255, 255, 255) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn luminance_of_mid_gray() {
        let lum = luminance(128, 128, 128);
        assert!((lum - 128.0 / 255.0).abs() < 1e-9);
    }

    #[test]
    fn luminance_weights_green_heaviest() {
        assert!(luminance(0, 100, 0) > luminance(100, 0, 0));
        assert!(luminance(100, 0, 0) > luminance(0, 0, 100));
    }

    #[test]
    fn neighborhood_average_of_uniform_buffer() {
        let mut buf = PixelBuffer::new(10, 10).unwrap();
        for y in 0..10 {
            for x in 0..10 {
                buf.set_rgba(x, y, [40, 80, 120, 255]);
            }
        }
        assert_eq!(neighborhood_average(&buf, 5, 5, 3), (40, 80, 120));
    }

    #[test]
    fn neighborhood_average_clamps_at_corner() {
        // Radius larger than the image: the window is the whole buffer.
        let mut buf = PixelBuffer::new(2, 2).unwrap();
        buf.set_rgba(0, 0, [0, 0, 0, 255]);
        buf.set_rgba(1, 0, [100, 100, 100, 255]);
        buf.set_rgba(0, 1, [100, 100, 100, 255]);
        buf.set_rgba(1, 1, [200, 200, 200, 255]);

        assert_eq!(neighborhood_average(&buf, 0, 0, 5), (100, 100, 100));
    }

    #[test]
    fn neighborhood_average_zero_radius_is_center_pixel() {
        let mut buf = PixelBuffer::new(3, 3).unwrap();
        buf.set_rgba(1, 1, [7, 8, 9, 255]);
        assert_eq!(neighborhood_average(&buf, 1, 1, 0), (7, 8, 9));
    }
}
