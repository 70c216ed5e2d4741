//! Seam smoothing between a synthesized region and its surroundings.

use crate::buffer::{PixelBuffer, Region};
use crate::config::Config;

/// Fades the band of exterior pixels just outside a filled region toward the
/// nearest in-region color, hiding the seam.
///
/// The falloff is quadratic: directly at the border the exterior pixel takes
/// almost the full inner color, and the effect vanishes `blend_radius` pixels
/// out.
#[derive(Debug, Clone)]
pub struct EdgeBlender {
    blend_radius: u32,
}

impl EdgeBlender {
    /// Create a blender with `config.blend_radius`.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            blend_radius: config.blend_radius,
        }
    }

    /// Smooth the transition band around `region`, in place.
    ///
    /// Operates on the synthesis output, never the caller's original buffer.
    /// In-region pixels and alpha channels are left untouched. A zero-area
    /// region is a no-op.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn smooth(&self, buffer: &mut PixelBuffer, region: Region) {
        if region.is_empty() || self.blend_radius == 0 {
            return;
        }

        let radius = i64::from(self.blend_radius);
        let (w, h) = (i64::from(buffer.width()), i64::from(buffer.height()));
        let (rx, ry) = (i64::from(region.x), i64::from(region.y));
        let (right, bottom) = (i64::from(region.right()), i64::from(region.bottom()));

        for y in (ry - radius)..(bottom + radius) {
            for x in (rx - radius)..(right + radius) {
                if x < 0 || x >= w || y < 0 || y >= h {
                    continue;
                }
                let inside = x >= rx && x < right && y >= ry && y < bottom;
                if inside {
                    continue;
                }

                let distance = (x - rx)
                    .abs()
                    .min((x - right).abs())
                    .min((y - ry).abs())
                    .min((y - bottom).abs());
                if distance >= radius {
                    continue;
                }

                #[allow(clippy::cast_precision_loss)]
                let blend_factor = (distance as f64 / radius as f64).powi(2);

                let inner_x = x.clamp(rx, right - 1) as u32;
                let inner_y = y.clamp(ry, bottom - 1) as u32;
                let inner = buffer.rgb(inner_x, inner_y);
                let original = buffer.rgb(x as u32, y as u32);

                let mix = |orig: u8, inn: u8| {
                    (f64::from(orig) * blend_factor + f64::from(inn) * (1.0 - blend_factor))
                        .round() as u8
                };
                buffer.set_rgb(
                    x as u32,
                    y as u32,
                    [
                        mix(original[0], inner[0]),
                        mix(original[1], inner[1]),
                        mix(original[2], inner[2]),
                    ],
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(width: u32, height: u32, rgba: [u8; 4]) -> PixelBuffer {
        let mut buf = PixelBuffer::new(width, height).unwrap();
        for y in 0..height {
            for x in 0..width {
                buf.set_rgba(x, y, rgba);
            }
        }
        buf
    }

    fn blender() -> EdgeBlender {
        EdgeBlender::new(Config::default())
    }

    #[test]
    fn uniform_buffer_is_unchanged() {
        let mut buf = uniform(30, 30, [77, 77, 77, 255]);
        let before = buf.clone();
        blender().smooth(&mut buf, Region::new(10, 10, 8, 8));
        assert_eq!(buf, before);
    }

    #[test]
    fn empty_region_is_a_noop() {
        let mut buf = uniform(10, 10, [1, 2, 3, 4]);
        let before = buf.clone();
        blender().smooth(&mut buf, Region::EMPTY);
        assert_eq!(buf, before);
    }

    #[test]
    fn quadratic_falloff_across_the_band() {
        // Black region on white: the band fades from near-black at the
        // border to untouched white blend_radius pixels out.
        let mut buf = uniform(40, 40, [255, 255, 255, 255]);
        let region = Region::new(15, 15, 12, 12);
        for y in region.y..region.bottom() {
            for x in region.x..region.right() {
                buf.set_rgba(x, y, [0, 0, 0, 255]);
            }
        }

        blender().smooth(&mut buf, region);

        // Row 21 sits 6px from the top and bottom edges, so for pixels left
        // of the region the horizontal distance is the minimum.
        // distance 1: factor 0.04 -> 255 * 0.04 = 10
        assert_eq!(buf.rgb(14, 21), [10, 10, 10]);
        // distance 4: factor 0.64 -> 163
        assert_eq!(buf.rgb(11, 21), [163, 163, 163]);
        // distance 5: outside the band, untouched
        assert_eq!(buf.rgb(10, 21), [255, 255, 255]);
        // in-region pixels untouched
        assert_eq!(buf.rgb(20, 20), [0, 0, 0]);
    }

    #[test]
    fn region_touching_image_corner_does_not_panic() {
        for region in [
            Region::new(0, 0, 6, 6),
            Region::new(24, 0, 6, 6),
            Region::new(0, 24, 6, 6),
            Region::new(24, 24, 6, 6),
            Region::new(0, 0, 30, 30),
        ] {
            let mut buf = uniform(30, 30, [128, 128, 128, 255]);
            blender().smooth(&mut buf, region);
            assert_eq!(buf.width(), 30);
            assert_eq!(buf.height(), 30);
        }
    }

    #[test]
    fn alpha_is_never_touched() {
        let mut buf = uniform(20, 20, [255, 255, 255, 200]);
        let region = Region::new(8, 8, 4, 4);
        for y in region.y..region.bottom() {
            for x in region.x..region.right() {
                buf.set_rgba(x, y, [0, 0, 0, 90]);
            }
        }

        blender().smooth(&mut buf, region);

        for y in 0..20 {
            for x in 0..20 {
                let expected = if region.contains(x, y) { 90 } else { 200 };
                assert_eq!(buf.rgba(x, y)[3], expected, "alpha ({x},{y})");
            }
        }
    }
}
