//! CPU reference of the dither transform.
//!
//! Coordinates follow the post-process convention: `uv` in `[0, 1)`, origin at the
//! bottom-left, sampled at pixel centers. Buffers are stored top row first, as wgpu
//! textures are; [`dither_buffer`] does the flip.

use glam::{UVec2, Vec2};

use crate::coords::{ColorRgba, PixelExtent};

use super::bayer::bayer_value;
use super::params::DitherParameters;

/// Offset subtracted from the table value to center thresholds around zero.
pub const THRESHOLD_CENTER: f32 = 0.25;

/// Darkening bias subtracted from every channel before quantization.
pub const DARKEN_BIAS: f32 = 0.2;

/// Snaps `uv` to the lower-left corner of its `pixel`-sized block.
#[inline]
pub fn block_uv(uv: Vec2, resolution: Vec2, pixel: f32) -> Vec2 {
    let block = Vec2::splat(pixel) / resolution;
    block * (uv / block).floor()
}

/// Texel read for a block sample, `(x, row-from-bottom)`, clamped to the buffer.
///
/// `uv_block * resolution` lands on an integer up to rounding error; rounding recovers
/// the first texel of the block instead of flickering into its neighbour.
#[inline]
pub fn source_texel(uv_block: Vec2, resolution: Vec2) -> UVec2 {
    let max = (resolution - Vec2::ONE).max(Vec2::ZERO);
    let t = (uv_block * resolution + Vec2::splat(0.5)).floor().clamp(Vec2::ZERO, max);
    t.as_uvec2()
}

/// Centered Bayer threshold for the block containing `uv`.
#[inline]
pub fn threshold(uv: Vec2, resolution: Vec2, pixel: f32) -> f32 {
    let scaled = (uv * resolution / pixel).floor();
    bayer_value(scaled.x as i64, scaled.y as i64) - THRESHOLD_CENTER
}

/// Rounds `c` to the nearest of `palette_size` evenly spaced levels in `[0, 1]`.
#[inline]
pub fn quantize(c: f32, palette_size: f32) -> f32 {
    let n = palette_size - 1.0;
    (c * n + 0.5).floor() / n
}

/// Steps 4–6 for one channel: threshold offset, bias + clamp, quantize.
#[inline]
pub fn dither_channel(c: f32, threshold: f32, params: &DitherParameters) -> f32 {
    let shifted = c + threshold * params.level_step();
    quantize((shifted - DARKEN_BIAS).clamp(0.0, 1.0), params.palette_size())
}

/// Dithers an already-sampled color at `uv`. Alpha passes through.
pub fn dither_color(uv: Vec2, color: ColorRgba, resolution: Vec2, params: &DitherParameters) -> ColorRgba {
    let t = threshold(uv, resolution, params.pixel_block_size());
    color.map_rgb(|c| dither_channel(c, t, params))
}

/// Full per-pixel transform: block snap, sample through `source`, dither.
///
/// `source` receives texel coordinates with the row counted from the bottom.
pub fn dither_pixel(
    uv: Vec2,
    source: impl Fn(UVec2) -> ColorRgba,
    resolution: Vec2,
    params: &DitherParameters,
) -> ColorRgba {
    let uv_block = block_uv(uv, resolution, params.pixel_block_size());
    let color = source(source_texel(uv_block, resolution));
    dither_color(uv, color, resolution, params)
}

/// Runs the transform over a whole buffer (rows top to bottom).
///
/// Returns `None` if `src` does not hold exactly `extent` pixels.
pub fn dither_buffer(
    src: &[ColorRgba],
    extent: PixelExtent,
    params: &DitherParameters,
) -> Option<Vec<ColorRgba>> {
    let (w, h) = (extent.width as usize, extent.height as usize);
    if src.len() != w * h {
        return None;
    }

    let resolution = extent.resolution();
    let fetch = |t: UVec2| src[(h - 1 - t.y as usize) * w + t.x as usize];

    let mut out = Vec::with_capacity(src.len());
    for row in 0..h {
        let y_up = (h - 1 - row) as f32 + 0.5;
        for x in 0..w {
            let uv = Vec2::new(x as f32 + 0.5, y_up) / resolution;
            out.push(dither_pixel(uv, &fetch, resolution, params));
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    use crate::dither::{DitherProps, BAYER_8X8};

    fn params(colors: f32, pixel: f32) -> DitherParameters {
        DitherProps { color_num: colors, pixel_size: pixel }.validate().unwrap()
    }

    /// UV at the center of device pixel `(x, y)` (y counted from the bottom).
    fn pixel_uv(x: u32, y: u32, res: Vec2) -> Vec2 {
        Vec2::new(x as f32 + 0.5, y as f32 + 0.5) / res
    }

    // ── pixelation ────────────────────────────────────────────────────────

    #[test]
    fn pixels_in_one_block_share_a_sample_position() {
        let res = Vec2::new(64.0, 48.0);
        for pixel in [1.0f32, 2.0, 3.0, 4.0, 8.0] {
            let p = pixel as u32;
            for y in 0..48u32 {
                for x in 0..64u32 {
                    let anchor = pixel_uv(x / p * p, y / p * p, res);
                    assert_eq!(
                        block_uv(pixel_uv(x, y, res), res, pixel),
                        block_uv(anchor, res, pixel),
                        "pixel {pixel}, ({x}, {y})"
                    );
                }
            }
        }
    }

    #[test]
    fn block_sample_reads_first_texel_of_block() {
        let res = Vec2::new(64.0, 48.0);
        let uv = pixel_uv(13, 30, res);
        let t = source_texel(block_uv(uv, res, 4.0), res);
        assert_eq!(t, UVec2::new(12, 28));
    }

    #[test]
    fn source_texel_is_clamped() {
        let res = Vec2::new(4.0, 4.0);
        assert_eq!(source_texel(Vec2::new(1.2, -0.3), res), UVec2::new(3, 0));
    }

    // ── threshold ─────────────────────────────────────────────────────────

    #[test]
    fn threshold_tracks_block_grid_and_centers() {
        let res = Vec2::new(32.0, 32.0);
        // Block (0, 1) at 2px blocks covers pixels x 0..2, y 2..4.
        let t = threshold(pixel_uv(1, 3, res), res, 2.0);
        assert!((t - (0.5 - THRESHOLD_CENTER)).abs() < 1e-6);
        assert_eq!(threshold(pixel_uv(0, 0, res), res, 2.0), -THRESHOLD_CENTER);
    }

    #[test]
    fn threshold_is_periodic_over_eight_blocks() {
        let res = Vec2::new(256.0, 256.0);
        for pixel in [1.0f32, 2.0] {
            let period = (8.0 * pixel) as u32;
            for y in 0..16u32 {
                for x in 0..16u32 {
                    let t = threshold(pixel_uv(x, y, res), res, pixel);
                    assert_eq!(threshold(pixel_uv(x + period, y, res), res, pixel), t);
                    assert_eq!(threshold(pixel_uv(x, y + period, res), res, pixel), t);
                    assert_eq!(threshold(pixel_uv(x + period, y + period, res), res, pixel), t);
                }
            }
        }
    }

    // ── quantization ──────────────────────────────────────────────────────

    #[test]
    fn quantize_yields_exactly_palette_size_levels() {
        for n in 2..=16u32 {
            let palette = n as f32;
            let levels: BTreeSet<u32> = (0..=1000)
                .map(|i| quantize(i as f32 / 1000.0, palette))
                .map(|q| (q * (palette - 1.0)).round() as u32)
                .collect();
            assert_eq!(levels, (0..n).collect(), "palette {n}");
        }
    }

    #[test]
    fn quantized_values_are_fixed_points() {
        for n in [2.0f32, 3.0, 4.0, 7.0, 16.0] {
            for i in 0..=200 {
                let q = quantize(i as f32 / 200.0, n);
                assert_eq!(quantize(q, n), q, "palette {n}, input {i}");
            }
        }
    }

    #[test]
    fn dithered_output_stays_on_palette() {
        let res = Vec2::new(16.0, 16.0);
        for n in 2..=4u32 {
            let p = params(n as f32, 1.0);
            let mut seen = BTreeSet::new();
            for y in 0..8 {
                for x in 0..8 {
                    for i in 0..=50 {
                        let c = dither_color(pixel_uv(x, y, res), ColorRgba::gray(i as f32 / 50.0), res, &p);
                        let level = c.r * (n as f32 - 1.0);
                        assert!((level - level.round()).abs() < 1e-5);
                        seen.insert(level.round() as u32);
                    }
                }
            }
            assert_eq!(seen, (0..n).collect(), "palette {n}");
        }
    }

    #[test]
    fn alpha_passes_through() {
        let res = Vec2::new(8.0, 8.0);
        let c = dither_color(pixel_uv(2, 5, res), ColorRgba::new(0.3, 0.7, 0.9, 0.42), res, &params(4.0, 1.0));
        assert_eq!(c.a, 0.42);
    }

    // ── worked examples ───────────────────────────────────────────────────

    #[test]
    fn four_levels_mid_gray_on_half_threshold() {
        let res = Vec2::new(8.0, 8.0);
        let uv = pixel_uv(0, 1, res);
        assert_eq!(BAYER_8X8[8], 0.5);

        let p = params(4.0, 1.0);
        let pre = (0.6 + (0.5 - THRESHOLD_CENTER) * p.level_step() - DARKEN_BIAS).clamp(0.0, 1.0);
        assert!((pre - 0.4833).abs() < 1e-4);

        let out = dither_color(uv, ColorRgba::gray(0.6), res, &p);
        assert!((out.r - 1.0 / 3.0).abs() < 1e-6);
        assert_eq!(out.r, out.g);
        assert_eq!(out.g, out.b);
    }

    #[test]
    fn two_levels_is_a_binary_threshold() {
        let res = Vec2::new(8.0, 8.0);
        let p = params(2.0, 1.0);
        // Cell (0, 0): table value 0, so the cut sits at 0.5 + 0.25 + 0.2 = 0.95.
        let uv = pixel_uv(0, 0, res);
        assert_eq!(dither_color(uv, ColorRgba::gray(0.96), res, &p).r, 1.0);
        assert_eq!(dither_color(uv, ColorRgba::gray(0.94), res, &p).r, 0.0);

        // Cell (0, 1): table value 0.5, cut at 0.45.
        let uv = pixel_uv(0, 1, res);
        assert_eq!(dither_color(uv, ColorRgba::gray(0.46), res, &p).r, 1.0);
        assert_eq!(dither_color(uv, ColorRgba::gray(0.44), res, &p).r, 0.0);

        for i in 0..=100 {
            let v = dither_color(uv, ColorRgba::gray(i as f32 / 100.0), res, &p).r;
            assert!(v == 0.0 || v == 1.0);
        }
    }

    // ── whole buffer ──────────────────────────────────────────────────────

    #[test]
    fn buffer_blocks_take_their_bottom_left_texel() {
        // 4x4 buffer, rows top to bottom; every texel a distinct gray.
        let extent = PixelExtent::new(4, 4);
        let src: Vec<ColorRgba> = (0..16).map(|i| ColorRgba::gray(i as f32 / 15.0)).collect();
        let p = params(256.0, 2.0);

        let out = dither_buffer(&src, extent, &p).unwrap();
        assert_eq!(out.len(), 16);

        // Top-left 2x2 block (rows 0-1) samples its bottom-left texel: row 1, column 0.
        // Same-block pixels differ only by their thresholds, so compare the sources.
        let expected_src = src[4];
        for (row, col) in [(0usize, 0usize), (0, 1), (1, 0), (1, 1)] {
            let uv = Vec2::new(col as f32 + 0.5, (3 - row) as f32 + 0.5) / extent.resolution();
            let expected = dither_color(uv, expected_src, extent.resolution(), &p);
            assert_eq!(out[row * 4 + col], expected);
        }
    }

    #[test]
    fn buffer_size_mismatch_is_rejected() {
        let src = vec![ColorRgba::black(); 3];
        assert!(dither_buffer(&src, PixelExtent::new(2, 2), &params(4.0, 2.0)).is_none());
    }
}
