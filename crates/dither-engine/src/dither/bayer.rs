/// 8x8 ordered-dither threshold table, row-major, values `k / 64` for `k` in `0..64`.
///
/// Row `y`, column `x` lives at `y * 8 + x`. The arrangement is a calibrated visual
/// parameter of the effect and must not be regenerated from the recursive Bayer
/// construction.
pub const BAYER_8X8: [f32; 64] = {
    const RANKS: [u8; 64] = [
        0, 48, 12, 60, 3, 51, 15, 63,
        32, 16, 44, 28, 35, 19, 47, 31,
        8, 56, 4, 52, 11, 59, 7, 55,
        40, 24, 36, 20, 43, 27, 39, 23,
        2, 50, 14, 62, 1, 49, 13, 61,
        34, 18, 46, 30, 33, 17, 45, 29,
        10, 58, 6, 54, 9, 57, 5, 53,
        42, 26, 38, 22, 41, 25, 37, 21,
    ];
    let mut out = [0.0f32; 64];
    let mut i = 0;
    while i < 64 {
        out[i] = RANKS[i] as f32 / 64.0;
        i += 1;
    }
    out
};

/// Table index for cell `(x, y)`, wrapping both axes with period 8.
///
/// Negative coordinates wrap like GLSL `mod` (toward the positive residue).
#[inline]
pub fn bayer_index(x: i64, y: i64) -> usize {
    (y.rem_euclid(8) * 8 + x.rem_euclid(8)) as usize
}

#[inline]
pub fn bayer_value(x: i64, y: i64) -> f32 {
    BAYER_8X8[bayer_index(x, y)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_a_permutation_of_64ths() {
        let mut ranks: Vec<u32> = BAYER_8X8.iter().map(|v| (v * 64.0) as u32).collect();
        ranks.sort_unstable();
        assert_eq!(ranks, (0..64).collect::<Vec<_>>());
        assert!(BAYER_8X8.iter().all(|v| (0.0..1.0).contains(v)));
    }

    #[test]
    fn known_cells() {
        assert_eq!(bayer_value(0, 0), 0.0);
        assert_eq!(bayer_value(1, 0), 48.0 / 64.0);
        assert_eq!(bayer_value(0, 1), 0.5);
        assert_eq!(bayer_value(7, 7), 21.0 / 64.0);
    }

    #[test]
    fn index_is_periodic_in_both_axes() {
        for y in -16..16 {
            for x in -16..16 {
                let v = bayer_value(x, y);
                assert_eq!(bayer_value(x + 8, y), v);
                assert_eq!(bayer_value(x, y + 8), v);
                assert_eq!(bayer_value(x + 8, y + 8), v);
            }
        }
    }

    #[test]
    fn negative_coordinates_wrap_to_positive_residue() {
        assert_eq!(bayer_index(-1, 0), 7);
        assert_eq!(bayer_index(0, -1), 56);
    }
}
