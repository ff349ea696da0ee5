//! Scalar implementations of the resampling kernels
//!
//! These are the reference loop nests. They do no validation: dimensions,
//! levels and buffer sizes are the caller's responsibility, and a buffer that
//! is too short panics on slice indexing. See [`crate::checked`] for the
//! validated versions.
//!
//! All buffers are flat row-major volumes with the last axis contiguous.

use crate::{binsize, Sample};

/// Center every `dz`-long row of `data` inside an `npad`-long row of `out`
///
/// `data` has logical shape `(dx, dy, dz)` and `out` has `(dx, dy, npad)`.
/// Row `(m, n)` is copied to `out[m, n, pad_width..pad_width + dz]` with
/// `pad_width = (npad - dz) / 2`, so an odd margin puts the extra sample on
/// the right. Positions outside the copied rows are not written; fill `out`
/// with the pad value first.
pub fn apply_padding<T: Sample>(
    data: &[T],
    dx: usize,
    dy: usize,
    dz: usize,
    npad: usize,
    out: &mut [T],
) {
    let pad_width = (npad - dz) / 2;

    for m in 0..dx {
        let iproj = m * dy * dz;
        let oproj = m * dy * npad + pad_width;

        for n in 0..dy {
            let i = iproj + n * dz;
            let j = oproj + n * npad;
            out[j..j + dz].copy_from_slice(&data[i..i + dz]);
        }
    }
}

/// Bin `2^level` consecutive samples along the last axis
///
/// `data` has logical shape `(dx, dy, dz)`, `out` has `(dx, dy, dz / 2^level)`.
/// Each input sample is divided by the bin size and **added** to its output
/// sample, so `out` must be zeroed beforehand to get the mean. Input is read
/// strictly in order; `dz` should be a multiple of the bin size.
pub fn downsample2d<T: Sample>(
    data: &[T],
    dx: usize,
    dy: usize,
    dz: usize,
    level: u32,
    out: &mut [T],
) {
    let bin = binsize(level);
    let scale = T::from_f64(bin as f64);
    let dz = dz / bin;

    let mut ind = 0;
    for m in 0..dx {
        let iproj = m * dy * dz;

        for n in 0..dy {
            let row = iproj + n * dz;

            for acc in &mut out[row..row + dz] {
                for &v in &data[ind..ind + bin] {
                    *acc = *acc + v / scale;
                }
                ind += bin;
            }
        }
    }
}

/// Bin `2^level × 2^level` blocks over the last two axes
///
/// `data` has logical shape `(dx, dy, dz)`, `out` has
/// `(dx, dy / 2^level, dz / 2^level)`. Like [`downsample2d`] this accumulates:
/// each input sample is divided by `binsize²` and added to `out`.
pub fn downsample3d<T: Sample>(
    data: &[T],
    dx: usize,
    dy: usize,
    dz: usize,
    level: u32,
    out: &mut [T],
) {
    let bin = binsize(level);
    let scale = T::from_f64((bin * bin) as f64);
    let dy = dy / bin;
    let dz = dz / bin;

    let mut ind = 0;
    for m in 0..dx {
        let iproj = m * dy * dz;

        for n in 0..dy {
            let row = iproj + n * dz;

            // bin input rows fold into the same output row
            for _q in 0..bin {
                for acc in &mut out[row..row + dz] {
                    for &v in &data[ind..ind + bin] {
                        *acc = *acc + v / scale;
                    }
                    ind += bin;
                }
            }
        }
    }
}

/// Nearest-neighbor upsampling of a stack of square slices
///
/// `data` holds `dy` slices of `dz × dz` samples. Each slice is magnified by
/// `b = 2^level` on both of its axes, giving `out` the shape
/// `(dy, dz * b, dz * b)` with `out[m, n*b + q, k*b + p] = data[m, n, k]`.
pub fn upsample2d<T: Sample>(data: &[T], dy: usize, dz: usize, level: u32, out: &mut [T]) {
    let bin = binsize(level);
    let line = dz * bin;

    let mut ind = 0;
    for m in 0..dy {
        let iproj = m * dz * dz;

        for n in 0..dz {
            let i = iproj + n * dz;
            let row = &data[i..i + dz];

            for _q in 0..bin {
                replicate_row(row, bin, &mut out[ind..ind + line]);
                ind += line;
            }
        }
    }
}

/// Nearest-neighbor upsampling of a volume of square slices on all three axes
///
/// Same input as [`upsample2d`]; every magnified slice is additionally
/// repeated `b` times, so `out` has shape `(dy * b, dz * b, dz * b)` with
/// `out[m*b + j, n*b + q, k*b + p] = data[m, n, k]`.
pub fn upsample3d<T: Sample>(data: &[T], dy: usize, dz: usize, level: u32, out: &mut [T]) {
    let bin = binsize(level);
    let line = dz * bin;

    let mut ind = 0;
    for m in 0..dy {
        let iproj = m * dz * dz;

        for _j in 0..bin {
            for n in 0..dz {
                let i = iproj + n * dz;
                let row = &data[i..i + dz];

                for _q in 0..bin {
                    replicate_row(row, bin, &mut out[ind..ind + line]);
                    ind += line;
                }
            }
        }
    }
}

/// Write each sample of `row` `bin` times in a row into `line`
#[inline]
fn replicate_row<T: Copy>(row: &[T], bin: usize, line: &mut [T]) {
    for (block, &v) in line.chunks_exact_mut(bin).zip(row) {
        block.fill(v);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_apply_padding_centers_row() {
        let data = [5.0f32, 6.0];
        let mut out = [0.0f32; 4];

        apply_padding(&data, 1, 1, 2, 4, &mut out);

        assert_eq!(out, [0.0, 5.0, 6.0, 0.0]);
    }

    #[test]
    fn test_apply_padding_odd_margin_goes_right() {
        let data = [1.0f32, 2.0];
        let mut out = [-1.0f32; 5];

        apply_padding(&data, 1, 1, 2, 5, &mut out);

        // pad_width = 3 / 2 = 1
        assert_eq!(out, [-1.0, 1.0, 2.0, -1.0, -1.0]);
    }

    #[test]
    fn test_apply_padding_multiple_rows() {
        // (dx, dy, dz) = (2, 2, 2), npad = 4
        let data: Vec<f32> = (1..=8).map(|v| v as f32).collect();
        let mut out = vec![0.0f32; 16];

        apply_padding(&data, 2, 2, 2, 4, &mut out);

        assert_eq!(
            out,
            vec![
                0.0, 1.0, 2.0, 0.0, //
                0.0, 3.0, 4.0, 0.0, //
                0.0, 5.0, 6.0, 0.0, //
                0.0, 7.0, 8.0, 0.0,
            ]
        );
    }

    #[test]
    fn test_apply_padding_same_width_is_copy() {
        let data = [1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0];
        let mut out = [0.0f64; 6];

        apply_padding(&data, 1, 2, 3, 3, &mut out);

        assert_eq!(out, data);
    }

    #[test]
    fn test_downsample2d_pairs() {
        let data = [1.0f32, 2.0, 3.0, 4.0];
        let mut out = [0.0f32; 2];

        downsample2d(&data, 1, 1, 4, 1, &mut out);

        assert_relative_eq!(out[0], 1.5);
        assert_relative_eq!(out[1], 3.5);
    }

    #[test]
    fn test_downsample2d_accumulates() {
        let data = [1.0f32, 2.0, 3.0, 4.0];
        let mut out = [10.0f32, 20.0];

        downsample2d(&data, 1, 1, 4, 1, &mut out);
        assert_relative_eq!(out[0], 11.5);
        assert_relative_eq!(out[1], 23.5);

        downsample2d(&data, 1, 1, 4, 1, &mut out);
        assert_relative_eq!(out[0], 13.0);
        assert_relative_eq!(out[1], 27.0);
    }

    #[test]
    fn test_downsample2d_level_zero_is_copy() {
        let data: Vec<f32> = (0..24).map(|v| v as f32 * 0.37 - 2.0).collect();
        let mut out = vec![0.0f32; 24];

        downsample2d(&data, 2, 3, 4, 0, &mut out);

        assert_eq!(out, data);
    }

    #[test]
    fn test_downsample2d_rows_stay_separate() {
        // (dx, dy, dz) = (2, 2, 4), level 2 -> one sample per row
        let data: Vec<f64> = (0..16).map(|v| v as f64).collect();
        let mut out = vec![0.0f64; 4];

        downsample2d(&data, 2, 2, 4, 2, &mut out);

        assert_eq!(out, vec![1.5, 5.5, 9.5, 13.5]);
    }

    #[test]
    fn test_downsample3d_block_mean() {
        // (dx, dy, dz) = (1, 2, 4), level 1 -> (1, 1, 2)
        let data = [
            1.0f32, 2.0, 3.0, 4.0, //
            5.0, 6.0, 7.0, 8.0,
        ];
        let mut out = [0.0f32; 2];

        downsample3d(&data, 1, 2, 4, 1, &mut out);

        assert_relative_eq!(out[0], (1.0 + 2.0 + 5.0 + 6.0) / 4.0);
        assert_relative_eq!(out[1], (3.0 + 4.0 + 7.0 + 8.0) / 4.0);
    }

    #[test]
    fn test_downsample3d_per_projection() {
        // (dx, dy, dz) = (2, 2, 2), level 1 -> (2, 1, 1)
        let data = [1.0f32, 1.0, 1.0, 1.0, 2.0, 4.0, 6.0, 8.0];
        let mut out = [0.5f32; 2];

        downsample3d(&data, 2, 2, 2, 1, &mut out);

        assert_relative_eq!(out[0], 1.5);
        assert_relative_eq!(out[1], 5.5);
    }

    #[test]
    fn test_upsample2d_replicates_row() {
        // dy = 1, dz = 2: one 2x2 slice
        let data = [7.0f32, 8.0, 9.0, 10.0];
        let mut out = [0.0f32; 16];

        upsample2d(&data, 1, 2, 1, &mut out);

        assert_eq!(&out[..8], &[7.0, 7.0, 8.0, 8.0, 7.0, 7.0, 8.0, 8.0]);
        assert_eq!(&out[8..], &[9.0, 9.0, 10.0, 10.0, 9.0, 9.0, 10.0, 10.0]);
    }

    #[test]
    fn test_upsample2d_level_zero_is_copy() {
        let data: Vec<f32> = (0..18).map(|v| v as f32).collect();
        let mut out = vec![0.0f32; 18];

        upsample2d(&data, 2, 3, 0, &mut out);

        assert_eq!(out, data);
    }

    #[test]
    fn test_upsample3d_index_formula() {
        let (dy, dz, level) = (2usize, 3usize, 1u32);
        let b = binsize(level);
        let data: Vec<f32> = (0..dy * dz * dz).map(|v| v as f32).collect();
        let mut out = vec![f32::NAN; dy * b * dz * b * dz * b];

        upsample3d(&data, dy, dz, level, &mut out);

        let (oy, oz) = (dz * b, dz * b);
        for m in 0..dy {
            for j in 0..b {
                for n in 0..dz {
                    for q in 0..b {
                        for k in 0..dz {
                            for p in 0..b {
                                let o = ((m * b + j) * oy + n * b + q) * oz + k * b + p;
                                assert_eq!(out[o], data[m * dz * dz + n * dz + k]);
                            }
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_upsample3d_repeats_slices() {
        let data = [1.0f32, 2.0, 3.0, 4.0];
        let mut out = [0.0f32; 32];

        upsample3d(&data, 1, 2, 1, &mut out);

        let slice = [
            1.0, 1.0, 2.0, 2.0, //
            1.0, 1.0, 2.0, 2.0, //
            3.0, 3.0, 4.0, 4.0, //
            3.0, 3.0, 4.0, 4.0,
        ];
        assert_eq!(&out[..16], &slice);
        assert_eq!(&out[16..], &slice);
    }

    #[test]
    #[should_panic]
    fn test_short_output_panics() {
        let data = [1.0f32, 2.0, 3.0, 4.0];
        let mut out = [0.0f32; 3];
        upsample2d(&data, 1, 2, 1, &mut out);
    }
}
