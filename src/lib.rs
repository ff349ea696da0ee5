//! Power-of-two resampling of 3D tomography volumes
//!
//! This crate provides the small set of array-morphing primitives used to
//! prepare projection data for reconstruction: padding the detector axis,
//! box-filter binning by `2^level`, and nearest-neighbor replication by
//! `2^level`.
//!
//! Volumes are flat row-major buffers with logical extents `(dx, dy, dz)`,
//! `dz` being the contiguous axis.
//!
//! # Layers
//!
//! - [`scalar`]: the raw kernels. They trust the caller for dimensions and
//!   buffer sizes, never allocate, and the downsampling kernels *accumulate*
//!   into their output.
//! - [`checked`]: the same kernels behind dimension and buffer-length
//!   validation, returning [`MorphError`] instead of panicking.
//! - [`volume`]: `ndarray` entry points that allocate and initialise their
//!   output.
//!
//! # Example
//!
//! ```rust
//! use ndarray::Array3;
//! use tomo_morph::{downsample_3d, pad_volume};
//!
//! // 180 projections, 64 slices, 64 detector pixels
//! let projections = Array3::<f32>::ones((180, 64, 64));
//!
//! let padded = pad_volume(&projections.view(), Some(96), 0.0).unwrap();
//! assert_eq!(padded.dim(), (180, 64, 96));
//!
//! let binned = downsample_3d(&projections.view(), 2).unwrap();
//! assert_eq!(binned.dim(), (180, 16, 16));
//! ```

pub mod checked;
pub mod error;
pub mod scalar;
pub mod volume;

#[cfg(feature = "python")]
mod python;

use std::fmt::Debug;
use std::ops::{Add, Div};

pub use error::{MorphError, Result};
pub use half::f16;
pub use volume::{
    default_npad, downsample_2d, downsample_2d_into, downsample_3d, downsample_3d_into,
    pad_volume, pad_volume_into, upsample_2d, upsample_2d_into, upsample_3d, upsample_3d_into,
};

/// Trait for sample types the kernels can resample
///
/// Downsampling divides each sample by the bin size before adding it to the
/// output, so the type needs `Add` and `Div` on itself.
pub trait Sample:
    Copy + Send + Sync + Default + PartialEq + Debug + Add<Output = Self> + Div<Output = Self> + 'static
{
    fn from_f64(v: f64) -> Self;
    fn to_f64(self) -> f64;
}

impl Sample for f32 {
    #[inline]
    fn from_f64(v: f64) -> Self {
        v as f32
    }
    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl Sample for f64 {
    #[inline]
    fn from_f64(v: f64) -> Self {
        v
    }
    #[inline]
    fn to_f64(self) -> f64 {
        self
    }
}

impl Sample for f16 {
    #[inline]
    fn from_f64(v: f64) -> Self {
        f16::from_f64(v)
    }
    #[inline]
    fn to_f64(self) -> f64 {
        f16::to_f64(self)
    }
}

/// Linear scale factor for a level: `2^level`
///
/// Overflows (and panics in debug builds) when `level >= usize::BITS`; use
/// [`checked_binsize`] when the level comes from outside.
#[inline]
pub fn binsize(level: u32) -> usize {
    1usize << level
}

/// Same as [`binsize`], but `None` when `2^level` does not fit in `usize`
#[inline]
pub fn checked_binsize(level: u32) -> Option<usize> {
    1usize.checked_shl(level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binsize_powers_of_two() {
        assert_eq!(binsize(0), 1);
        assert_eq!(binsize(1), 2);
        assert_eq!(binsize(3), 8);
        assert_eq!(binsize(10), 1024);
    }

    #[test]
    fn test_checked_binsize_overflow() {
        assert_eq!(checked_binsize(4), Some(16));
        assert_eq!(checked_binsize(usize::BITS - 1), Some(1usize << (usize::BITS - 1)));
        assert_eq!(checked_binsize(usize::BITS), None);
        assert_eq!(checked_binsize(u32::MAX), None);
    }

    #[test]
    fn test_sample_conversions() {
        assert_eq!(<f32 as Sample>::from_f64(2.5), 2.5f32);
        assert_eq!(<f64 as Sample>::to_f64(-1.25), -1.25);
        assert_eq!(<f16 as Sample>::from_f64(0.5).to_f64(), 0.5);
        assert_eq!(<f32 as Default>::default(), 0.0);
    }
}
