//! `ndarray` entry points
//!
//! The allocating functions size and initialise the output themselves: padded
//! volumes are filled with the pad value and downsampled volumes start from
//! zero, so they return plain means. The `_into` variants write into a
//! caller-provided view and keep the kernel contracts (padding margins are
//! not written, downsampling accumulates).
//!
//! Inputs in a non-standard layout are gathered into a row-major copy first.

use std::borrow::Cow;

use ndarray::{Array3, ArrayView3, ArrayViewMut3};

use crate::checked::{self, level_binsize, magnified, volume_len};
use crate::error::{MorphError, Result};
use crate::Sample;

/// Padded width used when none is requested: `ceil(dz * sqrt(2))`
///
/// This is the detector width that keeps the whole field of view inside the
/// reconstruction grid for any projection angle.
pub fn default_npad(dz: usize) -> usize {
    (dz as f64 * std::f64::consts::SQRT_2).ceil() as usize
}

/// Pad the last axis of a volume to `npad` samples, centering the data
///
/// `npad` defaults to [`default_npad`], and a target narrower than the input
/// rows is clamped to the input width. The margins hold `value`.
pub fn pad_volume<T: Sample>(
    input: &ArrayView3<T>,
    npad: Option<usize>,
    value: T,
) -> Result<Array3<T>> {
    let (dx, dy, dz) = input.dim();
    let npad = match npad {
        None => {
            let npad = default_npad(dz);
            tracing::debug!(dz, npad, "using default pad width");
            npad
        }
        Some(npad) if npad < dz => {
            tracing::debug!(dz, npad, "pad width narrower than the rows, clamping");
            dz
        }
        Some(npad) => npad,
    };

    let mut output = Array3::from_elem(allocatable::<T>((dx, dy, npad))?, value);
    pad_volume_into(input, &mut output.view_mut())?;
    Ok(output)
}

/// Copy `input` into the middle of the last axis of `out`
///
/// `out` must have shape `(dx, dy, npad)` with `npad >= dz`; the width of
/// its last axis is the pad target. Margin samples are not written.
pub fn pad_volume_into<T: Sample>(input: &ArrayView3<T>, out: &mut ArrayViewMut3<T>) -> Result<()> {
    let (dx, dy, dz) = input.dim();
    let npad = out.dim().2;
    expect_shape(out.dim(), allocatable::<T>((dx, dy, npad))?)?;
    tracing::trace!(input_shape = ?input.dim(), npad, "pad volume");

    let data = samples(input);
    with_output(out, |buf| checked::apply_padding(&data, dx, dy, dz, npad, buf))
}

/// Average `2^level` neighbouring samples along the last axis
///
/// Returns a volume of shape `(dx, dy, dz / 2^level)`.
pub fn downsample_2d<T: Sample>(input: &ArrayView3<T>, level: u32) -> Result<Array3<T>> {
    let (dx, dy, dz) = input.dim();
    let bin = level_binsize(level)?;

    let mut output = Array3::from_elem((dx, dy, dz / bin), T::default());
    downsample_2d_into(input, level, &mut output.view_mut())?;
    Ok(output)
}

/// Add the `2^level` last-axis bin means of `input` to `out`
///
/// `out` must have shape `(dx, dy, dz / 2^level)` and should be zeroed to
/// obtain plain means.
pub fn downsample_2d_into<T: Sample>(
    input: &ArrayView3<T>,
    level: u32,
    out: &mut ArrayViewMut3<T>,
) -> Result<()> {
    let (dx, dy, dz) = input.dim();
    let bin = level_binsize(level)?;
    expect_shape(out.dim(), (dx, dy, dz / bin))?;
    tracing::trace!(input_shape = ?input.dim(), level, "downsample along rows");

    let data = samples(input);
    with_output(out, |buf| checked::downsample2d(&data, dx, dy, dz, level, buf))
}

/// Average `2^level × 2^level` blocks over the last two axes
///
/// Returns a volume of shape `(dx, dy / 2^level, dz / 2^level)`.
pub fn downsample_3d<T: Sample>(input: &ArrayView3<T>, level: u32) -> Result<Array3<T>> {
    let (dx, dy, dz) = input.dim();
    let bin = level_binsize(level)?;

    let mut output = Array3::from_elem((dx, dy / bin, dz / bin), T::default());
    downsample_3d_into(input, level, &mut output.view_mut())?;
    Ok(output)
}

/// Add the `2^level × 2^level` block means of `input` to `out`
pub fn downsample_3d_into<T: Sample>(
    input: &ArrayView3<T>,
    level: u32,
    out: &mut ArrayViewMut3<T>,
) -> Result<()> {
    let (dx, dy, dz) = input.dim();
    let bin = level_binsize(level)?;
    expect_shape(out.dim(), (dx, dy / bin, dz / bin))?;
    tracing::trace!(input_shape = ?input.dim(), level, "downsample slices and rows");

    let data = samples(input);
    with_output(out, |buf| checked::downsample3d(&data, dx, dy, dz, level, buf))
}

/// Magnify every square slice of a `(dy, dz, dz)` stack by `2^level`
///
/// Returns a volume of shape `(dy, dz * 2^level, dz * 2^level)`.
pub fn upsample_2d<T: Sample>(input: &ArrayView3<T>, level: u32) -> Result<Array3<T>> {
    let (dy, dz) = square_slices(input)?;
    let side = magnified("dz", dz, level_binsize(level)?)?;

    let mut output = Array3::from_elem(allocatable::<T>((dy, side, side))?, T::default());
    upsample_2d_into(input, level, &mut output.view_mut())?;
    Ok(output)
}

/// Nearest-neighbor magnification of each slice into `out`
pub fn upsample_2d_into<T: Sample>(
    input: &ArrayView3<T>,
    level: u32,
    out: &mut ArrayViewMut3<T>,
) -> Result<()> {
    let (dy, dz) = square_slices(input)?;
    let side = magnified("dz", dz, level_binsize(level)?)?;
    expect_shape(out.dim(), allocatable::<T>((dy, side, side))?)?;
    tracing::trace!(input_shape = ?input.dim(), level, "upsample slices");

    let data = samples(input);
    with_output(out, |buf| checked::upsample2d(&data, dy, dz, level, buf))
}

/// Magnify a `(dy, dz, dz)` volume by `2^level` on every axis
///
/// Returns a volume of shape `(dy * 2^level, dz * 2^level, dz * 2^level)`.
pub fn upsample_3d<T: Sample>(input: &ArrayView3<T>, level: u32) -> Result<Array3<T>> {
    let (dy, dz) = square_slices(input)?;
    let bin = level_binsize(level)?;
    let side = magnified("dz", dz, bin)?;
    let depth = magnified("dy", dy, bin)?;

    let mut output = Array3::from_elem(allocatable::<T>((depth, side, side))?, T::default());
    upsample_3d_into(input, level, &mut output.view_mut())?;
    Ok(output)
}

/// Nearest-neighbor magnification of the whole volume into `out`
pub fn upsample_3d_into<T: Sample>(
    input: &ArrayView3<T>,
    level: u32,
    out: &mut ArrayViewMut3<T>,
) -> Result<()> {
    let (dy, dz) = square_slices(input)?;
    let bin = level_binsize(level)?;
    let side = magnified("dz", dz, bin)?;
    let depth = magnified("dy", dy, bin)?;
    expect_shape(out.dim(), allocatable::<T>((depth, side, side))?)?;
    tracing::trace!(input_shape = ?input.dim(), level, "upsample volume");

    let data = samples(input);
    with_output(out, |buf| checked::upsample3d(&data, dy, dz, level, buf))
}

/// Row-major samples of `input`, borrowed when already contiguous
fn samples<'a, T: Sample>(input: &'a ArrayView3<'_, T>) -> Cow<'a, [T]> {
    match input.as_slice() {
        Some(data) => Cow::Borrowed(data),
        None => Cow::Owned(input.iter().copied().collect()),
    }
}

/// Run `f` on the row-major samples of `out`
///
/// Non-contiguous views go through a scratch copy so that accumulating
/// kernels still see the existing contents.
fn with_output<T, F>(out: &mut ArrayViewMut3<T>, f: F) -> Result<()>
where
    T: Sample,
    F: FnOnce(&mut [T]) -> Result<()>,
{
    if let Some(buf) = out.as_slice_mut() {
        return f(buf);
    }

    let mut scratch: Vec<T> = out.iter().copied().collect();
    f(&mut scratch)?;
    out.iter_mut().zip(scratch).for_each(|(o, v)| *o = v);
    Ok(())
}

/// Passes `shape` through when an `Array3<T>` of that shape can exist
///
/// ndarray refuses shapes whose non-zero extents multiply past `isize::MAX`,
/// and the allocation itself is capped at `isize::MAX` bytes.
fn allocatable<T>(shape: (usize, usize, usize)) -> Result<(usize, usize, usize)> {
    let (a, b, c) = shape;
    let len = volume_len(a.max(1), b.max(1), c.max(1))?;
    let fits = len
        .checked_mul(std::mem::size_of::<T>())
        .is_some_and(|bytes| bytes <= isize::MAX as usize);
    if !fits {
        tracing::debug!(?shape, "output volume too large to allocate");
        return Err(MorphError::invalid("volume", len, "output does not fit in memory"));
    }
    Ok(shape)
}

fn square_slices<T>(input: &ArrayView3<T>) -> Result<(usize, usize)> {
    let (dy, rows, cols) = input.dim();
    if rows != cols {
        return Err(MorphError::invalid("input rows", rows, "slices must be square"));
    }
    Ok((dy, cols))
}

fn expect_shape(found: (usize, usize, usize), expected: (usize, usize, usize)) -> Result<()> {
    const AXES: [&str; 3] = ["output axis 0", "output axis 1", "output axis 2"];

    let found = [found.0, found.1, found.2];
    let expected = [expected.0, expected.1, expected.2];
    for ((name, f), e) in AXES.into_iter().zip(found).zip(expected) {
        if f != e {
            return Err(MorphError::invalid(name, f, "does not match the resampled shape"));
        }
    }
    Ok(())
}
