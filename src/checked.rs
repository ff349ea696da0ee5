//! Validated versions of the [`crate::scalar`] kernels
//!
//! Each function checks dimensions, level and buffer lengths before running
//! the kernel and leaves `out` untouched when it returns an error. On success
//! the result is exactly what the scalar kernel produces, including the
//! accumulate-into-output behaviour of the downsampling functions.

use crate::error::{MorphError, Result};
use crate::{checked_binsize, scalar, Sample};

/// Validated [`scalar::apply_padding`]
pub fn apply_padding<T: Sample>(
    data: &[T],
    dx: usize,
    dy: usize,
    dz: usize,
    npad: usize,
    out: &mut [T],
) -> Result<()> {
    if npad < dz {
        return Err(reject(MorphError::invalid("npad", npad, "narrower than the input rows")));
    }
    require("input", data.len(), volume_len(dx, dy, dz)?)?;
    require("output", out.len(), volume_len(dx, dy, npad)?)?;

    scalar::apply_padding(data, dx, dy, dz, npad, out);
    Ok(())
}

/// Validated [`scalar::downsample2d`]
///
/// `dz` must be a multiple of `2^level`.
pub fn downsample2d<T: Sample>(
    data: &[T],
    dx: usize,
    dy: usize,
    dz: usize,
    level: u32,
    out: &mut [T],
) -> Result<()> {
    let bin = level_binsize(level)?;
    divisible("dz", dz, bin)?;
    require("input", data.len(), volume_len(dx, dy, dz)?)?;
    require("output", out.len(), volume_len(dx, dy, dz / bin)?)?;

    scalar::downsample2d(data, dx, dy, dz, level, out);
    Ok(())
}

/// Validated [`scalar::downsample3d`]
///
/// `dy` and `dz` must both be multiples of `2^level`.
pub fn downsample3d<T: Sample>(
    data: &[T],
    dx: usize,
    dy: usize,
    dz: usize,
    level: u32,
    out: &mut [T],
) -> Result<()> {
    let bin = level_binsize(level)?;
    divisible("dy", dy, bin)?;
    divisible("dz", dz, bin)?;
    require("input", data.len(), volume_len(dx, dy, dz)?)?;
    require("output", out.len(), volume_len(dx, dy / bin, dz / bin)?)?;

    scalar::downsample3d(data, dx, dy, dz, level, out);
    Ok(())
}

/// Validated [`scalar::upsample2d`]
pub fn upsample2d<T: Sample>(
    data: &[T],
    dy: usize,
    dz: usize,
    level: u32,
    out: &mut [T],
) -> Result<()> {
    let bin = level_binsize(level)?;
    let side = magnified("dz", dz, bin)?;
    require("input", data.len(), volume_len(dy, dz, dz)?)?;
    require("output", out.len(), volume_len(dy, side, side)?)?;

    scalar::upsample2d(data, dy, dz, level, out);
    Ok(())
}

/// Validated [`scalar::upsample3d`]
pub fn upsample3d<T: Sample>(
    data: &[T],
    dy: usize,
    dz: usize,
    level: u32,
    out: &mut [T],
) -> Result<()> {
    let bin = level_binsize(level)?;
    let side = magnified("dz", dz, bin)?;
    let depth = magnified("dy", dy, bin)?;
    require("input", data.len(), volume_len(dy, dz, dz)?)?;
    require("output", out.len(), volume_len(depth, side, side)?)?;

    scalar::upsample3d(data, dy, dz, level, out);
    Ok(())
}

pub(crate) fn level_binsize(level: u32) -> Result<usize> {
    checked_binsize(level).ok_or_else(|| reject(MorphError::LevelTooLarge(level)))
}

/// Number of samples in a `(a, b, c)` volume
pub(crate) fn volume_len(a: usize, b: usize, c: usize) -> Result<usize> {
    a.checked_mul(b)
        .and_then(|ab| ab.checked_mul(c))
        .ok_or_else(|| reject(MorphError::invalid("volume", a, "sample count overflows usize")))
}

pub(crate) fn magnified(name: &'static str, len: usize, bin: usize) -> Result<usize> {
    len.checked_mul(bin)
        .ok_or_else(|| reject(MorphError::invalid(name, len, "magnified extent overflows usize")))
}

fn divisible(name: &'static str, len: usize, bin: usize) -> Result<()> {
    if len % bin != 0 {
        return Err(reject(MorphError::invalid(name, len, "not a multiple of the bin size")));
    }
    Ok(())
}

fn require(buffer: &'static str, actual: usize, required: usize) -> Result<()> {
    if actual < required {
        return Err(reject(MorphError::BufferTooSmall {
            buffer,
            required,
            actual,
        }));
    }
    Ok(())
}

fn reject(err: MorphError) -> MorphError {
    tracing::debug!(error = %err, "rejected resampling call");
    err
}
