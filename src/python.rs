//! Python bindings using PyO3
//!
//! Functions take and return float32 numpy arrays shaped
//! `(projections, slices, pixels)`, like the rest of the reconstruction
//! pipeline.

use numpy::{IntoPyArray, PyArray3, PyReadonlyArray3};
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::{
    default_npad, downsample_2d, downsample_3d, pad_volume, upsample_2d, upsample_3d, MorphError,
};

impl From<MorphError> for PyErr {
    fn from(err: MorphError) -> Self {
        pyo3::exceptions::PyValueError::new_err(err.to_string())
    }
}

/// Copy of the input, returned for negative levels
fn unchanged<'py>(py: Python<'py>, data: &PyReadonlyArray3<'py, f32>) -> Bound<'py, PyArray3<f32>> {
    data.as_array().to_owned().into_pyarray(py)
}

// =============================================================================
// Build Info
// =============================================================================

/// Get build information
///
/// Returns a dictionary with:
/// - version: Package version
/// - max_level: Largest level whose bin size fits the platform word
#[pyfunction]
fn build_info(py: Python<'_>) -> PyResult<Bound<'_, PyDict>> {
    let info = PyDict::new(py);
    info.set_item("version", env!("CARGO_PKG_VERSION"))?;
    info.set_item("max_level", usize::BITS - 1)?;
    Ok(info)
}

// =============================================================================
// Padding
// =============================================================================

/// Pad the detector axis of every projection
///
/// Args:
///     data: 3D float32 array (projections, slices, pixels)
///     npad: New detector width. Defaults to ceil(pixels * sqrt(2)); values
///         below the current width keep the current width.
///     val: Pad value (default: 0.0)
///
/// Returns:
///     Padded float32 array (projections, slices, npad)
#[pyfunction]
#[pyo3(signature = (data, npad=None, val=0.0))]
fn apply_padding<'py>(
    py: Python<'py>,
    data: PyReadonlyArray3<'py, f32>,
    npad: Option<i64>,
    val: f32,
) -> PyResult<Bound<'py, PyArray3<f32>>> {
    let input = data.as_array();
    let padded = pad_volume(&input, npad.map(requested_width), val)?;
    Ok(padded.into_pyarray(py))
}

/// Map a Python pad width onto `pad_volume`'s
///
/// Negative widths become 0, which `pad_volume` then clamps up to the current
/// detector width like any other width below it. Widths beyond `usize` become
/// `usize::MAX` and are rejected as too large.
fn requested_width(npad: i64) -> usize {
    usize::try_from(npad.max(0)).unwrap_or(usize::MAX)
}

/// Default padded width for a detector of `npixels` pixels
#[pyfunction]
fn padded_width(npixels: usize) -> usize {
    default_npad(npixels)
}

// =============================================================================
// Binning
// =============================================================================

/// Downsample the detector axis by binning 2**level pixels
///
/// Args:
///     data: 3D float32 array (projections, slices, pixels)
///     level: Binning level; pixels must be a multiple of 2**level.
///         A negative level returns the data unchanged.
///
/// Returns:
///     Float32 array (projections, slices, pixels / 2**level)
#[pyfunction]
#[pyo3(signature = (data, level=1))]
fn downsample2d<'py>(
    py: Python<'py>,
    data: PyReadonlyArray3<'py, f32>,
    level: i32,
) -> PyResult<Bound<'py, PyArray3<f32>>> {
    let Ok(level) = u32::try_from(level) else {
        return Ok(unchanged(py, &data));
    };
    Ok(downsample_2d(&data.as_array(), level)?.into_pyarray(py))
}

/// Downsample slices and pixels by binning 2**level x 2**level blocks
///
/// Returns:
///     Float32 array (projections, slices / 2**level, pixels / 2**level)
#[pyfunction]
#[pyo3(signature = (data, level=1))]
fn downsample3d<'py>(
    py: Python<'py>,
    data: PyReadonlyArray3<'py, f32>,
    level: i32,
) -> PyResult<Bound<'py, PyArray3<f32>>> {
    let Ok(level) = u32::try_from(level) else {
        return Ok(unchanged(py, &data));
    };
    Ok(downsample_3d(&data.as_array(), level)?.into_pyarray(py))
}

// =============================================================================
// Replication
// =============================================================================

/// Nearest-neighbor upsampling of a stack of square slices
///
/// Args:
///     data: 3D float32 array (slices, n, n)
///     level: Each slice is magnified by 2**level on both axes
///
/// Returns:
///     Float32 array (slices, n * 2**level, n * 2**level)
#[pyfunction]
#[pyo3(signature = (data, level=1))]
fn upsample2d<'py>(
    py: Python<'py>,
    data: PyReadonlyArray3<'py, f32>,
    level: i32,
) -> PyResult<Bound<'py, PyArray3<f32>>> {
    let Ok(level) = u32::try_from(level) else {
        return Ok(unchanged(py, &data));
    };
    Ok(upsample_2d(&data.as_array(), level)?.into_pyarray(py))
}

/// Nearest-neighbor upsampling of a volume of square slices on every axis
///
/// Returns:
///     Float32 array (slices * 2**level, n * 2**level, n * 2**level)
#[pyfunction]
#[pyo3(signature = (data, level=1))]
fn upsample3d<'py>(
    py: Python<'py>,
    data: PyReadonlyArray3<'py, f32>,
    level: i32,
) -> PyResult<Bound<'py, PyArray3<f32>>> {
    let Ok(level) = u32::try_from(level) else {
        return Ok(unchanged(py, &data));
    };
    Ok(upsample_3d(&data.as_array(), level)?.into_pyarray(py))
}

// =============================================================================
// Module registration
// =============================================================================

/// Power-of-two padding, binning and replication of tomography volumes
///
/// - apply_padding(): Center projections in a wider detector
/// - downsample2d() / downsample3d(): Box-filter binning
/// - upsample2d() / upsample3d(): Nearest-neighbor replication
#[pymodule]
fn tomo_morph(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(apply_padding, m)?)?;
    m.add_function(wrap_pyfunction!(padded_width, m)?)?;

    m.add_function(wrap_pyfunction!(downsample2d, m)?)?;
    m.add_function(wrap_pyfunction!(downsample3d, m)?)?;

    m.add_function(wrap_pyfunction!(upsample2d, m)?)?;
    m.add_function(wrap_pyfunction!(upsample3d, m)?)?;

    m.add_function(wrap_pyfunction!(build_info, m)?)?;
    Ok(())
}
