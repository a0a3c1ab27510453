//! PyO3 binding for batch CRS coordinate transformation.

use numpy::{PyArray1, PyReadonlyArray1};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::builder::Proj;
use crate::point::Point;
use crate::transform::transform_batch;

/// Transform arrays of coordinates from one CRS to another.
///
/// Args:
///     x: 1D array of x coordinates (longitude or easting).
///     y: 1D array of y coordinates (latitude or northing).
///     src_crs: Source CRS (PROJ string, WKT, PROJJSON text or e.g. "EPSG:4326").
///     dst_crs: Destination CRS.
///     enforce_axis: Read and write coordinates in each CRS's axis order.
///
/// Returns:
///     Tuple of (x_out, y_out) arrays in the destination CRS. Points that
///     cannot be transformed are NaN.
#[pyfunction]
#[pyo3(signature = (x, y, src_crs, dst_crs, enforce_axis = false))]
#[allow(clippy::type_complexity)]
pub fn transform_points<'py>(
    py: Python<'py>,
    x: PyReadonlyArray1<'py, f64>,
    y: PyReadonlyArray1<'py, f64>,
    src_crs: &str,
    dst_crs: &str,
    enforce_axis: bool,
) -> PyResult<(Bound<'py, PyArray1<f64>>, Bound<'py, PyArray1<f64>>)> {
    let x_view = x.as_array();
    let y_view = y.as_array();

    let n = x_view.len();
    let y_len = y_view.len();
    if n != y_len {
        return Err(PyValueError::new_err(format!(
            "x and y must have same length, got {} and {}",
            n, y_len
        )));
    }

    let points: Vec<Point> = x_view
        .iter()
        .zip(y_view.iter())
        .map(|(&xi, &yi)| Point::new(xi, yi))
        .collect();

    let src_crs = src_crs.to_string();
    let dst_crs = dst_crs.to_string();

    let coords = py.allow_threads(move || -> PyResult<Vec<(f64, f64)>> {
        let src = Proj::build(src_crs).map_err(|e| PyValueError::new_err(e.to_string()))?;
        let dst = Proj::build(dst_crs).map_err(|e| PyValueError::new_err(e.to_string()))?;
        let out = transform_batch(&src, &dst, &points, enforce_axis)
            .into_iter()
            .map(|r| match r {
                Ok(Some(p)) => (p.x, p.y),
                Ok(None) => (f64::NAN, f64::NAN),
                Err(e) => {
                    tracing::debug!(error = %e, "point not transformed");
                    (f64::NAN, f64::NAN)
                }
            })
            .collect();
        Ok(out)
    })?;

    let (xs, ys): (Vec<f64>, Vec<f64>) = coords.into_iter().unzip();

    Ok((
        PyArray1::from_owned_array(py, ndarray::Array1::from(xs)),
        PyArray1::from_owned_array(py, ndarray::Array1::from(ys)),
    ))
}
