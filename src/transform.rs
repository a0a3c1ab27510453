//! Coordinate conversion between two built CRSs.

use crate::builder::{wgs84, Proj};
use crate::error::{ProjError, Result};
use crate::geodesy::datum_transform;
use crate::point::Point;

/// Position of an axis letter in `(x, y, z)` and its sign.
fn axis_slot(letter: u8) -> (usize, f64) {
    match letter {
        b'e' => (0, 1.0),
        b'w' => (0, -1.0),
        b'n' => (1, 1.0),
        b's' => (1, -1.0),
        b'u' => (2, 1.0),
        _ => (2, -1.0),
    }
}

/// Reorder a point between a CRS axis order and east/north/up.
///
/// With `denormalize` the point is in east/north/up and comes out in the
/// order of `axis`; otherwise the other way round.
fn adjust_axis(axis: &str, denormalize: bool, p: Point) -> Point {
    let input = [p.x, p.y, p.z.unwrap_or(0.0)];
    let mut out = [0.0; 3];
    for (i, letter) in axis.bytes().take(3).enumerate() {
        let (slot, sign) = axis_slot(letter);
        if denormalize {
            out[i] = sign * input[slot];
        } else {
            out[slot] = sign * input[i];
        }
    }
    Point {
        x: out[0],
        y: out[1],
        z: p.z.map(|_| out[2]),
    }
}

/// Whether `src` and `dst` must meet in WGS84 first. Keyed on the literal
/// datum code `WGS84`, not on datum equality.
fn needs_wgs84_bridge(src: &Proj, dst: &Proj) -> bool {
    let not_wgs84 = |p: &Proj| p.datum_code() != Some("WGS84");
    (src.datum().has_shift() && not_wgs84(dst)) || (dst.datum().has_shift() && not_wgs84(src))
}

/// Convert `point` from `src` to `dst`.
///
/// Geographic CRSs take and return degrees; everything else uses the CRS
/// units. With `enforce_axis` the points are read and written in each CRS's
/// declared axis order instead of east/north/up.
///
/// Returns `Ok(None)` when the point has no image in `dst` (projection
/// singularity, outside every optional grid) and `Err` for non-finite input
/// or an unavailable mandatory grid.
pub fn transform(src: &Proj, dst: &Proj, point: Point, enforce_axis: bool) -> Result<Option<Point>> {
    if !point.is_finite() {
        return Err(ProjError::NonFiniteCoordinate {
            x: point.x,
            y: point.y,
            z: point.z,
        });
    }
    if std::ptr::eq(src, dst) {
        return Ok(Some(point));
    }
    let has_z = point.z.is_some();

    let mut src = src;
    let mut point = point;
    if needs_wgs84_bridge(src, dst) {
        let peer = wgs84()?;
        tracing::debug!(src = src.proj_name(), dst = dst.proj_name(), "bridging through WGS84");
        point = match transform(src, peer, point, enforce_axis)? {
            Some(p) => p,
            None => return Ok(None),
        };
        src = peer;
    }

    if enforce_axis && src.axis() != "enu" {
        point = adjust_axis(src.axis(), false, point);
    }

    let lonlat = if src.is_geographic() {
        src.projection()
            .inverse_point(point.with_xy(point.x.to_radians(), point.y.to_radians()))
    } else {
        let scale = src.to_meter().unwrap_or(1.0);
        src.projection()
            .inverse_point(point.with_xy(point.x * scale, point.y * scale))
    };
    let Some(mut point) = lonlat else {
        return Ok(None);
    };

    if let Some(pm) = src.from_greenwich() {
        point.x += pm;
    }
    let Some(mut point) = datum_transform(src.datum(), dst.datum(), point)? else {
        return Ok(None);
    };
    if let Some(pm) = dst.from_greenwich() {
        point.x -= pm;
    }

    let projected = if dst.is_geographic() {
        dst.projection()
            .forward_point(point)
            .map(|p| p.with_xy(p.x.to_degrees(), p.y.to_degrees()))
    } else {
        let scale = dst.to_meter().unwrap_or(1.0);
        dst.projection()
            .forward_point(point)
            .map(|p| p.with_xy(p.x / scale, p.y / scale))
    };
    let Some(mut point) = projected else {
        return Ok(None);
    };

    if enforce_axis && dst.axis() != "enu" {
        point = adjust_axis(dst.axis(), true, point);
    }
    if !has_z {
        point.z = None;
    }
    Ok(Some(point))
}

/// [`transform`] applied to each point. A failing point does not stop the
/// rest of the batch.
pub fn transform_batch(
    src: &Proj,
    dst: &Proj,
    points: &[Point],
    enforce_axis: bool,
) -> Vec<Result<Option<Point>>> {
    points
        .iter()
        .map(|p| transform(src, dst, *p, enforce_axis))
        .collect()
}
