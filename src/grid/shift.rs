//! Bilinear grid interpolation and the forward/inverse grid shift.

use std::f64::consts::PI;

use super::{grid, Grid, SubGrid};
use crate::error::{ProjError, Result};
use crate::geodesy::GridRef;
use crate::point::Point;
use crate::proj::common::{adjust_lon, R2D};

const INVERSE_MAX_ITER: usize = 9;
const INVERSE_TOL: f64 = 1e-12;

/// Whether `(x, y)` (positive-west radians) falls inside `sub`, with a
/// margin of a ten-thousandth of a cell.
fn covers(sub: &SubGrid, x: f64, y: f64) -> bool {
    let epsilon = (sub.del.0.abs() + sub.del.1.abs()) / 10_000.0;
    let min_x = sub.ll.0 - epsilon;
    let min_y = sub.ll.1 - epsilon;
    let max_x = sub.ll.0 + (sub.lim.0 as f64 - 1.0) * sub.del.0 + epsilon;
    let max_y = sub.ll.1 + (sub.lim.1 as f64 - 1.0) * sub.del.1 + epsilon;
    !(min_y > y || min_x > x || max_y < y || max_x < x)
}

/// Shift at `(x, y)` measured from the sub-grid's lower-left corner.
fn interpolate(x: f64, y: f64, sub: &SubGrid) -> Option<(f64, f64)> {
    let tx = x / sub.del.0;
    let ty = y / sub.del.1;
    let ix = tx.floor();
    let iy = ty.floor();
    if ix < 0.0 || iy < 0.0 || ix >= sub.lim.0 as f64 || iy >= sub.lim.1 as f64 {
        return None;
    }
    let fx = tx - ix;
    let fy = ty - iy;
    let (ix, iy) = (ix as usize, iy as usize);
    // nodes on the last row or column have no neighbour beyond
    let ix1 = (ix + 1).min(sub.lim.0 - 1);
    let iy1 = (iy + 1).min(sub.lim.1 - 1);

    let node = |col: usize, row: usize| sub.cvs.get(row * sub.lim.0 + col).copied();
    let f00 = node(ix, iy)?;
    let f10 = node(ix1, iy)?;
    let f01 = node(ix, iy1)?;
    let f11 = node(ix1, iy1)?;

    let m00 = (1.0 - fx) * (1.0 - fy);
    let m10 = fx * (1.0 - fy);
    let m01 = (1.0 - fx) * fy;
    let m11 = fx * fy;
    Some((
        m00 * f00.0 + m10 * f10.0 + m01 * f01.0 + m11 * f11.0,
        m00 * f00.1 + m10 * f10.1 + m01 * f01.1 + m11 * f11.1,
    ))
}

/// Shift a positive-west point through one sub-grid.
fn subgrid_shift(x: f64, y: f64, inverse: bool, sub: &SubGrid) -> Option<(f64, f64)> {
    let tbx = adjust_lon(x - sub.ll.0 - PI) + PI;
    let tby = y - sub.ll.1;
    let (dx, dy) = interpolate(tbx, tby, sub)?;

    if !inverse {
        return Some((x + dx, y + dy));
    }

    // the grid holds forward shifts only; solve for the source point
    let mut t = (tbx - dx, tby - dy);
    let mut converged = false;
    for _ in 0..INVERSE_MAX_ITER {
        let Some(del) = interpolate(t.0, t.1, sub) else {
            tracing::warn!("inverse grid shift left the grid, using the first approximation");
            converged = true;
            break;
        };
        let dif = (tbx - (del.0 + t.0), tby - (del.1 + t.1));
        t.0 += dif.0;
        t.1 += dif.1;
        if dif.0.abs() <= INVERSE_TOL && dif.1.abs() <= INVERSE_TOL {
            converged = true;
            break;
        }
    }
    if !converged {
        tracing::warn!("inverse grid shift did not converge, using the last approximation");
    }
    Some((adjust_lon(t.0 + sub.ll.0), t.1 + sub.ll.1))
}

/// Interpolated shift (east-positive longitude, latitude; radians) at a
/// geographic point, from the first sub-grid that covers it.
pub fn point_lookup(lon: f64, lat: f64, grid: &Grid) -> Option<(f64, f64)> {
    let x = -lon;
    grid.subgrids
        .iter()
        .filter(|sub| covers(sub, x, lat))
        .find_map(|sub| {
            let tbx = adjust_lon(x - sub.ll.0 - PI) + PI;
            interpolate(tbx, lat - sub.ll.1, sub)
        })
        .map(|(dx, dy)| (-dx, dy))
}

/// Apply the first usable grid of `grids` to a geographic point.
///
/// `Ok(None)` when no optional grid covers the point; `Err` when a
/// mandatory grid is missing or does not cover it.
pub fn apply_grid_shift(grids: &[GridRef], inverse: bool, point: Point) -> Result<Option<Point>> {
    let x = -point.x;
    let y = point.y;

    for grid_ref in grids {
        if grid_ref.is_null {
            return Ok(Some(point));
        }
        let Some(loaded) = grid(&grid_ref.name) else {
            if grid_ref.mandatory {
                tracing::warn!(grid = %grid_ref.name, "mandatory grid is not loaded");
                return Err(ProjError::GridNotFound(grid_ref.name.clone()));
            }
            continue;
        };

        let shifted = loaded
            .subgrids
            .iter()
            .filter(|sub| covers(sub, x, y))
            .find_map(|sub| subgrid_shift(x, y, inverse, sub));
        match shifted {
            Some((sx, sy)) => return Ok(Some(Point { x: -sx, y: sy, z: point.z })),
            None if grid_ref.mandatory => {
                return Err(ProjError::Grid(format!(
                    "point ({:.6}, {:.6}) is outside mandatory grid '{}'",
                    point.x * R2D,
                    point.y * R2D,
                    grid_ref.name
                )));
            }
            None => {}
        }
    }

    let tried: Vec<&str> = grids.iter().map(|g| g.name.as_str()).collect();
    tracing::warn!(
        lon = point.x * R2D,
        lat = point.y * R2D,
        grids = ?tried,
        "no grid shift table covers the point"
    );
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::super::testing::ramp_subgrid;
    use super::super::{insert, load_ntv2};
    use super::*;
    use crate::geodesy::datum::parse_nadgrids;
    use approx::assert_relative_eq;

    #[test]
    fn test_corner_nodes_are_exact() {
        let sub = ramp_subgrid((0.0, 0.0));
        let grid = Grid { subgrids: vec![sub.clone()] };
        for (col, row) in [(0usize, 0usize), (1, 1), (2, 0), (2, 2), (0, 2)] {
            let lon = -(col as f64 * sub.del.0);
            let lat = row as f64 * sub.del.1;
            let expected = sub.cvs[row * 3 + col];
            let (dlon, dlat) = point_lookup(lon, lat, &grid).unwrap();
            assert_relative_eq!(dlon, -expected.0, epsilon = 1e-15);
            assert_relative_eq!(dlat, expected.1, epsilon = 1e-15);
        }
    }

    #[test]
    fn test_cell_centre_blends_four_nodes() {
        let sub = ramp_subgrid((0.0, 0.0));
        let grid = Grid { subgrids: vec![sub.clone()] };
        let (dlon, dlat) = point_lookup(-0.5 * sub.del.0, 0.5 * sub.del.1, &grid).unwrap();
        // nodes 0, 1, 3, 4
        assert_relative_eq!(dlon, -2e-7, epsilon = 1e-15);
        assert_relative_eq!(dlat, 4e-7, epsilon = 1e-15);
        assert!(point_lookup(1.0, 1.0, &grid).is_none());
    }

    #[test]
    fn test_forward_then_inverse() {
        let ll = (-(10.0_f64.to_radians()), 40.0_f64.to_radians());
        insert("test-shift-roundtrip", Grid { subgrids: vec![ramp_subgrid(ll)] });
        let grids = parse_nadgrids("test-shift-roundtrip");
        let sub = ramp_subgrid(ll);
        let p = Point::new(-ll.0 - 0.7 * sub.del.0, ll.1 + 1.2 * sub.del.1);

        let fwd = apply_grid_shift(&grids, false, p).unwrap().unwrap();
        assert!((fwd.y - p.y).abs() > 1e-8);
        let back = apply_grid_shift(&grids, true, fwd).unwrap().unwrap();
        assert_relative_eq!(back.x, p.x, epsilon = 1e-12);
        assert_relative_eq!(back.y, p.y, epsilon = 1e-12);
    }

    #[test]
    fn test_grid_chain_rules() {
        let p = Point::new_3d(0.3, 0.8, 12.0);
        assert_eq!(
            apply_grid_shift(&parse_nadgrids("@missing-a,@null"), false, p).unwrap(),
            Some(p)
        );
        assert!(matches!(
            apply_grid_shift(&parse_nadgrids("@missing-a,missing-b"), false, p),
            Err(ProjError::GridNotFound(name)) if name == "missing-b"
        ));
        assert_eq!(apply_grid_shift(&parse_nadgrids("@missing-a"), false, p).unwrap(), None);
    }

    #[test]
    fn test_loaded_ntv2_shifts_west_and_north() {
        let bytes = super::super::testing::sample_ntv2(true, true);
        load_ntv2("test-sample.gsb", &bytes).unwrap();
        let grids = parse_nadgrids("test-sample.gsb");
        // inside the 1°W..1°1'W, 50°N..50°1'N cell
        let p = Point::new((-1.0083_f64).to_radians(), 50.0083_f64.to_radians());
        let out = apply_grid_shift(&grids, false, p).unwrap().unwrap();
        // -3" west is +3" east, +1.5" north
        assert_relative_eq!(out.x - p.x, (3.0_f64 / 3600.0).to_radians(), epsilon = 1e-12);
        assert_relative_eq!(out.y - p.y, (1.5_f64 / 3600.0).to_radians(), epsilon = 1e-12);

        let outside = Point::new(0.5, 0.1);
        assert!(apply_grid_shift(&grids, false, outside).is_err());
    }
}
