//! Datum-shift grids: parsing, the process-wide cache and interpolation.
//!
//! Grids are registered under a name (the one `nadgrids` refers to) and stay
//! loaded for the life of the process. Longitudes inside a grid are positive
//! west, as in the NTv2 format.

mod ntv2;
mod raster;
mod shift;

use std::collections::HashMap;
use std::sync::Arc;

use lazy_static::lazy_static;
use parking_lot::RwLock;

use crate::error::Result;

pub use raster::{RasterImage, RasterSource};
pub use shift::{apply_grid_shift, point_lookup};

/// One rectangular block of shift nodes.
#[derive(Clone, Debug, PartialEq)]
pub struct SubGrid {
    /// Lower-left corner (positive-west longitude, latitude), radians
    pub ll: (f64, f64),
    /// Node spacing (longitude, latitude), radians
    pub del: (f64, f64),
    /// Node counts (columns, rows)
    pub lim: (usize, usize),
    /// Shifts (longitude positive west, latitude), radians; row-major from
    /// the south-east corner
    pub cvs: Vec<(f64, f64)>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    pub subgrids: Vec<SubGrid>,
}

lazy_static! {
    static ref GRIDS: RwLock<HashMap<String, Arc<Grid>>> = RwLock::new(HashMap::new());
}

fn insert(name: &str, grid: Grid) -> Arc<Grid> {
    let mut grids = GRIDS.write();
    let entry = grids.entry(name.to_string()).or_insert_with(|| {
        tracing::debug!(name, subgrids = grid.subgrids.len(), "cached datum grid");
        Arc::new(grid)
    });
    Arc::clone(entry)
}

/// Parse an NTv2 file and cache it under `name`.
///
/// A name that is already loaded keeps its first grid.
pub fn load_ntv2(name: &str, bytes: &[u8]) -> Result<Arc<Grid>> {
    if let Some(existing) = grid(name) {
        return Ok(existing);
    }
    let parsed = ntv2::parse(bytes, true)?;
    Ok(insert(name, parsed))
}

/// As [`load_ntv2`], for files written without the accuracy columns.
pub fn load_ntv2_without_accuracy(name: &str, bytes: &[u8]) -> Result<Arc<Grid>> {
    if let Some(existing) = grid(name) {
        return Ok(existing);
    }
    let parsed = ntv2::parse(bytes, false)?;
    Ok(insert(name, parsed))
}

/// Read every image of a raster grid source and cache it under `name`.
pub async fn load_raster(name: &str, source: &dyn RasterSource) -> Result<Arc<Grid>> {
    if let Some(existing) = grid(name) {
        return Ok(existing);
    }
    let parsed = raster::read_grid(source).await?;
    Ok(insert(name, parsed))
}

/// A previously loaded grid.
pub fn grid(name: &str) -> Option<Arc<Grid>> {
    GRIDS.read().get(name).cloned()
}


#[cfg(test)]
mod tests {
    use super::testing::ramp_subgrid;
    use super::*;

    #[test]
    fn test_first_load_wins() {
        let first = insert("test-first-load-wins", Grid { subgrids: vec![ramp_subgrid((0.0, 0.0))] });
        let second = insert("test-first-load-wins", Grid { subgrids: vec![] });
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(grid("test-first-load-wins").unwrap().subgrids.len(), 1);
        assert!(grid("test-never-loaded").is_none());
    }
}
