//! Geographic pass-through. The pipeline handles the degree/radian scaling.

use super::registry::ProjectionDefinition;
use super::{Projection, Setup};
use crate::error::Result;

pub(super) const DEFINITIONS: &[ProjectionDefinition] = &[ProjectionDefinition {
    names: &["longlat", "identity", "latlong", "lonlat", "latlon"],
    init,
}];

pub struct LongLat;

fn init(_: &Setup<'_>) -> Result<Box<dyn Projection>> {
    Ok(Box::new(LongLat))
}

impl Projection for LongLat {
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        Some((lon, lat))
    }

    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        Some((x, y))
    }
}
