//! Miller Cylindrical projection (spherical).

use std::f64::consts::FRAC_PI_4;

use super::common::adjust_lon;
use super::registry::ProjectionDefinition;
use super::{Projection, Setup};
use crate::error::Result;

pub(super) const DEFINITIONS: &[ProjectionDefinition] = &[ProjectionDefinition {
    names: &["Miller_Cylindrical", "Miller Cylindrical", "mill"],
    init,
}];

pub struct Miller {
    a: f64,
    long0: f64,
    x0: f64,
    y0: f64,
}

fn init(setup: &Setup<'_>) -> Result<Box<dyn Projection>> {
    Ok(Box::new(Miller {
        a: setup.a,
        long0: setup.long0,
        x0: setup.x0,
        y0: setup.y0,
    }))
}

impl Projection for Miller {
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        let dlon = adjust_lon(lon - self.long0);
        let x = self.x0 + self.a * dlon;
        let y = self.y0 + self.a * (FRAC_PI_4 + lat / 2.5).tan().ln() * 1.25;
        Some((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let x = x - self.x0;
        let y = y - self.y0;
        let lon = adjust_lon(self.long0 + x / self.a);
        let lat = 2.5 * ((0.8 * y / self.a).exp().atan() - FRAC_PI_4);
        Some((lon, lat))
    }
}
