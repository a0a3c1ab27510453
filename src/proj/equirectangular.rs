//! Equirectangular (Plate Carrée) projection.
//!
//!   x = a·(λ - λ₀)·cos(φ_ts)
//!   y = a·(φ - φ₀)

use super::common::{adjust_lat, adjust_lon};
use super::registry::ProjectionDefinition;
use super::{Projection, Setup};
use crate::error::Result;

pub(super) const DEFINITIONS: &[ProjectionDefinition] = &[ProjectionDefinition {
    names: &[
        "Equirectangular",
        "Equidistant_Cylindrical",
        "Equidistant_Cylindrical_Spherical",
        "Equidistant Cylindrical",
        "Plate_Carree",
        "eqc",
    ],
    init,
}];

pub struct Equirectangular {
    a: f64,
    lat0: f64,
    long0: f64,
    x0: f64,
    y0: f64,
    /// cos(lat_ts)
    rc: f64,
}

fn init(setup: &Setup<'_>) -> Result<Box<dyn Projection>> {
    Ok(Box::new(Equirectangular {
        a: setup.a,
        lat0: setup.lat0,
        long0: setup.long0,
        x0: setup.x0,
        y0: setup.y0,
        rc: setup.lat_ts().unwrap_or(0.0).cos(),
    }))
}

impl Projection for Equirectangular {
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        let dlon = adjust_lon(lon - self.long0);
        let dlat = adjust_lat(lat - self.lat0);
        Some((self.x0 + self.a * dlon * self.rc, self.y0 + self.a * dlat))
    }

    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let lon = adjust_lon(self.long0 + (x - self.x0) / (self.a * self.rc));
        let lat = adjust_lat(self.lat0 + (y - self.y0) / self.a);
        Some((lon, lat))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proj::testing::{assert_roundtrip, Fixture};
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_plate_carree_extent() {
        let fx = Fixture::new("WGS84");
        let proj = fx.build("eqc");
        let (x, y) = proj.forward(PI, 0.0).unwrap();
        assert_relative_eq!(x, 20_037_508.342_789_244, epsilon = 1e-3);
        assert_relative_eq!(y, 0.0);
    }

    #[test]
    fn test_lat_ts_shrinks_x() {
        let mut fx = Fixture::sphere(6_371_000.0);
        fx.params.lat_ts = Some(60.0_f64.to_radians());
        let proj = fx.build("Equidistant_Cylindrical");
        let (x, _) = proj.forward(1.0, 0.0).unwrap();
        assert_relative_eq!(x, 6_371_000.0 * 0.5, epsilon = 1e-6);
        assert_roundtrip(proj.as_ref(), &[(10.0, 20.0), (-150.0, -75.0)], 1e-12);
    }
}
