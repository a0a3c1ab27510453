//! Sinusoidal (Sanson-Flamsteed) equal-area pseudo-cylindrical projection.
//!
//! On the ellipsoid the northing is the meridional arc, so parallels keep true
//! length and spacing.

use std::f64::consts::FRAC_PI_2;

use super::common::{adjust_lat, adjust_lon, pj_enfn, pj_inv_mlfn, pj_mlfn, EPSLN};
use super::registry::ProjectionDefinition;
use super::{Projection, Setup};
use crate::error::Result;

pub(super) const DEFINITIONS: &[ProjectionDefinition] = &[ProjectionDefinition {
    names: &["Sinusoidal", "sinu"],
    init,
}];

pub struct Sinusoidal {
    a: f64,
    es: f64,
    sphere: bool,
    long0: f64,
    x0: f64,
    y0: f64,
    en: [f64; 5],
}

fn init(setup: &Setup<'_>) -> Result<Box<dyn Projection>> {
    Ok(Box::new(Sinusoidal::new(setup)))
}

impl Sinusoidal {
    pub fn new(setup: &Setup<'_>) -> Self {
        Self {
            a: setup.a,
            es: setup.es,
            sphere: setup.sphere,
            long0: setup.long0,
            x0: setup.x0,
            y0: setup.y0,
            en: pj_enfn(setup.es),
        }
    }
}

impl Projection for Sinusoidal {
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        let lon = adjust_lon(lon - self.long0);
        let (x, y) = if self.sphere {
            (self.a * lon * lat.cos(), self.a * lat)
        } else {
            let (s, c) = lat.sin_cos();
            (
                self.a * lon * c / (1.0 - self.es * s * s).sqrt(),
                self.a * pj_mlfn(lat, s, c, &self.en),
            )
        };
        Some((x + self.x0, y + self.y0))
    }

    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let x = x - self.x0;
        let y = y - self.y0;

        if self.sphere {
            let lat = y / self.a;
            let lon = x / (self.a * lat.cos());
            return Some((adjust_lon(lon + self.long0), adjust_lat(lat)));
        }

        let lat = pj_inv_mlfn(y / self.a, self.es, &self.en);
        let s = lat.abs();
        if s < FRAC_PI_2 {
            let sin_lat = lat.sin();
            let lon = self.long0 + x * (1.0 - self.es * sin_lat * sin_lat).sqrt() / (self.a * lat.cos());
            Some((adjust_lon(lon), lat))
        } else if s - EPSLN < FRAC_PI_2 {
            Some((self.long0, lat))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proj::testing::{assert_roundtrip, Fixture};
    use approx::assert_relative_eq;

    #[test]
    fn test_roundtrip_sphere() {
        // MODIS sinusoidal sphere
        let fx = Fixture::sphere(6_371_007.181);
        let proj = fx.build("sinu");
        assert_roundtrip(
            proj.as_ref(),
            &[(0.0, 0.0), (10.0, 45.0), (-120.0, 30.0), (170.0, -60.0), (0.0, 80.0)],
            1e-10,
        );
    }

    #[test]
    fn test_roundtrip_ellipsoid() {
        let fx = Fixture::new("WGS84");
        let proj = fx.build("Sinusoidal");
        assert_roundtrip(proj.as_ref(), &[(10.0, 45.0), (-120.0, 30.0), (170.0, -60.0)], 1e-9);
    }

    #[test]
    fn test_equator_is_true_scale() {
        let fx = Fixture::sphere(6_371_007.181);
        let proj = fx.build("sinu");
        let (x, y) = proj.forward(1.0, 0.0).unwrap();
        assert_relative_eq!(x, 6_371_007.181, epsilon = 1e-6);
        assert_relative_eq!(y, 0.0, epsilon = 1e-9);
    }
}
