//! Geocentric (earth-centred, earth-fixed) X/Y/Z coordinates.
//!
//! Only meaningful through the point methods, which carry the height; the
//! two-dimensional forms assume the point lies on the ellipsoid.

use super::registry::ProjectionDefinition;
use super::{Projection, Setup};
use crate::error::Result;
use crate::geodesy::geocentric::{geocentric_to_geodetic, geodetic_to_geocentric};
use crate::point::Point;

pub(super) const DEFINITIONS: &[ProjectionDefinition] = &[ProjectionDefinition {
    names: &["Geocentric", "geocentric", "geocent"],
    init,
}];

pub struct Geocentric {
    a: f64,
    es: f64,
}

fn init(setup: &Setup<'_>) -> Result<Box<dyn Projection>> {
    Ok(Box::new(Geocentric {
        a: setup.a,
        es: setup.es,
    }))
}

impl Projection for Geocentric {
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        self.forward_point(Point::new(lon, lat)).map(|p| (p.x, p.y))
    }

    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        self.inverse_point(Point::new(x, y)).map(|p| (p.x, p.y))
    }

    fn forward_point(&self, p: Point) -> Option<Point> {
        geodetic_to_geocentric(p, self.es, self.a)
    }

    fn inverse_point(&self, p: Point) -> Option<Point> {
        Some(geocentric_to_geodetic(p, self.es, self.a))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proj::testing::Fixture;
    use approx::assert_relative_eq;

    #[test]
    fn test_height_survives_roundtrip() {
        let proj = Fixture::new("WGS84").build("geocent");
        let p = Point::new_3d(0.13, 0.82, 1_250.0);
        let xyz = proj.forward_point(p).unwrap();
        assert!(xyz.x > 4_000_000.0);
        let back = proj.inverse_point(xyz).unwrap();
        assert_relative_eq!(back.x, p.x, epsilon = 1e-12);
        assert_relative_eq!(back.y, p.y, epsilon = 1e-11);
        assert_relative_eq!(back.z.unwrap(), 1_250.0, epsilon = 1e-4);
    }

    #[test]
    fn test_equator_on_x_axis() {
        let proj = Fixture::new("WGS84").build("geocentric");
        let (x, y) = proj.forward(0.0, 0.0).unwrap();
        assert_relative_eq!(x, 6_378_137.0);
        assert_relative_eq!(y, 0.0);
    }
}
