//! Mollweide equal-area projection (spherical).

use std::f64::consts::{FRAC_PI_2, PI};

use super::common::{adjust_lon, asinz, EPSLN};
use super::registry::ProjectionDefinition;
use super::{Projection, Setup};
use crate::error::Result;

pub(super) const DEFINITIONS: &[ProjectionDefinition] = &[ProjectionDefinition {
    names: &["Mollweide", "moll"],
    init,
}];

/// 2√2 / π
const CX: f64 = 0.900_316_316_158;
/// √2
const CY: f64 = 1.414_213_562_373_1;

pub struct Mollweide {
    a: f64,
    long0: f64,
    x0: f64,
    y0: f64,
}

fn init(setup: &Setup<'_>) -> Result<Box<dyn Projection>> {
    Ok(Box::new(Mollweide {
        a: setup.a,
        long0: setup.long0,
        x0: setup.x0,
        y0: setup.y0,
    }))
}

impl Projection for Mollweide {
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        let mut delta_lon = adjust_lon(lon - self.long0);

        // Newton-Raphson on 2θ + sin 2θ = π sin φ
        let con = PI * lat.sin();
        let mut theta = lat;
        for _ in 0..50 {
            let delta_theta = -(theta + theta.sin() - con) / (1.0 + theta.cos());
            theta += delta_theta;
            if delta_theta.abs() < EPSLN || !theta.is_finite() {
                break;
            }
        }
        if !theta.is_finite() {
            theta = lat.signum() * PI;
        }
        theta /= 2.0;

        // Poles collapse to a point on the central meridian
        if FRAC_PI_2 - lat.abs() < EPSLN {
            delta_lon = 0.0;
        }
        let x = CX * self.a * delta_lon * theta.cos() + self.x0;
        let y = CY * self.a * theta.sin() + self.y0;
        Some((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let x = x - self.x0;
        let y = y - self.y0;
        let arg = (y / (CY * self.a)).clamp(-0.999_999_999_999, 0.999_999_999_999);
        let theta = arg.asin();
        let lon = adjust_lon(self.long0 + x / (CX * self.a * theta.cos())).clamp(-PI, PI);
        let lat = asinz((2.0 * theta + (2.0 * theta).sin()) / PI);
        Some((lon, lat))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proj::testing::{assert_roundtrip, Fixture};
    use approx::assert_relative_eq;

    #[test]
    fn test_roundtrip() {
        let fx = Fixture::sphere(6_370_997.0);
        let proj = fx.build("moll");
        assert_roundtrip(
            proj.as_ref(),
            &[(0.0, 0.0), (45.0, 30.0), (-120.0, -60.0), (179.0, 10.0)],
            1e-8,
        );
    }

    #[test]
    fn test_pole_on_central_meridian() {
        let fx = Fixture::sphere(6_370_997.0);
        let proj = fx.build("Mollweide");
        let (x, y) = proj.forward(1.0, FRAC_PI_2).unwrap();
        assert_relative_eq!(x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(y, CY * 6_370_997.0, epsilon = 1.0);
    }
}
