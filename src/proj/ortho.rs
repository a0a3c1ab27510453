//! Orthographic projection (spherical): the globe seen from infinity.

use std::f64::consts::FRAC_PI_2;

use super::common::{adjust_lon, asinz, EPSLN};
use super::registry::ProjectionDefinition;
use super::{Projection, Setup};
use crate::error::Result;

pub(super) const DEFINITIONS: &[ProjectionDefinition] = &[ProjectionDefinition {
    names: &["ortho", "Orthographic"],
    init,
}];

pub struct Orthographic {
    a: f64,
    lat0: f64,
    long0: f64,
    x0: f64,
    y0: f64,
    sin_p14: f64,
    cos_p14: f64,
}

fn init(setup: &Setup<'_>) -> Result<Box<dyn Projection>> {
    Ok(Box::new(Orthographic {
        a: setup.a,
        lat0: setup.lat0,
        long0: setup.long0,
        x0: setup.x0,
        y0: setup.y0,
        sin_p14: setup.lat0.sin(),
        cos_p14: setup.lat0.cos(),
    }))
}

impl Projection for Orthographic {
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        let dlon = adjust_lon(lon - self.long0);
        let (sinphi, cosphi) = lat.sin_cos();
        let coslon = dlon.cos();
        let g = self.sin_p14 * sinphi + self.cos_p14 * cosphi * coslon;
        // Far hemisphere is hidden
        if g < -EPSLN {
            return None;
        }
        let x = self.x0 + self.a * cosphi * dlon.sin();
        let y = self.y0 + self.a * (self.cos_p14 * sinphi - self.sin_p14 * cosphi * coslon);
        Some((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let x = x - self.x0;
        let y = y - self.y0;
        let rh = (x * x + y * y).sqrt();
        if rh > self.a * (1.0 + EPSLN) {
            return None;
        }
        if rh <= EPSLN {
            return Some((self.long0, self.lat0));
        }
        let z = asinz(rh / self.a);
        let (sinz, cosz) = z.sin_cos();
        let lat = asinz(cosz * self.sin_p14 + y * sinz * self.cos_p14 / rh);
        let lon = if (self.lat0.abs() - FRAC_PI_2).abs() <= EPSLN {
            if self.lat0 >= 0.0 {
                adjust_lon(self.long0 + x.atan2(-y))
            } else {
                adjust_lon(self.long0 - (-x).atan2(y))
            }
        } else {
            adjust_lon(self.long0 + (x * sinz).atan2(rh * self.cos_p14 * cosz - y * self.sin_p14 * sinz))
        };
        Some((lon, lat))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proj::testing::{assert_roundtrip, Fixture};

    #[test]
    fn test_roundtrip_and_hidden_side() {
        let mut fx = Fixture::sphere(6_370_997.0);
        fx.params.lat0 = Some(40.0_f64.to_radians());
        fx.params.long0 = Some((-100.0_f64).to_radians());
        let proj = fx.build("ortho");
        assert_roundtrip(proj.as_ref(), &[(-100.0, 40.0), (-80.0, 30.0), (-120.0, 60.0)], 1e-9);
        assert!(proj.forward(80.0_f64.to_radians(), (-40.0_f64).to_radians()).is_none());
        assert!(proj.inverse(7_000_000.0, 0.0).is_none());
    }

    #[test]
    fn test_polar_aspect() {
        let mut fx = Fixture::sphere(6_370_997.0);
        fx.params.lat0 = Some(FRAC_PI_2);
        let proj = fx.build("ortho");
        assert_roundtrip(proj.as_ref(), &[(45.0, 60.0), (-135.0, 30.0)], 1e-9);
    }
}
