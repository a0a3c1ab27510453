//! Gnomonic projection (spherical). Great circles map to straight lines;
//! the hemisphere away from the centre has no image.

use super::common::{adjust_lon, asinz, EPSLN};
use super::registry::ProjectionDefinition;
use super::{Projection, Setup};
use crate::error::Result;

pub(super) const DEFINITIONS: &[ProjectionDefinition] = &[ProjectionDefinition {
    names: &["gnom", "Gnomonic"],
    init,
}];

pub struct Gnomonic {
    a: f64,
    k0: f64,
    lat0: f64,
    long0: f64,
    x0: f64,
    y0: f64,
    sin_p14: f64,
    cos_p14: f64,
}

fn init(setup: &Setup<'_>) -> Result<Box<dyn Projection>> {
    Ok(Box::new(Gnomonic {
        a: setup.a,
        k0: setup.k0,
        lat0: setup.lat0,
        long0: setup.long0,
        x0: setup.x0,
        y0: setup.y0,
        sin_p14: setup.lat0.sin(),
        cos_p14: setup.lat0.cos(),
    }))
}

impl Projection for Gnomonic {
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        let dlon = adjust_lon(lon - self.long0);
        let (sinphi, cosphi) = lat.sin_cos();
        let coslon = dlon.cos();
        let g = self.sin_p14 * sinphi + self.cos_p14 * cosphi * coslon;
        if g <= EPSLN {
            return None;
        }
        let k = self.a * self.k0 / g;
        let x = self.x0 + k * cosphi * dlon.sin();
        let y = self.y0 + k * (self.cos_p14 * sinphi - self.sin_p14 * cosphi * coslon);
        Some((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let x = (x - self.x0) / (self.a * self.k0);
        let y = (y - self.y0) / (self.a * self.k0);
        let rh = (x * x + y * y).sqrt();
        if rh == 0.0 {
            return Some((self.long0, self.lat0));
        }
        let c = rh.atan();
        let (sinc, cosc) = c.sin_cos();
        let lat = asinz(cosc * self.sin_p14 + y * sinc * self.cos_p14 / rh);
        let lon = (x * sinc).atan2(rh * self.cos_p14 * cosc - y * self.sin_p14 * sinc);
        Some((adjust_lon(self.long0 + lon), lat))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proj::testing::{assert_roundtrip, Fixture};

    #[test]
    fn test_roundtrip_and_far_side() {
        let mut fx = Fixture::sphere(6_370_997.0);
        fx.params.lat0 = Some(45.0_f64.to_radians());
        fx.params.long0 = Some(10.0_f64.to_radians());
        let proj = fx.build("gnom");
        assert_roundtrip(proj.as_ref(), &[(10.0, 45.0), (30.0, 60.0), (-5.0, 20.0)], 1e-10);
        assert!(proj.forward((-170.0_f64).to_radians(), (-45.0_f64).to_radians()).is_none());
    }
}
