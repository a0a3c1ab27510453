//! Cassini-Soldner transverse cylindrical projection.

use std::f64::consts::FRAC_PI_2;

use super::common::{adjust_lat, adjust_lon, asinz, e0fn, e1fn, e2fn, e3fn, g_n, imlfn, mlfn, EPSLN};
use super::registry::ProjectionDefinition;
use super::{Projection, Setup};
use crate::error::Result;

pub(super) const DEFINITIONS: &[ProjectionDefinition] = &[ProjectionDefinition {
    names: &["Cassini", "Cassini_Soldner", "Cassini-Soldner", "cass"],
    init,
}];

pub struct Cassini {
    a: f64,
    e: f64,
    es: f64,
    sphere: bool,
    lat0: f64,
    long0: f64,
    x0: f64,
    y0: f64,
    e0: f64,
    e1: f64,
    e2: f64,
    e3: f64,
    ml0: f64,
}

fn init(setup: &Setup<'_>) -> Result<Box<dyn Projection>> {
    Ok(Box::new(Cassini::new(setup)))
}

impl Cassini {
    pub fn new(setup: &Setup<'_>) -> Self {
        let es = setup.es;
        let (e0, e1, e2, e3) = (e0fn(es), e1fn(es), e2fn(es), e3fn(es));
        Self {
            a: setup.a,
            e: setup.e,
            es,
            sphere: setup.sphere,
            lat0: setup.lat0,
            long0: setup.long0,
            x0: setup.x0,
            y0: setup.y0,
            e0,
            e1,
            e2,
            e3,
            ml0: setup.a * mlfn(e0, e1, e2, e3, setup.lat0),
        }
    }
}

impl Projection for Cassini {
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        let lam = adjust_lon(lon - self.long0);
        let phi = lat;

        let (x, y) = if self.sphere {
            (
                self.a * asinz(phi.cos() * lam.sin()),
                self.a * (phi.tan().atan2(lam.cos()) - self.lat0),
            )
        } else {
            let (sinphi, cosphi) = phi.sin_cos();
            let nl = g_n(self.a, self.e, sinphi);
            let tl = phi.tan().powi(2);
            let al = lam * cosphi;
            let asq = al * al;
            let cl = self.es * cosphi * cosphi / (1.0 - self.es);
            let ml = self.a * mlfn(self.e0, self.e1, self.e2, self.e3, phi);

            (
                nl * al * (1.0 - asq * tl * (1.0 / 6.0 - (8.0 - tl + 8.0 * cl) * asq / 120.0)),
                ml - self.ml0 + nl * sinphi / cosphi * asq * (0.5 + (5.0 - tl + 6.0 * cl) * asq / 24.0),
            )
        };
        Some((x + self.x0, y + self.y0))
    }

    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let x = (x - self.x0) / self.a;
        let y = (y - self.y0) / self.a;

        let (lam, phi) = if self.sphere {
            let dd = y + self.lat0;
            (x.tan().atan2(dd.cos()), asinz(dd.sin() * x.cos()))
        } else {
            let ml1 = self.ml0 / self.a + y;
            let phi1 = imlfn(ml1, self.e0, self.e1, self.e2, self.e3)?;
            if (phi1.abs() - FRAC_PI_2).abs() <= EPSLN {
                let lat = if y < 0.0 { -FRAC_PI_2 } else { FRAC_PI_2 };
                return Some((self.long0, lat));
            }
            let nl1 = g_n(self.a, self.e, phi1.sin());
            let rl1 = nl1 * nl1 * nl1 / self.a / self.a * (1.0 - self.es);
            let tl1 = phi1.tan().powi(2);
            let dl = x * self.a / nl1;
            let dsq = dl * dl;
            let phi = phi1 - nl1 * phi1.tan() / rl1 * dl * dl * (0.5 - (1.0 + 3.0 * tl1) * dl * dl / 24.0);
            let lam = dl * (1.0 - dsq * (tl1 / 3.0 + (1.0 + 3.0 * tl1) * tl1 * dsq / 15.0)) / phi1.cos();
            (lam, phi)
        };
        Some((adjust_lon(lam + self.long0), adjust_lat(phi)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proj::testing::{assert_roundtrip, Fixture};
    use approx::assert_relative_eq;

    #[test]
    fn test_origin() {
        let mut fx = Fixture::new("clrk80");
        fx.params.lat0 = Some(10.441_666_666_666_67_f64.to_radians());
        fx.params.long0 = Some((-61.333_333_333_333_33_f64).to_radians());
        fx.params.x0 = Some(86_501.46392052);
        fx.params.y0 = Some(65_379.0134283);
        let proj = fx.build("cass");
        let (x, y) = proj
            .forward((-61.333_333_333_333_33_f64).to_radians(), 10.441_666_666_666_67_f64.to_radians())
            .unwrap();
        assert_relative_eq!(x, 86_501.463_920_52, epsilon = 1e-6);
        assert_relative_eq!(y, 65_379.013_428_3, epsilon = 1e-6);
    }

    #[test]
    fn test_roundtrip_small_area() {
        let mut fx = Fixture::new("bessel");
        fx.params.lat0 = Some(52.0_f64.to_radians());
        fx.params.long0 = Some(13.0_f64.to_radians());
        let proj = fx.build("Cassini_Soldner");
        // Cassini's series is only accurate near the central meridian
        assert_roundtrip(proj.as_ref(), &[(13.1, 52.1), (12.8, 51.7), (13.3, 52.5)], 1e-8);
    }

    #[test]
    fn test_roundtrip_sphere() {
        let fx = Fixture::sphere(6_370_997.0);
        let proj = fx.build("cass");
        assert_roundtrip(proj.as_ref(), &[(5.0, 40.0), (-20.0, -10.0)], 1e-10);
    }
}
