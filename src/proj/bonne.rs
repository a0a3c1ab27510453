//! Bonne pseudoconical equal-area projection, spherical and ellipsoidal.
//! Werner's projection is the special case `lat_1=90`.

use std::f64::consts::FRAC_PI_2;

use super::common::{adjust_lat, adjust_lon, hypot, pj_enfn, pj_inv_mlfn, pj_mlfn, sign, EPSLN};
use super::registry::ProjectionDefinition;
use super::{Projection, Setup};
use crate::error::{ProjError, Result};

pub(super) const DEFINITIONS: &[ProjectionDefinition] = &[ProjectionDefinition {
    names: &["bonne", "Bonne"],
    init,
}];

pub struct Bonne {
    a: f64,
    es: f64,
    long0: f64,
    x0: f64,
    y0: f64,
    phi1: f64,
    kind: Kind,
}

enum Kind {
    Sphere { cphi1: f64 },
    Ellipsoid { en: [f64; 5], m1: f64, am1: f64 },
}

fn init(setup: &Setup<'_>) -> Result<Box<dyn Projection>> {
    let phi1 = setup.lat1;
    if phi1.abs() < EPSLN {
        return Err(ProjError::InvalidParameter("bonne requires a non-zero lat_1".into()));
    }

    let kind = if setup.es != 0.0 {
        let en = pj_enfn(setup.es);
        let (s, c) = phi1.sin_cos();
        let m1 = pj_mlfn(phi1, s, c, &en);
        let am1 = c / ((1.0 - setup.es * s * s).sqrt() * s);
        Kind::Ellipsoid { en, m1, am1 }
    } else {
        let cphi1 = if phi1.abs() + EPSLN >= FRAC_PI_2 { 0.0 } else { 1.0 / phi1.tan() };
        Kind::Sphere { cphi1 }
    };

    Ok(Box::new(Bonne {
        a: setup.a,
        es: setup.es,
        long0: setup.long0,
        x0: setup.x0,
        y0: setup.y0,
        phi1,
        kind,
    }))
}

impl Projection for Bonne {
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        let lam = adjust_lon(lon - self.long0);
        let (x, y) = match &self.kind {
            Kind::Ellipsoid { en, m1, am1 } => {
                let (s, c) = lat.sin_cos();
                let rh = am1 + m1 - pj_mlfn(lat, s, c, en);
                if rh.abs() > EPSLN {
                    let e = c * lam / (rh * (1.0 - self.es * s * s).sqrt());
                    (rh * e.sin(), am1 - rh * e.cos())
                } else {
                    (0.0, 0.0)
                }
            }
            Kind::Sphere { cphi1 } => {
                let rh = cphi1 + self.phi1 - lat;
                if rh.abs() > EPSLN {
                    let e = lam * lat.cos() / rh;
                    (rh * e.sin(), cphi1 - rh * e.cos())
                } else {
                    (0.0, 0.0)
                }
            }
        };
        Some((self.a * x + self.x0, self.a * y + self.y0))
    }

    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let x = (x - self.x0) / self.a;
        let y = (y - self.y0) / self.a;
        // southern standard parallels put the apex below the map
        let s1 = sign(self.phi1);

        let (lam, phi) = match &self.kind {
            Kind::Ellipsoid { en, m1, am1 } => {
                let yy = am1 - y;
                let rh = s1 * hypot(x, yy);
                let phi = pj_inv_mlfn(am1 + m1 - rh, self.es, en);
                let abs_phi = phi.abs();
                let lam = if abs_phi < FRAC_PI_2 {
                    let s = phi.sin();
                    rh * (s1 * x).atan2(s1 * yy) * (1.0 - self.es * s * s).sqrt() / phi.cos()
                } else if (abs_phi - FRAC_PI_2).abs() <= EPSLN {
                    0.0
                } else {
                    return None;
                };
                (lam, phi)
            }
            Kind::Sphere { cphi1 } => {
                let yy = cphi1 - y;
                let rh = s1 * hypot(x, yy);
                let phi = cphi1 + self.phi1 - rh;
                if phi.abs() > FRAC_PI_2 + EPSLN {
                    return None;
                }
                let lam = if (phi.abs() - FRAC_PI_2).abs() <= EPSLN {
                    0.0
                } else {
                    rh * (s1 * x).atan2(s1 * yy) / phi.cos()
                };
                (lam, phi)
            }
        };
        Some((adjust_lon(lam + self.long0), adjust_lat(phi)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proj::init_projection;
    use crate::proj::testing::{assert_roundtrip, Fixture};
    use approx::assert_relative_eq;

    fn bonne(fx: &mut Fixture, lat1: f64) -> Box<dyn Projection> {
        fx.params.lat1 = Some(lat1.to_radians());
        fx.build("bonne")
    }

    #[test]
    fn test_centre_maps_to_origin() {
        let proj = bonne(&mut Fixture::new("WGS84"), 45.0);
        let (x, y) = proj.forward(0.0, 45.0_f64.to_radians()).unwrap();
        assert_relative_eq!(x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_roundtrip() {
        let samples = [(10.0, 45.0), (-60.0, 10.0), (120.0, -30.0), (0.0, 80.0)];
        assert_roundtrip(bonne(&mut Fixture::new("WGS84"), 45.0).as_ref(), &samples, 1e-9);
        assert_roundtrip(bonne(&mut Fixture::sphere(6_370_997.0), 45.0).as_ref(), &samples, 1e-9);
        assert_roundtrip(bonne(&mut Fixture::sphere(6_370_997.0), 90.0).as_ref(), &samples, 1e-9);
    }

    #[test]
    fn test_southern_standard_parallel() {
        let samples = [(10.0, -45.0), (-60.0, -10.0), (120.0, 30.0)];
        assert_roundtrip(bonne(&mut Fixture::new("WGS84"), -40.0).as_ref(), &samples, 1e-9);
        assert_roundtrip(bonne(&mut Fixture::sphere(6_370_997.0), -40.0).as_ref(), &samples, 1e-9);
    }

    #[test]
    fn test_equatorial_standard_parallel_rejected() {
        let fx = Fixture::new("WGS84");
        assert!(init_projection("bonne", &fx.setup()).is_err());
    }
}
