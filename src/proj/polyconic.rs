//! American Polyconic projection.

use super::common::{adjust_lon, asinz, msfn, pj_enfn, pj_mlfn, EPSLN};
use super::registry::ProjectionDefinition;
use super::{Projection, Setup};
use crate::error::Result;

pub(super) const DEFINITIONS: &[ProjectionDefinition] = &[ProjectionDefinition {
    names: &["Polyconic", "American_Polyconic", "poly"],
    init,
}];

const TOL: f64 = 1e-10;
const ITOL: f64 = 1e-12;

pub struct Polyconic {
    a: f64,
    es: f64,
    sphere: bool,
    lat0: f64,
    long0: f64,
    x0: f64,
    y0: f64,
    en: [f64; 5],
    /// Meridional arc of the origin latitude, unit ellipsoid
    ml0: f64,
}

fn init(setup: &Setup<'_>) -> Result<Box<dyn Projection>> {
    let en = pj_enfn(setup.es);
    let lat0 = setup.lat0;
    let ml0 = if setup.sphere {
        lat0
    } else {
        pj_mlfn(lat0, lat0.sin(), lat0.cos(), &en)
    };
    Ok(Box::new(Polyconic {
        a: setup.a,
        es: setup.es,
        sphere: setup.sphere,
        lat0,
        long0: setup.long0,
        x0: setup.x0,
        y0: setup.y0,
        en,
        ml0,
    }))
}

impl Projection for Polyconic {
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        let lam = adjust_lon(lon - self.long0);
        let (x, y) = if lat.abs() <= TOL {
            (lam, -self.ml0)
        } else if self.sphere {
            let cot = 1.0 / lat.tan();
            let e = lam * lat.sin();
            (e.sin() * cot, lat - self.lat0 + cot * (1.0 - e.cos()))
        } else {
            let (sp, cp) = lat.sin_cos();
            let ms = if cp.abs() > TOL { msfn(self.es.sqrt(), sp, cp) / sp } else { 0.0 };
            let lam = lam * sp;
            (
                ms * lam.sin(),
                pj_mlfn(lat, sp, cp, &self.en) - self.ml0 + ms * (1.0 - lam.cos()),
            )
        };
        Some((self.a * x + self.x0, self.a * y + self.y0))
    }

    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let x = (x - self.x0) / self.a;
        let y = (y - self.y0) / self.a + self.ml0;

        if y.abs() <= EPSLN {
            return Some((adjust_lon(x + self.long0), 0.0));
        }

        if self.sphere {
            let b = x * x + y * y;
            let mut phi = y;
            for i in 0..=10 {
                if i == 10 {
                    return None;
                }
                let tp = phi.tan();
                let dphi = (y * (phi * tp + 1.0) - phi - 0.5 * (phi * phi + b) * tp)
                    / ((phi - y) / tp - 1.0);
                phi -= dphi;
                if dphi.abs() <= TOL {
                    break;
                }
            }
            let lam = asinz(x * phi.tan()) / phi.sin();
            return Some((adjust_lon(lam + self.long0), phi));
        }

        let r = y * y + x * x;
        let mut phi = y;
        let mut converged = false;
        for _ in 0..20 {
            let (sp, cp) = phi.sin_cos();
            if cp.abs() < ITOL {
                return None;
            }
            let s2ph = sp * cp;
            let mlp_root = (1.0 - self.es * sp * sp).sqrt();
            let c = sp * mlp_root / cp;
            let ml = pj_mlfn(phi, sp, cp, &self.en);
            let mlb = ml * ml + r;
            let mlp = (1.0 - self.es) / (mlp_root * mlp_root * mlp_root);
            let dphi = (ml + ml + c * mlb - 2.0 * y * (c * ml + 1.0))
                / (self.es * s2ph * (mlb - 2.0 * y * ml) / c
                    + 2.0 * (y - ml) * (c * mlp - 1.0 / s2ph)
                    - mlp
                    - mlp);
            phi += dphi;
            if dphi.abs() <= ITOL {
                converged = true;
                break;
            }
        }
        if !converged {
            return None;
        }
        let c = phi.sin();
        let lam = asinz(x * phi.tan() * (1.0 - self.es * c * c).sqrt()) / c;
        Some((adjust_lon(lam + self.long0), phi))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proj::testing::{assert_roundtrip, Fixture};
    use approx::assert_relative_eq;

    #[test]
    fn test_central_meridian_is_meridional_arc() {
        let fx = Fixture::sphere(6_370_997.0);
        let proj = fx.build("poly");
        let (x, y) = proj.forward(0.0, 30.0_f64.to_radians()).unwrap();
        assert_relative_eq!(x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(y, 6_370_997.0 * 30.0_f64.to_radians(), epsilon = 1e-6);
    }

    #[test]
    fn test_roundtrip() {
        let mut fx = Fixture::new("clrk66");
        fx.params.lat0 = Some(30.0_f64.to_radians());
        fx.params.long0 = Some((-96.0_f64).to_radians());
        let proj = fx.build("Polyconic");
        assert_roundtrip(
            proj.as_ref(),
            &[(-96.0, 30.0), (-100.0, 40.0), (-85.0, 20.0), (-110.0, 0.0)],
            1e-9,
        );

        let fx = Fixture::sphere(6_370_997.0);
        let proj = fx.build("poly");
        assert_roundtrip(proj.as_ref(), &[(10.0, 40.0), (-20.0, -15.0)], 1e-9);
    }
}
