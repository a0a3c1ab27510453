//! Equal Earth pseudocylindrical projection (Šavrič, Patterson, Jenny 2018).
//! The ellipsoidal form runs on the authalic latitude.

use super::common::{adjust_lon, authlat, authset, qsfn};
use super::registry::ProjectionDefinition;
use super::{Projection, Setup};
use crate::error::Result;

pub(super) const DEFINITIONS: &[ProjectionDefinition] = &[ProjectionDefinition {
    names: &["eqearth", "Equal Earth", "Equal_Earth"],
    init,
}];

const A1: f64 = 1.340264;
const A2: f64 = -0.081106;
const A3: f64 = 0.000893;
const A4: f64 = 0.003796;
const M: f64 = 0.866_025_403_784_438_6; // sqrt(3) / 2
const MAX_ITER: usize = 12;
const EPS: f64 = 1e-11;

pub struct EqualEarth {
    a: f64,
    e: f64,
    es: f64,
    long0: f64,
    x0: f64,
    y0: f64,
    qp: f64,
    rqda: f64,
    apa: [f64; 3],
}

fn init(setup: &Setup<'_>) -> Result<Box<dyn Projection>> {
    let (qp, rqda, apa) = if setup.es != 0.0 {
        let qp = qsfn(setup.e, 1.0);
        (qp, (0.5 * qp).sqrt(), authset(setup.es))
    } else {
        (2.0, 1.0, [0.0; 3])
    };
    Ok(Box::new(EqualEarth {
        a: setup.a,
        e: setup.e,
        es: setup.es,
        long0: setup.long0,
        x0: setup.x0,
        y0: setup.y0,
        qp,
        rqda,
        apa,
    }))
}

/// y(psi) and its derivative.
fn poly(psi: f64) -> (f64, f64) {
    let psi2 = psi * psi;
    let psi6 = psi2 * psi2 * psi2;
    (
        psi * (A1 + A2 * psi2 + psi6 * (A3 + A4 * psi2)),
        A1 + 3.0 * A2 * psi2 + psi6 * (7.0 * A3 + 9.0 * A4 * psi2),
    )
}

impl Projection for EqualEarth {
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        let lam = adjust_lon(lon - self.long0);
        let mut sbeta = lat.sin();
        if self.es != 0.0 {
            sbeta = (qsfn(self.e, sbeta) / self.qp).clamp(-1.0, 1.0);
        }
        let psi = (M * sbeta).asin();
        let (y, dy) = poly(psi);
        let x = lam * psi.cos() / (M * dy);
        Some((
            self.a * self.rqda * x + self.x0,
            self.a * self.rqda * y + self.y0,
        ))
    }

    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let x = (x - self.x0) / (self.a * self.rqda);
        let y = (y - self.y0) / (self.a * self.rqda);

        let mut psi = y;
        let mut converged = false;
        for _ in 0..MAX_ITER {
            let (fy, fpy) = poly(psi);
            let dlat = (fy - y) / fpy;
            psi -= dlat;
            if dlat.abs() < EPS {
                converged = true;
                break;
            }
        }
        if !converged {
            return None;
        }

        let (_, dy) = poly(psi);
        let lam = M * x * dy / psi.cos();
        let beta = (psi.sin() / M).clamp(-1.0, 1.0).asin();
        let phi = if self.es != 0.0 { authlat(beta, &self.apa) } else { beta };
        Some((adjust_lon(lam + self.long0), phi))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proj::testing::{assert_roundtrip, Fixture};
    use approx::assert_relative_eq;

    #[test]
    fn test_sphere_matches_polynomial() {
        let fx = Fixture::sphere(1.0);
        let proj = fx.build("eqearth");
        let (x, y) = proj.forward(0.0, 0.0).unwrap();
        assert_relative_eq!(x, 0.0);
        assert_relative_eq!(y, 0.0);
        let (x, _) = proj.forward(std::f64::consts::PI, 0.0).unwrap();
        assert_relative_eq!(x, std::f64::consts::PI / (M * A1), epsilon = 1e-12);
    }

    #[test]
    fn test_roundtrip() {
        let samples = [(0.0, 0.0), (120.0, 45.0), (-170.0, -80.0), (30.0, -10.0)];
        assert_roundtrip(Fixture::sphere(6_371_008.8).build("Equal Earth").as_ref(), &samples, 1e-9);
        assert_roundtrip(Fixture::new("WGS84").build("eqearth").as_ref(), &samples, 1e-8);
    }
}
