//! New Zealand Map Grid: a conformal complex-polynomial projection on the
//! International 1924 ellipsoid, defined by fixed series coefficients.

use super::common::SEC_TO_RAD;
use super::registry::ProjectionDefinition;
use super::{Projection, Setup};
use crate::error::Result;

pub(super) const DEFINITIONS: &[ProjectionDefinition] = &[ProjectionDefinition {
    names: &["New_Zealand_Map_Grid", "nzmg"],
    init,
}];

const DEFAULT_LAT0: f64 = -41.0;
const DEFAULT_LONG0: f64 = 173.0;
const DEFAULT_X0: f64 = 2_510_000.0;
const DEFAULT_Y0: f64 = 6_023_150.0;

/// Latitude difference (1e5 arc-seconds) to isometric latitude
const A: [f64; 10] = [
    0.6399175073,
    -0.1358797613,
    0.063294409,
    -0.02526853,
    0.0117879,
    -0.0055161,
    0.0026906,
    -0.001333,
    0.00067,
    -0.00034,
];

/// Complex coefficients of the forward map
const B: [(f64, f64); 6] = [
    (0.7557853228, 0.0),
    (0.249204646, 0.003371507),
    (-0.001541739, 0.041058560),
    (-0.10162907, 0.01727609),
    (-0.26623489, -0.36249218),
    (-0.6870983, -1.1651967),
];

/// Complex coefficients of the first-guess inverse
const C: [(f64, f64); 6] = [
    (1.3231270439, 0.0),
    (-0.577245789, -0.007809598),
    (0.508307513, -0.112208952),
    (-0.15094762, 0.18200602),
    (1.01418179, 1.64497696),
    (1.9660549, 2.5127645),
];

/// Isometric latitude to latitude difference
const D: [f64; 9] = [
    1.5627014243,
    0.5185406398,
    -0.03333098,
    -0.1052906,
    -0.0368594,
    0.007317,
    0.01220,
    0.00394,
    -0.0013,
];

const MAX_ITER: usize = 10;
const EPS: f64 = 1e-12;

pub struct NewZealandMapGrid {
    a: f64,
    lat0: f64,
    long0: f64,
    x0: f64,
    y0: f64,
}

fn init(setup: &Setup<'_>) -> Result<Box<dyn Projection>> {
    let params = setup.params;
    Ok(Box::new(NewZealandMapGrid {
        a: setup.a,
        lat0: params.lat0.unwrap_or(DEFAULT_LAT0.to_radians()),
        long0: params.long0.unwrap_or(DEFAULT_LONG0.to_radians()),
        x0: params.x0.unwrap_or(DEFAULT_X0),
        y0: params.y0.unwrap_or(DEFAULT_Y0),
    }))
}

fn cmul((ar, ai): (f64, f64), (br, bi): (f64, f64)) -> (f64, f64) {
    (ar * br - ai * bi, ai * br + ar * bi)
}

fn cdiv((ar, ai): (f64, f64), (br, bi): (f64, f64)) -> (f64, f64) {
    let den = br * br + bi * bi;
    ((ar * br + ai * bi) / den, (ai * br - ar * bi) / den)
}

/// Σ coeffs[n] · zⁿ⁺¹
fn cpoly(coeffs: &[(f64, f64)], z: (f64, f64)) -> (f64, f64) {
    let mut zn = (1.0, 0.0);
    let mut sum = (0.0, 0.0);
    for &c in coeffs {
        zn = cmul(zn, z);
        let term = cmul(c, zn);
        sum = (sum.0 + term.0, sum.1 + term.1);
    }
    sum
}

impl Projection for NewZealandMapGrid {
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        let d_phi = (lat - self.lat0) / SEC_TO_RAD * 1e-5;
        let d_lambda = lon - self.long0;

        let mut d_phi_n = 1.0;
        let mut d_psi = 0.0;
        for a in A {
            d_phi_n *= d_phi;
            d_psi += a * d_phi_n;
        }

        let (z_re, z_im) = cpoly(&B, (d_psi, d_lambda));
        Some((z_im * self.a + self.x0, z_re * self.a + self.y0))
    }

    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let z = ((y - self.y0) / self.a, (x - self.x0) / self.a);

        // series first guess, then Newton on Σ B·θⁿ = z
        let mut th = cpoly(&C, z);
        let mut converged = false;
        for _ in 0..MAX_ITER {
            let mut num = z;
            let mut den = B[0];
            let mut th_pow = (1.0, 0.0);
            for (i, &b) in B.iter().enumerate().skip(1) {
                let n = (i + 1) as f64;
                th_pow = cmul(th_pow, th);
                let low = cmul(b, th_pow);
                let high = cmul(low, th);
                num = (num.0 + (n - 1.0) * high.0, num.1 + (n - 1.0) * high.1);
                den = (den.0 + n * low.0, den.1 + n * low.1);
            }
            let next = cdiv(num, den);
            let delta = (next.0 - th.0).abs() + (next.1 - th.1).abs();
            th = next;
            if delta < EPS {
                converged = true;
                break;
            }
        }
        if !converged {
            return None;
        }

        let (d_psi, d_lambda) = th;
        let mut d_psi_n = 1.0;
        let mut d_phi = 0.0;
        for d in D {
            d_psi_n *= d_psi;
            d_phi += d * d_psi_n;
        }

        let lat = self.lat0 + d_phi * SEC_TO_RAD * 1e5;
        let lon = self.long0 + d_lambda;
        Some((lon, lat))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proj::testing::{assert_roundtrip, Fixture};
    use approx::assert_relative_eq;

    fn nzmg() -> Box<dyn Projection> {
        Fixture::new("intl").build("nzmg")
    }

    #[test]
    fn test_origin_defaults() {
        let (x, y) = nzmg()
            .forward(DEFAULT_LONG0.to_radians(), DEFAULT_LAT0.to_radians())
            .unwrap();
        assert_relative_eq!(x, DEFAULT_X0, epsilon = 1e-6);
        assert_relative_eq!(y, DEFAULT_Y0, epsilon = 1e-6);
    }

    #[test]
    fn test_wellington_region() {
        let (x, y) = nzmg().forward(174.7762_f64.to_radians(), (-41.2865_f64).to_radians()).unwrap();
        // roughly 2.66e6 E, 5.99e6 N
        assert!((x - 2_659_000.0).abs() < 5_000.0, "x = {x}");
        assert!((y - 5_990_000.0).abs() < 5_000.0, "y = {y}");
    }

    #[test]
    fn test_roundtrip() {
        // the latitude series only invert each other to a few centimetres
        assert_roundtrip(
            nzmg().as_ref(),
            &[(174.7762, -41.2865), (172.6362, -43.5321), (174.7633, -36.8485), (168.66, -45.03)],
            1e-7,
        );
    }
}
