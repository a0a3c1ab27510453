//! Robinson pseudo-cylindrical projection.
//!
//! Tabulated in 5° latitude bands with cubic interpolants per band; the
//! inverse solves the band cubic with Newton-Raphson.

use std::f64::consts::FRAC_PI_2;

use super::common::{adjust_lon, D2R, EPSLN, R2D};
use super::registry::ProjectionDefinition;
use super::{Projection, Setup};
use crate::error::Result;

pub(super) const DEFINITIONS: &[ProjectionDefinition] = &[ProjectionDefinition {
    names: &["Robinson", "robin"],
    init,
}];

#[rustfmt::skip]
const COEFS_X: [[f64; 4]; 19] = [
    [1.0000, 2.2199e-17, -7.15515e-05, 3.1103e-06],
    [0.9986, -0.000482243, -2.4897e-05, -1.3309e-06],
    [0.9954, -0.00083103, -4.48605e-05, -9.86701e-07],
    [0.9900, -0.00135364, -5.9661e-05, 3.6777e-06],
    [0.9822, -0.00167442, -4.49547e-06, -5.72411e-06],
    [0.9730, -0.00214868, -9.03571e-05, 1.8736e-08],
    [0.9600, -0.00305085, -9.00761e-05, 1.64917e-06],
    [0.9427, -0.00382792, -6.53386e-05, -2.6154e-06],
    [0.9216, -0.00467746, -0.00010457, 4.81243e-06],
    [0.8962, -0.00536223, -3.23831e-05, -5.43432e-06],
    [0.8679, -0.00609363, -0.000113898, 3.32484e-06],
    [0.8350, -0.00698325, -6.40253e-05, 9.34959e-07],
    [0.7986, -0.00755338, -5.00009e-05, 9.35324e-07],
    [0.7597, -0.00798324, -3.5971e-05, -2.27626e-06],
    [0.7186, -0.00851367, -7.01149e-05, -8.6303e-06],
    [0.6732, -0.00986209, -0.000199569, 1.91974e-05],
    [0.6213, -0.010418, 8.83923e-05, 6.24051e-06],
    [0.5722, -0.00906601, 0.000182, 6.24051e-06],
    [0.5322, -0.00677797, 0.000275608, 6.24051e-06],
];

#[rustfmt::skip]
const COEFS_Y: [[f64; 4]; 19] = [
    [-5.20417e-18, 0.0124, 1.21431e-18, -8.45284e-11],
    [0.0620, 0.0124, -1.26793e-09, 4.22642e-10],
    [0.1240, 0.0124, 5.07171e-09, -1.60604e-09],
    [0.1860, 0.0123999, -1.90189e-08, 6.00152e-09],
    [0.2480, 0.0124002, 7.10039e-08, -2.24e-08],
    [0.3100, 0.0123992, -2.64997e-07, 8.35986e-08],
    [0.3720, 0.0124029, 9.88983e-07, -3.11994e-07],
    [0.4340, 0.0123893, -3.69093e-06, -4.35621e-07],
    [0.4958, 0.0123198, -1.02252e-05, -3.45523e-07],
    [0.5571, 0.0121916, -1.54081e-05, -5.82288e-07],
    [0.6176, 0.0119938, -2.41424e-05, -5.25327e-07],
    [0.6769, 0.011713, -3.20223e-05, -5.16405e-07],
    [0.7346, 0.0113541, -3.97684e-05, -6.09052e-07],
    [0.7903, 0.0109107, -4.89042e-05, -1.04739e-06],
    [0.8435, 0.0103431, -6.4615e-05, -1.40374e-09],
    [0.8936, 0.00969686, -6.4636e-05, -8.547e-06],
    [0.9394, 0.00840947, -0.000192841, -4.2106e-06],
    [0.9761, 0.00616527, -0.000256, -4.2106e-06],
    [1.0000, 0.00328947, -0.000319159, -4.2106e-06],
];

const FXC: f64 = 0.8487;
const FYC: f64 = 1.3523;
/// Bands per radian
const C1: f64 = R2D / 5.0;
const RC1: f64 = 1.0 / C1;
const NODES: usize = 18;

fn poly3_val(coefs: &[f64; 4], x: f64) -> f64 {
    coefs[0] + x * (coefs[1] + x * (coefs[2] + x * coefs[3]))
}

fn poly3_der(coefs: &[f64; 4], x: f64) -> f64 {
    coefs[1] + x * (2.0 * coefs[2] + x * 3.0 * coefs[3])
}

fn band(v: f64) -> usize {
    (v.floor().max(0.0) as usize).min(NODES - 1)
}

pub struct Robinson {
    a: f64,
    long0: f64,
    x0: f64,
    y0: f64,
}

fn init(setup: &Setup<'_>) -> Result<Box<dyn Projection>> {
    Ok(Box::new(Robinson {
        a: setup.a,
        long0: setup.long0,
        x0: setup.x0,
        y0: setup.y0,
    }))
}

impl Projection for Robinson {
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        let lon = adjust_lon(lon - self.long0);
        let dphi = lat.abs();
        let i = band(dphi * C1);
        let dphi = R2D * (dphi - RC1 * i as f64);

        let x = poly3_val(&COEFS_X[i], dphi) * lon;
        let mut y = poly3_val(&COEFS_Y[i], dphi);
        if lat < 0.0 {
            y = -y;
        }
        Some((x * self.a * FXC + self.x0, y * self.a * FYC + self.y0))
    }

    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let dy = y - self.y0;
        let mut lx = (x - self.x0) / (self.a * FXC);
        let ly = dy.abs() / (self.a * FYC);

        let lat = if ly >= 1.0 {
            lx /= COEFS_X[NODES][0];
            if dy < 0.0 {
                -FRAC_PI_2
            } else {
                FRAC_PI_2
            }
        } else {
            let mut i = band(ly * NODES as f64);
            loop {
                if COEFS_Y[i][0] > ly && i > 0 {
                    i -= 1;
                } else if COEFS_Y[i + 1][0] <= ly && i + 1 < NODES {
                    i += 1;
                } else {
                    break;
                }
            }
            let coefs = &COEFS_Y[i];
            let mut t = 5.0 * (ly - coefs[0]) / (COEFS_Y[i + 1][0] - coefs[0]);
            for _ in 0..100 {
                let upd = (poly3_val(coefs, t) - ly) / poly3_der(coefs, t);
                t -= upd;
                if upd.abs() < EPSLN {
                    break;
                }
            }
            lx /= poly3_val(&COEFS_X[i], t);
            let lat = (5.0 * i as f64 + t) * D2R;
            if dy < 0.0 {
                -lat
            } else {
                lat
            }
        };
        Some((adjust_lon(lx + self.long0), lat))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proj::testing::{assert_roundtrip, Fixture};
    use approx::assert_relative_eq;

    #[test]
    fn test_equator_and_pole_line() {
        let fx = Fixture::sphere(6_370_997.0);
        let proj = fx.build("robin");
        let (x, y) = proj.forward(std::f64::consts::PI, 0.0).unwrap();
        assert_relative_eq!(x, 6_370_997.0 * FXC * std::f64::consts::PI, epsilon = 1e-6);
        assert_relative_eq!(y, 0.0, epsilon = 1e-6);
        let (_, y) = proj.forward(0.0, FRAC_PI_2).unwrap();
        assert_relative_eq!(y, 6_370_997.0 * FYC, epsilon = 1.0);
    }

    #[test]
    fn test_roundtrip() {
        let fx = Fixture::sphere(6_370_997.0);
        let proj = fx.build("Robinson");
        assert_roundtrip(
            proj.as_ref(),
            &[(0.0, 0.0), (30.0, 12.5), (-100.0, 47.0), (160.0, -71.0), (5.0, -3.0)],
            1e-7,
        );
    }
}
