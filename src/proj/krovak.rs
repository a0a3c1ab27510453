//! Krovak oblique conformal conic (Czech and Slovak S-JTSK grids).
//!
//! Output is the EPSG:5514 "East/North" form: both axes negated, unless the
//! `czech` flag asks for the historical positive south-west orientation.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use super::common::{adjust_lon, asinz};
use super::registry::ProjectionDefinition;
use super::{Projection, Setup};
use crate::error::Result;

pub(super) const DEFINITIONS: &[ProjectionDefinition] = &[ProjectionDefinition {
    names: &["Krovak", "Krovak (North Orientated)", "krovak"],
    init,
}];

/// 49°30' N
const DEFAULT_LAT0: f64 = 0.863_937_979_737_193;
/// 24°50' E of Greenwich (42°30' E of Ferro)
const DEFAULT_LONG0: f64 = 0.741_764_932_097_590_1 - 0.308_341_501_185_665;
/// Pseudo standard parallel, 78°30'
const DEFAULT_S0: f64 = 1.370_083_462_815_55;
/// Co-latitude of the cone axis
const UQ: f64 = 1.042_168_563_804_74;

pub struct Krovak {
    e: f64,
    long0: f64,
    x0: f64,
    y0: f64,
    alfa: f64,
    k: f64,
    n: f64,
    s0: f64,
    ro0: f64,
    ad: f64,
    czech: bool,
}

fn init(setup: &Setup<'_>) -> Result<Box<dyn Projection>> {
    Ok(Box::new(Krovak::new(setup)))
}

impl Krovak {
    pub fn new(setup: &Setup<'_>) -> Self {
        let params = setup.params;
        let fi0 = params.lat0.filter(|v| *v != 0.0).unwrap_or(DEFAULT_LAT0);
        let long0 = params.long0.filter(|v| *v != 0.0).unwrap_or(DEFAULT_LONG0);
        let k0 = params.k0.filter(|v| *v != 0.0).unwrap_or(0.9999);
        let s0 = params.lat_ts.filter(|v| *v != 0.0).unwrap_or(DEFAULT_S0);
        let ad = params.alpha.unwrap_or(FRAC_PI_2 - UQ);

        let e2 = setup.es;
        let e = setup.e;
        let alfa = (1.0 + e2 * fi0.cos().powi(4) / (1.0 - e2)).sqrt();
        let u0 = asinz(fi0.sin() / alfa);
        let g = ((1.0 + e * fi0.sin()) / (1.0 - e * fi0.sin())).powf(alfa * e / 2.0);
        let k = (u0 / 2.0 + FRAC_PI_4).tan() / (fi0 / 2.0 + FRAC_PI_4).tan().powf(alfa) * g;
        let n0 = setup.a * (1.0 - e2).sqrt() / (1.0 - e2 * fi0.sin().powi(2));
        let n = s0.sin();
        let ro0 = k0 * n0 / s0.tan();

        Self {
            e,
            long0,
            x0: setup.x0,
            y0: setup.y0,
            alfa,
            k,
            n,
            s0,
            ro0,
            ad,
            czech: params.has("czech"),
        }
    }
}

impl Projection for Krovak {
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        let delta_lon = adjust_lon(lon - self.long0);
        let esin = self.e * lat.sin();
        let gfi = ((1.0 + esin) / (1.0 - esin)).powf(self.alfa * self.e / 2.0);
        let u = 2.0
            * ((self.k * (lat / 2.0 + FRAC_PI_4).tan().powf(self.alfa) / gfi).atan() - FRAC_PI_4);
        let deltav = -delta_lon * self.alfa;
        let s = asinz(self.ad.cos() * u.sin() + self.ad.sin() * u.cos() * deltav.cos());
        let d = asinz(u.cos() * deltav.sin() / s.cos());
        let eps = self.n * d;
        let ro = self.ro0 * (self.s0 / 2.0 + FRAC_PI_4).tan().powf(self.n)
            / (s / 2.0 + FRAC_PI_4).tan().powf(self.n);

        let mut y = ro * eps.cos();
        let mut x = ro * eps.sin();
        if !self.czech {
            y = -y;
            x = -x;
        }
        Some((x + self.x0, y + self.y0))
    }

    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        // Axes swap back onto the cone's (southing, westing) frame
        let (mut px, mut py) = (y - self.y0, x - self.x0);
        if !self.czech {
            px = -px;
            py = -py;
        }
        let ro = (px * px + py * py).sqrt();
        let eps = py.atan2(px);
        let d = eps / self.s0.sin();
        let s = 2.0
            * (((self.ro0 / ro).powf(1.0 / self.n) * (self.s0 / 2.0 + FRAC_PI_4).tan()).atan()
                - FRAC_PI_4);
        let u = asinz(self.ad.cos() * s.sin() - self.ad.sin() * s.cos() * d.cos());
        let deltav = asinz(s.cos() * d.sin() / u.cos());
        let lon = self.long0 - deltav / self.alfa;

        let mut fi1 = u;
        for _ in 0..15 {
            let esin = self.e * fi1.sin();
            let lat = 2.0
                * ((self.k.powf(-1.0 / self.alfa)
                    * (u / 2.0 + FRAC_PI_4).tan().powf(1.0 / self.alfa)
                    * ((1.0 + esin) / (1.0 - esin)).powf(self.e / 2.0))
                    .atan()
                    - FRAC_PI_4);
            if (fi1 - lat).abs() < 1e-10 {
                return Some((adjust_lon(lon), lat));
            }
            fi1 = lat;
        }
        None
    }
}
