//! Lambert Conformal Conic projection, one and two standard parallels.
//!
//! With a single parallel (`lat2` absent) the cone is tangent at `lat1` and
//! `k0` scales the result; with two the cone constant is fitted to both.

use std::f64::consts::{FRAC_PI_2, PI};

use super::common::{adjust_lon, msfn, phi2z, sign, tsfn, EPSLN};
use super::registry::ProjectionDefinition;
use super::{Projection, Setup};
use crate::error::{ProjError, Result};

pub(super) const DEFINITIONS: &[ProjectionDefinition] = &[ProjectionDefinition {
    names: &[
        "Lambert Tangential Conformal Conic Projection",
        "Lambert_Conformal_Conic",
        "Lambert_Conformal_Conic_1SP",
        "Lambert_Conformal_Conic_2SP",
        "Lambert Conic Conformal (1SP)",
        "Lambert Conic Conformal (2SP)",
        "lcc",
    ],
    init,
}];

pub struct LambertConformalConic {
    a: f64,
    e: f64,
    k0: f64,
    long0: f64,
    x0: f64,
    y0: f64,
    /// Cone constant
    ns: f64,
    f0: f64,
    /// Radius of the origin parallel
    rh: f64,
}

fn init(setup: &Setup<'_>) -> Result<Box<dyn Projection>> {
    Ok(Box::new(LambertConformalConic::new(setup)?))
}

impl LambertConformalConic {
    pub fn new(setup: &Setup<'_>) -> Result<Self> {
        let lat1 = setup.lat1;
        let lat2 = setup.lat2().unwrap_or(lat1);
        if (lat1 + lat2).abs() < EPSLN {
            return Err(ProjError::InvalidParameter(
                "standard parallels of a conic projection cannot be symmetric about the equator"
                    .into(),
            ));
        }
        let e = setup.e;

        let (sin1, cos1) = lat1.sin_cos();
        let ms1 = msfn(e, sin1, cos1);
        let ts1 = tsfn(e, lat1, sin1);

        let (sin2, cos2) = lat2.sin_cos();
        let ms2 = msfn(e, sin2, cos2);
        let ts2 = tsfn(e, lat2, sin2);

        let ts0 = tsfn(e, setup.lat0, setup.lat0.sin());

        let mut ns = if (lat1 - lat2).abs() > EPSLN {
            (ms1 / ms2).ln() / (ts1 / ts2).ln()
        } else {
            sin1
        };
        if ns.is_nan() {
            ns = sin1;
        }
        let f0 = ms1 / (ns * ts1.powf(ns));
        let rh = setup.a * f0 * ts0.powf(ns);

        Ok(Self {
            a: setup.a,
            e,
            k0: setup.k0,
            long0: setup.long0,
            x0: setup.x0,
            y0: setup.y0,
            ns,
            f0,
            rh,
        })
    }
}

impl Projection for LambertConformalConic {
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        // Nudge exact poles inside the domain
        let lat = if (2.0 * lat.abs() - PI).abs() <= EPSLN {
            sign(lat) * (FRAC_PI_2 - 2.0 * EPSLN)
        } else {
            lat
        };

        let rh1 = if (lat.abs() - FRAC_PI_2).abs() > EPSLN {
            let ts = tsfn(self.e, lat, lat.sin());
            self.a * self.f0 * ts.powf(self.ns)
        } else {
            if lat * self.ns <= 0.0 {
                return None;
            }
            0.0
        };
        let theta = self.ns * adjust_lon(lon - self.long0);
        let x = self.k0 * (rh1 * theta.sin()) + self.x0;
        let y = self.k0 * (self.rh - rh1 * theta.cos()) + self.y0;
        Some((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let x = (x - self.x0) / self.k0;
        let y = self.rh - (y - self.y0) / self.k0;
        let (rh1, con) = if self.ns > 0.0 {
            ((x * x + y * y).sqrt(), 1.0)
        } else {
            (-(x * x + y * y).sqrt(), -1.0)
        };
        let theta = if rh1 != 0.0 { (con * x).atan2(con * y) } else { 0.0 };

        let lat = if rh1 != 0.0 || self.ns > 0.0 {
            let ts = (rh1 / (self.a * self.f0)).powf(1.0 / self.ns);
            phi2z(self.e, ts)?
        } else {
            -FRAC_PI_2
        };
        let lon = adjust_lon(theta / self.ns + self.long0);
        Some((lon, lat))
    }
}
