//! Albers Equal Area Conic projection.

use super::common::{adjust_lon, asinz, msfn, qsfn, EPSLN};
use super::registry::ProjectionDefinition;
use super::{Projection, Setup};
use crate::error::{ProjError, Result};

pub(super) const DEFINITIONS: &[ProjectionDefinition] = &[ProjectionDefinition {
    names: &[
        "Albers_Conic_Equal_Area",
        "Albers_Equal_Area",
        "Albers Equal Area",
        "Albers",
        "aea",
    ],
    init,
}];

pub struct AlbersEqualArea {
    a: f64,
    e: f64,
    sphere: bool,
    long0: f64,
    x0: f64,
    y0: f64,
    ns0: f64,
    c: f64,
    rh: f64,
}

fn init(setup: &Setup<'_>) -> Result<Box<dyn Projection>> {
    Ok(Box::new(AlbersEqualArea::new(setup)?))
}

impl AlbersEqualArea {
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
        let qs1 = qsfn(e, sin1);

        let (sin2, cos2) = lat2.sin_cos();
        let ms2 = msfn(e, sin2, cos2);
        let qs2 = qsfn(e, sin2);

        let qs0 = qsfn(e, setup.lat0.sin());

        let ns0 = if (lat1 - lat2).abs() > EPSLN {
            (ms1 * ms1 - ms2 * ms2) / (qs2 - qs1)
        } else {
            sin1
        };
        let c = ms1 * ms1 + ns0 * qs1;
        let rh = setup.a * (c - ns0 * qs0).sqrt() / ns0;

        Ok(Self {
            a: setup.a,
            e,
            sphere: setup.sphere,
            long0: setup.long0,
            x0: setup.x0,
            y0: setup.y0,
            ns0,
            c,
            rh,
        })
    }
}

impl Projection for AlbersEqualArea {
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        let qs = qsfn(self.e, lat.sin());
        let rh1 = self.a * (self.c - self.ns0 * qs).sqrt() / self.ns0;
        let theta = self.ns0 * adjust_lon(lon - self.long0);
        let x = rh1 * theta.sin() + self.x0;
        let y = self.rh - rh1 * theta.cos() + self.y0;
        Some((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let x = x - self.x0;
        let y = self.rh - y + self.y0;
        let (rh1, con) = if self.ns0 >= 0.0 {
            ((x * x + y * y).sqrt(), 1.0)
        } else {
            (-(x * x + y * y).sqrt(), -1.0)
        };
        let theta = if rh1 != 0.0 { (con * x).atan2(con * y) } else { 0.0 };
        let con = rh1 * self.ns0 / self.a;
        let lat = if self.sphere {
            asinz((self.c - con * con) / (2.0 * self.ns0))
        } else {
            let qs = (self.c - con * con) / self.ns0;
            phi1z(self.e, qs)?
        };
        let lon = adjust_lon(theta / self.ns0 + self.long0);
        Some((lon, lat))
    }
}

/// Latitude from the authalic `q`, by Newton iteration.
fn phi1z(eccent: f64, qs: f64) -> Option<f64> {
    let mut phi = asinz(0.5 * qs);
    if eccent < EPSLN {
        return Some(phi);
    }
    let eccnts = eccent * eccent;
    for _ in 0..25 {
        let (sinphi, cosphi) = phi.sin_cos();
        let con = eccent * sinphi;
        let com = 1.0 - con * con;
        let dphi = 0.5 * com * com / cosphi
            * (qs / (1.0 - eccnts) - sinphi / com + 0.5 / eccent * ((1.0 - con) / (1.0 + con)).ln());
        phi += dphi;
        if dphi.abs() <= 1e-7 {
            return Some(phi);
        }
    }
    None
}
