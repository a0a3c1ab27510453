//! Stereographic projections.
//!
//! `stere` covers the polar, equatorial and oblique aspects (Snyder's
//! conformal-latitude form on the ellipsoid). `sterea` is the double
//! stereographic: a Gauss conformal sphere followed by a spherical
//! stereographic, as used by the Dutch RD and Romanian Stereo 70 grids.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use super::common::{adjust_lon, asinz, hypot, msfn, phi2z, sign, srat, tsfn, EPSLN};
use super::registry::ProjectionDefinition;
use super::{Projection, Setup};
use crate::error::{ProjError, Result};

pub(super) const DEFINITIONS: &[ProjectionDefinition] = &[
    ProjectionDefinition {
        names: &[
            "stere",
            "Stereographic_South_Pole",
            "Polar_Stereographic",
            "Polar Stereographic (variant A)",
            "Polar Stereographic (variant B)",
        ],
        init: init_stere,
    },
    ProjectionDefinition {
        names: &[
            "Stereographic_North_Pole",
            "Oblique_Stereographic",
            "Oblique Stereographic",
            "Double_Stereographic",
            "Oblique Stereographic Alternative",
            "sterea",
        ],
        init: init_sterea,
    },
];

fn init_stere(setup: &Setup<'_>) -> Result<Box<dyn Projection>> {
    Ok(Box::new(Stereographic::new(setup)))
}

fn init_sterea(setup: &Setup<'_>) -> Result<Box<dyn Projection>> {
    Ok(Box::new(ObliqueStereographic::new(setup)?))
}

fn ssfn(phit: f64, sinphi: f64, eccen: f64) -> f64 {
    let sinphi = sinphi * eccen;
    (0.5 * (FRAC_PI_2 + phit)).tan() * ((1.0 - sinphi) / (1.0 + sinphi)).powf(0.5 * eccen)
}

pub struct Stereographic {
    a: f64,
    e: f64,
    sphere: bool,
    k0: f64,
    lat0: f64,
    long0: f64,
    x0: f64,
    y0: f64,
    sinlat0: f64,
    coslat0: f64,
    /// +1 north pole aspect, -1 south
    con: f64,
    cons: f64,
    ms1: f64,
    x_0: f64,
    sin_x0: f64,
    cos_x0: f64,
}

impl Stereographic {
    pub fn new(setup: &Setup<'_>) -> Self {
        let e = setup.e;
        let lat0 = setup.lat0;
        let (sinlat0, coslat0) = lat0.sin_cos();
        let polar = coslat0.abs() <= EPSLN;
        let sphere = setup.sphere;
        let con = if lat0 > 0.0 { 1.0 } else { -1.0 };
        let cons = ((1.0 + e).powf(1.0 + e) * (1.0 - e).powf(1.0 - e)).sqrt();

        // Polar aspect with a true-scale latitude: derive k0 from lat_ts
        let mut k0 = setup.k0;
        if let Some(lat_ts) = setup.lat_ts().filter(|l| l.is_finite()) {
            if k0 == 1.0 && polar {
                if sphere {
                    k0 = 0.5 * (1.0 + sign(lat0) * lat_ts.sin());
                } else if lat_ts.cos().abs() > EPSLN {
                    k0 = 0.5 * cons * msfn(e, lat_ts.sin(), lat_ts.cos())
                        / tsfn(e, con * lat_ts, con * lat_ts.sin());
                }
            }
        }

        let ms1 = msfn(e, sinlat0, coslat0);
        let x_0 = 2.0 * ssfn(lat0, sinlat0, e).atan() - FRAC_PI_2;
        let (sin_x0, cos_x0) = x_0.sin_cos();

        Self {
            a: setup.a,
            e,
            sphere,
            k0,
            lat0,
            long0: setup.long0,
            x0: setup.x0,
            y0: setup.y0,
            sinlat0,
            coslat0,
            con,
            cons,
            ms1,
            x_0,
            sin_x0,
            cos_x0,
        }
    }
}

impl Projection for Stereographic {
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        let (sinlat, coslat) = lat.sin_cos();
        let dlon = adjust_lon(lon - self.long0);

        // Antipode of the origin
        if ((lon - self.long0).abs() - PI).abs() <= EPSLN && (lat + self.lat0).abs() <= EPSLN {
            return None;
        }

        if self.sphere {
            let a = 2.0 * self.k0
                / (1.0 + self.sinlat0 * sinlat + self.coslat0 * coslat * dlon.cos());
            let x = self.a * a * coslat * dlon.sin() + self.x0;
            let y = self.a * a * (self.coslat0 * sinlat - self.sinlat0 * coslat * dlon.cos())
                + self.y0;
            return Some((x, y));
        }

        let chi = 2.0 * ssfn(lat, sinlat, self.e).atan() - FRAC_PI_2;
        let (sin_chi, cos_chi) = chi.sin_cos();

        if self.coslat0.abs() <= EPSLN {
            let ts = tsfn(self.e, lat * self.con, self.con * sinlat);
            let rh = 2.0 * self.a * self.k0 * ts / self.cons;
            let x = self.x0 + rh * dlon.sin();
            let y = self.y0 - self.con * rh * dlon.cos();
            return Some((x, y));
        }

        let (a, y) = if self.sinlat0.abs() < EPSLN {
            let a = 2.0 * self.a * self.k0 / (1.0 + cos_chi * dlon.cos());
            (a, a * sin_chi)
        } else {
            let a = 2.0 * self.a * self.k0 * self.ms1
                / (self.cos_x0
                    * (1.0 + self.sin_x0 * sin_chi + self.cos_x0 * cos_chi * dlon.cos()));
            (a, a * (self.cos_x0 * sin_chi - self.sin_x0 * cos_chi * dlon.cos()))
        };
        let x = a * cos_chi * dlon.sin() + self.x0;
        Some((x, y + self.y0))
    }

    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let x = x - self.x0;
        let y = y - self.y0;
        let rh = (x * x + y * y).sqrt();

        if self.sphere {
            if rh <= EPSLN {
                return Some((self.long0, self.lat0));
            }
            let c = 2.0 * (rh / (2.0 * self.a * self.k0)).atan();
            let (sin_c, cos_c) = c.sin_cos();
            let lat = asinz(cos_c * self.sinlat0 + y * sin_c * self.coslat0 / rh);
            let lon = if self.coslat0.abs() < EPSLN {
                if self.lat0 > 0.0 {
                    adjust_lon(self.long0 + x.atan2(-y))
                } else {
                    adjust_lon(self.long0 + x.atan2(y))
                }
            } else {
                adjust_lon(
                    self.long0
                        + (x * sin_c).atan2(rh * self.coslat0 * cos_c - y * self.sinlat0 * sin_c),
                )
            };
            return Some((lon, lat));
        }

        if self.coslat0.abs() <= EPSLN {
            if rh <= EPSLN {
                return Some((self.long0, self.lat0));
            }
            let (x, y) = (x * self.con, y * self.con);
            let ts = rh * self.cons / (2.0 * self.a * self.k0);
            let lat = self.con * phi2z(self.e, ts)?;
            let lon = self.con * adjust_lon(self.con * self.long0 + x.atan2(-y));
            return Some((lon, lat));
        }

        let ce = 2.0 * (rh * self.cos_x0 / (2.0 * self.a * self.k0 * self.ms1)).atan();
        let (chi, lon) = if rh <= EPSLN {
            (self.x_0, self.long0)
        } else {
            let (sin_ce, cos_ce) = ce.sin_cos();
            let chi = asinz(cos_ce * self.sin_x0 + y * sin_ce * self.cos_x0 / rh);
            let lon = adjust_lon(
                self.long0
                    + (x * sin_ce).atan2(rh * self.cos_x0 * cos_ce - y * self.sin_x0 * sin_ce),
            );
            (chi, lon)
        };
        let lat = -phi2z(self.e, (0.5 * (FRAC_PI_2 + chi)).tan())?;
        Some((lon, lat))
    }
}

/// Conformal mapping of the ellipsoid onto the Gauss sphere.
struct GaussSphere {
    c: f64,
    phic0: f64,
    ratexp: f64,
    k: f64,
    rc: f64,
    e: f64,
}

impl GaussSphere {
    fn new(es: f64, e: f64, lat0: f64) -> Self {
        let sphi = lat0.sin();
        let cphi = lat0.cos().powi(2);
        let rc = (1.0 - es).sqrt() / (1.0 - es * sphi * sphi);
        let c = (1.0 + es * cphi * cphi / (1.0 - es)).sqrt();
        let phic0 = asinz(sphi / c);
        let ratexp = 0.5 * c * e;
        let k = (0.5 * phic0 + FRAC_PI_4).tan()
            / ((0.5 * lat0 + FRAC_PI_4).tan().powf(c) * srat(e * sphi, ratexp));
        Self { c, phic0, ratexp, k, rc, e }
    }

    fn forward(&self, lon: f64, lat: f64) -> (f64, f64) {
        let lat = 2.0
            * (self.k * (0.5 * lat + FRAC_PI_4).tan().powf(self.c) * srat(self.e * lat.sin(), self.ratexp))
                .atan()
            - FRAC_PI_2;
        (self.c * lon, lat)
    }

    fn inverse(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        const DEL_TOL: f64 = 1e-14;
        let lon = lon / self.c;
        let num = ((0.5 * lat + FRAC_PI_4).tan() / self.k).powf(1.0 / self.c);
        let mut prev = lat;
        for _ in 0..20 {
            let lat = 2.0 * (num * srat(self.e * prev.sin(), -0.5 * self.e)).atan() - FRAC_PI_2;
            if (lat - prev).abs() < DEL_TOL {
                return Some((lon, lat));
            }
            prev = lat;
        }
        None
    }
}

pub struct ObliqueStereographic {
    gauss: GaussSphere,
    a: f64,
    k0: f64,
    long0: f64,
    x0: f64,
    y0: f64,
    sinc0: f64,
    cosc0: f64,
    r2: f64,
}

impl ObliqueStereographic {
    pub fn new(setup: &Setup<'_>) -> Result<Self> {
        let gauss = GaussSphere::new(setup.es, setup.e, setup.lat0);
        if !(gauss.rc > 0.0) || !gauss.rc.is_finite() {
            return Err(ProjError::InvalidParameter(
                "cannot build the conformal sphere for sterea".into(),
            ));
        }
        let (sinc0, cosc0) = gauss.phic0.sin_cos();
        let r2 = 2.0 * gauss.rc;
        Ok(Self {
            gauss,
            a: setup.a,
            k0: setup.k0,
            long0: setup.long0,
            x0: setup.x0,
            y0: setup.y0,
            sinc0,
            cosc0,
            r2,
        })
    }
}

impl Projection for ObliqueStereographic {
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        let (lon, lat) = self.gauss.forward(adjust_lon(lon - self.long0), lat);
        let (sinc, cosc) = lat.sin_cos();
        let cosl = lon.cos();
        let k = self.k0 * self.r2 / (1.0 + self.sinc0 * sinc + self.cosc0 * cosc * cosl);
        let x = k * cosc * lon.sin();
        let y = k * (self.cosc0 * sinc - self.sinc0 * cosc * cosl);
        Some((self.a * x + self.x0, self.a * y + self.y0))
    }

    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let x = (x - self.x0) / self.a / self.k0;
        let y = (y - self.y0) / self.a / self.k0;
        let rho = hypot(x, y);
        let (lon, lat) = if rho != 0.0 {
            let c = 2.0 * rho.atan2(self.r2);
            let (sinc, cosc) = c.sin_cos();
            let lat = asinz(cosc * self.sinc0 + y * sinc * self.cosc0 / rho);
            let lon = (x * sinc).atan2(rho * self.cosc0 * cosc - y * self.sinc0 * sinc);
            (lon, lat)
        } else {
            (0.0, self.gauss.phic0)
        };
        let (lon, lat) = self.gauss.inverse(lon, lat)?;
        Some((adjust_lon(lon + self.long0), lat))
    }
}
