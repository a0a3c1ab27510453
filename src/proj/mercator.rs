//! Mercator projection, ellipsoidal and spherical.
//!
//!   forward: x = a·k₀·(λ - λ₀), y = -a·k₀·ln(tsfn(φ, e))
//!   inverse: λ = λ₀ + x/(a·k₀), φ = phi2z(e, exp(-y/(a·k₀)))
//!
//! Web Mercator (EPSG:3857) is this projection on a sphere of radius 6378137.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use super::common::{adjust_lon, msfn, phi2z, tsfn, EPSLN};
use super::registry::ProjectionDefinition;
use super::{Projection, Setup};
use crate::error::Result;

pub(super) const DEFINITIONS: &[ProjectionDefinition] = &[ProjectionDefinition {
    names: &[
        "Mercator",
        "Popular Visualisation Pseudo Mercator",
        "Mercator_1SP",
        "Mercator_2SP",
        "Mercator (variant B)",
        "Mercator_Auxiliary_Sphere",
        "Mercator_Variant_A",
        "Pseudo-Mercator",
        "merc",
    ],
    init,
}];

pub struct Mercator {
    a: f64,
    e: f64,
    sphere: bool,
    long0: f64,
    k0: f64,
    x0: f64,
    y0: f64,
}

fn init(setup: &Setup<'_>) -> Result<Box<dyn Projection>> {
    Ok(Box::new(Mercator::new(setup)))
}

impl Mercator {
    pub fn new(setup: &Setup<'_>) -> Self {
        let con = setup.b / setup.a;
        let es = 1.0 - con * con;
        let e = es.sqrt();
        let sphere = setup.sphere || setup.params.sphere;

        // Scale factor from the standard parallel when one is given
        let k0 = match setup.lat_ts() {
            Some(lat_ts) if lat_ts != 0.0 => {
                if sphere {
                    lat_ts.cos()
                } else {
                    msfn(e, lat_ts.sin(), lat_ts.cos())
                }
            }
            _ => setup.k0,
        };

        Self {
            a: setup.a,
            e,
            sphere,
            long0: setup.long0,
            k0,
            x0: setup.x0,
            y0: setup.y0,
        }
    }
}

impl Projection for Mercator {
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        if (lat.abs() - FRAC_PI_2).abs() <= EPSLN {
            return None;
        }
        let x = self.x0 + self.a * self.k0 * adjust_lon(lon - self.long0);
        let y = if self.sphere {
            self.y0 + self.a * self.k0 * (FRAC_PI_4 + 0.5 * lat).tan().ln()
        } else {
            let ts = tsfn(self.e, lat, lat.sin());
            self.y0 - self.a * self.k0 * ts.ln()
        };
        Some((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let x = x - self.x0;
        let y = y - self.y0;
        let lat = if self.sphere {
            FRAC_PI_2 - 2.0 * (-y / (self.a * self.k0)).exp().atan()
        } else {
            let ts = (-y / (self.a * self.k0)).exp();
            phi2z(self.e, ts)?
        };
        let lon = adjust_lon(self.long0 + x / (self.a * self.k0));
        Some((lon, lat))
    }
}
