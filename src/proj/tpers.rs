//! Tilted perspective (spherical): the view from height `h`, with the camera
//! tilted by `tilt` towards azimuth `azi`.

use std::f64::consts::FRAC_PI_2;

use super::common::{adjust_lon, hypot, EPSLN};
use super::registry::ProjectionDefinition;
use super::{Projection, Setup};
use crate::error::{ProjError, Result};

pub(super) const DEFINITIONS: &[ProjectionDefinition] = &[ProjectionDefinition {
    names: &["Tilted_Perspective", "tpers"],
    init,
}];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Aspect {
    NorthPole,
    SouthPole,
    Equatorial,
    Oblique,
}

pub struct TiltedPerspective {
    a: f64,
    lat0: f64,
    long0: f64,
    x0: f64,
    y0: f64,
    mode: Aspect,
    sinph0: f64,
    cosph0: f64,
    p: f64,
    rp: f64,
    pn1: f64,
    h1: f64,
    pfact: f64,
    cg: f64,
    sg: f64,
    cw: f64,
    sw: f64,
}

fn init(setup: &Setup<'_>) -> Result<Box<dyn Projection>> {
    let params = setup.params;
    let lat0 = setup.lat0;
    let mode = if lat0 >= FRAC_PI_2 - EPSLN {
        Aspect::NorthPole
    } else if lat0 <= -(FRAC_PI_2 - EPSLN) {
        Aspect::SouthPole
    } else if lat0.abs() < EPSLN {
        Aspect::Equatorial
    } else {
        Aspect::Oblique
    };

    let h = params
        .extra_f64("h")
        .ok_or_else(|| ProjError::MissingParameter("tpers requires h".into()))?;
    let pn1 = h / setup.a;
    if pn1 <= 0.0 || pn1 > 1e10 {
        return Err(ProjError::InvalidParameter(format!("invalid height {h}")));
    }
    let p = 1.0 + pn1;
    let h1 = 1.0 / pn1;
    let omega = params.extra_angle("tilt").unwrap_or(0.0);
    let gamma = params.extra_angle("azi").unwrap_or(0.0);

    Ok(Box::new(TiltedPerspective {
        a: setup.a,
        lat0,
        long0: setup.long0,
        x0: setup.x0,
        y0: setup.y0,
        mode,
        sinph0: lat0.sin(),
        cosph0: lat0.cos(),
        p,
        rp: 1.0 / p,
        pn1,
        h1,
        pfact: (p + 1.0) * h1,
        cg: gamma.cos(),
        sg: gamma.sin(),
        cw: omega.cos(),
        sw: omega.sin(),
    }))
}

impl Projection for TiltedPerspective {
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        let lam = adjust_lon(lon - self.long0);
        let (sinphi, cosphi) = lat.sin_cos();
        let coslam = lam.cos();

        let cosz = match self.mode {
            Aspect::Oblique => self.sinph0 * sinphi + self.cosph0 * cosphi * coslam,
            Aspect::Equatorial => cosphi * coslam,
            Aspect::SouthPole => -sinphi,
            Aspect::NorthPole => sinphi,
        };
        // beyond the horizon
        if cosz < self.rp {
            return None;
        }

        let k = self.pn1 / (self.p - cosz);
        let x = k * cosphi * lam.sin();
        let y = k * match self.mode {
            Aspect::Oblique => self.cosph0 * sinphi - self.sinph0 * cosphi * coslam,
            Aspect::Equatorial => sinphi,
            Aspect::NorthPole => -(cosphi * coslam),
            Aspect::SouthPole => cosphi * coslam,
        };

        let yt = y * self.cg + x * self.sg;
        let ba = 1.0 / (yt * self.sw * self.h1 + self.cw);
        let x = (x * self.cg - y * self.sg) * self.cw * ba;
        let y = yt * ba;
        Some((x * self.a + self.x0, y * self.a + self.y0))
    }

    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let x = (x - self.x0) / self.a;
        let y = (y - self.y0) / self.a;

        // undo the tilt
        let yt = 1.0 / (self.pn1 - y * self.sw);
        let bm = self.pn1 * x * yt;
        let bq = self.pn1 * y * self.cw * yt;
        let mut x = bm * self.cg + bq * self.sg;
        let mut y = bq * self.cg - bm * self.sg;

        let rh = hypot(x, y);
        if rh.abs() < EPSLN {
            return Some((self.long0, self.lat0));
        }

        let disc = 1.0 - rh * rh * self.pfact;
        if disc < 0.0 {
            return None;
        }
        let sinz = (self.p - disc.sqrt()) / (self.pn1 / rh + rh / self.pn1);
        let cosz = (1.0 - sinz * sinz).sqrt();

        let phi = match self.mode {
            Aspect::Oblique => {
                let phi = (cosz * self.sinph0 + y * sinz * self.cosph0 / rh).clamp(-1.0, 1.0).asin();
                y = (cosz - self.sinph0 * phi.sin()) * rh;
                x *= sinz * self.cosph0;
                phi
            }
            Aspect::Equatorial => {
                let phi = (y * sinz / rh).clamp(-1.0, 1.0).asin();
                y = cosz * rh;
                x *= sinz;
                phi
            }
            Aspect::NorthPole => {
                y = -y;
                cosz.asin()
            }
            Aspect::SouthPole => -cosz.asin(),
        };
        Some((adjust_lon(x.atan2(y) + self.long0), phi))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proj::testing::{assert_roundtrip, Fixture};
    use approx::assert_relative_eq;

    fn camera(lat0: f64, tilt: &str, azi: &str) -> Box<dyn Projection> {
        let mut fx = Fixture::sphere(6_370_997.0);
        fx.params.lat0 = Some(lat0.to_radians());
        fx.params.long0 = Some((-100.0_f64).to_radians());
        fx.params.extra.insert("h".into(), "5500000".into());
        fx.params.extra.insert("tilt".into(), tilt.into());
        fx.params.extra.insert("azi".into(), azi.into());
        fx.build("tpers")
    }

    #[test]
    fn test_centre_maps_to_origin() {
        let proj = camera(40.0, "10", "20");
        let (x, y) = proj.forward((-100.0_f64).to_radians(), 40.0_f64.to_radians()).unwrap();
        assert_relative_eq!(x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_roundtrip_all_aspects() {
        let samples = [(-95.0, 42.0), (-110.0, 35.0), (-100.0, 50.0)];
        assert_roundtrip(camera(40.0, "10", "20").as_ref(), &samples, 1e-9);
        assert_roundtrip(camera(40.0, "0", "0").as_ref(), &samples, 1e-9);
        assert_roundtrip(camera(0.0, "5", "0").as_ref(), &[(-95.0, 10.0), (-110.0, -15.0)], 1e-9);
        assert_roundtrip(camera(90.0, "0", "0").as_ref(), &[(-95.0, 70.0), (80.0, 60.0)], 1e-9);
    }

    #[test]
    fn test_beyond_horizon() {
        let proj = camera(40.0, "0", "0");
        assert!(proj.forward(80.0_f64.to_radians(), (-40.0_f64).to_radians()).is_none());
    }
}
