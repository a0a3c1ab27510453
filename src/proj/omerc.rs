//! Hotine Oblique Mercator, variants A and B.
//!
//! The central line is given either by an azimuth (`alpha`) and/or a
//! rectified grid angle through `longc`, or by two points (`lat1/long1`,
//! `lat2/long2`). Variant A measures false easting/northing from the natural
//! origin (`u_0 = 0`); variant B from the projection centre.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use super::common::{adjust_lon, phi2z, tsfn, EPSLN, TWO_PI};
use super::registry::ProjectionDefinition;
use super::{Projection, Setup};
use crate::error::{ProjError, Result};
use crate::names::projection_key;

pub(super) const DEFINITIONS: &[ProjectionDefinition] = &[ProjectionDefinition {
    names: &[
        "Hotine_Oblique_Mercator",
        "Hotine Oblique Mercator",
        "Hotine_Oblique_Mercator_variant_A",
        "Hotine_Oblique_Mercator_Variant_B",
        "Hotine_Oblique_Mercator_Azimuth_Natural_Origin",
        "Hotine_Oblique_Mercator_Two_Point_Natural_Origin",
        "Hotine_Oblique_Mercator_Azimuth_Center",
        "Oblique_Mercator",
        "omerc",
    ],
    init,
}];

const TOL: f64 = 1e-7;

/// Names whose offsets are measured from the natural origin.
const VARIANT_A: &[&str] = &[
    "Hotine_Oblique_Mercator",
    "Hotine_Oblique_Mercator_variant_A",
    "Hotine_Oblique_Mercator_Azimuth_Natural_Origin",
];

fn init(setup: &Setup<'_>) -> Result<Box<dyn Projection>> {
    Ok(Box::new(ObliqueMercator::new(setup)?))
}

fn is_variant_a(setup: &Setup<'_>) -> bool {
    let params = setup.params;
    if params.has("no_uoff") || params.has("no_off") {
        return true;
    }
    params.proj_name.as_deref().map_or(false, |name| {
        let key = projection_key(name);
        VARIANT_A.iter().any(|a| projection_key(a) == key)
    })
}

pub struct ObliqueMercator {
    a: f64,
    e: f64,
    x0: f64,
    y0: f64,
    lam0: f64,
    big_a: f64,
    big_b: f64,
    big_e: f64,
    singam: f64,
    cosgam: f64,
    sinrot: f64,
    cosrot: f64,
    r_b: f64,
    ar_b: f64,
    br_a: f64,
    u_0: f64,
    v_pole_n: f64,
    v_pole_s: f64,
    no_rot: bool,
}

impl ObliqueMercator {
    pub fn new(setup: &Setup<'_>) -> Result<Self> {
        let params = setup.params;
        let (es, e, k0, lat0) = (setup.es, setup.e, setup.k0, setup.lat0);
        let no_off = is_variant_a(setup);
        let no_rot = params.has("no_rot");

        let by_angle = params.alpha.is_some() || params.rectified_grid_angle.is_some();
        let mut alpha_c = params.alpha.unwrap_or(0.0);
        let mut gamma = params.rectified_grid_angle.unwrap_or(0.0);

        let (lam1, phi1, mut lam2, phi2) = if by_angle {
            (0.0, 0.0, 0.0, 0.0)
        } else {
            let lam1 = params.long1.unwrap_or(0.0);
            let phi1 = params.lat1.unwrap_or(0.0);
            let lam2 = params.long2.unwrap_or(0.0);
            let phi2 = params.lat2.unwrap_or(0.0);
            let con = phi1.abs();
            if (phi1 - phi2).abs() <= TOL
                || con <= TOL
                || (con - FRAC_PI_2).abs() <= TOL
                || (lat0.abs() - FRAC_PI_2).abs() <= TOL
                || (phi2.abs() - FRAC_PI_2).abs() <= TOL
            {
                return Err(ProjError::InvalidParameter(
                    "omerc: invalid two-point central line".into(),
                ));
            }
            (lam1, phi1, lam2, phi2)
        };

        let one_es = 1.0 - es;
        let com = one_es.sqrt();
        let (big_a, big_b, big_e, d, mut f);
        if lat0.abs() > EPSLN {
            let (sinph0, cosph0) = lat0.sin_cos();
            let con = 1.0 - es * sinph0 * sinph0;
            let b = cosph0 * cosph0;
            big_b = (1.0 + es * b * b / one_es).sqrt();
            big_a = big_b * k0 * com / con;
            d = big_b * com / (cosph0 * con.sqrt());
            f = d * d - 1.0;
            if f <= 0.0 {
                f = 0.0;
            } else {
                f = f.sqrt();
                if lat0 < 0.0 {
                    f = -f;
                }
            }
            f += d;
            big_e = f * tsfn(e, lat0, sinph0).powf(big_b);
        } else {
            big_b = 1.0 / com;
            big_a = k0;
            d = 1.0;
            f = 1.0;
            big_e = 1.0;
        }

        let gamma0;
        let lam0;
        if by_angle {
            if params.alpha.is_some() {
                gamma0 = (alpha_c.sin() / d).asin();
                if params.rectified_grid_angle.is_none() {
                    gamma = alpha_c;
                }
            } else {
                gamma0 = gamma;
                alpha_c = (d * gamma0.sin()).asin();
            }
            let lamc = params.longc.unwrap_or(setup.long0);
            lam0 = lamc - (0.5 * (f - 1.0 / f) * gamma0.tan()).asin() / big_b;
        } else {
            let h = tsfn(e, phi1, phi1.sin()).powf(big_b);
            let l = tsfn(e, phi2, phi2.sin()).powf(big_b);
            let f = big_e / h;
            let p = (l - h) / (l + h);
            let j = big_e * big_e;
            let j = (j - l * h) / (j + l * h);
            let con = lam1 - lam2;
            if con < -PI {
                lam2 -= TWO_PI;
            } else if con > PI {
                lam2 += TWO_PI;
            }
            lam0 = adjust_lon(
                0.5 * (lam1 + lam2) - (j * (0.5 * big_b * (lam1 - lam2)).tan() / p).atan() / big_b,
            );
            gamma0 = (2.0 * (big_b * adjust_lon(lam1 - lam0)).sin() / (f - 1.0 / f)).atan();
            alpha_c = (d * gamma0.sin()).asin();
            gamma = alpha_c;
        }

        let r_b = 1.0 / big_b;
        let ar_b = big_a * r_b;
        let u_0 = if no_off {
            0.0
        } else {
            let u = (ar_b * ((d * d - 1.0).sqrt() / alpha_c.cos()).atan()).abs();
            if lat0 < 0.0 {
                -u
            } else {
                u
            }
        };
        let half = 0.5 * gamma0;

        Ok(Self {
            a: setup.a,
            e,
            x0: setup.x0,
            y0: setup.y0,
            lam0,
            big_a,
            big_b,
            big_e,
            singam: gamma0.sin(),
            cosgam: gamma0.cos(),
            sinrot: gamma.sin(),
            cosrot: gamma.cos(),
            r_b,
            ar_b,
            br_a: 1.0 / ar_b,
            u_0,
            v_pole_n: ar_b * (FRAC_PI_4 - half).tan().ln(),
            v_pole_s: ar_b * (FRAC_PI_4 + half).tan().ln(),
            no_rot,
        })
    }
}

impl Projection for ObliqueMercator {
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        let lon = adjust_lon(lon - self.lam0);
        let (u, v) = if (lat.abs() - FRAC_PI_2).abs() > EPSLN {
            let w = self.big_e / tsfn(self.e, lat, lat.sin()).powf(self.big_b);
            let temp = 1.0 / w;
            let s = 0.5 * (w - temp);
            let t = 0.5 * (w + temp);
            let vv = (self.big_b * lon).sin();
            let uu = (s * self.singam - vv * self.cosgam) / t;
            if (uu.abs() - 1.0).abs() < EPSLN {
                return None;
            }
            let v = 0.5 * self.ar_b * ((1.0 - uu) / (1.0 + uu)).ln();
            let temp = (self.big_b * lon).cos();
            let u = if temp.abs() < TOL {
                self.big_a * lon
            } else {
                self.ar_b * (s * self.cosgam + vv * self.singam).atan2(temp)
            };
            (u, v)
        } else {
            let v = if lat > 0.0 { self.v_pole_n } else { self.v_pole_s };
            (self.ar_b * lat, v)
        };

        let (x, y) = if self.no_rot {
            (u, v)
        } else {
            let u = u - self.u_0;
            (v * self.cosrot + u * self.sinrot, u * self.cosrot - v * self.sinrot)
        };
        Some((self.a * x + self.x0, self.a * y + self.y0))
    }

    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let x = (x - self.x0) / self.a;
        let y = (y - self.y0) / self.a;
        let (u, v) = if self.no_rot {
            (x, y)
        } else {
            (
                y * self.cosrot + x * self.sinrot + self.u_0,
                x * self.cosrot - y * self.sinrot,
            )
        };

        let qp = (-self.br_a * v).exp();
        let sp = 0.5 * (qp - 1.0 / qp);
        let tp = 0.5 * (qp + 1.0 / qp);
        let vp = (self.br_a * u).sin();
        let up = (vp * self.cosgam + sp * self.singam) / tp;

        if (up.abs() - 1.0).abs() < EPSLN {
            let lat = if up < 0.0 { -FRAC_PI_2 } else { FRAC_PI_2 };
            return Some((adjust_lon(self.lam0), lat));
        }
        let t = self.big_e / ((1.0 + up) / (1.0 - up)).sqrt();
        let lat = phi2z(self.e, t.powf(1.0 / self.big_b))?;
        if !lat.is_finite() {
            return None;
        }
        let lon = -self.r_b * (sp * self.cosgam - vp * self.singam).atan2((self.br_a * u).cos());
        Some((adjust_lon(lon + self.lam0), lat))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proj::testing::{assert_roundtrip, Fixture};
    use approx::assert_relative_eq;

    fn rso_borneo(variant: &str) -> Box<dyn Projection> {
        // Timbalai 1948 / RSO Borneo style parameters
        let mut fx = Fixture::new("evrstSS");
        fx.params.proj_name = Some(variant.to_string());
        fx.params.lat0 = Some(4.0_f64.to_radians());
        fx.params.longc = Some(115.0_f64.to_radians());
        fx.params.alpha = Some(53.315_820_805_555_55_f64.to_radians());
        fx.params.rectified_grid_angle = Some(53.130_102_361_111_11_f64.to_radians());
        fx.params.k0 = Some(0.999_84);
        fx.params.x0 = Some(590_476.87);
        fx.params.y0 = Some(442_857.65);
        fx.build(variant)
    }

    #[test]
    fn test_variant_b_centre_maps_to_false_origin() {
        let proj = rso_borneo("Hotine_Oblique_Mercator_Azimuth_Center");
        let (x, y) = proj.forward(115.0_f64.to_radians(), 4.0_f64.to_radians()).unwrap();
        assert_relative_eq!(x, 590_476.87, epsilon = 1e-2);
        assert_relative_eq!(y, 442_857.65, epsilon = 1e-2);
    }

    #[test]
    fn test_variants_roundtrip() {
        for variant in ["Hotine_Oblique_Mercator_Azimuth_Center", "Hotine_Oblique_Mercator"] {
            let proj = rso_borneo(variant);
            assert_roundtrip(
                proj.as_ref(),
                &[(115.0, 4.0), (116.5, 6.0), (113.0, 2.0), (118.0, 7.0)],
                1e-9,
            );
        }
    }

    #[test]
    fn test_variant_a_detection() {
        let mut fx = Fixture::new("WGS84");
        assert!(!is_variant_a(&fx.setup()));
        fx.params.extra.insert("no_uoff".into(), String::new());
        assert!(is_variant_a(&fx.setup()));
    }

    #[test]
    fn test_two_point_roundtrip() {
        let mut fx = Fixture::new("WGS84");
        fx.params.lat0 = Some(40.0_f64.to_radians());
        fx.params.lat1 = Some(35.0_f64.to_radians());
        fx.params.long1 = Some((-100.0_f64).to_radians());
        fx.params.lat2 = Some(45.0_f64.to_radians());
        fx.params.long2 = Some((-80.0_f64).to_radians());
        let proj = fx.build("omerc");
        assert_roundtrip(proj.as_ref(), &[(-90.0, 40.0), (-95.0, 38.0), (-85.0, 43.0)], 1e-9);
    }

    #[test]
    fn test_degenerate_two_point_rejected() {
        let mut fx = Fixture::new("WGS84");
        fx.params.lat1 = Some(35.0_f64.to_radians());
        fx.params.lat2 = Some(35.0_f64.to_radians());
        assert!(crate::proj::init_projection("omerc", &fx.setup()).is_err());
    }
}
