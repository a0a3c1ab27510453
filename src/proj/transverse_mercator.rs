//! Transverse Mercator projection and its UTM wrapper.
//!
//! The default implementation uses the Poder/Engsager extended series
//! (6th order in the third flattening n), accurate to a few mm out to ±3500 km
//! from the central meridian. `+approx` (or the `Fast_Transverse_Mercator`
//! name) selects the classic Snyder power series instead, which also covers the
//! spherical case.

use super::common::{
    adjust_lon, asinhy, asinz, clens, clens_cmplx, gatg, hypot, pj_enfn, pj_inv_mlfn, pj_mlfn,
    sign, D2R, EPSLN,
};
use super::registry::ProjectionDefinition;
use super::{Projection, Setup};
use crate::error::{ProjError, Result};
use std::f64::consts::FRAC_PI_2;

pub(super) const DEFINITIONS: &[ProjectionDefinition] = &[
    ProjectionDefinition {
        names: &["Fast_Transverse_Mercator", "Fast Transverse Mercator"],
        init: init_fast,
    },
    ProjectionDefinition {
        names: &[
            "Extended_Transverse_Mercator",
            "Extended Transverse Mercator",
            "etmerc",
            "Transverse_Mercator",
            "Transverse Mercator",
            "Gauss Kruger",
            "Gauss_Kruger",
            "tmerc",
        ],
        init: init_extended,
    },
    ProjectionDefinition {
        names: &["Universal Transverse Mercator System", "utm"],
        init: init_utm,
    },
];

/// Beyond this normalized easting the extended series diverges.
const MAX_CE: f64 = 2.623_395_162_778;

fn init_fast(setup: &Setup<'_>) -> Result<Box<dyn Projection>> {
    Ok(Box::new(FastTransverseMercator::new(setup)))
}

fn init_extended(setup: &Setup<'_>) -> Result<Box<dyn Projection>> {
    if setup.params.approx {
        return init_fast(setup);
    }
    Ok(Box::new(TransverseMercator::new(setup)?))
}

fn init_utm(setup: &Setup<'_>) -> Result<Box<dyn Projection>> {
    let zone = utm_zone(setup.params.zone, setup.long0)
        .ok_or_else(|| ProjError::MissingParameter("unknown utm zone".into()))?;
    let utm = Setup {
        lat0: 0.0,
        long0: (6.0 * f64::from(zone.abs()) - 183.0) * D2R,
        x0: 500_000.0,
        y0: if setup.params.utm_south { 10_000_000.0 } else { 0.0 },
        k0: 0.9996,
        ..setup.clone()
    };
    init_extended(&utm)
}

/// Explicit zone, or the zone containing `long0`.
fn utm_zone(zone: Option<i32>, long0: f64) -> Option<i32> {
    match zone {
        Some(0) => None,
        Some(z) => Some(z),
        None => {
            let z = ((adjust_lon(long0) + std::f64::consts::PI) * 30.0 / std::f64::consts::PI)
                .floor() as i32
                + 1;
            Some(z.clamp(1, 60))
        }
    }
}

/// Poder/Engsager extended Transverse Mercator.
pub struct TransverseMercator {
    a: f64,
    long0: f64,
    x0: f64,
    y0: f64,
    /// Gaussian -> geodetic latitude
    cgb: [f64; 6],
    /// Geodetic -> Gaussian latitude
    cbg: [f64; 6],
    /// Transverse Mercator -> geographic
    utg: [f64; 6],
    /// Geographic -> transverse Mercator
    gtu: [f64; 6],
    /// Meridian quadrant scaled to the projection
    qn: f64,
    /// Northing of the origin latitude
    zb: f64,
}

impl TransverseMercator {
    pub fn new(setup: &Setup<'_>) -> Result<Self> {
        if !(setup.es > 0.0) {
            return Err(ProjError::InvalidParameter(
                "Transverse Mercator requires an ellipsoid; use +approx or Fast_Transverse_Mercator \
                 for a sphere"
                    .into(),
            ));
        }

        let f = setup.es / (1.0 + (1.0 - setup.es).sqrt());
        let n = f / (2.0 - f);
        let mut np = n;

        let mut cgb = [0.0; 6];
        let mut cbg = [0.0; 6];
        let mut utg = [0.0; 6];
        let mut gtu = [0.0; 6];

        cgb[0] = n
            * (2.0
                + n * (-2.0 / 3.0
                    + n * (-2.0 + n * (116.0 / 45.0 + n * (26.0 / 45.0 + n * (-2854.0 / 675.0))))));
        cbg[0] = n
            * (-2.0
                + n * (2.0 / 3.0
                    + n * (4.0 / 3.0 + n * (-82.0 / 45.0 + n * (32.0 / 45.0 + n * (4642.0 / 4725.0))))));
        np *= n;
        cgb[1] = np
            * (7.0 / 3.0
                + n * (-8.0 / 5.0 + n * (-227.0 / 45.0 + n * (2704.0 / 315.0 + n * (2323.0 / 945.0)))));
        cbg[1] = np
            * (5.0 / 3.0
                + n * (-16.0 / 15.0 + n * (-13.0 / 9.0 + n * (904.0 / 315.0 + n * (-1522.0 / 945.0)))));
        np *= n;
        cgb[2] = np * (56.0 / 15.0 + n * (-136.0 / 35.0 + n * (-1262.0 / 105.0 + n * (73814.0 / 2835.0))));
        cbg[2] = np * (-26.0 / 15.0 + n * (34.0 / 21.0 + n * (8.0 / 5.0 + n * (-12686.0 / 2835.0))));
        np *= n;
        cgb[3] = np * (4279.0 / 630.0 + n * (-332.0 / 35.0 + n * (-399572.0 / 14175.0)));
        cbg[3] = np * (1237.0 / 630.0 + n * (-12.0 / 5.0 + n * (-24832.0 / 14175.0)));
        np *= n;
        cgb[4] = np * (4174.0 / 315.0 + n * (-144838.0 / 6237.0));
        cbg[4] = np * (-734.0 / 315.0 + n * (109598.0 / 31185.0));
        np *= n;
        cgb[5] = np * (601676.0 / 22275.0);
        cbg[5] = np * (444337.0 / 155925.0);

        np = n * n;
        let qn = setup.k0 / (1.0 + n) * (1.0 + np * (1.0 / 4.0 + np * (1.0 / 64.0 + np / 256.0)));

        utg[0] = n
            * (-0.5
                + n * (2.0 / 3.0
                    + n * (-37.0 / 96.0 + n * (1.0 / 360.0 + n * (81.0 / 512.0 + n * (-96199.0 / 604800.0))))));
        gtu[0] = n
            * (0.5
                + n * (-2.0 / 3.0
                    + n * (5.0 / 16.0 + n * (41.0 / 180.0 + n * (-127.0 / 288.0 + n * (7891.0 / 37800.0))))));
        utg[1] = np
            * (-1.0 / 48.0
                + n * (-1.0 / 15.0 + n * (437.0 / 1440.0 + n * (-46.0 / 105.0 + n * (1118711.0 / 3870720.0)))));
        gtu[1] = np
            * (13.0 / 48.0
                + n * (-3.0 / 5.0 + n * (557.0 / 1440.0 + n * (281.0 / 630.0 + n * (-1983433.0 / 1935360.0)))));
        np *= n;
        utg[2] = np * (-17.0 / 480.0 + n * (37.0 / 840.0 + n * (209.0 / 4480.0 + n * (-5569.0 / 90720.0))));
        gtu[2] = np * (61.0 / 240.0 + n * (-103.0 / 140.0 + n * (15061.0 / 26880.0 + n * (167603.0 / 181440.0))));
        np *= n;
        utg[3] = np * (-4397.0 / 161280.0 + n * (11.0 / 504.0 + n * (830251.0 / 7257600.0)));
        gtu[3] = np * (49561.0 / 161280.0 + n * (-179.0 / 168.0 + n * (6601661.0 / 7257600.0)));
        np *= n;
        utg[4] = np * (-4583.0 / 161280.0 + n * (108847.0 / 3991680.0));
        gtu[4] = np * (34729.0 / 80640.0 + n * (-3418889.0 / 1995840.0));
        np *= n;
        utg[5] = np * (-20648693.0 / 638668800.0);
        gtu[5] = np * (212378941.0 / 319334400.0);

        let z = gatg(&cbg, setup.lat0);
        let zb = -qn * (z + clens(&gtu, 2.0 * z));

        Ok(Self {
            a: setup.a,
            long0: setup.long0,
            x0: setup.x0,
            y0: setup.y0,
            cgb,
            cbg,
            utg,
            gtu,
            qn,
            zb,
        })
    }
}

impl Projection for TransverseMercator {
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        let mut ce = adjust_lon(lon - self.long0);
        let mut cn = gatg(&self.cbg, lat);

        let (sin_cn, cos_cn) = cn.sin_cos();
        let (sin_ce, cos_ce) = ce.sin_cos();

        cn = sin_cn.atan2(cos_ce * cos_cn);
        ce = (sin_ce * cos_cn).atan2(hypot(sin_cn, cos_cn * cos_ce));
        ce = asinhy(ce.tan());

        let (dn, de) = clens_cmplx(&self.gtu, 2.0 * cn, 2.0 * ce);
        cn += dn;
        ce += de;

        if ce.abs() > MAX_CE {
            return None;
        }
        let x = self.a * (self.qn * ce) + self.x0;
        let y = self.a * (self.qn * cn + self.zb) + self.y0;
        Some((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let mut ce = (x - self.x0) / self.a;
        let mut cn = (y - self.y0) / self.a;
        cn = (cn - self.zb) / self.qn;
        ce /= self.qn;

        if ce.abs() > MAX_CE {
            return None;
        }
        let (dn, de) = clens_cmplx(&self.utg, 2.0 * cn, 2.0 * ce);
        cn += dn;
        ce += de;
        ce = ce.sinh().atan();

        let (sin_cn, cos_cn) = cn.sin_cos();
        let (sin_ce, cos_ce) = ce.sin_cos();

        cn = (sin_cn * cos_ce).atan2(hypot(sin_ce, cos_ce * cos_cn));
        ce = sin_ce.atan2(cos_ce * cos_cn);

        let lon = adjust_lon(ce + self.long0);
        let lat = gatg(&self.cgb, cn);
        Some((lon, lat))
    }
}

/// Snyder's Transverse Mercator power series, with a closed-form sphere branch.
pub struct FastTransverseMercator {
    a: f64,
    es: f64,
    ep2: f64,
    k0: f64,
    lat0: f64,
    long0: f64,
    x0: f64,
    y0: f64,
    en: [f64; 5],
    ml0: f64,
}

impl FastTransverseMercator {
    pub fn new(setup: &Setup<'_>) -> Self {
        let en = pj_enfn(setup.es);
        let ml0 = if setup.es > 0.0 {
            pj_mlfn(setup.lat0, setup.lat0.sin(), setup.lat0.cos(), &en)
        } else {
            0.0
        };
        Self {
            a: setup.a,
            es: setup.es,
            ep2: setup.ep2,
            k0: setup.k0,
            lat0: setup.lat0,
            long0: setup.long0,
            x0: setup.x0,
            y0: setup.y0,
            en,
            ml0,
        }
    }
}

impl Projection for FastTransverseMercator {
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        let delta_lon = adjust_lon(lon - self.long0);
        let (sin_phi, cos_phi) = lat.sin_cos();

        if self.es == 0.0 {
            let b = cos_phi * delta_lon.sin();
            if ((b.abs()) - 1.0).abs() < EPSLN {
                return None;
            }
            let x = 0.5 * self.a * self.k0 * ((1.0 + b) / (1.0 - b)).ln() + self.x0;
            let mut y = cos_phi * delta_lon.cos() / (1.0 - b * b).sqrt();
            let ay = y.abs();
            if ay >= 1.0 {
                if ay - 1.0 > EPSLN {
                    return None;
                }
                y = 0.0;
            } else {
                y = y.acos();
            }
            if lat < 0.0 {
                y = -y;
            }
            let y = self.a * self.k0 * (y - self.lat0) + self.y0;
            return Some((x, y));
        }

        let al = cos_phi * delta_lon;
        let als = al * al;
        let c = self.ep2 * cos_phi * cos_phi;
        let cs = c * c;
        let tq = if cos_phi.abs() > EPSLN { lat.tan() } else { 0.0 };
        let t = tq * tq;
        let ts = t * t;
        let con = 1.0 - self.es * sin_phi * sin_phi;
        let al = al / con.sqrt();
        let ml = pj_mlfn(lat, sin_phi, cos_phi, &self.en);

        let x = self.a
            * (self.k0
                * al
                * (1.0
                    + als / 6.0
                        * (1.0 - t
                            + c
                            + als / 20.0
                                * (5.0 - 18.0 * t + ts + 14.0 * c - 58.0 * t * c
                                    + als / 42.0 * (61.0 + 179.0 * ts - ts * t - 479.0 * t)))))
            + self.x0;

        let y = self.a
            * (self.k0
                * (ml - self.ml0
                    + sin_phi * delta_lon * al / 2.0
                        * (1.0
                            + als / 12.0
                                * (5.0 - t + 9.0 * c + 4.0 * cs
                                    + als / 30.0
                                        * (61.0 + ts - 58.0 * t + 270.0 * c - 330.0 * t * c
                                            + als / 56.0
                                                * (1385.0 + 543.0 * ts - ts * t - 3111.0 * t))))))
            + self.y0;

        Some((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let x = (x - self.x0) / self.a;
        let y = (y - self.y0) / self.a;

        if self.es == 0.0 {
            let f = (x / self.k0).exp();
            let g = 0.5 * (f - 1.0 / f);
            let temp = self.lat0 + y / self.k0;
            let h = temp.cos();
            let con = ((1.0 - h * h) / (1.0 + g * g)).sqrt();
            let mut lat = asinz(con);
            if temp < 0.0 {
                lat = -lat;
            }
            let lon = if g == 0.0 && h == 0.0 {
                0.0
            } else {
                adjust_lon(g.atan2(h) + self.long0)
            };
            return Some((lon, lat));
        }

        let con = self.ml0 + y / self.k0;
        let phi = pj_inv_mlfn(con, self.es, &self.en);

        if phi.abs() >= FRAC_PI_2 {
            return Some((0.0, FRAC_PI_2 * sign(y)));
        }

        let (sin_phi, cos_phi) = phi.sin_cos();
        let tan_phi = if cos_phi.abs() > EPSLN { phi.tan() } else { 0.0 };
        let c = self.ep2 * cos_phi * cos_phi;
        let cs = c * c;
        let t = tan_phi * tan_phi;
        let ts = t * t;
        let con = 1.0 - self.es * sin_phi * sin_phi;
        let d = x * con.sqrt() / self.k0;
        let ds = d * d;
        let con = con * tan_phi;

        let lat = phi
            - (con * ds / (1.0 - self.es))
                * 0.5
                * (1.0
                    - ds / 12.0
                        * (5.0 + 3.0 * t - 9.0 * c * t + c - 4.0 * cs
                            - ds / 30.0
                                * (61.0 + 90.0 * t - 252.0 * c * t + 45.0 * ts + 46.0 * c
                                    - ds / 56.0 * (1385.0 + 3633.0 * t + 4095.0 * ts + 1574.0 * ts * t))));
        let lon = adjust_lon(
            self.long0
                + d * (1.0
                    - ds / 6.0
                        * (1.0 + 2.0 * t + c
                            - ds / 20.0
                                * (5.0 + 28.0 * t + 24.0 * ts + 8.0 * c * t + 6.0 * c
                                    - ds / 42.0 * (61.0 + 662.0 * t + 1320.0 * ts + 720.0 * ts * t))))
                    / cos_phi,
        );
        Some((lon, lat))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proj::testing::{assert_roundtrip, Fixture};
    use approx::assert_relative_eq;

    fn utm(zone: i32, south: bool) -> Box<dyn Projection> {
        let mut fx = Fixture::new("WGS84");
        fx.params.zone = Some(zone);
        fx.params.utm_south = south;
        fx.build("utm")
    }

    #[test]
    fn test_roundtrip_utm33() {
        let tm = utm(33, false);
        assert_roundtrip(
            tm.as_ref(),
            &[(15.0, 52.0), (12.0, 50.0), (18.0, 50.0), (15.0, 0.0), (15.0, 80.0), (13.5, 52.5)],
            1e-9,
        );
    }

    #[test]
    fn test_utm_zone33n_known_point() {
        let tm = utm(33, false);
        let (e, n) = tm.forward(15.0_f64.to_radians(), 52.0_f64.to_radians()).unwrap();
        assert_relative_eq!(e, 500_000.0, epsilon = 1e-6);
        assert!(n > 5_760_000.0 && n < 5_762_000.0, "northing = {n}");
    }

    #[test]
    fn test_utm33_off_meridian_reference() {
        let tm = utm(33, false);
        let (e, n) = tm.forward(15.3_f64.to_radians(), 59.2_f64.to_radians()).unwrap();
        assert_relative_eq!(e, 517_135.599, epsilon = 2e-3);
        assert_relative_eq!(n, 6_562_361.011, epsilon = 2e-3);
    }

    #[test]
    fn test_national_grid_reference() {
        // Ordnance Survey worked example on Airy 1830
        let mut fx = Fixture::new("airy");
        fx.params.lat0 = Some(49.0_f64.to_radians());
        fx.params.long0 = Some((-2.0_f64).to_radians());
        fx.params.k0 = Some(0.9996012717);
        fx.params.x0 = Some(400_000.0);
        fx.params.y0 = Some(-100_000.0);
        let tm = fx.build("tmerc");
        let lat: f64 = 52.0 + 39.0 / 60.0 + 27.2531 / 3600.0;
        let lon: f64 = 1.0 + 43.0 / 60.0 + 4.5177 / 3600.0;
        let (e, n) = tm.forward(lon.to_radians(), lat.to_radians()).unwrap();
        assert_relative_eq!(e, 651_409.903, epsilon = 1e-2);
        assert_relative_eq!(n, 313_177.270, epsilon = 1e-2);
    }

    #[test]
    fn test_utm32_easting_and_northing() {
        let tm = utm(32, false);
        let (e, n) = tm.forward(9.0_f64.to_radians(), 48.0_f64.to_radians()).unwrap();
        assert_relative_eq!(e, 500_000.0, epsilon = 1e-6);
        assert!(n > 5_300_000.0 && n < 5_400_000.0, "northing = {n}");
    }

    #[test]
    fn test_southern_hemisphere() {
        let tm = utm(33, true);
        let (x, y) = tm.forward(15.0_f64.to_radians(), (-30.0_f64).to_radians()).unwrap();
        assert!(y > 0.0, "Southing should be positive with FN=10M, got {y}");
        let (lon2, lat2) = tm.inverse(x, y).unwrap();
        assert_relative_eq!(lon2, 15.0_f64.to_radians(), epsilon = 1e-9);
        assert_relative_eq!(lat2, (-30.0_f64).to_radians(), epsilon = 1e-9);
    }

    #[test]
    fn test_zone_from_longitude() {
        assert_eq!(utm_zone(None, 9.0_f64.to_radians()), Some(32));
        assert_eq!(utm_zone(None, (-177.0_f64).to_radians()), Some(1));
        assert_eq!(utm_zone(Some(0), 0.0), None);
    }

    #[test]
    fn test_fast_matches_extended_near_meridian() {
        let mut fx = Fixture::new("GRS80");
        fx.params.long0 = Some(9.0_f64.to_radians());
        fx.params.k0 = Some(0.9996);
        let extended = fx.build("tmerc");
        let fast = fx.build("Fast_Transverse_Mercator");
        let (lon, lat) = (10.0_f64.to_radians(), 47.0_f64.to_radians());
        let (x1, y1) = extended.forward(lon, lat).unwrap();
        let (x2, y2) = fast.forward(lon, lat).unwrap();
        assert_relative_eq!(x1, x2, epsilon = 0.01);
        assert_relative_eq!(y1, y2, epsilon = 0.01);
    }

    #[test]
    fn test_sphere_requires_approx() {
        let fx = Fixture::sphere(6_370_997.0);
        assert!(init_projection_named(&fx, "tmerc").is_err());

        let mut fx = Fixture::sphere(6_370_997.0);
        fx.params.approx = true;
        let tm = fx.build("tmerc");
        assert_roundtrip(tm.as_ref(), &[(1.0, 1.0), (-2.0, 45.0), (2.5, -60.0)], 1e-10);
    }

    fn init_projection_named(fx: &Fixture, name: &str) -> Result<Box<dyn Projection>> {
        crate::proj::init_projection(name, &fx.setup())
    }

    #[test]
    fn test_fast_ellipsoidal_roundtrip() {
        let mut fx = Fixture::new("intl");
        fx.params.lat0 = Some(10.0_f64.to_radians());
        fx.params.x0 = Some(200_000.0);
        let tm = fx.build("Fast_Transverse_Mercator");
        assert_roundtrip(tm.as_ref(), &[(0.5, 12.0), (-1.5, 40.0), (2.0, -5.0)], 1e-9);
    }
}
