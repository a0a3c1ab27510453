//! Azimuthal Equidistant projection.
//!
//! Distances and azimuths from the centre are true. On the ellipsoid the
//! oblique aspect solves the geodesic problem (Vincenty) unless `+approx`
//! asks for Snyder's series; the polar aspects use the meridional arc.

use std::f64::consts::{FRAC_PI_2, PI};

use super::common::{adjust_lon, asinz, e0fn, e1fn, e2fn, e3fn, g_n, imlfn, mlfn, EPSLN};
use super::registry::ProjectionDefinition;
use super::{Projection, Setup};
use crate::error::Result;

pub(super) const DEFINITIONS: &[ProjectionDefinition] = &[ProjectionDefinition {
    names: &["Azimuthal_Equidistant", "Azimuthal Equidistant", "aeqd"],
    init,
}];

pub struct AzimuthalEquidistant {
    a: f64,
    b: f64,
    e: f64,
    es: f64,
    sphere: bool,
    approx: bool,
    lat0: f64,
    long0: f64,
    x0: f64,
    y0: f64,
    sin_p12: f64,
    cos_p12: f64,
    en: [f64; 4],
}

fn init(setup: &Setup<'_>) -> Result<Box<dyn Projection>> {
    Ok(Box::new(AzimuthalEquidistant::new(setup)))
}

impl AzimuthalEquidistant {
    pub fn new(setup: &Setup<'_>) -> Self {
        let es = setup.es;
        Self {
            a: setup.a,
            b: setup.b,
            e: setup.e,
            es,
            sphere: setup.sphere || es == 0.0,
            approx: setup.params.approx,
            lat0: setup.lat0,
            long0: setup.long0,
            x0: setup.x0,
            y0: setup.y0,
            sin_p12: setup.lat0.sin(),
            cos_p12: setup.lat0.cos(),
            en: [e0fn(es), e1fn(es), e2fn(es), e3fn(es)],
        }
    }

    fn mlfn(&self, phi: f64) -> f64 {
        mlfn(self.en[0], self.en[1], self.en[2], self.en[3], phi)
    }

    fn north_polar(&self) -> bool {
        (self.sin_p12 - 1.0).abs() <= EPSLN
    }

    fn south_polar(&self) -> bool {
        (self.sin_p12 + 1.0).abs() <= EPSLN
    }

    fn flattening(&self) -> f64 {
        1.0 - self.b / self.a
    }

    /// Snyder's series for the oblique ellipsoidal case.
    fn forward_series(&self, dlon: f64, sinphi: f64, cosphi: f64) -> (f64, f64) {
        let tanphi = sinphi / cosphi;
        let nl1 = g_n(self.a, self.e, self.sin_p12);
        let nl = g_n(self.a, self.e, sinphi);
        let psi = ((1.0 - self.es) * tanphi + self.es * nl1 * self.sin_p12 / (nl * cosphi)).atan();
        let az = dlon.sin().atan2(self.cos_p12 * psi.tan() - self.sin_p12 * dlon.cos());
        let s = if az == 0.0 {
            asinz(self.cos_p12 * psi.sin() - self.sin_p12 * psi.cos())
        } else if (az.abs() - PI).abs() <= EPSLN {
            -asinz(self.cos_p12 * psi.sin() - self.sin_p12 * psi.cos())
        } else {
            asinz(dlon.sin() * psi.cos() / az.sin())
        };
        let g = self.e * self.sin_p12 / (1.0 - self.es).sqrt();
        let h = self.e * self.cos_p12 * az.cos() / (1.0 - self.es).sqrt();
        let gh = g * h;
        let hs = h * h;
        let s2 = s * s;
        let s3 = s2 * s;
        let s4 = s3 * s;
        let s5 = s4 * s;
        let c = nl1
            * s
            * (1.0 - s2 * hs * (1.0 - hs) / 6.0 + s3 / 8.0 * gh * (1.0 - 2.0 * hs)
                + s4 / 120.0 * (hs * (4.0 - 7.0 * hs) - 3.0 * g * g * (1.0 - 7.0 * hs))
                - s5 / 48.0 * gh);
        (c * az.sin(), c * az.cos())
    }

    fn inverse_series(&self, x: f64, y: f64) -> (f64, f64) {
        let rh = (x * x + y * y).sqrt();
        let az = x.atan2(y);
        let n1 = g_n(self.a, self.e, self.sin_p12);
        let cos_az = az.cos();
        let tmp = self.e * self.cos_p12 * cos_az;
        let a = -tmp * tmp / (1.0 - self.es);
        let b = 3.0 * self.es * (1.0 - a) * self.sin_p12 * self.cos_p12 * cos_az / (1.0 - self.es);
        let d = rh / n1;
        let ee = d - a * (1.0 + a) * d.powi(3) / 6.0 - b * (1.0 + 3.0 * a) * d.powi(4) / 24.0;
        let f = 1.0 - a * ee * ee / 2.0 - d * ee * ee * ee / 6.0;
        let psi = asinz(self.sin_p12 * ee.cos() + self.cos_p12 * ee.sin() * cos_az);
        let lon = adjust_lon(self.long0 + asinz(az.sin() * ee.sin() / psi.cos()));
        let sinpsi = psi.sin();
        let lat = ((sinpsi - self.es * f * self.sin_p12) * psi.tan()).atan2(sinpsi * (1.0 - self.es));
        (lon, lat)
    }
}

impl Projection for AzimuthalEquidistant {
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        let (sinphi, cosphi) = lat.sin_cos();
        let dlon = adjust_lon(lon - self.long0);

        let (x, y) = if self.sphere {
            if self.north_polar() {
                let r = self.a * (FRAC_PI_2 - lat);
                (r * dlon.sin(), -r * dlon.cos())
            } else if self.south_polar() {
                let r = self.a * (FRAC_PI_2 + lat);
                (r * dlon.sin(), r * dlon.cos())
            } else {
                let cos_c = self.sin_p12 * sinphi + self.cos_p12 * cosphi * dlon.cos();
                let c = cos_c.clamp(-1.0, 1.0).acos();
                let kp = if c != 0.0 { c / c.sin() } else { 1.0 };
                (
                    self.a * kp * cosphi * dlon.sin(),
                    self.a * kp * (self.cos_p12 * sinphi - self.sin_p12 * cosphi * dlon.cos()),
                )
            }
        } else if self.north_polar() || self.south_polar() {
            let mlp = self.a * self.mlfn(FRAC_PI_2);
            let ml = self.a * self.mlfn(lat);
            if self.north_polar() {
                ((mlp - ml) * dlon.sin(), -(mlp - ml) * dlon.cos())
            } else {
                ((mlp + ml) * dlon.sin(), (mlp + ml) * dlon.cos())
            }
        } else if dlon.abs() < EPSLN && (lat - self.lat0).abs() < EPSLN {
            (0.0, 0.0)
        } else if self.approx {
            self.forward_series(dlon, sinphi, cosphi)
        } else {
            let (s, az) = geodesic_inverse(self.a, self.flattening(), self.lat0, self.long0, lat, lon)?;
            (s * az.sin(), s * az.cos())
        };
        Some((x + self.x0, y + self.y0))
    }

    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let x = x - self.x0;
        let y = y - self.y0;
        let rh = (x * x + y * y).sqrt();

        if self.sphere {
            if rh > PI * self.a {
                return None;
            }
            if rh <= EPSLN {
                return Some((self.long0, self.lat0));
            }
            let z = rh / self.a;
            let (sinz, cosz) = z.sin_cos();
            let lat = asinz(cosz * self.sin_p12 + y * sinz * self.cos_p12 / rh);
            let lon = if (self.lat0.abs() - FRAC_PI_2).abs() <= EPSLN {
                if self.lat0 >= 0.0 {
                    adjust_lon(self.long0 + x.atan2(-y))
                } else {
                    adjust_lon(self.long0 - (-x).atan2(y))
                }
            } else {
                adjust_lon(self.long0 + (x * sinz).atan2(rh * self.cos_p12 * cosz - y * self.sin_p12 * sinz))
            };
            return Some((lon, lat));
        }

        if self.north_polar() {
            let mlp = self.a * self.mlfn(FRAC_PI_2);
            let lat = imlfn((mlp - rh) / self.a, self.en[0], self.en[1], self.en[2], self.en[3])?;
            return Some((adjust_lon(self.long0 + x.atan2(-y)), lat));
        }
        if self.south_polar() {
            let mlp = self.a * self.mlfn(FRAC_PI_2);
            let lat = imlfn((rh - mlp) / self.a, self.en[0], self.en[1], self.en[2], self.en[3])?;
            return Some((adjust_lon(self.long0 + x.atan2(y)), lat));
        }
        if rh <= EPSLN {
            return Some((self.long0, self.lat0));
        }
        if self.approx {
            return Some(self.inverse_series(x, y));
        }
        let (lat, lon) = geodesic_direct(self.a, self.flattening(), self.lat0, self.long0, x.atan2(y), rh)?;
        Some((adjust_lon(lon), lat))
    }
}

/// Vincenty's series coefficients A and B for the reduced `u²`.
fn vincenty_ab(u_sq: f64) -> (f64, f64) {
    let big_a = 1.0 + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
    let big_b = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));
    (big_a, big_b)
}

fn delta_sigma(big_b: f64, sin_sigma: f64, cos_sigma: f64, cos_2sm: f64) -> f64 {
    big_b
        * sin_sigma
        * (cos_2sm
            + big_b / 4.0
                * (cos_sigma * (-1.0 + 2.0 * cos_2sm * cos_2sm)
                    - big_b / 6.0
                        * cos_2sm
                        * (-3.0 + 4.0 * sin_sigma * sin_sigma)
                        * (-3.0 + 4.0 * cos_2sm * cos_2sm)))
}

/// Vincenty's inverse geodesic: distance and forward azimuth from point 1
/// to point 2. `None` when the iteration fails (nearly antipodal points).
fn geodesic_inverse(a: f64, f: f64, lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> Option<(f64, f64)> {
    let b = a * (1.0 - f);
    let l = adjust_lon(lon2 - lon1);
    let (sin_u1, cos_u1) = ((1.0 - f) * lat1.tan()).atan().sin_cos();
    let (sin_u2, cos_u2) = ((1.0 - f) * lat2.tan()).atan().sin_cos();

    let mut lambda = l;
    for _ in 0..200 {
        let (sin_l, cos_l) = lambda.sin_cos();
        let sin_sigma = ((cos_u2 * sin_l).powi(2)
            + (cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_l).powi(2))
        .sqrt();
        if sin_sigma == 0.0 {
            return Some((0.0, 0.0));
        }
        let cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_l;
        let sigma = sin_sigma.atan2(cos_sigma);
        let sin_alpha = cos_u1 * cos_u2 * sin_l / sin_sigma;
        let cos2_alpha = 1.0 - sin_alpha * sin_alpha;
        let cos_2sm = if cos2_alpha != 0.0 {
            cos_sigma - 2.0 * sin_u1 * sin_u2 / cos2_alpha
        } else {
            0.0
        };
        let c = f / 16.0 * cos2_alpha * (4.0 + f * (4.0 - 3.0 * cos2_alpha));
        let prev = lambda;
        lambda = l
            + (1.0 - c)
                * f
                * sin_alpha
                * (sigma + c * sin_sigma * (cos_2sm + c * cos_sigma * (-1.0 + 2.0 * cos_2sm * cos_2sm)));

        if (lambda - prev).abs() < 1e-12 {
            let (big_a, big_b) = vincenty_ab(cos2_alpha * (a * a - b * b) / (b * b));
            let s = b * big_a * (sigma - delta_sigma(big_b, sin_sigma, cos_sigma, cos_2sm));
            let (sin_l, cos_l) = lambda.sin_cos();
            let az = (cos_u2 * sin_l).atan2(cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_l);
            return Some((s, az));
        }
    }
    None
}

/// Vincenty's direct geodesic: destination of a walk of length `s` from
/// point 1 along azimuth `az1`.
fn geodesic_direct(a: f64, f: f64, lat1: f64, lon1: f64, az1: f64, s: f64) -> Option<(f64, f64)> {
    let b = a * (1.0 - f);
    let (sin_a1, cos_a1) = az1.sin_cos();
    let tan_u1 = (1.0 - f) * lat1.tan();
    let cos_u1 = 1.0 / (1.0 + tan_u1 * tan_u1).sqrt();
    let sin_u1 = tan_u1 * cos_u1;
    let sigma1 = tan_u1.atan2(cos_a1);
    let sin_alpha = cos_u1 * sin_a1;
    let cos2_alpha = 1.0 - sin_alpha * sin_alpha;
    let (big_a, big_b) = vincenty_ab(cos2_alpha * (a * a - b * b) / (b * b));

    let sigma0 = s / (b * big_a);
    let mut sigma = sigma0;
    for _ in 0..200 {
        let (sin_sigma, cos_sigma) = sigma.sin_cos();
        let cos_2sm = (2.0 * sigma1 + sigma).cos();
        let next = sigma0 + delta_sigma(big_b, sin_sigma, cos_sigma, cos_2sm);
        if (next - sigma).abs() >= 1e-12 {
            sigma = next;
            continue;
        }
        sigma = next;
        let (sin_sigma, cos_sigma) = sigma.sin_cos();
        let cos_2sm = (2.0 * sigma1 + sigma).cos();

        let tmp = sin_u1 * sin_sigma - cos_u1 * cos_sigma * cos_a1;
        let lat2 = (sin_u1 * cos_sigma + cos_u1 * sin_sigma * cos_a1)
            .atan2((1.0 - f) * (sin_alpha * sin_alpha + tmp * tmp).sqrt());
        let lambda = (sin_sigma * sin_a1).atan2(cos_u1 * cos_sigma - sin_u1 * sin_sigma * cos_a1);
        let c = f / 16.0 * cos2_alpha * (4.0 + f * (4.0 - 3.0 * cos2_alpha));
        let l = lambda
            - (1.0 - c)
                * f
                * sin_alpha
                * (sigma + c * sin_sigma * (cos_2sm + c * cos_sigma * (-1.0 + 2.0 * cos_2sm * cos_2sm)));
        return Some((lat2, lon1 + l));
    }
    None
}
