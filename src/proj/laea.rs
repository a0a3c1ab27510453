//! Lambert Azimuthal Equal Area projection: polar, equatorial and oblique
//! aspects, spherical and ellipsoidal (via the authalic latitude).

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use super::common::{adjust_lon, asinz, authlat, authset, qsfn, EPSLN};
use super::registry::ProjectionDefinition;
use super::{Projection, Setup};
use crate::error::Result;

pub(super) const DEFINITIONS: &[ProjectionDefinition] = &[ProjectionDefinition {
    names: &["Lambert Azimuthal Equal Area", "Lambert_Azimuthal_Equal_Area", "laea"],
    init,
}];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Aspect {
    SouthPole,
    NorthPole,
    Equatorial,
    Oblique,
}

pub struct LambertAzimuthalEqualArea {
    a: f64,
    e: f64,
    es: f64,
    lat0: f64,
    long0: f64,
    x0: f64,
    y0: f64,
    mode: Aspect,
    sinph0: f64,
    cosph0: f64,
    qp: f64,
    apa: [f64; 3],
    rq: f64,
    dd: f64,
    xmf: f64,
    ymf: f64,
    sinb1: f64,
    cosb1: f64,
}

fn init(setup: &Setup<'_>) -> Result<Box<dyn Projection>> {
    Ok(Box::new(LambertAzimuthalEqualArea::new(setup)))
}

impl LambertAzimuthalEqualArea {
    pub fn new(setup: &Setup<'_>) -> Self {
        let lat0 = setup.lat0;
        let t = lat0.abs();
        let mode = if (t - FRAC_PI_2).abs() < EPSLN {
            if lat0 < 0.0 {
                Aspect::SouthPole
            } else {
                Aspect::NorthPole
            }
        } else if t < EPSLN {
            Aspect::Equatorial
        } else {
            Aspect::Oblique
        };

        let mut proj = Self {
            a: setup.a,
            e: setup.e,
            es: setup.es,
            lat0,
            long0: setup.long0,
            x0: setup.x0,
            y0: setup.y0,
            mode,
            sinph0: lat0.sin(),
            cosph0: lat0.cos(),
            qp: 0.0,
            apa: [0.0; 3],
            rq: 0.0,
            dd: 1.0,
            xmf: 1.0,
            ymf: 1.0,
            sinb1: 0.0,
            cosb1: 1.0,
        };

        if setup.es > 0.0 {
            proj.qp = qsfn(setup.e, 1.0);
            proj.apa = authset(setup.es);
            match mode {
                Aspect::NorthPole | Aspect::SouthPole => proj.dd = 1.0,
                Aspect::Equatorial => {
                    proj.rq = (0.5 * proj.qp).sqrt();
                    proj.dd = 1.0 / proj.rq;
                    proj.xmf = 1.0;
                    proj.ymf = 0.5 * proj.qp;
                }
                Aspect::Oblique => {
                    proj.rq = (0.5 * proj.qp).sqrt();
                    let sinphi = lat0.sin();
                    proj.sinb1 = qsfn(setup.e, sinphi) / proj.qp;
                    proj.cosb1 = (1.0 - proj.sinb1 * proj.sinb1).sqrt();
                    proj.dd = lat0.cos()
                        / ((1.0 - setup.es * sinphi * sinphi).sqrt() * proj.rq * proj.cosb1);
                    proj.ymf = proj.rq / proj.dd;
                    proj.xmf = proj.rq * proj.dd;
                }
            }
        }
        proj
    }

    fn is_sphere(&self) -> bool {
        !(self.es > 0.0)
    }
}

impl Projection for LambertAzimuthalEqualArea {
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        let lam = adjust_lon(lon - self.long0);
        let phi = lat;

        let (x, y) = if self.is_sphere() {
            let (sinphi, cosphi) = phi.sin_cos();
            let mut coslam = lam.cos();
            match self.mode {
                Aspect::Oblique | Aspect::Equatorial => {
                    let y = if self.mode == Aspect::Equatorial {
                        1.0 + cosphi * coslam
                    } else {
                        1.0 + self.sinph0 * sinphi + self.cosph0 * cosphi * coslam
                    };
                    if y <= EPSLN {
                        return None;
                    }
                    let y = (2.0 / y).sqrt();
                    let x = y * cosphi * lam.sin();
                    let y = y * if self.mode == Aspect::Equatorial {
                        sinphi
                    } else {
                        self.cosph0 * sinphi - self.sinph0 * cosphi * coslam
                    };
                    (x, y)
                }
                Aspect::NorthPole | Aspect::SouthPole => {
                    if self.mode == Aspect::NorthPole {
                        coslam = -coslam;
                    }
                    if (phi + self.lat0).abs() < EPSLN {
                        return None;
                    }
                    let y = FRAC_PI_4 - phi * 0.5;
                    let y = 2.0 * if self.mode == Aspect::SouthPole { y.cos() } else { y.sin() };
                    (y * lam.sin(), y * coslam)
                }
            }
        } else {
            let (sinlam, coslam) = lam.sin_cos();
            let sinphi = phi.sin();
            let mut q = qsfn(self.e, sinphi);
            let (mut sinb, mut cosb) = (0.0, 0.0);
            if matches!(self.mode, Aspect::Oblique | Aspect::Equatorial) {
                sinb = q / self.qp;
                cosb = (1.0 - sinb * sinb).sqrt();
            }
            let b = match self.mode {
                Aspect::Oblique => 1.0 + self.sinb1 * sinb + self.cosb1 * cosb * coslam,
                Aspect::Equatorial => 1.0 + cosb * coslam,
                Aspect::NorthPole => {
                    q = self.qp - q;
                    FRAC_PI_2 + phi
                }
                Aspect::SouthPole => {
                    q = self.qp + q;
                    phi - FRAC_PI_2
                }
            };
            if b.abs() < EPSLN {
                return None;
            }
            match self.mode {
                Aspect::Oblique => {
                    let b = (2.0 / b).sqrt();
                    (
                        self.xmf * b * cosb * sinlam,
                        self.ymf * b * (self.cosb1 * sinb - self.sinb1 * cosb * coslam),
                    )
                }
                Aspect::Equatorial => {
                    let b = (2.0 / (1.0 + cosb * coslam)).sqrt();
                    (self.xmf * b * cosb * sinlam, b * sinb * self.ymf)
                }
                Aspect::NorthPole | Aspect::SouthPole => {
                    if q >= 0.0 {
                        let b = q.sqrt();
                        let y = coslam * if self.mode == Aspect::SouthPole { b } else { -b };
                        (b * sinlam, y)
                    } else {
                        (0.0, 0.0)
                    }
                }
            }
        };
        Some((self.a * x + self.x0, self.a * y + self.y0))
    }

    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let mut x = (x - self.x0) / self.a;
        let mut y = (y - self.y0) / self.a;

        let (lam, phi) = if self.is_sphere() {
            let rh = (x * x + y * y).sqrt();
            let half = rh * 0.5;
            if half > 1.0 {
                return None;
            }
            let mut phi = 2.0 * half.asin();
            let (sinz, cosz) = phi.sin_cos();
            match self.mode {
                Aspect::Equatorial => {
                    phi = if rh.abs() <= EPSLN { 0.0 } else { asinz(y * sinz / rh) };
                    x *= sinz;
                    y = cosz * rh;
                }
                Aspect::Oblique => {
                    phi = if rh.abs() <= EPSLN {
                        self.lat0
                    } else {
                        asinz(cosz * self.sinph0 + y * sinz * self.cosph0 / rh)
                    };
                    x *= sinz * self.cosph0;
                    y = (cosz - phi.sin() * self.sinph0) * rh;
                }
                Aspect::NorthPole => {
                    y = -y;
                    phi = FRAC_PI_2 - phi;
                }
                Aspect::SouthPole => phi -= FRAC_PI_2,
            }
            let lam = if y == 0.0 && matches!(self.mode, Aspect::Equatorial | Aspect::Oblique) {
                0.0
            } else {
                x.atan2(y)
            };
            (lam, phi)
        } else {
            let ab;
            match self.mode {
                Aspect::Oblique | Aspect::Equatorial => {
                    x /= self.dd;
                    y *= self.dd;
                    let rho = (x * x + y * y).sqrt();
                    if rho < EPSLN {
                        return Some((self.long0, self.lat0));
                    }
                    let s_ce = 2.0 * asinz(0.5 * rho / self.rq);
                    let c_ce = s_ce.cos();
                    let s_ce = s_ce.sin();
                    x *= s_ce;
                    if self.mode == Aspect::Oblique {
                        ab = c_ce * self.sinb1 + y * s_ce * self.cosb1 / rho;
                        y = rho * self.cosb1 * c_ce - y * self.sinb1 * s_ce;
                    } else {
                        ab = y * s_ce / rho;
                        y = rho * c_ce;
                    }
                }
                Aspect::NorthPole | Aspect::SouthPole => {
                    if self.mode == Aspect::NorthPole {
                        y = -y;
                    }
                    let q = x * x + y * y;
                    if q == 0.0 {
                        return Some((self.long0, self.lat0));
                    }
                    let v = 1.0 - q / self.qp;
                    ab = if self.mode == Aspect::SouthPole { -v } else { v };
                }
            }
            (x.atan2(y), authlat(asinz(ab), &self.apa))
        };
        Some((adjust_lon(self.long0 + lam), phi))
    }
}
