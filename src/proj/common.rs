//! Common helpers for projection math (meridional arc, latitude conversions, etc.).

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

pub const TWO_PI: f64 = 2.0 * PI;
/// Slightly larger than π so that ±180° does not wrap.
pub const SPI: f64 = 3.141_592_653_59;
pub const EPSLN: f64 = 1.0e-10;
pub const D2R: f64 = PI / 180.0;
pub const R2D: f64 = 180.0 / PI;
pub const SEC_TO_RAD: f64 = 4.848_136_811_095_359_935_899_141_023_57e-6;

pub fn sign(x: f64) -> f64 {
    if x < 0.0 {
        -1.0
    } else {
        1.0
    }
}

/// Wrap a longitude into (-π, π].
pub fn adjust_lon(x: f64) -> f64 {
    if x.abs() <= SPI {
        x
    } else {
        x - sign(x) * TWO_PI
    }
}

/// Wrap a latitude into [-π/2, π/2].
pub fn adjust_lat(x: f64) -> f64 {
    if x.abs() < FRAC_PI_2 {
        x
    } else {
        x - sign(x) * PI
    }
}

pub fn asinz(x: f64) -> f64 {
    x.clamp(-1.0, 1.0).asin()
}

/// m(φ) = cos φ / sqrt(1 - e² sin² φ)
pub fn msfn(e: f64, sinphi: f64, cosphi: f64) -> f64 {
    let con = e * sinphi;
    cosphi / (1.0 - con * con).sqrt()
}

/// Isometric-latitude helper t(φ) used by the conformal projections.
pub fn tsfn(e: f64, phi: f64, sinphi: f64) -> f64 {
    let con = e * sinphi;
    let com = 0.5 * e;
    let con = ((1.0 - con) / (1.0 + con)).powf(com);
    (0.5 * (FRAC_PI_2 - phi)).tan() / con
}

/// Inverse of [`tsfn`]; `None` when the iteration does not converge.
pub fn phi2z(e: f64, ts: f64) -> Option<f64> {
    let eccnth = 0.5 * e;
    let mut phi = FRAC_PI_2 - 2.0 * ts.atan();
    for _ in 0..=15 {
        let con = e * phi.sin();
        let dphi =
            FRAC_PI_2 - 2.0 * (ts * ((1.0 - con) / (1.0 + con)).powf(eccnth)).atan() - phi;
        phi += dphi;
        if dphi.abs() <= 1.0e-10 {
            return Some(phi);
        }
    }
    None
}

/// Authalic helper q(φ).
pub fn qsfn(e: f64, sinphi: f64) -> f64 {
    if e > 1.0e-7 {
        let con = e * sinphi;
        (1.0 - e * e) * (sinphi / (1.0 - con * con) - (0.5 / e) * ((1.0 - con) / (1.0 + con)).ln())
    } else {
        2.0 * sinphi
    }
}

/// Inverse of [`qsfn`].
pub fn iqsfn(e: f64, q: f64) -> Option<f64> {
    let temp = 1.0 - (1.0 - e * e) / (2.0 * e) * ((1.0 - e) / (1.0 + e)).ln();
    if (q.abs() - temp).abs() < 1.0e-6 {
        return Some(if q < 0.0 { -FRAC_PI_2 } else { FRAC_PI_2 });
    }
    let mut phi = (0.5 * q).asin();
    for _ in 0..30 {
        let sin_phi = phi.sin();
        let cos_phi = phi.cos();
        let con = e * sin_phi;
        let dphi = (1.0 - con * con).powi(2) / (2.0 * cos_phi)
            * (q / (1.0 - e * e) - sin_phi / (1.0 - con * con)
                + 0.5 / e * ((1.0 - con) / (1.0 + con)).ln());
        phi += dphi;
        if dphi.abs() <= 1.0e-10 {
            return Some(phi);
        }
    }
    None
}

pub fn e0fn(x: f64) -> f64 {
    1.0 - 0.25 * x * (1.0 + x / 16.0 * (3.0 + 1.25 * x))
}

pub fn e1fn(x: f64) -> f64 {
    0.375 * x * (1.0 + 0.25 * x * (1.0 + 0.468_75 * x))
}

pub fn e2fn(x: f64) -> f64 {
    0.058_593_75 * x * x * (1.0 + 0.75 * x)
}

pub fn e3fn(x: f64) -> f64 {
    x * x * x * (35.0 / 3072.0)
}

/// Meridional distance from the `e0..e3` series coefficients.
pub fn mlfn(e0: f64, e1: f64, e2: f64, e3: f64, phi: f64) -> f64 {
    e0 * phi - e1 * (2.0 * phi).sin() + e2 * (4.0 * phi).sin() - e3 * (6.0 * phi).sin()
}

/// Inverse of [`mlfn`].
pub fn imlfn(ml: f64, e0: f64, e1: f64, e2: f64, e3: f64) -> Option<f64> {
    let mut phi = ml / e0;
    for _ in 0..15 {
        let dphi = (ml - (e0 * phi - e1 * (2.0 * phi).sin() + e2 * (4.0 * phi).sin()
            - e3 * (6.0 * phi).sin()))
            / (e0 - 2.0 * e1 * (2.0 * phi).cos() + 4.0 * e2 * (4.0 * phi).cos()
                - 6.0 * e3 * (6.0 * phi).cos());
        phi += dphi;
        if dphi.abs() <= 1.0e-10 {
            return Some(phi);
        }
    }
    None
}

const C00: f64 = 1.0;
const C02: f64 = 0.25;
const C04: f64 = 0.046_875;
const C06: f64 = 0.019_531_25;
const C08: f64 = 0.010_681_152_343_75;
const C22: f64 = 0.75;
const C44: f64 = 0.468_75;
const C46: f64 = 0.013_020_833_333_333_333_33;
const C48: f64 = 0.007_128_906_25;
const C66: f64 = 0.364_583_333_333_333_333_33;
const C68: f64 = 0.005_696_614_583_333_333_33;
const C88: f64 = 0.307_617_187_5;

/// Coefficients for the es-series meridional arc ([`pj_mlfn`]).
pub fn pj_enfn(es: f64) -> [f64; 5] {
    let mut en = [0.0; 5];
    en[0] = C00 - es * (C02 + es * (C04 + es * (C06 + es * C08)));
    en[1] = es * (C22 - es * (C04 + es * (C06 + es * C08)));
    let mut t = es * es;
    en[2] = t * (C44 - es * (C46 + es * C48));
    t *= es;
    en[3] = t * (C66 - es * C68);
    en[4] = t * es * C88;
    en
}

/// Meridional arc on the unit ellipsoid.
pub fn pj_mlfn(phi: f64, sphi: f64, cphi: f64, en: &[f64; 5]) -> f64 {
    let cphi = cphi * sphi;
    let sphi = sphi * sphi;
    en[0] * phi - cphi * (en[1] + sphi * (en[2] + sphi * (en[3] + sphi * en[4])))
}

/// Latitude from a meridional arc; returns the last estimate when the
/// iteration runs out.
pub fn pj_inv_mlfn(arg: f64, es: f64, en: &[f64; 5]) -> f64 {
    let k = 1.0 / (1.0 - es);
    let mut phi = arg;
    for _ in 0..20 {
        let s = phi.sin();
        let mut t = 1.0 - es * s * s;
        t = (pj_mlfn(phi, s, phi.cos(), en) - arg) * (t * t.sqrt()) * k;
        phi -= t;
        if t.abs() < EPSLN {
            return phi;
        }
    }
    phi
}

/// Radius of curvature in the prime vertical.
pub fn g_n(a: f64, e: f64, sinphi: f64) -> f64 {
    let temp = e * sinphi;
    a / (1.0 - temp * temp).sqrt()
}

pub fn srat(esinp: f64, exp: f64) -> f64 {
    ((1.0 - esinp) / (1.0 + esinp)).powf(exp)
}

/// Isometric latitude.
pub fn latiso(eccent: f64, phi: f64, sinphi: f64) -> f64 {
    if phi.abs() > FRAC_PI_2 {
        return f64::NAN;
    }
    if phi == FRAC_PI_2 {
        return f64::INFINITY;
    }
    if phi == -FRAC_PI_2 {
        return f64::NEG_INFINITY;
    }
    let con = eccent * sinphi;
    (FRAC_PI_4 + phi / 2.0).tan().ln() + eccent * ((1.0 - con) / (1.0 + con)).ln() / 2.0
}

/// Inverse of [`latiso`].
pub fn invlatiso(eccent: f64, ts: f64) -> f64 {
    let mut phi = fl(1.0, ts);
    for _ in 0..30 {
        let iphi = phi;
        let con = eccent * iphi.sin();
        phi = fl((con.atanh() * eccent).exp(), ts);
        if (phi - iphi).abs() <= 1.0e-12 {
            break;
        }
    }
    phi
}

fn fl(x: f64, l: f64) -> f64 {
    2.0 * (x * l.exp()).atan() - FRAC_PI_2
}

/// Overflow-safe hypotenuse.
pub fn hypot(x: f64, y: f64) -> f64 {
    let x = x.abs();
    let y = y.abs();
    let a = x.max(y);
    let b = x.min(y) / if a != 0.0 { a } else { 1.0 };
    a * (1.0 + b * b).sqrt()
}

pub fn log1py(x: f64) -> f64 {
    let y = 1.0 + x;
    let z = y - 1.0;
    if z == 0.0 {
        x
    } else {
        x * y.ln() / z
    }
}

pub fn asinhy(x: f64) -> f64 {
    let y = x.abs();
    let y = log1py(y * (1.0 + y / (hypot(1.0, y) + 1.0)));
    if x < 0.0 {
        -y
    } else {
        y
    }
}

/// Gauss/Krüger latitude series (Clenshaw summation in sin 2B).
pub fn gatg(pp: &[f64], b: f64) -> f64 {
    let cos_2b = 2.0 * (2.0 * b).cos();
    let mut h1 = pp[pp.len() - 1];
    let mut h2 = 0.0;
    let mut h = 0.0;
    for &p in pp[..pp.len() - 1].iter().rev() {
        h = -h2 + cos_2b * h1 + p;
        h2 = h1;
        h1 = h;
    }
    b + h * (2.0 * b).sin()
}

/// Real Clenshaw summation.
pub fn clens(pp: &[f64], arg_r: f64) -> f64 {
    let r = 2.0 * arg_r.cos();
    let mut hr1 = pp[pp.len() - 1];
    let mut hr2 = 0.0;
    let mut hr = 0.0;
    for &p in pp[..pp.len() - 1].iter().rev() {
        hr = -hr2 + r * hr1 + p;
        hr2 = hr1;
        hr1 = hr;
    }
    arg_r.sin() * hr
}

/// Complex Clenshaw summation; returns (real, imaginary).
pub fn clens_cmplx(pp: &[f64], arg_r: f64, arg_i: f64) -> (f64, f64) {
    let sin_arg_r = arg_r.sin();
    let cos_arg_r = arg_r.cos();
    let sinh_arg_i = arg_i.sinh();
    let cosh_arg_i = arg_i.cosh();
    let r = 2.0 * cos_arg_r * cosh_arg_i;
    let i = -2.0 * sin_arg_r * sinh_arg_i;

    let mut hr = pp[pp.len() - 1];
    let mut hi = 0.0;
    let mut hr1 = 0.0;
    let mut hi1 = 0.0;
    for &p in pp[..pp.len() - 1].iter().rev() {
        let hr2 = hr1;
        let hi2 = hi1;
        hr1 = hr;
        hi1 = hi;
        hr = -hr2 + r * hr1 - i * hi1 + p;
        hi = -hi2 + i * hr1 + r * hi1;
    }

    let r = sin_arg_r * cosh_arg_i;
    let i = cos_arg_r * sinh_arg_i;
    (r * hr - i * hi, r * hi + i * hr)
}

/// Authalic latitude series coefficients.
pub fn authset(es: f64) -> [f64; 3] {
    const P00: f64 = 0.333_333_333_333_333_333_33;
    const P01: f64 = 0.172_222_222_222_222_222_22;
    const P02: f64 = 0.102_579_365_079_365_079_37;
    const P10: f64 = 0.063_888_888_888_888_888_88;
    const P11: f64 = 0.066_402_116_402_116_402_11;
    const P20: f64 = 0.016_415_012_942_191_543_43;
    let mut apa = [0.0; 3];
    apa[0] = es * P00;
    let mut t = es * es;
    apa[0] += t * P01;
    apa[1] = t * P10;
    t *= es;
    apa[0] += t * P02;
    apa[1] += t * P11;
    apa[2] = t * P20;
    apa
}

/// Geodetic latitude from authalic latitude `beta`.
pub fn authlat(beta: f64, apa: &[f64; 3]) -> f64 {
    let t = beta + beta;
    beta + apa[0] * t.sin() + apa[1] * (t + t).sin() + apa[2] * (t + t + t).sin()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const WGS84_ES: f64 = 0.006_694_379_990_141_316_5;

    #[test]
    fn test_adjust_lon() {
        assert_relative_eq!(adjust_lon(PI), PI);
        assert_relative_eq!(adjust_lon(3.0 * FRAC_PI_2), -FRAC_PI_2, epsilon = 1e-12);
        assert_relative_eq!(adjust_lon(-3.0 * FRAC_PI_2), FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn test_tsfn_phi2z_roundtrip() {
        let e = WGS84_ES.sqrt();
        for deg in [-80.0_f64, -30.0, 0.0, 15.0, 45.0, 89.0] {
            let phi = deg.to_radians();
            let ts = tsfn(e, phi, phi.sin());
            assert_relative_eq!(phi2z(e, ts).unwrap(), phi, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_qsfn_iqsfn_roundtrip() {
        let e = WGS84_ES.sqrt();
        for deg in [-60.0_f64, -10.0, 20.0, 70.0] {
            let phi = deg.to_radians();
            let q = qsfn(e, phi.sin());
            assert_relative_eq!(iqsfn(e, q).unwrap(), phi, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_meridional_arc_roundtrip() {
        let en = pj_enfn(WGS84_ES);
        let phi = FRAC_PI_4;
        let m = pj_mlfn(phi, phi.sin(), phi.cos(), &en);
        // Arc to 45 degrees on the unit WGS84 ellipsoid (~4984944 m / a)
        assert!(m * 6_378_137.0 > 4_980_000.0 && m * 6_378_137.0 < 4_990_000.0);
        assert_relative_eq!(pj_inv_mlfn(m, WGS84_ES, &en), phi, epsilon = 1e-10);
    }

    #[test]
    fn test_mlfn_imlfn_roundtrip() {
        let (e0, e1, e2, e3) = (e0fn(WGS84_ES), e1fn(WGS84_ES), e2fn(WGS84_ES), e3fn(WGS84_ES));
        let phi = 0.8;
        let ml = mlfn(e0, e1, e2, e3, phi);
        assert_relative_eq!(imlfn(ml, e0, e1, e2, e3).unwrap(), phi, epsilon = 1e-10);
    }

    #[test]
    fn test_latiso_roundtrip() {
        let e = WGS84_ES.sqrt();
        let phi = 0.9;
        let l = latiso(e, phi, phi.sin());
        assert_relative_eq!(invlatiso(e, l), phi, epsilon = 1e-10);
    }

    #[test]
    fn test_asinhy_matches_asinh() {
        for x in [-3.0_f64, -0.5, 0.25, 10.0] {
            assert_relative_eq!(asinhy(x), x.asinh(), epsilon = 1e-12);
        }
    }
}
