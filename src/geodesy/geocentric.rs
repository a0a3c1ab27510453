//! Geodetic <-> geocentric (X, Y, Z) conversion and Helmert shifts to and
//! from WGS84.

use std::f64::consts::{FRAC_PI_2, PI};

use crate::point::Point;

/// Convergence threshold of the geodetic latitude iteration.
const GENAU: f64 = 1e-12;
const GENAU2: f64 = GENAU * GENAU;
const MAX_ITER: usize = 30;

/// Bursa-Wolf parameters as stored on a datum: translations in metres,
/// rotations in radians, scale as `1 + ppm / 1e6`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Helmert {
    Translation([f64; 3]),
    Similarity([f64; 7]),
}

/// Geodetic (radians, metres) to geocentric.
///
/// Latitudes up to 0.1% past a pole are clamped onto it; anything further
/// out has no geocentric image.
pub fn geodetic_to_geocentric(p: Point, es: f64, a: f64) -> Option<Point> {
    let mut lon = p.x;
    let mut lat = p.y;
    let height = p.z.unwrap_or(0.0);

    if lat < -FRAC_PI_2 && lat > -1.001 * FRAC_PI_2 {
        lat = -FRAC_PI_2;
    } else if lat > FRAC_PI_2 && lat < 1.001 * FRAC_PI_2 {
        lat = FRAC_PI_2;
    } else if !(-FRAC_PI_2..=FRAC_PI_2).contains(&lat) {
        return None;
    }
    if lon > PI {
        lon -= 2.0 * PI;
    }

    let (sin_lat, cos_lat) = lat.sin_cos();
    let rn = a / (1.0 - es * sin_lat * sin_lat).sqrt();
    Some(Point::new_3d(
        (rn + height) * cos_lat * lon.cos(),
        (rn + height) * cos_lat * lon.sin(),
        (rn * (1.0 - es) + height) * sin_lat,
    ))
}

/// Geocentric to geodetic by iterating on the latitude.
///
/// Input at the earth's centre has no defined latitude and is returned as is.
pub fn geocentric_to_geodetic(p: Point, es: f64, a: f64) -> Point {
    let x = p.x;
    let y = p.y;
    let z = p.z.unwrap_or(0.0);

    let pp = (x * x + y * y).sqrt();
    let rr = (x * x + y * y + z * z).sqrt();

    let lon = if pp / a < GENAU {
        if rr / a < GENAU {
            return p;
        }
        0.0
    } else {
        y.atan2(x)
    };

    let ct = z / rr;
    let st = pp / rr;
    let mut rx = 1.0 / (1.0 - es * (2.0 - es) * st * st).sqrt();
    let mut cphi0 = st * (1.0 - es) * rx;
    let mut sphi0 = ct * rx;
    let mut cphi;
    let mut sphi;
    let mut height;

    let mut iter = 0;
    loop {
        iter += 1;
        let rn = a / (1.0 - es * sphi0 * sphi0).sqrt();
        height = pp * cphi0 + z * sphi0 - rn * (1.0 - es * sphi0 * sphi0);

        let rk = es * rn / (rn + height);
        rx = 1.0 / (1.0 - rk * (2.0 - rk) * st * st).sqrt();
        cphi = st * (1.0 - rk) * rx;
        sphi = ct * rx;
        let sdphi = sphi * cphi0 - cphi * sphi0;
        cphi0 = cphi;
        sphi0 = sphi;
        if sdphi * sdphi <= GENAU2 || iter >= MAX_ITER {
            break;
        }
    }

    let lat = (sphi / cphi.abs()).atan();
    Point::new_3d(lon, lat, height)
}

impl Helmert {
    /// Shift a geocentric point from the datum's frame into WGS84.
    pub fn to_wgs84(&self, p: Point) -> Point {
        let z = p.z.unwrap_or(0.0);
        match *self {
            Helmert::Translation([dx, dy, dz]) => Point::new_3d(p.x + dx, p.y + dy, z + dz),
            Helmert::Similarity([dx, dy, dz, rx, ry, rz, m]) => Point::new_3d(
                m * (p.x - rz * p.y + ry * z) + dx,
                m * (rz * p.x + p.y - rx * z) + dy,
                m * (-ry * p.x + rx * p.y + z) + dz,
            ),
        }
    }

    /// Inverse of [`Helmert::to_wgs84`].
    pub fn from_wgs84(&self, p: Point) -> Point {
        let z = p.z.unwrap_or(0.0);
        match *self {
            Helmert::Translation([dx, dy, dz]) => Point::new_3d(p.x - dx, p.y - dy, z - dz),
            Helmert::Similarity([dx, dy, dz, rx, ry, rz, m]) => {
                let xt = (p.x - dx) / m;
                let yt = (p.y - dy) / m;
                let zt = (z - dz) / m;
                // (I + [r]x)^-1 = (I - [r]x + r r^T) / (1 + |r|^2)
                let dot = rx * xt + ry * yt + rz * zt;
                let norm = 1.0 + rx * rx + ry * ry + rz * rz;
                Point::new_3d(
                    (xt + rz * yt - ry * zt + rx * dot) / norm,
                    (-rz * xt + yt + rx * zt + ry * dot) / norm,
                    (ry * xt - rx * yt + zt + rz * dot) / norm,
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proj::ellipsoid::WGS84;
    use approx::assert_relative_eq;

    fn wgs84_es() -> f64 {
        WGS84.eccentricity(false).1.es
    }

    #[test]
    fn test_equator_prime_meridian() {
        let p = geodetic_to_geocentric(Point::new(0.0, 0.0), wgs84_es(), WGS84.a).unwrap();
        assert_relative_eq!(p.x, WGS84.a);
        assert_relative_eq!(p.y, 0.0);
        assert_relative_eq!(p.z.unwrap(), 0.0);
    }

    #[test]
    fn test_pole_clamp_and_rejection() {
        let es = wgs84_es();
        let just_past = geodetic_to_geocentric(Point::new(0.0, FRAC_PI_2 * 1.0005), es, WGS84.a).unwrap();
        let pole = geodetic_to_geocentric(Point::new(0.0, FRAC_PI_2), es, WGS84.a).unwrap();
        assert_relative_eq!(just_past.z.unwrap(), pole.z.unwrap());
        assert_relative_eq!(pole.z.unwrap(), WGS84.b, epsilon = 1e-3);
        assert!(geodetic_to_geocentric(Point::new(0.0, FRAC_PI_2 * 1.01), es, WGS84.a).is_none());
    }

    #[test]
    fn test_roundtrip_with_height() {
        let es = wgs84_es();
        for (lon, lat, h) in [(7.44, 46.95, 540.0), (-122.4, 37.8, -30.0), (151.2, -33.9, 10_000.0)] {
            let geo = Point::new_3d(f64::to_radians(lon), f64::to_radians(lat), h);
            let xyz = geodetic_to_geocentric(geo, es, WGS84.a).unwrap();
            let back = geocentric_to_geodetic(xyz, es, WGS84.a);
            assert_relative_eq!(back.x, geo.x, epsilon = 1e-12);
            assert_relative_eq!(back.y, geo.y, epsilon = 1e-11);
            assert_relative_eq!(back.z.unwrap(), h, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_centre_is_returned_unchanged() {
        let p = Point::new_3d(0.0, 0.0, 0.0);
        assert_eq!(geocentric_to_geodetic(p, wgs84_es(), WGS84.a), p);
    }

    #[test]
    fn test_helmert_inverses() {
        let p = Point::new_3d(4_331_000.0, 567_000.0, 4_633_000.0);
        let shifts = [
            Helmert::Translation([674.374, 15.056, 405.346]),
            Helmert::Similarity([
                598.1,
                73.7,
                418.2,
                0.202 * crate::proj::common::SEC_TO_RAD,
                0.045 * crate::proj::common::SEC_TO_RAD,
                -2.455 * crate::proj::common::SEC_TO_RAD,
                1.0 + 6.7 / 1e6,
            ]),
        ];
        for shift in shifts {
            let there = shift.to_wgs84(p);
            assert!((there.x - p.x).abs() > 1.0);
            let back = shift.from_wgs84(there);
            assert_relative_eq!(back.x, p.x, epsilon = 1e-6);
            assert_relative_eq!(back.y, p.y, epsilon = 1e-6);
            assert_relative_eq!(back.z.unwrap(), p.z.unwrap(), epsilon = 1e-6);
        }
    }
}
