//! Quadrilateralized Spherical Cube.
//!
//! Projects onto the cube face that contains the projection centre. On the
//! ellipsoid, latitudes are first shifted to geocentric so the sphere
//! formulas apply.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use super::common::{adjust_lon, EPSLN, TWO_PI};
use super::registry::ProjectionDefinition;
use super::{Projection, Setup};
use crate::error::Result;

pub(super) const DEFINITIONS: &[ProjectionDefinition] = &[ProjectionDefinition {
    names: &["Quadrilateralized Spherical Cube", "Quadrilateralized_Spherical_Cube", "qsc"],
    init,
}];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Face {
    Front,
    Right,
    Back,
    Left,
    Top,
    Bottom,
}

/// Quarter of a face, counter-clockwise from +x.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Area {
    A0,
    A1,
    A2,
    A3,
}

pub struct QuadSphericalCube {
    a: f64,
    b: f64,
    es: f64,
    long0: f64,
    x0: f64,
    y0: f64,
    face: Face,
    one_minus_f: f64,
    one_minus_f_squared: f64,
}

fn init(setup: &Setup<'_>) -> Result<Box<dyn Projection>> {
    let (lat0, long0) = (setup.lat0, setup.long0);
    let face = if lat0 >= FRAC_PI_2 - FRAC_PI_4 / 2.0 {
        Face::Top
    } else if lat0 <= -(FRAC_PI_2 - FRAC_PI_4 / 2.0) {
        Face::Bottom
    } else if long0.abs() <= FRAC_PI_4 {
        Face::Front
    } else if long0.abs() <= FRAC_PI_2 + FRAC_PI_4 {
        if long0 > 0.0 {
            Face::Right
        } else {
            Face::Left
        }
    } else {
        Face::Back
    };
    let one_minus_f = 1.0 - (setup.a - setup.b) / setup.a;
    Ok(Box::new(QuadSphericalCube {
        a: setup.a,
        b: setup.b,
        es: setup.es,
        long0,
        x0: setup.x0,
        y0: setup.y0,
        face,
        one_minus_f,
        one_minus_f_squared: one_minus_f * one_minus_f,
    }))
}

fn shift_lon_origin(lon: f64, offset: f64) -> f64 {
    let slon = lon + offset;
    if slon < -PI {
        slon + TWO_PI
    } else if slon > PI {
        slon - TWO_PI
    } else {
        slon
    }
}

/// Angle on an equatorial face, folded into its area.
fn equat_face_theta(phi: f64, y: f64, x: f64) -> (f64, Area) {
    if phi < EPSLN {
        return (0.0, Area::A0);
    }
    let theta = y.atan2(x);
    if theta.abs() <= FRAC_PI_4 {
        (theta, Area::A0)
    } else if theta > FRAC_PI_4 && theta <= FRAC_PI_2 + FRAC_PI_4 {
        (theta - FRAC_PI_2, Area::A1)
    } else if theta > FRAC_PI_2 + FRAC_PI_4 || theta <= -(FRAC_PI_2 + FRAC_PI_4) {
        (if theta >= 0.0 { theta - PI } else { theta + PI }, Area::A2)
    } else {
        (theta + FRAC_PI_2, Area::A3)
    }
}

impl Projection for QuadSphericalCube {
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        let mut lon = adjust_lon(lon - self.long0);
        let lat = if self.es != 0.0 {
            (self.one_minus_f_squared * lat.tan()).atan()
        } else {
            lat
        };

        let (theta, phi, area) = match self.face {
            Face::Top => {
                let phi = FRAC_PI_2 - lat;
                let (theta, area) = if lon >= FRAC_PI_4 && lon <= FRAC_PI_2 + FRAC_PI_4 {
                    (lon - FRAC_PI_2, Area::A0)
                } else if lon > FRAC_PI_2 + FRAC_PI_4 || lon <= -(FRAC_PI_2 + FRAC_PI_4) {
                    (if lon > 0.0 { lon - PI } else { lon + PI }, Area::A1)
                } else if lon > -(FRAC_PI_2 + FRAC_PI_4) && lon <= -FRAC_PI_4 {
                    (lon + FRAC_PI_2, Area::A2)
                } else {
                    (lon, Area::A3)
                };
                (theta, phi, area)
            }
            Face::Bottom => {
                let phi = FRAC_PI_2 + lat;
                let (theta, area) = if lon >= FRAC_PI_4 && lon <= FRAC_PI_2 + FRAC_PI_4 {
                    (-lon + FRAC_PI_2, Area::A0)
                } else if lon < FRAC_PI_4 && lon >= -FRAC_PI_4 {
                    (-lon, Area::A1)
                } else if lon < -FRAC_PI_4 && lon >= -(FRAC_PI_2 + FRAC_PI_4) {
                    (-lon - FRAC_PI_2, Area::A2)
                } else {
                    (if lon > 0.0 { -lon + PI } else { -lon - PI }, Area::A3)
                };
                (theta, phi, area)
            }
            face => {
                lon = match face {
                    Face::Right => shift_lon_origin(lon, FRAC_PI_2),
                    Face::Back => shift_lon_origin(lon, PI),
                    Face::Left => shift_lon_origin(lon, -FRAC_PI_2),
                    _ => lon,
                };
                let (sinlat, coslat) = lat.sin_cos();
                let (sinlon, coslon) = lon.sin_cos();
                let q = coslat * coslon;
                let r = coslat * sinlon;
                let s = sinlat;
                let (phi, y, x) = match face {
                    Face::Right => (r.clamp(-1.0, 1.0).acos(), s, -q),
                    Face::Back => ((-q).clamp(-1.0, 1.0).acos(), s, -r),
                    Face::Left => ((-r).clamp(-1.0, 1.0).acos(), s, q),
                    _ => (q.clamp(-1.0, 1.0).acos(), s, r),
                };
                let (theta, area) = equat_face_theta(phi, y, x);
                (theta, phi, area)
            }
        };

        let mut mu = ((12.0 / PI) * (theta + (theta.sin() * FRAC_PI_4.cos()).acos() - FRAC_PI_2)).atan();
        let t = ((1.0 - phi.cos()) / (mu.cos() * mu.cos()) / (1.0 - (1.0 / theta.cos()).atan().cos())).sqrt();
        mu += match area {
            Area::A0 => 0.0,
            Area::A1 => FRAC_PI_2,
            Area::A2 => PI,
            Area::A3 => 1.5 * PI,
        };
        let x = t * mu.cos();
        let y = t * mu.sin();
        Some((x * self.a + self.x0, y * self.a + self.y0))
    }

    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let x = (x - self.x0) / self.a;
        let y = (y - self.y0) / self.a;

        let nu = (x * x + y * y).sqrt().atan();
        let mut mu = y.atan2(x);
        let area = if x >= 0.0 && x >= y.abs() {
            Area::A0
        } else if y >= 0.0 && y >= x.abs() {
            mu -= FRAC_PI_2;
            Area::A1
        } else if x < 0.0 && -x >= y.abs() {
            mu = if mu < 0.0 { mu + PI } else { mu - PI };
            Area::A2
        } else {
            mu += FRAC_PI_2;
            Area::A3
        };

        let t = (PI / 12.0) * mu.tan();
        let tantheta = t.sin() / (t.cos() - std::f64::consts::FRAC_1_SQRT_2);
        let theta = tantheta.atan();
        let cosmu = mu.cos();
        let tannu = nu.tan();
        let cosphi = (1.0 - cosmu * cosmu * tannu * tannu * (1.0 - (1.0 / theta.cos()).atan().cos()))
            .clamp(-1.0, 1.0);

        let (mut lam, mut phi) = match self.face {
            Face::Top => {
                let lam = match area {
                    Area::A0 => theta + FRAC_PI_2,
                    Area::A1 => {
                        if theta < 0.0 {
                            theta + PI
                        } else {
                            theta - PI
                        }
                    }
                    Area::A2 => theta - FRAC_PI_2,
                    Area::A3 => theta,
                };
                (lam, FRAC_PI_2 - cosphi.acos())
            }
            Face::Bottom => {
                let lam = match area {
                    Area::A0 => -theta + FRAC_PI_2,
                    Area::A1 => -theta,
                    Area::A2 => -theta - FRAC_PI_2,
                    Area::A3 => {
                        if theta < 0.0 {
                            -theta - PI
                        } else {
                            -theta + PI
                        }
                    }
                };
                (lam, cosphi.acos() - FRAC_PI_2)
            }
            face => {
                let mut q = cosphi;
                let mut t = q * q;
                let mut s = if t >= 1.0 { 0.0 } else { (1.0 - t).sqrt() * theta.sin() };
                t += s * s;
                let mut r = if t >= 1.0 { 0.0 } else { (1.0 - t).sqrt() };

                match area {
                    Area::A1 => {
                        let tmp = r;
                        r = -s;
                        s = tmp;
                    }
                    Area::A2 => {
                        r = -r;
                        s = -s;
                    }
                    Area::A3 => {
                        let tmp = r;
                        r = s;
                        s = -tmp;
                    }
                    Area::A0 => {}
                }
                match face {
                    Face::Right => {
                        let tmp = q;
                        q = -r;
                        r = tmp;
                    }
                    Face::Back => {
                        q = -q;
                        r = -r;
                    }
                    Face::Left => {
                        let tmp = q;
                        q = r;
                        r = -tmp;
                    }
                    _ => {}
                }
                let phi = (-s).clamp(-1.0, 1.0).acos() - FRAC_PI_2;
                let lam = r.atan2(q);
                let lam = match face {
                    Face::Right => shift_lon_origin(lam, -FRAC_PI_2),
                    Face::Back => shift_lon_origin(lam, -PI),
                    Face::Left => shift_lon_origin(lam, FRAC_PI_2),
                    _ => lam,
                };
                (lam, phi)
            }
        };

        if self.es != 0.0 {
            let invert = phi < 0.0;
            let tanphi = phi.tan();
            let xa = self.b / (tanphi * tanphi + self.one_minus_f_squared).sqrt();
            phi = ((self.a * self.a - xa * xa).sqrt() / (self.one_minus_f * xa)).atan();
            if invert {
                phi = -phi;
            }
        }
        lam = adjust_lon(lam + self.long0);
        Some((lam, phi))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proj::testing::{assert_roundtrip, Fixture};
    use approx::assert_relative_eq;

    #[test]
    fn test_face_centre_is_origin() {
        let fx = Fixture::new("WGS84");
        let proj = fx.build("qsc");
        let (x, y) = proj.forward(0.0, 0.0).unwrap();
        assert_relative_eq!(x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_front_face_roundtrip() {
        for fx in [Fixture::new("WGS84"), Fixture::sphere(6_378_137.0)] {
            let proj = fx.build("qsc");
            assert_roundtrip(
                proj.as_ref(),
                &[(10.0, 20.0), (-30.0, 15.0), (20.0, -35.0), (-40.0, -10.0)],
                1e-9,
            );
        }
    }

    #[test]
    fn test_other_faces_roundtrip() {
        for (lat0, lon0, samples) in [
            (90.0, 0.0, [(10.0, 70.0), (150.0, 60.0), (-100.0, 80.0)]),
            (-90.0, 0.0, [(10.0, -70.0), (150.0, -60.0), (-100.0, -80.0)]),
            (0.0, 90.0, [(80.0, 10.0), (110.0, -20.0), (95.0, 30.0)]),
            (0.0, -90.0, [(-80.0, 10.0), (-110.0, -20.0), (-95.0, 30.0)]),
            (0.0, 180.0, [(170.0, 10.0), (-160.0, -20.0), (179.0, 30.0)]),
        ] {
            let mut fx = Fixture::sphere(6_378_137.0);
            fx.params.lat0 = Some(f64::to_radians(lat0));
            fx.params.long0 = Some(f64::to_radians(lon0));
            let proj = fx.build("Quadrilateralized_Spherical_Cube");
            assert_roundtrip(proj.as_ref(), &samples, 1e-9);
        }
    }
}
