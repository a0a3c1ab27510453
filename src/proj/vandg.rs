//! Van der Grinten I projection (spherical).

use std::f64::consts::{FRAC_PI_2, PI};

use super::common::{adjust_lon, asinz, EPSLN};
use super::registry::ProjectionDefinition;
use super::{Projection, Setup};
use crate::error::Result;

pub(super) const DEFINITIONS: &[ProjectionDefinition] = &[ProjectionDefinition {
    names: &["Van_der_Grinten_I", "VanDerGrinten", "Van_der_Grinten", "vandg"],
    init,
}];

pub struct VanDerGrinten {
    r: f64,
    long0: f64,
    x0: f64,
    y0: f64,
}

fn init(setup: &Setup<'_>) -> Result<Box<dyn Projection>> {
    Ok(Box::new(VanDerGrinten {
        r: setup.a,
        long0: setup.long0,
        x0: setup.x0,
        y0: setup.y0,
    }))
}

impl Projection for VanDerGrinten {
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        let dlon = adjust_lon(lon - self.long0);
        let pr = PI * self.r;

        if lat.abs() <= EPSLN {
            return Some((self.x0 + self.r * dlon, self.y0));
        }
        let theta = asinz(2.0 * (lat / PI).abs());
        if dlon.abs() <= EPSLN || (lat.abs() - FRAC_PI_2).abs() <= EPSLN {
            let dy = pr * (0.5 * theta).tan();
            return Some((self.x0, if lat >= 0.0 { self.y0 + dy } else { self.y0 - dy }));
        }

        let al = 0.5 * (PI / dlon - dlon / PI).abs();
        let asq = al * al;
        let (sinth, costh) = theta.sin_cos();
        let g = costh / (sinth + costh - 1.0);
        let gsq = g * g;
        let m = g * (2.0 / sinth - 1.0);
        let msq = m * m;
        let mut con = pr
            * (al * (g - msq) + (asq * (g - msq) * (g - msq) - (msq + asq) * (gsq - msq)).sqrt())
            / (msq + asq);
        if dlon < 0.0 {
            con = -con;
        }
        let x = self.x0 + con;
        let con = (con / pr).abs();
        let dy = pr * (1.0 - con * con - 2.0 * al * con).sqrt();
        let y = if lat >= 0.0 { self.y0 + dy } else { self.y0 - dy };
        Some((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let x = x - self.x0;
        let y = y - self.y0;
        let pr = PI * self.r;
        let xx = x / pr;
        let yy = y / pr;
        let xys = xx * xx + yy * yy;
        let c1 = -yy.abs() * (1.0 + xys);
        let c2 = c1 - 2.0 * yy * yy + xx * xx;
        let c3 = -2.0 * c1 + 1.0 + 2.0 * yy * yy + xys * xys;
        let d = yy * yy / c3 + (2.0 * c2 * c2 * c2 / c3 / c3 / c3 - 9.0 * c1 * c2 / c3 / c3) / 27.0;
        let a1 = (c1 - c2 * c2 / 3.0 / c3) / c3;
        let m1 = 2.0 * (-a1 / 3.0).sqrt();
        let con = ((3.0 * d) / a1 / m1).clamp(-1.0, 1.0);
        let th1 = con.acos() / 3.0;

        let lat = (-m1 * (th1 + PI / 3.0).cos() - c2 / 3.0 / c3) * PI;
        let lat = if y >= 0.0 { lat } else { -lat };
        let lon = if xx.abs() < EPSLN {
            self.long0
        } else {
            adjust_lon(
                self.long0 + PI * (xys - 1.0 + (1.0 + 2.0 * (xx * xx - yy * yy) + xys * xys).sqrt()) / 2.0 / xx,
            )
        };
        Some((lon, lat))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proj::testing::{assert_roundtrip, Fixture};
    use approx::assert_relative_eq;

    #[test]
    fn test_roundtrip() {
        let fx = Fixture::sphere(6_370_997.0);
        let proj = fx.build("vandg");
        assert_roundtrip(
            proj.as_ref(),
            &[(20.0, 30.0), (-120.0, 45.0), (60.0, -50.0), (-10.0, -5.0)],
            1e-8,
        );
    }

    #[test]
    fn test_axes() {
        let fx = Fixture::sphere(6_370_997.0);
        let proj = fx.build("VanDerGrinten");
        let (x, y) = proj.forward(PI, 0.0).unwrap();
        assert_relative_eq!(x, PI * 6_370_997.0, epsilon = 1e-6);
        assert_relative_eq!(y, 0.0);
        let (x, _) = proj.forward(0.0, 40.0_f64.to_radians()).unwrap();
        assert_relative_eq!(x, 0.0);
    }
}
