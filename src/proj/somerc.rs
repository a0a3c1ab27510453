//! Swiss Oblique Mercator (conformal sphere + oblique cylinder), as used by
//! the Swiss LV03/LV95 grids.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use super::common::{adjust_lon, asinz};
use super::registry::ProjectionDefinition;
use super::{Projection, Setup};
use crate::error::Result;

pub(super) const DEFINITIONS: &[ProjectionDefinition] = &[ProjectionDefinition {
    names: &["Swiss_Oblique_Cylindrical", "Swiss Oblique Cylindrical", "somerc"],
    init,
}];

pub struct SwissObliqueMercator {
    e: f64,
    lambda0: f64,
    x0: f64,
    y0: f64,
    r: f64,
    alpha: f64,
    b0: f64,
    k: f64,
}

fn init(setup: &Setup<'_>) -> Result<Box<dyn Projection>> {
    Ok(Box::new(SwissObliqueMercator::new(setup)))
}

impl SwissObliqueMercator {
    pub fn new(setup: &Setup<'_>) -> Self {
        let phy0 = setup.lat0;
        let sin_phy0 = phy0.sin();
        let e2 = setup.es;
        let e = setup.e;

        let r = setup.k0 * setup.a * (1.0 - e2).sqrt() / (1.0 - e2 * sin_phy0 * sin_phy0);
        let alpha = (1.0 + e2 / (1.0 - e2) * phy0.cos().powi(4)).sqrt();
        let b0 = asinz(sin_phy0 / alpha);
        let k1 = (FRAC_PI_4 + b0 / 2.0).tan().ln();
        let k2 = (FRAC_PI_4 + phy0 / 2.0).tan().ln();
        let k3 = ((1.0 + e * sin_phy0) / (1.0 - e * sin_phy0)).ln();
        let k = k1 - alpha * k2 + alpha * e / 2.0 * k3;

        Self {
            e,
            lambda0: setup.long0,
            x0: setup.x0,
            y0: setup.y0,
            r,
            alpha,
            b0,
            k,
        }
    }
}

impl Projection for SwissObliqueMercator {
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        let sa1 = (FRAC_PI_4 - lat / 2.0).tan().ln();
        let esin = self.e * lat.sin();
        let sa2 = self.e / 2.0 * ((1.0 + esin) / (1.0 - esin)).ln();
        let s = -self.alpha * (sa1 + sa2) + self.k;

        // Spherical latitude and longitude
        let b = 2.0 * (s.exp().atan() - FRAC_PI_4);
        let i = self.alpha * adjust_lon(lon - self.lambda0);

        // Rotate onto the oblique sphere
        let rot_i = (i.sin() / (self.b0.sin() * b.tan() + self.b0.cos() * i.cos())).atan();
        let rot_b = asinz(self.b0.cos() * b.sin() - self.b0.sin() * b.cos() * i.cos());

        let y = self.r / 2.0 * ((1.0 + rot_b.sin()) / (1.0 - rot_b.sin())).ln() + self.y0;
        let x = self.r * rot_i + self.x0;
        Some((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let easting = x - self.x0;
        let northing = y - self.y0;

        let rot_i = easting / self.r;
        let rot_b = 2.0 * ((northing / self.r).exp().atan() - FRAC_PI_4);

        let b = asinz(self.b0.cos() * rot_b.sin() + self.b0.sin() * rot_b.cos() * rot_i.cos());
        let i = (rot_i.sin() / (self.b0.cos() * rot_i.cos() - self.b0.sin() * rot_b.tan())).atan();
        let lambda = self.lambda0 + i / self.alpha;

        let mut phy = b;
        let mut prev = -1000.0;
        let mut iteration = 0;
        while (phy - prev).abs() > 1e-7 {
            iteration += 1;
            if iteration > 20 {
                return None;
            }
            let s = 1.0 / self.alpha * ((FRAC_PI_4 + b / 2.0).tan().ln() - self.k)
                + self.e * (FRAC_PI_4 + asinz(self.e * phy.sin()) / 2.0).tan().ln();
            prev = phy;
            phy = 2.0 * s.exp().atan() - FRAC_PI_2;
        }
        Some((adjust_lon(lambda), phy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proj::testing::{assert_roundtrip, Fixture};
    use approx::assert_relative_eq;

    fn lv03() -> Box<dyn Projection> {
        let mut fx = Fixture::new("bessel");
        fx.params.lat0 = Some(46.952_405_555_555_56_f64.to_radians());
        fx.params.long0 = Some(7.439_583_333_333_33_f64.to_radians());
        fx.params.x0 = Some(600_000.0);
        fx.params.y0 = Some(200_000.0);
        fx.build("somerc")
    }

    #[test]
    fn test_bern_is_false_origin() {
        let proj = lv03();
        let (x, y) = proj
            .forward(7.439_583_333_333_33_f64.to_radians(), 46.952_405_555_555_56_f64.to_radians())
            .unwrap();
        assert_relative_eq!(x, 600_000.0, epsilon = 1e-4);
        assert_relative_eq!(y, 200_000.0, epsilon = 1e-4);
    }

    #[test]
    fn test_roundtrip() {
        let proj = lv03();
        assert_roundtrip(
            proj.as_ref(),
            &[(8.54, 47.37), (6.14, 46.2), (9.83, 46.5), (7.44, 46.95)],
            1e-7,
        );
    }
}
