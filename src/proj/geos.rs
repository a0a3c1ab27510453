//! Geostationary Satellite View.
//!
//! Needs the satellite height `h` above the ellipsoid. `sweep=x` selects the
//! GOES scanning geometry, the default `y` the Meteosat one.

use super::common::{adjust_lon, hypot};
use super::registry::ProjectionDefinition;
use super::{Projection, Setup};
use crate::error::{ProjError, Result};

pub(super) const DEFINITIONS: &[ProjectionDefinition] = &[ProjectionDefinition {
    names: &["Geostationary Satellite View", "Geostationary_Satellite", "geos"],
    init,
}];

pub struct Geostationary {
    a: f64,
    long0: f64,
    x0: f64,
    y0: f64,
    ellipse: bool,
    flip_axis: bool,
    radius_g: f64,
    radius_g_1: f64,
    radius_p: f64,
    radius_p2: f64,
    radius_p_inv2: f64,
    c: f64,
}

fn init(setup: &Setup<'_>) -> Result<Box<dyn Projection>> {
    let params = setup.params;
    let h = params
        .extra_f64("h")
        .ok_or_else(|| ProjError::MissingParameter("geos requires h".into()))?;
    let flip_axis = match params.extra("sweep").unwrap_or("y") {
        "x" => true,
        "y" => false,
        other => {
            return Err(ProjError::InvalidParameter(format!(
                "sweep must be x or y, got '{other}'"
            )))
        }
    };

    let radius_g_1 = h / setup.a;
    if radius_g_1 <= 0.0 || radius_g_1 > 1e10 {
        return Err(ProjError::InvalidParameter(format!("invalid satellite height {h}")));
    }
    let radius_g = 1.0 + radius_g_1;
    let ellipse = setup.es != 0.0;
    let one_es = 1.0 - setup.es;

    Ok(Box::new(Geostationary {
        a: setup.a,
        long0: setup.long0,
        x0: setup.x0,
        y0: setup.y0,
        ellipse,
        flip_axis,
        radius_g,
        radius_g_1,
        radius_p: if ellipse { one_es.sqrt() } else { 1.0 },
        radius_p2: if ellipse { one_es } else { 1.0 },
        radius_p_inv2: if ellipse { 1.0 / one_es } else { 1.0 },
        c: radius_g * radius_g - 1.0,
    }))
}

impl Projection for Geostationary {
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        let lon = adjust_lon(lon - self.long0);

        let (vx, vy, vz) = if self.ellipse {
            // geocentric latitude and radius
            let lat = (self.radius_p2 * lat.tan()).atan();
            let r = self.radius_p / hypot(self.radius_p * lat.cos(), lat.sin());
            (r * lon.cos() * lat.cos(), r * lon.sin() * lat.cos(), r * lat.sin())
        } else {
            let cl = lat.cos();
            (lon.cos() * cl, lon.sin() * cl, lat.sin())
        };

        // the point must face the satellite
        if (self.radius_g - vx) * vx - vy * vy - vz * vz * self.radius_p_inv2 < 0.0 {
            return None;
        }

        let tmp = self.radius_g - vx;
        let (x, y) = if self.flip_axis {
            (
                self.radius_g_1 * (vy / hypot(vz, tmp)).atan(),
                self.radius_g_1 * (vz / tmp).atan(),
            )
        } else {
            (
                self.radius_g_1 * (vy / tmp).atan(),
                self.radius_g_1 * (vz / hypot(vy, tmp)).atan(),
            )
        };
        Some((x * self.a + self.x0, y * self.a + self.y0))
    }

    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let x = (x - self.x0) / self.a;
        let y = (y - self.y0) / self.a;

        // direction of the ray leaving the satellite
        let mut vx = -1.0;
        let (mut vy, mut vz) = if self.flip_axis {
            let vz = (y / self.radius_g_1).tan();
            ((x / self.radius_g_1).tan() * hypot(1.0, vz), vz)
        } else {
            let vy = (x / self.radius_g_1).tan();
            (vy, (y / self.radius_g_1).tan() * hypot(1.0, vy))
        };

        let tmp = vz / self.radius_p;
        let a = vy * vy + tmp * tmp + vx * vx;
        let b = 2.0 * self.radius_g * vx;
        let det = b * b - 4.0 * a * self.c;
        if det < 0.0 {
            return None;
        }

        // nearest intersection with the ellipsoid
        let k = (-b - det.sqrt()) / (2.0 * a);
        vx = self.radius_g + k * vx;
        vy *= k;
        vz *= k;

        let lon = vy.atan2(vx);
        let mut lat = (vz * lon.cos() / vx).atan();
        if self.ellipse {
            lat = (self.radius_p_inv2 * lat.tan()).atan();
        }
        Some((adjust_lon(lon + self.long0), lat))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proj::init_projection;
    use crate::proj::testing::{assert_roundtrip, Fixture};
    use approx::assert_relative_eq;

    fn goes_east(sweep: &str) -> Fixture {
        let mut fx = Fixture::new("GRS80");
        fx.params.long0 = Some((-75.0_f64).to_radians());
        fx.params.extra.insert("h".into(), "35786023".into());
        fx.params.extra.insert("sweep".into(), sweep.into());
        fx
    }

    #[test]
    fn test_sub_satellite_point() {
        let proj = goes_east("x").build("geos");
        let (x, y) = proj.forward((-75.0_f64).to_radians(), 0.0).unwrap();
        assert_relative_eq!(x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_roundtrip_both_sweeps() {
        let samples = [(-75.0, 0.0), (-60.0, 20.0), (-100.0, -30.0), (-40.0, 45.0)];
        for sweep in ["x", "y"] {
            let proj = goes_east(sweep).build("geos");
            assert_roundtrip(proj.as_ref(), &samples, 1e-9);
        }
        let mut fx = Fixture::sphere(6_378_137.0);
        fx.params.extra.insert("h".into(), "35786023".into());
        assert_roundtrip(fx.build("geos").as_ref(), &[(10.0, 20.0), (-30.0, -40.0)], 1e-9);
    }

    #[test]
    fn test_sweep_changes_geometry() {
        let lon = (-40.0_f64).to_radians();
        let lat = 45.0_f64.to_radians();
        let (x_sweep, _) = goes_east("x").build("geos").forward(lon, lat).unwrap();
        let (y_sweep, _) = goes_east("y").build("geos").forward(lon, lat).unwrap();
        assert!((x_sweep - y_sweep).abs() > 1.0);
    }

    #[test]
    fn test_far_side_and_off_disk() {
        let proj = goes_east("x").build("geos");
        assert!(proj.forward(105.0_f64.to_radians(), 0.0).is_none());
        assert!(proj.inverse(6_000_000.0, 6_000_000.0).is_none());
    }

    #[test]
    fn test_height_is_required() {
        let fx = Fixture::new("WGS84");
        assert!(matches!(
            init_projection("geos", &fx.setup()),
            Err(ProjError::MissingParameter(_))
        ));
    }
}
