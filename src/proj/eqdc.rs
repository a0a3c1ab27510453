//! Equidistant Conic projection.

use super::common::{adjust_lat, adjust_lon, e0fn, e1fn, e2fn, e3fn, imlfn, mlfn, msfn, EPSLN};
use super::registry::ProjectionDefinition;
use super::{Projection, Setup};
use crate::error::{ProjError, Result};

pub(super) const DEFINITIONS: &[ProjectionDefinition] = &[ProjectionDefinition {
    names: &["Equidistant_Conic", "Equidistant Conic", "eqdc"],
    init,
}];

pub struct EquidistantConic {
    a: f64,
    sphere: bool,
    long0: f64,
    x0: f64,
    y0: f64,
    e0: f64,
    e1: f64,
    e2: f64,
    e3: f64,
    ns: f64,
    g: f64,
    rh: f64,
}

fn init(setup: &Setup<'_>) -> Result<Box<dyn Projection>> {
    Ok(Box::new(EquidistantConic::new(setup)?))
}

impl EquidistantConic {
    pub fn new(setup: &Setup<'_>) -> Result<Self> {
        let lat1 = setup.lat1;
        let lat2 = setup.lat2().unwrap_or(lat1);
        if (lat1 + lat2).abs() < EPSLN {
            return Err(ProjError::InvalidParameter(
                "standard parallels of a conic projection cannot be symmetric about the equator"
                    .into(),
            ));
        }
        let (es, e) = (setup.es, setup.e);
        let (e0, e1, e2, e3) = (e0fn(es), e1fn(es), e2fn(es), e3fn(es));

        let (sin1, cos1) = lat1.sin_cos();
        let ms1 = msfn(e, sin1, cos1);
        let ml1 = mlfn(e0, e1, e2, e3, lat1);

        let ns = if (lat1 - lat2).abs() < EPSLN {
            sin1
        } else {
            let (sin2, cos2) = lat2.sin_cos();
            let ms2 = msfn(e, sin2, cos2);
            let ml2 = mlfn(e0, e1, e2, e3, lat2);
            (ms1 - ms2) / (ml2 - ml1)
        };
        let g = ml1 + ms1 / ns;
        let ml0 = mlfn(e0, e1, e2, e3, setup.lat0);
        let rh = setup.a * (g - ml0);

        Ok(Self {
            a: setup.a,
            sphere: setup.sphere,
            long0: setup.long0,
            x0: setup.x0,
            y0: setup.y0,
            e0,
            e1,
            e2,
            e3,
            ns,
            g,
            rh,
        })
    }
}

impl Projection for EquidistantConic {
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        let rh1 = if self.sphere {
            self.a * (self.g - lat)
        } else {
            self.a * (self.g - mlfn(self.e0, self.e1, self.e2, self.e3, lat))
        };
        let theta = self.ns * adjust_lon(lon - self.long0);
        let x = self.x0 + rh1 * theta.sin();
        let y = self.y0 + self.rh - rh1 * theta.cos();
        Some((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let x = x - self.x0;
        let y = self.rh - y + self.y0;
        let (rh1, con) = if self.ns >= 0.0 {
            ((x * x + y * y).sqrt(), 1.0)
        } else {
            (-(x * x + y * y).sqrt(), -1.0)
        };
        let theta = if rh1 != 0.0 { (con * x).atan2(con * y) } else { 0.0 };
        let lon = adjust_lon(self.long0 + theta / self.ns);
        let lat = if self.sphere {
            adjust_lat(self.g - rh1 / self.a)
        } else {
            imlfn(self.g - rh1 / self.a, self.e0, self.e1, self.e2, self.e3)?
        };
        Some((lon, lat))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proj::testing::{assert_roundtrip, Fixture};
    use approx::assert_relative_eq;

    fn fixture(ellps: Option<&str>) -> Fixture {
        let mut fx = match ellps {
            Some(name) => Fixture::new(name),
            None => Fixture::sphere(6_370_997.0),
        };
        fx.params.lat0 = Some(40.0_f64.to_radians());
        fx.params.lat1 = Some(30.0_f64.to_radians());
        fx.params.lat2 = Some(50.0_f64.to_radians());
        fx.params.long0 = Some((-96.0_f64).to_radians());
        fx
    }

    #[test]
    fn test_meridian_distances_are_true() {
        let proj = fixture(None).build("eqdc");
        let (_, y1) = proj.forward((-96.0_f64).to_radians(), 40.0_f64.to_radians()).unwrap();
        let (_, y2) = proj.forward((-96.0_f64).to_radians(), 41.0_f64.to_radians()).unwrap();
        assert_relative_eq!(y2 - y1, 6_370_997.0 * 1.0_f64.to_radians(), epsilon = 1e-6);
    }

    #[test]
    fn test_roundtrip() {
        for ellps in [None, Some("GRS80")] {
            let proj = fixture(ellps).build("Equidistant_Conic");
            assert_roundtrip(
                proj.as_ref(),
                &[(-96.0, 40.0), (-120.0, 35.0), (-70.0, 48.0), (-100.0, 20.0)],
                1e-9,
            );
        }
    }
}
