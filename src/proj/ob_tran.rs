//! General oblique transformation: runs another projection (`o_proj`) on a
//! sphere whose pole has been moved.
//!
//! The new pole is given either directly (`o_lat_p`, `o_lon_p`) or as a
//! centre point and azimuth (`o_lat_c`, `o_lon_c`, `o_alpha`).

use std::f64::consts::FRAC_PI_2;

use super::common::{adjust_lon, asinz, EPSLN};
use super::registry::ProjectionDefinition;
use super::{init_projection, Projection, Setup};
use crate::error::{ProjError, Result};
use crate::names::projection_key;

pub(super) const DEFINITIONS: &[ProjectionDefinition] = &[ProjectionDefinition {
    names: &["ob_tran", "General Oblique Transformation"],
    init,
}];

pub struct ObliqueTransformation {
    inner: Box<dyn Projection>,
    long0: f64,
    lamp: f64,
    /// `None` for the transverse case (new pole on the equator)
    oblique: Option<(f64, f64)>,
}

/// Name of the wrapped projection, as given by `o_proj`.
pub fn inner_projection_name(setup: &Setup<'_>) -> Option<String> {
    setup.params.extra("o_proj").map(str::to_string)
}

fn new_pole(setup: &Setup<'_>) -> Result<(f64, f64)> {
    let params = setup.params;
    if let Some(alpha) = params.extra_angle("o_alpha") {
        let lamc = params.extra_angle("o_lon_c").unwrap_or(0.0);
        let phic = params.extra_angle("o_lat_c").unwrap_or(0.0);
        if (phic.abs() - FRAC_PI_2).abs() <= EPSLN {
            return Err(ProjError::InvalidParameter(
                "o_lat_c must not be a pole".into(),
            ));
        }
        let lamp = lamc + (-alpha.cos()).atan2(-alpha.sin() * phic.sin());
        let phip = asinz(phic.cos() * alpha.sin());
        return Ok((lamp, phip));
    }
    match params.extra_angle("o_lat_p") {
        Some(phip) => Ok((params.extra_angle("o_lon_p").unwrap_or(0.0), phip)),
        None => Err(ProjError::MissingParameter(
            "ob_tran requires o_lat_p or o_alpha".into(),
        )),
    }
}

fn init(setup: &Setup<'_>) -> Result<Box<dyn Projection>> {
    let name = inner_projection_name(setup)
        .ok_or_else(|| ProjError::MissingParameter("ob_tran requires o_proj".into()))?;
    if projection_key(&name) == "ob_tran" {
        return Err(ProjError::InvalidParameter("o_proj cannot be ob_tran".into()));
    }

    let (lamp, phip) = new_pole(setup)?;
    let inner_setup = Setup {
        long0: 0.0,
        ..setup.spherical()
    };
    let inner = init_projection(&name, &inner_setup)?;

    let oblique = if phip.abs() > EPSLN {
        Some((phip.sin(), phip.cos()))
    } else {
        None
    };
    Ok(Box::new(ObliqueTransformation {
        inner,
        long0: setup.long0,
        lamp,
        oblique,
    }))
}

impl ObliqueTransformation {
    /// Geographic coordinates to the rotated frame.
    fn rotate(&self, lam: f64, phi: f64) -> (f64, f64) {
        let (sinphi, cosphi) = phi.sin_cos();
        let (sinlam, coslam) = lam.sin_cos();
        match self.oblique {
            Some((sphip, cphip)) => (
                adjust_lon((cosphi * sinlam).atan2(sphip * cosphi * coslam + cphip * sinphi) + self.lamp),
                asinz(sphip * sinphi - cphip * cosphi * coslam),
            ),
            None => (
                adjust_lon((cosphi * sinlam).atan2(sinphi) + self.lamp),
                asinz(-cosphi * coslam),
            ),
        }
    }

    /// Rotated frame back to geographic coordinates.
    fn unrotate(&self, lam: f64, phi: f64) -> (f64, f64) {
        let (sinphi, cosphi) = phi.sin_cos();
        let t = lam - self.lamp;
        let (sint, cost) = t.sin_cos();
        match self.oblique {
            Some((sphip, cphip)) => (
                (cosphi * sint).atan2(sphip * cosphi * cost - cphip * sinphi),
                asinz(sphip * sinphi + cphip * cosphi * cost),
            ),
            None => ((cosphi * sint).atan2(-sinphi), asinz(cosphi * cost)),
        }
    }
}

impl Projection for ObliqueTransformation {
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        let (lam, phi) = self.rotate(adjust_lon(lon - self.long0), lat);
        self.inner.forward(lam, phi)
    }

    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let (lam, phi) = self.inner.inverse(x, y)?;
        let (lam, phi) = self.unrotate(lam, phi);
        Some((adjust_lon(lam + self.long0), phi))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proj::testing::{assert_roundtrip, Fixture};
    use approx::assert_relative_eq;

    fn ob_tran(pairs: &[(&str, &str)]) -> Result<Box<dyn Projection>> {
        let mut fx = Fixture::sphere(6_370_997.0);
        for (k, v) in pairs {
            fx.params.extra.insert(k.to_string(), v.to_string());
        }
        init_projection("ob_tran", &fx.setup())
    }

    #[test]
    fn test_unmoved_pole_is_identity() {
        let proj = ob_tran(&[("o_proj", "longlat"), ("o_lat_p", "90"), ("o_lon_p", "0")]).unwrap();
        let (x, y) = proj.forward(0.3, 0.7).unwrap();
        assert_relative_eq!(x, 0.3, epsilon = 1e-12);
        assert_relative_eq!(y, 0.7, epsilon = 1e-12);
    }

    #[test]
    fn test_transverse_pole() {
        let proj = ob_tran(&[("o_proj", "longlat"), ("o_lat_p", "0"), ("o_lon_p", "0")]).unwrap();
        let (x, y) = proj.forward(0.0, FRAC_PI_2).unwrap();
        assert_relative_eq!(x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(y, 0.0, epsilon = 1e-12);
        assert_roundtrip(proj.as_ref(), &[(10.0, 20.0), (-50.0, -30.0)], 1e-10);
    }

    #[test]
    fn test_rotated_pole_roundtrip() {
        let samples = [(10.0, 50.0), (-20.0, 40.0), (30.0, 60.0)];
        let rotated = ob_tran(&[("o_proj", "longlat"), ("o_lat_p", "39.25"), ("o_lon_p", "-162")]);
        assert_roundtrip(rotated.unwrap().as_ref(), &samples, 1e-10);
        let azimuth = ob_tran(&[
            ("o_proj", "merc"),
            ("o_lat_c", "45"),
            ("o_lon_c", "10"),
            ("o_alpha", "30"),
        ]);
        assert_roundtrip(azimuth.unwrap().as_ref(), &samples, 1e-9);
    }

    #[test]
    fn test_requires_inner_projection_and_pole() {
        assert!(matches!(
            ob_tran(&[("o_lat_p", "40")]),
            Err(ProjError::MissingParameter(_))
        ));
        assert!(matches!(
            ob_tran(&[("o_proj", "merc")]),
            Err(ProjError::MissingParameter(_))
        ));
        assert!(ob_tran(&[("o_proj", "ob_tran"), ("o_lat_p", "40")]).is_err());
        assert!(matches!(
            ob_tran(&[("o_proj", "nonesuch"), ("o_lat_p", "40")]),
            Err(ProjError::UnknownProjection(_))
        ));
    }
}
