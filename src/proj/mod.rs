pub mod common;
pub mod ellipsoid;
pub mod registry;

mod aeqd;
mod albers_equal_area;
mod bonne;
mod cassini;
mod eqdc;
mod equal_earth;
mod equirectangular;
mod geocentric;
mod geos;
mod gnomonic;
mod krovak;
mod laea;
mod lambert_conformal;
mod longlat;
mod mercator;
mod miller;
mod mollweide;
mod nzmg;
mod ob_tran;
mod omerc;
mod ortho;
mod polyconic;
mod qsc;
mod robinson;
mod sinusoidal;
mod somerc;
mod stereographic;
mod tpers;
mod transverse_mercator;
mod vandg;

use crate::params::ProjParams;
use crate::point::Point;

/// Trait for map projections supporting forward and inverse transforms.
///
/// Outputs are in CRS linear units (metres for most projections) with the
/// false easting/northing already applied. `None` means the coordinate has no
/// image under the projection (singularity, outside the domain, or a solver
/// that did not converge).
pub trait Projection: Send + Sync {
    /// Forward: (lon_rad, lat_rad) -> (easting, northing)
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)>;

    /// Inverse: (easting, northing) -> (lon_rad, lat_rad)
    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)>;

    /// Point form of [`Projection::forward`]; `z` passes through untouched.
    fn forward_point(&self, p: Point) -> Option<Point> {
        self.forward(p.x, p.y).map(|(x, y)| p.with_xy(x, y))
    }

    /// Point form of [`Projection::inverse`].
    fn inverse_point(&self, p: Point) -> Option<Point> {
        self.inverse(p.x, p.y).map(|(x, y)| p.with_xy(x, y))
    }
}

/// Everything a projection `init` may read: the resolved ellipsoid and the
/// merged parameter set with library defaults applied.
#[derive(Clone, Debug)]
pub struct Setup<'a> {
    pub params: &'a ProjParams,
    pub a: f64,
    pub b: f64,
    pub rf: f64,
    pub es: f64,
    pub e: f64,
    pub ep2: f64,
    pub sphere: bool,
    pub k0: f64,
    pub x0: f64,
    pub y0: f64,
    pub lat0: f64,
    pub lat1: f64,
    pub long0: f64,
}

impl<'a> Setup<'a> {
    /// Defaults taken straight from `params` and a resolved ellipsoid.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        params: &'a ProjParams,
        a: f64,
        b: f64,
        rf: f64,
        es: f64,
        e: f64,
        ep2: f64,
        sphere: bool,
    ) -> Self {
        let lat0 = params.lat0.unwrap_or(0.0);
        Self {
            params,
            a,
            b,
            rf,
            es,
            e,
            ep2,
            sphere,
            k0: params.k0.filter(|k| *k != 0.0).unwrap_or(1.0),
            x0: params.x0.unwrap_or(0.0),
            y0: params.y0.unwrap_or(0.0),
            lat0,
            lat1: params.lat1.unwrap_or(lat0),
            long0: params.long0.unwrap_or(0.0),
        }
    }

    pub fn lat2(&self) -> Option<f64> {
        self.params.lat2
    }

    pub fn lat_ts(&self) -> Option<f64> {
        self.params.lat_ts
    }

    /// Copy of this setup on a sphere of radius `a`.
    pub fn spherical(&self) -> Self {
        Self {
            b: self.a,
            rf: 0.0,
            es: 0.0,
            e: 0.0,
            ep2: 0.0,
            sphere: true,
            ..self.clone()
        }
    }
}

pub type InitFn = fn(&Setup<'_>) -> crate::error::Result<Box<dyn Projection>>;

use registry::ProjectionDefinition;

/// Built-in projections in registration order.
pub(crate) fn builtin_definitions() -> Vec<ProjectionDefinition> {
    [
        longlat::DEFINITIONS,
        mercator::DEFINITIONS,
        transverse_mercator::DEFINITIONS,
        lambert_conformal::DEFINITIONS,
        albers_equal_area::DEFINITIONS,
        stereographic::DEFINITIONS,
        omerc::DEFINITIONS,
        somerc::DEFINITIONS,
        krovak::DEFINITIONS,
        sinusoidal::DEFINITIONS,
        mollweide::DEFINITIONS,
        miller::DEFINITIONS,
        cassini::DEFINITIONS,
        eqdc::DEFINITIONS,
        equirectangular::DEFINITIONS,
        polyconic::DEFINITIONS,
        robinson::DEFINITIONS,
        vandg::DEFINITIONS,
        aeqd::DEFINITIONS,
        gnomonic::DEFINITIONS,
        laea::DEFINITIONS,
        ortho::DEFINITIONS,
        qsc::DEFINITIONS,
        geos::DEFINITIONS,
        tpers::DEFINITIONS,
        equal_earth::DEFINITIONS,
        nzmg::DEFINITIONS,
        bonne::DEFINITIONS,
        ob_tran::DEFINITIONS,
        geocentric::DEFINITIONS,
    ]
    .concat()
}

/// Build a projection by registry name from a prepared setup.
pub fn init_projection(name: &str, setup: &Setup<'_>) -> crate::error::Result<Box<dyn Projection>> {
    let def = registry::lookup(name)
        .ok_or_else(|| crate::error::ProjError::UnknownProjection(name.to_string()))?;
    (def.init)(setup)
}

#[cfg(test)]
pub(crate) mod testing {
    //! Helpers for projection unit tests.

    use super::*;
    use crate::proj::ellipsoid::Ellipsoid;

    /// Parameters + ellipsoid, kept alive for building a `Setup`.
    pub struct Fixture {
        pub params: ProjParams,
        pub ellipsoid: Ellipsoid,
    }

    impl Fixture {
        pub fn new(ellps: &str) -> Self {
            Self {
                params: ProjParams::default(),
                ellipsoid: Ellipsoid::resolve(None, None, None, Some(ellps)),
            }
        }

        pub fn sphere(radius: f64) -> Self {
            Self {
                params: ProjParams::default(),
                ellipsoid: Ellipsoid::resolve(Some(radius), Some(radius), None, None),
            }
        }

        pub fn setup(&self) -> Setup<'_> {
            let (a, ecc) = self.ellipsoid.eccentricity(false);
            Setup::new(
                &self.params,
                a,
                self.ellipsoid.b,
                self.ellipsoid.rf,
                ecc.es,
                ecc.e,
                ecc.ep2,
                self.ellipsoid.sphere,
            )
        }

        pub fn build(&self, name: &str) -> Box<dyn Projection> {
            init_projection(name, &self.setup()).unwrap()
        }
    }

    /// Forward then inverse over degree samples, asserting the round trip.
    pub fn assert_roundtrip(proj: &dyn Projection, samples: &[(f64, f64)], tol: f64) {
        for &(lon_deg, lat_deg) in samples {
            let lon = lon_deg.to_radians();
            let lat = lat_deg.to_radians();
            let (x, y) = proj
                .forward(lon, lat)
                .unwrap_or_else(|| panic!("forward failed at ({lon_deg}, {lat_deg})"));
            let (lon2, lat2) = proj
                .inverse(x, y)
                .unwrap_or_else(|| panic!("inverse failed at ({lon_deg}, {lat_deg})"));
            approx::assert_relative_eq!(lon2, lon, epsilon = tol);
            approx::assert_relative_eq!(lat2, lat, epsilon = tol);
        }
    }
}
