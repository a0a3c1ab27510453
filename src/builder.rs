//! Ready-to-use projection objects.

use std::fmt;

use lazy_static::lazy_static;

use crate::error::{ProjError, Result};
use crate::geodesy::datum::lookup_datum;
use crate::geodesy::Datum;
use crate::names::projection_key;
use crate::params::ProjParams;
use crate::parse::{parse_definition, validate_axis, CrsDefinition};
use crate::point::Point;
use crate::proj::ellipsoid::{Eccentricity, Ellipsoid};
use crate::proj::{init_projection, Projection, Setup};
use crate::transform::transform;

const DEFAULT_AXIS: &str = "enu";

/// A fully resolved CRS: ellipsoid, datum and an initialized projection.
///
/// Immutable once built and safe to share between threads.
pub struct Proj {
    params: ProjParams,
    ellipsoid: Ellipsoid,
    a: f64,
    eccentricity: Eccentricity,
    datum: Datum,
    axis: String,
    geographic: bool,
    projection: Box<dyn Projection>,
}

impl fmt::Debug for Proj {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Proj")
            .field("proj_name", &self.params.proj_name)
            .field("datum", &self.datum)
            .field("axis", &self.axis)
            .finish_non_exhaustive()
    }
}

lazy_static! {
    static ref WGS84_PEER: Result<Proj> = Proj::build("WGS84");
}

/// Geographic WGS84 in degrees, the peer of [`Proj::forward`] and the
/// intermediate used when bridging between two shifted datums.
pub(crate) fn wgs84() -> Result<&'static Proj> {
    WGS84_PEER.as_ref().map_err(Clone::clone)
}

fn is_geographic_name(name: &str) -> bool {
    matches!(
        projection_key(name).as_str(),
        "longlat" | "latlong" | "lonlat" | "latlon"
    )
}

/// Fill ellipsoid and shift parameters from the datum table where the
/// definition leaves them out.
fn apply_datum_defaults(params: &mut ProjParams) {
    let Some(code) = params.datum_code.as_deref() else {
        return;
    };
    if code.eq_ignore_ascii_case("none") {
        return;
    }
    let Some(def) = lookup_datum(code) else {
        return;
    };
    if params.datum_params.is_none() && params.nadgrids.is_none() {
        params.datum_params = def.towgs84.map(<[f64]>::to_vec);
        params.nadgrids = def.nadgrids.map(str::to_string);
    }
    if params.ellps.is_none() && params.a.is_none() {
        params.ellps = Some(def.ellipse.to_string());
    }
    if params.datum_name.is_none() {
        params.datum_name = Some(def.name.to_string());
    }
}

impl Proj {
    /// Build from a PROJ string, WKT, PROJJSON, a registered name or
    /// already-parsed parameters.
    pub fn build(definition: impl Into<CrsDefinition>) -> Result<Self> {
        let params = parse_definition(&definition.into())?;
        Self::from_params(params)
    }

    /// Resolve ellipsoid, datum and projection for parsed parameters.
    pub fn from_params(mut params: ProjParams) -> Result<Self> {
        apply_datum_defaults(&mut params);

        let proj_name = params
            .proj_name
            .clone()
            .ok_or_else(|| ProjError::MissingParameter("proj".into()))?;
        let axis = match params.axis.as_deref() {
            Some(axis) => validate_axis(axis)?,
            None => DEFAULT_AXIS.to_string(),
        };
        params.axis = Some(axis.clone());
        params.k0 = params.k0.filter(|k| *k != 0.0).or(Some(1.0));
        if params.ellps.is_none() {
            params.ellps = Some("wgs84".into());
        }
        if params.lat1.is_none() {
            params.lat1 = params.lat0;
        }

        let mut ellipsoid = Ellipsoid::resolve(params.a, params.b, params.rf, params.ellps.as_deref());
        if params.sphere {
            ellipsoid = Ellipsoid {
                b: ellipsoid.a,
                rf: 0.0,
                sphere: true,
                ..ellipsoid
            };
        }
        let (a, eccentricity) = ellipsoid.eccentricity(params.r_a);
        let datum = Datum::resolve(
            params.datum_code.as_deref(),
            params.datum_params.as_deref(),
            params.nadgrids.as_deref(),
            ellipsoid.a,
            ellipsoid.b,
            eccentricity.es,
            eccentricity.ep2,
        );

        let setup = Setup::new(
            &params,
            a,
            ellipsoid.b,
            ellipsoid.rf,
            eccentricity.es,
            eccentricity.e,
            eccentricity.ep2,
            ellipsoid.sphere || eccentricity.es == 0.0,
        );
        let projection = init_projection(&proj_name, &setup)?;

        // ob_tran over longlat yields rotated geographic coordinates
        let geographic = is_geographic_name(&proj_name)
            || (projection_key(&proj_name) == "ob_tran"
                && params.extra("o_proj").is_some_and(is_geographic_name));

        tracing::debug!(proj = %proj_name, datum = ?datum.kind, "built projection");
        Ok(Self {
            params,
            ellipsoid,
            a,
            eccentricity,
            datum,
            axis,
            geographic,
            projection,
        })
    }

    pub fn params(&self) -> &ProjParams {
        &self.params
    }

    pub fn proj_name(&self) -> &str {
        self.params.proj_name.as_deref().unwrap_or_default()
    }

    pub fn datum(&self) -> &Datum {
        &self.datum
    }

    /// The datum code as written in the definition, e.g. `WGS84` or `nad83`.
    pub fn datum_code(&self) -> Option<&str> {
        self.params.datum_code.as_deref()
    }

    pub fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }

    /// Semi-major axis used by the projection (the authalic radius with `+R_A`).
    pub fn a(&self) -> f64 {
        self.a
    }

    pub fn eccentricity(&self) -> &Eccentricity {
        &self.eccentricity
    }

    /// Axis order, three letters such as `enu` or `neu`.
    pub fn axis(&self) -> &str {
        &self.axis
    }

    pub fn units(&self) -> Option<&str> {
        self.params.units.as_deref()
    }

    pub fn to_meter(&self) -> Option<f64> {
        self.params.to_meter
    }

    pub fn from_greenwich(&self) -> Option<f64> {
        self.params.from_greenwich
    }

    /// Whether coordinates are longitude/latitude in degrees.
    pub fn is_geographic(&self) -> bool {
        self.geographic
    }

    pub fn projection(&self) -> &dyn Projection {
        self.projection.as_ref()
    }

    /// WGS84 longitude/latitude in degrees to this CRS.
    pub fn forward(&self, point: impl Into<Point>) -> Result<Option<Point>> {
        transform(wgs84()?, self, point.into(), false)
    }

    /// This CRS to WGS84 longitude/latitude in degrees.
    pub fn inverse(&self, point: impl Into<Point>) -> Result<Option<Point>> {
        transform(self, wgs84()?, point.into(), false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geodesy::DatumKind;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults() {
        let proj = Proj::build("+proj=merc +lat_0=10").unwrap();
        assert_eq!(proj.axis(), "enu");
        assert_eq!(proj.params().k0, Some(1.0));
        assert_eq!(proj.params().ellps.as_deref(), Some("wgs84"));
        assert_relative_eq!(proj.params().lat1.unwrap(), 10.0_f64.to_radians());
        assert_relative_eq!(proj.a(), 6_378_137.0);
        assert!(!proj.is_geographic());
        assert_eq!(proj.datum().kind, DatumKind::None);
    }

    #[test]
    fn test_datum_code_fills_ellipsoid_and_shift() {
        let proj = Proj::build("+proj=longlat +datum=osgb36").unwrap();
        assert_eq!(proj.params().ellps.as_deref(), Some("airy"));
        assert!(matches!(proj.datum().kind, DatumKind::SevenParam(_)));
        assert_relative_eq!(proj.ellipsoid().a, 6_377_563.396);

        let explicit = Proj::build("+proj=longlat +datum=osgb36 +towgs84=1,2,3").unwrap();
        assert_eq!(explicit.datum().kind, DatumKind::ThreeParam([1.0, 2.0, 3.0]));
    }

    #[test]
    fn test_wgs84_datum_code_is_kept() {
        let proj = Proj::build("EPSG:4326").unwrap();
        assert_eq!(proj.datum_code(), Some("WGS84"));
        assert_eq!(proj.datum().kind, DatumKind::Wgs84);
        assert!(proj.is_geographic());
    }

    #[test]
    fn test_authalic_radius() {
        let proj = Proj::build("+proj=laea +ellps=WGS84 +R_A").unwrap();
        assert!(proj.a() < 6_378_137.0 && proj.a() > 6_371_000.0);
        assert_eq!(proj.eccentricity().es, 0.0);
    }

    #[test]
    fn test_sphere_flag_forces_sphere() {
        let proj = Proj::build("+proj=merc +ellps=WGS84 +sphere").unwrap();
        assert!(proj.ellipsoid().sphere);
        assert_eq!(proj.eccentricity().es, 0.0);
    }

    #[test]
    fn test_rotated_longlat_is_geographic() {
        let proj = Proj::build("+proj=ob_tran +o_proj=longlat +o_lat_p=40 +o_lon_p=10 +a=6370997 +b=6370997").unwrap();
        assert!(proj.is_geographic());
        assert!(!Proj::build("+proj=identity").unwrap().is_geographic());
    }

    #[test]
    fn test_build_errors() {
        assert!(matches!(
            Proj::build("+proj=nonsense"),
            Err(ProjError::UnknownProjection(_))
        ));
        assert!(matches!(
            Proj::build("+ellps=WGS84"),
            Err(ProjError::MissingParameter(_))
        ));
        assert!(matches!(
            Proj::build(r#"PROJCS["x",GEOGCS["y""#),
            Err(ProjError::Wkt(_))
        ));
    }

    #[test]
    fn test_forward_inverse_in_degrees() {
        let merc = Proj::build("EPSG:3857").unwrap();
        let p = merc.forward((7.4391, 46.9524)).unwrap().unwrap();
        assert_relative_eq!(p.x, 828_116.824, epsilon = 1e-3);
        assert_relative_eq!(p.y, 5_934_307.999, epsilon = 1e-3);
        let back = merc.inverse(p).unwrap().unwrap();
        assert_relative_eq!(back.x, 7.4391, epsilon = 1e-9);
        assert_relative_eq!(back.y, 46.9524, epsilon = 1e-9);
    }
}
