//! Datum resolution, comparison and the shift between two datums.

use crate::error::Result;
use crate::grid::apply_grid_shift;
use crate::names::loose_key;
use crate::point::Point;
use crate::proj::common::SEC_TO_RAD;

use super::geocentric::{geocentric_to_geodetic, geodetic_to_geocentric, Helmert};

/// Ellipsoid that grid shifts are referenced to.
pub const GRID_SEMI_MAJOR: f64 = 6_378_137.0;
pub const GRID_ES: f64 = 0.006_694_379_990_141_316_5;

/// Datums with a smaller eccentricity difference are considered equal.
const ES_TOLERANCE: f64 = 5e-11;

/// A grid named by `nadgrids`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridRef {
    pub name: String,
    /// Without a leading `@` the grid must be available
    pub mandatory: bool,
    /// The `null` pseudo-grid, which never shifts
    pub is_null: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DatumKind {
    /// No datum: never shifted
    None,
    /// Named datum coincident with WGS84
    Wgs84,
    ThreeParam([f64; 3]),
    /// Rotations in radians, scale as `1 + ppm / 1e6`
    SevenParam([f64; 7]),
    GridShift(Vec<GridRef>),
}

/// A resolved datum with the ellipsoid it is realised on.
#[derive(Clone, Debug, PartialEq)]
pub struct Datum {
    pub kind: DatumKind,
    pub a: f64,
    pub b: f64,
    pub es: f64,
    pub ep2: f64,
}

/// Built-in datum codes.
#[derive(Debug)]
pub struct DatumDefinition {
    pub code: &'static str,
    pub towgs84: Option<&'static [f64]>,
    pub nadgrids: Option<&'static str>,
    pub ellipse: &'static str,
    pub name: &'static str,
}

macro_rules! datum {
    ($code:literal, towgs84 = [$($p:expr),+], $ellps:literal, $name:literal) => {
        DatumDefinition { code: $code, towgs84: Some(&[$($p),+]), nadgrids: None, ellipse: $ellps, name: $name }
    };
    ($code:literal, nadgrids = $grids:literal, $ellps:literal, $name:literal) => {
        DatumDefinition { code: $code, towgs84: None, nadgrids: Some($grids), ellipse: $ellps, name: $name }
    };
}

static DATUMS: &[DatumDefinition] = &[
    datum!("WGS84", towgs84 = [0.0, 0.0, 0.0], "WGS84", "WGS84"),
    datum!("ch1903", towgs84 = [674.374, 15.056, 405.346], "bessel", "swiss"),
    datum!(
        "ggrs87",
        towgs84 = [-199.87, 74.79, 246.62],
        "GRS80",
        "Greek_Geodetic_Reference_System_1987"
    ),
    datum!("nad83", towgs84 = [0.0, 0.0, 0.0], "GRS80", "North_American_Datum_1983"),
    datum!(
        "nad27",
        nadgrids = "@conus,@alaska,@ntv2_0.gsb,@ntv1_can.dat",
        "clrk66",
        "North_American_Datum_1927"
    ),
    datum!(
        "potsdam",
        towgs84 = [598.1, 73.7, 418.2, 0.202, 0.045, -2.455, 6.7],
        "bessel",
        "Potsdam Rauenberg 1950 DHDN"
    ),
    datum!("carthage", towgs84 = [-263.0, 6.0, 431.0], "clrk80", "Carthage 1934 Tunisia"),
    datum!(
        "hermannskogel",
        towgs84 = [577.326, 90.129, 463.919, 5.137, 1.474, 5.297, 2.4232],
        "bessel",
        "Hermannskogel"
    ),
    datum!(
        "mgi",
        towgs84 = [577.326, 90.129, 463.919, 5.137, 1.474, 5.297, 2.4232],
        "bessel",
        "Militar-Geographische Institut"
    ),
    datum!(
        "osni52",
        towgs84 = [482.530, -130.596, 564.557, -1.042, -0.214, -0.631, 8.15],
        "airy",
        "Irish National"
    ),
    datum!(
        "ire65",
        towgs84 = [482.530, -130.596, 564.557, -1.042, -0.214, -0.631, 8.15],
        "mod_airy",
        "Ireland 1965"
    ),
    datum!("rassadiran", towgs84 = [-133.63, -157.5, -158.62], "intl", "Rassadiran"),
    datum!(
        "nzgd49",
        towgs84 = [59.47, -5.04, 187.44, 0.47, -0.1, 1.024, -4.5993],
        "intl",
        "New Zealand Geodetic Datum 1949"
    ),
    datum!(
        "osgb36",
        towgs84 = [446.448, -125.157, 542.060, 0.1502, 0.2470, 0.8421, -20.4894],
        "airy",
        "Ordnance Survey of Great Britain 1936"
    ),
    datum!("s_jtsk", towgs84 = [589.0, 76.0, 480.0], "bessel", "S-JTSK (Ferro)"),
    datum!("beduaram", towgs84 = [-106.0, -87.0, 188.0], "clrk80", "Beduaram"),
    datum!("gunung_segara", towgs84 = [-403.0, 684.0, 41.0], "bessel", "Gunung Segara Jakarta"),
    datum!(
        "rnb72",
        towgs84 = [106.869, -52.2978, 103.724, -0.33657, 0.456955, -1.84218, 1.0],
        "intl",
        "Reseau National Belge 1972"
    ),
];

/// Look up a datum by code, ignoring case and punctuation.
pub fn lookup_datum(code: &str) -> Option<&'static DatumDefinition> {
    let key = loose_key(code);
    DATUMS.iter().find(|d| loose_key(d.code) == key)
}

/// Split a `nadgrids` list. A leading `@` marks a grid as optional.
pub fn parse_nadgrids(spec: &str) -> Vec<GridRef> {
    spec.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|entry| {
            let mandatory = !entry.starts_with('@');
            let name = entry.trim_start_matches('@').to_string();
            GridRef {
                is_null: name == "null",
                name,
                mandatory,
            }
        })
        .collect()
}

impl Datum {
    /// Resolve the datum kind from a code, `towgs84` values and `nadgrids`.
    ///
    /// Explicit grids win over Helmert parameters; parameters that are all
    /// zero leave a named datum coincident with WGS84.
    pub fn resolve(
        code: Option<&str>,
        params: Option<&[f64]>,
        nadgrids: Option<&str>,
        a: f64,
        b: f64,
        es: f64,
        ep2: f64,
    ) -> Self {
        let mut kind = match code {
            None => DatumKind::None,
            Some(c) if c.eq_ignore_ascii_case("none") => DatumKind::None,
            Some(_) => DatumKind::Wgs84,
        };

        if let Some(p) = params {
            if p.len() >= 3 && p[..3].iter().any(|v| *v != 0.0) {
                kind = DatumKind::ThreeParam([p[0], p[1], p[2]]);
            }
            if p.len() >= 7 && p[3..7].iter().any(|v| *v != 0.0) {
                kind = DatumKind::SevenParam([
                    p[0],
                    p[1],
                    p[2],
                    p[3] * SEC_TO_RAD,
                    p[4] * SEC_TO_RAD,
                    p[5] * SEC_TO_RAD,
                    p[6] / 1_000_000.0 + 1.0,
                ]);
            }
        }

        if let Some(spec) = nadgrids {
            let grids = parse_nadgrids(spec);
            if grids.iter().all(|g| g.is_null) {
                kind = DatumKind::None;
            } else {
                kind = DatumKind::GridShift(grids);
            }
        }

        Self { kind, a, b, es, ep2 }
    }

    fn helmert(&self) -> Option<Helmert> {
        match self.kind {
            DatumKind::ThreeParam(p) => Some(Helmert::Translation(p)),
            DatumKind::SevenParam(p) => Some(Helmert::Similarity(p)),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        self.kind == DatumKind::None
    }

    /// Carries a shift to or from WGS84 (Helmert or grid).
    pub fn has_shift(&self) -> bool {
        matches!(
            self.kind,
            DatumKind::ThreeParam(_) | DatumKind::SevenParam(_) | DatumKind::GridShift(_)
        )
    }
}

/// Whether a shift between the two datums would be a no-op.
pub fn datums_equal(source: &Datum, dest: &Datum) -> bool {
    if std::mem::discriminant(&source.kind) != std::mem::discriminant(&dest.kind) {
        return false;
    }
    if source.a != dest.a || (source.es - dest.es).abs() > ES_TOLERANCE {
        return false;
    }
    match (&source.kind, &dest.kind) {
        (DatumKind::ThreeParam(p), DatumKind::ThreeParam(q)) => p == q,
        (DatumKind::SevenParam(p), DatumKind::SevenParam(q)) => p == q,
        (DatumKind::GridShift(p), DatumKind::GridShift(q)) => p == q,
        _ => true,
    }
}

/// Move a geodetic point (radians, height in metres) from `source` to `dest`.
///
/// `Ok(None)` when the point has no image (past a pole, or outside every
/// optional grid); `Err` when a mandatory grid is unavailable.
pub fn datum_transform(source: &Datum, dest: &Datum, point: Point) -> Result<Option<Point>> {
    if datums_equal(source, dest) || source.is_none() || dest.is_none() {
        return Ok(Some(point));
    }

    let mut point = point;
    let (mut src_a, mut src_es) = (source.a, source.es);
    if let DatumKind::GridShift(grids) = &source.kind {
        point = match apply_grid_shift(grids, false, point)? {
            Some(p) => p,
            None => return Ok(None),
        };
        src_a = GRID_SEMI_MAJOR;
        src_es = GRID_ES;
    }

    let (mut dst_a, mut dst_es) = (dest.a, dest.es);
    if let DatumKind::GridShift(_) = &dest.kind {
        dst_a = GRID_SEMI_MAJOR;
        dst_es = GRID_ES;
    }

    let src_helmert = source.helmert();
    let dst_helmert = dest.helmert();
    if src_es == dst_es && src_a == dst_a && src_helmert.is_none() && dst_helmert.is_none() {
        return finish(dest, point);
    }

    let Some(mut xyz) = geodetic_to_geocentric(point, src_es, src_a) else {
        return Ok(None);
    };
    if let Some(h) = src_helmert {
        xyz = h.to_wgs84(xyz);
    }
    if let Some(h) = dst_helmert {
        xyz = h.from_wgs84(xyz);
    }
    let mut out = geocentric_to_geodetic(xyz, dst_es, dst_a);
    if point.z.is_none() {
        out.z = None;
    }
    finish(dest, out)
}

fn finish(dest: &Datum, point: Point) -> Result<Option<Point>> {
    match &dest.kind {
        DatumKind::GridShift(grids) => apply_grid_shift(grids, true, point),
        _ => Ok(Some(point)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proj::ellipsoid::Ellipsoid;
    use approx::assert_relative_eq;

    fn datum(code: Option<&str>, params: Option<&[f64]>, nadgrids: Option<&str>, ellps: &str) -> Datum {
        let ell = Ellipsoid::resolve(None, None, None, Some(ellps));
        let (a, ecc) = ell.eccentricity(false);
        Datum::resolve(code, params, nadgrids, a, ell.b, ecc.es, ecc.ep2)
    }

    #[test]
    fn test_kind_selection() {
        assert_eq!(datum(None, None, None, "WGS84").kind, DatumKind::None);
        assert_eq!(datum(Some("none"), None, None, "WGS84").kind, DatumKind::None);
        assert_eq!(datum(Some("WGS84"), Some(&[0.0, 0.0, 0.0]), None, "WGS84").kind, DatumKind::Wgs84);
        assert_eq!(
            datum(Some("ch1903"), Some(&[674.374, 15.056, 405.346]), None, "bessel").kind,
            DatumKind::ThreeParam([674.374, 15.056, 405.346])
        );
        let seven = datum(Some("rnb72"), Some(&[1.0, 2.0, 3.0, 0.0, 0.0, 1.0, 5.0]), None, "intl");
        match seven.kind {
            DatumKind::SevenParam(p) => {
                assert_relative_eq!(p[5], SEC_TO_RAD);
                assert_relative_eq!(p[6], 1.000_005);
            }
            other => panic!("unexpected {other:?}"),
        }
        // zero rotations keep the translation-only form
        assert!(matches!(
            datum(Some("x"), Some(&[1.0, 2.0, 3.0, 0.0, 0.0, 0.0, 0.0]), None, "intl").kind,
            DatumKind::ThreeParam(_)
        ));
        assert!(matches!(
            datum(Some("nad27"), Some(&[1.0, 2.0, 3.0]), Some("@conus,ntv2_0.gsb"), "clrk66").kind,
            DatumKind::GridShift(ref g) if g.len() == 2 && !g[0].mandatory && g[1].mandatory
        ));
    }

    #[test]
    fn test_null_grid_means_no_datum() {
        assert_eq!(datum(Some("x"), None, Some("@null"), "WGS84").kind, DatumKind::None);
    }

    #[test]
    fn test_lookup_is_loose() {
        let d = lookup_datum("OSGB36").unwrap();
        assert_eq!(d.ellipse, "airy");
        assert!(lookup_datum("gunung-segara").is_some());
        assert_eq!(lookup_datum("NAD27").and_then(|d| d.nadgrids).map(|g| g.split(',').count()), Some(4));
        assert!(lookup_datum("atlantis").is_none());
    }

    #[test]
    fn test_equality() {
        let wgs = datum(Some("WGS84"), None, None, "WGS84");
        assert!(datums_equal(&wgs, &wgs.clone()));
        assert!(!datums_equal(&wgs, &datum(Some("WGS84"), None, None, "intl")));
        assert!(!datums_equal(&wgs, &datum(None, None, None, "WGS84")));
        let c = datum(Some("x"), Some(&[1.0, 2.0, 3.0]), None, "WGS84");
        let d = datum(Some("y"), Some(&[1.0, 2.0, 3.0]), None, "WGS84");
        let e = datum(Some("x"), Some(&[1.0, 2.0, 4.0]), None, "WGS84");
        assert!(datums_equal(&c, &d));
        assert!(!datums_equal(&c, &e));
    }

    #[test]
    fn test_no_datum_never_shifts() {
        let none = datum(None, None, None, "WGS84");
        let osgb = datum(Some("osgb36"), lookup_datum("osgb36").and_then(|d| d.towgs84), None, "airy");
        let p = Point::new(-0.0021, 0.8989);
        assert_eq!(datum_transform(&none, &osgb, p).unwrap(), Some(p));
        assert_eq!(datum_transform(&osgb, &none, p).unwrap(), Some(p));
    }

    #[test]
    fn test_osgb36_shift_size() {
        let wgs = datum(Some("WGS84"), None, None, "WGS84");
        let osgb = datum(Some("osgb36"), lookup_datum("osgb36").and_then(|d| d.towgs84), None, "airy");
        let p = Point::new((-0.1276_f64).to_radians(), 51.5072_f64.to_radians());
        let shifted = datum_transform(&wgs, &osgb, p).unwrap().unwrap();
        // about 100 m of longitude and 50 m of latitude in London
        let dlon_m = (shifted.x - p.x) * 6_378_137.0 * p.y.cos();
        let dlat_m = (shifted.y - p.y) * 6_378_137.0;
        assert!(dlon_m > 60.0 && dlon_m < 160.0, "dlon = {dlon_m}");
        let total = dlon_m.hypot(dlat_m);
        assert!(total > 80.0 && total < 200.0, "shift = {total}");
        assert!(shifted.z.is_none());

        let back = datum_transform(&osgb, &wgs, shifted).unwrap().unwrap();
        assert_relative_eq!(back.x, p.x, epsilon = 1e-8);
        assert_relative_eq!(back.y, p.y, epsilon = 1e-8);
    }

    #[test]
    fn test_missing_mandatory_grid_is_an_error() {
        let wgs = datum(Some("WGS84"), None, None, "WGS84");
        let gridded = datum(Some("x"), None, Some("no_such_grid.gsb"), "clrk66");
        assert!(datum_transform(&gridded, &wgs, Point::new(0.1, 0.7)).is_err());
        let optional = datum(Some("x"), None, Some("@no_such_grid.gsb"), "clrk66");
        assert_eq!(datum_transform(&optional, &wgs, Point::new(0.1, 0.7)).unwrap(), None);
    }
}
