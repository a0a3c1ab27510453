//! Reference ellipsoids: named table, axis resolution and eccentricities.

use crate::names::loose_key;

/// Below this axis difference an ellipsoid is treated as a sphere.
const SPHERE_EPSILON: f64 = 1e-10;

const SIXTH: f64 = 0.166_666_666_666_666_666_7;
const RA4: f64 = 0.047_222_222_222_222_222_22;
const RA6: f64 = 0.022_156_084_656_084_656_08;

/// Resolved reference ellipsoid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ellipsoid {
    /// Semi-major axis (metres)
    pub a: f64,
    /// Semi-minor axis (metres)
    pub b: f64,
    /// Inverse flattening, 0 when unknown
    pub rf: f64,
    pub sphere: bool,
}

/// Eccentricity terms derived once per `Proj`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Eccentricity {
    /// First eccentricity squared
    pub es: f64,
    /// First eccentricity
    pub e: f64,
    /// Second eccentricity squared
    pub ep2: f64,
}

#[derive(Clone, Copy, Debug)]
enum Shape {
    Rf(f64),
    B(f64),
}

struct NamedEllipsoid {
    code: &'static str,
    a: f64,
    shape: Shape,
    name: &'static str,
}

macro_rules! ellps {
    ($code:literal, $a:expr, rf = $rf:expr, $name:literal) => {
        NamedEllipsoid { code: $code, a: $a, shape: Shape::Rf($rf), name: $name }
    };
    ($code:literal, $a:expr, b = $b:expr, $name:literal) => {
        NamedEllipsoid { code: $code, a: $a, shape: Shape::B($b), name: $name }
    };
}

static ELLIPSOIDS: &[NamedEllipsoid] = &[
    ellps!("MERIT", 6_378_137.0, rf = 298.257, "MERIT 1983"),
    ellps!("SGS85", 6_378_136.0, rf = 298.257, "Soviet Geodetic System 85"),
    ellps!("GRS80", 6_378_137.0, rf = 298.257_222_101, "GRS 1980(IUGG, 1980)"),
    ellps!("IAU76", 6_378_140.0, rf = 298.257, "IAU 1976"),
    ellps!("airy", 6_377_563.396, b = 6_356_256.910, "Airy 1830"),
    ellps!("APL4", 6_378_137.0, rf = 298.25, "Appl. Physics. 1965"),
    ellps!("NWL9D", 6_378_145.0, rf = 298.25, "Naval Weapons Lab., 1965"),
    ellps!("mod_airy", 6_377_340.189, b = 6_356_034.446, "Modified Airy"),
    ellps!("andrae", 6_377_104.43, rf = 300.0, "Andrae 1876 (Den., Iclnd.)"),
    ellps!("danish", 6_377_019.256_3, rf = 300.0, "Andrae 1876 (Denmark, Iceland)"),
    ellps!("aust_SA", 6_378_160.0, rf = 298.25, "Australian Natl & S. Amer. 1969"),
    ellps!("GRS67", 6_378_160.0, rf = 298.247_167_427, "GRS 67(IUGG 1967)"),
    ellps!("GSK2011", 6_378_136.5, rf = 298.256_415_1, "GSK-2011"),
    ellps!("bessel", 6_377_397.155, rf = 299.152_812_8, "Bessel 1841"),
    ellps!("bess_nam", 6_377_483.865, rf = 299.152_812_8, "Bessel 1841 (Namibia)"),
    ellps!("clrk66", 6_378_206.4, b = 6_356_583.8, "Clarke 1866"),
    ellps!("clrk80", 6_378_249.145, rf = 293.466_3, "Clarke 1880 mod."),
    ellps!("clrk80ign", 6_378_249.2, b = 6_356_515.0, "Clarke 1880 (IGN)"),
    ellps!("clrk58", 6_378_293.645_208_759, rf = 294.260_676_369_265_4, "Clarke 1858"),
    ellps!("CPM", 6_375_738.7, rf = 334.29, "Comm. des Poids et Mesures 1799"),
    ellps!("delmbr", 6_376_428.0, rf = 311.5, "Delambre 1810 (Belgium)"),
    ellps!("engelis", 6_378_136.05, rf = 298.256_6, "Engelis 1985"),
    ellps!("evrst30", 6_377_276.345, rf = 300.801_7, "Everest 1830"),
    ellps!("evrst48", 6_377_304.063, rf = 300.801_7, "Everest 1948"),
    ellps!("evrst56", 6_377_301.243, rf = 300.801_7, "Everest 1956"),
    ellps!("evrst69", 6_377_295.664, rf = 300.801_7, "Everest 1969"),
    ellps!("evrstSS", 6_377_298.556, rf = 300.801_7, "Everest (Sabah & Sarawak)"),
    ellps!("fschr60", 6_378_166.0, rf = 298.3, "Fischer (Mercury Datum) 1960"),
    ellps!("fschr60m", 6_378_155.0, rf = 298.3, "Fischer 1960"),
    ellps!("fschr68", 6_378_150.0, rf = 298.3, "Fischer 1968"),
    ellps!("helmert", 6_378_200.0, rf = 298.3, "Helmert 1906"),
    ellps!("hough", 6_378_270.0, rf = 297.0, "Hough"),
    ellps!("intl", 6_378_388.0, rf = 297.0, "International 1909 (Hayford)"),
    ellps!("kaula", 6_378_163.0, rf = 298.24, "Kaula 1961"),
    ellps!("lerch", 6_378_139.0, rf = 298.257, "Lerch 1979"),
    ellps!("mprts", 6_397_300.0, rf = 191.0, "Maupertius 1738"),
    ellps!("new_intl", 6_378_157.5, b = 6_356_772.2, "New International 1967"),
    ellps!("plessis", 6_376_523.0, b = 6_355_863.0, "Plessis 1817 (France)"),
    ellps!("PZ90", 6_378_136.0, rf = 298.257_84, "PZ-90"),
    ellps!("krass", 6_378_245.0, rf = 298.3, "Krassovsky, 1942"),
    ellps!("SEasia", 6_378_155.0, b = 6_356_773.320_5, "Southeast Asia"),
    ellps!("walbeck", 6_376_896.0, b = 6_355_834.846_7, "Walbeck"),
    ellps!("WGS60", 6_378_165.0, rf = 298.3, "WGS 60"),
    ellps!("WGS66", 6_378_145.0, rf = 298.25, "WGS 66"),
    ellps!("WGS7", 6_378_135.0, rf = 298.26, "WGS 72"),
    ellps!("WGS72", 6_378_135.0, rf = 298.26, "WGS 72"),
    ellps!("WGS84", 6_378_137.0, rf = 298.257_223_563, "WGS 84"),
    ellps!("sphere", 6_370_997.0, b = 6_370_997.0, "Normal Sphere (r=6370997)"),
];

pub const WGS84: Ellipsoid = Ellipsoid {
    a: 6_378_137.0,
    b: 6_356_752.314_245_179,
    rf: 298.257_223_563,
    sphere: false,
};

fn named(name: &str) -> Option<&'static NamedEllipsoid> {
    let key = loose_key(name);
    ELLIPSOIDS
        .iter()
        .find(|e| loose_key(e.code) == key || loose_key(e.name) == key)
}

/// Whether `name` is a known ellipsoid code or descriptive name.
pub fn is_known(name: &str) -> bool {
    named(name).is_some()
}

impl Ellipsoid {
    /// Resolve axes from explicit values, falling back to the named table
    /// (WGS84 when the name is unknown or absent).
    pub fn resolve(a: Option<f64>, b: Option<f64>, rf: Option<f64>, name: Option<&str>) -> Self {
        let (a, mut b, rf) = match a {
            Some(a) => (a, b, rf),
            None => {
                let entry = name.and_then(named);
                match entry.map(|e| (e.a, e.shape)) {
                    Some((a, Shape::Rf(rf))) => (a, None, Some(rf)),
                    Some((a, Shape::B(b))) => (a, Some(b), None),
                    None => (WGS84.a, None, Some(WGS84.rf)),
                }
            }
        };

        if let (Some(rf), None) = (rf, b) {
            if rf != 0.0 {
                b = Some((1.0 - 1.0 / rf) * a);
            }
        }
        let mut b = b.unwrap_or(a);
        let rf = rf.unwrap_or_else(|| if a != b { a / (a - b) } else { 0.0 });

        let sphere = rf == 0.0 || (a - b).abs() < SPHERE_EPSILON;
        if sphere {
            b = a;
        }
        Self { a, b, rf, sphere }
    }

    /// Eccentricities for this ellipsoid.
    ///
    /// With `authalic`, also returns the radius of the sphere of equal area and
    /// forces `es = 0`; otherwise the returned radius is `a` unchanged.
    pub fn eccentricity(&self, authalic: bool) -> (f64, Eccentricity) {
        let b2 = self.b * self.b;
        let mut a = self.a;
        let mut a2 = a * a;
        let mut es = (a2 - b2) / a2;
        let mut e = 0.0;
        if authalic {
            a *= 1.0 - es * (SIXTH + es * (RA4 + es * RA6));
            a2 = a * a;
            es = 0.0;
        } else {
            e = es.sqrt();
        }
        let ep2 = (a2 - b2) / b2;
        (a, Eccentricity { es, e, ep2 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_wgs84_constants() {
        let ell = Ellipsoid::resolve(None, None, None, Some("WGS84"));
        assert_relative_eq!(ell.a, 6_378_137.0);
        assert_relative_eq!(ell.b, 6_356_752.314_245_179, epsilon = 0.001);
        let (_, ecc) = ell.eccentricity(false);
        assert_relative_eq!(ecc.e, 0.081_819_190_842_622, epsilon = 1e-12);
        assert!(!ell.sphere);
    }

    #[test]
    fn test_unknown_name_defaults_to_wgs84() {
        let ell = Ellipsoid::resolve(None, None, None, Some("no-such-thing"));
        assert_relative_eq!(ell.a, WGS84.a);
        assert_relative_eq!(ell.rf, WGS84.rf);
    }

    #[test]
    fn test_lookup_is_loose() {
        let a = Ellipsoid::resolve(None, None, None, Some("Clrk-66"));
        assert_relative_eq!(a.a, 6_378_206.4);
        let b = Ellipsoid::resolve(None, None, None, Some("International 1909 (Hayford)"));
        assert_relative_eq!(b.a, 6_378_388.0);
    }

    #[test]
    fn test_historical_codes_are_known() {
        for code in [
            "WGS60", "WGS66", "fschr60m", "hough", "kaula", "lerch", "mprts", "new_intl", "plessis",
            "SEasia", "walbeck", "sphere", "APL4", "NWL9D", "CPM", "delmbr", "engelis", "evrstSS",
        ] {
            assert!(is_known(code), "{code}");
        }
        let mprts = Ellipsoid::resolve(None, None, None, Some("mprts"));
        assert_relative_eq!(mprts.a, 6_397_300.0);
        assert_relative_eq!(mprts.rf, 191.0);
    }

    #[test]
    fn test_sphere_degeneration() {
        let ell = Ellipsoid::resolve(Some(6_370_997.0), Some(6_370_997.0), None, None);
        assert!(ell.sphere);
        let (_, ecc) = ell.eccentricity(false);
        assert_eq!(ecc.es, 0.0);

        let zero_rf = Ellipsoid::resolve(Some(6_371_000.0), None, Some(0.0), None);
        assert!(zero_rf.sphere);
        assert_eq!(zero_rf.b, zero_rf.a);
    }

    #[test]
    fn test_b_from_rf() {
        let ell = Ellipsoid::resolve(Some(6_378_388.0), None, Some(297.0), None);
        assert_relative_eq!(ell.b, 6_378_388.0 * (1.0 - 1.0 / 297.0));
    }

    #[test]
    fn test_authalic_radius() {
        let (r, ecc) = WGS84.eccentricity(true);
        assert_eq!(ecc.es, 0.0);
        assert_relative_eq!(r, 6_371_007.18, epsilon = 0.05);
    }
}
