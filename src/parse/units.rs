//! Linear unit and prime meridian tables used by `+units=` and `+pm=`.

use crate::names::loose_key;

/// Metres per unit.
const UNITS: &[(&str, f64)] = &[
    ("m", 1.0),
    ("meter", 1.0),
    ("metre", 1.0),
    ("km", 1000.0),
    ("dm", 0.1),
    ("cm", 0.01),
    ("mm", 0.001),
    ("kmi", 1852.0),
    ("in", 0.0254),
    ("ft", 0.3048),
    ("yd", 0.9144),
    ("mi", 1609.344),
    ("fath", 1.8288),
    ("ch", 20.1168),
    ("link", 0.201168),
    ("us-in", 1.0 / 39.37),
    ("us-ft", 1200.0 / 3937.0),
    ("us-yd", 3600.0 / 3937.0),
    ("us-ch", 79200.0 / 3937.0),
    ("us-mi", 6336000.0 / 3937.0),
    ("ind-yd", 0.91439523),
    ("ind-ft", 0.30479841),
    ("ind-ch", 20.11669506),
];

/// Prime meridians, degrees east of Greenwich.
const PRIME_MERIDIANS: &[(&str, f64)] = &[
    ("greenwich", 0.0),
    ("lisbon", -9.131906111111),
    ("paris", 2.337229166667),
    ("bogota", -74.080916666667),
    ("madrid", -3.687938888889),
    ("rome", 12.452333333333),
    ("bern", 7.439583333333),
    ("jakarta", 106.807719444444),
    ("ferro", -17.666666666667),
    ("brussels", 4.367975),
    ("stockholm", 18.058277777778),
    ("athens", 23.7163375),
    ("oslo", 10.722916666667),
];

/// Metres per `unit`, for the linear units we know.
pub fn unit_to_meter(unit: &str) -> Option<f64> {
    let key = unit.trim().to_lowercase();
    UNITS
        .iter()
        .find(|(name, _)| *name == key)
        .or_else(|| {
            let loose = loose_key(&key);
            UNITS.iter().find(|(name, _)| loose_key(name) == loose)
        })
        .map(|&(_, factor)| factor)
}

/// Longitude of a named prime meridian in degrees.
pub fn prime_meridian(name: &str) -> Option<f64> {
    let key = loose_key(name);
    PRIME_MERIDIANS
        .iter()
        .find(|(pm, _)| *pm == key)
        .map(|&(_, lon)| lon)
}
