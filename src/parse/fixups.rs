//! Repairs shared by the WKT front ends.

use std::f64::consts::FRAC_PI_2;

use crate::params::ProjParams;

fn normalized_name(name: &str) -> String {
    name.to_lowercase().replace('_', " ")
}

/// Resolve the legacy projection encodings that put the true-scale latitude
/// of a polar stereographic (or two-parallel Mercator) in the wrong field,
/// and default `long0` from `longc` where a centre longitude stands in for it.
pub fn apply_projection_fixups(p: &mut ProjParams) {
    let name = normalized_name(p.proj_name.as_deref().unwrap_or_default());

    if p.long0.unwrap_or(0.0) == 0.0
        && p.longc.is_some_and(|l| l != 0.0)
        && matches!(
            name.as_str(),
            "albers conic equal area" | "lambert azimuthal equal area"
        )
    {
        p.long0 = p.longc;
    }

    let no_lat_ts = p.lat_ts.unwrap_or(0.0) == 0.0;
    if no_lat_ts && matches!(name.as_str(), "mercator 2sp" | "mercator (variant b)") {
        p.lat_ts = p.lat1;
        return;
    }
    match (p.lat1, p.lat0) {
        (Some(lat1), _)
            if no_lat_ts
                && lat1 != 0.0
                && matches!(
                    name.as_str(),
                    "stereographic south pole" | "polar stereographic (variant b)"
                ) =>
        {
            p.lat0 = Some(if lat1 > 0.0 { FRAC_PI_2 } else { -FRAC_PI_2 });
            p.lat_ts = Some(lat1);
            p.lat1 = None;
        }
        (_, Some(lat0))
            if no_lat_ts
                && lat0 != 0.0
                && matches!(
                    name.as_str(),
                    "polar stereographic" | "polar stereographic (variant a)"
                ) =>
        {
            p.lat_ts = Some(lat0);
            p.lat0 = Some(if lat0 > 0.0 { FRAC_PI_2 } else { -FRAC_PI_2 });
            p.lat1 = None;
        }
        _ => {}
    }
}

/// Datum code from a WKT datum name, e.g. `D_North_American_1983` gives
/// `north_american_1983` and `WGS_1984` gives `wgs84`.
pub fn datum_code_from_name(name: &str) -> String {
    let mut code = name.to_lowercase();
    if let Some(stripped) = code.strip_prefix("d_") {
        code = stripped.to_string();
    }
    code = code.replace(' ', "_");

    for suffix in ["_ferro", "_jakarta"] {
        if let Some(stripped) = code.strip_suffix(suffix) {
            code = stripped.to_string();
        }
    }

    let renamed = match code.as_str() {
        "new_zealand_1949" | "new_zealand_geodetic_datum_1949" => Some("nzgd49"),
        "wgs_1984" => Some("wgs84"),
        c if c.starts_with("world_geodetic_system_1984") => Some("wgs84"),
        "ch1903+" => Some("ch1903"),
        c if c.contains("belge") => Some("rnb72"),
        c if c.contains("osgb_1936") => Some("osgb36"),
        c if c.contains("osni_1952") => Some("osni52"),
        c if c.contains("tm65") || c.contains("geodetic_datum_of_1965") => Some("ire65"),
        c if c.contains("israel") => Some("isr93"),
        _ => None,
    };
    renamed.map(str::to_string).unwrap_or(code)
}

/// Ellipsoid table key from a WKT spheroid name.
pub fn ellipsoid_from_name(name: &str) -> String {
    let mut ellps = name.replacen("_19", "", 1);
    for clarke in ["Clarke_18", "clarke_18"] {
        ellps = ellps.replacen(clarke, "clrk", 1);
    }
    if ellps.to_lowercase().starts_with("international") {
        ellps = "intl".to_string();
    }
    ellps
}
