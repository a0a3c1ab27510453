//! Normalized parameter map shared by every CRS front end.

use std::collections::BTreeMap;

/// CRS parameters before ellipsoid, datum and projection resolution.
///
/// Angles are radians. Keys without a dedicated field land in `extra`
/// verbatim (e.g. `ellps`-less projection knobs such as `h`, `sweep`,
/// `o_proj`), for the projection `init` to consume.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProjParams {
    pub proj_name: Option<String>,
    pub srs_code: Option<String>,
    pub title: Option<String>,
    pub datum_code: Option<String>,
    pub datum_name: Option<String>,
    pub ellps: Option<String>,

    pub a: Option<f64>,
    pub b: Option<f64>,
    pub rf: Option<f64>,
    /// Replace the ellipsoid by its authalic sphere (`+R_A`)
    pub r_a: bool,
    /// Treat the ellipsoid as a sphere even if `b != a`
    pub sphere: bool,

    pub lat0: Option<f64>,
    pub lat1: Option<f64>,
    pub lat2: Option<f64>,
    pub lat_ts: Option<f64>,
    pub long0: Option<f64>,
    pub long1: Option<f64>,
    pub long2: Option<f64>,
    pub longc: Option<f64>,
    pub alpha: Option<f64>,
    pub rectified_grid_angle: Option<f64>,

    pub x0: Option<f64>,
    pub y0: Option<f64>,
    pub k0: Option<f64>,

    pub zone: Option<i32>,
    pub utm_south: bool,

    pub datum_params: Option<Vec<f64>>,
    pub nadgrids: Option<String>,

    pub to_meter: Option<f64>,
    pub units: Option<String>,
    pub from_greenwich: Option<f64>,
    pub axis: Option<String>,

    pub approx: bool,
    pub over: bool,

    pub extra: BTreeMap<String, String>,
}

impl ProjParams {
    /// Raw value of a pass-through key.
    pub fn extra(&self, key: &str) -> Option<&str> {
        self.extra.get(key).map(String::as_str)
    }

    /// Pass-through key parsed as a number.
    pub fn extra_f64(&self, key: &str) -> Option<f64> {
        self.extra(key).and_then(|v| v.trim().parse().ok())
    }

    /// Pass-through key holding degrees, returned in radians.
    pub fn extra_angle(&self, key: &str) -> Option<f64> {
        self.extra_f64(key).map(f64::to_radians)
    }

    /// Presence of a pass-through flag such as `+no_uoff`.
    pub fn has(&self, key: &str) -> bool {
        self.extra.contains_key(key)
    }
}
