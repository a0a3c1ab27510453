//! `+key=value` PROJ string front end.

use super::units::{prime_meridian, unit_to_meter};
use super::validate_axis;
use crate::error::{ProjError, Result};
use crate::params::ProjParams;

fn number(key: &str, value: Option<&str>) -> Result<f64> {
    let value = value.ok_or_else(|| ProjError::MissingParameter(format!("value for +{key}")))?;
    value
        .trim()
        .parse()
        .map_err(|_| ProjError::InvalidParameter(format!("+{key}={value}")))
}

fn angle(key: &str, value: Option<&str>) -> Result<f64> {
    number(key, value).map(f64::to_radians)
}

fn text(key: &str, value: Option<&str>) -> Result<String> {
    value
        .map(str::to_string)
        .ok_or_else(|| ProjError::MissingParameter(format!("value for +{key}")))
}

/// Parse a PROJ string such as `+proj=utm +zone=32 +datum=WGS84`.
///
/// Keys without a dedicated field are kept verbatim in `extra`.
pub fn parse_proj_string(definition: &str) -> Result<ProjParams> {
    let mut p = ProjParams::default();

    for token in definition.split('+').map(str::trim).filter(|t| !t.is_empty()) {
        let (key, value) = match token.split_once('=') {
            Some((k, v)) => (k.trim().to_lowercase(), Some(v.trim())),
            None => (token.to_lowercase(), None),
        };
        let k = key.as_str();
        match k {
            "proj" => p.proj_name = Some(text(k, value)?),
            "datum" => p.datum_code = Some(text(k, value)?),
            "ellps" => p.ellps = Some(text(k, value)?),
            "title" => p.title = value.map(str::to_string),
            "a" => p.a = Some(number(k, value)?),
            "b" => p.b = Some(number(k, value)?),
            "rf" => p.rf = Some(number(k, value)?),
            "r" => {
                let r = number(k, value)?;
                p.a = Some(r);
                p.b = Some(r);
            }
            "r_a" => p.r_a = true,
            "sphere" => p.sphere = true,
            "lat_0" => p.lat0 = Some(angle(k, value)?),
            "lat_1" => p.lat1 = Some(angle(k, value)?),
            "lat_2" => p.lat2 = Some(angle(k, value)?),
            "lat_ts" => p.lat_ts = Some(angle(k, value)?),
            "lon_0" => p.long0 = Some(angle(k, value)?),
            "lon_1" => p.long1 = Some(angle(k, value)?),
            "lon_2" => p.long2 = Some(angle(k, value)?),
            "lonc" => p.longc = Some(angle(k, value)?),
            "alpha" => p.alpha = Some(angle(k, value)?),
            "gamma" => p.rectified_grid_angle = Some(angle(k, value)?),
            "x_0" => p.x0 = Some(number(k, value)?),
            "y_0" => p.y0 = Some(number(k, value)?),
            "k_0" | "k" => p.k0 = Some(number(k, value)?),
            "zone" => {
                let zone = text(k, value)?;
                p.zone = Some(
                    zone.parse()
                        .map_err(|_| ProjError::InvalidParameter(format!("+zone={zone}")))?,
                );
            }
            "south" => p.utm_south = true,
            "towgs84" => {
                let list = text(k, value)?;
                p.datum_params = Some(
                    list.split(',')
                        .map(|v| number(k, Some(v)))
                        .collect::<Result<Vec<_>>>()?,
                );
            }
            "to_meter" => p.to_meter = Some(number(k, value)?),
            "units" => {
                let units = text(k, value)?;
                if let Some(factor) = unit_to_meter(&units) {
                    p.to_meter = Some(factor);
                }
                p.units = Some(units);
            }
            "from_greenwich" => p.from_greenwich = Some(angle(k, value)?),
            "pm" => {
                let pm = text(k, value)?;
                let degrees = match prime_meridian(&pm) {
                    Some(lon) => lon,
                    None => number(k, Some(&pm))?,
                };
                p.from_greenwich = Some(degrees.to_radians());
            }
            "nadgrids" => {
                let grids = text(k, value)?;
                if grids == "@null" {
                    p.datum_code = Some("none".to_string());
                } else {
                    p.nadgrids = Some(grids);
                }
            }
            "axis" => p.axis = Some(validate_axis(&text(k, value)?)?),
            "approx" => p.approx = true,
            "over" => p.over = true,
            _ => {
                p.extra.insert(key.clone(), value.unwrap_or_default().to_string());
            }
        }
    }

    // only the exact spelling `WGS84` is kept as-is
    if let Some(code) = p.datum_code.as_mut() {
        if code != "WGS84" {
            *code = code.to_lowercase();
        }
    }
    Ok(p)
}
