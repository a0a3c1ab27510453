//! PROJJSON-shaped CRS objects to parameters.
//!
//! Shared by the WKT2 front end and by callers handing in PROJJSON directly.

use serde_json::{Map, Value};

use super::fixups::{apply_projection_fixups, datum_code_from_name};
use super::units::unit_to_meter;
use super::validate_axis;
use crate::error::{ProjError, Result};
use crate::params::ProjParams;

#[derive(Clone, Copy)]
enum Target {
    Lat0,
    Lat0AndLat1,
    Lat1,
    Lat2,
    Long0,
    Longc,
    X0,
    Y0,
    K0,
    Alpha,
    Gamma,
}

/// Applied in order; a later match overrides an earlier one.
const SYNONYMS: &[(&str, Target)] = &[
    ("latitude_of_false_origin", Target::Lat0),
    ("longitude_of_false_origin", Target::Long0),
    ("latitude_of_standard_parallel", Target::Lat0AndLat1),
    ("latitude_of_1st_standard_parallel", Target::Lat1),
    ("latitude_of_2nd_standard_parallel", Target::Lat2),
    ("latitude_of_projection_centre", Target::Lat0),
    ("longitude_of_projection_centre", Target::Longc),
    ("easting_at_false_origin", Target::X0),
    ("northing_at_false_origin", Target::Y0),
    ("latitude_of_natural_origin", Target::Lat0),
    ("longitude_of_natural_origin", Target::Long0),
    ("longitude_of_origin", Target::Long0),
    ("false_easting", Target::X0),
    ("easting_at_projection_centre", Target::X0),
    ("false_northing", Target::Y0),
    ("northing_at_projection_centre", Target::Y0),
    ("standard_parallel_1", Target::Lat1),
    ("standard_parallel_2", Target::Lat2),
    ("scale_factor_at_natural_origin", Target::K0),
    ("scale_factor_at_projection_centre", Target::K0),
    ("scale_factor_on_initial_line", Target::K0),
    ("scale_factor_on_pseudo_standard_parallel", Target::K0),
    ("azimuth", Target::Alpha),
    ("azimuth_of_initial_line", Target::Alpha),
    ("azimuth_at_projection_centre", Target::Alpha),
    ("angle_from_rectified_to_skew_grid", Target::Gamma),
];

fn set(p: &mut ProjParams, target: Target, v: f64) {
    match target {
        Target::Lat0 => p.lat0 = Some(v),
        Target::Lat0AndLat1 => {
            p.lat0 = Some(v);
            p.lat1 = Some(v);
        }
        Target::Lat1 => p.lat1 = Some(v),
        Target::Lat2 => p.lat2 = Some(v),
        Target::Long0 => p.long0 = Some(v),
        Target::Longc => p.longc = Some(v),
        Target::X0 => p.x0 = Some(v),
        Target::Y0 => p.y0 = Some(v),
        Target::K0 => p.k0 = Some(v),
        Target::Alpha => p.alpha = Some(v),
        Target::Gamma => p.rectified_grid_angle = Some(v),
    }
}

fn obj<'a>(v: &'a Value, key: &str) -> Option<&'a Map<String, Value>> {
    v.get(key).and_then(Value::as_object)
}

fn text<'a>(v: &'a Value, key: &str) -> Option<&'a str> {
    v.get(key).and_then(Value::as_str)
}

/// A number, or `{ "value": n, ... }`.
fn measure(v: Option<&Value>) -> Option<f64> {
    match v? {
        Value::Number(n) => n.as_f64(),
        Value::Object(m) => m.get("value").and_then(Value::as_f64),
        _ => None,
    }
}

/// Lower-cased, whitespace runs joined with `_`.
fn parameter_key(name: &str) -> String {
    name.to_lowercase().split_whitespace().collect::<Vec<_>>().join("_")
}

/// Parameter value in radians or metres.
fn parameter_value(param: &Value) -> Option<f64> {
    let value = param.get("value").and_then(Value::as_f64)?;
    Some(match param.get("unit") {
        Some(Value::Object(unit)) => {
            value * unit.get("conversion_factor").and_then(Value::as_f64).unwrap_or(1.0)
        }
        Some(Value::String(unit)) if unit.eq_ignore_ascii_case("degree") => value.to_radians(),
        _ => value,
    })
}

fn read_ellipsoid(e: &Value, p: &mut ProjParams) {
    p.ellps = text(e, "name").map(str::to_string);
    if let Some(r) = measure(e.get("radius")) {
        p.a = Some(r);
        p.b = Some(r);
        return;
    }
    p.a = measure(e.get("semi_major_axis"));
    if let Some(rf) = e.get("inverse_flattening").and_then(Value::as_f64) {
        p.rf = Some(rf);
    } else if let Some(b) = measure(e.get("semi_minor_axis")) {
        p.b = Some(b);
    }
}

/// Datum, ellipsoid and prime meridian, from the CRS or its base.
fn read_datum(crs: &Value, p: &mut ProjParams) {
    let datum = crs.get("datum").or_else(|| crs.get("datum_ensemble"));
    let Some(datum) = datum else {
        if let Some(base) = crs.get("base_crs") {
            read_datum(base, p);
        }
        return;
    };
    if let Some(name) = text(datum, "name") {
        p.datum_name = Some(name.to_string());
        p.datum_code = Some(datum_code_from_name(name));
    }
    if let Some(e) = datum.get("ellipsoid") {
        read_ellipsoid(e, p);
    }
    let pm = datum.get("prime_meridian").or_else(|| crs.get("prime_meridian"));
    if let Some(lon) = pm.and_then(|pm| measure(pm.get("longitude"))) {
        if lon != 0.0 {
            p.from_greenwich = Some(lon.to_radians());
        }
    }
}

fn read_coordinate_system(cs: &Value, p: &mut ProjParams) -> Result<()> {
    let Some(axes) = cs.get("axis").and_then(Value::as_array) else {
        return Ok(());
    };
    let mut order = String::new();
    for axis in axes {
        let direction = text(axis, "direction").unwrap_or_default();
        order.push(match direction.to_lowercase().as_str() {
            "east" => 'e',
            "west" => 'w',
            "north" => 'n',
            "south" => 's',
            "up" => 'u',
            "down" => 'd',
            _ => return Err(ProjError::InvalidAxis(direction.to_string())),
        });
    }
    if order.len() == 2 {
        order.push('u');
    }
    if order.len() == 3 {
        p.axis = Some(validate_axis(&order)?);
    }

    let unit = axes.first().and_then(|a| a.get("unit")).or_else(|| cs.get("unit"));
    match unit {
        Some(Value::String(name)) => {
            p.units = Some(normalized_unit(name));
            p.to_meter = unit_to_meter(name);
        }
        Some(unit @ Value::Object(_)) => {
            let name = text(unit, "name").unwrap_or_default();
            p.units = Some(normalized_unit(name));
            if text(unit, "type") != Some("AngularUnit") {
                p.to_meter = unit.get("conversion_factor").and_then(Value::as_f64);
            }
        }
        _ => {}
    }
    Ok(())
}

fn normalized_unit(name: &str) -> String {
    match name.to_lowercase().as_str() {
        "metre" => "meter".to_string(),
        other => other.to_string(),
    }
}

fn read_conversion(conversion: &Value, p: &mut ProjParams) {
    if let Some(method) = conversion.get("method").and_then(|m| text(m, "name")) {
        p.proj_name = Some(method.to_string());
    }
    let Some(params) = conversion.get("parameters").and_then(Value::as_array) else {
        return;
    };
    let mut values = Vec::with_capacity(params.len());
    for param in params {
        let key = parameter_key(text(param, "name").unwrap_or_default());
        if let Some(v) = parameter_value(param) {
            values.push((key, v, param.get("value").cloned().unwrap_or(Value::Null)));
        }
    }
    for (name, target) in SYNONYMS {
        if let Some((_, v, _)) = values.iter().find(|(k, _, _)| k == name) {
            set(p, *target, *v);
        }
    }
    for (key, _, raw) in values {
        if !SYNONYMS.iter().any(|(name, _)| *name == key) {
            p.extra.insert(key, raw.to_string());
        }
    }
}

fn read_transformation(t: &Value, p: &mut ProjParams) {
    let params = t.get("parameters").and_then(Value::as_array);
    let is_grid = text(t.get("method").unwrap_or(&Value::Null), "name")
        .is_some_and(|m| m.eq_ignore_ascii_case("ntv2"))
        || params.is_some_and(|ps| ps.iter().any(|p| p.get("value").is_some_and(Value::is_string)));
    let Some(params) = params else {
        return;
    };
    if is_grid {
        p.nadgrids = params.iter().find_map(|v| text(v, "value")).map(str::to_string);
    } else {
        p.datum_params = Some(
            params
                .iter()
                .filter_map(|v| v.get("value").and_then(Value::as_f64))
                .collect(),
        );
    }
}

fn flatten(crs: &Value, p: &mut ProjParams) -> Result<()> {
    let kind = text(crs, "type")
        .ok_or_else(|| ProjError::Definition("PROJJSON object without a type".into()))?;

    if kind == "BoundCRS" {
        let source = crs
            .get("source_crs")
            .ok_or_else(|| ProjError::Definition("BoundCRS without source_crs".into()))?;
        flatten(source, p)?;
        if let Some(t) = crs.get("transformation") {
            read_transformation(t, p);
        }
        return Ok(());
    }

    p.proj_name = match kind {
        "GeographicCRS" => Some("longlat".to_string()),
        "GeodeticCRS" => Some("geocent".to_string()),
        "EngineeringCRS" => Some("identity".to_string()),
        "ProjectedCRS" => None,
        other => {
            return Err(ProjError::Definition(format!("unsupported PROJJSON CRS type {other}")));
        }
    };
    if p.srs_code.is_none() {
        p.srs_code = text(crs, "name").map(str::to_string);
    }
    read_datum(crs, p);
    if let Some(conversion) = crs.get("conversion") {
        read_conversion(conversion, p);
    }
    if p.proj_name.is_none() {
        return Err(ProjError::Definition("ProjectedCRS without a conversion method".into()));
    }
    if let Some(cs) = crs.get("coordinate_system") {
        read_coordinate_system(cs, p)?;
    }
    if let Some(id) = obj(crs, "id") {
        if let (Some(authority), Some(code)) = (id.get("authority"), id.get("code")) {
            let code = code.as_str().map_or_else(|| code.to_string(), str::to_string);
            p.title = Some(format!("{}:{code}", authority.as_str().unwrap_or_default()));
        }
    }
    Ok(())
}

/// Flatten a PROJJSON CRS (or its WKT2 equivalent) into parameters.
pub fn to_params(crs: &Value) -> Result<ProjParams> {
    let mut p = ProjParams::default();
    flatten(crs, &mut p)?;
    apply_projection_fixups(&mut p);
    Ok(p)
}

/// `authority:code` of the top-level CRS, looking through a bound CRS.
pub fn authority_code(crs: &Value) -> Option<(String, String)> {
    let crs = if text(crs, "type") == Some("BoundCRS") {
        crs.get("source_crs")?
    } else {
        crs
    };
    let id = obj(crs, "id")?;
    let authority = id.get("authority")?.as_str()?.to_string();
    let code = id.get("code")?;
    Some((authority, code.as_str().map_or_else(|| code.to_string(), str::to_string)))
}
