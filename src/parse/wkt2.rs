//! WKT2 to a PROJJSON-shaped object.
//!
//! Only the members the flattening pass reads are produced: names, ids,
//! datum/ellipsoid/prime meridian, conversion method and parameters,
//! coordinate system axes, and bound-CRS transformations.

use std::f64::consts::PI;

use serde_json::{json, Map, Value};

use super::wkt::Wkt;
use crate::error::{ProjError, Result};

const PROJECTED: &[&str] = &["PROJCRS", "PROJECTEDCRS", "BASEPROJCRS"];
const GEOGRAPHIC: &[&str] = &[
    "GEOGCRS",
    "GEOGRAPHICCRS",
    "GEODCRS",
    "GEODETICCRS",
    "BASEGEOGCRS",
    "BASEGEODCRS",
];
const DATUMS: &[&str] = &["DATUM", "GEODETICDATUM", "TRF"];
const UNITS: &[&str] = &["LENGTHUNIT", "ANGLEUNIT", "SCALEUNIT", "UNIT"];

fn is(node: &Wkt, keywords: &[&str]) -> bool {
    node.keyword()
        .is_some_and(|k| keywords.iter().any(|w| w.eq_ignore_ascii_case(k)))
}

fn child_of<'a>(node: &'a Wkt, keywords: &[&str]) -> Option<&'a Wkt> {
    node.args().iter().find(|a| is(a, keywords))
}

/// Whether a tree uses the WKT2 vocabulary.
pub fn is_wkt2(tree: &Wkt) -> bool {
    const ROOTS: &[&str] = &[
        "PROJCRS",
        "PROJECTEDCRS",
        "GEOGCRS",
        "GEOGRAPHICCRS",
        "GEODCRS",
        "GEODETICCRS",
        "BOUNDCRS",
        "COMPOUNDCRS",
        "ENGCRS",
        "ENGINEERINGCRS",
    ];
    is(tree, ROOTS)
}

fn name_of(node: &Wkt) -> Value {
    node.str_arg(0).map_or(Value::Null, |s| Value::String(s.to_string()))
}

fn id_of(node: &Wkt) -> Option<Value> {
    let id = child_of(node, &["ID", "AUTHORITY"])?;
    let authority = id.str_arg(0)?;
    let code = match id.args().get(1)? {
        Wkt::Number(n) if n.fract() == 0.0 => Value::from(*n as i64),
        Wkt::Number(n) => Value::from(*n),
        other => Value::String(other.as_str().unwrap_or_default().to_string()),
    };
    Some(json!({ "authority": authority, "code": code }))
}

fn unit_of(node: &Wkt) -> Option<Value> {
    let unit = child_of(node, UNITS)?;
    let kind = match unit.keyword().unwrap_or_default().to_uppercase().as_str() {
        "LENGTHUNIT" => "LinearUnit",
        "ANGLEUNIT" => "AngularUnit",
        "SCALEUNIT" => "ScaleUnit",
        _ => "Unit",
    };
    Some(json!({
        "type": kind,
        "name": unit.str_arg(0).unwrap_or_default(),
        "conversion_factor": unit.f64_arg(1).unwrap_or(1.0),
    }))
}

fn factor(unit: Option<&Value>) -> f64 {
    unit.and_then(|u| u.get("conversion_factor"))
        .and_then(Value::as_f64)
        .unwrap_or(1.0)
}

fn ellipsoid(node: &Wkt) -> Value {
    let to_metre = factor(unit_of(node).as_ref());
    let a = node.f64_arg(1).unwrap_or(0.0) * to_metre;
    let rf = node.f64_arg(2).unwrap_or(0.0);
    let mut out = json!({ "name": name_of(node), "semi_major_axis": a });
    if rf == 0.0 {
        out["radius"] = Value::from(a);
    } else {
        out["inverse_flattening"] = Value::from(rf);
    }
    out
}

fn prime_meridian(node: &Wkt) -> Value {
    // conversion factors are radians per unit; degrees when no unit is given
    let to_radians = unit_of(node).map_or(PI / 180.0, |u| factor(Some(&u)));
    json!({
        "name": name_of(node),
        "longitude": (node.f64_arg(1).unwrap_or(0.0) * to_radians).to_degrees(),
    })
}

fn datum(crs: &Wkt) -> Option<(&'static str, Value)> {
    let (key, kind, node) = if let Some(d) = child_of(crs, DATUMS) {
        ("datum", "GeodeticReferenceFrame", d)
    } else {
        ("datum_ensemble", "DatumEnsemble", child_of(crs, &["ENSEMBLE"])?)
    };
    let mut out = json!({ "type": kind, "name": name_of(node) });
    if let Some(e) = child_of(node, &["ELLIPSOID", "SPHEROID"]) {
        out["ellipsoid"] = ellipsoid(e);
    }
    if let Some(pm) = child_of(crs, &["PRIMEM", "PRIMEMERIDIAN"]) {
        out["prime_meridian"] = prime_meridian(pm);
    }
    Some((key, out))
}

fn parameters(node: &Wkt) -> Vec<Value> {
    node.children("PARAMETER")
        .map(|p| {
            let mut param = json!({ "name": name_of(p), "value": p.f64_arg(1) });
            if let Some(unit) = unit_of(p) {
                param["unit"] = unit;
            }
            param
        })
        .chain(node.children("PARAMETERFILE").map(|p| {
            json!({ "name": name_of(p), "value": p.str_arg(1).unwrap_or_default() })
        }))
        .collect()
}

fn method(node: &Wkt) -> Value {
    let method = child_of(node, &["METHOD", "PROJECTION"]);
    json!({ "name": method.map_or(Value::Null, name_of) })
}

fn coordinate_system(crs: &Wkt) -> Option<Value> {
    let cs = child_of(crs, &["CS"]);
    let shared_unit = unit_of(crs);
    let axes: Vec<Value> = crs
        .children("AXIS")
        .map(|axis| {
            let mut out = json!({
                "name": name_of(axis),
                "direction": axis.str_arg(1).unwrap_or_default().to_lowercase(),
            });
            if let Some(unit) = unit_of(axis).or_else(|| shared_unit.clone()) {
                out["unit"] = unit;
            }
            out
        })
        .collect();
    if cs.is_none() && axes.is_empty() {
        return None;
    }
    let subtype = cs.and_then(|c| c.str_arg(0)).unwrap_or_default().to_lowercase();
    Some(json!({ "subtype": subtype, "axis": axes }))
}

fn crs(node: &Wkt) -> Result<Value> {
    let mut out = Map::new();
    out.insert("name".into(), name_of(node));

    if is(node, PROJECTED) {
        out.insert("type".into(), "ProjectedCRS".into());
        let base = child_of(node, &["BASEGEOGCRS", "BASEGEODCRS", "BASEPROJCRS"])
            .ok_or_else(|| ProjError::Wkt("PROJCRS without a base CRS".into()))?;
        out.insert("base_crs".into(), crs(base)?);
        let conversion = child_of(node, &["CONVERSION", "DERIVINGCONVERSION"])
            .ok_or_else(|| ProjError::Wkt("PROJCRS without a CONVERSION".into()))?;
        out.insert(
            "conversion".into(),
            json!({
                "name": name_of(conversion),
                "method": method(conversion),
                "parameters": parameters(conversion),
            }),
        );
    } else if is(node, GEOGRAPHIC) {
        let cartesian = child_of(node, &["CS"])
            .and_then(|c| c.str_arg(0))
            .is_some_and(|s| s.eq_ignore_ascii_case("cartesian"));
        let kind = if cartesian { "GeodeticCRS" } else { "GeographicCRS" };
        out.insert("type".into(), kind.into());
        if let Some((key, d)) = datum(node) {
            out.insert(key.into(), d);
        }
    } else if is(node, &["BOUNDCRS"]) {
        out.insert("type".into(), "BoundCRS".into());
        let inner = |keyword: &str| -> Result<Value> {
            let wrapper = child_of(node, &[keyword])
                .ok_or_else(|| ProjError::Wkt(format!("BOUNDCRS without {keyword}")))?;
            let target = wrapper
                .args()
                .iter()
                .find(|a| a.keyword().is_some())
                .ok_or_else(|| ProjError::Wkt(format!("empty {keyword}")))?;
            crs(target)
        };
        out.insert("source_crs".into(), inner("SOURCECRS")?);
        out.insert("target_crs".into(), inner("TARGETCRS")?);
        if let Some(t) = child_of(node, &["ABRIDGEDTRANSFORMATION"]) {
            out.insert(
                "transformation".into(),
                json!({
                    "name": name_of(t),
                    "method": method(t),
                    "parameters": parameters(t),
                }),
            );
        }
        out.remove("name");
    } else if is(node, &["COMPOUNDCRS"]) {
        // the horizontal component comes first
        let horizontal = node
            .args()
            .iter()
            .find(|a| is(a, PROJECTED) || is(a, GEOGRAPHIC) || is(a, &["BOUNDCRS"]))
            .ok_or_else(|| ProjError::Wkt("COMPOUNDCRS without a horizontal CRS".into()))?;
        return crs(horizontal);
    } else if is(node, &["ENGCRS", "ENGINEERINGCRS"]) {
        out.insert("type".into(), "EngineeringCRS".into());
    } else {
        return Err(ProjError::Wkt(format!(
            "unsupported WKT2 node {}",
            node.keyword().unwrap_or_default()
        )));
    }

    if let Some(cs) = coordinate_system(node) {
        out.insert("coordinate_system".into(), cs);
    }
    if let Some(id) = id_of(node) {
        out.insert("id".into(), id);
    }
    Ok(Value::Object(out))
}

/// Convert a WKT2 tree to its PROJJSON form.
pub fn to_projjson(tree: &Wkt) -> Result<Value> {
    crs(tree)
}
