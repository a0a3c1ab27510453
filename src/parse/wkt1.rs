//! Legacy WKT (WKT1 / ESRI) to parameters.
//!
//! The bracket tree is first folded into a JSON object keyed by WKT keyword
//! (`PARAMETER` entries keyed by their own name), then read back into a
//! [`ProjParams`].

use serde_json::{Map, Value};

use super::fixups::{apply_projection_fixups, datum_code_from_name, ellipsoid_from_name};
use super::validate_axis;
use super::wkt::Wkt;
use crate::error::{ProjError, Result};
use crate::params::ProjParams;

/// Keywords whose node becomes a named object tagged with its CRS type.
const CRS_KEYWORDS: &[&str] = &[
    "COMPD_CS",
    "FITTED_CS",
    "GEOGCS",
    "GEOCCS",
    "PROJCS",
    "LOCAL_CS",
];

const DATUM_KEYWORDS: &[&str] = &["DATUM", "LOCAL_DATUM", "VERT_CS"];

fn scalar(item: &Wkt) -> Value {
    match item {
        Wkt::Text(s) | Wkt::Word(s) => Value::String(s.clone()),
        Wkt::Number(n) => Value::from(*n),
        Wkt::Node { .. } => Value::Null,
    }
}

fn scalar_string(item: &Wkt) -> String {
    match item {
        Wkt::Number(n) => n.to_string(),
        other => other.as_str().unwrap_or_default().to_string(),
    }
}

fn fold_all(items: &[Wkt], obj: &mut Map<String, Value>) {
    for item in items {
        fold(item, obj);
    }
}

fn fold(item: &Wkt, obj: &mut Map<String, Value>) {
    match item {
        Wkt::Node { keyword, args } => {
            let keyword = keyword.to_uppercase();
            if keyword == "PARAMETER" {
                if let (Some(name), Some(value)) = (
                    args.first().and_then(Wkt::as_str),
                    args.iter().skip(1).find_map(Wkt::as_f64),
                ) {
                    obj.insert(name.to_string(), Value::from(value));
                }
            } else {
                fold_entry(keyword, args, obj);
            }
        }
        flag => {
            obj.insert(scalar_string(flag), Value::Bool(true));
        }
    }
}

fn fold_entry(key: String, args: &[Wkt], obj: &mut Map<String, Value>) {
    match args {
        [] => {
            obj.insert(key, Value::Bool(true));
            return;
        }
        [only @ Wkt::Node { .. }] => {
            let mut inner = Map::new();
            fold(only, &mut inner);
            obj.insert(key, Value::Object(inner));
            return;
        }
        [only] => {
            obj.insert(key, scalar(only));
            return;
        }
        _ => {}
    }

    let mut inner = Map::new();
    match key.as_str() {
        "TOWGS84" => {
            let values = args.iter().filter_map(Wkt::as_f64).map(Value::from).collect();
            obj.insert(key, Value::Array(values));
            return;
        }
        "AXIS" => {
            let axis = Value::Array(args.iter().take(2).map(scalar).collect());
            match obj.get_mut("AXIS") {
                Some(Value::Array(list)) => list.push(axis),
                _ => {
                    obj.insert(key, Value::Array(vec![axis]));
                }
            }
            return;
        }
        "UNIT" | "PRIMEM" | "VERT_DATUM" => {
            inner.insert("name".into(), Value::String(scalar_string(&args[0]).to_lowercase()));
            inner.insert("convert".into(), args[1].as_f64().map_or(Value::Null, Value::from));
            fold_all(&args[2..], &mut inner);
        }
        "SPHEROID" | "ELLIPSOID" => {
            inner.insert("name".into(), Value::String(scalar_string(&args[0])));
            inner.insert("a".into(), args[1].as_f64().map_or(Value::Null, Value::from));
            if let Some(rf) = args.get(2).and_then(Wkt::as_f64) {
                inner.insert("rf".into(), Value::from(rf));
            }
            fold_all(args.get(3..).unwrap_or_default(), &mut inner);
        }
        k if DATUM_KEYWORDS.contains(&k) => {
            inner.insert("name".into(), Value::String(scalar_string(&args[0])));
            fold_all(&args[1..], &mut inner);
        }
        k if CRS_KEYWORDS.contains(&k) => {
            inner.insert("name".into(), Value::String(scalar_string(&args[0])));
            inner.insert("type".into(), Value::String(key.clone()));
            fold_all(&args[1..], &mut inner);
        }
        _ if args.iter().all(|a| matches!(a, Wkt::Node { .. })) => fold_all(args, &mut inner),
        // AUTHORITY["EPSG","4326"] -> {"EPSG": "4326"}
        _ => fold_entry(scalar_string(&args[0]), &args[1..], &mut inner),
    }
    obj.insert(key, Value::Object(inner));
}

/// Fold a WKT1 tree into the object for its root node.
pub fn to_object(tree: &Wkt) -> Map<String, Value> {
    let mut root = Map::new();
    fold(tree, &mut root);
    let key = tree.keyword().unwrap_or_default().to_uppercase();
    match root.remove(&key) {
        Some(Value::Object(obj)) => obj,
        _ => Map::new(),
    }
}

fn get_str<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    obj.get(key).and_then(Value::as_str)
}

fn get_f64(obj: &Map<String, Value>, key: &str) -> Option<f64> {
    match obj.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn get_obj<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a Map<String, Value>> {
    obj.get(key).and_then(Value::as_object)
}

/// `PROJECTION["x"]` or `PROJECTION["x", AUTHORITY[...]]`.
fn projection_name(obj: &Map<String, Value>) -> Option<String> {
    match obj.get("PROJECTION")? {
        Value::String(s) => Some(s.clone()),
        Value::Object(m) => m.keys().next().cloned(),
        _ => None,
    }
}

fn axis_from(list: &[Value]) -> Result<Option<String>> {
    let mut order = String::new();
    for axis in list {
        let Some(pair) = axis.as_array() else {
            continue;
        };
        let text = |i: usize| pair.get(i).and_then(Value::as_str).unwrap_or_default().to_lowercase();
        let (name, direction) = (text(0), text(1));
        let letter = match direction.as_str() {
            "north" => 'n',
            "south" => 's',
            "east" => 'e',
            "west" => 'w',
            "up" => 'u',
            "down" => 'd',
            _ if name.contains("north") => 'n',
            _ if name.contains("south") => 's',
            _ if name.contains("east") => 'e',
            _ if name.contains("west") => 'w',
            _ => continue,
        };
        order.push(letter);
    }
    if order.len() == 2 {
        order.push('u');
    }
    if order.len() != 3 {
        return Ok(None);
    }
    validate_axis(&order).map(Some)
}

/// Numeric parameters keyed by lower-cased, underscore-joined name.
fn parameters(obj: &Map<String, Value>) -> Map<String, Value> {
    obj.iter()
        .filter(|(_, v)| v.is_number())
        .map(|(k, v)| (k.to_lowercase().split_whitespace().collect::<Vec<_>>().join("_"), v.clone()))
        .collect()
}

fn first_of(params: &Map<String, Value>, names: &[&str]) -> Option<f64> {
    names.iter().find_map(|n| get_f64(params, n))
}

const LAT1: &[&str] = &["standard_parallel_1", "latitude_of_1st_standard_parallel"];
const LAT2: &[&str] = &["standard_parallel_2", "latitude_of_2nd_standard_parallel"];
const X0: &[&str] = &["false_easting", "easting_at_false_origin"];
const Y0: &[&str] = &["false_northing", "northing_at_false_origin"];
const LONG0: &[&str] = &[
    "central_meridian",
    "longitude_of_natural_origin",
    "longitude_of_false_origin",
];
const LAT0: &[&str] = &[
    "latitude_of_center",
    "latitude_of_origin",
    "central_parallel",
    "latitude_of_natural_origin",
    "latitude_of_false_origin",
    "standard_parallel_1",
];
const K0: &[&str] = &["scale_factor"];
const LONGC: &[&str] = &["longitude_of_center"];
const ALPHA: &[&str] = &["azimuth"];
const GAMMA: &[&str] = &["rectified_grid_angle"];

/// Read a folded WKT1 object into parameters.
pub fn to_params(wkt: &Map<String, Value>) -> Result<ProjParams> {
    let kind = get_str(wkt, "type").unwrap_or_default();
    let mut p = ProjParams::default();

    p.proj_name = Some(match kind {
        "GEOGCS" => "longlat".to_string(),
        "GEOCCS" => "geocent".to_string(),
        "LOCAL_CS" => "identity".to_string(),
        _ => projection_name(wkt)
            .ok_or_else(|| ProjError::Definition(format!("{kind} without a PROJECTION")))?,
    });
    p.srs_code = get_str(wkt, "name").map(str::to_string);
    p.title = get_obj(wkt, "AUTHORITY")
        .and_then(|auth| auth.iter().next())
        .map(|(authority, code)| match code {
            Value::String(c) => format!("{authority}:{c}"),
            other => format!("{authority}:{other}"),
        });

    if let Some(Value::Array(list)) = wkt.get("AXIS") {
        p.axis = axis_from(list)?;
    }

    let geogcs = if kind == "GEOGCS" { Some(wkt) } else { get_obj(wkt, "GEOGCS") };
    let datum = geogcs.and_then(|g| get_obj(g, "DATUM"));
    let spheroid = datum.and_then(|d| get_obj(d, "SPHEROID").or_else(|| get_obj(d, "ELLIPSOID")));

    if let Some(unit) = get_obj(wkt, "UNIT") {
        let name = get_str(unit, "name").unwrap_or_default();
        p.units = Some(if name == "metre" { "meter".to_string() } else { name.to_string() });
        if let Some(convert) = get_f64(unit, "convert") {
            if kind == "GEOGCS" {
                p.to_meter = spheroid.and_then(|s| get_f64(s, "a")).map(|a| convert * a);
            } else {
                p.to_meter = Some(convert);
            }
        }
    }

    if let Some(geogcs) = geogcs {
        let datum_name = datum
            .and_then(|d| get_str(d, "name"))
            .or_else(|| get_str(geogcs, "name"))
            .unwrap_or_default();
        let code = datum_code_from_name(datum_name);
        if code == "wgs84" && p.proj_name.as_deref() == Some("Mercator_Auxiliary_Sphere") {
            p.sphere = true;
        }
        p.datum_code = Some(code);
        p.datum_name = Some(datum_name.to_string());

        if let Some(spheroid) = spheroid {
            p.ellps = get_str(spheroid, "name").map(ellipsoid_from_name);
            p.a = get_f64(spheroid, "a");
            p.rf = get_f64(spheroid, "rf");
        }
        if let Some(Value::Array(towgs84)) = datum.and_then(|d| d.get("TOWGS84")) {
            p.datum_params = Some(towgs84.iter().filter_map(Value::as_f64).collect());
        }
        if let Some(pm) = get_obj(geogcs, "PRIMEM").and_then(|pm| get_f64(pm, "convert")) {
            if pm != 0.0 {
                p.from_greenwich = Some(pm.to_radians());
            }
        }
    }

    let params = parameters(wkt);
    let to_meter = p.to_meter.unwrap_or(1.0);
    p.lat1 = first_of(&params, LAT1).map(f64::to_radians);
    p.lat2 = first_of(&params, LAT2).map(f64::to_radians);
    p.lat0 = first_of(&params, LAT0).map(f64::to_radians);
    p.long0 = first_of(&params, LONG0).map(f64::to_radians);
    p.longc = first_of(&params, LONGC).map(f64::to_radians);
    p.alpha = first_of(&params, ALPHA).map(f64::to_radians);
    p.rectified_grid_angle = first_of(&params, GAMMA).map(f64::to_radians);
    p.k0 = first_of(&params, K0);
    p.x0 = first_of(&params, X0).map(|v| v * to_meter);
    p.y0 = first_of(&params, Y0).map(|v| v * to_meter);

    let known: Vec<&str> = [LAT1, LAT2, X0, Y0, LONG0, LAT0, K0, LONGC, ALPHA, GAMMA].concat();
    for (name, value) in &params {
        if !known.contains(&name.as_str()) {
            p.extra.insert(name.clone(), value.to_string());
        }
    }

    apply_projection_fixups(&mut p);
    Ok(p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::wkt::parse_wkt;
    use approx::assert_relative_eq;

    const UTM_32N: &str = r#"PROJCS["WGS 84 / UTM zone 32N",
        GEOGCS["WGS 84",
            DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563,AUTHORITY["EPSG","7030"]],AUTHORITY["EPSG","6326"]],
            PRIMEM["Greenwich",0,AUTHORITY["EPSG","8901"]],
            UNIT["degree",0.0174532925199433,AUTHORITY["EPSG","9122"]],
            AUTHORITY["EPSG","4326"]],
        PROJECTION["Transverse_Mercator"],
        PARAMETER["latitude_of_origin",0],
        PARAMETER["central_meridian",9],
        PARAMETER["scale_factor",0.9996],
        PARAMETER["false_easting",500000],
        PARAMETER["false_northing",0],
        UNIT["metre",1,AUTHORITY["EPSG","9001"]],
        AXIS["Easting",EAST],
        AXIS["Northing",NORTH],
        AUTHORITY["EPSG","32632"]]"#;

    fn params_of(wkt: &str) -> ProjParams {
        to_params(&to_object(&parse_wkt(wkt).unwrap())).unwrap()
    }

    #[test]
    fn test_object_shape() {
        let obj = to_object(&parse_wkt(UTM_32N).unwrap());
        assert_eq!(obj["type"], "PROJCS");
        assert_eq!(obj["AUTHORITY"]["EPSG"], "32632");
        assert_eq!(obj["GEOGCS"]["DATUM"]["SPHEROID"]["a"], 6378137.0);
        assert_eq!(obj["UNIT"]["name"], "metre");
        assert_eq!(obj["central_meridian"], 9.0);
        assert_eq!(obj["AXIS"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_utm_params() {
        let p = params_of(UTM_32N);
        assert_eq!(p.proj_name.as_deref(), Some("Transverse_Mercator"));
        assert_eq!(p.srs_code.as_deref(), Some("WGS 84 / UTM zone 32N"));
        assert_eq!(p.title.as_deref(), Some("EPSG:32632"));
        assert_eq!(p.datum_code.as_deref(), Some("wgs84"));
        assert_eq!(p.ellps.as_deref(), Some("WGS 84"));
        assert_eq!(p.a, Some(6378137.0));
        assert_eq!(p.rf, Some(298.257223563));
        assert_relative_eq!(p.long0.unwrap(), 9.0_f64.to_radians());
        assert_eq!(p.lat0, Some(0.0));
        assert_eq!(p.k0, Some(0.9996));
        assert_eq!(p.x0, Some(500000.0));
        assert_eq!(p.units.as_deref(), Some("meter"));
        assert_eq!(p.to_meter, Some(1.0));
        assert_eq!(p.axis.as_deref(), Some("enu"));
    }

    #[test]
    fn test_esri_lambert_with_towgs84_and_feet() {
        let p = params_of(
            r#"PROJCS["NAD_1983_StatePlane_Texas_Central_FIPS_4203_Feet",
                GEOGCS["GCS_North_American_1983",
                    DATUM["D_North_American_1983",SPHEROID["GRS_1980",6378137.0,298.257222101],TOWGS84[0,0,0,0,0,0,0]],
                    PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]],
                PROJECTION["Lambert_Conformal_Conic"],
                PARAMETER["False_Easting",2296583.333333333],
                PARAMETER["False_Northing",9842500.0],
                PARAMETER["Central_Meridian",-100.3333333333333],
                PARAMETER["Standard_Parallel_1",30.11666666666667],
                PARAMETER["Standard_Parallel_2",31.88333333333333],
                PARAMETER["Latitude_Of_Origin",29.66666666666667],
                UNIT["Foot_US",0.3048006096012192]]"#,
        );
        assert_eq!(p.datum_code.as_deref(), Some("north_american_1983"));
        assert_eq!(p.ellps.as_deref(), Some("GRS80"));
        assert_eq!(p.datum_params, Some(vec![0.0; 7]));
        assert_relative_eq!(p.x0.unwrap(), 2296583.333333333 * 0.3048006096012192);
        assert_relative_eq!(p.lat0.unwrap(), 29.66666666666667_f64.to_radians());
        assert_relative_eq!(p.lat1.unwrap(), 30.11666666666667_f64.to_radians());
        assert_eq!(p.units.as_deref(), Some("foot_us"));
    }

    #[test]
    fn test_geographic_with_prime_meridian() {
        let p = params_of(
            r#"GEOGCS["NTF (Paris)",DATUM["Nouvelle_Triangulation_Francaise_Paris",SPHEROID["Clarke 1880 (IGN)",6378249.2,293.4660212936269]],PRIMEM["Paris",2.33722917],UNIT["grad",0.01570796326794897]]"#,
        );
        assert_eq!(p.proj_name.as_deref(), Some("longlat"));
        assert_relative_eq!(p.from_greenwich.unwrap(), 2.33722917_f64.to_radians());
        assert!(p.axis.is_none());
    }

    #[test]
    fn test_missing_projection() {
        let tree = parse_wkt(r#"PROJCS["x",GEOGCS["y",DATUM["z",SPHEROID["s",6378137,298.257223563]]]]"#).unwrap();
        assert!(matches!(to_params(&to_object(&tree)), Err(ProjError::Definition(_))));
    }
}
