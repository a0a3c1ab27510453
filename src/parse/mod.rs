//! CRS definition front ends.
//!
//! PROJ strings, WKT1, WKT2 and PROJJSON all end up as one [`ProjParams`].

pub mod defs;
mod fixups;
pub mod proj_string;
pub mod projjson;
pub mod units;
pub mod wkt;
mod wkt1;
mod wkt2;

use serde_json::Value;

use crate::error::{ProjError, Result};
use crate::params::ProjParams;

pub use defs::{definition, register_definition};
pub use proj_string::parse_proj_string;

/// A CRS definition in any of the accepted forms.
#[derive(Clone, Debug, PartialEq)]
pub enum CrsDefinition {
    /// PROJ string, WKT, PROJJSON text or a registered name like `EPSG:4326`
    Text(String),
    ProjJson(Value),
    Params(ProjParams),
}

impl From<&str> for CrsDefinition {
    fn from(text: &str) -> Self {
        CrsDefinition::Text(text.to_string())
    }
}

impl From<String> for CrsDefinition {
    fn from(text: String) -> Self {
        CrsDefinition::Text(text)
    }
}

impl From<Value> for CrsDefinition {
    fn from(json: Value) -> Self {
        CrsDefinition::ProjJson(json)
    }
}

impl From<ProjParams> for CrsDefinition {
    fn from(params: ProjParams) -> Self {
        CrsDefinition::Params(params)
    }
}

const WKT_KEYWORDS: &[&str] = &[
    "PROJECTEDCRS",
    "PROJCRS",
    "GEOGCS",
    "GEOCCS",
    "PROJCS",
    "LOCAL_CS",
    "GEODCRS",
    "GEODETICCRS",
    "GEODETICDATUM",
    "GEOGCRS",
    "BOUNDCRS",
    "COMPD_CS",
    "COMPOUNDCRS",
    "ENGCRS",
    "ENGINEERINGCRS",
];

/// Check an axis order: one of `e`/`w`, one of `n`/`s` and one of `u`/`d`,
/// in any order.
pub(crate) fn validate_axis(axis: &str) -> Result<String> {
    let lower = axis.to_lowercase();
    let count = |set: &[char]| lower.chars().filter(|c| set.contains(c)).count();
    if lower.chars().count() == 3
        && count(&['e', 'w']) == 1
        && count(&['n', 's']) == 1
        && count(&['u', 'd']) == 1
    {
        Ok(lower)
    } else {
        Err(ProjError::InvalidAxis(axis.to_string()))
    }
}

fn web_mercator() -> Result<ProjParams> {
    definition("EPSG:3857")
        .ok_or_else(|| ProjError::Definition("EPSG:3857 is not registered".into()))
}

fn is_web_mercator(authority: &str, code: &str) -> bool {
    authority.eq_ignore_ascii_case("EPSG") && defs::WEB_MERCATOR_CODES.contains(&code.trim())
}

fn from_projjson(json: &Value) -> Result<ProjParams> {
    if let Some((authority, code)) = projjson::authority_code(json) {
        if is_web_mercator(&authority, &code) {
            return web_mercator();
        }
    }
    projjson::to_params(json)
}

fn from_wkt(text: &str) -> Result<ProjParams> {
    let tree = wkt::parse_wkt(text)?;
    if wkt2::is_wkt2(&tree) {
        return from_projjson(&wkt2::to_projjson(&tree)?);
    }

    let obj = wkt1::to_object(&tree);
    let epsg = obj
        .get("AUTHORITY")
        .and_then(|a| a.get("EPSG"))
        .map(|code| code.as_str().map_or_else(|| code.to_string(), str::to_string));
    if epsg.is_some_and(|code| is_web_mercator("EPSG", &code)) {
        return web_mercator();
    }
    if let Some(proj4) = obj
        .get("EXTENSION")
        .and_then(|e| e.get("PROJ4"))
        .and_then(Value::as_str)
    {
        return parse_proj_string(proj4);
    }
    wkt1::to_params(&obj)
}

/// Parse a textual definition: a registered name, WKT, a PROJ string or
/// PROJJSON text.
pub fn parse_text(text: &str) -> Result<ProjParams> {
    let text = text.trim();
    if let Some(params) = definition(text) {
        return Ok(params);
    }
    if text.starts_with('+') {
        return parse_proj_string(text);
    }
    if text.starts_with('{') {
        let json: Value = serde_json::from_str(text)
            .map_err(|e| ProjError::Definition(format!("invalid PROJJSON: {e}")))?;
        return from_projjson(&json);
    }
    if WKT_KEYWORDS.iter().any(|k| text.contains(k)) {
        return from_wkt(text);
    }
    Err(ProjError::Definition(format!("unrecognized CRS definition '{text}'")))
}

/// Normalize any accepted definition into parameters.
pub fn parse_definition(def: &CrsDefinition) -> Result<ProjParams> {
    match def {
        CrsDefinition::Text(text) => parse_text(text),
        CrsDefinition::ProjJson(json) => from_projjson(json),
        CrsDefinition::Params(params) => Ok(params.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validate_axis() {
        for ok in ["enu", "neu", "wsu", "seu", "ned", "UNE"] {
            assert!(validate_axis(ok).is_ok(), "{ok}");
        }
        for bad in ["en", "enn", "eeu", "enuu", "xyz", ""] {
            assert!(matches!(validate_axis(bad), Err(ProjError::InvalidAxis(_))), "{bad}");
        }
    }

    #[test]
    fn test_dispatch() {
        assert_eq!(parse_text("EPSG:4326").unwrap(), definition("EPSG:4326").unwrap());
        assert_eq!(
            parse_text("  +proj=merc +lon_0=5").unwrap().proj_name.as_deref(),
            Some("merc")
        );
        assert_eq!(
            parse_text(r#"GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563]]]"#)
                .unwrap()
                .proj_name
                .as_deref(),
            Some("longlat")
        );
        assert!(matches!(parse_text("EPSG:99999"), Err(ProjError::Definition(_))));
    }

    #[test]
    fn test_leading_character_wins_over_wkt_keywords() {
        let p = parse_text("+proj=merc +datum=WGS84 +title=PROJCS_GEOGCS_copy").unwrap();
        assert_eq!(p.proj_name.as_deref(), Some("merc"));
        assert_eq!(p.title.as_deref(), Some("PROJCS_GEOGCS_copy"));

        let p = parse_text(r#"{"type": "GeographicCRS", "name": "GEOGCRS copy"}"#).unwrap();
        assert_eq!(p.proj_name.as_deref(), Some("longlat"));
    }

    #[test]
    fn test_web_mercator_redirects() {
        let canonical = definition("EPSG:3857").unwrap();
        let wkt1 = r#"PROJCS["WGS 84 / Pseudo-Mercator",GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563]]],
            PROJECTION["Mercator_1SP"],PARAMETER["central_meridian",0],UNIT["metre",1],AUTHORITY["EPSG","3857"]]"#;
        assert_eq!(parse_text(wkt1).unwrap(), canonical);

        let json = json!({ "type": "ProjectedCRS", "name": "x", "id": { "authority": "EPSG", "code": 900913 } });
        assert_eq!(parse_definition(&CrsDefinition::ProjJson(json)).unwrap(), canonical);
    }

    #[test]
    fn test_proj4_extension() {
        let wkt = r#"PROJCS["custom",GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563]]],
            PROJECTION["Mercator_1SP"],EXTENSION["PROJ4","+proj=merc +lon_0=12 +datum=WGS84"]]"#;
        let p = parse_text(wkt).unwrap();
        assert_eq!(p.proj_name.as_deref(), Some("merc"));
        assert_eq!(p.datum_code.as_deref(), Some("WGS84"));
    }

    #[test]
    fn test_malformed_wkt_is_an_error() {
        let err = parse_text(r#"PROJCS["broken",GEOGCS["WGS 84",DATUM["WGS_1984""#).unwrap_err();
        assert!(matches!(err, ProjError::Wkt(_)));
    }

    #[test]
    fn test_projjson_text() {
        let p = parse_text(r#"{"type": "GeographicCRS", "name": "WGS 84"}"#).unwrap();
        assert_eq!(p.proj_name.as_deref(), Some("longlat"));
        assert!(parse_text("{not json").is_err());
    }
}
