//! Named CRS definitions (`EPSG:4326`, `WGS84`, ...).

use std::collections::HashMap;

use lazy_static::lazy_static;
use parking_lot::RwLock;

use super::parse_text;
use super::proj_string::parse_proj_string;
use crate::error::Result;
use crate::params::ProjParams;

const WGS84_GEOGRAPHIC: &str =
    "+title=WGS 84 (long/lat) +proj=longlat +ellps=WGS84 +datum=WGS84 +units=degrees";
const NAD83_GEOGRAPHIC: &str = "+title=NAD83 (long/lat) +proj=longlat +a=6378137.0 \
     +b=6356752.31414036 +ellps=GRS80 +datum=NAD83 +units=degrees";
const WEB_MERCATOR: &str = "+title=WGS 84 / Pseudo-Mercator +proj=merc +a=6378137 +b=6378137 \
     +lat_ts=0.0 +lon_0=0.0 +x_0=0.0 +y_0=0 +k=1.0 +units=m +nadgrids=@null +wktext +no_defs";

/// Codes that all name the spherical Web Mercator.
pub(crate) const WEB_MERCATOR_CODES: &[&str] = &["3857", "3785", "900913", "102113"];

fn key(name: &str) -> String {
    name.trim().to_uppercase()
}

fn seed() -> HashMap<String, ProjParams> {
    let mut entries: Vec<(String, String)> = vec![
        ("EPSG:4326".into(), WGS84_GEOGRAPHIC.into()),
        ("WGS84".into(), WGS84_GEOGRAPHIC.into()),
        ("EPSG:4269".into(), NAD83_GEOGRAPHIC.into()),
        ("GOOGLE".into(), WEB_MERCATOR.into()),
    ];
    for code in WEB_MERCATOR_CODES {
        entries.push((format!("EPSG:{code}"), WEB_MERCATOR.into()));
    }
    for zone in 1..=60 {
        entries.push((
            format!("EPSG:{}", 32600 + zone),
            format!("+proj=utm +zone={zone} +datum=WGS84 +units=m"),
        ));
        entries.push((
            format!("EPSG:{}", 32700 + zone),
            format!("+proj=utm +zone={zone} +south +datum=WGS84 +units=m"),
        ));
    }

    let mut defs = HashMap::with_capacity(entries.len());
    for (name, text) in entries {
        match parse_proj_string(&text) {
            Ok(params) => {
                defs.insert(key(&name), params);
            }
            Err(e) => tracing::warn!(%name, error = %e, "skipping built-in definition"),
        }
    }
    tracing::debug!(count = defs.len(), "seeded named definitions");
    defs
}

lazy_static! {
    static ref DEFS: RwLock<HashMap<String, ProjParams>> = RwLock::new(seed());
}

/// Register `text` (PROJ string, WKT, PROJJSON text or another name) under
/// `name`. A name that is already taken keeps its first definition.
pub fn register_definition(name: &str, text: &str) -> Result<()> {
    let params = parse_text(text)?;
    DEFS.write().entry(key(name)).or_insert(params);
    Ok(())
}

/// Parameters registered under `name`, case-insensitively.
pub fn definition(name: &str) -> Option<ProjParams> {
    DEFS.read().get(&key(name)).cloned()
}
