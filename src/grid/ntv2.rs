//! NTv2 binary reader.
//!
//! Layout: an 11-record overview header (176 bytes) followed by sub-grids,
//! each a 176-byte header and its node records. Angles are arc-seconds.

use super::{Grid, SubGrid};
use crate::error::{ProjError, Result};

pub(super) const HEADER_LEN: usize = 176;
/// Value of the `NUM_OREC` field in every NTv2 file
const OVERVIEW_FIELDS: i32 = 11;

fn seconds_to_radians(seconds: f64) -> f64 {
    seconds / 3600.0 * std::f64::consts::PI / 180.0
}

struct Reader<'a> {
    bytes: &'a [u8],
    little_endian: bool,
}

impl<'a> Reader<'a> {
    fn take<const N: usize>(&self, offset: usize) -> Result<[u8; N]> {
        self.bytes
            .get(offset..offset + N)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| ProjError::Grid(format!("truncated NTv2 data at byte {offset}")))
    }

    fn i32(&self, offset: usize) -> Result<i32> {
        let b = self.take::<4>(offset)?;
        Ok(if self.little_endian { i32::from_le_bytes(b) } else { i32::from_be_bytes(b) })
    }

    fn f32(&self, offset: usize) -> Result<f32> {
        let b = self.take::<4>(offset)?;
        Ok(if self.little_endian { f32::from_le_bytes(b) } else { f32::from_be_bytes(b) })
    }

    fn f64(&self, offset: usize) -> Result<f64> {
        let b = self.take::<8>(offset)?;
        Ok(if self.little_endian { f64::from_le_bytes(b) } else { f64::from_be_bytes(b) })
    }

    fn label(&self, offset: usize) -> Result<String> {
        let b = self.take::<8>(offset)?;
        Ok(String::from_utf8_lossy(&b).trim().to_string())
    }
}

fn detect_little_endian(bytes: &[u8]) -> Result<bool> {
    let field: [u8; 4] = bytes
        .get(8..12)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| ProjError::Grid("NTv2 data shorter than its header".into()))?;
    if i32::from_be_bytes(field) == OVERVIEW_FIELDS {
        return Ok(false);
    }
    if i32::from_le_bytes(field) != OVERVIEW_FIELDS {
        tracing::warn!("failed to detect NTv2 byte order, assuming little-endian");
    }
    Ok(true)
}

struct SubGridHeader {
    name: String,
    lower_lat: f64,
    upper_lat: f64,
    lower_lon: f64,
    upper_lon: f64,
    lat_interval: f64,
    lon_interval: f64,
    node_count: usize,
}

fn read_subgrid_header(r: &Reader<'_>, offset: usize) -> Result<SubGridHeader> {
    let node_count = r.i32(offset + 168)?;
    Ok(SubGridHeader {
        name: r.label(offset + 8)?,
        lower_lat: r.f64(offset + 72)?,
        upper_lat: r.f64(offset + 88)?,
        lower_lon: r.f64(offset + 104)?,
        upper_lon: r.f64(offset + 120)?,
        lat_interval: r.f64(offset + 136)?,
        lon_interval: r.f64(offset + 152)?,
        node_count: usize::try_from(node_count)
            .map_err(|_| ProjError::Grid(format!("negative node count {node_count}")))?,
    })
}

/// Node count along one axis of a sub-grid.
fn node_span(name: &str, lower: f64, upper: f64, interval: f64) -> Result<usize> {
    let span = (1.0 + (upper - lower) / interval).round();
    if !span.is_finite() || span < 1.0 || span > u32::MAX as f64 {
        return Err(ProjError::Grid(format!(
            "sub-grid '{name}' has an invalid extent {lower}..{upper}"
        )));
    }
    Ok(span as usize)
}

/// Parse an NTv2 file. Without `with_accuracy`, node records are 8 bytes
/// (shifts only) instead of 16.
pub(super) fn parse(bytes: &[u8], with_accuracy: bool) -> Result<Grid> {
    let r = Reader {
        bytes,
        little_endian: detect_little_endian(bytes)?,
    };
    let n_subgrids = r.i32(40)?;
    let n_subgrids = usize::try_from(n_subgrids)
        .map_err(|_| ProjError::Grid(format!("negative sub-grid count {n_subgrids}")))?;
    let record_len = if with_accuracy { 16 } else { 8 };

    // every sub-grid needs at least its own header
    let mut subgrids = Vec::with_capacity(n_subgrids.min(bytes.len() / HEADER_LEN));
    let mut offset = HEADER_LEN;
    for _ in 0..n_subgrids {
        let header = read_subgrid_header(&r, offset)?;
        if !(header.lat_interval > 0.0 && header.lon_interval > 0.0) {
            return Err(ProjError::Grid(format!(
                "sub-grid '{}' has a non-positive node spacing",
                header.name
            )));
        }
        let cols = node_span(&header.name, header.lower_lon, header.upper_lon, header.lon_interval)?;
        let rows = node_span(&header.name, header.lower_lat, header.upper_lat, header.lat_interval)?;
        if cols.checked_mul(rows) != Some(header.node_count) {
            return Err(ProjError::Grid(format!(
                "sub-grid '{}' declares {} nodes for a {cols}x{rows} lattice",
                header.name, header.node_count
            )));
        }
        let node_bytes = header
            .node_count
            .checked_mul(record_len)
            .filter(|n| offset + HEADER_LEN + n <= bytes.len())
            .ok_or_else(|| {
                ProjError::Grid(format!("truncated NTv2 data in sub-grid '{}'", header.name))
            })?;

        let nodes_at = offset + HEADER_LEN;
        let cvs = (0..header.node_count)
            .map(|i| {
                let at = nodes_at + i * record_len;
                let lat_shift = r.f32(at)? as f64;
                let lon_shift = r.f32(at + 4)? as f64;
                Ok((seconds_to_radians(lon_shift), seconds_to_radians(lat_shift)))
            })
            .collect::<Result<Vec<_>>>()?;

        subgrids.push(SubGrid {
            ll: (seconds_to_radians(header.lower_lon), seconds_to_radians(header.lower_lat)),
            del: (seconds_to_radians(header.lon_interval), seconds_to_radians(header.lat_interval)),
            lim: (cols, rows),
            cvs,
        });
        offset += HEADER_LEN + node_bytes;
    }
    Ok(Grid { subgrids })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::testing::sample_ntv2;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_both_byte_orders() {
        for little_endian in [true, false] {
            let grid = parse(&sample_ntv2(little_endian, true), true).unwrap();
            assert_eq!(grid.subgrids.len(), 1);
            let sub = &grid.subgrids[0];
            assert_eq!(sub.lim, (2, 2));
            assert_relative_eq!(sub.ll.0, 1.0_f64.to_radians(), epsilon = 1e-15);
            assert_relative_eq!(sub.ll.1, 50.0_f64.to_radians(), epsilon = 1e-15);
            assert_relative_eq!(sub.del.0, (1.0_f64 / 60.0).to_radians(), epsilon = 1e-15);
            assert_relative_eq!(sub.cvs[3].0, seconds_to_radians(-3.0));
            assert_relative_eq!(sub.cvs[3].1, seconds_to_radians(1.5));
        }
    }

    #[test]
    fn test_parse_without_accuracy_columns() {
        let grid = parse(&sample_ntv2(true, false), false).unwrap();
        assert_eq!(grid.subgrids[0].cvs.len(), 4);
    }

    #[test]
    fn test_truncated_input_is_an_error() {
        let bytes = sample_ntv2(true, true);
        assert!(matches!(parse(&bytes[..200], true), Err(ProjError::Grid(_))));
        assert!(parse(&bytes[..4], true).is_err());
        // header intact, node records cut short
        assert!(matches!(parse(&bytes[..bytes.len() - 8], true), Err(ProjError::Grid(_))));
    }

    fn patched(offset: usize, value: &[u8]) -> Vec<u8> {
        let mut bytes = sample_ntv2(true, true);
        bytes[offset..offset + value.len()].copy_from_slice(value);
        bytes
    }

    #[test]
    fn test_huge_subgrid_count_is_an_error() {
        let bytes = patched(40, &i32::MAX.to_le_bytes());
        assert!(matches!(parse(&bytes, true), Err(ProjError::Grid(_))));
        let bytes = patched(40, &(-1_i32).to_le_bytes());
        assert!(matches!(parse(&bytes, true), Err(ProjError::Grid(_))));
    }

    #[test]
    fn test_overflowing_extent_is_an_error() {
        // W_LONG of the first sub-grid
        let bytes = patched(HEADER_LEN + 120, &1e300_f64.to_le_bytes());
        assert!(matches!(parse(&bytes, true), Err(ProjError::Grid(_))));
        let bytes = patched(HEADER_LEN + 120, &f64::NAN.to_le_bytes());
        assert!(matches!(parse(&bytes, true), Err(ProjError::Grid(_))));
        let bytes = patched(HEADER_LEN + 152, &f64::NAN.to_le_bytes());
        assert!(matches!(parse(&bytes, true), Err(ProjError::Grid(_))));
    }

    #[test]
    fn test_node_count_mismatch_is_an_error() {
        let bytes = patched(HEADER_LEN + 168, &5_i32.to_le_bytes());
        assert!(matches!(parse(&bytes, true), Err(ProjError::Grid(_))));
    }
}
