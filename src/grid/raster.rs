//! Multi-image raster grids (GeoTIFF-style), one image per sub-grid.
//!
//! Each image carries two bands in arc-seconds: latitude offsets and
//! longitude offsets (positive east). Images are stored north-up with the
//! bounding box and pixel size in degrees.

use async_trait::async_trait;

use super::{Grid, SubGrid};
use crate::error::{ProjError, Result};

/// A decoded raster image.
#[derive(Clone, Debug, Default)]
pub struct RasterImage {
    pub width: usize,
    pub height: usize,
    /// (min lon, min lat, max lon, max lat), degrees
    pub bbox: [f64; 4],
    /// Pixel size (lon, lat), degrees
    pub pixel_scale: [f64; 2],
    /// Row-major from the north-west corner, arc-seconds
    pub lat_offsets: Vec<f64>,
    pub lon_offsets: Vec<f64>,
}

/// Where raster grid images come from.
#[async_trait]
pub trait RasterSource: Send + Sync {
    async fn image_count(&self) -> Result<usize>;

    async fn image(&self, index: usize) -> Result<RasterImage>;
}

fn arcseconds_to_radians(v: f64) -> f64 {
    (v / 3600.0).to_radians()
}

fn to_subgrid(image: RasterImage) -> Result<SubGrid> {
    let (w, h) = (image.width, image.height);
    let nodes = w.checked_mul(h).filter(|&n| {
        n > 0 && image.lat_offsets.len() == n && image.lon_offsets.len() == n
    });
    let Some(nodes) = nodes else {
        return Err(ProjError::Grid(format!(
            "raster image of {w}x{h} has {} / {} offsets",
            image.lat_offsets.len(),
            image.lon_offsets.len()
        )));
    };

    let [min_x, _, _, max_y] = image.bbox.map(f64::to_radians);
    let del = (image.pixel_scale[0].to_radians(), image.pixel_scale[1].to_radians());
    let max_x = min_x + (w - 1) as f64 * del.0;
    let min_y = max_y - (h - 1) as f64 * del.1;

    // reorder from north-west first to south-east first
    let mut cvs = Vec::with_capacity(nodes);
    for row in (0..h).rev() {
        for col in (0..w).rev() {
            let i = row * w + col;
            cvs.push((
                -arcseconds_to_radians(image.lon_offsets[i]),
                arcseconds_to_radians(image.lat_offsets[i]),
            ));
        }
    }

    Ok(SubGrid {
        ll: (-max_x, min_y),
        del,
        lim: (w, h),
        cvs,
    })
}

/// Read all images, last (finest) first.
pub(super) async fn read_grid(source: &dyn RasterSource) -> Result<Grid> {
    let count = source.image_count().await?;
    let mut subgrids = Vec::new();
    for index in (0..count).rev() {
        subgrids.push(to_subgrid(source.image(index).await?)?);
    }
    Ok(Grid { subgrids })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use futures::executor::block_on;

    /// Images served from memory.
    pub(crate) struct MemorySource(pub Vec<RasterImage>);

    #[async_trait]
    impl RasterSource for MemorySource {
        async fn image_count(&self) -> Result<usize> {
            Ok(self.0.len())
        }

        async fn image(&self, index: usize) -> Result<RasterImage> {
            self.0
                .get(index)
                .cloned()
                .ok_or_else(|| ProjError::Grid(format!("no image {index}")))
        }
    }

    pub(crate) fn coarse_image() -> RasterImage {
        RasterImage {
            width: 3,
            height: 2,
            bbox: [5.0, 45.0, 7.0, 46.0],
            pixel_scale: [1.0, 1.0],
            lat_offsets: vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
            lon_offsets: vec![-1.0, -2.0, -3.0, -4.0, -5.0, -6.0],
        }
    }

    #[test]
    fn test_nodes_reordered_from_south_east() {
        let sub = to_subgrid(coarse_image()).unwrap();
        assert_eq!(sub.lim, (3, 2));
        assert_relative_eq!(sub.ll.0, -7.0_f64.to_radians());
        assert_relative_eq!(sub.ll.1, 45.0_f64.to_radians());
        // first node: south row, east column
        assert_relative_eq!(sub.cvs[0].1, arcseconds_to_radians(6.0));
        assert_relative_eq!(sub.cvs[0].0, arcseconds_to_radians(6.0));
        // last node: north row, west column
        assert_relative_eq!(sub.cvs[5].1, arcseconds_to_radians(1.0));
    }

    #[test]
    fn test_read_all_images_finest_first() {
        let detail = RasterImage {
            width: 2,
            height: 2,
            bbox: [5.5, 45.0, 6.0, 45.5],
            pixel_scale: [0.5, 0.5],
            lat_offsets: vec![0.5; 4],
            lon_offsets: vec![0.5; 4],
        };
        let source = MemorySource(vec![coarse_image(), detail]);
        let grid = block_on(read_grid(&source)).unwrap();
        assert_eq!(grid.subgrids.len(), 2);
        assert_eq!(grid.subgrids[0].lim, (2, 2));
        assert_eq!(grid.subgrids[1].lim, (3, 2));
    }

    #[test]
    fn test_band_size_mismatch() {
        let mut image = coarse_image();
        image.lon_offsets.pop();
        assert!(to_subgrid(image).is_err());
    }
}
