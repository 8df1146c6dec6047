//! # Raster Metadata Access
//!
//! The resolvers never touch GDAL directly. They read through [`RasterSource`],
//! a small typed accessor exposing exactly what the pipeline needs:
//! - a string-valued metadata tag lookup
//! - the axis-aligned bounding box in native coordinates
//! - the native coordinate reference system
//!
//! [`GdalRaster`] backs it with a GDAL dataset. The dataset is closed when the
//! value is dropped, so [`with_raster`] gives scoped access that releases the
//! file on every exit path. [`MemoryRaster`] holds the same information in
//! memory and stands in for a file when one is not needed.

use crate::TideError;
use gdal::{Dataset, Metadata};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Axis-aligned extent of a raster in its native reference system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RasterBounds {
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
    pub top: f64,
}

impl RasterBounds {
    pub fn new(left: f64, bottom: f64, right: f64, top: f64) -> Self {
        RasterBounds {
            left,
            bottom,
            right,
            top,
        }
    }

    /// Midpoint of the box as (x, y) in native coordinates.
    pub fn midpoint(&self) -> (f64, f64) {
        (
            (self.left + self.right) / 2.0,
            (self.top + self.bottom) / 2.0,
        )
    }

    /// Extent covered by `width` x `height` pixels under a GDAL geotransform.
    ///
    /// All four pixel-grid corners are mapped, so rotated or south-up grids
    /// still yield a proper min/max box.
    pub fn from_geo_transform(gt: &[f64; 6], width: usize, height: usize) -> Self {
        let (w, h) = (width as f64, height as f64);
        let corner = |col: f64, row: f64| {
            (
                gt[0] + col * gt[1] + row * gt[2],
                gt[3] + col * gt[4] + row * gt[5],
            )
        };
        let corners = [
            corner(0.0, 0.0),
            corner(w, 0.0),
            corner(0.0, h),
            corner(w, h),
        ];

        let (mut left, mut bottom) = (f64::INFINITY, f64::INFINITY);
        let (mut right, mut top) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for (x, y) in corners {
            left = left.min(x);
            right = right.max(x);
            bottom = bottom.min(y);
            top = top.max(y);
        }

        RasterBounds::new(left, bottom, right, top)
    }
}

/// Read-only view of the raster properties used by the pipeline.
pub trait RasterSource {
    /// Value of a metadata tag in the default domain, if present.
    fn tag(&self, name: &str) -> Option<String>;

    /// Bounding box in the raster's native reference system.
    fn bounds(&self) -> Result<RasterBounds, TideError>;

    /// Definition (WKT, PROJ string, or `AUTHORITY:CODE`) of the native
    /// reference system. `None` when the raster carries none.
    fn spatial_ref_definition(&self) -> Option<String>;
}

/// A raster opened through GDAL.
pub struct GdalRaster {
    dataset: Dataset,
    path: PathBuf,
}

impl GdalRaster {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, TideError> {
        let path = path.as_ref().to_path_buf();
        let dataset = Dataset::open(&path)?;
        debug!(path = %path.display(), "opened raster");
        Ok(GdalRaster { dataset, path })
    }
}

impl RasterSource for GdalRaster {
    fn tag(&self, name: &str) -> Option<String> {
        self.dataset.metadata_item(name, "")
    }

    fn bounds(&self) -> Result<RasterBounds, TideError> {
        let gt = self.dataset.geo_transform()?;
        let (width, height) = self.dataset.raster_size();
        Ok(RasterBounds::from_geo_transform(&gt, width, height))
    }

    fn spatial_ref_definition(&self) -> Option<String> {
        let wkt = self.dataset.projection();
        if wkt.trim().is_empty() {
            None
        } else {
            Some(wkt)
        }
    }
}

impl Drop for GdalRaster {
    fn drop(&mut self) {
        debug!(path = %self.path.display(), "closed raster");
    }
}

/// Open the raster at `path`, run `f` against it, and close it again.
///
/// The dataset is released before this returns, whether `f` succeeds or not.
pub fn with_raster<P, T, F>(path: P, f: F) -> Result<T, TideError>
where
    P: AsRef<Path>,
    F: FnOnce(&GdalRaster) -> Result<T, TideError>,
{
    let raster = GdalRaster::open(path)?;
    f(&raster)
}

/// In-memory raster description.
#[derive(Clone, Debug)]
pub struct MemoryRaster {
    pub bounds: RasterBounds,
    pub spatial_ref: Option<String>,
    pub tags: HashMap<String, String>,
}

impl MemoryRaster {
    pub fn new(bounds: RasterBounds, spatial_ref: Option<&str>) -> Self {
        MemoryRaster {
            bounds,
            spatial_ref: spatial_ref.map(str::to_string),
            tags: HashMap::new(),
        }
    }

    pub fn with_tag(mut self, name: &str, value: &str) -> Self {
        self.tags.insert(name.to_string(), value.to_string());
        self
    }
}

impl RasterSource for MemoryRaster {
    fn tag(&self, name: &str) -> Option<String> {
        self.tags.get(name).cloned()
    }

    fn bounds(&self) -> Result<RasterBounds, TideError> {
        Ok(self.bounds)
    }

    fn spatial_ref_definition(&self) -> Option<String> {
        self.spatial_ref.clone()
    }
}
