//! # Raster Center Resolution
//!
//! Finds the geographic center of a raster: the midpoint of its bounding box
//! in native coordinates, reprojected to WGS84 longitude/latitude.
//!
//! The midpoint is taken *before* reprojection, not averaged from reprojected
//! corners.

use crate::raster::{with_raster, RasterSource};
use crate::{GeoPoint, TideError};
use gdal::spatial_ref::{AxisMappingStrategy, CoordTransform, SpatialRef};
use std::path::Path;
use tracing::debug;

/// EPSG code of the WGS84 geographic reference system.
const WGS84_EPSG: u32 = 4326;

/// Reproject a single native point to WGS84.
///
/// `definition` is anything GDAL accepts as a spatial reference (WKT, PROJ
/// string, `EPSG:xxxx`). Both systems use traditional GIS axis order, so the
/// input is (easting, northing) and the output is (longitude, latitude).
///
/// # Errors
/// [`TideError::Reprojection`] when the definition is not understood, no
/// transformation to WGS84 exists, or the result is outside WGS84 ranges.
pub fn reproject_to_wgs84(definition: &str, x: f64, y: f64) -> Result<GeoPoint, TideError> {
    let mut source = SpatialRef::from_definition(definition)
        .map_err(|e| TideError::Reprojection(format!("unrecognised reference system: {e}")))?;
    source.set_axis_mapping_strategy(AxisMappingStrategy::TraditionalGisOrder);

    let mut target = SpatialRef::from_epsg(WGS84_EPSG)
        .map_err(|e| TideError::Reprojection(format!("WGS84 unavailable: {e}")))?;
    target.set_axis_mapping_strategy(AxisMappingStrategy::TraditionalGisOrder);

    let transform = CoordTransform::new(&source, &target)
        .map_err(|e| TideError::Reprojection(format!("no transformation to WGS84: {e}")))?;

    let mut xs = [x];
    let mut ys = [y];
    transform
        .transform_coords(&mut xs, &mut ys, &mut [])
        .map_err(|e| TideError::Reprojection(e.to_string()))?;

    let point = GeoPoint::new(xs[0], ys[0]);
    if !point.is_valid() {
        return Err(TideError::Reprojection(format!(
            "({x}, {y}) projects outside WGS84 bounds: ({}, {})",
            point.lon, point.lat
        )));
    }
    Ok(point)
}

/// Resolve the WGS84 center of an open raster.
///
/// # Errors
/// - [`TideError::MissingSpatialReference`] when the raster has no CRS
/// - [`TideError::Reprojection`] when the CRS cannot be mapped to WGS84
pub fn resolve_center<R: RasterSource + ?Sized>(raster: &R) -> Result<GeoPoint, TideError> {
    let definition = raster
        .spatial_ref_definition()
        .ok_or(TideError::MissingSpatialReference)?;
    let bounds = raster.bounds()?;
    let (x, y) = bounds.midpoint();

    let center = reproject_to_wgs84(&definition, x, y)?;
    debug!(x, y, lon = center.lon, lat = center.lat, "resolved raster center");
    Ok(center)
}

/// Open the raster at `path` and resolve its WGS84 center.
pub fn raster_center<P: AsRef<Path>>(path: P) -> Result<GeoPoint, TideError> {
    with_raster(path, |raster| resolve_center(raster))
}
