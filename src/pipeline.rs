//! # Tide Height Pipeline
//!
//! Composes the resolvers into one query per image:
//!
//! 1. Read the raster once (blocking, on the tokio blocking pool) to get the
//!    acquisition time and the WGS84 center. The dataset is closed before the
//!    task finishes.
//! 2. Fetch the station directory concurrently with step 1.
//! 3. Pick the nearest station, then ask the service for the tide height at
//!    that station and time.
//!
//! The first error from any stage is returned as-is.

use crate::acquisition::resolve_acquisition_time;
use crate::center::resolve_center;
use crate::raster::{with_raster, GdalRaster, RasterSource};
use crate::stations::nearest_station;
use crate::tide_data::TideDataSource;
use crate::{GeoPoint, StationDistance, TideError, TideReading, TideStation};
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Acquisition time and center of one raster.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RasterSummary {
    pub acquisition_time: NaiveDateTime,
    pub center: GeoPoint,
}

/// Resolve both the acquisition time and the center from one open raster.
pub fn summarize_raster<R: RasterSource + ?Sized>(raster: &R) -> Result<RasterSummary, TideError> {
    Ok(RasterSummary {
        acquisition_time: resolve_acquisition_time(raster)?,
        center: resolve_center(raster)?,
    })
}

/// Open the raster at `path` on the blocking pool, apply `f`, and close it.
async fn read_raster<T, F>(path: PathBuf, f: F) -> Result<T, TideError>
where
    T: Send + 'static,
    F: FnOnce(&GdalRaster) -> Result<T, TideError> + Send + 'static,
{
    tokio::task::spawn_blocking(move || with_raster(&path, f)).await?
}

/// Nearest station to the center of the raster at `path`.
pub async fn closest_station<S: TideDataSource + ?Sized>(
    path: impl AsRef<Path>,
    source: &S,
) -> Result<StationDistance, TideError> {
    let center_task = read_raster(path.as_ref().to_path_buf(), |raster| resolve_center(raster));
    let (center, stations) = tokio::try_join!(center_task, source.list_stations())?;
    nearest_station(center, &stations)
}

/// Ask `source` for the tide height at the station nearest to `center`.
async fn complete_reading<S: TideDataSource + ?Sized>(
    summary: RasterSummary,
    stations: &[TideStation],
    source: &S,
) -> Result<TideReading, TideError> {
    let nearest = nearest_station(summary.center, stations)?;
    let tide_height_m = source
        .height_at(&nearest.station.name, summary.acquisition_time)
        .await?;

    info!(
        station = %nearest.station.name,
        distance_m = nearest.distance_m,
        acquired = %summary.acquisition_time,
        tide_height_m,
        "resolved tide height"
    );

    Ok(TideReading {
        tide_height_m,
        station_name: nearest.station.name,
        station_distance_m: nearest.distance_m,
        acquisition_time: summary.acquisition_time,
    })
}

/// Tide reading for an already-resolved acquisition time and center.
pub async fn query_tide<S: TideDataSource + ?Sized>(
    summary: RasterSummary,
    source: &S,
) -> Result<TideReading, TideError> {
    let stations = source.list_stations().await?;
    complete_reading(summary, &stations, source).await
}

/// Tide reading for an open raster.
pub async fn tide_height_for<R, S>(raster: &R, source: &S) -> Result<TideReading, TideError>
where
    R: RasterSource + ?Sized,
    S: TideDataSource + ?Sized,
{
    let summary = summarize_raster(raster)?;
    query_tide(summary, source).await
}

/// Tide reading for the raster at `path`.
///
/// This is the top-level entry point. Each call is independent; calls for
/// different images may run in parallel.
pub async fn tide_height<S: TideDataSource + ?Sized>(
    path: impl AsRef<Path>,
    source: &S,
) -> Result<TideReading, TideError> {
    let path = path.as_ref().to_path_buf();
    debug!(path = %path.display(), "estimating tide height");

    let summary_task = read_raster(path, |raster| summarize_raster(raster));
    let (summary, stations) = tokio::try_join!(summary_task, source.list_stations())?;
    complete_reading(summary, &stations, source).await
}
