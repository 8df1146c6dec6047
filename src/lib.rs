//! # ARPS Tides Core Library
//!
//! Estimates the tide height at the moment a PlanetScope ARPS QA raster was
//! captured. The library is a short, strictly forward pipeline:
//!
//! ```text
//! raster file ──► acquisition time ─┐
//!             └─► raster center ──► nearest station ──► tide height
//! ```
//!
//! ## Data Flow
//! 1. **Acquisition time**: average the per-strip timestamps embedded in the
//!    `SCENE_IDS[LAYER_2_VALUE]` metadata tag ([`acquisition`])
//! 2. **Center**: reproject the bounding-box midpoint to WGS84 ([`center`])
//! 3. **Station**: pick the station with the shortest geodesic distance ([`stations`])
//! 4. **Height**: ask the tide service for that station at that time ([`pipeline`])
//!
//! Tidal modelling is owned entirely by the external service behind
//! [`tide_data::TideDataSource`]; nothing here interpolates or falls back.
//!
//! ## Core Types
//! - [`GeoPoint`]: a WGS84 longitude/latitude pair
//! - [`TideStation`]: a named station location
//! - [`StationDistance`]: a station paired with its distance to a point
//! - [`TideReading`]: the final result handed back to the caller

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// Module declarations
pub mod acquisition;
pub mod center;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod raster;
pub mod renderer;
pub mod stations;
pub mod tide_data;

pub use error::TideError;

/// A longitude/latitude pair in the WGS84 geographic reference system.
///
/// Longitude comes first, matching the (easting, northing) axis order used
/// throughout reprojection.
///
/// # Example
/// ```
/// use arps_tides::GeoPoint;
///
/// let point = GeoPoint::new(-127.7277, 51.6601);
/// assert_eq!(point.lon, -127.7277);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Degrees east, -180 to 180
    pub lon: f64,
    /// Degrees north, -90 to 90
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        GeoPoint { lon, lat }
    }

    /// True when both coordinates fall inside the WGS84 ranges.
    pub fn is_valid(&self) -> bool {
        (-180.0..=180.0).contains(&self.lon) && (-90.0..=90.0).contains(&self.lat)
    }
}

impl From<GeoPoint> for geo::Point<f64> {
    fn from(p: GeoPoint) -> Self {
        geo::Point::new(p.lon, p.lat)
    }
}

/// A named tide reference station.
///
/// Names are expected to be unique within one station directory listing,
/// but nothing here enforces it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TideStation {
    pub name: String,
    pub location: GeoPoint,
}

/// A station together with its geodesic distance (meters) to some point.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StationDistance {
    pub station: TideStation,
    pub distance_m: f64,
}

/// Final result of the pipeline for one image.
///
/// # Example
/// ```
/// use arps_tides::TideReading;
/// use chrono::NaiveDate;
///
/// let reading = TideReading {
///     tide_height_m: 1.052,
///     station_name: "Addenbroke Isl.".to_string(),
///     station_distance_m: 11_362.0,
///     acquisition_time: NaiveDate::from_ymd_opt(2021, 7, 28)
///         .unwrap()
///         .and_hms_opt(19, 1, 28)
///         .unwrap(),
/// };
///
/// assert_eq!(reading.station_name, "Addenbroke Isl.");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TideReading {
    /// Tide height in meters as reported by the tide service
    pub tide_height_m: f64,
    pub station_name: String,
    /// Geodesic distance from the raster center to the station, in meters
    pub station_distance_m: f64,
    /// Acquisition time in UTC, whole seconds
    pub acquisition_time: NaiveDateTime,
}
