//! # Integration Tests
//!
//! Exercise the full pipeline against real GeoTIFF files written through GDAL
//! and a deterministic in-memory tide service.


use arps_tides::tide_data::TideDataSource;
use arps_tides::{GeoPoint, TideError, TideStation};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Tide service double returning a fixed station list and height.
pub(crate) struct FakeTideService {
    pub stations: Vec<TideStation>,
    pub height: Result<f64, String>,
    pub height_calls: AtomicUsize,
}

impl FakeTideService {
    pub fn new(height: f64) -> Self {
        FakeTideService {
            stations: central_coast_stations(),
            height: Ok(height),
            height_calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(reason: &str) -> Self {
        FakeTideService {
            height: Err(reason.to_string()),
            ..Self::new(0.0)
        }
    }
}

#[async_trait]
impl TideDataSource for FakeTideService {
    async fn list_stations(&self) -> Result<Vec<TideStation>, TideError> {
        Ok(self.stations.clone())
    }

    async fn height_at(&self, _station: &str, _time: NaiveDateTime) -> Result<f64, TideError> {
        self.height_calls.fetch_add(1, Ordering::SeqCst);
        self.height.clone().map_err(TideError::TideService)
    }
}

/// A handful of BC central coast stations around the test raster.
pub(crate) fn central_coast_stations() -> Vec<TideStation> {
    [
        ("Bella Bella", -128.1450, 52.1608),
        ("Namu", -127.8683, 51.8625),
        ("Addenbroke Isl.", -127.8636, 51.6036),
        ("Port Hardy", -127.4889, 50.7219),
    ]
    .into_iter()
    .map(|(name, lon, lat)| TideStation {
        name: name.to_string(),
        location: GeoPoint::new(lon, lat),
    })
    .collect()
}
