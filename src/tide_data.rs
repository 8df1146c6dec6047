//! # Tide Service Access
//!
//! Station locations and tide heights come from an external time-series
//! service. The pipeline only sees the [`TideDataSource`] capability, so tests
//! and alternative backends can stand in for the real service.
//!
//! ## Hakai Tide Service
//!
//! [`HakaiTideService`] talks to the HTTP API at
//! `https://tides.server.hakai.app` (configurable):
//!
//! | Request | Response |
//! |---|---|
//! | `GET /stations?include_coords=true` | `[{"name": .., "longitude": .., "latitude": ..}, ..]` |
//! | `GET /tides/at/{station}?date_time=YYYY-MM-DDTHH:MM:SS&tz=UTC` | `{"height": ..}` |
//!
//! Station names are sent as a single percent-encoded path segment, so names
//! with spaces or dots ("Addenbroke Isl.") are safe.
//!
//! ## Error Handling
//!
//! Every request runs under the client's timeout. Transport failures,
//! timeouts, non-2xx statuses and undecodable bodies become
//! [`TideError::StationDirectory`] for the station listing and
//! [`TideError::TideService`] for height lookups. Nothing is retried.

use crate::{GeoPoint, TideError, TideStation};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::{Client, Url};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Source of tide stations and tide heights.
#[async_trait]
pub trait TideDataSource: Send + Sync {
    /// List every known station with its location.
    async fn list_stations(&self) -> Result<Vec<TideStation>, TideError>;

    /// Tide height in meters at `station` for the UTC instant `time`.
    async fn height_at(&self, station: &str, time: NaiveDateTime) -> Result<f64, TideError>;
}

/// Default base URL of the Hakai tide service.
pub const DEFAULT_BASE_URL: &str = "https://tides.server.hakai.app";

/// Format used for the `date_time` query parameter.
const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Station directory entry as returned by the service.
#[derive(Debug, Deserialize)]
struct StationRecord {
    name: String,
    longitude: f64,
    latitude: f64,
}

impl From<StationRecord> for TideStation {
    fn from(record: StationRecord) -> Self {
        TideStation {
            name: record.name,
            location: GeoPoint::new(record.longitude, record.latitude),
        }
    }
}

#[derive(Debug, Deserialize)]
struct HeightRecord {
    height: Option<f64>,
}

/// Decode a station directory payload.
pub fn parse_stations(body: &str) -> Result<Vec<TideStation>, TideError> {
    let records: Vec<StationRecord> = serde_json::from_str(body)
        .map_err(|e| TideError::StationDirectory(format!("malformed station list: {e}")))?;
    Ok(records.into_iter().map(TideStation::from).collect())
}

/// Decode a tide height payload.
pub fn parse_height(body: &str) -> Result<f64, TideError> {
    let record: HeightRecord = serde_json::from_str(body)
        .map_err(|e| TideError::TideService(format!("malformed tide payload: {e}")))?;
    record
        .height
        .ok_or_else(|| TideError::TideService("response has no height".to_string()))
}

fn describe(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("request timed out: {err}")
    } else {
        err.to_string()
    }
}

/// HTTP client for the Hakai tide service.
#[derive(Debug, Clone)]
pub struct HakaiTideService {
    client: Client,
    base_url: Url,
}

impl HakaiTideService {
    /// Build a client for the service rooted at `base_url`.
    ///
    /// # Errors
    /// [`TideError::Config`] if `base_url` is not an absolute http(s) URL or
    /// the HTTP client cannot be constructed.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TideError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| TideError::Config(format!("invalid service URL {base_url:?}: {e}")))?;
        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(TideError::Config(format!(
                "service URL must be http(s): {base_url}"
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TideError::Config(format!("cannot build HTTP client: {e}")))?;

        Ok(HakaiTideService { client, base_url })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // checked in `new`: the base URL always accepts path segments
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// URL of the station directory listing.
    pub fn stations_url(&self) -> Url {
        let mut url = self.endpoint(&["stations"]);
        url.query_pairs_mut().append_pair("include_coords", "true");
        url
    }

    /// URL of the tide height at `station` for `time` (UTC).
    ///
    /// # Errors
    /// [`TideError::TideService`] for names that cannot be sent as a single
    /// path segment (empty, `.` or `..`).
    pub fn tide_url(&self, station: &str, time: NaiveDateTime) -> Result<Url, TideError> {
        if matches!(station, "" | "." | "..") {
            return Err(TideError::TideService(format!(
                "station name {station:?} cannot be used in a request path"
            )));
        }
        let mut url = self.endpoint(&["tides", "at", station]);
        url.query_pairs_mut()
            .append_pair("date_time", &time.format(DATE_TIME_FORMAT).to_string())
            .append_pair("tz", "UTC");
        Ok(url)
    }

    async fn get_text(&self, url: Url) -> Result<String, reqwest::Error> {
        self.client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }
}

#[async_trait]
impl TideDataSource for HakaiTideService {
    #[instrument(skip(self), fields(base = %self.base_url))]
    async fn list_stations(&self) -> Result<Vec<TideStation>, TideError> {
        let url = self.stations_url();
        debug!(url = %url, "fetching station directory");

        let body = self
            .get_text(url)
            .await
            .map_err(|e| TideError::StationDirectory(describe(&e)))?;
        let stations = parse_stations(&body)?;

        info!(count = stations.len(), "fetched station directory");
        Ok(stations)
    }

    #[instrument(skip(self), fields(base = %self.base_url))]
    async fn height_at(&self, station: &str, time: NaiveDateTime) -> Result<f64, TideError> {
        let url = self.tide_url(station, time)?;
        debug!(url = %url, "fetching tide height");

        let body = self
            .get_text(url)
            .await
            .map_err(|e| TideError::TideService(describe(&e)))?;
        let height = parse_height(&body)?;

        info!(station, height, "fetched tide height");
        Ok(height)
    }
}
