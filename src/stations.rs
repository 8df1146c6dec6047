//! # Nearest Station Search
//!
//! Distances are geodesic, measured on the WGS84 ellipsoid (Karney's
//! algorithm via the `geo` crate), and reported in meters.

use crate::{GeoPoint, StationDistance, TideError, TideStation};
use geo::GeodesicDistance;
use tracing::debug;

/// Geodesic distance in meters between two WGS84 points.
pub fn geodesic_distance(a: GeoPoint, b: GeoPoint) -> f64 {
    geo::Point::from(a).geodesic_distance(&geo::Point::from(b))
}

/// Pair every station with its distance to `origin`, preserving input order.
pub fn station_distances(origin: GeoPoint, stations: &[TideStation]) -> Vec<StationDistance> {
    stations
        .iter()
        .map(|station| StationDistance {
            station: station.clone(),
            distance_m: geodesic_distance(origin, station.location),
        })
        .collect()
}

/// Select the station closest to `origin`.
///
/// Equidistant stations resolve to whichever comes first in `stations`. That
/// makes the choice deterministic for a given listing, but it leans on the
/// directory returning stations in a stable order.
///
/// # Errors
/// [`TideError::NoStations`] when `stations` is empty.
pub fn nearest_station(
    origin: GeoPoint,
    stations: &[TideStation],
) -> Result<StationDistance, TideError> {
    let nearest = station_distances(origin, stations)
        .into_iter()
        .fold(None::<StationDistance>, |best, candidate| match best {
            Some(b) if b.distance_m <= candidate.distance_m => Some(b),
            _ => Some(candidate),
        })
        .ok_or(TideError::NoStations)?;

    debug!(
        station = %nearest.station.name,
        distance_m = nearest.distance_m,
        candidates = stations.len(),
        "selected nearest station"
    );
    Ok(nearest)
}
