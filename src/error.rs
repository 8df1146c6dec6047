//! Error types shared by every stage of the pipeline.

use thiserror::Error;

/// Errors that can occur while turning a raster into a tide reading.
///
/// Each variant is raised where the failure happens and travels to the caller
/// untouched. Nothing in the library retries or substitutes a fallback value.
#[derive(Error, Debug)]
pub enum TideError {
    /// The scene-id tag is absent or none of its lines carries a timestamp
    #[error("invalid or missing timestamp data")]
    InvalidTimestamp,

    /// The raster has no coordinate reference system
    #[error("missing spatial reference")]
    MissingSpatialReference,

    /// The raster's reference system cannot be transformed to WGS84
    #[error("reprojection error: {0}")]
    Reprojection(String),

    /// The station directory returned an empty list
    #[error("no stations available")]
    NoStations,

    /// Network, HTTP, or payload failure talking to the station directory
    #[error("station directory unreachable: {0}")]
    StationDirectory(String),

    /// Network, HTTP, or payload failure talking to the tide service
    #[error("tide service error: {0}")]
    TideService(String),

    /// Input path missing, wrong extension, or not a QA image
    #[error("invalid input file: {0}")]
    InvalidInputFile(String),

    /// Bad service URL or HTTP client setup
    #[error("configuration error: {0}")]
    Config(String),

    /// GDAL could not open or read the raster
    #[error("raster error: {0}")]
    Raster(#[from] gdal::errors::GdalError),

    /// A blocking worker panicked or was cancelled
    #[error("task failed: {0}")]
    Task(String),
}

impl From<tokio::task::JoinError> for TideError {
    fn from(err: tokio::task::JoinError) -> Self {
        TideError::Task(err.to_string())
    }
}
