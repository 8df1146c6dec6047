//! # Acquisition Time Resolution
//!
//! A PlanetScope ARPS QA raster is a mosaic of several scene strips. Each strip
//! leaves one line in the `SCENE_IDS[LAYER_2_VALUE]` metadata tag:
//!
//! ```text
//! PSScene/20210728_191039_1009[15]
//! PSScene/20210728_184303_31_2427[207]
//! None[-999]
//! ```
//!
//! Lines shaped like `<prefix>/YYYYMMDD_HHMMSS_<suffix>` carry the strip's
//! capture time in UTC. Anything else (the `None[...]` sentinel included) is
//! skipped. The image's acquisition time is the mean of the strip times,
//! computed on epoch seconds and rounded half-up to a whole second.

use crate::raster::{with_raster, RasterSource};
use crate::TideError;
use chrono::{DateTime, NaiveDateTime, Timelike};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Metadata tag holding the newline-separated scene identifiers.
pub const SCENE_IDS_TAG: &str = "SCENE_IDS[LAYER_2_VALUE]";

fn scene_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^.*/(\d{8}_\d{6})_.*$").expect("scene id pattern should be valid")
    })
}

/// Extract the capture time from one scene-identifier line.
///
/// Returns `None` for lines that do not match the scene-id shape or whose
/// digits do not form a real calendar date and time. Leap seconds (`:60`)
/// count as malformed.
pub fn parse_scene_timestamp(line: &str) -> Option<NaiveDateTime> {
    let caps = scene_id_pattern().captures(line.trim())?;
    NaiveDateTime::parse_from_str(&caps[1], "%Y%m%d_%H%M%S")
        .ok()
        .filter(|t| t.nanosecond() < 1_000_000_000)
}

/// Mean of the given times, rounded half-up to the nearest second.
///
/// Averaging is done as `sum(epoch seconds) / count`, so no calendar or
/// timezone arithmetic is involved. Returns `None` for an empty slice.
pub fn mean_timestamp(times: &[NaiveDateTime]) -> Option<NaiveDateTime> {
    if times.is_empty() {
        return None;
    }

    let sum: i128 = times
        .iter()
        .map(|t| t.and_utc().timestamp() as i128)
        .sum();
    let count = times.len() as i128;

    // floor(sum / count + 1/2) in integer arithmetic
    let secs = (2 * sum + count).div_euclid(2 * count);

    DateTime::from_timestamp(i64::try_from(secs).ok()?, 0).map(|dt| dt.naive_utc())
}

/// Resolve the acquisition time from the scene-id tag of an open raster.
///
/// # Errors
/// [`TideError::InvalidTimestamp`] when the tag is missing or none of its
/// lines carries a timestamp.
pub fn resolve_acquisition_time<R: RasterSource + ?Sized>(
    raster: &R,
) -> Result<NaiveDateTime, TideError> {
    let Some(scene_ids) = raster.tag(SCENE_IDS_TAG) else {
        warn!(tag = SCENE_IDS_TAG, "scene id tag not found");
        return Err(TideError::InvalidTimestamp);
    };

    let mut times = Vec::new();
    for line in scene_ids.lines() {
        match parse_scene_timestamp(line) {
            Some(t) => times.push(t),
            None => debug!(line, "skipping scene id without timestamp"),
        }
    }

    let acquired = mean_timestamp(&times).ok_or(TideError::InvalidTimestamp)?;
    debug!(strips = times.len(), %acquired, "resolved acquisition time");
    Ok(acquired)
}

/// Open the raster at `path` and resolve its acquisition time.
///
/// The raster is closed again before this returns.
pub fn acquisition_time<P: AsRef<Path>>(path: P) -> Result<NaiveDateTime, TideError> {
    with_raster(path, |raster| resolve_acquisition_time(raster))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::{MemoryRaster, RasterBounds};
    use chrono::NaiveDate;

    const SCENE_IDS: &str = "PSScene/20210728_191039_1009[15]\n\
                             PSScene/20210728_191040_1009[16]\n\
                             PSScene/20210728_191041_1009[17]\n\
                             PSScene/20210728_191042_1009[18]\n\
                             PSScene/20210728_184303_31_2427[207]\n\
                             PSScene/20210728_184305_78_2427[208]\n\
                             None[-999]";

    fn dt(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, 7, 28)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn raster_with(scene_ids: Option<&str>) -> MemoryRaster {
        let raster = MemoryRaster::new(RasterBounds::new(0.0, 0.0, 1.0, 1.0), Some("EPSG:4326"));
        match scene_ids {
            Some(ids) => raster.with_tag(SCENE_IDS_TAG, ids),
            None => raster,
        }
    }

    #[test]
    fn test_parse_scene_timestamp() {
        assert_eq!(
            parse_scene_timestamp("PSScene/20210728_191039_1009[15]"),
            Some(dt(19, 10, 39))
        );
        assert_eq!(
            parse_scene_timestamp("  PSScene/20210728_184305_78_2427[208]\r"),
            Some(dt(18, 43, 5))
        );
        assert_eq!(parse_scene_timestamp("None[-999]"), None);
        assert_eq!(parse_scene_timestamp("20210728_191039_1009"), None);
        assert_eq!(parse_scene_timestamp("PSScene/20211328_191039_x"), None);
        assert_eq!(parse_scene_timestamp("PSScene/20210728_235960_x"), None);
        assert_eq!(parse_scene_timestamp(""), None);
    }

    #[test]
    fn test_resolves_mean_of_scene_ids() {
        let raster = raster_with(Some(SCENE_IDS));
        assert_eq!(resolve_acquisition_time(&raster).unwrap(), dt(19, 1, 28));
    }

    #[test]
    fn test_malformed_lines_do_not_affect_mean() {
        let noisy = format!("None[-999]\ngarbage\n{SCENE_IDS}\nNone[0]\n");
        let clean = raster_with(Some(SCENE_IDS));
        let noisy = raster_with(Some(&noisy));
        assert_eq!(
            resolve_acquisition_time(&clean).unwrap(),
            resolve_acquisition_time(&noisy).unwrap()
        );
    }

    #[test]
    fn test_rounds_half_up() {
        // mean of :00 and :01 is :00.5 -> :01
        assert_eq!(
            mean_timestamp(&[dt(12, 0, 0), dt(12, 0, 1)]),
            Some(dt(12, 0, 1))
        );
        // mean of :00, :00, :01 is :00.33 -> :00
        assert_eq!(
            mean_timestamp(&[dt(12, 0, 0), dt(12, 0, 0), dt(12, 0, 1)]),
            Some(dt(12, 0, 0))
        );
        // mean of :00, :01, :01 is :00.67 -> :01
        assert_eq!(
            mean_timestamp(&[dt(12, 0, 0), dt(12, 0, 1), dt(12, 0, 1)]),
            Some(dt(12, 0, 1))
        );
    }

    #[test]
    fn test_mean_crosses_midnight() {
        let before = NaiveDate::from_ymd_opt(2021, 7, 28)
            .unwrap()
            .and_hms_opt(23, 59, 59)
            .unwrap();
        let after = NaiveDate::from_ymd_opt(2021, 7, 29)
            .unwrap()
            .and_hms_opt(0, 0, 1)
            .unwrap();
        let expected = NaiveDate::from_ymd_opt(2021, 7, 29)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(mean_timestamp(&[before, after]), Some(expected));
    }

    #[test]
    fn test_empty_mean() {
        assert_eq!(mean_timestamp(&[]), None);
    }

    #[test]
    fn test_missing_tag_fails() {
        let raster = raster_with(None);
        assert!(matches!(
            resolve_acquisition_time(&raster),
            Err(TideError::InvalidTimestamp)
        ));
    }

    #[test]
    fn test_only_sentinels_fails() {
        let raster = raster_with(Some("None[-999]\nNone[-998]"));
        assert!(matches!(
            resolve_acquisition_time(&raster),
            Err(TideError::InvalidTimestamp)
        ));
    }
}
