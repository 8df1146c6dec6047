//! # Tide Reading Output
//!
//! Formats a [`TideReading`] for the terminal, either as a short
//! human-readable report or as JSON for scripting.

use crate::TideReading;

/// Format used for the acquisition time in the text report.
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render the reading as the four-line text report.
///
/// ```text
/// Acquisition Time: 2021-07-28 19:01:28
/// Tide Height (m): 1.05
/// Station Name: Addenbroke Isl.
/// Station Distance (m): 11362
/// ```
pub fn render_text(reading: &TideReading) -> String {
    format!(
        "Acquisition Time: {}\n\
         Tide Height (m): {:.2}\n\
         Station Name: {}\n\
         Station Distance (m): {:.0}",
        reading.acquisition_time.format(TIME_FORMAT),
        reading.tide_height_m,
        reading.station_name,
        reading.station_distance_m,
    )
}

/// Render the reading as pretty-printed JSON.
pub fn render_json(reading: &TideReading) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(reading)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn reading() -> TideReading {
        TideReading {
            tide_height_m: 1.0524,
            station_name: "Addenbroke Isl.".to_string(),
            station_distance_m: 11_361.6,
            acquisition_time: NaiveDate::from_ymd_opt(2021, 7, 28)
                .unwrap()
                .and_hms_opt(19, 1, 28)
                .unwrap(),
        }
    }

    #[test]
    fn test_render_text() {
        assert_eq!(
            render_text(&reading()),
            "Acquisition Time: 2021-07-28 19:01:28\n\
             Tide Height (m): 1.05\n\
             Station Name: Addenbroke Isl.\n\
             Station Distance (m): 11362"
        );
    }

    #[test]
    fn test_render_json() {
        let json = render_json(&reading()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["station_name"], "Addenbroke Isl.");
        assert_eq!(value["tide_height_m"], 1.0524);
        assert_eq!(value["acquisition_time"], "2021-07-28T19:01:28");

        let parsed: TideReading = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, reading());
    }
}
