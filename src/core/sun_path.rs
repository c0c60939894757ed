// Tables describing where the sun is over the course of a year and over a single day.

use crate::solar_physics::{azimuth, declination, elevation};
use itertools::{Itertools, MinMaxResult};
use serde::Serialize;

/// An angle, in degrees, associated with a day of the year.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct DayAngle {
    pub day: u32,
    pub angle: f64,
}

pub fn declination_series(days: impl IntoIterator<Item = u32>) -> Vec<DayAngle> {
    days.into_iter()
        .map(|day| DayAngle {
            day,
            angle: declination(day as i32),
        })
        .collect()
}

/// The elevation of the sun at solar noon (its highest point) on each day.
pub fn noon_elevations(latitude: f64, days: impl IntoIterator<Item = u32>) -> Vec<DayAngle> {
    days.into_iter()
        .map(|day| DayAngle {
            day,
            angle: elevation(latitude, declination(day as i32), 0.),
        })
        .collect()
}

/// The lowest and highest angles in a series, or `None` for an empty series.
pub fn extremes(series: &[DayAngle]) -> Option<(DayAngle, DayAngle)> {
    match series
        .iter()
        .minmax_by(|a, b| a.angle.total_cmp(&b.angle))
    {
        MinMaxResult::NoElements => None,
        MinMaxResult::OneElement(only) => Some((*only, *only)),
        MinMaxResult::MinMax(min, max) => Some((*min, *max)),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SunPathSample {
    pub hour_angle: f64,
    pub elevation: f64,
    /// Degrees from south, east negative.
    pub azimuth: f64,
}

impl SunPathSample {
    /// Azimuth as a compass bearing (north 0, east 90, south 180, west 270).
    pub fn compass_bearing(&self) -> f64 {
        self.azimuth + 180.
    }

    /// Angular distance from the zenith, the radius used on a polar sun path diagram.
    pub fn zenith_distance(&self) -> f64 {
        90. - self.elevation
    }
}

/// Trace the sun across the sky on `day`, keeping only the samples where it is above the
/// horizon.
pub fn sun_path(latitude: f64, day: u32, hour_angles: &[f64]) -> Vec<SunPathSample> {
    let declination = declination(day as i32);

    hour_angles
        .iter()
        .filter_map(|&hour_angle| {
            let elevation = elevation(latitude, declination, hour_angle);
            (elevation > 0.).then(|| SunPathSample {
                hour_angle,
                elevation,
                azimuth: azimuth(latitude, declination, elevation, hour_angle),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::units::DAYS_PER_YEAR;
    use crate::solar_physics::LATITUDE_SHENZHEN;
    use approx::assert_abs_diff_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn year() -> Vec<u32> {
        (1..=DAYS_PER_YEAR).collect()
    }

    #[fixture]
    fn hour_angles() -> Vec<f64> {
        (0..120).map(|idx| -120. + idx as f64 * 2.).collect()
    }

    #[rstest]
    fn should_tabulate_declination_for_every_day(year: Vec<u32>) {
        let series = declination_series(year);

        assert_eq!(series.len(), 365);
        assert_eq!(series[80], DayAngle { day: 81, angle: 0. });

        let (min, max) = extremes(&series).unwrap();
        assert_eq!(max.day, 172);
        assert_eq!(min.day, 355);
    }

    #[rstest]
    fn should_find_noon_elevation_extremes_at_solstices(year: Vec<u32>) {
        let series = noon_elevations(LATITUDE_SHENZHEN, year);

        let (min, max) = extremes(&series).unwrap();
        // the sun is overhead at 22.5N on the days the declination passes 22.5 degrees
        assert!(max.angle > 89.9);
        assert_abs_diff_eq!(min.angle, 90. - 22.5 - 23.449_783, epsilon = 1e-5);
        assert_eq!(min.day, 355);
    }

    #[test]
    fn should_have_no_extremes_for_empty_series() {
        assert_eq!(extremes(&[]), None);
    }

    #[test]
    fn should_have_same_extremes_for_single_day() {
        let series = noon_elevations(0., [81]);

        assert_eq!(extremes(&series), Some((series[0], series[0])));
    }

    #[rstest]
    fn should_only_trace_sun_above_horizon(hour_angles: Vec<f64>) {
        let path = sun_path(LATITUDE_SHENZHEN, 355, &hour_angles);

        assert!(!path.is_empty());
        assert!(path.len() < hour_angles.len());
        assert!(path.iter().all(|sample| sample.elevation > 0.));
    }

    #[rstest]
    fn should_move_from_east_to_west(hour_angles: Vec<f64>) {
        let path = sun_path(LATITUDE_SHENZHEN, 80, &hour_angles);

        let first = path.first().unwrap();
        let last = path.last().unwrap();
        assert!(first.azimuth < 0.);
        assert!(last.azimuth > 0.);
        assert!(first.compass_bearing() < 180.);
        assert!(last.compass_bearing() > 180.);
    }

    #[rstest]
    fn should_have_longer_path_in_summer(hour_angles: Vec<f64>) {
        let summer = sun_path(LATITUDE_SHENZHEN, 172, &hour_angles);
        let winter = sun_path(LATITUDE_SHENZHEN, 355, &hour_angles);

        assert!(summer.len() > winter.len());
    }

    #[test]
    fn should_place_noon_sample_nearest_zenith() {
        let path = sun_path(LATITUDE_SHENZHEN, 172, &[-30., 0., 30.]);

        assert_eq!(path.len(), 3);
        assert!(path[1].zenith_distance() < path[0].zenith_distance());
        assert_abs_diff_eq!(path[0].zenith_distance(), path[2].zenith_distance(), epsilon = 1e-9);
    }
}
