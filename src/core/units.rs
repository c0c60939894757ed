use crate::errors::InvalidInputError;
use serde::{Deserialize, Serialize};
use serde_valid::Validate;
use std::fmt::Display;
use thiserror::Error;

pub const WATT_HOURS_PER_KILOWATT_HOUR: u32 = 1_000;
pub const HOURS_PER_DAY: u32 = 24;
pub const DAYS_PER_YEAR: u32 = 365;
pub const DAYS_IN_MONTH: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
/// The sun moves 15 degrees of hour angle per hour of solar time.
pub const DEGREES_PER_HOUR: f64 = 15.;

/// Convert a month (1-12) and day of month into a 1-indexed day of the year, assuming a
/// non-leap year.
pub fn day_of_year(month: u32, day: u32) -> Result<u32, InvalidInputError> {
    if !(1..=12).contains(&month) {
        return Err(InvalidInputError::InvalidDate { month, day });
    }
    let days_in_month = DAYS_IN_MONTH[(month - 1) as usize];
    if day == 0 || day > days_in_month {
        return Err(InvalidInputError::InvalidDate { month, day });
    }

    Ok(DAYS_IN_MONTH[..(month - 1) as usize].iter().sum::<u32>() + day)
}

/// The (1-indexed) month in which the given day of a non-leap year falls. Day 366 is treated
/// as part of December.
pub fn month_for_day_of_year(day_of_year: u32) -> u32 {
    let mut days_so_far = 0;
    for (month_idx, days_in_month) in DAYS_IN_MONTH.iter().enumerate() {
        days_so_far += days_in_month;
        if day_of_year <= days_so_far {
            return month_idx as u32 + 1;
        }
    }

    12
}

pub fn kwh_from_wh(watt_hours: f64) -> f64 {
    watt_hours / WATT_HOURS_PER_KILOWATT_HOUR as f64
}

/// Meteorological seasons for the northern hemisphere.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    pub fn for_month(month: u32) -> Self {
        match month {
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            9..=11 => Season::Autumn,
            _ => Season::Winter,
        }
    }

    pub fn for_day_of_year(day_of_year: u32) -> Self {
        Self::for_month(month_for_day_of_year(day_of_year))
    }
}

impl Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Season::Spring => "spring",
                Season::Summer => "summer",
                Season::Autumn => "autumn",
                Season::Winter => "winter",
            }
        )
    }
}

/// A compass bearing, 0 to 360 degrees clockwise from north, as panel orientations are
/// usually surveyed.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, PartialOrd, Serialize, Validate)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Orientation360(
    #[validate(minimum = 0.)]
    #[validate(maximum = 360.)]
    f64,
);

impl Orientation360 {
    pub fn new(angle: f64) -> Result<Self, Orientation360Error> {
        if !(0. ..=360.).contains(&angle) {
            return Err(Orientation360Error::InvalidAngle);
        }

        Ok(Self(angle))
    }

    pub fn angle(&self) -> f64 {
        self.0
    }

    /// Convert to an azimuth measured from south, east negative and west positive.
    pub fn to_south_referenced(&self) -> f64 {
        self.0 - 180.
    }

    pub fn from_south_referenced(azimuth: f64) -> Result<Self, Orientation360Error> {
        if !(-180. ..=180.).contains(&azimuth) {
            return Err(Orientation360Error::InvalidSouthReferencedAngle);
        }
        Ok(Self(azimuth + 180.))
    }
}

impl Display for Orientation360 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Error)]
pub enum Orientation360Error {
    #[error("Angle must be between 0 and 360 degrees inclusive")]
    InvalidAngle,
    #[error("Angle from south must be between -180 and 180 degrees inclusive")]
    InvalidSouthReferencedAngle,
}
