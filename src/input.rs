use crate::core::units::{Orientation360, Season};
use crate::errors::InvalidInputError;
use crate::solar_physics::LATITUDE_SHENZHEN;
use anyhow::anyhow;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_valid::Validate;
use std::io::{BufReader, Read};
use std::ops::RangeInclusive;

pub fn ingest_for_processing(json: impl Read) -> Result<InputForProcessing, anyhow::Error> {
    InputForProcessing::init_with_json(json)
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct Input {
    pub site: Site,
    /// Compass bearing the panels face; south (180) when not given.
    #[serde(default = "default_panel_orientation")]
    #[validate]
    pub panel_orientation: Orientation360,
    #[serde(default)]
    #[validate]
    pub tilt_sweep: TiltSweep,
    #[serde(default)]
    #[validate]
    pub days: DayRange,
    #[serde(default)]
    #[validate]
    pub seasonal_tilts: SeasonalTilts,
    #[serde(default)]
    pub sun_path: SunPathInput,
}

impl Input {
    /// Panel azimuth measured from south, as used by the solar geometry functions.
    pub fn panel_azimuth(&self) -> f64 {
        self.panel_orientation.to_south_referenced()
    }
}

fn default_panel_orientation() -> Orientation360 {
    Orientation360::from_south_referenced(0.).unwrap_or_default()
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct Site {
    pub name: Option<String>,
    pub latitude: f64,
}

impl Default for Site {
    fn default() -> Self {
        Self {
            name: Some("Shenzhen".into()),
            latitude: LATITUDE_SHENZHEN,
        }
    }
}

// upper bound on the number of steps in a tilt or hour angle sweep
const MAX_SWEEP_SAMPLES: f64 = 100_000.;

/// An inclusive, evenly spaced set of panel tilts to evaluate, in degrees.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct TiltSweep {
    #[validate(minimum = 0.)]
    #[validate(maximum = 90.)]
    pub start: f64,
    #[validate(minimum = 0.)]
    #[validate(maximum = 90.)]
    pub end: f64,
    #[validate(exclusive_minimum = 0.)]
    pub step: f64,
}

impl Default for TiltSweep {
    fn default() -> Self {
        Self {
            start: 0.,
            end: 90.,
            step: 1.,
        }
    }
}

impl TiltSweep {
    pub fn new(start: f64, end: f64, step: f64) -> Result<Self, InvalidInputError> {
        let sweep = Self { start, end, step };
        sweep.check()?;
        Ok(sweep)
    }

    fn check(&self) -> Result<(), InvalidInputError> {
        let in_range = |angle: f64| (0. ..=90.).contains(&angle);
        if !(in_range(self.start)
            && in_range(self.end)
            && self.start <= self.end
            && self.step > 0.
            && (self.end - self.start) / self.step <= MAX_SWEEP_SAMPLES)
        {
            return Err(InvalidInputError::InvalidTiltSweep {
                start: self.start,
                end: self.end,
                step: self.step,
            });
        }
        Ok(())
    }

    /// All tilt angles in the sweep, including `end` when it falls on a step.
    pub fn angles(&self) -> Vec<f64> {
        // tolerate rounding when (end - start) is a whole number of steps
        let count = ((self.end - self.start) / self.step + 1e-9).floor() as usize + 1;

        (0..count)
            .map(|idx| self.start + idx as f64 * self.step)
            .collect()
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct DayRange {
    #[validate(minimum = 1)]
    #[validate(maximum = 366)]
    pub start: u32,
    #[validate(minimum = 1)]
    #[validate(maximum = 366)]
    pub end: u32,
}

impl Default for DayRange {
    fn default() -> Self {
        Self { start: 1, end: 365 }
    }
}

impl DayRange {
    pub fn days(&self) -> RangeInclusive<u32> {
        self.start..=self.end
    }

    fn check(&self) -> Result<(), InvalidInputError> {
        if self.start == 0 || self.end > 366 || self.start > self.end {
            return Err(InvalidInputError::InvalidDayRange {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }
}

/// Tilt used in each season when panels are adjusted four times a year.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct SeasonalTilts {
    #[validate(minimum = 0.)]
    #[validate(maximum = 90.)]
    pub spring: f64,
    #[validate(minimum = 0.)]
    #[validate(maximum = 90.)]
    pub summer: f64,
    #[validate(minimum = 0.)]
    #[validate(maximum = 90.)]
    pub autumn: f64,
    #[validate(minimum = 0.)]
    #[validate(maximum = 90.)]
    pub winter: f64,
}

impl Default for SeasonalTilts {
    fn default() -> Self {
        Self {
            spring: 15.,
            summer: 0.,
            autumn: 30.,
            winter: 45.,
        }
    }
}

impl SeasonalTilts {
    pub fn tilt_for(&self, season: Season) -> f64 {
        match season {
            Season::Spring => self.spring,
            Season::Summer => self.summer,
            Season::Autumn => self.autumn,
            Season::Winter => self.winter,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SunPathInput {
    #[serde(default = "default_key_days")]
    pub key_days: IndexMap<String, u32>,
    #[serde(default = "default_hour_angle_start")]
    pub hour_angle_start: f64,
    #[serde(default = "default_hour_angle_end")]
    pub hour_angle_end: f64,
    #[serde(default = "default_hour_angle_step")]
    pub hour_angle_step: f64,
}

impl Default for SunPathInput {
    fn default() -> Self {
        Self {
            key_days: default_key_days(),
            hour_angle_start: default_hour_angle_start(),
            hour_angle_end: default_hour_angle_end(),
            hour_angle_step: default_hour_angle_step(),
        }
    }
}

impl SunPathInput {
    /// Hour angles to trace, from `hour_angle_start` up to but excluding `hour_angle_end`.
    pub fn hour_angles(&self) -> Vec<f64> {
        let count = ((self.hour_angle_end - self.hour_angle_start) / self.hour_angle_step)
            .ceil()
            .max(0.) as usize;

        (0..count)
            .map(|idx| self.hour_angle_start + idx as f64 * self.hour_angle_step)
            .collect()
    }

    fn check(&self) -> Result<(), InvalidInputError> {
        let in_range = |angle: f64| (-180. ..=180.).contains(&angle);
        if !(in_range(self.hour_angle_start)
            && in_range(self.hour_angle_end)
            && self.hour_angle_start < self.hour_angle_end
            && self.hour_angle_step > 0.
            && (self.hour_angle_end - self.hour_angle_start) / self.hour_angle_step
                <= MAX_SWEEP_SAMPLES)
        {
            return Err(InvalidInputError::InvalidHourAngleSweep {
                start: self.hour_angle_start,
                end: self.hour_angle_end,
                step: self.hour_angle_step,
            });
        }
        Ok(())
    }
}

fn default_key_days() -> IndexMap<String, u32> {
    IndexMap::from([
        ("Winter Solstice (Dec 21)".to_string(), 355),
        ("Spring/Autumn Equinox".to_string(), 80),
        ("Summer Solstice (Jun 21)".to_string(), 172),
    ])
}

// -8 hours to +8 hours from solar noon
fn default_hour_angle_start() -> f64 {
    -120.
}

fn default_hour_angle_end() -> f64 {
    120.
}

fn default_hour_angle_step() -> f64 {
    2.
}

fn check_latitude(latitude: f64) -> Result<(), InvalidInputError> {
    if !(-90. ..=90.).contains(&latitude) {
        return Err(InvalidInputError::LatitudeOutOfRange(latitude));
    }
    Ok(())
}

pub struct InputForProcessing {
    input: Input,
}

impl InputForProcessing {
    pub fn init_with_json(json: impl Read) -> Result<Self, anyhow::Error> {
        let reader = BufReader::new(json);

        let input: Input = serde_json::from_reader(reader)?;
        input
            .validate()
            .map_err(|errors| anyhow!("Input failed validation: {errors}"))?;
        check_latitude(input.site.latitude)?;
        input.tilt_sweep.check()?;
        input.days.check()?;
        input.sun_path.check()?;

        Ok(Self { input })
    }

    pub fn finalize(self) -> Input {
        self.input
    }

    pub fn latitude(&self) -> f64 {
        self.input.site.latitude
    }

    pub fn set_latitude(&mut self, latitude: f64) -> Result<&Self, InvalidInputError> {
        check_latitude(latitude)?;
        self.input.site.latitude = latitude;
        Ok(self)
    }
}
