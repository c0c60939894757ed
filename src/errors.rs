use thiserror::Error;

#[derive(Debug, Error)]
pub enum SolarTiltError {
    #[error("Request was considered invalid due to error: {0}")]
    InvalidRequest(#[from] anyhow::Error),
    #[error("Project input failed validation: {0}")]
    InvalidInput(#[from] InvalidInputError),
    #[error("Error identified during solar yield calculation: {0}")]
    FailureInCalculation(#[from] SolarTiltCoreError),
    #[error("Error while writing results: {0}")]
    ErrorInOutput(OutputError),
}

#[derive(Debug, Error)]
#[error(transparent)]
pub struct SolarTiltCoreError {
    error: anyhow::Error,
}

impl SolarTiltCoreError {
    pub(crate) fn new(error: anyhow::Error) -> Self {
        Self { error }
    }
}

#[derive(Debug, Error)]
#[error(transparent)]
pub struct OutputError {
    error: anyhow::Error,
}

impl OutputError {
    pub fn new(error: anyhow::Error) -> Self {
        Self { error }
    }
}

/// Problems with caller-supplied values that are caught before any calculation runs.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum InvalidInputError {
    #[error("Latitude {0} is outside the range -90 to 90 degrees")]
    LatitudeOutOfRange(f64),
    #[error("Tilt sweep from {start} to {end} in steps of {step} is not valid; angles must be within 0 to 90 degrees, start must not exceed end and the step must be positive")]
    InvalidTiltSweep { start: f64, end: f64, step: f64 },
    #[error("Day range {start} to {end} is not valid; days must be within 1 to 366 and start must not exceed end")]
    InvalidDayRange { start: u32, end: u32 },
    #[error("Hour angle sweep from {start} to {end} in steps of {step} is not valid")]
    InvalidHourAngleSweep { start: f64, end: f64, step: f64 },
    #[error("Month {month} and day {day} do not make a valid date")]
    InvalidDate { month: u32, day: u32 },
}
