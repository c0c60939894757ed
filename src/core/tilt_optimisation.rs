use crate::core::units::{kwh_from_wh, Season};
use crate::input::SeasonalTilts;
use crate::solar_physics::daily_energy;
use itertools::iproduct;
use rayon::prelude::*;
use serde::Serialize;
use std::fmt::{Display, Formatter};
use tracing::{debug, instrument};

/// Daily direct energy, in Wh/m², for every combination of day and panel tilt at one site.
#[derive(Clone, Debug)]
pub struct YieldMatrix {
    days: Vec<u32>,
    tilts: Vec<f64>,
    latitude: f64,
    panel_azimuth: f64,
    // day-major: the energies for all tilts on the first day, then the second day, ...
    energies: Vec<f64>,
}

impl YieldMatrix {
    /// Evaluate the daily energy for each (day, tilt) pair. Pairs are independent so they are
    /// spread across the rayon thread pool; the ordering of the results does not depend on
    /// scheduling.
    #[instrument(skip(days, tilts), fields(day_count = days.len(), tilt_count = tilts.len()))]
    pub fn compute(latitude: f64, days: &[u32], tilts: &[f64], panel_azimuth: f64) -> Self {
        let energies = iproduct!(days.iter().copied(), tilts.iter().copied())
            .collect::<Vec<_>>()
            .into_par_iter()
            .map(|(day, tilt)| daily_energy(latitude, day as i32, tilt, panel_azimuth))
            .collect::<Vec<_>>();

        debug!("Calculated {} daily yields", energies.len());

        Self {
            days: days.to_vec(),
            tilts: tilts.to_vec(),
            latitude,
            panel_azimuth,
            energies,
        }
    }

    pub fn days(&self) -> &[u32] {
        &self.days
    }

    pub fn tilts(&self) -> &[f64] {
        &self.tilts
    }

    /// Energies for every tilt on the day at `day_idx`, in Wh/m².
    pub fn row(&self, day_idx: usize) -> &[f64] {
        let width = self.tilts.len();
        &self.energies[day_idx * width..(day_idx + 1) * width]
    }

    pub fn daily(&self, day_idx: usize, tilt_idx: usize) -> f64 {
        self.row(day_idx)[tilt_idx]
    }

    /// Daily energy on the day at `day_idx` for an arbitrary tilt, taken from the matrix when the
    /// tilt is part of the sweep.
    pub fn energy_for_tilt(&self, day_idx: usize, tilt: f64) -> f64 {
        match self
            .tilts
            .iter()
            .position(|&candidate| (candidate - tilt).abs() < 1e-9)
        {
            Some(tilt_idx) => self.daily(day_idx, tilt_idx),
            None => daily_energy(
                self.latitude,
                self.days[day_idx] as i32,
                tilt,
                self.panel_azimuth,
            ),
        }
    }

    /// Total over all days for each tilt, in kWh/m².
    pub fn annual_totals_kwh(&self) -> Vec<f64> {
        (0..self.tilts.len())
            .map(|tilt_idx| {
                kwh_from_wh(
                    (0..self.days.len())
                        .map(|day_idx| self.daily(day_idx, tilt_idx))
                        .sum::<f64>(),
                )
            })
            .collect()
    }

    /// The tilt giving the highest total over all days.
    pub fn best_fixed_tilt(&self) -> Option<TiltYield> {
        let annual_totals = self.annual_totals_kwh();

        index_of_max(&annual_totals).map(|tilt_idx| TiltYield {
            tilt: self.tilts[tilt_idx],
            energy_kwh: annual_totals[tilt_idx],
        })
    }

    /// For each day, the tilt in the sweep that collects the most energy.
    pub fn best_daily_tilts(&self) -> Vec<DailyBestTilt> {
        if self.tilts.is_empty() {
            return vec![];
        }

        self.days
            .iter()
            .enumerate()
            .filter_map(|(day_idx, &day)| {
                let row = self.row(day_idx);
                index_of_max(row).map(|tilt_idx| DailyBestTilt {
                    day,
                    tilt: self.tilts[tilt_idx],
                    energy_wh: row[tilt_idx],
                })
            })
            .collect()
    }
}

// first index wins on ties
fn index_of_max(values: &[f64]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (idx, &value)| match best {
            Some((_, best_value)) if value <= best_value => best,
            _ => Some((idx, value)),
        })
        .map(|(idx, _)| idx)
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TiltYield {
    pub tilt: f64,
    pub energy_kwh: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct DailyBestTilt {
    pub day: u32,
    pub tilt: f64,
    pub energy_wh: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// One tilt all year, the best annual tilt from the sweep.
    Fixed,
    /// Adjusted at the start of each season.
    FourSeasons,
    /// The best tilt from the sweep, every day.
    DailyTracking,
}

impl Display for Strategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Strategy::Fixed => "Fixed optimal angle",
                Strategy::FourSeasons => "Adjusted 4 times/year",
                Strategy::DailyTracking => "Daily perfect tracking",
            }
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct StrategyResult {
    pub strategy: Strategy,
    pub energy_kwh: f64,
    /// Yield relative to the fixed strategy; `None` when the fixed strategy collects nothing.
    pub percentage_of_fixed: Option<f64>,
}

/// Compare a fixed panel at the best annual tilt against seasonal adjustment and daily
/// tracking. Returns `None` if the matrix has no tilts to choose from.
pub fn compare_strategies(
    matrix: &YieldMatrix,
    seasonal_tilts: &SeasonalTilts,
) -> Option<Vec<StrategyResult>> {
    let fixed = matrix.best_fixed_tilt()?;

    let four_seasons = kwh_from_wh(
        matrix
            .days()
            .iter()
            .enumerate()
            .map(|(day_idx, &day)| {
                let tilt = seasonal_tilts.tilt_for(Season::for_day_of_year(day));
                matrix.energy_for_tilt(day_idx, tilt)
            })
            .sum(),
    );

    let daily_tracking = kwh_from_wh(
        matrix
            .best_daily_tilts()
            .iter()
            .map(|best| best.energy_wh)
            .sum(),
    );

    let percentage_of_fixed = |energy_kwh: f64| {
        (fixed.energy_kwh > 0.).then(|| energy_kwh / fixed.energy_kwh * 100.)
    };

    Some(
        [
            (Strategy::Fixed, fixed.energy_kwh),
            (Strategy::FourSeasons, four_seasons),
            (Strategy::DailyTracking, daily_tracking),
        ]
        .into_iter()
        .map(|(strategy, energy_kwh)| StrategyResult {
            strategy,
            energy_kwh,
            percentage_of_fixed: percentage_of_fixed(energy_kwh),
        })
        .collect(),
    )
}
