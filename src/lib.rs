pub mod core;
pub mod errors;
pub mod input;
pub mod output_writer;
pub mod solar_physics;
#[cfg(test)]
mod tests;

use crate::core::sun_path::{
    declination_series, extremes, noon_elevations, sun_path, DayAngle, SunPathSample,
};
use crate::core::tilt_optimisation::{
    compare_strategies, DailyBestTilt, StrategyResult, TiltYield, YieldMatrix,
};
use crate::errors::{InvalidInputError, OutputError, SolarTiltCoreError, SolarTiltError};
use crate::input::{ingest_for_processing, Input};
use crate::output_writer::OutputWriter;
use anyhow::anyhow;
use bitflags::bitflags;
use csv::WriterBuilder;
use indexmap::IndexMap;
use serde::Serialize;
use std::io::{Read, Write};
use tracing::{info, instrument};

bitflags! {
    /// Which groups of reports a project run produces.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct ProjectFlags: u32 {
        const SUN_PATH = 0b1;
        const TILT_OPTIMISATION = 0b10;
        const STRATEGIES = 0b100;
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProjectResults {
    pub site_name: Option<String>,
    pub latitude: f64,
    pub panel_azimuth: f64,
    pub highest_noon_elevation: Option<DayAngle>,
    pub lowest_noon_elevation: Option<DayAngle>,
    pub best_fixed_tilt: Option<TiltYield>,
    pub strategies: Option<Vec<StrategyResult>>,
}

/// Run a project described by the JSON `input`, writing the reports selected by `flags` to
/// `output`. A `latitude` given here takes precedence over the one in the input.
#[instrument(skip_all)]
pub fn run_project(
    input: impl Read,
    output: impl OutputWriter,
    latitude: Option<f64>,
    flags: &ProjectFlags,
) -> Result<ProjectResults, SolarTiltError> {
    let mut input_for_processing =
        ingest_for_processing(input).map_err(|error| match error.downcast::<InvalidInputError>() {
            Ok(invalid_input) => SolarTiltError::InvalidInput(invalid_input),
            Err(error) => SolarTiltError::InvalidRequest(error),
        })?;

    if let Some(latitude) = latitude {
        input_for_processing.set_latitude(latitude)?;
    }

    let input = input_for_processing.finalize();

    let results = calculate(&input, &output, flags)?;

    if !output.is_noop() {
        write_summary_file(&output, &results)
            .map_err(|error| SolarTiltError::ErrorInOutput(OutputError::new(error)))?;
    }

    Ok(results)
}

fn calculate(
    input: &Input,
    output: &impl OutputWriter,
    flags: &ProjectFlags,
) -> Result<ProjectResults, SolarTiltError> {
    let latitude = input.site.latitude;
    let panel_azimuth = input.panel_azimuth();
    let days = input.days.days().collect::<Vec<_>>();

    info!(
        "Calculating solar yield at latitude {latitude} for panels facing {} for days {} to {}",
        input.panel_orientation, input.days.start, input.days.end
    );

    let mut results = ProjectResults {
        site_name: input.site.name.clone(),
        latitude,
        panel_azimuth,
        highest_noon_elevation: None,
        lowest_noon_elevation: None,
        best_fixed_tilt: None,
        strategies: None,
    };

    let output_error =
        |error: anyhow::Error| SolarTiltError::ErrorInOutput(OutputError::new(error));

    if flags.contains(ProjectFlags::SUN_PATH) {
        let declinations = declination_series(days.iter().copied());
        let noon_elevations = noon_elevations(latitude, days.iter().copied());
        if let Some((lowest, highest)) = extremes(&noon_elevations) {
            info!(
                "Noon elevation ranges from {:.1} (day {}) to {:.1} (day {})",
                lowest.angle, lowest.day, highest.angle, highest.day
            );
            results.lowest_noon_elevation = Some(lowest);
            results.highest_noon_elevation = Some(highest);
        }

        let hour_angles = input.sun_path.hour_angles();
        let sun_paths = input
            .sun_path
            .key_days
            .iter()
            .map(|(label, &day)| (label.as_str(), (day, sun_path(latitude, day, &hour_angles))))
            .collect::<IndexMap<_, _>>();

        if !output.is_noop() {
            write_day_angle_file(output, "declination", "Declination", &declinations)
                .map_err(output_error)?;
            write_day_angle_file(output, "noon_elevation", "Noon elevation", &noon_elevations)
                .map_err(output_error)?;
            write_sun_path_file(output, &sun_paths).map_err(output_error)?;
        }
    }

    if flags.intersects(ProjectFlags::TILT_OPTIMISATION | ProjectFlags::STRATEGIES) {
        let tilts = input.tilt_sweep.angles();
        let matrix = YieldMatrix::compute(latitude, &days, &tilts, panel_azimuth);

        let best_fixed_tilt = matrix.best_fixed_tilt().ok_or_else(|| {
            SolarTiltCoreError::new(anyhow!("No tilt angles were available to optimise over"))
        })?;
        info!(
            "Optimal fixed tilt is {} degrees, collecting {:.1} kWh/m2",
            best_fixed_tilt.tilt, best_fixed_tilt.energy_kwh
        );
        results.best_fixed_tilt = Some(best_fixed_tilt);

        if flags.contains(ProjectFlags::TILT_OPTIMISATION) && !output.is_noop() {
            write_tilt_matrix_file(output, &matrix).map_err(output_error)?;
            write_annual_by_tilt_file(output, matrix.tilts(), &matrix.annual_totals_kwh())
                .map_err(output_error)?;
            write_best_daily_tilt_file(output, &matrix.best_daily_tilts())
                .map_err(output_error)?;
        }

        if flags.contains(ProjectFlags::STRATEGIES) {
            let strategies = compare_strategies(&matrix, &input.seasonal_tilts).ok_or_else(|| {
                SolarTiltCoreError::new(anyhow!("Could not compare tilt strategies"))
            })?;
            for result in &strategies {
                info!(
                    "{}: {:.2} kWh/m2 ({})",
                    result.strategy,
                    result.energy_kwh,
                    result
                        .percentage_of_fixed
                        .map_or("n/a".to_string(), |percentage| format!("{percentage:.1}%"))
                );
            }
            if !output.is_noop() {
                write_strategies_file(output, &strategies).map_err(output_error)?;
            }
            results.strategies = Some(strategies);
        }
    }

    Ok(results)
}

fn write_day_angle_file(
    output: &impl OutputWriter,
    location_key: &str,
    heading: &str,
    series: &[DayAngle],
) -> anyhow::Result<()> {
    let writer = output.writer_for_location_key(location_key, "csv")?;
    let mut writer = WriterBuilder::new().flexible(true).from_writer(writer);

    writer.write_record(["Day", heading])?;
    writer.write_record(["[count]", "[deg]"])?;
    for DayAngle { day, angle } in series {
        writer.write_record([day.to_string(), angle.to_string()])?;
    }

    writer.flush()?;
    Ok(())
}

fn write_sun_path_file(
    output: &impl OutputWriter,
    sun_paths: &IndexMap<&str, (u32, Vec<SunPathSample>)>,
) -> anyhow::Result<()> {
    let writer = output.writer_for_location_key("sun_path", "csv")?;
    let mut writer = WriterBuilder::new().flexible(true).from_writer(writer);

    writer.write_record([
        "Label",
        "Day",
        "Hour angle",
        "Elevation",
        "Azimuth",
        "Compass bearing",
        "Zenith distance",
    ])?;
    writer.write_record(["", "[count]", "[deg]", "[deg]", "[deg]", "[deg]", "[deg]"])?;

    for (label, (day, samples)) in sun_paths {
        for sample in samples {
            writer.write_record([
                label.to_string(),
                day.to_string(),
                sample.hour_angle.to_string(),
                sample.elevation.to_string(),
                sample.azimuth.to_string(),
                sample.compass_bearing().to_string(),
                sample.zenith_distance().to_string(),
            ])?;
        }
    }

    writer.flush()?;
    Ok(())
}

fn write_tilt_matrix_file(output: &impl OutputWriter, matrix: &YieldMatrix) -> anyhow::Result<()> {
    let writer = output.writer_for_location_key("tilt_matrix", "csv")?;
    let mut writer = WriterBuilder::new().flexible(true).from_writer(writer);

    let mut headings = vec!["Day".to_string()];
    headings.extend(matrix.tilts().iter().map(|tilt| format!("Tilt {tilt}")));
    let mut units_row = vec!["[count]"];
    units_row.extend(matrix.tilts().iter().map(|_| "[Wh/m2]"));

    writer.write_record(&headings)?;
    writer.write_record(&units_row)?;

    for (day_idx, day) in matrix.days().iter().enumerate() {
        let mut row = vec![day.to_string()];
        row.extend(matrix.row(day_idx).iter().map(|energy| energy.to_string()));
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

fn write_annual_by_tilt_file(
    output: &impl OutputWriter,
    tilts: &[f64],
    annual_totals: &[f64],
) -> anyhow::Result<()> {
    let writer = output.writer_for_location_key("annual_by_tilt", "csv")?;
    let mut writer = WriterBuilder::new().flexible(true).from_writer(writer);

    writer.write_record(["Tilt", "Annual total"])?;
    writer.write_record(["[deg]", "[kWh/m2]"])?;
    for (tilt, total) in tilts.iter().zip(annual_totals) {
        writer.write_record([tilt.to_string(), total.to_string()])?;
    }

    writer.flush()?;
    Ok(())
}

fn write_best_daily_tilt_file(
    output: &impl OutputWriter,
    best_tilts: &[DailyBestTilt],
) -> anyhow::Result<()> {
    let writer = output.writer_for_location_key("best_daily_tilt", "csv")?;
    let mut writer = WriterBuilder::new().flexible(true).from_writer(writer);

    writer.write_record(["Day", "Optimal tilt", "Daily total"])?;
    writer.write_record(["[count]", "[deg]", "[Wh/m2]"])?;
    for best in best_tilts {
        writer.write_record([
            best.day.to_string(),
            best.tilt.to_string(),
            best.energy_wh.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

fn write_strategies_file(
    output: &impl OutputWriter,
    strategies: &[StrategyResult],
) -> anyhow::Result<()> {
    let writer = output.writer_for_location_key("strategies", "csv")?;
    let mut writer = WriterBuilder::new().flexible(true).from_writer(writer);

    writer.write_record(["Strategy", "Annual total", "Relative to fixed"])?;
    writer.write_record(["", "[kWh/m2]", "[%]"])?;
    for result in strategies {
        writer.write_record([
            result.strategy.to_string(),
            result.energy_kwh.to_string(),
            result
                .percentage_of_fixed
                .map(|percentage| percentage.to_string())
                .unwrap_or_default(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

fn write_summary_file(output: &impl OutputWriter, results: &ProjectResults) -> anyhow::Result<()> {
    let mut writer = output.writer_for_location_key("summary", "json")?;
    serde_json::to_writer_pretty(&mut writer, results)?;

    writer.flush()?;
    Ok(())
}
