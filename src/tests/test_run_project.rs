mod test_run_project {
    use crate::core::tilt_optimisation::Strategy;
    use crate::errors::{InvalidInputError, SolarTiltError};
    use crate::output_writer::{FileOutputWriter, OutputWriter, SinkOutputWriter};
    use crate::{run_project, ProjectFlags, ProjectResults};
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use serde_json::{json, Value};
    use std::fs;
    use std::io::{self, Write};
    use std::path::PathBuf;

    #[fixture]
    fn input() -> Value {
        json!({
            "Site": { "Name": "Shenzhen", "Latitude": 22.5 },
            "TiltSweep": { "start": 0., "end": 45., "step": 22.5 },
            "Days": { "start": 1, "end": 365 },
        })
    }

    fn run(
        input: &Value,
        latitude: Option<f64>,
        flags: ProjectFlags,
    ) -> Result<ProjectResults, SolarTiltError> {
        run_project(input.to_string().as_bytes(), SinkOutputWriter, latitude, &flags)
    }

    /// Accepts every write but fails to flush, as a full disk would.
    #[derive(Debug)]
    struct UnflushableOutput;

    struct UnflushableWriter;

    impl Write for UnflushableWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::Other, "no space left on device"))
        }
    }

    impl OutputWriter for UnflushableOutput {
        fn writer_for_location_key(&self, _: &str, _: &str) -> anyhow::Result<impl Write> {
            Ok(UnflushableWriter)
        }
    }

    #[rstest]
    fn should_produce_all_results_with_all_flags(input: Value) {
        let results = run(&input, None, ProjectFlags::all()).unwrap();

        assert_eq!(results.site_name.as_deref(), Some("Shenzhen"));
        assert_eq!(results.panel_azimuth, 0.);

        let highest = results.highest_noon_elevation.unwrap();
        let lowest = results.lowest_noon_elevation.unwrap();
        assert!(highest.angle > 89.9);
        assert_eq!(lowest.day, 355);

        let best = results.best_fixed_tilt.unwrap();
        assert_eq!(best.tilt, 22.5);

        let strategies = results.strategies.unwrap();
        assert_eq!(strategies.len(), 3);
        assert_eq!(strategies[0].strategy, Strategy::Fixed);
        assert_relative_eq!(strategies[0].energy_kwh, best.energy_kwh);
    }

    #[rstest]
    fn should_skip_groups_not_flagged(input: Value) {
        let results = run(&input, None, ProjectFlags::empty()).unwrap();

        assert_eq!(results.highest_noon_elevation, None);
        assert_eq!(results.best_fixed_tilt, None);
        assert_eq!(results.strategies, None);

        let results = run(&input, None, ProjectFlags::TILT_OPTIMISATION).unwrap();

        assert!(results.best_fixed_tilt.is_some());
        assert_eq!(results.strategies, None);
        assert_eq!(results.lowest_noon_elevation, None);
    }

    #[rstest]
    fn should_prefer_latitude_override(input: Value) {
        let results = run(&input, Some(-33.9), ProjectFlags::SUN_PATH).unwrap();

        assert_eq!(results.latitude, -33.9);
        // southern hemisphere: lowest noon sun around the June solstice
        assert_eq!(results.lowest_noon_elevation.unwrap().day, 172);
    }

    #[rstest]
    fn should_reject_out_of_range_latitude_override(input: Value) {
        assert!(matches!(
            run(&input, Some(120.), ProjectFlags::all()),
            Err(SolarTiltError::InvalidInput(
                InvalidInputError::LatitudeOutOfRange(_)
            ))
        ));
    }

    #[rstest]
    #[case(json!({ "Site": { "Latitude": 95. } }))]
    #[case(json!({ "Site": { "Latitude": 22.5 }, "Days": { "start": 200, "end": 100 } }))]
    #[case(json!({
        "Site": { "Latitude": 22.5 },
        "TiltSweep": { "start": 0., "end": 90., "step": 1e-300 }
    }))]
    fn should_report_invalid_values_in_input_as_invalid_input(#[case] input: Value) {
        assert!(matches!(
            run(&input, None, ProjectFlags::all()),
            Err(SolarTiltError::InvalidInput(_))
        ));
    }

    #[rstest]
    fn should_report_failure_to_flush_summary(input: Value) {
        assert!(matches!(
            run_project(
                input.to_string().as_bytes(),
                UnflushableOutput,
                None,
                &ProjectFlags::empty(),
            ),
            Err(SolarTiltError::ErrorInOutput(_))
        ));
    }

    #[test]
    fn should_reject_malformed_input() {
        assert!(matches!(
            run(&json!({ "Site": "Shenzhen" }), None, ProjectFlags::all()),
            Err(SolarTiltError::InvalidRequest(_))
        ));
    }

    #[rstest]
    fn should_write_reports_to_files(input: Value) {
        let output_path: PathBuf =
            std::env::temp_dir().join(format!("solar_tilt_run_project_{}", std::process::id()));
        fs::create_dir_all(&output_path).unwrap();
        let output = FileOutputWriter::new(output_path.clone(), "shenzhen__{}.{}".to_string());

        run_project(
            input.to_string().as_bytes(),
            output,
            None,
            &ProjectFlags::all(),
        )
        .unwrap();

        for report in [
            "declination.csv",
            "noon_elevation.csv",
            "sun_path.csv",
            "tilt_matrix.csv",
            "annual_by_tilt.csv",
            "best_daily_tilt.csv",
            "strategies.csv",
            "summary.json",
        ] {
            assert!(
                output_path.join(format!("shenzhen__{report}")).exists(),
                "missing {report}"
            );
        }

        let tilt_matrix =
            fs::read_to_string(output_path.join("shenzhen__tilt_matrix.csv")).unwrap();
        let mut lines = tilt_matrix.lines();
        assert_eq!(lines.next(), Some("Day,Tilt 0,Tilt 22.5,Tilt 45"));
        assert_eq!(lines.next(), Some("[count],[Wh/m2],[Wh/m2],[Wh/m2]"));
        // a row per day after the headings and units
        assert_eq!(tilt_matrix.lines().count(), 365 + 2);

        let summary: Value = serde_json::from_str(
            &fs::read_to_string(output_path.join("shenzhen__summary.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(summary["best_fixed_tilt"]["tilt"], json!(22.5));
        assert_eq!(summary["strategies"][0]["strategy"], json!("fixed"));

        fs::remove_dir_all(output_path).unwrap();
    }
}
