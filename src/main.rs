use clap::Parser;
use solar_tilt::output_writer::FileOutputWriter;
use solar_tilt::{run_project, ProjectFlags};
use std::ffi::OsStr;
use std::fs;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Parser, Default, Debug)]
#[clap(author, version, about, long_about = None)]
struct SolarTiltArgs {
    input_file: String,
    #[arg(
        long,
        short,
        help = "Directory to write results to (defaults to <input>__results)"
    )]
    output_dir: Option<String>,
    #[arg(
        long,
        help = "Latitude of the site in degrees, overriding the input file"
    )]
    latitude: Option<f64>,
    #[clap(long, default_value_t = false, help = "Skip the sun path reports")]
    no_sun_path: bool,
    #[clap(
        long,
        default_value_t = false,
        help = "Skip the tilt optimisation reports"
    )]
    no_optimisation: bool,
    #[clap(
        long,
        default_value_t = false,
        help = "Skip the adjustment strategy comparison"
    )]
    no_strategies: bool,
    #[clap(long, short, default_value_t = false, help = "Log at debug level")]
    verbose: bool,
    #[clap(long, default_value_t = false, help = "Whether to log out spans")]
    log_spans: bool,
}

fn main() -> anyhow::Result<()> {
    let args = SolarTiltArgs::parse();

    // set up basic tracing
    let tracing_subscriber = {
        let max_level = if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        };
        let mut builder = tracing_subscriber::fmt::fmt().with_max_level(max_level);

        if args.log_spans {
            builder = builder.with_span_events(FmtSpan::CLOSE);
        }

        builder.finish()
    };
    tracing::subscriber::set_global_default(tracing_subscriber)?;

    let input_file = Path::new(args.input_file.as_str());
    let input_file_name = input_file
        .file_stem()
        .and_then(OsStr::to_str)
        .unwrap_or("solar_tilt");

    let output_path = match args.output_dir {
        Some(ref output_dir) => PathBuf::from(output_dir),
        None => input_file.with_file_name(format!("{input_file_name}__results")),
    };
    fs::create_dir_all(&output_path)?;
    debug!("Writing results to {}", output_path.display());

    let file_output =
        FileOutputWriter::new(output_path, format!("{input_file_name}__{{}}.{{}}"));

    let project_flags = (&args).into();

    let results = run_project(
        BufReader::new(File::open(input_file)?),
        file_output,
        args.latitude,
        &project_flags,
    )?;

    if let Some(best) = results.best_fixed_tilt {
        info!(
            "Best fixed tilt at latitude {}: {} degrees ({:.1} kWh/m2 per period)",
            results.latitude, best.tilt, best.energy_kwh
        );
    }

    debug!("JSON response: {}", serde_json::to_string_pretty(&results)?);

    Ok(())
}

impl From<&SolarTiltArgs> for ProjectFlags {
    fn from(args: &SolarTiltArgs) -> Self {
        let mut flags = ProjectFlags::empty();
        if !args.no_sun_path {
            flags.insert(ProjectFlags::SUN_PATH);
        }
        if !args.no_optimisation {
            flags.insert(ProjectFlags::TILT_OPTIMISATION);
        }
        if !args.no_strategies {
            flags.insert(ProjectFlags::STRATEGIES);
        }

        flags
    }
}
