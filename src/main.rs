use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;

use satpass::config::{Config, ConfigError};
use satpass::predict::{classify_passes, predict_passes, CircularSun, Location, SatelliteInfo, TimeWindow};
use satpass::report;
use satpass::tle::{TleError, TleFetcher, TleSource};

#[derive(Parser)]
#[command(name = "satpass")]
#[command(about = "Predict satellite passes over a ground observer")]
struct Cli {
    /// Satellite names or NORAD IDs
    #[arg(long, num_args = 1.., required = true)]
    satellites: Vec<String>,
    /// TLE source (default: predict.default_source, then amsat)
    #[arg(long, value_enum)]
    source: Option<TleSource>,
    /// Directory of .tle/.txt files for --source file
    #[arg(long)]
    tle_dir: Option<PathBuf>,
    /// Observer latitude in degrees
    #[arg(long, allow_negative_numbers = true)]
    lat: Option<f64>,
    /// Observer longitude in degrees
    #[arg(long, allow_negative_numbers = true)]
    lon: Option<f64>,
    /// Observer elevation in meters
    #[arg(long, allow_negative_numbers = true)]
    elevation: Option<f64>,
    /// Start time, RFC 3339 or "YYYY-MM-DD HH:MM:SS" UTC (default: now)
    #[arg(long)]
    start: Option<String>,
    /// Window length, e.g. "90m", "1h", "2days"
    #[arg(long, default_value = "1h")]
    duration: String,
    /// Minimum elevation in degrees for a pass to count
    #[arg(long = "min-elevation", allow_negative_numbers = true)]
    min_elevation: Option<f64>,
    /// Path to satpass.yaml
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("Error fetching TLEs: {0}")]
    Tle(#[from] TleError),
    #[error("Invalid datetime format: {0}")]
    Time(String),
    #[error("Invalid duration: {0}")]
    Duration(String),
    #[error("Error creating observer location: {0}")]
    Location(String),
    #[error("No TLE data found for specified satellites.")]
    NoTles,
    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = Config::discover(cli.config.as_deref())?;

    let window = observation_window(cli.start.as_deref(), &cli.duration)?;
    let location = observer_location(&cli, &config)?;
    let min_elevation = cli.min_elevation.unwrap_or(config.predict.min_elevation_deg);
    let source = cli.source.unwrap_or(config.predict.default_source);

    let fetcher = TleFetcher::new(
        config.spacetrack.clone(),
        cli.tle_dir.clone().or_else(|| config.predict.tle_folder.clone()),
    )?;
    let tles = fetcher.fetch(source, &cli.satellites)?;
    if tles.is_empty() {
        return Err(CliError::NoTles);
    }
    log::info!("Found TLEs for {} satellite(s)", tles.len());

    let mut all_passes = Vec::new();
    for selected in &tles {
        let record = &selected.record;
        let satellite = SatelliteInfo::new(
            record.display_name(),
            record.norad_id().unwrap_or_else(|| selected.query.clone()),
        );
        let propagator = match record.propagator() {
            Ok(p) => p,
            Err(e) => {
                log::warn!("Error computing passes for {}: {}", selected.query, e);
                continue;
            }
        };

        log::info!("Computing passes for {} ({})", satellite.name, satellite.norad_id);
        let mut passes = predict_passes(&propagator, &satellite, &location, &window, min_elevation);
        classify_passes(&mut passes, &propagator, &CircularSun);
        all_passes.extend(passes);
    }

    report::sort_by_peak_desc(&mut all_passes);
    match cli.format {
        OutputFormat::Table => println!("{}", report::format_table(&all_passes)),
        OutputFormat::Json => println!("{}", report::format_json(&all_passes)?),
    }
    Ok(())
}

fn observer_location(cli: &Cli, config: &Config) -> Result<Location, CliError> {
    let configured = config.station.as_ref().and_then(|s| s.location());
    let (lat, lon) = match (cli.lat, cli.lon, configured) {
        (Some(lat), Some(lon), _) => (lat, lon),
        (None, None, Some(station)) => (station.latitude_deg, station.longitude_deg),
        _ => {
            return Err(CliError::Location(
                "--lat and --lon are required unless station.coordinates is configured".into(),
            ))
        }
    };
    let altitude = cli
        .elevation
        .or(configured.map(|s| s.altitude_m))
        .unwrap_or(0.0);
    Location::new(lat, lon, altitude).map_err(|e| CliError::Location(e.to_string()))
}

fn observation_window(start: Option<&str>, duration: &str) -> Result<TimeWindow, CliError> {
    let start = match start {
        Some(s) => parse_datetime(s)?,
        None => Utc::now(),
    };
    TimeWindow::starting_at(start, parse_duration(duration)?)
        .ok_or_else(|| CliError::Duration(format!("{} from {} is out of range", duration, start)))
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, CliError> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| CliError::Time(s.to_string()))
}

fn parse_duration(s: &str) -> Result<Duration, CliError> {
    humantime::parse_duration(s.trim())
        .map_err(|e| e.to_string())
        .and_then(|d| Duration::from_std(d).map_err(|e| e.to_string()))
        .map_err(CliError::Duration)
}
