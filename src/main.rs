mod config;
mod executor;
mod predict;
mod scheduler;

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::config::{Config, ConfigError};
use crate::executor::{AtQueue, DeferredJob, DryRun};
use crate::predict::{look_angles, ElementsSource, PassWindow, Sgp4Propagator, TleLoader};
use crate::scheduler::{PassScheduler, ScheduleError};

#[derive(Parser)]
#[command(name = "pass-o-mat")]
#[command(about = "Run a command on the next pass of a satellite")]
struct Cli {
    /// YAML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Target {
    /// TLE file to read the satellite from
    #[arg(short = 'i', long = "tle")]
    tle: Option<PathBuf>,
    /// Satellite name, exactly as in the TLE file
    #[arg(short, long)]
    satellite: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Schedule a command to run at the start of the next pass
    Schedule {
        #[command(flatten)]
        target: Target,
        /// Command to run on the pass
        #[arg(short, long)]
        pass_script: Option<String>,
        /// Log the job instead of queueing it with at
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the next pass without scheduling anything
    Next {
        #[command(flatten)]
        target: Target,
        #[arg(long)]
        json: bool,
    },
    /// List the satellites in a TLE file
    Satellites {
        #[arg(short = 'i', long = "tle")]
        tle: Option<PathBuf>,
    },
}

#[derive(Serialize)]
struct NextPassReport<'a> {
    #[serde(flatten)]
    pass: &'a PassWindow,
    aos_azimuth_deg: Option<f64>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let config = match cli.config.as_deref().map(Config::from_file) {
        None => Config::default(),
        Some(Ok(c)) => c,
        Some(Err(e)) => {
            eprintln!("Config error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Schedule {
            target,
            pass_script,
            dry_run,
        } => {
            let action = pass_script.unwrap_or_else(|| config.defaults.pass_script.clone());
            if dry_run {
                schedule(&config, target, &action, DryRun)
            } else {
                match AtQueue::from_command_line(&config.at_command) {
                    Some(queue) => schedule(&config, target, &action, queue),
                    None => {
                        eprintln!("Config error: {}", ConfigError::EmptyAtCommand);
                        ExitCode::FAILURE
                    }
                }
            }
        }
        Commands::Next { target, json } => next(&config, target, json),
        Commands::Satellites { tle } => satellites(&config, tle),
    }
}

fn build_scheduler<J: DeferredJob>(
    config: &Config,
    jobs: J,
) -> Result<PassScheduler<Sgp4Propagator, J>, ConfigError> {
    Ok(PassScheduler::new(
        config.ground_station()?,
        config.horizon_minutes()?,
        Sgp4Propagator,
        jobs,
    ))
}

fn load_tle(path: &Path) -> Option<TleLoader> {
    match TleLoader::from_file(path) {
        Ok(loader) => Some(loader),
        Err(e) => {
            eprintln!("Error reading {}: {}", path.display(), e);
            None
        }
    }
}

fn exit_code(err: &ScheduleError) -> ExitCode {
    match err {
        ScheduleError::NoPassFound(_) => ExitCode::from(2),
        ScheduleError::SatelliteNotFound(_) => ExitCode::from(3),
        ScheduleError::Predict(_) | ScheduleError::Job(_) => ExitCode::FAILURE,
    }
}

fn schedule<J: DeferredJob>(config: &Config, target: Target, action: &str, jobs: J) -> ExitCode {
    let tle_file = target.tle.unwrap_or_else(|| config.defaults.tle_file.clone());
    let satellite = target
        .satellite
        .unwrap_or_else(|| config.defaults.satellite.clone());

    println!("Scheduling the next pass from TLE: {}", tle_file.display());
    let Some(loader) = load_tle(&tle_file) else {
        return ExitCode::FAILURE;
    };

    let scheduler = match build_scheduler(config, jobs) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Config error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match scheduler.schedule(&satellite, &loader, action, Utc::now()) {
        Ok(scheduled) => {
            println!("Scheduling success");
            println!(
                "  {} over {} at {} (in {} minutes)",
                satellite,
                config.station_name(),
                scheduled.pass.aos,
                scheduled.wait_minutes
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error, {}", e);
            exit_code(&e)
        }
    }
}

fn next(config: &Config, target: Target, json: bool) -> ExitCode {
    let tle_file = target.tle.unwrap_or_else(|| config.defaults.tle_file.clone());
    let satellite = target
        .satellite
        .unwrap_or_else(|| config.defaults.satellite.clone());

    let Some(loader) = load_tle(&tle_file) else {
        return ExitCode::FAILURE;
    };
    let scheduler = match build_scheduler(config, DryRun) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Config error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let pass = match scheduler.find_next_pass(&satellite, &loader, Utc::now()) {
        Ok(pass) => pass,
        Err(e) => {
            eprintln!("Error, {}", e);
            return exit_code(&e);
        }
    };

    let aos_azimuth_deg = loader.lookup(&satellite).and_then(|entry| {
        match look_angles(scheduler.station(), entry, pass.aos) {
            Ok(angles) => Some(angles.azimuth_deg),
            Err(e) => {
                log::warn!("Could not compute AOS azimuth: {}", e);
                None
            }
        }
    });

    if json {
        let report = NextPassReport {
            pass: &pass,
            aos_azimuth_deg,
        };
        match serde_json::to_string_pretty(&report) {
            Ok(s) => println!("{}", s),
            Err(e) => {
                eprintln!("Error encoding pass: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        println!("Next pass of {} over {}:", satellite, config.station_name());
        match aos_azimuth_deg {
            Some(az) => println!("  AOS  {}  azimuth {:.1} deg", pass.aos, az),
            None => println!("  AOS  {}", pass.aos),
        }
        println!("  LOS  {}", pass.los);
        println!(
            "  max elevation {:.1} deg, {} minutes",
            pass.max_elevation_deg, pass.duration_minutes
        );
    }
    ExitCode::SUCCESS
}

fn satellites(config: &Config, tle: Option<PathBuf>) -> ExitCode {
    let tle_file = tle.unwrap_or_else(|| config.defaults.tle_file.clone());
    let Some(loader) = load_tle(&tle_file) else {
        return ExitCode::FAILURE;
    };

    println!("{} satellites in {}", loader.names().len(), loader.source());
    for name in loader.names() {
        match loader.lookup(name) {
            Some(entry) => println!("  {:<24} NORAD {}", name, entry.norad_id),
            None => println!("  {}", name),
        }
    }
    ExitCode::SUCCESS
}
