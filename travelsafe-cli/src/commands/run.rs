//! Run command - live navigation session with proximity warnings.
//!
//! Starts a [`Session`] on a tokio runtime and prints status changes until
//! Ctrl+C.

use std::path::PathBuf;
use std::sync::Arc;

use console::style;
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;
use travelsafe::app::{AppConfig, Session, SessionStatus};
use travelsafe::position::{FixedLocation, LocationProvider, NoLocation, ReplayLocation};

use super::common::{open_store, parse_coordinate, select_sink};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the run command.
#[derive(Debug)]
pub struct RunArgs {
    pub verbose: bool,
    /// Fixed `lat,lng` position.
    pub at: Option<String>,
    /// JSON track file to replay.
    pub replay: Option<PathBuf>,
    pub no_speech: bool,
    /// Alert radius override in meters.
    pub radius: Option<f64>,
}

/// Run the navigation session.
pub fn run(args: RunArgs) -> Result<(), CliError> {
    let runner = CliRunner::new(args.verbose, true)?;
    runner.log_startup("run");
    let config = runner.config();

    let provider = select_provider(&args)?;
    let sink = select_sink(config, args.no_speech);
    let store = Arc::new(open_store(config)?);

    let app_config = with_radius_override(AppConfig::from_config_file(config), args.radius)?;

    println!("TravelSafe v{}", travelsafe::VERSION);
    println!(
        "Alert radius: {:.0} m, provider: {}, speech: {}",
        app_config.alerts.radius_m,
        provider.name(),
        sink.name()
    );
    println!("Press Ctrl+C to stop.");
    println!();

    let runtime = Runtime::new().map_err(|e| CliError::Runtime(e.to_string()))?;
    let (session, handle) = Session::new(app_config, store, provider, sink)?;

    let shutdown: CancellationToken = handle.shutdown_token();
    ctrlc::set_handler(move || {
        println!();
        println!("Received shutdown signal, stopping...");
        shutdown.cancel();
    })
    .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))?;

    let snapshot = runtime.block_on(async move {
        let mut status = handle.subscribe();
        let task = tokio::spawn(session.run());

        let mut shown = status.borrow_and_update().clone();
        print_status(None, &shown);

        // Ends once the session drops its status sender
        while status.changed().await.is_ok() {
            let current = status.borrow_and_update().clone();
            print_status(Some(&shown), &current);
            shown = current;
        }

        task.await
            .map_err(|e| CliError::Runtime(format!("Session task failed: {}", e)))
    })?;

    println!();
    println!("{}", style("Session summary").bold());
    println!("{}", snapshot);
    Ok(())
}

/// Apply `--radius`, rejecting values that are not a positive distance.
fn with_radius_override(
    app_config: AppConfig,
    radius: Option<f64>,
) -> Result<AppConfig, CliError> {
    let Some(radius_m) = radius else {
        return Ok(app_config);
    };
    if !(radius_m.is_finite() && radius_m > 0.0) {
        return Err(CliError::Config(format!(
            "Radius must be a positive number of meters, got {}",
            radius_m
        )));
    }
    let alerts = app_config.alerts.clone().with_radius_m(radius_m);
    Ok(app_config.with_alerts(alerts))
}

fn select_provider(args: &RunArgs) -> Result<Arc<dyn LocationProvider>, CliError> {
    if let Some(at) = &args.at {
        return Ok(Arc::new(FixedLocation::new(parse_coordinate(at)?)));
    }
    if let Some(path) = &args.replay {
        return Ok(Arc::new(ReplayLocation::from_file(path)?));
    }

    println!(
        "{}",
        style("No location source given (--at or --replay); waiting without a fix.").yellow()
    );
    Ok(Arc::new(NoLocation))
}

/// Print the parts of `current` that differ from what was last shown.
fn print_status(previous: Option<&SessionStatus>, current: &SessionStatus) {
    if previous.map(SessionStatus::gps_line) != Some(current.gps_line()) {
        println!("{}", style(current.gps_line()).dim());
    }

    let previous_banner = previous.and_then(SessionStatus::banner);
    match (previous_banner, current.banner()) {
        (old, Some(banner)) if old.as_deref() != Some(banner.as_str()) => {
            println!("{}", style(banner).red().bold());
        }
        (Some(_), None) => println!("{}", style("All clear").green()),
        _ => {}
    }

    if let Some(err) = &current.storage_error {
        if previous.and_then(|p| p.storage_error.as_ref()) != Some(err) {
            println!("{} {}", style("Storage error:").red(), err);
        }
    }
}
