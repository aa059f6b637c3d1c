//! Route command - plan a route and check it against the hazard list.

use console::style;
use travelsafe::alert::is_in_range;
use travelsafe::coord;
use travelsafe::hazard::Hazard;
use travelsafe::services::{RoutePath, RouteSource};
use travelsafe::storage;

use super::common::{open_store, parse_coordinate};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Run the route command.
pub fn run(from: &str, to: &str, verbose: bool) -> Result<(), CliError> {
    let runner = CliRunner::new(verbose, false)?;
    runner.log_startup("route");
    let config = runner.config();

    let start = parse_coordinate(from)?;
    let end = parse_coordinate(to)?;

    let (_, router) = config.services_config().build()?;
    let path = router.route_or_straight(start, end);

    match path.source {
        RouteSource::Road => println!("Road route: {} points", path.points.len()),
        RouteSource::StraightLine => println!(
            "{}",
            style("Road routing unavailable, showing straight line").yellow()
        ),
    }
    println!("Length: {:.2} km", path.length_m() / 1000.0);

    let hazards = storage::load_hazards(&open_store(config)?)?;
    let radius_m = config.alerts.radius_m;
    let on_route = hazards_near_route(&path, &hazards, radius_m);

    if on_route.is_empty() {
        println!("{}", style("No hazards along this route.").green());
    } else {
        println!();
        println!("{}", style("Hazards along this route:").red().bold());
        for (hazard, distance_m) in on_route {
            println!(
                "  {} ({:.0} m from route)",
                style(&hazard.name).bold(),
                distance_m
            );
        }
    }
    Ok(())
}

/// Hazards whose closest route point is within the alert radius, with that
/// distance.
fn hazards_near_route<'a>(
    path: &RoutePath,
    hazards: &'a [Hazard],
    radius_m: f64,
) -> Vec<(&'a Hazard, f64)> {
    hazards
        .iter()
        .filter_map(|hazard| {
            let closest = path
                .points
                .iter()
                .map(|p| coord::distance(*p, hazard.position))
                .fold(f64::INFINITY, f64::min);
            is_in_range(closest, radius_m).then_some((hazard, closest))
        })
        .collect()
}
