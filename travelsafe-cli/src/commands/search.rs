//! Search command - look up places by name.

use console::style;
use travelsafe::services::{Place, MIN_QUERY_LEN};

use crate::error::CliError;
use crate::runner::CliRunner;

/// Run the search command.
pub fn run(query: &str, verbose: bool) -> Result<(), CliError> {
    let runner = CliRunner::new(verbose, false)?;
    runner.log_startup("search");

    if query.trim().chars().count() < MIN_QUERY_LEN {
        return Err(CliError::Config(format!(
            "Search query must be at least {} characters",
            MIN_QUERY_LEN
        )));
    }

    let (geocoder, _) = runner.config().services_config().build()?;
    let places = geocoder.search_locations(query);
    print_places(query, &places);
    Ok(())
}

fn print_places(query: &str, places: &[Place]) {
    if places.is_empty() {
        println!("No places found for '{}'.", query);
        return;
    }

    for (i, place) in places.iter().enumerate() {
        println!("{}. {}", i + 1, style(&place.name).bold());
        println!("   {}  (id {})", place.coordinate, place.id);
    }
    println!();
    println!(
        "Add one as a hazard with: travelsafe hazards add <NAME> {} {}",
        places[0].coordinate.latitude, places[0].coordinate.longitude
    );
}
