//!  Tripwindow Trip Finder
//!
//!  Copyright (C) 2026  Mamy Ratsimbazafy
//!
//!  This program is free software: you can redistribute it and/or modify
//!  it under the terms of the GNU Affero General Public License as published by
//!  the Free Software Foundation, either version 3 of the License, or
//!  (at your option) any later version.
//!
//!  This program is distributed in the hope that it will be useful,
//!  but WITHOUT ANY WARRANTY; without even the implied warranty of
//!  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//!  GNU Affero General Public License for more details.
//!
//!  You should have received a copy of the GNU Affero General Public License
//!  along with this program.  If not, see <http://www.gnu.org/licenses/>.


//! CLI for the cheapest round trip per destination.

use std::cmp::max;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use serde::Deserialize;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use tripwindow_trip_finder::{
    Airport, AirportDirectory, ApiClient, CachedFlightGateway, FlightApi, FlightGateway,
    FlightStore, LegSelection, TripCandidate, TripFinder, TripSearchConfig,
};

/// CLI arguments
#[derive(Parser, Debug)]
#[command(name = "tripwindow-trips")]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Origin airport code (e.g., CPH)
    #[arg(short, long, required_unless_present = "config")]
    from: Option<String>,

    /// Destination airport codes (comma-separated, e.g., "AGP,PMI,OLB")
    #[arg(short, long, value_delimiter = ',', required_unless_present = "config")]
    to: Vec<String>,

    /// First possible departure date (YYYY-MM-DD or YYYY/MM/DD)
    #[arg(long, required_unless_present = "config")]
    start: Option<String>,

    /// Last possible return date (YYYY-MM-DD or YYYY/MM/DD)
    #[arg(long, required_unless_present = "config")]
    end: Option<String>,

    /// Shortest trip, in days from departure to return
    #[arg(long, required_unless_present = "config")]
    min_days: Option<i64>,

    /// Longest trip, in days from departure to return
    #[arg(long, required_unless_present = "config")]
    max_days: Option<i64>,

    /// Weekdays off work you are willing to spend
    #[arg(long, default_value = "0")]
    vacation_days: i64,

    /// Days the trip must not include (comma-separated dates)
    #[arg(long, value_delimiter = ',')]
    exclude: Vec<String>,

    /// Maximum number of stops per flight (0 = direct only)
    #[arg(long, default_value = "0")]
    max_stops: u32,

    /// Maximum flight duration in hours (0 = unbounded)
    #[arg(long)]
    max_duration: Option<f64>,

    /// Keep flights landing between 22:00 and 07:00
    #[arg(long)]
    keep_late_arrivals: bool,

    /// Require that many full days at the destination
    #[arg(long, default_value = "0")]
    min_full_days: i64,

    /// Do not spend an extra vacation day on after-work departures
    #[arg(long)]
    no_auto_extend: bool,

    /// Number of travellers
    #[arg(short, long, default_value = "2")]
    adults: u32,

    /// Currency code for prices
    #[arg(long, default_value = "DKK")]
    currency: String,

    /// Pick outbound and inbound flights together instead of independently
    #[arg(long)]
    joint: bool,

    /// Flight lookups in flight at once
    #[arg(long)]
    concurrency: Option<u64>,

    /// Load the search from a JSON file instead of flags
    #[arg(long)]
    config: Option<PathBuf>,

    /// Answer from the flight store only, never call a provider
    #[arg(long)]
    offline: bool,

    /// Flight store location
    #[arg(long, default_value = "flights.json")]
    flights_db: PathBuf,

    /// Airport table (JSON) replacing the bundled one
    #[arg(long)]
    airports: Option<PathBuf>,

    /// RapidAPI key for Booking.com
    #[arg(long, env = "RAPIDAPI_KEY", hide_env_values = true)]
    rapidapi_key: Option<String>,

    /// Verbose output
    #[arg(short, long, default_value = "false")]
    verbose: bool,
}

/// Search file: airports plus every [`TripSearchConfig`] field.
#[derive(Debug, Deserialize)]
struct SearchFile {
    from: String,
    to: Vec<String>,
    #[serde(flatten)]
    search: TripSearchConfig,
}

/// Configure logging based on verbosity level; RUST_LOG wins when set.
fn setup_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.to_string().into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_timer(tracing_subscriber::fmt::time::ChronoUtc::rfc_3339())
                .with_writer(std::io::stderr),
        )
        .init();
}

/// Parse date string to NaiveDate
fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y/%m/%d"))
        .context(format!(
            "Invalid date format: {}. Use YYYY-MM-DD or YYYY/MM/DD",
            s
        ))
}

/// Build the search from flags. clap guarantees the required ones are present.
fn search_from_args(args: &CliArgs) -> Result<(String, Vec<String>, TripSearchConfig)> {
    let required = |what: &str| anyhow::anyhow!("--{what} is required without --config");
    let start = parse_date(args.start.as_deref().ok_or_else(|| required("start"))?)?;
    let end = parse_date(args.end.as_deref().ok_or_else(|| required("end"))?)?;
    let min_days = args.min_days.ok_or_else(|| required("min-days"))?;
    let max_days = args.max_days.ok_or_else(|| required("max-days"))?;
    let from = args.from.clone().ok_or_else(|| required("from"))?;

    let mut config = TripSearchConfig::new(start, end, min_days, max_days);
    config.exclude_dates = args
        .exclude
        .iter()
        .map(|d| parse_date(d))
        .collect::<Result<BTreeSet<_>>>()?;
    config.vacation_days = args.vacation_days;
    config.max_stops = args.max_stops;
    config.max_flight_duration = args.max_duration;
    config.remove_bad_flights = !args.keep_late_arrivals;
    config.min_full_days = args.min_full_days;
    config.auto_extend_trip = !args.no_auto_extend;
    config.adults = args.adults;
    config.currency_code = args.currency.clone();
    Ok((from, args.to.clone(), config))
}

/// Get terminal width for responsive tables
fn get_terminal_width() -> usize {
    term_size::dimensions().map(|(w, _)| w).unwrap_or(100)
}

fn dash_bar() -> String {
    "-".repeat(get_terminal_width().min(100))
}

fn fmt_leg(flight: &tripwindow_trip_finder::Flight) -> String {
    format!(
        "{} {} → {}",
        flight.departure_time().format("%a %d %b"),
        flight.departure_time().format("%H:%M"),
        flight.arrival_time().format("%H:%M"),
    )
}

/// Render results to stdout, cheapest first
fn render_results(origin: &Airport, best: &BTreeMap<String, TripCandidate>, currency: &str) {
    println!(
        "================================================================================================\n  🛫  Cheapest trips from {} ({})\n================================================================================================\n",
        origin.code, origin.city
    );

    if best.is_empty() {
        println!("No trip matched the search.");
        return;
    }

    let mut trips: Vec<&TripCandidate> = best.values().collect();
    trips.sort_by(|a, b| a.total_price().total_cmp(&b.total_price()));

    let dest_width = trips
        .iter()
        .map(|t| t.destination.city.len() + 6)
        .fold(12, max);
    let leg_width = 22;

    println!(
        "  {:<dw$}  {:<lw$}  {:<lw$}  PRICE",
        "DESTINATION",
        "OUTBOUND",
        "INBOUND",
        dw = dest_width,
        lw = leg_width
    );
    println!("{}", dash_bar());
    for trip in trips {
        let dest = format!("{} ({})", trip.destination.city, trip.destination.code);
        println!(
            "  {:<dw$}  {:<lw$}  {:<lw$}  {:.0} {}",
            dest,
            fmt_leg(&trip.outbound),
            fmt_leg(&trip.inbound),
            trip.total_price(),
            currency,
            dw = dest_width,
            lw = leg_width
        );
    }
}

async fn run_search<G: FlightGateway>(
    finder: TripFinder<G>,
    origin: &Airport,
    destinations: &[Airport],
    config: &TripSearchConfig,
) -> Result<BTreeMap<String, TripCandidate>> {
    finder
        .find_cheapest_trips(origin, destinations, config)
        .await
        .context("Trip search failed")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    setup_logging(args.verbose);

    tracing::info!("Starting tripwindow-trips CLI");
    tracing::debug!("Args: {:?}", args);

    let (from, to, mut config) = match &args.config {
        Some(path) => {
            let text = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Read {}", path.display()))?;
            let file: SearchFile = serde_json::from_str(&text)
                .with_context(|| format!("Invalid search file {}", path.display()))?;
            (file.from, file.to, file.search)
        }
        None => search_from_args(&args)?,
    };
    if args.joint {
        config.leg_selection = LegSelection::Joint;
    }
    if let Some(concurrency) = args.concurrency {
        config.max_concurrent_lookups = concurrency;
    }

    let directory = match &args.airports {
        Some(path) => AirportDirectory::from_json_file(path).await?,
        None => AirportDirectory::bundled().clone(),
    };
    let origin = directory.lookup_airport(&from)?;
    let destinations = directory.lookup_all(&to)?;

    tracing::info!(
        "Searching {} → [{}] between {} and {}",
        origin.code,
        to.join(", "),
        config.start_date,
        config.end_date
    );

    let store = FlightStore::load(&args.flights_db).await?;
    let best = if args.offline {
        let finder = TripFinder::new(CachedFlightGateway::offline(store));
        run_search(finder, &origin, &destinations, &config).await?
    } else {
        let api = ApiClient::with_defaults(args.rapidapi_key.clone())?;
        let finder = TripFinder::new(CachedFlightGateway::new(store, FlightApi::new(api)));
        run_search(finder, &origin, &destinations, &config).await?
    };

    tracing::info!(
        "Search completed: {} of {} destinations have a trip",
        best.len(),
        destinations.len()
    );
    render_results(&origin, &best, &config.currency_code);

    Ok(())
}
