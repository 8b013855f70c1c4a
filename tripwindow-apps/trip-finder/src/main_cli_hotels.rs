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


//! CLI for hotel search.
//!
//! # Examples
//!
//! ## Basic search
//!
//! ```bash
//! tripwindow-hotels -c Malaga -C Spain -i 2030-05-02 -o 2030-05-09
//! ```
//!
//! ## Stored offers only
//!
//! ```bash
//! tripwindow-hotels -c Palma -C Spain -i 2030-06-10 -o 2030-06-14 --offline
//! ```
//!
//! # Output
//!
//! Hotels covering the stay, cheapest first, with price and guest rating.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use tripwindow_trip_finder::{
    ApiClient, BookingHotelsClient, CityIdCache, Hotel, HotelFinder, HotelProvider, HotelQuery,
    HotelStore, OfflineHotels,
};

/// CLI arguments
#[derive(Parser, Debug)]
#[command(name = "tripwindow-hotels")]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// City to stay in
    #[arg(short, long)]
    city: String,

    /// Country of the city
    #[arg(short = 'C', long)]
    country: String,

    /// Check-in date (YYYY-MM-DD or YYYY/MM/DD)
    #[arg(short = 'i', long)]
    checkin: String,

    /// Check-out date (YYYY-MM-DD or YYYY/MM/DD)
    #[arg(short = 'o', long)]
    checkout: String,

    /// Number of guests
    #[arg(short, long, default_value = "2")]
    adults: u32,

    /// Currency code for prices
    #[arg(long, default_value = "DKK")]
    currency: String,

    /// Maximum number of hotels to show
    #[arg(short, long, default_value = "10")]
    limit: usize,

    /// Answer from the hotel store only
    #[arg(long)]
    offline: bool,

    /// Hotel store location
    #[arg(long, default_value = "hotels.json")]
    hotels_db: PathBuf,

    /// City id cache location
    #[arg(long, default_value = "city_ids.json")]
    city_ids: PathBuf,

    /// RapidAPI key for Booking.com
    #[arg(long, env = "RAPIDAPI_KEY", hide_env_values = true)]
    rapidapi_key: Option<String>,

    /// Verbose output
    #[arg(short, long, default_value = "false")]
    verbose: bool,
}

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

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y/%m/%d"))
        .context(format!(
            "Invalid date format: {}. Use YYYY-MM-DD or YYYY/MM/DD",
            s
        ))
}

fn get_terminal_width() -> usize {
    term_size::dimensions().map(|(w, _)| w).unwrap_or(100)
}

/// Truncate to `width` characters, marking the cut with an ellipsis.
fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn render_results(query: &HotelQuery, hotels: &[Hotel], limit: usize) {
    println!(
        "================================================================================================\n  🏨  {}, {}: {} → {} ({} guests)\n================================================================================================\n",
        query.city, query.country, query.checkin_date, query.checkout_date, query.adults
    );
    println!("📊 Total Hotels: {}", hotels.len());
    if hotels.is_empty() {
        return;
    }

    let name_width = get_terminal_width().min(100).saturating_sub(30).max(20);
    println!("\n{:>4}  {:<nw$}  {:>6}  PRICE", "#", "NAME", "RATING", nw = name_width);
    println!("{}", "-".repeat(get_terminal_width().min(100)));
    for (i, hotel) in hotels.iter().take(limit).enumerate() {
        println!(
            "{:>4}  {:<nw$}  {:>6.1}  {:.0} {}",
            i + 1,
            truncate(hotel.name(), name_width),
            hotel.rating(),
            hotel.price(),
            query.currency,
            nw = name_width
        );
    }
}

async fn run_search<P: HotelProvider>(finder: HotelFinder<P>, query: &HotelQuery) -> Result<Vec<Hotel>> {
    finder.search_hotels(query).await.context("Hotel search failed")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    setup_logging(args.verbose);

    tracing::info!("Starting tripwindow-hotels CLI");
    tracing::debug!("Args: {:?}", args);

    let mut query = HotelQuery::new(
        args.city.clone(),
        args.country.clone(),
        parse_date(&args.checkin)?,
        parse_date(&args.checkout)?,
    );
    query.adults = args.adults;
    query.currency = args.currency.clone();

    let store = HotelStore::load(&args.hotels_db).await?;
    let hotels = if args.offline {
        run_search(HotelFinder::new(store, OfflineHotels), &query).await?
    } else {
        let api = ApiClient::with_defaults(args.rapidapi_key.clone())?;
        let city_ids = CityIdCache::load(&args.city_ids).await?;
        let client = BookingHotelsClient::new(api, city_ids);
        run_search(HotelFinder::new(store, client), &query).await?
    };

    render_results(&query, &hotels, args.limit);
    Ok(())
}
