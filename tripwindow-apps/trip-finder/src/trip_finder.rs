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

//! # Trip Finder
//!
//! The whole search as one batch: generate date pairs, fetch flight
//! options, filter and reduce them, and keep the cheapest trip per destination.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::date_windows::{DateWindow, generate_date_pairs};
use crate::destination_selector::select_best_destinations;
use crate::error::{Result, TripError};
use crate::flight_filters::{FilterOptions, LegSelection, reduce_all};
use crate::flights_gateway::{DEFAULT_CURRENCY, FlightGateway};
use crate::models::{Airport, DatePair, TripCandidate};
use crate::trip_search::{TripOptions, TripSearchDriver};

fn default_true() -> bool {
    true
}

fn default_adults() -> u32 {
    2
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

fn default_concurrency() -> u64 {
    1
}

/// Everything a trip search needs besides the airports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TripSearchConfig {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub exclude_dates: BTreeSet<NaiveDate>,
    #[serde(default)]
    pub vacation_days: i64,
    pub min_days: i64,
    pub max_days: i64,
    #[serde(default)]
    pub max_stops: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_flight_duration: Option<f64>,
    /// Drop flights landing between 22:00 and 06:59.
    #[serde(default = "default_true")]
    pub remove_bad_flights: bool,
    #[serde(default)]
    pub min_full_days: i64,
    /// Allow one extra vacation day when the outbound leaves after work.
    #[serde(default = "default_true")]
    pub auto_extend_trip: bool,
    #[serde(default = "default_adults")]
    pub adults: u32,
    #[serde(default = "default_currency")]
    pub currency_code: String,
    #[serde(default)]
    pub leg_selection: LegSelection,
    #[serde(default = "default_concurrency")]
    pub max_concurrent_lookups: u64,
}

impl TripSearchConfig {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate, min_days: i64, max_days: i64) -> Self {
        Self {
            start_date,
            end_date,
            exclude_dates: BTreeSet::new(),
            vacation_days: 0,
            min_days,
            max_days,
            max_stops: 0,
            max_flight_duration: None,
            remove_bad_flights: true,
            min_full_days: 0,
            auto_extend_trip: true,
            adults: default_adults(),
            currency_code: default_currency(),
            leg_selection: LegSelection::Independent,
            max_concurrent_lookups: default_concurrency(),
        }
    }

    pub async fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Read {}", path.display()))
            .map_err(TripError::Storage)?;
        serde_json::from_str(&text)
            .map_err(|e| TripError::invalid(format!("{}: {}", path.display(), e)))
    }

    pub fn validate(&self) -> Result<()> {
        if self.adults < 1 {
            return Err(TripError::invalid("at least one adult is required"));
        }
        if self.currency_code.trim().is_empty() {
            return Err(TripError::invalid("currency code is required"));
        }
        if let Some(hours) = self.max_flight_duration {
            if hours < 0.0 {
                return Err(TripError::invalid(format!(
                    "max_flight_duration ({hours}) cannot be negative"
                )));
            }
        }
        self.plain_window().validate()
    }

    fn plain_window(&self) -> DateWindow {
        DateWindow {
            start_date: self.start_date,
            end_date: self.end_date,
            exclude_dates: self.exclude_dates.clone(),
            vacation_days: self.vacation_days,
            min_days: self.min_days,
            max_days: self.max_days,
        }
    }

    /// The window the cheapest-trip search enumerates. With auto-extension a
    /// trip may cost one more weekday, provided the outbound leaves after work.
    pub fn search_window(&self) -> DateWindow {
        let mut window = self.plain_window();
        if self.auto_extend_trip {
            window.vacation_days += 1;
        }
        window
    }

    pub fn filter_options(&self) -> FilterOptions {
        FilterOptions {
            max_stops: self.max_stops,
            max_flight_duration: self.max_flight_duration,
            remove_bad_flights: self.remove_bad_flights,
            vacation_days: self.vacation_days,
            auto_extend_trip: self.auto_extend_trip,
            min_full_days: self.min_full_days,
            leg_selection: self.leg_selection,
        }
    }
}

pub struct TripFinder<G> {
    gateway: Arc<G>,
}

impl<G: FlightGateway> TripFinder<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway: Arc::new(gateway),
        }
    }

    pub fn with_shared_gateway(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    fn driver(&self, config: &TripSearchConfig) -> TripSearchDriver<G> {
        TripSearchDriver::new(Arc::clone(&self.gateway))
            .max_concurrent_lookups(config.max_concurrent_lookups)
            .party(config.adults, config.currency_code.clone())
    }

    /// All flight options for every date pair within the plain vacation budget, unfiltered.
    pub async fn find_trip_options(
        &self,
        origin: &Airport,
        destinations: &[Airport],
        config: &TripSearchConfig,
    ) -> Result<Vec<TripOptions>> {
        config.validate()?;
        let dates = generate_date_pairs(&config.plain_window())?;
        let options = self
            .driver(config)
            .fetch_options(&dates, origin, destinations)
            .await?;
        self.gateway.snapshot().await;
        Ok(options)
    }

    /// The cheapest feasible round trip per destination.
    ///
    /// Destinations without any feasible trip are absent from the result.
    pub async fn find_cheapest_trips(
        &self,
        origin: &Airport,
        destinations: &[Airport],
        config: &TripSearchConfig,
    ) -> Result<BTreeMap<String, TripCandidate>> {
        config.validate()?;
        let dates: Vec<DatePair> = generate_date_pairs(&config.search_window())?;
        tracing::info!(
            "Searching {} date pairs x {} destinations from {}",
            dates.len(),
            destinations.len(),
            origin.code
        );
        if dates.is_empty() {
            return Ok(BTreeMap::new());
        }

        let options = self
            .driver(config)
            .fetch_options(&dates, origin, destinations)
            .await?;
        let candidates = reduce_all(&options, &config.filter_options());
        tracing::debug!(
            "{} of {} option sets survived filtering",
            candidates.len(),
            options.len()
        );

        let best = select_best_destinations(&candidates, destinations);
        self.gateway.snapshot().await;
        Ok(best)
    }
}
