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

//! # Flight Lookup Gateway
//!
//! The seam between the trip search and wherever flights come from.
//! [`CachedFlightGateway`] answers from the local store first and falls back
//! to a live [`FlightProvider`] on a miss, recording what it fetched.

use std::collections::HashSet;
use std::future::Future;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::{Result, TripError};
use crate::flights_store::FlightStore;
use crate::models::{Airport, Flight};

pub const DEFAULT_CURRENCY: &str = "DKK";

/// One directional lookup: flights from `from` to `to` departing on `date`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FlightQuery {
    pub date: NaiveDate,
    pub from: Airport,
    pub to: Airport,
    pub adults: u32,
    pub currency: String,
}

impl FlightQuery {
    /// Checks applied before asking a live provider.
    pub fn validate_live(&self, today: NaiveDate) -> Result<()> {
        if self.date <= today {
            return Err(TripError::invalid(format!(
                "departure date {} must be in the future",
                self.date
            )));
        }
        if self.adults < 1 {
            return Err(TripError::invalid("at least one adult is required"));
        }
        Ok(())
    }
}

/// Source of flight options for the trip search.
///
/// An empty result means no flights were found; failures are `LookupFailed`.
pub trait FlightGateway: Send + Sync + 'static {
    fn lookup_flights(&self, query: &FlightQuery) -> impl Future<Output = Result<Vec<Flight>>> + Send;

    /// Best-effort persistence point, called after each date pair is fetched.
    fn snapshot(&self) -> impl Future<Output = ()> + Send {
        async {}
    }
}

/// A live flight source, e.g. an airline or aggregator API.
pub trait FlightProvider: Send + Sync + 'static {
    fn fetch_flights(
        &self,
        query: &FlightQuery,
    ) -> impl Future<Output = anyhow::Result<Vec<Flight>>> + Send;

    /// Whether the provider can return anything at all.
    fn is_live(&self) -> bool {
        true
    }
}

/// Provider for cache-only runs: never fetches anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineProvider;

impl FlightProvider for OfflineProvider {
    async fn fetch_flights(&self, _query: &FlightQuery) -> anyhow::Result<Vec<Flight>> {
        Ok(Vec::new())
    }

    fn is_live(&self) -> bool {
        false
    }
}

type RouteKey = (String, String, NaiveDate);

pub struct CachedFlightGateway<P> {
    store: Mutex<FlightStore>,
    /// Routes already asked live during this gateway's lifetime, found or not.
    asked_live: Mutex<HashSet<RouteKey>>,
    provider: P,
    today: fn() -> NaiveDate,
}

impl<P: FlightProvider> CachedFlightGateway<P> {
    pub fn new(store: FlightStore, provider: P) -> Self {
        Self {
            store: Mutex::new(store),
            asked_live: Mutex::new(HashSet::new()),
            provider,
            today: || chrono::Local::now().date_naive(),
        }
    }

    /// Override the clock used to reject past departure dates on live lookups.
    pub fn with_today(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub async fn cached_flights(&self) -> usize {
        self.store.lock().await.len()
    }

    pub fn into_store(self) -> FlightStore {
        self.store.into_inner()
    }
}

impl CachedFlightGateway<OfflineProvider> {
    pub fn offline(store: FlightStore) -> Self {
        Self::new(store, OfflineProvider)
    }
}

impl<P: FlightProvider> FlightGateway for CachedFlightGateway<P> {
    async fn lookup_flights(&self, query: &FlightQuery) -> Result<Vec<Flight>> {
        let key = (query.from.code.clone(), query.to.code.clone(), query.date);
        let cached = self
            .store
            .lock()
            .await
            .find(&query.from.code, &query.to.code, query.date);
        if !cached.is_empty()
            || !self.provider.is_live()
            || self.asked_live.lock().await.contains(&key)
        {
            tracing::trace!(
                "[lookup] {} -> {} on {}: {} cached",
                query.from.code,
                query.to.code,
                query.date,
                cached.len()
            );
            return Ok(cached);
        }

        query.validate_live((self.today)())?;

        let fetch_start = std::time::Instant::now();
        let fetched = self
            .provider
            .fetch_flights(query)
            .await
            .map_err(TripError::from_lookup)?;
        tracing::debug!(
            "[lookup] {} -> {} on {}: fetched {} flights in {:?}",
            query.from.code,
            query.to.code,
            query.date,
            fetched.len(),
            fetch_start.elapsed()
        );

        self.store.lock().await.extend(fetched.iter().cloned());
        self.asked_live.lock().await.insert(key);
        Ok(fetched)
    }

    async fn snapshot(&self) {
        if let Err(e) = self.store.lock().await.save().await {
            tracing::warn!("Could not persist flight store: {e}");
        }
    }
}
