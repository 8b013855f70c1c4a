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

//! # Trip Search Driver
//!
//! Fans out the outbound and inbound lookups for every date pair and
//! destination, then joins them back in input order. No filtering happens here.

use std::sync::Arc;

use tokio::task::JoinSet;
use tripwindow_query_queues::QueryQueue;

use crate::error::{Result, TripError};
use crate::flights_gateway::{DEFAULT_CURRENCY, FlightGateway, FlightQuery};
use crate::models::{Airport, DatePair, Flight};

/// Unfiltered flight options for one destination on one date pair.
#[derive(Debug, Clone)]
pub struct TripOptions {
    pub date_pair: DatePair,
    pub destination: Airport,
    /// Origin → destination on the departure date.
    pub outbound: Vec<Flight>,
    /// Destination → origin on the return date.
    pub inbound: Vec<Flight>,
}

type Legs = (Vec<Flight>, Vec<Flight>);

pub struct TripSearchDriver<G> {
    gateway: Arc<G>,
    queue: QueryQueue,
    adults: u32,
    currency: String,
}

impl<G: FlightGateway> TripSearchDriver<G> {
    /// A driver performing one lookup pair at a time.
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            queue: QueryQueue::with_concurrency_limit(1),
            adults: 2,
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }

    /// Allow up to `limit` destinations of the same date pair to be looked up concurrently.
    pub fn max_concurrent_lookups(mut self, limit: u64) -> Self {
        self.queue = QueryQueue::with_concurrency_limit(limit);
        self
    }

    pub fn party(mut self, adults: u32, currency: impl Into<String>) -> Self {
        self.adults = adults;
        self.currency = currency.into();
        self
    }

    pub fn gateway(&self) -> &Arc<G> {
        &self.gateway
    }

    /// Options for every (date pair × destination), date pairs outer, destinations inner.
    pub async fn fetch_options(
        &self,
        dates: &[DatePair],
        origin: &Airport,
        destinations: &[Airport],
    ) -> Result<Vec<TripOptions>> {
        let mut options = Vec::with_capacity(dates.len() * destinations.len());
        for (i, pair) in dates.iter().enumerate() {
            let start = std::time::Instant::now();
            let batch = self.fetch_date_pair(*pair, origin, destinations).await?;
            tracing::info!(
                "[{}/{}] {} from {}: {} destinations looked up in {:?}",
                i + 1,
                dates.len(),
                pair,
                origin.code,
                destinations.len(),
                start.elapsed()
            );
            options.extend(batch);
            self.gateway.snapshot().await;
        }
        Ok(options)
    }

    async fn fetch_date_pair(
        &self,
        pair: DatePair,
        origin: &Airport,
        destinations: &[Airport],
    ) -> Result<Vec<TripOptions>> {
        let mut tasks = JoinSet::new();
        for (idx, destination) in destinations.iter().enumerate() {
            let gateway = Arc::clone(&self.gateway);
            let queue = self.queue.clone();
            let outbound = self.query(pair.departure, origin, destination);
            let inbound = self.query(pair.return_date, destination, origin);
            tasks.spawn(async move {
                let legs = queue
                    .run(async {
                        let out = gateway.lookup_flights(&outbound).await?;
                        let back = gateway.lookup_flights(&inbound).await?;
                        Ok::<Legs, TripError>((out, back))
                    })
                    .await;
                (idx, legs)
            });
        }

        let mut slots: Vec<Option<Legs>> = destinations.iter().map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            let (idx, legs) = joined.map_err(|e| {
                TripError::LookupFailed(anyhow::Error::new(e).context("Lookup task failed"))
            })?;
            let legs = legs.map_err(|e| TripError::LookupFailed(e.into()))??;
            slots[idx] = Some(legs);
        }

        slots
            .into_iter()
            .zip(destinations)
            .map(|(slot, destination)| {
                let (outbound, inbound) = slot.ok_or_else(|| {
                    TripError::LookupFailed(anyhow::anyhow!(
                        "no result for {} on {}",
                        destination.code,
                        pair
                    ))
                })?;
                Ok(TripOptions {
                    date_pair: pair,
                    destination: destination.clone(),
                    outbound,
                    inbound,
                })
            })
            .collect()
    }

    fn query(&self, date: chrono::NaiveDate, from: &Airport, to: &Airport) -> FlightQuery {
        FlightQuery {
            date,
            from: from.clone(),
            to: to.clone(),
            adults: self.adults,
            currency: self.currency.clone(),
        }
    }
}
