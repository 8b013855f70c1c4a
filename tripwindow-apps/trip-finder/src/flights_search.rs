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

//! # Flights Search Clients
//!
//! Effectful (network) flight providers: Ryanair fares, Booking.com offers,
//! and [`FlightApi`] which asks both.

use anyhow::{Context, Result};

use crate::api_client::ApiClient;
use crate::flights_gateway::{FlightProvider, FlightQuery};
use crate::flights_query_builder::{BOOKING_API_HOST, FlightSearchParams};
use crate::flights_results_parser::{parse_booking_flights, parse_ryanair_fares};
use crate::models::Flight;

#[derive(Clone)]
pub struct RyanairClient {
    api: ApiClient,
}

impl RyanairClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

impl FlightProvider for RyanairClient {
    async fn fetch_flights(&self, query: &FlightQuery) -> Result<Vec<Flight>> {
        let params = FlightSearchParams::from_query(query);
        params.validate().context("Invalid search parameters")?;

        let url = params.ryanair_url();
        tracing::debug!("🔗 Ryanair URL: {}", url);
        let body = self.api.get_text(&url).await?;
        let flights = parse_ryanair_fares(&body, &query.from, &query.to, query.adults)?;
        tracing::debug!(
            "Ryanair {} -> {} on {}: {} fares",
            query.from.code,
            query.to.code,
            query.date,
            flights.len()
        );
        Ok(flights)
    }
}

#[derive(Clone)]
pub struct BookingFlightsClient {
    api: ApiClient,
}

impl BookingFlightsClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

impl FlightProvider for BookingFlightsClient {
    async fn fetch_flights(&self, query: &FlightQuery) -> Result<Vec<Flight>> {
        let params = FlightSearchParams::from_query(query);
        params.validate().context("Invalid search parameters")?;

        let url = params.booking_url();
        tracing::debug!("🔗 Booking.com URL: {}", url);
        let body = self.api.get_rapidapi(&url, BOOKING_API_HOST).await?;
        let flights = parse_booking_flights(&body, &query.from, &query.to)?;
        tracing::debug!(
            "Booking.com {} -> {} on {}: {} offers",
            query.from.code,
            query.to.code,
            query.date,
            flights.len()
        );
        Ok(flights)
    }
}

/// Every configured provider, Ryanair first.
///
/// Booking.com is only queried when a RapidAPI key is available.
#[derive(Clone)]
pub struct FlightApi {
    ryanair: RyanairClient,
    booking: Option<BookingFlightsClient>,
}

impl FlightApi {
    pub fn new(api: ApiClient) -> Self {
        let booking = if api.has_rapidapi_key() {
            Some(BookingFlightsClient::new(api.clone()))
        } else {
            tracing::warn!("RAPIDAPI_KEY not set, Booking.com flights are skipped");
            None
        };
        Self {
            ryanair: RyanairClient::new(api),
            booking,
        }
    }
}

impl FlightProvider for FlightApi {
    async fn fetch_flights(&self, query: &FlightQuery) -> Result<Vec<Flight>> {
        let mut flights = self
            .ryanair
            .fetch_flights(query)
            .await
            .context("Ryanair lookup failed")?;
        if let Some(booking) = &self.booking {
            let offers = booking
                .fetch_flights(query)
                .await
                .context("Booking.com lookup failed")?;
            flights.extend(offers);
        }
        Ok(flights)
    }
}
