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

//! # Flights Query Builder
//!
//! Side-effect free request URLs for the Ryanair fare finder and the
//! Booking.com flight search.

use anyhow::{Result, ensure};
use chrono::NaiveDate;

use crate::flights_gateway::FlightQuery;

pub const RYANAIR_FARES_URL: &str = "https://services-api.ryanair.com/farfnd/3/oneWayFares";
pub const BOOKING_API_HOST: &str = "booking-com15.p.rapidapi.com";
pub const BOOKING_FLIGHTS_URL: &str =
    "https://booking-com15.p.rapidapi.com/api/v1/flights/searchFlights";

/// `base?k1=v1&k2=v2` with every value percent-encoded.
pub(crate) fn with_query(base: &str, params: &[(&str, String)]) -> String {
    let query = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");
    format!("{base}?{query}")
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlightSearchParams {
    pub from_airport: String,
    pub to_airport: String,
    pub depart_date: NaiveDate,
    pub adults: u32,
    pub currency: String,
}

impl FlightSearchParams {
    pub fn from_query(query: &FlightQuery) -> Self {
        Self {
            from_airport: query.from.code.clone(),
            to_airport: query.to.code.clone(),
            depart_date: query.date,
            adults: query.adults,
            currency: query.currency.clone(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(!self.from_airport.is_empty(), "Origin airport is required");
        ensure!(
            !self.to_airport.is_empty(),
            "Destination airport is required"
        );
        ensure!(self.adults > 0, "At least one adult is required");
        ensure!(!self.currency.is_empty(), "Currency is required");
        Ok(())
    }

    fn date_str(&self) -> String {
        self.depart_date.format("%Y-%m-%d").to_string()
    }

    /// One-way fares departing on a single day. Prices are per person.
    pub fn ryanair_url(&self) -> String {
        let date = self.date_str();
        with_query(
            RYANAIR_FARES_URL,
            &[
                ("departureAirportIataCode", self.from_airport.clone()),
                ("arrivalAirportIataCode", self.to_airport.clone()),
                ("outboundDepartureDateFrom", date.clone()),
                ("outboundDepartureDateTo", date),
                ("currency", self.currency.clone()),
            ],
        )
    }

    /// Economy offers sorted by BEST, first page only. Prices cover the whole party.
    pub fn booking_url(&self) -> String {
        with_query(
            BOOKING_FLIGHTS_URL,
            &[
                ("fromId", format!("{}.AIRPORT", self.from_airport)),
                ("toId", format!("{}.AIRPORT", self.to_airport)),
                ("departDate", self.date_str()),
                ("pageNo", "1".to_string()),
                ("adults", self.adults.to_string()),
                ("sort", "BEST".to_string()),
                ("cabinClass", "ECONOMY".to_string()),
                ("currency_code", self.currency.clone()),
            ],
        )
    }
}
