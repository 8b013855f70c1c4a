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

//! # Flights Results Parser
//!
//! Side-effect free JSON parsing for the Ryanair and Booking.com flight
//! responses. Offers that do not describe a valid flight are skipped.

use anyhow::{Context, Result, bail};
use chrono::{DateTime, NaiveDateTime};
use serde::Deserialize;

use crate::models::{Airport, Flight};

/// Provider timestamps are local wall-clock times, sometimes with an offset attached.
pub(crate) fn parse_local_timestamp(s: &str) -> Result<NaiveDateTime> {
    if let Ok(t) = s.parse::<NaiveDateTime>() {
        return Ok(t);
    }
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.naive_local())
        .with_context(|| format!("Invalid timestamp {s:?}"))
}

#[derive(Debug, Deserialize)]
struct RyanairResponse {
    #[serde(default)]
    fares: Vec<RyanairFare>,
}

#[derive(Debug, Deserialize)]
struct RyanairFare {
    outbound: RyanairLeg,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RyanairLeg {
    departure_date: String,
    arrival_date: String,
    price: RyanairPrice,
}

#[derive(Debug, Deserialize)]
struct RyanairPrice {
    value: f64,
}

/// Ryanair fares are per person and always direct.
pub fn parse_ryanair_fares(
    json: &str,
    from: &Airport,
    to: &Airport,
    adults: u32,
) -> Result<Vec<Flight>> {
    let response: RyanairResponse =
        serde_json::from_str(json).context("Malformed Ryanair fares response")?;

    let mut flights = Vec::with_capacity(response.fares.len());
    for fare in response.fares {
        let leg = fare.outbound;
        let parsed = parse_local_timestamp(&leg.departure_date).and_then(|dep| {
            let arr = parse_local_timestamp(&leg.arrival_date)?;
            Ok(Flight::new(
                from.clone(),
                to.clone(),
                dep,
                arr,
                leg.price.value * adults as f64,
                0,
            )?)
        });
        match parsed {
            Ok(flight) => flights.push(flight),
            Err(e) => tracing::warn!("Skipping Ryanair fare {} -> {}: {e:#}", from.code, to.code),
        }
    }
    Ok(flights)
}

#[derive(Debug, Deserialize)]
struct BookingResponse {
    #[serde(default = "default_status")]
    status: bool,
    #[serde(default)]
    message: Option<serde_json::Value>,
    #[serde(default)]
    data: Option<BookingData>,
}

fn default_status() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BookingData {
    #[serde(default)]
    flight_offers: Vec<BookingOffer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BookingOffer {
    segments: Vec<BookingSegment>,
    price_breakdown: BookingPriceBreakdown,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BookingSegment {
    departure_time: String,
    arrival_time: String,
}

#[derive(Debug, Deserialize)]
struct BookingPriceBreakdown {
    total: BookingMoney,
}

#[derive(Debug, Deserialize)]
struct BookingMoney {
    units: i64,
}

impl BookingOffer {
    fn to_flight(&self, from: &Airport, to: &Airport) -> Result<Flight> {
        let (Some(first), Some(last)) = (self.segments.first(), self.segments.last()) else {
            bail!("offer has no segments");
        };
        let dep = parse_local_timestamp(&first.departure_time)?;
        let arr = parse_local_timestamp(&last.arrival_time)?;
        Ok(Flight::new(
            from.clone(),
            to.clone(),
            dep,
            arr,
            self.price_breakdown.total.units as f64,
            (self.segments.len() - 1) as u32,
        )?)
    }
}

/// Booking.com offers: first segment departs, last segment arrives, the total covers the party.
pub fn parse_booking_flights(json: &str, from: &Airport, to: &Airport) -> Result<Vec<Flight>> {
    let response: BookingResponse =
        serde_json::from_str(json).context("Malformed Booking.com flights response")?;
    if !response.status {
        bail!(
            "Booking.com flight search failed: {}",
            response.message.map(|m| m.to_string()).unwrap_or_default()
        );
    }
    let offers = response.data.map(|d| d.flight_offers).unwrap_or_default();

    let mut flights = Vec::with_capacity(offers.len());
    for offer in &offers {
        match offer.to_flight(from, to) {
            Ok(flight) => flights.push(flight),
            Err(e) => tracing::warn!("Skipping Booking.com offer {} -> {}: {e:#}", from.code, to.code),
        }
    }
    Ok(flights)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn cph() -> Airport {
        Airport::new("CPH", "Kastrup", "Copenhagen", "Denmark")
    }

    fn agp() -> Airport {
        Airport::new("AGP", "Malaga", "Malaga", "Spain")
    }

    #[test]
    fn timestamps_with_and_without_offset() {
        let plain = parse_local_timestamp("2030-10-08T06:25:00").unwrap();
        let offset = parse_local_timestamp("2030-10-08T06:25:00+02:00").unwrap();
        assert_eq!(plain, offset);
        assert_eq!(plain.hour(), 6);
        assert!(parse_local_timestamp("tomorrow").is_err());
    }

    #[test]
    fn empty_booking_payload_is_no_flights() {
        let flights = parse_booking_flights(r#"{"status": true, "data": {}}"#, &cph(), &agp()).unwrap();
        assert!(flights.is_empty());
    }

    #[test]
    fn booking_error_status_is_an_error() {
        let err = parse_booking_flights(
            r#"{"status": false, "message": "Invalid API key"}"#,
            &cph(),
            &agp(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("Invalid API key"));
    }
}
