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

//! # Hotels Results Parser
//!
//! Side-effect free JSON parsing for Booking.com hotel and destination responses.

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::flights_results_parser::parse_local_timestamp;
use crate::models::Hotel;

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default = "default_status")]
    status: bool,
    #[serde(default)]
    message: Option<serde_json::Value>,
    data: Option<T>,
}

fn default_status() -> bool {
    true
}

impl<T> Envelope<T> {
    fn into_data(self, what: &str) -> Result<Option<T>> {
        if !self.status {
            bail!(
                "Booking.com {what} failed: {}",
                self.message.map(|m| m.to_string()).unwrap_or_default()
            );
        }
        Ok(self.data)
    }
}

/// A row of the destination search.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Destination {
    pub dest_id: String,
    pub search_type: String,
    #[serde(default)]
    pub name: Option<String>,
}

pub fn parse_destinations(json: &str) -> Result<Vec<Destination>> {
    let envelope: Envelope<Vec<Destination>> =
        serde_json::from_str(json).context("Malformed Booking.com destination response")?;
    Ok(envelope.into_data("destination search")?.unwrap_or_default())
}

#[derive(Debug, Deserialize)]
struct HotelsData {
    #[serde(default)]
    hotels: Vec<HotelEntry>,
}

#[derive(Debug, Deserialize)]
struct HotelEntry {
    property: Property,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Property {
    name: String,
    checkin_date: String,
    checkout_date: String,
    price_breakdown: PriceBreakdown,
    #[serde(default)]
    review_score: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceBreakdown {
    gross_price: Money,
}

#[derive(Debug, Deserialize)]
struct Money {
    value: f64,
}

/// The check-in/out dates may be plain dates or full timestamps.
fn parse_day(s: &str) -> Result<chrono::NaiveDate> {
    match s.parse::<chrono::NaiveDate>() {
        Ok(d) => Ok(d),
        Err(_) => Ok(parse_local_timestamp(s)?.date()),
    }
}

impl Property {
    fn to_hotel(&self, city: &str, country: &str) -> Result<Hotel> {
        Ok(Hotel::new(
            self.name.clone(),
            city,
            country,
            self.price_breakdown.gross_price.value,
            self.review_score.unwrap_or(0.0),
            parse_day(&self.checkin_date)?,
            parse_day(&self.checkout_date)?,
        )?)
    }
}

/// Hotels in `city`, `country`; unrated properties get a 0.0 rating.
pub fn parse_hotels(json: &str, city: &str, country: &str) -> Result<Vec<Hotel>> {
    let envelope: Envelope<HotelsData> =
        serde_json::from_str(json).context("Malformed Booking.com hotels response")?;
    let entries = envelope
        .into_data("hotel search")?
        .map(|d| d.hotels)
        .unwrap_or_default();

    let mut hotels = Vec::with_capacity(entries.len());
    for entry in &entries {
        match entry.property.to_hotel(city, country) {
            Ok(hotel) => hotels.push(hotel),
            Err(e) => tracing::warn!("Skipping hotel {:?}: {e:#}", entry.property.name),
        }
    }
    Ok(hotels)
}
