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

//! # Models
//!
//! Value types flowing through the trip search.

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TripError};

/// An airport. Two airports are the same airport when their codes match.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Airport {
    pub code: String,
    pub name: String,
    pub city: String,
    pub country: String,
}

impl Airport {
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        city: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            city: city.into(),
            country: country.into(),
        }
    }
}

impl PartialEq for Airport {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
    }
}

impl Eq for Airport {}

impl std::hash::Hash for Airport {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.code.hash(state);
    }
}

/// On-disk and wire shape of a [`Flight`]; validated on the way in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
struct FlightRecord {
    departure: Airport,
    arrival: Airport,
    departure_time: NaiveDateTime,
    arrival_time: NaiveDateTime,
    price: f64,
    stops: u32,
}

/// One directional flight. Times are local to the respective airport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FlightRecord", into = "FlightRecord")]
pub struct Flight {
    departure: Airport,
    arrival: Airport,
    departure_time: NaiveDateTime,
    arrival_time: NaiveDateTime,
    price: f64,
    stops: u32,
}

impl Flight {
    pub fn new(
        departure: Airport,
        arrival: Airport,
        departure_time: NaiveDateTime,
        arrival_time: NaiveDateTime,
        price: f64,
        stops: u32,
    ) -> Result<Self> {
        if arrival_time <= departure_time {
            return Err(TripError::invalid(format!(
                "flight {} -> {} arrives ({}) before it departs ({})",
                departure.code, arrival.code, arrival_time, departure_time
            )));
        }
        if !price.is_finite() || price < 0.0 {
            return Err(TripError::invalid(format!(
                "flight {} -> {} has an invalid price: {}",
                departure.code, arrival.code, price
            )));
        }
        Ok(Self {
            departure,
            arrival,
            departure_time,
            arrival_time,
            price,
            stops,
        })
    }

    pub fn departure(&self) -> &Airport {
        &self.departure
    }

    pub fn arrival(&self) -> &Airport {
        &self.arrival
    }

    pub fn departure_time(&self) -> NaiveDateTime {
        self.departure_time
    }

    pub fn arrival_time(&self) -> NaiveDateTime {
        self.arrival_time
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn stops(&self) -> u32 {
        self.stops
    }

    pub fn departure_date(&self) -> NaiveDate {
        self.departure_time.date()
    }

    pub fn arrival_date(&self) -> NaiveDate {
        self.arrival_time.date()
    }

    pub fn departure_hour(&self) -> u32 {
        self.departure_time.hour()
    }

    pub fn arrival_hour(&self) -> u32 {
        self.arrival_time.hour()
    }

    /// Block time in fractional hours.
    pub fn duration_hours(&self) -> f64 {
        (self.arrival_time - self.departure_time).num_seconds() as f64 / 3600.0
    }
}

impl TryFrom<FlightRecord> for Flight {
    type Error = TripError;

    fn try_from(r: FlightRecord) -> Result<Self> {
        Flight::new(
            r.departure,
            r.arrival,
            r.departure_time,
            r.arrival_time,
            r.price,
            r.stops,
        )
    }
}

impl From<Flight> for FlightRecord {
    fn from(f: Flight) -> Self {
        Self {
            departure: f.departure,
            arrival: f.arrival,
            departure_time: f.departure_time,
            arrival_time: f.arrival_time,
            price: f.price,
            stops: f.stops,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
struct HotelRecord {
    name: String,
    city: String,
    country: String,
    price: f64,
    rating: f64,
    checkin_date: NaiveDate,
    checkout_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "HotelRecord", into = "HotelRecord")]
pub struct Hotel {
    name: String,
    city: String,
    country: String,
    price: f64,
    rating: f64,
    checkin_date: NaiveDate,
    checkout_date: NaiveDate,
}

impl Hotel {
    pub fn new(
        name: impl Into<String>,
        city: impl Into<String>,
        country: impl Into<String>,
        price: f64,
        rating: f64,
        checkin_date: NaiveDate,
        checkout_date: NaiveDate,
    ) -> Result<Self> {
        let name = name.into();
        if checkout_date <= checkin_date {
            return Err(TripError::invalid(format!(
                "hotel '{}': check-out {} is not after check-in {}",
                name, checkout_date, checkin_date
            )));
        }
        Ok(Self {
            name,
            city: city.into(),
            country: country.into(),
            price,
            rating,
            checkin_date,
            checkout_date,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn rating(&self) -> f64 {
        self.rating
    }

    pub fn checkin_date(&self) -> NaiveDate {
        self.checkin_date
    }

    pub fn checkout_date(&self) -> NaiveDate {
        self.checkout_date
    }

    pub fn nights(&self) -> i64 {
        (self.checkout_date - self.checkin_date).num_days()
    }
}

impl TryFrom<HotelRecord> for Hotel {
    type Error = TripError;

    fn try_from(r: HotelRecord) -> Result<Self> {
        Hotel::new(
            r.name,
            r.city,
            r.country,
            r.price,
            r.rating,
            r.checkin_date,
            r.checkout_date,
        )
    }
}

impl From<Hotel> for HotelRecord {
    fn from(h: Hotel) -> Self {
        Self {
            name: h.name,
            city: h.city,
            country: h.country,
            price: h.price,
            rating: h.rating,
            checkin_date: h.checkin_date,
            checkout_date: h.checkout_date,
        }
    }
}

/// A departure date and a return date, both inclusive travel days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DatePair {
    pub departure: NaiveDate,
    pub return_date: NaiveDate,
}

impl DatePair {
    pub fn new(departure: NaiveDate, return_date: NaiveDate) -> Result<Self> {
        if return_date < departure {
            return Err(TripError::invalid(format!(
                "return date {} is before departure {}",
                return_date, departure
            )));
        }
        Ok(Self {
            departure,
            return_date,
        })
    }

    /// Length of the stay counting both travel days.
    pub fn stay_days(&self) -> i64 {
        (self.return_date - self.departure).num_days() + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.departure <= date && date <= self.return_date
    }
}

impl std::fmt::Display for DatePair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} → {}", self.departure, self.return_date)
    }
}

/// A reduced, feasible round trip to one destination on one date pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripCandidate {
    pub date_pair: DatePair,
    pub destination: Airport,
    pub outbound: Flight,
    pub inbound: Flight,
}

impl TripCandidate {
    pub fn total_price(&self) -> f64 {
        self.outbound.price() + self.inbound.price()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2030, 5, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn cph() -> Airport {
        Airport::new("CPH", "Copenhagen Kastrup", "Copenhagen", "Denmark")
    }

    fn agp() -> Airport {
        Airport::new("AGP", "Malaga", "Malaga", "Spain")
    }

    #[test]
    fn airport_identity_is_the_code() {
        let a = Airport::new("CPH", "Kastrup", "Copenhagen", "Denmark");
        let b = Airport::new("CPH", "Copenhagen Airport", "København", "DK");
        assert_eq!(a, b);
        assert_ne!(a, agp());
    }

    #[test]
    fn flight_rejects_arrival_before_departure() {
        let err = Flight::new(cph(), agp(), at(3, 10), at(3, 9), 500.0, 0).unwrap_err();
        assert!(matches!(err, TripError::InvalidParameter(_)));

        let err = Flight::new(cph(), agp(), at(3, 10), at(3, 10), 500.0, 0).unwrap_err();
        assert!(matches!(err, TripError::InvalidParameter(_)));
    }

    #[test]
    fn flight_rejects_negative_price() {
        assert!(Flight::new(cph(), agp(), at(3, 10), at(3, 14), -1.0, 0).is_err());
    }

    #[test]
    fn flight_duration_in_hours() {
        let flight = Flight::new(cph(), agp(), at(3, 10), at(3, 14), 500.0, 0).unwrap();
        assert_eq!(flight.duration_hours(), 4.0);
        assert_eq!(flight.arrival_hour(), 14);
    }

    #[test]
    fn flight_json_is_validated() {
        let flight = Flight::new(cph(), agp(), at(3, 10), at(3, 14), 500.0, 1).unwrap();
        let json = serde_json::to_string(&flight).unwrap();
        let back: Flight = serde_json::from_str(&json).unwrap();
        assert_eq!(back, flight);

        let tampered = json.replace("2030-05-03T14:00:00", "2030-05-03T08:00:00");
        assert!(serde_json::from_str::<Flight>(&tampered).is_err());
    }

    #[test]
    fn hotel_requires_checkout_after_checkin() {
        let d = |day| NaiveDate::from_ymd_opt(2030, 5, day).unwrap();
        assert!(Hotel::new("Inn", "Paris", "France", 100.0, 8.1, d(3), d(3)).is_err());
        let hotel = Hotel::new("Inn", "Paris", "France", 100.0, 8.1, d(3), d(6)).unwrap();
        assert_eq!(hotel.nights(), 3);
    }

    #[test]
    fn date_pair_stay_length_counts_both_ends() {
        let d = |day| NaiveDate::from_ymd_opt(2030, 5, day).unwrap();
        let pair = DatePair::new(d(3), d(6)).unwrap();
        assert_eq!(pair.stay_days(), 4);
        assert!(pair.contains(d(6)));
        assert!(!pair.contains(d(7)));
        assert!(DatePair::new(d(6), d(3)).is_err());
    }
}
