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

//! # Hotels Query Builder
//!
//! Side-effect free request URLs for the Booking.com destination and hotel search.

use anyhow::{Result, ensure};
use chrono::NaiveDate;

use crate::flights_query_builder::with_query;

pub const BOOKING_DESTINATION_URL: &str =
    "https://booking-com15.p.rapidapi.com/api/v1/hotels/searchDestination";
pub const BOOKING_HOTELS_URL: &str =
    "https://booking-com15.p.rapidapi.com/api/v1/hotels/searchHotels";

pub fn destination_search_url(city: &str) -> String {
    with_query(BOOKING_DESTINATION_URL, &[("query", city.to_string())])
}

#[derive(Debug, Clone, PartialEq)]
pub struct HotelSearchParams {
    pub dest_id: String,
    pub checkin_date: NaiveDate,
    pub checkout_date: NaiveDate,
    pub adults: u32,
    pub currency: String,
}

impl HotelSearchParams {
    pub fn validate(&self) -> Result<()> {
        ensure!(!self.dest_id.is_empty(), "Destination id is required");
        ensure!(
            self.checkout_date > self.checkin_date,
            "Check-out date must be after check-in date"
        );
        ensure!(self.adults > 0, "At least one adult is required");
        Ok(())
    }

    /// City-wide search sorted by popularity. Booking.com calls the check-in
    /// day `arrival_date` and the check-out day `departure_date`.
    pub fn search_url(&self) -> String {
        with_query(
            BOOKING_HOTELS_URL,
            &[
                ("dest_id", self.dest_id.clone()),
                ("search_type", "CITY".to_string()),
                ("adults", self.adults.to_string()),
                ("arrival_date", self.checkin_date.format("%Y-%m-%d").to_string()),
                ("departure_date", self.checkout_date.format("%Y-%m-%d").to_string()),
                ("currency_code", self.currency.clone()),
                ("sort_by", "popularity".to_string()),
            ],
        )
    }
}
