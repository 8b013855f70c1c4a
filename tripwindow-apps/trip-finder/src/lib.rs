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


// Library for tripwindow-trip-finder
// Cheapest round trips over flexible travel windows, and hotel search

pub mod error;
pub mod models;

// Trip search core
pub mod date_windows;
pub mod destination_selector;
pub mod flight_filters;
pub mod trip_finder;
pub mod trip_search;
pub mod vacation_days;

// Flight sources
pub mod airports;
pub mod api_client;
pub mod flights_gateway;
pub mod flights_query_builder;
pub mod flights_results_parser;
pub mod flights_search;
pub mod flights_store;

// Hotels
pub mod hotels_query_builder;
pub mod hotels_results_parser;
pub mod hotels_search;
pub mod hotels_store;

pub use error::{Result, TripError};
pub use models::{Airport, DatePair, Flight, Hotel, TripCandidate};

pub use date_windows::{DateWindow, generate_date_pairs};
pub use destination_selector::select_best_destinations;
pub use flight_filters::{FilterOptions, LegSelection, reduce_all, reduce_trip};
pub use trip_finder::{TripFinder, TripSearchConfig};
pub use trip_search::{TripOptions, TripSearchDriver};
pub use vacation_days::{count_vacation_days, is_vacation_day};

pub use airports::AirportDirectory;
pub use api_client::ApiClient;
pub use flights_gateway::{CachedFlightGateway, FlightGateway, FlightProvider, FlightQuery, OfflineProvider};
pub use flights_search::{BookingFlightsClient, FlightApi, RyanairClient};
pub use flights_store::FlightStore;

pub use hotels_search::{BookingHotelsClient, CityIdCache, HotelFinder, HotelProvider, HotelQuery, OfflineHotels};
pub use hotels_store::HotelStore;
