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

//! # Flight Filters
//!
//! Side-effect free reduction of raw trip options to one round trip per
//! date pair and destination.
//!
//! Filters run in a fixed order: stops, duration, arrival quality, then the
//! two trip-shape rules (auto-extension and minimum full days) and finally
//! the price reduction.

use serde::{Deserialize, Serialize};

use crate::models::{Flight, TripCandidate};
use crate::trip_search::TripOptions;
use crate::vacation_days::count_vacation_days;

/// Arrivals at or before this hour are overnight arrivals.
pub const EARLIEST_GOOD_ARRIVAL_HOUR: u32 = 6;
/// Arrivals at or after this hour are overnight arrivals.
pub const LATEST_GOOD_ARRIVAL_HOUR: u32 = 22;
/// Outbound flights must leave after this hour on an extended trip.
pub const AFTER_WORK_HOUR: u32 = 16;
/// On a trip of exactly `min_full_days`, the outbound must land before this hour.
pub const FULL_DAY_ARRIVAL_BEFORE: u32 = 12;
/// On a trip of exactly `min_full_days`, the inbound must leave after this hour.
pub const FULL_DAY_DEPARTURE_AFTER: u32 = 20;

/// How the two legs of a round trip are chosen once filtered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegSelection {
    /// Cheapest outbound and cheapest inbound, each picked on its own.
    /// The trip-shape rules look at the first remaining flight of each leg.
    #[default]
    Independent,
    /// Cheapest outbound/inbound combination; the trip-shape rules are
    /// checked for every combination using its own dates.
    Joint,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FilterOptions {
    pub max_stops: u32,
    /// Upper bound on a single leg's block time, in hours. Zero means no bound.
    pub max_flight_duration: Option<f64>,
    pub remove_bad_flights: bool,
    pub vacation_days: i64,
    pub auto_extend_trip: bool,
    pub min_full_days: i64,
    pub leg_selection: LegSelection,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            max_stops: 0,
            max_flight_duration: None,
            remove_bad_flights: true,
            vacation_days: 0,
            auto_extend_trip: true,
            min_full_days: 0,
            leg_selection: LegSelection::Independent,
        }
    }
}

pub fn filter_stops<'a>(flights: &[&'a Flight], max_stops: u32) -> Vec<&'a Flight> {
    flights
        .iter()
        .copied()
        .filter(|f| f.stops() <= max_stops)
        .collect()
}

pub fn filter_duration<'a>(flights: &[&'a Flight], max_hours: Option<f64>) -> Vec<&'a Flight> {
    match max_hours.filter(|h| *h > 0.0) {
        Some(max_hours) => flights
            .iter()
            .copied()
            .filter(|f| f.duration_hours() <= max_hours)
            .collect(),
        None => flights.to_vec(),
    }
}

/// Arrival hour strictly between 06 and 22.
pub fn is_good_arrival(flight: &Flight) -> bool {
    let hour = flight.arrival_hour();
    hour > EARLIEST_GOOD_ARRIVAL_HOUR && hour < LATEST_GOOD_ARRIVAL_HOUR
}

pub fn filter_bad_flights<'a>(flights: &[&'a Flight], remove: bool) -> Vec<&'a Flight> {
    if !remove {
        return flights.to_vec();
    }
    flights
        .iter()
        .copied()
        .filter(|f| is_good_arrival(f))
        .collect()
}

/// Stop, duration, and arrival-quality filters, in that order.
pub fn filter_leg<'a>(flights: &[&'a Flight], options: &FilterOptions) -> Vec<&'a Flight> {
    let flights = filter_stops(flights, options.max_stops);
    let flights = filter_duration(&flights, options.max_flight_duration);
    filter_bad_flights(&flights, options.remove_bad_flights)
}

/// The lowest-priced flight; the earliest one in list order wins ties.
pub fn cheapest<'a>(flights: &[&'a Flight]) -> Option<&'a Flight> {
    flights.iter().copied().fold(None, |best, f| match best {
        Some(b) if b.price() <= f.price() => Some(b),
        _ => Some(f),
    })
}

/// Weekdays spent between landing at the destination and flying home.
pub fn vacation_days_used(outbound: &Flight, inbound: &Flight) -> i64 {
    count_vacation_days(outbound.arrival_date(), inbound.departure_date())
}

/// Days at the destination counting the arrival and the departure day.
pub fn days_between(outbound: &Flight, inbound: &Flight) -> i64 {
    (inbound.departure_date() - outbound.arrival_date()).num_days() + 1
}

/// Reduce one date pair/destination to its round trip, if any survives.
pub fn reduce_trip(trip: &TripOptions, options: &FilterOptions) -> Option<TripCandidate> {
    let outbound: Vec<&Flight> = trip.outbound.iter().collect();
    let inbound: Vec<&Flight> = trip.inbound.iter().collect();
    let outbound = filter_leg(&outbound, options);
    let inbound = filter_leg(&inbound, options);
    if outbound.is_empty() || inbound.is_empty() {
        return None;
    }

    let (out, back) = match options.leg_selection {
        LegSelection::Independent => select_independent(outbound, inbound, options)?,
        LegSelection::Joint => select_joint(&outbound, &inbound, options)?,
    };

    Some(TripCandidate {
        date_pair: trip.date_pair,
        destination: trip.destination.clone(),
        outbound: out.clone(),
        inbound: back.clone(),
    })
}

fn select_independent<'a>(
    mut outbound: Vec<&'a Flight>,
    mut inbound: Vec<&'a Flight>,
    options: &FilterOptions,
) -> Option<(&'a Flight, &'a Flight)> {
    if options.auto_extend_trip && vacation_days_used(outbound[0], inbound[0]) > options.vacation_days
    {
        outbound.retain(|f| f.departure_hour() > AFTER_WORK_HOUR);
        if outbound.is_empty() {
            return None;
        }
    }

    if days_between(outbound[0], inbound[0]) == options.min_full_days {
        outbound.retain(|f| f.arrival_hour() < FULL_DAY_ARRIVAL_BEFORE);
        inbound.retain(|f| f.departure_hour() > FULL_DAY_DEPARTURE_AFTER);
        if outbound.is_empty() || inbound.is_empty() {
            return None;
        }
    }

    Some((cheapest(&outbound)?, cheapest(&inbound)?))
}

fn is_feasible_pair(out: &Flight, back: &Flight, options: &FilterOptions) -> bool {
    if options.auto_extend_trip
        && vacation_days_used(out, back) > options.vacation_days
        && out.departure_hour() <= AFTER_WORK_HOUR
    {
        return false;
    }
    if days_between(out, back) == options.min_full_days
        && (out.arrival_hour() >= FULL_DAY_ARRIVAL_BEFORE
            || back.departure_hour() <= FULL_DAY_DEPARTURE_AFTER)
    {
        return false;
    }
    true
}

fn select_joint<'a>(
    outbound: &[&'a Flight],
    inbound: &[&'a Flight],
    options: &FilterOptions,
) -> Option<(&'a Flight, &'a Flight)> {
    let mut best: Option<(&Flight, &Flight)> = None;
    for &out in outbound {
        for &back in inbound {
            if !is_feasible_pair(out, back, options) {
                continue;
            }
            let cheaper = match best {
                Some((o, b)) => out.price() + back.price() < o.price() + b.price(),
                None => true,
            };
            if cheaper {
                best = Some((out, back));
            }
        }
    }
    best
}

/// Reduce every option set, keeping the input order and dropping the infeasible ones.
pub fn reduce_all(trips: &[TripOptions], options: &FilterOptions) -> Vec<TripCandidate> {
    trips
        .iter()
        .filter_map(|trip| reduce_trip(trip, options))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Airport;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2030, 9, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn leg(dep: NaiveDateTime, hours: i64, price: f64, stops: u32) -> Flight {
        Flight::new(
            Airport::new("CPH", "Kastrup", "Copenhagen", "Denmark"),
            Airport::new("AGP", "Malaga", "Malaga", "Spain"),
            dep,
            dep + chrono::Duration::hours(hours),
            price,
            stops,
        )
        .unwrap()
    }

    #[test]
    fn stop_filter_keeps_flights_at_the_ceiling() {
        let flights = [leg(at(2, 8), 3, 1.0, 0), leg(at(2, 8), 5, 2.0, 1), leg(at(2, 8), 9, 3.0, 2)];
        let refs: Vec<&Flight> = flights.iter().collect();
        let kept = filter_stops(&refs, 1);
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|f| f.stops() <= 1));
    }

    #[test]
    fn duration_filter_ignores_zero_bound() {
        let flights = [leg(at(2, 8), 3, 1.0, 0), leg(at(2, 8), 13, 2.0, 1)];
        let refs: Vec<&Flight> = flights.iter().collect();
        assert_eq!(filter_duration(&refs, Some(12.0)).len(), 1);
        assert_eq!(filter_duration(&refs, Some(0.0)).len(), 2);
        assert_eq!(filter_duration(&refs, None).len(), 2);
    }

    #[test]
    fn bad_arrival_window_is_exclusive() {
        // arrivals at 06:xx and 22:xx are both overnight arrivals
        assert!(!is_good_arrival(&leg(at(2, 3), 3, 1.0, 0)));
        assert!(is_good_arrival(&leg(at(2, 4), 3, 1.0, 0)));
        assert!(is_good_arrival(&leg(at(2, 18), 3, 1.0, 0)));
        assert!(!is_good_arrival(&leg(at(2, 19), 3, 1.0, 0)));
    }

    #[test]
    fn cheapest_prefers_first_on_ties() {
        let flights = [leg(at(2, 8), 3, 50.0, 0), leg(at(2, 9), 3, 40.0, 0), leg(at(2, 10), 3, 40.0, 0)];
        let refs: Vec<&Flight> = flights.iter().collect();
        let best = cheapest(&refs).unwrap();
        assert!(std::ptr::eq(best, &flights[1]));
        assert!(cheapest(&[]).is_none());
    }

    #[test]
    fn days_between_counts_both_ends() {
        let out = leg(at(5, 8), 3, 1.0, 0);
        let back = leg(at(7, 21), 3, 1.0, 0);
        assert_eq!(days_between(&out, &back), 3);
    }
}
