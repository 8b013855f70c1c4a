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

//! # Destination Selector
//!
//! Picks the cheapest round trip for each requested destination.

use std::collections::BTreeMap;

use crate::models::{Airport, TripCandidate};

/// Cheapest candidate per destination code, by total price.
///
/// Only destinations listed in `destinations` are considered; those without
/// any candidate are left out. The earliest candidate wins ties.
pub fn select_best_destinations(
    candidates: &[TripCandidate],
    destinations: &[Airport],
) -> BTreeMap<String, TripCandidate> {
    let mut best = BTreeMap::new();
    for destination in destinations {
        if best.contains_key(&destination.code) {
            continue;
        }
        let trips: Vec<&TripCandidate> = candidates
            .iter()
            .filter(|c| c.destination.code == destination.code)
            .collect();
        tracing::info!("Found {} trips to {}", trips.len(), destination.code);

        let cheapest = trips.into_iter().fold(None::<&TripCandidate>, |acc, c| match acc {
            Some(a) if a.total_price() <= c.total_price() => Some(a),
            _ => Some(c),
        });
        if let Some(trip) = cheapest {
            best.insert(destination.code.clone(), trip.clone());
        }
    }
    best
}
