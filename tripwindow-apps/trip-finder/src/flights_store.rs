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

//! # Flight Store
//!
//! Flights seen in earlier runs, persisted as a JSON list.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;

use crate::error::{Result, TripError};
use crate::models::Flight;

#[derive(Debug, Default)]
pub struct FlightStore {
    path: Option<PathBuf>,
    flights: Vec<Flight>,
    dirty: bool,
}

impl FlightStore {
    /// An empty store that is never written to disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load the store at `path`. A missing file yields an empty store bound to `path`.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let flights = match tokio::fs::read_to_string(&path).await {
            Ok(text) => serde_json::from_str::<Vec<Flight>>(&text)
                .with_context(|| format!("Malformed flight store {}", path.display()))
                .map_err(TripError::Storage)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No flight store at {}, starting empty", path.display());
                Vec::new()
            }
            Err(e) => {
                return Err(TripError::Storage(
                    anyhow::Error::new(e).context(format!("Read {}", path.display())),
                ));
            }
        };
        tracing::info!("Loaded {} flights from {}", flights.len(), path.display());
        Ok(Self {
            path: Some(path),
            flights,
            dirty: false,
        })
    }

    /// Write the store back to its file, if it has one and anything changed.
    pub async fn save(&mut self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if !self.dirty {
            return Ok(());
        }
        let json = serde_json::to_string(&self.flights)
            .context("Serialize flights")
            .map_err(TripError::Storage)?;
        tokio::fs::write(path, json)
            .await
            .with_context(|| format!("Write {}", path.display()))
            .map_err(TripError::Storage)?;
        self.dirty = false;
        tracing::debug!("Saved {} flights to {}", self.flights.len(), path.display());
        Ok(())
    }

    /// Append a flight unless an identical one is already stored.
    pub fn add(&mut self, flight: Flight) -> bool {
        if self.flights.contains(&flight) {
            return false;
        }
        self.flights.push(flight);
        self.dirty = true;
        true
    }

    pub fn extend(&mut self, flights: impl IntoIterator<Item = Flight>) -> usize {
        flights.into_iter().filter_map(|f| self.add(f).then_some(())).count()
    }

    /// Stored flights from `from_code` to `to_code` departing on `date`, in insertion order.
    pub fn find(&self, from_code: &str, to_code: &str, date: NaiveDate) -> Vec<Flight> {
        self.flights
            .iter()
            .filter(|f| {
                f.departure().code == from_code
                    && f.arrival().code == to_code
                    && f.departure_date() == date
            })
            .cloned()
            .collect()
    }

    pub fn flights(&self) -> &[Flight] {
        &self.flights
    }

    pub fn len(&self) -> usize {
        self.flights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flights.is_empty()
    }
}
