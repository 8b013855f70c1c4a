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

//! # Airports
//!
//! Resolve IATA codes to airports. A small table ships with the crate,
//! a larger one can be loaded from a JSON file of the same shape.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use once_cell::sync::Lazy;

use crate::error::{Result, TripError};
use crate::models::Airport;

static BUNDLED: Lazy<AirportDirectory> = Lazy::new(|| {
    AirportDirectory::from_json_str(include_str!("../data/airports.json"))
        .expect("bundled airport table is valid")
});

#[derive(Debug, Clone, Default)]
pub struct AirportDirectory {
    by_code: BTreeMap<String, Airport>,
}

impl AirportDirectory {
    /// The table shipped with the crate.
    pub fn bundled() -> &'static AirportDirectory {
        &BUNDLED
    }

    pub fn from_airports(airports: impl IntoIterator<Item = Airport>) -> Self {
        let by_code = airports
            .into_iter()
            .map(|mut a| {
                a.code = a.code.trim().to_ascii_uppercase();
                (a.code.clone(), a)
            })
            .collect();
        Self { by_code }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let airports: Vec<Airport> = serde_json::from_str(json)
            .map_err(|e| TripError::invalid(format!("airport table: {e}")))?;
        Ok(Self::from_airports(airports))
    }

    pub async fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Read airport table {}", path.display()))
            .map_err(TripError::Storage)?;
        Self::from_json_str(&text)
    }

    /// Case-insensitive lookup by IATA code.
    pub fn lookup_airport(&self, code: &str) -> Result<Airport> {
        let key = code.trim().to_ascii_uppercase();
        self.by_code
            .get(&key)
            .cloned()
            .ok_or_else(|| TripError::NotFound(format!("airport {key}")))
    }

    pub fn lookup_all(&self, codes: &[impl AsRef<str>]) -> Result<Vec<Airport>> {
        codes.iter().map(|c| self.lookup_airport(c.as_ref())).collect()
    }

    /// Every airport, ordered by code.
    pub fn all(&self) -> impl Iterator<Item = &Airport> {
        self.by_code.values()
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }
}
