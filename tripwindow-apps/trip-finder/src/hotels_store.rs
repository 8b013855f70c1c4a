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

//! # Hotel Store
//!
//! Hotel offers seen in earlier runs, persisted as a JSON list.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;

use crate::error::{Result, TripError};
use crate::models::Hotel;

#[derive(Debug, Default)]
pub struct HotelStore {
    path: Option<PathBuf>,
    hotels: Vec<Hotel>,
    dirty: bool,
}

impl HotelStore {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load the store at `path`. A missing file yields an empty store bound to `path`.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let hotels = match tokio::fs::read_to_string(&path).await {
            Ok(text) => serde_json::from_str::<Vec<Hotel>>(&text)
                .with_context(|| format!("Malformed hotel store {}", path.display()))
                .map_err(TripError::Storage)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                return Err(TripError::Storage(
                    anyhow::Error::new(e).context(format!("Read {}", path.display())),
                ));
            }
        };
        tracing::info!("Loaded {} hotels from {}", hotels.len(), path.display());
        Ok(Self {
            path: Some(path),
            hotels,
            dirty: false,
        })
    }

    pub async fn save(&mut self) -> Result<()> {
        let (Some(path), true) = (&self.path, self.dirty) else {
            return Ok(());
        };
        let json = serde_json::to_string(&self.hotels)
            .context("Serialize hotels")
            .map_err(TripError::Storage)?;
        tokio::fs::write(path, json)
            .await
            .with_context(|| format!("Write {}", path.display()))
            .map_err(TripError::Storage)?;
        self.dirty = false;
        Ok(())
    }

    pub fn add(&mut self, hotel: Hotel) -> bool {
        if self.hotels.contains(&hotel) {
            return false;
        }
        self.hotels.push(hotel);
        self.dirty = true;
        true
    }

    pub fn extend(&mut self, hotels: impl IntoIterator<Item = Hotel>) -> usize {
        hotels.into_iter().filter_map(|h| self.add(h).then_some(())).count()
    }

    /// Stored offers whose stay covers `checkin..checkout`, optionally restricted
    /// to a city and country.
    pub fn find(
        &self,
        checkin: NaiveDate,
        checkout: NaiveDate,
        city: Option<&str>,
        country: Option<&str>,
    ) -> Vec<Hotel> {
        self.hotels
            .iter()
            .filter(|h| h.checkin_date() <= checkin && h.checkout_date() >= checkout)
            .filter(|h| city.is_none_or(|c| h.city() == c))
            .filter(|h| country.is_none_or(|c| h.country() == c))
            .cloned()
            .collect()
    }

    pub fn hotels(&self) -> &[Hotel] {
        &self.hotels
    }

    pub fn len(&self) -> usize {
        self.hotels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hotels.is_empty()
    }
}
