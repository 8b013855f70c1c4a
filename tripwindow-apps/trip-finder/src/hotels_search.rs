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

//! # Hotels Search
//!
//! [`HotelFinder`] answers hotel queries from the [`HotelStore`] when it can
//! and asks a [`HotelProvider`] otherwise. The Booking.com provider resolves
//! city names to destination ids through a persisted [`CityIdCache`].

use std::collections::BTreeMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::api_client::ApiClient;
use crate::error::{Result, TripError};
use crate::flights_gateway::DEFAULT_CURRENCY;
use crate::flights_query_builder::BOOKING_API_HOST;
use crate::hotels_query_builder::{HotelSearchParams, destination_search_url};
use crate::hotels_results_parser::{Destination, parse_destinations, parse_hotels};
use crate::hotels_store::HotelStore;
use crate::models::Hotel;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct HotelQuery {
    pub city: String,
    pub country: String,
    pub checkin_date: NaiveDate,
    pub checkout_date: NaiveDate,
    pub adults: u32,
    pub currency: String,
}

impl HotelQuery {
    pub fn new(
        city: impl Into<String>,
        country: impl Into<String>,
        checkin_date: NaiveDate,
        checkout_date: NaiveDate,
    ) -> Self {
        Self {
            city: city.into(),
            country: country.into(),
            checkin_date,
            checkout_date,
            adults: 2,
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }

    pub fn validate(&self, today: NaiveDate) -> Result<()> {
        if self.checkin_date <= today {
            return Err(TripError::invalid(format!(
                "check-in date {} must be in the future",
                self.checkin_date
            )));
        }
        if self.checkout_date <= self.checkin_date {
            return Err(TripError::invalid(format!(
                "check-out date {} must be after check-in date {}",
                self.checkout_date, self.checkin_date
            )));
        }
        if self.adults < 1 {
            return Err(TripError::invalid("at least one adult is required"));
        }
        Ok(())
    }
}

/// A live hotel source.
pub trait HotelProvider: Send + Sync + 'static {
    fn fetch_hotels(
        &self,
        query: &HotelQuery,
    ) -> impl Future<Output = anyhow::Result<Vec<Hotel>>> + Send;

    fn is_live(&self) -> bool {
        true
    }
}

/// City name to provider destination id, persisted as a JSON object.
#[derive(Debug, Default)]
pub struct CityIdCache {
    path: Option<PathBuf>,
    ids: Mutex<BTreeMap<String, String>>,
}

impl CityIdCache {
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let ids = match tokio::fs::read_to_string(&path).await {
            Ok(text) => serde_json::from_str(&text)
                .with_context(|| format!("Malformed city id cache {}", path.display()))
                .map_err(TripError::Storage)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(TripError::Storage(
                    anyhow::Error::new(e).context(format!("Read {}", path.display())),
                ));
            }
        };
        Ok(Self {
            path: Some(path),
            ids: Mutex::new(ids),
        })
    }

    pub async fn get(&self, city: &str) -> Option<String> {
        self.ids.lock().await.get(city).cloned()
    }

    /// The cached id for `city`, or the first `city` row returned by `search`.
    /// Newly learned ids are written back.
    pub async fn resolve<F, Fut>(&self, city: &str, search: F) -> Result<String>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = anyhow::Result<Vec<Destination>>>,
    {
        if let Some(id) = self.get(city).await {
            return Ok(id);
        }

        let rows = search(city.to_string()).await.map_err(TripError::from_lookup)?;
        let id = rows
            .into_iter()
            .find(|row| row.search_type == "city")
            .map(|row| row.dest_id)
            .ok_or_else(|| TripError::NotFound(format!("city '{city}'")))?;
        tracing::debug!("Resolved city {} to destination {}", city, id);

        let mut ids = self.ids.lock().await;
        ids.insert(city.to_string(), id.clone());
        if let Some(path) = &self.path {
            let json = serde_json::to_string(&*ids)
                .context("Serialize city ids")
                .map_err(TripError::Storage)?;
            if let Err(e) = tokio::fs::write(path, json).await {
                tracing::warn!("Could not persist city ids to {}: {e}", path.display());
            }
        }
        Ok(id)
    }
}

#[derive(Clone)]
pub struct BookingHotelsClient {
    api: ApiClient,
    city_ids: Arc<CityIdCache>,
}

impl BookingHotelsClient {
    pub fn new(api: ApiClient, city_ids: CityIdCache) -> Self {
        Self {
            api,
            city_ids: Arc::new(city_ids),
        }
    }

    pub async fn search_destination(&self, city: &str) -> anyhow::Result<Vec<Destination>> {
        let body = self
            .api
            .get_rapidapi(&destination_search_url(city), BOOKING_API_HOST)
            .await?;
        parse_destinations(&body)
    }
}

impl HotelProvider for BookingHotelsClient {
    async fn fetch_hotels(&self, query: &HotelQuery) -> anyhow::Result<Vec<Hotel>> {
        let dest_id = self
            .city_ids
            .resolve(&query.city, |city| async move { self.search_destination(&city).await })
            .await?;

        let params = HotelSearchParams {
            dest_id,
            checkin_date: query.checkin_date,
            checkout_date: query.checkout_date,
            adults: query.adults,
            currency: query.currency.clone(),
        };
        params.validate().context("Invalid search parameters")?;

        let url = params.search_url();
        tracing::debug!("🔗 Booking.com hotels URL: {}", url);
        let body = self.api.get_rapidapi(&url, BOOKING_API_HOST).await?;
        parse_hotels(&body, &query.city, &query.country)
    }
}

/// Provider for cache-only runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineHotels;

impl HotelProvider for OfflineHotels {
    async fn fetch_hotels(&self, _query: &HotelQuery) -> anyhow::Result<Vec<Hotel>> {
        Ok(Vec::new())
    }

    fn is_live(&self) -> bool {
        false
    }
}

pub struct HotelFinder<P> {
    store: Mutex<HotelStore>,
    provider: P,
    today: fn() -> NaiveDate,
}

impl<P: HotelProvider> HotelFinder<P> {
    pub fn new(store: HotelStore, provider: P) -> Self {
        Self {
            store: Mutex::new(store),
            provider,
            today: || chrono::Local::now().date_naive(),
        }
    }

    pub fn with_today(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn into_store(self) -> HotelStore {
        self.store.into_inner()
    }

    /// Offers covering the requested stay, cheapest first.
    pub async fn search_hotels(&self, query: &HotelQuery) -> Result<Vec<Hotel>> {
        query.validate((self.today)())?;

        let mut hotels = self.store.lock().await.find(
            query.checkin_date,
            query.checkout_date,
            Some(&query.city),
            Some(&query.country),
        );

        if hotels.is_empty() && self.provider.is_live() {
            hotels = self
                .provider
                .fetch_hotels(query)
                .await
                .map_err(TripError::from_lookup)?;
            tracing::info!(
                "Fetched {} hotels in {} for {} → {}",
                hotels.len(),
                query.city,
                query.checkin_date,
                query.checkout_date
            );
            let mut store = self.store.lock().await;
            store.extend(hotels.iter().cloned());
            if let Err(e) = store.save().await {
                tracing::warn!("Could not persist hotel store: {e}");
            }
        } else {
            tracing::debug!("{} cached hotels in {}", hotels.len(), query.city);
        }

        hotels.sort_by(|a, b| a.price().total_cmp(&b.price()));
        Ok(hotels)
    }
}
