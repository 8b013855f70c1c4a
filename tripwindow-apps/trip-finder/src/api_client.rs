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

//! # API Client
//!
//! Effectful (network) transport shared by the flight and hotel providers.
//! Requests go through a paced [`QueryQueue`]; transport errors, rate limits
//! and server errors are retried with backoff.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow, bail};
use tripwindow_query_queues::QueryQueue;
use wreq::redirect::Policy;
use wreq_util::Emulation;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_QUERIES_PER_SECOND: u32 = 2;

#[derive(Clone)]
pub struct ApiClient {
    client: Arc<wreq::Client>,
    query_queue: QueryQueue,
    rapidapi_key: Option<String>,
}

impl ApiClient {
    pub fn new(timeout_secs: u64, queries_per_second: u32, rapidapi_key: Option<String>) -> Result<Self> {
        let client = wreq::Client::builder()
            .emulation(Emulation::Safari18_5)
            .redirect(Policy::default())
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client: Arc::new(client),
            query_queue: QueryQueue::with_qps_limit(queries_per_second as u64),
            rapidapi_key: rapidapi_key.filter(|k| !k.trim().is_empty()),
        })
    }

    pub fn with_defaults(rapidapi_key: Option<String>) -> Result<Self> {
        Self::new(DEFAULT_TIMEOUT_SECS, DEFAULT_QUERIES_PER_SECOND, rapidapi_key)
    }

    pub fn has_rapidapi_key(&self) -> bool {
        self.rapidapi_key.is_some()
    }

    /// GET `url` and return the body of a successful response.
    pub async fn get_text(&self, url: &str) -> Result<String> {
        self.fetch(url, None).await
    }

    /// GET a RapidAPI endpoint served by `host`, authenticated with the configured key.
    pub async fn get_rapidapi(&self, url: &str, host: &str) -> Result<String> {
        let key = self
            .rapidapi_key
            .clone()
            .ok_or_else(|| anyhow!("RAPIDAPI_KEY is not set"))?;
        self.fetch(url, Some((key, host.to_string()))).await
    }

    async fn fetch(&self, url: &str, rapidapi: Option<(String, String)>) -> Result<String> {
        let client_inner = Arc::clone(&self.client);

        let queue_start = Instant::now();
        let response = self
            .query_queue
            .with_retry(move || {
                let url = url.to_string();
                let rapidapi = rapidapi.clone();
                let http_client = client_inner.clone();
                async move {
                    let http_start = Instant::now();
                    tracing::trace!("[fetch] Starting HTTP request to: {}", url);
                    let mut request = http_client.get(&url);
                    if let Some((key, host)) = rapidapi {
                        request = request
                            .header("x-rapidapi-key", key)
                            .header("x-rapidapi-host", host);
                    }
                    let resp = request.send().await?;
                    let status = resp.status();
                    if status.as_u16() == 429 || status.is_server_error() {
                        bail!("HTTP {} from {}", status, url);
                    }
                    tracing::trace!("[fetch] HTTP request completed in {:?}", http_start.elapsed());
                    Ok(resp)
                }
            })
            .await;
        tracing::debug!(
            "[fetch] Query queue + HTTP execution time: {:?}",
            queue_start.elapsed()
        );

        let response = response.context("Request failed")?;

        let status = response.status();
        tracing::debug!(
            "[fetch] HTTP Status: {} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown")
        );

        let body = response.text().await.context("Read body")?;
        if !status.is_success() {
            let body_preview = body.chars().take(500).collect::<String>();
            bail!("HTTP error {}: {}", status, body_preview);
        }
        Ok(body)
    }
}
