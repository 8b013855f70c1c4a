//! Tripwindow Query Queues
//! Copyright (c) 2026 Mamy Ratsimbazafy
//! Licensed and distributed under either of
//!   * MIT license (license terms at the root of the package or at http://opensource.org/licenses/MIT).
//!   * Apache v2 license (license terms at the root of the package or at http://www.apache.org/licenses/LICENSE-2.0).
//! at your option. This file may not be copied, modified, or distributed except according to those terms.

//! tripwindow-internals/query-queues
//! A bounded work queue for external service calls.
//!
//! - a concurrency limit shared by every clone of the queue,
//! - optional requests-per-second pacing (token bucket),
//! - exponential backoff with jitter for calls that opt into retries.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use thiserror::Error;
use tokio::sync::{Mutex, Semaphore};
use tokio::time::{self, Instant};

#[derive(Debug, Error)]
pub enum QueryQueueError {
    #[error("max retries exceeded after {attempts} attempts: {source}")]
    MaxRetriesExceeded {
        attempts: u32,
        #[source]
        source: anyhow::Error,
    },
    #[error("queue is closed")]
    QueueClosed,
}

/// Backoff settings applied by [`QueryQueue::with_retry`].
#[derive(Clone, Debug)]
pub struct RetryPolicy {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    /// Fraction of the current delay added as random jitter (0.0 disables jitter).
    pub jitter_factor: f64,
    /// Number of retries after the first attempt.
    pub max_retries: u32,
    pub exponential: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(30),
            jitter_factor: 0.5,
            max_retries: 3,
            exponential: true,
        }
    }
}

impl RetryPolicy {
    /// A policy that gives up on the first failure.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    fn jittered(&self, delay: Duration) -> Duration {
        if self.jitter_factor <= 0.0 {
            return delay;
        }
        let jitter_ms = (delay.as_millis() as f64 * self.jitter_factor) as u64;
        let extra = rand::thread_rng().gen_range(0..=jitter_ms);
        delay + Duration::from_millis(extra)
    }

    fn next_delay(&self, delay: Duration) -> Duration {
        if self.exponential {
            (delay * 2).min(self.max_delay)
        } else {
            delay
        }
    }
}

const NANOS_PER_SEC: u64 = 1_000_000_000;

#[derive(Debug)]
struct TokenBucket {
    capacity: u64,
    tokens: u64,
    refilled_at: Instant,
}

impl TokenBucket {
    fn full(capacity: u64) -> Self {
        Self {
            capacity,
            tokens: capacity,
            refilled_at: Instant::now(),
        }
    }

    /// Takes one token, or returns how long to wait before the next one exists.
    fn try_take(&mut self, now: Instant) -> Result<(), Duration> {
        let per_token_nanos = (NANOS_PER_SEC / self.capacity.max(1)).max(1);
        let per_token = Duration::from_nanos(per_token_nanos);
        let elapsed = now.saturating_duration_since(self.refilled_at);
        let earned =
            u64::try_from(elapsed.as_nanos() / u128::from(per_token_nanos)).unwrap_or(u64::MAX);
        if earned > 0 {
            self.tokens = self.tokens.saturating_add(earned).min(self.capacity);
            if self.tokens == self.capacity {
                self.refilled_at = now;
            } else {
                self.refilled_at += Duration::from_nanos(per_token_nanos.saturating_mul(earned));
            }
        }
        if self.tokens > 0 {
            self.tokens -= 1;
            Ok(())
        } else {
            Err(per_token.saturating_sub(now.saturating_duration_since(self.refilled_at)))
        }
    }
}

#[derive(Clone, Debug, Default)]
enum Pacing {
    #[default]
    Unpaced,
    PerSecond(Arc<Mutex<TokenBucket>>),
}

/// A work queue that bounds concurrent calls to an external service.
///
/// Clones share the same permits and pacing state.
///
/// # Examples
///
/// Concurrency only (4 concurrent requests):
/// ```ignore
/// let queue = QueryQueue::with_concurrency_limit(4);
/// ```
///
/// QPS limit (2 requests per second):
/// ```ignore
/// let queue = QueryQueue::with_qps_limit(2);
/// ```
#[derive(Clone, Debug)]
pub struct QueryQueue {
    permits: Arc<Semaphore>,
    limit: usize,
    retry: RetryPolicy,
    pacing: Pacing,
}

impl Default for QueryQueue {
    fn default() -> Self {
        Self::with_concurrency_limit(4)
    }
}

impl QueryQueue {
    /// Allow at most `max_concurrent` calls in flight (minimum 1).
    pub fn with_concurrency_limit(max_concurrent: u64) -> Self {
        let limit = usize::try_from(max_concurrent)
            .unwrap_or(usize::MAX)
            .clamp(1, Semaphore::MAX_PERMITS);
        Self {
            permits: Arc::new(Semaphore::new(limit)),
            limit,
            retry: RetryPolicy::default(),
            pacing: Pacing::Unpaced,
        }
    }

    /// Allow at most `qps_limit` calls to start per second (minimum 1).
    /// The same number bounds concurrency.
    pub fn with_qps_limit(qps_limit: u64) -> Self {
        let qps_limit = qps_limit.max(1);
        Self {
            pacing: Pacing::PerSecond(Arc::new(Mutex::new(TokenBucket::full(qps_limit)))),
            ..Self::with_concurrency_limit(qps_limit)
        }
    }

    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn concurrency_limit(&self) -> usize {
        self.limit
    }

    async fn take_token(&self) {
        let Pacing::PerSecond(bucket) = &self.pacing else {
            return;
        };
        loop {
            let wait = match bucket.lock().await.try_take(Instant::now()) {
                Ok(()) => return,
                Err(wait) => wait,
            };
            time::sleep(wait.max(Duration::from_millis(1))).await;
        }
    }

    /// Run `fut` once under the queue's concurrency and pacing limits.
    ///
    /// Errors produced by `fut` are returned untouched inside `Ok`.
    pub async fn run<T, Fut>(&self, fut: Fut) -> Result<T, QueryQueueError>
    where
        Fut: Future<Output = T>,
    {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| QueryQueueError::QueueClosed)?;
        self.take_token().await;
        Ok(fut.await)
    }

    /// Execute `f` under the queue limits, retrying failures with backoff and jitter.
    ///
    /// The permit is held across retries; pacing applies to every attempt.
    pub async fn with_retry<T, F, Fut>(&self, mut f: F) -> Result<T, QueryQueueError>
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = Result<T, anyhow::Error>> + Send,
    {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| QueryQueueError::QueueClosed)?;

        let mut attempts = 0;
        let mut delay = self.retry.initial_delay;
        loop {
            self.take_token().await;
            attempts += 1;
            match f().await {
                Ok(value) => return Ok(value),
                Err(source) if attempts > self.retry.max_retries => {
                    return Err(QueryQueueError::MaxRetriesExceeded { attempts, source });
                }
                Err(_) => {
                    time::sleep(self.retry.jittered(delay)).await;
                    delay = self.retry.next_delay(delay);
                }
            }
        }
    }

    /// Stop handing out permits; pending and future calls fail with `QueueClosed`.
    pub fn close(&self) {
        self.permits.close();
    }
}
