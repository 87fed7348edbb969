//! Request throttling and deduplication.
//!
//! Every outbound call goes through one global lane and starts no earlier
//! than `min_delay` after the previous call finished. Callers asking for a
//! signature that is already in flight await that call instead of issuing a
//! new one.

use super::cache::CacheKey;
use crate::error::ApiError;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, warn};

type SharedCall<T> = Shared<BoxFuture<'static, Result<T, ApiError>>>;
type InFlight<T> = Arc<Mutex<HashMap<CacheKey, SharedCall<T>>>>;

fn lock<T>(in_flight: &Mutex<T>) -> MutexGuard<'_, T> {
    in_flight.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Clears the in-flight registration however the call ends.
struct Registration<T> {
    in_flight: InFlight<T>,
    key: CacheKey,
}

impl<T> Drop for Registration<T> {
    fn drop(&mut self) {
        lock(&self.in_flight).remove(&self.key);
    }
}

pub struct RequestThrottler<T> {
    in_flight: InFlight<T>,
    /// Completion instant of the last outbound call
    lane: Arc<tokio::sync::Mutex<Option<Instant>>>,
    min_delay: Duration,
    issued: AtomicU64,
    joined: AtomicU64,
}

impl<T> RequestThrottler<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(min_delay: Duration) -> Self {
        Self {
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            lane: Arc::new(tokio::sync::Mutex::new(None)),
            min_delay,
            issued: AtomicU64::new(0),
            joined: AtomicU64::new(0),
        }
    }

    pub fn min_delay(&self) -> Duration {
        self.min_delay
    }

    /// Run `operation` for `key`, or join the call already in flight for it.
    ///
    /// Once the lane is free, `cached` gets a chance to answer without the
    /// network. Such an answer neither waits out `min_delay` nor counts as a
    /// completed call for spacing purposes.
    ///
    /// Dispatched calls run to completion on the runtime even if every
    /// caller stops waiting, so the lane is never left held.
    pub async fn run<C, F, Fut>(&self, key: &CacheKey, cached: C, operation: F) -> Result<T, ApiError>
    where
        C: FnOnce() -> Option<T> + Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        let call = {
            let mut in_flight = lock(&self.in_flight);
            match in_flight.get(key) {
                Some(existing) => {
                    self.joined.fetch_add(1, Ordering::Relaxed);
                    debug!(key = %key, "Joining in-flight request");
                    existing.clone()
                }
                None => {
                    self.issued.fetch_add(1, Ordering::Relaxed);
                    let call = self.dispatch(key.clone(), cached, operation);
                    in_flight.insert(key.clone(), call.clone());
                    call
                }
            }
        };

        call.await
    }

    fn dispatch<C, F, Fut>(&self, key: CacheKey, cached: C, operation: F) -> SharedCall<T>
    where
        C: FnOnce() -> Option<T> + Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        let registration = Registration {
            in_flight: self.in_flight.clone(),
            key,
        };
        let lane = self.lane.clone();
        let min_delay = self.min_delay;

        let handle = tokio::spawn(async move {
            let registration = registration;
            let mut last_finished = lane.lock().await;

            if let Some(hit) = cached() {
                debug!(key = %registration.key, "Answered from cache while queued");
                return Ok(hit);
            }

            if let Some(previous) = *last_finished {
                let ready_at = previous + min_delay;
                if ready_at > Instant::now() {
                    debug!(
                        key = %registration.key,
                        wait_ms = (ready_at - Instant::now()).as_millis() as u64,
                        "Throttling request"
                    );
                    sleep_until(ready_at).await;
                }
            }

            let result = operation().await;
            *last_finished = Some(Instant::now());
            result
        });

        async move {
            handle.await.unwrap_or_else(|e| {
                warn!("Odds request task failed: {}", e);
                Err(ApiError::Connection(format!("request task failed: {}", e)))
            })
        }
        .boxed()
        .shared()
    }

    /// Calls actually dispatched.
    pub fn issued(&self) -> u64 {
        self.issued.load(Ordering::Relaxed)
    }

    /// Callers that joined an existing call.
    pub fn joined(&self) -> u64 {
        self.joined.load(Ordering::Relaxed)
    }

    pub fn in_flight(&self) -> usize {
        lock(&self.in_flight).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn key(name: &str) -> CacheKey {
        CacheKey::new(name, &[])
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_identical_requests_collapse() {
        let throttler = RequestThrottler::<u32>::new(Duration::from_millis(1200));
        let calls = Arc::new(AtomicUsize::new(0));

        let make = |calls: Arc<AtomicUsize>| {
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(100)).await;
                Ok::<u32, ApiError>(7)
            }
        };

        let k = key("/soccer_epl/odds");
        let (a, b, c) = tokio::join!(
            throttler.run(&k, || None, make(calls.clone())),
            throttler.run(&k, || None, make(calls.clone())),
            throttler.run(&k, || None, make(calls.clone())),
        );

        assert_eq!((a, b, c), (Ok(7), Ok(7), Ok(7)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(throttler.issued(), 1);
        assert_eq!(throttler.joined(), 2);
        assert_eq!(throttler.in_flight(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_are_shared_and_unregistered() {
        let throttler = RequestThrottler::<u32>::new(Duration::from_millis(1200));
        let k = key("/");

        let (a, b) = tokio::join!(
            throttler.run(&k, || None, || async { Err::<u32, ApiError>(ApiError::RateLimited) }),
            throttler.run(&k, || None, || async { Ok::<u32, ApiError>(1) }),
        );
        assert_eq!(a, Err(ApiError::RateLimited));
        assert_eq!(b, Err(ApiError::RateLimited));
        assert_eq!(throttler.in_flight(), 0);

        // A later call for the same key is dispatched again
        assert_eq!(throttler.run(&k, || None, || async { Ok::<u32, ApiError>(2) }).await, Ok(2));
        assert_eq!(throttler.issued(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_distinct_requests_are_spaced() {
        let throttler = RequestThrottler::<Instant>::new(Duration::from_millis(1200));
        let start = Instant::now();

        let (key_a, key_b) = (key("/a"), key("/b"));
        let (a, b) = tokio::join!(
            throttler.run(&key_a, || None, || async { Ok::<Instant, ApiError>(Instant::now()) }),
            throttler.run(&key_b, || None, || async { Ok::<Instant, ApiError>(Instant::now()) }),
        );
        let (a, b) = (a.unwrap(), b.unwrap());
        let (first, second) = if a <= b { (a, b) } else { (b, a) };

        assert_eq!(first, start);
        assert!(second - first >= Duration::from_millis(1200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_call_after_idle_period_is_not_delayed() {
        let throttler = RequestThrottler::<Instant>::new(Duration::from_millis(1200));
        throttler
            .run(&key("/a"), || None, || async { Ok::<Instant, ApiError>(Instant::now()) })
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(5)).await;
        let before = Instant::now();
        let at = throttler
            .run(&key("/b"), || None, || async { Ok::<Instant, ApiError>(Instant::now()) })
            .await
            .unwrap();
        assert_eq!(at, before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_queued_cache_answer_skips_the_delay() {
        let throttler = RequestThrottler::<Instant>::new(Duration::from_millis(1200));
        let first = throttler
            .run(&key("/a"), || None, || async { Ok::<Instant, ApiError>(Instant::now()) })
            .await
            .unwrap();

        let before = Instant::now();
        let network = Arc::new(AtomicUsize::new(0));
        let counter = network.clone();
        let answered = throttler
            .run(
                &key("/b"),
                move || Some(before),
                move || async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok::<Instant, ApiError>(Instant::now())
                },
            )
            .await
            .unwrap();
        assert_eq!(answered, before);
        assert_eq!(Instant::now(), before);
        assert_eq!(network.load(Ordering::SeqCst), 0);

        // Spacing is still measured from the last real call
        let third = throttler
            .run(&key("/c"), || None, || async { Ok::<Instant, ApiError>(Instant::now()) })
            .await
            .unwrap();
        assert_eq!(third, first + Duration::from_millis(1200));
    }
}
