//! Rate limiter initialization.
//!
//! Token bucket guarding outbound provider requests so a burst of new
//! endpoints does not exhaust the free tier of a geolocation provider.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::time::{interval, Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Token-bucket rate limiter.
///
/// Tokens are replenished by a background task at `rps` per second, never
/// beyond `capacity`. Each [`RateLimiter::acquire`] consumes one token.
pub struct RateLimiter {
    permits: Arc<Semaphore>,
    capacity: usize,
}

impl RateLimiter {
    /// Waits for and consumes one token.
    pub async fn acquire(&self) {
        if let Ok(permit) = self.permits.acquire().await {
            permit.forget();
        }
    }

    /// Tokens currently available.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Bucket size.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Initializes a token-bucket rate limiter.
///
/// Returns `None` when `rps` is 0 (limiting disabled). Otherwise returns the
/// limiter and a token that stops the replenishment task when cancelled.
pub fn init_rate_limiter(rps: u32, burst: usize) -> Option<(Arc<RateLimiter>, CancellationToken)> {
    if rps == 0 {
        return None;
    }
    let capacity = burst.max(1);
    let shutdown = CancellationToken::new();
    let shutdown_clone = shutdown.clone();

    let limiter = Arc::new(RateLimiter {
        permits: Arc::new(Semaphore::new(capacity)),
        capacity,
    });

    let permits = Arc::clone(&limiter.permits);
    let mut ticker = interval(Duration::from_millis(100));
    tokio::spawn(async move {
        let mut last_time = Instant::now();
        let mut fractional_permits = 0.0f64;
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let now = Instant::now();
                    let elapsed = now.duration_since(last_time);
                    last_time = now;

                    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                    let due = {
                        let total = f64::from(rps) * elapsed.as_secs_f64() + fractional_permits;
                        let whole = total.floor();
                        fractional_permits = total - whole;
                        whole as usize
                    };

                    let room = capacity.saturating_sub(permits.available_permits());
                    let to_add = due.min(room);
                    if to_add > 0 {
                        permits.add_permits(to_add);
                    }
                    if room == 0 {
                        fractional_permits = 0.0;
                    }
                }
                _ = shutdown_clone.cancelled() => {
                    log::debug!("Rate limiter background task shutting down");
                    break;
                }
            }
        }
    });

    Some((limiter, shutdown))
}
