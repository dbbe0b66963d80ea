// Token-bucket admission control for the HTTP surface

use std::time::Instant;

use tokio::sync::Mutex;

/// Token bucket guarding the sale endpoints. Tokens refill at a sustained
/// rate up to the burst capacity; each request consumes one. The lock is held
/// only for the refill computation, never across I/O.
pub struct TokenBucket {
    rate_per_sec: f64,
    burst: f64,
    state: Mutex<BucketState>,
}

struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    pub fn new(rate_per_sec: u64, burst: u64) -> Self {
        Self {
            rate_per_sec: rate_per_sec as f64,
            burst: burst as f64,
            state: Mutex::new(BucketState {
                tokens: burst as f64,
                last_refill: Instant::now(),
            }),
        }
    }

    /// Takes one token, returning false when the bucket is empty.
    pub async fn try_acquire(&self) -> bool {
        let mut state = self.state.lock().await;

        let now = Instant::now();
        let elapsed = now.duration_since(state.last_refill).as_secs_f64();
        state.tokens = (state.tokens + elapsed * self.rate_per_sec).min(self.burst);
        state.last_refill = now;

        if state.tokens >= 1.0 {
            state.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn burst_is_admitted_then_denied() {
        let bucket = TokenBucket::new(1, 3);
        assert!(bucket.try_acquire().await);
        assert!(bucket.try_acquire().await);
        assert!(bucket.try_acquire().await);
        assert!(!bucket.try_acquire().await);
    }

    #[tokio::test]
    async fn tokens_refill_over_time() {
        let bucket = TokenBucket::new(100, 2);
        assert!(bucket.try_acquire().await);
        assert!(bucket.try_acquire().await);
        assert!(!bucket.try_acquire().await);

        // 100 tokens/sec means ~5 tokens accrue over 50ms
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(bucket.try_acquire().await);
    }

    #[tokio::test]
    async fn refill_never_exceeds_burst() {
        let bucket = TokenBucket::new(1_000_000, 2);
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(bucket.try_acquire().await);
        assert!(bucket.try_acquire().await);
        assert!(!bucket.try_acquire().await);
    }
}
