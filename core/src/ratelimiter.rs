use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

/// Global probe-launch pacing shared by all worker tasks.
///
/// Permits are refilled by a background task and never accumulate past `burst`,
/// so an idle period does not turn into a connection storm afterwards.
/// Must be created inside a tokio runtime.
pub struct RateLimiter {
    sem: Arc<Semaphore>,
    refill: Arc<JoinHandle<()>>,
}

impl Clone for RateLimiter {
    fn clone(&self) -> Self { RateLimiter { sem: self.sem.clone(), refill: self.refill.clone() } }
}

impl RateLimiter {
    pub fn new(tokens_per_sec: u32) -> Self {
        Self::with_burst(tokens_per_sec, tokens_per_sec.clamp(1, 64) as usize)
    }

    pub fn with_burst(tokens_per_sec: u32, burst: usize) -> Self {
        let sem = Arc::new(Semaphore::new(0));
        let sem_bg = sem.clone();
        let burst = burst.max(1);
        let interval_us = 1_000_000u64 / tokens_per_sec.max(1) as u64;
        let refill = tokio::spawn(async move {
            let mut t = tokio::time::interval(Duration::from_micros(interval_us.max(1)));
            t.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                t.tick().await;
                if sem_bg.available_permits() < burst {
                    sem_bg.add_permits(1);
                }
            }
        });
        RateLimiter { sem, refill: Arc::new(refill) }
    }

    pub async fn acquire(&self) {
        if let Ok(permit) = self.sem.acquire().await {
            permit.forget();
        }
    }
}

impl Drop for RateLimiter {
    fn drop(&mut self) {
        // last clone stops the refill task
        if Arc::strong_count(&self.refill) == 1 {
            self.refill.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hands_out_permits() {
        let rl = RateLimiter::new(1000);
        let res = tokio::time::timeout(Duration::from_secs(2), async {
            for _ in 0..5 { rl.acquire().await; }
        }).await;
        assert!(res.is_ok());
    }

    #[tokio::test]
    async fn burst_is_capped() {
        let rl = RateLimiter::with_burst(1000, 3);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(rl.sem.available_permits() <= 3);
    }
}
