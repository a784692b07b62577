use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Bounded exponential backoff for upstream calls. No jitter and no overall
/// deadline; batch operations isolate failures per item rather than
/// retrying the whole batch.
#[derive(Clone, Debug)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(200),
            multiplier: 2,
        }
    }
}

impl RetryPolicy {
    pub async fn run<F, Fut, T, E>(&self, what: &str, mut op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let mut delay = self.initial_delay;
        let mut attempt = 1u32;
        loop {
            match op().await {
                Ok(v) => return Ok(v),
                Err(e) if attempt < self.max_attempts => {
                    log::warn!(
                        "{} failed (attempt {}/{}): {}, retrying in {:?}",
                        what,
                        attempt,
                        self.max_attempts,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    delay *= self.multiplier;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
