use std::time::Duration;

use log::debug;
use rand::Rng;

use crate::error::{Error, Result};

/// Random pause taken before every playlist insert so the video service
/// does not answer bursts of writes with 409s.
#[derive(Debug, Clone, Copy)]
pub struct Jitter {
    min_ms: u64,
    max_ms: u64,
}

impl Jitter {
    pub fn new(min_ms: u64, max_ms: u64) -> Result<Self> {
        if min_ms > max_ms {
            return Err(Error::Config(format!(
                "minimum delay ({min_ms} ms) is larger than maximum delay ({max_ms} ms)"
            )));
        }

        Ok(Self { min_ms, max_ms })
    }

    #[cfg(test)]
    pub fn none() -> Self {
        Self {
            min_ms: 0,
            max_ms: 0,
        }
    }

    pub fn next_delay(&self) -> Duration {
        Duration::from_millis(rand::rng().random_range(self.min_ms..=self.max_ms))
    }

    pub async fn wait(&self) {
        let delay = self.next_delay();
        debug!("Sleeping {delay:?} before next insert");
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_inverted_bounds() {
        assert!(matches!(Jitter::new(500, 100), Err(Error::Config(_))));
    }

    #[test]
    fn delay_stays_within_bounds() {
        let jitter = Jitter::new(10, 20).unwrap();
        for _ in 0..100 {
            let delay = jitter.next_delay();
            assert!(delay >= Duration::from_millis(10));
            assert!(delay <= Duration::from_millis(20));
        }
    }

    #[test]
    fn equal_bounds_are_fixed() {
        let jitter = Jitter::new(7, 7).unwrap();
        assert_eq!(jitter.next_delay(), Duration::from_millis(7));
    }
}
