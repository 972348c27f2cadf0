use crate::config::DelayBounds;
use rand::Rng;
use std::time::Duration;
use tracing::debug;

/// Randomised pause between result pages, to keep the request rate polite.
#[derive(Debug, Clone, Copy)]
pub struct Throttle {
    min: f64,
    max: f64,
}

impl Throttle {
    pub fn new(bounds: DelayBounds) -> Self {
        Self {
            min: bounds.min.max(0.0),
            max: bounds.max.max(bounds.min).max(0.0),
        }
    }

    pub fn next_delay(&self) -> Duration {
        if self.max <= 0.0 {
            return Duration::ZERO;
        }
        let secs = if self.min >= self.max {
            self.max
        } else {
            rand::thread_rng().gen_range(self.min..=self.max)
        };
        Duration::try_from_secs_f64(secs).unwrap_or_default()
    }

    /// Sleeps for one random delay and returns how long it was.
    pub fn pause(&self) -> Duration {
        let delay = self.next_delay();
        if !delay.is_zero() {
            debug!("💤 Waiting {:.1}s before the next page", delay.as_secs_f64());
            std::thread::sleep(delay);
        }
        delay
    }
}
