// scraper/readiness.rs
use super::extract::locate;
use super::selectors::{FieldQuery, Layout};
use crate::browser::{PageResult, RenderedPage};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Calls `probe` until it yields a value or `timeout` runs out.
/// The probe always runs at least once, even with a zero timeout. A timeout
/// too large to represent as an instant never expires.
pub fn poll_until<T>(
    timeout: Duration,
    mut probe: impl FnMut() -> PageResult<Option<T>>,
) -> PageResult<Option<T>> {
    let deadline = Instant::now().checked_add(timeout);
    loop {
        if let Some(value) = probe()? {
            return Ok(Some(value));
        }
        let pause = match deadline {
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    return Ok(None);
                }
                POLL_INTERVAL.min(deadline - now)
            }
            None => POLL_INTERVAL,
        };
        thread::sleep(pause);
    }
}

// While the page is still settling, a handle can go stale between lookup
// and use. That only means "not yet".
fn stale_as_absent<T>(result: PageResult<Option<T>>) -> PageResult<Option<T>> {
    match result {
        Err(e) if e.is_stale() => Ok(None),
        other => other,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadinessOutcome {
    Ready,
    Interstitial,
    TimedOut,
}

pub struct ReadinessGate<'a> {
    layout: &'a Layout,
    timeout: Duration,
}

impl<'a> ReadinessGate<'a> {
    pub fn new(layout: &'a Layout, timeout: Duration) -> Self {
        Self { layout, timeout }
    }

    /// Waits until result cards show up, or (with `watch_interstitial`) a
    /// consent prompt does.
    pub fn await_ready<P: RenderedPage>(&self, page: &mut P, watch_interstitial: bool) -> PageResult<ReadinessOutcome> {
        let outcome = poll_until(self.timeout, || {
            if watch_interstitial && stale_as_absent(locate(page, &self.layout.consent, None))?.is_some() {
                return Ok(Some(ReadinessOutcome::Interstitial));
            }
            if !page.find_all(&self.layout.listing_root, None)?.is_empty() {
                return Ok(Some(ReadinessOutcome::Ready));
            }
            Ok(None)
        })?;
        Ok(outcome.unwrap_or(ReadinessOutcome::TimedOut))
    }

    /// Clicks the consent prompt if one is showing. Failures are logged and
    /// otherwise ignored; returns whether a prompt was dismissed.
    pub fn dismiss_interstitial<P: RenderedPage>(&self, page: &mut P) -> bool {
        let found = match locate(page, &self.layout.consent, None) {
            Ok(Some((node, _))) => node,
            Ok(None) => return false,
            Err(e) => {
                debug!("consent lookup failed: {e}");
                return false;
            }
        };
        match page.click(&found) {
            Ok(()) => {
                info!("🍪 Accepted cookies");
                true
            }
            Err(e) => {
                warn!("⚠️ Could not dismiss consent prompt: {e}");
                false
            }
        }
    }

    /// Waits for an element matching `query` that is present and clickable.
    pub fn await_clickable<P: RenderedPage>(&self, page: &mut P, query: &FieldQuery) -> PageResult<Option<P::Node>> {
        poll_until(self.timeout, || stale_as_absent(clickable(page, query)))
    }
}

fn clickable<P: RenderedPage>(page: &mut P, query: &FieldQuery) -> PageResult<Option<P::Node>> {
    let Some((node, _)) = locate(page, query, None)? else {
        return Ok(None);
    };
    Ok(page.is_clickable(&node)?.then_some(node))
}
