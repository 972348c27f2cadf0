use super::{PageResult, RenderedPage};
use std::ops::{Deref, DerefMut};
use tracing::{debug, warn};

/// Owns the one browser session of a run and makes sure it gets closed.
///
/// `close` is the normal way out and reports failures. If the guard is
/// dropped without it (early `?` return, panic unwinding) the session is
/// closed from `Drop` and a failure is only logged.
pub struct BrowserSession<P: RenderedPage> {
    page: P,
    closed: bool,
}

impl<P: RenderedPage> BrowserSession<P> {
    pub fn new(page: P) -> Self {
        Self {
            page,
            closed: false,
        }
    }

    pub fn close(mut self) -> PageResult<()> {
        self.closed = true;
        debug!("closing browser session");
        self.page.close()
    }
}

impl<P: RenderedPage> Deref for BrowserSession<P> {
    type Target = P;

    fn deref(&self) -> &P {
        &self.page
    }
}

impl<P: RenderedPage> DerefMut for BrowserSession<P> {
    fn deref_mut(&mut self) -> &mut P {
        &mut self.page
    }
}

impl<P: RenderedPage> Drop for BrowserSession<P> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        debug!("closing browser session on early exit");
        if let Err(e) = self.page.close() {
            warn!("⚠️ Failed to close browser session: {e}");
        }
    }
}
