// scraper.rs
use crate::browser::{BrowserSession, PageError, RenderedPage};
use crate::config::Config;
use crate::domain::Listing;
use crate::output;
use crate::scraper::extract::PageReader;
use crate::scraper::readiness::{ReadinessGate, ReadinessOutcome};
use crate::scraper::search::{search_url, site_origin};
use crate::scraper::throttle::Throttle;
use crate::scraper::ScrapeError;
use std::path::PathBuf;
use tracing::{info, warn};
use url::Url;

/// How a run ended. Both are normal endings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminal {
    /// No further page could be reached.
    Exhausted,
    /// `max_pages` pages were read.
    Capped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Navigating,
    Reading,
    Advancing,
    Done(Terminal),
}

/// Everything collected by the pagination loop.
#[derive(Debug)]
pub struct Harvest {
    pub listings: Vec<Listing>,
    pub pages_visited: u32,
    pub terminal: Terminal,
    pub snapshot: Option<PathBuf>,
}

#[derive(Debug)]
pub struct RunReport {
    pub listings: Vec<Listing>,
    pub pages_visited: u32,
    pub terminal: Terminal,
    pub snapshot: Option<PathBuf>,
    pub written: Vec<PathBuf>,
}

pub struct ListingScraper<'a> {
    config: &'a Config,
    origin: Url,
    throttle: Throttle,
}

impl<'a> ListingScraper<'a> {
    pub fn new(config: &'a Config) -> Result<Self, ScrapeError> {
        Ok(Self {
            config,
            origin: site_origin()?,
            throttle: Throttle::new(config.request_delay),
        })
    }

    /// Scrapes with the given session, closes it, then saves the results.
    ///
    /// The session is closed on every path out of here: explicitly after the
    /// last page, or by the guard when an error returns early.
    pub fn run<P: RenderedPage>(&self, mut session: BrowserSession<P>) -> Result<RunReport, ScrapeError> {
        info!("Starting scraper...");
        let harvest = self.paginate(&mut *session)?;

        if let Err(e) = session.close() {
            warn!("⚠️ Failed to close browser session: {e}");
        }

        let written = output::save(&harvest.listings, &self.config.output_dir, &self.config.output_formats)?;

        Ok(RunReport {
            listings: harvest.listings,
            pages_visited: harvest.pages_visited,
            terminal: harvest.terminal,
            snapshot: harvest.snapshot,
            written,
        })
    }

    /// Navigating → Reading → Advancing → … until Exhausted or Capped.
    pub fn paginate<P: RenderedPage>(&self, page: &mut P) -> Result<Harvest, ScrapeError> {
        let gate = ReadinessGate::new(&self.config.layout, self.config.timeout());
        let reader = PageReader::new(&self.config.layout, &self.origin);

        let mut listings: Vec<Listing> = Vec::new();
        let mut snapshot = None;
        let mut page_no: u32 = 1;
        let mut stage = Stage::Navigating;

        loop {
            stage = match stage {
                Stage::Navigating => {
                    let url = search_url(&self.config.search)?;
                    info!("Navigating to: {url}");
                    page.navigate(url.as_str())
                        .map_err(|source| ScrapeError::Navigation {
                            url: url.to_string(),
                            source,
                        })?;

                    let outcome = gate.await_ready(page, true).map_err(ScrapeError::on_page(page_no))?;
                    if outcome == ReadinessOutcome::TimedOut {
                        warn!(page = page_no, "⏱️ Timed out waiting for page to load");
                        snapshot = self.capture_snapshot(page);
                    }
                    // The prompt can sit on top of already rendered cards.
                    gate.dismiss_interstitial(page);
                    Stage::Reading
                }

                Stage::Reading => {
                    info!("📄 Scraping page {page_no}");
                    let outcome = gate.await_ready(page, false).map_err(ScrapeError::on_page(page_no))?;
                    if outcome == ReadinessOutcome::TimedOut {
                        warn!(page = page_no, "⏱️ Timed out waiting for listings to load");
                    }

                    let found = reader
                        .extract_listings(page, page_no)
                        .map_err(ScrapeError::on_page(page_no))?;
                    info!("✅ Page {page_no} parsed ({} listings)", found.len());
                    listings.extend(found);
                    Stage::Advancing
                }

                Stage::Advancing => {
                    if page_no >= self.config.max_pages {
                        info!("🛑 Reached max_pages ({})", self.config.max_pages);
                        Stage::Done(Terminal::Capped)
                    } else if self.go_to_next_page(page, &gate, page_no)? {
                        self.throttle.pause();
                        page_no += 1;
                        Stage::Reading
                    } else {
                        info!("🏁 No more pages available");
                        Stage::Done(Terminal::Exhausted)
                    }
                }

                Stage::Done(terminal) => {
                    return Ok(Harvest {
                        listings,
                        pages_visited: page_no,
                        terminal,
                        snapshot,
                    });
                }
            };
        }
    }

    /// Clicks the "next page" control. `false` means there is no next page.
    fn go_to_next_page<P: RenderedPage>(
        &self,
        page: &mut P,
        gate: &ReadinessGate<'_>,
        page_no: u32,
    ) -> Result<bool, ScrapeError> {
        let next = gate
            .await_clickable(page, &self.config.layout.next_page)
            .map_err(ScrapeError::on_page(page_no))?;
        let Some(next) = next else {
            return Ok(false);
        };

        match page.click(&next) {
            Ok(()) => Ok(true),
            Err(e @ (PageError::Stale(_) | PageError::NotInteractable(_))) => {
                warn!(page = page_no, "⚠️ Next page control could not be clicked: {e}");
                Ok(false)
            }
            Err(source) => Err(ScrapeError::Page { page: page_no, source }),
        }
    }

    fn capture_snapshot<P: RenderedPage>(&self, page: &mut P) -> Option<PathBuf> {
        if !self.config.snapshot_on_timeout {
            return None;
        }

        let result = page
            .snapshot()
            .map_err(|e| e.to_string())
            .and_then(|shot| {
                let path = self
                    .config
                    .output_dir
                    .join(format!("search_page_timeout.{}", shot.format.ext()));
                output::ensure_dir(&self.config.output_dir)
                    .and_then(|_| output::write_atomic(&path, &shot.data))
                    .map(|_| path)
                    .map_err(|e| e.to_string())
            });

        match result {
            Ok(path) => {
                info!("📸 Saved diagnostic snapshot to {}", path.display());
                Some(path)
            }
            Err(e) => {
                warn!("⚠️ Could not save diagnostic snapshot: {e}");
                None
            }
        }
    }
}
