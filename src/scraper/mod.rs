mod extract;
mod readiness;
mod scraper;
mod scraper_error;
mod search;
mod selectors;
mod throttle;

pub use self::extract::{extract_field, Extracted, PageReader};
pub use self::readiness::{ReadinessGate, ReadinessOutcome};
pub use self::scraper::{ListingScraper, RunReport, Terminal};
pub use self::scraper_error::ScrapeError;
pub use self::search::{search_url, site_origin, SITE_ORIGIN};
pub use self::selectors::{Extract, FieldQuery, Layout};
