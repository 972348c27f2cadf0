use crate::browser::PageError;
use crate::output::SinkError;
use thiserror::Error;

/// Failures that end a run. Element-level trouble never gets this far.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("failed to start browser session: {0}")]
    Session(#[source] PageError),

    #[error("navigation to {url} failed: {source}")]
    Navigation {
        url: String,
        #[source]
        source: PageError,
    },

    #[error("page {page}: {source}")]
    Page {
        page: u32,
        #[source]
        source: PageError,
    },

    #[error("bad URL: {0}")]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Output(#[from] SinkError),
}

impl ScrapeError {
    pub(crate) fn on_page(page: u32) -> impl FnOnce(PageError) -> ScrapeError {
        move |source| ScrapeError::Page { page, source }
    }
}
