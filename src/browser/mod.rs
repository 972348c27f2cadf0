// browser/mod.rs
//
// The scraping core only talks to a `RenderedPage`. How the DOM got rendered
// (a real browser behind WebDriver, or saved HTML on disk) is up to the
// implementation.

mod models;
mod replay;
mod session;
pub mod user_agents;
mod webdriver;

pub use replay::ReplayPage;
pub use session::BrowserSession;
pub use webdriver::WebDriverPage;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PageError {
    /// The element was detached from the document after it was looked up.
    #[error("stale element reference: {0}")]
    Stale(String),

    #[error("invalid selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },

    #[error("element not interactable: {0}")]
    NotInteractable(String),

    #[error("webdriver error '{code}': {message}")]
    WebDriver { code: String, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected response: {0}")]
    UnexpectedShape(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl PageError {
    pub fn is_stale(&self) -> bool {
        matches!(self, PageError::Stale(_))
    }
}

pub type PageResult<T> = Result<T, PageError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    Png,
    Html,
}

impl SnapshotFormat {
    pub fn ext(self) -> &'static str {
        match self {
            SnapshotFormat::Png => "png",
            SnapshotFormat::Html => "html",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Snapshot {
    pub format: SnapshotFormat,
    pub data: Vec<u8>,
}

/// Capability set the scraper needs from a rendered document.
///
/// Lookups that match nothing are not errors: `find_all` returns an empty
/// vector and `attribute` returns `None`. Errors are reserved for stale
/// handles, bad selectors and a broken connection to the renderer.
pub trait RenderedPage {
    type Node: Clone + std::fmt::Debug;

    fn navigate(&mut self, url: &str) -> PageResult<()>;

    /// CSS lookup over the whole document, or over the descendants of `within`.
    fn find_all(&mut self, css: &str, within: Option<&Self::Node>) -> PageResult<Vec<Self::Node>>;

    fn find_first(&mut self, css: &str, within: Option<&Self::Node>) -> PageResult<Option<Self::Node>> {
        Ok(self.find_all(css, within)?.into_iter().next())
    }

    /// Visible text, whitespace collapsed and trimmed.
    fn text(&mut self, node: &Self::Node) -> PageResult<String>;

    fn attribute(&mut self, node: &Self::Node, name: &str) -> PageResult<Option<String>>;

    /// Displayed and enabled.
    fn is_clickable(&mut self, node: &Self::Node) -> PageResult<bool>;

    fn click(&mut self, node: &Self::Node) -> PageResult<()>;

    fn snapshot(&mut self) -> PageResult<Snapshot>;

    /// Release the underlying renderer. Called exactly once by `BrowserSession`.
    fn close(&mut self) -> PageResult<()>;
}

/// Collapse runs of whitespace the way a browser renders inline text.
pub(crate) fn normalize_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
