// browser/replay.rs
//
// Offline renderer over saved result pages. Page N+1 is whatever file sorts
// after page N; following any link moves there.

use super::{normalize_text, PageError, PageResult, RenderedPage, Snapshot, SnapshotFormat};
use scraper::{ElementRef, Html, Selector};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayNode {
    generation: u64,
    ordinal: usize,
}

pub struct ReplayPage {
    pages: Vec<String>,
    current: Option<usize>,
    document: Option<Html>,
    generation: u64,
    visited: Vec<String>,
}

impl ReplayPage {
    pub fn new(pages: Vec<String>) -> Self {
        Self {
            pages,
            current: None,
            document: None,
            generation: 0,
            visited: Vec::new(),
        }
    }

    /// Loads every `.html`/`.htm` file in `dir`, ordered by file name.
    pub fn from_dir(dir: &Path) -> PageResult<Self> {
        let mut files = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            let is_html = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("html") || e.eq_ignore_ascii_case("htm"));
            if is_html {
                files.push(path);
            }
        }
        files.sort();

        if files.is_empty() {
            return Err(PageError::UnexpectedShape(format!(
                "no saved .html pages in {}",
                dir.display()
            )));
        }

        let pages = files
            .iter()
            .map(fs::read_to_string)
            .collect::<Result<Vec<_>, _>>()?;

        info!("📼 Replaying {} saved page(s) from {}", pages.len(), dir.display());
        Ok(Self::new(pages))
    }

    /// URLs passed to `navigate`, in order.
    pub fn visited(&self) -> &[String] {
        &self.visited
    }

    /// Zero-based index of the page currently shown.
    pub fn current_page(&self) -> Option<usize> {
        self.current
    }

    fn load(&mut self, index: usize) -> PageResult<()> {
        let html = self
            .pages
            .get(index)
            .ok_or_else(|| PageError::UnexpectedShape(format!("no saved page at index {index}")))?;
        self.document = Some(Html::parse_document(html));
        self.current = Some(index);
        // Handles from the previous document go stale.
        self.generation += 1;
        Ok(())
    }

    fn document(&self) -> PageResult<&Html> {
        self.document
            .as_ref()
            .ok_or_else(|| PageError::UnexpectedShape("no page loaded".into()))
    }

    fn resolve(&self, node: &ReplayNode) -> PageResult<ElementRef<'_>> {
        if node.generation != self.generation {
            return Err(PageError::Stale(format!("element {} belongs to an old page", node.ordinal)));
        }
        elements(self.document()?)
            .nth(node.ordinal)
            .ok_or_else(|| PageError::Stale(format!("element {} no longer exists", node.ordinal)))
    }
}

fn elements(doc: &Html) -> impl Iterator<Item = ElementRef<'_>> {
    doc.root_element().descendants().filter_map(ElementRef::wrap)
}

fn parse_selector(css: &str) -> PageResult<Selector> {
    Selector::parse(css).map_err(|e| PageError::InvalidSelector {
        selector: css.to_string(),
        message: e.to_string(),
    })
}

impl RenderedPage for ReplayPage {
    type Node = ReplayNode;

    fn navigate(&mut self, url: &str) -> PageResult<()> {
        debug!(%url, "replay navigate");
        self.visited.push(url.to_string());
        if self.pages.is_empty() {
            return Err(PageError::UnexpectedShape("no saved pages to replay".into()));
        }
        self.load(0)
    }

    fn find_all(&mut self, css: &str, within: Option<&ReplayNode>) -> PageResult<Vec<ReplayNode>> {
        let selector = parse_selector(css)?;
        let doc = self.document()?;

        let matched: Vec<_> = match within {
            Some(node) => {
                let scope = self.resolve(node)?;
                scope
                    .select(&selector)
                    .filter(|el| el.id() != scope.id())
                    .map(|el| el.id())
                    .collect()
            }
            None => doc.select(&selector).map(|el| el.id()).collect(),
        };

        Ok(elements(doc)
            .enumerate()
            .filter(|(_, el)| matched.contains(&el.id()))
            .map(|(ordinal, _)| ReplayNode {
                generation: self.generation,
                ordinal,
            })
            .collect())
    }

    fn text(&mut self, node: &ReplayNode) -> PageResult<String> {
        let el = self.resolve(node)?;
        Ok(normalize_text(&el.text().collect::<String>()))
    }

    fn attribute(&mut self, node: &ReplayNode, name: &str) -> PageResult<Option<String>> {
        let el = self.resolve(node)?;
        Ok(el.value().attr(name).map(str::to_string))
    }

    fn is_clickable(&mut self, node: &ReplayNode) -> PageResult<bool> {
        let el = self.resolve(node)?;
        let attrs = el.value();
        let disabled = attrs.attr("disabled").is_some()
            || attrs.attr("aria-disabled").is_some_and(|v| v.eq_ignore_ascii_case("true"));
        Ok(!disabled)
    }

    fn click(&mut self, node: &ReplayNode) -> PageResult<()> {
        let is_link = self.resolve(node)?.value().name() == "a";
        if !is_link {
            debug!(ordinal = node.ordinal, "replay click on non-link ignored");
            return Ok(());
        }

        let next = self.current.map_or(0, |i| i + 1);
        if next >= self.pages.len() {
            return Err(PageError::NotInteractable("no saved page after the last one".into()));
        }
        self.load(next)
    }

    fn snapshot(&mut self) -> PageResult<Snapshot> {
        let html = self
            .current
            .and_then(|index| self.pages.get(index))
            .ok_or_else(|| PageError::UnexpectedShape("no page loaded".into()))?;
        Ok(Snapshot {
            format: SnapshotFormat::Html,
            data: html.clone().into_bytes(),
        })
    }

    fn close(&mut self) -> PageResult<()> {
        self.document = None;
        self.current = None;
        debug!("replay session closed");
        Ok(())
    }
}
