// src/tests/utils.rs
use crate::browser::{PageError, PageResult, RenderedPage, Snapshot, SnapshotFormat};
use crate::config::Config;
use crate::scraper::Layout;
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

/// Config with no delays and a zero timeout, so waits probe exactly once.
pub fn test_config(output_dir: &Path, max_pages: u32) -> Config {
    let yaml = format!(
        r#"
browser: chrome
search:
  location: Lisbon
  adults: 2
request_delay:
  min: 0
  max: 0
timeout: 0
max_pages: {max_pages}
output_dir: '{}'
output_formats: [csv]
"#,
        output_dir.display()
    );
    Config::from_yaml(&yaml).unwrap_or_else(|e| panic!("test config is invalid: {e}"))
}

#[derive(Debug, Clone)]
pub struct FakeElement {
    css: String,
    text: String,
    attrs: Vec<(String, String)>,
}

/// One result card. Elements are matched by their exact CSS string.
#[derive(Debug, Clone, Default)]
pub struct FakeCard {
    elements: Vec<FakeElement>,
    stale: bool,
}

impl FakeCard {
    pub fn new() -> Self {
        Self::default()
    }

    /// A card where the first alternative of every field matches.
    pub fn complete(n: usize) -> Self {
        let layout = Layout::default();
        Self::new()
            .text(&layout.title[0].css, &format!("Listing {n}"))
            .text(&layout.price[0].css, &format!("${n}00 night"))
            .text(&layout.rating[0].css, "4.8 (120)")
            .text(&layout.property_type[0].css, "Entire home")
            .text(&layout.beds[0].css, &format!("{n} beds"))
            .text(&layout.location[0].css, "Lisbon, Portugal")
            .attr(&layout.link[0].css, "href", &format!("/rooms/{n}"))
    }

    pub fn text(mut self, css: &str, text: &str) -> Self {
        self.elements.push(FakeElement {
            css: css.to_string(),
            text: text.to_string(),
            attrs: Vec::new(),
        });
        self
    }

    pub fn attr(mut self, css: &str, name: &str, value: &str) -> Self {
        self.elements.push(FakeElement {
            css: css.to_string(),
            text: String::new(),
            attrs: vec![(name.to_string(), value.to_string())],
        });
        self
    }

    pub fn without(mut self, css: &str) -> Self {
        self.elements.retain(|e| e.css != css);
        self
    }

    /// Every lookup inside this card fails as a detached element.
    pub fn stale(mut self) -> Self {
        self.stale = true;
        self
    }
}

#[derive(Debug, Clone)]
pub struct FakeResultsPage {
    cards: Vec<FakeCard>,
    has_next: bool,
    consent: bool,
    broken_consent: bool,
    stale_next: bool,
    rendered: bool,
}

impl FakeResultsPage {
    pub fn with_cards(cards: Vec<FakeCard>) -> Self {
        Self {
            cards,
            has_next: false,
            consent: false,
            broken_consent: false,
            stale_next: false,
            rendered: true,
        }
    }

    /// `n` complete cards numbered from `first`.
    pub fn numbered(first: usize, n: usize) -> Self {
        Self::with_cards((first..first + n).map(FakeCard::complete).collect())
    }

    pub fn with_next(mut self) -> Self {
        self.has_next = true;
        self
    }

    pub fn with_consent(mut self) -> Self {
        self.consent = true;
        self
    }

    /// The consent prompt is shown but clicking it fails.
    pub fn with_broken_consent(mut self) -> Self {
        self.consent = true;
        self.broken_consent = true;
        self
    }

    /// The next control is shown but goes stale when clicked.
    pub fn with_stale_next(mut self) -> Self {
        self.has_next = true;
        self.stale_next = true;
        self
    }

    /// Cards never show up, so readiness waits time out.
    pub fn unrendered(mut self) -> Self {
        self.rendered = false;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeNode {
    Card { page: usize, card: usize },
    Element { page: usize, card: usize, element: usize },
    Next { page: usize },
    Consent,
}

#[derive(Debug, Default)]
pub struct FakeLog {
    pub navigations: Vec<String>,
    pub queries: Vec<String>,
    pub clicks: Vec<String>,
    pub snapshots: u32,
    pub closed: u32,
}

/// Scripted renderer. The log is shared so tests can inspect it after the
/// site has been moved into a session.
pub struct FakeSite {
    pages: Vec<FakeResultsPage>,
    current: usize,
    consent_open: bool,
    fail_navigate: bool,
    layout: Layout,
    log: Rc<RefCell<FakeLog>>,
}

impl FakeSite {
    pub fn new(pages: Vec<FakeResultsPage>) -> Self {
        Self {
            pages,
            current: 0,
            consent_open: false,
            fail_navigate: false,
            layout: Layout::default(),
            log: Rc::new(RefCell::new(FakeLog::default())),
        }
    }

    pub fn failing_navigation(mut self) -> Self {
        self.fail_navigate = true;
        self
    }

    pub fn log(&self) -> Rc<RefCell<FakeLog>> {
        Rc::clone(&self.log)
    }

    fn card(&self, page: usize, card: usize) -> PageResult<&FakeCard> {
        if page != self.current {
            return Err(PageError::Stale(format!("card {card} is from page {page}")));
        }
        let found = &self.pages[page].cards[card];
        if found.stale {
            return Err(PageError::Stale(format!("card {card} was re-rendered")));
        }
        Ok(found)
    }
}

impl RenderedPage for FakeSite {
    type Node = FakeNode;

    fn navigate(&mut self, url: &str) -> PageResult<()> {
        self.log.borrow_mut().navigations.push(url.to_string());
        if self.fail_navigate {
            return Err(PageError::Transport("connection refused".into()));
        }
        self.current = 0;
        self.consent_open = self.pages.first().is_some_and(|p| p.consent);
        Ok(())
    }

    fn find_all(&mut self, css: &str, within: Option<&FakeNode>) -> PageResult<Vec<FakeNode>> {
        self.log.borrow_mut().queries.push(css.to_string());
        let page = self.current;
        let shown = &self.pages[page];

        match within {
            None if css == self.layout.listing_root => Ok(if shown.rendered {
                (0..shown.cards.len()).map(|card| FakeNode::Card { page, card }).collect()
            } else {
                Vec::new()
            }),
            None if css == self.layout.next_page.css && shown.has_next => Ok(vec![FakeNode::Next { page }]),
            None if css == self.layout.consent.css && self.consent_open => Ok(vec![FakeNode::Consent]),
            None => Ok(Vec::new()),
            Some(FakeNode::Card { page, card }) => {
                let (page, card) = (*page, *card);
                let found = self.card(page, card)?;
                Ok(found
                    .elements
                    .iter()
                    .enumerate()
                    .filter(|(_, e)| e.css == css)
                    .map(|(element, _)| FakeNode::Element { page, card, element })
                    .collect())
            }
            Some(_) => Ok(Vec::new()),
        }
    }

    fn text(&mut self, node: &FakeNode) -> PageResult<String> {
        match node {
            FakeNode::Card { page, card } => {
                let found = self.card(*page, *card)?;
                let texts: Vec<&str> = found.elements.iter().map(|e| e.text.as_str()).collect();
                Ok(texts.join(" "))
            }
            FakeNode::Element { page, card, element } => {
                Ok(self.card(*page, *card)?.elements[*element].text.clone())
            }
            FakeNode::Next { .. } => Ok("Next".into()),
            FakeNode::Consent => Ok("Accept cookies".into()),
        }
    }

    fn attribute(&mut self, node: &FakeNode, name: &str) -> PageResult<Option<String>> {
        match node {
            FakeNode::Element { page, card, element } => {
                let found = self.card(*page, *card)?;
                Ok(found.elements[*element]
                    .attrs
                    .iter()
                    .find(|(k, _)| k == name)
                    .map(|(_, v)| v.clone()))
            }
            _ => Ok(None),
        }
    }

    fn is_clickable(&mut self, _node: &FakeNode) -> PageResult<bool> {
        Ok(true)
    }

    fn click(&mut self, node: &FakeNode) -> PageResult<()> {
        match node {
            FakeNode::Next { page } => {
                if *page != self.current || self.pages[*page].stale_next {
                    return Err(PageError::Stale("next control from an old page".into()));
                }
                if self.current + 1 >= self.pages.len() {
                    return Err(PageError::NotInteractable("no page after the last one".into()));
                }
                self.log.borrow_mut().clicks.push("next".into());
                self.current += 1;
            }
            FakeNode::Consent => {
                if self.pages[self.current].broken_consent {
                    return Err(PageError::NotInteractable("consent button is covered".into()));
                }
                self.log.borrow_mut().clicks.push("consent".into());
                self.consent_open = false;
            }
            other => self.log.borrow_mut().clicks.push(format!("{other:?}")),
        }
        Ok(())
    }

    fn snapshot(&mut self) -> PageResult<Snapshot> {
        self.log.borrow_mut().snapshots += 1;
        Ok(Snapshot {
            format: SnapshotFormat::Png,
            data: b"\x89PNG fake".to_vec(),
        })
    }

    fn close(&mut self) -> PageResult<()> {
        self.log.borrow_mut().closed += 1;
        Ok(())
    }
}
