// scraper/extract.rs
use super::search::absolutize;
use super::selectors::{Extract, FieldQuery, Layout};
use crate::browser::{PageError, PageResult, RenderedPage};
use crate::domain::{Listing, NOT_AVAILABLE};
use tracing::{debug, error, trace, warn};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extracted {
    Found(String),
    Missing,
}

impl Extracted {
    pub fn or_sentinel(self) -> String {
        match self {
            Extracted::Found(value) => value,
            Extracted::Missing => NOT_AVAILABLE.to_string(),
        }
    }
}

/// First element matching `query` (CSS plus optional text filter).
/// The element's text comes back too when the filter had to read it.
///
/// With a text filter, a match that wraps other matching elements gives way
/// to the innermost one, so `<span><span>Entire home</span><span>2 beds</span></span>`
/// yields the "2 beds" span rather than the wrapper's joined text.
pub fn locate<P: RenderedPage>(
    page: &mut P,
    query: &FieldQuery,
    within: Option<&P::Node>,
) -> PageResult<Option<(P::Node, Option<String>)>> {
    if query.text_contains.is_empty() {
        return Ok(page.find_first(&query.css, within)?.map(|node| (node, None)));
    }

    for node in page.find_all(&query.css, within)? {
        let text = page.text(&node)?;
        if query.text_matches(&text) {
            let (node, text) = innermost(page, query, node, text)?;
            return Ok(Some((node, Some(text))));
        }
    }
    Ok(None)
}

fn innermost<P: RenderedPage>(
    page: &mut P,
    query: &FieldQuery,
    mut node: P::Node,
    mut text: String,
) -> PageResult<(P::Node, String)> {
    'descend: loop {
        for inner in page.find_all(&query.css, Some(&node))? {
            let inner_text = page.text(&inner)?;
            if query.text_matches(&inner_text) {
                node = inner;
                text = inner_text;
                continue 'descend;
            }
        }
        return Ok((node, text));
    }
}

/// Tries each alternative in order and stops at the first one with a value.
///
/// Nothing matching, or a match with an empty value, is `Missing`. Only
/// renderer failures (a stale card, a dropped connection) come back as `Err`.
pub fn extract_field<P: RenderedPage>(
    page: &mut P,
    node: &P::Node,
    alternatives: &[FieldQuery],
    origin: &Url,
) -> PageResult<Extracted> {
    for query in alternatives {
        if let Extracted::Found(value) = extract_one(page, node, query, origin)? {
            return Ok(Extracted::Found(value));
        }
        trace!(css = %query.css, extract = %query.extract, "alternative missed");
    }
    Ok(Extracted::Missing)
}

fn extract_one<P: RenderedPage>(
    page: &mut P,
    node: &P::Node,
    query: &FieldQuery,
    origin: &Url,
) -> PageResult<Extracted> {
    let Some((hit, text)) = locate(page, query, Some(node))? else {
        return Ok(Extracted::Missing);
    };

    let value = match &query.extract {
        Extract::Text => match text {
            Some(text) => Some(text),
            None => Some(page.text(&hit)?),
        },
        Extract::Attribute(name) => page.attribute(&hit, name)?,
        Extract::Href => page
            .attribute(&hit, "href")?
            .and_then(|href| absolutize(origin, &href)),
    };

    Ok(match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Extracted::Found(v),
        _ => Extracted::Missing,
    })
}

/// A card that had to be dropped.
#[derive(Debug)]
struct CardFailure {
    field: &'static str,
    source: PageError,
}

pub struct PageReader<'a> {
    layout: &'a Layout,
    origin: &'a Url,
}

impl<'a> PageReader<'a> {
    pub fn new(layout: &'a Layout, origin: &'a Url) -> Self {
        Self { layout, origin }
    }

    /// Reads every result card currently on the page, in page order.
    ///
    /// A card that fails (stale handle, renderer error) is logged and
    /// skipped; the rest of the page is still read. Only failing to list the
    /// cards at all is an error.
    pub fn extract_listings<P: RenderedPage>(&self, page: &mut P, page_no: u32) -> PageResult<Vec<Listing>> {
        let cards = page.find_all(&self.layout.listing_root, None)?;
        debug!(page = page_no, cards = cards.len(), "listing cards found");

        let mut listings = Vec::with_capacity(cards.len());
        for (index, card) in cards.iter().enumerate() {
            match self.read_card(page, card) {
                Ok(listing) => {
                    let missing = listing.missing_fields();
                    if !missing.is_empty() {
                        debug!(page = page_no, card = index, ?missing, "listing has missing fields");
                    }
                    listings.push(listing);
                }
                Err(CardFailure { field, source }) if source.is_stale() => {
                    warn!(page = page_no, card = index, field, "⚠️ Element became stale, skipping");
                }
                Err(CardFailure { field, source }) => {
                    error!(page = page_no, card = index, field, "❌ Error extracting listing: {source}");
                }
            }
        }
        Ok(listings)
    }

    fn read_card<P: RenderedPage>(&self, page: &mut P, card: &P::Node) -> Result<Listing, CardFailure> {
        let origin = self.origin;
        let mut field = |name: &'static str, alternatives: &[FieldQuery]| {
            extract_field(page, card, alternatives, origin)
                .map(Extracted::or_sentinel)
                .map_err(|source| CardFailure { field: name, source })
        };

        let layout = self.layout;
        Ok(Listing {
            title: field("title", &layout.title)?,
            price: field("price", &layout.price)?,
            rating: field("rating", &layout.rating)?,
            property_type: field("type", &layout.property_type)?,
            beds: field("beds", &layout.beds)?,
            location: field("location", &layout.location)?,
            link: field("link", &layout.link)?,
        })
    }
}
