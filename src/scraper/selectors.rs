// scraper/selectors.rs
//
// Result cards ship in several markup variants at once, so every field is
// an ordered list of queries. The first one that yields a value wins.

use serde::Deserialize;
use std::fmt;

/// What to read from a matched element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum Extract {
    #[default]
    Text,
    Attribute(String),
    /// The `href` attribute, made absolute against the site origin.
    Href,
}

impl TryFrom<String> for Extract {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        match raw.trim() {
            "text" => Ok(Extract::Text),
            "href" => Ok(Extract::Href),
            other => match other.strip_prefix("attr:") {
                Some(name) if !name.trim().is_empty() => Ok(Extract::Attribute(name.trim().to_string())),
                _ => Err(format!("unknown extract mode '{other}' (expected text, href or attr:<name>)")),
            },
        }
    }
}

impl fmt::Display for Extract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Extract::Text => write!(f, "text"),
            Extract::Attribute(name) => write!(f, "attr:{name}"),
            Extract::Href => write!(f, "href"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldQuery {
    pub css: String,
    /// Only elements whose text contains one of these (case-insensitive).
    #[serde(default)]
    pub text_contains: Vec<String>,
    #[serde(default)]
    pub extract: Extract,
}

impl FieldQuery {
    pub fn text(css: &str) -> Self {
        Self {
            css: css.to_string(),
            text_contains: Vec::new(),
            extract: Extract::Text,
        }
    }

    pub fn attr(css: &str, name: &str) -> Self {
        Self {
            extract: Extract::Attribute(name.to_string()),
            ..Self::text(css)
        }
    }

    pub fn href(css: &str) -> Self {
        Self {
            extract: Extract::Href,
            ..Self::text(css)
        }
    }

    pub fn containing(mut self, needles: &[&str]) -> Self {
        self.text_contains = needles.iter().map(|n| n.to_string()).collect();
        self
    }

    pub(crate) fn text_matches(&self, text: &str) -> bool {
        let haystack = text.to_lowercase();
        self.text_contains
            .iter()
            .any(|needle| haystack.contains(&needle.to_lowercase()))
    }
}

/// Selectors for one search results page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Layout {
    pub listing_root: String,
    pub title: Vec<FieldQuery>,
    pub price: Vec<FieldQuery>,
    pub rating: Vec<FieldQuery>,
    #[serde(rename = "type")]
    pub property_type: Vec<FieldQuery>,
    pub beds: Vec<FieldQuery>,
    pub location: Vec<FieldQuery>,
    pub link: Vec<FieldQuery>,
    /// Cookie / consent prompt shown on first visit.
    pub consent: FieldQuery,
    pub next_page: FieldQuery,
}

impl Default for Layout {
    fn default() -> Self {
        let rating_label = r#"span[aria-label*="out of 5 stars"]"#;
        Self {
            listing_root: r#"[itemprop="itemListElement"]"#.to_string(),
            title: vec![FieldQuery::text(r#"div[data-testid="listing-card-title"]"#)],
            price: vec![FieldQuery::text("span._1y74zjx"), FieldQuery::text("._tyxjp1")],
            rating: vec![
                FieldQuery::text(rating_label),
                FieldQuery::attr(rating_label, "aria-label"),
            ],
            property_type: vec![FieldQuery::text("div.f15liw5s"), FieldQuery::text(".t1a9j9y7")],
            beds: vec![FieldQuery::text("span").containing(&["bed"])],
            location: vec![FieldQuery::text("div.t1jojoys"), FieldQuery::text(".t6mzqp7")],
            link: vec![FieldQuery::href("a")],
            consent: FieldQuery::text("button").containing(&["Accept"]),
            next_page: FieldQuery::text(r#"a[aria-label="Next"]"#),
        }
    }
}

impl Layout {
    /// Field queries in output column order.
    pub fn fields(&self) -> [(&'static str, &[FieldQuery]); 7] {
        [
            ("title", &self.title),
            ("price", &self.price),
            ("rating", &self.rating),
            ("type", &self.property_type),
            ("beds", &self.beds),
            ("location", &self.location),
            ("link", &self.link),
        ]
    }

    /// Every CSS selector in the layout, labelled for error messages.
    pub fn selectors(&self) -> Vec<(String, &str)> {
        let mut all = vec![("listing_root".to_string(), self.listing_root.as_str())];
        for (name, queries) in self.fields() {
            for (i, q) in queries.iter().enumerate() {
                all.push((format!("layout.{name}[{i}]"), q.css.as_str()));
            }
        }
        all.push(("layout.consent".to_string(), self.consent.css.as_str()));
        all.push(("layout.next_page".to_string(), self.next_page.css.as_str()));
        all
    }
}
