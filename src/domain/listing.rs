use serde::Serialize;

/// Placeholder written for any field that could not be located.
pub const NOT_AVAILABLE: &str = "N/A";

/// Column order for every output format. Matches the struct field order.
pub const LISTING_FIELDS: [&str; 7] = [
    "title", "price", "rating", "type", "beds", "location", "link",
];

/// One search result card.
///
/// Every field is always present; a field that was not found on the page
/// holds [`NOT_AVAILABLE`] rather than being left out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Listing {
    pub title: String,
    pub price: String,
    pub rating: String,
    #[serde(rename = "type")]
    pub property_type: String,
    pub beds: String,
    pub location: String,
    pub link: String,
}

impl Listing {
    /// Values in [`LISTING_FIELDS`] order.
    pub fn values(&self) -> [&str; 7] {
        [
            &self.title,
            &self.price,
            &self.rating,
            &self.property_type,
            &self.beds,
            &self.location,
            &self.link,
        ]
    }

    /// Names of the fields that fell back to the placeholder.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        LISTING_FIELDS
            .iter()
            .zip(self.values())
            .filter(|(_, v)| *v == NOT_AVAILABLE)
            .map(|(name, _)| *name)
            .collect()
    }
}
