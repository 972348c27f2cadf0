use crate::config::SearchParams;
use url::Url;

pub const SITE_ORIGIN: &str = "https://www.airbnb.com";
const SEARCH_PATH: &str = "/s/homes";

pub fn site_origin() -> Result<Url, url::ParseError> {
    Url::parse(SITE_ORIGIN)
}

/// Search page URL. Dates are only added when set.
pub fn search_url(search: &SearchParams) -> Result<Url, url::ParseError> {
    let mut url = site_origin()?.join(SEARCH_PATH)?;
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("query", search.location.trim());
        query.append_pair("adults", &search.adults.to_string());
        if let Some(checkin) = search.checkin {
            query.append_pair("checkin", &checkin.to_string());
        }
        if let Some(checkout) = search.checkout {
            query.append_pair("checkout", &checkout.to_string());
        }
    }
    Ok(url)
}

/// Absolute form of a link found on a result card.
pub fn absolutize(origin: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    origin.join(href).ok().map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn params(checkin: Option<NaiveDate>, checkout: Option<NaiveDate>) -> SearchParams {
        SearchParams {
            location: "Paris, France".into(),
            adults: 2,
            checkin,
            checkout,
        }
    }

    #[test]
    fn absent_dates_are_left_out() {
        let url = search_url(&params(None, None)).unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.airbnb.com/s/homes?query=Paris%2C+France&adults=2"
        );
    }

    #[test]
    fn dates_are_iso_formatted() {
        let checkin = NaiveDate::from_ymd_opt(2026, 11, 1);
        let checkout = NaiveDate::from_ymd_opt(2026, 11, 5);
        let url = search_url(&params(checkin, checkout)).unwrap();
        assert!(url.as_str().ends_with("&checkin=2026-11-01&checkout=2026-11-05"));
    }

    #[test]
    fn relative_and_absolute_links() {
        let origin = site_origin().unwrap();
        assert_eq!(
            absolutize(&origin, "/rooms/123").as_deref(),
            Some("https://www.airbnb.com/rooms/123")
        );
        assert_eq!(
            absolutize(&origin, "https://www.airbnb.com/rooms/9?adults=2").as_deref(),
            Some("https://www.airbnb.com/rooms/9?adults=2")
        );
        assert_eq!(absolutize(&origin, "   "), None);
    }
}
