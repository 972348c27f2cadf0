// config.rs
use crate::scraper::Layout;
use chrono::NaiveDate;
use serde::de::{self, IntoDeserializer};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("unsupported browser '{0}' (expected chrome or firefox)")]
    UnsupportedBrowser(String),

    #[error("invalid value for '{field}': {reason}")]
    Invalid { field: String, reason: String },
}

fn invalid(field: impl Into<String>, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field: field.into(),
        reason: reason.into(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum Browser {
    Chrome,
    Firefox,
}

impl FromStr for Browser {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "chrome" => Ok(Browser::Chrome),
            "firefox" => Ok(Browser::Firefox),
            _ => Err(ConfigError::UnsupportedBrowser(s.to_string())),
        }
    }
}

impl TryFrom<String> for Browser {
    type Error = ConfigError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl fmt::Display for Browser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Browser::Chrome => write!(f, "chrome"),
            Browser::Firefox => write!(f, "firefox"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchParams {
    pub location: String,
    #[serde(default = "default_adults")]
    pub adults: u32,
    #[serde(default, deserialize_with = "optional_date")]
    pub checkin: Option<NaiveDate>,
    #[serde(default, deserialize_with = "optional_date")]
    pub checkout: Option<NaiveDate>,
}

/// Seconds to wait between result pages, drawn uniformly from `[min, max]`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DelayBounds {
    pub min: f64,
    pub max: f64,
}

/// Run configuration. Loaded once and never changed during a run.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub browser: Browser,
    #[serde(default = "default_true")]
    pub headless: bool,
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,
    #[serde(default = "default_user_agents_file")]
    pub user_agents_file: PathBuf,
    pub search: SearchParams,
    pub request_delay: DelayBounds,
    /// Seconds.
    pub timeout: f64,
    pub max_pages: u32,
    pub output_dir: PathBuf,
    pub output_formats: Vec<String>,
    #[serde(default = "default_true")]
    pub snapshot_on_timeout: bool,
    #[serde(default)]
    pub layout: Layout,
}

fn default_true() -> bool {
    true
}

fn default_adults() -> u32 {
    1
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_user_agents_file() -> PathBuf {
    PathBuf::from("config/user_agents.txt")
}

// Blank strings count as "not set".
fn optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => NaiveDate::deserialize(s.into_deserializer())
            .map(Some)
            .map_err(|e: D::Error| de::Error::custom(format!("date '{s}' is not YYYY-MM-DD: {e}"))),
    }
}

fn seconds(field: &str, value: f64) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f64(value)
        .map_err(|_| invalid(field, format!("{value} is not a non-negative number of seconds")))
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text)
    }

    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.search.location.trim().is_empty() {
            return Err(invalid("search.location", "must not be empty"));
        }
        if self.search.adults == 0 {
            return Err(invalid("search.adults", "must be at least 1"));
        }
        if let (Some(checkin), Some(checkout)) = (self.search.checkin, self.search.checkout) {
            if checkout <= checkin {
                return Err(invalid(
                    "search.checkout",
                    format!("{checkout} is not after checkin {checkin}"),
                ));
            }
        }

        let min = seconds("request_delay.min", self.request_delay.min)?;
        let max = seconds("request_delay.max", self.request_delay.max)?;
        if min > max {
            return Err(invalid(
                "request_delay",
                format!("min ({}) is greater than max ({})", self.request_delay.min, self.request_delay.max),
            ));
        }
        seconds("timeout", self.timeout)?;

        if self.max_pages == 0 {
            return Err(invalid("max_pages", "must be at least 1"));
        }
        if self.output_formats.is_empty() {
            return Err(invalid("output_formats", "at least one format is required"));
        }

        for (field, css) in self.layout.selectors() {
            if css.trim().is_empty() {
                return Err(invalid(field, "selector must not be empty"));
            }
            if let Err(e) = scraper::Selector::parse(css) {
                return Err(invalid(field, format!("'{css}' is not a valid CSS selector: {e}")));
            }
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.timeout).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
browser: Chrome
headless: true
search:
  location: "Lisbon, Portugal"
  adults: 2
  checkin: "2026-11-01"
  checkout: ""
request_delay:
  min: 1.5
  max: 3
timeout: 10
max_pages: 3
output_dir: data
output_formats: [csv, xlsx]
"#;

    #[test]
    fn sample_config_loads_with_defaults() {
        let config = Config::from_yaml(SAMPLE).unwrap();
        assert_eq!(config.browser, Browser::Chrome);
        assert_eq!(config.search.checkin, NaiveDate::from_ymd_opt(2026, 11, 1));
        assert_eq!(config.search.checkout, None);
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(config.webdriver_url, "http://localhost:4444");
        assert!(config.snapshot_on_timeout);
        assert_eq!(config.layout, Layout::default());
    }

    #[test]
    fn unknown_browser_is_rejected() {
        let yaml = SAMPLE.replace("browser: Chrome", "browser: netscape");
        let err = Config::from_yaml(&yaml).unwrap_err();
        assert!(err.to_string().contains("netscape"), "{err}");
    }

    #[test]
    fn zero_max_pages_is_rejected() {
        let yaml = SAMPLE.replace("max_pages: 3", "max_pages: 0");
        assert!(matches!(
            Config::from_yaml(&yaml),
            Err(ConfigError::Invalid { field, .. }) if field == "max_pages"
        ));
    }

    #[test]
    fn inverted_delay_bounds_are_rejected() {
        let yaml = SAMPLE.replace("min: 1.5", "min: 5");
        assert!(matches!(
            Config::from_yaml(&yaml),
            Err(ConfigError::Invalid { field, .. }) if field == "request_delay"
        ));
    }

    #[test]
    fn checkout_must_follow_checkin() {
        let yaml = SAMPLE.replace(r#"checkout: """#, r#"checkout: "2026-10-30""#);
        assert!(matches!(
            Config::from_yaml(&yaml),
            Err(ConfigError::Invalid { field, .. }) if field == "search.checkout"
        ));
    }

    #[test]
    fn malformed_date_is_a_parse_error() {
        let yaml = SAMPLE.replace("2026-11-01", "11/01/2026");
        assert!(matches!(Config::from_yaml(&yaml), Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn layout_can_be_partially_overridden() {
        let yaml = format!(
            "{SAMPLE}layout:\n  price:\n    - css: span.price-now\n    - css: span.price-old\n      extract: attr:data-amount\n"
        );
        let config = Config::from_yaml(&yaml).unwrap();
        assert_eq!(config.layout.price.len(), 2);
        assert_eq!(config.layout.price[0].css, "span.price-now");
        assert_eq!(
            config.layout.price[1].extract,
            crate::scraper::Extract::Attribute("data-amount".into())
        );
        assert_eq!(config.layout.title, Layout::default().title);
    }

    #[test]
    fn broken_layout_selector_is_rejected() {
        let yaml = format!("{SAMPLE}layout:\n  listing_root: \"div[[\"\n");
        assert!(matches!(
            Config::from_yaml(&yaml),
            Err(ConfigError::Invalid { field, .. }) if field == "listing_root"
        ));
    }
}
