// browser/webdriver.rs
use super::models::{ElementHandle, Envelope, ErrorBody, NewSession};
use super::{normalize_text, PageError, PageResult, RenderedPage, Snapshot, SnapshotFormat};
use crate::config::{Browser, Config};
use base64::Engine;
use reqwest::blocking::Client;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info};

// Page loads block the navigate command until the document is complete.
const COMMAND_TIMEOUT: Duration = Duration::from_secs(120);

/// Element handle issued by the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebElement(String);

/// A browser driven over the WebDriver HTTP protocol
/// (chromedriver, geckodriver, or a Selenium server).
pub struct WebDriverPage {
    client: Client,
    session_url: String,
}

impl WebDriverPage {
    pub fn start(config: &Config, user_agent: &str) -> PageResult<Self> {
        let client = Client::builder()
            .timeout(COMMAND_TIMEOUT)
            .build()
            .map_err(|e| PageError::Transport(e.to_string()))?;

        let base = config.webdriver_url.trim_end_matches('/').to_string();
        let body = json!({
            "capabilities": {
                "alwaysMatch": capabilities(config.browser, config.headless, user_agent)
            }
        });

        debug!(%base, browser = %config.browser, headless = config.headless, "requesting webdriver session");
        let resp = client
            .post(format!("{base}/session"))
            .json(&body)
            .send()
            .map_err(|e| PageError::Transport(format!("{base}: {e}")))?;

        let session: NewSession = decode(resp)?;
        info!("🧭 Browser session {} started ({})", session.session_id, config.browser);
        debug!(capabilities = ?session.capabilities, "negotiated capabilities");

        Ok(Self {
            client,
            session_url: format!("{base}/session/{}", session.session_id),
        })
    }

    fn command<T: DeserializeOwned>(&self, method: Method, path: &str, body: Option<Value>) -> PageResult<T> {
        let url = format!("{}{}", self.session_url, path);
        let mut req = self.client.request(method, &url);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let resp = req.send().map_err(|e| PageError::Transport(e.to_string()))?;
        decode(resp)
    }

    fn find(&self, path: &str, css: &str) -> PageResult<Vec<WebElement>> {
        let handles: Vec<ElementHandle> = self.command(
            Method::POST,
            path,
            Some(json!({ "using": "css selector", "value": css })),
        )?;
        Ok(handles.into_iter().map(|h| WebElement(h.id)).collect())
    }
}

impl RenderedPage for WebDriverPage {
    type Node = WebElement;

    fn navigate(&mut self, url: &str) -> PageResult<()> {
        let _: Value = self.command(Method::POST, "/url", Some(json!({ "url": url })))?;
        Ok(())
    }

    fn find_all(&mut self, css: &str, within: Option<&WebElement>) -> PageResult<Vec<WebElement>> {
        match within {
            Some(WebElement(id)) => self.find(&format!("/element/{id}/elements"), css),
            None => self.find("/elements", css),
        }
    }

    fn text(&mut self, node: &WebElement) -> PageResult<String> {
        let raw: String = self.command(Method::GET, &format!("/element/{}/text", node.0), None)?;
        Ok(normalize_text(&raw))
    }

    fn attribute(&mut self, node: &WebElement, name: &str) -> PageResult<Option<String>> {
        self.command(
            Method::GET,
            &format!("/element/{}/attribute/{name}", node.0),
            None,
        )
    }

    fn is_clickable(&mut self, node: &WebElement) -> PageResult<bool> {
        let displayed: bool = self.command(Method::GET, &format!("/element/{}/displayed", node.0), None)?;
        if !displayed {
            return Ok(false);
        }
        self.command(Method::GET, &format!("/element/{}/enabled", node.0), None)
    }

    fn click(&mut self, node: &WebElement) -> PageResult<()> {
        let _: Value = self.command(Method::POST, &format!("/element/{}/click", node.0), Some(json!({})))?;
        Ok(())
    }

    fn snapshot(&mut self) -> PageResult<Snapshot> {
        let encoded: String = self.command(Method::GET, "/screenshot", None)?;
        let data = base64::engine::general_purpose::STANDARD
            .decode(encoded.as_bytes())
            .map_err(|e| PageError::UnexpectedShape(format!("screenshot is not base64: {e}")))?;
        Ok(Snapshot {
            format: SnapshotFormat::Png,
            data,
        })
    }

    fn close(&mut self) -> PageResult<()> {
        let _: Value = self.command(Method::DELETE, "", None)?;
        info!("🧭 Browser session closed");
        Ok(())
    }
}

fn capabilities(browser: Browser, headless: bool, user_agent: &str) -> Value {
    match browser {
        Browser::Chrome => {
            let mut args = vec![
                format!("user-agent={user_agent}"),
                "--disable-blink-features=AutomationControlled".to_string(),
            ];
            if headless {
                args.push("--headless".to_string());
            }
            json!({
                "browserName": "chrome",
                "goog:chromeOptions": { "args": args }
            })
        }
        Browser::Firefox => {
            let args: Vec<&str> = if headless { vec!["-headless"] } else { vec![] };
            json!({
                "browserName": "firefox",
                "moz:firefoxOptions": {
                    "args": args,
                    "prefs": { "general.useragent.override": user_agent }
                }
            })
        }
    }
}

fn decode<T: DeserializeOwned>(resp: reqwest::blocking::Response) -> PageResult<T> {
    let status = resp.status();
    let text = resp.text().map_err(|e| PageError::Transport(e.to_string()))?;

    if !status.is_success() {
        return Err(match serde_json::from_str::<Envelope<ErrorBody>>(&text) {
            Ok(env) => error_from_code(env.value.error, env.value.message.unwrap_or_default()),
            Err(_) => PageError::Transport(format!("HTTP {status}: {text}")),
        });
    }

    let env: Envelope<T> = serde_json::from_str(&text)
        .map_err(|e| PageError::UnexpectedShape(format!("{e}: {text}")))?;
    Ok(env.value)
}

fn error_from_code(code: String, message: String) -> PageError {
    match code.as_str() {
        "stale element reference" => PageError::Stale(message),
        "invalid selector" => PageError::InvalidSelector {
            selector: String::new(),
            message,
        },
        "element not interactable" | "element click intercepted" => PageError::NotInteractable(message),
        _ => PageError::WebDriver { code, message },
    }
}
