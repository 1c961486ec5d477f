//! A `fantoccini`-backed implementation of the browser session.

use async_trait::async_trait;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::{Value, json};

use super::{DriverError, PageDriver};
use crate::config::{BrowserConfig, BrowserEngine};

/// A WebDriver-backed browser session.
///
/// Connects to a running WebDriver endpoint (chromedriver, geckodriver, or a
/// Selenium grid) and drives a single browser session for the lifetime of the
/// process.
pub struct WebDriverSession {
    client: Client,
}

impl WebDriverSession {
    /// Establishes a new WebDriver session per the browser configuration.
    #[tracing::instrument(level = "info", skip(config), fields(webdriver_url = %config.webdriver_url, engine = ?config.engine))]
    pub async fn connect(config: &BrowserConfig) -> Result<Self, DriverError> {
        tracing::debug!("Connecting to WebDriver endpoint.");
        let client = ClientBuilder::native()
            .capabilities(build_capabilities(config))
            .connect(&config.webdriver_url)
            .await?;
        tracing::info!("WebDriver session established.");
        Ok(Self { client })
    }
}

/// Builds WebDriver capabilities from the browser configuration.
///
/// Engine selection, headless mode, and a custom binary path are pass-through
/// options; they do not affect extraction logic.
fn build_capabilities(config: &BrowserConfig) -> serde_json::Map<String, Value> {
    let mut caps = serde_json::Map::new();

    match config.engine {
        BrowserEngine::Chrome | BrowserEngine::Edge => {
            let (browser_name, options_key) = match config.engine {
                BrowserEngine::Chrome => ("chrome", "goog:chromeOptions"),
                _ => ("MicrosoftEdge", "ms:edgeOptions"),
            };
            let mut options = serde_json::Map::new();
            if config.headless {
                options.insert("args".to_string(), json!(["--headless=new"]));
            }
            if let Some(binary) = &config.binary {
                options.insert("binary".to_string(), json!(binary));
            }
            caps.insert("browserName".to_string(), json!(browser_name));
            caps.insert(options_key.to_string(), Value::Object(options));
        }
        BrowserEngine::Firefox => {
            let mut options = serde_json::Map::new();
            if config.headless {
                options.insert("args".to_string(), json!(["-headless"]));
            }
            if let Some(binary) = &config.binary {
                options.insert("binary".to_string(), json!(binary));
            }
            caps.insert("browserName".to_string(), json!("firefox"));
            caps.insert("moz:firefoxOptions".to_string(), Value::Object(options));
        }
        BrowserEngine::Safari => {
            // safaridriver has no headless mode and no binary override.
            caps.insert("browserName".to_string(), json!("safari"));
        }
    }

    caps
}

#[async_trait]
impl PageDriver for WebDriverSession {
    async fn goto(&self, url: &str) -> Result<(), DriverError> {
        self.client.goto(url).await?;
        Ok(())
    }

    async fn element_text(&self, selector: &str) -> Result<Option<String>, DriverError> {
        match self.client.find(Locator::Css(selector)).await {
            Ok(element) => Ok(Some(element.text().await?)),
            Err(e) if e.is_no_such_element() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn scroll_to_bottom(&self) -> Result<(), DriverError> {
        self.client
            .execute("window.scrollTo(0, document.body.scrollHeight);", vec![])
            .await?;
        Ok(())
    }

    async fn page_height(&self) -> Result<u64, DriverError> {
        let value = self
            .client
            .execute("return document.body.scrollHeight;", vec![])
            .await?;
        value
            .as_u64()
            .ok_or_else(|| DriverError::ScriptResult(format!("non-integer page height: {value}")))
    }

    async fn close(&self) -> Result<(), DriverError> {
        self.client.clone().close().await?;
        Ok(())
    }
}
