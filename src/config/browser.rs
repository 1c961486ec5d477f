//! Browser driver selection options.

use std::path::PathBuf;

use serde::Deserialize;

/// The closed set of supported browser engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserEngine {
    /// Google Chrome / Chromium via chromedriver.
    Chrome,
    /// Mozilla Firefox via geckodriver.
    Firefox,
    /// Microsoft Edge via msedgedriver.
    Edge,
    /// Apple Safari via safaridriver.
    Safari,
}

/// Provides the default WebDriver endpoint.
fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

/// Provides the default browser engine.
fn default_engine() -> BrowserEngine {
    BrowserEngine::Chrome
}

/// Pass-through configuration for the browser session.
///
/// None of these options affect the extraction logic; they select and shape
/// the WebDriver session the extractor runs against.
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserConfig {
    /// The WebDriver endpoint to connect to.
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// The browser engine to drive.
    #[serde(default = "default_engine")]
    pub engine: BrowserEngine,

    /// Run the browser without a visible window.
    #[serde(default)]
    pub headless: bool,

    /// Optional path to a custom browser binary.
    #[serde(default)]
    pub binary: Option<PathBuf>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: default_webdriver_url(),
            engine: default_engine(),
            headless: false,
            binary: None,
        }
    }
}
