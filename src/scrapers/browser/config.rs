//! Settings for the headless browser.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Desktop Chrome user agent sent with every page.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/118.0.0.0 Safari/537.36";

/// How browser sessions are started and what they present to the site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserEngineConfig {
    /// Set to false to watch renders in a visible window.
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Navigation timeout in seconds.
    #[serde(default = "default_nav_timeout")]
    pub timeout: u64,

    /// User agent override applied before navigation.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Browser UI and Accept-Language value.
    #[serde(default = "default_lang")]
    pub lang: String,

    /// Upstream proxy, passed as `--proxy-server`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,

    /// Explicit Chrome/Chromium executable. Auto-detected when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chrome_path: Option<PathBuf>,

    /// Extra command-line flags for launched browsers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chrome_args: Vec<String>,

    /// DevTools address of an already running browser (`ws://host:9222`).
    /// When set, no browser is launched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<String>,
}

fn default_headless() -> bool {
    true
}

fn default_nav_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_lang() -> String {
    "en-US".to_string()
}

impl Default for BrowserEngineConfig {
    fn default() -> Self {
        Self {
            headless: default_headless(),
            timeout: default_nav_timeout(),
            user_agent: default_user_agent(),
            lang: default_lang(),
            proxy: None,
            chrome_path: None,
            chrome_args: Vec::new(),
            remote_url: None,
        }
    }
}
