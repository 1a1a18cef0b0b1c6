//! Browser session lifecycle: locate Chrome, launch or attach, tear down.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use chromiumoxide::{Browser, BrowserConfig, Handler, Page};
use futures::StreamExt;
use serde::Deserialize;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::config::BrowserEngineConfig;

/// Install locations probed before falling back to `PATH`.
const KNOWN_CHROME_LOCATIONS: &[&str] = &[
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/snap/bin/chromium",
    "/opt/google/chrome/chrome",
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
];

/// Executable names looked up on `PATH`.
const CHROME_BINARIES: &[&str] = &[
    "chromium",
    "chromium-browser",
    "google-chrome",
    "google-chrome-stable",
    "chrome",
];

fn locate_chrome(configured: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = configured {
        if !path.exists() {
            bail!("browser.chrome_path {} does not exist", path.display());
        }
        return Ok(path.to_path_buf());
    }

    let known = KNOWN_CHROME_LOCATIONS
        .iter()
        .map(Path::new)
        .find(|p| p.exists())
        .map(Path::to_path_buf);

    let found = known.or_else(|| {
        CHROME_BINARIES
            .iter()
            .find_map(|name| which::which(name).ok())
    });

    match found {
        Some(path) => {
            debug!("Using Chrome at {}", path.display());
            Ok(path)
        }
        None => Err(anyhow!(
            "no Chrome or Chromium executable found; install one or set browser.chrome_path \
             (or browser.remote_url to use a running browser)"
        )),
    }
}

/// Command-line flags for a launched browser.
fn launch_args(config: &BrowserEngineConfig) -> Vec<String> {
    let mut args = Vec::with_capacity(6 + config.chrome_args.len());
    if config.headless {
        args.push("--headless=new".to_string());
    }
    args.push(format!("--lang={}", config.lang));
    args.extend(
        [
            "--no-sandbox",
            "--disable-gpu",
            "--disable-dev-shm-usage",
            "--no-first-run",
        ]
        .map(String::from),
    );
    if let Some(proxy) = &config.proxy {
        args.push(format!("--proxy-server={}", proxy));
    }
    args.extend(config.chrome_args.iter().cloned());
    args
}

/// Subset of the DevTools `/json/version` response.
#[derive(Debug, Deserialize)]
struct DevToolsVersion {
    #[serde(rename = "webSocketDebuggerUrl")]
    ws_debugger_url: String,
}

/// HTTP address of the `/json/version` endpoint for a DevTools URL given
/// as `http(s)://` or `ws(s)://`.
fn version_endpoint(remote_url: &str) -> String {
    let base = remote_url.trim_end_matches('/');
    let base = match base.split_once("://") {
        Some(("ws", rest)) => format!("http://{}", rest),
        Some(("wss", rest)) => format!("https://{}", rest),
        Some(_) => base.to_string(),
        None => format!("http://{}", base),
    };
    format!("{}/json/version", base)
}

/// One isolated browser, owned by a single render call.
pub(crate) struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
    /// Present only for browsers this session launched.
    profile_dir: Option<TempDir>,
}

impl BrowserSession {
    /// Launch a fresh browser, or attach to the configured remote one.
    pub(crate) async fn open(config: &BrowserEngineConfig) -> Result<Self> {
        match config.remote_url.as_deref() {
            Some(remote_url) => Self::attach(config, remote_url).await,
            None => Self::launch(config).await,
        }
    }

    async fn launch(config: &BrowserEngineConfig) -> Result<Self> {
        let chrome = locate_chrome(config.chrome_path.as_deref())?;
        let profile_dir = tempfile::Builder::new()
            .prefix("gridscrape-profile-")
            .tempdir()
            .context("cannot create browser profile directory")?;

        // Headless mode comes from launch_args, not chromiumoxide's legacy flag
        let browser_config = BrowserConfig::builder()
            .chrome_executable(chrome)
            .user_data_dir(profile_dir.path())
            .request_timeout(Duration::from_secs(config.timeout))
            .with_head()
            .args(launch_args(config))
            .build()
            .map_err(|e| anyhow!("invalid browser configuration: {}", e))?;

        debug!("Launching browser (headless={})", config.headless);
        let (browser, handler) = Browser::launch(browser_config)
            .await
            .context("browser launch failed")?;

        Ok(Self {
            browser,
            handler: drive(handler),
            profile_dir: Some(profile_dir),
        })
    }

    async fn attach(config: &BrowserEngineConfig, remote_url: &str) -> Result<Self> {
        let endpoint = version_endpoint(remote_url);
        info!("Attaching to remote browser via {}", endpoint);

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()?;
        let version: DevToolsVersion = client
            .get(&endpoint)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .with_context(|| format!("remote browser unreachable at {}", endpoint))?
            .json()
            .await
            .context("unexpected /json/version response")?;

        let (browser, handler) = Browser::connect(version.ws_debugger_url.as_str())
            .await
            .context("DevTools websocket connection failed")?;

        Ok(Self {
            browser,
            handler: drive(handler),
            profile_dir: None,
        })
    }

    pub(crate) async fn new_page(&self) -> Result<Page> {
        self.browser
            .new_page("about:blank")
            .await
            .context("cannot open browser tab")
    }

    /// Tear the session down. Launched browsers are closed and reaped;
    /// a remote browser keeps running.
    pub(crate) async fn close(mut self) {
        if self.profile_dir.is_some() {
            if let Err(e) = self.browser.close().await {
                warn!("Browser did not close cleanly: {}", e);
            }
            if let Err(e) = self.browser.wait().await {
                debug!("Waiting on browser process: {}", e);
            }
        }
        self.handler.abort();
    }
}

/// Pump CDP events until the connection drops.
fn drive(mut handler: Handler) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if event.is_err() {
                break;
            }
        }
    })
}
