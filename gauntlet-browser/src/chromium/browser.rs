use anyhow::{anyhow, Context, Result};
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use gauntlet_common::BrowserSettings;
use tokio::task::JoinHandle;
use tracing::info;

use crate::chromium::page::GauntletPage;

/// Owns the Chromium process and the CDP connection driving it.
pub struct GauntletBrowser {
    inner: Browser,
    handler: JoinHandle<()>,
    // Held so the profile directory outlives the browser process.
    _profile_dir: tempfile::TempDir,
}

impl GauntletBrowser {
    /// Launch a Chromium instance configured from `settings`.
    ///
    /// Every launch gets a throwaway profile directory so runs cannot leak
    /// cookies or cached state into each other.
    pub async fn launch(settings: &BrowserSettings) -> Result<Self> {
        let profile_dir =
            tempfile::tempdir().context("failed to create browser profile directory")?;

        let mut config = BrowserConfig::builder()
            .user_data_dir(profile_dir.path())
            .window_size(settings.window_width, settings.window_height)
            .arg("--no-sandbox")
            .arg("--disable-gpu")
            .arg("--no-first-run")
            .arg("--no-default-browser-check");
        for arg in &settings.extra_args {
            config = config.arg(arg);
        }
        if !settings.headless {
            config = config.with_head();
        }
        if let Some(binary) = &settings.chrome_binary {
            config = config.chrome_executable(binary);
        }
        let config = config.build().map_err(|e| anyhow!(e))?;

        let (browser, mut handler) = Browser::launch(config).await?;
        // The handler must be polled for the whole session or every CDP call
        // stalls.
        let handler = tokio::spawn(async move { while handler.next().await.is_some() {} });

        info!(
            target: "browser.lifecycle",
            headless = settings.headless,
            width = settings.window_width,
            height = settings.window_height,
            "chromium launched"
        );

        Ok(Self {
            inner: browser,
            handler,
            _profile_dir: profile_dir,
        })
    }

    /// Open a new tab at `url` with a dialog relay already attached.
    pub async fn new_page(&self, url: &str) -> Result<GauntletPage> {
        let page = self
            .inner
            .new_page(url)
            .await
            .with_context(|| format!("failed to open page at {url}"))?;
        GauntletPage::attach(page).await
    }

    /// Shut the browser down and stop the CDP event loop.
    pub async fn close(mut self) -> Result<()> {
        self.inner.close().await?;
        self.handler.abort();
        info!(target: "browser.lifecycle", "chromium closed");
        Ok(())
    }
}
