//! The per-scenario session: configuration, browser, home page.

use gauntlet_browser::chromium::{GauntletBrowser, GauntletPage};
use gauntlet_common::observability::{init_logging, LogConfig, LogFormat};
use gauntlet_common::{GauntletConfig, GauntletError, Result};
use gauntlet_config::GauntletConfigLoader;
use tracing::info;

use crate::actions;

/// Substring every playground deployment carries in its home page title.
pub const HOME_TITLE: &str = "UI Test Automation";

/// Load the suite configuration.
///
/// File resolution follows [`gauntlet_config::resolve_config_file`]
/// (`GAUNTLET_CONFIG`, then `./gauntlet.yaml`, then the per-user path);
/// `GAUNTLET__*` environment variables override file values, and with no
/// file at all every section defaults.
pub fn load_config() -> Result<GauntletConfig> {
    let loader = match gauntlet_config::resolve_config_file() {
        Some(path) => GauntletConfigLoader::new().with_file(path),
        None => GauntletConfigLoader::new(),
    };
    loader
        .load()
        .map_err(|e| GauntletError::Config(e.to_string()))
}

/// A live playground session: one browser, one tab, positioned on the home
/// page with the challenge list rendered.
pub struct Playground {
    pub config: GauntletConfig,
    pub page: GauntletPage,
    browser: GauntletBrowser,
}

impl Playground {
    /// Load config, set up logging, launch Chromium and open the home page.
    ///
    /// Fails with [`GauntletError::Target`] when whatever answers at the
    /// configured base URL does not look like the playground.
    pub async fn open() -> Result<Self> {
        let config = load_config()?;
        init_logging(LogConfig {
            app_name: "gauntlet",
            format: LogFormat::from_env(),
            ..LogConfig::default()
        })
        .map_err(|e| GauntletError::Config(format!("logging setup failed: {e}")))?;

        let browser = GauntletBrowser::launch(&config.browser).await?;
        let page = browser.new_page(&config.target.base_url).await?;

        // The home page lists every challenge; waiting for the first link
        // also settles the initial load before the title probe.
        page.wait_for_element("a[href=\"/dynamicid\"]", config.timeouts.element())
            .await?;
        let title = page.title().await?;
        if !title.contains(HOME_TITLE) {
            return Err(GauntletError::Target(format!(
                "page at {} titled {title:?} does not look like the playground",
                config.target.base_url
            )));
        }

        info!(target: "suite.session", title = %title, "playground session ready");
        Ok(Self {
            config,
            page,
            browser,
        })
    }

    /// Navigate from the home page into a challenge by clicking its link.
    pub async fn challenge(&self, path: &str) -> Result<&GauntletPage> {
        actions::click_href_link(&self.page, path).await?;
        self.page.wait_for_navigation().await?;
        info!(target: "suite.session", %path, "challenge opened");
        Ok(&self.page)
    }

    /// Shut the browser down.
    pub async fn close(self) -> Result<()> {
        self.browser.close().await?;
        Ok(())
    }
}
