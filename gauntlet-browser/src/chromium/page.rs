//! Page and element wrappers over the raw CDP session.
//!
//! [`GauntletPage`] owns one tab plus its dialog relay and exposes the
//! operations the suite needs: navigation, element lookup with and without
//! a wait window, script evaluation, style/visibility probes, coordinate
//! clicks, and the dialog responder API. [`GauntletElement`] carries the
//! selector it was found by so failures name the element they concern.

use std::time::{Duration, Instant};

use anyhow::{anyhow, bail, Context, Result};
use chromiumoxide::cdp::browser_protocol::input::{
    DispatchMouseEventParams, DispatchMouseEventType, MouseButton,
};
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use serde::de::DeserializeOwned;
use tokio::sync::mpsc;
use tracing::debug;

use crate::chromium::dialog::CdpDialogSource;
use crate::chromium::style::{self, ComputedStyle};
use crate::dialog::{DialogError, DialogEvent, DialogRelay, NextDialog};

/// Interval between lookups while waiting for an element to appear.
const ELEMENT_POLL: Duration = Duration::from_millis(100);

/// One browser tab with a dialog relay attached.
pub struct GauntletPage {
    page: Page,
    dialogs: DialogRelay,
}

impl GauntletPage {
    /// Wrap a raw page, subscribing its dialog relay first so no dialog can
    /// slip past unobserved.
    pub(crate) async fn attach(page: Page) -> Result<Self> {
        let source = CdpDialogSource::subscribe(&page).await?;
        let dialogs = DialogRelay::spawn(source);
        Ok(Self { page, dialogs })
    }

    /// Navigate to `url` and wait for the navigation to settle.
    pub async fn goto(&self, url: &str) -> Result<()> {
        self.page
            .goto(url)
            .await
            .with_context(|| format!("navigation to {url} failed"))?;
        Ok(())
    }

    /// Block until the pending navigation (if any) has completed.
    pub async fn wait_for_navigation(&self) -> Result<()> {
        self.page
            .wait_for_navigation()
            .await
            .context("navigation did not complete")?;
        Ok(())
    }

    pub async fn title(&self) -> Result<String> {
        Ok(self.page.get_title().await?.unwrap_or_default())
    }

    pub async fn url(&self) -> Result<String> {
        Ok(self.page.url().await?.unwrap_or_default())
    }

    /// Full HTML source of the page.
    pub async fn content(&self) -> Result<String> {
        Ok(self.page.content().await?)
    }

    /// Find a single element by CSS selector.
    pub async fn find_element(&self, selector: &str) -> Result<GauntletElement> {
        let element = self
            .page
            .find_element(selector)
            .await
            .with_context(|| format!("no element matches {selector:?}"))?;
        Ok(GauntletElement::new(element, selector.to_string()))
    }

    /// Find zero or more elements by CSS selector.
    pub async fn find_elements(&self, selector: &str) -> Result<Vec<GauntletElement>> {
        let elements = self
            .page
            .find_elements(selector)
            .await
            .with_context(|| format!("lookup of {selector:?} failed"))?;
        Ok(elements
            .into_iter()
            .map(|element| GauntletElement::new(element, selector.to_string()))
            .collect())
    }

    /// Wait up to `timeout` for `selector` to appear, polling the DOM on a
    /// fixed interval.
    pub async fn wait_for_element(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<GauntletElement> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.page.find_element(selector).await {
                Ok(element) => {
                    return Ok(GauntletElement::new(element, selector.to_string()));
                }
                Err(_) if Instant::now() < deadline => {
                    tokio::time::sleep(ELEMENT_POLL).await;
                }
                Err(err) => {
                    bail!("element {selector:?} did not appear within {timeout:?}: {err}");
                }
            }
        }
    }

    /// Spin-poll `selector`'s text on a fixed interval until it equals
    /// `expected`.
    ///
    /// There is deliberately no internal deadline; callers bound the wait
    /// externally (for example with `tokio::time::timeout`).
    pub async fn wait_for_text(&self, selector: &str, expected: &str, poll: Duration) -> Result<()> {
        loop {
            if self.text_of(selector).await? == expected {
                return Ok(());
            }
            tokio::time::sleep(poll).await;
        }
    }

    /// Evaluate a script and deserialize its result.
    pub async fn evaluate<T: DeserializeOwned>(&self, script: &str) -> Result<T> {
        let value = self
            .page
            .evaluate(script)
            .await
            .context("script evaluation failed")?
            .into_value()
            .context("script result had an unexpected shape")?;
        Ok(value)
    }

    /// Visible text of the first match for `selector`.
    pub async fn text_of(&self, selector: &str) -> Result<String> {
        self.find_element(selector).await?.inner_text().await
    }

    /// Whether `selector` matches an element that is actually rendered:
    /// present, not `display: none` or `visibility: hidden`, non-zero box.
    pub async fn is_visible(&self, selector: &str) -> Result<bool> {
        self.evaluate(&style::visibility_probe(selector)).await
    }

    /// Computed CSS of the first match for `selector`, `None` when nothing
    /// matches.
    pub async fn computed_style(&self, selector: &str) -> Result<Option<ComputedStyle>> {
        self.evaluate(&style::computed_style_probe(selector)).await
    }

    /// Press and release the left mouse button at viewport coordinates,
    /// bypassing element lookup entirely.
    ///
    /// Some challenges (the corner-click trap) need the click delivered to
    /// a point rather than to an element's clickable center.
    pub async fn click_at(&self, x: f64, y: f64) -> Result<()> {
        let press = DispatchMouseEventParams::builder()
            .r#type(DispatchMouseEventType::MousePressed)
            .x(x)
            .y(y)
            .button(MouseButton::Left)
            .click_count(1)
            .build()
            .map_err(|e| anyhow!(e))?;
        self.page.execute(press).await?;

        let release = DispatchMouseEventParams::builder()
            .r#type(DispatchMouseEventType::MouseReleased)
            .x(x)
            .y(y)
            .button(MouseButton::Left)
            .click_count(1)
            .build()
            .map_err(|e| anyhow!(e))?;
        self.page.execute(release).await?;

        debug!(target: "browser.page", x, y, "raw mouse click");
        Ok(())
    }

    /// Subscribe a one-shot responder for the next dialog.
    ///
    /// The returned future resolves once a dialog has been observed and
    /// accepted; it never resolves if no dialog is raised, so callers apply
    /// an external timeout.
    pub fn expect_dialog(&self) -> Result<NextDialog, DialogError> {
        self.dialogs.expect_next()
    }

    /// Install a standing responder accepting every dialog for the rest of
    /// the page's life (prompts receive `reply`). Observed dialogs are
    /// echoed on the returned channel.
    ///
    /// A dialog whose message is empty is echoed but left unanswered; the
    /// relay logs a warning when that happens.
    pub fn auto_accept_dialogs(
        &self,
        reply: &str,
    ) -> Result<mpsc::UnboundedReceiver<DialogEvent>, DialogError> {
        self.dialogs.accept_all(reply)
    }

    /// Drop the active dialog subscription, if any.
    pub fn release_dialogs(&self) -> bool {
        self.dialogs.release()
    }

    /// Dialogs that opened while no responder was subscribed.
    pub fn unanswered_dialogs(&self) -> usize {
        self.dialogs.unhandled()
    }
}

/// A located DOM element, remembering the selector that found it.
pub struct GauntletElement {
    inner: Element,
    selector: String,
}

impl GauntletElement {
    fn new(inner: Element, selector: String) -> Self {
        Self { inner, selector }
    }

    /// The selector this element was located by.
    pub fn selector(&self) -> &str {
        &self.selector
    }

    /// Scroll into view and click the element's clickable point.
    pub async fn click(&self) -> Result<()> {
        self.inner
            .click()
            .await
            .with_context(|| format!("click on {:?} failed", self.selector))?;
        debug!(target: "browser.page", selector = %self.selector, "clicked");
        Ok(())
    }

    /// Click to focus, then type `text` as individual key events.
    pub async fn type_str(&self, text: &str) -> Result<()> {
        self.click().await?;
        self.inner
            .type_str(text)
            .await
            .with_context(|| format!("typing into {:?} failed", self.selector))?;
        Ok(())
    }

    pub async fn inner_text(&self) -> Result<String> {
        let text = self
            .inner
            .inner_text()
            .await
            .with_context(|| format!("reading text of {:?} failed", self.selector))?;
        Ok(text.unwrap_or_default())
    }

    pub async fn inner_html(&self) -> Result<String> {
        let html = self
            .inner
            .inner_html()
            .await
            .with_context(|| format!("reading html of {:?} failed", self.selector))?;
        Ok(html.unwrap_or_default())
    }

    /// Read an attribute value, `None` when the attribute is absent.
    pub async fn attribute(&self, name: &str) -> Result<Option<String>> {
        self.inner
            .attribute(name)
            .await
            .with_context(|| format!("reading @{name} of {:?} failed", self.selector))
    }

    /// Scroll ancestors until the element is in view; the playground nests
    /// scrollable panels specifically to require this.
    pub async fn scroll_into_view(&self) -> Result<()> {
        self.inner
            .scroll_into_view()
            .await
            .with_context(|| format!("scrolling {:?} into view failed", self.selector))?;
        Ok(())
    }

    /// Find a descendant by CSS selector.
    pub async fn find_element(&self, selector: &str) -> Result<GauntletElement> {
        let scoped = format!("{} {}", self.selector, selector);
        let element = self
            .inner
            .find_element(selector)
            .await
            .with_context(|| format!("no element matches {scoped:?}"))?;
        Ok(GauntletElement::new(element, scoped))
    }

    /// Find zero or more descendants by CSS selector.
    pub async fn find_elements(&self, selector: &str) -> Result<Vec<GauntletElement>> {
        let scoped = format!("{} {}", self.selector, selector);
        let elements = self
            .inner
            .find_elements(selector)
            .await
            .with_context(|| format!("lookup of {scoped:?} failed"))?;
        Ok(elements
            .into_iter()
            .map(|element| GauntletElement::new(element, scoped.clone()))
            .collect())
    }
}
