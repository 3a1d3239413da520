//! Browser layer for driving the playground site over the Chrome DevTools
//! Protocol.
//!
//! This crate exposes the launcher and page/element helpers the test suite
//! uses to exercise each challenge, plus the dialog relay that turns CDP
//! dialog events into awaitable responses.
//!
//! - [`chromium::browser::GauntletBrowser`]: Chromium process wrapper
//! - [`chromium::page::GauntletPage`]: navigation, DOM and dialog helpers
//! - [`dialog::DialogRelay`]: one-shot and standing dialog responders
pub mod dialog;

#[cfg(feature = "chromium")]
pub mod chromium;
