//! Common types shared across the Gauntlet workspace.
//!
//! This crate defines the runtime configuration, shared error types, and
//! observability helpers used by the browser layer and the suite. It is
//! intentionally lightweight so that every crate can depend on it without
//! pulling in the browser stack.
//!
//! # Overview
//!
//! - [`GauntletConfig`]: Top-level suite configuration
//! - [`BrowserSettings`] and [`TimeoutConfig`]: its browser/timing sections
//! - [`observability`]: Centralised tracing/logging initialisation
//! - [`GauntletError`] and [`Result`]: Shared error handling
//!
//! # Examples
//!
//! Constructing a default configuration:
//!
//! ```rust
//! use gauntlet_common::GauntletConfig;
//!
//! let cfg = GauntletConfig::default();
//! assert!(cfg.browser.headless);
//! assert_eq!(cfg.timeouts.poll_ms, 50);
//! assert!(cfg.target.base_url.contains("uitestingplayground"));
//! ```
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub mod observability;

/// Where the suite points and what it expects to find there.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Base URL of the playground deployment under test. Override to run
    /// against a local mirror.
    pub base_url: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            base_url: "http://uitestingplayground.com".to_string(),
        }
    }
}

/// How the Chromium instance is launched.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    /// Run without a visible window.
    pub headless: bool,
    /// Explicit Chrome/Chromium binary; the system default is used when unset.
    pub chrome_binary: Option<PathBuf>,
    pub window_width: u32,
    pub window_height: u32,
    /// Extra command-line switches appended to the launch arguments.
    pub extra_args: Vec<String>,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            chrome_binary: None,
            window_width: 1280,
            window_height: 900,
            extra_args: Vec::new(),
        }
    }
}

/// Wait windows, in milliseconds.
///
/// `element_ms` covers ordinary lookups; `slow_element_ms` covers pages that
/// are deliberately slow (load delay, AJAX, client-side computation);
/// `dialog_ms` bounds how long a test waits for a dialog it just provoked;
/// `poll_ms` is the fixed delay between checks in text spin-polls.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub element_ms: u64,
    pub slow_element_ms: u64,
    pub dialog_ms: u64,
    pub poll_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            element_ms: 10_000,
            slow_element_ms: 30_000,
            dialog_ms: 10_000,
            poll_ms: 50,
        }
    }
}

impl TimeoutConfig {
    pub fn element(&self) -> Duration {
        Duration::from_millis(self.element_ms)
    }

    pub fn slow_element(&self) -> Duration {
        Duration::from_millis(self.slow_element_ms)
    }

    pub fn dialog(&self) -> Duration {
        Duration::from_millis(self.dialog_ms)
    }

    pub fn poll(&self) -> Duration {
        Duration::from_millis(self.poll_ms)
    }
}

/// Configuration for a Gauntlet run.
///
/// Every section defaults sensibly, so an empty file (or none at all) yields
/// a headless run against the public playground.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GauntletConfig {
    pub target: TargetConfig,
    pub browser: BrowserSettings,
    pub timeouts: TimeoutConfig,
}

/// Error types used across the Gauntlet workspace.
#[derive(thiserror::Error, Debug)]
pub enum GauntletError {
    /// The browser layer reported an error.
    #[error("Browser error: {0}")]
    Browser(#[from] anyhow::Error),

    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The target site did not look like the playground.
    #[error("Target mismatch: {0}")]
    Target(String),
}

/// Convenient alias for results that use [`GauntletError`].
pub type Result<T> = std::result::Result<T, GauntletError>;
