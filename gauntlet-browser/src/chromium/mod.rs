//! Chromium backend: process lifecycle, page helpers and the CDP dialog
//! source, all speaking the DevTools protocol through `chromiumoxide`.

pub mod browser;
pub(crate) mod dialog;
pub mod page;
pub mod style;

pub use browser::GauntletBrowser;
pub use page::{GauntletElement, GauntletPage};
pub use style::ComputedStyle;
