//! Shared pieces of the playground exercise suite.
//!
//! The browser-bound scenarios live under `tests/`; this crate holds what
//! they have in common:
//!
//! - [`session::Playground`]: launches the browser, opens the home page and
//!   navigates into a challenge
//! - [`actions`]: the single-expression page actions and small text helpers
//!   the scenarios share

pub mod actions;
pub mod session;
