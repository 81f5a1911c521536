//! Recorrer: browser-driven acceptance harness for a marketing-site careers
//! funnel.
//!
//! Recorrer (Spanish: "to walk through") drives the public careers funnel of
//! a marketing site behind a pluggable [`Driver`], with typed page objects,
//! cooperative polling waits, DOM fingerprinting for re-render detection, and
//! failure diagnostics (screenshot on failure, guaranteed session release).
//! The `api` feature adds a pet-store REST conformance suite and a
//! search-funnel load runner over the same reporting conventions.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐    ┌───────────────┐    ┌───────────────┐    ┌────────────┐
//! │ Home     │───►│ Careers       │───►│ QA Careers    │───►│ Vacancies  │
//! │ cookies  │    │ menu, teams   │    │ "all QA jobs" │    │ filters    │
//! └──────────┘    └───────────────┘    └───────────────┘    └─────┬──────┘
//!                                                                │ view role
//!                                                          ┌─────▼──────┐
//!                                                          │ job board  │
//!                                                          │ (new tab)  │
//!                                                          └────────────┘
//! ```
//!
//! Every "wait until X" funnels through the polling engine in [`wait_for`];
//! there are no push events. Page objects resolve elements through a
//! [`Session`], which retries lookups and records the last located element
//! for failure diagnostics.

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

mod config;
mod driver;
mod filter;
mod fingerprint;
mod fixture;
mod locator;
mod page_object;
mod result;
mod session;
mod wait;

/// Concrete page objects for the careers funnel and their standard registry.
pub mod pages;

/// Pet-store REST API conformance: typed client and check suite.
///
/// Feature-gated behind `api`.
#[cfg(feature = "api")]
pub mod api;

/// Search-funnel load runner: journeys, concurrent workers, latency report.
///
/// Feature-gated behind `api`.
#[cfg(feature = "api")]
pub mod load;

pub use config::SiteConfig;
pub use driver::{ClickEffect, Driver, ElementHandle, MockDriver, MockElement, ScriptArg};
pub use filter::{FilterPredicate, FilterStage, FilterWaiter, JobItem};
pub use fingerprint::{fingerprint, wait_for_change, ContentFingerprint};
pub use fixture::{DiagnosticsOptions, TestOutcome, TestSession};
pub use locator::Locator;
pub use page_object::{camel_to_snake, PageNamespace, PageObject, PageRegistry};
pub use result::{RecorrerError, RecorrerResult};
pub use session::{Session, CLICK_SCRIPT, HEADER_OFFSET_PX, SCROLL_PADDING_PX};
pub use wait::{
    wait_for, wait_until, WaitOptions, WaitResult, DEFAULT_POLL_INTERVAL_MS,
    DEFAULT_WAIT_TIMEOUT_MS,
};

/// Prelude for convenient imports
pub mod prelude {
    #[cfg(feature = "api")]
    pub use super::api::client::*;
    #[cfg(feature = "api")]
    pub use super::api::suite::*;
    pub use super::config::*;
    pub use super::driver::*;
    pub use super::filter::*;
    pub use super::fingerprint::*;
    pub use super::fixture::*;
    #[cfg(feature = "api")]
    pub use super::load::*;
    pub use super::locator::*;
    pub use super::page_object::*;
    pub use super::pages::*;
    pub use super::result::*;
    pub use super::session::*;
    pub use super::wait::*;
}
