//! Locale-aware content acquisition for a multi-locale website.
//!
//! - [`i18n`]: supported locales and request-time negotiation
//! - [`router`]: locale-prefixed paths, redirects and the sticky preference cookie
//! - [`api`]: bounded content-source calls, typed records and bundled fallbacks
//! - [`cache`]: per-request memoization of content fetches
//! - [`server`]: the axum application exposing page data

pub mod api;
pub mod cache;
pub mod config;
pub mod i18n;
pub mod router;
pub mod server;
