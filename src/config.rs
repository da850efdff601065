use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Serialize;

/// Default bound on a single content-source call
pub const DEFAULT_API_TIMEOUT_MS: u64 = 10_000;

/// Deployment environment. Only used for the environment badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SiteEnvironment {
    Development,
    Staging,
    Production,
}

impl SiteEnvironment {
    pub fn display_name(&self) -> &'static str {
        match self {
            SiteEnvironment::Development => "Development",
            SiteEnvironment::Staging => "Staging",
            SiteEnvironment::Production => "Production",
        }
    }

    /// The badge is hidden in production.
    pub fn shows_badge(&self) -> bool {
        !matches!(self, SiteEnvironment::Production)
    }
}

impl FromStr for SiteEnvironment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(SiteEnvironment::Development),
            "staging" => Ok(SiteEnvironment::Staging),
            "production" | "prod" => Ok(SiteEnvironment::Production),
            other => bail!(
                "Unknown environment '{}'. Expected development, staging or production",
                other
            ),
        }
    }
}

impl fmt::Display for SiteEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    // Public site, used for canonical links
    pub site_url: String,

    // Content source
    pub api_url: String,
    pub api_timeout: Duration,

    // Optional asset CDN
    pub cdn_url: Option<String>,

    // Environment badge
    pub environment: SiteEnvironment,
    pub show_debug_info: bool,

    // Server
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let environment = match std::env::var("APP_ENV") {
            Ok(value) => value
                .parse()
                .context("APP_ENV must be development, staging or production")?,
            Err(_) => SiteEnvironment::Development,
        };

        Ok(Self {
            site_url: std::env::var("SITE_URL")
                .unwrap_or_else(|_| "https://example.com".to_string()),

            api_url: std::env::var("API_URL")
                .unwrap_or_else(|_| "https://api.example.com".to_string()),
            api_timeout: Duration::from_millis(
                std::env::var("API_TIMEOUT_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_API_TIMEOUT_MS),
            ),

            cdn_url: std::env::var("CDN_URL").ok().filter(|v| !v.trim().is_empty()),

            environment,
            show_debug_info: std::env::var("SHOW_DEBUG_INFO")
                .map(|v| v == "true")
                .unwrap_or(false),

            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
        })
    }
}
