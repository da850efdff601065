//! Content source endpoints and per-content-type freshness windows.

use std::fmt;
use std::time::Duration;

// Section and settings endpoints are part of the source's catalogue; pages
// here only read the aggregate `HOME`, `ABOUT` and `PRODUCTS` documents.

pub const HOME: &str = "/api/home";
pub const HOME_HERO: &str = "/api/home/hero";
pub const HOME_FEATURES: &str = "/api/home/features";

pub const PRODUCTS: &str = "/api/products";

pub const ABOUT: &str = "/api/about";
pub const ABOUT_TEAM: &str = "/api/about/team";
pub const ABOUT_TIMELINE: &str = "/api/about/timeline";

pub const SETTINGS: &str = "/api/settings";

/// Path of a single product. The identifier is percent-encoded as one
/// path segment so it can never address a different endpoint.
pub fn product_detail(id: &str) -> String {
    let mut path = String::from(PRODUCTS);
    path.push('/');
    for byte in id.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                path.push(byte as char)
            }
            other => path.push_str(&format!("%{:02X}", other)),
        }
    }
    path
}

/// Content types served by the content source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Home,
    About,
    Products,
    ProductDetail,
}

impl ContentKind {
    /// Short name used in logs and cache keys.
    pub fn name(&self) -> &'static str {
        match self {
            ContentKind::Home => "home",
            ContentKind::About => "about",
            ContentKind::Products => "products",
            ContentKind::ProductDetail => "product_detail",
        }
    }

    /// How long an intermediary cache may reuse a response.
    pub fn freshness_window(&self) -> Duration {
        match self {
            ContentKind::Home => Duration::from_secs(3600),
            ContentKind::About => Duration::from_secs(7200),
            ContentKind::Products => Duration::from_secs(1800),
            ContentKind::ProductDetail => Duration::from_secs(3600),
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
